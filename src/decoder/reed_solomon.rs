//! Reed-Solomon error correction for QR codes
//! QR codes use RS over GF(256) with primitive polynomial x^8 + x^4 + x^3 + x^2 + 1
//! and generator roots alpha^0, alpha^1, ...
use thiserror::Error;

const PRIMITIVE: u16 = 0x11D;

struct Tables {
    exp: [u8; 512],
    log: [u8; 256],
}

const fn build_tables() -> Tables {
    let mut exp = [0u8; 512];
    let mut log = [0u8; 256];
    let mut x: u16 = 1;
    let mut i = 0;
    while i < 255 {
        exp[i] = x as u8;
        log[x as usize] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= PRIMITIVE;
        }
        i += 1;
    }
    while i < 512 {
        exp[i] = exp[i - 255];
        i += 1;
    }
    Tables { exp, log }
}

static TABLES: Tables = build_tables();

/// GF(256) field operations using log/exp tables
pub struct Gf256;

impl Gf256 {
    /// Field product
    pub fn mul(a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        TABLES.exp[TABLES.log[a as usize] as usize + TABLES.log[b as usize] as usize]
    }

    /// `a / b`; callers guarantee `b != 0`
    pub fn div(a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        TABLES.exp[TABLES.log[a as usize] as usize + 255 - TABLES.log[b as usize] as usize]
    }

    /// alpha^e for any exponent
    pub fn exp(e: usize) -> u8 {
        TABLES.exp[e % 255]
    }

    /// alpha^-e
    pub fn exp_inverse(e: usize) -> u8 {
        TABLES.exp[(255 - e % 255) % 255]
    }

    /// Evaluate a polynomial stored lowest degree first
    fn eval(poly: &[u8], x: u8) -> u8 {
        poly.iter().rev().fold(0, |acc, &c| Self::mul(acc, x) ^ c)
    }
}

/// Why a block could not be corrected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RsError {
    /// More errors than the ECC codewords can fix
    #[error("too many errors to correct")]
    TooManyErrors,
    /// The locator polynomial has roots outside the block
    #[error("error locations do not fit the block")]
    LocatorMismatch,
    /// Correction applied but the syndromes did not clear
    #[error("block still inconsistent after correction")]
    Uncorrectable,
}

/// Reed-Solomon decoder for QR codes
pub struct ReedSolomonDecoder {
    num_ecc_codewords: usize,
}

impl ReedSolomonDecoder {
    /// Decoder for blocks carrying `num_ecc_codewords` check symbols
    pub fn new(num_ecc_codewords: usize) -> Self {
        Self { num_ecc_codewords }
    }

    /// Correct `block` (data followed by ECC) in place; returns the number
    /// of codewords fixed
    pub fn decode(&self, block: &mut [u8]) -> Result<usize, RsError> {
        let syndromes = self.syndromes(block);
        if syndromes.iter().all(|&s| s == 0) {
            return Ok(0);
        }

        let locator = self.error_locator(&syndromes)?;
        let positions = Self::error_positions(&locator, block.len())?;
        let evaluator = self.error_evaluator(&syndromes, &locator);

        // Formal derivative: odd-power terms shifted down one degree
        let derivative: Vec<u8> = locator
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, &c)| if i % 2 == 1 { c } else { 0 })
            .collect();

        let n = block.len();
        for &j in &positions {
            let power = n - 1 - j;
            let x = Gf256::exp(power);
            let x_inv = Gf256::exp_inverse(power);
            let denominator = Gf256::eval(&derivative, x_inv);
            if denominator == 0 {
                return Err(RsError::Uncorrectable);
            }
            let magnitude = Gf256::mul(x, Gf256::eval(&evaluator, x_inv));
            block[j] ^= Gf256::div(magnitude, denominator);
        }

        if self.syndromes(block).iter().any(|&s| s != 0) {
            return Err(RsError::Uncorrectable);
        }
        Ok(positions.len())
    }

    /// S_i = r(alpha^i), codewords highest degree first
    fn syndromes(&self, block: &[u8]) -> Vec<u8> {
        (0..self.num_ecc_codewords)
            .map(|i| {
                let root = Gf256::exp(i);
                block.iter().fold(0, |acc, &c| Gf256::mul(acc, root) ^ c)
            })
            .collect()
    }

    /// Berlekamp-Massey; locator returned lowest degree first
    fn error_locator(&self, syndromes: &[u8]) -> Result<Vec<u8>, RsError> {
        let mut locator = vec![1u8];
        let mut previous = vec![1u8];
        let mut length = 0usize;
        let mut shift = 1usize;
        let mut last_discrepancy = 1u8;

        for k in 0..syndromes.len() {
            let mut discrepancy = syndromes[k];
            for i in 1..=length.min(locator.len() - 1) {
                discrepancy ^= Gf256::mul(locator[i], syndromes[k - i]);
            }
            if discrepancy == 0 {
                shift += 1;
                continue;
            }

            let scale = Gf256::div(discrepancy, last_discrepancy);
            let mut next = locator.clone();
            if next.len() < previous.len() + shift {
                next.resize(previous.len() + shift, 0);
            }
            for (i, &p) in previous.iter().enumerate() {
                next[i + shift] ^= Gf256::mul(scale, p);
            }

            if 2 * length <= k {
                length = k + 1 - length;
                previous = std::mem::replace(&mut locator, next);
                last_discrepancy = discrepancy;
                shift = 1;
            } else {
                locator = next;
                shift += 1;
            }
        }

        while locator.len() > 1 && locator.last() == Some(&0) {
            locator.pop();
        }
        if locator.len() - 1 != length || 2 * length > self.num_ecc_codewords {
            return Err(RsError::TooManyErrors);
        }
        Ok(locator)
    }

    /// Chien search: index j is in error when locator(alpha^-(n-1-j)) == 0
    fn error_positions(locator: &[u8], n: usize) -> Result<Vec<usize>, RsError> {
        let positions: Vec<usize> = (0..n)
            .filter(|&j| Gf256::eval(locator, Gf256::exp_inverse(n - 1 - j)) == 0)
            .collect();
        if positions.len() != locator.len() - 1 {
            return Err(RsError::LocatorMismatch);
        }
        Ok(positions)
    }

    /// Omega(x) = S(x) * Lambda(x) mod x^nsym
    fn error_evaluator(&self, syndromes: &[u8], locator: &[u8]) -> Vec<u8> {
        let nsym = self.num_ecc_codewords;
        let mut omega = vec![0u8; nsym];
        for (i, &s) in syndromes.iter().enumerate() {
            for (k, &l) in locator.iter().enumerate() {
                if i + k < nsym {
                    omega[i + k] ^= Gf256::mul(s, l);
                }
            }
        }
        omega
    }
}
