use crate::decoder::reed_solomon::ReedSolomonDecoder;
use crate::decoder::tables::ec_block_info;
use crate::models::{ECLevel, Version};

/// Split interleaved codewords into RS blocks, correct each block and
/// return the concatenated data codewords.
///
/// Short blocks come first; long blocks carry one extra data codeword,
/// which is interleaved last.
pub(super) fn deinterleave_and_correct(
    codewords: &[u8],
    version: Version,
    ec_level: ECLevel,
) -> Option<Vec<u8>> {
    let info = ec_block_info(version, ec_level);
    if codewords.len() < info.total_codewords || info.num_blocks == 0 {
        return None;
    }

    let ecc = info.ecc_per_block;
    let short_blocks = info.short_blocks();
    let short_data = info.short_block_len().checked_sub(ecc)?;
    let data_len = |block: usize| short_data + usize::from(block >= short_blocks);

    let mut blocks: Vec<Vec<u8>> = (0..info.num_blocks)
        .map(|b| Vec::with_capacity(data_len(b) + ecc))
        .collect();
    let mut stream = codewords.iter().copied();

    for i in 0..=short_data {
        for (b, block) in blocks.iter_mut().enumerate() {
            if i < data_len(b) {
                block.push(stream.next()?);
            }
        }
    }
    for _ in 0..ecc {
        for block in blocks.iter_mut() {
            block.push(stream.next()?);
        }
    }

    let decoder = ReedSolomonDecoder::new(ecc);
    let mut data = Vec::with_capacity(info.data_codewords());
    for (b, block) in blocks.iter_mut().enumerate() {
        match decoder.decode(block) {
            Ok(0) => {}
            Ok(fixed) => tracing::trace!(block = b, fixed, "corrected codewords"),
            Err(err) => {
                tracing::trace!(block = b, %err, "block uncorrectable");
                return None;
            }
        }
        data.extend_from_slice(&block[..data_len(b)]);
    }
    Some(data)
}
