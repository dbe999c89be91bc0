//! Error types for scanning and the record store

use thiserror::Error;

/// Result alias for facade operations
pub type Result<T> = std::result::Result<T, Error>;

/// Result alias for record store operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Result alias for building scan images
pub type ScanResult<T> = std::result::Result<T, ScanError>;

/// The input could not be turned into an image.
///
/// A readable image that simply holds no symbol is not an error: the scanner
/// reports it as `None`.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Reading the image file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The bytes are not a decodable image
    #[error("Image decoding error: {0}")]
    Image(#[from] image::ImageError),
}

/// Record store failures
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or replacing the backing file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file is not valid CSV or a row does not parse
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A creation request broke a record invariant
    #[error("Validation error: {0}")]
    Validation(String),

    /// Insert rejected because the code exists (only with unique codes enforced)
    #[error("A record with code {code:?} already exists")]
    DuplicateCode {
        /// The offending code
        code: String,
    },
}

/// Any failure of the inventory facade
#[derive(Error, Debug)]
pub enum Error {
    /// Scan input error
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Record store error
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = StoreError::DuplicateCode {
            code: "A1".to_string(),
        };
        assert_eq!(err.to_string(), "A record with code \"A1\" already exists");

        let err = StoreError::Validation("name must not be empty".to_string());
        assert_eq!(err.to_string(), "Validation error: name must not be empty");
    }

    #[test]
    fn test_wrapping_is_transparent() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = StoreError::from(io).into();
        assert!(matches!(err, Error::Store(StoreError::Io(_))));
        assert_eq!(err.to_string(), "I/O error: missing");
    }
}
