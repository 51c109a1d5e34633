//! Crate-level error type used by writers.
//!
//! Parsing and attribute access return
//! [`FormatError`](crate::formats::primitives::FormatError); writers add I/O
//! and record validation on top and report through [`BiotagError`].

use crate::formats::primitives::FormatError;
use thiserror::Error;

/// Result type alias for writer operations
pub type Result<T> = std::result::Result<T, BiotagError>;

/// Errors from writing records.
#[derive(Debug, Error)]
pub enum BiotagError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse or attribute error from a record being written
    #[error(transparent)]
    Format(#[from] FormatError),

    /// A record or call sequence the writer refuses
    #[error("Invalid input: {msg}")]
    InvalidInput {
        /// Error message
        msg: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        let io: BiotagError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(io, BiotagError::Io(_)));

        let format: BiotagError = FormatError::DuplicateKey { key: "NM".to_string() }.into();
        assert!(format.to_string().contains("NM"));

        let invalid = BiotagError::InvalidInput {
            msg: "pos must be >= 1".to_string(),
        };
        assert_eq!(invalid.to_string(), "Invalid input: pos must be >= 1");
    }
}
