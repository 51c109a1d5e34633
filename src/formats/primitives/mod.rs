//! Shared primitives for line-oriented bioinformatics formats.
//!
//! This module provides the infrastructure every record type builds on:
//! - The [`FormatError`] taxonomy and [`Result`] alias
//! - Field splitting and parsing utilities ([`fields`])
//! - Segment/strand orientation ([`Orientation`])
//! - The [`TabDelimitedRecord`] trait and generic streaming parser
//!
//! # Example
//!
//! ```
//! use biotag::formats::primitives::Orientation;
//! use std::str::FromStr;
//!
//! let orientation = Orientation::from_str("-")?;
//! assert_eq!(orientation, Orientation::Reverse);
//! assert_eq!(orientation.flip(), Orientation::Forward);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use thiserror::Error;

pub mod fields;
pub mod orientation;
pub mod tab_delimited;

// Re-exports
pub use orientation::{Orientation, Reference};
pub use tab_delimited::{TabDelimitedParser, TabDelimitedRecord};

/// Errors that can occur when parsing or querying bioinformatics records.
///
/// Attribute lookups distinguish a missing key ([`FormatError::MissingRequiredValue`]),
/// a wrong element count ([`FormatError::WrongCardinality`]) and a wrong
/// declared type ([`FormatError::WrongType`]); callers can match on each.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Invalid number of tab-delimited fields.
    #[error("Invalid number of fields: expected {expected}, got {actual} at line {line}")]
    FieldCount {
        /// Expected (minimum) number of fields
        expected: usize,
        /// Actual number of fields found
        actual: usize,
        /// Line number where error occurred
        line: usize,
    },

    /// Invalid positional field value.
    #[error("Invalid field '{field}' at line {line}: {reason}")]
    InvalidField {
        /// Field name
        field: String,
        /// Line number where error occurred
        line: usize,
        /// Reason for invalidity
        reason: String,
    },

    /// Orientation symbol other than `+` or `-`.
    #[error("Invalid orientation: {0} (expected '+' or '-')")]
    InvalidOrientation(String),

    /// A required attribute is absent.
    #[error("Missing required value for key '{key}'")]
    MissingRequiredValue {
        /// Attribute key
        key: String,
    },

    /// Element count does not match the declared `Number=`.
    #[error("Wrong cardinality for key '{key}': expected {expected} values, found {actual}")]
    WrongCardinality {
        /// Attribute key
        key: String,
        /// Resolved expected count
        expected: usize,
        /// Number of values stored
        actual: usize,
    },

    /// Stored type code is not the one requested.
    #[error("Wrong type for key '{key}': requested {expected}, stored {actual}")]
    WrongType {
        /// Attribute key
        key: String,
        /// Requested type code
        expected: String,
        /// Stored type code
        actual: String,
    },

    /// Token could not be split or decoded at all.
    #[error("Malformed token '{token}': {reason}")]
    MalformedToken {
        /// Offending text
        token: String,
        /// Why it was rejected
        reason: String,
    },

    /// Numeric text failed to parse.
    #[error("Value '{value}' for key '{key}' is not numeric")]
    NotNumeric {
        /// Attribute key
        key: String,
        /// Offending text
        value: String,
    },

    /// The same key was added twice to one attribute set.
    #[error("Duplicate attribute key '{key}'")]
    DuplicateKey {
        /// Repeated key
        key: String,
    },

    /// Genotype-count computation would exceed `u64`.
    #[error("Genotype count C({n}, {k}) overflows u64")]
    Overflow {
        /// Binomial n
        n: u64,
        /// Binomial k
        k: u64,
    },

    /// Genotype call cannot be used to resolve cardinality.
    #[error("Invalid genotype: {reason}")]
    InvalidGenotype {
        /// Description
        reason: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FormatError {
    pub(crate) fn malformed(token: impl Into<String>, reason: impl Into<String>) -> Self {
        FormatError::MalformedToken {
            token: token.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for format operations.
pub type Result<T> = std::result::Result<T, FormatError>;
