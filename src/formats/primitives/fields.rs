//! Field splitting and parsing helpers shared by all record parsers.
//!
//! The missing-value marker for positional columns is `.` (VCF) or `*`
//! (GFA, PAF); [`parse_optional`] treats both as `None`.

use crate::formats::primitives::{FormatError, Result};
use std::fmt::Display;
use std::str::FromStr;

/// Splits a line on tabs, requiring at least `min_fields` columns.
///
/// # Errors
///
/// Returns [`FormatError::FieldCount`] if fewer than `min_fields` columns exist.
///
/// # Examples
///
/// ```
/// use biotag::formats::primitives::fields::split_fields;
///
/// let fields = split_fields("a\tb\tc", Some(2), 1)?;
/// assert_eq!(fields, vec!["a", "b", "c"]);
///
/// assert!(split_fields("a", Some(2), 1).is_err());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn split_fields(line: &str, min_fields: Option<usize>, line_number: usize) -> Result<Vec<&str>> {
    let fields: Vec<&str> = line.split('\t').collect();

    if let Some(expected) = min_fields {
        if fields.len() < expected {
            return Err(FormatError::FieldCount {
                expected,
                actual: fields.len(),
                line: line_number,
            });
        }
    }

    Ok(fields)
}

/// Parses a mandatory column.
pub fn parse_required<T>(value: &str, field: &str, line_number: usize) -> Result<T>
where
    T: FromStr,
    T::Err: Display,
{
    value.parse::<T>().map_err(|e| FormatError::InvalidField {
        field: field.to_string(),
        line: line_number,
        reason: format!("'{}': {}", value, e),
    })
}

/// Parses an optional column, mapping `.` and `*` to `None`.
pub fn parse_optional<T>(value: &str, field: &str, line_number: usize) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
{
    if is_missing(value) {
        Ok(None)
    } else {
        parse_required(value, field, line_number).map(Some)
    }
}

/// Splits a comma-separated list; a missing marker yields an empty list.
///
/// # Examples
///
/// ```
/// use biotag::formats::primitives::fields::parse_comma_list;
///
/// assert_eq!(parse_comma_list("T,G"), vec!["T", "G"]);
/// assert!(parse_comma_list(".").is_empty());
/// ```
pub fn parse_comma_list(value: &str) -> Vec<&str> {
    if is_missing(value) || value.is_empty() {
        Vec::new()
    } else {
        value.split(',').collect()
    }
}

/// GFA placeholder handling: `*` becomes `None`.
#[inline]
pub fn unless_star(value: &str) -> Option<&str> {
    (value != "*").then_some(value)
}

/// Returns `true` for the missing-value markers `.` and `*`.
#[inline]
pub fn is_missing(value: &str) -> bool {
    value == "." || value == "*"
}
