//! Attribute type codes.
//!
//! GFA and PAF tags carry a one-letter code (`A`, `i`, `f`, `Z`, `H`, `B`);
//! VCF header definitions use words (`Integer`, `Float`, `Character`,
//! `String`, `Flag`). Both map onto the closed [`TypeCode`] enum, and any
//! other code is rejected when a token is parsed.

use crate::formats::primitives::{FormatError, Result};
use std::fmt;

/// Element type of a `B` array.
///
/// The width is informational: elements decode to `i64`/`f32` whatever the
/// declared subtype, and no range check is made against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArraySubtype {
    /// `c`
    Int8,
    /// `C`
    UInt8,
    /// `s`
    Int16,
    /// `S`
    UInt16,
    /// `i`
    Int32,
    /// `I`
    UInt32,
    /// `f`
    Float,
}

impl ArraySubtype {
    /// Parses a subtype character.
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'c' => Some(ArraySubtype::Int8),
            'C' => Some(ArraySubtype::UInt8),
            's' => Some(ArraySubtype::Int16),
            'S' => Some(ArraySubtype::UInt16),
            'i' => Some(ArraySubtype::Int32),
            'I' => Some(ArraySubtype::UInt32),
            'f' => Some(ArraySubtype::Float),
            _ => None,
        }
    }

    /// The subtype character written after `B:`.
    pub fn code(self) -> char {
        match self {
            ArraySubtype::Int8 => 'c',
            ArraySubtype::UInt8 => 'C',
            ArraySubtype::Int16 => 's',
            ArraySubtype::UInt16 => 'S',
            ArraySubtype::Int32 => 'i',
            ArraySubtype::UInt32 => 'I',
            ArraySubtype::Float => 'f',
        }
    }

    /// `true` for every subtype except `f`.
    pub fn is_integer(self) -> bool {
        !matches!(self, ArraySubtype::Float)
    }
}

/// Declared type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCode {
    /// Single printable character (`A`, `Character`).
    Character,
    /// Signed integer (`i`, `Integer`).
    Integer,
    /// Single-precision float (`f`, `Float`).
    Float,
    /// Free text without the field delimiter (`Z`, `String`).
    String,
    /// Even-length hex string (`H`).
    ByteArray,
    /// Numeric array with an element subtype (`B`).
    Array(ArraySubtype),
    /// Presence flag without a value (`Flag`, VCF only).
    Flag,
}

impl TypeCode {
    /// Parses a GFA/PAF one-letter code. `B` needs its subtype from the
    /// value text and is handled by the tag parser, not here.
    pub fn from_tag_code(code: &str) -> Result<Self> {
        match code {
            "A" => Ok(TypeCode::Character),
            "i" => Ok(TypeCode::Integer),
            "f" => Ok(TypeCode::Float),
            "Z" => Ok(TypeCode::String),
            "H" => Ok(TypeCode::ByteArray),
            _ => Err(FormatError::malformed(code, "unknown tag type code")),
        }
    }

    /// Parses a VCF header `Type=` word.
    pub fn from_vcf_type(name: &str) -> Result<Self> {
        match name {
            "Integer" => Ok(TypeCode::Integer),
            "Float" => Ok(TypeCode::Float),
            "Character" => Ok(TypeCode::Character),
            "String" => Ok(TypeCode::String),
            "Flag" => Ok(TypeCode::Flag),
            _ => Err(FormatError::malformed(name, "unknown VCF Type")),
        }
    }

    /// The code written between the two colons of a GFA/PAF tag.
    ///
    /// `Flag` has no tag form and returns its VCF name.
    pub fn tag_code(self) -> &'static str {
        match self {
            TypeCode::Character => "A",
            TypeCode::Integer => "i",
            TypeCode::Float => "f",
            TypeCode::String => "Z",
            TypeCode::ByteArray => "H",
            TypeCode::Array(_) => "B",
            TypeCode::Flag => "Flag",
        }
    }

    /// The VCF header `Type=` word, if this type exists in VCF.
    pub fn vcf_type(self) -> Option<&'static str> {
        match self {
            TypeCode::Integer => Some("Integer"),
            TypeCode::Float => Some("Float"),
            TypeCode::Character => Some("Character"),
            TypeCode::String => Some("String"),
            TypeCode::Flag => Some("Flag"),
            TypeCode::ByteArray | TypeCode::Array(_) => None,
        }
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeCode::Array(subtype) => write!(f, "B:{}", subtype.code()),
            other => f.write_str(other.tag_code()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_codes() {
        for code in ["A", "i", "f", "Z", "H"] {
            let type_code = TypeCode::from_tag_code(code).unwrap();
            assert_eq!(type_code.tag_code(), code);
        }
        assert!(TypeCode::from_tag_code("J").is_err());
        assert!(TypeCode::from_tag_code("B").is_err());
        assert!(TypeCode::from_tag_code("").is_err());
    }

    #[test]
    fn test_vcf_types() {
        assert_eq!(TypeCode::from_vcf_type("Integer").unwrap(), TypeCode::Integer);
        assert_eq!(TypeCode::from_vcf_type("Flag").unwrap(), TypeCode::Flag);
        assert!(TypeCode::from_vcf_type("integer").is_err());
        assert_eq!(TypeCode::ByteArray.vcf_type(), None);
    }

    #[test]
    fn test_array_subtypes() {
        for code in ['c', 'C', 's', 'S', 'i', 'I', 'f'] {
            let subtype = ArraySubtype::from_code(code).unwrap();
            assert_eq!(subtype.code(), code);
        }
        assert!(ArraySubtype::from_code('d').is_none());
        assert!(!ArraySubtype::Float.is_integer());
        assert!(ArraySubtype::UInt8.is_integer());
    }

    #[test]
    fn test_display() {
        assert_eq!(TypeCode::Array(ArraySubtype::Int16).to_string(), "B:s");
        assert_eq!(TypeCode::Float.to_string(), "f");
    }
}
