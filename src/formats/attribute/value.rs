//! Scalar codec: one text token to and from a typed [`Value`].
//!
//! Decoding is keyed by the attribute's [`TypeCode`]. Encoding writes the
//! canonical text for the value:
//! - Character, String and hex values re-encode byte for byte
//! - Integer and Float values re-encode from the parsed number, so `3.40`
//!   comes back as `3.4`; the number itself is unchanged
//!
//! Attribute sets keep the raw text of parsed tokens, so an unmodified
//! record serializes exactly as it was read regardless of this rule.

use crate::formats::attribute::array::ArrayValue;
use crate::formats::attribute::hex::HexBytes;
use crate::formats::attribute::types::TypeCode;
use crate::formats::primitives::FormatError;
use thiserror::Error;

/// Why a token could not be decoded as its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// A Character value was not exactly one character long.
    #[error("expected exactly one character, found {0}")]
    WrongLength(usize),

    /// Integer or Float text failed to parse.
    #[error("'{0}' is not numeric")]
    NotNumeric(String),

    /// Flag text other than `true` or `false`.
    #[error("'{0}' is not a boolean")]
    NotBoolean(String),

    /// Hex text with an odd number of digits.
    #[error("hex string has odd length {0}")]
    OddHexLength(usize),

    /// Non-hex character in hex text.
    #[error("invalid hex digit '{0}'")]
    InvalidHexDigit(char),

    /// Array without a valid subtype character.
    #[error("invalid array subtype '{0}'")]
    InvalidSubtype(String),
}

impl DecodeError {
    /// Attaches the attribute key, producing the crate-wide error.
    pub fn for_key(self, key: &str, raw: &str) -> FormatError {
        match self {
            DecodeError::NotNumeric(value) => FormatError::NotNumeric {
                key: key.to_string(),
                value,
            },
            other => FormatError::malformed(format!("{}={}", key, raw), other.to_string()),
        }
    }
}

/// A decoded attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Single character.
    Character(char),
    /// Flag state.
    Flag(bool),
    /// Signed integer.
    Integer(i64),
    /// Single-precision float.
    Float(f32),
    /// Free text.
    String(String),
    /// Hex-encoded bytes.
    ByteArray(HexBytes),
    /// `B` array.
    Array(ArrayValue),
    /// Comma-separated VCF values sharing one type.
    List(Vec<Value>),
}

impl Value {
    /// Decodes one token.
    ///
    /// For [`TypeCode::Array`] the token is everything after `B:`, i.e. the
    /// subtype character followed by the comma-separated elements. For
    /// [`TypeCode::Flag`] an empty token means the flag is set.
    ///
    /// # Examples
    ///
    /// ```
    /// use biotag::formats::attribute::{TypeCode, Value};
    ///
    /// assert_eq!(Value::decode(TypeCode::Integer, "42")?, Value::Integer(42));
    /// assert_eq!(Value::decode(TypeCode::Character, "P")?, Value::Character('P'));
    /// assert!(Value::decode(TypeCode::Character, "PP").is_err());
    /// assert_eq!(Value::decode(TypeCode::Float, "3.40")?.encode(), "3.4");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn decode(type_code: TypeCode, raw: &str) -> Result<Value, DecodeError> {
        match type_code {
            TypeCode::Character => decode_character(raw).map(Value::Character),
            TypeCode::Integer => decode_integer(raw).map(Value::Integer),
            TypeCode::Float => decode_float(raw).map(Value::Float),
            TypeCode::String => Ok(Value::String(raw.to_string())),
            TypeCode::ByteArray => HexBytes::parse(raw).map(Value::ByteArray),
            TypeCode::Array(_) => ArrayValue::decode(raw).map(Value::Array),
            TypeCode::Flag => decode_flag(raw).map(Value::Flag),
        }
    }

    /// Encodes the value as it appears after `KEY:TYPE:` or `KEY=`.
    pub fn encode(&self) -> String {
        match self {
            Value::Character(c) => c.to_string(),
            Value::Flag(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::ByteArray(hex) => hex.as_str().to_string(),
            Value::Array(array) => array.encode(),
            Value::List(values) => values.iter().map(Value::encode).collect::<Vec<_>>().join(","),
        }
    }
}

pub(crate) fn decode_character(raw: &str) -> Result<char, DecodeError> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(DecodeError::WrongLength(raw.chars().count())),
    }
}

pub(crate) fn decode_integer(raw: &str) -> Result<i64, DecodeError> {
    raw.parse::<i64>()
        .map_err(|_| DecodeError::NotNumeric(raw.to_string()))
}

pub(crate) fn decode_float(raw: &str) -> Result<f32, DecodeError> {
    raw.parse::<f32>()
        .map_err(|_| DecodeError::NotNumeric(raw.to_string()))
}

pub(crate) fn decode_flag(raw: &str) -> Result<bool, DecodeError> {
    match raw {
        "" | "true" => Ok(true),
        "false" => Ok(false),
        other => Err(DecodeError::NotBoolean(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::attribute::types::ArraySubtype;

    #[test]
    fn test_character() {
        assert_eq!(Value::decode(TypeCode::Character, "+").unwrap(), Value::Character('+'));
        assert_eq!(Value::decode(TypeCode::Character, ""), Err(DecodeError::WrongLength(0)));
        assert_eq!(Value::decode(TypeCode::Character, "ab"), Err(DecodeError::WrongLength(2)));
    }

    #[test]
    fn test_integer() {
        assert_eq!(Value::decode(TypeCode::Integer, "-17").unwrap(), Value::Integer(-17));
        assert_eq!(
            Value::decode(TypeCode::Integer, "1.5"),
            Err(DecodeError::NotNumeric("1.5".to_string()))
        );
    }

    #[test]
    fn test_float_numeric_equivalence() {
        let value = Value::decode(TypeCode::Float, "3.40").unwrap();
        assert_eq!(value, Value::Float(3.4));
        assert_eq!(value.encode(), "3.4");
        assert_eq!(Value::decode(TypeCode::Float, "1e-3").unwrap(), Value::Float(0.001));
    }

    #[test]
    fn test_string_verbatim() {
        let raw = "chr1,100,+,50M;";
        assert_eq!(Value::decode(TypeCode::String, raw).unwrap().encode(), raw);
    }

    #[test]
    fn test_flag() {
        assert_eq!(Value::decode(TypeCode::Flag, "").unwrap(), Value::Flag(true));
        assert_eq!(Value::decode(TypeCode::Flag, "false").unwrap(), Value::Flag(false));
        assert!(Value::decode(TypeCode::Flag, "yes").is_err());
    }

    #[test]
    fn test_byte_array() {
        match Value::decode(TypeCode::ByteArray, "010203").unwrap() {
            Value::ByteArray(hex) => assert_eq!(hex.bytes(), &[1, 2, 3]),
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(Value::decode(TypeCode::ByteArray, "010"), Err(DecodeError::OddHexLength(3)));
    }

    #[test]
    fn test_array() {
        let value = Value::decode(TypeCode::Array(ArraySubtype::Int32), "i,1,2").unwrap();
        assert_eq!(value.encode(), "i,1,2");
    }

    #[test]
    fn test_list_encode() {
        let list = Value::List(vec![Value::Integer(1), Value::Integer(2)]);
        assert_eq!(list.encode(), "1,2");
    }

    #[test]
    fn test_for_key_mapping() {
        let err = DecodeError::NotNumeric("x".to_string()).for_key("DP", "x");
        assert!(matches!(err, FormatError::NotNumeric { ref key, .. } if key == "DP"));

        let err = DecodeError::OddHexLength(1).for_key("SH", "0");
        assert!(matches!(err, FormatError::MalformedToken { .. }));
    }
}
