//! Byte arrays written as hex text (`H` tags).
//!
//! The text as read is kept alongside the decoded bytes so that a value
//! re-encodes with its original letter case.

use crate::formats::attribute::value::DecodeError;
use std::fmt;

/// A validated even-length hex string and the bytes it encodes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HexBytes {
    text: String,
    bytes: Vec<u8>,
}

impl HexBytes {
    /// Decodes hex text, accepting either letter case.
    ///
    /// # Examples
    ///
    /// ```
    /// use biotag::formats::attribute::HexBytes;
    ///
    /// let hex = HexBytes::parse("0a1B")?;
    /// assert_eq!(hex.bytes(), &[0x0a, 0x1b]);
    /// assert_eq!(hex.as_str(), "0a1B");
    ///
    /// assert!(HexBytes::parse("abc").is_err());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn parse(text: &str) -> Result<Self, DecodeError> {
        let digits = text.as_bytes();
        if digits.len() % 2 != 0 {
            return Err(DecodeError::OddHexLength(digits.len()));
        }

        let bytes = digits
            .chunks_exact(2)
            .map(|pair| Ok((nibble(pair[0])? << 4) | nibble(pair[1])?))
            .collect::<Result<Vec<u8>, DecodeError>>()?;

        Ok(HexBytes {
            text: text.to_string(),
            bytes,
        })
    }

    /// Encodes bytes as uppercase hex.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        const DIGITS: &[u8; 16] = b"0123456789ABCDEF";

        let mut text = String::with_capacity(bytes.len() * 2);
        for &b in bytes {
            text.push(DIGITS[(b >> 4) as usize] as char);
            text.push(DIGITS[(b & 0x0f) as usize] as char);
        }

        HexBytes {
            text,
            bytes: bytes.to_vec(),
        }
    }

    /// Decoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Hex text as read (or as generated by [`HexBytes::from_bytes`]).
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Consumes the value, returning the bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl fmt::Display for HexBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

fn nibble(digit: u8) -> Result<u8, DecodeError> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'a'..=b'f' => Ok(digit - b'a' + 10),
        b'A'..=b'F' => Ok(digit - b'A' + 10),
        _ => Err(DecodeError::InvalidHexDigit(digit as char)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bytes() {
        let hex = HexBytes::parse("010203").unwrap();
        assert_eq!(hex.bytes(), &[0x01, 0x02, 0x03]);
        assert_eq!(hex.to_string(), "010203");
    }

    #[test]
    fn test_case_preserved() {
        assert_eq!(HexBytes::parse("ff").unwrap().as_str(), "ff");
        assert_eq!(HexBytes::parse("FF").unwrap().as_str(), "FF");
        assert_eq!(HexBytes::parse("ff").unwrap().bytes(), HexBytes::parse("FF").unwrap().bytes());
    }

    #[test]
    fn test_empty() {
        let hex = HexBytes::parse("").unwrap();
        assert!(hex.bytes().is_empty());
    }

    #[test]
    fn test_invalid() {
        assert_eq!(HexBytes::parse("123"), Err(DecodeError::OddHexLength(3)));
        assert_eq!(HexBytes::parse("0g"), Err(DecodeError::InvalidHexDigit('g')));
    }

    #[test]
    fn test_from_bytes_uppercase() {
        let hex = HexBytes::from_bytes(&[0xde, 0xad, 0x01]);
        assert_eq!(hex.as_str(), "DEAD01");
    }
}
