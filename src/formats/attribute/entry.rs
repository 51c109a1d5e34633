//! A single typed attribute: key, declared type and raw value text.
//!
//! Parsing only splits text; values are decoded when a typed accessor asks
//! for them. Accessors check, in order:
//! 1. the stored type accepts the requested type ([`FormatError::WrongType`])
//! 2. the element count matches the resolved `Number` ([`FormatError::WrongCardinality`])
//! 3. every element decodes ([`FormatError::NotNumeric`], [`FormatError::MalformedToken`])

use crate::formats::attribute::array::{parse_subtype, ArrayValue};
use crate::formats::attribute::hex::HexBytes;
use crate::formats::attribute::number::{CardinalityContext, Number};
use crate::formats::attribute::types::{ArraySubtype, TypeCode};
use crate::formats::attribute::value::{
    decode_character, decode_flag, decode_float, decode_integer, DecodeError, Value,
};
use crate::formats::primitives::{FormatError, Result};

/// One key with its declared type and undecoded values.
///
/// For `B` arrays the values are the elements and the subtype lives in the
/// [`TypeCode`]. GFA/PAF scalar tags keep their value as a single string,
/// commas included. VCF values are split on `,`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    key: String,
    type_code: TypeCode,
    values: Vec<String>,
}

impl Attribute {
    /// Creates an attribute from already-encoded values.
    ///
    /// Neither the key nor the values are checked here; an
    /// [`AttributeSetBuilder`](super::AttributeSetBuilder) rejects keys no
    /// parser would accept when the attribute is added.
    pub fn new<I, S>(key: impl Into<String>, type_code: TypeCode, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Attribute {
            key: key.into(),
            type_code,
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Parses a GFA/PAF tag token `KEY:TYPE:VALUE`.
    ///
    /// The value is not decoded, so `NM:i:abc` parses and fails only when read
    /// as an integer.
    ///
    /// # Examples
    ///
    /// ```
    /// use biotag::formats::attribute::{Attribute, TypeCode};
    ///
    /// let tag = Attribute::from_tag_token("ZB:B:i,1,2")?;
    /// assert_eq!(tag.as_integers()?, vec![1, 2]);
    /// assert_eq!(tag.to_tag_token(), "ZB:B:i,1,2");
    ///
    /// assert!(Attribute::from_tag_token("NM:5").is_err());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_tag_token(token: &str) -> Result<Self> {
        let mut parts = token.splitn(3, ':');
        let (key, code, value) = match (parts.next(), parts.next(), parts.next()) {
            (Some(key), Some(code), Some(value)) => (key, code, value),
            _ => return Err(FormatError::malformed(token, "expected KEY:TYPE:VALUE")),
        };

        if !is_tag_key(key) {
            return Err(FormatError::malformed(token, "tag key must match [A-Za-z][A-Za-z0-9]"));
        }

        if code == "B" {
            let mut elements = value.split(',');
            let subtype_code = elements.next().unwrap_or_default();
            let subtype = parse_subtype(subtype_code)
                .map_err(|e| FormatError::malformed(token, e.to_string()))?;
            return Ok(Attribute::new(key, TypeCode::Array(subtype), elements));
        }

        let type_code = TypeCode::from_tag_code(code)
            .map_err(|_| FormatError::malformed(token, format!("unknown type code '{}'", code)))?;
        Ok(Attribute::new(key, type_code, [value]))
    }

    /// Parses one VCF INFO entry, `KEY=V1,V2` or a bare `KEY`.
    ///
    /// `declared` is the type from the header definition. Without one the
    /// value is typed `String`. A bare key is always a flag.
    pub fn from_info_entry(entry: &str, declared: Option<TypeCode>) -> Result<Self> {
        match entry.split_once('=') {
            None => {
                check_vcf_key(entry, entry)?;
                Ok(Attribute::new(entry, TypeCode::Flag, Vec::<String>::new()))
            }
            Some((key, value)) => {
                check_vcf_key(key, entry)?;
                let type_code = declared.unwrap_or(TypeCode::String);
                Ok(Attribute::new(key, type_code, value.split(',')))
            }
        }
    }

    /// Builds a VCF FORMAT attribute from one sample column value.
    pub fn from_format_value(key: &str, value: &str, declared: Option<TypeCode>) -> Result<Self> {
        check_vcf_key(key, key)?;
        Ok(Attribute::new(
            key,
            declared.unwrap_or(TypeCode::String),
            value.split(','),
        ))
    }

    /// Integer attribute with one value.
    pub fn integer(key: impl Into<String>, value: i64) -> Self {
        Attribute::new(key, TypeCode::Integer, [value.to_string()])
    }

    /// Integer attribute with a list of values.
    pub fn integers(key: impl Into<String>, values: &[i64]) -> Self {
        Attribute::new(key, TypeCode::Integer, values.iter().map(i64::to_string))
    }

    /// Float attribute with one value.
    pub fn float(key: impl Into<String>, value: f32) -> Self {
        Attribute::new(key, TypeCode::Float, [value.to_string()])
    }

    /// Float attribute with a list of values.
    pub fn floats(key: impl Into<String>, values: &[f32]) -> Self {
        Attribute::new(key, TypeCode::Float, values.iter().map(f32::to_string))
    }

    /// Character attribute.
    pub fn character(key: impl Into<String>, value: char) -> Self {
        Attribute::new(key, TypeCode::Character, [value.to_string()])
    }

    /// String attribute, stored as one value.
    pub fn string(key: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute::new(key, TypeCode::String, [value.into()])
    }

    /// Hex byte-array attribute.
    pub fn byte_array(key: impl Into<String>, value: &HexBytes) -> Self {
        Attribute::new(key, TypeCode::ByteArray, [value.as_str()])
    }

    /// `B` array attribute.
    pub fn array(key: impl Into<String>, value: &ArrayValue) -> Self {
        Attribute::new(key, TypeCode::Array(value.subtype()), value.element_strings())
    }

    /// Set flag.
    pub fn flag(key: impl Into<String>) -> Self {
        Attribute::new(key, TypeCode::Flag, Vec::<String>::new())
    }

    /// Two-letter tag or VCF field ID.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Declared type.
    pub fn type_code(&self) -> TypeCode {
        self.type_code
    }

    /// Raw values as stored.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// `true` for a bare flag.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Values joined by `,`, as they appear on the wire.
    pub fn raw_value(&self) -> String {
        self.values.join(",")
    }

    /// GFA/PAF form: `KEY:TYPE:VALUE`, arrays as `KEY:B:<subtype>,v1,...`.
    pub fn to_tag_token(&self) -> String {
        match self.type_code {
            TypeCode::Array(subtype) => {
                let mut token = format!("{}:B:{}", self.key, subtype.code());
                for value in &self.values {
                    token.push(',');
                    token.push_str(value);
                }
                token
            }
            other => format!("{}:{}:{}", self.key, other.tag_code(), self.raw_value()),
        }
    }

    /// VCF INFO form: `KEY=V1,V2`, or `KEY` for a bare flag.
    pub fn to_info_entry(&self) -> String {
        if self.type_code == TypeCode::Flag && self.values.is_empty() {
            self.key.clone()
        } else {
            format!("{}={}", self.key, self.raw_value())
        }
    }

    fn wrong_type(&self, requested: &str) -> FormatError {
        FormatError::WrongType {
            key: self.key.clone(),
            expected: requested.to_string(),
            actual: self.type_code.to_string(),
        }
    }

    fn check_count(&self, expected: Option<usize>) -> Result<()> {
        match expected {
            Some(expected) if expected != self.values.len() => Err(FormatError::WrongCardinality {
                key: self.key.clone(),
                expected,
                actual: self.values.len(),
            }),
            _ => Ok(()),
        }
    }

    fn decode_each<T>(&self, decode: fn(&str) -> std::result::Result<T, DecodeError>) -> Result<Vec<T>> {
        self.values
            .iter()
            .map(|raw| decode(raw).map_err(|e| e.for_key(&self.key, raw)))
            .collect()
    }

    fn decode_single<T>(&self, decode: fn(&str) -> std::result::Result<T, DecodeError>) -> Result<T> {
        self.check_count(Some(1))?;
        let raw = &self.values[0];
        decode(raw).map_err(|e| e.for_key(&self.key, raw))
    }

    fn check_integer(&self) -> Result<()> {
        match self.type_code {
            TypeCode::Integer => Ok(()),
            TypeCode::Array(subtype) if subtype.is_integer() => Ok(()),
            _ => Err(self.wrong_type("i")),
        }
    }

    fn check_float(&self) -> Result<()> {
        match self.type_code {
            TypeCode::Float | TypeCode::Array(ArraySubtype::Float) => Ok(()),
            _ => Err(self.wrong_type("f")),
        }
    }

    fn check_exact(&self, type_code: TypeCode) -> Result<()> {
        if self.type_code == type_code {
            Ok(())
        } else {
            Err(self.wrong_type(type_code.tag_code()))
        }
    }

    /// Single character value.
    pub fn as_character(&self) -> Result<char> {
        self.check_exact(TypeCode::Character)?;
        self.decode_single(decode_character)
    }

    /// Character values, any count.
    pub fn as_characters(&self) -> Result<Vec<char>> {
        self.as_characters_n(Number::Unbounded, &CardinalityContext::none())
    }

    /// Character values with a resolved count.
    pub fn as_characters_n(&self, number: Number, ctx: &CardinalityContext<'_>) -> Result<Vec<char>> {
        self.check_exact(TypeCode::Character)?;
        self.check_count(ctx.resolve(number)?)?;
        self.decode_each(decode_character)
    }

    /// Single integer value.
    pub fn as_integer(&self) -> Result<i64> {
        self.check_exact(TypeCode::Integer)?;
        self.decode_single(decode_integer)
    }

    /// Integer values of an `Integer` list or an integer `B` array.
    pub fn as_integers(&self) -> Result<Vec<i64>> {
        self.as_integers_n(Number::Unbounded, &CardinalityContext::none())
    }

    /// Integer values with a resolved count.
    pub fn as_integers_n(&self, number: Number, ctx: &CardinalityContext<'_>) -> Result<Vec<i64>> {
        self.check_integer()?;
        self.check_count(ctx.resolve(number)?)?;
        self.decode_each(decode_integer)
    }

    /// Single float value.
    pub fn as_float(&self) -> Result<f32> {
        self.check_exact(TypeCode::Float)?;
        self.decode_single(decode_float)
    }

    /// Float values of a `Float` list or an `f` array.
    pub fn as_floats(&self) -> Result<Vec<f32>> {
        self.as_floats_n(Number::Unbounded, &CardinalityContext::none())
    }

    /// Float values with a resolved count.
    pub fn as_floats_n(&self, number: Number, ctx: &CardinalityContext<'_>) -> Result<Vec<f32>> {
        self.check_float()?;
        self.check_count(ctx.resolve(number)?)?;
        self.decode_each(decode_float)
    }

    /// Single string value.
    pub fn as_string(&self) -> Result<&str> {
        self.check_exact(TypeCode::String)?;
        self.check_count(Some(1))?;
        Ok(&self.values[0])
    }

    /// String values, any count.
    pub fn as_strings(&self) -> Result<Vec<&str>> {
        self.as_strings_n(Number::Unbounded, &CardinalityContext::none())
    }

    /// String values with a resolved count.
    pub fn as_strings_n(&self, number: Number, ctx: &CardinalityContext<'_>) -> Result<Vec<&str>> {
        self.check_exact(TypeCode::String)?;
        self.check_count(ctx.resolve(number)?)?;
        Ok(self.values.iter().map(String::as_str).collect())
    }

    /// Hex byte-array value.
    pub fn as_byte_array(&self) -> Result<HexBytes> {
        self.check_exact(TypeCode::ByteArray)?;
        self.decode_single(HexBytes::parse)
    }

    /// Flag state: a bare flag is set, otherwise the stored text decides.
    pub fn as_flag(&self) -> Result<bool> {
        self.check_exact(TypeCode::Flag)?;
        match self.values.as_slice() {
            [] => Ok(true),
            [raw] => decode_flag(raw).map_err(|e| e.for_key(&self.key, raw)),
            _ => Err(FormatError::WrongCardinality {
                key: self.key.clone(),
                expected: 1,
                actual: self.values.len(),
            }),
        }
    }

    /// `B` array value.
    pub fn as_array(&self) -> Result<ArrayValue> {
        match self.type_code {
            TypeCode::Array(subtype) => ArrayValue::from_elements(subtype, self.values.as_slice())
                .map_err(|e| e.for_key(&self.key, &self.raw_value())),
            _ => Err(self.wrong_type("B")),
        }
    }

    /// Decodes every value according to the declared type.
    ///
    /// A single value decodes to a scalar, several to [`Value::List`].
    pub fn decode(&self) -> Result<Value> {
        match self.type_code {
            TypeCode::Array(_) => self.as_array().map(Value::Array),
            TypeCode::Flag => self.as_flag().map(Value::Flag),
            type_code => {
                let mut values = self
                    .values
                    .iter()
                    .map(|raw| Value::decode(type_code, raw).map_err(|e| e.for_key(&self.key, raw)))
                    .collect::<Result<Vec<_>>>()?;
                if values.len() == 1 {
                    Ok(values.remove(0))
                } else {
                    Ok(Value::List(values))
                }
            }
        }
    }
}

/// `true` for a two-character GFA/PAF tag key `[A-Za-z][A-Za-z0-9]`.
pub fn is_tag_key(key: &str) -> bool {
    let bytes = key.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1].is_ascii_alphanumeric()
}

pub(crate) fn check_vcf_key(key: &str, entry: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if valid {
        Ok(())
    } else {
        Err(FormatError::malformed(entry, "invalid key"))
    }
}
