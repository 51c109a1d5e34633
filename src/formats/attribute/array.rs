//! Array codec for `B` tags: `B:<subtype>,v1,v2,...`.
//!
//! Every integer subtype decodes to `i64` and `f` decodes to `f32`. The
//! subtype character is kept for re-encoding but elements are not checked
//! against its range: `B:c,300` decodes to `[300]`.

use crate::formats::attribute::types::ArraySubtype;
use crate::formats::attribute::value::{decode_float, decode_integer, DecodeError};

/// A decoded `B` array.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayValue {
    /// Elements of an integer subtype.
    Integers {
        /// Declared subtype, replayed on encode.
        subtype: ArraySubtype,
        /// Widened elements.
        values: Vec<i64>,
    },
    /// Elements of subtype `f`.
    Floats(Vec<f32>),
}

impl ArrayValue {
    /// Decodes `subtype[,element...]`.
    ///
    /// # Examples
    ///
    /// ```
    /// use biotag::formats::attribute::{ArraySubtype, ArrayValue};
    ///
    /// let array = ArrayValue::decode("i,1,2")?;
    /// assert_eq!(array, ArrayValue::Integers { subtype: ArraySubtype::Int32, values: vec![1, 2] });
    /// assert_eq!(array.encode(), "i,1,2");
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn decode(raw: &str) -> Result<ArrayValue, DecodeError> {
        let mut parts = raw.split(',');
        let code = parts.next().unwrap_or_default();
        let subtype = parse_subtype(code)?;
        let elements: Vec<&str> = parts.collect();
        Self::from_elements(subtype, &elements)
    }

    /// Decodes already-split elements of a known subtype.
    pub fn from_elements<S: AsRef<str>>(subtype: ArraySubtype, elements: &[S]) -> Result<ArrayValue, DecodeError> {
        if subtype.is_integer() {
            let values = elements
                .iter()
                .map(|e| decode_integer(e.as_ref()))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ArrayValue::Integers { subtype, values })
        } else {
            let values = elements
                .iter()
                .map(|e| decode_float(e.as_ref()))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ArrayValue::Floats(values))
        }
    }

    /// Declared subtype.
    pub fn subtype(&self) -> ArraySubtype {
        match self {
            ArrayValue::Integers { subtype, .. } => *subtype,
            ArrayValue::Floats(_) => ArraySubtype::Float,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            ArrayValue::Integers { values, .. } => values.len(),
            ArrayValue::Floats(values) => values.len(),
        }
    }

    /// `true` if the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element text, without the subtype.
    pub fn element_strings(&self) -> Vec<String> {
        match self {
            ArrayValue::Integers { values, .. } => values.iter().map(i64::to_string).collect(),
            ArrayValue::Floats(values) => values.iter().map(f32::to_string).collect(),
        }
    }

    /// Encodes as `subtype[,element...]`.
    pub fn encode(&self) -> String {
        let mut text = self.subtype().code().to_string();
        for element in self.element_strings() {
            text.push(',');
            text.push_str(&element);
        }
        text
    }
}

pub(crate) fn parse_subtype(code: &str) -> Result<ArraySubtype, DecodeError> {
    let mut chars = code.chars();
    match (chars.next().and_then(ArraySubtype::from_code), chars.next()) {
        (Some(subtype), None) => Ok(subtype),
        _ => Err(DecodeError::InvalidSubtype(code.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_subtypes_widen() {
        for code in ["c", "C", "s", "S", "i", "I"] {
            let array = ArrayValue::decode(&format!("{},-1,2", code)).unwrap();
            match array {
                ArrayValue::Integers { values, .. } => assert_eq!(values, vec![-1, 2]),
                other => panic!("unexpected: {:?}", other),
            }
        }
    }

    #[test]
    fn test_width_not_enforced() {
        let array = ArrayValue::decode("C,300,-5").unwrap();
        assert_eq!(
            array,
            ArrayValue::Integers { subtype: ArraySubtype::UInt8, values: vec![300, -5] }
        );
        assert_eq!(array.encode(), "C,300,-5");
    }

    #[test]
    fn test_floats() {
        let array = ArrayValue::decode("f,0.5,1.25").unwrap();
        assert_eq!(array, ArrayValue::Floats(vec![0.5, 1.25]));
        assert_eq!(array.subtype(), ArraySubtype::Float);
    }

    #[test]
    fn test_empty_array() {
        let array = ArrayValue::decode("s").unwrap();
        assert!(array.is_empty());
        assert_eq!(array.encode(), "s");
    }

    #[test]
    fn test_invalid() {
        assert_eq!(ArrayValue::decode("x,1"), Err(DecodeError::InvalidSubtype("x".to_string())));
        assert_eq!(ArrayValue::decode(""), Err(DecodeError::InvalidSubtype(String::new())));
        assert_eq!(ArrayValue::decode("ii,1"), Err(DecodeError::InvalidSubtype("ii".to_string())));
        assert_eq!(ArrayValue::decode("i,1,x"), Err(DecodeError::NotNumeric("x".to_string())));
        assert_eq!(ArrayValue::decode("i,1.5"), Err(DecodeError::NotNumeric("1.5".to_string())));
    }
}
