//! Orientation of segments and alignments.
//!
//! GFA links, containments and paths orient each segment with `+` or `-`;
//! PAF uses the same two symbols for the relative strand of query and target.
//! GFA2 writes an orientation as a suffix on an identifier (`utg12+`), which
//! [`Reference`] models.
//!
//! # Examples
//!
//! ```
//! use biotag::formats::primitives::{Orientation, Reference};
//! use std::str::FromStr;
//!
//! let reference = Reference::from_str("utg12-")?;
//! assert_eq!(reference.id, "utg12");
//! assert_eq!(reference.orientation, Orientation::Reverse);
//! assert_eq!(reference.to_string(), "utg12-");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::formats::primitives::{FormatError, Result};
use std::fmt;
use std::str::FromStr;

/// Orientation of a segment or alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Forward (+)
    Forward,

    /// Reverse complement (-)
    Reverse,
}

impl Orientation {
    /// Returns the opposite orientation.
    pub fn flip(self) -> Self {
        match self {
            Orientation::Forward => Orientation::Reverse,
            Orientation::Reverse => Orientation::Forward,
        }
    }

    /// Symbol used on the wire.
    pub fn symbol(self) -> char {
        match self {
            Orientation::Forward => '+',
            Orientation::Reverse => '-',
        }
    }

    fn from_symbol(c: char) -> Option<Self> {
        match c {
            '+' => Some(Orientation::Forward),
            '-' => Some(Orientation::Reverse),
            _ => None,
        }
    }
}

impl FromStr for Orientation {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        match (chars.next().and_then(Orientation::from_symbol), chars.next()) {
            (Some(orientation), None) => Ok(orientation),
            _ => Err(FormatError::InvalidOrientation(s.to_string())),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// An identifier with an orientation suffix, e.g. `seg1+`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    /// Referenced identifier.
    pub id: String,

    /// Orientation suffix.
    pub orientation: Orientation,
}

impl Reference {
    /// Creates a reference.
    pub fn new(id: impl Into<String>, orientation: Orientation) -> Self {
        Reference {
            id: id.into(),
            orientation,
        }
    }
}

impl FromStr for Reference {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self> {
        let orientation = s
            .chars()
            .last()
            .and_then(Orientation::from_symbol)
            .ok_or_else(|| FormatError::InvalidOrientation(s.to_string()))?;
        let id = &s[..s.len() - 1];
        if id.is_empty() {
            return Err(FormatError::malformed(s, "reference has no identifier"));
        }
        Ok(Reference::new(id, orientation))
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.id, self.orientation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_orientation_from_str() {
        assert_eq!(Orientation::from_str("+").unwrap(), Orientation::Forward);
        assert_eq!(Orientation::from_str("-").unwrap(), Orientation::Reverse);

        assert!(Orientation::from_str(".").is_err());
        assert!(Orientation::from_str("++").is_err());
        assert!(Orientation::from_str("").is_err());
    }

    #[test]
    fn test_orientation_display_and_flip() {
        assert_eq!(Orientation::Forward.to_string(), "+");
        assert_eq!(Orientation::Reverse.to_string(), "-");
        assert_eq!(Orientation::Reverse.flip(), Orientation::Forward);
    }

    #[test]
    fn test_reference_parse() {
        let reference = Reference::from_str("11+").unwrap();
        assert_eq!(reference, Reference::new("11", Orientation::Forward));

        assert!(Reference::from_str("11").is_err());
        assert!(Reference::from_str("+").is_err());
    }

    #[test]
    fn test_reference_id_may_contain_symbols() {
        let reference = Reference::from_str("a-b+").unwrap();
        assert_eq!(reference.id, "a-b");
        assert_eq!(reference.orientation, Orientation::Forward);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_reference_display_parses_back(id in "[A-Za-z0-9_.]{1,12}", forward in any::<bool>()) {
            let orientation = if forward { Orientation::Forward } else { Orientation::Reverse };
            let reference = Reference::new(id, orientation);
            let parsed = Reference::from_str(&reference.to_string()).unwrap();
            prop_assert_eq!(parsed, reference);
        }
    }
}
