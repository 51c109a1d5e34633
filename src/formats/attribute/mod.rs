//! Typed attributes shared by PAF, GFA and VCF records.
//!
//! GFA and PAF carry optional tags as `KEY:TYPE:VALUE`; VCF carries INFO
//! entries as `KEY=VALUE` and per-sample values aligned to a FORMAT key
//! list. This module parses both into one model:
//! - [`TypeCode`] and [`ArraySubtype`]: the closed set of declared types
//! - [`Value`], [`HexBytes`], [`ArrayValue`]: decoded values
//! - [`Number`] and [`CardinalityContext`]: expected element counts
//! - [`Attribute`], [`AttributeSet`], [`AttributeSetBuilder`]: storage
//! - [`Attributed`]: the hook behind reserved-key accessors on records
//!
//! Values are decoded lazily. A record with an attribute nobody reads
//! parses even if that attribute is malformed.
//!
//! # Example
//!
//! ```
//! use biotag::formats::attribute::{AttributeSet, AttributeStyle};
//!
//! let tags = AttributeSet::from_tag_tokens(["NM:i:2", "ZB:B:i,1,2", "ZH:H:010203"])?;
//!
//! assert_eq!(tags.get_integer("NM")?, 2);
//! assert_eq!(tags.get_integers("ZB")?, vec![1, 2]);
//! assert_eq!(tags.get_byte_array("ZH")?.bytes(), &[1, 2, 3]);
//! assert_eq!(tags.to_text(AttributeStyle::Tag), "NM:i:2\tZB:B:i,1,2\tZH:H:010203");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod accessors;
pub mod array;
pub mod entry;
pub mod hex;
pub mod number;
pub mod set;
pub mod types;
pub mod value;

pub use accessors::Attributed;
pub(crate) use accessors::{reserved_key, tagged_records};
pub use array::ArrayValue;
pub use entry::{is_tag_key, Attribute};
pub use hex::HexBytes;
pub use number::{
    binomial, genotype_alleles, number_a, number_g, number_r, ploidy, CardinalityContext, Number,
};
pub use set::{AttributeSet, AttributeSetBuilder, AttributeStyle};
pub use types::{ArraySubtype, TypeCode};
pub use value::{DecodeError, Value};
