//! biotag: typed attributes for PAF, GFA and VCF records
//!
//! # Overview
//!
//! PAF and GFA carry optional `KEY:TYPE:VALUE` tags; VCF carries INFO
//! entries typed by header definitions and per-sample FORMAT values whose
//! element counts depend on the record's alleles. biotag parses all of them
//! into one attribute model with typed, cardinality-checked access, and
//! writes records back unchanged.
//!
//! ## Key Features
//!
//! - **Typed access**: missing key, wrong type and wrong count are distinct errors
//! - **Cardinality**: `Number=A/R/G` resolved per record and per sample
//! - **Lazy decoding**: values are decoded on access
//! - **Round trip**: unmodified records serialize byte-for-byte
//! - **Compressed I/O**: gzip/bgzip input; plain, gzip or parallel bgzip output
//!
//! ## Quick Start
//!
//! ```
//! use biotag::formats::gfa1::Gfa1Record;
//! use biotag::formats::TabDelimitedRecord;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let record = Gfa1Record::from_line("S\t11\tACCTT\tRC:i:123\tSH:H:0A0B")?;
//! if let Gfa1Record::Segment(segment) = &record {
//!     assert_eq!(segment.read_count()?, 123);
//!     assert_eq!(segment.checksum()?.bytes(), &[0x0A, 0x0B]);
//! }
//! assert_eq!(record.to_line(), "S\t11\tACCTT\tRC:i:123\tSH:H:0A0B");
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`formats`]: attribute engine, record models, parsers and writers
//! - [`io`]: output sinks and compression
//! - [`error`]: writer errors

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod formats;
pub mod io;

// Re-export commonly used types
pub use error::{BiotagError, Result};
pub use formats::attribute::{AttributeSet, Attributed};
pub use formats::primitives::FormatError;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
