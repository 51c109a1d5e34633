//! Record models, parsers and writers for attribute-carrying formats.
//!
//! - **PAF**: pairwise alignments with GFA-style tags
//! - **GFA 1 / GFA 2**: assembly and variation graphs
//! - **VCF**: variants with header-typed INFO and per-sample FORMAT values
//!
//! Every format stores its optional values in an
//! [`AttributeSet`](attribute::AttributeSet) and exposes reserved keys as
//! typed accessors (`contains_k`, `k`, `k_opt`). Values are decoded on
//! access, so parsing a record never fails because of an attribute nobody
//! reads.
//!
//! # Module Organization
//!
//! - [`attribute`]: the typed-attribute engine
//! - [`primitives`]: errors, field utilities, the tab-delimited parser
//! - [`paf`], [`gfa1`], [`gfa2`], [`vcf`]: record models
//! - [`writer`], [`vcf_writer`]: compressed streaming output
//!
//! # Streaming
//!
//! ```rust,ignore
//! for record in PafParser::from_gzip_path("alignments.paf.gz")? {
//!     let record = record?;
//!     if record.alignment_type()? == 'P' { /* ... */ }
//! }
//! ```

pub mod attribute;
pub mod gfa1;
pub mod gfa2;
pub mod paf;
pub mod primitives;
pub mod vcf;
pub mod vcf_writer;
pub mod writer;

// Re-export commonly used types
pub use attribute::{Attribute, AttributeSet, AttributeSetBuilder, Attributed, Number, TypeCode};
pub use primitives::{FormatError, Orientation, Reference, TabDelimitedParser, TabDelimitedRecord};
pub use vcf::{VcfHeader, VcfParser, VcfRecord};
pub use vcf_writer::VcfWriter;
pub use writer::{Gfa1Writer, Gfa2Writer, PafWriter, RecordWriter};
