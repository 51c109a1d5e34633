//! Output plumbing: sinks and compressed writers.
//!
//! Input needs no module of its own; parsers open plain files directly and
//! compressed ones through flate2's `MultiGzDecoder`.

pub mod compression;
pub mod sink;

pub use compression::CompressedWriter;
pub use sink::DataSink;
