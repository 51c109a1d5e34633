//! Output destinations for record writers.
//!
//! # Example
//!
//! ```
//! use biotag::io::DataSink;
//!
//! assert!(DataSink::from_path("graph.gfa.gz").is_compressed());
//! assert!(!DataSink::from_path("calls.vcf").is_compressed());
//! assert!(!DataSink::stdout().is_compressed());
//! ```

use std::path::{Path, PathBuf};

/// Where a writer sends its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSink {
    /// A local file; the extension selects compression (`.gz` gzip,
    /// `.bgz` bgzip, anything else plain).
    Local(PathBuf),
    /// Standard output, always uncompressed.
    Stdout,
}

impl DataSink {
    /// File sink; the extension picks compression.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        Self::Local(path.as_ref().to_path_buf())
    }

    /// Standard output.
    pub fn stdout() -> Self {
        Self::Stdout
    }

    pub(crate) fn extension(&self) -> Option<&str> {
        match self {
            Self::Local(path) => path.extension().and_then(|s| s.to_str()),
            Self::Stdout => None,
        }
    }

    /// `true` if output will be gzip or bgzip compressed.
    pub fn is_compressed(&self) -> bool {
        matches!(self.extension(), Some("gz") | Some("bgz"))
    }
}
