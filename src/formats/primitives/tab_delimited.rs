//! Generic tab-delimited record parsing.
//!
//! PAF, GFA1, GFA2 and VCF data lines share the same shape:
//! - Tab-delimited positional columns
//! - Optional trailing typed attributes
//! - Comment or header lines starting with `#`
//!
//! # Design
//!
//! [`TabDelimitedRecord`] is implemented by every record type.
//! [`TabDelimitedParser`] streams any such type from a reader, one line at a
//! time, and never holds more than the current line in memory.
//!
//! # Examples
//!
//! ```
//! use biotag::formats::primitives::{TabDelimitedParser, Result};
//! use biotag::formats::paf::PafRecord;
//!
//! let data = "read1\t100\t0\t90\t+\tchr1\t1000\t10\t100\t85\t90\t60\tNM:i:5\n";
//! let parser = TabDelimitedParser::<_, PafRecord>::new(data.as_bytes());
//!
//! let records: Vec<_> = parser.collect::<Result<_>>()?;
//! assert_eq!(records.len(), 1);
//! assert_eq!(records[0].nm()?, 5);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::formats::primitives::Result;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::marker::PhantomData;
use std::path::Path;

/// Trait for records parsed from, and serialized to, one tab-delimited line.
pub trait TabDelimitedRecord: Sized {
    /// Parse a record from a line without its trailing newline.
    ///
    /// # Errors
    ///
    /// Returns an error if the positional columns are malformed or an
    /// attribute token cannot be split into key, type and value. Attribute
    /// values themselves are not decoded here.
    fn from_line(line: &str) -> Result<Self>;

    /// Serialize this record to a line without a trailing newline.
    fn to_line(&self) -> String;

    /// Minimum number of tab-delimited columns, if fixed.
    fn expected_fields() -> Option<usize> {
        None
    }
}

/// Generic streaming parser for tab-delimited formats.
///
/// Skips empty lines and lines starting with `#`. A line that fails to
/// parse yields `Some(Err(_))`; iteration may continue past it, leaving the
/// skip-or-abort decision to the caller.
///
/// # Examples
///
/// ```no_run
/// use biotag::formats::primitives::{TabDelimitedParser, Result};
/// use biotag::formats::paf::PafRecord;
///
/// # fn main() -> Result<()> {
/// let parser = TabDelimitedParser::<_, PafRecord>::from_gzip_path("alignments.paf.gz")?;
///
/// for record in parser {
///     let record = record?;
///     println!("{} -> {}", record.query_name, record.target_name);
/// }
/// # Ok(())
/// # }
/// ```
pub struct TabDelimitedParser<R: Read, T: TabDelimitedRecord> {
    reader: BufReader<R>,
    line_buf: String,
    line_number: usize,
    _phantom: PhantomData<T>,
}

impl<R: Read, T: TabDelimitedRecord> TabDelimitedParser<R, T> {
    /// Creates a new parser from a reader.
    pub fn new(reader: R) -> Self {
        TabDelimitedParser {
            reader: BufReader::new(reader),
            line_buf: String::with_capacity(1024),
            line_number: 0,
            _phantom: PhantomData,
        }
    }

    /// Returns the current line number (1-based).
    pub fn line_number(&self) -> usize {
        self.line_number
    }
}

impl<T: TabDelimitedRecord> TabDelimitedParser<File, T> {
    /// Creates a parser from a file path.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(file))
    }
}

impl<T: TabDelimitedRecord> TabDelimitedParser<MultiGzDecoder<File>, T> {
    /// Creates a parser from a gzip or bgzip compressed file.
    pub fn from_gzip_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(MultiGzDecoder::new(file)))
    }
}

impl<R: Read, T: TabDelimitedRecord> Iterator for TabDelimitedParser<R, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.line_buf.clear();

            match self.reader.read_line(&mut self.line_buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_number += 1;

                    // Only strip the line terminator; trailing tabs are data.
                    let line = self.line_buf.trim_end_matches(['\n', '\r']);

                    if line.is_empty() {
                        continue;
                    }

                    if line.starts_with('#') {
                        log::trace!("skipping comment at line {}", self.line_number);
                        continue;
                    }

                    let parsed = T::from_line(line);
                    if let Err(e) = &parsed {
                        log::debug!("line {}: {}", self.line_number, e);
                    }
                    return Some(parsed);
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}
