//! Streaming writer for tab-delimited records.
//!
//! One writer serves every [`TabDelimitedRecord`]: each record is written
//! as its `to_line()` plus a newline, compressed according to the
//! [`DataSink`].
//!
//! # Example
//!
//! ```no_run
//! use biotag::formats::paf::PafRecord;
//! use biotag::formats::primitives::TabDelimitedRecord;
//! use biotag::formats::writer::PafWriter;
//!
//! # fn main() -> biotag::Result<()> {
//! let mut writer = PafWriter::create("alignments.paf.gz")?;
//! let record = PafRecord::from_line("q\t100\t0\t100\t+\tt\t500\t10\t110\t98\t100\t60\tNM:i:2")?;
//! writer.write_record(&record)?;
//! writer.finish()?;
//! # Ok(())
//! # }
//! ```

use crate::error::{BiotagError, Result};
use crate::formats::gfa1::Gfa1Record;
use crate::formats::gfa2::Gfa2Record;
use crate::formats::paf::PafRecord;
use crate::formats::primitives::TabDelimitedRecord;
use crate::io::compression::CompressedWriter;
use crate::io::sink::DataSink;
use std::io::Write;
use std::marker::PhantomData;
use std::path::Path;

/// Writer for any [`TabDelimitedRecord`].
pub struct RecordWriter<T: TabDelimitedRecord> {
    writer: CompressedWriter,
    records_written: usize,
    _phantom: PhantomData<T>,
}

/// PAF writer.
pub type PafWriter = RecordWriter<PafRecord>;

/// GFA1 writer.
pub type Gfa1Writer = RecordWriter<Gfa1Record>;

/// GFA2 writer.
pub type Gfa2Writer = RecordWriter<Gfa2Record>;

impl<T: TabDelimitedRecord> RecordWriter<T> {
    /// Writer for `sink`, compressed by its extension.
    pub fn new(sink: DataSink) -> Result<Self> {
        Ok(Self {
            writer: CompressedWriter::new(sink)?,
            records_written: 0,
            _phantom: PhantomData,
        })
    }

    /// Creates a writer for `path`; `.gz` and `.bgz` select compression.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(DataSink::from_path(path))
    }

    /// Uncompressed writer to standard output.
    pub fn stdout() -> Result<Self> {
        Self::new(DataSink::stdout())
    }

    /// Writes a `#` comment line.
    ///
    /// # Errors
    ///
    /// [`BiotagError::InvalidInput`] if `text` contains a newline.
    pub fn write_comment(&mut self, text: &str) -> Result<()> {
        if text.contains(['\n', '\r']) {
            return Err(BiotagError::InvalidInput {
                msg: "comment spans several lines".to_string(),
            });
        }
        writeln!(self.writer, "#{}", text)?;
        Ok(())
    }

    /// Writes one record as a line.
    pub fn write_record(&mut self, record: &T) -> Result<()> {
        writeln!(self.writer, "{}", record.to_line())?;
        self.records_written += 1;
        Ok(())
    }

    /// Writes every record of a parser, stopping at the first error.
    pub fn write_all<I, E>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = std::result::Result<T, E>>,
        BiotagError: From<E>,
    {
        for record in records {
            self.write_record(&record?)?;
        }
        Ok(())
    }

    /// Records written so far.
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Flushes buffered output.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes and closes the compression stream. Must be called for
    /// gzip and bgzip output to be complete.
    pub fn finish(self) -> Result<()> {
        self.writer.finish()?;
        Ok(())
    }
}
