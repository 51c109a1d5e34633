//! VCF writer with compression support.
//!
//! The header goes first, then records. Records are checked before they
//! are written:
//! - CHROM and REF must be non-empty
//! - POS must be at least 1
//! - the number of sample columns must match the header samples
//!
//! # Example
//!
//! ```no_run
//! use biotag::formats::attribute::{Number, TypeCode};
//! use biotag::formats::vcf::{FieldDefinition, VcfHeader, VcfRecord};
//! use biotag::formats::vcf_writer::VcfWriter;
//!
//! # fn main() -> biotag::Result<()> {
//! let mut header = VcfHeader::new("VCFv4.3");
//! header.add_info(FieldDefinition::new("DP", Number::Fixed(1), TypeCode::Integer, "Total Depth"));
//!
//! let mut writer = VcfWriter::create("variants.vcf.bgz")?;
//! writer.write_header(&header)?;
//!
//! let mut builder = VcfRecord::builder::<&str>(&[]);
//! builder.chrom("chr1").pos(100).reference("A").alternate(&["T"]);
//! builder.info().put_integer("DP", 50)?;
//! writer.write_record(&builder.build())?;
//!
//! writer.finish()?;
//! # Ok(())
//! # }
//! ```

use crate::error::{BiotagError, Result};
use crate::formats::primitives::TabDelimitedRecord;
use crate::formats::vcf::{VcfHeader, VcfRecord};
use crate::io::compression::CompressedWriter;
use crate::io::sink::DataSink;
use std::io::Write;
use std::path::Path;

/// VCF writer.
pub struct VcfWriter {
    writer: CompressedWriter,
    records_written: usize,
    samples: Option<usize>,
}

impl VcfWriter {
    /// Creates a writer; the sink's extension selects compression.
    pub fn new(sink: DataSink) -> Result<Self> {
        Ok(Self {
            writer: CompressedWriter::new(sink)?,
            records_written: 0,
            samples: None,
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

    /// Writes the meta-information lines and the `#CHROM` line.
    ///
    /// # Errors
    ///
    /// [`BiotagError::InvalidInput`] if a header was already written.
    pub fn write_header(&mut self, header: &VcfHeader) -> Result<()> {
        if self.samples.is_some() {
            return Err(BiotagError::InvalidInput {
                msg: "VCF header already written".to_string(),
            });
        }

        for line in header.to_header_lines() {
            writeln!(self.writer, "{}", line)?;
        }

        self.samples = Some(header.samples.len());
        Ok(())
    }

    /// Writes one record.
    ///
    /// # Errors
    ///
    /// [`BiotagError::InvalidInput`] if no header has been written or the
    /// record fails validation.
    pub fn write_record(&mut self, record: &VcfRecord) -> Result<()> {
        let samples = self.samples.ok_or_else(|| BiotagError::InvalidInput {
            msg: "VCF header must be written before records".to_string(),
        })?;
        validate(record, samples)?;

        writeln!(self.writer, "{}", record.to_line())?;
        self.records_written += 1;
        Ok(())
    }

    /// Writes every record of a parser, stopping at the first error.
    pub fn write_all<I, E>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = std::result::Result<VcfRecord, E>>,
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

    /// Whether [`write_header`](Self::write_header) has run.
    pub fn header_written(&self) -> bool {
        self.samples.is_some()
    }

    /// Flushes buffered output.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Flushes and closes the compression stream.
    pub fn finish(self) -> Result<()> {
        self.writer.finish()?;
        Ok(())
    }
}

fn validate(record: &VcfRecord, samples: usize) -> Result<()> {
    let invalid = |msg: String| Err(BiotagError::InvalidInput { msg });

    if record.chrom.is_empty() {
        return invalid("VCF: CHROM cannot be empty".to_string());
    }
    if record.pos == 0 {
        return invalid(format!("VCF: POS must be >= 1 at {}", record.chrom));
    }
    if record.reference.is_empty() {
        return invalid(format!("VCF: REF cannot be empty at {}:{}", record.chrom, record.pos));
    }
    if record.genotypes.len() != samples {
        return invalid(format!(
            "VCF: {} sample columns at {}:{}, header has {}",
            record.genotypes.len(),
            record.chrom,
            record.pos,
            samples
        ));
    }
    if !record.genotypes.is_empty() && record.format.is_empty() {
        return invalid(format!("VCF: genotypes without FORMAT at {}:{}", record.chrom, record.pos));
    }
    Ok(())
}
