//! Compressed output for record writers.
//!
//! Reading needs no counterpart here: parsers wrap gzip and bgzip input in
//! flate2's `MultiGzDecoder`, which handles both since a BGZF file is a
//! series of gzip members.
//!
//! # Formats
//!
//! - **Plain**: buffered, uncompressed
//! - **Gzip**: one flate2 gzip stream
//! - **Bgzip**: BGZF blocks of at most 60 KB input each, compressed in
//!   parallel batches with rayon and terminated by the standard EOF block

use crate::io::DataSink;
use flate2::write::{DeflateEncoder, GzEncoder};
use flate2::Compression;
use rayon::prelude::*;
use std::fs::File;
use std::io::{self, BufWriter, Write};

/// Blocks compressed together in one parallel batch.
pub const PARALLEL_BLOCK_COUNT: usize = 8;

/// Maximum uncompressed bytes per BGZF block.
///
/// BGZF limits a block to 64 KB compressed; 60 KB of input leaves room for
/// incompressible data.
const BGZIP_BLOCK_SIZE: usize = 60 * 1024;

/// Empty BGZF block marking end of file.
const BGZIP_EOF: [u8; 28] = [
    31, 139, 8, 4, 0, 0, 0, 0, 0, 255, 6, 0, 66, 67, 2, 0, 27, 0, 3, 0, 0, 0, 0, 0, 0, 0, 0, 0,
];

/// BGZF writer with parallel block compression.
///
/// Input is cut into 60 KB blocks. Once [`PARALLEL_BLOCK_COUNT`] blocks
/// are pending they are deflated on the rayon pool and written in order,
/// so buffered input stays under 500 KB regardless of output size.
pub struct BgzipWriter {
    writer: Box<dyn Write>,
    pending: Vec<Vec<u8>>,
    current: Vec<u8>,
}

impl BgzipWriter {
    fn new(writer: Box<dyn Write>) -> Self {
        BgzipWriter {
            writer,
            pending: Vec::with_capacity(PARALLEL_BLOCK_COUNT),
            current: Vec::with_capacity(BGZIP_BLOCK_SIZE),
        }
    }

    /// Compresses one block into a BGZF member.
    ///
    /// The gzip header carries the `BC` extra subfield whose BSIZE is the
    /// total member size minus one.
    fn compress_block(data: &[u8]) -> io::Result<Vec<u8>> {
        let mut deflate = DeflateEncoder::new(Vec::new(), Compression::default());
        deflate.write_all(data)?;
        let deflated = deflate.finish()?;

        let mut block = Vec::with_capacity(deflated.len() + 26);
        block.extend_from_slice(&[31, 139, 8, 4, 0, 0, 0, 0, 0, 255]);
        block.extend_from_slice(&6u16.to_le_bytes());
        block.extend_from_slice(&[66, 67]);
        block.extend_from_slice(&2u16.to_le_bytes());
        let bsize_at = block.len();
        block.extend_from_slice(&[0, 0]);
        block.extend_from_slice(&deflated);
        block.extend_from_slice(&crc32fast::hash(data).to_le_bytes());
        block.extend_from_slice(&(data.len() as u32).to_le_bytes());

        let bsize = u16::try_from(block.len() - 1)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "BGZF block exceeds 64 KB"))?;
        block[bsize_at..bsize_at + 2].copy_from_slice(&bsize.to_le_bytes());

        Ok(block)
    }

    fn flush_blocks(&mut self) -> io::Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let compressed = self
            .pending
            .par_iter()
            .map(|block| Self::compress_block(block))
            .collect::<io::Result<Vec<_>>>()?;

        for block in compressed {
            self.writer.write_all(&block)?;
        }

        self.pending.clear();
        Ok(())
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut remaining = buf;

        while !remaining.is_empty() {
            let take = remaining.len().min(BGZIP_BLOCK_SIZE - self.current.len());
            self.current.extend_from_slice(&remaining[..take]);
            remaining = &remaining[take..];

            if self.current.len() >= BGZIP_BLOCK_SIZE {
                let block = std::mem::replace(&mut self.current, Vec::with_capacity(BGZIP_BLOCK_SIZE));
                self.pending.push(block);

                if self.pending.len() >= PARALLEL_BLOCK_COUNT {
                    self.flush_blocks()?;
                }
            }
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    fn finish(mut self) -> io::Result<()> {
        if !self.current.is_empty() {
            let block = std::mem::take(&mut self.current);
            self.pending.push(block);
        }
        self.flush_blocks()?;

        self.writer.write_all(&BGZIP_EOF)?;
        self.writer.flush()
    }
}

/// Writer that compresses according to its [`DataSink`].
///
/// Call [`CompressedWriter::finish`] to close the stream; dropping the
/// writer only flushes, which leaves gzip and bgzip output without its
/// trailer.
///
/// # Example
///
/// ```no_run
/// use biotag::io::{CompressedWriter, DataSink};
/// use std::io::Write;
///
/// # fn main() -> std::io::Result<()> {
/// let mut writer = CompressedWriter::new(DataSink::from_path("alignments.paf.bgz"))?;
/// writer.write_all(b"q\t1\t0\t1\t+\tt\t1\t0\t1\t1\t1\t255\n")?;
/// writer.finish()?;
/// # Ok(())
/// # }
/// ```
pub enum CompressedWriter {
    /// Uncompressed, buffered
    Plain(Option<BufWriter<Box<dyn Write>>>),
    /// Single gzip stream
    Gzip(Option<GzEncoder<BufWriter<Box<dyn Write>>>>),
    /// BGZF blocks, compressed in parallel
    Bgzip(Option<BgzipWriter>),
}

impl CompressedWriter {
    /// Opens the sink, choosing compression from the file extension:
    /// `.gz` gzip, `.bgz` bgzip, anything else plain. Stdout is plain.
    pub fn new(sink: DataSink) -> io::Result<Self> {
        match sink {
            DataSink::Local(path) => {
                let file = File::create(&path)?;
                match path.extension().and_then(|s| s.to_str()) {
                    Some("gz") => Self::new_gzip(Box::new(file)),
                    Some("bgz") => Self::new_bgzip(Box::new(file)),
                    _ => Self::new_plain(Box::new(file)),
                }
            }
            DataSink::Stdout => Self::new_plain(Box::new(io::stdout())),
        }
    }

    /// Buffered, uncompressed.
    pub fn new_plain(writer: Box<dyn Write>) -> io::Result<Self> {
        Ok(Self::Plain(Some(BufWriter::new(writer))))
    }

    /// Gzip at the default level (6).
    pub fn new_gzip(writer: Box<dyn Write>) -> io::Result<Self> {
        Ok(Self::Gzip(Some(GzEncoder::new(
            BufWriter::new(writer),
            Compression::default(),
        ))))
    }

    /// Blocked gzip, readable by any gzip decoder.
    pub fn new_bgzip(writer: Box<dyn Write>) -> io::Result<Self> {
        Ok(Self::Bgzip(Some(BgzipWriter::new(writer))))
    }

    /// Flushes buffered bytes without closing the compressed stream.
    pub fn flush(&mut self) -> io::Result<()> {
        match self {
            Self::Plain(Some(w)) => w.flush(),
            Self::Gzip(Some(w)) => w.flush(),
            Self::Bgzip(Some(w)) => w.flush(),
            _ => Ok(()),
        }
    }

    /// Writes any trailer and flushes. Consumes the writer.
    pub fn finish(mut self) -> io::Result<()> {
        match &mut self {
            Self::Plain(w) => match w.take() {
                Some(mut writer) => writer.flush(),
                None => Ok(()),
            },
            Self::Gzip(w) => match w.take() {
                Some(encoder) => encoder.finish()?.flush(),
                None => Ok(()),
            },
            Self::Bgzip(w) => match w.take() {
                Some(writer) => writer.finish(),
                None => Ok(()),
            },
        }
    }
}

impl Write for CompressedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Self::Plain(Some(w)) => w.write(buf),
            Self::Gzip(Some(w)) => w.write(buf),
            Self::Bgzip(Some(w)) => w.write(buf),
            _ => Err(io::Error::new(io::ErrorKind::Other, "write after finish")),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        CompressedWriter::flush(self)
    }
}

impl Drop for CompressedWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::MultiGzDecoder;
    use std::io::Read;
    use tempfile::TempDir;

    fn write_to(path: &std::path::Path, data: &[u8]) {
        let mut writer = CompressedWriter::new(DataSink::from_path(path)).unwrap();
        writer.write_all(data).unwrap();
        writer.finish().unwrap();
    }

    fn gunzip(path: &std::path::Path) -> Vec<u8> {
        let mut decoded = Vec::new();
        MultiGzDecoder::new(File::open(path).unwrap())
            .read_to_end(&mut decoded)
            .unwrap();
        decoded
    }

    #[test]
    fn test_plain() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.paf");
        write_to(&path, b"line 1\nline 2\n");
        assert_eq!(std::fs::read(&path).unwrap(), b"line 1\nline 2\n");
    }

    #[test]
    fn test_gzip_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.gfa.gz");
        let data = b"S\t1\tACGT\n".repeat(5000);
        write_to(&path, &data);

        let raw = std::fs::read(&path).unwrap();
        assert_eq!(&raw[..2], &[31, 139]);
        assert!(raw.len() < data.len() / 10);
        assert_eq!(gunzip(&path), data);
    }

    #[test]
    fn test_bgzip_round_trip_many_blocks() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.vcf.bgz");
        let data: Vec<u8> = (0..60_000)
            .flat_map(|i| format!("1\t{}\t.\tA\tT\t.\tPASS\tDP={}\n", i + 1, i % 97).into_bytes())
            .collect();
        assert!(data.len() > BGZIP_BLOCK_SIZE * PARALLEL_BLOCK_COUNT);

        write_to(&path, &data);
        assert_eq!(gunzip(&path), data);
    }

    #[test]
    fn test_bgzip_block_layout() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("small.bgz");
        write_to(&path, b"hello\n");

        let raw = std::fs::read(&path).unwrap();
        assert_eq!(&raw[..4], &[31, 139, 8, 4]);
        assert_eq!(&raw[12..14], b"BC");
        let bsize = u16::from_le_bytes([raw[16], raw[17]]) as usize;
        assert_eq!(raw.len(), bsize + 1 + BGZIP_EOF.len());
        assert!(raw.ends_with(&BGZIP_EOF));
    }

    #[test]
    fn test_empty_bgzip_is_eof_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.bgz");
        write_to(&path, b"");
        assert_eq!(std::fs::read(&path).unwrap(), BGZIP_EOF);
        assert!(gunzip(&path).is_empty());
    }

    #[test]
    fn test_write_after_finish_fails() {
        let mut writer = CompressedWriter::Plain(None);
        assert!(writer.write(b"x").is_err());
        assert!(writer.flush().is_ok());
    }
}
