//! GFA 1 (Graphical Fragment Assembly) records.
//!
//! GFA 1 describes assembly graphs line by line:
//! - **H** header: `H  tags`
//! - **S** segment: `S  name  sequence|*  tags`
//! - **L** link: `L  from  ori  to  ori  overlap|*  tags`
//! - **C** containment: `C  container  ori  contained  ori  pos  overlap|*  tags`
//! - **P** path: `P  name  seg+,seg-,...  overlaps|*  tags`
//!
//! Columns are tab-separated. Lines starting with `#` are comments and are
//! skipped by [`Gfa1Parser`].
//!
//! # Examples
//!
//! ```
//! use biotag::formats::gfa1::{Gfa1Parser, Gfa1Record};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let data = "\
//! H\tVN:Z:1.0
//! S\tutg1\tACGTACGTACGT\tLN:i:12\tRC:i:100
//! S\tutg2\t*\tLN:i:4000
//! L\tutg1\t+\tutg2\t-\t4M\tMQ:i:60
//! P\tp1\tutg1+,utg2-\t4M
//! ";
//!
//! let mut segments = 0;
//! for record in Gfa1Parser::new(data.as_bytes()) {
//!     match record? {
//!         Gfa1Record::Header(h) => assert_eq!(h.version()?, "1.0"),
//!         Gfa1Record::Segment(s) => {
//!             segments += 1;
//!             assert!(s.length()? > 0);
//!         }
//!         Gfa1Record::Link(l) => assert_eq!(l.mapping_quality()?, 60),
//!         Gfa1Record::Path(p) => assert_eq!(p.segments.len(), 2),
//!         Gfa1Record::Containment(_) => unreachable!(),
//!     }
//! }
//! assert_eq!(segments, 2);
//! # Ok(())
//! # }
//! ```

use crate::formats::attribute::set::append_tag_columns;
use crate::formats::attribute::{reserved_key, tagged_records, AttributeSet, Attributed, HexBytes};
use crate::formats::primitives::{
    fields::{parse_comma_list, parse_required, split_fields, unless_star},
    FormatError, Orientation, Reference, Result, TabDelimitedParser, TabDelimitedRecord,
};
use std::str::FromStr;

/// `H` line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Header {
    /// Header tags
    pub tags: AttributeSet,
}

impl Header {
    reserved_key!(string "VN" => contains_vn, vn, vn_opt);

    /// GFA version (`VN`).
    pub fn version(&self) -> Result<&str> {
        self.vn()
    }
}

/// `S` line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    /// Segment name
    pub name: String,
    /// Sequence, `None` for `*`
    pub sequence: Option<String>,
    /// Segment tags
    pub tags: AttributeSet,
}

impl Segment {
    reserved_key!(integer "LN" => contains_ln, ln, ln_opt);
    reserved_key!(integer "RC" => contains_rc, rc, rc_opt);
    reserved_key!(integer "FC" => contains_fc, fc, fc_opt);
    reserved_key!(integer "KC" => contains_kc, kc, kc_opt);
    reserved_key!(byte_array "SH" => contains_sh, sh, sh_opt);
    reserved_key!(string "UR" => contains_ur, ur, ur_opt);

    /// Segment length: the sequence length, or `LN` when the sequence is `*`.
    pub fn length(&self) -> Result<i64> {
        match &self.sequence {
            Some(sequence) => Ok(sequence.len() as i64),
            None => self.ln(),
        }
    }

    /// Read count (`RC`).
    pub fn read_count(&self) -> Result<i64> {
        self.rc()
    }

    /// Fragment count (`FC`).
    pub fn fragment_count(&self) -> Result<i64> {
        self.fc()
    }

    /// k-mer count (`KC`).
    pub fn kmer_count(&self) -> Result<i64> {
        self.kc()
    }

    /// SHA-256 checksum of the sequence (`SH`).
    pub fn checksum(&self) -> Result<HexBytes> {
        self.sh()
    }

    /// URI of the sequence (`UR`).
    pub fn uri(&self) -> Result<&str> {
        self.ur()
    }
}

/// `L` line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Link {
    /// Source segment and orientation
    pub source: Reference,
    /// Target segment and orientation
    pub target: Reference,
    /// Overlap CIGAR, `None` for `*`
    pub overlap: Option<String>,
    /// Link tags
    pub tags: AttributeSet,
}

/// `C` line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Containment {
    /// Containing segment
    pub container: Reference,
    /// Contained segment
    pub contained: Reference,
    /// Leftmost position of the contained segment in the container
    pub position: u64,
    /// Overlap CIGAR, `None` for `*`
    pub overlap: Option<String>,
    /// Containment tags
    pub tags: AttributeSet,
}

macro_rules! edge_tags {
    ($ty:ty) => {
        impl $ty {
            reserved_key!(integer "MQ" => contains_mq, mq, mq_opt);
            reserved_key!(integer "NM" => contains_nm, nm, nm_opt);
            reserved_key!(integer "RC" => contains_rc, rc, rc_opt);
            reserved_key!(integer "FC" => contains_fc, fc, fc_opt);
            reserved_key!(integer "KC" => contains_kc, kc, kc_opt);
            reserved_key!(string "ID" => contains_id, id, id_opt);

            /// Mapping quality (`MQ`).
            pub fn mapping_quality(&self) -> Result<i64> {
                self.mq()
            }

            /// Number of mismatches and gaps (`NM`).
            pub fn mismatch_count(&self) -> Result<i64> {
                self.nm()
            }

            /// Read count (`RC`).
            pub fn read_count(&self) -> Result<i64> {
                self.rc()
            }
        }
    };
}

edge_tags!(Link);
edge_tags!(Containment);

/// `P` line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    /// Path name
    pub name: String,
    /// Oriented segments in path order
    pub segments: Vec<Reference>,
    /// Overlaps between consecutive segments, `None` for `*`
    pub overlaps: Option<Vec<String>>,
    /// Path tags
    pub tags: AttributeSet,
}

/// Any GFA 1 line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Gfa1Record {
    /// `H`
    Header(Header),
    /// `S`
    Segment(Segment),
    /// `L`
    Link(Link),
    /// `C`
    Containment(Containment),
    /// `P`
    Path(Path),
}

tagged_records!(Header, Segment, Link, Containment, Path);

impl Attributed for Gfa1Record {
    fn attributes(&self) -> &AttributeSet {
        match self {
            Gfa1Record::Header(r) => &r.tags,
            Gfa1Record::Segment(r) => &r.tags,
            Gfa1Record::Link(r) => &r.tags,
            Gfa1Record::Containment(r) => &r.tags,
            Gfa1Record::Path(r) => &r.tags,
        }
    }
}

fn oriented(id: &str, orientation: &str) -> Result<Reference> {
    Ok(Reference::new(id, Orientation::from_str(orientation)?))
}

fn tags(fields: &[&str]) -> Result<AttributeSet> {
    AttributeSet::from_tag_tokens(fields.iter().copied())
}

fn record_type(fields: &[&str], expected: &str) -> Result<()> {
    if fields[0] == expected {
        Ok(())
    } else {
        Err(FormatError::malformed(
            fields[0],
            format!("expected a '{}' line", expected),
        ))
    }
}

impl TabDelimitedRecord for Header {
    fn from_line(line: &str) -> Result<Self> {
        let fields = split_fields(line, Self::expected_fields(), 0)?;
        record_type(&fields, "H")?;
        Ok(Header {
            tags: tags(&fields[1..])?,
        })
    }

    fn to_line(&self) -> String {
        let mut line = "H".to_string();
        append_tag_columns(&mut line, &self.tags);
        line
    }

    fn expected_fields() -> Option<usize> {
        Some(1)
    }
}

impl TabDelimitedRecord for Segment {
    fn from_line(line: &str) -> Result<Self> {
        let fields = split_fields(line, Self::expected_fields(), 0)?;
        record_type(&fields, "S")?;
        Ok(Segment {
            name: fields[1].to_string(),
            sequence: unless_star(fields[2]).map(str::to_string),
            tags: tags(&fields[3..])?,
        })
    }

    fn to_line(&self) -> String {
        let mut line = format!("S\t{}\t{}", self.name, self.sequence.as_deref().unwrap_or("*"));
        append_tag_columns(&mut line, &self.tags);
        line
    }

    fn expected_fields() -> Option<usize> {
        Some(3)
    }
}

impl TabDelimitedRecord for Link {
    fn from_line(line: &str) -> Result<Self> {
        let fields = split_fields(line, Self::expected_fields(), 0)?;
        record_type(&fields, "L")?;
        Ok(Link {
            source: oriented(fields[1], fields[2])?,
            target: oriented(fields[3], fields[4])?,
            overlap: unless_star(fields[5]).map(str::to_string),
            tags: tags(&fields[6..])?,
        })
    }

    fn to_line(&self) -> String {
        let mut line = format!(
            "L\t{}\t{}\t{}\t{}\t{}",
            self.source.id,
            self.source.orientation,
            self.target.id,
            self.target.orientation,
            self.overlap.as_deref().unwrap_or("*"),
        );
        append_tag_columns(&mut line, &self.tags);
        line
    }

    fn expected_fields() -> Option<usize> {
        Some(6)
    }
}

impl TabDelimitedRecord for Containment {
    fn from_line(line: &str) -> Result<Self> {
        let fields = split_fields(line, Self::expected_fields(), 0)?;
        record_type(&fields, "C")?;
        Ok(Containment {
            container: oriented(fields[1], fields[2])?,
            contained: oriented(fields[3], fields[4])?,
            position: parse_required(fields[5], "pos", 0)?,
            overlap: unless_star(fields[6]).map(str::to_string),
            tags: tags(&fields[7..])?,
        })
    }

    fn to_line(&self) -> String {
        let mut line = format!(
            "C\t{}\t{}\t{}\t{}\t{}\t{}",
            self.container.id,
            self.container.orientation,
            self.contained.id,
            self.contained.orientation,
            self.position,
            self.overlap.as_deref().unwrap_or("*"),
        );
        append_tag_columns(&mut line, &self.tags);
        line
    }

    fn expected_fields() -> Option<usize> {
        Some(7)
    }
}

impl TabDelimitedRecord for Path {
    fn from_line(line: &str) -> Result<Self> {
        let fields = split_fields(line, Self::expected_fields(), 0)?;
        record_type(&fields, "P")?;
        let segments = parse_comma_list(fields[2])
            .into_iter()
            .map(Reference::from_str)
            .collect::<Result<Vec<_>>>()?;
        let overlaps = unless_star(fields[3])
            .map(|o| o.split(',').map(str::to_string).collect());
        Ok(Path {
            name: fields[1].to_string(),
            segments,
            overlaps,
            tags: tags(&fields[4..])?,
        })
    }

    fn to_line(&self) -> String {
        let segments = if self.segments.is_empty() {
            "*".to_string()
        } else {
            self.segments
                .iter()
                .map(Reference::to_string)
                .collect::<Vec<_>>()
                .join(",")
        };
        let overlaps = self
            .overlaps
            .as_ref()
            .map_or_else(|| "*".to_string(), |o| o.join(","));
        let mut line = format!("P\t{}\t{}\t{}", self.name, segments, overlaps);
        append_tag_columns(&mut line, &self.tags);
        line
    }

    fn expected_fields() -> Option<usize> {
        Some(4)
    }
}

impl TabDelimitedRecord for Gfa1Record {
    fn from_line(line: &str) -> Result<Self> {
        let code = line.split('\t').next().unwrap_or_default();
        match code {
            "H" => Header::from_line(line).map(Gfa1Record::Header),
            "S" => Segment::from_line(line).map(Gfa1Record::Segment),
            "L" => Link::from_line(line).map(Gfa1Record::Link),
            "C" => Containment::from_line(line).map(Gfa1Record::Containment),
            "P" => Path::from_line(line).map(Gfa1Record::Path),
            other => Err(FormatError::malformed(other, "unknown GFA 1 record type")),
        }
    }

    fn to_line(&self) -> String {
        match self {
            Gfa1Record::Header(r) => r.to_line(),
            Gfa1Record::Segment(r) => r.to_line(),
            Gfa1Record::Link(r) => r.to_line(),
            Gfa1Record::Containment(r) => r.to_line(),
            Gfa1Record::Path(r) => r.to_line(),
        }
    }
}

/// Streaming GFA 1 parser.
pub type Gfa1Parser<R> = TabDelimitedParser<R, Gfa1Record>;
