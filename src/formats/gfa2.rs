//! GFA 2 records.
//!
//! GFA 2 generalizes GFA 1 with explicit alignment coordinates:
//! - **H** `H  tags`
//! - **S** `S  sid  slen  sequence|*  tags`
//! - **E** `E  eid|*  sid1±  sid2±  beg1  end1  beg2  end2  alignment|*  tags`
//! - **F** `F  sid  external±  sbeg  send  fbeg  fend  alignment|*  tags`
//! - **G** `G  gid|*  sid1±  sid2±  dist  var|*  tags`
//! - **O** `O  oid|*  ref+ ref- ...  tags` (ordered group)
//! - **U** `U  uid|*  id id ...  tags` (unordered group)
//!
//! Positions may carry a trailing `$` marking the end of the segment.

use crate::formats::attribute::set::append_tag_columns;
use crate::formats::attribute::{reserved_key, tagged_records, AttributeSet, Attributed, HexBytes};
use crate::formats::primitives::{
    fields::{parse_optional, parse_required, split_fields, unless_star},
    FormatError, Reference, Result, TabDelimitedParser, TabDelimitedRecord,
};
use std::fmt;
use std::str::FromStr;

/// A coordinate with an optional `$` end-of-segment marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    /// Offset into the segment
    pub value: u64,
    /// `true` if written with a trailing `$`
    pub terminal: bool,
}

impl FromStr for Position {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self> {
        let (digits, terminal) = match s.strip_suffix('$') {
            Some(digits) => (digits, true),
            None => (s, false),
        };
        let value = digits
            .parse::<u64>()
            .map_err(|_| FormatError::malformed(s, "invalid position"))?;
        Ok(Position { value, terminal })
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)?;
        if self.terminal {
            f.write_str("$")?;
        }
        Ok(())
    }
}

/// `H` line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Header {
    /// Header tags
    pub tags: AttributeSet,
}

impl Header {
    reserved_key!(string "VN" => contains_vn, vn, vn_opt);
    reserved_key!(integer "TS" => contains_ts, ts, ts_opt);

    /// GFA version (`VN`).
    pub fn version(&self) -> Result<&str> {
        self.vn()
    }

    /// Trace spacing (`TS`).
    pub fn trace_spacing(&self) -> Result<i64> {
        self.ts()
    }
}

/// `S` line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    /// Segment identifier
    pub id: String,
    /// Declared length
    pub length: u64,
    /// Sequence, `None` for `*`
    pub sequence: Option<String>,
    /// Segment tags
    pub tags: AttributeSet,
}

/// `E` line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    /// Edge identifier, `None` for `*`
    pub id: Option<String>,
    /// First segment
    pub source: Reference,
    /// Second segment
    pub target: Reference,
    /// Start on the first segment
    pub source_start: Position,
    /// End on the first segment
    pub source_end: Position,
    /// Start on the second segment
    pub target_start: Position,
    /// End on the second segment
    pub target_end: Position,
    /// CIGAR or trace, `None` for `*`
    pub alignment: Option<String>,
    /// Edge tags
    pub tags: AttributeSet,
}

/// `F` line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fragment {
    /// Segment the fragment aligns to
    pub segment: String,
    /// External sequence with orientation
    pub external: Reference,
    /// Start on the segment
    pub segment_start: Position,
    /// End on the segment
    pub segment_end: Position,
    /// Start on the fragment
    pub fragment_start: Position,
    /// End on the fragment
    pub fragment_end: Position,
    /// CIGAR or trace, `None` for `*`
    pub alignment: Option<String>,
    /// Fragment tags
    pub tags: AttributeSet,
}

/// `G` line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Gap {
    /// Gap identifier, `None` for `*`
    pub id: Option<String>,
    /// First segment
    pub source: Reference,
    /// Second segment
    pub target: Reference,
    /// Estimated distance
    pub distance: i64,
    /// Variance of the distance, `None` for `*`
    pub variance: Option<i64>,
    /// Gap tags
    pub tags: AttributeSet,
}

/// `U` line: an unordered group of identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Set {
    /// Group identifier, `None` for `*`
    pub id: Option<String>,
    /// Member identifiers
    pub members: Vec<String>,
    /// Group tags
    pub tags: AttributeSet,
}

/// `O` line: an ordered group of oriented references.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    /// Group identifier, `None` for `*`
    pub id: Option<String>,
    /// Members in order
    pub references: Vec<Reference>,
    /// Group tags
    pub tags: AttributeSet,
}

macro_rules! sequence_tags {
    ($($ty:ty),*) => {
        $(
            impl $ty {
                reserved_key!(integer "RC" => contains_rc, rc, rc_opt);
                reserved_key!(integer "FC" => contains_fc, fc, fc_opt);
                reserved_key!(integer "KC" => contains_kc, kc, kc_opt);
                reserved_key!(byte_array "SH" => contains_sh, sh, sh_opt);
                reserved_key!(string "UR" => contains_ur, ur, ur_opt);

                /// Read count (`RC`).
                pub fn read_count(&self) -> Result<i64> {
                    self.rc()
                }

                /// SHA-256 checksum (`SH`).
                pub fn checksum(&self) -> Result<HexBytes> {
                    self.sh()
                }
            }
        )*
    };
}

sequence_tags!(Segment, Edge, Fragment, Gap, Set);
tagged_records!(Header, Segment, Edge, Fragment, Gap, Set, Path);

/// Any GFA 2 line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Gfa2Record {
    /// `H`
    Header(Header),
    /// `S`
    Segment(Segment),
    /// `E`
    Edge(Edge),
    /// `F`
    Fragment(Fragment),
    /// `G`
    Gap(Gap),
    /// `U`
    Set(Set),
    /// `O`
    Path(Path),
}

impl Attributed for Gfa2Record {
    fn attributes(&self) -> &AttributeSet {
        match self {
            Gfa2Record::Header(r) => &r.tags,
            Gfa2Record::Segment(r) => &r.tags,
            Gfa2Record::Edge(r) => &r.tags,
            Gfa2Record::Fragment(r) => &r.tags,
            Gfa2Record::Gap(r) => &r.tags,
            Gfa2Record::Set(r) => &r.tags,
            Gfa2Record::Path(r) => &r.tags,
        }
    }
}

fn record_type(fields: &[&str], expected: &str) -> Result<()> {
    if fields[0] == expected {
        Ok(())
    } else {
        Err(FormatError::malformed(fields[0], format!("expected a '{}' line", expected)))
    }
}

fn optional_id(value: &str) -> Option<String> {
    unless_star(value).map(str::to_string)
}

fn tags(fields: &[&str]) -> Result<AttributeSet> {
    AttributeSet::from_tag_tokens(fields.iter().copied())
}

fn or_star<T: ToString>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map_or_else(|| "*".to_string(), ToString::to_string)
}

impl TabDelimitedRecord for Header {
    fn from_line(line: &str) -> Result<Self> {
        let fields = split_fields(line, Some(1), 0)?;
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
}

impl TabDelimitedRecord for Segment {
    fn from_line(line: &str) -> Result<Self> {
        let fields = split_fields(line, Self::expected_fields(), 0)?;
        record_type(&fields, "S")?;
        Ok(Segment {
            id: fields[1].to_string(),
            length: parse_required(fields[2], "slen", 0)?,
            sequence: optional_id(fields[3]),
            tags: tags(&fields[4..])?,
        })
    }

    fn to_line(&self) -> String {
        let mut line = format!("S\t{}\t{}\t{}", self.id, self.length, or_star(&self.sequence));
        append_tag_columns(&mut line, &self.tags);
        line
    }

    fn expected_fields() -> Option<usize> {
        Some(4)
    }
}

impl TabDelimitedRecord for Edge {
    fn from_line(line: &str) -> Result<Self> {
        let fields = split_fields(line, Self::expected_fields(), 0)?;
        record_type(&fields, "E")?;
        Ok(Edge {
            id: optional_id(fields[1]),
            source: Reference::from_str(fields[2])?,
            target: Reference::from_str(fields[3])?,
            source_start: fields[4].parse()?,
            source_end: fields[5].parse()?,
            target_start: fields[6].parse()?,
            target_end: fields[7].parse()?,
            alignment: optional_id(fields[8]),
            tags: tags(&fields[9..])?,
        })
    }

    fn to_line(&self) -> String {
        let mut line = format!(
            "E\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            or_star(&self.id),
            self.source,
            self.target,
            self.source_start,
            self.source_end,
            self.target_start,
            self.target_end,
            or_star(&self.alignment),
        );
        append_tag_columns(&mut line, &self.tags);
        line
    }

    fn expected_fields() -> Option<usize> {
        Some(9)
    }
}

impl TabDelimitedRecord for Fragment {
    fn from_line(line: &str) -> Result<Self> {
        let fields = split_fields(line, Self::expected_fields(), 0)?;
        record_type(&fields, "F")?;
        Ok(Fragment {
            segment: fields[1].to_string(),
            external: Reference::from_str(fields[2])?,
            segment_start: fields[3].parse()?,
            segment_end: fields[4].parse()?,
            fragment_start: fields[5].parse()?,
            fragment_end: fields[6].parse()?,
            alignment: optional_id(fields[7]),
            tags: tags(&fields[8..])?,
        })
    }

    fn to_line(&self) -> String {
        let mut line = format!(
            "F\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.segment,
            self.external,
            self.segment_start,
            self.segment_end,
            self.fragment_start,
            self.fragment_end,
            or_star(&self.alignment),
        );
        append_tag_columns(&mut line, &self.tags);
        line
    }

    fn expected_fields() -> Option<usize> {
        Some(8)
    }
}

impl TabDelimitedRecord for Gap {
    fn from_line(line: &str) -> Result<Self> {
        let fields = split_fields(line, Self::expected_fields(), 0)?;
        record_type(&fields, "G")?;
        Ok(Gap {
            id: optional_id(fields[1]),
            source: Reference::from_str(fields[2])?,
            target: Reference::from_str(fields[3])?,
            distance: parse_required(fields[4], "dist", 0)?,
            variance: parse_optional(fields[5], "var", 0)?,
            tags: tags(&fields[6..])?,
        })
    }

    fn to_line(&self) -> String {
        let mut line = format!(
            "G\t{}\t{}\t{}\t{}\t{}",
            or_star(&self.id),
            self.source,
            self.target,
            self.distance,
            or_star(&self.variance),
        );
        append_tag_columns(&mut line, &self.tags);
        line
    }

    fn expected_fields() -> Option<usize> {
        Some(6)
    }
}

impl TabDelimitedRecord for Set {
    fn from_line(line: &str) -> Result<Self> {
        let fields = split_fields(line, Self::expected_fields(), 0)?;
        record_type(&fields, "U")?;
        Ok(Set {
            id: optional_id(fields[1]),
            members: fields[2].split_whitespace().map(str::to_string).collect(),
            tags: tags(&fields[3..])?,
        })
    }

    fn to_line(&self) -> String {
        let mut line = format!("U\t{}\t{}", or_star(&self.id), self.members.join(" "));
        append_tag_columns(&mut line, &self.tags);
        line
    }

    fn expected_fields() -> Option<usize> {
        Some(3)
    }
}

impl TabDelimitedRecord for Path {
    fn from_line(line: &str) -> Result<Self> {
        let fields = split_fields(line, Self::expected_fields(), 0)?;
        record_type(&fields, "O")?;
        let references = fields[2]
            .split_whitespace()
            .map(Reference::from_str)
            .collect::<Result<Vec<_>>>()?;
        Ok(Path {
            id: optional_id(fields[1]),
            references,
            tags: tags(&fields[3..])?,
        })
    }

    fn to_line(&self) -> String {
        let references = self
            .references
            .iter()
            .map(Reference::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        let mut line = format!("O\t{}\t{}", or_star(&self.id), references);
        append_tag_columns(&mut line, &self.tags);
        line
    }

    fn expected_fields() -> Option<usize> {
        Some(3)
    }
}

impl TabDelimitedRecord for Gfa2Record {
    fn from_line(line: &str) -> Result<Self> {
        let code = line.split('\t').next().unwrap_or_default();
        match code {
            "H" => Header::from_line(line).map(Gfa2Record::Header),
            "S" => Segment::from_line(line).map(Gfa2Record::Segment),
            "E" => Edge::from_line(line).map(Gfa2Record::Edge),
            "F" => Fragment::from_line(line).map(Gfa2Record::Fragment),
            "G" => Gap::from_line(line).map(Gfa2Record::Gap),
            "U" => Set::from_line(line).map(Gfa2Record::Set),
            "O" => Path::from_line(line).map(Gfa2Record::Path),
            other => Err(FormatError::malformed(other, "unknown GFA 2 record type")),
        }
    }

    fn to_line(&self) -> String {
        match self {
            Gfa2Record::Header(r) => r.to_line(),
            Gfa2Record::Segment(r) => r.to_line(),
            Gfa2Record::Edge(r) => r.to_line(),
            Gfa2Record::Fragment(r) => r.to_line(),
            Gfa2Record::Gap(r) => r.to_line(),
            Gfa2Record::Set(r) => r.to_line(),
            Gfa2Record::Path(r) => r.to_line(),
        }
    }
}

/// Streaming GFA 2 parser.
pub type Gfa2Parser<R> = TabDelimitedParser<R, Gfa2Record>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::primitives::Orientation;

    #[test]
    fn test_position() {
        assert_eq!("42".parse::<Position>().unwrap(), Position { value: 42, terminal: false });
        assert_eq!("100$".parse::<Position>().unwrap(), Position { value: 100, terminal: true });
        assert_eq!("100$".parse::<Position>().unwrap().to_string(), "100$");
        assert!("$".parse::<Position>().is_err());
        assert!("-1".parse::<Position>().is_err());
    }

    #[test]
    fn test_header() {
        let header = Header::from_line("H\tVN:Z:2.0\tTS:i:100").unwrap();
        assert_eq!(header.version().unwrap(), "2.0");
        assert_eq!(header.trace_spacing().unwrap(), 100);
    }

    #[test]
    fn test_segment() {
        let line = "S\ts1\t4\tACGT\tRC:i:12\tSH:H:ff00";
        let segment = Segment::from_line(line).unwrap();
        assert_eq!(segment.length, 4);
        assert_eq!(segment.read_count().unwrap(), 12);
        assert_eq!(segment.checksum().unwrap().bytes(), &[0xff, 0x00]);
        assert_eq!(segment.to_line(), line);
    }

    #[test]
    fn test_edge() {
        let line = "E\t*\ts1+\ts2-\t10\t100$\t0\t90\t90M\tKC:i:5";
        let edge = Edge::from_line(line).unwrap();
        assert_eq!(edge.id, None);
        assert_eq!(edge.target.orientation, Orientation::Reverse);
        assert!(edge.source_end.terminal);
        assert_eq!(edge.alignment.as_deref(), Some("90M"));
        assert_eq!(edge.kc().unwrap(), 5);
        assert_eq!(edge.to_line(), line);
    }

    #[test]
    fn test_fragment_and_gap() {
        let line = "F\ts1\tread1-\t0\t120$\t5\t125\t*";
        let fragment = Fragment::from_line(line).unwrap();
        assert_eq!(fragment.external.id, "read1");
        assert_eq!(fragment.alignment, None);
        assert_eq!(fragment.to_line(), line);

        let line = "G\tg1\ts1+\ts3+\t-50\t*";
        let gap = Gap::from_line(line).unwrap();
        assert_eq!(gap.distance, -50);
        assert_eq!(gap.variance, None);
        assert_eq!(gap.to_line(), line);
    }

    #[test]
    fn test_groups() {
        let line = "O\tp1\ts1+ s2- s3+\tUR:Z:x";
        let path = Path::from_line(line).unwrap();
        assert_eq!(path.references.len(), 3);
        assert_eq!(path.to_line(), line);

        let line = "U\t*\ts1 s2 e1";
        let set = Set::from_line(line).unwrap();
        assert_eq!(set.members, vec!["s1", "s2", "e1"]);
        assert_eq!(set.to_line(), line);
    }

    #[test]
    fn test_dispatch() {
        let data = "H\tVN:Z:2.0\nS\ts1\t4\t*\nE\te1\ts1+\ts1-\t0\t2\t2\t4$\t*\nX\tfoo\n";
        let results: Vec<_> = Gfa2Parser::new(data.as_bytes()).collect();
        assert_eq!(results.len(), 4);
        assert!(matches!(results[2], Ok(Gfa2Record::Edge(_))));
        assert!(matches!(results[3], Err(FormatError::MalformedToken { .. })));
    }
}
