//! PAF (Pairwise mApping Format) records.
//!
//! PAF is the alignment output of minimap2 and related tools:
//! - **12 mandatory columns**: query and target coordinates, strand, match counts, mapping quality
//! - **Optional tags**: `KEY:TYPE:VALUE` in the GFA tag syntax
//!
//! # Format Specification
//!
//! 1. **query name**
//! 2. **query length**
//! 3. **query start** (0-based)
//! 4. **query end** (0-based, exclusive)
//! 5. **strand**: `+` or `-`
//! 6. **target name**
//! 7. **target length**
//! 8. **target start**
//! 9. **target end**
//! 10. **residue matches**
//! 11. **alignment block length**
//! 12. **mapping quality** (0-255; 255 means missing)
//!
//! # Examples
//!
//! ```
//! use biotag::formats::paf::PafRecord;
//! use biotag::formats::primitives::{Orientation, TabDelimitedRecord};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let line = "read1\t1000\t10\t990\t-\tchr1\t50000\t2000\t2980\t950\t985\t60\ttp:A:P\tNM:i:35\tcg:Z:980M";
//! let record = PafRecord::from_line(line)?;
//!
//! assert_eq!(record.strand, Orientation::Reverse);
//! assert_eq!(record.alignment_type()?, 'P');
//! assert_eq!(record.edit_distance()?, 35);
//! assert_eq!(record.cigar()?, "980M");
//! assert_eq!(record.chaining_score_opt()?, None);
//! assert_eq!(record.to_line(), line);
//! # Ok(())
//! # }
//! ```

use crate::formats::attribute::set::append_tag_columns;
use crate::formats::attribute::{reserved_key, tagged_records, AttributeSet};
use crate::formats::primitives::{
    fields::{parse_required, split_fields},
    Orientation, Result, TabDelimitedParser, TabDelimitedRecord,
};
use std::str::FromStr;

/// Mapping quality value meaning "not available".
pub const MAPQ_MISSING: u8 = 255;

/// One PAF alignment line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PafRecord {
    /// Query sequence name
    pub query_name: String,
    /// Query sequence length
    pub query_length: u64,
    /// Query start (0-based)
    pub query_start: u64,
    /// Query end (0-based, exclusive)
    pub query_end: u64,
    /// Relative strand of query and target
    pub strand: Orientation,
    /// Target sequence name
    pub target_name: String,
    /// Target sequence length
    pub target_length: u64,
    /// Target start on the forward strand
    pub target_start: u64,
    /// Target end on the forward strand
    pub target_end: u64,
    /// Number of matching bases
    pub residue_matches: u64,
    /// Alignment block length, gaps included
    pub block_length: u64,
    /// Mapping quality (255 = missing)
    pub mapping_quality: u8,
    /// Optional tags in file order
    pub tags: AttributeSet,
}

impl PafRecord {
    /// Mapping quality, `None` when recorded as 255.
    pub fn mapping_quality_opt(&self) -> Option<u8> {
        (self.mapping_quality != MAPQ_MISSING).then_some(self.mapping_quality)
    }

    /// Aligned span on the query.
    pub fn query_span(&self) -> u64 {
        self.query_end.saturating_sub(self.query_start)
    }

    /// Aligned span on the target.
    pub fn target_span(&self) -> u64 {
        self.target_end.saturating_sub(self.target_start)
    }

    /// BLAST-like identity: residue matches over block length.
    ///
    /// `None` for an empty block.
    pub fn identity(&self) -> Option<f64> {
        (self.block_length > 0).then(|| self.residue_matches as f64 / self.block_length as f64)
    }

    reserved_key!(character "tp" => contains_tp, tp, tp_opt);
    reserved_key!(integer "cm" => contains_cm, cm, cm_opt);
    reserved_key!(integer "s1" => contains_s1, s1, s1_opt);
    reserved_key!(integer "s2" => contains_s2, s2, s2_opt);
    reserved_key!(integer "NM" => contains_nm, nm, nm_opt);
    reserved_key!(string "MD" => contains_md, md, md_opt);
    reserved_key!(integer "AS" => contains_alignment_score, alignment_score, alignment_score_opt);
    reserved_key!(integer "nn" => contains_nn, nn, nn_opt);
    reserved_key!(character "ts" => contains_ts, ts, ts_opt);
    reserved_key!(string "cg" => contains_cg, cg, cg_opt);
    reserved_key!(string "cs" => contains_cs, cs, cs_opt);
    reserved_key!(float "dv" => contains_dv, dv, dv_opt);
    reserved_key!(float "de" => contains_de, de, de_opt);
    reserved_key!(integer "rl" => contains_rl, rl, rl_opt);

    /// Alignment type (`tp`): `P` primary, `S` secondary, `I`/`i` inversion.
    pub fn alignment_type(&self) -> Result<char> {
        self.tp()
    }

    /// Number of minimizers on the chain (`cm`).
    pub fn minimizer_count(&self) -> Result<i64> {
        self.cm()
    }

    /// Chaining score (`s1`).
    pub fn chaining_score(&self) -> Result<i64> {
        self.s1()
    }

    /// Chaining score, if present.
    pub fn chaining_score_opt(&self) -> Result<Option<i64>> {
        self.s1_opt()
    }

    /// Best secondary chaining score (`s2`).
    pub fn secondary_chaining_score(&self) -> Result<i64> {
        self.s2()
    }

    /// Edit distance (`NM`).
    pub fn edit_distance(&self) -> Result<i64> {
        self.nm()
    }

    /// Edit distance, if present.
    pub fn edit_distance_opt(&self) -> Result<Option<i64>> {
        self.nm_opt()
    }

    /// Ambiguous bases in the alignment (`nn`).
    pub fn ambiguous_bases(&self) -> Result<i64> {
        self.nn()
    }

    /// Transcript strand (`ts`).
    pub fn transcript_strand(&self) -> Result<char> {
        self.ts()
    }

    /// CIGAR string (`cg`).
    pub fn cigar(&self) -> Result<&str> {
        self.cg()
    }

    /// CIGAR string, if present.
    pub fn cigar_opt(&self) -> Result<Option<&str>> {
        self.cg_opt()
    }

    /// Difference string (`cs`).
    pub fn difference_string(&self) -> Result<&str> {
        self.cs()
    }

    /// Approximate per-base sequence divergence (`dv`).
    pub fn divergence(&self) -> Result<f32> {
        self.dv()
    }

    /// Gap-compressed per-base divergence (`de`).
    pub fn gap_compressed_divergence(&self) -> Result<f32> {
        self.de()
    }

    /// Length of query regions harboring repetitive seeds (`rl`).
    pub fn repeat_length(&self) -> Result<i64> {
        self.rl()
    }
}

tagged_records!(PafRecord);

impl TabDelimitedRecord for PafRecord {
    fn from_line(line: &str) -> Result<Self> {
        let fields = split_fields(line, Self::expected_fields(), 0)?;

        Ok(PafRecord {
            query_name: fields[0].to_string(),
            query_length: parse_required(fields[1], "query length", 0)?,
            query_start: parse_required(fields[2], "query start", 0)?,
            query_end: parse_required(fields[3], "query end", 0)?,
            strand: Orientation::from_str(fields[4])?,
            target_name: fields[5].to_string(),
            target_length: parse_required(fields[6], "target length", 0)?,
            target_start: parse_required(fields[7], "target start", 0)?,
            target_end: parse_required(fields[8], "target end", 0)?,
            residue_matches: parse_required(fields[9], "residue matches", 0)?,
            block_length: parse_required(fields[10], "block length", 0)?,
            mapping_quality: parse_required(fields[11], "mapping quality", 0)?,
            tags: AttributeSet::from_tag_tokens(fields[12..].iter().copied())?,
        })
    }

    fn to_line(&self) -> String {
        let mut line = format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.query_name,
            self.query_length,
            self.query_start,
            self.query_end,
            self.strand,
            self.target_name,
            self.target_length,
            self.target_start,
            self.target_end,
            self.residue_matches,
            self.block_length,
            self.mapping_quality,
        );
        append_tag_columns(&mut line, &self.tags);
        line
    }

    fn expected_fields() -> Option<usize> {
        Some(12)
    }
}

/// Streaming PAF parser.
pub type PafParser<R> = TabDelimitedParser<R, PafRecord>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::primitives::FormatError;

    const LINE: &str = "q1\t500\t0\t480\t+\tt1\t9000\t100\t580\t470\t482\t60\ttp:A:P\tcm:i:40\ts1:i:420\tdv:f:0.0045\tZB:B:i,1,2";

    #[test]
    fn test_parse_columns() {
        let record = PafRecord::from_line(LINE).unwrap();
        assert_eq!(record.query_name, "q1");
        assert_eq!(record.query_span(), 480);
        assert_eq!(record.target_span(), 480);
        assert_eq!(record.strand, Orientation::Forward);
        assert_eq!(record.mapping_quality_opt(), Some(60));
        assert!((record.identity().unwrap() - 470.0 / 482.0).abs() < 1e-12);
        assert_eq!(record.tags.len(), 5);
    }

    #[test]
    fn test_round_trip() {
        let record = PafRecord::from_line(LINE).unwrap();
        assert_eq!(record.to_line(), LINE);

        let bare = "q\t1\t0\t1\t-\tt\t1\t0\t1\t1\t1\t255";
        let record = PafRecord::from_line(bare).unwrap();
        assert_eq!(record.mapping_quality_opt(), None);
        assert_eq!(record.to_line(), bare);
    }

    #[test]
    fn test_reserved_tags() {
        let record = PafRecord::from_line(LINE).unwrap();
        assert!(record.contains_tp());
        assert_eq!(record.alignment_type().unwrap(), 'P');
        assert_eq!(record.minimizer_count().unwrap(), 40);
        assert_eq!(record.chaining_score().unwrap(), 420);
        assert!((record.divergence().unwrap() - 0.0045).abs() < 1e-7);
        assert!(!record.contains_nm());
        assert!(matches!(record.edit_distance(), Err(FormatError::MissingRequiredValue { .. })));
        assert_eq!(record.edit_distance_opt().unwrap(), None);
        assert_eq!(record.tags.get_integers("ZB").unwrap(), vec![1, 2]);
    }

    #[test]
    fn test_wrong_type_tag() {
        let line = "q\t1\t0\t1\t+\tt\t1\t0\t1\t1\t1\t0\tNM:Z:three";
        let record = PafRecord::from_line(line).unwrap();
        assert!(matches!(record.nm(), Err(FormatError::WrongType { .. })));
        assert!(matches!(record.nm_opt(), Err(FormatError::WrongType { .. })));
    }

    #[test]
    fn test_invalid_lines() {
        assert!(matches!(
            PafRecord::from_line("q\t1\t0"),
            Err(FormatError::FieldCount { expected: 12, .. })
        ));
        assert!(matches!(
            PafRecord::from_line("q\t1\t0\t1\t*\tt\t1\t0\t1\t1\t1\t0"),
            Err(FormatError::InvalidOrientation(_))
        ));
        assert!(matches!(
            PafRecord::from_line("q\t1\t0\t1\t+\tt\t1\t0\t1\t1\t1\t300"),
            Err(FormatError::InvalidField { .. })
        ));
        assert!(matches!(
            PafRecord::from_line("q\t1\t0\t1\t+\tt\t1\t0\t1\t1\t1\t0\tNM:i:1\tNM:i:2"),
            Err(FormatError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn test_parser_stream() {
        let data = format!("{}\n\n{}\n", LINE, LINE.replace("q1", "q2"));
        let records: Vec<_> = PafParser::new(data.as_bytes())
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].query_name, "q2");
    }
}
