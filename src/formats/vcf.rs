//! VCF (Variant Call Format) headers, records and genotypes.
//!
//! # Format Specification
//!
//! VCF is a tab-delimited text format for sequence variants:
//! - **Meta-information lines** (`##`): fileformat, INFO, FORMAT, FILTER, contig
//! - **Column header** (`#CHROM`): fixed column names and sample IDs
//! - **Data lines**: 8 fixed columns, then FORMAT and one column per sample
//!
//! ```text
//! ##fileformat=VCFv4.3
//! ##INFO=<ID=DP,Number=1,Type=Integer,Description="Total Depth">
//! ##FORMAT=<ID=GT,Number=1,Type=String,Description="Genotype">
//! #CHROM  POS  ID   REF  ALT  QUAL  FILTER  INFO   FORMAT  s1
//! 20      14370 rs1 G    A    29    PASS    DP=14  GT      0|0
//! ```
//!
//! INFO entries become an [`AttributeSet`] on the record, and each sample
//! column becomes a [`VcfGenotype`] whose attributes are keyed by the
//! FORMAT list. Attribute types come from the header definitions, then
//! from the reserved keys of VCF 4.3, and default to String.
//!
//! # Examples
//!
//! ```
//! use biotag::formats::vcf::VcfRecord;
//! use biotag::formats::primitives::TabDelimitedRecord;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let line = "20\t14370\trs6054257\tG\tA,T\t29\tPASS\tDP=14;AF=0.5,0.1;DB\tGT:GL\t0/1:-1,-2,-3,-4,-5,-6";
//! let record = VcfRecord::from_line(line)?;
//!
//! assert_eq!(record.depth()?, 14);
//! assert_eq!(record.allele_frequency()?, vec![0.5, 0.1]);
//! assert!(record.in_dbsnp()?);
//! assert_eq!(record.genotypes[0].genotype_likelihoods()?.len(), 6);
//! assert_eq!(record.to_line(), line);
//! # Ok(())
//! # }
//! ```

use crate::formats::attribute::{
    genotype_alleles, number_a, number_g, number_r, ploidy, reserved_key, Attribute, AttributeSet,
    AttributeSetBuilder, AttributeStyle, Attributed, CardinalityContext, Number, TypeCode,
};
use crate::formats::primitives::{
    fields::{parse_optional, parse_required, split_fields},
    FormatError, Result, TabDelimitedRecord,
};
use flate2::read::MultiGzDecoder;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Fixed column names of the `#CHROM` line.
pub const FIXED_COLUMNS: [&str; 8] = ["CHROM", "POS", "ID", "REF", "ALT", "QUAL", "FILTER", "INFO"];

/// Typed definition of an INFO or FORMAT key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDefinition {
    /// Key
    pub id: String,
    /// Declared number of values
    pub number: Number,
    /// Declared value type
    pub type_code: TypeCode,
    /// Free-text description, unquoted
    pub description: String,
}

/// `##INFO` definition.
pub type InfoDefinition = FieldDefinition;

/// `##FORMAT` definition.
pub type FormatDefinition = FieldDefinition;

impl FieldDefinition {
    /// Definition of `id` with the given `Number`, type and description.
    pub fn new(id: impl Into<String>, number: Number, type_code: TypeCode, description: impl Into<String>) -> Self {
        FieldDefinition {
            id: id.into(),
            number,
            type_code,
            description: description.into(),
        }
    }

    /// Builds a definition from the `key=value` pairs inside `<...>`.
    fn from_pairs(pairs: &[(String, String)]) -> Result<Self> {
        let lookup = |name: &str| {
            pairs
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        };
        let id = lookup("ID").ok_or_else(|| FormatError::malformed("<...>", "definition without ID"))?;
        let number: Number = lookup("Number")
            .ok_or_else(|| FormatError::malformed(id, "definition without Number"))?
            .parse()?;
        let type_code = TypeCode::from_vcf_type(
            lookup("Type").ok_or_else(|| FormatError::malformed(id, "definition without Type"))?,
        )?;

        Ok(FieldDefinition::new(
            id,
            number,
            type_code,
            lookup("Description").unwrap_or_default(),
        ))
    }

    /// Header line for this definition, `kind` being `INFO` or `FORMAT`.
    pub fn to_header_line(&self, kind: &str) -> String {
        format!(
            "##{}=<ID={},Number={},Type={},Description=\"{}\">",
            kind,
            self.id,
            self.number,
            self.type_code.vcf_type().unwrap_or("String"),
            escape_quoted(&self.description),
        )
    }

    /// Definition of a reserved INFO key.
    pub fn reserved_info(key: &str) -> Option<Self> {
        use Number::{Fixed, A, R};
        use TypeCode::{Flag, Float, Integer, String as Text};

        let (number, type_code, description) = match key {
            "AA" => (Fixed(1), Text, "Ancestral allele"),
            "AC" => (A, Integer, "Allele count in genotypes, for each ALT allele"),
            "AD" => (R, Integer, "Total read depth for each allele"),
            "ADF" => (R, Integer, "Read depth for each allele on the forward strand"),
            "ADR" => (R, Integer, "Read depth for each allele on the reverse strand"),
            "AF" => (A, Float, "Allele frequency for each ALT allele"),
            "AN" => (Fixed(1), Integer, "Total number of alleles in called genotypes"),
            "BQ" => (Fixed(1), Float, "RMS base quality"),
            "CIGAR" => (A, Text, "Cigar string describing how to align an alternate allele to the reference allele"),
            "DB" => (Fixed(0), Flag, "dbSNP membership"),
            "DP" => (Fixed(1), Integer, "Combined depth across samples"),
            "END" => (Fixed(1), Integer, "End position on CHROM"),
            "H2" => (Fixed(0), Flag, "HapMap2 membership"),
            "H3" => (Fixed(0), Flag, "HapMap3 membership"),
            "MQ" => (Fixed(1), Float, "RMS mapping quality"),
            "MQ0" => (Fixed(1), Integer, "Number of MAPQ == 0 reads"),
            "NS" => (Fixed(1), Integer, "Number of samples with data"),
            "SB" => (Fixed(4), Integer, "Strand bias"),
            "SOMATIC" => (Fixed(0), Flag, "Somatic mutation"),
            "VALIDATED" => (Fixed(0), Flag, "Validated by follow-up experiment"),
            "1000G" => (Fixed(0), Flag, "1000 Genomes membership"),
            _ => return None,
        };
        Some(FieldDefinition::new(key, number, type_code, description))
    }

    /// Definition of a reserved FORMAT key.
    pub fn reserved_format(key: &str) -> Option<Self> {
        use Number::{Fixed, A, G, R};
        use TypeCode::{Float, Integer, String as Text};

        let (number, type_code, description) = match key {
            "AD" => (R, Integer, "Read depth for each allele"),
            "ADF" => (R, Integer, "Read depth for each allele on the forward strand"),
            "ADR" => (R, Integer, "Read depth for each allele on the reverse strand"),
            "DP" => (Fixed(1), Integer, "Read depth"),
            "EC" => (A, Integer, "Expected alternate allele counts"),
            "FT" => (Fixed(1), Text, "Filter indicating if this genotype was called"),
            "GL" => (G, Float, "Genotype likelihoods"),
            "GP" => (G, Float, "Genotype posterior probabilities"),
            "GQ" => (Fixed(1), Integer, "Conditional genotype quality"),
            "GT" => (Fixed(1), Text, "Genotype"),
            "HQ" => (Fixed(2), Integer, "Haplotype quality"),
            "MQ" => (Fixed(1), Integer, "RMS mapping quality"),
            "PL" => (G, Integer, "Phred-scaled genotype likelihoods rounded to the closest integer"),
            "PQ" => (Fixed(1), Integer, "Phasing quality"),
            "PS" => (Fixed(1), Integer, "Phase set"),
            _ => return None,
        };
        Some(FieldDefinition::new(key, number, type_code, description))
    }
}

/// `##FILTER` definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FilterDefinition {
    /// `ID` value.
    pub id: String,
    /// `Description` value, unescaped.
    pub description: String,
}

/// `##contig` line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Contig {
    /// `ID` value.
    pub id: String,
    /// `length`, when given.
    pub length: Option<u64>,
}

/// VCF header: meta-information lines and sample names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VcfHeader {
    /// Format version (e.g. `VCFv4.3`)
    pub fileformat: String,
    /// INFO definitions in file order
    pub info: Vec<InfoDefinition>,
    /// FORMAT definitions in file order
    pub format: Vec<FormatDefinition>,
    /// FILTER definitions in file order
    pub filters: Vec<FilterDefinition>,
    /// Contigs in file order
    pub contigs: Vec<Contig>,
    /// Every other `##key=value` line, verbatim
    pub metadata: Vec<(String, String)>,
    /// Sample names from the `#CHROM` line
    pub samples: Vec<String>,
}

impl VcfHeader {
    /// Creates an empty header.
    pub fn new(fileformat: impl Into<String>) -> Self {
        VcfHeader {
            fileformat: fileformat.into(),
            ..Default::default()
        }
    }

    /// Adds or replaces an INFO definition.
    pub fn add_info(&mut self, definition: InfoDefinition) {
        upsert(&mut self.info, definition);
    }

    /// Adds or replaces a FORMAT definition.
    pub fn add_format(&mut self, definition: FormatDefinition) {
        upsert(&mut self.format, definition);
    }

    /// `##INFO` line declaring `key`.
    pub fn info_definition(&self, key: &str) -> Option<&InfoDefinition> {
        self.info.iter().find(|d| d.id == key)
    }

    /// `##FORMAT` line declaring `key`.
    pub fn format_definition(&self, key: &str) -> Option<&FormatDefinition> {
        self.format.iter().find(|d| d.id == key)
    }

    /// Declared type of an INFO key: the header definition, then the
    /// reserved definition.
    pub fn info_type(&self, key: &str) -> Option<TypeCode> {
        match self.info_definition(key) {
            Some(definition) => Some(definition.type_code),
            None => reserved_info_type(key),
        }
    }

    /// Declared type of a FORMAT key, resolved like [`VcfHeader::info_type`].
    pub fn format_type(&self, key: &str) -> Option<TypeCode> {
        match self.format_definition(key) {
            Some(definition) => Some(definition.type_code),
            None => reserved_format_type(key),
        }
    }

    /// Declared `Number` of an INFO key.
    pub fn info_number(&self, key: &str) -> Option<Number> {
        self.info_definition(key)
            .map(|d| d.number)
            .or_else(|| FieldDefinition::reserved_info(key).map(|d| d.number))
    }

    /// Declared `Number` of a FORMAT key.
    pub fn format_number(&self, key: &str) -> Option<Number> {
        self.format_definition(key)
            .map(|d| d.number)
            .or_else(|| FieldDefinition::reserved_format(key).map(|d| d.number))
    }

    /// Column index of a sample, if present.
    pub fn sample_index(&self, name: &str) -> Option<usize> {
        self.samples.iter().position(|s| s == name)
    }

    /// Parses one `##` line into the header.
    ///
    /// INFO/FORMAT/FILTER/contig lines that cannot be parsed are logged and
    /// skipped; other lines are kept verbatim in [`VcfHeader::metadata`].
    pub fn parse_metadata_line(&mut self, line: &str) {
        let Some((key, value)) = line.trim_start_matches("##").split_once('=') else {
            log::warn!("ignoring header line without '=': {}", line);
            return;
        };

        match key {
            "fileformat" => self.fileformat = value.to_string(),
            "INFO" | "FORMAT" => {
                match parse_structured(value).ok_or_else(|| FormatError::malformed(value, "unbalanced <...>"))
                    .and_then(|pairs| FieldDefinition::from_pairs(&pairs))
                {
                    Ok(definition) if key == "INFO" => self.add_info(definition),
                    Ok(definition) => self.add_format(definition),
                    Err(e) => log::warn!("ignoring {} definition: {}", key, e),
                }
            }
            "FILTER" => match parse_structured(value).as_deref().and_then(|pairs| {
                Some(FilterDefinition {
                    id: pair_value(pairs, "ID")?.to_string(),
                    description: pair_value(pairs, "Description").unwrap_or_default().to_string(),
                })
            }) {
                Some(filter) => self.filters.push(filter),
                None => log::warn!("ignoring FILTER definition: {}", value),
            },
            "contig" => match parse_structured(value).as_deref().and_then(|pairs| {
                Some(Contig {
                    id: pair_value(pairs, "ID")?.to_string(),
                    length: pair_value(pairs, "length").and_then(|l| l.parse().ok()),
                })
            }) {
                Some(contig) => self.contigs.push(contig),
                None => log::warn!("ignoring contig line: {}", value),
            },
            _ => self.metadata.push((key.to_string(), value.to_string())),
        }
    }

    /// Parses the `#CHROM` line, taking sample names after FORMAT.
    pub fn parse_column_header(&mut self, line: &str) -> Result<()> {
        let columns = split_fields(line.trim_start_matches('#'), Some(FIXED_COLUMNS.len()), 0)?;

        for (expected, actual) in FIXED_COLUMNS.iter().zip(&columns) {
            if expected != actual {
                return Err(FormatError::InvalidField {
                    field: "column header".to_string(),
                    line: 0,
                    reason: format!("expected '{}', found '{}'", expected, actual),
                });
            }
        }

        self.samples = columns.iter().skip(9).map(|s| s.to_string()).collect();
        Ok(())
    }

    /// Serializes the header: fileformat, INFO, FORMAT, FILTER, contigs,
    /// other metadata, then the `#CHROM` line.
    pub fn to_header_lines(&self) -> Vec<String> {
        let mut lines = vec![format!("##fileformat={}", self.fileformat)];

        lines.extend(self.info.iter().map(|d| d.to_header_line("INFO")));
        lines.extend(self.format.iter().map(|d| d.to_header_line("FORMAT")));
        lines.extend(self.filters.iter().map(|f| {
            format!(
                "##FILTER=<ID={},Description=\"{}\">",
                f.id,
                escape_quoted(&f.description)
            )
        }));
        lines.extend(self.contigs.iter().map(|c| match c.length {
            Some(length) => format!("##contig=<ID={},length={}>", c.id, length),
            None => format!("##contig=<ID={}>", c.id),
        }));
        lines.extend(self.metadata.iter().map(|(k, v)| format!("##{}={}", k, v)));

        let mut columns = format!("#{}", FIXED_COLUMNS.join("\t"));
        if !self.samples.is_empty() {
            columns.push_str("\tFORMAT");
            for sample in &self.samples {
                columns.push('\t');
                columns.push_str(sample);
            }
        }
        lines.push(columns);

        lines
    }
}

fn upsert(definitions: &mut Vec<FieldDefinition>, definition: FieldDefinition) {
    match definitions.iter_mut().find(|d| d.id == definition.id) {
        Some(existing) => *existing = definition,
        None => definitions.push(definition),
    }
}

fn pair_value<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
    pairs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

fn reserved_info_type(key: &str) -> Option<TypeCode> {
    FieldDefinition::reserved_info(key).map(|d| d.type_code)
}

fn reserved_format_type(key: &str) -> Option<TypeCode> {
    FieldDefinition::reserved_format(key).map(|d| d.type_code)
}

/// Splits `<ID=X,Description="a, b">` into key/value pairs.
///
/// Commas inside double quotes do not split, and `\"` / `\\` are unescaped.
/// Returns `None` if the brackets or quotes are unbalanced.
fn parse_structured(value: &str) -> Option<Vec<(String, String)>> {
    let inner = value.strip_prefix('<')?.strip_suffix('>')?;

    let mut pairs = Vec::new();
    let mut key = String::new();
    let mut current = String::new();
    let mut in_key = true;
    let mut quoted = false;
    let mut escaped = false;

    for c in inner.chars() {
        if quoted {
            match c {
                _ if escaped => {
                    current.push(c);
                    escaped = false;
                }
                '\\' => escaped = true,
                '"' => quoted = false,
                _ => current.push(c),
            }
            continue;
        }

        match c {
            '"' if !in_key => quoted = true,
            '=' if in_key => in_key = false,
            ',' if in_key => return None,
            ',' => {
                pairs.push((std::mem::take(&mut key), std::mem::take(&mut current)));
                in_key = true;
            }
            _ if in_key => key.push(c),
            _ => current.push(c),
        }
    }

    if quoted || in_key {
        return None;
    }
    pairs.push((key, current));
    Some(pairs)
}

fn escape_quoted(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

/// One sample column of a VCF record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VcfGenotype {
    /// Sample name, known when parsed with a header
    pub sample_id: Option<String>,
    /// Reference allele of the owning record
    pub reference: String,
    /// Alternate alleles of the owning record
    pub alternate: Vec<String>,
    /// FORMAT values keyed by FORMAT key
    pub fields: AttributeSet,
}

impl Attributed for VcfGenotype {
    fn attributes(&self) -> &AttributeSet {
        &self.fields
    }

    fn cardinality(&self) -> CardinalityContext<'_> {
        CardinalityContext::sample(self.alternate.len(), self.gt_text())
    }
}

impl VcfGenotype {
    /// Starts a genotype for `sample_id`.
    pub fn builder(sample_id: impl Into<String>) -> VcfGenotypeBuilder {
        VcfGenotypeBuilder::new(sample_id)
    }

    fn gt_text(&self) -> Option<&str> {
        self.fields
            .get("GT")
            .and_then(|gt| gt.values().first())
            .map(String::as_str)
    }

    /// Expected count for `Number=A`.
    pub fn number_a(&self) -> usize {
        number_a(self.alternate.len())
    }

    /// Expected count for `Number=R`.
    pub fn number_r(&self) -> usize {
        number_r(self.alternate.len())
    }

    /// Expected count for `Number=G`, using the ploidy of `GT`.
    pub fn number_g(&self) -> Result<usize> {
        number_g(self.alternate.len(), self.ploidy()?)
    }

    /// Ploidy of the `GT` call.
    pub fn ploidy(&self) -> Result<usize> {
        match self.gt_text() {
            Some(gt) => ploidy(gt),
            None => Err(FormatError::InvalidGenotype {
                reason: "GT is absent".to_string(),
            }),
        }
    }

    /// `true` if `GT` is present and phased (`|`).
    pub fn is_phased(&self) -> bool {
        self.gt_text().is_some_and(|gt| gt.contains('|') && !gt.contains('/'))
    }

    /// Allele indices of `GT`; `.` alleles are `None`.
    pub fn allele_indices(&self) -> Result<Vec<Option<usize>>> {
        let gt = self.gt_text().ok_or_else(|| FormatError::InvalidGenotype {
            reason: "GT is absent".to_string(),
        })?;

        genotype_alleles(gt)?
            .into_iter()
            .map(|allele| match allele {
                "." => Ok(None),
                _ => allele
                    .parse::<usize>()
                    .ok()
                    .filter(|&index| index <= self.alternate.len())
                    .map(Some)
                    .ok_or_else(|| FormatError::InvalidGenotype {
                        reason: format!("bad allele '{}' in '{}'", allele, gt),
                    }),
            })
            .collect()
    }

    reserved_key!(integers "AD" [Number::R] => contains_ad, ad, ad_opt);
    reserved_key!(integers "ADF" [Number::R] => contains_adf, adf, adf_opt);
    reserved_key!(integers "ADR" [Number::R] => contains_adr, adr, adr_opt);
    reserved_key!(integer "DP" => contains_dp, dp, dp_opt);
    reserved_key!(integers "EC" [Number::A] => contains_ec, ec, ec_opt);
    reserved_key!(string "FT" => contains_ft, ft, ft_opt);
    reserved_key!(floats "GL" [Number::G] => contains_gl, gl, gl_opt);
    reserved_key!(floats "GP" [Number::G] => contains_gp, gp, gp_opt);
    reserved_key!(integer "GQ" => contains_gq, gq, gq_opt);
    reserved_key!(string "GT" => contains_gt, gt, gt_opt);
    reserved_key!(integers "HQ" [Number::Fixed(2)] => contains_hq, hq, hq_opt);
    reserved_key!(integer "MQ" => contains_mq, mq, mq_opt);
    reserved_key!(integers "PL" [Number::G] => contains_pl, pl, pl_opt);
    reserved_key!(integer "PQ" => contains_pq, pq, pq_opt);
    reserved_key!(integer "PS" => contains_ps, ps, ps_opt);

    /// Per-allele read depth (`AD`).
    pub fn allele_depths(&self) -> Result<Vec<i64>> {
        self.ad()
    }

    /// Sample read depth (`DP`).
    pub fn read_depth(&self) -> Result<i64> {
        self.dp()
    }

    /// Raw `GT` string.
    pub fn genotype(&self) -> Result<&str> {
        self.gt()
    }

    /// Conditional genotype quality (`GQ`).
    pub fn genotype_quality(&self) -> Result<i64> {
        self.gq()
    }

    /// Log10 genotype likelihoods (`GL`).
    pub fn genotype_likelihoods(&self) -> Result<Vec<f32>> {
        self.gl()
    }

    /// Genotype posterior probabilities (`GP`).
    pub fn genotype_posteriors(&self) -> Result<Vec<f32>> {
        self.gp()
    }

    /// Phred-scaled genotype likelihoods (`PL`).
    pub fn phred_likelihoods(&self) -> Result<Vec<i64>> {
        self.pl()
    }

    /// Haplotype qualities (`HQ`).
    pub fn haplotype_qualities(&self) -> Result<Vec<i64>> {
        self.hq()
    }

    /// RMS mapping quality (`MQ`).
    pub fn mapping_quality(&self) -> Result<i64> {
        self.mq()
    }

    /// Phase set (`PS`).
    pub fn phase_set(&self) -> Result<i64> {
        self.ps()
    }

    /// Phasing quality (`PQ`).
    pub fn phasing_quality(&self) -> Result<i64> {
        self.pq()
    }

    /// Per-sample filter (`FT`).
    pub fn filter(&self) -> Result<&str> {
        self.ft()
    }
}

/// A VCF data line.
///
/// Equality and hashing compare `quality` by bit pattern, so a record with
/// a NaN quality equals its own clone.
#[derive(Debug, Clone)]
pub struct VcfRecord {
    /// Chromosome
    pub chrom: String,
    /// Position (1-based)
    pub pos: u64,
    /// Identifiers (`.` is empty)
    pub ids: Vec<String>,
    /// Reference allele
    pub reference: String,
    /// Alternate alleles (`.` is empty)
    pub alternate: Vec<String>,
    /// Phred-scaled quality
    pub quality: Option<f64>,
    /// Filters (`.` is empty, `PASS` is `["PASS"]`)
    pub filters: Vec<String>,
    /// INFO attributes
    pub info: AttributeSet,
    /// FORMAT keys
    pub format: Vec<String>,
    /// One entry per sample column
    pub genotypes: Vec<VcfGenotype>,
}

impl PartialEq for VcfRecord {
    fn eq(&self, other: &Self) -> bool {
        self.chrom == other.chrom
            && self.pos == other.pos
            && self.ids == other.ids
            && self.reference == other.reference
            && self.alternate == other.alternate
            && self.quality.map(f64::to_bits) == other.quality.map(f64::to_bits)
            && self.filters == other.filters
            && self.info == other.info
            && self.format == other.format
            && self.genotypes == other.genotypes
    }
}

impl Eq for VcfRecord {}

impl Hash for VcfRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.chrom.hash(state);
        self.pos.hash(state);
        self.ids.hash(state);
        self.reference.hash(state);
        self.alternate.hash(state);
        self.quality.map(f64::to_bits).hash(state);
        self.filters.hash(state);
        self.info.hash(state);
        self.format.hash(state);
        self.genotypes.hash(state);
    }
}

impl Attributed for VcfRecord {
    fn attributes(&self) -> &AttributeSet {
        &self.info
    }

    fn cardinality(&self) -> CardinalityContext<'_> {
        CardinalityContext::record(self.alternate.len())
    }
}

impl VcfRecord {
    /// Record builder emitting genotypes in the order of `samples`.
    pub fn builder<S: AsRef<str>>(samples: &[S]) -> VcfRecordBuilder {
        VcfRecordBuilder::new(samples)
    }

    /// Parses a data line, typing attributes from the header definitions
    /// and naming genotypes after the header samples.
    ///
    /// # Errors
    ///
    /// Besides the [`TabDelimitedRecord::from_line`] errors, fails with
    /// [`FormatError::FieldCount`] when the header names samples and the
    /// line has a different number of sample columns.
    pub fn from_line_with_header(line: &str, header: &VcfHeader) -> Result<Self> {
        parse_record(line, Some(header))
    }

    /// Expected count for `Number=A`.
    pub fn number_a(&self) -> usize {
        number_a(self.alternate.len())
    }

    /// Expected count for `Number=R`.
    pub fn number_r(&self) -> usize {
        number_r(self.alternate.len())
    }

    /// Expected count for `Number=G` at the given ploidy.
    pub fn number_g(&self, ploidy: usize) -> Result<usize> {
        number_g(self.alternate.len(), ploidy)
    }

    /// `true` if FILTER is `PASS`.
    pub fn is_pass(&self) -> bool {
        self.filters.len() == 1 && self.filters[0] == "PASS"
    }

    /// Genotype of the named sample.
    pub fn genotype(&self, sample: &str) -> Option<&VcfGenotype> {
        self.genotypes
            .iter()
            .find(|g| g.sample_id.as_deref() == Some(sample))
    }

    reserved_key!(string "AA" => contains_aa, aa, aa_opt);
    reserved_key!(integers "AC" [Number::A] => contains_ac, ac, ac_opt);
    reserved_key!(integers "AD" [Number::R] => contains_ad, ad, ad_opt);
    reserved_key!(integers "ADF" [Number::R] => contains_adf, adf, adf_opt);
    reserved_key!(integers "ADR" [Number::R] => contains_adr, adr, adr_opt);
    reserved_key!(floats "AF" [Number::A] => contains_af, af, af_opt);
    reserved_key!(integer "AN" => contains_an, an, an_opt);
    reserved_key!(float "BQ" => contains_bq, bq, bq_opt);
    reserved_key!(strings "CIGAR" [Number::A] => contains_cigar, cigar, cigar_opt);
    reserved_key!(flag "DB" => contains_db, db, db_opt);
    reserved_key!(integer "DP" => contains_dp, dp, dp_opt);
    reserved_key!(integer "END" => contains_end, end, end_opt);
    reserved_key!(flag "H2" => contains_h2, h2, h2_opt);
    reserved_key!(flag "H3" => contains_h3, h3, h3_opt);
    reserved_key!(float "MQ" => contains_mq, mq, mq_opt);
    reserved_key!(integer "MQ0" => contains_mq0, mq0, mq0_opt);
    reserved_key!(integer "NS" => contains_ns, ns, ns_opt);
    reserved_key!(integers "SB" [Number::Fixed(4)] => contains_sb, sb, sb_opt);
    reserved_key!(flag "SOMATIC" => contains_somatic, somatic, somatic_opt);
    reserved_key!(flag "VALIDATED" => contains_validated, validated, validated_opt);
    reserved_key!(flag "1000G" => contains_thousand_genomes, thousand_genomes, thousand_genomes_opt);

    /// Ancestral allele (`AA`).
    pub fn ancestral_allele(&self) -> Result<&str> {
        self.aa()
    }

    /// Allele count per ALT allele (`AC`).
    pub fn allele_count(&self) -> Result<Vec<i64>> {
        self.ac()
    }

    /// Read depth per allele (`AD`).
    pub fn allele_depths(&self) -> Result<Vec<i64>> {
        self.ad()
    }

    /// Allele frequency per ALT allele (`AF`).
    pub fn allele_frequency(&self) -> Result<Vec<f32>> {
        self.af()
    }

    /// Allele frequencies, if present.
    pub fn allele_frequency_opt(&self) -> Result<Option<Vec<f32>>> {
        self.af_opt()
    }

    /// Total number of called alleles (`AN`).
    pub fn allele_number(&self) -> Result<i64> {
        self.an()
    }

    /// RMS base quality (`BQ`).
    pub fn base_quality(&self) -> Result<f32> {
        self.bq()
    }

    /// dbSNP membership (`DB`).
    pub fn in_dbsnp(&self) -> Result<bool> {
        self.db()
    }

    /// Combined depth (`DP`).
    pub fn depth(&self) -> Result<i64> {
        self.dp()
    }

    /// Combined depth, if present.
    pub fn depth_opt(&self) -> Result<Option<i64>> {
        self.dp_opt()
    }

    /// End position (`END`).
    pub fn end_position(&self) -> Result<i64> {
        self.end()
    }

    /// RMS mapping quality (`MQ`).
    pub fn mapping_quality(&self) -> Result<f32> {
        self.mq()
    }

    /// Samples with data (`NS`).
    pub fn sample_count(&self) -> Result<i64> {
        self.ns()
    }

    /// Strand bias (`SB`).
    pub fn strand_bias(&self) -> Result<Vec<i64>> {
        self.sb()
    }

    /// Somatic mutation flag (`SOMATIC`).
    pub fn is_somatic(&self) -> Result<bool> {
        self.somatic()
    }
}

fn parse_record(line: &str, header: Option<&VcfHeader>) -> Result<VcfRecord> {
    let fields = split_fields(line, Some(FIXED_COLUMNS.len()), 0)?;

    let alternate = match fields[4] {
        "." => Vec::new(),
        alts => alts.split(',').map(str::to_string).collect(),
    };
    let reference = fields[3].to_string();

    let info = AttributeSet::from_info_field(fields[7], |key| match header {
        Some(header) => header.info_type(key),
        None => reserved_info_type(key),
    })?;

    let format: Vec<String> = match fields.get(8) {
        Some(keys) if !keys.is_empty() && *keys != "." => keys.split(':').map(str::to_string).collect(),
        _ => Vec::new(),
    };

    let columns = fields.get(9..).unwrap_or_default();
    let samples = header.map(|h| h.samples.as_slice()).unwrap_or_default();
    if !samples.is_empty() && columns.len() != samples.len() {
        return Err(FormatError::FieldCount {
            expected: 9 + samples.len(),
            actual: fields.len(),
            line: 0,
        });
    }

    let genotypes = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            let fields = parse_sample_column(column, &format, header)?;
            Ok(VcfGenotype {
                sample_id: samples.get(i).cloned(),
                reference: reference.clone(),
                alternate: alternate.clone(),
                fields,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(VcfRecord {
        chrom: fields[0].to_string(),
        pos: parse_required(fields[1], "POS", 0)?,
        ids: split_missing(fields[2], ';'),
        reference,
        alternate,
        quality: parse_optional(fields[5], "QUAL", 0)?,
        filters: split_missing(fields[6], ';'),
        info,
        format,
        genotypes,
    })
}

fn parse_sample_column(column: &str, format: &[String], header: Option<&VcfHeader>) -> Result<AttributeSet> {
    let values: Vec<&str> = column.split(':').collect();
    if values.len() > format.len() {
        return Err(FormatError::malformed(column, "more sample values than FORMAT keys"));
    }

    let mut builder = AttributeSetBuilder::new();
    for (key, value) in format.iter().zip(values) {
        let declared = match header {
            Some(header) => header.format_type(key),
            None => reserved_format_type(key),
        };
        builder.put(Attribute::from_format_value(key, value, declared)?)?;
    }
    Ok(builder.build())
}

fn split_missing(value: &str, separator: char) -> Vec<String> {
    match value {
        "." | "" => Vec::new(),
        _ => value.split(separator).map(str::to_string).collect(),
    }
}

fn join_or_dot(values: &[String], separator: &str) -> String {
    if values.is_empty() {
        ".".to_string()
    } else {
        values.join(separator)
    }
}

impl TabDelimitedRecord for VcfRecord {
    fn from_line(line: &str) -> Result<Self> {
        parse_record(line, None)
    }

    fn to_line(&self) -> String {
        let mut line = format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.chrom,
            self.pos,
            join_or_dot(&self.ids, ";"),
            self.reference,
            join_or_dot(&self.alternate, ","),
            self.quality.map_or_else(|| ".".to_string(), |q| q.to_string()),
            join_or_dot(&self.filters, ";"),
            self.info.to_text(AttributeStyle::Info),
        );

        if !self.format.is_empty() {
            line.push('\t');
            line.push_str(&self.format.join(":"));
            for genotype in &self.genotypes {
                line.push('\t');
                line.push_str(&genotype.fields.format_values(&self.format));
            }
        }

        line
    }

    fn expected_fields() -> Option<usize> {
        Some(FIXED_COLUMNS.len())
    }
}

/// Builder for one sample's FORMAT values.
#[derive(Debug, Clone)]
pub struct VcfGenotypeBuilder {
    sample_id: String,
    fields: AttributeSetBuilder,
}

impl VcfGenotypeBuilder {
    /// Empty genotype for `sample_id`.
    pub fn new(sample_id: impl Into<String>) -> Self {
        VcfGenotypeBuilder {
            sample_id: sample_id.into(),
            fields: AttributeSetBuilder::new(),
        }
    }

    /// Sets `GT`. A missing call (`./.`) is accepted.
    pub fn genotype(&mut self, gt: &str) -> Result<&mut Self> {
        genotype_alleles(gt)?;
        self.fields.put_string("GT", gt)?;
        Ok(self)
    }

    /// FORMAT values under construction.
    pub fn fields(&mut self) -> &mut AttributeSetBuilder {
        &mut self.fields
    }

    /// Clears all values, keeping the sample name.
    pub fn reset(&mut self) -> &mut Self {
        self.fields.reset();
        self
    }

    /// Finishes the genotype. Alleles are filled in by [`VcfRecordBuilder`].
    pub fn build(self) -> VcfGenotype {
        VcfGenotype {
            sample_id: Some(self.sample_id),
            reference: String::new(),
            alternate: Vec::new(),
            fields: self.fields.build(),
        }
    }
}

/// Builder for [`VcfRecord`].
///
/// Genotypes may be added in any order; [`VcfRecordBuilder::build`] emits
/// them in sample order, with an empty genotype for every sample that was
/// never added.
///
/// # Examples
///
/// ```
/// use biotag::formats::vcf::{VcfGenotype, VcfRecord};
/// use biotag::formats::primitives::TabDelimitedRecord;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut builder = VcfRecord::builder(&["s1", "s2"]);
/// builder.chrom("chr1").pos(100).reference("A").alternate(&["T"]);
/// builder.info().put_integer("DP", 30)?;
///
/// let mut s2 = VcfGenotype::builder("s2");
/// s2.genotype("1/1")?;
/// builder.add_genotype(s2.build())?;
///
/// let mut s1 = VcfGenotype::builder("s1");
/// s1.genotype("0/1")?.fields().put_integer("DP", 12)?;
/// builder.add_genotype(s1.build())?;
///
/// let record = builder.build();
/// assert_eq!(record.to_line(), "chr1\t100\t.\tA\tT\t.\t.\tDP=30\tGT:DP\t0/1:12\t1/1:.");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct VcfRecordBuilder {
    samples: Vec<String>,
    chrom: String,
    pos: u64,
    ids: Vec<String>,
    reference: String,
    alternate: Vec<String>,
    quality: Option<f64>,
    filters: Vec<String>,
    info: AttributeSetBuilder,
    format: Option<Vec<String>>,
    genotypes: HashMap<String, VcfGenotype>,
}

impl VcfRecordBuilder {
    /// Builder for a record over the header's `samples`.
    pub fn new<S: AsRef<str>>(samples: &[S]) -> Self {
        VcfRecordBuilder {
            samples: samples.iter().map(|s| s.as_ref().to_string()).collect(),
            ..Default::default()
        }
    }

    /// Chromosome.
    pub fn chrom(&mut self, chrom: impl Into<String>) -> &mut Self {
        self.chrom = chrom.into();
        self
    }

    /// 1-based position.
    pub fn pos(&mut self, pos: u64) -> &mut Self {
        self.pos = pos;
        self
    }

    /// Adds an ID; repeated calls join with `;`.
    pub fn id(&mut self, id: impl Into<String>) -> &mut Self {
        self.ids.push(id.into());
        self
    }

    /// Reference allele.
    pub fn reference(&mut self, reference: impl Into<String>) -> &mut Self {
        self.reference = reference.into();
        self
    }

    /// Replaces the ALT alleles.
    pub fn alternate<S: AsRef<str>>(&mut self, alleles: &[S]) -> &mut Self {
        self.alternate = alleles.iter().map(|a| a.as_ref().to_string()).collect();
        self
    }

    /// Phred-scaled `QUAL`.
    pub fn quality(&mut self, quality: f64) -> &mut Self {
        self.quality = Some(quality);
        self
    }

    /// Adds a failed filter, or `PASS`.
    pub fn filter(&mut self, filter: impl Into<String>) -> &mut Self {
        self.filters.push(filter.into());
        self
    }

    /// INFO attributes under construction.
    pub fn info(&mut self) -> &mut AttributeSetBuilder {
        &mut self.info
    }

    /// Sets the FORMAT keys explicitly. Without this, FORMAT is the union
    /// of genotype keys with `GT` first.
    pub fn format<S: AsRef<str>>(&mut self, keys: &[S]) -> &mut Self {
        self.format = Some(keys.iter().map(|k| k.as_ref().to_string()).collect());
        self
    }

    /// Adds one sample's genotype.
    ///
    /// # Errors
    ///
    /// [`FormatError::InvalidField`] if the genotype has no sample name or
    /// names a sample the builder does not know, and
    /// [`FormatError::DuplicateKey`] if that sample already has a genotype.
    pub fn add_genotype(&mut self, genotype: VcfGenotype) -> Result<&mut Self> {
        let sample = match genotype.sample_id.as_deref() {
            Some(sample) if self.samples.iter().any(|s| s == sample) => sample.to_string(),
            other => {
                return Err(FormatError::InvalidField {
                    field: "sample".to_string(),
                    line: 0,
                    reason: format!("unknown sample {:?}", other),
                })
            }
        };

        if self.genotypes.contains_key(&sample) {
            return Err(FormatError::DuplicateKey { key: sample });
        }
        self.genotypes.insert(sample, genotype);
        Ok(self)
    }

    /// Clears everything except the sample list.
    pub fn reset(&mut self) -> &mut Self {
        let samples = std::mem::take(&mut self.samples);
        *self = VcfRecordBuilder {
            samples,
            ..Default::default()
        };
        self
    }

    /// Finishes the record, ordering genotypes to match the sample list.
    ///
    /// Without an explicit FORMAT, keys are `GT` first and then in order of
    /// first appearance.
    pub fn build(mut self) -> VcfRecord {
        let format = self.format.take().unwrap_or_else(|| self.derived_format());

        let genotypes = if self.samples.is_empty() {
            Vec::new()
        } else {
            self.samples
                .iter()
                .map(|sample| {
                    let fields = self
                        .genotypes
                        .remove(sample)
                        .map(|g| g.fields)
                        .unwrap_or_default();
                    VcfGenotype {
                        sample_id: Some(sample.clone()),
                        reference: self.reference.clone(),
                        alternate: self.alternate.clone(),
                        fields,
                    }
                })
                .collect()
        };

        VcfRecord {
            chrom: self.chrom,
            pos: self.pos,
            ids: self.ids,
            reference: self.reference,
            alternate: self.alternate,
            quality: self.quality,
            filters: self.filters,
            info: self.info.build(),
            format,
            genotypes,
        }
    }

    fn derived_format(&self) -> Vec<String> {
        let mut keys: Vec<String> = Vec::new();
        for sample in &self.samples {
            let Some(genotype) = self.genotypes.get(sample) else {
                continue;
            };
            for key in genotype.fields.keys() {
                if !keys.iter().any(|k| k == key) {
                    keys.push(key.to_string());
                }
            }
        }

        if let Some(gt) = keys.iter().position(|k| k == "GT") {
            let gt = keys.remove(gt);
            keys.insert(0, gt);
        }
        keys
    }
}

/// Streaming VCF parser.
///
/// The header is read on construction; iteration yields data records typed
/// by that header.
///
/// # Examples
///
/// ```
/// use biotag::formats::vcf::VcfParser;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let data = "##fileformat=VCFv4.3\n\
///             ##INFO=<ID=XS,Number=1,Type=Integer,Description=\"Extra, score\">\n\
///             #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
///             1\t10\t.\tA\tG\t.\tPASS\tXS=4\n";
/// let mut parser = VcfParser::new(data.as_bytes())?;
/// assert_eq!(parser.header().info[0].description, "Extra, score");
///
/// let record = parser.next().unwrap()?;
/// assert_eq!(record.info.get_integer("XS")?, 4);
/// # Ok(())
/// # }
/// ```
pub struct VcfParser<R: Read> {
    reader: BufReader<R>,
    line_buf: String,
    line_number: usize,
    header: VcfHeader,
    pending: Option<String>,
}

impl<R: Read> VcfParser<R> {
    /// Creates a parser and reads the header.
    ///
    /// A file without `#CHROM` line is accepted; its first data line is
    /// kept for iteration.
    pub fn new(reader: R) -> Result<Self> {
        let mut parser = VcfParser {
            reader: BufReader::new(reader),
            line_buf: String::with_capacity(1024),
            line_number: 0,
            header: VcfHeader::new("VCFv4.3"),
            pending: None,
        };
        parser.read_header()?;
        Ok(parser)
    }

    fn read_header(&mut self) -> Result<()> {
        loop {
            self.line_buf.clear();
            if self.reader.read_line(&mut self.line_buf)? == 0 {
                return Ok(());
            }
            self.line_number += 1;

            let line = self.line_buf.trim_end_matches(['\n', '\r']);
            if line.is_empty() {
                continue;
            }

            if line.starts_with("##") {
                log::trace!("header line {}: {}", self.line_number, line);
                self.header.parse_metadata_line(line);
            } else if line.starts_with("#CHROM") {
                return self.header.parse_column_header(line).map_err(|e| match e {
                    FormatError::InvalidField { field, reason, .. } => FormatError::InvalidField {
                        field,
                        line: self.line_number,
                        reason,
                    },
                    other => other,
                });
            } else {
                self.pending = Some(line.to_string());
                return Ok(());
            }
        }
    }

    /// Header read before the first record.
    pub fn header(&self) -> &VcfHeader {
        &self.header
    }

    /// Consumes the parser, keeping the header.
    pub fn into_header(self) -> VcfHeader {
        self.header
    }

    /// Returns the current line number (1-based).
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    fn parse(&self, line: &str) -> Result<VcfRecord> {
        let parsed = VcfRecord::from_line_with_header(line, &self.header);
        if let Err(e) = &parsed {
            log::debug!("line {}: {}", self.line_number, e);
        }
        parsed
    }
}

impl VcfParser<File> {
    /// Creates a parser from a file path.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(File::open(path)?)
    }
}

impl VcfParser<MultiGzDecoder<File>> {
    /// Creates a parser from a gzip or bgzip compressed file.
    pub fn from_gzip_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::new(MultiGzDecoder::new(File::open(path)?))
    }
}

impl<R: Read> Iterator for VcfParser<R> {
    type Item = Result<VcfRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(line) = self.pending.take() {
            return Some(self.parse(&line));
        }

        loop {
            self.line_buf.clear();
            match self.reader.read_line(&mut self.line_buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line_number += 1;
                    let line = self.line_buf.trim_end_matches(['\n', '\r']);

                    if line.is_empty() {
                        continue;
                    }
                    if line.starts_with('#') {
                        log::trace!("skipping comment at line {}", self.line_number);
                        continue;
                    }

                    return Some(self.parse(line));
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}
