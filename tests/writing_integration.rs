//! Integration tests for writing records
//!
//! Every writer's output must parse back to equal records, for plain,
//! gzip and bgzip files.

use biotag::formats::attribute::{Attribute, HexBytes, Number, TypeCode};
use biotag::formats::gfa2::{Gfa2Parser, Gfa2Record};
use biotag::formats::paf::{PafParser, PafRecord};
use biotag::formats::primitives::TabDelimitedRecord;
use biotag::formats::vcf::{FieldDefinition, VcfGenotype, VcfHeader, VcfParser, VcfRecord};
use biotag::formats::writer::{Gfa2Writer, PafWriter};
use biotag::formats::vcf_writer::VcfWriter;
use biotag::BiotagError;
use std::io::Read;
use tempfile::TempDir;

fn paf_records() -> Vec<PafRecord> {
    (0..500)
        .map(|i| {
            PafRecord::from_line(&format!(
                "read{}\t1000\t0\t990\t+\tchr1\t100000\t{}\t{}\t950\t990\t60\ttp:A:P\tNM:i:{}",
                i,
                i * 10,
                i * 10 + 990,
                i % 7
            ))
            .unwrap()
        })
        .collect()
}

#[test]
fn test_paf_all_compressions() {
    let dir = TempDir::new().unwrap();
    let records = paf_records();

    for name in ["out.paf", "out.paf.gz", "out.paf.bgz"] {
        let path = dir.path().join(name);
        let mut writer = PafWriter::create(&path).unwrap();
        for record in &records {
            writer.write_record(record).unwrap();
        }
        assert_eq!(writer.records_written(), records.len());
        writer.finish().unwrap();

        let parsed: Vec<PafRecord> = if name.ends_with(".paf") {
            PafParser::from_path(&path).unwrap().map(|r| r.unwrap()).collect()
        } else {
            PafParser::from_gzip_path(&path).unwrap().map(|r| r.unwrap()).collect()
        };
        assert_eq!(parsed, records, "mismatch for {}", name);
    }
}

#[test]
fn test_bgzip_output_is_block_compressed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("out.paf.bgz");

    let mut writer = PafWriter::create(&path).unwrap();
    for record in &paf_records() {
        writer.write_record(record).unwrap();
    }
    writer.finish().unwrap();

    let mut bytes = Vec::new();
    std::fs::File::open(&path).unwrap().read_to_end(&mut bytes).unwrap();
    // gzip magic plus the BGZF "BC" extra subfield
    assert_eq!(&bytes[..4], &[0x1f, 0x8b, 0x08, 0x04]);
    assert_eq!(&bytes[12..14], b"BC");
    // empty end-of-file block
    assert_eq!(bytes.len() >= 28, true);
    assert_eq!(&bytes[bytes.len() - 28..bytes.len() - 24], &[0x1f, 0x8b, 0x08, 0x04]);
}

#[test]
fn test_modified_gfa2_records() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("graph.gfa.gz");

    let mut segment = match Gfa2Record::from_line("S\ts1\t4\tACGT\tRC:i:12").unwrap() {
        Gfa2Record::Segment(segment) => segment,
        other => panic!("expected segment, got {:?}", other),
    };
    let mut builder = segment.tags.to_builder();
    builder.replace(Attribute::integer("RC", 40)).unwrap();
    builder.put_byte_array("SH", &HexBytes::from_bytes(&[0xde, 0xad])).unwrap();
    segment.tags = builder.build();

    let mut writer = Gfa2Writer::create(&path).unwrap();
    writer.write_comment("edited").unwrap();
    writer
        .write_all([
            Gfa2Record::from_line("H\tVN:Z:2.0"),
            Ok(Gfa2Record::Segment(segment)),
        ])
        .unwrap();
    writer.finish().unwrap();

    let lines: Vec<String> = Gfa2Parser::from_gzip_path(&path)
        .unwrap()
        .map(|r| r.unwrap().to_line())
        .collect();
    assert_eq!(lines, vec!["H\tVN:Z:2.0", "S\ts1\t4\tACGT\tRC:i:40\tSH:H:DEAD"]);
}

#[test]
fn test_vcf_built_records_reparse() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("calls.vcf.bgz");

    let mut header = VcfHeader::new("VCFv4.3");
    header.add_info(FieldDefinition::new("DP", Number::Fixed(1), TypeCode::Integer, "Total Depth"));
    header.add_info(FieldDefinition::new("AF", Number::A, TypeCode::Float, "Allele Frequency"));
    header.add_format(FieldDefinition::reserved_format("GT").unwrap());
    header.add_format(FieldDefinition::reserved_format("AD").unwrap());
    header.samples = vec!["NA001".to_string(), "NA002".to_string()];

    let mut builder = VcfRecord::builder(&header.samples);
    builder
        .chrom("chr2")
        .pos(4242)
        .id("rs1")
        .reference("G")
        .alternate(&["A", "C"])
        .quality(99.5)
        .filter("PASS");
    builder.info().put_integer("DP", 31).unwrap();
    builder.info().put_floats("AF", &[0.25, 0.5]).unwrap();

    for (sample, gt, ad) in [("NA002", "1/2", [0, 5, 6]), ("NA001", "0/1", [10, 9, 0])] {
        let mut genotype = VcfGenotype::builder(sample);
        genotype.genotype(gt).unwrap();
        genotype.fields().put_integers("AD", &ad).unwrap();
        builder.add_genotype(genotype.build()).unwrap();
    }
    let record = builder.build();
    assert_eq!(record.format, vec!["GT", "AD"]);
    assert_eq!(record.genotypes[0].sample_id.as_deref(), Some("NA001"));

    let mut writer = VcfWriter::create(&path).unwrap();
    writer.write_header(&header).unwrap();
    writer.write_record(&record).unwrap();
    writer.finish().unwrap();

    let mut parser = VcfParser::from_gzip_path(&path).unwrap();
    assert_eq!(parser.header().samples, header.samples);
    let parsed = parser.next().unwrap().unwrap();
    assert_eq!(
        parsed.to_line(),
        "chr2\t4242\trs1\tG\tA,C\t99.5\tPASS\tDP=31;AF=0.25,0.5\tGT:AD\t0/1:10,9,0\t1/2:0,5,6"
    );
    assert_eq!(parsed.allele_frequency().unwrap(), vec![0.25, 0.5]);
    assert_eq!(parsed.genotype("NA002").unwrap().ad().unwrap(), vec![0, 5, 6]);
    assert!(parser.next().is_none());
}

#[test]
fn test_vcf_copy_through() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("in.vcf");
    let output = dir.path().join("out.vcf");
    let text = "\
##fileformat=VCFv4.2
##INFO=<ID=DP,Number=1,Type=Integer,Description=\"Total Depth\">
##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">
##FILTER=<ID=q10,Description=\"Quality below 10\">
##contig=<ID=1,length=249250621>
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1
1\t100\t.\tA\tT\t30\tPASS\tDP=7\tGT\t0|1
1\t200\t.\tC\tG\t5\tq10\tDP=2\tGT\t1/1
";
    std::fs::write(&input, text).unwrap();

    let parser = VcfParser::from_path(&input).unwrap();
    let header = parser.header().clone();
    let mut writer = VcfWriter::create(&output).unwrap();
    writer.write_header(&header).unwrap();
    writer.write_all(parser).unwrap();
    assert_eq!(writer.records_written(), 2);
    writer.finish().unwrap();

    assert_eq!(std::fs::read_to_string(&output).unwrap(), text);
}

#[test]
fn test_vcf_writer_rejects_sample_mismatch() {
    let dir = TempDir::new().unwrap();
    let mut header = VcfHeader::new("VCFv4.3");
    header.samples = vec!["S1".to_string()];

    let mut writer = VcfWriter::create(dir.path().join("x.vcf")).unwrap();
    writer.write_header(&header).unwrap();

    let record = VcfRecord::from_line("1\t1\t.\tA\tT\t.\t.\t.").unwrap();
    assert!(matches!(
        writer.write_record(&record),
        Err(BiotagError::InvalidInput { .. })
    ));
    assert_eq!(writer.records_written(), 0);
}
