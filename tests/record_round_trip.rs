//! Round-trip and typed-access tests for every record type
//!
//! Parsing a line and serializing the unmodified record must reproduce the
//! line byte-for-byte, including attribute order and original number text.

use biotag::formats::gfa1::{Gfa1Parser, Gfa1Record};
use biotag::formats::gfa2::{Gfa2Parser, Gfa2Record};
use biotag::formats::paf::{PafParser, PafRecord};
use biotag::formats::primitives::{FormatError, Orientation, TabDelimitedRecord};
use biotag::formats::vcf::{VcfParser, VcfRecord};
use std::io::Cursor;

const PAF_LINES: &[&str] = &[
    "read1\t1500\t12\t1490\t+\tchr1\t248956422\t100200\t101680\t1402\t1478\t60\ttp:A:P\tcm:i:120\ts1:i:1350\ts2:i:0\tNM:i:76\tdv:f:0.0102\trl:i:0",
    "read2\t800\t0\t800\t-\tchr2\t242193529\t5000\t5800\t790\t800\t255",
    "read3\t900\t10\t850\t+\tctg7\t12000\t300\t1140\t800\t845\t12\ttp:A:S\tcg:Z:420M5D420M\tZB:B:I,3,4",
];

const GFA1_LINES: &[&str] = &[
    "H\tVN:Z:1.0",
    "S\t11\tACCTT\tLN:i:5\tRC:i:123\tSH:H:0A0B",
    "S\t12\t*\tLN:i:120\tUR:Z:http://example.org/12.fa",
    "L\t11\t+\t12\t-\t4M\tMQ:i:60\tNM:i:1",
    "C\t11\t+\t12\t-\t0\t*\tRC:i:3",
    "P\tp1\t11+,12-\t4M",
];

const GFA2_LINES: &[&str] = &[
    "H\tVN:Z:2.0\tTS:i:100",
    "S\ts1\t4\tACGT\tRC:i:12\tSH:H:ff00",
    "E\t*\ts1+\ts2-\t10\t100$\t0\t90\t90M\tKC:i:5",
    "F\ts1\tread1-\t0\t120$\t5\t125\t*",
    "G\tg1\ts1+\ts3+\t-50\t*",
    "O\tp1\ts1+ s2- s3+\tUR:Z:x",
    "U\t*\ts1 s2 e1",
];

const VCF_LINES: &[&str] = &[
    "1\t10177\trs367896724\tA\tAC\t100\tPASS\tAC=2130;AF=0.425319;AN=5008;DP=103152;DB",
    "2\t30\t.\tG\tA,T\t.\tq10;s50\tAF=1e-3,0.20\tGT:AD:PL\t1|2:0,4,6:90,80,70,60,50,40\t./.:.:.",
    "X\t500\tid1;id2\tC\t<DEL>\t12.5\t.\t.",
];

fn assert_round_trip<T: TabDelimitedRecord>(lines: &[&str]) {
    for line in lines {
        let record = T::from_line(line).unwrap();
        assert_eq!(&record.to_line(), line);
    }
}

#[test]
fn test_paf_round_trip() {
    assert_round_trip::<PafRecord>(PAF_LINES);
}

#[test]
fn test_gfa1_round_trip() {
    assert_round_trip::<Gfa1Record>(GFA1_LINES);
}

#[test]
fn test_gfa2_round_trip() {
    assert_round_trip::<Gfa2Record>(GFA2_LINES);
}

#[test]
fn test_vcf_round_trip() {
    assert_round_trip::<VcfRecord>(VCF_LINES);
}

#[test]
fn test_paf_typed_access() {
    let record = PafRecord::from_line(PAF_LINES[0]).unwrap();
    assert_eq!(record.strand, Orientation::Forward);
    assert_eq!(record.alignment_type().unwrap(), 'P');
    assert_eq!(record.minimizer_count().unwrap(), 120);
    assert_eq!(record.edit_distance().unwrap(), 76);
    assert!((record.divergence().unwrap() - 0.0102).abs() < 1e-6);
    assert!(!record.contains_cs());
    assert_eq!(record.cigar_opt().unwrap(), None);

    let unmapped = PafRecord::from_line(PAF_LINES[1]).unwrap();
    assert_eq!(unmapped.mapping_quality_opt(), None);
    assert!(unmapped.tags.is_empty());

    let arrays = PafRecord::from_line(PAF_LINES[2]).unwrap();
    assert_eq!(arrays.tags.get_integers("ZB").unwrap(), vec![3, 4]);
    assert_eq!(arrays.cigar().unwrap(), "420M5D420M");
}

#[test]
fn test_gfa1_typed_access() {
    let records: Vec<Gfa1Record> = GFA1_LINES
        .iter()
        .map(|line| Gfa1Record::from_line(line).unwrap())
        .collect();

    match &records[0] {
        Gfa1Record::Header(header) => assert_eq!(header.version().unwrap(), "1.0"),
        other => panic!("expected header, got {:?}", other),
    }
    match &records[1] {
        Gfa1Record::Segment(segment) => {
            assert_eq!(segment.length().unwrap(), 5);
            assert_eq!(segment.read_count().unwrap(), 123);
            assert_eq!(segment.checksum().unwrap().bytes(), &[0x0A, 0x0B]);
            assert!(matches!(segment.fragment_count(), Err(FormatError::MissingRequiredValue { .. })));
        }
        other => panic!("expected segment, got {:?}", other),
    }
    match &records[2] {
        Gfa1Record::Segment(segment) => {
            assert_eq!(segment.sequence, None);
            assert_eq!(segment.uri().unwrap(), "http://example.org/12.fa");
        }
        other => panic!("expected segment, got {:?}", other),
    }
    match &records[3] {
        Gfa1Record::Link(link) => {
            assert_eq!(link.target.orientation, Orientation::Reverse);
            assert_eq!(link.overlap.as_deref(), Some("4M"));
            assert_eq!(link.mapping_quality().unwrap(), 60);
            assert_eq!(link.mismatch_count().unwrap(), 1);
        }
        other => panic!("expected link, got {:?}", other),
    }
    match &records[4] {
        Gfa1Record::Containment(containment) => {
            assert_eq!(containment.position, 0);
            assert_eq!(containment.overlap, None);
            assert_eq!(containment.read_count().unwrap(), 3);
        }
        other => panic!("expected containment, got {:?}", other),
    }
    match &records[5] {
        Gfa1Record::Path(path) => {
            assert_eq!(path.segments.len(), 2);
            assert_eq!(path.overlaps.as_deref(), Some(&["4M".to_string()][..]));
        }
        other => panic!("expected path, got {:?}", other),
    }
}

#[test]
fn test_gfa2_typed_access() {
    let records: Vec<Gfa2Record> = GFA2_LINES
        .iter()
        .map(|line| Gfa2Record::from_line(line).unwrap())
        .collect();

    match &records[0] {
        Gfa2Record::Header(header) => {
            assert_eq!(header.version().unwrap(), "2.0");
            assert_eq!(header.trace_spacing().unwrap(), 100);
        }
        other => panic!("expected header, got {:?}", other),
    }
    match &records[1] {
        Gfa2Record::Segment(segment) => {
            assert_eq!(segment.length, 4);
            assert_eq!(segment.read_count().unwrap(), 12);
            assert_eq!(segment.checksum().unwrap().bytes(), &[0xff, 0x00]);
        }
        other => panic!("expected segment, got {:?}", other),
    }
    match &records[2] {
        Gfa2Record::Edge(edge) => {
            assert_eq!(edge.id, None);
            assert!(edge.source_end.terminal);
            assert_eq!(edge.source_end.value, 100);
            assert_eq!(edge.kc().unwrap(), 5);
        }
        other => panic!("expected edge, got {:?}", other),
    }
    match &records[4] {
        Gfa2Record::Gap(gap) => {
            assert_eq!(gap.distance, -50);
            assert_eq!(gap.variance, None);
        }
        other => panic!("expected gap, got {:?}", other),
    }
    match &records[5] {
        Gfa2Record::Path(path) => {
            assert_eq!(path.references.len(), 3);
            assert_eq!(path.tags.get_string("UR").unwrap(), "x");
        }
        other => panic!("expected path, got {:?}", other),
    }
    match &records[6] {
        Gfa2Record::Set(set) => assert_eq!(set.members, vec!["s1", "s2", "e1"]),
        other => panic!("expected set, got {:?}", other),
    }
}

#[test]
fn test_vcf_typed_access() {
    let record = VcfRecord::from_line(VCF_LINES[0]).unwrap();
    assert!(record.is_pass());
    assert_eq!(record.allele_number().unwrap(), 5008);
    assert_eq!(record.depth().unwrap(), 103152);
    assert!(record.in_dbsnp().unwrap());
    assert_eq!(record.allele_count().unwrap(), vec![2130]);
    assert!(!record.contains_somatic());

    let multi = VcfRecord::from_line(VCF_LINES[1]).unwrap();
    assert_eq!(multi.number_a(), 2);
    assert_eq!(multi.number_r(), 3);
    assert_eq!(multi.quality, None);
    assert_eq!(multi.filters, vec!["q10", "s50"]);
    assert_eq!(multi.allele_frequency().unwrap(), vec![0.001, 0.2]);

    let first = &multi.genotypes[0];
    assert!(first.is_phased());
    assert_eq!(first.allele_indices().unwrap(), vec![Some(1), Some(2)]);
    assert_eq!(first.ad().unwrap(), vec![0, 4, 6]);
    assert_eq!(first.number_g().unwrap(), 6);
    assert_eq!(first.pl().unwrap().len(), 6);

    let missing = &multi.genotypes[1];
    assert_eq!(missing.allele_indices().unwrap(), vec![None, None]);
    assert!(matches!(missing.ad(), Err(FormatError::WrongCardinality { expected: 3, actual: 1, .. })));

    let symbolic = VcfRecord::from_line(VCF_LINES[2]).unwrap();
    assert_eq!(symbolic.ids, vec!["id1", "id2"]);
    assert_eq!(symbolic.quality, Some(12.5));
    assert!(symbolic.info.is_empty());
}

#[test]
fn test_record_number_g_with_explicit_ploidy() {
    let record = VcfRecord::from_line("1\t5\t.\tA\tC\t.\t.\t.").unwrap();
    assert_eq!(record.number_g(2).unwrap(), 3);
    assert!(matches!(record.number_g(0), Err(FormatError::InvalidGenotype { .. })));
}

#[test]
fn test_streaming_parsers_skip_comments() {
    let paf = format!("# comment\n\n{}\n{}\n", PAF_LINES[0], PAF_LINES[1]);
    let records: Vec<_> = PafParser::new(Cursor::new(paf))
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(records.len(), 2);

    let gfa1 = GFA1_LINES.join("\n");
    let parser = Gfa1Parser::new(Cursor::new(gfa1));
    assert_eq!(parser.filter(|r| r.is_ok()).count(), GFA1_LINES.len());

    let gfa2 = GFA2_LINES.join("\n");
    let parser = Gfa2Parser::new(Cursor::new(gfa2));
    assert_eq!(parser.filter(|r| r.is_ok()).count(), GFA2_LINES.len());
}

#[test]
fn test_streaming_continues_after_bad_line() {
    let text = format!("{}\nnot a paf line\n{}\n", PAF_LINES[0], PAF_LINES[2]);
    let results: Vec<_> = PafParser::new(Cursor::new(text)).collect();
    assert_eq!(results.len(), 3);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(FormatError::FieldCount { .. })));
    assert!(results[2].is_ok());
}

#[test]
fn test_vcf_parser_uses_header_types() {
    let text = "\
##fileformat=VCFv4.3
##INFO=<ID=XF,Number=A,Type=Float,Description=\"Custom frequency\">
##FORMAT=<ID=XC,Number=R,Type=Integer,Description=\"Custom counts\">
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tNA001
1\t100\t.\tA\tG\t50\tPASS\tXF=0.5\tGT:XC\t0/1:3,4
";
    let mut parser = VcfParser::new(Cursor::new(text)).unwrap();
    assert_eq!(parser.header().samples, vec!["NA001"]);

    let record = parser.next().unwrap().unwrap();
    assert_eq!(record.info.get_floats("XF").unwrap(), vec![0.5]);
    let genotype = record.genotype("NA001").unwrap();
    assert_eq!(genotype.fields.get_integers("XC").unwrap(), vec![3, 4]);
    assert!(parser.next().is_none());
}
