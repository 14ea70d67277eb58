//! Parser for VCF input into dataset records.
//!
//! Headers and records are read with noodles. The `#CHROM` line names the samples,
//! and each data line contributes one [`VariantRecord`] with the hard calls from its
//! `GT` field. Other FORMAT and INFO fields are ignored.
//!
//! CHROM names are resolved against the service's contig catalogue, so every record
//! gets a [`Range`] in the shared coordinate space.
//!
//! Files ending in `.gz` or `.bgz` are decompressed on the fly; both plain gzip and
//! BGZF are accepted.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::vcf::{
    self as vcf,
    variant::{
        record::samples::keys::key,
        record_buf::samples::sample::value::Value as SampleValue,
        RecordBuf,
    },
};
use thiserror::Error;

use crate::core::contig::{contig_index, Contig};
use crate::core::range::Range;
use crate::storage::{DatasetHeader, GenotypeCall, VariantRecord};
use crate::utils::validation::MAX_CONTIGS;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid VCF format: {0}")]
    InvalidFormat(String),

    #[error("Unknown contig '{name}' in record {record}")]
    UnknownContig { name: String, record: usize },

    #[error("Too many contigs: {0} exceeds maximum allowed ({MAX_CONTIGS})")]
    TooManyContigs(usize),
}

/// The parsed content of one VCF file
#[derive(Debug, Clone, Default)]
pub struct ParsedVcf {
    /// Contigs declared in `##contig` lines
    pub contigs: Vec<Contig>,
    pub header: DatasetHeader,
    /// Records in file order
    pub records: Vec<VariantRecord>,
}

/// Parse a VCF file, resolving CHROM names against `catalogue`
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or another `ParseError` if
/// the content is invalid.
pub fn parse_vcf_file(path: &Path, catalogue: &[Contig]) -> Result<ParsedVcf, ParseError> {
    let file = File::open(path)?;

    let is_gzipped = path
        .extension()
        .is_some_and(|e| e == "gz" || e == "bgz");

    if is_gzipped {
        parse_vcf_reader(BufReader::new(MultiGzDecoder::new(file)), catalogue)
    } else {
        parse_vcf_reader(BufReader::new(file), catalogue)
    }
}

/// Parse VCF text, resolving CHROM names against `catalogue`
///
/// # Errors
///
/// Same as [`parse_vcf_reader`].
pub fn parse_vcf_text(text: &str, catalogue: &[Contig]) -> Result<ParsedVcf, ParseError> {
    parse_vcf_reader(text.as_bytes(), catalogue)
}

/// Parse VCF from any buffered reader
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` for a malformed header, record, or GT value,
/// `ParseError::UnknownContig` for a CHROM not in the catalogue, or
/// `ParseError::TooManyContigs` if the header exceeds the limit.
pub fn parse_vcf_reader<R: BufRead>(reader: R, catalogue: &[Contig]) -> Result<ParsedVcf, ParseError> {
    let mut reader = vcf::io::Reader::new(reader);
    let header = reader
        .read_header()
        .map_err(|e| invalid_data(e, "Invalid VCF header"))?;

    let n_contigs = header.contigs().len();
    if n_contigs > MAX_CONTIGS {
        return Err(ParseError::TooManyContigs(n_contigs));
    }

    let contigs = header
        .contigs()
        .iter()
        .map(|(name, map)| Contig::new(name.clone(), map.length().map_or(0, |l| l as u64)))
        .collect();

    let samples: Vec<String> = header.sample_names().iter().cloned().collect();

    let mut records = Vec::new();
    for (i, result) in reader.record_bufs(&header).enumerate() {
        // 1-based for error messages
        let record_num = i + 1;
        let record = result.map_err(|e| invalid_data(e, &format!("Invalid record {record_num}")))?;
        records.push(variant_record(&record, record_num, catalogue)?);
    }

    Ok(ParsedVcf {
        contigs,
        header: DatasetHeader::new(samples),
        records,
    })
}

/// Malformed content becomes `InvalidFormat`; anything else stays an I/O error
fn invalid_data(e: io::Error, context: &str) -> ParseError {
    if e.kind() == io::ErrorKind::InvalidData {
        ParseError::InvalidFormat(format!("{context}: {e}"))
    } else {
        ParseError::Io(e)
    }
}

fn variant_record(
    record: &RecordBuf,
    record_num: usize,
    catalogue: &[Contig],
) -> Result<VariantRecord, ParseError> {
    let chrom = record.reference_sequence_name();
    let rid = contig_index(catalogue, chrom).ok_or_else(|| ParseError::UnknownContig {
        name: chrom.to_string(),
        record: record_num,
    })?;

    let start = record.variant_start().ok_or_else(|| {
        ParseError::InvalidFormat(format!("Record {record_num} has no position"))
    })?;

    let reference = record.reference_bases();
    if reference.is_empty() {
        return Err(ParseError::InvalidFormat(format!(
            "Empty REF in record {record_num}"
        )));
    }

    let mut alleles = vec![reference.to_string()];
    alleles.extend(record.alternate_bases().as_ref().iter().cloned());

    let beg = (usize::from(start) - 1) as u64;
    let range = Range::new(rid, beg, beg + reference.len() as u64);

    let (ploidy, calls) = sample_calls(record, record_num)?;

    Ok(VariantRecord {
        range,
        alleles,
        ploidy,
        calls,
    })
}

/// Flatten each sample's GT into calls, padding short genotypes with `VectorEnd`.
///
/// Records without a GT key have ploidy zero.
fn sample_calls(
    record: &RecordBuf,
    record_num: usize,
) -> Result<(usize, Vec<GenotypeCall>), ParseError> {
    let samples = record.samples();
    if samples.keys().as_ref().is_empty() {
        return Ok((0, Vec::new()));
    }

    let per_sample = samples
        .values()
        .map(|sample| match sample.get(key::GENOTYPE) {
            Some(Some(value)) => genotype_calls(value, record_num),
            _ => Ok(Vec::new()),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let ploidy = per_sample.iter().map(Vec::len).max().unwrap_or(0);
    let mut calls = Vec::with_capacity(ploidy * per_sample.len());
    for sample_calls in per_sample {
        let padding = ploidy - sample_calls.len();
        calls.extend(sample_calls);
        calls.extend(std::iter::repeat(GenotypeCall::VectorEnd).take(padding));
    }

    Ok((ploidy, calls))
}

fn genotype_calls(value: &SampleValue, record_num: usize) -> Result<Vec<GenotypeCall>, ParseError> {
    match value {
        SampleValue::Genotype(genotype) => Ok(genotype
            .as_ref()
            .iter()
            .map(|allele| allele.position().map_or(GenotypeCall::Missing, GenotypeCall::Allele))
            .collect()),
        _ => Err(ParseError::InvalidFormat(format!(
            "GT in record {record_num} is not a genotype"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn catalogue() -> Vec<Contig> {
        vec![Contig::new("chr1", 248_956_422), Contig::new("chr2", 242_193_529)]
    }

    const VCF: &str = "##fileformat=VCFv4.2
##contig=<ID=chr1,length=248956422>
##contig=<ID=chr2,length=242193529,md5=f98db672eb0993dcfdabafe2a882905c>
##FORMAT=<ID=GT,Number=1,Type=String,Description=\"Genotype\">
##FORMAT=<ID=DP,Number=1,Type=Integer,Description=\"Read depth\">
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tNA12878\tNA12891
chr1\t100\t.\tA\tC\t50\tPASS\t.\tGT:DP\t0/1:10\t1|1:12
chr2\t2000\trs1\tAT\tA,<NON_REF>\t.\t.\t.\tGT\t./.\t2
";

    const COLUMNS: &str = "##fileformat=VCFv4.3\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO";

    #[test]
    fn test_parse_vcf_text() {
        let parsed = parse_vcf_text(VCF, &catalogue()).unwrap();

        assert_eq!(parsed.contigs.len(), 2);
        assert_eq!(parsed.contigs[1], Contig::new("chr2", 242_193_529));
        assert_eq!(parsed.header.samples, vec!["NA12878", "NA12891"]);
        assert_eq!(parsed.records.len(), 2);

        let first = &parsed.records[0];
        assert_eq!(first.range, Range::new(0, 99, 100));
        assert_eq!(first.alleles, vec!["A", "C"]);
        assert_eq!(first.ploidy, 2);
        assert_eq!(
            first.calls,
            vec![
                GenotypeCall::Allele(0),
                GenotypeCall::Allele(1),
                GenotypeCall::Allele(1),
                GenotypeCall::Allele(1),
            ]
        );

        let second = &parsed.records[1];
        assert_eq!(second.range, Range::new(1, 1999, 2001));
        assert_eq!(second.alleles, vec!["AT", "A", "<NON_REF>"]);
        // Haploid call padded to the record's ploidy
        assert_eq!(
            second.calls,
            vec![
                GenotypeCall::Missing,
                GenotypeCall::Missing,
                GenotypeCall::Allele(2),
                GenotypeCall::VectorEnd,
            ]
        );
    }

    #[test]
    fn test_unknown_contig() {
        let vcf = format!("{COLUMNS}\nchr1\t1\t.\tA\tC\t.\t.\t.\nchrZ\t1\t.\tA\tC\t.\t.\t.\n");
        let err = parse_vcf_text(&vcf, &catalogue()).unwrap_err();
        assert!(matches!(err, ParseError::UnknownContig { ref name, record: 2 } if name == "chrZ"));
    }

    #[test]
    fn test_sites_only_record() {
        let vcf = format!("{COLUMNS}\nchr1\t5\t.\tG\t.\t.\t.\t.\n");
        let parsed = parse_vcf_text(&vcf, &catalogue()).unwrap();
        assert_eq!(parsed.records[0].alleles, vec!["G"]);
        assert_eq!(parsed.records[0].ploidy, 0);
        assert!(parsed.records[0].calls.is_empty());
    }

    #[test]
    fn test_invalid_input() {
        let no_fileformat = "#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\nchr1\t5\t.\tG\t.\t.\t.\t.\n";
        assert!(matches!(
            parse_vcf_text(no_fileformat, &catalogue()),
            Err(ParseError::InvalidFormat(_))
        ));

        let telomere = format!("{COLUMNS}\nchr1\t0\t.\tG\t.\t.\t.\t.\n");
        assert!(matches!(
            parse_vcf_text(&telomere, &catalogue()),
            Err(ParseError::InvalidFormat(_))
        ));

        let bad_gt = format!("{COLUMNS}\tFORMAT\tS1\nchr1\t5\t.\tG\tT\t.\t.\t.\tGT\t0/x\n");
        assert!(parse_vcf_text(&bad_gt, &catalogue()).is_err());

        let missing_sample = format!("{COLUMNS}\tFORMAT\tS1\tS2\nchr1\t5\t.\tG\tT\t.\t.\t.\tGT\t0/1\n");
        assert!(parse_vcf_text(&missing_sample, &catalogue()).is_err());
    }

    #[test]
    fn test_parse_gzip_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("calls.vcf.gz");
        let mut encoder = flate2::write::GzEncoder::new(
            File::create(&path).unwrap(),
            flate2::Compression::default(),
        );
        encoder.write_all(VCF.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let parsed = parse_vcf_file(&path, &catalogue()).unwrap();
        assert_eq!(parsed.records.len(), 2);
        assert_eq!(parsed.header.samples, vec!["NA12878", "NA12891"]);
    }

    #[test]
    fn test_missing_file() {
        let err = parse_vcf_file(Path::new("/nonexistent/calls.vcf"), &catalogue()).unwrap_err();
        assert!(matches!(err, ParseError::Io(_)));
    }
}
