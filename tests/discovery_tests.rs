//! Allele discovery through the public service API

use std::sync::Arc;

use anyhow::Result;
use jointcall::{
    Allele, Contig, DiscoveredAlleles, JsonCatalog, MemoryStore, Range, Service, ServiceError,
};

const HEADER: &str = "##fileformat=VCFv4.3\n\
                      ##contig=<ID=chr1,length=10000>\n\
                      ##contig=<ID=chr2,length=5000>\n";

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn contigs() -> Vec<Contig> {
    vec![Contig::new("chr1", 10_000), Contig::new("chr2", 5_000)]
}

fn vcf(samples: &[&str], lines: &[&str]) -> String {
    let mut text = String::from(HEADER);
    text.push_str("#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT");
    for s in samples {
        text.push('\t');
        text.push_str(s);
    }
    text.push('\n');
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    text
}

fn service(datasets: &[(&str, &[&str], &[&str])]) -> Result<Service> {
    init_logging();
    let mut catalog = JsonCatalog::new(contigs())?;
    let mut store = MemoryStore::new(contigs());
    let mut all = Vec::new();
    for (name, samples, lines) in datasets {
        for s in *samples {
            catalog.add_sample(*s, *name);
            all.push(*s);
        }
        store.add_vcf_text(*name, &vcf(samples, lines))?;
    }
    catalog.add_sampleset("cohort", all);
    Ok(Service::with_threads(Box::new(catalog), Arc::new(store), 2)?)
}

fn count(alleles: &DiscoveredAlleles, range: Range, dna: &str) -> Option<(bool, f64)> {
    alleles
        .get(&Allele::new(range, dna))
        .map(|info| (info.is_ref, info.observation_count))
}

#[test]
fn test_counts_are_summed_across_datasets() -> Result<()> {
    let service = service(&[
        ("batch1", &["a", "b"], &["chr1\t100\t.\tA\tC\t.\t.\t.\tGT\t0/1\t1/1"]),
        ("batch2", &["c"], &["chr1\t100\t.\tA\tC,G\t.\t.\t.\tGT\t2|0"]),
    ])?;

    let alleles = service.discover_alleles("cohort", &Range::new(0, 0, 10_000))?;
    let site = Range::new(0, 99, 100);

    assert_eq!(alleles.len(), 3);
    assert_eq!(count(&alleles, site, "A"), Some((true, 2.0)));
    assert_eq!(count(&alleles, site, "C"), Some((false, 3.0)));
    assert_eq!(count(&alleles, site, "G"), Some((false, 1.0)));
    Ok(())
}

#[test]
fn test_query_range_limits_records() -> Result<()> {
    let service = service(&[(
        "batch1",
        &["a"],
        &[
            "chr1\t100\t.\tA\tC\t.\t.\t.\tGT\t0/1",
            "chr1\t900\t.\tT\tG\t.\t.\t.\tGT\t1/1",
            "chr2\t100\t.\tC\tA\t.\t.\t.\tGT\t0/1",
        ],
    )])?;

    let alleles = service.discover_alleles("cohort", &Range::new(0, 500, 1000))?;
    let alts: Vec<String> = alleles
        .iter()
        .filter(|(_, info)| !info.is_ref)
        .map(|(allele, _)| allele.dna.clone())
        .collect();
    assert_eq!(alts, vec!["G"]);

    let alleles = service.discover_alleles("cohort", &Range::new(1, 0, 5000))?;
    assert_eq!(count(&alleles, Range::new(1, 99, 100), "A"), Some((false, 1.0)));
    Ok(())
}

#[test]
fn test_symbolic_alts_are_skipped() -> Result<()> {
    let service = service(&[(
        "batch1",
        &["a"],
        &["chr1\t100\t.\tA\t<DEL>,T,*\t.\t.\t.\tGT\t1/2"],
    )])?;

    let alleles = service.discover_alleles("cohort", &Range::new(0, 0, 10_000))?;
    let site = Range::new(0, 99, 100);
    assert_eq!(alleles.len(), 2);
    assert_eq!(count(&alleles, site, "A"), Some((true, 0.0)));
    assert_eq!(count(&alleles, site, "T"), Some((false, 1.0)));
    Ok(())
}

#[test]
fn test_conflicting_references_fail() -> Result<()> {
    let service = service(&[
        ("batch1", &["a"], &["chr1\t100\t.\tA\tC\t.\t.\t.\tGT\t0/1"]),
        ("batch2", &["b"], &["chr1\t100\t.\tG\tC\t.\t.\t.\tGT\t0/1"]),
    ])?;

    let err = service
        .discover_alleles("cohort", &Range::new(0, 0, 10_000))
        .unwrap_err();
    assert!(err.is_consistency_error());
    match err {
        ServiceError::InconsistentReferences { locus, sequences } => {
            assert_eq!(locus, "chr1:100-100");
            assert_eq!(sequences, vec!["A".to_string(), "G".to_string()]);
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[test]
fn test_non_dna_reference_fails() -> Result<()> {
    let service = service(&[(
        "batch1",
        &["a"],
        &["chr1\t100\t.\tN\tC\t.\t.\t.\tGT\t0/1"],
    )])?;

    let err = service
        .discover_alleles("cohort", &Range::new(0, 0, 10_000))
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidReference { ref sequence, .. } if sequence == "N"));
    Ok(())
}

#[test]
fn test_unknown_sampleset() -> Result<()> {
    let service = service(&[])?;
    let err = service
        .discover_alleles("nobody", &Range::new(0, 0, 10))
        .unwrap_err();
    assert!(matches!(err, ServiceError::Lookup(_)));
    Ok(())
}

#[test]
fn test_result_serializes_to_json() -> Result<()> {
    let service = service(&[(
        "batch1",
        &["a"],
        &["chr1\t100\t.\tA\tC\t.\t.\t.\tGT\t0/1"],
    )])?;

    let alleles = service.discover_alleles("cohort", &Range::new(0, 0, 10_000))?;
    let json: serde_json::Value = serde_json::to_value(&alleles)?;
    assert_eq!(json.as_array().map(Vec::len), Some(2));
    Ok(())
}
