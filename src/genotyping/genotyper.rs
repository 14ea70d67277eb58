use std::collections::{BTreeSet, HashMap};

use noodles::core::Position;
use noodles::vcf::{
    self as vcf,
    variant::{
        record::samples::{keys::key, series::value::genotype::Phasing},
        record_buf::{
            samples::{
                sample::value::{genotype::Allele as GenotypeAllele, Genotype, Value as SampleValue},
                Keys,
            },
            AlternateBases, Samples,
        },
        RecordBuf,
    },
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::site::UnifiedSite;
use crate::storage::{GenotypeCall, StorageError, VariantStore};

#[derive(Error, Debug)]
pub enum GenotypeError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Site contig index {0} is not in the output header")]
    UnknownContig(usize),

    #[error("Site has no alleles")]
    NoAlleles,

    #[error("Invalid site position: {0}")]
    InvalidPosition(u64),

    #[error("{0}")]
    Failed(String),
}

/// Genotyping configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenotyperConfig {
    /// Number of allele copies emitted for a sample without a usable call
    pub ploidy: usize,
}

impl Default for GenotyperConfig {
    fn default() -> Self {
        Self { ploidy: 2 }
    }
}

/// Computes the output record for one unified site.
///
/// Called concurrently from worker threads for distinct sites, against the same
/// shared store and header.
pub trait SiteGenotyper: Send + Sync + 'static {
    type Record: Send + 'static;

    /// Genotype every sample of the sampleset at `site`
    ///
    /// # Errors
    ///
    /// Returns `GenotypeError` if the site cannot be genotyped.
    fn genotype_site(
        &self,
        config: &GenotyperConfig,
        store: &dyn VariantStore,
        site: &UnifiedSite,
        samples: &BTreeSet<String>,
        datasets: &BTreeSet<String>,
        header: &vcf::Header,
    ) -> Result<Self::Record, GenotypeError>;
}

/// Translates each sample's hard calls onto the unified site's allele list.
///
/// For every dataset, the record whose range equals the site's range is used; called
/// alleles are matched to the site's alleles by sequence. Calls that cannot be
/// translated, and samples without such a record, are emitted as missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct HardCallGenotyper;

impl HardCallGenotyper {
    fn sample_genotypes(
        store: &dyn VariantStore,
        site: &UnifiedSite,
        samples: &BTreeSet<String>,
        datasets: &BTreeSet<String>,
    ) -> Result<HashMap<String, Vec<Option<usize>>>, GenotypeError> {
        let mut genotypes = HashMap::new();

        for dataset in datasets {
            let (header, records) = store.dataset_range_and_header(dataset, &site.range)?;
            let Some(record) = records.iter().find(|r| r.range == site.range) else {
                continue;
            };

            let translation: Vec<Option<usize>> = record
                .alleles
                .iter()
                .map(|allele| site.allele_index(allele))
                .collect();

            for (column, name) in header.samples.iter().enumerate() {
                if !samples.contains(name) {
                    continue;
                }
                let genotype: Vec<Option<usize>> = record
                    .sample_calls(column)
                    .iter()
                    .take_while(|call| **call != GenotypeCall::VectorEnd)
                    .map(|call| match *call {
                        GenotypeCall::Allele(i) => translation.get(i).copied().flatten(),
                        _ => None,
                    })
                    .collect();
                if !genotype.is_empty() {
                    genotypes.insert(name.clone(), genotype);
                }
            }
        }

        Ok(genotypes)
    }
}

impl SiteGenotyper for HardCallGenotyper {
    type Record = RecordBuf;

    fn genotype_site(
        &self,
        config: &GenotyperConfig,
        store: &dyn VariantStore,
        site: &UnifiedSite,
        samples: &BTreeSet<String>,
        datasets: &BTreeSet<String>,
        header: &vcf::Header,
    ) -> Result<RecordBuf, GenotypeError> {
        let (reference, alts) = site.alleles.split_first().ok_or(GenotypeError::NoAlleles)?;
        let (chrom, _) = header
            .contigs()
            .get_index(site.range.rid)
            .ok_or(GenotypeError::UnknownContig(site.range.rid))?;
        let position = usize::try_from(site.range.beg + 1)
            .ok()
            .and_then(|p| Position::try_from(p).ok())
            .ok_or(GenotypeError::InvalidPosition(site.range.beg))?;

        let mut genotypes = Self::sample_genotypes(store, site, samples, datasets)?;

        let values = header
            .sample_names()
            .iter()
            .map(|name| {
                let alleles = genotypes
                    .remove(name)
                    .unwrap_or_else(|| vec![None; config.ploidy]);
                vec![Some(genotype_value(&alleles))]
            })
            .collect();

        let keys: Keys = [String::from(key::GENOTYPE)].into_iter().collect();

        let mut builder = RecordBuf::builder()
            .set_reference_sequence_name(chrom.clone())
            .set_variant_start(position)
            .set_reference_bases(reference.clone())
            .set_samples(Samples::new(keys, values));

        if !alts.is_empty() {
            builder = builder.set_alternate_bases(AlternateBases::from(alts.to_vec()));
        }

        Ok(builder.build())
    }
}

fn genotype_value(alleles: &[Option<usize>]) -> SampleValue {
    let mut genotype = Genotype::default();
    {
        let genotype_alleles = genotype.as_mut();
        for allele in alleles {
            genotype_alleles.push(GenotypeAllele::new(*allele, Phasing::Unphased));
        }
    }
    SampleValue::from(genotype)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::contig::Contig;
    use crate::core::range::Range;
    use crate::output::build_header;
    use crate::storage::memory::MemoryStore;

    fn positions(record: &RecordBuf) -> Vec<Vec<Option<usize>>> {
        record
            .samples()
            .values()
            .map(|sample| match sample.values().first() {
                Some(Some(SampleValue::Genotype(genotype))) => {
                    genotype.as_ref().iter().map(|a| a.position()).collect()
                }
                _ => Vec::new(),
            })
            .collect()
    }

    fn setup() -> (MemoryStore, vcf::Header, BTreeSet<String>, BTreeSet<String>) {
        let contigs = vec![Contig::new("chr1", 1000)];
        let mut store = MemoryStore::new(contigs.clone());
        store
            .add_vcf_text(
                "ds1",
                "##fileformat=VCFv4.3\n\
                 #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\ts1\ts2\n\
                 chr1\t10\t.\tA\tG\t.\t.\t.\tGT\t0/1\t1/1\n",
            )
            .unwrap();
        store
            .add_vcf_text(
                "ds2",
                "##fileformat=VCFv4.3\n\
                 #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\ts3\ts4\n\
                 chr1\t10\t.\tA\tT,G\t.\t.\t.\tGT\t2/1\t./0\n",
            )
            .unwrap();

        let samples: BTreeSet<String> = ["s1", "s2", "s3", "s4", "s5"]
            .into_iter()
            .map(String::from)
            .collect();
        let datasets: BTreeSet<String> = ["ds1", "ds2"].into_iter().map(String::from).collect();
        let header = build_header(&samples, &contigs);
        (store, header, samples, datasets)
    }

    #[test]
    fn test_translates_calls_onto_site_alleles() {
        let (store, header, samples, datasets) = setup();
        let site = UnifiedSite::new(Range::new(0, 9, 10), vec!["A".into(), "G".into()]);

        let record = HardCallGenotyper
            .genotype_site(
                &GenotyperConfig::default(),
                &store,
                &site,
                &samples,
                &datasets,
                &header,
            )
            .unwrap();

        assert_eq!(record.reference_sequence_name(), "chr1");
        assert_eq!(record.variant_start(), Position::new(10));
        assert_eq!(
            positions(&record),
            vec![
                vec![Some(0), Some(1)],
                vec![Some(1), Some(1)],
                // T is not a site allele
                vec![Some(1), None],
                vec![None, Some(0)],
                // s5 has no data
                vec![None, None],
            ]
        );
    }

    #[test]
    fn test_no_matching_record_gives_missing() {
        let (store, header, samples, datasets) = setup();
        let site = UnifiedSite::new(Range::new(0, 500, 501), vec!["C".into(), "T".into()]);
        let config = GenotyperConfig { ploidy: 1 };

        let record = HardCallGenotyper
            .genotype_site(&config, &store, &site, &samples, &datasets, &header)
            .unwrap();
        assert!(positions(&record).iter().all(|gt| gt == &vec![None]));
    }

    #[test]
    fn test_invalid_sites() {
        let (store, header, samples, datasets) = setup();
        let config = GenotyperConfig::default();

        let empty = UnifiedSite::new(Range::new(0, 9, 10), Vec::new());
        assert!(matches!(
            HardCallGenotyper.genotype_site(&config, &store, &empty, &samples, &datasets, &header),
            Err(GenotypeError::NoAlleles)
        ));

        let off_catalogue = UnifiedSite::new(Range::new(7, 9, 10), vec!["A".into()]);
        assert!(matches!(
            HardCallGenotyper.genotype_site(&config, &store, &off_catalogue, &samples, &datasets, &header),
            Err(GenotypeError::UnknownContig(7))
        ));
    }

    #[test]
    fn test_config_defaults_from_json() {
        let config: GenotyperConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, GenotyperConfig::default());
        let config: GenotyperConfig = serde_json::from_str(r#"{"ploidy": 1}"#).unwrap();
        assert_eq!(config.ploidy, 1);
    }
}
