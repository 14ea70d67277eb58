use tracing::{debug, info};

use crate::catalog::cache::MetadataCache;
use crate::core::range::Range;
use crate::discovery::extract::{record_alleles, InvalidReference};
use crate::discovery::merge::{DiscoveredAlleles, ReferenceCheckError};
use crate::error::ServiceError;
use crate::storage::VariantStore;

/// Drives allele discovery for one sampleset and range
pub struct DiscoveryEngine<'a> {
    metadata: &'a MetadataCache,
    store: &'a dyn VariantStore,
}

impl<'a> DiscoveryEngine<'a> {
    pub fn new(metadata: &'a MetadataCache, store: &'a dyn VariantStore) -> Self {
        Self { metadata, store }
    }

    /// Discover the alleles observed in `range` across every dataset of `sampleset`.
    ///
    /// Datasets are visited one at a time in ascending name order. The first storage
    /// or data error aborts the whole operation; no partial result is returned.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Lookup` if the sampleset cannot be resolved,
    /// `ServiceError::Storage` if a dataset fetch fails, or a consistency error if a
    /// reference allele is malformed or the merged set violates the
    /// one-reference-per-range invariant.
    pub fn discover(&self, sampleset: &str, range: &Range) -> Result<DiscoveredAlleles, ServiceError> {
        let resolved = self.metadata.sampleset_datasets(sampleset)?;
        info!(
            sampleset,
            range = %range.display_with(self.metadata.contigs()),
            datasets = resolved.datasets.len(),
            "discovering alleles"
        );

        let mut discovered = DiscoveredAlleles::new();
        for dataset in resolved.datasets.iter() {
            let dataset_alleles = self.discover_in_dataset(dataset, range)?;
            debug!(
                dataset = %dataset,
                alleles = dataset_alleles.len(),
                "merged dataset alleles"
            );
            discovered.merge(dataset_alleles);
        }

        discovered
            .check_references()
            .map_err(|e| self.consistency_error(e))?;

        info!(sampleset, alleles = discovered.len(), "allele discovery complete");
        Ok(discovered)
    }

    fn discover_in_dataset(&self, dataset: &str, range: &Range) -> Result<DiscoveredAlleles, ServiceError> {
        // The dataset header carries sample columns; discovery counts every sample in
        // the dataset, not only those in the sampleset.
        let (_header, records) = self.store.dataset_range_and_header(dataset, range)?;

        let mut dataset_alleles = DiscoveredAlleles::new();
        for record in &records {
            let record_contribution = record_alleles(record).map_err(|InvalidReference { sequence }| {
                ServiceError::InvalidReference {
                    dataset: dataset.to_string(),
                    sequence,
                    locus: record.range.display_with(self.metadata.contigs()),
                }
            })?;
            dataset_alleles.merge(record_contribution);
        }

        Ok(dataset_alleles)
    }

    fn consistency_error(&self, error: ReferenceCheckError) -> ServiceError {
        let contigs = self.metadata.contigs();
        match error {
            ReferenceCheckError::Inconsistent { range, sequences } => {
                ServiceError::InconsistentReferences {
                    locus: range.display_with(contigs),
                    sequences,
                }
            }
            ReferenceCheckError::Missing { range } => ServiceError::MissingReference {
                locus: range.display_with(contigs),
            },
        }
    }
}
