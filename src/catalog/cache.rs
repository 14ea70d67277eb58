use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::catalog::metadata::{Metadata, MetadataError};
use crate::core::contig::Contig;

/// A resolved sampleset: its samples and the datasets holding them.
///
/// Both sets are shared snapshots; resolving the same sampleset again returns the
/// same allocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplesetResolution {
    pub samples: Arc<BTreeSet<String>>,
    pub datasets: Arc<BTreeSet<String>>,
}

/// Memoizing front end to a [`Metadata`] directory.
///
/// The contig catalogue is read once at start. Sampleset resolutions are cached on
/// first success; failures are not cached.
pub struct MetadataCache {
    metadata: Box<dyn Metadata>,
    contigs: Vec<Contig>,
    samplesets: RwLock<HashMap<String, SamplesetResolution>>,
}

impl MetadataCache {
    /// Load the contig catalogue and build the cache
    ///
    /// # Errors
    ///
    /// Returns the directory's error if the contig catalogue cannot be read.
    pub fn start(metadata: Box<dyn Metadata>) -> Result<Self, MetadataError> {
        let contigs = metadata.contigs()?;
        debug!(contigs = contigs.len(), "loaded contig catalogue");
        Ok(Self {
            metadata,
            contigs,
            samplesets: RwLock::new(HashMap::new()),
        })
    }

    #[must_use]
    pub fn contigs(&self) -> &[Contig] {
        &self.contigs
    }

    /// Resolve a sampleset to its samples and their datasets
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::UnknownSampleset` or `MetadataError::UnknownSample` if
    /// the sampleset or one of its samples is not registered.
    pub fn sampleset_datasets(&self, sampleset: &str) -> Result<SamplesetResolution, MetadataError> {
        if let Some(hit) = self
            .samplesets
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(sampleset)
        {
            return Ok(hit.clone());
        }

        let samples = self.metadata.sampleset_samples(sampleset)?;
        let datasets = samples
            .iter()
            .map(|sample| self.metadata.sample_dataset(sample))
            .collect::<Result<BTreeSet<_>, _>>()?;

        debug!(
            sampleset,
            samples = samples.len(),
            datasets = datasets.len(),
            "resolved sampleset"
        );

        let resolution = SamplesetResolution {
            samples: Arc::new(samples),
            datasets: Arc::new(datasets),
        };

        // Another thread may have resolved it meanwhile; keep the first entry
        let mut cache = self
            .samplesets
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        Ok(cache
            .entry(sampleset.to_string())
            .or_insert(resolution)
            .clone())
    }
}

impl std::fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataCache")
            .field("contigs", &self.contigs.len())
            .finish_non_exhaustive()
    }
}
