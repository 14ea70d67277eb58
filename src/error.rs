use thiserror::Error;

use crate::catalog::metadata::MetadataError;
use crate::genotyping::genotyper::GenotypeError;
use crate::output::SinkError;
use crate::storage::StorageError;

/// Errors surfaced by [`Service`](crate::service::Service) operations
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Sampleset, sample, or contig catalogue lookup failed
    #[error("Lookup failed: {0}")]
    Lookup(#[from] MetadataError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Invalid reference allele {sequence} in dataset {dataset} at {locus}")]
    InvalidReference {
        dataset: String,
        sequence: String,
        locus: String,
    },

    #[error("Datasets contain inconsistent reference alleles at {locus}: {}", sequences.join(" "))]
    InconsistentReferences {
        locus: String,
        sequences: Vec<String>,
    },

    #[error("Datasets contain no reference allele at {locus}")]
    MissingReference { locus: String },

    #[error("Genotyping site {site} failed: {source}")]
    Genotype {
        site: usize,
        #[source]
        source: GenotypeError,
    },

    #[error("Output error: {0}")]
    Sink(#[from] SinkError),

    #[error("Failed to create worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Worker for site {site} exited without reporting a result")]
    WorkerLost { site: usize },

    #[error("Site {site} was cancelled before any failure was recorded")]
    Cancelled { site: usize },
}

impl ServiceError {
    /// Is this a data-consistency error (bad or conflicting reference alleles)?
    #[must_use]
    pub fn is_consistency_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidReference { .. }
                | Self::InconsistentReferences { .. }
                | Self::MissingReference { .. }
        )
    }
}
