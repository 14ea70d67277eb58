//! Variant record storage.
//!
//! The [`VariantStore`] trait is the boundary to wherever per-dataset variant records
//! live. Discovery and genotyping only ever ask one question of it: give me the
//! header of a dataset and its records overlapping a range.
//!
//! [`MemoryStore`](memory::MemoryStore) is an in-memory implementation that can be
//! populated from VCF text.

use std::sync::Arc;

use thiserror::Error;

use crate::core::range::Range;
use crate::parsing::vcf::ParseError;

pub mod memory;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Unknown dataset: {0}")]
    UnknownDataset(String),

    #[error("Dataset already exists: {0}")]
    DuplicateDataset(String),

    #[error("Failed to parse dataset {dataset}: {source}")]
    Parse {
        dataset: String,
        #[source]
        source: ParseError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One hard-called allele copy.
///
/// Calls are stored flattened, `ploidy` per sample. Samples with fewer copies than
/// the record's ploidy are padded with [`GenotypeCall::VectorEnd`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenotypeCall {
    /// No call (`.`)
    Missing,
    /// No further calls for this sample
    VectorEnd,
    /// Index into the record's allele list
    Allele(usize),
}

/// Per-dataset header information
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DatasetHeader {
    /// Sample names in column order
    pub samples: Vec<String>,
}

impl DatasetHeader {
    pub fn new(samples: Vec<String>) -> Self {
        Self { samples }
    }
}

/// A variant record as stored for one dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRecord {
    pub range: Range,
    /// Allele sequences as written in the source; index 0 is the reference
    pub alleles: Vec<String>,
    /// Calls per sample copy
    pub ploidy: usize,
    /// Flattened calls: sample `i` occupies `calls[i * ploidy..(i + 1) * ploidy]`
    pub calls: Vec<GenotypeCall>,
}

impl VariantRecord {
    #[must_use]
    pub fn n_alleles(&self) -> usize {
        self.alleles.len()
    }

    /// The calls of one sample, or an empty slice if the index is out of bounds
    #[must_use]
    pub fn sample_calls(&self, sample: usize) -> &[GenotypeCall] {
        let start = sample * self.ploidy;
        self.calls
            .get(start..start + self.ploidy)
            .unwrap_or_default()
    }
}

/// Read access to the variant records of many datasets.
///
/// Implementations are shared between worker threads for the duration of a request,
/// so they must be safe for concurrent reads.
pub trait VariantStore: Send + Sync {
    /// Fetch the header of `dataset` and its records overlapping `range`, in
    /// position order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::UnknownDataset` if the dataset does not exist, or another
    /// `StorageError` if the records cannot be read.
    fn dataset_range_and_header(
        &self,
        dataset: &str,
        range: &Range,
    ) -> Result<(Arc<DatasetHeader>, Vec<Arc<VariantRecord>>), StorageError>;
}
