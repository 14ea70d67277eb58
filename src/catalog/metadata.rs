use std::collections::BTreeSet;

use thiserror::Error;

use crate::core::contig::Contig;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
    #[error("Unknown sampleset: {0}")]
    UnknownSampleset(String),

    #[error("Unknown sample: {0}")]
    UnknownSample(String),

    #[error("Metadata unavailable: {0}")]
    Unavailable(String),
}

/// The sample/dataset metadata directory.
///
/// Implementations answer three questions: which contigs exist, which samples make
/// up a sampleset, and which dataset holds a sample.
pub trait Metadata: Send + Sync {
    /// The contig catalogue, in coordinate (`rid`) order
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::Unavailable` if the catalogue cannot be read.
    fn contigs(&self) -> Result<Vec<Contig>, MetadataError>;

    /// Sample names making up `sampleset`
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::UnknownSampleset` if there is no such sampleset.
    fn sampleset_samples(&self, sampleset: &str) -> Result<BTreeSet<String>, MetadataError>;

    /// The dataset holding `sample`
    ///
    /// # Errors
    ///
    /// Returns `MetadataError::UnknownSample` if the sample is not registered.
    fn sample_dataset(&self, sample: &str) -> Result<String, MetadataError>;
}
