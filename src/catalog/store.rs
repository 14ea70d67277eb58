use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use crate::catalog::metadata::{Metadata, MetadataError};
use crate::core::contig::Contig;
use crate::utils::validation::MAX_CONTIGS;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Too many contigs: {0} exceeds maximum allowed ({MAX_CONTIGS})")]
    TooManyContigs(usize),

    #[error("Duplicate contig name: {0}")]
    DuplicateContig(String),
}

/// Catalog version for compatibility checking
pub const CATALOG_VERSION: &str = "1.0.0";

/// Serializable catalog format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogData {
    pub version: String,
    pub contigs: Vec<Contig>,
    /// Sampleset name -> sample names
    #[serde(default)]
    pub samplesets: BTreeMap<String, BTreeSet<String>>,
    /// Sample name -> dataset name
    #[serde(default)]
    pub samples: BTreeMap<String, String>,
}

/// A [`Metadata`] directory backed by a JSON document.
///
/// ```json
/// {
///   "version": "1.0.0",
///   "contigs": [{"name": "chr1", "length": 248956422}],
///   "samplesets": {"trio": ["NA12878", "NA12891", "NA12892"]},
///   "samples": {"NA12878": "batch1", "NA12891": "batch1", "NA12892": "batch2"}
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct JsonCatalog {
    contigs: Vec<Contig>,
    samplesets: BTreeMap<String, BTreeSet<String>>,
    samples: BTreeMap<String, String>,
}

impl JsonCatalog {
    /// Create a catalog with the given contigs and no samples
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::TooManyContigs` or `CatalogError::DuplicateContig` if
    /// the contig list is invalid.
    pub fn new(contigs: Vec<Contig>) -> Result<Self, CatalogError> {
        if contigs.len() > MAX_CONTIGS {
            return Err(CatalogError::TooManyContigs(contigs.len()));
        }
        let mut names = BTreeSet::new();
        for contig in &contigs {
            if !names.insert(contig.name.as_str()) {
                return Err(CatalogError::DuplicateContig(contig.name.clone()));
            }
        }

        Ok(Self {
            contigs,
            samplesets: BTreeMap::new(),
            samples: BTreeMap::new(),
        })
    }

    /// Load catalog from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ReadError` if the file cannot be read, or another
    /// `CatalogError` if its content is invalid.
    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse catalog from JSON string
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ParseError` for malformed JSON, or a contig error.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let data: CatalogData = serde_json::from_str(json)?;

        // Version check (warn but don't fail)
        if data.version != CATALOG_VERSION {
            warn!(
                expected = CATALOG_VERSION,
                found = %data.version,
                "catalog version mismatch"
            );
        }

        let mut catalog = Self::new(data.contigs)?;
        catalog.samplesets = data.samplesets;
        catalog.samples = data.samples;
        Ok(catalog)
    }

    /// Export catalog to JSON
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::ParseError` if serialization fails.
    pub fn to_json(&self) -> Result<String, CatalogError> {
        let data = CatalogData {
            version: CATALOG_VERSION.to_string(),
            contigs: self.contigs.clone(),
            samplesets: self.samplesets.clone(),
            samples: self.samples.clone(),
        };
        Ok(serde_json::to_string_pretty(&data)?)
    }

    /// Register `sample` as stored in `dataset`
    pub fn add_sample(&mut self, sample: impl Into<String>, dataset: impl Into<String>) {
        self.samples.insert(sample.into(), dataset.into());
    }

    /// Define (or replace) a sampleset
    pub fn add_sampleset<I, S>(&mut self, name: impl Into<String>, samples: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.samplesets
            .insert(name.into(), samples.into_iter().map(Into::into).collect());
    }
}

impl Metadata for JsonCatalog {
    fn contigs(&self) -> Result<Vec<Contig>, MetadataError> {
        Ok(self.contigs.clone())
    }

    fn sampleset_samples(&self, sampleset: &str) -> Result<BTreeSet<String>, MetadataError> {
        self.samplesets
            .get(sampleset)
            .cloned()
            .ok_or_else(|| MetadataError::UnknownSampleset(sampleset.to_string()))
    }

    fn sample_dataset(&self, sample: &str) -> Result<String, MetadataError> {
        self.samples
            .get(sample)
            .cloned()
            .ok_or_else(|| MetadataError::UnknownSample(sample.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"{
        "version": "1.0.0",
        "contigs": [{"name": "chr1", "length": 1000}, {"name": "chr2", "length": 500}],
        "samplesets": {"trio": ["NA12878", "NA12891", "NA12892"]},
        "samples": {"NA12878": "batch1", "NA12891": "batch1", "NA12892": "batch2"}
    }"#;

    #[test]
    fn test_from_json() {
        let catalog = JsonCatalog::from_json(CATALOG).unwrap();
        assert_eq!(catalog.contigs().unwrap().len(), 2);
        assert_eq!(catalog.sampleset_samples("trio").unwrap().len(), 3);
        assert_eq!(catalog.sample_dataset("NA12892").unwrap(), "batch2");
    }

    #[test]
    fn test_lookup_errors() {
        let catalog = JsonCatalog::from_json(CATALOG).unwrap();
        assert_eq!(
            catalog.sampleset_samples("quartet").unwrap_err(),
            MetadataError::UnknownSampleset("quartet".to_string())
        );
        assert_eq!(
            catalog.sample_dataset("NA00001").unwrap_err(),
            MetadataError::UnknownSample("NA00001".to_string())
        );
    }

    #[test]
    fn test_json_round_trip() {
        let catalog = JsonCatalog::from_json(CATALOG).unwrap();
        let json = catalog.to_json().unwrap();
        let reloaded = JsonCatalog::from_json(&json).unwrap();
        assert_eq!(reloaded.contigs, catalog.contigs);
        assert_eq!(reloaded.samplesets, catalog.samplesets);
        assert_eq!(reloaded.samples, catalog.samples);
    }

    #[test]
    fn test_duplicate_contig_rejected() {
        let result = JsonCatalog::new(vec![Contig::new("chr1", 10), Contig::new("chr1", 20)]);
        assert!(matches!(result, Err(CatalogError::DuplicateContig(_))));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            JsonCatalog::from_json("{not json"),
            Err(CatalogError::ParseError(_))
        ));
    }

    #[test]
    fn test_builder_methods() {
        let mut catalog = JsonCatalog::new(vec![Contig::new("chr1", 10)]).unwrap();
        catalog.add_sample("s1", "ds1");
        catalog.add_sampleset("set", ["s1"]);
        assert_eq!(catalog.sample_dataset("s1").unwrap(), "ds1");
        assert!(catalog.sampleset_samples("set").unwrap().contains("s1"));
    }
}
