use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::core::contig::Contig;
use crate::core::range::Range;
use crate::parsing::vcf::{parse_vcf_file, parse_vcf_text, ParsedVcf};
use crate::storage::{DatasetHeader, StorageError, VariantRecord, VariantStore};

#[derive(Debug)]
struct Dataset {
    header: Arc<DatasetHeader>,
    /// Sorted by range
    records: Vec<Arc<VariantRecord>>,
}

/// An in-memory [`VariantStore`].
///
/// Datasets are immutable once added, so concurrent reads need no locking.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Contig catalogue used to resolve CHROM names when loading VCF
    contigs: Vec<Contig>,
    datasets: HashMap<String, Dataset>,
}

impl MemoryStore {
    /// Create an empty store over the given contig catalogue
    pub fn new(contigs: Vec<Contig>) -> Self {
        Self {
            contigs,
            datasets: HashMap::new(),
        }
    }

    #[must_use]
    pub fn contigs(&self) -> &[Contig] {
        &self.contigs
    }

    /// Add a dataset from already-built records.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::DuplicateDataset` if the name is taken.
    pub fn add_dataset(
        &mut self,
        name: impl Into<String>,
        header: DatasetHeader,
        mut records: Vec<VariantRecord>,
    ) -> Result<(), StorageError> {
        let name = name.into();
        if self.datasets.contains_key(&name) {
            return Err(StorageError::DuplicateDataset(name));
        }

        records.sort_by(|a, b| a.range.cmp(&b.range));
        debug!(dataset = %name, records = records.len(), "added dataset");

        self.datasets.insert(
            name,
            Dataset {
                header: Arc::new(header),
                records: records.into_iter().map(Arc::new).collect(),
            },
        );
        Ok(())
    }

    /// Add a dataset by parsing VCF text.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Parse` if the text is not valid VCF or names a contig
    /// outside the catalogue, or `StorageError::DuplicateDataset` if the name is taken.
    pub fn add_vcf_text(&mut self, name: impl Into<String>, text: &str) -> Result<(), StorageError> {
        let name = name.into();
        let parsed = parse_vcf_text(text, &self.contigs).map_err(|source| StorageError::Parse {
            dataset: name.clone(),
            source,
        })?;
        self.add_parsed(name, parsed)
    }

    /// Add a dataset by reading a VCF file.
    ///
    /// # Errors
    ///
    /// Same as [`MemoryStore::add_vcf_text`], plus read failures.
    pub fn add_vcf_file(&mut self, name: impl Into<String>, path: &Path) -> Result<(), StorageError> {
        let name = name.into();
        let parsed = parse_vcf_file(path, &self.contigs).map_err(|source| StorageError::Parse {
            dataset: name.clone(),
            source,
        })?;
        self.add_parsed(name, parsed)
    }

    fn add_parsed(&mut self, name: String, parsed: ParsedVcf) -> Result<(), StorageError> {
        for contig in &parsed.contigs {
            if !self.contigs.contains(contig) {
                debug!(dataset = %name, contig = %contig.name, "VCF header contig differs from catalogue");
            }
        }
        self.add_dataset(name, parsed.header, parsed.records)
    }
}

impl VariantStore for MemoryStore {
    fn dataset_range_and_header(
        &self,
        dataset: &str,
        range: &Range,
    ) -> Result<(Arc<DatasetHeader>, Vec<Arc<VariantRecord>>), StorageError> {
        let data = self
            .datasets
            .get(dataset)
            .ok_or_else(|| StorageError::UnknownDataset(dataset.to_string()))?;

        // Records are sorted by (rid, beg, end); nothing at or past the query end can overlap
        let upper = data
            .records
            .partition_point(|r| (r.range.rid, r.range.beg) < (range.rid, range.end));

        let records = data.records[..upper]
            .iter()
            .filter(|r| r.range.overlaps(range))
            .cloned()
            .collect();

        Ok((Arc::clone(&data.header), records))
    }
}
