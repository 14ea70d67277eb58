//! Allele discovery across the datasets of a sampleset.
//!
//! - [`DiscoveryEngine`]: Resolves a sampleset and walks its datasets in order
//! - [`DiscoveredAlleles`]: The merged allele set, with its consistency check
//! - [`record_alleles`]: What a single variant record contributes
//!
//! ## Algorithm
//!
//! For every record overlapping the query range, hard-called copies of each allele
//! are counted. Alt alleles that are literal `[ACGT]+` sequences are kept, and the
//! reference allele is kept alongside them. Per-record results are merged into a
//! per-dataset set, and per-dataset sets into the request result.
//!
//! Once every dataset is merged, each range must have exactly one reference allele.
//! Two datasets disagreeing on the reference sequence at a range, or a range with no
//! reference at all, fails the request.
//!
//! [`DiscoveryEngine`]: engine::DiscoveryEngine
//! [`DiscoveredAlleles`]: merge::DiscoveredAlleles
//! [`record_alleles`]: extract::record_alleles

pub mod engine;
pub mod extract;
pub mod merge;
