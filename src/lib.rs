//! # jointcall
//!
//! A library for allele discovery and ordered, concurrent genotyping over a cohort of
//! variant datasets.
//!
//! A joint-genotyping run has two phases. First, the alleles observed across every
//! dataset of a sampleset are collected and reconciled so that each genomic range has
//! exactly one reference allele. Second, a list of unified sites is genotyped for
//! every sample, one worker task per site, with the output written strictly in site
//! order.
//!
//! ## Features
//!
//! - **Allele discovery**: Counts hard-called allele copies per dataset and merges them
//! - **Reference checks**: Rejects conflicting or missing reference alleles per range
//! - **Ordered fan-out**: Sites are genotyped in parallel, written in input order
//! - **Deterministic failure**: The error reported is always the lowest failing site
//! - **VCF output**: Plain or gzip-compressed, never left half-written
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use jointcall::catalog::metadata::Metadata;
//! use jointcall::{GenotyperConfig, JsonCatalog, MemoryStore, Range, Service, UnifiedSite};
//!
//! let catalog = JsonCatalog::load_from_file(Path::new("cohort.json")).unwrap();
//! let mut store = MemoryStore::new(catalog.contigs().unwrap());
//! store.add_vcf_file("batch1", Path::new("batch1.vcf")).unwrap();
//!
//! let service = Service::start(Box::new(catalog), Arc::new(store)).unwrap();
//!
//! let alleles = service.discover_alleles("cohort", &Range::new(0, 0, 10_000)).unwrap();
//! for (allele, info) in &alleles {
//!     println!("{allele}: ref={} count={}", info.is_ref, info.observation_count);
//! }
//!
//! let sites = vec![UnifiedSite::new(Range::new(0, 99, 100), vec!["A".into(), "G".into()])];
//! service
//!     .genotype_sites_to_file(&GenotyperConfig::default(), "cohort", sites, Path::new("out.vcf.gz"))
//!     .unwrap();
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: Metadata directory trait, JSON catalog, and resolution cache
//! - [`core`]: Contigs, ranges, alleles, and unified sites
//! - [`discovery`]: Allele extraction, merging, and reference checks
//! - [`genotyping`]: Per-site genotyper and the ordered worker pipeline
//! - [`output`]: VCF header construction and output sinks
//! - [`parsing`]: VCF text parser for loading datasets
//! - [`service`]: The request entry point
//! - [`storage`]: Variant store trait and in-memory store

pub mod catalog;
pub mod core;
pub mod discovery;
pub mod error;
pub mod genotyping;
pub mod output;
pub mod parsing;
pub mod service;
pub mod storage;
pub mod utils;

// Re-export commonly used types for convenience
pub use catalog::store::JsonCatalog;
pub use core::allele::{Allele, DiscoveredAlleleInfo};
pub use core::contig::Contig;
pub use core::range::Range;
pub use core::site::UnifiedSite;
pub use discovery::merge::DiscoveredAlleles;
pub use error::ServiceError;
pub use genotyping::genotyper::{GenotyperConfig, HardCallGenotyper, SiteGenotyper};
pub use service::Service;
pub use storage::memory::MemoryStore;
