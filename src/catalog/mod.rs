//! Sample and dataset metadata.
//!
//! The metadata directory knows the contig catalogue, which samples make up each
//! sampleset, and which dataset holds each sample. It is consumed through the
//! [`Metadata`](metadata::Metadata) trait, and always through a
//! [`MetadataCache`](cache::MetadataCache) which memoizes sampleset resolution.
//!
//! ## JSON Catalog
//!
//! [`JsonCatalog`](store::JsonCatalog) is a directory loaded from a JSON document:
//!
//! ```rust,no_run
//! use jointcall::catalog::store::JsonCatalog;
//! use std::path::Path;
//!
//! let catalog = JsonCatalog::load_from_file(Path::new("cohort.json")).unwrap();
//! let json = catalog.to_json().unwrap();
//! ```

pub mod cache;
pub mod metadata;
pub mod store;
