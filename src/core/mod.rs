//! Core value types for allele discovery and genotyping.
//!
//! - [`Contig`]: A sequence in the service's contig catalogue
//! - [`Range`]: A zero-based, half-open interval on one contig
//! - [`Allele`], [`DiscoveredAlleleInfo`]: A sequence variant and what discovery learned about it
//! - [`UnifiedSite`]: A site with a reconciled allele list, the unit of genotyping work
//!
//! ## Coordinates
//!
//! Contigs are identified by their index (`rid`) in the catalogue returned by the
//! metadata directory, so a [`Range`] is only meaningful together with that
//! catalogue. Use [`Range::display_with`] to render it with contig names.
//!
//! [`Contig`]: contig::Contig
//! [`Range`]: range::Range
//! [`Range::display_with`]: range::Range::display_with
//! [`Allele`]: allele::Allele
//! [`DiscoveredAlleleInfo`]: allele::DiscoveredAlleleInfo
//! [`UnifiedSite`]: site::UnifiedSite

pub mod allele;
pub mod contig;
pub mod range;
pub mod site;
