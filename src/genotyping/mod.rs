//! Concurrent per-site genotyping with ordered output.
//!
//! - [`SiteGenotyper`](genotyper::SiteGenotyper): Computes one output record per site
//! - [`HardCallGenotyper`](genotyper::HardCallGenotyper): Translates stored hard calls
//!   onto the site's allele list
//! - [`run_ordered`](pipeline::run_ordered): Fans sites out to a worker pool and
//!   writes the results back in site order
//!
//! ## Ordering and failure
//!
//! Each site gets a single-use result slot. Workers fill slots in whatever order they
//! finish; the caller empties them strictly by index. The error returned for a request
//! is therefore always that of the lowest failing site, independent of scheduling.
//! After a failure, tasks that have not started yet skip their work; tasks already
//! running complete and their results are discarded.

pub mod genotyper;
pub mod pipeline;
