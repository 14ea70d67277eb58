use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;

use noodles::vcf;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::info;

use crate::catalog::cache::MetadataCache;
use crate::catalog::metadata::Metadata;
use crate::core::contig::Contig;
use crate::core::range::Range;
use crate::core::site::UnifiedSite;
use crate::discovery::engine::DiscoveryEngine;
use crate::discovery::merge::DiscoveredAlleles;
use crate::error::ServiceError;
use crate::genotyping::genotyper::{GenotyperConfig, HardCallGenotyper, SiteGenotyper};
use crate::genotyping::pipeline::{run_ordered, GenotypingJob};
use crate::output::writer::VcfFileSink;
use crate::output::{build_header, OutputSink};
use crate::storage::VariantStore;

/// Entry point for allele discovery and genotyping requests.
///
/// Owns the metadata cache and a fixed-size worker pool; both live as long as the
/// service. Requests may be issued from several threads at once.
pub struct Service {
    metadata: MetadataCache,
    store: Arc<dyn VariantStore>,
    pool: ThreadPool,
}

impl Service {
    /// Start a service with one worker per available CPU
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Lookup` if the contig catalogue cannot be loaded, or
    /// `ServiceError::WorkerPool` if the pool cannot be created.
    pub fn start(
        metadata: Box<dyn Metadata>,
        store: Arc<dyn VariantStore>,
    ) -> Result<Self, ServiceError> {
        let threads = std::thread::available_parallelism().map_or(1, NonZeroUsize::get);
        Self::with_threads(metadata, store, threads)
    }

    /// Start a service with exactly `threads` workers
    ///
    /// # Errors
    ///
    /// Same as [`Service::start`].
    pub fn with_threads(
        metadata: Box<dyn Metadata>,
        store: Arc<dyn VariantStore>,
        threads: usize,
    ) -> Result<Self, ServiceError> {
        let metadata = MetadataCache::start(metadata)?;
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("jointcall-worker-{i}"))
            .build()?;

        info!(
            threads = pool.current_num_threads(),
            contigs = metadata.contigs().len(),
            "service started"
        );

        Ok(Self {
            metadata,
            store,
            pool,
        })
    }

    /// The contig catalogue; a `Range`'s `rid` indexes into it
    #[must_use]
    pub fn contigs(&self) -> &[Contig] {
        self.metadata.contigs()
    }

    /// Discover alleles observed in `range` across all datasets of `sampleset`
    ///
    /// # Errors
    ///
    /// See [`DiscoveryEngine::discover`].
    pub fn discover_alleles(
        &self,
        sampleset: &str,
        range: &Range,
    ) -> Result<DiscoveredAlleles, ServiceError> {
        DiscoveryEngine::new(&self.metadata, self.store.as_ref()).discover(sampleset, range)
    }

    /// The VCF header genotyping output for `sampleset` is written against
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Lookup` if the sampleset cannot be resolved.
    pub fn output_header(&self, sampleset: &str) -> Result<vcf::Header, ServiceError> {
        let resolved = self.metadata.sampleset_datasets(sampleset)?;
        Ok(build_header(&resolved.samples, self.metadata.contigs()))
    }

    /// Genotype `sampleset` at each of `sites`, writing one record per site to `sink`
    /// in site order.
    ///
    /// `sink` must accept records for the header returned by
    /// [`output_header`](Self::output_header). It is finalized only if every site
    /// succeeds. Returns the number of records written.
    ///
    /// Blocks until every site is written. Do not call this from a `jointcall-worker-*`
    /// thread (for example from inside a genotyper): the request would wait on the
    /// service's own pool and can deadlock when the pool has one thread.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Lookup` if the sampleset cannot be resolved, otherwise
    /// see [`run_ordered`].
    pub fn genotype_sites<G, S>(
        &self,
        genotyper: G,
        config: &GenotyperConfig,
        sampleset: &str,
        sites: Vec<UnifiedSite>,
        sink: &mut S,
    ) -> Result<usize, ServiceError>
    where
        G: SiteGenotyper,
        S: OutputSink<G::Record> + ?Sized,
    {
        let resolved = self.metadata.sampleset_datasets(sampleset)?;
        let header = build_header(&resolved.samples, self.metadata.contigs());
        info!(
            sampleset,
            samples = resolved.samples.len(),
            datasets = resolved.datasets.len(),
            sites = sites.len(),
            "genotyping request"
        );

        let job = Arc::new(GenotypingJob {
            genotyper,
            config: config.clone(),
            store: Arc::clone(&self.store),
            samples: resolved.samples,
            datasets: resolved.datasets,
            header,
            sites,
        });

        run_ordered(&self.pool, job, sink)
    }

    /// Genotype with [`HardCallGenotyper`] into a VCF file at `path`.
    ///
    /// The file is gzip-compressed if `path` ends in `.gz`. On failure no file is
    /// left behind.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Sink` if the file cannot be created, otherwise see
    /// [`genotype_sites`](Self::genotype_sites).
    pub fn genotype_sites_to_file(
        &self,
        config: &GenotyperConfig,
        sampleset: &str,
        sites: Vec<UnifiedSite>,
        path: &Path,
    ) -> Result<usize, ServiceError> {
        let header = self.output_header(sampleset)?;
        let mut sink = VcfFileSink::create(path, &header)?;
        self.genotype_sites(HardCallGenotyper, config, sampleset, sites, &mut sink)
    }
}

impl std::fmt::Debug for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Service")
            .field("metadata", &self.metadata)
            .field("threads", &self.pool.current_num_threads())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::store::JsonCatalog;
    use crate::output::memory::MemorySink;
    use crate::storage::memory::MemoryStore;

    fn service() -> Service {
        let contigs = vec![Contig::new("chr1", 1000)];
        let mut catalog = JsonCatalog::new(contigs.clone()).unwrap();
        catalog.add_sample("s1", "ds1");
        catalog.add_sampleset("cohort", ["s1"]);

        let mut store = MemoryStore::new(contigs);
        store
            .add_vcf_text(
                "ds1",
                "##fileformat=VCFv4.3\n\
                 #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\ts1\n\
                 chr1\t5\t.\tC\tT\t.\t.\t.\tGT\t0/1\n",
            )
            .unwrap();

        Service::with_threads(Box::new(catalog), Arc::new(store), 2).unwrap()
    }

    #[test]
    fn test_worker_threads_are_named() {
        let service = service();
        let name = service
            .pool
            .install(|| std::thread::current().name().map(String::from));
        assert!(name.unwrap().starts_with("jointcall-worker-"));
    }

    #[test]
    fn test_discover_then_genotype() {
        let service = service();
        let range = Range::new(0, 0, 1000);
        let alleles = service.discover_alleles("cohort", &range).unwrap();
        assert_eq!(alleles.len(), 2);

        let site = UnifiedSite::new(Range::new(0, 4, 5), vec!["C".into(), "T".into()]);
        let mut sink = MemorySink::new();
        let written = service
            .genotype_sites(
                HardCallGenotyper,
                &GenotyperConfig::default(),
                "cohort",
                vec![site],
                &mut sink,
            )
            .unwrap();

        assert_eq!(written, 1);
        assert!(sink.finalized());
        assert_eq!(sink.records()[0].reference_bases(), "C");
    }

    #[test]
    fn test_unknown_sampleset() {
        let service = service();
        let mut sink = MemorySink::new();
        let err = service
            .genotype_sites(
                HardCallGenotyper,
                &GenotyperConfig::default(),
                "nope",
                Vec::new(),
                &mut sink,
            )
            .unwrap_err();
        assert!(matches!(err, ServiceError::Lookup(_)));
        assert!(!sink.finalized());
    }
}
