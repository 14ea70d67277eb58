use std::collections::BTreeSet;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver};
use noodles::vcf;
use rayon::ThreadPool;
use tracing::{debug, info, warn};

use crate::core::site::UnifiedSite;
use crate::error::ServiceError;
use crate::genotyping::genotyper::{GenotypeError, GenotyperConfig, SiteGenotyper};
use crate::output::OutputSink;
use crate::storage::VariantStore;

/// Everything the per-site tasks of one request share, read-only
pub struct GenotypingJob<G> {
    pub genotyper: G,
    pub config: GenotyperConfig,
    pub store: Arc<dyn VariantStore>,
    pub samples: Arc<BTreeSet<String>>,
    pub datasets: Arc<BTreeSet<String>>,
    pub header: vcf::Header,
    pub sites: Vec<UnifiedSite>,
}

/// What a task hands back through its slot
#[derive(Debug)]
pub enum TaskOutcome<R> {
    Record(R),
    Failed(GenotypeError),
    /// Not started because an earlier site had already failed
    Cancelled,
    /// The genotyper panicked
    Panicked,
}

impl<G: SiteGenotyper> GenotypingJob<G> {
    fn run_site(&self, index: usize, abort: &AtomicBool) -> TaskOutcome<G::Record> {
        if abort.load(Ordering::Relaxed) {
            return TaskOutcome::Cancelled;
        }

        let site = &self.sites[index];
        let result = catch_unwind(AssertUnwindSafe(|| {
            self.genotyper.genotype_site(
                &self.config,
                self.store.as_ref(),
                site,
                &self.samples,
                &self.datasets,
                &self.header,
            )
        }));

        match result {
            Ok(Ok(record)) => TaskOutcome::Record(record),
            Ok(Err(e)) => TaskOutcome::Failed(e),
            Err(_) => TaskOutcome::Panicked,
        }
    }
}

/// Genotype every site of `job` on `pool`, writing records to `sink` in site order.
///
/// One task per site is submitted up front. The calling thread then drains the
/// per-site slots in ascending index order, so records reach the sink in input order
/// regardless of completion order. The first failure seen by the drain, which is
/// always the lowest failing site index, is kept; it raises the abort flag so tasks
/// not yet started skip their work, and every later record is dropped. The sink is
/// finalized only if every site succeeded.
///
/// The drain blocks the calling thread, so this must not be called from a thread of
/// `pool` itself: with a single worker the drain would wait on a task that can
/// never be scheduled.
///
/// Returns the number of records written.
///
/// # Errors
///
/// Returns `ServiceError::Genotype` for the lowest failing site,
/// `ServiceError::Sink` if writing or finalizing fails, or
/// `ServiceError::WorkerLost` if a task panicked or vanished.
pub fn run_ordered<G, S>(
    pool: &ThreadPool,
    job: Arc<GenotypingJob<G>>,
    sink: &mut S,
) -> Result<usize, ServiceError>
where
    G: SiteGenotyper,
    S: OutputSink<G::Record> + ?Sized,
{
    let abort = Arc::new(AtomicBool::new(false));
    let slots = submit(pool, &job, &abort);
    info!(
        sites = slots.len(),
        threads = pool.current_num_threads(),
        "genotyping sites"
    );

    let mut error: Option<ServiceError> = None;
    let mut written = 0usize;
    let mut discarded = 0usize;

    for (index, slot) in slots.into_iter().enumerate() {
        // recv moves the outcome out of the slot; the slot is dropped at end of scope
        let outcome = slot.recv().unwrap_or(TaskOutcome::Panicked);

        if error.is_some() {
            if let TaskOutcome::Record(_) | TaskOutcome::Failed(_) = outcome {
                discarded += 1;
            }
            continue;
        }

        let failure = match outcome {
            TaskOutcome::Record(record) => match sink.write(record) {
                Ok(()) => {
                    written += 1;
                    None
                }
                Err(e) => Some(ServiceError::Sink(e)),
            },
            TaskOutcome::Failed(source) => Some(ServiceError::Genotype { site: index, source }),
            TaskOutcome::Cancelled => Some(ServiceError::Cancelled { site: index }),
            TaskOutcome::Panicked => Some(ServiceError::WorkerLost { site: index }),
        };

        if let Some(e) = failure {
            warn!(site = index, error = %e, "genotyping failed, aborting remaining sites");
            abort.store(true, Ordering::Relaxed);
            error = Some(e);
        }
    }

    if let Some(e) = error {
        debug!(written, discarded, "genotyping aborted");
        return Err(e);
    }

    sink.finalize()?;
    info!(records = written, "genotyping complete");
    Ok(written)
}

/// Spawn one task per site and return its slots in site order
fn submit<G: SiteGenotyper>(
    pool: &ThreadPool,
    job: &Arc<GenotypingJob<G>>,
    abort: &Arc<AtomicBool>,
) -> Vec<Receiver<TaskOutcome<G::Record>>> {
    (0..job.sites.len())
        .map(|index| {
            let (tx, rx) = bounded(1);
            let job = Arc::clone(job);
            let abort = Arc::clone(abort);
            pool.spawn_fifo(move || {
                let outcome = job.run_site(index, &abort);
                if tx.send(outcome).is_err() {
                    debug!(site = index, "result slot closed before delivery");
                }
            });
            rx
        })
        .collect()
}
