//! Worker pool draining the validation queue

use crate::proxy::checker::Probe;
use crate::proxy::collector::ResultCollector;
use crate::proxy::models::{ProbeOutcome, ProxyEndpoint};
use crate::proxy::queue::ValidationQueue;
use crate::proxy::shutdown::StopSignal;
use futures::future;
use log::{debug, error, info};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Callback invoked for every proxy that passes the check
pub type SuccessObserver = Arc<dyn Fn(&ProxyEndpoint) + Send + Sync>;

/// Everything the workers share for one run.
///
/// Owned by the caller, which outlives the workers and flushes the results.
#[derive(Debug, Clone, Default)]
pub struct ValidationContext {
    queue: ValidationQueue,
    results: ResultCollector,
    stop: StopSignal,
    probed: Arc<AtomicUsize>,
    failed_workers: Arc<AtomicUsize>,
}

impl ValidationContext {
    pub fn new(endpoints: Vec<ProxyEndpoint>) -> Self {
        Self::with_parts(
            ValidationQueue::new(endpoints),
            ResultCollector::new(),
            StopSignal::new(),
        )
    }

    pub fn with_parts(queue: ValidationQueue, results: ResultCollector, stop: StopSignal) -> Self {
        Self {
            queue,
            results,
            stop,
            probed: Arc::new(AtomicUsize::new(0)),
            failed_workers: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn queue(&self) -> &ValidationQueue {
        &self.queue
    }

    pub fn results(&self) -> &ResultCollector {
        &self.results
    }

    pub fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    /// Number of probes completed so far
    pub fn probed(&self) -> usize {
        self.probed.load(Ordering::SeqCst)
    }

    /// Number of workers that died instead of exiting their loop
    pub fn failed_workers(&self) -> usize {
        self.failed_workers.load(Ordering::SeqCst)
    }

    /// True when dead workers left proxies in the queue that nobody checked
    pub fn is_aborted(&self) -> bool {
        self.failed_workers() > 0 && !self.queue.is_empty()
    }
}

/// Fixed-size set of workers sharing one probe
pub struct WorkerPool {
    probe: Arc<dyn Probe>,
    workers: usize,
    observer: Option<SuccessObserver>,
}

impl WorkerPool {
    /// `workers` is clamped to at least one
    pub fn new(probe: Arc<dyn Probe>, workers: usize) -> Self {
        Self {
            probe,
            workers: workers.max(1),
            observer: None,
        }
    }

    pub fn with_observer(mut self, observer: SuccessObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run the workers until the queue is drained or the stop signal is
    /// raised, then return the shared results. Does not flush.
    pub async fn run(&self, ctx: &ValidationContext) -> ResultCollector {
        info!("Starting {} workers for {} proxies", self.workers, ctx.queue.len());

        let handles: Vec<_> = (0..self.workers)
            .map(|id| {
                let probe = Arc::clone(&self.probe);
                let observer = self.observer.clone();
                let ctx = ctx.clone();
                tokio::spawn(async move { worker(id, probe, observer, ctx).await })
            })
            .collect();

        for joined in future::join_all(handles).await {
            if let Err(e) = joined {
                ctx.failed_workers.fetch_add(1, Ordering::SeqCst);
                error!("Worker terminated abnormally: {}", e);
            }
        }

        info!(
            "Workers finished: {} checked, {} working, {} left unchecked",
            ctx.probed(),
            ctx.results.len(),
            ctx.queue.len()
        );

        ctx.results.clone()
    }
}

async fn worker(
    id: usize,
    probe: Arc<dyn Probe>,
    observer: Option<SuccessObserver>,
    ctx: ValidationContext,
) {
    loop {
        if ctx.stop.is_set() {
            debug!("Worker {}: stop requested", id);
            break;
        }
        let Some(endpoint) = ctx.queue.pop() else {
            debug!("Worker {}: queue drained", id);
            break;
        };

        debug!(
            "Worker {}: checking {} ({})",
            id,
            endpoint,
            endpoint.scheme().map_or_else(|| "?".to_string(), |s| s.to_string())
        );
        let outcome = probe.probe(&endpoint).await;
        ctx.probed.fetch_add(1, Ordering::SeqCst);

        match outcome {
            ProbeOutcome::Working { elapsed } => {
                debug!("Proxy {} worked in {}ms", endpoint, elapsed.as_millis());
                ctx.results.insert(endpoint.clone());
                if let Some(observer) = &observer {
                    if panic::catch_unwind(AssertUnwindSafe(|| observer(&endpoint))).is_err() {
                        error!("Success observer panicked on {}", endpoint);
                    }
                }
            }
            other => debug!("Proxy {} didn't work: {}", endpoint, other),
        }
    }
}
