//! Cooperative shutdown for the checker workers

use log::{error, info};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Process-wide stop flag. Once raised it stays raised.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    raised: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag. Returns `true` only for the call that raised it.
    pub fn trigger(&self) -> bool {
        !self.raised.swap(true, Ordering::SeqCst)
    }

    pub fn is_set(&self) -> bool {
        self.raised.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownState {
    Running,
    /// Terminal: no more proxies are handed out
    Stopping,
}

/// What the supervised run produced and how it ended
#[derive(Debug)]
pub struct Supervised<T> {
    pub output: T,
    pub interrupted: bool,
}

/// Watches for an interruption while the workers run.
///
/// On interruption the stop signal is raised and the run is still awaited
/// to completion, so in-flight probes finish and their results are kept.
#[derive(Debug, Clone)]
pub struct ShutdownCoordinator {
    stop: StopSignal,
}

impl ShutdownCoordinator {
    pub fn new(stop: StopSignal) -> Self {
        Self { stop }
    }

    pub fn stop_signal(&self) -> &StopSignal {
        &self.stop
    }

    pub fn state(&self) -> ShutdownState {
        if self.stop.is_set() {
            ShutdownState::Stopping
        } else {
            ShutdownState::Running
        }
    }

    /// Drive `run` until it finishes, stopping the workers early if
    /// `interrupt` completes first.
    pub async fn supervise<R, I>(&self, run: R, interrupt: I) -> Supervised<R::Output>
    where
        R: Future,
        I: Future<Output = ()>,
    {
        tokio::pin!(run);
        tokio::pin!(interrupt);

        tokio::select! {
            biased;
            output = &mut run => Supervised { output, interrupted: false },
            _ = &mut interrupt => {
                if self.stop.trigger() {
                    info!("Interrupted, waiting for in-flight checks to finish");
                }
                let output = run.await;
                Supervised { output, interrupted: true }
            }
        }
    }
}

/// Resolves on Ctrl-C. If the handler cannot be installed, never resolves.
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Unable to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proxy::checker::Probe;
    use crate::proxy::models::{ProbeOutcome, ProxyEndpoint};
    use crate::proxy::pool::{ValidationContext, WorkerPool};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;
    use tokio::sync::Notify;

    #[test]
    fn test_stop_signal_raised_once() {
        let stop = StopSignal::new();
        assert!(!stop.is_set());
        assert!(stop.trigger());
        assert!(!stop.clone().trigger());
        assert!(stop.is_set());
    }

    #[tokio::test]
    async fn test_supervise_completes_without_interrupt() {
        let coordinator = ShutdownCoordinator::new(StopSignal::new());
        let result = coordinator
            .supervise(async { 42 }, std::future::pending())
            .await;

        assert_eq!(result.output, 42);
        assert!(!result.interrupted);
        assert_eq!(coordinator.state(), ShutdownState::Running);
    }

    #[tokio::test]
    async fn test_supervise_waits_for_run_after_interrupt() {
        let coordinator = ShutdownCoordinator::new(StopSignal::new());
        let stop = coordinator.stop_signal().clone();

        let run = async move {
            while !stop.is_set() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
            "finished"
        };
        let result = coordinator
            .supervise(run, tokio::time::sleep(Duration::from_millis(10)))
            .await;

        assert_eq!(result.output, "finished");
        assert!(result.interrupted);
        assert_eq!(coordinator.state(), ShutdownState::Stopping);
    }

    /// Succeeds for every proxy; the `signal_at`-th call wakes the
    /// interrupt and then takes a while, like a probe in flight.
    struct InterruptingProbe {
        calls: AtomicUsize,
        signal_at: usize,
        interrupt: Arc<Notify>,
    }

    #[async_trait]
    impl Probe for InterruptingProbe {
        async fn probe(&self, _endpoint: &ProxyEndpoint) -> ProbeOutcome {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call == self.signal_at {
                self.interrupt.notify_one();
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
            ProbeOutcome::Working {
                elapsed: Duration::ZERO,
            }
        }
    }

    #[tokio::test]
    async fn test_interrupt_keeps_partial_results() {
        let endpoints: Vec<_> = (0..10)
            .map(|i| ProxyEndpoint::parse(&format!("http://10.0.0.{}:80", i), i + 1).unwrap())
            .collect();
        let interrupt = Arc::new(Notify::new());
        let probe = Arc::new(InterruptingProbe {
            calls: AtomicUsize::new(0),
            signal_at: 3,
            interrupt: Arc::clone(&interrupt),
        });

        let ctx = ValidationContext::new(endpoints.clone());
        let pool = WorkerPool::new(probe, 1);
        let coordinator = ShutdownCoordinator::new(ctx.stop_signal().clone());

        let waiter = Arc::clone(&interrupt);
        let result = coordinator
            .supervise(pool.run(&ctx), async move { waiter.notified().await })
            .await;

        assert!(result.interrupted);
        assert_eq!(result.output.snapshot(), endpoints[..3].to_vec());
        assert_eq!(ctx.queue().len(), 7);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("valid-proxies.txt");
        assert_eq!(ctx.results().flush(&path).unwrap(), 3);
        assert!(ctx.results().flush(&path).is_err());
    }
}
