//! Scanner engine - fans probes out over a bounded worker pool.
//!
//! A scan pre-loads every port into a shared [`PortQueue`] and starts a fixed
//! number of tokio tasks. Each worker pops one port at a time, probes it once
//! and exits as soon as the queue reports empty. Open ports are reported the
//! moment they are confirmed, so report order follows network latency rather
//! than queue order.

pub mod tcp;
pub mod traits;

use crate::error::ScanResult;
use crate::output::SharedReporter;
use crate::types::{Port, PortSpec, ScanTarget};
use futures::future::join_all;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::{debug, error, trace};

pub use tcp::TcpConnectProber;
pub use traits::{ProbeOutcome, Prober, SharedProber};

/// Shared work queue of ports still to be probed.
///
/// `try_pop` never waits: it either hands out a port or signals that no
/// work is left.
#[derive(Debug, Default)]
pub struct PortQueue {
    ports: Mutex<VecDeque<Port>>,
}

impl PortQueue {
    /// Create a queue pre-loaded with `ports`, in order.
    pub fn new(ports: impl IntoIterator<Item = Port>) -> Self {
        Self {
            ports: Mutex::new(ports.into_iter().collect()),
        }
    }

    /// Take the next port, or `None` once the queue is drained.
    pub fn try_pop(&self) -> Option<Port> {
        self.ports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    /// Number of ports still queued.
    pub fn len(&self) -> usize {
        self.ports.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Check if the queue is drained.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Counters for a finished scan.
///
/// Only counts are kept; individual results are delivered through the
/// reporter and never collected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub attempted: usize,
    pub open: usize,
    pub closed: usize,
    pub filtered: usize,
    pub failed: usize,
    pub elapsed: Duration,
}

impl ScanStats {
    fn merge(&mut self, other: ScanStats) {
        self.attempted += other.attempted;
        self.open += other.open;
        self.closed += other.closed;
        self.filtered += other.filtered;
        self.failed += other.failed;
    }
}

/// Concurrent port scanner.
///
/// # Example
///
/// ```rust,ignore
/// use portsweep::output::{HumanReporter};
/// use portsweep::scanner::{PortScanner, TcpConnectProber};
/// use portsweep::types::PortSpec;
/// use std::sync::Arc;
///
/// let scanner = PortScanner::new(
///     Arc::new(TcpConnectProber::default()),
///     Arc::new(HumanReporter::stdout(false)),
/// )
/// .with_concurrency(100);
///
/// scanner.scan("192.168.1.1", &PortSpec::parse_or_default("22,80,443")).await?;
/// ```
pub struct PortScanner {
    prober: SharedProber,
    reporter: SharedReporter,
    concurrency: usize,
}

impl PortScanner {
    /// Default number of concurrent workers.
    pub const DEFAULT_CONCURRENCY: usize = 50;

    /// Create a scanner with the default concurrency.
    pub fn new(prober: SharedProber, reporter: SharedReporter) -> Self {
        Self {
            prober,
            reporter,
            concurrency: Self::DEFAULT_CONCURRENCY,
        }
    }

    /// Set the worker count. Values below 1 are clamped to 1.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// The effective worker count.
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Resolve `host` once, then probe every port in `ports`.
    ///
    /// Fails only when the host cannot be resolved. Per-port failures are
    /// reported and never abort the scan.
    pub async fn scan(&self, host: &str, ports: &PortSpec) -> ScanResult<ScanStats> {
        let target = ScanTarget::resolve(host).await?;
        Ok(self.scan_target(&target, ports).await)
    }

    /// Probe every port in `ports` against an already resolved target.
    ///
    /// Blocks until the queue is drained and every worker has exited.
    pub async fn scan_target(&self, target: &ScanTarget, ports: &PortSpec) -> ScanStats {
        let start = Instant::now();
        self.reporter.scan_started(target, ports, self.concurrency);

        let queue = Arc::new(PortQueue::new(ports.iter()));
        let shared_target = Arc::new(target.clone());
        // Workers beyond the number of ports would exit immediately.
        let workers = self.concurrency.min(ports.len()).max(1);
        debug!(workers, ports = ports.len(), "starting scan workers");

        let handles = (0..workers).map(|id| {
            tokio::spawn(run_worker(
                id,
                Arc::clone(&queue),
                Arc::clone(&self.prober),
                Arc::clone(&self.reporter),
                Arc::clone(&shared_target),
            ))
        });

        let mut stats = ScanStats::default();
        for joined in join_all(handles).await {
            match joined {
                Ok(tally) => stats.merge(tally),
                Err(e) => error!(error = %e, "scan worker panicked"),
            }
        }
        stats.elapsed = start.elapsed();

        self.reporter.scan_finished(target, &stats);
        stats
    }
}

async fn run_worker(
    id: usize,
    queue: Arc<PortQueue>,
    prober: SharedProber,
    reporter: SharedReporter,
    target: Arc<ScanTarget>,
) -> ScanStats {
    let mut tally = ScanStats::default();

    while let Some(port) = queue.try_pop() {
        tally.attempted += 1;
        match prober.probe(target.ip, port).await {
            ProbeOutcome::Open => {
                tally.open += 1;
                reporter.port_open(&target, port);
            }
            ProbeOutcome::Closed => {
                tally.closed += 1;
                trace!(port = port.as_u16(), "closed");
            }
            ProbeOutcome::Filtered => {
                tally.filtered += 1;
                trace!(port = port.as_u16(), "filtered");
            }
            ProbeOutcome::Failed(e) => {
                tally.failed += 1;
                reporter.probe_failed(&target, port, &e);
            }
        }
    }

    trace!(worker = id, attempted = tally.attempted, "worker exiting");
    tally
}
