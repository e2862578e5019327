//! Scanner module - the concurrent scanning engine.
//!
//! One producer fills a bounded queue with every port of the range; a fixed
//! pool of workers drains it, probing each port exactly once and handing the
//! outcome to the shared [`ResultSink`]. The scan is complete when every
//! worker has observed the closed queue and returned.

pub mod sink;
pub mod tcp;
pub mod traits;

use crate::config::ScanConfig;
use crate::error::{ScanError, ScanResult};
use crate::services::ServiceCatalog;
use crate::types::{Port, PortRange};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

pub use sink::ResultSink;
pub use tcp::TcpConnectProber;
pub use traits::{ProbeCounter, Prober, ProgressObserver, ScanOutcome};

/// Receiving end of the job queue, shared by all workers.
pub type SharedJobs = Arc<Mutex<mpsc::Receiver<Port>>>;

/// Producer side of the bounded job queue.
pub struct JobSource {
    tx: mpsc::Sender<Port>,
}

impl JobSource {
    /// Create a queue holding at most `capacity` pending ports.
    pub fn bounded(capacity: usize) -> (Self, SharedJobs) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, Arc::new(Mutex::new(rx)))
    }

    /// Push every port of `range` once, ascending. Waits while the queue is full.
    pub async fn fill(&self, range: &PortRange) -> ScanResult<()> {
        for (sent, port) in range.iter().enumerate() {
            if self.tx.send(port).await.is_err() {
                return Err(ScanError::QueueClosed {
                    remaining: range.len() - sent,
                });
            }
        }
        Ok(())
    }

    /// Signal that no more work will arrive.
    pub fn close(self) {
        drop(self.tx);
    }
}

/// Fixed set of probe workers.
pub struct WorkerPool {
    workers: JoinSet<u64>,
}

impl WorkerPool {
    /// Launch `size` workers, all pulling from `jobs`.
    pub fn spawn<P, O>(
        size: usize,
        jobs: SharedJobs,
        prober: Arc<P>,
        sink: Arc<ResultSink>,
        progress: Arc<O>,
    ) -> Self
    where
        P: Prober + 'static,
        O: ProgressObserver + 'static,
    {
        let mut workers = JoinSet::new();
        for id in 0..size {
            workers.spawn(run_worker(
                id,
                Arc::clone(&jobs),
                Arc::clone(&prober),
                Arc::clone(&sink),
                Arc::clone(&progress),
            ));
        }
        Self { workers }
    }

    /// Join barrier: wait for every worker, returning the total probe count.
    pub async fn await_completion(mut self) -> ScanResult<u64> {
        let mut probed = 0;
        let mut failure = None;

        while let Some(joined) = self.workers.join_next().await {
            match joined {
                Ok(count) => probed += count,
                Err(e) => {
                    warn!(error = %e, "worker did not finish");
                    failure.get_or_insert_with(|| e.to_string());
                }
            }
        }

        match failure {
            Some(reason) => Err(ScanError::Worker(reason)),
            None => Ok(probed),
        }
    }
}

async fn run_worker<P, O>(
    id: usize,
    jobs: SharedJobs,
    prober: Arc<P>,
    sink: Arc<ResultSink>,
    progress: Arc<O>,
) -> u64
where
    P: Prober,
    O: ProgressObserver,
{
    let mut probed = 0;

    loop {
        // The guard is released before probing so other workers can dequeue.
        let next = jobs.lock().await.recv().await;
        let Some(port) = next else { break };

        let outcome = prober.probe(port).await;
        progress.port_done();
        probed += 1;

        if let Err(e) = sink.accept(outcome) {
            warn!(%port, error = %e, "failed to write result");
        }
    }

    debug!(worker = id, probed, "worker finished");
    probed
}

/// Final report of a completed scan.
#[derive(Debug, Clone)]
pub struct ScanSummary {
    pub host: String,
    pub range: PortRange,
    pub probed: u64,
    pub open_ports: Vec<Port>,
    pub output: Option<PathBuf>,
    pub duration: Duration,
}

/// Owns the queue, the worker pool and the result sink for one scan.
pub struct Coordinator<P> {
    config: ScanConfig,
    prober: Arc<P>,
    sink: Arc<ResultSink>,
}

impl Coordinator<TcpConnectProber> {
    /// Coordinator probing over real TCP connects.
    pub fn tcp(config: ScanConfig, catalog: Arc<ServiceCatalog>) -> ScanResult<Self> {
        let prober = TcpConnectProber::new(config.host(), config.timeout());
        Self::new(config, catalog, prober)
    }
}

impl<P: Prober + 'static> Coordinator<P> {
    /// Validate the configuration and open the output sink.
    ///
    /// Fails before any worker exists if the config is invalid or the output
    /// file cannot be created.
    pub fn new(config: ScanConfig, catalog: Arc<ServiceCatalog>, prober: P) -> ScanResult<Self> {
        let config = config.validate()?;
        let sink = ResultSink::for_target(catalog, config.output())?;

        Ok(Self {
            config,
            prober: Arc::new(prober),
            sink: Arc::new(sink),
        })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Run the scan to completion over the whole range.
    pub async fn run<O>(self, progress: Arc<O>) -> ScanResult<ScanSummary>
    where
        O: ProgressObserver + 'static,
    {
        let start = Instant::now();
        let range = self.config.range();

        info!(
            host = self.config.host(),
            %range,
            workers = self.config.workers(),
            timeout = ?self.config.timeout(),
            "starting scan"
        );

        let (source, jobs) = JobSource::bounded(self.config.queue_capacity());
        let pool = WorkerPool::spawn(
            self.config.workers(),
            jobs,
            Arc::clone(&self.prober),
            Arc::clone(&self.sink),
            progress,
        );

        let filled = source.fill(&range).await;
        source.close();
        let probed = pool.await_completion().await?;
        filled?;

        self.sink.finish()?;

        let summary = ScanSummary {
            host: self.config.host().to_string(),
            range,
            probed,
            open_ports: self.sink.open_ports(),
            output: self.sink.output_path().map(PathBuf::from),
            duration: start.elapsed(),
        };

        info!(
            probed = summary.probed,
            open = summary.open_ports.len(),
            elapsed_ms = summary.duration.as_millis() as u64,
            "scan complete"
        );

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex as StdMutex;

    /// Prober with a fixed open set that records every port it is asked about.
    struct FakeProber {
        open: HashSet<u16>,
        seen: StdMutex<Vec<u16>>,
    }

    impl FakeProber {
        fn new(open: &[u16]) -> Self {
            Self {
                open: open.iter().copied().collect(),
                seen: StdMutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Prober for FakeProber {
        async fn probe(&self, port: Port) -> ScanOutcome {
            self.seen.lock().unwrap().push(port.as_u16());
            tokio::task::yield_now().await;
            if self.open.contains(&port.as_u16()) {
                ScanOutcome::open(port)
            } else {
                ScanOutcome::closed(port)
            }
        }
    }

    fn catalog() -> Arc<ServiceCatalog> {
        Arc::new(ServiceCatalog::default())
    }

    fn ports(values: &[u16]) -> Vec<Port> {
        values.iter().map(|&p| Port::new(p).unwrap()).collect()
    }

    async fn scan(
        start: u32,
        end: u32,
        workers: usize,
        open: &[u16],
    ) -> (ScanSummary, Vec<u16>, u64) {
        let config = ScanConfig::new("fake", PortRange::from_bounds(start, end).unwrap())
            .with_workers(workers);
        let coordinator = Coordinator::new(config, catalog(), FakeProber::new(open)).unwrap();
        let prober = Arc::clone(&coordinator.prober);
        let counter = Arc::new(ProbeCounter::new());

        let summary = coordinator.run(Arc::clone(&counter)).await.unwrap();

        let mut seen = prober.seen.lock().unwrap().clone();
        seen.sort_unstable();
        (summary, seen, counter.get())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_every_port_probed_exactly_once() {
        let (summary, seen, ticks) = scan(1, 1000, 50, &[22, 80, 443]).await;

        assert_eq!(seen, (1..=1000).collect::<Vec<u16>>());
        assert_eq!(summary.probed, 1000);
        assert_eq!(ticks, 1000);
        assert_eq!(summary.open_ports, ports(&[22, 80, 443]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_worker_count_does_not_change_membership() {
        let (one, _, _) = scan(1, 1000, 1, &[22, 80, 443]).await;
        let (many, _, _) = scan(1, 1000, 50, &[22, 80, 443]).await;

        assert_eq!(one.open_ports, many.open_ports);
        assert_eq!(one.probed, many.probed);
    }

    #[tokio::test]
    async fn test_open_ports_stay_within_range() {
        let (summary, seen, _) = scan(100, 200, 8, &[22, 150, 443]).await;

        assert_eq!(summary.open_ports, ports(&[150]));
        assert!(seen.iter().all(|p| (100..=200).contains(p)));
    }

    #[tokio::test]
    async fn test_single_port_range() {
        let (summary, seen, _) = scan(8080, 8080, 10, &[8080]).await;

        assert_eq!(seen, vec![8080]);
        assert_eq!(summary.probed, 1);
        assert_eq!(summary.open_ports, ports(&[8080]));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_full_range() {
        let (summary, seen, _) = scan(1, 65535, 64, &[1, 65535]).await;

        assert_eq!(summary.probed, 65535);
        assert_eq!(seen.len(), 65535);
        assert_eq!(seen.first(), Some(&1));
        assert_eq!(seen.last(), Some(&65535));
        assert_eq!(summary.open_ports, ports(&[1, 65535]));
    }

    #[tokio::test]
    async fn test_no_open_ports() {
        let (summary, _, _) = scan(1, 100, 10, &[]).await;

        assert!(summary.open_ports.is_empty());
        assert_eq!(summary.probed, 100);
        assert!(summary.output.is_none());
    }

    #[tokio::test]
    async fn test_queue_smaller_than_pool() {
        let config = ScanConfig::new("fake", PortRange::from_bounds(1, 500).unwrap())
            .with_workers(16)
            .with_queue_capacity(1);
        let coordinator = Coordinator::new(config, catalog(), FakeProber::new(&[7])).unwrap();

        let summary = coordinator.run(Arc::new(())).await.unwrap();
        assert_eq!(summary.probed, 500);
        assert_eq!(summary.open_ports, ports(&[7]));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_before_scan() {
        let config =
            ScanConfig::new("fake", PortRange::from_bounds(1, 10).unwrap()).with_workers(0);
        let result = Coordinator::new(config, catalog(), FakeProber::new(&[]));

        assert!(matches!(result, Err(ScanError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_oversized_queue_rejected_before_scan() {
        let config = ScanConfig::new("127.0.0.1", PortRange::from_bounds(1, 1).unwrap())
            .with_workers(1)
            .with_queue_capacity(usize::MAX / 2);
        let result = Coordinator::new(config, catalog(), FakeProber::new(&[]));

        assert!(matches!(result, Err(ScanError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_job_source_reports_closed_queue() {
        let (source, jobs) = JobSource::bounded(4);
        drop(jobs);

        let range = PortRange::from_bounds(1, 10).unwrap();
        assert!(matches!(
            source.fill(&range).await,
            Err(ScanError::QueueClosed { remaining: 10 })
        ));
    }

    struct PanickingProber;

    #[async_trait]
    impl Prober for PanickingProber {
        async fn probe(&self, port: Port) -> ScanOutcome {
            if port.as_u16() == 5 {
                panic!("probe exploded");
            }
            ScanOutcome::closed(port)
        }
    }

    #[tokio::test]
    async fn test_worker_panic_is_reported() {
        let config =
            ScanConfig::new("fake", PortRange::from_bounds(1, 10).unwrap()).with_workers(1);
        let coordinator = Coordinator::new(config, catalog(), PanickingProber).unwrap();

        let result = coordinator.run(Arc::new(())).await;
        assert!(matches!(result, Err(ScanError::Worker(_))));
    }
}
