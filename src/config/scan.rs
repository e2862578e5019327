//! Immutable scan configuration.

use crate::error::{ScanError, ScanResult};
use crate::types::PortRange;
use std::path::PathBuf;
use std::time::Duration;

/// Upper bound on concurrent workers. More than one per port is never useful.
pub const MAX_WORKERS: usize = 65_535;

/// Upper bound on pending jobs in the queue.
pub const MAX_QUEUE_CAPACITY: usize = 65_535;

/// Where discovered open ports are reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Collect in memory and print once the scan completes.
    Console,
    /// Append annotated lines to a file as ports are discovered.
    File(PathBuf),
}

/// Everything the coordinator needs, validated once before scanning.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    host: String,
    range: PortRange,
    workers: usize,
    queue_capacity: usize,
    timeout: Option<Duration>,
    output: OutputTarget,
}

impl ScanConfig {
    /// Create a configuration with one worker, no timeout and console output.
    pub fn new(host: impl Into<String>, range: PortRange) -> Self {
        Self {
            host: host.into(),
            range,
            workers: 1,
            queue_capacity: 1,
            timeout: None,
            output: OutputTarget::Console,
        }
    }

    /// Set the worker count. The queue capacity follows unless set explicitly afterwards.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self.queue_capacity = workers;
        self
    }

    /// Set the job queue capacity.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Set the per-probe connect deadline. A zero duration means none.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = (!timeout.is_zero()).then_some(timeout);
        self
    }

    /// Stream results to a file instead of the console.
    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output = OutputTarget::File(path.into());
        self
    }

    /// Check invariants that the type system does not already enforce.
    pub fn validate(self) -> ScanResult<Self> {
        if self.host.trim().is_empty() {
            return Err(ScanError::InvalidConfig("host must not be empty".into()));
        }
        if !(1..=MAX_WORKERS).contains(&self.workers) {
            return Err(ScanError::InvalidConfig(format!(
                "worker count must be between 1 and {}, got {}",
                MAX_WORKERS, self.workers
            )));
        }
        if !(1..=MAX_QUEUE_CAPACITY).contains(&self.queue_capacity) {
            return Err(ScanError::InvalidConfig(format!(
                "queue capacity must be between 1 and {}, got {}",
                MAX_QUEUE_CAPACITY, self.queue_capacity
            )));
        }
        Ok(self)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn range(&self) -> PortRange {
        self.range
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn output(&self) -> &OutputTarget {
        &self.output
    }
}
