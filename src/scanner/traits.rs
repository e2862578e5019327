//! Scanner trait abstraction.
//!
//! Defines the seams of the worker pool: how a port is probed and who is
//! told when a port has been processed. Both are swappable so the pool can
//! be driven without touching the network.

use crate::types::Port;
use async_trait::async_trait;
use indicatif::ProgressBar;
use std::sync::atomic::{AtomicU64, Ordering};

/// Result of probing a single port.
///
/// Binary by design of the probe: any connect failure is `open: false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOutcome {
    pub port: Port,
    pub open: bool,
}

impl ScanOutcome {
    pub fn open(port: Port) -> Self {
        Self { port, open: true }
    }

    pub fn closed(port: Port) -> Self {
        Self { port, open: false }
    }
}

/// Trait for port probe implementations.
///
/// # Example
///
/// ```ignore
/// use portsweep::scanner::{Prober, ScanOutcome};
///
/// async fn check<P: Prober>(prober: &P, port: Port) -> bool {
///     prober.probe(port).await.open
/// }
/// ```
#[async_trait]
pub trait Prober: Send + Sync {
    /// Probe one port. Must not fail: errors classify the port as closed.
    async fn probe(&self, port: Port) -> ScanOutcome;
}

/// Receives one notification per processed port, whatever the outcome.
pub trait ProgressObserver: Send + Sync {
    fn port_done(&self);
}

/// No progress reporting.
impl ProgressObserver for () {
    fn port_done(&self) {}
}

/// indicatif handles its own redraw throttling.
impl ProgressObserver for ProgressBar {
    fn port_done(&self) {
        self.inc(1);
    }
}

/// Counts processed ports.
#[derive(Debug, Default)]
pub struct ProbeCounter(AtomicU64);

impl ProbeCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

impl ProgressObserver for ProbeCounter {
    fn port_done(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }
}
