//! Configuration management for portsweep.
//!
//! `AppSettings` supplies defaults from an optional settings file;
//! `ScanConfig` is the validated, immutable input to a single scan.

mod scan;
mod settings;

pub use scan::{OutputTarget, ScanConfig, MAX_QUEUE_CAPACITY, MAX_WORKERS};
pub use settings::{AppSettings, Paths};
