//! # portsweep - A Concurrent TCP Port Scanner
//!
//! Probes every port of a contiguous range on one host with full TCP connect
//! attempts, spread across a fixed pool of workers, and reports the open
//! ports either on the console or streamed to a file annotated with
//! well-known service descriptions.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use portsweep::config::ScanConfig;
//! use portsweep::scanner::Coordinator;
//! use portsweep::services::ServiceCatalog;
//! use portsweep::types::PortRange;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ScanConfig::new("127.0.0.1", PortRange::from_bounds(1, 1024)?)
//!         .with_workers(100)
//!         .with_timeout(Duration::from_millis(200));
//!     let catalog = Arc::new(ServiceCatalog::bundled()?);
//!
//!     let summary = Coordinator::tcp(config, catalog)?.run(Arc::new(())).await?;
//!     for port in summary.open_ports {
//!         println!("{port} is open");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - `Port` and `PortRange` newtypes
//! - [`config`] - Settings file and the immutable `ScanConfig`
//! - [`services`] - Well-known port catalog
//! - [`scanner`] - Job queue, worker pool, TCP prober and result sink
//! - [`output`] - Console rendering
//! - [`error`] - Error types

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod scanner;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use config::{OutputTarget, ScanConfig};
pub use error::{CatalogError, ConfigError, ScanError};
pub use scanner::{Coordinator, Prober, ProgressObserver, ResultSink, ScanOutcome, ScanSummary};
pub use services::{ServiceCatalog, ServiceDescriptor};
pub use types::{Port, PortRange};
