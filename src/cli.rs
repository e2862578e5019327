//! Command-line interface definitions for portsweep.
//!
//! Uses `clap` derive macros for declarative argument parsing. Flags left
//! unset fall back to [`AppSettings`], and the merged values become one
//! immutable [`ScanConfig`].

use crate::config::{AppSettings, ScanConfig};
use crate::error::ScanResult;
use crate::output;
use crate::scanner::{Coordinator, ScanSummary};
use crate::services::ServiceCatalog;
use crate::types::PortRange;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// A concurrent TCP connect port scanner.
#[derive(Parser, Debug)]
#[command(name = "portsweep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Probe a range of TCP ports with a pool of workers", long_about = None)]
pub struct Args {
    /// Number of parallel workers
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Host to scan (IP address or hostname)
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Start port for scanning
    #[arg(short = 's', long)]
    pub start: Option<u32>,

    /// End port for scanning
    #[arg(short = 'e', long)]
    pub end: Option<u32>,

    /// Connect timeout per port in milliseconds (0 = wait for the OS)
    #[arg(short = 't', long = "timeout", value_name = "MS")]
    pub timeout_ms: Option<u64>,

    /// File to save output; open ports are printed to the console if omitted
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Capacity of the job queue (defaults to the worker count)
    #[arg(long, value_name = "N")]
    pub queue_capacity: Option<usize>,

    /// Path to a settings file
    #[arg(long, value_name = "PATH", env = "PORTSWEEP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Wait for Enter before exiting
    #[arg(long)]
    pub pause: bool,
}

impl Args {
    /// Load the settings file named by `--config`, or the default one.
    pub fn load_settings(&self) -> anyhow::Result<AppSettings> {
        let settings = match &self.config {
            Some(path) => AppSettings::load_from(path),
            None => AppSettings::load(),
        };
        settings.context("failed to load settings")
    }

    /// Merge flags over `settings` into a validated scan configuration.
    pub fn scan_config(&self, settings: &AppSettings) -> ScanResult<ScanConfig> {
        let range = PortRange::from_bounds(
            self.start.unwrap_or(settings.default_start),
            self.end.unwrap_or(settings.default_end),
        )?;
        let host = self
            .host
            .clone()
            .unwrap_or_else(|| settings.default_host.clone());
        let workers = self.workers.unwrap_or(settings.default_workers);
        let timeout_ms = self.timeout_ms.unwrap_or(settings.default_timeout_ms);

        let mut config = ScanConfig::new(host, range)
            .with_workers(workers)
            .with_timeout(Duration::from_millis(timeout_ms));

        if let Some(capacity) = self.queue_capacity {
            config = config.with_queue_capacity(capacity);
        }
        if let Some(path) = &self.output {
            config = config.with_output_file(path);
        }

        config.validate()
    }

    /// Run a complete scan and print its results.
    pub async fn execute(&self) -> anyhow::Result<ScanSummary> {
        let settings = self.load_settings()?;
        let config = self.scan_config(&settings)?;

        let catalog =
            Arc::new(ServiceCatalog::bundled().context("failed to load bundled service catalog")?);
        let coordinator = Coordinator::tcp(config, catalog)?;

        let total = coordinator.config().range().len() as u64;
        let progress = Arc::new(output::progress_bar(total, self.quiet));

        let summary = coordinator.run(Arc::clone(&progress)).await?;
        progress.finish_and_clear();

        output::print_results(&summary).context("failed to print results")?;
        if !self.quiet {
            output::print_statistics(&summary);
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScanError;
    use crate::types::PortError;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("portsweep").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_come_from_settings() {
        let config = parse(&[]).scan_config(&AppSettings::default()).unwrap();

        assert_eq!(config.host(), "127.0.0.1");
        assert_eq!(config.workers(), 10);
        assert_eq!(config.queue_capacity(), 10);
        assert_eq!(config.range(), PortRange::from_bounds(1, 65535).unwrap());
        assert_eq!(config.timeout(), None);
    }

    #[test]
    fn test_flags_override_settings() {
        let args = parse(&[
            "-w", "50", "-H", "scanme.local", "-s", "20", "-e", "25", "-t", "50", "-o", "out.txt",
        ]);
        let config = args.scan_config(&AppSettings::default()).unwrap();

        assert_eq!(config.host(), "scanme.local");
        assert_eq!(config.workers(), 50);
        assert_eq!(config.range().len(), 6);
        assert_eq!(config.timeout(), Some(Duration::from_millis(50)));
        assert_eq!(
            config.output(),
            &crate::config::OutputTarget::File(PathBuf::from("out.txt"))
        );
    }

    #[test]
    fn test_queue_capacity_flag() {
        let args = parse(&["-w", "4", "--queue-capacity", "64"]);
        let config = args.scan_config(&AppSettings::default()).unwrap();
        assert_eq!(config.workers(), 4);
        assert_eq!(config.queue_capacity(), 64);
    }

    #[test]
    fn test_invalid_range_is_rejected() {
        let settings = AppSettings::default();

        let err = parse(&["-s", "100", "-e", "50"]).scan_config(&settings).unwrap_err();
        assert!(matches!(err, ScanError::InvalidRange(PortError::InvalidRange(100, 50))));

        let err = parse(&["-s", "0"]).scan_config(&settings).unwrap_err();
        assert!(matches!(err, ScanError::InvalidRange(PortError::OutOfRange(0))));

        let err = parse(&["-e", "70000"]).scan_config(&settings).unwrap_err();
        assert!(matches!(err, ScanError::InvalidRange(PortError::OutOfRange(70000))));
    }

    #[test]
    fn test_oversized_workers_and_queue_rejected() {
        let settings = AppSettings::default();

        let err = parse(&["-w", "100000"]).scan_config(&settings).unwrap_err();
        assert!(matches!(err, ScanError::InvalidConfig(_)));

        let err = parse(&["--queue-capacity", "1000000000"])
            .scan_config(&settings)
            .unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_zero_workers_rejected() {
        let err = parse(&["-w", "0"])
            .scan_config(&AppSettings::default())
            .unwrap_err();
        assert!(err.is_config());
    }
}
