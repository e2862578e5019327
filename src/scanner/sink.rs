//! Result sink shared by all workers.
//!
//! The open-port set and the optional file writer sit behind one mutex, so
//! recording a port and writing its annotated lines is a single critical
//! section and lines from different workers never interleave.

use crate::config::OutputTarget;
use crate::error::{ScanError, ScanResult};
use crate::scanner::traits::ScanOutcome;
use crate::services::ServiceCatalog;
use crate::types::Port;
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

struct FileOutput {
    path: PathBuf,
    writer: BufWriter<File>,
}

#[derive(Default)]
struct SinkState {
    open: BTreeSet<Port>,
    file: Option<FileOutput>,
}

/// Concurrency-safe collector of open ports.
pub struct ResultSink {
    catalog: Arc<ServiceCatalog>,
    output_path: Option<PathBuf>,
    state: Mutex<SinkState>,
}

impl ResultSink {
    /// Collect open ports in memory only.
    pub fn console(catalog: Arc<ServiceCatalog>) -> Self {
        Self {
            catalog,
            output_path: None,
            state: Mutex::new(SinkState::default()),
        }
    }

    /// Create (truncating) `path` and stream annotated results into it.
    pub fn to_file(catalog: Arc<ServiceCatalog>, path: impl AsRef<Path>) -> ScanResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|source| ScanError::OutputFile {
            path: path.clone(),
            source,
        })?;

        Ok(Self {
            catalog,
            output_path: Some(path.clone()),
            state: Mutex::new(SinkState {
                open: BTreeSet::new(),
                file: Some(FileOutput {
                    path,
                    writer: BufWriter::new(file),
                }),
            }),
        })
    }

    /// Build the sink an output target asks for.
    pub fn for_target(catalog: Arc<ServiceCatalog>, target: &OutputTarget) -> ScanResult<Self> {
        match target {
            OutputTarget::Console => Ok(Self::console(catalog)),
            OutputTarget::File(path) => Self::to_file(catalog, path),
        }
    }

    /// Accept a worker's outcome. Closed ports leave no trace.
    pub fn accept(&self, outcome: ScanOutcome) -> io::Result<()> {
        if outcome.open {
            self.record_open(outcome.port)
        } else {
            Ok(())
        }
    }

    /// Record an open port and, in file mode, write and flush its annotation.
    ///
    /// The port is recorded even if the write fails.
    pub fn record_open(&self, port: Port) -> io::Result<()> {
        let mut state = self.lock();
        if !state.open.insert(port) {
            return Ok(());
        }

        match state.file.as_mut() {
            Some(out) => {
                for line in self.catalog.annotate(port) {
                    out.writer.write_all(line.as_bytes())?;
                }
                out.writer.flush()
            }
            None => Ok(()),
        }
    }

    /// Snapshot of the open ports recorded so far, ascending.
    pub fn open_ports(&self) -> Vec<Port> {
        self.lock().open.iter().copied().collect()
    }

    /// Path of the output file, if streaming to one.
    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    /// Flush and close the output file. Later recordings are kept in memory only.
    pub fn finish(&self) -> io::Result<()> {
        let file = self.lock().file.take();
        match file {
            Some(mut out) => {
                tracing::debug!(path = %out.path.display(), "closing output file");
                out.writer.flush()
            }
            None => Ok(()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SinkState> {
        // A panicking writer leaves the set itself consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
