//! Console output.
//!
//! Results go to stdout; status messages and the progress bar go to stderr.

use crate::scanner::ScanSummary;
use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};

/// Redraw rate of the progress bar.
const PROGRESS_HZ: u8 = 4;

/// Build the scan progress bar, or a hidden one when `quiet`.
pub fn progress_bar(total: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let bar = ProgressBar::with_draw_target(
        Some(total),
        ProgressDrawTarget::stderr_with_hz(PROGRESS_HZ),
    );
    if let Ok(bar_style) = ProgressStyle::with_template(
        "{msg} {percent:>3}% |{bar:40.cyan}| ({pos}/{len}) [{elapsed_precise}]",
    ) {
        bar.set_style(bar_style.progress_chars("██ "));
    }
    bar.set_message("Scanning Ports");
    bar
}

/// Print results to stdout.
pub fn print_results(summary: &ScanSummary) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_results(&mut out, summary)
}

/// Write the end-of-scan report.
///
/// Console mode lists every open port under a fixed header; file mode only
/// points at the file, which already holds the annotated results.
pub fn write_results<W: Write>(out: &mut W, summary: &ScanSummary) -> io::Result<()> {
    writeln!(out)?;

    match &summary.output {
        Some(path) => {
            writeln!(out, "Results saved to {}", path.display())?;
        }
        None => {
            writeln!(out, "Open Ports:")?;
            for port in &summary.open_ports {
                writeln!(out, "{}", port)?;
            }
        }
    }

    Ok(())
}

/// Print the one-line statistics footer.
pub fn print_statistics(summary: &ScanSummary) {
    eprintln!(
        "{} {} ports scanned on {} in {:.2}s, {} open",
        style("•").dim(),
        summary.probed,
        summary.host,
        summary.duration.as_secs_f64(),
        style(summary.open_ports.len()).green().bold()
    );
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}
