//! Search command - find files that mention a documentation path.

use crate::app::App;
use because_core::{discover, scan, MatchReport, ScanMode};
use std::io::Write;
use tracing::{debug, info, trace};

/// Run a search, or just list the candidate files in list-only mode.
pub fn run(app: &App, mode: &ScanMode, out: &mut dyn Write) -> anyhow::Result<()> {
    let patterns = app.patterns();
    debug!(patterns = patterns.len(), "Resolved search patterns");
    for pattern in patterns.iter() {
        trace!(%pattern, "Pattern");
    }
    let files = discover::discover(&patterns, &app.root, &app.discover_options())?;

    match mode {
        ScanMode::ListOnly => info!(
            "The command would look for documentation in the following {} files",
            files.len()
        ),
        ScanMode::Search(target) => {
            info!("Looking for {} in {} files", target, files.len())
        }
    }

    let report = scan::run(&app.root, &files, mode)?;
    debug!(reported = report.count(), "Scan finished");
    match mode {
        ScanMode::ListOnly => write_listing(&report, out),
        ScanMode::Search(_) => write_matches(&report, out),
    }
}

fn write_listing(report: &MatchReport, out: &mut dyn Write) -> anyhow::Result<()> {
    for path in &report.paths {
        writeln!(out, "{}", path)?;
    }
    Ok(())
}

fn write_matches(report: &MatchReport, out: &mut dyn Write) -> anyhow::Result<()> {
    if report.is_empty() {
        info!("No matches found");
        return Ok(());
    }

    writeln!(out, "Found following matches:")?;
    for path in &report.paths {
        writeln!(out, "    {}", path)?;
    }
    Ok(())
}
