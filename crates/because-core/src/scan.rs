//! Substring scanning over discovered files.
//!
//! Every candidate file is read in parallel on the Rayon pool and tested
//! for a literal byte substring. Results are folded into a [`MatchReport`]
//! in a single step once all reads have finished, so the report always
//! follows discovery order no matter which read completes first.
//!
//! Unreadable files are skipped: one bad file never spoils the report.

use crate::discover::CandidateFileList;
use crate::error::{BecauseError, Result};
use aho_corasick::AhoCorasick;
use rayon::prelude::*;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// What a scan should do with the candidate files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanMode {
    /// Report files whose content contains the target string
    Search(String),

    /// Skip reading and report every candidate file
    ListOnly,
}

/// Files reported by a scan, in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchReport {
    /// Reported paths, relative to the scan root
    pub paths: Vec<String>,
}

impl MatchReport {
    /// Report listing every candidate file.
    pub fn listing(files: &CandidateFileList) -> Self {
        MatchReport {
            paths: files.as_slice().to_vec(),
        }
    }

    /// Number of reported files
    pub fn count(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// Run a scan in the given mode.
pub fn run(root: &Path, files: &CandidateFileList, mode: &ScanMode) -> Result<MatchReport> {
    match mode {
        ScanMode::Search(target) => scan(root, files, target),
        ScanMode::ListOnly => Ok(MatchReport::listing(files)),
    }
}

/// Report the files under `root` whose content contains `target`.
///
/// Containment is a plain byte comparison: no token boundaries, no case
/// folding, and files need not be valid UTF-8.
pub fn scan(root: &Path, files: &CandidateFileList, target: &str) -> Result<MatchReport> {
    let searcher = AhoCorasick::new([target])
        .map_err(|e| BecauseError::invalid_pattern(target, e))?;

    let hits: Vec<bool> = files
        .as_slice()
        .par_iter()
        .map(|rel| contains(&searcher, &root.join(rel)))
        .collect();

    let paths: Vec<String> = files
        .iter()
        .zip(hits)
        .filter_map(|(path, hit)| hit.then(|| path.clone()))
        .collect();

    info!(
        needle = %target,
        searched = files.len(),
        matches = paths.len(),
        "Scan complete"
    );

    Ok(MatchReport { paths })
}

fn contains(searcher: &AhoCorasick, path: &Path) -> bool {
    match fs::read(path) {
        Ok(bytes) => searcher.is_match(&bytes),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Skipping unreadable file");
            false
        }
    }
}
