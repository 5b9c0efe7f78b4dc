//! File discovery.
//!
//! Walks the tree under a root directory and selects the regular files
//! that match at least one inclusion pattern and no exclusion pattern.
//! Files ignored by `.gitignore` rules in the tree are dropped as well.
//!
//! The result is sorted case-insensitively on the full relative path. That
//! order is what the CLI prints and searches in, so it is part of the
//! public contract.

use crate::config::SearchConfig;
use crate::error::{BecauseError, Result};
use crate::matcher::{GlobMatcher, PathMatcher};
use crate::patterns::PatternSet;
use ignore::{DirEntry, WalkBuilder};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, trace};

/// Walk behaviour that is independent of the pattern set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoverOptions {
    /// Drop files ignored by `.gitignore` files in the tree
    pub respect_gitignore: bool,

    /// Descend into symbolically linked directories
    pub follow_links: bool,
}

impl Default for DiscoverOptions {
    fn default() -> Self {
        DiscoverOptions {
            respect_gitignore: true,
            follow_links: false,
        }
    }
}

impl From<&SearchConfig> for DiscoverOptions {
    fn from(config: &SearchConfig) -> Self {
        DiscoverOptions {
            respect_gitignore: config.respect_gitignore,
            follow_links: config.follow_links,
        }
    }
}

/// Inclusion and exclusion matchers applied to relative paths.
#[derive(Clone)]
pub struct Selection {
    include: Arc<dyn PathMatcher>,
    exclude: Arc<dyn PathMatcher>,
}

impl std::fmt::Debug for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selection")
            .field("includes_nothing", &self.include.matches_nothing())
            .finish()
    }
}

impl Selection {
    pub fn new(include: impl PathMatcher + 'static, exclude: impl PathMatcher + 'static) -> Self {
        Selection {
            include: Arc::new(include),
            exclude: Arc::new(exclude),
        }
    }

    /// Compile a pattern set for a walk rooted at `root`.
    ///
    /// A leading `./` is dropped, and a glob naming an existing directory
    /// under `root` stands for everything inside it (`docs` => `docs/**`).
    /// Invalid globs are skipped with a warning.
    pub fn from_patterns(patterns: &PatternSet, root: &Path) -> Self {
        let include: Vec<String> = patterns.inclusions().map(|g| expand_glob(g, root)).collect();
        let exclude: Vec<String> = patterns.exclusions().map(|g| expand_glob(g, root)).collect();
        Selection::new(
            GlobMatcher::lenient(include.iter().map(String::as_str)),
            GlobMatcher::lenient(exclude.iter().map(String::as_str)),
        )
    }

    /// True if a file at `path` belongs in the candidate list.
    pub fn selects(&self, path: &str) -> bool {
        self.include.matches(path) && !self.exclude.matches(path)
    }

    fn selects_nothing(&self) -> bool {
        self.include.matches_nothing()
    }
}

/// Distinct relative file paths in case-insensitive order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateFileList {
    paths: Vec<String>,
}

impl CandidateFileList {
    /// Build a list from arbitrary paths, deduplicating and sorting them.
    pub fn from_paths(paths: impl IntoIterator<Item = String>) -> Self {
        let unique: BTreeSet<String> = paths.into_iter().collect();
        let mut paths: Vec<String> = unique.into_iter().collect();
        paths.sort_by_cached_key(|p| p.to_lowercase());
        CandidateFileList { paths }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.paths.iter()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.paths
    }

    pub fn into_vec(self) -> Vec<String> {
        self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl<'a> IntoIterator for &'a CandidateFileList {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

/// Discover the files under `root` selected by `patterns`.
///
/// An empty pattern set (or one with only exclusions) selects nothing.
pub fn discover(
    patterns: &PatternSet,
    root: &Path,
    options: &DiscoverOptions,
) -> Result<CandidateFileList> {
    discover_with(&Selection::from_patterns(patterns, root), root, options)
}

/// Discover the files under `root` chosen by an explicit selection.
pub fn discover_with(
    selection: &Selection,
    root: &Path,
    options: &DiscoverOptions,
) -> Result<CandidateFileList> {
    if !root.is_dir() {
        return Err(BecauseError::WalkFailed {
            root: root.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }

    if selection.selects_nothing() {
        debug!(root = %root.display(), "No inclusion patterns, nothing to discover");
        return Ok(CandidateFileList::default());
    }

    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(false)
        .parents(false)
        .ignore(false)
        .git_global(false)
        .git_exclude(false)
        .git_ignore(options.respect_gitignore)
        .require_git(false)
        .follow_links(options.follow_links);

    let prune_root: PathBuf = root.to_path_buf();
    let exclude = Arc::clone(&selection.exclude);
    builder.filter_entry(move |entry| {
        if entry.depth() == 0 || !entry.file_type().is_some_and(|t| t.is_dir()) {
            return true;
        }
        match relative_path(&prune_root, entry.path()) {
            Some(dir) if exclude.covers_directory(&dir) => {
                trace!(dir = %dir, "Pruning excluded directory");
                false
            }
            _ => true,
        }
    });

    let mut selected = Vec::new();
    for result in builder.build() {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };

        if entry.depth() == 0 || !is_file(&entry) {
            continue;
        }

        let Some(rel) = relative_path(root, entry.path()) else {
            debug!(path = %entry.path().display(), "Skipping non UTF-8 path");
            continue;
        };

        if selection.selects(&rel) {
            selected.push(rel);
        }
    }

    let list = CandidateFileList::from_paths(selected);
    info!(root = %root.display(), files = list.len(), "Discovery complete");
    Ok(list)
}

/// Normalise one glob relative to `root`.
fn expand_glob(glob: &str, root: &Path) -> String {
    let glob = glob.trim_start_matches("./");
    let trimmed = glob.trim_end_matches('/');
    if !trimmed.is_empty() && root.join(trimmed).is_dir() {
        trace!(glob = %trimmed, "Expanding directory pattern");
        format!("{}/**", trimmed)
    } else {
        glob.to_string()
    }
}

/// Regular files and symbolic links that resolve to regular files.
fn is_file(entry: &DirEntry) -> bool {
    match entry.file_type() {
        Some(t) if t.is_file() => true,
        Some(t) if t.is_symlink() => fs::metadata(entry.path())
            .map(|m| m.is_file())
            .unwrap_or(false),
        _ => false,
    }
}

/// `path` relative to `root`, with `/` separators.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts = rel
        .components()
        .map(|c| c.as_os_str().to_str())
        .collect::<Option<Vec<_>>>()?;
    Some(parts.join("/"))
}
