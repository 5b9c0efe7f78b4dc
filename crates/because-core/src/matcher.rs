//! Path matching capability.
//!
//! Discovery only ever asks "does this relative path match?", so the glob
//! engine sits behind the [`PathMatcher`] trait and can be swapped out in
//! tests or for a different engine.

use crate::error::{BecauseError, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::warn;

/// Something that can decide whether a relative, `/`-separated path matches.
pub trait PathMatcher: Send + Sync {
    fn matches(&self, path: &str) -> bool;

    /// True if every path below the directory `dir` matches.
    ///
    /// Used to skip whole subtrees during a walk; answering `false` is
    /// always correct.
    fn covers_directory(&self, _dir: &str) -> bool {
        false
    }

    /// Returns true if this matcher can never match anything
    fn matches_nothing(&self) -> bool {
        false
    }
}

/// Case-insensitive glob matcher backed by `globset`.
///
/// `*` and `?` never cross a `/`; `**` matches any number of path
/// components.
#[derive(Debug, Clone)]
pub struct GlobMatcher {
    set: GlobSet,
    /// Directories `d` for every `d/**` glob in the set
    dirs: GlobSet,
    len: usize,
}

impl GlobMatcher {
    /// Compile all globs, failing on the first invalid one.
    pub fn new<'a>(globs: impl IntoIterator<Item = &'a str>) -> Result<Self> {
        let globs: Vec<&str> = globs.into_iter().collect();
        Self::build(&globs)
    }

    /// Compile the valid globs and skip the rest with a warning.
    pub fn lenient<'a>(globs: impl IntoIterator<Item = &'a str>) -> Self {
        let valid: Vec<&str> = globs
            .into_iter()
            .filter(|glob| match compile(glob) {
                Ok(_) => true,
                Err(e) => {
                    warn!(error = %e, "Skipping pattern");
                    false
                }
            })
            .collect();

        Self::new(valid).unwrap_or_else(|e| {
            warn!(error = %e, "Pattern set could not be built, matching nothing");
            Self::empty()
        })
    }

    pub fn empty() -> Self {
        GlobMatcher {
            set: GlobSet::empty(),
            dirs: GlobSet::empty(),
            len: 0,
        }
    }

    fn build(globs: &[&str]) -> Result<Self> {
        let mut set = GlobSetBuilder::new();
        let mut dirs = GlobSetBuilder::new();
        for glob in globs {
            set.add(compile(glob)?);
            // Every file below a directory matching `d` matches `d/**`.
            let dir = glob.strip_suffix("/**").filter(|d| !d.is_empty());
            if let Some(Ok(dir)) = dir.map(compile) {
                dirs.add(dir);
            }
        }

        let to_err = |e: globset::Error| BecauseError::invalid_pattern(globs.join(" "), e);
        Ok(GlobMatcher {
            set: set.build().map_err(to_err)?,
            dirs: dirs.build().map_err(to_err)?,
            len: globs.len(),
        })
    }
}

impl PathMatcher for GlobMatcher {
    fn matches(&self, path: &str) -> bool {
        self.set.is_match(path)
    }

    fn covers_directory(&self, dir: &str) -> bool {
        self.dirs.is_match(dir)
    }

    fn matches_nothing(&self) -> bool {
        self.len == 0
    }
}

fn compile(glob: &str) -> Result<globset::Glob> {
    GlobBuilder::new(glob)
        .case_insensitive(true)
        .literal_separator(true)
        .build()
        .map_err(|e| BecauseError::invalid_pattern(glob, e))
}
