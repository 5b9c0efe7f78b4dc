//! Inclusion/exclusion glob patterns.
//!
//! A [`PatternSet`] comes either from the project's pattern file or from
//! the built-in defaults. Pattern file syntax is one glob per line; `#`
//! starts a comment, blank lines are dropped and a leading `!` turns the
//! pattern into an exclusion.

use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Marker that turns a pattern into an exclusion.
pub const NEGATION_MARKER: char = '!';

/// Patterns used when no pattern file is available.
pub const DEFAULT_PATTERNS: [&str; 3] = ["**", "!.git/**", "!node_modules/**"];

/// A single glob pattern, possibly negated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern(String);

impl Pattern {
    /// Create a pattern from its textual form (including any `!` prefix)
    pub fn new(raw: impl Into<String>) -> Self {
        Pattern(raw.into())
    }

    /// True if this pattern excludes paths
    pub fn is_negated(&self) -> bool {
        self.0.starts_with(NEGATION_MARKER)
    }

    /// The glob with any negation marker removed
    pub fn glob(&self) -> &str {
        self.0.strip_prefix(NEGATION_MARKER).unwrap_or(&self.0)
    }

    /// The pattern as written
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered, immutable set of patterns for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSet {
    patterns: Vec<Pattern>,
}

impl PatternSet {
    /// The built-in defaults: everything except `.git/` and `node_modules/`.
    pub fn defaults() -> Self {
        PatternSet {
            patterns: DEFAULT_PATTERNS.iter().map(|p| Pattern::new(*p)).collect(),
        }
    }

    /// Parse pattern file content.
    ///
    /// An empty result is legal and means "no files".
    pub fn parse(content: &str) -> Self {
        let patterns = content
            .lines()
            .filter_map(|line| {
                let line = line.split('#').next().unwrap_or_default().trim();
                (!line.is_empty()).then(|| Pattern::new(line))
            })
            .collect();

        PatternSet { patterns }
    }

    /// Pick the active pattern set from optional pattern file content.
    pub fn resolve(content: Option<&str>) -> Self {
        match content {
            Some(content) => Self::parse(content),
            None => Self::defaults(),
        }
    }

    /// Read the pattern file at `path`, falling back to the defaults when it
    /// is missing or unreadable.
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(content) => {
                debug!(path = %path.display(), "Using glob patterns from pattern file");
                Self::resolve(Some(&content))
            }
            Err(e) => {
                info!(
                    path = %path.display(),
                    reason = %e,
                    "Using default glob patterns for searching in files"
                );
                Self::resolve(None)
            }
        }
    }

    /// Patterns in declaration order
    pub fn iter(&self) -> impl Iterator<Item = &Pattern> {
        self.patterns.iter()
    }

    /// Globs that add files
    pub fn inclusions(&self) -> impl Iterator<Item = &str> {
        self.patterns
            .iter()
            .filter(|p| !p.is_negated())
            .map(Pattern::glob)
    }

    /// Globs that remove files
    pub fn exclusions(&self) -> impl Iterator<Item = &str> {
        self.patterns
            .iter()
            .filter(|p| p.is_negated())
            .map(Pattern::glob)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for PatternSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        PatternSet {
            patterns: iter.into_iter().map(Pattern::new).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn as_strs(set: &PatternSet) -> Vec<&str> {
        set.iter().map(Pattern::as_str).collect()
    }

    #[test]
    fn test_parse_drops_comments_and_blanks() {
        let set = PatternSet::parse("**\n#comment\n!node_modules/**\n   \n");
        assert_eq!(as_strs(&set), vec!["**", "!node_modules/**"]);
    }

    #[test]
    fn test_parse_trailing_comment_and_crlf() {
        let set = PatternSet::parse("  src/**  # sources\r\n!src/gen/** #generated\r\n");
        assert_eq!(as_strs(&set), vec!["src/**", "!src/gen/**"]);
    }

    #[test]
    fn test_parse_empty_content() {
        let set = PatternSet::parse("# nothing here\n\n");
        assert!(set.is_empty());
    }

    #[test]
    fn test_resolve() {
        assert_eq!(PatternSet::resolve(None), PatternSet::defaults());
        assert!(PatternSet::resolve(Some("")).is_empty());
    }

    #[test]
    fn test_inclusions_and_exclusions() {
        let set = PatternSet::defaults();
        assert_eq!(set.inclusions().collect::<Vec<_>>(), vec!["**"]);
        assert_eq!(
            set.exclusions().collect::<Vec<_>>(),
            vec![".git/**", "node_modules/**"]
        );
    }

    #[test]
    fn test_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".becauserc");

        assert_eq!(PatternSet::load(&path), PatternSet::defaults());

        fs::write(&path, "docs/**\n").unwrap();
        assert_eq!(as_strs(&PatternSet::load(&path)), vec!["docs/**"]);
    }

    #[test]
    fn test_load_unreadable_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".becauserc");
        fs::create_dir(&path).unwrap();

        let set = PatternSet::load(&path);
        assert_eq!(set, PatternSet::defaults());
        assert_eq!(set.len(), 3);
    }
}
