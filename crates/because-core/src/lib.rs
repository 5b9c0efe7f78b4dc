//! # Because Core Library
//!
//! This crate provides the two engines behind the `because` tool: finding
//! the files in a project that mention a documentation path, and linking a
//! project's documentation folder into its package-manager folder.
//!
//! ## Architecture
//!
//! - **Patterns** (`patterns`): Inclusion/exclusion globs from the pattern file or defaults
//! - **Matcher** (`matcher`): The `PathMatcher` capability and its glob implementation
//! - **Discover** (`discover`): Walks the tree into a sorted candidate file list
//! - **Scan** (`scan`): Parallel substring search over the candidates
//! - **Link** (`link`): Idempotent symbolic link reconciliation
//! - **Config** (`config`): Configuration management
//!
//! ## Example
//!
//! ```rust,ignore
//! use because_core::{discover, scan, DiscoverOptions, PatternSet};
//! use std::path::Path;
//!
//! let root = Path::new(".");
//! let patterns = PatternSet::load(&root.join(".becauserc"));
//! let files = discover::discover(&patterns, root, &DiscoverOptions::default())?;
//! let report = scan::scan(root, &files, "because/project/deployment.md")?;
//! for path in &report.paths {
//!     println!("{}", path);
//! }
//! ```

pub mod config;
pub mod discover;
pub mod error;
pub mod link;
pub mod matcher;
pub mod patterns;
pub mod scan;

// Re-export commonly used types
pub use config::Config;
pub use discover::{CandidateFileList, DiscoverOptions, Selection};
pub use error::{BecauseError, Result};
pub use link::{LinkOutcome, LinkSpec, Reconciliation};
pub use matcher::{GlobMatcher, PathMatcher};
pub use patterns::{Pattern, PatternSet};
pub use scan::{MatchReport, ScanMode};
