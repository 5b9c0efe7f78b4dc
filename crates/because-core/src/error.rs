//! Error types for because core operations.
//!
//! This module defines well-structured error types using `thiserror` for
//! library-level errors, while the CLI uses `anyhow` for convenient
//! propagation up to its single exit point.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using BecauseError
pub type Result<T> = std::result::Result<T, BecauseError>;

/// Core error types for because operations.
///
/// Discovery and scanning degrade gracefully and rarely surface these;
/// the setup variants are blocking and stop a reconciliation pass.
#[derive(Error, Debug)]
pub enum BecauseError {
    // === Pattern Errors ===
    /// A glob pattern could not be compiled
    #[error("invalid glob pattern: {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    // === Configuration Errors ===
    /// Configuration file parsing failed
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    // === Discovery Errors ===
    /// The directory walk could not start at the given root
    #[error("cannot walk {root}: {reason}")]
    WalkFailed { root: PathBuf, reason: String },

    // === Setup Errors ===
    /// A different symbolic link already occupies the link location
    #[error("a different symbolic link already exists at {path}")]
    ConflictingLink { path: PathBuf },

    /// A regular file or directory already occupies the link location
    #[error("a file/directory already exists at {path}")]
    ConflictingNonLink { path: PathBuf },

    /// Creating the symbolic link failed
    #[error("unable to create the symbolic link at {path}: {reason}")]
    LinkCreationFailed { path: PathBuf, reason: String },

    // === I/O Errors ===
    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BecauseError {
    /// A short hint telling the user how to unblock setup.
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            BecauseError::ConflictingLink { .. } => Some(
                "Rename or delete the corresponding symbolic link in the link folder and try again",
            ),
            BecauseError::ConflictingNonLink { .. } => Some(
                "Rename or delete the corresponding file/directory in the documentation folder and try again",
            ),
            BecauseError::LinkCreationFailed { .. } => {
                Some("Ensure that you have the right permissions for that path")
            }
            _ => None,
        }
    }

    /// Create an invalid pattern error
    pub fn invalid_pattern(pattern: impl Into<String>, reason: impl ToString) -> Self {
        BecauseError::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.to_string(),
        }
    }
}
