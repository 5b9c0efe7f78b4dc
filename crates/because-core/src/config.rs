//! Configuration management for because.
//!
//! Tool settings are stored in TOML format in a platform-appropriate
//! location. The search patterns themselves live in a separate pattern file
//! inside the project (see [`crate::patterns`]).

use crate::error::{BecauseError, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Main configuration structure for because.
///
/// ## Example Configuration File (because.toml)
///
/// ```toml
/// [search]
/// pattern_file = ".becauserc"
/// respect_gitignore = true
/// follow_links = false
///
/// [setup]
/// source_folder = "because"
/// link_root = "node_modules"
/// package_name = "because"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// File discovery settings
    pub search: SearchConfig,

    /// Link setup settings
    pub setup: SetupConfig,
}

/// File discovery configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Name of the pattern file, relative to the search root
    pub pattern_file: String,

    /// Exclude files listed in `.gitignore` files found in the tree
    pub respect_gitignore: bool,

    /// Descend into symbolically linked directories
    pub follow_links: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            pattern_file: ".becauserc".to_string(),
            respect_gitignore: true,
            follow_links: false,
        }
    }
}

/// Link setup configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SetupConfig {
    /// Documentation folder inside the project whose entries get linked
    pub source_folder: String,

    /// Package-manager folder inside the project
    pub link_root: String,

    /// Package folder under `link_root` that receives the links
    pub package_name: String,
}

impl Default for SetupConfig {
    fn default() -> Self {
        SetupConfig {
            source_folder: "because".to_string(),
            link_root: "node_modules".to_string(),
            package_name: "because".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// The file there is optional: if it is missing, unreadable or
    /// malformed the defaults are used.
    pub fn load() -> Self {
        match Self::default_config_path() {
            Ok(config_path) => Self::load_or_default(&config_path),
            Err(e) => {
                warn!(error = %e, "No configuration directory, using defaults");
                Config::default()
            }
        }
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Config::default());
        }

        info!(path = %path.display(), "Loading configuration");
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents).map_err(|e| BecauseError::ConfigError {
            reason: format!("Failed to parse config: {}", e),
        })?;

        Ok(config)
    }

    /// Load an optional configuration file.
    ///
    /// Unlike [`Config::load_from`], an unreadable or malformed file is
    /// reported and replaced by the defaults.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load_from(path).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "Ignoring configuration file");
            Config::default()
        })
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "because").ok_or_else(|| BecauseError::ConfigError {
            reason: "Could not determine config directory".to_string(),
        })?;

        Ok(dirs.config_dir().join("because.toml"))
    }

    /// Location of the pattern file for a search rooted at `root`.
    pub fn pattern_file_path(&self, root: &Path) -> PathBuf {
        root.join(&self.search.pattern_file)
    }

    /// Documentation folder whose entries are linked during setup.
    pub fn source_dir(&self, project: &Path) -> PathBuf {
        project.join(&self.setup.source_folder)
    }

    /// Folder that receives the links, `<project>/<link_root>/<package_name>`.
    pub fn link_dir(&self, project: &Path) -> PathBuf {
        project
            .join(&self.setup.link_root)
            .join(&self.setup.package_name)
    }
}
