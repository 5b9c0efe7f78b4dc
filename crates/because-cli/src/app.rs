//! Application state management.

use crate::context;
use because_core::{Config, DiscoverOptions, PatternSet};
use std::env;
use std::path::PathBuf;
use tracing::debug;

/// Settings and locations shared by all commands.
pub struct App {
    /// Configuration
    pub config: Config,

    /// Directory searched in search mode
    pub root: PathBuf,

    /// Project whose documentation folder gets linked in setup mode
    pub project: PathBuf,
}

impl App {
    pub fn new(config: Config, root: PathBuf, project: PathBuf) -> Self {
        debug!(
            root = %root.display(),
            project = %project.display(),
            "Application initialized"
        );

        App {
            config,
            root,
            project,
        }
    }

    /// Create an application rooted at the process's working directory.
    pub fn from_env(config: Config) -> anyhow::Result<Self> {
        let root = env::current_dir()?;
        let project = context::project_dir()?;
        Ok(App::new(config, root, project))
    }

    /// Patterns from the project's pattern file, or the defaults.
    pub fn patterns(&self) -> PatternSet {
        PatternSet::load(&self.config.pattern_file_path(&self.root))
    }

    pub fn discover_options(&self) -> DiscoverOptions {
        DiscoverOptions::from(&self.config.search)
    }
}
