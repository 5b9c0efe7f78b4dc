//! # Because CLI
//!
//! Command-line interface for the because documentation tool.
//!
//! ## Modes
//!
//! - `because <path>` - List the files that mention `<path>`
//! - `because --only-list-files-being-searched` - List the files a search would read
//! - `because --setup` - Link `<project>/because/*` into `<project>/node_modules/because/`
//!
//! ## Example Usage
//!
//! ```bash
//! # Which files point at the deployment notes?
//! because because/project/deployment.md
//!
//! # Audit what a search covers
//! because --only-list-files-being-searched
//! ```

mod app;
mod commands;
mod context;

use app::App;
use because_core::{Config, ScanMode};
use clap::{CommandFactory, Parser};
use context::InstallContext;
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const EXAMPLES: &str = "\
Examples:
    because because/project/deployment.md
    because because/project/scripts.md
    because --help";

/// Because - find the files that reference a documentation path
#[derive(Parser)]
#[command(name = "because")]
#[command(author, version, about, long_about = None, after_help = EXAMPLES)]
pub struct Cli {
    /// Documentation path to look for, e.g. because/path/to/file.ext
    target: Option<String>,

    /// Only list the files being searched and exit
    #[arg(long)]
    only_list_files_being_searched: bool,

    /// Link files/folders from <project>/because/* to <project>/node_modules/because/* (skip existing links)
    #[arg(long)]
    setup: bool,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,
}

/// What a given invocation asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Help,
    Setup,
    Scan(ScanMode),
}

impl Cli {
    fn mode(&self) -> Mode {
        if self.setup {
            Mode::Setup
        } else if self.only_list_files_being_searched {
            Mode::Scan(ScanMode::ListOnly)
        } else if let Some(target) = &self.target {
            Mode::Scan(ScanMode::Search(target.clone()))
        } else {
            Mode::Help
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Dispatch the invocation. The only place that decides success or failure.
fn run(cli: Cli) -> anyhow::Result<()> {
    let mode = cli.mode();
    let mut out = io::stdout().lock();

    if mode == Mode::Help {
        Cli::command().write_help(&mut out)?;
        return Ok(());
    }

    // An explicit --config must be usable; the default location is optional.
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load(),
    };
    let app = App::from_env(config)?;

    match mode {
        Mode::Help => Ok(()),
        Mode::Setup => commands::setup::run(&app, InstallContext::detect(), &mut out),
        Mode::Scan(scan_mode) => commands::search::run(&app, &scan_mode, &mut out),
    }
}
