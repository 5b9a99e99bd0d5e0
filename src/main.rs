use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use pdfdog::config::{viewer_override, ConfigFile, WatchConfig};
use pdfdog::logging::{self, Verbosity};
use pdfdog::viewer::resolve_viewer;
use pdfdog::watch::{LoopExit, WatchLoop};
use pdfdog::WatchError;

#[derive(Parser, Debug)]
#[command(name = "pdfdog")]
#[command(about = "Show a pdf and track changes", long_about = None)]
#[command(version)]
struct Cli {
    /// File to watch and show
    filename: Option<PathBuf>,

    /// Quiet. Don't print informative messages (the default)
    #[arg(short, conflicts_with = "log")]
    quiet: bool,

    /// Log informative messages
    #[arg(short)]
    log: bool,

    /// Viewer program, overriding the platform default
    #[arg(long, value_name = "CMD")]
    viewer: Option<String>,

    /// Poll interval in milliseconds
    #[arg(long, value_name = "MS")]
    poll_interval: Option<u64>,

    /// Config file (default: ~/.config/pdfdog/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let verbosity = if cli.log && !cli.quiet {
        Verbosity::Log
    } else {
        Verbosity::Quiet
    };
    logging::init(verbosity);
    tracing::info!("Args: {cli:?}");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Some(filename) = cli.filename else {
        return Err(WatchError::Config {
            reason: "must specify a file name to watch".to_string(),
        }
        .into());
    };
    let watched = std::path::absolute(&filename)
        .with_context(|| format!("Failed to resolve {}", filename.display()))?;

    let file = ConfigFile::load(cli.config.as_deref())?;
    let mut config = WatchConfig::new(watched).with_file(&file)?;
    if let Some(ms) = cli.poll_interval {
        config.set_poll_interval_ms(ms)?;
    }

    let chosen = viewer_override(cli.viewer.as_deref(), &file);
    let viewer = match &chosen {
        Some(o) => resolve_viewer(Some(&o.command), &o.args, &config.extension())?,
        None => resolve_viewer(None, &[], &config.extension())?,
    };

    let running = Arc::new(AtomicBool::new(true));
    let flag = running.clone();
    ctrlc::set_handler(move || {
        flag.store(false, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    let mut watch = WatchLoop::new(&config, viewer);
    match watch.run(&running)? {
        LoopExit::Interrupted => Ok(()),
    }
}
