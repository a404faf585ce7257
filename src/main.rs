//! treemirror - mirror completed files from a watched tree
//!
//! Entry point for the treemirror daemon.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use clap::Parser;
use tokio_util::sync::CancellationToken;
use treemirror::app::{shutdown_signal, App};
use treemirror::observability::init_tracing;
use treemirror::{Config, Result};

/// Watch a directory tree and mirror every completed file into a flat
/// output directory
#[derive(Parser, Debug)]
#[command(name = "treemirror")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory tree to watch
    #[arg(short = 'd', long, env = "TREEMIRROR_DIR")]
    directory: std::path::PathBuf,

    /// Directory to mirror completed files into
    #[arg(short, long, env = "TREEMIRROR_OUTPUT_DIR")]
    output_dir: std::path::PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TREEMIRROR_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, env = "TREEMIRROR_LOG_JSON")]
    log_json: bool,

    /// Keep truncated output files when a copy fails part-way
    #[arg(long, env = "TREEMIRROR_KEEP_PARTIAL")]
    keep_partial: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.log_json);

    tracing::info!("treemirror v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config {
        watch_dir: cli.directory,
        output_dir: cli.output_dir,
        log_level: cli.log_level,
        log_json: cli.log_json,
        keep_partial: cli.keep_partial,
    };

    tracing::debug!(?config, "Configuration loaded");

    config.validate()?;

    tracing::info!(
        "Mirroring {:?} into {:?}",
        config.watch_dir,
        config.output_dir
    );

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_token.cancel();
    });

    App::new(config).run(cancel).await?;
    Ok(())
}
