//! Marginalia CLI - pandoc annotation filter.
//!
//! Pandoc runs the binary as a JSON filter: the output format arrives as the
//! first argument, the document on stdin, and the filtered document is
//! written to stdout.
//!
//! ```text
//! pandoc --filter marginalia -o book.pdf book.md
//! ```

mod error;
mod output;
mod pipeline;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use output::Output;

/// Marginalia - annotation filter for pandoc.
#[derive(Parser)]
#[command(name = "marginalia", version, about)]
pub(crate) struct Cli {
    /// Pandoc output format (passed by pandoc).
    format: Option<String>,

    /// Path to configuration file (default: auto-discover marginalia.toml).
    #[arg(short, long, env = "MARGINALIA_CONFIG")]
    config: Option<PathBuf>,

    /// Figure cache directory (overrides config).
    #[arg(long)]
    figures_dir: Option<PathBuf>,

    /// Font package for TikZ figures without a document font (overrides config).
    #[arg(long)]
    font: Option<String>,

    /// Render annotations regardless of the document's draft flag.
    #[arg(long, conflicts_with = "no_draft")]
    draft: bool,

    /// Strip annotations regardless of the document's draft flag.
    #[arg(long)]
    no_draft: bool,

    /// Enable verbose output (figure cache and draft mode logs).
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN.
    // Logs go to stderr: stdout carries the document.
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = cli.execute(&output) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
