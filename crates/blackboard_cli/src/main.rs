//! # blackboard-shell
//!
//! Drives an in-memory [`Blackboard`] from a script file or stdin, one
//! command per line, and prints one reply line per command.
//!
//! ## Startup Sequence
//!
//! 1. Initialise logging (`RUST_LOG`, default `info` for the registry and the shell).
//! 2. Load the optional JSON config and apply flag overrides.
//! 3. Run the script and report totals.

mod command;
mod shell;

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use blackboard::{Blackboard, BlackboardConfig, KeyStrategy};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use shell::Shell;

#[derive(Parser)]
#[command(name = "blackboard-shell", about = "Tuple-space registry command shell")]
struct Args {
    /// Script to run; reads stdin when omitted
    script: Option<PathBuf>,

    /// JSON file holding a registry config
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Derive keys as `<prefix><n>` instead of from entity ids
    #[arg(short, long)]
    sequential_prefix: Option<String>,

    /// Stop at the first failing line
    #[arg(long)]
    fail_fast: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blackboard=info,blackboard_shell=info".into()),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => BlackboardConfig::default(),
    };
    if let Some(prefix) = args.sequential_prefix {
        config.key_strategy = KeyStrategy::Sequential { prefix };
    }
    info!(strategy = ?config.key_strategy, "registry configured");

    let mut shell = Shell::new(Blackboard::with_config(config)).with_fail_fast(args.fail_fast);
    let stdout = io::stdout().lock();

    let stats = match &args.script {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open script {}", path.display()))?;
            shell.run(BufReader::new(file), stdout)?
        }
        None => shell.run(io::stdin().lock(), stdout)?,
    };

    info!(
        executed = stats.executed,
        failed = stats.failed,
        entries = shell.board().len(),
        "script finished"
    );
    Ok(())
}

fn load_config(path: &Path) -> Result<BlackboardConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("invalid config {}", path.display()))?;
    info!(file = %path.display(), "config loaded");
    Ok(config)
}
