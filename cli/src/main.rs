//! Recursive watch probe.
//!
//! Builds a synthetic directory tree under the given root, establishes
//! change monitoring over it, and continuously correlates injected
//! mutations against the notifications that come back.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use treewatch_correlator::ChangeCorrelator;
use treewatch_tree::builder;
use treewatch_watcher::{WatchConfig, watch_path};

/// Children per directory in the probe tree.
const TREE_WIDTH: usize = 2;

/// Levels of the probe tree.
const TREE_DEPTH: usize = 5;

/// Probe recursive filesystem watching under a directory tree.
#[derive(Parser)]
#[command(name = "treewatch")]
struct Cli {
    /// Root directory to build the probe tree under and watch.
    path: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let root = tokio::fs::canonicalize(&cli.path)
        .await
        .with_context(|| format!("resolving {}", cli.path.display()))?;
    info!(path = %root.display(), "probing");

    let report = builder::build(&root, TREE_WIDTH, TREE_DEPTH).await?;
    info!(
        created = report.created,
        skipped = report.skipped,
        failed = report.failed,
        "probe tree ready"
    );

    let (guard, changes) = watch_path(&root, WatchConfig::default()).await?;
    info!(mode = ?guard.mode(), handles = guard.handle_count(), "watching");

    let correlator = Arc::new(ChangeCorrelator::new());
    let pump = Arc::clone(&correlator);
    tokio::spawn(async move { pump.pump(changes).await });

    correlator.run(&root, None).await;
    Ok(())
}
