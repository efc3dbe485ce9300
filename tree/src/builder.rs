//! Best-effort construction of balanced directory fixtures.

use std::path::{Path, PathBuf};

use futures::FutureExt;
use futures::future::{BoxFuture, join_all};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{Result, TreeError};

/// Outcome counts for one [`build`] call.
///
/// A build settles once every branch has been attempted; individual
/// branch failures show up here and in the log, not as an `Err`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Directories created by this call.
    pub created: usize,

    /// Directories that already existed and were left alone.
    pub skipped: usize,

    /// Directories whose creation failed; their subtrees were not
    /// descended into.
    pub failed: usize,
}

impl BuildReport {
    fn absorb(&mut self, other: BuildReport) {
        self.created += other.created;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }
}

/// Ensure a balanced directory tree exists under `root`: `width`
/// children per node, named by their index, `depth` levels deep.
/// `depth == 0` is the terminal case and creates nothing.
///
/// Siblings at one level are created concurrently; recursion within a
/// branch is depth-first. A child that cannot be created is logged and
/// its subtree skipped while the remaining branches proceed, so a
/// second call over the same root is a no-op apart from `skipped`
/// counts.
pub async fn build(root: &Path, width: usize, depth: usize) -> Result<BuildReport> {
    let meta = fs::metadata(root)
        .await
        .map_err(|_| TreeError::RootUnusable(root.display().to_string()))?;
    if !meta.is_dir() {
        return Err(TreeError::RootUnusable(root.display().to_string()));
    }

    let report = build_level(root.to_path_buf(), width, depth).await;
    debug!(
        created = report.created,
        skipped = report.skipped,
        failed = report.failed,
        "tree build settled"
    );
    Ok(report)
}

fn build_level(dir: PathBuf, width: usize, depth: usize) -> BoxFuture<'static, BuildReport> {
    async move {
        if depth == 0 {
            return BuildReport::default();
        }

        let branches = (0..width).map(|index| {
            let child = dir.join(index.to_string());
            async move {
                let mut report = BuildReport::default();
                let exists = fs::try_exists(&child).await.unwrap_or(false);
                if exists {
                    report.skipped += 1;
                } else {
                    match fs::create_dir(&child).await {
                        Ok(()) => {
                            debug!(path = %child.display(), "creating");
                            report.created += 1;
                        }
                        Err(err) => {
                            warn!(path = %child.display(), %err, "unable to create");
                            report.failed += 1;
                            return report;
                        }
                    }
                }
                report.absorb(build_level(child, width, depth - 1).await);
                report
            }
        });

        let mut total = BuildReport::default();
        for branch in join_all(branches).await {
            total.absorb(branch);
        }
        total
    }
    .boxed()
}
