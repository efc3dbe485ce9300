//! Recursive discovery of every directory under a root.

use std::path::{Path, PathBuf};

use futures::FutureExt;
use futures::future::{BoxFuture, join_all};
use tokio::fs;
use tracing::debug;

use crate::path;

/// Recursively collect every directory under `root`, the root itself
/// first, parents before their children, siblings in listing order.
///
/// Infallible by contract: hidden entries are filtered out, entries
/// that vanish or refuse a stat mid-scan are dropped with a diagnostic,
/// and a root that cannot be listed at all degrades to `[root]`. The
/// caller always gets at least the root back.
pub async fn enumerate(root: &Path) -> Vec<PathBuf> {
    enumerate_level(path::normalize(root)).await
}

fn enumerate_level(root: PathBuf) -> BoxFuture<'static, Vec<PathBuf>> {
    async move {
        let mut dirs = vec![root.clone()];

        let mut reader = match fs::read_dir(&root).await {
            Ok(reader) => reader,
            Err(err) => {
                debug!(path = %root.display(), %err, "unreadable, keeping base only");
                return dirs;
            }
        };

        let mut entries = Vec::new();
        loop {
            match reader.next_entry().await {
                Ok(Some(entry)) => {
                    if path::is_hidden(&entry.file_name()) {
                        continue;
                    }
                    entries.push(root.join(entry.file_name()));
                }
                Ok(None) => break,
                Err(err) => {
                    debug!(path = %root.display(), %err, "listing cut short");
                    break;
                }
            }
        }

        // Settle every stat before filtering so one racing entry cannot
        // abort the whole level.
        let stats = join_all(entries.iter().map(fs::metadata)).await;
        let mut subdirs = Vec::new();
        for (entry, stat) in entries.iter().zip(stats) {
            match stat {
                Ok(meta) if meta.is_dir() => subdirs.push(entry.clone()),
                Ok(_) => {}
                Err(err) => debug!(path = %entry.display(), %err, "dropping"),
            }
        }

        for child in join_all(subdirs.into_iter().map(enumerate_level)).await {
            dirs.extend(child);
        }
        dirs
    }
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs as stdfs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_enumerate_returns_root_first() {
        let temp_dir = TempDir::new().unwrap();
        let root = path::normalize(temp_dir.path());
        stdfs::create_dir(root.join("0")).unwrap();
        stdfs::create_dir(root.join("1")).unwrap();

        let dirs = enumerate(&root).await;

        assert_eq!(dirs[0], root);
        let mut tail: Vec<_> = dirs[1..].to_vec();
        tail.sort();
        assert_eq!(tail, vec![root.join("0"), root.join("1")]);
    }

    #[tokio::test]
    async fn test_enumerate_unreadable_root_degrades_to_base() {
        let missing = PathBuf::from("/nonexistent/treewatch/enumeration");

        let dirs = enumerate(&missing).await;

        assert_eq!(dirs, vec![missing]);
    }

    #[tokio::test]
    async fn test_enumerate_excludes_hidden_entries() {
        let temp_dir = TempDir::new().unwrap();
        let root = path::normalize(temp_dir.path());
        stdfs::create_dir(root.join(".hidden")).unwrap();
        stdfs::create_dir(root.join("shown")).unwrap();

        let dirs = enumerate(&root).await;

        assert_eq!(dirs, vec![root.clone(), root.join("shown")]);
    }

    #[tokio::test]
    async fn test_enumerate_ignores_plain_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = path::normalize(temp_dir.path());
        stdfs::write(root.join("file.txt"), b"not a dir").unwrap();
        stdfs::create_dir(root.join("dir")).unwrap();

        let dirs = enumerate(&root).await;

        assert_eq!(dirs, vec![root.clone(), root.join("dir")]);
    }

    #[tokio::test]
    async fn test_enumerate_parents_precede_children() {
        let temp_dir = TempDir::new().unwrap();
        let root = path::normalize(temp_dir.path());
        stdfs::create_dir_all(root.join("0").join("0")).unwrap();
        stdfs::create_dir_all(root.join("0").join("1")).unwrap();
        stdfs::create_dir_all(root.join("1").join("0")).unwrap();

        let dirs = enumerate(&root).await;

        assert_eq!(dirs.len(), 6);
        for dir in &dirs[1..] {
            let parent = dir.parent().unwrap();
            let parent_at = dirs.iter().position(|d| d == parent).unwrap();
            let child_at = dirs.iter().position(|d| d == dir).unwrap();
            assert!(parent_at < child_at, "{} listed before its parent", dir.display());
        }
    }

    #[tokio::test]
    async fn test_enumerate_counts_a_balanced_tree() {
        let temp_dir = TempDir::new().unwrap();
        let root = path::normalize(temp_dir.path());
        crate::builder::build(&root, 2, 3).await.unwrap();

        let dirs = enumerate(&root).await;

        // Root plus 2 + 4 + 8 descendants.
        assert_eq!(dirs.len(), 15);
    }
}
