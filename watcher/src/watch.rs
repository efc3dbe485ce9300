//! Watch establishment strategies.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use treewatch_tree::{enumerate, path};

use crate::config::WatchConfig;
use crate::error::{Result, WatcherError};
use crate::event::{ChangeKind, DirChange};

/// Which strategy produced a [`WatchGuard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchMode {
    /// One recursive subscription covering the whole tree.
    Native,

    /// One non-recursive handle per enumerated directory.
    Fallback,
}

/// An established watch: the mode it runs in and the notify handles
/// that must stay alive for events to keep flowing. Dropping the guard
/// tears everything down.
pub struct WatchGuard {
    mode: WatchMode,
    handles: Vec<RecommendedWatcher>,
}

impl WatchGuard {
    /// Strategy that established this watch.
    pub fn mode(&self) -> WatchMode {
        self.mode
    }

    /// Number of live notify handles: one in native mode, one per
    /// successfully watched directory in fallback mode.
    pub fn handle_count(&self) -> usize {
        self.handles.len()
    }
}

/// A way of establishing change monitoring under a root. Both
/// implementations forward normalized [`DirChange`] values into the
/// provided channel and return once establishment has been attempted
/// for everything in their scope, not once events start arriving.
#[async_trait]
pub trait WatchStrategy: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Establish watches under `root`.
    async fn establish(&self, root: &Path, tx: mpsc::Sender<DirChange>) -> Result<WatchGuard>;
}

/// Whether this platform's recommended watcher serves an entire subtree
/// with a single subscription. Where it does not, recursion is stitched
/// together per directory by the fallback strategy instead.
pub fn native_recursive_supported() -> bool {
    cfg!(any(target_os = "macos", target_os = "windows"))
}

/// Strategy: a single recursive subscription on the root.
pub struct NativeRecursiveWatcher;

#[async_trait]
impl WatchStrategy for NativeRecursiveWatcher {
    fn name(&self) -> &'static str {
        "native"
    }

    async fn establish(&self, root: &Path, tx: mpsc::Sender<DirChange>) -> Result<WatchGuard> {
        let root = path::normalize(root);
        let event_root = root.clone();

        let mut watcher = notify::recommended_watcher(
            move |res: std::result::Result<Event, notify::Error>| match res {
                Ok(event) => {
                    let kind = ChangeKind::from(event.kind);
                    for changed in event.paths {
                        let dir = DirChange::containing_dir(&changed, &event_root);
                        debug!(path = %changed.display(), dir = %dir.display(), "native event");
                        if tx.blocking_send(DirChange::new(dir, kind)).is_err() {
                            debug!("change receiver dropped");
                        }
                    }
                }
                Err(err) => warn!(%err, "native watch error"),
            },
        )?;
        watcher.watch(&root, RecursiveMode::Recursive)?;
        info!(path = %root.display(), "recursively watching");

        Ok(WatchGuard {
            mode: WatchMode::Native,
            handles: vec![watcher],
        })
    }
}

/// Strategy: enumerate every directory under the root and watch each
/// one with its own handle.
pub struct FallbackFanOutWatcher;

#[async_trait]
impl WatchStrategy for FallbackFanOutWatcher {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn establish(&self, root: &Path, tx: mpsc::Sender<DirChange>) -> Result<WatchGuard> {
        let root = path::normalize(root);
        let dirs = enumerate(&root).await;

        let mut handles = Vec::with_capacity(dirs.len());
        for dir in dirs {
            match watch_one(&dir, tx.clone()) {
                Ok(handle) => {
                    debug!(path = %dir.display(), "directly watching");
                    handles.push(handle);
                }
                // Directories that refuse a handle simply produce no
                // events; their siblings keep theirs.
                Err(err) => warn!(path = %dir.display(), %err, "skipping unwatchable directory"),
            }
        }
        info!(path = %root.display(), handles = handles.len(), "fallback watches established");

        Ok(WatchGuard {
            mode: WatchMode::Fallback,
            handles,
        })
    }
}

fn watch_one(dir: &Path, tx: mpsc::Sender<DirChange>) -> Result<RecommendedWatcher> {
    let identity = dir.to_path_buf();
    let mut watcher = notify::recommended_watcher(
        move |res: std::result::Result<Event, notify::Error>| match res {
            Ok(event) => {
                let change = DirChange::new(identity.clone(), ChangeKind::from(event.kind));
                if tx.blocking_send(change).is_err() {
                    debug!("change receiver dropped");
                }
            }
            Err(err) => warn!(path = %identity.display(), %err, "watch handle error"),
        },
    )?;
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

/// Establish change monitoring under `root` and return the guard plus
/// the stream of normalized changes.
///
/// The strategy is chosen once per call: native where the platform
/// supports it and the config does not force the fallback, the
/// per-directory fan-out otherwise.
pub async fn watch_path(
    root: &Path,
    config: WatchConfig,
) -> Result<(WatchGuard, mpsc::Receiver<DirChange>)> {
    let root: PathBuf = path::normalize(root);
    if !root.is_dir() {
        return Err(WatcherError::DirectoryNotFound(root.display().to_string()));
    }
    let (tx, rx) = mpsc::channel(config.channel_capacity);

    let strategy: Box<dyn WatchStrategy> = if native_recursive_supported() && !config.force_fallback
    {
        Box::new(NativeRecursiveWatcher)
    } else {
        Box::new(FallbackFanOutWatcher)
    };
    debug!(strategy = strategy.name(), path = %root.display(), "establishing watch");

    let guard = strategy.establish(&root, tx).await?;
    Ok((guard, rx))
}
