//! # Watcher
//!
//! Recursive directory watching for treewatch.
//!
//! A single entry point, [`watch::watch_path`], establishes change
//! monitoring for a whole directory tree and hands back a stream of
//! normalized [`event::DirChange`] values. Two strategies implement it:
//!
//! - **Native**: one recursive subscription on platforms whose watcher
//!   serves an entire subtree by itself
//! - **Fallback**: one non-recursive handle per directory discovered by
//!   `treewatch-tree`, fanned out and joined
//!
//! Whichever strategy runs, consumers always receive a canonical
//! directory identity, never a file path, so correlation keyed by
//! directory behaves the same in both modes.

pub mod config;
pub mod error;
pub mod event;
pub mod watch;

pub use config::WatchConfig;
pub use error::{Result, WatcherError};
pub use event::{ChangeKind, DirChange};
pub use watch::{
    FallbackFanOutWatcher, NativeRecursiveWatcher, WatchGuard, WatchMode, WatchStrategy,
    native_recursive_supported, watch_path,
};
