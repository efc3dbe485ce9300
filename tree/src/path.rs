//! Path helpers shared by the tree and watcher crates.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Normalize a directory path to its comparable form: trailing
/// separators and `.` components removed. Correlation matches paths by
/// exact equality, so every path that crosses a crate boundary goes
/// through here first.
pub fn normalize(path: &Path) -> PathBuf {
    path.components().collect()
}

/// Hidden entries (leading dot) are excluded from enumeration.
pub fn is_hidden(name: &OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}
