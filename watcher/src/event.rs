//! Normalized change events.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use treewatch_tree::path;

/// A change under the watched tree, keyed by the directory it happened
/// in.
///
/// Native subscriptions report the changed file's path; the fallback
/// handles report per directory. Both are reduced to the containing
/// directory here, which means file-level granularity is not available
/// to consumers in native mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirChange {
    /// Canonical directory the change happened in.
    pub dir: PathBuf,

    /// The kind of change.
    pub kind: ChangeKind,

    /// When the event was observed.
    pub at: DateTime<Utc>,
}

impl DirChange {
    /// Create a new change event for a directory identity.
    pub fn new(dir: impl Into<PathBuf>, kind: ChangeKind) -> Self {
        Self {
            dir: path::normalize(&dir.into()),
            kind,
            at: Utc::now(),
        }
    }

    /// Directory identity for a path reported by a native subscription:
    /// the path itself when it is the watch root, otherwise its parent.
    pub fn containing_dir(changed: &Path, root: &Path) -> PathBuf {
        let changed = path::normalize(changed);
        let root = path::normalize(root);
        if changed == root {
            return root;
        }
        match changed.parent() {
            Some(parent) => parent.to_path_buf(),
            None => root,
        }
    }
}

/// Kind of change, collapsed to what directory-level correlation can
/// use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Something was created.
    Created,

    /// Contents or metadata were modified.
    Modified,

    /// Something was removed.
    Removed,

    /// Something was renamed.
    Renamed,

    /// Anything else the platform reports.
    Other,
}

impl From<notify::EventKind> for ChangeKind {
    fn from(kind: notify::EventKind) -> Self {
        match kind {
            notify::EventKind::Create(_) => Self::Created,
            notify::EventKind::Modify(modify_kind) => match modify_kind {
                notify::event::ModifyKind::Name(_) => Self::Renamed,
                _ => Self::Modified,
            },
            notify::EventKind::Remove(_) => Self::Removed,
            _ => Self::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_new_normalizes_the_directory() {
        let change = DirChange::new("/tmp/x/", ChangeKind::Modified);
        assert_eq!(change.dir, PathBuf::from("/tmp/x"));
    }

    #[test]
    fn test_containing_dir_for_a_file_path() {
        let dir = DirChange::containing_dir(Path::new("/tmp/x/0/1/marker"), Path::new("/tmp/x"));
        assert_eq!(dir, PathBuf::from("/tmp/x/0/1"));
    }

    #[test]
    fn test_containing_dir_for_the_root_itself() {
        let dir = DirChange::containing_dir(Path::new("/tmp/x/"), Path::new("/tmp/x"));
        assert_eq!(dir, PathBuf::from("/tmp/x"));
    }

    #[test]
    fn test_containing_dir_for_a_directory_path() {
        // A directory-level event maps to the directory's parent, the
        // same cut the last-separator rule makes.
        let dir = DirChange::containing_dir(Path::new("/tmp/x/0/1"), Path::new("/tmp/x"));
        assert_eq!(dir, PathBuf::from("/tmp/x/0"));
    }

    #[test]
    fn test_change_kind_mapping() {
        use notify::EventKind;
        use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};

        assert_eq!(ChangeKind::from(EventKind::Create(CreateKind::File)), ChangeKind::Created);
        assert_eq!(
            ChangeKind::from(EventKind::Modify(ModifyKind::Name(RenameMode::To))),
            ChangeKind::Renamed
        );
        assert_eq!(ChangeKind::from(EventKind::Remove(RemoveKind::Folder)), ChangeKind::Removed);
    }
}
