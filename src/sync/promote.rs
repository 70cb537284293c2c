//! Promotion of staged trees into the firmware root.
//!
//! Each tree is swapped with two renames: live into the backup directory,
//! staged into live. If any step fails, trees already swapped in this
//! promotion are put back.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::sync::events::{EventBus, SyncEvent};
use crate::sync::tree::RemoteTree;
use crate::util::fs::{ensure_dir, move_dir, remove_dir_all_if_exists};

/// Promotion failure.
#[derive(Debug, Error)]
pub enum PromotionError {
    #[error("failed to create backup folder {}: {message}", path.display())]
    BackupDir { path: PathBuf, message: String },

    #[error("failed to install new {tree} files: {message}")]
    Tree {
        tree: RemoteTree,
        message: String,
        rolled_back: bool,
    },
}

impl PromotionError {
    /// Whether the live trees are back in their pre-promotion state.
    pub fn rolled_back(&self) -> bool {
        match self {
            PromotionError::BackupDir { .. } => true,
            PromotionError::Tree { rolled_back, .. } => *rolled_back,
        }
    }
}

/// Paths of one tree during promotion.
struct TreePaths {
    tree: RemoteTree,
    live: PathBuf,
    staged: PathBuf,
    backup: PathBuf,
}

impl TreePaths {
    fn new(tree: RemoteTree, root: &Path, staging: &Path, backup: &Path) -> Self {
        let rel = tree.relative_dir();
        TreePaths {
            tree,
            live: root.join(rel),
            staged: staging.join(rel),
            backup: backup.join(rel),
        }
    }
}

/// Replace the live trees below `root` with the staged trees below
/// `staging`, moving the previous trees below `backup`.
pub fn promote(root: &Path, staging: &Path, backup: &Path, bus: &EventBus) -> Result<(), PromotionError> {
    ensure_dir(backup).map_err(|e| PromotionError::BackupDir {
        path: backup.to_path_buf(),
        message: format!("{:#}", e),
    })?;

    // (paths, whether a previous tree was backed up)
    let mut promoted: Vec<(TreePaths, bool)> = Vec::new();

    for tree in RemoteTree::ALL {
        let paths = TreePaths::new(tree, root, staging, backup);

        let had_live = paths.live.exists();
        if had_live {
            let backup_existed = paths.backup.exists();
            if let Err(e) = move_dir(&paths.live, &paths.backup) {
                let current_ok = settle_failed_backup(&paths, backup_existed);
                let rolled_back = rollback(&promoted) && current_ok;
                return Err(PromotionError::Tree {
                    tree,
                    message: format!("failed to move previous files to backup folder: {:#}", e),
                    rolled_back,
                });
            }
            bus.emit(SyncEvent::BackedUp {
                tree,
                path: paths.backup.clone(),
            });
        } else {
            bus.emit(SyncEvent::Warning {
                message: format!("no previous {} files at {}", tree, paths.live.display()),
            });
        }

        if let Err(e) = move_dir(&paths.staged, &paths.live) {
            let restored = restore(&paths, had_live);
            let rolled_back = rollback(&promoted) && restored;
            return Err(PromotionError::Tree {
                tree,
                message: format!("failed to copy new library files: {:#}", e),
                rolled_back,
            });
        }

        bus.emit(SyncEvent::Promoted { tree });
        promoted.push((paths, had_live));
    }

    Ok(())
}

/// Bring the live tree back after its move into the backup folder failed.
///
/// A failed move leaves the source intact and the destination absent,
/// unless the source could only be partly removed after a full copy. The
/// backup then holds the complete tree and is moved back.
fn settle_failed_backup(paths: &TreePaths, backup_existed: bool) -> bool {
    if !backup_existed && paths.backup.exists() {
        return restore(paths, true);
    }
    paths.live.exists()
}

/// Undo already promoted trees, newest first.
fn rollback(promoted: &[(TreePaths, bool)]) -> bool {
    promoted
        .iter()
        .rev()
        .fold(true, |ok, (paths, had_live)| restore(paths, *had_live) && ok)
}

/// Remove whatever is at the live location and move the backup back.
fn restore(paths: &TreePaths, had_live: bool) -> bool {
    if let Err(e) = remove_dir_all_if_exists(&paths.live) {
        tracing::error!("rollback of {} failed: {:#}", paths.tree, e);
        return false;
    }
    if !had_live {
        return true;
    }
    match move_dir(&paths.backup, &paths.live) {
        Ok(()) => {
            tracing::info!("restored previous {} files", paths.tree);
            true
        }
        Err(e) => {
            tracing::error!("rollback of {} failed: {:#}", paths.tree, e);
            false
        }
    }
}
