//! Sync session events.
//!
//! A session reports progress exclusively through an ordered stream of
//! events. The last event of every session is either `done` or `failed`.
//! Each event renders as one human-readable log line (`Display`) and as a
//! single JSON object (`to_json`), tagged by `"event"`.

use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;

use crossbeam_channel::{Receiver, Sender};
use serde::Serialize;

use crate::sync::tree::RemoteTree;

/// Why a session failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// The revision manifest could not be fetched or parsed
    Unreachable,
    /// The requested revision is above the latest one
    RevisionOutOfRange,
    /// The staging directory could not be created
    Io,
    /// Not every listed file was saved
    DownloadIncomplete,
    /// Backup or swap of the live trees failed
    PromotionIncomplete,
    /// The caller cancelled the session before promotion
    Cancelled,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Unreachable => "unreachable",
            FailureKind::RevisionOutOfRange => "revision-out-of-range",
            FailureKind::Io => "io",
            FailureKind::DownloadIncomplete => "download-incomplete",
            FailureKind::PromotionIncomplete => "promotion-incomplete",
            FailureKind::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single status event of a sync session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event")]
pub enum SyncEvent {
    /// Fetching the revision manifest.
    #[serde(rename = "probing")]
    Probing { url: String },

    /// The target revision is known.
    #[serde(rename = "revision-selected")]
    RevisionSelected {
        revision: usize,
        tag: String,
        content_id: String,
        latest: bool,
    },

    /// Files are about to be downloaded into `staging`.
    #[serde(rename = "downloading")]
    Downloading { staging: PathBuf },

    /// A tree has been listed.
    #[serde(rename = "tree-listed")]
    TreeListed {
        tree: RemoteTree,
        files: usize,
        failed_folders: usize,
    },

    /// A file was saved into staging.
    #[serde(rename = "file-saved")]
    FileSaved {
        tree: RemoteTree,
        revision: usize,
        name: String,
    },

    /// A file could not be fetched or saved.
    #[serde(rename = "file-failed")]
    FileFailed {
        tree: RemoteTree,
        url: String,
        error: String,
    },

    /// All files of a tree were attempted.
    #[serde(rename = "tree-finished")]
    TreeFinished {
        tree: RemoteTree,
        saved: usize,
        total: usize,
    },

    /// The previous live tree was moved into the backup directory.
    #[serde(rename = "backed-up")]
    BackedUp { tree: RemoteTree, path: PathBuf },

    /// The staged tree replaced the live tree.
    #[serde(rename = "promoted")]
    Promoted { tree: RemoteTree },

    /// A tolerated problem.
    #[serde(rename = "warning")]
    Warning { message: String },

    /// Terminal: the session finished successfully.
    #[serde(rename = "done")]
    Done {
        tag: String,
        saved: usize,
        total: usize,
    },

    /// Terminal: the session stopped.
    #[serde(rename = "failed")]
    Failed {
        kind: FailureKind,
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        backup: Option<PathBuf>,
    },
}

impl SyncEvent {
    /// Whether this is the last event of a session.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SyncEvent::Done { .. } | SyncEvent::Failed { .. })
    }

    /// Serialize this event to a JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncEvent::Probing { url } => {
                write!(f, "searching repository {}. please wait...", url)
            }
            SyncEvent::RevisionSelected {
                tag, latest: true, ..
            } => write!(f, "updating to latest (svn-{}). please wait...", tag),
            SyncEvent::RevisionSelected { tag, .. } => {
                write!(f, "updating to svn-{}. please wait...", tag)
            }
            SyncEvent::Downloading { staging } => {
                write!(f, "downloading new files into {}. please wait...", staging.display())
            }
            SyncEvent::TreeListed {
                tree,
                files,
                failed_folders: 0,
            } => write!(f, "{}: {} files listed", tree, files),
            SyncEvent::TreeListed {
                tree,
                files,
                failed_folders,
            } => write!(
                f,
                "{}: {} files listed, {} folders unreadable",
                tree, files, failed_folders
            ),
            SyncEvent::FileSaved { revision, name, .. } => {
                write!(f, "updated (v{}): {}", revision, name)
            }
            SyncEvent::FileFailed { url, error, .. } => {
                write!(f, "unable to save {}: {}", url, error)
            }
            SyncEvent::TreeFinished { tree, saved, total } => {
                write!(f, "{}: {}/{} files saved", tree, saved, total)
            }
            SyncEvent::BackedUp { tree, path } => {
                write!(f, "previous {} moved to {}", tree, path.display())
            }
            SyncEvent::Promoted { tree } => write!(f, "installed new {}", tree),
            SyncEvent::Warning { message } => write!(f, "warning: {}", message),
            SyncEvent::Done { tag, saved, total } => write!(
                f,
                "done updating to svn-{}. ( {}/{} files saved. )",
                tag, saved, total
            ),
            SyncEvent::Failed {
                message,
                backup: Some(backup),
                ..
            } => write!(
                f,
                "error: {} (previous files are in {})",
                message,
                backup.display()
            ),
            SyncEvent::Failed { message, .. } => write!(f, "error: {}", message),
        }
    }
}

/// Broadcasts session events to every subscriber in one global order.
#[derive(Debug, Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Sender<SyncEvent>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber. Only events emitted after this call are
    /// delivered to it.
    pub fn subscribe(&self) -> Receiver<SyncEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.lock().push(tx);
        rx
    }

    /// Deliver an event to all subscribers. Subscribers whose receiver was
    /// dropped are forgotten.
    pub fn emit(&self, event: SyncEvent) {
        // Subscribers render events; the log only traces them.
        tracing::trace!("{}", event);

        // Holding the lock while sending keeps the order identical for all
        // subscribers when workers emit concurrently.
        let mut subscribers = self.lock();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Sender<SyncEvent>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
