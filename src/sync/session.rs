//! One synchronization attempt against a specific remote revision.
//!
//! A session walks `Idle -> Probing -> Downloading -> Promoting` and ends in
//! `Done` or `Failed`. Nothing below the firmware root changes before the
//! staging directory is created, and the live trees change only during
//! promotion.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Receiver;
use rayon::prelude::*;
use serde::Serialize;
use url::Url;

use crate::core::layout::FirmwareLayout;
use crate::sync::events::{EventBus, FailureKind, SyncEvent};
use crate::sync::listing::list_tree;
use crate::sync::promote::promote;
use crate::sync::remote::Remote;
use crate::sync::revision::{RevisionIndex, RevisionTag, SelectError};
use crate::sync::tree::RemoteTree;
use crate::util::config::SyncConfig;
use crate::util::fs::{ensure_dir, write_bytes};

/// Lifecycle of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "kebab-case")]
pub enum SyncState {
    Idle,
    Probing,
    Downloading,
    Promoting,
    Done {
        tag: String,
        saved: usize,
        total: usize,
    },
    Failed {
        kind: FailureKind,
        message: String,
    },
}

impl SyncState {
    pub fn is_done(&self) -> bool {
        matches!(self, SyncState::Done { .. })
    }

    /// The failure kind of a failed session.
    pub fn failure(&self) -> Option<FailureKind> {
        match self {
            SyncState::Failed { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncState::Idle => f.write_str("idle"),
            SyncState::Probing => f.write_str("probing"),
            SyncState::Downloading => f.write_str("downloading"),
            SyncState::Promoting => f.write_str("promoting"),
            SyncState::Done { tag, saved, total } => {
                write!(f, "done (svn-{}, {}/{} files)", tag, saved, total)
            }
            SyncState::Failed { kind, message } => write!(f, "failed ({}): {}", kind, message),
        }
    }
}

/// Shared flag asking a running session to stop before its next file
/// fetch or before promotion.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Terminal failure of a session, turned into the `failed` event.
#[derive(Debug)]
struct Failure {
    kind: FailureKind,
    message: String,
    backup: Option<PathBuf>,
}

impl Failure {
    fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Failure {
            kind,
            message: message.into(),
            backup: None,
        }
    }
}

/// A synchronization session.
///
/// Subscribe and take the cancel token before calling [`SyncSession::run`]
/// or [`SyncSession::spawn`]; both consume the session.
pub struct SyncSession {
    layout: FirmwareLayout,
    config: SyncConfig,
    remote: Arc<dyn Remote>,
    requested: usize,
    cancel: CancelToken,
    bus: EventBus,
    state: SyncState,
}

impl SyncSession {
    /// Create a session targeting revision `requested` (`0` = latest).
    pub fn new(
        layout: FirmwareLayout,
        config: SyncConfig,
        remote: Arc<dyn Remote>,
        requested: usize,
    ) -> Self {
        SyncSession {
            layout,
            config,
            remote,
            requested,
            cancel: CancelToken::new(),
            bus: EventBus::new(),
            state: SyncState::Idle,
        }
    }

    /// Receive every event emitted from now on.
    pub fn subscribe(&self) -> Receiver<SyncEvent> {
        self.bus.subscribe()
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run the session on a dedicated worker thread.
    pub fn spawn(self) -> std::io::Result<JoinHandle<SyncState>> {
        thread::Builder::new()
            .name("fwkit-sync".to_string())
            .spawn(move || self.run())
    }

    /// Run the session to completion on the current thread.
    pub fn run(mut self) -> SyncState {
        let state = match self.execute() {
            Ok((tag, saved, total)) => {
                self.bus.emit(SyncEvent::Done {
                    tag: tag.clone(),
                    saved,
                    total,
                });
                SyncState::Done { tag, saved, total }
            }
            Err(failure) => {
                self.bus.emit(SyncEvent::Failed {
                    kind: failure.kind,
                    message: failure.message.clone(),
                    backup: failure.backup,
                });
                SyncState::Failed {
                    kind: failure.kind,
                    message: failure.message,
                }
            }
        };
        self.transition(state.clone());
        state
    }

    fn transition(&mut self, state: SyncState) {
        tracing::debug!("sync session: {} -> {}", self.state, state);
        self.state = state;
    }

    /// Returns `(tag, saved, total)` on success.
    fn execute(&mut self) -> Result<(String, usize, usize), Failure> {
        self.transition(SyncState::Probing);
        let index = self.probe()?;

        let (revision, tag) = index.select(self.requested).map_err(|e| match e {
            SelectError::OutOfRange { latest_tag, .. } => Failure::new(
                FailureKind::RevisionOutOfRange,
                format!("abort update! latest is svn-{}", latest_tag),
            ),
            e @ SelectError::Missing(_) => Failure::new(FailureKind::Unreachable, e.to_string()),
        })?;
        let tag = tag.clone();

        self.bus.emit(SyncEvent::RevisionSelected {
            revision,
            tag: tag.to_string(),
            content_id: tag.content_id().to_string(),
            latest: revision == index.latest(),
        });

        self.transition(SyncState::Downloading);
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
        let tmp = self.layout.tmp_dir();

        let staging = unique_dir(&tmp, &format!("fwlib_{}_{}", tag, timestamp));
        ensure_dir(&staging).map_err(|e| {
            Failure::new(
                FailureKind::Io,
                format!("failed to create staging folder: {:#}", e),
            )
        })?;
        self.bus.emit(SyncEvent::Downloading {
            staging: staging.clone(),
        });

        let mut saved = 0;
        let mut attempted = 0;
        let mut empty_trees = Vec::new();
        for tree in RemoteTree::ALL {
            let (tree_saved, tree_attempted) = self.download_tree(tree, &tag, revision, &staging)?;
            saved += tree_saved;
            attempted += tree_attempted;
            if tree_attempted == 0 {
                empty_trees.push(tree.as_str());
            }
        }

        if self.cancel.is_cancelled() {
            return Err(Failure::new(FailureKind::Cancelled, "update cancelled"));
        }
        if attempted == 0 {
            return Err(Failure::new(FailureKind::DownloadIncomplete, "no files saved!"));
        }
        // An empty listing must never replace a live tree.
        if !empty_trees.is_empty() {
            return Err(Failure::new(
                FailureKind::DownloadIncomplete,
                format!("no files listed for {}!", empty_trees.join(", ")),
            ));
        }
        if saved < attempted {
            return Err(Failure::new(
                FailureKind::DownloadIncomplete,
                format!(
                    "failed to download all files! ( {}/{} files saved. )",
                    saved, attempted
                ),
            ));
        }

        self.transition(SyncState::Promoting);
        let backup = unique_dir(&tmp, &format!("fwlib_backup_{}", timestamp));
        promote(self.layout.root(), &staging, &backup, &self.bus).map_err(|e| {
            let outcome = if e.rolled_back() {
                "previous files restored"
            } else {
                "rollback incomplete"
            };
            Failure {
                kind: FailureKind::PromotionIncomplete,
                message: format!("{}; {}", e, outcome),
                backup: Some(backup.clone()),
            }
        })?;

        Ok((tag.to_string(), saved, attempted))
    }

    fn probe(&self) -> Result<RevisionIndex, Failure> {
        let unreachable = |detail: String| {
            Failure::new(
                FailureKind::Unreachable,
                format!("unable to reach repository! ({})", detail),
            )
        };

        let url = Url::parse(&self.config.version_url)
            .map_err(|e| unreachable(format!("invalid url {}: {}", self.config.version_url, e)))?;
        self.bus.emit(SyncEvent::Probing {
            url: url.to_string(),
        });

        let text = self
            .remote
            .fetch_text(&url)
            .map_err(|e| unreachable(e.to_string()))?;
        RevisionIndex::parse(&text).map_err(|e| unreachable(e.to_string()))
    }

    /// Snapshot URL of a tree: `<history_url><tag><tree remote path>`.
    fn snapshot_url(&self, tree: RemoteTree, tag: &RevisionTag) -> Result<Url, url::ParseError> {
        let mut url = format!("{}{}{}", self.config.history_url, tag, tree.remote_path(&self.config));
        if !url.ends_with('/') {
            url.push('/');
        }
        Url::parse(&url)
    }

    /// List and download one tree. Returns `(saved, attempted)`.
    fn download_tree(
        &self,
        tree: RemoteTree,
        tag: &RevisionTag,
        revision: usize,
        staging: &Path,
    ) -> Result<(usize, usize), Failure> {
        let base = self.snapshot_url(tree, tag).map_err(|e| {
            Failure::new(
                FailureKind::Unreachable,
                format!("invalid snapshot url for {}: {}", tree, e),
            )
        })?;

        let list = list_tree(self.remote.as_ref(), &base, self.config.max_depth);
        self.bus.emit(SyncEvent::TreeListed {
            tree,
            files: list.files.len(),
            failed_folders: list.failed_folders.len(),
        });
        for folder in &list.failed_folders {
            self.bus.emit(SyncEvent::FileFailed {
                tree,
                url: folder.to_string(),
                error: "unable to list folder".to_string(),
            });
        }

        let dest = staging.join(tree.relative_dir());
        let save = |url: &Url| self.save_file(tree, revision, &base, url, &dest);
        let saved = if self.config.jobs > 1 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.jobs)
                .build()
            {
                Ok(pool) => pool.install(|| list.files.par_iter().filter(|&url| save(url)).count()),
                Err(e) => {
                    tracing::warn!("falling back to sequential downloads: {}", e);
                    list.files.iter().filter(|&url| save(url)).count()
                }
            }
        } else {
            list.files.iter().filter(|&url| save(url)).count()
        };

        let attempted = list.attempted();
        self.bus.emit(SyncEvent::TreeFinished {
            tree,
            saved,
            total: attempted,
        });
        Ok((saved, attempted))
    }

    /// Fetch one file into the staged tree. Returns whether it was saved.
    fn save_file(&self, tree: RemoteTree, revision: usize, base: &Url, url: &Url, dest: &Path) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }

        let fail = |error: String| {
            tracing::warn!("unable to save {}: {}", url, error);
            self.bus.emit(SyncEvent::FileFailed {
                tree,
                url: url.to_string(),
                error,
            });
            false
        };

        let Some(relative) = relative_name(base, url) else {
            return fail("file lies outside the tree".to_string());
        };

        let bytes = match self.remote.fetch(url) {
            Ok(bytes) => bytes,
            Err(e) => return fail(e.to_string()),
        };

        let target = relative.split('/').fold(dest.to_path_buf(), |path, seg| path.join(seg));
        if let Err(e) = write_bytes(&target, &bytes) {
            return fail(format!("{:#}", e));
        }

        tracing::debug!("saved {}", target.display());
        self.bus.emit(SyncEvent::FileSaved {
            tree,
            revision,
            name: relative,
        });
        true
    }
}

/// Decoded path of `url` below `base`, rejecting empty, `.` and `..`
/// segments and backslashes.
fn relative_name(base: &Url, url: &Url) -> Option<String> {
    let encoded = url.path().strip_prefix(base.path())?;
    let relative = urlencoding::decode(encoded).ok()?;
    let valid = !relative.is_empty()
        && relative
            .split('/')
            .all(|seg| !seg.is_empty() && seg != "." && seg != ".." && !seg.contains('\\'));
    valid.then(|| relative.into_owned())
}

/// `parent/name`, or `parent/name_N` when that already exists.
fn unique_dir(parent: &Path, name: &str) -> PathBuf {
    let mut candidate = parent.join(name);
    let mut n = 1;
    while candidate.exists() {
        candidate = parent.join(format!("{}_{}", name, n));
        n += 1;
    }
    candidate
}
