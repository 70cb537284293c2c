//! Implementation of `fwkit update` and `fwkit revisions`.

use std::sync::Arc;
use std::thread::JoinHandle;

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::Receiver;
use url::Url;

use crate::core::FirmwareLayout;
use crate::sync::{
    CancelToken, HttpRemote, Remote, RevisionIndex, SyncEvent, SyncSession, SyncState,
};
use crate::util::config::SyncConfig;
use crate::util::GlobalContext;

/// Options for update command.
#[derive(Debug, Clone, Default)]
pub struct UpdateOptions {
    /// Revision to install (0 = latest)
    pub revision: usize,

    /// Parallel downloads per tree (None = `sync.jobs`)
    pub jobs: Option<usize>,
}

/// A sync session running on its worker thread.
pub struct UpdateHandle {
    events: Receiver<SyncEvent>,
    cancel: CancelToken,
    worker: JoinHandle<SyncState>,
}

impl UpdateHandle {
    /// Events of the session, ending with `done` or `failed`.
    pub fn events(&self) -> &Receiver<SyncEvent> {
        &self.events
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Wait for the session and return its terminal state.
    pub fn join(self) -> Result<SyncState> {
        self.worker
            .join()
            .map_err(|_| anyhow!("sync worker panicked"))
    }
}

/// Start a sync session against the configured repository.
pub fn spawn_update(ctx: &GlobalContext, opts: &UpdateOptions) -> Result<UpdateHandle> {
    let mut config = ctx.config().sync.clone();
    if let Some(jobs) = opts.jobs {
        config.jobs = jobs.max(1);
    }

    let remote = Arc::new(HttpRemote::new(&config)?);
    spawn_session(ctx.layout(), config, remote, opts.revision)
}

fn spawn_session(
    layout: FirmwareLayout,
    config: SyncConfig,
    remote: Arc<dyn Remote>,
    revision: usize,
) -> Result<UpdateHandle> {
    tracing::debug!(
        "starting sync of {} (revision {}, {} jobs)",
        layout.root().display(),
        revision,
        config.jobs
    );

    let session = SyncSession::new(layout, config, remote, revision);
    let events = session.subscribe();
    let cancel = session.cancel_token();
    let worker = session.spawn().context("failed to start sync worker")?;

    Ok(UpdateHandle {
        events,
        cancel,
        worker,
    })
}

/// Fetch the revision index of the configured repository.
pub fn fetch_revisions(ctx: &GlobalContext) -> Result<RevisionIndex> {
    let config = &ctx.config().sync;
    let remote = HttpRemote::new(config)?;
    fetch_revisions_from(&remote, config)
}

fn fetch_revisions_from(remote: &dyn Remote, config: &SyncConfig) -> Result<RevisionIndex> {
    let url = Url::parse(&config.version_url)
        .with_context(|| format!("invalid version url: {}", config.version_url))?;
    let text = remote
        .fetch_text(&url)
        .context("unable to reach repository")?;
    RevisionIndex::parse(&text).with_context(|| format!("invalid revision manifest at {}", url))
}
