//! `fwkit update` command
//!
//! Runs a sync session on its worker thread and renders the event stream:
//! one JSON object per line with `--json`, status lines and a progress bar
//! per tree otherwise.

use std::time::Instant;

use anyhow::{bail, Result};

use crate::cli::UpdateArgs;
use fwkit::ops::{spawn_update, UpdateOptions};
use fwkit::util::shell::{format_duration, Progress};
use fwkit::util::{GlobalContext, Shell, Status};
use fwkit::{SyncEvent, SyncState};

pub fn execute(args: UpdateArgs, ctx: &GlobalContext, shell: &Shell) -> Result<()> {
    let opts = UpdateOptions {
        revision: args.revision,
        jobs: args.jobs,
    };

    let start = Instant::now();
    let handle = spawn_update(ctx, &opts)?;

    let mut progress: Option<Progress> = None;
    let mut failure = None;
    for event in handle.events().iter() {
        if shell.is_json() {
            shell.json_line(&event);
        } else {
            render(shell, &event, &mut progress);
        }

        if let SyncEvent::Failed {
            message, backup, ..
        } = &event
        {
            failure = Some(match backup {
                Some(backup) => format!(
                    "{} (previous files are in {})",
                    message,
                    backup.display()
                ),
                None => message.clone(),
            });
        }
        if event.is_terminal() {
            break;
        }
    }
    if let Some(progress) = progress.take() {
        progress.finish();
    }

    match handle.join()? {
        SyncState::Done { tag, saved, total } => {
            shell.status(
                Status::Finished,
                format!(
                    "svn-{} ({}/{} files) in {}",
                    tag,
                    saved,
                    total,
                    format_duration(start.elapsed())
                ),
            );
            Ok(())
        }
        SyncState::Failed { message, .. } => bail!("{}", failure.unwrap_or(message)),
        state => bail!("sync stopped in state {}", state),
    }
}

fn render(shell: &Shell, event: &SyncEvent, progress: &mut Option<Progress>) {
    match event {
        SyncEvent::Probing { url } => shell.status(Status::Searching, url),
        SyncEvent::RevisionSelected { .. } => shell.status(Status::Fetching, event),
        SyncEvent::TreeListed { tree, files, .. } => {
            if let Some(previous) = progress.take() {
                previous.finish();
            }
            *progress = Some(shell.progress(*files as u64, tree));
        }
        SyncEvent::FileSaved { .. } => {
            if let Some(progress) = progress {
                progress.inc(1);
            }
            if shell.is_verbose() {
                shell.status(Status::Updated, event);
            }
        }
        // already logged by the session
        SyncEvent::FileFailed { .. } => {
            if let Some(progress) = progress {
                progress.inc(1);
            }
        }
        SyncEvent::TreeFinished { .. } => {
            if let Some(progress) = progress.take() {
                progress.finish();
            }
            shell.note(event);
        }
        SyncEvent::Downloading { .. } | SyncEvent::BackedUp { .. } => {
            if shell.is_verbose() {
                shell.note(event);
            }
        }
        SyncEvent::Promoted { .. } => shell.status(Status::Installing, event),
        SyncEvent::Warning { message } => shell.warn(message),
        SyncEvent::Done { .. } => shell.status(Status::Updated, event),
        // reported by `execute` once the worker has stopped
        SyncEvent::Failed { .. } => {}
    }
}
