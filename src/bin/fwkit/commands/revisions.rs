//! `fwkit revisions` command

use anyhow::Result;

use crate::cli::RevisionsArgs;
use fwkit::ops::fetch_revisions;
use fwkit::util::{GlobalContext, Shell, Status};

pub fn execute(args: RevisionsArgs, ctx: &GlobalContext, shell: &Shell) -> Result<()> {
    shell.status(Status::Searching, &ctx.config().sync.version_url);
    let index = fetch_revisions(ctx)?;

    if args.json {
        shell.json_line(&index);
        return Ok(());
    }

    for (revision, tag) in index.iter() {
        let marker = if revision == index.latest() { " (latest)" } else { "" };
        println!("{:>4}  svn-{}  {}{}", revision, tag, tag.short_id(), marker);
    }

    Ok(())
}
