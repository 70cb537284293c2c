//! `fwkit examples` command

use anyhow::Result;

use crate::cli::ExamplesArgs;
use fwkit::ops::list_examples;
use fwkit::util::fs::relative_path;
use fwkit::util::{GlobalContext, Shell};

pub fn execute(args: ExamplesArgs, ctx: &GlobalContext, shell: &Shell) -> Result<()> {
    let groups = list_examples(ctx)?;

    if args.json {
        shell.json_line(&groups);
        return Ok(());
    }

    if groups.is_empty() {
        shell.note("no example projects found");
        return Ok(());
    }

    let root = ctx.root();
    for group in &groups {
        println!("{}", group.name);
        for project in &group.projects {
            println!("  {}", relative_path(root, project).display());
        }
    }

    Ok(())
}
