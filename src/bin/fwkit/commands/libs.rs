//! `fwkit libs` command

use anyhow::Result;

use crate::cli::LibsArgs;
use fwkit::ops::list_libraries;
use fwkit::util::{GlobalContext, Shell};

pub fn execute(args: LibsArgs, ctx: &GlobalContext, shell: &Shell) -> Result<()> {
    let libraries = list_libraries(ctx)?;

    if args.json {
        shell.json_line(&libraries);
        return Ok(());
    }

    if libraries.is_empty() {
        shell.note(format!(
            "no libraries in {}",
            ctx.layout().libraries_dir().display()
        ));
        return Ok(());
    }

    for name in &libraries {
        println!("{}", name);
    }

    Ok(())
}
