//! `fwkit resolve` command

use anyhow::{bail, Result};

use crate::cli::ResolveArgs;
use fwkit::ops::{resolve_build, ResolveOptions};
use fwkit::util::{GlobalContext, Shell, Status};
use fwkit::BuildClosure;

pub fn execute(args: ResolveArgs, ctx: &GlobalContext, shell: &Shell) -> Result<()> {
    let opts = ResolveOptions {
        out_dir: args.out_dir,
    };

    let closure = match resolve_build(ctx, &args.file, &opts) {
        Ok(closure) => closure,
        Err(e) => {
            // JSON consumers always get a closure object
            shell.json_line(&BuildClosure::failed());

            let help = e.help();
            let err = anyhow::Error::new(e);
            match help {
                Some(help) => bail!("{:#}\n{}", err, help),
                None => bail!("{:#}", err),
            }
        }
    };

    if shell.is_json() {
        shell.json_line(&closure);
        return Ok(());
    }

    shell.status(
        Status::Resolved,
        format!(
            "{} ({} include paths, {} sources)",
            args.file.display(),
            closure.include_paths.len(),
            closure.source_files.len()
        ),
    );

    println!("# Include paths:");
    for flag in &closure.include_paths {
        println!("{}", flag);
    }
    println!();
    println!("# Sources:");
    for source in &closure.source_files {
        println!("{}", source.display());
    }

    Ok(())
}
