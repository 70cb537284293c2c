//! `fwkit flags` command

use anyhow::Result;

use crate::cli::FlagsArgs;
use fwkit::ops::build_flags;
use fwkit::util::{GlobalContext, Shell};

pub fn execute(args: FlagsArgs, ctx: &GlobalContext, shell: &Shell) -> Result<()> {
    let flags = build_flags(ctx, args.file.as_deref())?;

    if shell.is_json() {
        shell.json_line(&flags);
        return Ok(());
    }

    match &args.file {
        Some(file) => println!("# Compile flags for `{}`:", file.display()),
        None => println!("# Compile flags (core only):"),
    }
    println!("defines:       {}", flags.defines.trim_start());
    println!("startup code: {}", flags.startup_code.display());
    println!("linker script: {}", flags.linker_script.display());
    println!();
    println!("# Include paths:");
    for flag in &flags.include_paths {
        println!("{}", flag);
    }

    Ok(())
}
