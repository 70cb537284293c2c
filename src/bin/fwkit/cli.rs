//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// fwkit - Library closure resolution and library sync for STM32 firmware
#[derive(Parser)]
#[command(name = "fwkit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Firmware root (defaults to the current directory)
    #[arg(long, global = true, env = "FWKIT_ROOT")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the include paths and sources a project file needs
    Resolve(ResolveArgs),

    /// Show compiler defines, startup code, linker script and include paths
    Flags(FlagsArgs),

    /// List the installed libraries
    Libs(LibsArgs),

    /// List the example projects
    Examples(ExamplesArgs),

    /// List the revisions available in the remote repository
    Revisions(RevisionsArgs),

    /// Replace core, libraries and examples with a remote revision
    Update(UpdateArgs),

    /// Extract highlighting keywords from C headers
    Keywords(KeywordsArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct ResolveArgs {
    /// Project file to resolve
    pub file: PathBuf,

    /// Output directory (defaults to `build.out_dir` or `<file dir>/build`)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print the closure as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct FlagsArgs {
    /// Project file whose include paths to show (defaults to core only)
    pub file: Option<PathBuf>,

    /// Print the flags as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct LibsArgs {
    /// Print the list as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ExamplesArgs {
    /// Print the groups as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct RevisionsArgs {
    /// Print the revision index as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Revision to install (0 = latest)
    #[arg(long, short, default_value_t = 0)]
    pub revision: usize,

    /// Parallel downloads per tree (defaults to `sync.jobs`)
    #[arg(long, short)]
    pub jobs: Option<usize>,

    /// Stream session events as JSON lines
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct KeywordsArgs {
    /// Headers to scan (defaults to the board support and driver headers)
    pub headers: Vec<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
