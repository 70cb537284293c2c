//! fwkit CLI - firmware library closure resolver and library sync

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use fwkit::util::{GlobalContext, Shell};

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging; stdout is reserved for command output
    let filter = if cli.verbose {
        EnvFilter::new("fwkit=debug")
    } else {
        EnvFilter::new("fwkit=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    if let Commands::Completions(args) = cli.command {
        return commands::completions::execute(args);
    }

    let ctx = match &cli.root {
        Some(root) => GlobalContext::with_root(root.clone())?,
        None => GlobalContext::new()?,
    };

    let json = match &cli.command {
        Commands::Resolve(args) => args.json,
        Commands::Flags(args) => args.json,
        Commands::Libs(args) => args.json,
        Commands::Examples(args) => args.json,
        Commands::Revisions(args) => args.json,
        Commands::Update(args) => args.json,
        Commands::Keywords(_) | Commands::Completions(_) => false,
    };
    let shell = Shell::from_flags(cli.verbose, cli.no_color, json);

    // Execute command
    match cli.command {
        Commands::Resolve(args) => commands::resolve::execute(args, &ctx, &shell),
        Commands::Flags(args) => commands::flags::execute(args, &ctx, &shell),
        Commands::Libs(args) => commands::libs::execute(args, &ctx, &shell),
        Commands::Examples(args) => commands::examples::execute(args, &ctx, &shell),
        Commands::Revisions(args) => commands::revisions::execute(args, &ctx, &shell),
        Commands::Update(args) => commands::update::execute(args, &ctx, &shell),
        Commands::Keywords(args) => commands::keywords::execute(args, &ctx),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
