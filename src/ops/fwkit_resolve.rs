//! Implementation of `fwkit resolve` and `fwkit flags`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::CoreManifest;
use crate::resolver::{BuildClosure, ResolveError, Resolver};
use crate::util::GlobalContext;

/// Options for resolve command.
#[derive(Debug, Clone, Default)]
pub struct ResolveOptions {
    /// Output directory (None = `build.out_dir` or `<file dir>/build`)
    pub out_dir: Option<PathBuf>,
}

/// Resolve the build closure of `root_file` in the context's firmware root.
pub fn resolve_build(
    ctx: &GlobalContext,
    root_file: &Path,
    opts: &ResolveOptions,
) -> Result<BuildClosure, ResolveError> {
    let layout = ctx.layout();
    let manifest = CoreManifest::stm32f10x();
    let out_dir = opts
        .out_dir
        .clone()
        .unwrap_or_else(|| ctx.out_dir_for(root_file));

    tracing::debug!(
        "resolving {} (output in {})",
        root_file.display(),
        out_dir.display()
    );

    let closure = Resolver::new(&layout, &manifest).resolve(root_file, &out_dir)?;
    tracing::info!(
        "{} include paths, {} sources",
        closure.include_paths.len(),
        closure.source_files.len()
    );
    Ok(closure)
}

/// Flags handed to the cross compiler for one firmware root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildFlags {
    /// ` -DNAME=VALUE` pairs
    pub defines: String,
    pub startup_code: PathBuf,
    pub linker_script: PathBuf,
    /// `-I<dir>` flags
    pub include_paths: Vec<String>,
}

/// Compiler flags. With a root file, the include paths are those of its
/// closure; otherwise only the core include directories.
pub fn build_flags(ctx: &GlobalContext, root_file: Option<&Path>) -> Result<BuildFlags> {
    let layout = ctx.layout();

    let include_paths = match root_file {
        Some(file) => {
            resolve_build(ctx, file, &ResolveOptions::default())
                .with_context(|| format!("failed to resolve {}", file.display()))?
                .include_paths
        }
        None => CoreManifest::stm32f10x()
            .include_dirs(&layout)
            .iter()
            .map(|dir| format!("-I{}", dir.display()))
            .collect(),
    };

    Ok(BuildFlags {
        defines: ctx.config().compiler_defines(),
        startup_code: layout.startup_code(),
        linker_script: layout.linker_script(),
        include_paths,
    })
}
