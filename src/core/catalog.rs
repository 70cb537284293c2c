//! Library and example project discovery.
//!
//! The catalog is never stored: every call derives it from the current
//! state of the firmware root.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::layout::FirmwareLayout;
use crate::util::fs::files_with_extension;

/// A group of example projects shown under one heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExampleGroup {
    /// Upper-cased folder name (e.g. `GPIO`, `MOTOR`)
    pub name: String,
    /// Project files, sorted
    pub projects: Vec<PathBuf>,
}

/// Whether a directory entry name marks a hidden folder.
fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Names of the immediate subdirectories of `dir`, sorted. A missing
/// directory yields an empty list.
fn subdirectories(dir: &std::path::Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            if !is_hidden(name) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

/// Whether `name` is a valid library: `libraries/<name>/<name>.h` exists.
pub fn is_library(layout: &FirmwareLayout, name: &str) -> bool {
    layout
        .library_dir(name)
        .join(format!("{}.h", name))
        .is_file()
}

/// Scan the library collection for valid libraries, sorted by name.
pub fn scan_libraries(layout: &FirmwareLayout) -> Result<Vec<String>> {
    let libraries: Vec<String> = subdirectories(&layout.libraries_dir())?
        .into_iter()
        .filter(|name| {
            let valid = is_library(layout, name);
            if !valid {
                tracing::debug!("skipping `{}`: no {}.h header", name, name);
            }
            valid
        })
        .collect();

    Ok(libraries)
}

/// Collect example projects.
///
/// Built-in groups (`examples/<group>/*.<ext>`) come first, then each
/// library's `examples/*.<ext>`. The first source of a group name wins.
pub fn example_projects(
    layout: &FirmwareLayout,
    libraries: &[String],
    ext: &str,
) -> Result<Vec<ExampleGroup>> {
    let mut groups: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();

    let builtin = subdirectories(&layout.examples_dir())?
        .into_iter()
        .map(|group| (group.clone(), layout.examples_dir().join(group)));
    let from_libraries = libraries
        .iter()
        .map(|lib| (lib.clone(), layout.library_dir(lib).join("examples")));

    for (folder, dir) in builtin.chain(from_libraries) {
        let projects = files_with_extension(&dir, ext)?;
        if projects.is_empty() {
            continue;
        }
        groups.entry(folder.to_uppercase()).or_insert(projects);
    }

    Ok(groups
        .into_iter()
        .map(|(name, projects)| ExampleGroup { name, projects })
        .collect())
}
