//! Filesystem utilities.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;
use walkdir::WalkDir;

/// Recursively copy a directory.
pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)
        .with_context(|| format!("failed to create directory: {}", dst.display()))?;

    for entry in WalkDir::new(src).min_depth(1) {
        let entry =
            entry.with_context(|| format!("failed to read directory: {}", src.display()))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("unexpected entry outside {}", src.display()))?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .with_context(|| format!("failed to create directory: {}", target.display()))?;
        } else {
            fs::copy(entry.path(), &target).with_context(|| {
                format!(
                    "failed to copy {} to {}",
                    entry.path().display(),
                    target.display()
                )
            })?;
        }
    }
    Ok(())
}

/// Move a directory to a new location, creating the destination's parent.
///
/// Uses a rename when possible and falls back to copy + remove when the
/// rename is refused (typically because it crosses filesystems). On error
/// the source is left complete and the destination absent, except when the
/// removed part of the source cannot be put back; the destination then
/// holds the full copy.
pub fn move_dir(src: &Path, dst: &Path) -> Result<()> {
    if dst.exists() {
        anyhow::bail!("destination already exists: {}", dst.display());
    }
    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }

    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() != io::ErrorKind::NotFound => {
            tracing::debug!(
                "rename {} -> {} failed ({}), copying instead",
                src.display(),
                dst.display(),
                e
            );
            copy_then_remove(src, dst)
        }
        Err(e) => Err(e).with_context(|| {
            format!("failed to move {} to {}", src.display(), dst.display())
        }),
    }
}

fn copy_then_remove(src: &Path, dst: &Path) -> Result<()> {
    if let Err(e) = copy_dir_all(src, dst) {
        let _ = fs::remove_dir_all(dst);
        return Err(e);
    }

    let removed = fs::remove_dir_all(src)
        .with_context(|| format!("failed to remove directory: {}", src.display()));
    if let Err(e) = removed {
        // put back what was already removed
        copy_dir_all(dst, src)?;
        let _ = fs::remove_dir_all(dst);
        return Err(e);
    }
    Ok(())
}

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Read a text file, replacing invalid UTF-8 sequences.
///
/// Firmware sources are frequently Latin-1 encoded; include scanning only
/// cares about ASCII so lossy decoding is sufficient.
pub fn read_lossy(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Write bytes to a file, creating parent directories if needed.
pub fn write_bytes(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents)
        .with_context(|| format!("failed to write file: {}", path.display()))
}

/// List the files directly inside `dir` with the given extension, sorted.
///
/// A missing directory yields an empty list.
pub fn files_with_extension(dir: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let pattern = dir.join(format!("*.{}", ext));
    let pattern_str = pattern.to_string_lossy();

    let mut results = Vec::new();
    for entry in glob(&escaped_pattern(dir, ext))
        .with_context(|| format!("invalid glob pattern: {}", pattern_str))?
    {
        match entry {
            Ok(path) => {
                if path.is_file() {
                    results.push(path);
                }
            }
            Err(e) => {
                tracing::warn!("glob error: {}", e);
            }
        }
    }

    results.sort();
    Ok(results)
}

/// Glob metacharacters in the directory itself must not be interpreted.
fn escaped_pattern(dir: &Path, ext: &str) -> String {
    let escaped = glob::Pattern::escape(&dir.to_string_lossy());
    format!("{}/*.{}", escaped.trim_end_matches('/'), ext)
}

/// Get the relative path from `base` to `path`.
pub fn relative_path(base: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf())
}

/// Make a path absolute against the current directory without touching
/// the filesystem beyond reading the cwd.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    Ok(cwd.join(path))
}
