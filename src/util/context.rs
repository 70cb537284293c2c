//! Global context for fwkit operations.
//!
//! Provides centralized access to the firmware root, configuration and
//! derived paths.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::FirmwareLayout;
use crate::util::config::{self, Config};

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Firmware root (contains `libraries/`, `hardware/cores/`, `examples/`)
    root: PathBuf,

    /// Merged global + project configuration
    config: Config,
}

impl GlobalContext {
    /// Create a context rooted at the current working directory.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        Self::with_root(cwd)
    }

    /// Create a context rooted at a specific firmware directory.
    ///
    /// Loads `~/.fwkit/config.toml` and `<root>/fwkit.toml`.
    pub fn with_root(root: PathBuf) -> Result<Self> {
        let root = crate::util::fs::absolute(&root)?;
        let global = config::global_config_path();
        let config = config::load_config(global.as_deref(), &config::project_config_path(&root));

        Ok(GlobalContext {
            root,
            config,
        })
    }

    /// Replace the loaded configuration.
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Get the firmware root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the firmware layout for the root.
    pub fn layout(&self) -> FirmwareLayout {
        FirmwareLayout::new(&self.root)
    }

    /// Get the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Output directory for artifacts generated while building `root_file`.
    ///
    /// A relative `build.out_dir` is taken relative to the firmware root.
    pub fn out_dir_for(&self, root_file: &Path) -> PathBuf {
        match &self.config.build.out_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => self.root.join(dir),
            None => root_file
                .parent()
                .map(|p| p.join("build"))
                .unwrap_or_else(|| self.root.join("build")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_context_reads_project_config() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(
            tmp.path().join("fwkit.toml"),
            "[build]\nproject_extension = \"prj\"\n",
        )
        .unwrap();

        let ctx = GlobalContext::with_root(tmp.path().to_path_buf()).unwrap();
        assert_eq!(ctx.root(), tmp.path());
        assert_eq!(ctx.config().build.project_extension(), "prj");
    }

    #[test]
    fn test_out_dir_defaults_next_to_file() {
        let tmp = TempDir::new().unwrap();
        let ctx = GlobalContext::with_root(tmp.path().to_path_buf())
            .unwrap()
            .with_config(Config::default());

        let file = tmp.path().join("projects/blink.phr");
        assert_eq!(ctx.out_dir_for(&file), tmp.path().join("projects/build"));
    }

    #[test]
    fn test_out_dir_relative_to_root() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.build.out_dir = Some(PathBuf::from("out"));
        let ctx = GlobalContext::with_root(tmp.path().to_path_buf())
            .unwrap()
            .with_config(config);

        let file = tmp.path().join("projects/blink.phr");
        assert_eq!(ctx.out_dir_for(&file), tmp.path().join("out"));
    }
}
