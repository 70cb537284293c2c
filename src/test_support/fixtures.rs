//! Firmware tree fixtures.
//!
//! A fixture owns a temporary firmware root and removes it when dropped.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::core::{CoreManifest, FirmwareLayout};

/// A firmware root in a temporary directory.
#[derive(Debug)]
pub struct FirmwareFixture {
    _tmp: TempDir,
    root: PathBuf,
}

impl FirmwareFixture {
    /// Create an empty firmware root.
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let root = tmp.path().to_path_buf();
        FirmwareFixture { _tmp: tmp, root }
    }

    /// Populate the core tree: BSP, CMSIS, peripheral headers and every
    /// fixed driver source of the core manifest.
    pub fn with_core(self) -> Self {
        let layout = self.layout();

        write_file(&layout.startup_code(), "  .syntax unified\n");
        write_file(&layout.linker_script(), "MEMORY {}\n");
        write_file(&layout.bsp_dir().join("bsp.h"), &minimal_header("bsp"));
        write_file(&layout.bsp_dir().join("bsp.c"), "#include \"bsp.h\"\n");
        write_file(&layout.cm3_core_dir().join("core_cm3.c"), "");
        write_file(&layout.cm3_device_dir().join("system_stm32f10x.c"), "");

        for driver in CoreManifest::stm32f10x().drivers() {
            write_file(&layout.stm_lib_src_dir().join(driver), "");
            let header = Path::new(driver).with_extension("h");
            write_file(
                &layout.stm_lib_inc_dir().join(&header),
                &minimal_header(&header.to_string_lossy()),
            );
        }
        self
    }

    /// Add `libraries/<name>/<name>.h` plus the given (empty) files.
    pub fn add_library(&self, name: &str, files: &[&str]) -> PathBuf {
        let dir = self.layout().library_dir(name);
        write_file(&dir.join(format!("{}.h", name)), &minimal_header(name));
        for file in files {
            write_file(&dir.join(file), "");
        }
        dir
    }

    /// Write a user project file at the root and return its path.
    pub fn write_project(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root.join(name);
        write_file(&path, content);
        path
    }

    /// Add a built-in example project `examples/<group>/<name>`.
    pub fn add_example(&self, group: &str, name: &str) -> PathBuf {
        let path = self.layout().examples_dir().join(group).join(name);
        write_file(&path, "");
        path
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self) -> FirmwareLayout {
        FirmwareLayout::new(&self.root)
    }

    /// Output directory used by resolver tests.
    pub fn out_dir(&self) -> PathBuf {
        self.root.join("build")
    }
}

impl Default for FirmwareFixture {
    fn default() -> Self {
        Self::new()
    }
}

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("failed to create fixture dir");
    }
    fs::write(path, content).expect("failed to write fixture file");
}

/// Create a minimal header file.
pub fn minimal_header(name: &str) -> String {
    let guard = name
        .to_uppercase()
        .replace(|c: char| !c.is_ascii_alphanumeric(), "_");
    format!(
        r#"#ifndef __{}_H
#define __{}_H

#endif
"#,
        guard, guard
    )
}
