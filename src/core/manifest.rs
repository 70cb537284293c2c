//! The fixed core manifest.
//!
//! The core manifest lists the hardware-abstraction sources compiled into
//! every firmware image no matter what the user code includes. It is a
//! constant description: the folders and driver names never change for a
//! given toolchain, only the globbing of the BSP and CMSIS folders reads
//! the filesystem.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::core::layout::FirmwareLayout;
use crate::util::fs::files_with_extension;

/// A folder of the core tree whose files are compiled by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreFolder {
    Bsp,
    CoreSupport,
    DeviceSupport,
}

impl CoreFolder {
    fn path(&self, layout: &FirmwareLayout) -> PathBuf {
        match self {
            CoreFolder::Bsp => layout.bsp_dir(),
            CoreFolder::CoreSupport => layout.cm3_core_dir(),
            CoreFolder::DeviceSupport => layout.cm3_device_dir(),
        }
    }
}

/// Fixed list of always-compiled core sources and include directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreManifest {
    /// Folders globbed for sources, with the extensions taken from each (in order).
    globbed: &'static [(CoreFolder, &'static [&'static str])],
    /// Peripheral library sources (under `stm_lib/src`) always compiled.
    drivers: &'static [&'static str],
}

const STM32F10X_GLOBBED: &[(CoreFolder, &[&str])] = &[
    (CoreFolder::Bsp, &["s", "c", "cpp"]),
    (CoreFolder::CoreSupport, &["c"]),
    (CoreFolder::DeviceSupport, &["c"]),
];

const STM32F10X_DRIVERS: &[&str] = &[
    "misc.c",
    "stm32f10x_gpio.c",
    "stm32f10x_rcc.c",
    "stm32f10x_tim.c",
    "stm32f10x_usart.c",
];

impl Default for CoreManifest {
    fn default() -> Self {
        Self::stm32f10x()
    }
}

impl CoreManifest {
    /// Manifest for the STM32F10x value-line board.
    pub fn stm32f10x() -> Self {
        CoreManifest {
            globbed: STM32F10X_GLOBBED,
            drivers: STM32F10X_DRIVERS,
        }
    }

    /// File names of the always-compiled peripheral drivers.
    pub fn drivers(&self) -> &[&'static str] {
        self.drivers
    }

    /// Core sources, in build order.
    ///
    /// `extra_drivers` are additional peripheral sources discovered from
    /// library headers; they follow the fixed drivers and are skipped when
    /// already present.
    pub fn sources(&self, layout: &FirmwareLayout, extra_drivers: &[PathBuf]) -> Result<Vec<PathBuf>> {
        let mut sources = Vec::new();

        for (folder, extensions) in self.globbed {
            let dir = folder.path(layout);
            for ext in extensions.iter() {
                sources.extend(files_with_extension(&dir, ext)?);
            }
        }

        let src_dir = layout.stm_lib_src_dir();
        sources.extend(self.drivers.iter().map(|d| src_dir.join(d)));

        for extra in extra_drivers {
            if !sources.contains(extra) {
                sources.push(extra.clone());
            }
        }

        Ok(sources)
    }

    /// The four core include directories, in order.
    pub fn include_dirs(&self, layout: &FirmwareLayout) -> Vec<PathBuf> {
        vec![
            layout.bsp_dir(),
            layout.stm_lib_inc_dir(),
            layout.cm3_core_dir(),
            layout.cm3_device_dir(),
        ]
    }

    /// Driver source corresponding to a header token, e.g.
    /// `stm32f10x_spi.h` -> `<stm_lib>/src/stm32f10x_spi.c`.
    pub fn driver_source_for(&self, layout: &FirmwareLayout, header: &str) -> Option<PathBuf> {
        let stem = Path::new(header).file_stem()?.to_str()?;
        if stem.is_empty() {
            return None;
        }
        Some(layout.stm_lib_src_dir().join(format!("{}.c", stem)))
    }
}
