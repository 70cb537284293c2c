//! Firmware root layout.
//!
//! Every fwkit operation works against one firmware root:
//!
//! ```text
//! <root>/
//! ├── fwkit.toml                  # optional project config
//! ├── libraries/<Name>/<Name>.h   # user libraries
//! ├── hardware/cores/
//! │   ├── bsp/                    # board support package, startup code, linker script
//! │   ├── stm_lib/{inc,src}/      # standard peripheral library
//! │   └── cmsis/CM3/
//! │       ├── CoreSupport/
//! │       └── DeviceSupport/ST/STM32F10x/
//! ├── examples/<group>/*.phr      # built-in example projects
//! └── tmp/                        # sync staging and backups
//! ```

use std::path::{Path, PathBuf};

/// User library collection, relative to the root.
pub const LIBRARIES_DIR: &str = "libraries";

/// Core tree, relative to the root.
pub const CORE_DIR: &str = "hardware/cores";

/// Built-in example projects, relative to the root.
pub const EXAMPLES_DIR: &str = "examples";

/// Sync staging and backup area, relative to the root.
pub const TMP_DIR: &str = "tmp";

const BSP_DIR: &str = "bsp";
const STM_LIB_DIR: &str = "stm_lib";
const CM3_CORE_DIR: &str = "cmsis/CM3/CoreSupport";
const CM3_DEVICE_DIR: &str = "cmsis/CM3/DeviceSupport/ST/STM32F10x";
const STARTUP_CODE: &str = "startup_stm32f10x_md_vl.s";
const LINKER_SCRIPT: &str = "stm32_flash_md_vl.ld";

/// Paths of one firmware root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirmwareLayout {
    root: PathBuf,
}

impl FirmwareLayout {
    /// Create a layout for `root`. The root should be absolute so that every
    /// derived path handed to the compiler driver is absolute too.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FirmwareLayout { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn libraries_dir(&self) -> PathBuf {
        self.root.join(LIBRARIES_DIR)
    }

    /// Folder of a single library.
    pub fn library_dir(&self, name: &str) -> PathBuf {
        self.libraries_dir().join(name)
    }

    pub fn core_dir(&self) -> PathBuf {
        self.root.join(CORE_DIR)
    }

    pub fn bsp_dir(&self) -> PathBuf {
        self.core_dir().join(BSP_DIR)
    }

    pub fn stm_lib_dir(&self) -> PathBuf {
        self.core_dir().join(STM_LIB_DIR)
    }

    /// Peripheral driver headers.
    pub fn stm_lib_inc_dir(&self) -> PathBuf {
        self.stm_lib_dir().join("inc")
    }

    /// Peripheral driver sources.
    pub fn stm_lib_src_dir(&self) -> PathBuf {
        self.stm_lib_dir().join("src")
    }

    pub fn cm3_core_dir(&self) -> PathBuf {
        self.core_dir().join(CM3_CORE_DIR)
    }

    pub fn cm3_device_dir(&self) -> PathBuf {
        self.core_dir().join(CM3_DEVICE_DIR)
    }

    pub fn startup_code(&self) -> PathBuf {
        self.bsp_dir().join(STARTUP_CODE)
    }

    pub fn linker_script(&self) -> PathBuf {
        self.bsp_dir().join(LINKER_SCRIPT)
    }

    pub fn examples_dir(&self) -> PathBuf {
        self.root.join(EXAMPLES_DIR)
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.root.join(TMP_DIR)
    }
}
