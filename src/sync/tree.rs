//! The three independently addressed remote trees.

use std::fmt;

use serde::Serialize;

use crate::core::layout::{CORE_DIR, EXAMPLES_DIR, LIBRARIES_DIR};
use crate::util::config::SyncConfig;

/// One of the remote trees mirrored into the firmware root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemoteTree {
    Core,
    Libraries,
    Examples,
}

impl RemoteTree {
    /// All trees, in download and promotion order.
    pub const ALL: [RemoteTree; 3] = [RemoteTree::Core, RemoteTree::Libraries, RemoteTree::Examples];

    /// Location of the tree relative to the firmware root (and to a
    /// staging or backup directory).
    pub fn relative_dir(&self) -> &'static str {
        match self {
            RemoteTree::Core => CORE_DIR,
            RemoteTree::Libraries => LIBRARIES_DIR,
            RemoteTree::Examples => EXAMPLES_DIR,
        }
    }

    /// Remote path of the tree below a revision snapshot.
    pub fn remote_path<'a>(&self, config: &'a SyncConfig) -> &'a str {
        match self {
            RemoteTree::Core => &config.core_path,
            RemoteTree::Libraries => &config.libraries_path,
            RemoteTree::Examples => &config.examples_path,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RemoteTree::Core => "core",
            RemoteTree::Libraries => "libraries",
            RemoteTree::Examples => "examples",
        }
    }
}

impl fmt::Display for RemoteTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
