//! High-level operations.
//!
//! This module contains the implementation of fwkit commands.

pub mod fwkit_catalog;
pub mod fwkit_keywords;
pub mod fwkit_resolve;
pub mod fwkit_update;

pub use fwkit_catalog::{list_examples, list_libraries};
pub use fwkit_keywords::extract_keywords;
pub use fwkit_resolve::{build_flags, resolve_build, BuildFlags, ResolveOptions};
pub use fwkit_update::{fetch_revisions, spawn_update, UpdateHandle, UpdateOptions};
