//! fwkit - firmware build-closure resolver and library synchronizer
//!
//! This crate provides the core library functionality for fwkit:
//! resolving the include paths and sources a firmware project needs, and
//! keeping the local core, library and example trees in sync with a
//! revision-numbered remote repository.

pub mod core;
pub mod keywords;
pub mod ops;
pub mod resolver;
pub mod sync;
pub mod util;

/// Test utilities and mocks for fwkit unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides an in-memory remote repository and firmware
/// tree fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{CoreManifest, FirmwareLayout};
pub use resolver::{BuildClosure, ResolveError, Resolver};
pub use sync::{SyncEvent, SyncSession, SyncState};
pub use util::context::GlobalContext;
