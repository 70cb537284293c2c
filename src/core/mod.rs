//! Core data structures for fwkit.
//!
//! This module contains the foundational types used throughout fwkit:
//! - The firmware root layout
//! - The fixed core manifest
//! - Library and example project discovery

pub mod catalog;
pub mod layout;
pub mod manifest;

pub use catalog::{example_projects, is_library, scan_libraries, ExampleGroup};
pub use layout::FirmwareLayout;
pub use manifest::CoreManifest;
