//! Command implementations

pub mod completions;
pub mod examples;
pub mod flags;
pub mod keywords;
pub mod libs;
pub mod resolve;
pub mod revisions;
pub mod update;
