//! Library closure resolution.
//!
//! The resolver owns no state: every call is a function of the firmware
//! tree as it is on disk at that moment. It performs no I/O other than
//! reading sources and creating the output directory.

pub mod errors;
pub mod include;
pub mod resolve;

pub use errors::ResolveError;
pub use include::{Delimiter, IncludeDirective};
pub use resolve::{resolve, BuildClosure, Resolver, LIBRARY_SOURCE_EXTENSIONS};
