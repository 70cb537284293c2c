//! Implementation of `fwkit libs` and `fwkit examples`.

use anyhow::Result;

use crate::core::{example_projects, scan_libraries, ExampleGroup};
use crate::util::GlobalContext;

/// Valid libraries of the firmware root, sorted.
pub fn list_libraries(ctx: &GlobalContext) -> Result<Vec<String>> {
    scan_libraries(&ctx.layout())
}

/// Example project groups of the firmware root, built-in groups first.
pub fn list_examples(ctx: &GlobalContext) -> Result<Vec<ExampleGroup>> {
    let layout = ctx.layout();
    let libraries = scan_libraries(&layout)?;
    example_projects(&layout, &libraries, ctx.config().build.project_extension())
}
