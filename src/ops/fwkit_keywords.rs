//! Implementation of `fwkit keywords`.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::Result;

use crate::keywords::{collect_keywords, default_headers, RegexExtractor};
use crate::util::GlobalContext;

/// Extract keywords from `headers`, or from the default core headers when
/// the list is empty.
pub fn extract_keywords(ctx: &GlobalContext, headers: &[PathBuf]) -> Result<BTreeSet<String>> {
    let headers = if headers.is_empty() {
        default_headers(&ctx.layout())?
    } else {
        headers.to_vec()
    };

    tracing::debug!("extracting keywords from {} headers", headers.len());
    let extractor = RegexExtractor::new()?;
    collect_keywords(&extractor, &headers, &ctx.config().compiler_defines())
}
