//! Keyword extraction from firmware headers.
//!
//! Editors highlight the identifiers a firmware exposes: macros, functions,
//! types and enumerators declared by the board support and peripheral
//! headers. Extraction sits behind [`KeywordExtractor`] so a full C front
//! end can replace the built-in [`RegexExtractor`].

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;

use crate::core::layout::FirmwareLayout;
use crate::util::fs::{files_with_extension, read_lossy};

/// Extracts the identifiers declared by one header.
pub trait KeywordExtractor {
    /// Identifiers declared in `header` itself (not in headers it
    /// includes), excluding parameter names and include directives.
    /// `defines` is the rendered ` -DNAME=VALUE` string.
    fn extract(&self, header: &Path, defines: &str) -> Result<BTreeSet<String>>;
}

/// Run `extractor` over every header and merge the results.
pub fn collect_keywords(
    extractor: &dyn KeywordExtractor,
    headers: &[PathBuf],
    defines: &str,
) -> Result<BTreeSet<String>> {
    let mut keywords = BTreeSet::new();
    for header in headers {
        let found = extractor
            .extract(header, defines)
            .with_context(|| format!("failed to extract keywords from {}", header.display()))?;
        tracing::debug!("{}: {} keywords", header.display(), found.len());
        keywords.extend(found);
    }
    Ok(keywords)
}

/// Headers scanned when none are given: `bsp/*.h`, then `stm_lib/inc/*.h`.
pub fn default_headers(layout: &FirmwareLayout) -> Result<Vec<PathBuf>> {
    let mut headers = files_with_extension(&layout.bsp_dir(), "h")?;
    headers.extend(files_with_extension(&layout.stm_lib_inc_dir(), "h")?);
    Ok(headers)
}

/// Words that look like identifiers to the patterns below but are not
/// declarations.
const C_KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "defined", "do", "double",
    "else", "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef", "union",
    "unsigned", "void", "volatile", "while", "__attribute__", "__asm", "asm",
];

/// Pattern-based extractor for the declaration styles found in vendor
/// peripheral headers.
///
/// It does not evaluate conditional compilation, so `defines` is ignored
/// and declarations from every `#if` branch are reported.
#[derive(Debug, Clone)]
pub struct RegexExtractor {
    block_comment: Regex,
    line_comment: Regex,
    continuation: Regex,
    define: Regex,
    directive: Regex,
    tag: Regex,
    enum_body: Regex,
    aggregate_typedef: Regex,
    typedef: Regex,
    fn_pointer_typedef: Regex,
    function: Regex,
    extern_var: Regex,
}

impl RegexExtractor {
    pub fn new() -> Result<Self> {
        let re = |pattern: &str| {
            Regex::new(pattern).with_context(|| format!("invalid keyword pattern: {}", pattern))
        };

        Ok(RegexExtractor {
            block_comment: re(r"/\*[\s\S]*?\*/")?,
            line_comment: re(r"//[^\n]*")?,
            continuation: re(r"\\\r?\n")?,
            define: re(r"(?m)^[ \t]*#[ \t]*define[ \t]+(\w+)")?,
            directive: re(r"(?m)^[ \t]*#[^\n]*")?,
            tag: re(r"\b(?:struct|enum|union)\s+(\w+)")?,
            enum_body: re(r"\benum\b\s*\w*\s*\{([^}]*)\}")?,
            aggregate_typedef: re(r"\}\s*(\w+)\s*;")?,
            typedef: re(r"\btypedef\s+[\w\s*]+?[\s*](\w+)\s*;")?,
            fn_pointer_typedef: re(r"\btypedef\s[^;{}()]*\(\s*\*\s*(\w+)\s*\)")?,
            function: re(r"\b\w+[\s*]+(\w+)\s*\(")?,
            extern_var: re(r"\bextern\s+[\w\s*]+?[\s*](\w+)\s*(?:\[[^\]]*\])?\s*;")?,
        })
    }

    /// Identifiers declared in a header's text.
    pub fn extract_from_str(&self, text: &str) -> BTreeSet<String> {
        let text = self.block_comment.replace_all(text, " ");
        let text = self.line_comment.replace_all(&text, " ");
        let text = self.continuation.replace_all(&text, " ");

        let mut names: Vec<&str> = Vec::new();
        names.extend(captures(&self.define, &text));

        // Directive bodies (include targets, macro expansions) are not
        // declarations.
        let code = self.directive.replace_all(&text, " ");

        names.extend(captures(&self.tag, &code));
        names.extend(captures(&self.aggregate_typedef, &code));
        names.extend(captures(&self.typedef, &code));
        names.extend(captures(&self.fn_pointer_typedef, &code));
        names.extend(captures(&self.function, &code));
        names.extend(captures(&self.extern_var, &code));

        for body in captures(&self.enum_body, &code) {
            names.extend(
                body.split(',')
                    .filter_map(|item| item.split('=').next())
                    .map(str::trim),
            );
        }

        names
            .into_iter()
            .filter(|name| is_identifier(name) && !C_KEYWORDS.contains(name))
            .map(str::to_string)
            .collect()
    }
}

impl KeywordExtractor for RegexExtractor {
    fn extract(&self, header: &Path, _defines: &str) -> Result<BTreeSet<String>> {
        let text = read_lossy(header)
            .with_context(|| format!("failed to read header: {}", header.display()))?;
        Ok(self.extract_from_str(&text))
    }
}

fn captures<'t>(re: &Regex, text: &'t str) -> Vec<&'t str> {
    re.captures_iter(text)
        .filter_map(|cap| cap.get(1).map(|m| m.as_str()))
        .collect()
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
