//! `#include` directive recognition.
//!
//! This is deliberately narrow textual matching, not a preprocessor: no
//! macro expansion, no line continuations, no conditional compilation.
//! The one-header-per-library convention is what makes it sufficient.

/// How the header token was delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    /// `#include "header.h"`
    Quote,
    /// `#include <header.h>`
    Angle,
}

/// A recognized include line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeDirective {
    /// Header token between the delimiters, e.g. `Motor.h` or `Motor/Motor.h`
    pub header: String,
    pub delimiter: Delimiter,
}

impl IncludeDirective {
    /// Parse one source line. Returns `None` for anything that is not a
    /// well-formed include directive.
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.trim().strip_prefix('#')?.trim_start_matches(' ');
        let rest = rest.strip_prefix("include")?.trim();

        let (delimiter, close) = match rest.chars().next()? {
            '"' => (Delimiter::Quote, '"'),
            '<' => (Delimiter::Angle, '>'),
            _ => return None,
        };

        let body = &rest[1..];
        let end = body.find(close)?;
        let trailing = body[end + 1..].trim();
        if !(trailing.is_empty() || trailing.starts_with("//") || trailing.starts_with("/*")) {
            return None;
        }

        let header = body[..end].trim();
        if header.is_empty() {
            return None;
        }

        Some(IncludeDirective {
            header: header.to_string(),
            delimiter,
        })
    }

    /// Final path segment of the header token (`Motor/Motor.h` -> `Motor.h`).
    pub fn file_name(&self) -> &str {
        self.header.rsplit('/').next().unwrap_or(&self.header)
    }

    /// Library named by this directive, if it follows the library convention.
    ///
    /// Only quoted includes name libraries. `Name.ext` and `Name/Name.ext`
    /// both name library `Name`; any other shape does not.
    pub fn library_name(&self) -> Option<&str> {
        if self.delimiter != Delimiter::Quote {
            return None;
        }

        let (stem, ext) = self.file_name().rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }

        let segments: Vec<&str> = self.header.split('/').collect();
        match segments.as_slice() {
            [_] => Some(stem),
            [folder, _] if *folder == stem => Some(stem),
            _ => None,
        }
    }
}

/// All include directives of a source text, in line order.
pub fn scan(text: &str) -> impl Iterator<Item = IncludeDirective> + '_ {
    text.lines().filter_map(IncludeDirective::parse)
}
