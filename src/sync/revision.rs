//! Remote revision manifest.
//!
//! The manifest is plain text:
//!
//! ```text
//! 5
//! 1 stm32-ide@r41
//! 2 stm32-ide@r57
//! ...
//! 5 stm32-ide@r102
//! ```
//!
//! The first non-blank line carries the latest revision number. Every
//! following line maps a revision index to a tag; the tag is the part of
//! the second field starting at its last `r`.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::util::hash::{sha256_str, short_hash};

/// Character that starts the revision tag inside a manifest entry.
pub const REVISION_MARKER: char = 'r';

/// A remote revision tag together with its content identifier.
///
/// A session resolves the tag once and derives every URL from it, so the
/// session stays pinned even if the manifest changes while it runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionTag {
    tag: String,
    content_id: String,
}

impl RevisionTag {
    pub fn new(tag: impl Into<String>) -> Self {
        let tag = tag.into();
        let content_id = sha256_str(&tag);
        RevisionTag { tag, content_id }
    }

    pub fn as_str(&self) -> &str {
        &self.tag
    }

    /// SHA-256 of the tag, hex encoded.
    pub fn content_id(&self) -> &str {
        &self.content_id
    }

    pub fn short_id(&self) -> &str {
        short_hash(&self.content_id)
    }
}

impl fmt::Display for RevisionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)
    }
}

/// Whether `tag` is the marker followed by `[A-Za-z0-9_-]+`. Tags end up
/// in local directory names, so nothing else is accepted.
fn is_valid_tag(tag: &str) -> bool {
    tag.strip_prefix(REVISION_MARKER).map_or(false, |rest| {
        !rest.is_empty()
            && rest
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    })
}

/// Malformed manifest.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManifestError {
    #[error("manifest is empty")]
    Empty,

    #[error("invalid latest revision `{0}`")]
    InvalidLatest(String),

    #[error("line {line}: invalid revision entry `{text}`")]
    InvalidEntry { line: usize, text: String },

    #[error("line {line}: no revision marker in `{text}`")]
    MissingMarker { line: usize, text: String },

    #[error("manifest has no entry for latest revision {0}")]
    MissingLatest(usize),
}

/// Revision selection failure.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    #[error("revision {requested} exceeds latest revision {latest} (svn-{latest_tag})")]
    OutOfRange {
        requested: usize,
        latest: usize,
        latest_tag: String,
    },

    #[error("manifest has no entry for revision {0}")]
    Missing(usize),
}

/// Positional map from revision index to tag, valid for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RevisionIndex {
    latest: usize,
    tags: BTreeMap<usize, RevisionTag>,
}

impl RevisionIndex {
    /// Parse a manifest.
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty());

        let (_, first) = lines.next().ok_or(ManifestError::Empty)?;
        let latest_field = first.split_whitespace().next().unwrap_or(first);
        let latest: usize = latest_field
            .parse()
            .map_err(|_| ManifestError::InvalidLatest(first.to_string()))?;

        let mut tags = BTreeMap::new();
        for (line, text) in lines {
            let invalid = || ManifestError::InvalidEntry {
                line,
                text: text.to_string(),
            };

            let mut fields = text.split_whitespace();
            let index: usize = fields.next().and_then(|f| f.parse().ok()).ok_or_else(invalid)?;
            let tag_field = fields.next().ok_or_else(invalid)?;

            let marker = tag_field
                .rfind(REVISION_MARKER)
                .ok_or_else(|| ManifestError::MissingMarker {
                    line,
                    text: text.to_string(),
                })?;

            let tag = &tag_field[marker..];
            if !is_valid_tag(tag) {
                return Err(invalid());
            }
            tags.insert(index, RevisionTag::new(tag));
        }

        if !tags.contains_key(&latest) {
            return Err(ManifestError::MissingLatest(latest));
        }

        Ok(RevisionIndex { latest, tags })
    }

    /// The latest revision number.
    pub fn latest(&self) -> usize {
        self.latest
    }

    pub fn latest_tag(&self) -> &RevisionTag {
        // Presence of the latest entry is checked by `parse`.
        &self.tags[&self.latest]
    }

    pub fn get(&self, index: usize) -> Option<&RevisionTag> {
        self.tags.get(&index)
    }

    /// Entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &RevisionTag)> {
        self.tags.iter().map(|(i, t)| (*i, t))
    }

    /// Resolve a requested revision. `0` selects the latest; anything above
    /// the latest is rejected, never clamped.
    pub fn select(&self, requested: usize) -> Result<(usize, &RevisionTag), SelectError> {
        let index = match requested {
            0 => self.latest,
            n if n > self.latest => {
                return Err(SelectError::OutOfRange {
                    requested,
                    latest: self.latest,
                    latest_tag: self.latest_tag().to_string(),
                })
            }
            n => n,
        };

        self.get(index)
            .map(|tag| (index, tag))
            .ok_or(SelectError::Missing(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = "\n5\n1 ide@r41\n2 ide@r57\n3 ide@r63\n\n4 ide@r88\n5 trunk@r102\n";

    #[test]
    fn test_parse_manifest() {
        let index = RevisionIndex::parse(MANIFEST).unwrap();
        assert_eq!(index.latest(), 5);
        assert_eq!(index.latest_tag().as_str(), "r102");
        assert_eq!(index.get(1).unwrap().as_str(), "r41");
        assert_eq!(index.iter().count(), 5);
    }

    #[test]
    fn test_tag_from_last_marker() {
        let index = RevisionIndex::parse("1\n1 trunk-rc@r7\n").unwrap();
        assert_eq!(index.latest_tag().as_str(), "r7");
    }

    #[test]
    fn test_select_latest() {
        let index = RevisionIndex::parse(MANIFEST).unwrap();
        let (rev, tag) = index.select(0).unwrap();
        assert_eq!(rev, 5);
        assert_eq!(tag.as_str(), "r102");
    }

    #[test]
    fn test_select_specific() {
        let index = RevisionIndex::parse(MANIFEST).unwrap();
        let (rev, tag) = index.select(3).unwrap();
        assert_eq!(rev, 3);
        assert_eq!(tag.as_str(), "r63");
    }

    #[test]
    fn test_select_out_of_range() {
        let index = RevisionIndex::parse(MANIFEST).unwrap();
        let err = index.select(7).unwrap_err();
        assert_eq!(
            err,
            SelectError::OutOfRange {
                requested: 7,
                latest: 5,
                latest_tag: "r102".to_string(),
            }
        );
        assert!(err.to_string().contains("r102"));
    }

    #[test]
    fn test_select_gap() {
        let index = RevisionIndex::parse("3\n1 a@r1\n3 a@r3\n").unwrap();
        assert_eq!(index.select(2).unwrap_err(), SelectError::Missing(2));
    }

    #[test]
    fn test_malformed_manifests() {
        assert_eq!(RevisionIndex::parse("  \n\n"), Err(ManifestError::Empty));
        assert!(matches!(
            RevisionIndex::parse("<html>not found</html>"),
            Err(ManifestError::InvalidLatest(_))
        ));
        assert!(matches!(
            RevisionIndex::parse("2\n1\n"),
            Err(ManifestError::InvalidEntry { line: 2, .. })
        ));
        assert!(matches!(
            RevisionIndex::parse("1\n1 tag@42\n"),
            Err(ManifestError::MissingMarker { .. })
        ));
        assert_eq!(
            RevisionIndex::parse("2\n1 a@r1\n"),
            Err(ManifestError::MissingLatest(2))
        );
    }

    #[test]
    fn test_rejects_tags_unfit_for_paths() {
        for entry in [
            "1 x@r/../../../escape",
            "1 x@r..",
            "1 x@r1.2",
            "1 x@r1\\..\\up",
            "1 x@r",
        ] {
            let manifest = format!("1\n{}\n", entry);
            assert!(
                matches!(
                    RevisionIndex::parse(&manifest),
                    Err(ManifestError::InvalidEntry { line: 2, .. })
                ),
                "accepted {}",
                entry
            );
        }

        let index = RevisionIndex::parse("1\n1 ide@r12_b-1\n").unwrap();
        assert_eq!(index.latest_tag().as_str(), "r12_b-1");
    }

    #[test]
    fn test_content_id_is_stable() {
        let a = RevisionTag::new("r102");
        let b = RevisionTag::new("r102");
        assert_eq!(a.content_id(), b.content_id());
        assert_eq!(a.short_id().len(), 12);
        assert_ne!(a.content_id(), RevisionTag::new("r103").content_id());
    }
}
