//! Recursive listing of a remote tree.
//!
//! The remote serves one HTML-like index page per folder. Every entry is a
//! line of the form `<li><a href="name">name</a></li>`; folder names end
//! with `/`.

use url::Url;

use crate::sync::remote::Remote;

/// Prefix that introduces a listing entry.
pub const HREF_PREFIX: &str = "<li><a href=\"";

/// One entry of a folder listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListingEntry {
    File(String),
    Folder(String),
}

/// Parse a folder listing page.
///
/// Entries whose name does not start with an ASCII letter (parent links,
/// hidden files, absolute links) are skipped, as are names carrying a
/// scheme, query or fragment.
pub fn parse_listing(page: &str) -> Vec<ListingEntry> {
    page.lines()
        .filter_map(|line| {
            let start = line.find(HREF_PREFIX)? + HREF_PREFIX.len();
            let rest = &line[start..];
            let name = &rest[..rest.find("\">")?];

            let first = name.chars().next()?;
            if !first.is_ascii_alphabetic() || name.contains([':', '?', '#']) {
                return None;
            }

            if name.ends_with('/') {
                Some(ListingEntry::Folder(name.to_string()))
            } else {
                Some(ListingEntry::File(name.to_string()))
            }
        })
        .collect()
}

/// Files discovered below one tree root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteFileList {
    /// Absolute file URLs, in discovery order
    pub files: Vec<Url>,
    /// Folders whose listing could not be fetched or followed
    pub failed_folders: Vec<Url>,
}

impl RemoteFileList {
    /// Number of download attempts this listing stands for. An unreadable
    /// folder counts as one failed attempt so it can never go unnoticed.
    pub fn attempted(&self) -> usize {
        self.files.len() + self.failed_folders.len()
    }
}

/// Recursively list every file below `root` (which must end with `/`).
pub fn list_tree(remote: &dyn Remote, root: &Url, max_depth: usize) -> RemoteFileList {
    let mut list = RemoteFileList::default();
    browse(remote, root, 0, max_depth, &mut list);
    list
}

fn browse(remote: &dyn Remote, url: &Url, depth: usize, max_depth: usize, list: &mut RemoteFileList) {
    if depth > max_depth {
        tracing::warn!("not following {}: deeper than {} folders", url, max_depth);
        list.failed_folders.push(url.clone());
        return;
    }

    let page = match remote.fetch_text(url) {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!("unable to open {}: {}", url, e);
            list.failed_folders.push(url.clone());
            return;
        }
    };

    for entry in parse_listing(&page) {
        let name = match &entry {
            ListingEntry::File(name) | ListingEntry::Folder(name) => name,
        };
        let child = match url.join(name) {
            Ok(child) => child,
            Err(e) => {
                tracing::warn!("skipping `{}` in {}: {}", name, url, e);
                continue;
            }
        };

        match entry {
            ListingEntry::Folder(_) => browse(remote, &child, depth + 1, max_depth, list),
            ListingEntry::File(_) => list.files.push(child),
        }
    }
}
