//! Membership tests against the completion archive.
//!
//! The archive (`.agents/archive/done.md`) is owned by a separate archival
//! process; this core only reads it. A work item is done iff a level-3
//! heading whose text is exactly the slug appears anywhere in the document.
//! Archival is one-way: once a slug is recorded there it is permanently
//! done.
//!
//! The index is a pure membership test with no caching. The archive may be
//! mutated externally at any moment, so every check re-reads the file.

use std::path::{Path, PathBuf};

/// Read-only view of the completion archive for one project.
#[derive(Debug, Clone)]
pub struct ArchiveIndex {
    path: PathBuf,
}

impl ArchiveIndex {
    /// Creates an index over the archive document at `path`.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Whether `slug` has been archived. Absent file is always false.
    #[must_use]
    pub fn contains(&self, slug: &str) -> bool {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => archive_contains(&text, slug),
            Err(_) => false,
        }
    }
}

/// Whether archive text records `slug` as a `###` heading.
///
/// The match is exact after trimming; substrings and deeper headings do not
/// count.
#[must_use]
pub fn archive_contains(text: &str, slug: &str) -> bool {
    let target = slug.trim();
    if target.is_empty() {
        return false;
    }
    text.lines().any(|line| {
        let Some(rest) = line.trim_start().strip_prefix("###") else {
            return false;
        };
        // "####" is a level-4 heading, not an archive entry.
        !rest.starts_with('#') && rest.trim() == target
    })
}
