//! Parser for the todo and legacy queue documents.
//!
//! The todo document (`.agents/todos/todo.md`) is human-editable markdown
//! with `##` section headers and checkbox item lines:
//!
//! ```markdown
//! ## In Progress
//! - [ ] **add-login** -- wire up the login form
//!
//! ## Up Next
//! - [ ] **add-logout** -- and tear it down again
//! ```
//!
//! Parsing is a line-oriented scan with an explicit grammar (section header,
//! item line) so malformed-input behavior is auditable: unmatched lines are
//! ignored, unknown headers end the current section, and a missing or
//! headerless document yields no items.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

/// Status of a todo item, derived from its originating section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodoStatus {
    /// Item in the `In Progress` section
    InProgress,
    /// Item in the `Up Next` section
    UpNext,
    /// Item in the legacy `Completed` section; superseded by the archive
    Completed,
}

/// One work item scraped from the todo document.
///
/// Ephemeral: re-derived on every synchronization pass, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoItem {
    /// Human-assigned identifier, unique within the active sections.
    pub slug: String,
    pub status: TodoStatus,
    /// Free-text description following the slug, possibly empty.
    pub description: String,
    /// Name of the section the item came from.
    pub section: String,
}

/// `##` section header line.
static SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^##\s+(.+?)\s*$").expect("valid section regex"));

/// Item line: checkbox marker, bold slug, optional separator, description.
/// The first bold span wins; slugs with embedded emphasis are unsupported.
static ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-*]\s*)?\[[ xX]\]\s*\*\*([^*]+)\*\*\s*(?:(?:--|—|–|-|:)\s*)?(.*)$")
        .expect("valid item regex")
});

/// Legacy queue line: `- **slug** -- description`.
static QUEUED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^- \*\*([^*]+)\*\*").expect("valid queue regex"));

fn section_status(name: &str) -> Option<TodoStatus> {
    let lowered = name.trim().to_ascii_lowercase();
    match lowered.as_str() {
        "in progress" => Some(TodoStatus::InProgress),
        "up next" => Some(TodoStatus::UpNext),
        "completed" => Some(TodoStatus::Completed),
        _ => None,
    }
}

/// Parses a todo document into items, in document order.
///
/// Items in unrecognized sections (or before the first header) are ignored.
/// Duplicate slugs across sections are preserved as separate items; callers
/// must tolerate them.
#[must_use]
pub fn parse_todo_document(text: &str) -> Vec<TodoItem> {
    let mut items = Vec::new();
    let mut current: Option<(String, TodoStatus)> = None;

    for line in text.lines() {
        if let Some(caps) = SECTION_RE.captures(line) {
            let name = caps[1].trim().to_string();
            current = section_status(&name).map(|status| (name, status));
            continue;
        }
        let Some((section, status)) = &current else {
            continue;
        };
        if let Some(caps) = ITEM_RE.captures(line) {
            items.push(TodoItem {
                slug: caps[1].trim().to_string(),
                status: *status,
                description: caps[2].trim().to_string(),
                section: section.clone(),
            });
        }
    }

    items
}

/// Reads and parses the todo document at `path`.
///
/// An absent or unreadable file yields an empty sequence, not an error.
#[must_use]
pub fn read_todo_file(path: &Path) -> Vec<TodoItem> {
    match std::fs::read_to_string(path) {
        Ok(text) => parse_todo_document(&text),
        Err(_) => Vec::new(),
    }
}

/// Extracts the first queued slug from legacy `queued.md` text.
#[must_use]
pub fn first_queued_item(text: &str) -> Option<String> {
    QUEUED_RE
        .captures(text)
        .map(|caps| caps[1].trim().to_string())
}

/// Reads the legacy queue document and returns its first slug, if any.
#[must_use]
pub fn read_queued_file(path: &Path) -> Option<String> {
    let text = std::fs::read_to_string(path).ok()?;
    first_queued_item(&text)
}
