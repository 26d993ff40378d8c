//! Filesystem layout of the `.agents/` workflow area and project-root
//! resolution.
//!
//! All workflow files live under a reserved `.agents/` directory in the
//! project root:
//!
//! ```text
//! .agents/
//!   ├── workflow.json     persisted workflow state
//!   ├── todos/todo.md     active work queue (In Progress / Up Next)
//!   ├── archive/done.md   completion archive (one ### heading per slug)
//!   └── work/queued.md    legacy flat queue (earlier variant)
//! ```
//!
//! Hooks do not always receive a project root. When a transcript path is
//! available the root is derived from it (two directory levels up); otherwise
//! an explicit, ordered candidate list is searched for a readable state file.
//! The list is fixed rather than environment-derived so tests stay
//! deterministic.

use std::path::{Path, PathBuf};

/// Name of the reserved workflow directory under the project root.
pub const AGENTS_DIR: &str = ".agents";

/// Paths to the workflow files for one project.
#[derive(Debug, Clone)]
pub struct AgentsLayout {
    root: PathBuf,
}

impl AgentsLayout {
    /// Creates a layout rooted at the given project directory.
    #[must_use]
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// The project root this layout is anchored at.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `.agents/` directory.
    #[must_use]
    pub fn agents_dir(&self) -> PathBuf {
        self.root.join(AGENTS_DIR)
    }

    /// Persisted workflow state document.
    #[must_use]
    pub fn workflow_file(&self) -> PathBuf {
        self.agents_dir().join("workflow.json")
    }

    /// Active todo document.
    #[must_use]
    pub fn todo_file(&self) -> PathBuf {
        self.agents_dir().join("todos").join("todo.md")
    }

    /// Completion archive document.
    #[must_use]
    pub fn archive_file(&self) -> PathBuf {
        self.agents_dir().join("archive").join("done.md")
    }

    /// Legacy flat queue document (earlier variant).
    #[must_use]
    pub fn queued_file(&self) -> PathBuf {
        self.agents_dir().join("work").join("queued.md")
    }

    /// Whether a workflow state document exists for this project.
    #[must_use]
    pub fn has_state(&self) -> bool {
        self.workflow_file().is_file()
    }
}

/// Checks whether a file path lies inside the reserved `.agents/` area.
///
/// Edits there are always permitted regardless of phase. Both separator
/// styles are honored since the host may report Windows paths.
#[must_use]
pub fn is_reserved_path(file_path: &str) -> bool {
    file_path.contains(".agents/") || file_path.contains(".agents\\")
}

/// Derives a project root from a transcript path.
///
/// Transcripts live two directory levels below the project root, so the root
/// is the transcript's grandparent directory.
#[must_use]
pub fn root_from_transcript(transcript_path: &str) -> Option<PathBuf> {
    let path = Path::new(transcript_path);
    path.parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
        .filter(|p| !p.as_os_str().is_empty())
}

/// The fixed, ordered list of directories searched when no root is supplied.
#[must_use]
pub fn default_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd);
    }
    if let Some(home) = dirs::home_dir() {
        candidates.push(home);
    }
    candidates
}

/// Returns the first candidate directory holding a readable workflow state
/// file, or `None` if no candidate does.
#[must_use]
pub fn find_workflow_root(candidates: &[PathBuf]) -> Option<AgentsLayout> {
    candidates
        .iter()
        .map(AgentsLayout::new)
        .find(AgentsLayout::has_state)
}

/// Resolves the project root for a hook invocation.
///
/// Priority: explicit override, then the transcript-derived root, then the
/// first candidate directory holding a readable state file, then the first
/// candidate outright (the working directory).
#[must_use]
pub fn resolve_project_root(
    explicit: Option<&Path>,
    transcript_path: Option<&str>,
) -> Option<PathBuf> {
    resolve_root_from(explicit, transcript_path, &default_candidates())
}

/// [`resolve_project_root`] over an explicit candidate list.
#[must_use]
pub fn resolve_root_from(
    explicit: Option<&Path>,
    transcript_path: Option<&str>,
    candidates: &[PathBuf],
) -> Option<PathBuf> {
    if let Some(root) = explicit {
        return Some(root.to_path_buf());
    }
    if let Some(root) = transcript_path.and_then(root_from_transcript) {
        return Some(root);
    }
    if let Some(layout) = find_workflow_root(candidates) {
        return Some(layout.root().to_path_buf());
    }
    candidates.first().cloned()
}
