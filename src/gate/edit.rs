//! Phase-based gating of file edits.
//!
//! A small state machine over the current phase:
//!
//! - `.agents/` paths always pass (the workflow's own files must stay
//!   editable in any phase).
//! - Idle passes everything.
//! - `red` permits only test files.
//! - `green` blocks test files; tests define the spec and are immutable
//!   once the implementation phase starts.
//! - Every other phase passes everything.
//!
//! Only edit/write-class tools are examined; all other tool kinds pass
//! through unevaluated.

use crate::gate::GateDecision;
use crate::paths::is_reserved_path;
use crate::state::Phase;

/// Tool names treated as edit/write-class operations.
const EDIT_TOOLS: &[&str] = &["Edit", "Write", "MultiEdit", "NotebookEdit"];

/// Whether a tool name is an edit/write-class operation.
#[must_use]
pub fn is_edit_tool(tool_name: &str) -> bool {
    EDIT_TOOLS.contains(&tool_name)
}

/// Whether a path looks like a test file: a `.test.` / `.spec.` marker or a
/// conventional test-directory segment.
#[must_use]
pub fn is_test_path(file_path: &str) -> bool {
    file_path.contains(".test.")
        || file_path.contains(".spec.")
        || file_path.contains("__tests__")
        || file_path.contains("/tests/")
        || file_path.contains("\\tests\\")
        || file_path.starts_with("tests/")
}

/// Decides whether an edit of `file_path` is permitted in `phase`.
#[must_use]
pub fn check_edit(phase: Option<Phase>, file_path: &str) -> GateDecision {
    if is_reserved_path(file_path) {
        return GateDecision::Permit;
    }

    let Some(phase) = phase else {
        return GateDecision::Permit;
    };

    match phase {
        Phase::Red if !is_test_path(file_path) => GateDecision::block(format!(
            "red phase: only test files can be edited. Current file: {file_path}. \
             Write a failing test instead."
        )),
        Phase::Green if is_test_path(file_path) => GateDecision::block(format!(
            "green phase: test files cannot be modified. Tests define the spec. \
             Current file: {file_path}. Fix implementation code instead."
        )),
        _ => GateDecision::Permit,
    }
}
