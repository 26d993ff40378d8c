//! Phase transitions inferred from observed shell commands.
//!
//! The agent signals progress through conventional-commit messages. This
//! engine scrapes the quoted message out of a `git commit -m` invocation and
//! maps its leading tag onto the TDD cycle:
//!
//! | tag                                   | phase          |
//! |---------------------------------------|----------------|
//! | `test(...)`                           | red            |
//! | `feat(...)`                           | green          |
//! | `refactor(...)`                       | refactor       |
//! | `docs(...)` + "update architecture"   | architecture   |
//!
//! An architecture commit additionally finishes the active work item: its
//! slug goes into the advisory completed cache and the state returns to
//! idle. Completion truth for gating stays with the archive (see
//! [`crate::archive`]); the cache only feeds stats and status display.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::state::{Phase, WorkflowState};

/// Quoted message argument of a commit invocation. Both quote styles occur
/// in transcripts, and `-m` may be folded into a flag cluster like `-am`.
static COMMIT_MESSAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"git\s+commit\b[^|;&]*?(?:--message|-[a-zA-Z]*m)[ =]+(?:"([^"]*)"|'([^']*)')"#)
        .expect("valid commit message regex")
});

/// Leading conventional-commit tag with scope: `type(scope): subject`.
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([a-z]+)\([^)]*\)\s*:?").expect("valid tag regex"));

/// Extracts the commit message from a shell command string, if it is a
/// commit-with-message invocation.
#[must_use]
pub fn extract_commit_message(command: &str) -> Option<String> {
    let caps = COMMIT_MESSAGE_RE.captures(command)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str().to_string())
}

/// Phase implied by a commit message's leading tag, if recognized.
#[must_use]
pub fn classify_message(message: &str) -> Option<Phase> {
    let caps = TAG_RE.captures(message)?;
    match &caps[1] {
        "test" => Some(Phase::Red),
        "feat" => Some(Phase::Green),
        "refactor" => Some(Phase::Refactor),
        "docs" if message.contains("update architecture") => Some(Phase::Architecture),
        _ => None,
    }
}

/// Feeds one observed shell command into the engine.
///
/// Returns `true` when the state was touched and must be persisted. A
/// command that is not a commit-with-message invocation is a no-op; a commit
/// with an unrecognized tag still refreshes the timestamp and reports
/// `true`.
pub fn observe_command(state: &mut WorkflowState, command: &str) -> bool {
    let Some(message) = extract_commit_message(command) else {
        return false;
    };

    if let Some(phase) = classify_message(&message) {
        debug!("Commit tag moves workflow to phase '{}'", phase);
        state.current_phase = Some(phase);
        if phase == Phase::Architecture {
            if let Some(slug) = state.complete_active_item() {
                debug!("Work item '{}' finished with architecture commit", slug);
            }
        }
    }

    state.touch();
    true
}
