//! Gatekeepers deciding whether hook-observed actions may proceed.
//!
//! Two gates exist: [`edit`] evaluates file edits against the current phase,
//! [`stop`] evaluates termination requests against the work queue. Both
//! resolve to the same [`GateDecision`] shape so hook handlers can translate
//! uniformly into host responses.

pub mod edit;
pub mod stop;

/// Outcome of a gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// The action may proceed.
    Permit,
    /// The action is blocked, with a human-readable reason.
    Block { reason: String },
}

impl GateDecision {
    /// Creates a blocking decision.
    #[must_use]
    pub fn block(reason: impl Into<String>) -> Self {
        Self::Block {
            reason: reason.into(),
        }
    }

    /// Whether the action is permitted.
    #[must_use]
    pub fn is_permit(&self) -> bool {
        matches!(self, Self::Permit)
    }
}
