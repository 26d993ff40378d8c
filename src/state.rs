//! Workflow state model.
//!
//! One [`WorkflowState`] document exists per project, persisted as JSON under
//! `.agents/workflow.json`. It is the sole source of truth across hook
//! invocations; nothing is held in memory between events.
//!
//! # Invariants
//!
//! - At most one work item is active at a time.
//! - `current_phase` is meaningful only while `current_work_item` is set; an
//!   idle state has both unset.
//! - `completed_items` is an advisory cache. The completion archive owns the
//!   authoritative "done" facts (see [`crate::archive`]).
//!
//! Field names serialize in camelCase to stay compatible with the on-disk
//! format written by earlier tooling.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current schema version for the workflow state document.
pub const WORKFLOW_STATE_VERSION: &str = "2";

/// One stage of the fixed test-driven development cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Investigate before writing anything
    Research,
    /// Write failing tests
    Red,
    /// Make the tests pass
    Green,
    /// Clean up with tests green
    Refactor,
    /// Update design docs and finalize the item
    Architecture,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Research => write!(f, "research"),
            Phase::Red => write!(f, "red"),
            Phase::Green => write!(f, "green"),
            Phase::Refactor => write!(f, "refactor"),
            Phase::Architecture => write!(f, "architecture"),
        }
    }
}

/// Aggregate counters carried in the state document.
///
/// Advisory only: nothing in the gating logic reads these.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkflowStats {
    pub total_items: u32,
    pub completed_items: u32,
    pub total_tests: u32,
    pub passing_tests: u32,
}

/// Persisted workflow state for one project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowState {
    /// Schema version tag.
    pub version: String,
    /// Active phase, unset while idle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_phase: Option<Phase>,
    /// Slug of the work item in progress, unset while idle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_work_item: Option<String>,
    /// When the active work item was adopted; cleared with it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_item_started_at: Option<DateTime<Utc>>,
    /// Slug the agent must not stop before completing, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_until: Option<String>,
    /// Advisory cache of slugs known to be finished.
    #[serde(default)]
    pub completed_items: BTreeSet<String>,
    /// Advisory counters.
    #[serde(default)]
    pub stats: WorkflowStats,
    /// Refreshed on every synchronization pass.
    pub last_updated: DateTime<Utc>,
}

impl WorkflowState {
    /// Creates a fresh idle state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: WORKFLOW_STATE_VERSION.to_string(),
            current_phase: None,
            current_work_item: None,
            work_item_started_at: None,
            work_until: None,
            completed_items: BTreeSet::new(),
            stats: WorkflowStats::default(),
            last_updated: Utc::now(),
        }
    }

    /// Whether no work item is active.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.current_work_item.is_none()
    }

    /// Adopts a work item as active and stamps its start time.
    ///
    /// A no-op when an item is already active: only the transition engine or
    /// an external archival action may clear one.
    pub fn begin_item(&mut self, slug: impl Into<String>) {
        if self.current_work_item.is_some() {
            return;
        }
        self.current_work_item = Some(slug.into());
        self.work_item_started_at = Some(Utc::now());
    }

    /// Finishes the active work item, returning its slug.
    ///
    /// The slug is recorded in the advisory `completed_items` cache, the
    /// active item and its start time are cleared, and the phase returns to
    /// idle.
    pub fn complete_active_item(&mut self) -> Option<String> {
        let slug = self.current_work_item.take()?;
        self.work_item_started_at = None;
        self.current_phase = None;
        self.completed_items.insert(slug.clone());
        Some(slug)
    }

    /// Refreshes the last-updated timestamp.
    pub fn touch(&mut self) {
        self.last_updated = Utc::now();
    }
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_idle() {
        let state = WorkflowState::new();
        assert!(state.is_idle());
        assert!(state.current_phase.is_none());
        assert!(state.work_until.is_none());
        assert_eq!(state.version, WORKFLOW_STATE_VERSION);
    }

    #[test]
    fn test_begin_item_sets_start_time() {
        let mut state = WorkflowState::new();
        state.begin_item("add-login");
        assert_eq!(state.current_work_item.as_deref(), Some("add-login"));
        assert!(state.work_item_started_at.is_some());
    }

    #[test]
    fn test_begin_item_never_overwrites_active_item() {
        let mut state = WorkflowState::new();
        state.begin_item("first");
        let started = state.work_item_started_at;
        state.begin_item("second");
        assert_eq!(state.current_work_item.as_deref(), Some("first"));
        assert_eq!(state.work_item_started_at, started);
    }

    #[test]
    fn test_complete_active_item_clears_and_records() {
        let mut state = WorkflowState::new();
        state.begin_item("add-login");
        state.current_phase = Some(Phase::Architecture);

        let finished = state.complete_active_item();
        assert_eq!(finished.as_deref(), Some("add-login"));
        assert!(state.is_idle());
        assert!(state.current_phase.is_none());
        assert!(state.work_item_started_at.is_none());
        assert!(state.completed_items.contains("add-login"));
    }

    #[test]
    fn test_complete_active_item_idle_is_noop() {
        let mut state = WorkflowState::new();
        assert!(state.complete_active_item().is_none());
        assert!(state.completed_items.is_empty());
    }

    #[test]
    fn test_phase_serializes_lowercase() {
        let json = serde_json::to_string(&Phase::Architecture).unwrap();
        assert_eq!(json, "\"architecture\"");
        let phase: Phase = serde_json::from_str("\"red\"").unwrap();
        assert_eq!(phase, Phase::Red);
    }

    #[test]
    fn test_state_serializes_camel_case() {
        let mut state = WorkflowState::new();
        state.begin_item("add-login");
        state.current_phase = Some(Phase::Green);
        state.work_until = Some("ship-it".to_string());

        let json = serde_json::to_string_pretty(&state).unwrap();
        assert!(json.contains("\"currentWorkItem\""));
        assert!(json.contains("\"workItemStartedAt\""));
        assert!(json.contains("\"workUntil\""));
        assert!(json.contains("\"lastUpdated\""));
        assert!(json.contains("\"completedItems\""));
    }

    #[test]
    fn test_state_tolerates_sparse_document() {
        // Older documents may carry only a version and timestamp.
        let json = r#"{"version": "1", "lastUpdated": "2024-01-01T00:00:00Z"}"#;
        let state: WorkflowState = serde_json::from_str(json).unwrap();
        assert!(state.is_idle());
        assert!(state.completed_items.is_empty());
        assert_eq!(state.stats, WorkflowStats::default());
    }
}
