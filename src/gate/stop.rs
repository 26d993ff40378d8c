//! Gating of termination requests against the work queue.
//!
//! A stop check begins with a synchronization pass (creating a default idle
//! state lazily when none exists) and a best-effort persist, so the state
//! document reflects reality even when the decision is a permit. The one
//! exception is the legacy queued.md path: while neither state nor todo
//! document exists, the queue alone governs and nothing is created.
//!
//! The gate itself turns on the work-until target: if one is set, the agent
//! may stop only once the archive records the target as done, or while it
//! sits idle without the target in hand. A target confirmed done clears
//! itself; the gate is a one-shot condition.
//!
//! Completion truth comes from the archive document, never from the state's
//! own advisory cache. The external archiver performs a multi-step,
//! non-atomic move (todo edit, archive append), and deferring to its final
//! artifact keeps this engine from racing that bookkeeping.

use tracing::warn;

use crate::archive::ArchiveIndex;
use crate::gate::GateDecision;
use crate::paths::AgentsLayout;
use crate::state::WorkflowState;
use crate::store::StateStore;
use crate::sync::Synchronizer;
use crate::todo;

/// How a stop event is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopMode {
    /// Synchronize, then gate the termination request.
    Gate,
    /// Synchronize only; the request is always permitted.
    SyncOnly,
}

/// Evaluates termination requests for one project.
#[derive(Debug)]
pub struct StopGatekeeper<'a> {
    layout: &'a AgentsLayout,
    mode: StopMode,
}

impl<'a> StopGatekeeper<'a> {
    /// Creates a gatekeeper for the given project layout and mode.
    #[must_use]
    pub fn new(layout: &'a AgentsLayout, mode: StopMode) -> Self {
        Self { layout, mode }
    }

    /// Runs the synchronization pass and decides the stop request.
    ///
    /// Persistence is best-effort: a failed save is logged and the decision
    /// stands.
    pub fn check(&self) -> GateDecision {
        let store = StateStore::new(self.layout.clone());

        // Earlier-variant fallback: while neither a state document nor a
        // todo document exists, a populated queued.md governs. No state is
        // created on this path, so the queue keeps holding the agent on
        // every stop until it drains.
        if self.mode == StopMode::Gate
            && !store.exists()
            && !self.layout.todo_file().exists()
        {
            if let Some(slug) = todo::read_queued_file(&self.layout.queued_file()) {
                return GateDecision::block(format!(
                    "Queue has items. Next: \"{slug}\". Continue the workflow. \
                     Do not ask the user."
                ));
            }
        }

        let mut state = match store.load() {
            Ok(Some(state)) => state,
            Ok(None) => WorkflowState::new(),
            Err(e) => {
                warn!("Failed to read workflow state: {}. Permitting stop.", e);
                return GateDecision::Permit;
            }
        };

        Synchronizer::new(self.layout).run(&mut state);

        let decision = match self.mode {
            StopMode::SyncOnly => GateDecision::Permit,
            StopMode::Gate => self.gate(&mut state),
        };

        if let Err(e) = store.save(&state) {
            warn!("Failed to persist workflow state: {}", e);
        }

        decision
    }

    fn gate(&self, state: &mut WorkflowState) -> GateDecision {
        let Some(target) = state.work_until.clone() else {
            return GateDecision::Permit;
        };

        let target_done = ArchiveIndex::new(self.layout.archive_file()).contains(&target);
        let on_target = state.current_work_item.as_deref() == Some(target.as_str());

        if target_done {
            // One-shot: the satisfied gate clears itself.
            state.work_until = None;
            return GateDecision::Permit;
        }

        if state.current_work_item.is_none() && !on_target {
            return GateDecision::Permit;
        }

        let mut reason = format!("Work-until target \"{target}\" is not complete.");
        if let Some(item) = &state.current_work_item {
            reason.push_str(&format!(" Active item: \"{item}\""));
            if let Some(phase) = state.current_phase {
                reason.push_str(&format!(" ({phase} phase)"));
            }
            reason.push('.');
        }
        reason.push_str(" Resume working. Do not ask the user for guidance.");
        GateDecision::block(reason)
    }
}
