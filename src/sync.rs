//! Reconciliation of persisted state with the todo document.
//!
//! Runs on every stop-gating check and subagent-stop notification, so the
//! pass must be idempotent: with an unchanged todo document, consecutive
//! passes differ only in the refreshed timestamp.
//!
//! Completion is authoritative via the archive, never via the todo
//! document's own legacy `Completed` section; items found there are counted
//! for the advisory stats but drive no other behavior.

use tracing::debug;

use crate::paths::AgentsLayout;
use crate::state::WorkflowState;
use crate::todo::{self, TodoItem, TodoStatus};

/// Synchronizes a [`WorkflowState`] against a project's todo document.
#[derive(Debug)]
pub struct Synchronizer<'a> {
    layout: &'a AgentsLayout,
}

impl<'a> Synchronizer<'a> {
    /// Creates a synchronizer for the given project layout.
    #[must_use]
    pub fn new(layout: &'a AgentsLayout) -> Self {
        Self { layout }
    }

    /// Runs one pass, returning the parsed todo items for reuse by the
    /// caller.
    pub fn run(&self, state: &mut WorkflowState) -> Vec<TodoItem> {
        let items = todo::read_todo_file(&self.layout.todo_file());
        synchronize(state, &items);
        items
    }
}

/// Brings `state` up to date with the parsed todo items.
///
/// If no work item is active, the first `in-progress` item in document order
/// is adopted (first wins when the document holds more than one). An
/// already-active item is never replaced by this pass. `last_updated` is
/// always refreshed.
pub fn synchronize(state: &mut WorkflowState, items: &[TodoItem]) {
    if state.is_idle() {
        if let Some(item) = items
            .iter()
            .find(|item| item.status == TodoStatus::InProgress)
        {
            debug!("Adopting in-progress work item '{}'", item.slug);
            state.begin_item(item.slug.clone());
        }
    }

    refresh_stats(state, items);
    state.touch();
}

/// Recomputes the advisory counters from the todo items and the completed
/// cache. Test counters are owned elsewhere and left untouched.
fn refresh_stats(state: &mut WorkflowState, items: &[TodoItem]) {
    let active = items
        .iter()
        .filter(|item| item.status != TodoStatus::Completed)
        .count() as u32;
    let completed = state.completed_items.len() as u32;
    state.stats.total_items = active + completed;
    state.stats.completed_items = completed;
}
