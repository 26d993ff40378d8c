//! Phasegate - phase-gated TDD workflow hooks for autonomous coding agents.
//!
//! Phasegate enforces a disciplined development loop (research -> red ->
//! green -> refactor -> architecture) over an agent session and keeps the
//! agent working while its queue holds outstanding items. State lives in a
//! single JSON document under `.agents/`, reconciled on every event against
//! the human-editable todo and archive markdown files.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`state`] / [`store`] - the persisted workflow state and its
//!   atomic-write store
//! - [`todo`] - parser for the todo and legacy queue documents
//! - [`archive`] - membership tests against the completion archive
//! - [`sync`] - reconciliation of state with the todo document
//! - [`phase`] - phase transitions inferred from commit messages
//! - [`gate`] - the edit and stop gatekeepers
//! - [`hooks`] - typed event contracts and dispatch
//! - [`paths`] - `.agents/` layout and project-root resolution
//!
//! # Example
//!
//! ```rust,ignore
//! use phasegate::hooks::{dispatch, DispatchOptions, HookEvent, HookKind};
//!
//! let event = HookEvent::from_json(HookKind::Stop, &raw_payload)?;
//! let response = dispatch(event, &DispatchOptions::default());
//! println!("{}", serde_json::to_string(&response)?);
//! ```

pub mod archive;
pub mod error;
pub mod gate;
pub mod hooks;
pub mod paths;
pub mod phase;
pub mod state;
pub mod store;
pub mod sync;
pub mod todo;

// Re-export commonly used types
pub use error::{PhasegateError, Result};

pub use archive::ArchiveIndex;
pub use gate::stop::{StopGatekeeper, StopMode};
pub use gate::GateDecision;
pub use hooks::{dispatch, DispatchOptions, HookEvent, HookKind, HookResponse};
pub use paths::AgentsLayout;
pub use state::{Phase, WorkflowState, WorkflowStats, WORKFLOW_STATE_VERSION};
pub use store::StateStore;
pub use sync::Synchronizer;
pub use todo::{TodoItem, TodoStatus};
