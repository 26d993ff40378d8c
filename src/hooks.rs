//! Typed hook event contracts and dispatch.
//!
//! The host delivers one JSON payload per event. Events form a closed tagged
//! set with one handler each, dispatched by exhaustive match rather than
//! runtime field sniffing. Every handler is stateless across calls except
//! via the filesystem, and none of them can fail the host: an internal
//! fault degrades to the neutral response for that event kind.

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::error::{PhasegateError, Result};
use crate::gate::edit::{check_edit, is_edit_tool};
use crate::gate::stop::{StopGatekeeper, StopMode};
use crate::gate::GateDecision;
use crate::paths::{self, AgentsLayout};
use crate::phase;
use crate::store::StateStore;

/// Context string returned on session start.
const SESSION_CONTEXT: &str = "Phasegate TDD workflow active. \
    Phases: research -> red -> green -> refactor -> architecture. \
    Work items live in .agents/todos/todo.md; finished items are archived \
    to .agents/archive/done.md.";

/// Hook kinds accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum HookKind {
    /// Before an edit/write tool runs
    PreToolUse,
    /// After a shell command runs
    PostToolUse,
    /// When the user submits a prompt
    UserPromptSubmit,
    /// At session start
    SessionStart,
    /// When the agent requests to stop
    Stop,
    /// When a subagent requests to stop
    SubagentStop,
}

/// Payload delivered before an edit/write tool executes.
#[derive(Debug, Clone, Deserialize)]
pub struct PreToolUsePayload {
    #[serde(default)]
    pub tool_name: String,
    #[serde(default)]
    pub tool_input: Value,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Payload delivered after a shell-command tool executes.
#[derive(Debug, Clone, Deserialize)]
pub struct PostToolUsePayload {
    #[serde(default)]
    pub tool_name: String,
    #[serde(default)]
    pub tool_input: Value,
    #[serde(default)]
    pub transcript_path: Option<String>,
}

/// Payload delivered when the user submits a prompt.
#[derive(Debug, Clone, Deserialize)]
pub struct UserPromptSubmitPayload {
    #[serde(default)]
    pub prompt: String,
}

/// Payload delivered at session start.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionStartPayload {}

/// Payload delivered on a termination request.
#[derive(Debug, Clone, Deserialize)]
pub struct StopPayload {
    #[serde(default)]
    pub transcript_path: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Payload delivered on a subagent termination notification.
#[derive(Debug, Clone, Deserialize)]
pub struct SubagentStopPayload {
    #[serde(default)]
    pub transcript_path: Option<String>,
}

/// The closed set of inbound events.
#[derive(Debug, Clone)]
pub enum HookEvent {
    PreToolUse(PreToolUsePayload),
    PostToolUse(PostToolUsePayload),
    UserPromptSubmit(UserPromptSubmitPayload),
    SessionStart(SessionStartPayload),
    Stop(StopPayload),
    SubagentStop(SubagentStopPayload),
}

impl HookEvent {
    /// Decodes a raw JSON payload into the event for `kind`.
    pub fn from_json(kind: HookKind, raw: &str) -> Result<Self> {
        let decode = |e: serde_json::Error| {
            PhasegateError::payload(format!("{kind:?}"), e.to_string())
        };
        Ok(match kind {
            HookKind::PreToolUse => Self::PreToolUse(serde_json::from_str(raw).map_err(decode)?),
            HookKind::PostToolUse => Self::PostToolUse(serde_json::from_str(raw).map_err(decode)?),
            HookKind::UserPromptSubmit => {
                Self::UserPromptSubmit(serde_json::from_str(raw).map_err(decode)?)
            }
            HookKind::SessionStart => {
                Self::SessionStart(serde_json::from_str(raw).map_err(decode)?)
            }
            HookKind::Stop => Self::Stop(serde_json::from_str(raw).map_err(decode)?),
            HookKind::SubagentStop => {
                Self::SubagentStop(serde_json::from_str(raw).map_err(decode)?)
            }
        })
    }
}

/// Event-specific response payload nested under `hookSpecificOutput`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HookSpecificOutput {
    pub hook_event_name: String,
    pub additional_context: String,
}

/// Response returned to the host. Serializes to `{}` for a plain allow.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct HookResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(rename = "hookSpecificOutput", skip_serializing_if = "Option::is_none")]
    pub hook_specific_output: Option<HookSpecificOutput>,
}

impl HookResponse {
    /// Plain allow: `{}`.
    #[must_use]
    pub fn allow() -> Self {
        Self::default()
    }

    /// Block with a reason.
    #[must_use]
    pub fn block(reason: impl Into<String>) -> Self {
        Self {
            decision: Some("block".to_string()),
            reason: Some(reason.into()),
            hook_specific_output: None,
        }
    }

    /// Approve without extra output.
    #[must_use]
    pub fn approve() -> Self {
        Self {
            decision: Some("approve".to_string()),
            reason: None,
            hook_specific_output: None,
        }
    }

    /// Approve with additional session context.
    #[must_use]
    pub fn approve_with_context(event_name: &str, context: &str) -> Self {
        Self {
            decision: Some("approve".to_string()),
            reason: None,
            hook_specific_output: Some(HookSpecificOutput {
                hook_event_name: event_name.to_string(),
                additional_context: context.to_string(),
            }),
        }
    }

    /// Whether this response blocks the host action.
    #[must_use]
    pub fn is_block(&self) -> bool {
        self.decision.as_deref() == Some("block")
    }
}

impl From<GateDecision> for HookResponse {
    fn from(decision: GateDecision) -> Self {
        match decision {
            GateDecision::Permit => Self::allow(),
            GateDecision::Block { reason } => Self::block(reason),
        }
    }
}

/// Options shared by all handlers of one dispatch.
#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    /// Explicit project root, overriding transcript/cwd resolution.
    pub project: Option<PathBuf>,
    /// Treat stop-class events as synchronize-only (no gating).
    pub sync_only: bool,
}

impl DispatchOptions {
    fn stop_mode(&self) -> StopMode {
        if self.sync_only {
            StopMode::SyncOnly
        } else {
            StopMode::Gate
        }
    }
}

/// Dispatches one event to its handler.
pub fn dispatch(event: HookEvent, opts: &DispatchOptions) -> HookResponse {
    match event {
        HookEvent::PreToolUse(payload) => pre_tool_use(&payload, opts),
        HookEvent::PostToolUse(payload) => post_tool_use(&payload, opts),
        HookEvent::UserPromptSubmit(_) => HookResponse::approve(),
        HookEvent::SessionStart(_) => {
            HookResponse::approve_with_context("SessionStart", SESSION_CONTEXT)
        }
        HookEvent::Stop(payload) => stop_class(payload.transcript_path.as_deref(), opts),
        HookEvent::SubagentStop(payload) => {
            stop_class(payload.transcript_path.as_deref(), opts)
        }
    }
}

/// Enforces phase rules before an edit/write tool runs. Read-only: the edit
/// gate never mutates workflow state.
fn pre_tool_use(payload: &PreToolUsePayload, opts: &DispatchOptions) -> HookResponse {
    if !is_edit_tool(&payload.tool_name) {
        return HookResponse::allow();
    }

    let file_path = payload
        .tool_input
        .get("file_path")
        .and_then(Value::as_str)
        .unwrap_or_default();

    // No root supplied by this event: fall back to the candidate search.
    // No discoverable state means nothing to enforce.
    let layout = match &opts.project {
        Some(root) => AgentsLayout::new(root),
        None => match paths::find_workflow_root(&paths::default_candidates()) {
            Some(layout) => layout,
            None => return HookResponse::allow(),
        },
    };

    let phase = match StateStore::new(layout).load() {
        Ok(state) => state.and_then(|s| s.current_phase),
        Err(e) => {
            warn!("Failed to read workflow state: {}. Permitting edit.", e);
            return HookResponse::allow();
        }
    };

    check_edit(phase, file_path).into()
}

/// Observes commit messages in executed shell commands.
fn post_tool_use(payload: &PostToolUsePayload, opts: &DispatchOptions) -> HookResponse {
    if payload.tool_name != "Bash" {
        return HookResponse::allow();
    }
    let Some(command) = payload.tool_input.get("command").and_then(Value::as_str) else {
        return HookResponse::allow();
    };

    let Some(root) =
        paths::resolve_project_root(opts.project.as_deref(), payload.transcript_path.as_deref())
    else {
        return HookResponse::allow();
    };
    let store = StateStore::new(AgentsLayout::new(root));

    // Phase transitions only move existing state; observation never creates
    // a state document.
    let mut state = match store.load() {
        Ok(Some(state)) => state,
        Ok(None) => return HookResponse::allow(),
        Err(e) => {
            warn!("Failed to read workflow state: {}", e);
            return HookResponse::allow();
        }
    };

    if phase::observe_command(&mut state, command) {
        if let Err(e) = store.save(&state) {
            warn!("Failed to persist workflow state: {}", e);
        }
    }

    HookResponse::allow()
}

/// Shared handler for stop and subagent-stop events.
fn stop_class(transcript_path: Option<&str>, opts: &DispatchOptions) -> HookResponse {
    let Some(root) = paths::resolve_project_root(opts.project.as_deref(), transcript_path) else {
        return HookResponse::allow();
    };
    let layout = AgentsLayout::new(root);
    StopGatekeeper::new(&layout, opts.stop_mode()).check().into()
}
