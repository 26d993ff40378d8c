//! Persistence for the workflow state document.
//!
//! [`StateStore`] owns all reads and writes of `.agents/workflow.json`.
//! Writes go to a temp file first and are renamed into place under an
//! advisory exclusive lock, so concurrent hook invocations cannot leave a
//! half-written document behind. The observable decision logic is unchanged
//! by this: each invocation still performs an independent load-modify-save
//! and the last writer wins.
//!
//! A missing or unparseable document loads as `None`. Corruption is logged
//! but never surfaced as a failure and the file is left in place; the
//! project simply behaves as if it had no workflow state.

use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

use fs2::FileExt;
use tracing::warn;

use crate::error::{PhasegateError, Result};
use crate::paths::AgentsLayout;
use crate::state::WorkflowState;

/// Temporary file suffix for atomic writes.
const TMP_SUFFIX: &str = ".tmp";

/// Lock file suffix for concurrent access prevention.
const LOCK_SUFFIX: &str = ".lock";

/// State persistence for one project.
#[derive(Debug, Clone)]
pub struct StateStore {
    layout: AgentsLayout,
}

impl StateStore {
    /// Creates a store for the given layout.
    #[must_use]
    pub fn new(layout: AgentsLayout) -> Self {
        Self { layout }
    }

    /// Path to the state document.
    #[must_use]
    pub fn state_file_path(&self) -> PathBuf {
        self.layout.workflow_file()
    }

    fn tmp_file_path(&self) -> PathBuf {
        let mut name = self.state_file_path().into_os_string();
        name.push(TMP_SUFFIX);
        PathBuf::from(name)
    }

    fn lock_file_path(&self) -> PathBuf {
        let mut name = self.state_file_path().into_os_string();
        name.push(LOCK_SUFFIX);
        PathBuf::from(name)
    }

    /// Loads the persisted state.
    ///
    /// Returns `None` when the file does not exist or fails to parse; a
    /// parse failure is logged but is not an error to the caller.
    pub fn load(&self) -> Result<Option<WorkflowState>> {
        let path = self.state_file_path();

        let contents = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<WorkflowState>(&contents) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                warn!(
                    "Malformed workflow state at {}: {}. Treating as absent.",
                    path.display(),
                    e
                );
                Ok(None)
            }
        }
    }

    /// Persists the state, creating missing parent directories.
    ///
    /// The write is temp-then-rename under an exclusive advisory lock.
    pub fn save(&self, state: &WorkflowState) -> Result<()> {
        let path = self.state_file_path();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let lock_path = self.lock_file_path();
        let lock_file = File::create(&lock_path)?;
        FileExt::lock_exclusive(&lock_file)
            .map_err(|e| PhasegateError::state_lock(&lock_path, e.to_string()))?;

        let json = serde_json::to_string_pretty(state)?;
        let tmp_path = self.tmp_file_path();
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(json.as_bytes())?;
        tmp_file.write_all(b"\n")?;
        tmp_file.sync_all()?;

        fs::rename(&tmp_path, &path)
            .map_err(|e| PhasegateError::state_write(&path, e.to_string()))?;

        Ok(())
    }

    /// Loads the state, substituting a fresh idle state when absent.
    pub fn load_or_default(&self) -> Result<WorkflowState> {
        Ok(self.load()?.unwrap_or_default())
    }

    /// Whether a state document exists on disk.
    #[must_use]
    pub fn exists(&self) -> bool {
        self.state_file_path().exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Phase;
    use tempfile::TempDir;

    fn test_store() -> (StateStore, TempDir) {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let store = StateStore::new(AgentsLayout::new(temp.path()));
        (store, temp)
    }

    #[test]
    fn test_load_returns_none_when_missing() {
        let (store, _temp) = test_store();
        assert!(store.load().expect("load should not error").is_none());
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let (store, temp) = test_store();
        assert!(!temp.path().join(".agents").exists());

        store.save(&WorkflowState::new()).expect("save");
        assert!(store.exists());
        assert!(temp.path().join(".agents/workflow.json").exists());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let (store, _temp) = test_store();

        let mut state = WorkflowState::new();
        state.begin_item("add-login");
        state.current_phase = Some(Phase::Red);
        state.work_until = Some("ship-it".to_string());
        state.completed_items.insert("bootstrap".to_string());
        state.stats.total_tests = 12;
        state.stats.passing_tests = 9;

        store.save(&state).expect("save");
        let loaded = store.load().expect("load").expect("state present");
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_malformed_state_loads_as_none_and_is_kept() {
        let (store, temp) = test_store();
        fs::create_dir_all(temp.path().join(".agents")).unwrap();
        fs::write(store.state_file_path(), "not valid json {{{").unwrap();

        let result = store.load().expect("load should not error");
        assert!(result.is_none());
        // The corrupt file is left alone; only the caller treats it as absent.
        assert!(store.state_file_path().exists());
    }

    #[test]
    fn test_no_tmp_file_left_after_save() {
        let (store, _temp) = test_store();
        store.save(&WorkflowState::new()).expect("save");
        assert!(!store.tmp_file_path().exists());
        assert!(store.state_file_path().exists());
    }

    #[test]
    fn test_save_overwrites_existing_state() {
        let (store, _temp) = test_store();

        let mut first = WorkflowState::new();
        first.work_until = Some("one".to_string());
        store.save(&first).expect("save");

        let mut second = WorkflowState::new();
        second.work_until = Some("two".to_string());
        store.save(&second).expect("save");

        let loaded = store.load().expect("load").unwrap();
        assert_eq!(loaded.work_until.as_deref(), Some("two"));
    }

    #[test]
    fn test_load_or_default_when_absent() {
        let (store, _temp) = test_store();
        let state = store.load_or_default().expect("load_or_default");
        assert!(state.is_idle());
    }
}
