//! Settings screen state: load, edit, save

use std::path::PathBuf;

use tokio::task::JoinHandle;

use crate::backend::SharedBackend;
use crate::config::Settings;
use crate::error::BackendError;
use crate::state::StateEvent;
use crate::task::{PollResult, poll_task};

/// Settings document being edited plus the requests in flight for it
#[derive(Default)]
pub struct SettingsState {
    /// Loaded document, edited in place by the view
    pub document: Option<Settings>,
    /// Error message from the last request
    pub error: Option<String>,
    load_task: Option<JoinHandle<Result<Settings, BackendError>>>,
    save_task: Option<JoinHandle<Result<bool, BackendError>>>,
    runtime_task: Option<JoinHandle<Result<(), BackendError>>>,
}

impl SettingsState {
    pub fn is_loading(&self) -> bool {
        self.load_task.is_some()
    }

    pub fn is_busy(&self) -> bool {
        self.load_task.is_some() || self.save_task.is_some() || self.runtime_task.is_some()
    }

    /// Request the settings document
    pub fn load(&mut self, backend: &SharedBackend) {
        if self.load_task.is_some() {
            return;
        }
        self.error = None;
        let backend = backend.clone();
        self.load_task = Some(tokio::spawn(async move { backend.load_settings().await }));
    }

    /// Persist the edited document
    pub fn save(&mut self, backend: &SharedBackend) {
        if self.save_task.is_some() {
            return;
        }
        let Some(document) = self.document.clone() else {
            return;
        };
        let backend = backend.clone();
        self.save_task = Some(tokio::spawn(async move { backend.save_settings(document).await }));
    }

    /// Register a wine build, then reload to pick it up
    pub fn add_runtime_version(&mut self, backend: &SharedBackend, path: PathBuf) {
        if self.runtime_task.is_some() {
            return;
        }
        let backend = backend.clone();
        self.runtime_task = Some(tokio::spawn(async move {
            backend.add_alternate_runtime_version(path).await
        }));
    }

    pub fn poll(&mut self, backend: &SharedBackend) -> Vec<StateEvent> {
        let mut events = Vec::new();

        match poll_task(&mut self.load_task) {
            PollResult::Complete(Ok(Ok(document))) => {
                self.document = Some(document);
            }
            PollResult::Complete(Ok(Err(e))) => {
                let msg = format!("Couldn't load settings: {}", e);
                events.push(StateEvent::LogError(msg.clone()));
                self.error = Some(msg);
            }
            PollResult::Complete(Err(e)) => {
                let msg = format!("Settings task panicked: {}", e);
                events.push(StateEvent::LogError(msg.clone()));
                self.error = Some(msg);
            }
            PollResult::Pending | PollResult::NoTask => {}
        }

        match poll_task(&mut self.save_task) {
            PollResult::Complete(Ok(Ok(true))) => {
                events.push(StateEvent::StatusMessage("Settings saved".to_string()));
            }
            PollResult::Complete(Ok(Ok(false))) => {
                self.error = Some("Settings were not saved".to_string());
            }
            PollResult::Complete(Ok(Err(e))) => {
                let msg = format!("Couldn't save settings: {}", e);
                events.push(StateEvent::LogError(msg.clone()));
                self.error = Some(msg);
            }
            PollResult::Complete(Err(e)) => {
                events.push(StateEvent::LogError(format!("Save task panicked: {}", e)));
            }
            PollResult::Pending | PollResult::NoTask => {}
        }

        match poll_task(&mut self.runtime_task) {
            PollResult::Complete(Ok(Ok(()))) => {
                events.push(StateEvent::LogInfo("Wine version added".to_string()));
                self.load(backend);
            }
            PollResult::Complete(Ok(Err(e))) => {
                let msg = format!("Couldn't add wine version: {}", e);
                events.push(StateEvent::LogError(msg.clone()));
                self.error = Some(msg);
            }
            PollResult::Complete(Err(e)) => {
                events.push(StateEvent::LogError(format!("Runtime task panicked: {}", e)));
            }
            PollResult::Pending | PollResult::NoTask => {}
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::state::testing::{MockBackend, settle};

    #[tokio::test]
    async fn test_load_edit_save() {
        let mock = Arc::new(MockBackend::new());
        let backend: SharedBackend = mock.clone();
        let mut state = SettingsState::default();

        state.load(&backend);
        settle().await;
        state.poll(&backend);
        assert!(state.document.is_some());

        if let Some(doc) = state.document.as_mut() {
            doc.wine.fsync = false;
        }
        state.save(&backend);
        settle().await;
        let events = state.poll(&backend);

        assert!(events.contains(&StateEvent::StatusMessage("Settings saved".to_string())));
        assert!(!mock.stored_settings().wine.fsync);
    }

    #[tokio::test]
    async fn test_load_failure_sets_error() {
        let mock = Arc::new(MockBackend::new());
        mock.fail_commands(true);
        let backend: SharedBackend = mock.clone();
        let mut state = SettingsState::default();

        state.load(&backend);
        settle().await;
        state.poll(&backend);

        assert!(state.document.is_none());
        assert!(state.error.as_deref().unwrap_or_default().contains("load settings"));
    }

    #[tokio::test]
    async fn test_added_runtime_triggers_reload() {
        let mock = Arc::new(MockBackend::new());
        let backend: SharedBackend = mock.clone();
        let mut state = SettingsState::default();

        state.add_runtime_version(&backend, PathBuf::from("/dl/wine-9.0"));
        settle().await;
        state.poll(&backend);
        settle().await;
        state.poll(&backend);

        assert_eq!(mock.count("add_alternate_runtime_version"), 1);
        assert_eq!(mock.count("load_settings"), 1);
        assert!(!state.is_busy());
    }
}
