//! One-shot installation readiness check for the home screen

use tokio::task::JoinHandle;

use crate::backend::SharedBackend;
use crate::error::BackendError;
use crate::state::StateEvent;
use crate::task::{PollResult, poll_task};

/// Outcome of the readiness check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadinessState {
    /// Check still running; the primary action stays disabled
    #[default]
    Loading,
    /// Installation is complete enough to launch
    Ready,
    /// Not ready, or readiness could not be determined
    Broken,
}

/// Runs `check_readiness` once per activation
#[derive(Default)]
pub struct ReadinessProbe {
    state: ReadinessState,
    task: Option<JoinHandle<Result<bool, BackendError>>>,
}

impl ReadinessProbe {
    pub fn state(&self) -> ReadinessState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == ReadinessState::Loading
    }

    /// Start a fresh check; any earlier result is discarded
    pub fn activate(&mut self, backend: &SharedBackend) {
        if let Some(task) = self.task.take() {
            task.abort();
        }

        self.state = ReadinessState::Loading;
        let backend = backend.clone();
        self.task = Some(tokio::spawn(async move { backend.check_readiness().await }));
    }

    /// Stop waiting on an outstanding check
    pub fn deactivate(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Resolve `Loading` once the check finishes
    pub fn poll(&mut self) -> Vec<StateEvent> {
        let mut events = Vec::new();

        match poll_task(&mut self.task) {
            PollResult::Complete(Ok(Ok(true))) => {
                tracing::info!("Installation is ready");
                self.state = ReadinessState::Ready;
            }
            PollResult::Complete(Ok(Ok(false))) => {
                tracing::info!("Installation is missing or incomplete");
                self.state = ReadinessState::Broken;
            }
            PollResult::Complete(Ok(Err(e))) => {
                self.state = ReadinessState::Broken;
                events.push(StateEvent::LogError(format!("Couldn't check installation: {}", e)));
            }
            PollResult::Complete(Err(e)) => {
                self.state = ReadinessState::Broken;
                events.push(StateEvent::LogError(format!("Readiness task panicked: {}", e)));
            }
            PollResult::Pending | PollResult::NoTask => {}
        }

        events
    }
}
