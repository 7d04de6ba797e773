//! Installation session: one `start_setup` per wizard run, progress from events

use tokio::task::JoinHandle;

use crate::backend::{SetupOptions, SharedBackend, WIZARD_STEP_CHANNEL};
use crate::error::BackendError;
use crate::state::{
    ChannelUpdate, EventChannel, StateEvent, WizardProgress, WizardStep, protocol_violation,
};
use crate::task::{PollResult, poll_task};

/// Issues `start_setup` at most once for the lifetime of a wizard session
pub struct WizardSession {
    options: SetupOptions,
    started: bool,
    task: Option<JoinHandle<Result<(), BackendError>>>,
}

impl WizardSession {
    pub fn new(options: SetupOptions) -> Self {
        Self {
            options,
            started: false,
            task: None,
        }
    }

    pub fn options(&self) -> &SetupOptions {
        &self.options
    }

    #[cfg(test)]
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Start setup unless this session already did; returns whether it fired now
    pub fn ensure_started(&mut self, backend: &SharedBackend) -> bool {
        if self.started {
            return false;
        }
        self.started = true;

        tracing::info!("Starting setup in {:?}", self.options.wine_prefix);
        let backend = backend.clone();
        let options = self.options.clone();
        self.task = Some(tokio::spawn(async move { backend.start_setup(options).await }));
        true
    }

    /// Outcome of the start command, reported once when it resolves
    pub fn poll(&mut self) -> Option<Result<(), String>> {
        match poll_task(&mut self.task) {
            PollResult::Complete(Ok(result)) => Some(result.map_err(|e| e.to_string())),
            PollResult::Complete(Err(e)) => Some(Err(format!("setup task panicked: {}", e))),
            PollResult::Pending | PollResult::NoTask => None,
        }
    }
}

/// State behind the installation view.
///
/// The setup command is only issued once the `wizard-step` subscription is
/// live, so no early step is missed. A rejected start command or a failed
/// subscription end the session through the same path as a `Failed` step.
pub struct Installation {
    session: WizardSession,
    progress: WizardProgress,
    channel: EventChannel<WizardStep>,
}

impl Installation {
    pub fn new(options: SetupOptions) -> Self {
        Self {
            session: WizardSession::new(options),
            progress: WizardProgress::default(),
            channel: EventChannel::new(WIZARD_STEP_CHANNEL),
        }
    }

    pub fn progress(&self) -> &WizardProgress {
        &self.progress
    }

    pub fn session(&self) -> &WizardSession {
        &self.session
    }

    /// Subscribe if not already subscribed or subscribing
    pub fn activate(&mut self, backend: &SharedBackend) {
        if self.channel.is_active() || self.channel.is_pending() || self.progress.is_finished() {
            return;
        }
        self.channel.subscribe(backend);
    }

    pub fn deactivate(&mut self) {
        self.channel.unsubscribe();
    }

    pub fn poll(&mut self, backend: &SharedBackend) -> Vec<StateEvent> {
        let mut events = Vec::new();

        for update in self.channel.poll() {
            match update {
                ChannelUpdate::Subscribed => {
                    self.session.ensure_started(backend);
                }
                ChannelUpdate::Event(step) => {
                    events.extend(self.progress.apply(step));
                }
                ChannelUpdate::Invalid { raw, error } => {
                    events.extend(protocol_violation(WIZARD_STEP_CHANNEL, &raw, &error));
                }
                ChannelUpdate::SubscribeFailed(e) => {
                    events.push(StateEvent::LogError(format!(
                        "Couldn't follow setup progress: {}",
                        e
                    )));
                    events.extend(self.progress.apply(WizardStep::Failed));
                }
            }
        }

        if let Some(Err(e)) = self.session.poll() {
            tracing::error!("Setup failed to start: {}", e);
            events.push(StateEvent::LogError(format!("Setup failed: {}", e)));
            events.extend(self.progress.apply(WizardStep::Failed));
        }

        if self.progress.is_finished() {
            self.channel.unsubscribe();
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::Arc;

    use super::*;
    use crate::state::testing::{MockBackend, settle};
    use crate::state::{NoticeKind, Notification, Route, WizardOutcome};

    fn options() -> SetupOptions {
        SetupOptions {
            wine_prefix: PathBuf::from("/home/racer/Games/need-for-speed-world"),
            desktop_shortcut: true,
            menu_shortcut: false,
        }
    }

    fn setup() -> (Arc<MockBackend>, SharedBackend) {
        let mock = Arc::new(MockBackend::new());
        let backend: SharedBackend = mock.clone();
        (mock, backend)
    }

    fn notifications(events: &[StateEvent]) -> Vec<&Notification> {
        events
            .iter()
            .filter_map(|e| match e {
                StateEvent::Notify(n) => Some(n),
                _ => None,
            })
            .collect()
    }

    /// Activate and poll like a frame loop would, many times
    async fn frames(install: &mut Installation, backend: &SharedBackend, count: usize) -> Vec<StateEvent> {
        let mut events = Vec::new();
        for _ in 0..count {
            install.activate(backend);
            settle().await;
            events.extend(install.poll(backend));
        }
        events
    }

    #[tokio::test]
    async fn test_session_starts_once() {
        let (mock, backend) = setup();
        let mut session = WizardSession::new(options());

        assert!(session.ensure_started(&backend));
        for _ in 0..5 {
            assert!(!session.ensure_started(&backend));
        }
        settle().await;

        assert_eq!(session.poll(), Some(Ok(())));
        assert_eq!(session.poll(), None);
        assert_eq!(mock.count("start_setup"), 1);
    }

    #[tokio::test]
    async fn test_options_pass_through_verbatim() {
        let (mock, backend) = setup();
        let mut install = Installation::new(options());
        frames(&mut install, &backend, 2).await;

        assert_eq!(mock.setup_options(), vec![options()]);
    }

    #[tokio::test]
    async fn test_start_waits_for_subscription() {
        let (mock, backend) = setup();
        mock.hold_listen();

        let mut install = Installation::new(options());
        frames(&mut install, &backend, 3).await;
        assert_eq!(mock.count("start_setup"), 0);
        assert_eq!(mock.count("listen"), 1);

        mock.release_listen();
        frames(&mut install, &backend, 3).await;
        assert_eq!(mock.count("start_setup"), 1);
    }

    #[tokio::test]
    async fn test_rerenders_do_not_restart_setup() {
        let (mock, backend) = setup();
        let mut install = Installation::new(options());
        frames(&mut install, &backend, 10).await;

        assert_eq!(mock.count("start_setup"), 1);
        assert_eq!(mock.count("listen"), 1);
        assert!(install.session().is_started());
    }

    #[tokio::test]
    async fn test_success_run_notifies_once_and_goes_home() {
        let (mock, backend) = setup();
        let mut install = Installation::new(options());
        frames(&mut install, &backend, 1).await;

        let mut observed = Vec::new();
        let mut events = Vec::new();
        for step in ["SetupFolders", "DownloadLauncher", "Complete", "Complete"] {
            mock.emit(WIZARD_STEP_CHANNEL, step);
            events.extend(install.poll(&backend));
            observed.push(install.progress().progress());
        }

        assert_eq!(observed, vec![10, 15, 100, 100]);
        let notes = notifications(&events);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NoticeKind::Info);
        assert_eq!(notes[0].then, Some(Route::Home));
        assert_eq!(mock.bus.listener_count(WIZARD_STEP_CHANNEL), 0);
    }

    #[tokio::test]
    async fn test_failed_step_notifies_once() {
        let (mock, backend) = setup();
        let mut install = Installation::new(options());
        frames(&mut install, &backend, 1).await;

        mock.emit(WIZARD_STEP_CHANNEL, "Cleanup");
        let mut events = install.poll(&backend);
        assert_eq!(install.progress().progress(), 8);

        mock.emit(WIZARD_STEP_CHANNEL, "Failed");
        mock.emit(WIZARD_STEP_CHANNEL, "Failed");
        events.extend(install.poll(&backend));
        events.extend(frames(&mut install, &backend, 3).await);

        assert_eq!(install.progress().progress(), 100);
        let notes = notifications(&events);
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NoticeKind::Error);
    }

    #[tokio::test]
    async fn test_start_failure_uses_failure_path() {
        let (mock, backend) = setup();
        mock.fail_commands(true);

        let mut install = Installation::new(options());
        let mut events = frames(&mut install, &backend, 3).await;

        // Backend also reports Failed for the same run
        mock.emit(WIZARD_STEP_CHANNEL, "Failed");
        events.extend(frames(&mut install, &backend, 2).await);

        assert_eq!(install.progress().outcome(), Some(WizardOutcome::Failed));
        assert_eq!(notifications(&events).len(), 1);
        assert_eq!(mock.count("start_setup"), 1);
    }

    #[tokio::test]
    async fn test_subscribe_failure_uses_failure_path() {
        let (mock, backend) = setup();
        mock.fail_listen(true);

        let mut install = Installation::new(options());
        let events = frames(&mut install, &backend, 3).await;

        assert_eq!(install.progress().outcome(), Some(WizardOutcome::Failed));
        assert_eq!(notifications(&events).len(), 1);
        assert_eq!(mock.count("listen"), 1);
        assert_eq!(mock.count("start_setup"), 0);
    }

    #[tokio::test]
    async fn test_unknown_step_changes_nothing() {
        let (mock, backend) = setup();
        let mut install = Installation::new(options());
        frames(&mut install, &backend, 1).await;

        mock.emit(WIZARD_STEP_CHANNEL, "SetupFolders");
        mock.emit(WIZARD_STEP_CHANNEL, "ReticulateSplines");
        let events = install.poll(&backend);

        assert_eq!(install.progress().step(), Some(WizardStep::SetupFolders));
        assert_eq!(install.progress().progress(), 10);
        assert!(notifications(&events).is_empty());
    }
}
