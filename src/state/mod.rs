//! Application state modules
//!
//! Each state struct is owned by the screen that shows it, is only touched
//! from the frame loop, and reports outward through [`StateEvent`]s returned
//! from its `poll` method.

mod channel;
mod game;
mod readiness;
mod runner;
mod settings;
mod ui;
mod wizard;

pub use channel::{ChannelUpdate, EventChannel};
pub use game::{GameLifecycle, GameState};
pub use readiness::{ReadinessProbe, ReadinessState};
pub use runner::Installation;
pub use settings::SettingsState;
pub use ui::{NoticeKind, Notification, Route, SetupForm, default_wine_prefix};
pub use wizard::{WizardOutcome, WizardProgress, WizardStep};

/// Events that state poll methods can return.
/// These communicate results back to the app shell without direct mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum StateEvent {
    /// Update the status message
    StatusMessage(String),

    /// Log an error message
    LogError(String),

    /// Log an info message
    LogInfo(String),

    /// Show a modal, then optionally navigate
    Notify(Notification),
}

/// Handle a payload that is not part of a channel's vocabulary.
///
/// Always logged; surfaced to the user only in debug builds. Never changes state.
pub(crate) fn protocol_violation(
    channel: &str,
    raw: &serde_json::Value,
    error: &str,
) -> Option<StateEvent> {
    tracing::error!("Unexpected payload {} on '{}': {}", raw, channel, error);
    cfg!(debug_assertions).then(|| {
        StateEvent::LogError(format!("Backend sent unknown {} payload {}", channel, raw))
    })
}
