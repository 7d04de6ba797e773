//! Game process lifecycle as seen from the home screen

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;

use crate::backend::{GAME_STATE_CHANNEL, SharedBackend};
use crate::error::BackendError;
use crate::state::{ChannelUpdate, EventChannel, StateEvent, protocol_violation};
use crate::task::{PollResult, poll_task};

/// Authoritative game state, as last reported on `game-state`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameState {
    #[default]
    #[serde(alias = "GameStopped")]
    Stopped,
    #[serde(alias = "GameLaunching")]
    Launching,
    #[serde(alias = "GameRunning")]
    Running,
}

/// Command issued for a user toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameCommand {
    Launch,
    Stop,
}

/// How the primary action should render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionButton {
    pub label: &'static str,
    pub enabled: bool,
}

/// Tracks the game state and turns user toggles into launch/stop commands.
///
/// State only ever changes from inbound events (last event wins). While a
/// launch command is in flight the button reads "Launching..." but the
/// state itself is left alone until the backend reports.
pub struct GameLifecycle {
    state: GameState,
    channel: EventChannel<GameState>,
    command: Option<GameCommand>,
    task: Option<JoinHandle<Result<(), BackendError>>>,
}

impl Default for GameLifecycle {
    fn default() -> Self {
        Self {
            state: GameState::Stopped,
            channel: EventChannel::new(GAME_STATE_CHANNEL),
            command: None,
            task: None,
        }
    }
}

impl GameLifecycle {
    pub fn state(&self) -> GameState {
        self.state
    }

    /// Whether a launch or stop command has not returned yet
    pub fn command_in_flight(&self) -> bool {
        self.command.is_some()
    }

    /// Start following `game-state` from a clean slate.
    ///
    /// Events sent while the screen was away are lost, so the state resets
    /// to `Stopped`. A command still in flight is kept so its result is
    /// collected.
    pub fn activate(&mut self, backend: &SharedBackend) {
        self.state = GameState::Stopped;
        self.channel.subscribe(backend);
    }

    pub fn deactivate(&mut self) {
        self.channel.unsubscribe();
    }

    /// Handle a press of the primary action.
    ///
    /// Returns the command issued, or `None` when the current state accepts
    /// no action.
    pub fn toggle(&mut self, backend: &SharedBackend) -> Option<GameCommand> {
        if self.command.is_some() {
            tracing::debug!("Ignoring toggle while a command is in flight");
            return None;
        }

        let command = match self.state {
            GameState::Stopped => GameCommand::Launch,
            GameState::Running => GameCommand::Stop,
            GameState::Launching => return None,
        };

        tracing::info!("Issuing {:?} from {:?}", command, self.state);
        let backend = backend.clone();
        self.task = Some(tokio::spawn(async move {
            match command {
                GameCommand::Launch => backend.launch_game().await,
                GameCommand::Stop => backend.stop_game().await,
            }
        }));
        self.command = Some(command);
        Some(command)
    }

    pub fn button(&self) -> ActionButton {
        let launching = ActionButton {
            label: "Launching...",
            enabled: false,
        };

        match (self.command, self.state) {
            (Some(GameCommand::Launch), _) | (_, GameState::Launching) => launching,
            (Some(GameCommand::Stop), _) => ActionButton {
                label: "Stop Game",
                enabled: false,
            },
            (None, GameState::Running) => ActionButton {
                label: "Stop Game",
                enabled: true,
            },
            (None, GameState::Stopped) => ActionButton {
                label: "Launch Game",
                enabled: true,
            },
        }
    }

    /// Apply inbound events and collect the outcome of any command
    pub fn poll(&mut self) -> Vec<StateEvent> {
        let mut events = Vec::new();

        for update in self.channel.poll() {
            match update {
                ChannelUpdate::Subscribed => {}
                ChannelUpdate::Event(state) => {
                    tracing::debug!("Game state {:?} -> {:?}", self.state, state);
                    self.state = state;
                }
                ChannelUpdate::Invalid { raw, error } => {
                    events.extend(protocol_violation(GAME_STATE_CHANNEL, &raw, &error));
                }
                ChannelUpdate::SubscribeFailed(e) => {
                    events.push(StateEvent::LogError(format!(
                        "Couldn't follow game state: {}",
                        e
                    )));
                }
            }
        }

        let failure = match poll_task(&mut self.task) {
            PollResult::Complete(Ok(Ok(()))) => None,
            PollResult::Complete(Ok(Err(e))) => Some(e.to_string()),
            PollResult::Complete(Err(e)) => Some(format!("task panicked: {}", e)),
            PollResult::Pending | PollResult::NoTask => return events,
        };

        let verb = match self.command.take() {
            Some(GameCommand::Stop) => "stop",
            _ => "launch",
        };
        if let Some(reason) = failure {
            tracing::warn!("Couldn't {} the game: {}", verb, reason);
            events.push(StateEvent::LogError(format!(
                "Couldn't {} the game: {}",
                verb, reason
            )));
        }

        events
    }
}
