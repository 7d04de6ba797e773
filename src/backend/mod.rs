//! Backend command API and event transport.
//!
//! The UI side only talks to [`Backend`]: a handful of request/response
//! commands plus named event streams (`game-state`, `wizard-step`) that the
//! backend pushes while long-running work happens elsewhere.

mod bus;
mod launch;
mod local;
mod setup;
mod validate;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::error::BackendError;

pub use bus::{EventBus, Listener};
pub use local::LocalBackend;

/// Event stream carrying the game process state
pub const GAME_STATE_CHANNEL: &str = "game-state";
/// Event stream carrying installation steps
pub const WIZARD_STEP_CHANNEL: &str = "wizard-step";

/// Options chosen on the wizard's first page, handed to the installer untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetupOptions {
    pub wine_prefix: PathBuf,
    #[serde(default)]
    pub desktop_shortcut: bool,
    #[serde(default)]
    pub menu_shortcut: bool,
}

/// Commands and event streams offered by the backend
#[async_trait]
pub trait Backend: Send + Sync {
    /// Subscribe to a named event stream
    async fn listen(&self, channel: &str) -> Result<Listener, BackendError>;

    /// Kick off an installation; progress arrives on `wizard-step`
    async fn start_setup(&self, options: SetupOptions) -> Result<(), BackendError>;

    /// Start the game; state changes arrive on `game-state`
    async fn launch_game(&self) -> Result<(), BackendError>;

    async fn stop_game(&self) -> Result<(), BackendError>;

    /// Whether a previous installation is complete enough to launch
    async fn check_readiness(&self) -> Result<bool, BackendError>;

    async fn load_settings(&self) -> Result<Settings, BackendError>;

    async fn save_settings(&self, settings: Settings) -> Result<bool, BackendError>;

    /// Register an additional wine/proton build
    async fn add_alternate_runtime_version(&self, path: PathBuf) -> Result<(), BackendError>;
}

/// Backend handle shared between screens and spawned tasks
pub type SharedBackend = Arc<dyn Backend>;
