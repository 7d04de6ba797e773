pub mod check;
pub mod game;
pub mod settings;
pub mod setup;

use std::time::Duration;

/// How often headless commands poll the state machines
pub const TICK: Duration = Duration::from_millis(50);
