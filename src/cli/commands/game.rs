//! Game launching and stopping

use anyhow::{Context, Result};
use serde::Serialize;

use crate::backend::{GAME_STATE_CHANNEL, SharedBackend};
use crate::cli::output::{OutputFormat, print_formatted, print_success};
use crate::state::GameState;

#[derive(Serialize)]
struct StateLine {
    state: GameState,
}

pub async fn launch(
    backend: SharedBackend,
    wait: bool,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    if !wait {
        backend.launch_game().await.context("Failed to launch game")?;
        print_success("Game launched", quiet);
        return Ok(());
    }

    // Listen first so the launch's own state changes are not missed
    let mut listener = backend
        .listen(GAME_STATE_CHANNEL)
        .await
        .context("Failed to follow game state")?;
    backend.launch_game().await.context("Failed to launch game")?;

    while let Some(payload) = listener.next().await {
        let state: GameState = match serde_json::from_value(payload.clone()) {
            Ok(state) => state,
            Err(e) => {
                tracing::error!("Unexpected payload {} on '{}': {}", payload, GAME_STATE_CHANNEL, e);
                continue;
            }
        };

        if !quiet || format == OutputFormat::Json {
            print_formatted(&StateLine { state }, format, |line| format!("{:?}", line.state));
        }
        if state == GameState::Stopped {
            break;
        }
    }

    Ok(())
}

pub async fn stop(backend: SharedBackend, quiet: bool) -> Result<()> {
    backend.stop_game().await.context("Failed to stop game")?;
    print_success("Game stopped", quiet);
    Ok(())
}
