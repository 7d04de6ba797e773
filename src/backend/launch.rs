//! Game process launching and supervision

use std::path::{Path, PathBuf};
use std::process::Stdio;

use serde::Serialize;
use tokio::process::Command;

use crate::backend::{EventBus, GAME_STATE_CHANNEL};
use crate::config::{AvailableCommands, Settings};
use crate::error::BackendError;

/// DLLs switched between DXVK (native) and wined3d (builtin)
const D3D_DLLS: &str = "d3d9,d3d10,d3d10_1,d3d10core,d3d11,dxgi";

/// Wire tags the backend emits on `game-state`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameStateTag {
    GameLaunching,
    GameRunning,
    GameStopped,
}

/// Fully resolved game invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub envs: Vec<(String, String)>,
    pub working_dir: PathBuf,
}

/// Build the wine invocation for the configured launcher
pub fn build_launch_command(settings: &Settings, wrappers: AvailableCommands) -> LaunchCommand {
    let wine = Path::new(&settings.wine.path).join("wine");

    let mut chain: Vec<PathBuf> = Vec::new();
    if settings.game.mangohud && wrappers.mangohud {
        chain.push(PathBuf::from("mangohud"));
    }
    if settings.wine.feral_gamemode && wrappers.gamemoderun {
        chain.push(PathBuf::from("gamemoderun"));
    }
    chain.push(wine);

    let program = chain.remove(0);
    let mut args: Vec<String> = chain
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect();
    args.push(settings.game.launcher.clone());

    let mut overrides = vec![format!(
        "{}={}",
        D3D_DLLS,
        if settings.dxvk.enabled { "n" } else { "b" }
    )];
    overrides.extend(
        settings
            .game
            .dll_overrides
            .iter()
            .map(|kv| format!("{}={}", kv.key, kv.value)),
    );
    overrides.push("winemenubuilder=".to_string());

    let mut envs: Vec<(String, String)> = settings
        .game
        .environment_variables
        .iter()
        .map(|kv| (kv.key.clone(), kv.value.clone()))
        .collect();
    envs.push(("WINEPREFIX".to_string(), settings.game.prefix.clone()));
    envs.push(("WINEESYNC".to_string(), flag(settings.wine.esync)));
    envs.push(("WINEFSYNC".to_string(), flag(settings.wine.fsync)));
    envs.push(("WINEDLLOVERRIDES".to_string(), overrides.join(";")));

    LaunchCommand {
        program,
        args,
        envs,
        working_dir: PathBuf::from(&settings.game.directory),
    }
}

fn flag(enabled: bool) -> String {
    if enabled { "1" } else { "0" }.to_string()
}

fn report(bus: &EventBus, tag: GameStateTag) {
    if let Err(e) = bus.emit(GAME_STATE_CHANNEL, &tag) {
        tracing::error!("Failed to emit {:?}: {}", tag, e);
    }
}

/// Spawn the game and supervise it in the background.
///
/// Emits `GameLaunching` right away, `GameRunning` once the launcher hands
/// off, and `GameStopped` when the wineserver for the prefix exits.
pub fn spawn_game(bus: &EventBus, settings: &Settings) -> Result<(), BackendError> {
    report(bus, GameStateTag::GameLaunching);

    let cmd = build_launch_command(settings, AvailableCommands::detect());
    tracing::info!(
        "Launching game: {:?} {:?} in {:?}",
        cmd.program,
        cmd.args,
        cmd.working_dir
    );
    for (key, value) in &cmd.envs {
        tracing::debug!("  {}={}", key, value);
    }

    let mut child = Command::new(&cmd.program)
        .args(&cmd.args)
        .envs(cmd.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .current_dir(&cmd.working_dir)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| {
            report(bus, GameStateTag::GameStopped);
            BackendError::Process(format!("Failed to start {:?}: {}", cmd.program, e))
        })?;

    let bus = bus.clone();
    let wineserver = Path::new(&settings.wine.path).join("wineserver");
    let prefix = settings.game.prefix.clone();

    tokio::spawn(async move {
        let result: Result<(), BackendError> = async {
            child.wait().await?;
            report(&bus, GameStateTag::GameRunning);
            tracing::info!("Game is running");

            let status = Command::new(&wineserver)
                .arg("-w")
                .env("WINEPREFIX", &prefix)
                .status()
                .await?;
            tracing::info!("Game exited with: {:?}", status);
            Ok(())
        }
        .await;

        if let Err(e) = result {
            tracing::error!("Game watcher failed: {}", e);
        }
        report(&bus, GameStateTag::GameStopped);
    });

    Ok(())
}

/// Kill every process in the configured prefix
pub async fn kill_game(settings: &Settings) -> Result<(), BackendError> {
    let wineserver = Path::new(&settings.wine.path).join("wineserver");
    let status = Command::new(&wineserver)
        .arg("-k")
        .env("WINEPREFIX", &settings.game.prefix)
        .status()
        .await?;

    if !status.success() {
        tracing::warn!("wineserver -k exited with {}", status);
    }
    Ok(())
}
