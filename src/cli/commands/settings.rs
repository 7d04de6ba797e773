//! Settings inspection and runtime registration

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::backend::SharedBackend;
use crate::cli::output::{OutputFormat, print_formatted, print_success};
use crate::config::{AvailableCommands, RunnerVersion, Settings};

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show the current settings
    Show,

    /// Register an unpacked Wine or Proton build
    AddWine {
        /// Directory of the unpacked build (wine-*, Proton-* or GE-Proton*)
        path: PathBuf,
    },
}

pub async fn run(
    command: SettingsCommands,
    backend: SharedBackend,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    match command {
        SettingsCommands::Show => {
            let settings = backend
                .load_settings()
                .await
                .context("Failed to load settings")?;
            print_formatted(&settings, format, format_settings_text);
            Ok(())
        }
        SettingsCommands::AddWine { path } => {
            backend
                .add_alternate_runtime_version(path.clone())
                .await
                .with_context(|| format!("Failed to add {}", path.display()))?;
            print_success(&format!("Added {}", path.display()), quiet);
            Ok(())
        }
    }
}

fn format_settings_text(settings: &Settings) -> String {
    let mut out = String::new();

    out.push_str("Wine\n");
    out.push_str(&format!("  Version:     {}\n", or_unset(&settings.wine.version)));
    out.push_str(&format!("  Path:        {}\n", or_unset(&settings.wine.path)));
    out.push_str(&format!("  Esync:       {}\n", settings.wine.esync));
    out.push_str(&format!("  Fsync:       {}\n", settings.wine.fsync));
    out.push_str(&format!(
        "  GameMode:    {}{}\n",
        settings.wine.feral_gamemode,
        missing_note(&settings.available_commands, |c| c.gamemoderun)
    ));

    out.push_str("DXVK\n");
    out.push_str(&format!("  Enabled:     {}\n", settings.dxvk.enabled));
    out.push_str(&format!("  Version:     {}\n", or_unset(&settings.dxvk.version)));

    out.push_str("Game\n");
    out.push_str(&format!("  Prefix:      {}\n", or_unset(&settings.game.prefix)));
    out.push_str(&format!("  Launcher:    {}\n", or_unset(&settings.game.launcher)));
    out.push_str(&format!(
        "  MangoHud:    {}{}\n",
        settings.game.mangohud,
        missing_note(&settings.available_commands, |c| c.mangohud)
    ));

    push_versions(&mut out, "Available Wine versions", &settings.available_wine_versions);
    push_versions(&mut out, "Available DXVK versions", &settings.available_dxvk_versions);

    out.trim_end().to_string()
}

fn push_versions(out: &mut String, title: &str, versions: &Option<Vec<RunnerVersion>>) {
    let Some(versions) = versions else {
        return;
    };
    out.push_str(&format!("{}\n", title));
    if versions.is_empty() {
        out.push_str("  (none)\n");
    }
    for version in versions {
        out.push_str(&format!("  {}  {}\n", version.name, version.path));
    }
}

fn missing_note(
    commands: &Option<AvailableCommands>,
    available: impl Fn(&AvailableCommands) -> bool,
) -> &'static str {
    match commands {
        Some(commands) if !available(commands) => " (not installed)",
        _ => "",
    }
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() { "(not set)" } else { value }
}
