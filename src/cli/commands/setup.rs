//! Headless installation

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Args;
use serde::Serialize;

use crate::backend::{SetupOptions, SharedBackend};
use crate::cli::commands::TICK;
use crate::cli::output::{OutputFormat, print_error, print_formatted};
use crate::state::{Installation, StateEvent, WizardOutcome, WizardProgress, default_wine_prefix};

#[derive(Args, Debug)]
pub struct SetupArgs {
    /// Install location (defaults to ~/Games/need-for-speed-world)
    #[arg(long)]
    pub prefix: Option<PathBuf>,

    /// Create a desktop shortcut
    #[arg(long)]
    pub desktop_shortcut: bool,

    /// Create an application menu shortcut
    #[arg(long)]
    pub menu_shortcut: bool,
}

impl SetupArgs {
    fn options(self) -> SetupOptions {
        SetupOptions {
            wine_prefix: self.prefix.unwrap_or_else(default_wine_prefix),
            desktop_shortcut: self.desktop_shortcut,
            menu_shortcut: self.menu_shortcut,
        }
    }
}

/// One progress line
#[derive(Serialize)]
struct ProgressLine {
    step: Option<String>,
    label: &'static str,
    progress: u8,
}

impl From<&WizardProgress> for ProgressLine {
    fn from(progress: &WizardProgress) -> Self {
        Self {
            step: progress.step().map(|s| format!("{:?}", s)),
            label: progress.label(),
            progress: progress.progress(),
        }
    }
}

pub async fn run(
    args: SetupArgs,
    backend: SharedBackend,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let mut installation = Installation::new(args.options());
    installation.activate(&backend);

    let mut ticker = tokio::time::interval(TICK);
    let mut shown = None;

    let outcome = loop {
        ticker.tick().await;

        for event in installation.poll(&backend) {
            match event {
                StateEvent::LogError(msg) => print_error(&msg),
                StateEvent::Notify(notification) => {
                    tracing::info!("{}", notification.message);
                }
                StateEvent::StatusMessage(_) | StateEvent::LogInfo(_) => {}
            }
        }

        let progress = installation.progress();
        let current = (progress.step(), progress.progress());
        if shown != Some(current) {
            shown = Some(current);
            if !quiet || format == OutputFormat::Json {
                print_formatted(&ProgressLine::from(progress), format, |line| {
                    format!("[{:>3}%] {}", line.progress, line.label)
                });
            }
        }

        if let Some(outcome) = progress.outcome() {
            break outcome;
        }
    };

    match outcome {
        WizardOutcome::Succeeded => Ok(()),
        WizardOutcome::Failed => bail!("Setup failed, rerun it"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_defaults_to_games_folder() {
        let args = SetupArgs {
            prefix: None,
            desktop_shortcut: true,
            menu_shortcut: false,
        };
        let options = args.options();
        assert!(options.wine_prefix.ends_with("Games/need-for-speed-world"));
        assert!(options.desktop_shortcut);
        assert!(!options.menu_shortcut);
    }

    #[test]
    fn test_progress_line_before_first_step() {
        let line = ProgressLine::from(&WizardProgress::default());
        assert_eq!(line.step, None);
        assert_eq!(line.progress, 5);
        assert_eq!(line.label, "Starting setup");
    }
}
