//! Drives the external installer helper and relays its progress

use std::process::Stdio;

use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

use crate::backend::{EventBus, SetupOptions, WIZARD_STEP_CHANNEL};
use crate::error::BackendError;
use crate::state::WizardStep;

/// Prefix of helper output lines that carry a step tag
const STEP_PREFIX: &str = "step:";

/// Extract the step tag from one line of helper output
pub fn parse_step_line(line: &str) -> Option<&str> {
    let tag = line.trim().strip_prefix(STEP_PREFIX)?.trim();
    (!tag.is_empty()).then_some(tag)
}

fn is_terminal_tag(tag: &str) -> bool {
    serde_json::from_value::<WizardStep>(Value::from(tag)).is_ok_and(WizardStep::is_terminal)
}

fn report_failed(bus: &EventBus) {
    if let Err(e) = bus.emit(WIZARD_STEP_CHANNEL, &"Failed") {
        tracing::error!("Failed to emit Failed step: {}", e);
    }
}

/// Start the installer helper and return once it is running.
///
/// Step tags are forwarded unvalidated; interpreting them is the
/// subscriber's job. A helper that dies without reporting a terminal step
/// gets a `Failed` on its behalf.
pub fn spawn_installer(
    bus: &EventBus,
    helper: &str,
    options: &SetupOptions,
) -> Result<(), BackendError> {
    let options_json = serde_json::to_string(options)?;
    tracing::info!("Setup started with helper '{}'", helper);

    let mut child = Command::new(helper)
        .arg("--options")
        .arg(&options_json)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| {
            report_failed(bus);
            BackendError::Process(format!("Failed to start installer '{}': {}", helper, e))
        })?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| BackendError::Process("Installer stdout unavailable".to_string()))?;

    let bus = bus.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(stdout).lines();
        let mut terminal_seen = false;

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match parse_step_line(&line) {
                    Some(tag) => {
                        terminal_seen |= is_terminal_tag(tag);
                        if let Err(e) = bus.emit(WIZARD_STEP_CHANNEL, &Value::from(tag)) {
                            tracing::error!("Failed to emit step {}: {}", tag, e);
                        }
                    }
                    None => tracing::debug!("installer: {}", line),
                },
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!("Reading installer output failed: {}", e);
                    break;
                }
            }
        }

        let success = match child.wait().await {
            Ok(status) => {
                tracing::info!("Installer exited with {}", status);
                status.success()
            }
            Err(e) => {
                tracing::error!("Waiting for installer failed: {}", e);
                false
            }
        };

        if !terminal_seen {
            if success {
                tracing::warn!("Installer exited without reporting a final step");
            }
            report_failed(&bus);
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_step_line() {
        assert_eq!(parse_step_line("step: Cleanup"), Some("Cleanup"));
        assert_eq!(parse_step_line("  step:SetupDXVK  "), Some("SetupDXVK"));
        assert_eq!(parse_step_line("step:"), None);
        assert_eq!(parse_step_line("downloading GameLauncher.exe"), None);
    }

    #[test]
    fn test_terminal_tags() {
        assert!(is_terminal_tag("Complete"));
        assert!(is_terminal_tag("Failed"));
        assert!(!is_terminal_tag("ValidateInstallation"));
        assert!(!is_terminal_tag("Completed"));
    }

    #[tokio::test]
    async fn test_missing_helper_reports_failed() {
        let bus = EventBus::new();
        let mut listener = bus.listen(WIZARD_STEP_CHANNEL);

        let result = spawn_installer(
            &bus,
            "/nonexistent/sbrw-setup-helper",
            &SetupOptions::default(),
        );

        assert!(matches!(result, Err(BackendError::Process(_))));
        assert_eq!(listener.try_next(), Some(Value::from("Failed")));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_helper_steps_are_forwarded() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("helper.sh");
        std::fs::write(
            &script,
            "#!/bin/sh\necho 'step: Cleanup'\necho 'preparing folders'\necho 'step: SetupFolders'\necho 'step: Complete'\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let bus = EventBus::new();
        let mut listener = bus.listen(WIZARD_STEP_CHANNEL);
        spawn_installer(&bus, script.to_str().unwrap(), &SetupOptions::default()).unwrap();

        let mut received = Vec::new();
        while let Ok(Some(value)) =
            tokio::time::timeout(std::time::Duration::from_secs(5), listener.next()).await
        {
            received.push(value);
            if received.len() == 3 {
                break;
            }
        }

        assert_eq!(
            received,
            vec![
                Value::from("Cleanup"),
                Value::from("SetupFolders"),
                Value::from("Complete"),
            ]
        );
    }
}
