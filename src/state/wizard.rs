//! Installation progress driven by `wizard-step` events

use serde::{Deserialize, Serialize};

use crate::state::{Notification, Route, StateEvent};

/// Label shown before the first step arrives. Not a step of the table below.
const INITIAL_LABEL: &str = "Starting setup";
/// Progress shown before the first step arrives. Not a step of the table below.
const INITIAL_PROGRESS: u8 = 5;

/// Installation phases in the order the backend reports them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WizardStep {
    Cleanup,
    SetupFolders,
    DownloadLauncher,
    WriteResources,
    ExtractResources,
    InitializeWine,
    InstallRuntimes,
    SetupDXVK,
    FinalizeSetup,
    ValidateInstallation,
    Complete,
    Failed,
}

impl WizardStep {
    /// Every step, in reporting order
    #[cfg(test)]
    pub const ALL: [WizardStep; 12] = [
        WizardStep::Cleanup,
        WizardStep::SetupFolders,
        WizardStep::DownloadLauncher,
        WizardStep::WriteResources,
        WizardStep::ExtractResources,
        WizardStep::InitializeWine,
        WizardStep::InstallRuntimes,
        WizardStep::SetupDXVK,
        WizardStep::FinalizeSetup,
        WizardStep::ValidateInstallation,
        WizardStep::Complete,
        WizardStep::Failed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            WizardStep::Cleanup => "Cleaning up...",
            WizardStep::SetupFolders => "Setting up folders...",
            WizardStep::DownloadLauncher => "Downloading game launcher...",
            WizardStep::WriteResources => "Copying bundled resources...",
            WizardStep::ExtractResources => "Extracting bundled archives...",
            WizardStep::InitializeWine => "Initializing Wine environment...",
            WizardStep::InstallRuntimes => "Installing runtimes...",
            WizardStep::SetupDXVK => "Setting up DXVK...",
            WizardStep::FinalizeSetup => "Finalizing setup...",
            WizardStep::ValidateInstallation => "Validating installation...",
            WizardStep::Complete => "Setup completed successfully!",
            WizardStep::Failed => "Setup failed, rerun the setup",
        }
    }

    /// Percentage shown while this step is current
    pub fn progress(self) -> u8 {
        match self {
            WizardStep::Cleanup => 8,
            WizardStep::SetupFolders => 10,
            WizardStep::DownloadLauncher => 15,
            WizardStep::WriteResources => 25,
            WizardStep::ExtractResources => 40,
            WizardStep::InitializeWine => 65,
            WizardStep::InstallRuntimes => 75,
            WizardStep::SetupDXVK => 85,
            WizardStep::FinalizeSetup => 90,
            WizardStep::ValidateInstallation => 95,
            WizardStep::Complete | WizardStep::Failed => 100,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, WizardStep::Complete | WizardStep::Failed)
    }
}

/// How a wizard session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardOutcome {
    Succeeded,
    Failed,
}

/// Maps steps to label/progress and fires the terminal notification once.
///
/// `Complete` and `Failed` are absorbing: the first one to arrive produces
/// the notification and every later step is ignored.
#[derive(Debug, Clone)]
pub struct WizardProgress {
    step: Option<WizardStep>,
    label: &'static str,
    progress: u8,
    outcome: Option<WizardOutcome>,
}

impl Default for WizardProgress {
    fn default() -> Self {
        Self {
            step: None,
            label: INITIAL_LABEL,
            progress: INITIAL_PROGRESS,
            outcome: None,
        }
    }
}

impl WizardProgress {
    pub fn step(&self) -> Option<WizardStep> {
        self.step
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Progress as a fraction for progress bars
    pub fn fraction(&self) -> f32 {
        f32::from(self.progress) / 100.0
    }

    pub fn outcome(&self) -> Option<WizardOutcome> {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Apply one step; returns the terminal notification on the transition into `Complete`/`Failed`
    pub fn apply(&mut self, step: WizardStep) -> Option<StateEvent> {
        if let Some(outcome) = self.outcome {
            tracing::debug!("Ignoring {:?}, session already {:?}", step, outcome);
            return None;
        }

        tracing::info!("Setup step: {:?} ({}%)", step, step.progress());
        self.step = Some(step);
        self.label = step.label();
        self.progress = step.progress();

        match step {
            WizardStep::Complete => {
                self.outcome = Some(WizardOutcome::Succeeded);
                Some(StateEvent::Notify(
                    Notification::info("Setup completed successfully").then(Route::Home),
                ))
            }
            WizardStep::Failed => {
                self.outcome = Some(WizardOutcome::Failed);
                Some(StateEvent::Notify(
                    Notification::error("Setup failed, rerun it").then(Route::Home),
                ))
            }
            _ => None,
        }
    }
}
