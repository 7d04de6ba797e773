use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::BackendError;

/// Name of the settings document inside the data directory
const SETTINGS_FILE: &str = "config.toml";

/// Settings document shared between the backend and the settings screen
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub wine: WineSettings,
    #[serde(default)]
    pub dxvk: DxvkSettings,
    #[serde(default)]
    pub game: GameSettings,
    #[serde(default)]
    pub setup: SetupSettings,

    /// Runner versions found on disk, filled in by `load_settings`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_wine_versions: Option<Vec<RunnerVersion>>,

    /// DXVK versions found on disk, filled in by `load_settings`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_dxvk_versions: Option<Vec<RunnerVersion>>,

    /// Optional launch wrappers found on PATH, filled in by `load_settings`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_commands: Option<AvailableCommands>,
}

/// A named runner or runtime install on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerVersion {
    pub name: String,
    pub path: String,
}

/// Optional launch wrappers and whether each is installed.
///
/// A toggle for a missing wrapper is kept in the document but has no
/// effect at launch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableCommands {
    pub mangohud: bool,
    pub gamemoderun: bool,
}

impl AvailableCommands {
    /// Look both wrappers up on PATH
    pub fn detect() -> Self {
        Self::detect_with(|command| which::which(command).is_ok())
    }

    pub fn detect_with(is_available: impl Fn(&str) -> bool) -> Self {
        Self {
            mangohud: is_available("mangohud"),
            gamemoderun: is_available("gamemoderun"),
        }
    }
}

/// Wine runner settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WineSettings {
    #[serde(default)]
    pub version: String,
    /// Directory holding the `wine` and `wineserver` binaries
    #[serde(default)]
    pub path: String,
    #[serde(default = "default_true")]
    pub esync: bool,
    #[serde(default = "default_true")]
    pub fsync: bool,
    #[serde(default)]
    pub feral_gamemode: bool,
}

impl Default for WineSettings {
    fn default() -> Self {
        Self {
            version: String::new(),
            path: String::new(),
            esync: true,
            fsync: true,
            feral_gamemode: false,
        }
    }
}

/// DXVK runtime settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DxvkSettings {
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub path: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for DxvkSettings {
    fn default() -> Self {
        Self {
            version: String::new(),
            path: String::new(),
            enabled: true,
        }
    }
}

/// Game installation settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameSettings {
    /// Wine prefix the game is installed into
    #[serde(default)]
    pub prefix: String,
    /// Working directory for the launcher
    #[serde(default)]
    pub directory: String,
    /// Path to GameLauncher.exe
    #[serde(default)]
    pub launcher: String,
    #[serde(default)]
    pub mangohud: bool,
    #[serde(default)]
    pub environment_variables: Vec<KeyValue>,
    #[serde(default)]
    pub dll_overrides: Vec<KeyValue>,
}

/// Installer helper settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupSettings {
    /// External program that performs the installation and prints step tags
    #[serde(default = "default_helper")]
    pub helper: String,
}

impl Default for SetupSettings {
    fn default() -> Self {
        Self {
            helper: default_helper(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

fn default_true() -> bool {
    true
}

fn default_helper() -> String {
    "sbrw-setup".to_string()
}

/// Filesystem locations used by the utility
#[derive(Debug, Clone)]
pub struct AppPaths {
    data_dir: PathBuf,
}

impl AppPaths {
    /// Resolve the per-user data directory (`~/.local/share/sbrw-utility` on Linux)
    pub fn discover() -> Result<Self, BackendError> {
        let dirs = directories::ProjectDirs::from("com", "sbrw", "sbrw-utility")
            .ok_or_else(|| BackendError::Path("Could not determine data directory".to_string()))?;
        Ok(Self::at(dirs.data_dir()))
    }

    /// Use an explicit data directory
    pub fn at(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn settings_file(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }

    pub fn wine_runners_dir(&self) -> PathBuf {
        self.data_dir.join("runners").join("wine")
    }

    pub fn proton_runners_dir(&self) -> PathBuf {
        self.data_dir.join("runners").join("proton")
    }

    pub fn dxvk_dir(&self) -> PathBuf {
        self.data_dir.join("runtime").join("dxvk")
    }
}

impl Settings {
    /// Load the settings document, `Ok(None)` when setup has never run
    pub fn load(paths: &AppPaths) -> Result<Option<Self>, BackendError> {
        let path = paths.settings_file();

        if !path.exists() {
            tracing::info!("No settings file at {:?}", path);
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        let settings: Settings = toml::from_str(&content)?;
        tracing::debug!("Loaded settings from {:?}", path);
        Ok(Some(settings))
    }

    /// Write the settings document, dropping everything `load_settings` discovered
    pub fn save(&self, paths: &AppPaths) -> Result<(), BackendError> {
        let path = paths.settings_file();
        std::fs::create_dir_all(paths.data_dir())?;

        let mut persisted = self.clone();
        persisted.available_wine_versions = None;
        persisted.available_dxvk_versions = None;
        persisted.available_commands = None;

        let content = toml::to_string_pretty(&persisted)?;
        std::fs::write(&path, content)?;
        tracing::info!("Saved settings to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::at(dir.path());
        assert!(Settings::load(&paths).unwrap().is_none());
    }

    #[test]
    fn test_save_then_load_drops_available_versions() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::at(dir.path().join("nested"));

        let mut settings = Settings::default();
        settings.game.prefix = "/games/nfsw".to_string();
        settings.game.dll_overrides.push(KeyValue {
            key: "dinput8".to_string(),
            value: "n,b".to_string(),
        });
        settings.available_wine_versions = Some(vec![RunnerVersion {
            name: "wine-10.8".to_string(),
            path: "/runners/wine-10.8/bin".to_string(),
        }]);

        settings.save(&paths).unwrap();
        let loaded = Settings::load(&paths).unwrap().unwrap();

        assert_eq!(loaded.game.prefix, "/games/nfsw");
        assert_eq!(loaded.game.dll_overrides.len(), 1);
        assert!(loaded.available_wine_versions.is_none());
    }

    #[test]
    fn test_save_drops_command_availability() {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths::at(dir.path());

        let mut settings = Settings::default();
        settings.game.mangohud = true;
        settings.available_commands = Some(AvailableCommands {
            mangohud: false,
            gamemoderun: true,
        });
        settings.save(&paths).unwrap();

        let content = std::fs::read_to_string(paths.settings_file()).unwrap();
        assert!(!content.contains("available_commands"));
        let loaded = Settings::load(&paths).unwrap().unwrap();
        assert!(loaded.game.mangohud);
        assert!(loaded.available_commands.is_none());
    }

    #[test]
    fn test_detect_commands_per_wrapper() {
        let only_gamemode = AvailableCommands::detect_with(|command| command == "gamemoderun");
        assert_eq!(
            only_gamemode,
            AvailableCommands {
                mangohud: false,
                gamemoderun: true,
            }
        );

        let json = serde_json::to_value(AvailableCommands::detect_with(|_| true)).unwrap();
        assert_eq!(json, serde_json::json!({"mangohud": true, "gamemoderun": true}));
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let settings: Settings = toml::from_str("[game]\nprefix = \"/p\"\n").unwrap();
        assert_eq!(settings.game.prefix, "/p");
        assert!(settings.wine.esync);
        assert!(settings.dxvk.enabled);
        assert_eq!(settings.setup.helper, "sbrw-setup");
    }

    #[test]
    fn test_app_paths_layout() {
        let paths = AppPaths::at("/data");
        assert_eq!(paths.settings_file(), PathBuf::from("/data/config.toml"));
        assert_eq!(paths.wine_runners_dir(), PathBuf::from("/data/runners/wine"));
        assert_eq!(paths.proton_runners_dir(), PathBuf::from("/data/runners/proton"));
        assert_eq!(paths.dxvk_dir(), PathBuf::from("/data/runtime/dxvk"));
    }
}
