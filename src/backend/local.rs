//! In-process backend used by the GUI and the CLI

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::backend::{Backend, EventBus, Listener, SetupOptions, launch, setup, validate};
use crate::config::{AppPaths, AvailableCommands, RunnerVersion, Settings};
use crate::error::BackendError;

/// Backend that runs commands on this machine and publishes events on an [`EventBus`]
pub struct LocalBackend {
    paths: AppPaths,
    bus: EventBus,
}

impl LocalBackend {
    pub fn new(paths: AppPaths) -> Self {
        Self {
            paths,
            bus: EventBus::new(),
        }
    }

    fn require_settings(&self) -> Result<Settings, BackendError> {
        Settings::load(&self.paths)?.ok_or(BackendError::NotConfigured)
    }
}

#[async_trait]
impl Backend for LocalBackend {
    async fn listen(&self, channel: &str) -> Result<Listener, BackendError> {
        Ok(self.bus.listen(channel))
    }

    async fn start_setup(&self, options: SetupOptions) -> Result<(), BackendError> {
        let helper = Settings::load(&self.paths)?
            .unwrap_or_default()
            .setup
            .helper;
        setup::spawn_installer(&self.bus, &helper, &options)
    }

    async fn launch_game(&self) -> Result<(), BackendError> {
        let settings = self.require_settings()?;
        launch::spawn_game(&self.bus, &settings)
    }

    async fn stop_game(&self) -> Result<(), BackendError> {
        let settings = self.require_settings()?;
        launch::kill_game(&settings).await
    }

    async fn check_readiness(&self) -> Result<bool, BackendError> {
        let Some(settings) = Settings::load(&self.paths)? else {
            return Ok(false);
        };

        tokio::task::spawn_blocking(move || validate::validate_installation(&settings))
            .await
            .map_err(|e| BackendError::Process(format!("Validation task failed: {}", e)))
    }

    async fn load_settings(&self) -> Result<Settings, BackendError> {
        let mut settings = self.require_settings()?;
        settings.available_wine_versions = Some(available_wine_versions(&self.paths)?);
        settings.available_dxvk_versions = Some(available_dxvk_versions(&self.paths.dxvk_dir())?);
        settings.available_commands = Some(AvailableCommands::detect());
        Ok(settings)
    }

    async fn save_settings(&self, settings: Settings) -> Result<bool, BackendError> {
        settings.save(&self.paths)?;
        Ok(true)
    }

    async fn add_alternate_runtime_version(&self, path: PathBuf) -> Result<(), BackendError> {
        let target = runtime_target(&self.paths, &path)?;
        if target.exists() {
            return Err(BackendError::Path(format!(
                "Version already exists at {}",
                target.display()
            )));
        }
        if !path.is_dir() {
            return Err(BackendError::Path(format!(
                "{} is not an unpacked wine build",
                path.display()
            )));
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        link_dir(&path, &target)?;
        tracing::info!("Added runtime version {} -> {}", path.display(), target.display());
        Ok(())
    }
}

/// Work out where a wine/proton build belongs under the runners directory
fn runtime_target(paths: &AppPaths, source: &Path) -> Result<PathBuf, BackendError> {
    let file_name = source
        .file_name()
        .ok_or_else(|| BackendError::Path("Invalid runtime path".to_string()))?
        .to_string_lossy()
        .into_owned();

    if file_name.ends_with(".tar.xz") || file_name.ends_with(".tar.gz") {
        return Err(BackendError::Path(format!(
            "{} is an archive, unpack it first",
            file_name
        )));
    }

    if file_name.starts_with("wine-") {
        Ok(paths.wine_runners_dir().join(file_name))
    } else if file_name.starts_with("Proton-") || file_name.starts_with("GE-Proton") {
        Ok(paths.proton_runners_dir().join(file_name))
    } else {
        Err(BackendError::Path(format!(
            "Unrecognised runtime name: {}",
            file_name
        )))
    }
}

#[cfg(unix)]
fn link_dir(source: &Path, target: &Path) -> Result<(), BackendError> {
    std::os::unix::fs::symlink(source, target)?;
    Ok(())
}

#[cfg(not(unix))]
fn link_dir(_source: &Path, _target: &Path) -> Result<(), BackendError> {
    Err(BackendError::Path(
        "Linking runtime versions is only supported on Unix".to_string(),
    ))
}

/// Collect subdirectories of `dir` whose `marker` path holds a wine binary
fn collect_runners(dir: &Path, marker: &str) -> Result<Vec<RunnerVersion>, BackendError> {
    let mut versions = Vec::new();
    if !dir.is_dir() {
        return Ok(versions);
    }

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let bin = path.join(marker);
        if path.is_dir() && bin.join("wine").exists() {
            if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
                versions.push(RunnerVersion {
                    name: name.to_string(),
                    path: bin.display().to_string(),
                });
            }
        }
    }

    versions.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(versions)
}

fn available_wine_versions(paths: &AppPaths) -> Result<Vec<RunnerVersion>, BackendError> {
    let mut versions = collect_runners(&paths.wine_runners_dir(), "bin")?;
    versions.extend(collect_runners(&paths.proton_runners_dir(), "files/bin")?);
    Ok(versions)
}

fn available_dxvk_versions(dxvk_dir: &Path) -> Result<Vec<RunnerVersion>, BackendError> {
    let mut versions = Vec::new();
    if !dxvk_dir.is_dir() {
        return Ok(versions);
    }

    for entry in fs::read_dir(dxvk_dir)? {
        let path = entry?.path();
        if validate::check_dxvk_dir(&path).is_ok() {
            if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
                versions.push(RunnerVersion {
                    name: name.to_string(),
                    path: path.display().to_string(),
                });
            }
        }
    }

    versions.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(versions)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> (tempfile::TempDir, LocalBackend) {
        let dir = tempfile::tempdir().unwrap();
        let backend = LocalBackend::new(AppPaths::at(dir.path()));
        (dir, backend)
    }

    #[tokio::test]
    async fn test_readiness_false_without_settings() {
        let (_dir, backend) = backend();
        assert!(!backend.check_readiness().await.unwrap());
    }

    #[tokio::test]
    async fn test_readiness_false_for_empty_installation() {
        let (_dir, backend) = backend();
        backend.save_settings(Settings::default()).await.unwrap();
        assert!(!backend.check_readiness().await.unwrap());
    }

    #[tokio::test]
    async fn test_launch_requires_settings() {
        let (_dir, backend) = backend();
        let err = backend.launch_game().await.unwrap_err();
        assert!(matches!(err, BackendError::NotConfigured));
    }

    #[tokio::test]
    async fn test_load_settings_lists_versions() {
        let (dir, backend) = backend();
        let paths = AppPaths::at(dir.path());

        let wine = paths.wine_runners_dir().join("wine-10.8-staging-amd64/bin");
        fs::create_dir_all(&wine).unwrap();
        fs::write(wine.join("wine"), "").unwrap();
        let proton = paths.proton_runners_dir().join("GE-Proton9-20/files/bin");
        fs::create_dir_all(&proton).unwrap();
        fs::write(proton.join("wine"), "").unwrap();
        fs::create_dir_all(paths.dxvk_dir().join("dxvk-1.10.3/x32")).unwrap();
        fs::create_dir_all(paths.dxvk_dir().join("dxvk-1.10.3/x64")).unwrap();
        fs::create_dir_all(paths.dxvk_dir().join("broken/x64")).unwrap();

        backend.save_settings(Settings::default()).await.unwrap();
        let settings = backend.load_settings().await.unwrap();

        let wine_names: Vec<String> = settings
            .available_wine_versions
            .unwrap()
            .into_iter()
            .map(|v| v.name)
            .collect();
        assert_eq!(wine_names, vec!["wine-10.8-staging-amd64", "GE-Proton9-20"]);

        let dxvk = settings.available_dxvk_versions.unwrap();
        assert_eq!(dxvk.len(), 1);
        assert_eq!(dxvk[0].name, "dxvk-1.10.3");
        assert_eq!(settings.available_commands, Some(AvailableCommands::detect()));
    }

    #[test]
    fn test_runtime_target_classification() {
        let paths = AppPaths::at("/data");
        assert_eq!(
            runtime_target(&paths, Path::new("/dl/wine-9.0")).unwrap(),
            PathBuf::from("/data/runners/wine/wine-9.0")
        );
        assert_eq!(
            runtime_target(&paths, Path::new("/dl/GE-Proton9-20")).unwrap(),
            PathBuf::from("/data/runners/proton/GE-Proton9-20")
        );
        assert!(runtime_target(&paths, Path::new("/dl/wine-9.0.tar.xz")).is_err());
        assert!(runtime_target(&paths, Path::new("/dl/lutris-7.2")).is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_add_runtime_version_links_once() {
        let (dir, backend) = backend();
        let source = dir.path().join("downloads/wine-9.0");
        fs::create_dir_all(source.join("bin")).unwrap();

        backend
            .add_alternate_runtime_version(source.clone())
            .await
            .unwrap();
        assert!(AppPaths::at(dir.path())
            .wine_runners_dir()
            .join("wine-9.0/bin")
            .is_dir());

        let again = backend.add_alternate_runtime_version(source).await;
        assert!(again.is_err());
    }

    #[tokio::test]
    async fn test_listen_uses_bus() {
        let (_dir, backend) = backend();
        let mut listener = backend.listen("game-state").await.unwrap();
        backend.bus.emit("game-state", &"GameRunning").unwrap();
        assert_eq!(listener.try_next(), Some(serde_json::Value::from("GameRunning")));
    }
}
