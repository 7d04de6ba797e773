//! Installation checks behind `check_readiness`

use std::path::Path;

use crate::config::Settings;
use crate::error::BackendError;

const REGISTRY_FILES: &[&str] = &["user.reg", "system.reg", "userdef.reg"];

/// Wine prefix has been initialised
pub fn check_wine_prefix(prefix: &Path) -> Result<(), BackendError> {
    let missing: Vec<&str> = REGISTRY_FILES
        .iter()
        .copied()
        .filter(|name| !prefix.join(name).exists())
        .collect();

    if !missing.is_empty() {
        return Err(BackendError::Path(format!(
            "Missing registry files {:?} in wine prefix {:?}",
            missing, prefix
        )));
    }
    Ok(())
}

pub fn check_launcher(launcher: &Path) -> Result<(), BackendError> {
    if launcher.as_os_str().is_empty() || !launcher.is_file() {
        return Err(BackendError::Path(format!(
            "Game launcher not found at {:?}",
            launcher
        )));
    }
    Ok(())
}

pub fn check_wine_bin_dir(wine_path: &Path) -> Result<(), BackendError> {
    if !wine_path.join("wine").exists() {
        return Err(BackendError::Path(format!(
            "wine binary not found in {:?}",
            wine_path
        )));
    }
    Ok(())
}

/// DXVK build carries both architectures
pub fn check_dxvk_dir(dxvk_path: &Path) -> Result<(), BackendError> {
    if !dxvk_path.join("x32").is_dir() || !dxvk_path.join("x64").is_dir() {
        return Err(BackendError::Path(format!(
            "DXVK build incomplete at {:?}",
            dxvk_path
        )));
    }
    Ok(())
}

/// Run every check, logging each failure, and report whether all passed
pub fn validate_installation(settings: &Settings) -> bool {
    let mut checks = vec![
        check_wine_prefix(Path::new(&settings.game.prefix)),
        check_launcher(Path::new(&settings.game.launcher)),
        check_wine_bin_dir(Path::new(&settings.wine.path)),
    ];
    if settings.dxvk.enabled {
        checks.push(check_dxvk_dir(Path::new(&settings.dxvk.path)));
    }

    let mut ready = true;
    for result in checks {
        if let Err(e) = result {
            tracing::warn!("Validation: {}", e);
            ready = false;
        }
    }
    ready
}
