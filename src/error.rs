//! Error type shared by the backend command API

use std::io;
use thiserror::Error;

/// Errors returned by backend commands
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("File error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDeserialize(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid path: {0}")]
    Path(String),

    #[error("Process error: {0}")]
    Process(String),

    #[error("Settings have not been created yet, run the setup wizard first")]
    NotConfigured,
}

impl serde::Serialize for BackendError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}
