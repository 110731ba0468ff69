use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoachError {
    #[error("shortcut not found: {0}")]
    ShortcutNotFound(String),

    #[error("invalid app name '{0}': must be a portable file name (no separators, reserved or control characters)")]
    InvalidAppName(String),

    #[error("invalid model name: must not be empty")]
    InvalidModelName,

    #[error("corrupt shortcut storage for '{app}' at {}: {source}", path.display())]
    CorruptStorage {
        app: String,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("model server {operation} failed: {cause}")]
    ModelServer { operation: String, cause: String },

    #[error("'ollama' binary not found on PATH: install it or start the server manually")]
    ServerBinaryMissing,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, CoachError>;
