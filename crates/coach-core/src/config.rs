use crate::error::Result;
use crate::{io, paths};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Seconds to wait after spawning `ollama serve` before polling it.
    #[serde(default = "default_boot_wait")]
    pub boot_wait_secs: u64,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_boot_wait() -> u64 {
    5
}

fn default_timeout() -> u64 {
    120
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            boot_wait_secs: default_boot_wait(),
            timeout_secs: default_timeout(),
        }
    }
}

impl ServerConfig {
    pub fn boot_wait(&self) -> Duration {
        Duration::from_secs(self.boot_wait_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Who the user is and what they should be working on; fed into the
/// advice prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default = "default_persona")]
    pub persona: String,
    #[serde(default = "default_context")]
    pub context: String,
}

fn default_persona() -> String {
    "an Engineering Physics student".to_string()
}

fn default_context() -> String {
    "They have a Fluid Mechanics project and a CAD assignment due soon.".to_string()
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            persona: default_persona(),
            context: default_context(),
        }
    }
}

// ---------------------------------------------------------------------------
// CoachConfig (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Shortcut storage directory, relative to the project root unless absolute.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub profile: Profile,
}

fn default_version() -> u32 {
    1
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(paths::DEFAULT_DATA_DIR)
}

fn default_model() -> String {
    "llama3".to_string()
}

fn default_poll_interval() -> u64 {
    5
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            data_dir: default_data_dir(),
            model: default_model(),
            poll_interval_secs: default_poll_interval(),
            server: ServerConfig::default(),
            profile: Profile::default(),
        }
    }
}

impl CoachConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn data_dir_in(&self, root: &Path) -> PathBuf {
        root.join(&self.data_dir)
    }

    /// Missing config file means defaults.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        match io::read_if_exists(&path)? {
            Some(data) => Ok(serde_yaml::from_str(&data)?),
            None => Ok(Self::default()),
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        io::atomic_write(&path, data.as_bytes())
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.poll_interval_secs == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "poll_interval_secs is 0; the watcher will spin".to_string(),
            });
        }

        if self.model.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "model is empty".to_string(),
            });
        }

        let endpoint = self.server.endpoint.as_str();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "server.endpoint '{endpoint}' must start with http:// or https://"
                ),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
