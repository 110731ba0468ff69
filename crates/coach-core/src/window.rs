//! Which application currently has keyboard focus.

use crate::paths::UNKNOWN_APP;
use thiserror::Error;

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
const FRONTMOST_SCRIPT: &str =
    r#"tell application "System Events" to get name of first process whose frontmost is true"#;

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("active window lookup is not supported on this platform")]
    Unsupported,

    #[error("failed to execute osascript: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("osascript failed: {0}")]
    ScriptFailed(String),

    #[error("focused application has no name")]
    Empty,
}

/// Source of the focused application's display name.
pub trait WindowProvider {
    fn active_app(&self) -> Result<String, WindowError>;
}

impl<F> WindowProvider for F
where
    F: Fn() -> Result<String, WindowError>,
{
    fn active_app(&self) -> Result<String, WindowError> {
        self()
    }
}

/// Asks the OS for the frontmost process. Only macOS is wired up.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemWindowProvider;

impl WindowProvider for SystemWindowProvider {
    #[cfg(target_os = "macos")]
    fn active_app(&self) -> Result<String, WindowError> {
        let output = std::process::Command::new("osascript")
            .arg("-e")
            .arg(FRONTMOST_SCRIPT)
            .output()
            .map_err(WindowError::Spawn)?;
        if !output.status.success() {
            return Err(WindowError::ScriptFailed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        non_empty(String::from_utf8_lossy(&output.stdout).trim())
    }

    #[cfg(not(target_os = "macos"))]
    fn active_app(&self) -> Result<String, WindowError> {
        Err(WindowError::Unsupported)
    }
}

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn non_empty(name: &str) -> Result<String, WindowError> {
    if name.is_empty() {
        Err(WindowError::Empty)
    } else {
        Ok(name.to_string())
    }
}

/// The focused app's name, or `"Unknown"` when it cannot be determined.
pub fn active_app_or_unknown(provider: &dyn WindowProvider) -> String {
    match provider.active_app() {
        Ok(name) => name,
        Err(e) => {
            tracing::debug!(error = %e, "active window lookup failed");
            UNKNOWN_APP.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_success_passes_through() {
        let provider = || -> Result<String, WindowError> { Ok("Xcode".to_string()) };
        assert_eq!(active_app_or_unknown(&provider), "Xcode");
    }

    #[test]
    fn provider_failure_is_unknown() {
        let provider = || -> Result<String, WindowError> {
            Err(WindowError::ScriptFailed("not authorized".to_string()))
        };
        assert_eq!(active_app_or_unknown(&provider), "Unknown");
    }

    #[test]
    fn empty_name_is_an_error() {
        assert!(matches!(non_empty(""), Err(WindowError::Empty)));
        assert_eq!(non_empty("Finder").unwrap(), "Finder");
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn system_provider_unsupported_off_macos() {
        assert!(matches!(
            SystemWindowProvider.active_app(),
            Err(WindowError::Unsupported)
        ));
    }
}
