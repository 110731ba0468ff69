use crate::error::{CoachError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const COACH_DIR: &str = ".coach";
pub const CONFIG_FILE: &str = ".coach/config.yaml";

pub const DEFAULT_DATA_DIR: &str = "shortcuts_data";
pub const SHORTCUT_EXT: &str = "json";

/// Sentinel app name used when the focused window cannot be determined.
pub const UNKNOWN_APP: &str = "Unknown";

const MAX_APP_NAME_LEN: usize = 200;

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn coach_dir(root: &Path) -> PathBuf {
    root.join(COACH_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// `<data_dir>/<app_name>.json`. Callers validate `app_name` first.
pub fn shortcut_file(data_dir: &Path, app_name: &str) -> PathBuf {
    data_dir.join(format!("{app_name}.{SHORTCUT_EXT}"))
}

// ---------------------------------------------------------------------------
// App name validation
// ---------------------------------------------------------------------------

static UNSAFE_RE: OnceLock<Regex> = OnceLock::new();
static RESERVED_RE: OnceLock<Regex> = OnceLock::new();

/// Separators, characters Windows forbids in file names, and control chars.
fn unsafe_re() -> &'static Regex {
    UNSAFE_RE.get_or_init(|| Regex::new(r#"[/\\:*?"<>|\p{Cc}]"#).unwrap())
}

/// DOS device names, which Windows refuses as file stems.
fn reserved_re() -> &'static Regex {
    RESERVED_RE
        .get_or_init(|| Regex::new(r"(?i)^(con|prn|aux|nul|com[1-9]|lpt[1-9])$").unwrap())
}

/// Reject app names that cannot be used verbatim as a portable file stem.
///
/// Names are never rewritten: two apps whose names differ only by an
/// unsafe character would otherwise collide on the same file. Names that
/// differ only by case still share a file on case-insensitive volumes.
pub fn validate_app_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name.len() > MAX_APP_NAME_LEN
        || name.starts_with('.')
        || name.ends_with(['.', ' '])
        || unsafe_re().is_match(name)
        || reserved_re().is_match(name)
    {
        return Err(CoachError::InvalidAppName(name.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_app_names() {
        for name in ["Firefox", "Visual Studio Code", "Unknown", "Cursor (Beta)", "Notes 2"] {
            validate_app_name(name).unwrap_or_else(|_| panic!("expected valid: {name}"));
        }
    }

    #[test]
    fn invalid_app_names() {
        let long = "x".repeat(MAX_APP_NAME_LEN + 1);
        for name in ["", ".", "..", ".hidden", "a/b", "a\\b", "tab\there", "nul\0", long.as_str()] {
            assert!(validate_app_name(name).is_err(), "expected invalid: {name:?}");
        }
    }

    #[test]
    fn windows_unsafe_app_names() {
        for name in [
            "Notes:Zone.Identifier",
            "What?",
            "a*b",
            "say \"hi\"",
            "<tag>",
            "a|b",
            "Trailing.",
            "Trailing ",
            "CON",
            "nul",
            "Lpt1",
        ] {
            assert!(validate_app_name(name).is_err(), "expected invalid: {name:?}");
        }
        for name in ["Console", "Com", "Connect 2", "Mail.app"] {
            validate_app_name(name).unwrap_or_else(|_| panic!("expected valid: {name}"));
        }
    }

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/proj");
        assert_eq!(
            config_path(root),
            PathBuf::from("/tmp/proj/.coach/config.yaml")
        );
        assert_eq!(
            shortcut_file(&root.join(DEFAULT_DATA_DIR), "Firefox"),
            PathBuf::from("/tmp/proj/shortcuts_data/Firefox.json")
        );
    }
}
