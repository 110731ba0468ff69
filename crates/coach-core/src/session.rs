use crate::error::{CoachError, Result};
use thiserror::Error;

// ---------------------------------------------------------------------------
// CoachSession
// ---------------------------------------------------------------------------

/// Per-run state shared by the model menu and the advice flow. There is one
/// owner; everything else receives it by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoachSession {
    model: String,
}

impl CoachSession {
    pub fn new(model: impl Into<String>) -> Result<Self> {
        let mut session = Self {
            model: String::new(),
        };
        session.switch_model(model)?;
        Ok(session)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn switch_model(&mut self, model: impl Into<String>) -> Result<()> {
        let model = model.into();
        let model = model.trim();
        if model.is_empty() {
            return Err(CoachError::InvalidModelName);
        }
        if model != self.model {
            tracing::info!(from = %self.model, to = %model, "switching model");
            self.model = model.to_string();
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Model menu
// ---------------------------------------------------------------------------

/// Menu entry number for "download a new model"; installed models follow it.
pub const PULL_OPTION: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuChoice {
    PullNew,
    Select(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MenuError {
    #[error("please enter a valid number")]
    NotANumber,
    #[error("invalid selection {0}; no changes made")]
    OutOfRange(usize),
}

/// Menu lines in display order: the pull option, then each installed model.
pub fn menu_entries(models: &[String]) -> Vec<(usize, String)> {
    std::iter::once((PULL_OPTION, "[Download & Install a New Model]".to_string()))
        .chain(
            models
                .iter()
                .enumerate()
                .map(|(i, name)| (i + PULL_OPTION + 1, name.clone())),
        )
        .collect()
}

pub fn parse_menu_choice(
    input: &str,
    models: &[String],
) -> std::result::Result<MenuChoice, MenuError> {
    let n: usize = input.trim().parse().map_err(|_| MenuError::NotANumber)?;
    if n == PULL_OPTION {
        return Ok(MenuChoice::PullNew);
    }
    n.checked_sub(PULL_OPTION + 1)
        .and_then(|idx| models.get(idx))
        .map(|name| MenuChoice::Select(name.clone()))
        .ok_or(MenuError::OutOfRange(n))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn models() -> Vec<String> {
        vec!["llama3:latest".to_string(), "phi3:latest".to_string()]
    }

    #[test]
    fn session_switches_and_trims() {
        let mut s = CoachSession::new("llama3").unwrap();
        s.switch_model("  mistral ").unwrap();
        assert_eq!(s.model(), "mistral");
    }

    #[test]
    fn session_rejects_empty_model() {
        assert!(CoachSession::new("").is_err());
        let mut s = CoachSession::new("llama3").unwrap();
        assert!(matches!(s.switch_model("   "), Err(CoachError::InvalidModelName)));
        assert_eq!(s.model(), "llama3");
    }

    #[test]
    fn menu_lists_pull_then_models() {
        let entries = menu_entries(&models());
        assert_eq!(entries[0].0, 1);
        assert_eq!(entries[1], (2, "llama3:latest".to_string()));
        assert_eq!(entries[2], (3, "phi3:latest".to_string()));
    }

    #[test]
    fn menu_choice_parsing() {
        let m = models();
        assert_eq!(parse_menu_choice("1", &m), Ok(MenuChoice::PullNew));
        assert_eq!(
            parse_menu_choice(" 2\n", &m),
            Ok(MenuChoice::Select("llama3:latest".to_string()))
        );
        assert_eq!(
            parse_menu_choice("3", &m),
            Ok(MenuChoice::Select("phi3:latest".to_string()))
        );
        assert_eq!(parse_menu_choice("4", &m), Err(MenuError::OutOfRange(4)));
        assert_eq!(parse_menu_choice("0", &m), Err(MenuError::OutOfRange(0)));
        assert_eq!(parse_menu_choice("two", &m), Err(MenuError::NotANumber));
        assert_eq!(parse_menu_choice("-1", &m), Err(MenuError::NotANumber));
    }

    #[test]
    fn menu_with_no_models_only_offers_pull() {
        assert_eq!(menu_entries(&[]).len(), 1);
        assert_eq!(parse_menu_choice("2", &[]), Err(MenuError::OutOfRange(2)));
    }
}
