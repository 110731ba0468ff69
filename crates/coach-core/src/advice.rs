use crate::config::Profile;
use crate::error::{CoachError, Result};
use crate::ollama::ModelBackend;
use crate::session::CoachSession;
use std::fmt;

/// Shown in place of advice when the model server could not be reached.
pub const UNAVAILABLE_MESSAGE: &str = "Error: Is the model server running?";

// ---------------------------------------------------------------------------
// Focus critique
// ---------------------------------------------------------------------------

pub fn build_prompt(profile: &Profile, app_name: &str) -> String {
    format!(
        "The user is {persona}.\n\
         Current active app: {app_name}.\n\
         Context: {context}\n\
         Task: Give a 1-sentence, witty, and helpful critique of their current focus.",
        persona = profile.persona,
        context = profile.context,
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advice {
    Given(String),
    /// The request failed; the reason is kept for logs and `--json` output.
    Unavailable(String),
}

impl Advice {
    pub fn is_available(&self) -> bool {
        matches!(self, Advice::Given(_))
    }
}

impl fmt::Display for Advice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advice::Given(text) => f.write_str(text.trim()),
            Advice::Unavailable(_) => f.write_str(UNAVAILABLE_MESSAGE),
        }
    }
}

/// Ask the session's model about `app_name`. Never fails: backend errors
/// become [`Advice::Unavailable`].
pub fn request_advice(
    backend: &dyn ModelBackend,
    session: &CoachSession,
    profile: &Profile,
    app_name: &str,
) -> Advice {
    let prompt = build_prompt(profile, app_name);
    match backend.generate(session.model(), &prompt) {
        Ok(text) => Advice::Given(text),
        Err(e) => {
            tracing::warn!(
                model = %session.model(),
                app = %app_name,
                error = %e,
                "advice unavailable"
            );
            Advice::Unavailable(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Shortcut suggestions
// ---------------------------------------------------------------------------

pub fn build_suggestion_prompt(app_name: &str) -> String {
    format!(
        "List the most useful keyboard shortcuts for the application \"{app_name}\".\n\
         Respond with a single JSON object mapping each key combination \
         (for example \"Cmd+L\") to a short description. Only output the JSON, nothing else."
    )
}

/// Ask the model for shortcuts for `app_name`, as `(keys, description)` pairs.
pub fn suggest_shortcuts(
    backend: &dyn ModelBackend,
    model: &str,
    app_name: &str,
) -> Result<Vec<(String, String)>> {
    let reply = backend.generate(model, &build_suggestion_prompt(app_name))?;
    parse_suggestions(&reply)
}

fn parse_suggestions(reply: &str) -> Result<Vec<(String, String)>> {
    let json = extract_json(reply).ok_or_else(|| CoachError::ModelServer {
        operation: "suggest".to_string(),
        cause: format!("no JSON object in reply: {reply}"),
    })?;
    let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
    Ok(map
        .into_iter()
        .filter_map(|(keys, value)| match value {
            serde_json::Value::String(desc) if !keys.trim().is_empty() => {
                Some((keys.trim().to_string(), desc))
            }
            _ => None,
        })
        .collect())
}

/// The outermost `{...}` span of a reply that may have prose around it.
fn extract_json(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
