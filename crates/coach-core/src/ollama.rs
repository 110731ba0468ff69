//! Client for a local Ollama-compatible model server.

use crate::config::ServerConfig;
use crate::error::{CoachError, Result};
use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::process::{Command, Stdio};
use std::time::Duration;

/// Returned by `generate` when the server answers without a `response` field.
pub const NO_ADVICE: &str = "No advice available.";

const PULL_PENDING_STATUS: &str = "processing...";

/// Anything that can turn a prompt into text with a named model.
pub trait ModelBackend {
    fn generate(&self, model: &str, prompt: &str) -> Result<String>;
}

pub struct OllamaClient {
    endpoint: String,
    client: reqwest::blocking::Client,
    /// Pulls stream for as long as the download takes, so no overall timeout.
    stream_client: reqwest::blocking::Client,
}

impl OllamaClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        let stream_client = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .build()?;
        Ok(Self {
            endpoint,
            client,
            stream_client,
        })
    }

    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        Self::new(&config.endpoint, config.timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// True when `/api/tags` answers with a success status.
    pub fn is_available(&self) -> bool {
        self.client
            .get(self.url("/api/tags"))
            .send()
            .map(|r| r.status().is_success())
            .unwrap_or(false)
    }

    /// Names of the installed models, in server order.
    pub fn list_models(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(self.url("/api/tags"))
            .send()
            .map_err(|e| send_failed("list", e))?;
        let tags: TagsResponse = check_status("list", response)?.json()?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Download `model`, calling `on_status` with every progress line.
    pub fn pull(&self, model: &str, mut on_status: impl FnMut(&str)) -> Result<()> {
        let model = model.trim();
        if model.is_empty() {
            return Err(CoachError::InvalidModelName);
        }
        tracing::info!(model = %model, "pulling model");

        let response = self
            .stream_client
            .post(self.url("/api/pull"))
            .json(&PullRequest {
                name: model,
                stream: true,
            })
            .send()
            .map_err(|e| send_failed("pull", e))?;
        let reader = std::io::BufReader::new(check_status("pull", response)?);

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let progress: PullProgress = serde_json::from_str(&line)?;
            if let Some(error) = progress.error {
                return Err(CoachError::ModelServer {
                    operation: "pull".to_string(),
                    cause: error,
                });
            }
            on_status(progress.status.as_deref().unwrap_or(PULL_PENDING_STATUS));
        }
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.endpoint)
    }
}

impl ModelBackend for OllamaClient {
    fn generate(&self, model: &str, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(self.url("/api/generate"))
            .json(&GenerateRequest {
                model,
                prompt,
                stream: false,
            })
            .send()
            .map_err(|e| send_failed("generate", e))?;
        let body: GenerateResponse = check_status("generate", response)?.json()?;
        Ok(body.response.unwrap_or_else(|| NO_ADVICE.to_string()))
    }
}

fn send_failed(operation: &str, e: reqwest::Error) -> CoachError {
    let error_kind = if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connect"
    } else {
        "request"
    };
    tracing::warn!(operation, error_kind, error = %e, "model server request failed");
    CoachError::ModelServer {
        operation: operation.to_string(),
        cause: format!("{error_kind} error: {e}"),
    }
}

fn check_status(
    operation: &str,
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    tracing::warn!(operation, status = %status, body = %body, "model server returned error status");
    Err(CoachError::ModelServer {
        operation: operation.to_string(),
        cause: format!("status {status}: {body}"),
    })
}

// ---------------------------------------------------------------------------
// Server process
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    AlreadyRunning,
    Started,
}

/// Start `ollama serve` in the background if nothing answers at the endpoint,
/// then give it `boot_wait` to come up.
pub fn ensure_server_running(client: &OllamaClient, boot_wait: Duration) -> Result<ServerStatus> {
    if client.is_available() {
        tracing::debug!(endpoint = %client.endpoint(), "model server is up");
        return Ok(ServerStatus::AlreadyRunning);
    }
    let binary = which::which("ollama").map_err(|_| CoachError::ServerBinaryMissing)?;
    tracing::info!(binary = %binary.display(), "model server not detected, starting it");
    Command::new(binary)
        .arg("serve")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    std::thread::sleep(boot_wait);
    Ok(ServerStatus::Started)
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: Option<String>,
}

#[derive(Debug, Serialize)]
struct PullRequest<'a> {
    name: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct PullProgress {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Debug, Deserialize)]
struct ModelTag {
    name: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
