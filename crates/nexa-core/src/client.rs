use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::health::HealthPath;

#[derive(Serialize)]
struct PromptRequest<'a> {
    prompt: &'a str,
}

#[derive(Deserialize)]
struct PromptResponse {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    data: Option<PromptData>,
}

#[derive(Deserialize)]
struct PromptData {
    #[serde(default)]
    text: Option<String>,
}

/// `{ "ok": false, "error": { "code": ..., "message": ... } }`
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
struct HealthResponse {
    ok: bool,
    #[serde(default)]
    loaded_campuses: Option<Vec<serde_json::Value>>,
    #[serde(default)]
    has_api_key: Option<bool>,
}

/// What `/prompt` answered with on a 2xx
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptReply {
    Answer(String),
    /// 2xx, but no usable `response` text
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub ok: bool,
    pub campuses: Option<usize>,
    pub has_api_key: Option<bool>,
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(
        "backend returned {status} ({}): {}",
        .code.as_deref().unwrap_or("no code"),
        .message.as_deref().unwrap_or("no message")
    )]
    Status {
        status: StatusCode,
        code: Option<String>,
        message: Option<String>,
    },

    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// HTTP client for the assistant backend
#[derive(Clone)]
pub struct AssistantClient {
    client: Client,
    base_url: String,
}

impl AssistantClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `POST <base>/prompt` with `{ "prompt": text }`.
    pub async fn prompt(&self, text: &str) -> Result<PromptReply, ClientError> {
        let url = format!("{}/prompt", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&PromptRequest { prompt: text })
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let parsed: PromptResponse = serde_json::from_slice(&body)?;
        let text = parsed
            .response
            .filter(|r| !r.is_empty())
            .or_else(|| parsed.data.and_then(|d| d.text))
            .filter(|r| !r.is_empty());

        Ok(match text {
            Some(text) => PromptReply::Answer(text),
            None => PromptReply::Empty,
        })
    }

    /// `GET <base>/health` (or `GET <base>/` for the root probe).
    pub async fn health(&self, path: HealthPath) -> Result<HealthReport, ClientError> {
        let url = format!("{}{}", self.base_url, path.as_str());

        let response = self.client.get(&url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        // The root probe serves the web app, not JSON; reachability is all it tells us
        if path == HealthPath::Root {
            return Ok(HealthReport {
                ok: true,
                campuses: None,
                has_api_key: None,
            });
        }

        let body = response.bytes().await?;
        let parsed: HealthResponse = serde_json::from_slice(&body)?;
        Ok(HealthReport {
            ok: parsed.ok,
            campuses: parsed.loaded_campuses.map(|c| c.len()),
            has_api_key: parsed.has_api_key,
        })
    }
}

fn status_error(status: StatusCode, body: &[u8]) -> ClientError {
    let error = serde_json::from_slice::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error);
    let (code, message) = match error {
        Some(e) => (e.code, e.message),
        None => (None, None),
    };
    ClientError::Status { status, code, message }
}
