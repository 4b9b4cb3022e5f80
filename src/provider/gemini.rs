//! Gemini `generateContent` backend.
//!
//! # Responsibilities
//! - Build the JSON-mode request for a rendered prompt
//! - Authorize with the credential picked by the orchestrator
//! - Map HTTP and transport failures onto `ProviderError`

use futures_util::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;

use crate::config::ProviderConfig;
use crate::credentials::ApiKey;
use crate::error::ProviderError;
use crate::provider::{ModelBackend, ModelRequest};

const API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP client for the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiBackend {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl GeminiBackend {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::Other(format!("failed to build HTTP client: {}", e)))?;

        // Url::join drops the last segment unless the base ends with '/'
        let mut base_url = base_url;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            ProviderError::Other(format!("invalid provider URL '{}': {}", config.base_url, e))
        })?;
        Self::new(base_url, Duration::from_secs(config.timeout_secs))
    }

    fn endpoint(&self, model: &str) -> Result<Url, ProviderError> {
        self.base_url
            .join(&format!("v1beta/models/{}:generateContent", model))
            .map_err(|e| ProviderError::Other(format!("invalid model endpoint: {}", e)))
    }

    async fn call(&self, api_key: ApiKey, request: &ModelRequest) -> Result<Value, ProviderError> {
        let url = self.endpoint(&request.model)?;
        tracing::debug!(prompt = %request.prompt, model = %request.model, key = %api_key, "Calling provider");

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, api_key.expose())
            .json(&request_body(request))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                message: error_message(&body, status.canonical_reason().unwrap_or("error")),
            });
        }

        parse_output(&body)
    }

    fn transport_error(&self, err: reqwest::Error) -> ProviderError {
        if err.is_timeout() {
            ProviderError::Timeout(self.timeout.as_secs())
        } else {
            ProviderError::Network(error_chain(&err.without_url()))
        }
    }
}

impl ModelBackend for GeminiBackend {
    fn generate<'a>(
        &'a self,
        api_key: ApiKey,
        request: &'a ModelRequest,
    ) -> BoxFuture<'a, Result<Value, ProviderError>> {
        Box::pin(self.call(api_key, request))
    }
}

fn request_body(request: &ModelRequest) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": request.text }],
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": request.response_schema,
        },
        "safetySettings": request.safety_settings,
    })
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

fn error_message(body: &str, fallback: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => match envelope.error.status {
            Some(status) => format!("{} ({})", envelope.error.message, status),
            None => envelope.error.message,
        },
        Err(_) if body.trim().is_empty() => fallback.to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

fn parse_output(body: &str) -> Result<Value, ProviderError> {
    let response: GenerateResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::Decode(e.to_string()))?;

    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates returned".to_string());
        return Err(ProviderError::Other(format!("response blocked: {}", reason)));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
        return Err(ProviderError::Decode(format!("empty output (finish reason {})", reason)));
    }

    serde_json::from_str(strip_fences(&text)).map_err(|e| ProviderError::Decode(e.to_string()))
}

/// Drop a surrounding Markdown code fence, if present.
fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
