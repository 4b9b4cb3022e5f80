use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dedication {
    pub dedication: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct References {
    pub references: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperRequest {
    pub topic: String,
    pub number_of_chapters: u32,
    pub relevant_parties: String,
    pub key_highlights: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    pub topic: String,
    pub dedication: String,
    pub acknowledgement_section: String,
    pub chapters: Vec<Chapter>,
    pub conclusion: String,
    pub references: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    pub status: String,
    pub version: String,
    pub active_credentials: usize,
    pub total_credentials: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialStatus {
    pub key: String,
    pub expired: bool,
    pub expired_at: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error: String,
    #[serde(default)]
    rate_limited: bool,
}

#[derive(Debug)]
pub enum ClientError {
    Transport(reqwest::Error),
    /// Server answered with a non-success status.
    Api {
        status: StatusCode,
        message: String,
        rate_limited: bool,
    },
    Decode(serde_json::Error),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Transport(e) => write!(f, "request failed: {}", e),
            ClientError::Api { status, message, .. } => write!(f, "server returned {}: {}", status, message),
            ClientError::Decode(e) => write!(f, "invalid response body: {}", e),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(e)
    }
}

/// Typed client for the paper generation API.
pub struct PaperClient {
    client: Client,
    base_url: String,
    admin_key: Option<String>,
}

impl PaperClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            admin_key: None,
        }
    }

    /// Bearer key sent with admin requests.
    pub fn with_admin_key(mut self, key: &str) -> Self {
        self.admin_key = Some(key.to_string());
        self
    }

    pub async fn health(&self) -> Result<Health, ClientError> {
        self.send(self.client.get(self.url("/health"))).await
    }

    pub async fn dedication(&self, topic: &str) -> Result<Dedication, ClientError> {
        self.generate("dedication", &serde_json::json!({ "topic": topic })).await
    }

    pub async fn references(&self, topic: &str) -> Result<References, ClientError> {
        self.generate("references", &serde_json::json!({ "topic": topic })).await
    }

    /// Generate every section of a paper in one request.
    pub async fn paper(&self, request: &PaperRequest) -> Result<Paper, ClientError> {
        self.generate("paper", request).await
    }

    /// POST `body` to `/api/v1/{operation}`.
    pub async fn generate<B, T>(&self, operation: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(&format!("/api/v1/{}", operation));
        self.send(self.client.post(url).json(body)).await
    }

    pub async fn credentials(&self) -> Result<Vec<CredentialStatus>, ClientError> {
        let req = self.admin(self.client.get(self.url("/admin/credentials")));
        self.send(req).await
    }

    /// Number of credentials reset by the sweep.
    pub async fn sweep(&self) -> Result<usize, ClientError> {
        #[derive(Deserialize)]
        struct Sweep {
            reset: usize,
        }
        let req = self.admin(self.client.post(self.url("/admin/credentials/sweep")));
        let sweep: Sweep = self.send(req).await?;
        Ok(sweep.reset)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn admin(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.admin_key {
            Some(key) => req.bearer_auth(key),
            None => req,
        }
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ClientError> {
        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            let (message, rate_limited) = match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => (body.error, body.rate_limited),
                Err(_) => (text, false),
            };
            return Err(ClientError::Api {
                status,
                message,
                rate_limited,
            });
        }

        serde_json::from_str(&text).map_err(ClientError::Decode)
    }
}
