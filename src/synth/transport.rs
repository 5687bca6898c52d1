use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error};

use super::SynthesisError;

/// Default Gemini REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default HTTP timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const MAX_ERROR_BODY: usize = 500;

/// Sends one `generateContent` call and returns the raw response envelope.
///
/// Implementations perform exactly one attempt.
#[async_trait]
pub trait GenAiTransport: Send + Sync {
    /// Posts `body` for `model`, authenticated with `api_key`.
    async fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        body: Value,
    ) -> Result<Value, SynthesisError>;
}

/// `reqwest` transport against the Gemini REST API.
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Builds a transport for `base_url` with a request `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, SynthesisError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SynthesisError::Service {
                status: None,
                message: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[async_trait]
impl GenAiTransport for HttpTransport {
    async fn generate_content(
        &self,
        api_key: &str,
        model: &str,
        body: Value,
    ) -> Result<Value, SynthesisError> {
        // Key goes in a header so it never appears in URLs or logs.
        let resp = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(model, error = %e, "Gemini HTTP request failed");
                SynthesisError::Service {
                    status: None,
                    message: e.to_string(),
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            error!(model, status = status.as_u16(), "Gemini returned an error status");
            return Err(SynthesisError::Service {
                status: Some(status.as_u16()),
                message: truncate(&text, MAX_ERROR_BODY),
            });
        }

        let data = resp.json::<Value>().await.map_err(|e| SynthesisError::Service {
            status: Some(status.as_u16()),
            message: format!("unreadable response envelope: {e}"),
        })?;
        debug!(model, "Gemini response received");
        Ok(data)
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max).collect();
    out.push('…');
    out
}
