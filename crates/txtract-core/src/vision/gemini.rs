//! Gemini `generateContent` client.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

use super::{Result, VisionModel};
use crate::error::VisionError;
use crate::models::config::VisionConfig;

const MAX_ATTEMPTS: u32 = 3;
const INITIAL_BACKOFF_MS: u64 = 500;

/// Sends page images inline (base64 PNG) to a Gemini model.
#[derive(Debug, Clone)]
pub struct GeminiVisionClient {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    endpoint: String,
    timeout: Option<Duration>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
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

impl GeminiVisionClient {
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Self {
        let defaults = VisionConfig::default();
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: model.into(),
            endpoint: defaults.endpoint,
            timeout: None,
        }
    }

    /// Build from config; the key comes from the config or its environment variable.
    pub fn from_config(config: &VisionConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: config.resolved_api_key(),
            model: config.model.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            timeout: (config.timeout_secs > 0).then(|| Duration::from_secs(config.timeout_secs)),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    fn request_body(png: &[u8], prompt: &str) -> serde_json::Value {
        json!({
            "contents": [{
                "parts": [
                    {
                        "inline_data": {
                            "mime_type": "image/png",
                            "data": BASE64_STANDARD.encode(png),
                        }
                    },
                    { "text": prompt }
                ]
            }],
            "generationConfig": {
                "temperature": 0.0,
                "responseMimeType": "application/json"
            }
        })
    }

    async fn send(&self, api_key: &str, body: &serde_json::Value) -> Result<String> {
        let mut delay_ms = INITIAL_BACKOFF_MS;
        let mut attempt = 1;

        loop {
            let resp = self
                .client
                .post(self.url())
                .query(&[("key", api_key)])
                .json(body)
                .send()
                .await?;

            let status = resp.status();
            if status.is_success() {
                let parsed: GenerateResponse = resp
                    .json()
                    .await
                    .map_err(|e| VisionError::ResponseParse(e.to_string()))?;
                return response_text(parsed);
            }

            let text = resp.text().await.unwrap_or_default();
            let retryable = status.as_u16() == 429 || status.is_server_error();
            if !retryable || attempt >= MAX_ATTEMPTS {
                return Err(VisionError::Status {
                    status: status.as_u16(),
                    body: text,
                });
            }

            warn!(
                "Model returned {} on attempt {}, retrying in {}ms",
                status, attempt, delay_ms
            );
            tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            delay_ms = (delay_ms * 2).min(5000);
            attempt += 1;
        }
    }
}

fn response_text(response: GenerateResponse) -> Result<String> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
        .ok_or_else(|| VisionError::ResponseParse("response has no text part".to_string()))
}

#[async_trait]
impl VisionModel for GeminiVisionClient {
    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, png: &[u8], prompt: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| VisionError::Unavailable("no API key configured".to_string()))?;

        let body = Self::request_body(png, prompt);
        debug!("Sending {} byte page image to {}", png.len(), self.model);

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.send(api_key, &body))
                .await
                .map_err(|_| VisionError::Timeout(limit.as_secs()))?,
            None => self.send(api_key, &body).await,
        }
    }
}
