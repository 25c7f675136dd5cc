//! HTTP synthesis provider
//!
//! Targets JSON-POST synthesis endpoints: the request carries the text and
//! an optional voice identifier, the response body is the encoded audio.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TtsError};
use crate::provider::TtsProvider;

/// Provider for JSON-POST synthesis endpoints
pub struct HttpTtsProvider {
    endpoint: String,
    api_key: Option<String>,
    voice: Option<String>,
    max_chars: usize,
    client: Client,
}

impl HttpTtsProvider {
    /// Create a new HTTP provider
    pub fn new(
        endpoint: &str,
        api_key: Option<String>,
        voice: Option<String>,
        max_chars: usize,
    ) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            voice,
            max_chars,
            client: Client::new(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SynthesisRequest<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    voice: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[async_trait]
impl TtsProvider for HttpTtsProvider {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        let request = SynthesisRequest {
            text,
            voice: self.voice.as_deref(),
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| TtsError::SynthesisFailed {
            provider: "http".into(),
            message: format!("request failed: {}", e),
        })?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok());
            return Err(TtsError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(TtsError::SynthesisFailed {
                provider: "http".into(),
                message: format!("HTTP {}: {}", status.as_u16(), message),
            });
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| TtsError::SynthesisFailed {
                provider: "http".into(),
                message: format!("failed to read audio body: {}", e),
            })?
            .to_vec();

        if audio.is_empty() {
            return Err(TtsError::SynthesisFailed {
                provider: "http".into(),
                message: "empty audio response".into(),
            });
        }

        Ok(audio)
    }

    fn max_chars_per_request(&self) -> usize {
        self.max_chars
    }

    fn name(&self) -> &'static str {
        "http"
    }

    fn is_available(&self) -> Result<()> {
        if self.endpoint.is_empty() {
            return Err(TtsError::ProviderUnavailable(
                "no synthesis endpoint configured".into(),
            ));
        }
        Ok(())
    }
}
