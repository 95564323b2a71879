use crate::{Error, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Lightweight Gemini REST client shared by the generation endpoints.
pub struct GeminiHttpClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Option<Duration>,
}

impl GeminiHttpClient {
    /// Construct a Gemini client on top of a caller-supplied `reqwest::Client`.
    ///
    /// `model` should be the bare model ID (for example `imagen-4.0-generate-001`),
    /// not a `models/...`-prefixed path segment. A `timeout` of `None` lets a
    /// request wait for as long as the provider takes.
    pub fn new_with_client(
        api_key: String,
        model: String,
        timeout: Option<Duration>,
        client: Client,
    ) -> Self {
        let model = model.strip_prefix("models/").unwrap_or(&model).to_string();

        Self {
            client,
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Returns the configured model ID without the `models/` prefix.
    pub fn model(&self) -> &str {
        &self.model
    }

    async fn post_to_url<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        url: String,
        request: &Req,
    ) -> Result<Resp> {
        let mut builder = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(request);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("Failed to send request to Gemini: {}", e);
            e
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!("Gemini API error (status {}): {}", status, error_text);
            return Err(Error::AiProvider(format!(
                "Gemini API error (status {}): {}",
                status, error_text
            )));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}\nBody: {}", e, body);
            Error::AiProvider(format!("Failed to parse Gemini response: {}", e))
        })
    }

    /// Calls the `predict` endpoint used by Imagen models.
    pub async fn predict<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        request: &Req,
    ) -> Result<Resp> {
        let url = format!("{}/v1beta/models/{}:predict", self.base_url, self.model);
        self.post_to_url(url, request).await
    }
}
