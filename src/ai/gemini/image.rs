use super::client::GeminiHttpClient;
use super::types::{OutputOptions, PredictInstance, PredictParameters, PredictRequest, PredictResponse};
use crate::ai::{GeneratedImage, ImageGenerationService, ImageRequest};
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Imagen client speaking the Gemini API `predict` endpoint.
pub struct GeminiImageClient {
    http: GeminiHttpClient,
}

impl GeminiImageClient {
    pub fn new(api_key: String, model: String, timeout: Option<Duration>) -> Self {
        Self::new_with_client(api_key, model, timeout, reqwest::Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
        timeout: Option<Duration>,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: GeminiHttpClient::new_with_client(api_key, model, timeout, client),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    pub fn model(&self) -> &str {
        self.http.model()
    }

    fn build_request(request: &ImageRequest) -> PredictRequest {
        PredictRequest {
            instances: vec![PredictInstance {
                prompt: request.prompt.clone(),
            }],
            parameters: PredictParameters {
                sample_count: request.number_of_images,
                aspect_ratio: request.aspect_ratio.as_provider_str().to_string(),
                output_options: OutputOptions {
                    mime_type: request.output_mime_type.clone(),
                },
            },
        }
    }
}

#[async_trait]
impl ImageGenerationService for GeminiImageClient {
    async fn generate_images(&self, request: &ImageRequest) -> Result<Vec<GeneratedImage>> {
        tracing::debug!(
            "Requesting {} image(s) from {} at {}",
            request.number_of_images,
            self.http.model(),
            request.aspect_ratio
        );

        let response: PredictResponse = self.http.predict(&Self::build_request(request)).await?;

        use base64::Engine as _;
        let mut images = Vec::with_capacity(response.predictions.len());
        for prediction in response.predictions {
            let Some(encoded) = prediction.bytes_base64_encoded else {
                tracing::warn!(
                    "Imagen prediction without image bytes (filtered: {})",
                    prediction.rai_filtered_reason.as_deref().unwrap_or("unspecified")
                );
                continue;
            };

            let image_bytes = base64::engine::general_purpose::STANDARD
                .decode(&encoded)
                .map_err(|e| {
                    Error::AiProvider(format!("Failed to decode Imagen base64 image: {}", e))
                })?;

            images.push(GeneratedImage {
                image_bytes,
                mime_type: prediction.mime_type,
            });
        }

        tracing::debug!("Imagen returned {} image(s)", images.len());
        Ok(images)
    }
}
