//! Imagen `predict` payload types.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct PredictRequest {
    pub instances: Vec<PredictInstance>,
    pub parameters: PredictParameters,
}

#[derive(Debug, Serialize)]
pub struct PredictInstance {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictParameters {
    pub sample_count: u32,
    pub aspect_ratio: String,
    pub output_options: OutputOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputOptions {
    pub mime_type: String,
}

/// Top-level `predict` response envelope.
///
/// Imagen omits `predictions` entirely when every sample was filtered.
#[derive(Debug, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub bytes_base64_encoded: Option<String>,
    pub mime_type: Option<String>,
    pub rai_filtered_reason: Option<String>,
}
