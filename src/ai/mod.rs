//! AI image generation providers
//!
//! Defines the provider-agnostic image generation seam and the Gemini
//! (Imagen) implementation behind it.

pub mod gemini;
pub mod mime;
pub mod mock;

pub use gemini::GeminiImageClient;
pub use mock::MockImageGenerationClient;

use crate::models::AspectRatio;
use crate::Result;
use async_trait::async_trait;

pub const JPEG_MIME_TYPE: &str = "image/jpeg";

/// Provider-level parameters for one generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub prompt: String,
    pub number_of_images: u32,
    pub output_mime_type: String,
    pub aspect_ratio: AspectRatio,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub image_bytes: Vec<u8>,
    pub mime_type: Option<String>,
}

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Returns every image the provider produced, possibly none.
    async fn generate_images(&self, request: &ImageRequest) -> Result<Vec<GeneratedImage>>;
}
