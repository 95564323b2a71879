//! Wallpaper request adapter.
//!
//! Translates a user prompt and aspect ratio into one provider call and folds
//! every outcome, including transport and provider errors, into a
//! [`GenerationResult`]. Nothing is retried here; retrying is the user's call.

use crate::ai::{ImageGenerationService, ImageRequest, JPEG_MIME_TYPE};
use crate::classify::{classify_error, no_image_failure};
use crate::models::{GenerationRequest, GenerationResult};
use crate::prompts;
use tracing::{error, info, warn};

pub struct WallpaperGenerator {
    images: Box<dyn ImageGenerationService>,
}

impl WallpaperGenerator {
    pub fn new(images: Box<dyn ImageGenerationService>) -> Self {
        Self { images }
    }

    /// Provider parameters for a request: one JPEG at the requested ratio.
    pub fn build_image_request(request: &GenerationRequest) -> ImageRequest {
        ImageRequest {
            prompt: prompts::wallpaper_instruction(request.prompt(), request.aspect_ratio()),
            number_of_images: 1,
            output_mime_type: JPEG_MIME_TYPE.to_string(),
            aspect_ratio: request.aspect_ratio(),
        }
    }

    pub async fn generate(&self, request: &GenerationRequest) -> GenerationResult {
        let image_request = Self::build_image_request(request);
        info!(
            "Generating {} wallpaper for prompt: {}",
            request.aspect_ratio(),
            request.prompt()
        );

        match self.images.generate_images(&image_request).await {
            Ok(images) => match images.into_iter().next() {
                Some(image) => {
                    info!("Generated wallpaper ({} bytes)", image.image_bytes.len());
                    GenerationResult::Success(image.image_bytes)
                }
                None => {
                    warn!("Provider returned no images");
                    GenerationResult::Failure(no_image_failure())
                }
            },
            Err(e) => {
                let raw = e.to_string();
                error!("Error generating wallpaper: {}", raw);
                GenerationResult::Failure(classify_error(&raw))
            }
        }
    }
}
