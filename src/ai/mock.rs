use super::{GeneratedImage, ImageGenerationService, ImageRequest, JPEG_MIME_TYPE};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Smallest byte sequence that still sniffs as a JPEG.
pub const TINY_JPEG: &[u8] = &[
    0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0xFF, 0xD9,
];

#[derive(Debug, Clone)]
enum MockResponse {
    Images(Vec<GeneratedImage>),
    Error(String),
}

/// Scripted image provider. Clones share state so tests can keep a observer.
#[derive(Clone)]
pub struct MockImageGenerationClient {
    responses: Arc<Mutex<Vec<MockResponse>>>,
    requests: Arc<Mutex<Vec<ImageRequest>>>,
    call_count: Arc<Mutex<usize>>,
    delay: Option<Duration>,
}

impl MockImageGenerationClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
            delay: None,
        }
    }

    pub fn with_image_response(self, image_bytes: Vec<u8>) -> Self {
        self.with_images_response(vec![image_bytes])
    }

    pub fn with_images_response(self, images: Vec<Vec<u8>>) -> Self {
        let images = images
            .into_iter()
            .map(|image_bytes| GeneratedImage {
                image_bytes,
                mime_type: Some(JPEG_MIME_TYPE.to_string()),
            })
            .collect();
        self.responses
            .lock()
            .unwrap()
            .push(MockResponse::Images(images));
        self
    }

    /// Respond with zero images and no error.
    pub fn with_empty_response(self) -> Self {
        self.with_images_response(Vec::new())
    }

    pub fn with_error_response(self, error_text: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(MockResponse::Error(error_text.into()));
        self
    }

    /// Hold each call open for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn requests(&self) -> Vec<ImageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockImageGenerationClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageGenerationClient {
    async fn generate_images(&self, request: &ImageRequest) -> Result<Vec<GeneratedImage>> {
        let count = {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
            *count
        };
        self.requests.lock().unwrap().push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let response = {
            let responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                None
            } else {
                Some(responses[(count - 1) % responses.len()].clone())
            }
        };

        match response {
            None => Ok(vec![GeneratedImage {
                image_bytes: TINY_JPEG.to_vec(),
                mime_type: Some(JPEG_MIME_TYPE.to_string()),
            }]),
            Some(MockResponse::Images(images)) => Ok(images),
            Some(MockResponse::Error(text)) => Err(Error::AiProvider(text)),
        }
    }
}
