//! Interactive session state.
//!
//! A [`Session`] owns the prompt, the selected format and the wallpaper
//! state. It has a single writer: the front end's event loop. At most one
//! generation is in flight, enforced by the `Loading` state rather than any
//! queue or lock.

use crate::download;
use crate::models::{AspectRatio, GenerationRequest, GenerationResult, DEFAULT_PROMPT};
use crate::wallpaper::WallpaperGenerator;
use crate::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WallpaperState {
    Idle,
    Loading,
    Ready(Vec<u8>),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct Session {
    prompt: String,
    aspect_ratio: AspectRatio,
    state: WallpaperState,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(DEFAULT_PROMPT, AspectRatio::Wide)
    }
}

impl Session {
    pub fn new(prompt: impl Into<String>, aspect_ratio: AspectRatio) -> Self {
        Self {
            prompt: prompt.into(),
            aspect_ratio,
            state: WallpaperState::Idle,
        }
    }

    /// Start with the default prompt and a format picked from the viewport width.
    pub fn for_viewport(viewport_width: Option<u32>) -> Self {
        Self::new(
            DEFAULT_PROMPT,
            AspectRatio::for_viewport_width(viewport_width),
        )
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    pub fn state(&self) -> &WallpaperState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, WallpaperState::Loading)
    }

    pub fn image(&self) -> Option<&[u8]> {
        match &self.state {
            WallpaperState::Ready(image) => Some(image.as_slice()),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            WallpaperState::Failed(message) => Some(message.as_str()),
            _ => None,
        }
    }

    /// Whether a generate trigger would currently start a request.
    pub fn can_generate(&self) -> bool {
        !self.is_loading() && !self.prompt.trim().is_empty()
    }

    /// Replace the prompt. Ignored while a request is in flight.
    pub fn set_prompt(&mut self, prompt: impl Into<String>) -> bool {
        if self.is_loading() {
            debug!("Ignoring prompt edit while loading");
            return false;
        }
        self.prompt = prompt.into();
        true
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: AspectRatio) {
        self.aspect_ratio = aspect_ratio;
    }

    /// Enter `Loading` and hand back the request to issue.
    ///
    /// Returns `None`, leaving the session untouched, when the prompt is blank
    /// or a request is already in flight.
    pub fn begin_generation(&mut self) -> Option<GenerationRequest> {
        if self.is_loading() {
            debug!("Generation already in flight; ignoring trigger");
            return None;
        }
        let request = GenerationRequest::new(&self.prompt, self.aspect_ratio)?;
        self.state = WallpaperState::Loading;
        Some(request)
    }

    /// Apply a finished result. Results arriving outside `Loading` are dropped.
    pub fn complete(&mut self, result: GenerationResult) {
        if !self.is_loading() {
            warn!("Discarding generation result received while not loading");
            return;
        }
        self.state = match result {
            GenerationResult::Success(image) => WallpaperState::Ready(image),
            GenerationResult::Failure(failure) => WallpaperState::Failed(failure.message),
        };
    }

    /// Run one full generation. Returns `false` when the trigger was a no-op.
    pub async fn generate(&mut self, generator: &WallpaperGenerator) -> bool {
        let Some(request) = self.begin_generation() else {
            return false;
        };
        let result = generator.generate(&request).await;
        self.complete(result);
        true
    }

    /// Filename the held image would be saved under.
    pub fn download_filename(&self) -> String {
        download::download_filename(&self.prompt, self.aspect_ratio)
    }

    /// Save the held image into `output_dir`. `Ok(None)` when nothing is held.
    pub fn download(&self, output_dir: &Path) -> Result<Option<PathBuf>> {
        let Some(image) = self.image() else {
            debug!("Download requested with no image held");
            return Ok(None);
        };
        download::save_wallpaper(output_dir, &self.download_filename(), image).map(Some)
    }
}
