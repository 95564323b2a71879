//! Data models and structures
//!
//! Defines the wallpaper request/result types shared by the adapter, the
//! session state machine and the terminal front end, plus the runtime
//! configuration loaded from the environment.

use crate::ai::gemini::client::DEFAULT_BASE_URL;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Viewports narrower than this start in the mobile format.
pub const MOBILE_VIEWPORT_BREAKPOINT: u32 = 768;

pub const DEFAULT_PROMPT: &str = "cosmic nebula with vibrant colors";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    /// 16:9, desktop oriented.
    #[serde(rename = "16:9")]
    Wide,
    /// 9:16, mobile oriented.
    #[serde(rename = "9:16")]
    Tall,
}

impl AspectRatio {
    /// Pick the starting format from a viewport width in pixels.
    pub fn for_viewport_width(width: Option<u32>) -> Self {
        match width {
            Some(width) if width < MOBILE_VIEWPORT_BREAKPOINT => AspectRatio::Tall,
            _ => AspectRatio::Wide,
        }
    }

    /// Ratio string understood by the image provider.
    pub fn as_provider_str(&self) -> &'static str {
        match self {
            AspectRatio::Wide => "16:9",
            AspectRatio::Tall => "9:16",
        }
    }

    /// Device phrase embedded in the generation instruction.
    pub fn device_phrase(&self) -> &'static str {
        match self {
            AspectRatio::Wide => "desktop",
            AspectRatio::Tall => "mobile phone",
        }
    }

    pub fn composition_hint(&self) -> &'static str {
        match self {
            AspectRatio::Wide => "wide composition",
            AspectRatio::Tall => "vertical composition",
        }
    }

    /// Short device tag used in download filenames.
    pub fn device_tag(&self) -> &'static str {
        match self {
            AspectRatio::Wide => "desktop",
            AspectRatio::Tall => "mobile",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AspectRatio::Wide => "Desktop (16:9)",
            AspectRatio::Tall => "Mobile (9:16)",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_provider_str())
    }
}

impl FromStr for AspectRatio {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "16:9" | "wide" | "desktop" => Ok(AspectRatio::Wide),
            "9:16" | "tall" | "mobile" => Ok(AspectRatio::Tall),
            other => Err(Error::Config(format!(
                "Unknown aspect ratio '{}'. Expected desktop (16:9) or mobile (9:16)",
                other
            ))),
        }
    }
}

/// A single user-triggered generation. Immutable once issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    prompt: String,
    aspect_ratio: AspectRatio,
}

impl GenerationRequest {
    /// Returns `None` when the prompt is blank after trimming.
    pub fn new(prompt: &str, aspect_ratio: AspectRatio) -> Option<Self> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return None;
        }
        Some(Self {
            prompt: prompt.to_string(),
            aspect_ratio,
        })
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    QuotaExceeded,
    SafetyBlocked,
    ProviderStructuredError,
    ProviderRawError,
    NoImageReturned,
    Unknown,
}

/// A classified, user-presentable generation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationFailure {
    pub reason: FailureReason,
    pub message: String,
}

impl GenerationFailure {
    pub fn new(reason: FailureReason, message: impl Into<String>) -> Self {
        Self {
            reason,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResult {
    /// Encoded image bytes exactly as the provider returned them.
    Success(Vec<u8>),
    Failure(GenerationFailure),
}

impl GenerationResult {
    pub fn is_success(&self) -> bool {
        matches!(self, GenerationResult::Success(_))
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub image_model: String,
    pub api_base_url: String,
    pub request_timeout: Option<Duration>,
    pub output_dir: PathBuf,
    pub viewport_width: Option<u32>,
}

impl Config {
    pub const DEFAULT_IMAGE_MODEL: &'static str = "imagen-4.0-generate-001";

    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let api_key = non_empty("API_KEY")
            .or_else(|| non_empty("GEMINI_API_KEY"))
            .ok_or_else(|| Error::MissingCredential("API_KEY".to_string()))?;

        let request_timeout = non_empty("REQUEST_TIMEOUT_SECS")
            .map(|raw| {
                raw.trim().parse::<u64>().map(Duration::from_secs).map_err(|_| {
                    Error::Config(format!("REQUEST_TIMEOUT_SECS must be an integer, got '{}'", raw))
                })
            })
            .transpose()?;

        let viewport_width = non_empty("VIEWPORT_WIDTH")
            .map(|raw| {
                raw.trim().parse::<u32>().map_err(|_| {
                    Error::Config(format!("VIEWPORT_WIDTH must be an integer, got '{}'", raw))
                })
            })
            .transpose()?;

        Ok(Self {
            api_key,
            image_model: non_empty("IMAGE_MODEL")
                .unwrap_or_else(|| Self::DEFAULT_IMAGE_MODEL.to_string()),
            api_base_url: non_empty("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            request_timeout,
            output_dir: PathBuf::from(non_empty("OUTPUT_DIR").unwrap_or_else(|| "output".into())),
            viewport_width,
        })
    }
}
