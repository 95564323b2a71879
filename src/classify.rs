//! Classification of provider failures into user-facing messages.
//!
//! Rules run in a fixed priority order against the raw error text; the first
//! rule that produces a classification wins.

use crate::models::{FailureReason, GenerationFailure};
use serde::Deserialize;

pub const QUOTA_EXCEEDED_MESSAGE: &str =
    "Daily generation quota exceeded. Please try again later or check your API plan.";
pub const SAFETY_BLOCKED_MESSAGE: &str =
    "The prompt triggered safety filters. Please try a different description.";
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Failed to generate wallpaper. Please check the prompt or try again later.";
pub const NO_IMAGE_MESSAGE: &str = "No image was generated. The response may have been blocked.";

/// Raw provider text at or above this many characters is never shown to the user.
pub const MAX_RAW_MESSAGE_CHARS: usize = 200;

const QUOTA_MARKERS: &[&str] = &["429", "RESOURCE_EXHAUSTED"];
const SAFETY_MARKERS: &[&str] = &["SAFETY", "blocked"];

type Rule = fn(&str) -> Option<GenerationFailure>;

const RULES: &[Rule] = &[quota_exceeded, safety_blocked, structured_payload, short_raw_text];

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Map raw provider error text to a classified failure.
pub fn classify_error(text: &str) -> GenerationFailure {
    RULES
        .iter()
        .find_map(|rule| rule(text))
        .unwrap_or_else(generic_failure)
}

pub fn no_image_failure() -> GenerationFailure {
    GenerationFailure::new(FailureReason::NoImageReturned, NO_IMAGE_MESSAGE)
}

fn generic_failure() -> GenerationFailure {
    GenerationFailure::new(FailureReason::Unknown, GENERIC_FAILURE_MESSAGE)
}

fn contains_any(text: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| text.contains(marker))
}

fn quota_exceeded(text: &str) -> Option<GenerationFailure> {
    contains_any(text, QUOTA_MARKERS)
        .then(|| GenerationFailure::new(FailureReason::QuotaExceeded, QUOTA_EXCEEDED_MESSAGE))
}

fn safety_blocked(text: &str) -> Option<GenerationFailure> {
    contains_any(text, SAFETY_MARKERS)
        .then(|| GenerationFailure::new(FailureReason::SafetyBlocked, SAFETY_BLOCKED_MESSAGE))
}

/// Looks for a JSON payload starting at the first `{`.
///
/// A payload that parses but carries no `error.message` settles on the generic
/// message rather than falling through to the raw text.
fn structured_payload(text: &str) -> Option<GenerationFailure> {
    let start = text.find('{')?;
    let envelope: ErrorEnvelope = serde_json::from_str(&text[start..]).ok()?;

    match envelope.error.and_then(|body| body.message) {
        Some(message) => Some(GenerationFailure::new(
            FailureReason::ProviderStructuredError,
            message,
        )),
        None => Some(generic_failure()),
    }
}

/// Length is measured in UTF-16 code units; the text is returned untrimmed.
fn short_raw_text(text: &str) -> Option<GenerationFailure> {
    (!text.is_empty() && text.encode_utf16().count() < MAX_RAW_MESSAGE_CHARS)
        .then(|| GenerationFailure::new(FailureReason::ProviderRawError, text))
}
