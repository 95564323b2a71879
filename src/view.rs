//! Terminal rendering of the session screen.

use crate::ai::mime::detect_image_mime;
use crate::models::AspectRatio;
use crate::session::{Session, WallpaperState};
use std::io::Cursor;

pub const TITLE: &str = "Abstract 4K Wallpaper Creator";
pub const TAGLINE: &str = "Craft your perfect desktop background with the power of AI";

/// What the terminal can tell about a held image without decoding it fully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePreview {
    pub byte_len: usize,
    pub mime_type: Option<&'static str>,
    pub dimensions: Option<(u32, u32)>,
}

impl ImagePreview {
    pub fn inspect(image_bytes: &[u8]) -> Self {
        let dimensions = image::ImageReader::new(Cursor::new(image_bytes))
            .with_guessed_format()
            .ok()
            .and_then(|reader| reader.into_dimensions().ok());

        Self {
            byte_len: image_bytes.len(),
            mime_type: detect_image_mime(image_bytes),
            dimensions,
        }
    }
}

pub fn render_header() -> String {
    format!("=== {} ===\n{}", TITLE, TAGLINE)
}

pub fn render_display(session: &Session) -> String {
    match session.state() {
        WallpaperState::Loading => "[ Generating your masterpiece... ]\n\
             This can take a moment. High-quality art needs time!"
            .to_string(),
        WallpaperState::Ready(image) => {
            let preview = ImagePreview::inspect(image);
            let mut line = format!(
                "[ Wallpaper ready: {} bytes, {}",
                preview.byte_len,
                preview.mime_type.unwrap_or("unknown format")
            );
            if let Some((width, height)) = preview.dimensions {
                line.push_str(&format!(", {}x{}", width, height));
            }
            line.push_str(" ]");
            line
        }
        WallpaperState::Idle | WallpaperState::Failed(_) => "[ Your 4K Wallpaper Awaits ]\n\
             Select your format and describe an abstract concept."
            .to_string(),
    }
}

/// Persistent error banner, present only in the failed state.
pub fn render_error(session: &Session) -> Option<String> {
    session
        .error_message()
        .map(|message| format!("Error: {}", message))
}

pub fn render_controls(session: &Session) -> String {
    let formats = [AspectRatio::Wide, AspectRatio::Tall]
        .iter()
        .map(|ratio| {
            if *ratio == session.aspect_ratio() {
                format!("[{}]", ratio.label())
            } else {
                format!(" {} ", ratio.label())
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    let action = if session.is_loading() {
        "Creating..."
    } else if session.can_generate() {
        "Generate"
    } else {
        "Generate (enter a prompt first)"
    };

    format!(
        "Format: {}\nPrompt: {}\nAction: {}",
        formats,
        session.prompt(),
        action
    )
}

/// Download action, offered only while an image is held.
pub fn render_download(session: &Session) -> Option<String> {
    session
        .image()
        .map(|_| format!("Download 4K -> {}", session.download_filename()))
}

pub fn render(session: &Session) -> String {
    let mut sections = vec![render_header(), render_display(session)];
    sections.extend(render_error(session));
    sections.push(render_controls(session));
    sections.extend(render_download(session));
    sections.join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FailureReason, GenerationFailure, GenerationResult};
    use image::ImageFormat;

    fn create_test_png(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 0, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn session_with(result: GenerationResult) -> Session {
        let mut session = Session::new("Liquid Metal Waves!", AspectRatio::Wide);
        session.begin_generation();
        session.complete(result);
        session
    }

    #[test]
    fn test_inspect_png_dimensions() {
        let preview = ImagePreview::inspect(&create_test_png(16, 9));
        assert_eq!(preview.mime_type, Some("image/png"));
        assert_eq!(preview.dimensions, Some((16, 9)));
    }

    #[test]
    fn test_inspect_garbage() {
        let preview = ImagePreview::inspect(&[1, 2, 3]);
        assert_eq!(preview.byte_len, 3);
        assert_eq!(preview.mime_type, None);
        assert_eq!(preview.dimensions, None);
    }

    #[test]
    fn test_idle_screen_shows_placeholder_without_banner_or_download() {
        let session = Session::default();
        let screen = render(&session);
        assert!(screen.contains(TITLE));
        assert!(screen.contains("Your 4K Wallpaper Awaits"));
        assert!(!screen.contains("Error:"));
        assert!(!screen.contains("Download 4K"));
        assert!(screen.contains("[Desktop (16:9)]"));
    }

    #[test]
    fn test_loading_screen() {
        let mut session = Session::default();
        session.begin_generation();
        let screen = render(&session);
        assert!(screen.contains("Generating your masterpiece..."));
        assert!(screen.contains("Action: Creating..."));
    }

    #[test]
    fn test_ready_screen_offers_download() {
        let session = session_with(GenerationResult::Success(create_test_png(4, 2)));
        let screen = render(&session);
        assert!(screen.contains("Wallpaper ready"));
        assert!(screen.contains("4x2"));
        assert!(screen.contains("Download 4K -> wallpaper_desktop_liquid_metal_waves_.jpeg"));
    }

    #[test]
    fn test_failed_screen_shows_banner() {
        let session = session_with(GenerationResult::Failure(GenerationFailure::new(
            FailureReason::SafetyBlocked,
            "The prompt triggered safety filters. Please try a different description.",
        )));
        assert_eq!(
            render_error(&session).as_deref(),
            Some("Error: The prompt triggered safety filters. Please try a different description.")
        );
        assert!(render_download(&session).is_none());
        assert!(render(&session).contains("Your 4K Wallpaper Awaits"));
    }

    #[test]
    fn test_blank_prompt_disables_generate() {
        let session = Session::new("  ", AspectRatio::Tall);
        let controls = render_controls(&session);
        assert!(controls.contains("[Mobile (9:16)]"));
        assert!(controls.contains("enter a prompt first"));
    }
}
