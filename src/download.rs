//! Saving a generated wallpaper to disk.

use crate::models::AspectRatio;
use crate::Result;
use std::fs;
use std::path::{Path, PathBuf};

pub const FILENAME_PREFIX: &str = "wallpaper";
pub const FILENAME_EXTENSION: &str = "jpeg";
pub const MAX_PROMPT_SLICE_CHARS: usize = 30;

/// Lowercase ASCII alphanumerics and turn everything else into `_`, then keep
/// the first 30 positions. Positions are UTF-16 code units, so a character
/// outside the BMP becomes `__`.
pub fn sanitize_prompt(prompt: &str) -> String {
    prompt
        .chars()
        .flat_map(|c| {
            let (unit, width) = if c.is_ascii_alphanumeric() {
                (c.to_ascii_lowercase(), 1)
            } else {
                ('_', c.len_utf16())
            };
            std::iter::repeat(unit).take(width)
        })
        .take(MAX_PROMPT_SLICE_CHARS)
        .collect()
}

/// `wallpaper_<desktop|mobile>_<sanitized prompt>.jpeg`
pub fn download_filename(prompt: &str, aspect_ratio: AspectRatio) -> String {
    format!(
        "{}_{}_{}.{}",
        FILENAME_PREFIX,
        aspect_ratio.device_tag(),
        sanitize_prompt(prompt),
        FILENAME_EXTENSION
    )
}

/// Write the image bytes untouched into `output_dir`, replacing any same-named file.
pub fn save_wallpaper(output_dir: &Path, filename: &str, image_bytes: &[u8]) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(filename);
    fs::write(&path, image_bytes)?;
    tracing::info!(
        "Saved wallpaper ({} bytes) to {}",
        image_bytes.len(),
        path.display()
    );
    Ok(path)
}
