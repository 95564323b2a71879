use crate::models::AspectRatio;

pub const WALLPAPER: &str = include_str!("../data/prompts/wallpaper.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// Full provider instruction for an abstract wallpaper in the given format.
pub fn wallpaper_instruction(prompt: &str, aspect_ratio: AspectRatio) -> String {
    render(
        WALLPAPER,
        &[
            ("device", aspect_ratio.device_phrase()),
            ("prompt", prompt),
            ("composition", aspect_ratio.composition_hint()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_multiple_vars() {
        assert_eq!(
            render("{{a}} and {{b}}", &[("a", "cats"), ("b", "dogs")]),
            "cats and dogs"
        );
    }

    #[test]
    fn test_wallpaper_template_has_placeholders() {
        assert!(WALLPAPER.contains("{{device}}"));
        assert!(WALLPAPER.contains("{{prompt}}"));
        assert!(WALLPAPER.contains("{{composition}}"));
    }

    #[test]
    fn test_wide_instruction() {
        assert_eq!(
            wallpaper_instruction("liquid metal waves", AspectRatio::Wide),
            "4K abstract desktop wallpaper, liquid metal waves. High-resolution, cinematic \
             quality, vibrant colors, intricate details, wide composition."
        );
    }

    #[test]
    fn test_tall_instruction() {
        let instruction = wallpaper_instruction("cosmic nebula", AspectRatio::Tall);
        assert!(instruction.contains("mobile phone wallpaper"));
        assert!(instruction.contains("vertical composition"));
        assert!(!instruction.contains("wide composition"));
    }

    #[test]
    fn test_quality_qualifiers_present_for_both_ratios() {
        for ratio in [AspectRatio::Wide, AspectRatio::Tall] {
            let instruction = wallpaper_instruction("fractal bloom", ratio);
            for qualifier in ["4K", "cinematic", "vibrant colors", "intricate details"] {
                assert!(instruction.contains(qualifier), "missing {qualifier} for {ratio}");
            }
            assert!(!instruction.contains("{{"));
        }
    }
}
