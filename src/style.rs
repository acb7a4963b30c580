//! Image Style System
//!
//! Styles are a closed set: each one carries the prompt template used to
//! enhance remote generation requests and the fixed catalog image used
//! whenever remote generation is unavailable or fails.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported image styles. Unrecognized style strings parse to the default
/// ([`ImageStyle::Realistic`]), so every style maps to a prompt template and
/// a fallback image by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageStyle {
    Realistic,
    DigitalArt,
    Photographic,
    Anime,
}

impl Default for ImageStyle {
    fn default() -> Self {
        Self::Realistic
    }
}

impl fmt::Display for ImageStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageStyle::Realistic => write!(f, "realistic"),
            ImageStyle::DigitalArt => write!(f, "digital-art"),
            ImageStyle::Photographic => write!(f, "photographic"),
            ImageStyle::Anime => write!(f, "anime"),
        }
    }
}

impl ImageStyle {
    /// All supported styles, in display order.
    pub const ALL: [ImageStyle; 4] = [
        ImageStyle::Realistic,
        ImageStyle::DigitalArt,
        ImageStyle::Photographic,
        ImageStyle::Anime,
    ];

    /// Lenient parse: unknown values fall back to the default style.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "realistic" => ImageStyle::Realistic,
            "digital-art" | "digital_art" => ImageStyle::DigitalArt,
            "photographic" => ImageStyle::Photographic,
            "anime" => ImageStyle::Anime,
            _ => ImageStyle::default(),
        }
    }

    /// Expand a raw prompt into the style-specific enhanced prompt sent to
    /// the remote generation endpoint.
    pub fn enhanced_prompt(&self, prompt: &str) -> String {
        match self {
            ImageStyle::Realistic => format!(
                "photorealistic, high detail, professional photography, 4k, {}",
                prompt
            ),
            ImageStyle::DigitalArt => {
                format!("digital art, concept art, illustration, detailed, {}", prompt)
            }
            ImageStyle::Photographic => format!(
                "professional photography, sharp focus, cinematic lighting, {}",
                prompt
            ),
            ImageStyle::Anime => {
                format!("anime style, Japanese animation, vibrant colors, {}", prompt)
            }
        }
    }

    /// The fixed catalog image substituted when remote generation is
    /// unavailable or fails.
    pub fn fallback_url(&self) -> &'static str {
        match self {
            ImageStyle::Realistic => {
                "https://images.unsplash.com/photo-1506905925346-21bda4d32df4?w=512&h=512&fit=crop"
            }
            ImageStyle::DigitalArt => {
                "https://images.unsplash.com/photo-1541961017774-22349e4a1262?w=512&h=512&fit=crop"
            }
            ImageStyle::Photographic => {
                "https://images.unsplash.com/photo-1518837695005-2083093ee35b?w=512&h=512&fit=crop"
            }
            ImageStyle::Anime => {
                "https://images.unsplash.com/photo-1550745165-9bc0b252726f?w=512&h=512&fit=crop"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_styles() {
        assert_eq!(ImageStyle::parse("realistic"), ImageStyle::Realistic);
        assert_eq!(ImageStyle::parse("digital-art"), ImageStyle::DigitalArt);
        assert_eq!(ImageStyle::parse("Photographic"), ImageStyle::Photographic);
        assert_eq!(ImageStyle::parse(" anime "), ImageStyle::Anime);
    }

    #[test]
    fn test_parse_unknown_style_defaults_to_realistic() {
        assert_eq!(ImageStyle::parse("oil-painting"), ImageStyle::Realistic);
        assert_eq!(ImageStyle::parse(""), ImageStyle::Realistic);
    }

    #[test]
    fn test_enhanced_prompt_interpolates_raw_prompt() {
        let p = ImageStyle::Anime.enhanced_prompt("sunset over mountains");
        assert!(p.starts_with("anime style"));
        assert!(p.ends_with("sunset over mountains"));
    }

    #[test]
    fn test_every_style_has_distinct_fallback() {
        let mut urls: Vec<_> = ImageStyle::ALL.iter().map(|s| s.fallback_url()).collect();
        urls.sort();
        urls.dedup();
        assert_eq!(urls.len(), ImageStyle::ALL.len());
    }

    #[test]
    fn test_serde_kebab_case() {
        let json = serde_json::to_string(&ImageStyle::DigitalArt).unwrap();
        assert_eq!(json, r#""digital-art""#);
    }
}
