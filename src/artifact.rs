//! Content Artifact Model
//!
//! A `ContentArtifact` is the unit of generated output: body text, image
//! reference and fingerprint, assembled atomically and immutable afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::style::ImageStyle;
use crate::templates::Language;

/// User input for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub title: String,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub image_prompt: Option<String>,
    #[serde(default)]
    pub image_style: ImageStyle,
}

impl GenerationRequest {
    pub fn new(title: impl Into<String>, language: Language) -> Self {
        Self {
            title: title.into(),
            language,
            image_prompt: None,
            image_style: ImageStyle::default(),
        }
    }

    pub fn with_image(mut self, prompt: impl Into<String>, style: ImageStyle) -> Self {
        self.image_prompt = Some(prompt.into());
        self.image_style = style;
        self
    }

    /// The title with surrounding whitespace removed; empty means the
    /// request cannot produce an artifact.
    pub fn trimmed_title(&self) -> &str {
        self.title.trim()
    }

    /// The image prompt with surrounding whitespace removed, if any
    /// non-empty prompt was supplied.
    pub fn trimmed_prompt(&self) -> Option<&str> {
        self.image_prompt
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }
}

/// A fully assembled, immutable unit of generated content.
///
/// Built atomically after text and image are both resolved; never exposed
/// partially constructed. The fingerprint is computed over `body_text`, so
/// recomputing the digest over the body at any later time reproduces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentArtifact {
    pub id: Uuid,
    pub title: String,
    pub language: Language,
    pub body_text: String,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub fingerprint: String,
    #[serde(default)]
    pub image_prompt: Option<String>,
    pub image_style: ImageStyle,
}
