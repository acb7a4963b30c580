//! Image Acquisition Service
//!
//! Resolves a styled image for a prompt, preferring the remote generation
//! endpoint and falling back to the fixed per-style catalog on any failure
//! or missing credential. `acquire_image` never raises past its boundary:
//! it always resolves to some valid image reference.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use reqwest::multipart;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::style::ImageStyle;

/// Default remote generation endpoint.
pub const DEFAULT_API_URL: &str = "https://api.stability.ai/v2beta/stable-image/generate/core";

/// Environment variable supplying the bearer credential. Absence is a
/// supported configuration state, not an error.
pub const API_KEY_ENV: &str = "STABILITY_API_KEY";

/// Environment variable overriding the generation endpoint.
pub const API_URL_ENV: &str = "STABILITY_API_URL";

const REQUEST_TIMEOUT_SECS: u64 = 60;
const OUTPUT_FORMAT: &str = "webp";
const DIAGNOSTIC_BODY_LIMIT: usize = 512;
const FILENAME_PROMPT_PREFIX_LEN: usize = 20;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("API error {status}: {detail}")]
    Api { status: u16, detail: String },

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("image is a remote catalog reference with no local data: {0}")]
    RemoteReference(String),

    #[error("invalid image payload: {0}")]
    Payload(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ImageError {
    fn from(err: reqwest::Error) -> Self {
        ImageError::Http(err.to_string())
    }
}

/// Remote image generation configuration, read from the environment.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            api_url: std::env::var(API_URL_ENV).unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            api_key: std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty()),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}

impl GenerationConfig {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// One remote generation call. Implementations perform at most one outbound
/// request per invocation; repeated calls are fresh, independent requests.
#[async_trait::async_trait(?Send)]
pub trait RemoteImageClient {
    /// Generate an image for the (already style-enhanced) prompt, returning
    /// the binary payload on success.
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, ImageError>;
}

/// Stability-style generation client: one multipart POST per request with a
/// bearer credential, expecting binary image content back.
pub struct StabilityClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl StabilityClient {
    pub fn new(config: &GenerationConfig, api_key: String) -> Result<Self, ImageError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("vericreate-core/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;
        Ok(StabilityClient {
            http,
            api_url: config.api_url.clone(),
            api_key,
        })
    }
}

#[async_trait::async_trait(?Send)]
impl RemoteImageClient for StabilityClient {
    async fn generate(&self, prompt: &str) -> Result<Vec<u8>, ImageError> {
        let form = multipart::Form::new()
            .text("prompt", prompt.to_string())
            .text("output_format", OUTPUT_FORMAT.to_string());

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "image/*")
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 200 {
            Ok(response.bytes().await?.to_vec())
        } else {
            // Response body is diagnostic text only.
            let detail = response.text().await.unwrap_or_default();
            Err(ImageError::Api {
                status: status.as_u16(),
                detail: truncate(&detail, DIAGNOSTIC_BODY_LIMIT),
            })
        }
    }
}

fn truncate(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        text.to_string()
    } else {
        let mut end = limit;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…", &text[..end])
    }
}

/// Where an image reference came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageOrigin {
    Remote,
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
enum ImagePayload {
    /// Remote generation output, materialized locally so the reference stays
    /// valid for preview and download.
    Remote {
        media_type: String,
        data_base64: String,
    },
    /// Fixed catalog entry; the bytes live behind the URL, not locally.
    Catalog { url: String },
}

/// The image resolved for one generation or regeneration attempt. Each
/// attempt supersedes the previous result; no history is retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResult {
    pub style: ImageStyle,
    pub origin: ImageOrigin,
    pub acquired_at: DateTime<Utc>,
    payload: ImagePayload,
}

impl ImageResult {
    fn remote(style: ImageStyle, media_type: &str, bytes: &[u8]) -> Self {
        ImageResult {
            style,
            origin: ImageOrigin::Remote,
            acquired_at: Utc::now(),
            payload: ImagePayload::Remote {
                media_type: media_type.to_string(),
                data_base64: BASE64.encode(bytes),
            },
        }
    }

    /// The fixed catalog image for `style`.
    pub fn fallback(style: ImageStyle) -> Self {
        ImageResult {
            style,
            origin: ImageOrigin::Fallback,
            acquired_at: Utc::now(),
            payload: ImagePayload::Catalog {
                url: style.fallback_url().to_string(),
            },
        }
    }

    /// A displayable reference to the image: the catalog URL, or a `data:`
    /// URL for locally materialized remote output.
    pub fn source_url(&self) -> String {
        match &self.payload {
            ImagePayload::Remote {
                media_type,
                data_base64,
            } => format!("data:{};base64,{}", media_type, data_base64),
            ImagePayload::Catalog { url } => url.clone(),
        }
    }

    /// Locally materialized bytes, if this result carries any.
    pub fn bytes(&self) -> Result<Option<Vec<u8>>, ImageError> {
        match &self.payload {
            ImagePayload::Remote { data_base64, .. } => BASE64
                .decode(data_base64)
                .map(Some)
                .map_err(|e| ImageError::Payload(e.to_string())),
            ImagePayload::Catalog { .. } => Ok(None),
        }
    }

    /// Write the materialized image to `dir`, named after a sanitized prefix
    /// of `prompt` and the acquisition timestamp. Catalog-origin results have
    /// no local data and return a recoverable error instead of re-fetching.
    pub fn download(&self, prompt: &str, dir: &Path) -> Result<PathBuf, ImageError> {
        let bytes = self
            .bytes()?
            .ok_or_else(|| ImageError::RemoteReference(self.source_url()))?;
        let filename = format!(
            "vericreate-{}-{}.{}",
            sanitize_prefix(prompt),
            self.acquired_at.timestamp_millis(),
            OUTPUT_FORMAT
        );
        let path = dir.join(filename);
        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}

fn sanitize_prefix(prompt: &str) -> String {
    let cleaned: String = prompt
        .chars()
        .take(FILENAME_PROMPT_PREFIX_LEN)
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    let trimmed = cleaned.trim_matches('-');
    if trimmed.is_empty() {
        "image".to_string()
    } else {
        trimmed.to_ascii_lowercase()
    }
}

/// Resolves styled images, degrading to the catalog whenever the remote path
/// is unavailable. Holding no client at all is a supported state.
pub struct ImageService {
    client: Option<Box<dyn RemoteImageClient>>,
}

impl ImageService {
    pub fn new(client: Option<Box<dyn RemoteImageClient>>) -> Self {
        ImageService { client }
    }

    /// Build from environment configuration. A missing credential yields a
    /// service that serves catalog images without any network I/O.
    pub fn from_env() -> Self {
        let config = GenerationConfig::from_env();
        match config.api_key.clone() {
            Some(key) => match StabilityClient::new(&config, key) {
                Ok(client) => ImageService::new(Some(Box::new(client))),
                Err(e) => {
                    warn!("failed to build generation client, using catalog fallback: {e}");
                    ImageService::new(None)
                }
            },
            None => ImageService::new(None),
        }
    }

    /// Whether a remote generation credential is configured.
    pub fn remote_enabled(&self) -> bool {
        self.client.is_some()
    }

    /// Resolve an image for `prompt` in `style`.
    ///
    /// Never fails: remote errors are captured as diagnostics and resolved
    /// via the style's catalog fallback. Performs at most one outbound call;
    /// re-invocation with the same arguments is a fresh, independent request.
    pub async fn acquire_image(&self, prompt: &str, style: ImageStyle) -> ImageResult {
        let client = match &self.client {
            Some(client) => client,
            None => {
                warn!(%style, "no generation credential configured, serving catalog image");
                return ImageResult::fallback(style);
            }
        };

        let enhanced = style.enhanced_prompt(prompt);
        debug!(%style, prompt = %enhanced, "requesting remote image");
        match client.generate(&enhanced).await {
            Ok(bytes) => {
                debug!(%style, size = bytes.len(), "remote image materialized");
                ImageResult::remote(style, "image/webp", &bytes)
            }
            Err(e) => {
                warn!(%style, error = %e, "remote generation failed, serving catalog image");
                ImageResult::fallback(style)
            }
        }
    }
}
