//! Client for the external vision model ("given an image and a prompt, return text").

use async_trait::async_trait;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Image bytes plus the MIME type declared to the model.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        ImagePayload {
            bytes,
            mime_type: mime_type.into(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ModelError {
    #[error("network error: {0}")]
    Network(String),
    #[error("http error: {0}")]
    Http(u16),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("model returned no text")]
    Empty,
    #[error("model call timed out after {0:?}")]
    Timeout(Duration),
}

impl ModelError {
    /// Failures worth another attempt.
    pub fn is_transient(&self) -> bool {
        match self {
            ModelError::Network(_) | ModelError::Timeout(_) => true,
            ModelError::Http(status) => *status == 429 || *status >= 500,
            ModelError::Parse(_) | ModelError::Empty => false,
        }
    }
}

/// Opaque model capability. Implementations must be safe to call concurrently.
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn generate(&self, prompt: &str, image: &ImagePayload) -> Result<String, ModelError>;
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: [Part<'a>; 2],
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    Inline { inline_data: InlineData<'a> },
}

#[derive(Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Default)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Default)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// Google Gemini `generateContent` over HTTPS.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, base_url: impl Into<String>) -> Self {
        GeminiClient {
            http: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

#[async_trait]
impl VisionModel for GeminiClient {
    async fn generate(&self, prompt: &str, image: &ImagePayload) -> Result<String, ModelError> {
        let req = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [
                    Part::Text { text: prompt },
                    Part::Inline {
                        inline_data: InlineData {
                            mime_type: &image.mime_type,
                            data: base64::engine::general_purpose::STANDARD.encode(&image.bytes),
                        },
                    },
                ],
            }],
            generation_config: GenerationConfig { temperature: 0.1 },
        };

        debug!(
            "\u{2192} Gemini request: model = {}, image = {} bytes ({})",
            self.model,
            image.bytes.len(),
            image.mime_type
        );
        let res = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&req)
            .send()
            .await
            .map_err(|e| {
                error!("network error to Gemini: {e}");
                ModelError::Network(e.to_string())
            })?;

        let status = res.status();
        let bytes = res
            .bytes()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;
        debug!(
            %status,
            "\u{2190} body = {}",
            String::from_utf8_lossy(&bytes[..bytes.len().min(1024)])
        );

        if !status.is_success() {
            return Err(ModelError::Http(status.as_u16()));
        }

        let parsed: GenerateResponse =
            serde_json::from_slice(&bytes).map_err(|e| ModelError::Parse(e.to_string()))?;
        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(ModelError::Empty);
        }
        Ok(text)
    }
}
