//! Data models and structures
//!
//! Defines the caption request/response pair exchanged with the caption
//! generation flow, plus application configuration.

use serde::{Deserialize, Serialize};

/// Number of captions requested when the caller does not specify one.
pub const DEFAULT_CAPTION_COUNT: u32 = 3;

/// A single caption generation request.
///
/// `image_url` is either a base64 data URL produced from a local file or a
/// remote URL the provider can fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptionRequest {
    pub image_url: String,
    #[serde(default = "default_caption_count")]
    pub number_of_captions: u32,
}

fn default_caption_count() -> u32 {
    DEFAULT_CAPTION_COUNT
}

impl CaptionRequest {
    /// Build a request for `image_url` with the default caption count.
    pub fn new(image_url: impl Into<String>) -> Self {
        Self {
            image_url: image_url.into(),
            number_of_captions: DEFAULT_CAPTION_COUNT,
        }
    }

    pub fn with_caption_count(mut self, count: u32) -> Self {
        self.number_of_captions = count;
        self
    }

    /// Check the request before any network call is made.
    pub fn validate(&self) -> crate::Result<()> {
        if self.image_url.trim().is_empty() {
            return Err(crate::Error::InvalidRequest(
                "image reference must not be empty".to_string(),
            ));
        }
        if self.number_of_captions == 0 {
            return Err(crate::Error::InvalidRequest(
                "number of captions must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// The validated reply from the caption generation flow.
///
/// Captions are kept in the order the model returned them. The length is
/// intentionally not checked against the requested count.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaptionResponse {
    pub captions: Vec<String>,
}

impl CaptionResponse {
    /// Parse a model reply into a [`CaptionResponse`].
    ///
    /// The payload must be a JSON object with a `captions` array of strings;
    /// anything else (including an empty array) is a shape error.
    pub fn from_model_payload(payload: &str) -> crate::Result<Self> {
        let response: CaptionResponse = serde_json::from_str(payload).map_err(|e| {
            crate::Error::Schema(format!("caption payload does not match expected shape: {}", e))
        })?;

        if response.captions.is_empty() {
            return Err(crate::Error::Schema(
                "model returned no captions".to_string(),
            ));
        }

        Ok(response)
    }
}

/// Supported caption model providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    Gemini,
    OpenAi,
}

impl AiProvider {
    pub fn parse(value: &str) -> crate::Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "gemini" => Ok(AiProvider::Gemini),
            "openai" => Ok(AiProvider::OpenAi),
            other => Err(crate::Error::Generic(format!(
                "Unknown caption provider '{}'. Expected 'gemini' or 'openai'",
                other
            ))),
        }
    }

    fn default_model(self) -> &'static str {
        match self {
            AiProvider::Gemini => "gemini-2.0-flash",
            AiProvider::OpenAi => "gpt-4o-mini",
        }
    }

    fn api_key_var(self) -> &'static str {
        match self {
            AiProvider::Gemini => "GEMINI_API_KEY",
            AiProvider::OpenAi => "OPENAI_API_KEY",
        }
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: AiProvider,
    pub model: String,
    pub api_key: String,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let provider = match std::env::var("CAPTION_PROVIDER") {
            Ok(value) => AiProvider::parse(&value)?,
            Err(_) => AiProvider::Gemini,
        };

        let model = std::env::var("CAPTION_MODEL")
            .unwrap_or_else(|_| provider.default_model().to_string());

        let api_key = std::env::var(provider.api_key_var())
            .map_err(|_| crate::Error::Generic(format!("{} not set", provider.api_key_var())))?;

        Ok(Self {
            provider,
            model,
            api_key,
        })
    }
}
