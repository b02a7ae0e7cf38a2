use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::model_client::{DEFAULT_GEMINI_API_BASE, DEFAULT_GEMINI_MODEL};

fn default_gemini_model() -> String {
    DEFAULT_GEMINI_MODEL.into()
}

fn default_gemini_api_base() -> String {
    DEFAULT_GEMINI_API_BASE.into()
}

fn default_mapping_file() -> String {
    "mapping.json".into()
}

fn default_model_timeout_secs() -> u64 {
    30
}

fn default_model_retries() -> usize {
    2
}

fn default_http_bind() -> String {
    "0.0.0.0".into()
}

fn default_http_port() -> u16 {
    8000
}

fn default_cors_origins() -> String {
    "https://yourdomain.com,http://localhost:19006,http://10.0.2.16:19006".into()
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub google_api_key: String,
    #[serde(default = "default_gemini_model")]
    pub gemini_model: String,
    #[serde(default = "default_gemini_api_base")]
    pub gemini_api_base: String,
    #[serde(default = "default_mapping_file")]
    pub mapping_file: String,
    #[serde(default = "default_model_timeout_secs")]
    pub model_timeout_secs: u64,
    #[serde(default = "default_model_retries")]
    pub model_retries: usize,
    #[serde(default = "default_http_bind")]
    pub http_bind: String,
    #[serde(default = "default_http_port")]
    pub http_port: u16,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: String,
}

impl Settings {
    pub fn new() -> Result<Self, config::ConfigError> {
        Self::from_source(config::Environment::default().try_parsing(true))
    }

    pub fn from_source<S>(source: S) -> Result<Self, config::ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        config::Config::builder()
            .add_source(source)
            .build()?
            .try_deserialize()
    }

    /// The model credential; absence is fatal at startup.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        let key = self.google_api_key.trim();
        if key.is_empty() {
            Err(ConfigError::MissingCredential)
        } else {
            Ok(key)
        }
    }

    pub fn model_timeout(&self) -> Duration {
        Duration::from_secs(self.model_timeout_secs.max(1))
    }

    pub fn cors_origin_list(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}
