//! Client configuration

use std::env;

use serde::{Deserialize, Serialize};

use crate::constants::{defaults, env as vars};

/// Settings for [`GenerationClient`](crate::GenerationClient)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// API key; requests fail with `MissingCredential` while unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// API root, without a trailing slash
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: defaults::BASE_URL.to_string(),
            model: defaults::MODEL.to_string(),
            temperature: defaults::TEMPERATURE,
        }
    }
}

impl GenerationConfig {
    /// Defaults overridden by `PROMPTVIZ_*` environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        Self {
            api_key: non_blank(vars::API_KEY).or_else(|| non_blank(vars::API_KEY_FALLBACK)),
            base_url: non_blank(vars::BASE_URL).unwrap_or_else(|| defaults::BASE_URL.to_string()),
            model: non_blank(vars::MODEL).unwrap_or_else(|| defaults::MODEL.to_string()),
            temperature: defaults::TEMPERATURE,
        }
    }

    /// `generateContent` endpoint for the configured model
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// The API key, if one is set and non-blank
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}
