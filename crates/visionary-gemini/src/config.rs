//! Gateway configuration.

use serde::{Deserialize, Serialize};

/// Default REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Model used for layouts, refinements, templates and export.
pub const DEFAULT_LAYOUT_MODEL: &str = "gemini-3-pro-preview";
/// Model used for image generation and editing.
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// Settings for [`crate::GeminiGateway`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GatewayConfig {
    /// API key; `None` until the user provides one.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    pub base_url: String,
    pub layout_model: String,
    pub image_model: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            layout_model: DEFAULT_LAYOUT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }
}

impl GatewayConfig {
    /// Default configuration with the API key taken from the environment.
    pub fn from_env() -> Self {
        Self {
            api_key: key_from(|name| std::env::var(name).ok()),
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// URL of the `generateContent` method for `model`.
    pub fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }
}

/// First non-blank key among [`API_KEY_ENV_VARS`].
fn key_from(lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .map(|key| key.trim().to_string())
        .find(|key| !key.is_empty())
}
