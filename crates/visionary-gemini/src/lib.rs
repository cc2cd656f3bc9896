//! Gemini backend for Visionary Studio.
//!
//! Implements [`visionary_core::Gateway`] against the Gemini
//! `generateContent` REST API: structured JSON output for layouts and
//! components, inline image data for image generation and editing.

mod client;
mod config;
mod data_uri;
mod prompts;
mod wire;

pub use client::{
    GeminiGateway, classify_status, extract_image, parse_element, parse_layout, strip_code_fence,
};
pub use config::{
    API_KEY_ENV_VARS, DEFAULT_BASE_URL, DEFAULT_IMAGE_MODEL, DEFAULT_LAYOUT_MODEL, GatewayConfig,
};
pub use data_uri::{DEFAULT_IMAGE_MIME, InlineImage};
pub use wire::{GenerateContentResponse, WireElement};
