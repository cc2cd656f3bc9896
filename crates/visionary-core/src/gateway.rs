//! Contract for the AI backend that generates and refines designs.

use crate::canvas::{CanvasState, Platform};
use crate::element::{Element, Style};
use crate::{BoxFuture, MaybeSendSync};
use thiserror::Error;

/// Errors from gateway calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Missing or rejected credentials.
    #[error("Authentication required")]
    AuthRequired,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Response contained no image data")]
    NoImageData,
    #[error("Invalid image: {0}")]
    InvalidImage(String),
}

impl GatewayError {
    /// Whether this failure requires new credentials.
    pub fn is_auth(&self) -> bool {
        matches!(self, GatewayError::AuthRequired)
    }
}

/// Result type for gateway calls.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// A regenerated document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutResult {
    /// Complete replacement element collection.
    pub elements: Vec<Element>,
    /// Replacement page style, if the backend produced one.
    pub page_style: Option<Style>,
}

/// An AI backend.
///
/// Every call is a fallible asynchronous request. Implementations must not
/// retain the borrowed inputs beyond the returned future.
pub trait Gateway: MaybeSendSync {
    /// Whether credentials are configured.
    fn has_credentials(&self) -> BoxFuture<'_, bool>;

    /// Replace the credentials used for subsequent calls.
    fn set_api_key(&self, api_key: String);

    /// Regenerate the whole canvas from a prompt.
    fn generate_layout<'a>(
        &'a self,
        prompt: &'a str,
        platform: Platform,
        current: &'a CanvasState,
    ) -> BoxFuture<'a, GatewayResult<LayoutResult>>;

    /// Rework a single element. The result keeps the element's id.
    fn refine_element<'a>(
        &'a self,
        element: &'a Element,
        instruction: &'a str,
    ) -> BoxFuture<'a, GatewayResult<Element>>;

    /// Produce a reusable template element from a description.
    fn generate_component_template<'a>(
        &'a self,
        description: &'a str,
    ) -> BoxFuture<'a, GatewayResult<Element>>;

    /// Generate an image, returned as a data URI.
    fn generate_image<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, GatewayResult<String>>;

    /// Edit an image given as a data URI, returning a new data URI.
    fn refine_image<'a>(
        &'a self,
        image: &'a str,
        instruction: &'a str,
    ) -> BoxFuture<'a, GatewayResult<String>>;

    /// Render elements to source code for export.
    fn export_to_markup<'a>(
        &'a self,
        elements: &'a [Element],
    ) -> BoxFuture<'a, GatewayResult<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_auth() {
        assert!(GatewayError::AuthRequired.is_auth());
        assert!(!GatewayError::RateLimited.is_auth());
        assert!(!GatewayError::Http { status: 500, body: String::new() }.is_auth());
    }

    #[test]
    fn test_error_messages() {
        let err = GatewayError::Http { status: 503, body: "unavailable".into() };
        assert_eq!(err.to_string(), "HTTP 503: unavailable");
    }
}
