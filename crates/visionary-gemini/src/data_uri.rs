//! `data:` URI helpers for inline images.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use visionary_core::GatewayError;

/// MIME type assumed when a URI does not carry one.
pub const DEFAULT_IMAGE_MIME: &str = "image/png";

/// A decoded-header image payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    /// Base64 payload, validated but not decoded.
    pub data: String,
}

impl InlineImage {
    /// Split a `data:<mime>;base64,<payload>` URI.
    ///
    /// A bare base64 string is accepted as a PNG payload.
    pub fn parse(uri: &str) -> Result<Self, GatewayError> {
        let (mime_type, data) = match uri.strip_prefix("data:") {
            Some(rest) => {
                let (header, data) = rest
                    .split_once(',')
                    .ok_or_else(|| GatewayError::InvalidImage("missing payload".to_string()))?;
                let mime = header.split(';').next().unwrap_or_default();
                let mime = if mime.is_empty() { DEFAULT_IMAGE_MIME } else { mime };
                (mime.to_string(), data)
            }
            None => (DEFAULT_IMAGE_MIME.to_string(), uri),
        };

        if !mime_type.starts_with("image/") {
            return Err(GatewayError::InvalidImage(format!("unsupported type {}", mime_type)));
        }
        STANDARD
            .decode(data.trim())
            .map_err(|e| GatewayError::InvalidImage(e.to_string()))?;

        Ok(Self {
            mime_type,
            data: data.trim().to_string(),
        })
    }

    pub fn to_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_data_uri() {
        let image = InlineImage::parse("data:image/jpeg;base64,AAEC").unwrap();
        assert_eq!(image.mime_type, "image/jpeg");
        assert_eq!(image.data, "AAEC");
        assert_eq!(image.to_uri(), "data:image/jpeg;base64,AAEC");
    }

    #[test]
    fn test_parse_bare_payload() {
        let image = InlineImage::parse("AAEC").unwrap();
        assert_eq!(image.mime_type, DEFAULT_IMAGE_MIME);
    }

    #[test]
    fn test_rejects_invalid_base64() {
        assert!(matches!(
            InlineImage::parse("data:image/png;base64,***"),
            Err(GatewayError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_rejects_non_image() {
        assert!(matches!(
            InlineImage::parse("data:text/plain;base64,AAEC"),
            Err(GatewayError::InvalidImage(_))
        ));
    }

    #[test]
    fn test_rejects_url() {
        assert!(InlineImage::parse("https://example.com/a.png").is_err());
    }
}
