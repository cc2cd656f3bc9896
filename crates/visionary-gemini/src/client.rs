//! [`Gateway`] implementation over the Gemini `generateContent` REST API.

use crate::config::GatewayConfig;
use crate::data_uri::InlineImage;
use crate::prompts;
use crate::wire::{
    GenerateContentRequest, GenerateContentResponse, Part, WireElement, WireLayout, element_schema,
    layout_schema, lenient_style,
};
use serde::de::DeserializeOwned;
use std::sync::RwLock;
use visionary_core::{
    BoxFuture, CanvasState, Element, Gateway, GatewayError, GatewayResult, LayoutResult, Platform,
};

/// Longest error body kept in [`GatewayError::Http`].
const MAX_ERROR_BODY: usize = 500;

/// Gemini-backed gateway.
pub struct GeminiGateway {
    config: GatewayConfig,
    api_key: RwLock<Option<String>>,
    client: reqwest::Client,
}

impl GeminiGateway {
    pub fn new(mut config: GatewayConfig) -> Self {
        let api_key = config.api_key.take().filter(|k| !k.trim().is_empty());
        Self {
            config,
            api_key: RwLock::new(api_key),
            client: reqwest::Client::new(),
        }
    }

    /// Gateway with default models and the key from the environment.
    pub fn from_env() -> Self {
        Self::new(GatewayConfig::from_env())
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    fn current_key(&self) -> Option<String> {
        match self.api_key.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// POST a request to `model` and decode the envelope.
    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> GatewayResult<GenerateContentResponse> {
        let api_key = self.current_key().ok_or(GatewayError::AuthRequired)?;
        let url = self.config.endpoint(model);
        log::debug!("POST {}", url);

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = resp.status();
        let body = resp.text().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            let err = classify_status(status.as_u16(), &body);
            log::warn!("Gemini request to {} failed: {}", model, err);
            return Err(err);
        }

        serde_json::from_str(&body)
            .map_err(|e| GatewayError::MalformedResponse(format!("Invalid response envelope: {e}")))
    }

    async fn generate_element(&self, request: GenerateContentRequest) -> GatewayResult<Element> {
        let response = self.generate(&self.config.layout_model, &request).await?;
        parse_element(&response)
    }
}

impl Gateway for GeminiGateway {
    fn has_credentials(&self) -> BoxFuture<'_, bool> {
        let present = self.current_key().is_some();
        Box::pin(async move { present })
    }

    fn set_api_key(&self, api_key: String) {
        let key = Some(api_key).filter(|k| !k.trim().is_empty());
        match self.api_key.write() {
            Ok(mut guard) => *guard = key,
            Err(poisoned) => *poisoned.into_inner() = key,
        }
    }

    fn generate_layout<'a>(
        &'a self,
        prompt: &'a str,
        platform: Platform,
        current: &'a CanvasState,
    ) -> BoxFuture<'a, GatewayResult<LayoutResult>> {
        Box::pin(async move {
            let elements: Vec<WireElement> =
                current.elements.iter().map(WireElement::from).collect();
            let elements_json = to_json(&elements)?;
            let request = GenerateContentRequest::new(vec![Part::text(prompts::layout_turn(
                prompt,
                platform,
                &elements_json,
            ))])
            .with_system(prompts::LAYOUT_SYSTEM)
            .with_json_schema(layout_schema());

            let response = self.generate(&self.config.layout_model, &request).await?;
            let layout = parse_layout(&response)?;
            log::info!("Gemini produced {} elements", layout.elements.len());
            Ok(layout)
        })
    }

    fn refine_element<'a>(
        &'a self,
        element: &'a Element,
        instruction: &'a str,
    ) -> BoxFuture<'a, GatewayResult<Element>> {
        Box::pin(async move {
            let element_json = to_json(&WireElement::from(element))?;
            let request = GenerateContentRequest::new(vec![Part::text(prompts::refine_turn(
                &element_json,
                instruction,
            ))])
            .with_system(prompts::REFINE_SYSTEM)
            .with_json_schema(element_schema());

            let mut refined = self.generate_element(request).await?;
            refined.id = element.id.clone();
            Ok(refined)
        })
    }

    fn generate_component_template<'a>(
        &'a self,
        description: &'a str,
    ) -> BoxFuture<'a, GatewayResult<Element>> {
        Box::pin(async move {
            let turn = prompts::template_turn(description);
            let request = GenerateContentRequest::new(vec![Part::text(turn)])
                .with_system(prompts::TEMPLATE_SYSTEM)
                .with_json_schema(element_schema());
            self.generate_element(request).await
        })
    }

    fn generate_image<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, GatewayResult<String>> {
        Box::pin(async move {
            let request = GenerateContentRequest::new(vec![Part::text(prompts::image_turn(prompt))])
                .with_square_image();
            let response = self.generate(&self.config.image_model, &request).await?;
            extract_image(&response)
        })
    }

    fn refine_image<'a>(
        &'a self,
        image: &'a str,
        instruction: &'a str,
    ) -> BoxFuture<'a, GatewayResult<String>> {
        Box::pin(async move {
            let source = InlineImage::parse(image)?;
            let request = GenerateContentRequest::new(vec![
                Part::inline(source.mime_type, source.data),
                Part::text(prompts::refine_image_turn(instruction)),
            ])
            .with_square_image();
            let response = self.generate(&self.config.image_model, &request).await?;
            extract_image(&response)
        })
    }

    fn export_to_markup<'a>(
        &'a self,
        elements: &'a [Element],
    ) -> BoxFuture<'a, GatewayResult<String>> {
        Box::pin(async move {
            let wire: Vec<WireElement> = elements.iter().map(WireElement::from).collect();
            let turn = prompts::export_turn(&to_json(&wire)?);
            let request = GenerateContentRequest::new(vec![Part::text(turn)])
                .with_system(prompts::EXPORT_SYSTEM);
            let response = self.generate(&self.config.layout_model, &request).await?;
            Ok(response.text().map(|t| strip_code_fence(&t)).unwrap_or_default())
        })
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> GatewayResult<String> {
    serde_json::to_string(value).map_err(|e| GatewayError::MalformedResponse(e.to_string()))
}

/// Map a non-success HTTP status (and body) to a gateway error.
pub fn classify_status(status: u16, body: &str) -> GatewayError {
    match status {
        401 | 403 => GatewayError::AuthRequired,
        429 => GatewayError::RateLimited,
        _ if body.to_ascii_lowercase().contains("api key") => GatewayError::AuthRequired,
        _ => GatewayError::Http {
            status,
            body: truncate_error(body),
        },
    }
}

fn map_reqwest_error(e: reqwest::Error) -> GatewayError {
    if e.is_decode() {
        GatewayError::MalformedResponse(e.to_string())
    } else {
        GatewayError::Network(e.to_string())
    }
}

fn truncate_error(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

/// Remove a surrounding markdown code fence, if any.
pub fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    let body = rest.trim_end();
    let body = body.strip_suffix("```").unwrap_or(body);
    // A language tag only counts when it sits alone on the opening line
    let body = match body.split_once('\n') {
        Some((tag, code)) if is_language_tag(tag) => code,
        _ => body,
    };
    body.trim().to_string()
}

fn is_language_tag(tag: &str) -> bool {
    tag.trim()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '+' | '#' | '.' | '_'))
}

fn parse_json<T: DeserializeOwned>(response: &GenerateContentResponse) -> GatewayResult<T> {
    let text = response
        .text()
        .ok_or_else(|| GatewayError::MalformedResponse("Empty response".to_string()))?;
    serde_json::from_str(&strip_code_fence(&text))
        .map_err(|e| GatewayError::MalformedResponse(format!("Invalid JSON from model: {e}")))
}

/// Decode a layout response.
pub fn parse_layout(response: &GenerateContentResponse) -> GatewayResult<LayoutResult> {
    let layout: WireLayout = parse_json(response)?;
    Ok(LayoutResult {
        elements: layout.elements.into_iter().map(Element::from).collect(),
        page_style: layout.page_style.map(lenient_style).filter(|s| !s.is_empty()),
    })
}

/// Decode a single-element response.
pub fn parse_element(response: &GenerateContentResponse) -> GatewayResult<Element> {
    parse_json::<WireElement>(response).map(Element::from)
}

/// First inline image of a response as a data URI.
pub fn extract_image(response: &GenerateContentResponse) -> GatewayResult<String> {
    let data = response.inline_data().ok_or(GatewayError::NoImageData)?;
    let mime = if data.mime_type.is_empty() { "image/png" } else { &data.mime_type };
    Ok(format!("data:{};base64,{}", mime, data.data))
}
