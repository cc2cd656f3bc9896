//! `generateContent` request and response types, plus the element schema
//! the model is asked to follow.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use visionary_core::kurbo::Point;
use visionary_core::{Content, Element, ElementId, ElementKind, Style};

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    /// A single user turn made of `parts`.
    pub fn new(parts: Vec<Part>) -> Self {
        Self {
            contents: vec![WireContent { role: Some("user".into()), parts }],
            system_instruction: None,
            generation_config: None,
        }
    }

    pub fn with_system(mut self, instruction: &str) -> Self {
        self.system_instruction = Some(WireContent {
            role: None,
            parts: vec![Part::text(instruction)],
        });
        self
    }

    /// Ask for JSON output matching `schema`.
    pub fn with_json_schema(mut self, schema: Value) -> Self {
        self.generation_config = Some(GenerationConfig {
            response_mime_type: Some("application/json".into()),
            response_schema: Some(schema),
            image_config: None,
        });
        self
    }

    /// Ask for a square image.
    pub fn with_square_image(mut self) -> Self {
        self.generation_config = Some(GenerationConfig {
            response_mime_type: None,
            response_schema: None,
            image_config: Some(ImageConfig { aspect_ratio: "1:1".into() }),
        });
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: Some(text.into()), inline_data: None }
    }

    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData { mime_type: mime_type.into(), data: data.into() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_config: Option<ImageConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageConfig {
    pub aspect_ratio: String,
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<WireContent>,
}

impl GenerateContentResponse {
    fn first_parts(&self) -> &[Part] {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.as_slice())
            .unwrap_or_default()
    }

    /// Concatenated text parts of the first candidate.
    pub fn text(&self) -> Option<String> {
        let text: String = self.first_parts().iter().filter_map(|p| p.text.as_deref()).collect();
        (!text.is_empty()).then_some(text)
    }

    /// First inline image of the first candidate.
    pub fn inline_data(&self) -> Option<&InlineData> {
        self.first_parts().iter().find_map(|p| p.inline_data.as_ref())
    }
}

// ---------------------------------------------------------------------------
// Elements
// ---------------------------------------------------------------------------

/// Element shape exchanged with the model: content is an untagged string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireElement {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tailwind_classes: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<WirePosition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<WireElement>,
    #[serde(rename = "isLocked", default, skip_serializing_if = "std::ops::Not::not")]
    pub locked: bool,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct WirePosition {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
}

impl From<&Element> for WireElement {
    fn from(element: &Element) -> Self {
        Self {
            id: element.id.to_string(),
            kind: element.kind.to_string(),
            name: element.name.clone(),
            tailwind_classes: element.tailwind_classes.clone(),
            content: element.content.as_str().to_string(),
            style: (!element.style.is_empty())
                .then(|| serde_json::to_value(&element.style).ok())
                .flatten(),
            position: element.position.map(|p| WirePosition { x: p.x, y: p.y }),
            children: element.children.iter().map(WireElement::from).collect(),
            locked: element.locked,
        }
    }
}

impl From<WireElement> for Element {
    fn from(wire: WireElement) -> Self {
        let kind = ElementKind::from(wire.kind);
        let id = if wire.id.trim().is_empty() {
            ElementId::generate()
        } else {
            ElementId::new(wire.id)
        };
        let content = Content::classify(&kind, wire.content);
        let mut element = Element::new(kind, wire.name, content)
            .with_tailwind(wire.tailwind_classes)
            .with_style(wire.style.map(lenient_style).unwrap_or_default());
        element.id = id;
        element.position = wire.position.map(|p| Point::new(p.x, p.y));
        element.children = wire.children.into_iter().map(Element::from).collect();
        element.locked = wire.locked;
        element
    }
}

/// Parse a style object, skipping attributes whose values are not understood.
pub fn lenient_style(value: Value) -> Style {
    match serde_json::from_value::<Style>(value.clone()) {
        Ok(style) => style,
        Err(err) => {
            log::debug!("Dropping unrecognised style attributes: {}", err);
            let mut style = Style::default();
            if let Value::Object(map) = value {
                for (key, attr) in map {
                    let single = Value::Object([(key, attr)].into_iter().collect());
                    if let Ok(partial) = serde_json::from_value::<Style>(single) {
                        style.merge(&partial);
                    }
                }
            }
            style
        }
    }
}

/// Layout payload returned by the model.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireLayout {
    #[serde(default)]
    pub elements: Vec<WireElement>,
    #[serde(default)]
    pub page_style: Option<Value>,
}

// ---------------------------------------------------------------------------
// Schemas
// ---------------------------------------------------------------------------

const STRING_STYLE_FIELDS: &[&str] = &[
    "backgroundColor",
    "backgroundGradient",
    "backgroundImage",
    "color",
    "borderRadius",
    "padding",
    "fontSize",
    "fontWeight",
    "textAlign",
    "textTransform",
    "lineHeight",
    "letterSpacing",
    "borderWidth",
    "borderColor",
    "width",
    "height",
    "boxShadow",
    "backdropFilter",
    "filter",
    "objectFit",
    "mixBlendMode",
    "animation",
    "transition",
    "transform",
];

/// Response schema for a single element.
///
/// Children are described one level deep; the schema format has no recursion.
pub fn element_schema() -> Value {
    let mut schema = leaf_element_schema();
    schema["properties"]["children"] = json!({ "type": "ARRAY", "items": leaf_element_schema() });
    schema
}

fn leaf_element_schema() -> Value {
    let mut style_properties: serde_json::Map<String, Value> = STRING_STYLE_FIELDS
        .iter()
        .map(|field| (field.to_string(), json!({ "type": "STRING" })))
        .collect();
    style_properties.insert("opacity".into(), json!({ "type": "NUMBER" }));

    json!({
        "type": "OBJECT",
        "properties": {
            "id": { "type": "STRING" },
            "type": { "type": "STRING" },
            "name": { "type": "STRING" },
            "tailwindClasses": { "type": "STRING" },
            "content": { "type": "STRING" },
            "style": { "type": "OBJECT", "properties": style_properties },
            "position": {
                "type": "OBJECT",
                "properties": {
                    "x": { "type": "NUMBER" },
                    "y": { "type": "NUMBER" }
                }
            },
            "isLocked": { "type": "BOOLEAN" }
        },
        "required": ["id", "type", "name", "tailwindClasses", "content"]
    })
}

/// Response schema for a full layout.
pub fn layout_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "elements": { "type": "ARRAY", "items": element_schema() },
            "pageStyle": {
                "type": "OBJECT",
                "properties": { "backgroundColor": { "type": "STRING" } }
            }
        },
        "required": ["elements"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = GenerateContentRequest::new(vec![Part::text("hi")])
            .with_system("be brief")
            .with_json_schema(element_schema());
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "be brief");
        assert_eq!(json["generationConfig"]["responseMimeType"], "application/json");
        assert!(json["generationConfig"].get("imageConfig").is_none());
    }

    #[test]
    fn test_image_request_serialization() {
        let parts = vec![Part::inline("image/png", "AAAA"), Part::text("x")];
        let request = GenerateContentRequest::new(parts).with_square_image();
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contents"][0]["parts"][0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(json["generationConfig"]["imageConfig"]["aspectRatio"], "1:1");
    }

    #[test]
    fn test_response_text_and_image() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "Here " },
                        { "inlineData": { "mimeType": "image/png", "data": "AAAA" } },
                        { "text": "it is" }
                    ]
                }
            }]
        }))
        .unwrap();

        assert_eq!(response.text().as_deref(), Some("Here it is"));
        assert_eq!(response.inline_data().unwrap().data, "AAAA");
    }

    #[test]
    fn test_empty_response() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(response.text().is_none());
        assert!(response.inline_data().is_none());
    }

    #[test]
    fn test_wire_element_conversion() {
        let wire: WireElement = serde_json::from_value(json!({
            "id": "hero",
            "type": "h1",
            "name": "Hero",
            "tailwindClasses": "text-6xl",
            "content": "Welcome",
            "style": { "color": "#fff", "opacity": 0.5 },
            "position": { "x": 10, "y": 20 }
        }))
        .unwrap();
        let element = Element::from(wire);

        assert_eq!(element.id, ElementId::new("hero"));
        assert_eq!(element.kind, ElementKind::Heading);
        assert_eq!(element.content, Content::Text("Welcome".into()));
        assert_eq!(element.style.opacity, Some(0.5));
        assert_eq!(element.position.map(|p| (p.x, p.y)), Some((10.0, 20.0)));
    }

    #[test]
    fn test_children_and_lock_survive_wire() {
        let child = Element::new(ElementKind::Button, "Go", Content::Text("Go".into()));
        let mut card = Element::new(ElementKind::Card, "Card", Content::Text("x".into()));
        card.children.push(child.clone());
        card.locked = true;

        let json = serde_json::to_value(WireElement::from(&card)).unwrap();
        assert_eq!(json["isLocked"], true);
        assert_eq!(json["children"][0]["name"], "Go");

        let wire: WireElement = serde_json::from_value(json).unwrap();
        let back = Element::from(wire);
        assert!(back.locked);
        assert_eq!(back.children.len(), 1);
        assert_eq!(back.children[0].id, child.id);
        assert_eq!(back.children[0].content, child.content);
    }

    #[test]
    fn test_unlocked_childless_element_omits_fields() {
        let element = Element::new(ElementKind::Card, "Card", Content::default());
        let json = serde_json::to_value(WireElement::from(&element)).unwrap();
        assert!(json.get("children").is_none());
        assert!(json.get("isLocked").is_none());
    }

    #[test]
    fn test_markup_content_classified() {
        let wire = WireElement {
            kind: "table".into(),
            content: "<table><tr><td>1</td></tr></table>".into(),
            ..Default::default()
        };
        let element = Element::from(wire);
        assert!(matches!(element.content, Content::Markup(_)));
        assert!(!element.id.as_str().is_empty());
    }

    #[test]
    fn test_lenient_style_keeps_known_attributes() {
        let style = lenient_style(json!({
            "color": "red",
            "textAlign": "start",
            "objectFit": "cover"
        }));
        assert_eq!(style.color.as_deref(), Some("red"));
        assert!(style.text_align.is_none());
        assert!(style.object_fit.is_some());
    }

    #[test]
    fn test_schema_shape() {
        let schema = layout_schema();
        assert_eq!(schema["properties"]["elements"]["type"], "ARRAY");
        let style = &schema["properties"]["elements"]["items"]["properties"]["style"]["properties"];
        assert_eq!(style["opacity"]["type"], "NUMBER");
        assert_eq!(style["color"]["type"], "STRING");

        let element = element_schema();
        assert_eq!(element["properties"]["isLocked"]["type"], "BOOLEAN");
        assert_eq!(element["properties"]["children"]["type"], "ARRAY");
        assert!(element["properties"]["children"]["items"]["properties"]["children"].is_null());
    }
}
