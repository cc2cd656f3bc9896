//! Element definitions for the design canvas.
//!
//! An element is pure data: an identifier, a kind, a label, typed content,
//! a sparse style and an optional position relative to the canvas origin.

mod palette;
mod style;

pub use palette::{DEFAULT_INSERT_POSITION, Palette, PaletteEntry, STOCK_IMAGE_URL};
pub use style::{BorderStyle, ObjectFit, Style, TextAlign, TextTransform};

use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Reserved identifier addressing the page root rather than an element.
pub const PAGE_BACKGROUND_ID: &str = "page-background";

/// Unique identifier for an element.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Create an identifier from an existing string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh, unique identifier.
    pub fn generate() -> Self {
        Self(format!("el-{}", Uuid::new_v4()))
    }

    /// The reserved page-background identifier.
    pub fn page() -> Self {
        Self(PAGE_BACKGROUND_ID.to_string())
    }

    /// Check if this is the reserved page-background identifier.
    pub fn is_page(&self) -> bool {
        self.0 == PAGE_BACKGROUND_ID
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Element kind, governing default render semantics.
///
/// Serialized as the short tag used by the renderer (`"h1"`, `"img"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ElementKind {
    Button,
    Input,
    Card,
    Heading,
    Image,
    Table,
    /// Any other tag, kept verbatim.
    Custom(String),
}

impl ElementKind {
    /// The serialized tag for this kind.
    pub fn tag(&self) -> &str {
        match self {
            ElementKind::Button => "button",
            ElementKind::Input => "input",
            ElementKind::Card => "card",
            ElementKind::Heading => "h1",
            ElementKind::Image => "img",
            ElementKind::Table => "table",
            ElementKind::Custom(tag) => tag,
        }
    }

    pub fn is_image(&self) -> bool {
        matches!(self, ElementKind::Image)
    }
}

impl From<String> for ElementKind {
    fn from(tag: String) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "button" => ElementKind::Button,
            "input" => ElementKind::Input,
            "card" => ElementKind::Card,
            "h1" | "heading" => ElementKind::Heading,
            "img" | "image" => ElementKind::Image,
            "table" => ElementKind::Table,
            "" => ElementKind::Custom("custom".to_string()),
            _ => ElementKind::Custom(tag),
        }
    }
}

impl From<&str> for ElementKind {
    fn from(tag: &str) -> Self {
        Self::from(tag.to_string())
    }
}

impl From<ElementKind> for String {
    fn from(kind: ElementKind) -> Self {
        match kind {
            ElementKind::Custom(tag) => tag,
            other => other.tag().to_string(),
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Element payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum Content {
    /// Plain text.
    Text(String),
    /// Image URL or `data:` URI.
    ImageRef(String),
    /// Raw markup fragment.
    Markup(String),
}

impl Default for Content {
    fn default() -> Self {
        Content::Text(String::new())
    }
}

impl Content {
    /// Tag an untagged payload string.
    ///
    /// Image elements and `data:image/` URIs become image references,
    /// payloads starting with `<` become markup, everything else is text.
    pub fn classify(kind: &ElementKind, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let trimmed = raw.trim_start();
        if kind.is_image() || trimmed.starts_with("data:image/") {
            Content::ImageRef(raw)
        } else if trimmed.starts_with('<') {
            Content::Markup(raw)
        } else {
            Content::Text(raw)
        }
    }

    /// The raw payload string.
    pub fn as_str(&self) -> &str {
        match self {
            Content::Text(s) | Content::ImageRef(s) | Content::Markup(s) => s,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Content::ImageRef(_))
    }

    /// True for an image embedded as a `data:image/` URI.
    pub fn is_inline_image(&self) -> bool {
        matches!(self, Content::ImageRef(s) if s.trim_start().starts_with("data:image/"))
    }
}

/// A positioned, styled visual node on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    /// Label shown in the layer list and selection badge.
    pub name: String,
    /// Utility class list applied by the renderer.
    #[serde(default)]
    pub tailwind_classes: String,
    #[serde(default)]
    pub content: Content,
    #[serde(default, skip_serializing_if = "Style::is_empty")]
    pub style: Style,
    /// Offset from the canvas origin, in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Element>,
    /// Locked elements can be selected but not dragged.
    #[serde(default, rename = "isLocked", skip_serializing_if = "std::ops::Not::not")]
    pub locked: bool,
}

impl Element {
    /// Create a new unpositioned element with a fresh id.
    pub fn new(kind: ElementKind, name: impl Into<String>, content: Content) -> Self {
        Self {
            id: ElementId::generate(),
            kind,
            name: name.into(),
            tailwind_classes: String::new(),
            content,
            style: Style::default(),
            position: None,
            children: Vec::new(),
            locked: false,
        }
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.position = Some(position);
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn with_tailwind(mut self, classes: impl Into<String>) -> Self {
        self.tailwind_classes = classes.into();
        self
    }

    /// Check if this element can be moved with the pointer.
    pub fn is_draggable(&self) -> bool {
        self.position.is_some() && !self.locked
    }

    /// Ids of this element and all nested children, depth first.
    pub fn ids(&self) -> Vec<&ElementId> {
        let mut ids = vec![&self.id];
        for child in &self.children {
            ids.extend(child.ids());
        }
        ids
    }
}
