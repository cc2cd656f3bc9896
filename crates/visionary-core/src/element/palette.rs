//! Built-in element palette and default templates.

use super::{Content, Element, ElementKind, ObjectFit, Style};
use kurbo::Point;

/// Placeholder image used for freshly inserted image elements.
pub const STOCK_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1618005182384-a83a8bd57fbe?w=400";

/// Where new elements land when no position is given.
pub const DEFAULT_INSERT_POSITION: Point = Point::new(200.0, 200.0);

const IMAGE_CLASSES: &str = "w-48 h-48 rounded-[32px] object-cover shadow-2xl";
const BLOCK_CLASSES: &str = "p-8 bg-white/5 rounded-[24px] text-white";

/// An entry in the insertion palette.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteEntry {
    pub kind: ElementKind,
    pub name: &'static str,
    pub icon: &'static str,
    pub description: &'static str,
}

impl PaletteEntry {
    /// Build the default template for this entry.
    pub fn template(&self) -> Element {
        Element::from_palette(self.kind.clone(), self.name)
    }
}

static BUILTIN: [PaletteEntry; 5] = [
    PaletteEntry {
        kind: ElementKind::Button,
        name: "Button",
        icon: "square",
        description: "Action",
    },
    PaletteEntry {
        kind: ElementKind::Input,
        name: "Input",
        icon: "type",
        description: "Field",
    },
    PaletteEntry {
        kind: ElementKind::Card,
        name: "Card",
        icon: "square",
        description: "Box",
    },
    PaletteEntry {
        kind: ElementKind::Heading,
        name: "Heading",
        icon: "type",
        description: "Title",
    },
    PaletteEntry {
        kind: ElementKind::Image,
        name: "Image",
        icon: "image",
        description: "Visual",
    },
];

/// The built-in element palette.
pub struct Palette;

impl Palette {
    pub fn builtin() -> &'static [PaletteEntry] {
        &BUILTIN
    }

    /// Find a built-in entry by kind.
    pub fn find(kind: &ElementKind) -> Option<&'static PaletteEntry> {
        BUILTIN.iter().find(|entry| &entry.kind == kind)
    }
}

impl Element {
    /// Default template for an element inserted from the palette.
    pub fn from_palette(kind: ElementKind, name: impl Into<String>) -> Self {
        let name = name.into();
        let (classes, content) = if kind.is_image() {
            (IMAGE_CLASSES, Content::ImageRef(STOCK_IMAGE_URL.to_string()))
        } else {
            (BLOCK_CLASSES, Content::Text(name.clone()))
        };
        let style = Style {
            border_radius: Some("32px".to_string()),
            opacity: Some(1.0),
            object_fit: Some(ObjectFit::Cover),
            ..Style::default()
        };

        Element::new(kind, name, content)
            .with_tailwind(classes)
            .with_style(style)
            .with_position(DEFAULT_INSERT_POSITION)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_palette() {
        let kinds: Vec<_> = Palette::builtin().iter().map(|e| e.kind.tag()).collect();
        assert_eq!(kinds, vec!["button", "input", "card", "h1", "img"]);
    }

    #[test]
    fn test_image_template() {
        let entry = Palette::find(&ElementKind::Image).unwrap();
        let element = entry.template();

        assert_eq!(element.content, Content::ImageRef(STOCK_IMAGE_URL.to_string()));
        assert_eq!(element.position, Some(DEFAULT_INSERT_POSITION));
        assert_eq!(element.style.border_radius.as_deref(), Some("32px"));
        assert!(element.tailwind_classes.contains("object-cover"));
    }

    #[test]
    fn test_text_template_uses_name() {
        let element = Element::from_palette(ElementKind::Button, "Button");
        assert_eq!(element.content, Content::Text("Button".to_string()));
        assert!(element.is_draggable());
    }
}
