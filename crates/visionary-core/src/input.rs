//! Pointer and keyboard events delivered by the host.
//!
//! Positions are in the host's client coordinates. Events are expected in
//! arrival order; pointer-up and pointer-move should be delivered from a
//! window-scoped listener while [`crate::Canvas::captures_pointer`] is true,
//! so a drag released outside the element still ends.

use crate::element::ElementId;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Key name that cancels an active drag.
pub const ESCAPE_KEY: &str = "Escape";

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// What the pointer was pressed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerTarget {
    /// Empty canvas area (the page background itself).
    Page,
    /// An element, by id.
    Element(ElementId),
}

impl PointerTarget {
    /// Resolve a hit-tested id, mapping the reserved page id to [`PointerTarget::Page`].
    pub fn from_id(id: ElementId) -> Self {
        if id.is_page() {
            PointerTarget::Page
        } else {
            PointerTarget::Element(id)
        }
    }
}

/// Pointer event type for unified mouse/touch handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
        target: PointerTarget,
    },
    Move {
        position: Point,
    },
    Up {
        position: Point,
        button: MouseButton,
    },
}

/// Keyboard event type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed(String),
    Released(String),
}

impl KeyEvent {
    /// Check if this is a press of the given key.
    pub fn is_press_of(&self, key: &str) -> bool {
        matches!(self, KeyEvent::Pressed(k) if k == key)
    }
}
