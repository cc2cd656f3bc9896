//! Drag engine: press-to-select, move with offset, snap, clamp, commit on release.

use crate::config::CanvasConfig;
use crate::element::ElementId;
use crate::snap::constrain_position;
use kurbo::{Point, Size, Vec2};

/// An in-progress drag gesture.
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    /// The element being dragged.
    pub element_id: ElementId,
    /// Pointer position minus the element's top-left corner at press time.
    pub pointer_offset: Vec2,
    /// Element position before the drag started, for cancellation.
    pub origin: Point,
    /// Last constrained position applied to the element.
    pub current: Point,
}

/// State of the drag engine.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

impl DragState {
    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging(_))
    }

    /// The element currently being dragged, if any.
    pub fn dragged_element(&self) -> Option<&ElementId> {
        match self {
            DragState::Dragging(session) => Some(&session.element_id),
            DragState::Idle => None,
        }
    }
}

/// What a pointer or key event did to the canvas.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// Nothing happened.
    Ignored,
    /// Press on empty canvas; selection cleared.
    SelectionCleared,
    /// Press selected an element that cannot be dragged.
    Selected(ElementId),
    /// A drag began.
    Started(ElementId),
    /// The dragged element moved.
    Moved { id: ElementId, position: Point },
    /// The drag ended and the result was recorded.
    Committed(ElementId),
    /// The drag was cancelled and the element restored.
    Cancelled(ElementId),
}

/// Tracks a single drag gesture.
///
/// The engine only computes positions; [`crate::Canvas`] applies them to
/// the canvas state and records history on commit.
#[derive(Debug, Clone)]
pub struct DragEngine {
    state: DragState,
    snap_unit: f64,
    edge_margin: f64,
}

impl DragEngine {
    pub fn new(snap_unit: f64, edge_margin: f64) -> Self {
        Self {
            state: DragState::Idle,
            snap_unit,
            edge_margin,
        }
    }

    pub fn from_config(config: &CanvasConfig) -> Self {
        Self::new(config.snap_unit, config.edge_margin)
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.state.is_dragging()
    }

    /// Start dragging `id`, currently at `position` on a canvas whose
    /// top-left corner is at `container_origin` in client coordinates.
    ///
    /// Returns the captured pointer offset.
    pub fn begin(
        &mut self,
        id: ElementId,
        pointer: Point,
        container_origin: Point,
        position: Point,
    ) -> Vec2 {
        let top_left = container_origin + position.to_vec2();
        let pointer_offset = pointer - top_left;
        self.state = DragState::Dragging(DragSession {
            element_id: id,
            pointer_offset,
            origin: position,
            current: position,
        });
        pointer_offset
    }

    /// Compute the constrained position for a pointer move.
    ///
    /// Returns `None` when no drag is active.
    pub fn update(
        &mut self,
        pointer: Point,
        container_origin: Point,
        canvas: Size,
    ) -> Option<(ElementId, Point)> {
        let DragState::Dragging(session) = &mut self.state else {
            return None;
        };
        let raw = pointer - container_origin.to_vec2() - session.pointer_offset;
        let position = constrain_position(raw, self.snap_unit, canvas, self.edge_margin);
        session.current = position;
        Some((session.element_id.clone(), position))
    }

    /// End the gesture, returning the session if one was active.
    pub fn finish(&mut self) -> Option<DragSession> {
        match std::mem::take(&mut self.state) {
            DragState::Dragging(session) => Some(session),
            DragState::Idle => None,
        }
    }

    /// Abort the gesture, returning the element and its pre-drag position.
    pub fn cancel(&mut self) -> Option<(ElementId, Point)> {
        self.finish().map(|session| (session.element_id, session.origin))
    }
}

impl Default for DragEngine {
    fn default() -> Self {
        Self::from_config(&CanvasConfig::default())
    }
}
