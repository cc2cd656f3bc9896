//! Grid snapping and canvas boundary clamping for dragged elements.

use kurbo::{Point, Size};

/// Grid increment dragged positions are rounded to.
pub const DEFAULT_SNAP_UNIT: f64 = 8.0;

/// Distance from the far canvas edges an element's origin must stay within,
/// so a dragged element can never be lost off-canvas.
pub const DEFAULT_EDGE_MARGIN: f64 = 40.0;

/// Result of a snap operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapResult {
    /// The snapped point.
    pub point: Point,
    /// Whether the X coordinate was moved by snapping.
    pub snapped_x: bool,
    /// Whether the Y coordinate was moved by snapping.
    pub snapped_y: bool,
}

impl SnapResult {
    /// Create a result with no snapping.
    pub fn none(point: Point) -> Self {
        Self {
            point,
            snapped_x: false,
            snapped_y: false,
        }
    }

    /// Check if any snapping occurred.
    pub fn is_snapped(&self) -> bool {
        self.snapped_x || self.snapped_y
    }
}

/// Snap a point to the nearest grid intersection.
///
/// A non-positive grid size disables snapping.
pub fn snap_to_grid(point: Point, grid_size: f64) -> SnapResult {
    if grid_size <= 0.0 {
        return SnapResult::none(point);
    }
    let x = (point.x / grid_size).round() * grid_size;
    let y = (point.y / grid_size).round() * grid_size;

    SnapResult {
        point: Point::new(x, y),
        snapped_x: x != point.x,
        snapped_y: y != point.y,
    }
}

/// Clamp a position to `[0, canvas - margin]` on each axis.
pub fn clamp_to_canvas(point: Point, canvas: Size, margin: f64) -> Point {
    let max_x = (canvas.width - margin).max(0.0);
    let max_y = (canvas.height - margin).max(0.0);
    Point::new(point.x.clamp(0.0, max_x), point.y.clamp(0.0, max_y))
}

/// Snap then clamp a raw drag target.
pub fn constrain_position(raw: Point, grid_size: f64, canvas: Size, margin: f64) -> Point {
    clamp_to_canvas(snap_to_grid(raw, grid_size).point, canvas, margin)
}
