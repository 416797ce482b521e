//! Canvas pan/zoom transform.
//!
//! Panels live in canvas coordinates. The host reports pointer positions in
//! screen coordinates; `CanvasView` converts between the two.

use crate::geometry::{Delta, Point};
use serde::{Deserialize, Serialize};

/// Pan offset (screen pixels) and zoom factor of the infinite canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasView {
    pub pan: Point,
    pub zoom: f32,
}

impl Default for CanvasView {
    fn default() -> Self {
        Self {
            pan: Point::ORIGIN,
            zoom: 1.0,
        }
    }
}

impl CanvasView {
    pub fn screen_to_canvas(&self, p: Point) -> Point {
        Point::new((p.x - self.pan.x) / self.zoom, (p.y - self.pan.y) / self.zoom)
    }

    pub fn canvas_to_screen(&self, p: Point) -> Point {
        Point::new(p.x * self.zoom + self.pan.x, p.y * self.zoom + self.pan.y)
    }

    /// Shift the canvas by a screen-space delta.
    pub fn pan_by(&mut self, delta: Delta) {
        self.pan = self.pan.offset(delta);
    }

    /// Multiply zoom by `factor`, keeping the canvas point under `anchor`
    /// (screen coordinates) fixed. Zoom is clamped to `[min, max]`.
    pub fn zoom_at(&mut self, anchor: Point, factor: f32, min: f32, max: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let before = self.screen_to_canvas(anchor);
        self.zoom = (self.zoom * factor).clamp(min, max);
        self.pan = Point::new(
            anchor.x - before.x * self.zoom,
            anchor.y - before.y * self.zoom,
        );
    }
}
