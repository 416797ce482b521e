//! Uniform content scaling for fixed-layout panel bodies.
//!
//! A panel body is laid out for a reference frame (e.g. a 720×560 results
//! sheet). When the panel is resized, the body is scaled by one factor
//! anchored at the content origin, and the box the body lays out into is
//! inflated by `1 / factor` so that after the transform it fills the
//! available area exactly. Nothing here is stored; callers recompute on
//! every render.

use crate::geometry::Size;
use kurbo::{Affine, Vec2};
use serde::{Deserialize, Serialize};

/// A rectangle with a fixed-height header that is never scaled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub width: f32,
    pub height: f32,
    pub header_height: f32,
}

impl Frame {
    pub const fn new(width: f32, height: f32, header_height: f32) -> Self {
        Self {
            width,
            height,
            header_height,
        }
    }

    /// The area below the header.
    pub fn body(&self) -> Size {
        Size::new(self.width, self.height - self.header_height)
    }
}

/// Compute the uniform scale factor that fits `reference` content into `viewport`.
///
/// `min(viewport.width / reference.width, viewport_body / reference_body)`.
/// Returns `0.0` when either body is empty, so callers can hide the content
/// instead of dividing by zero.
pub fn scale(viewport: Frame, reference: Frame) -> f32 {
    let available = viewport.body();
    let natural = reference.body();
    if available.width <= 0.0
        || available.height <= 0.0
        || natural.width <= 0.0
        || natural.height <= 0.0
    {
        return 0.0;
    }
    let factor = (available.width / natural.width).min(available.height / natural.height);
    if factor.is_finite() { factor } else { 0.0 }
}

/// The result of fitting reference content into a viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaledContent {
    /// Uniform scale factor.
    pub factor: f32,
    /// Raw (pre-transform) size of the content box: available area / factor.
    pub content: Size,
    /// Header offset followed by the uniform scale.
    pub transform: Affine,
}

impl ScaledContent {
    /// Fit `reference` into `viewport`. `None` when there is nothing to show.
    pub fn fit(viewport: Frame, reference: Frame) -> Option<Self> {
        let factor = scale(viewport, reference);
        if factor <= 0.0 {
            return None;
        }
        let available = viewport.body();
        let content = Size::new(available.width / factor, available.height / factor);
        let transform = Affine::translate(Vec2::new(0.0, f64::from(viewport.header_height)))
            * Affine::scale(f64::from(factor));
        Some(Self {
            factor,
            content,
            transform,
        })
    }

    /// Size of the content box once the transform is applied.
    pub fn rendered(&self) -> Size {
        Size::new(
            self.content.width * self.factor,
            self.content.height * self.factor,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    const REFERENCE: Frame = Frame::new(720.0, 560.0, 40.0);

    #[test]
    fn width_bound_viewport() {
        let viewport = Frame::new(360.0, 600.0, 40.0);
        let factor = scale(viewport, REFERENCE);
        assert!((factor - 0.5).abs() < 1e-6);
        assert!((factor * REFERENCE.width - viewport.width).abs() < 1e-3);
    }

    #[test]
    fn height_bound_viewport() {
        let viewport = Frame::new(2000.0, 300.0, 40.0);
        let factor = scale(viewport, REFERENCE);
        assert!((factor * REFERENCE.body().height - viewport.body().height).abs() < 1e-3);
        assert!(factor * REFERENCE.width <= viewport.width);
    }

    #[test]
    fn larger_viewport_scales_up() {
        let viewport = Frame::new(1440.0, 1080.0, 40.0);
        assert!((scale(viewport, REFERENCE) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn degenerate_body_hides_content() {
        assert_eq!(scale(Frame::new(300.0, 40.0, 40.0), REFERENCE), 0.0);
        assert_eq!(scale(Frame::new(300.0, 200.0, 40.0), Frame::new(0.0, 0.0, 0.0)), 0.0);
        assert!(ScaledContent::fit(Frame::new(0.0, 200.0, 40.0), REFERENCE).is_none());
    }

    #[test]
    fn fitted_content_fills_viewport_exactly() {
        for (w, h) in [(360.0, 600.0), (900.0, 300.0), (721.0, 561.0), (150.0, 90.0)] {
            let viewport = Frame::new(w, h, 40.0);
            let fitted = ScaledContent::fit(viewport, REFERENCE).unwrap();
            let rendered = fitted.rendered();
            assert!((rendered.width - viewport.width).abs() < 1e-2);
            assert!((rendered.height - viewport.body().height).abs() < 1e-2);
            // Content box is at least as large as the reference layout.
            assert!(fitted.content.width + 1e-2 >= REFERENCE.width);
            assert!(fitted.content.height + 1e-2 >= REFERENCE.body().height);
        }
    }

    #[test]
    fn transform_is_anchored_below_header() {
        let viewport = Frame::new(360.0, 600.0, 40.0);
        let fitted = ScaledContent::fit(viewport, REFERENCE).unwrap();
        let origin = fitted.transform * Point::new(0.0, 0.0);
        assert_eq!(origin, Point::new(0.0, 40.0));
        let corner = fitted.transform * Point::new(100.0, 100.0);
        assert!((corner.x - 50.0).abs() < 1e-6);
        assert!((corner.y - 90.0).abs() < 1e-6);
    }
}
