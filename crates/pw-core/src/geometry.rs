//! Panel geometry: points, sizes, bounds, and the eight-handle resize math.
//!
//! Every panel type shares the same `resize` function. The one rule that
//! matters: a leading edge (west / north) that hits the minimum size stops
//! moving the panel's origin. Position is derived from the *clamped* size,
//! never from the raw pointer delta, so dragging past the floor cannot make
//! the panel jump.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─── Primitives ──────────────────────────────────────────────────────────

/// A position in canvas (or screen) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Vector from `origin` to `self`.
    pub fn delta_from(self, origin: Point) -> Delta {
        Delta {
            dx: self.x - origin.x,
            dy: self.y - origin.y,
        }
    }

    pub fn offset(self, delta: Delta) -> Point {
        Point {
            x: self.x + delta.dx,
            y: self.y + delta.dy,
        }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Component-wise maximum.
    pub fn max(self, other: Size) -> Size {
        Size {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }

    /// Component-wise minimum.
    pub fn min(self, other: Size) -> Size {
        Size {
            width: self.width.min(other.width),
            height: self.height.min(other.height),
        }
    }

    /// True when either dimension differs from `other` by more than `threshold`.
    pub fn differs_by_more_than(self, other: Size, threshold: f32) -> bool {
        (self.width - other.width).abs() > threshold
            || (self.height - other.height).abs() > threshold
    }
}

/// A pointer displacement.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Delta {
    pub dx: f32,
    pub dy: f32,
}

impl Delta {
    pub const fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }
}

/// An axis-aligned rectangle: panel position plus panel size.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_parts(position: Point, size: Size) -> Self {
        Self::new(position.x, position.y, size.width, size.height)
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    pub fn translate(&self, delta: Delta) -> Bounds {
        Bounds::from_parts(self.position().offset(delta), self.size())
    }

    pub fn with_size(&self, size: Size) -> Bounds {
        Bounds::from_parts(self.position(), size)
    }
}

// ─── Handles ─────────────────────────────────────────────────────────────

/// One of the eight resize grab zones around a panel border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    N,
    S,
    E,
    W,
    Ne,
    Nw,
    Se,
    Sw,
}

/// Which edge of an axis a handle drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edge {
    /// West or north: moving it shifts the panel origin.
    Leading,
    /// East or south: moving it only changes the size.
    Trailing,
}

impl Handle {
    pub const ALL: [Handle; 8] = [
        Handle::N,
        Handle::S,
        Handle::E,
        Handle::W,
        Handle::Ne,
        Handle::Nw,
        Handle::Se,
        Handle::Sw,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Handle::N => "n",
            Handle::S => "s",
            Handle::E => "e",
            Handle::W => "w",
            Handle::Ne => "ne",
            Handle::Nw => "nw",
            Handle::Se => "se",
            Handle::Sw => "sw",
        }
    }

    /// CSS cursor the host shows while hovering this handle.
    pub fn cursor(self) -> &'static str {
        match self {
            Handle::N | Handle::S => "ns-resize",
            Handle::E | Handle::W => "ew-resize",
            Handle::Ne | Handle::Sw => "nesw-resize",
            Handle::Nw | Handle::Se => "nwse-resize",
        }
    }

    pub fn affects_width(self) -> bool {
        self.horizontal_edge().is_some()
    }

    pub fn affects_height(self) -> bool {
        self.vertical_edge().is_some()
    }

    fn horizontal_edge(self) -> Option<Edge> {
        match self {
            Handle::E | Handle::Ne | Handle::Se => Some(Edge::Trailing),
            Handle::W | Handle::Nw | Handle::Sw => Some(Edge::Leading),
            Handle::N | Handle::S => None,
        }
    }

    fn vertical_edge(self) -> Option<Edge> {
        match self {
            Handle::S | Handle::Se | Handle::Sw => Some(Edge::Trailing),
            Handle::N | Handle::Ne | Handle::Nw => Some(Edge::Leading),
            Handle::E | Handle::W => None,
        }
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Handle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Handle::ALL
            .into_iter()
            .find(|h| h.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown resize handle '{s}'"))
    }
}

// ─── Resize ──────────────────────────────────────────────────────────────

/// Resize `origin` by dragging `handle` by `delta`, never going below `min`.
///
/// Each axis is resolved independently; corner handles simply apply both
/// axis rules. There is no aspect-ratio lock and no rotation.
pub fn resize(origin: Bounds, handle: Handle, delta: Delta, min: Size) -> Bounds {
    let (x, width) = resize_axis(
        origin.x,
        origin.width,
        delta.dx,
        min.width,
        handle.horizontal_edge(),
    );
    let (y, height) = resize_axis(
        origin.y,
        origin.height,
        delta.dy,
        min.height,
        handle.vertical_edge(),
    );
    Bounds::new(x, y, width, height)
}

fn resize_axis(pos: f32, size: f32, delta: f32, min: f32, edge: Option<Edge>) -> (f32, f32) {
    match edge {
        None => (pos, size),
        Some(Edge::Trailing) => (pos, (size + delta).max(min)),
        Some(Edge::Leading) => {
            let clamped = (size - delta).max(min);
            // The opposite edge stays anchored at `pos + size`.
            (pos + (size - clamped), clamped)
        }
    }
}
