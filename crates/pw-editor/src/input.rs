//! Input abstraction layer.
//!
//! The host (browser, test harness, replay script) reports where a pointer
//! went down as the *structure* around the event target: the list of
//! regions from the target up to the panel root. Gesture decisions are made
//! from that path alone, so a newly added control opts out of dragging just
//! by living inside a `NonDrag` region.

use pw_core::Handle;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Identifies one pointer (mouse, touch contact, pen) for the duration of a press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PointerId(pub u32);

/// A structural region inside a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "region", content = "handle", rename_all = "snake_case")]
pub enum Region {
    /// Plain panel surface (body, title bar, padding).
    Surface,
    /// The panel's designated non-drag subtree: inputs, buttons, tables…
    NonDrag,
    /// A resize grab zone on the border.
    Handle(Handle),
}

/// What a pointer-down landed on, innermost region first.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerTarget {
    pub path: SmallVec<[Region; 4]>,
}

/// How a pointer-down should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetClass {
    /// Start a move gesture.
    Drag,
    /// Start a resize gesture from this handle.
    Resize(Handle),
    /// Inside an interactive control: leave it to the control.
    Interactive,
}

impl PointerTarget {
    /// A hit on the bare panel surface.
    pub fn surface() -> Self {
        Self::from_path([Region::Surface])
    }

    /// A hit inside the non-drag subtree.
    pub fn control() -> Self {
        Self::from_path([Region::NonDrag, Region::Surface])
    }

    pub fn handle(handle: Handle) -> Self {
        Self::from_path([Region::Handle(handle), Region::Surface])
    }

    pub fn from_path(path: impl IntoIterator<Item = Region>) -> Self {
        Self {
            path: path.into_iter().collect(),
        }
    }

    /// Classify the target. Any `NonDrag` ancestor vetoes the gesture; the
    /// nearest `Handle` (if any) turns it into a resize.
    pub fn classify(&self) -> TargetClass {
        if self.path.iter().any(|r| matches!(r, Region::NonDrag)) {
            return TargetClass::Interactive;
        }
        self.path
            .iter()
            .find_map(|r| match r {
                Region::Handle(h) => Some(TargetClass::Resize(*h)),
                _ => None,
            })
            .unwrap_or(TargetClass::Drag)
    }
}
