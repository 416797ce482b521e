//! Keyboard equivalents for panel gestures.
//!
//! Maps `KeyboardEvent.key` plus modifiers to a semantic [`PanelAction`].
//! Arrow moves and Alt+arrow resizes are expressed as deltas so they run
//! through the same geometry path as pointer gestures.

use pw_core::{Delta, Handle};

/// Actions the focused panel understands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelAction {
    /// Move by a canvas delta.
    Nudge(Delta),
    /// Resize from `handle` by a canvas delta.
    Resize(Handle, Delta),
    ToggleExpanded,
    Close,
    /// Abort the active pointer gesture.
    CancelGesture,
}

/// Resolves key events into panel actions.
#[derive(Debug)]
pub struct ShortcutMap {
    step: f32,
    large_step: f32,
}

impl Default for ShortcutMap {
    fn default() -> Self {
        Self::new(10.0, 50.0)
    }
}

impl ShortcutMap {
    pub fn new(step: f32, large_step: f32) -> Self {
        Self { step, large_step }
    }

    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"ArrowLeft"`, `"Enter"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(&self, key: &str, shift: bool, alt: bool) -> Option<PanelAction> {
        let step = if shift { self.large_step } else { self.step };
        let arrow = match key {
            "ArrowLeft" => Some(Delta::new(-step, 0.0)),
            "ArrowRight" => Some(Delta::new(step, 0.0)),
            "ArrowUp" => Some(Delta::new(0.0, -step)),
            "ArrowDown" => Some(Delta::new(0.0, step)),
            _ => None,
        };

        if let Some(delta) = arrow {
            if !alt {
                return Some(PanelAction::Nudge(delta));
            }
            // Alt+arrows grow/shrink from the trailing edges, keeping the
            // top-left corner in place.
            let handle = if delta.dx != 0.0 { Handle::E } else { Handle::S };
            return Some(PanelAction::Resize(handle, delta));
        }

        match key {
            "Enter" => Some(PanelAction::ToggleExpanded),
            "Delete" | "Backspace" => Some(PanelAction::Close),
            "Escape" => Some(PanelAction::CancelGesture),
            _ => None,
        }
    }
}
