//! Drag and resize gestures.
//!
//! One controller per workspace owns the single active gesture:
//!
//! ```text
//! Idle ──pointerdown──▶ Armed ──pointermove──▶ Dragging
//!   ▲                     │                       │
//!   └──── up / cancel / lost capture ─────────────┘
//! ```
//!
//! Positions are always recomputed from the snapshot taken at pointerdown
//! (`origin + (pointer − origin_pointer)`), never accumulated per frame, so
//! a long drag cannot drift. Each frame is written through the store: a move
//! writes only the position, a resize writes the complete clamped rectangle.
//! Ending or cancelling a gesture just stops writing.

use crate::input::{PointerId, PointerTarget, TargetClass};
use crate::store::PanelStore;
use log::{debug, trace};
use pw_core::{Bounds, Handle, PanelId, PanelPatch, Point, Size, resize};

/// What the active gesture does to its panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Move,
    Resize(Handle),
}

/// Snapshot taken when a gesture starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSession {
    pub panel: PanelId,
    pub kind: GestureKind,
    pub pointer: PointerId,
    /// Pointer position at pointerdown, canvas coordinates.
    pub origin_pointer: Point,
    /// Panel geometry at pointerdown.
    pub origin: Bounds,
    pub min: Size,
    /// Last geometry written to the store.
    pub last: Bounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Armed(GestureSession),
    Dragging(GestureSession),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoopReason {
    /// Move/up/cancel with no active gesture.
    Idle,
    /// Pointerdown while another gesture is active.
    GestureInProgress,
    /// Event from a pointer other than the one that started the gesture.
    PointerMismatch,
    /// Pointerdown inside an interactive control.
    InteractiveTarget,
    UnknownPanel,
    /// Collapsed panels have a fixed size.
    CollapsedResize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    PointerCancel,
    LostCapture,
    Escape,
    PanelRemoved,
    /// The panel was expanded or collapsed under the gesture.
    ExpansionChanged,
}

/// The outcome of one gesture event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEffect {
    /// Gesture armed; the host should attach global move/up listeners.
    Started { panel: PanelId, kind: GestureKind },
    Moved { panel: PanelId, bounds: Bounds },
    Resized { panel: PanelId, bounds: Bounds },
    /// Pointer released; the host should detach its listeners.
    Finished {
        panel: PanelId,
        bounds: Bounds,
        changed: bool,
    },
    /// Gesture interrupted; the host should detach its listeners.
    Canceled { panel: PanelId, reason: CancelReason },
    Noop(NoopReason),
}

impl GestureEffect {
    /// Whether the store was written by this event.
    pub fn changed_geometry(&self) -> bool {
        matches!(self, GestureEffect::Moved { .. } | GestureEffect::Resized { .. })
    }
}

/// Converts pointer gestures into store updates.
#[derive(Debug, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// The active session, if any.
    pub fn session(&self) -> Option<&GestureSession> {
        match &self.state {
            DragState::Idle => None,
            DragState::Armed(s) | DragState::Dragging(s) => Some(s),
        }
    }

    /// True while global pointer listeners should be attached.
    pub fn listening(&self) -> bool {
        self.session().is_some()
    }

    pub fn active_panel(&self) -> Option<PanelId> {
        self.session().map(|s| s.panel)
    }

    /// Pointer pressed on `panel` at canvas position `at`.
    pub fn pointer_down(
        &mut self,
        store: &mut PanelStore,
        panel: PanelId,
        pointer: PointerId,
        at: Point,
        target: &PointerTarget,
    ) -> GestureEffect {
        if self.listening() {
            return GestureEffect::Noop(NoopReason::GestureInProgress);
        }
        let kind = match target.classify() {
            TargetClass::Interactive => {
                return GestureEffect::Noop(NoopReason::InteractiveTarget);
            }
            TargetClass::Drag => GestureKind::Move,
            TargetClass::Resize(handle) => GestureKind::Resize(handle),
        };
        let Some(p) = store.get(panel) else {
            return GestureEffect::Noop(NoopReason::UnknownPanel);
        };
        if matches!(kind, GestureKind::Resize(_)) && !p.is_expanded {
            return GestureEffect::Noop(NoopReason::CollapsedResize);
        }
        let origin = p.bounds();
        let min = store.policy(p).min;
        store.bring_to_front(panel);

        debug!("gesture {kind:?} start on {panel} at {at:?}");
        self.state = DragState::Armed(GestureSession {
            panel,
            kind,
            pointer,
            origin_pointer: at,
            origin,
            min,
            last: origin,
        });
        GestureEffect::Started { panel, kind }
    }

    /// Pointer moved to canvas position `at`.
    pub fn pointer_move(
        &mut self,
        store: &mut PanelStore,
        pointer: PointerId,
        at: Point,
    ) -> GestureEffect {
        let mut session = match self.state {
            DragState::Idle => return GestureEffect::Noop(NoopReason::Idle),
            DragState::Armed(s) | DragState::Dragging(s) => s,
        };
        if session.pointer != pointer {
            return GestureEffect::Noop(NoopReason::PointerMismatch);
        }

        let delta = at.delta_from(session.origin_pointer);
        // Moves write position only; size belongs to resize and auto-fit.
        let patch = match session.kind {
            GestureKind::Move => PanelPatch::position(session.origin.position().offset(delta)),
            GestureKind::Resize(handle) => {
                PanelPatch::bounds(resize(session.origin, handle, delta, session.min))
            }
        };
        let Some(stored) = store.update(session.panel, patch) else {
            return self.cancel(CancelReason::PanelRemoved);
        };
        session.last = stored.bounds();
        trace!("gesture frame {} -> {:?}", session.panel, session.last);

        self.state = DragState::Dragging(session);
        match session.kind {
            GestureKind::Move => GestureEffect::Moved {
                panel: session.panel,
                bounds: session.last,
            },
            GestureKind::Resize(_) => GestureEffect::Resized {
                panel: session.panel,
                bounds: session.last,
            },
        }
    }

    /// Pointer released. The last written frame stands.
    pub fn pointer_up(&mut self, pointer: PointerId) -> GestureEffect {
        let session = match self.state {
            DragState::Idle => return GestureEffect::Noop(NoopReason::Idle),
            DragState::Armed(s) | DragState::Dragging(s) => s,
        };
        if session.pointer != pointer {
            return GestureEffect::Noop(NoopReason::PointerMismatch);
        }
        self.state = DragState::Idle;
        debug!("gesture end on {} at {:?}", session.panel, session.last);
        GestureEffect::Finished {
            panel: session.panel,
            bounds: session.last,
            changed: session.last != session.origin,
        }
    }

    /// Abort the active gesture without writing anything further.
    pub fn cancel(&mut self, reason: CancelReason) -> GestureEffect {
        let Some(session) = self.session().copied() else {
            return GestureEffect::Noop(NoopReason::Idle);
        };
        self.state = DragState::Idle;
        debug!("gesture on {} canceled: {reason:?}", session.panel);
        GestureEffect::Canceled {
            panel: session.panel,
            reason,
        }
    }

    /// Cancel the gesture if it targets `panel`.
    pub fn forget(&mut self, panel: PanelId, reason: CancelReason) -> Option<GestureEffect> {
        (self.active_panel() == Some(panel)).then(|| self.cancel(reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolicyTable;
    use crate::input::Region;
    use pretty_assertions::assert_eq;
    use pw_core::{Panel, PanelKind};

    const P: PointerId = PointerId(1);

    fn store_with(name: &str, bounds: Bounds) -> (PanelStore, PanelId) {
        let mut store = PanelStore::new(PolicyTable::default());
        let id = store
            .create(Panel::new(
                PanelId::intern(name),
                PanelKind::ModelResults,
                bounds.position(),
            ))
            .unwrap();
        store.update(
            id,
            PanelPatch {
                is_expanded: Some(true),
                size: Some(bounds.size()),
                ..PanelPatch::default()
            },
        );
        (store, id)
    }

    #[test]
    fn move_follows_pointer_from_origin() {
        let (mut store, id) = store_with("drag_move", Bounds::new(100.0, 100.0, 720.0, 560.0));
        let mut drag = DragController::new();

        let effect = drag.pointer_down(
            &mut store,
            id,
            P,
            Point::new(150.0, 120.0),
            &PointerTarget::surface(),
        );
        assert_eq!(
            effect,
            GestureEffect::Started {
                panel: id,
                kind: GestureKind::Move
            }
        );
        assert!(drag.listening());

        drag.pointer_move(&mut store, P, Point::new(160.0, 125.0));
        drag.pointer_move(&mut store, P, Point::new(-850.0, -20.0));
        let pos = store.get(id).unwrap().position;
        assert_eq!(pos, Point::new(-900.0, -40.0));

        let effect = drag.pointer_up(P);
        assert!(matches!(effect, GestureEffect::Finished { changed: true, .. }));
        assert!(!drag.listening());
        assert_eq!(store.get(id).unwrap().position, Point::new(-900.0, -40.0));
    }

    #[test]
    fn interactive_target_never_arms() {
        let (mut store, id) = store_with("drag_control", Bounds::new(0.0, 0.0, 720.0, 560.0));
        let mut drag = DragController::new();
        let target = PointerTarget::from_path([Region::NonDrag, Region::Surface]);

        let effect = drag.pointer_down(&mut store, id, P, Point::new(10.0, 10.0), &target);
        assert_eq!(effect, GestureEffect::Noop(NoopReason::InteractiveTarget));
        let effect = drag.pointer_move(&mut store, P, Point::new(300.0, 300.0));
        assert_eq!(effect, GestureEffect::Noop(NoopReason::Idle));
        assert_eq!(store.get(id).unwrap().position, Point::ORIGIN);
    }

    #[test]
    fn resize_clamps_through_the_store() {
        let (mut store, id) = store_with("drag_resize", Bounds::new(0.0, 0.0, 720.0, 560.0));
        let min = PanelKind::ModelResults.default_policy().min;
        let mut drag = DragController::new();

        drag.pointer_down(
            &mut store,
            id,
            P,
            Point::ORIGIN,
            &PointerTarget::handle(Handle::Nw),
        );
        let effect = drag.pointer_move(&mut store, P, Point::new(5000.0, 5000.0));
        let expected = Bounds::new(720.0 - min.width, 560.0 - min.height, min.width, min.height);
        assert_eq!(
            effect,
            GestureEffect::Resized {
                panel: id,
                bounds: expected
            }
        );
        assert_eq!(store.get(id).unwrap().bounds(), expected);
    }

    #[test]
    fn other_pointers_are_ignored() {
        let (mut store, id) = store_with("drag_pointer", Bounds::new(0.0, 0.0, 720.0, 560.0));
        let mut drag = DragController::new();
        drag.pointer_down(&mut store, id, P, Point::ORIGIN, &PointerTarget::surface());

        let effect = drag.pointer_move(&mut store, PointerId(9), Point::new(50.0, 50.0));
        assert_eq!(effect, GestureEffect::Noop(NoopReason::PointerMismatch));
        let effect = drag.pointer_down(
            &mut store,
            id,
            PointerId(9),
            Point::ORIGIN,
            &PointerTarget::surface(),
        );
        assert_eq!(effect, GestureEffect::Noop(NoopReason::GestureInProgress));
        assert_eq!(store.get(id).unwrap().position, Point::ORIGIN);
    }

    #[test]
    fn lost_capture_resets_to_idle_keeping_last_frame() {
        let (mut store, id) = store_with("drag_cancel", Bounds::new(0.0, 0.0, 720.0, 560.0));
        let mut drag = DragController::new();
        drag.pointer_down(&mut store, id, P, Point::ORIGIN, &PointerTarget::surface());
        drag.pointer_move(&mut store, P, Point::new(30.0, 40.0));

        let effect = drag.cancel(CancelReason::LostCapture);
        assert_eq!(
            effect,
            GestureEffect::Canceled {
                panel: id,
                reason: CancelReason::LostCapture
            }
        );
        assert_eq!(drag.state(), &DragState::Idle);
        // Stray move after cancel does nothing.
        drag.pointer_move(&mut store, P, Point::new(500.0, 500.0));
        assert_eq!(store.get(id).unwrap().position, Point::new(30.0, 40.0));
    }

    #[test]
    fn collapsed_panels_cannot_be_resized() {
        let mut store = PanelStore::default();
        let id = store
            .create(Panel::new(
                PanelId::intern("drag_collapsed"),
                PanelKind::Dataset,
                Point::ORIGIN,
            ))
            .unwrap();
        let mut drag = DragController::new();
        let effect = drag.pointer_down(
            &mut store,
            id,
            P,
            Point::ORIGIN,
            &PointerTarget::handle(Handle::Se),
        );
        assert_eq!(effect, GestureEffect::Noop(NoopReason::CollapsedResize));
        // Moving a collapsed panel is fine.
        let effect =
            drag.pointer_down(&mut store, id, P, Point::ORIGIN, &PointerTarget::surface());
        assert!(matches!(effect, GestureEffect::Started { .. }));
    }

    #[test]
    fn removed_panel_cancels_gesture() {
        let (mut store, id) = store_with("drag_removed", Bounds::new(0.0, 0.0, 720.0, 560.0));
        let mut drag = DragController::new();
        drag.pointer_down(&mut store, id, P, Point::ORIGIN, &PointerTarget::surface());
        store.remove(id);
        let effect = drag.pointer_move(&mut store, P, Point::new(1.0, 1.0));
        assert_eq!(
            effect,
            GestureEffect::Canceled {
                panel: id,
                reason: CancelReason::PanelRemoved
            }
        );
        assert!(!drag.listening());
    }

    #[test]
    fn move_frames_leave_size_to_other_writers() {
        let (mut store, id) = store_with("drag_keeps_size", Bounds::new(0.0, 0.0, 720.0, 560.0));
        let mut drag = DragController::new();
        drag.pointer_down(&mut store, id, P, Point::ORIGIN, &PointerTarget::surface());
        drag.pointer_move(&mut store, P, Point::new(20.0, 20.0));

        store.update(id, PanelPatch::size(Size::new(900.0, 700.0)));
        let effect = drag.pointer_move(&mut store, P, Point::new(30.0, 25.0));
        assert_eq!(
            effect,
            GestureEffect::Moved {
                panel: id,
                bounds: Bounds::new(30.0, 25.0, 900.0, 700.0)
            }
        );
        assert_eq!(store.get(id).unwrap().size, Size::new(900.0, 700.0));
    }

    #[test]
    fn forget_only_cancels_the_matching_panel() {
        let (mut store, id) = store_with("drag_forget", Bounds::new(0.0, 0.0, 720.0, 560.0));
        let mut drag = DragController::new();
        drag.pointer_down(&mut store, id, P, Point::ORIGIN, &PointerTarget::surface());

        assert_eq!(
            drag.forget(PanelId::intern("drag_forget_other"), CancelReason::PanelRemoved),
            None
        );
        assert!(drag.listening());
        assert_eq!(
            drag.forget(id, CancelReason::ExpansionChanged),
            Some(GestureEffect::Canceled {
                panel: id,
                reason: CancelReason::ExpansionChanged
            })
        );
        assert!(!drag.listening());
    }
}
