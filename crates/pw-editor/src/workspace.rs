//! Workspace façade.
//!
//! Owns the store together with the controllers that write to it, plus the
//! canvas view. Hosts drive everything through this type: pointer and key
//! events come in, effects come out, and the host re-renders from
//! [`Workspace::panels`].

use crate::autofit::{AutoFitController, AutoFitOutcome, Trigger};
use crate::config::{ConfigError, WorkspaceConfig};
use crate::drag::{CancelReason, DragController, GestureEffect};
use crate::input::{PointerId, PointerTarget};
use crate::requests::{
    RequestError, RequestTicket, RequestTracker, Resolution, ServiceRequest, ServiceResponse,
};
use crate::shortcuts::{PanelAction, ShortcutMap};
use crate::store::{PanelStore, StoreError, StoreEvent, SubscriptionId};
use log::debug;
use pw_core::{
    Bounds, CanvasView, Delta, MessageKind, Panel, PanelData, PanelId, PanelKind, PanelPatch,
    Point, ResultsTab, Size, resize,
};

/// Result of a key press on a focused panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyOutcome {
    Moved(Bounds),
    Resized(Bounds),
    Toggled(AutoFitOutcome),
    Closed,
    Gesture(GestureEffect),
    /// No binding, unknown panel, or the panel is busy with a pointer gesture.
    Unhandled,
}

#[derive(Debug)]
pub struct Workspace {
    store: PanelStore,
    drag: DragController,
    autofit: AutoFitController,
    requests: RequestTracker,
    shortcuts: ShortcutMap,
    view: CanvasView,
    config: WorkspaceConfig,
}

impl Default for Workspace {
    fn default() -> Self {
        Self::from_valid(WorkspaceConfig::default())
    }
}

impl Workspace {
    /// Create a workspace after validating `config`.
    pub fn new(config: WorkspaceConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: WorkspaceConfig) -> Self {
        Self {
            store: PanelStore::new(config.policy_table()),
            drag: DragController::new(),
            autofit: AutoFitController::new(config.autofit_threshold),
            requests: RequestTracker::new(config.message_dismiss_ms),
            shortcuts: ShortcutMap::new(config.keyboard_step, config.keyboard_step_large),
            view: CanvasView::default(),
            config,
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn store(&self) -> &PanelStore {
        &self.store
    }

    pub fn panel(&self, id: PanelId) -> Option<&Panel> {
        self.store.get(id)
    }

    /// Panels in stacking order, bottom-most first.
    pub fn panels(&self) -> Vec<&Panel> {
        self.store.list()
    }

    pub fn view(&self) -> &CanvasView {
        &self.view
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn requests(&self) -> &RequestTracker {
        &self.requests
    }

    pub fn subscribe(&mut self, f: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        self.store.subscribe(f)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Open a new panel of `kind` at canvas position `at` with a generated id.
    pub fn open_panel(
        &mut self,
        kind: PanelKind,
        at: Point,
        expanded: bool,
    ) -> Result<PanelId, StoreError> {
        let id = PanelId::with_prefix(kind.name());
        self.insert(Panel::new(id, kind, at))?;
        if expanded {
            self.set_expanded(id, true);
        }
        Ok(id)
    }

    /// Insert a fully specified panel. Its size is clamped, not auto-fit.
    pub fn insert(&mut self, panel: Panel) -> Result<PanelId, StoreError> {
        self.store.create(panel)
    }

    /// Remove a panel, cancelling its gesture and abandoning its requests.
    pub fn close(&mut self, id: PanelId) -> Option<Panel> {
        self.drag.forget(id, CancelReason::PanelRemoved);
        let dropped = self.requests.forget_panel(id);
        if dropped > 0 {
            debug!("closing {id} abandons {dropped} request(s)");
        }
        self.store.remove(id)
    }

    pub fn clear(&mut self) {
        self.drag.cancel(CancelReason::PanelRemoved);
        self.requests.clear();
        self.store.clear();
    }

    // ─── Expansion & content ─────────────────────────────────────────────

    pub fn toggle_expanded(&mut self, id: PanelId) -> AutoFitOutcome {
        let Some(next) = self.store.get(id).map(|p| !p.is_expanded) else {
            return AutoFitOutcome::UnknownPanel;
        };
        self.set_expanded(id, next)
    }

    /// Collapse or expand, then land on the policy size.
    pub fn set_expanded(&mut self, id: PanelId, expanded: bool) -> AutoFitOutcome {
        if let Some(effect) = self.drag.forget(id, CancelReason::ExpansionChanged) {
            debug!("{effect:?}");
        }
        let patch = PanelPatch {
            is_expanded: Some(expanded),
            ..PanelPatch::default()
        };
        if self.store.update(id, patch).is_none() {
            return AutoFitOutcome::UnknownPanel;
        }
        self.autofit.apply(&mut self.store, id, Trigger::ExpansionToggled)
    }

    /// Replace a panel's payload with freshly loaded content.
    pub fn content_arrived(&mut self, id: PanelId, data: PanelData) -> AutoFitOutcome {
        if self.store.update(id, PanelPatch::data(data)).is_none() {
            return AutoFitOutcome::UnknownPanel;
        }
        self.autofit.apply(&mut self.store, id, Trigger::ContentArrived)
    }

    /// The host decoded the panel's image and measured it.
    pub fn image_loaded(&mut self, id: PanelId, natural: Size) -> AutoFitOutcome {
        let Some(panel) = self.store.get(id) else {
            return AutoFitOutcome::UnknownPanel;
        };
        let mut data = panel.data.clone();
        if !data.set_image_size(natural) {
            return AutoFitOutcome::WithinThreshold;
        }
        self.content_arrived(id, data)
    }

    /// Switch a model results panel to another tab.
    pub fn switch_tab(&mut self, id: PanelId, tab: ResultsTab) -> Option<AutoFitOutcome> {
        let mut data = self.store.get(id)?.data.clone();
        let PanelData::ModelResults(results) = &mut data else {
            return None;
        };
        results.tab = tab;
        self.store.update(id, PanelPatch::data(data));
        Some(self.autofit.apply(&mut self.store, id, Trigger::TabSwitched))
    }

    /// Fold or unfold a panel's optional section (cleaning report, graph
    /// options, advanced model settings).
    pub fn toggle_section(&mut self, id: PanelId) -> Option<AutoFitOutcome> {
        let mut data = self.store.get(id)?.data.clone();
        match &mut data {
            PanelData::Dataset(d) => d.show_report = !d.show_report,
            PanelData::GraphBuilder(d) => d.show_options = !d.show_options,
            PanelData::ModelBuilder(d) => d.show_advanced = !d.show_advanced,
            _ => return None,
        }
        self.store.update(id, PanelPatch::data(data));
        Some(self.autofit.apply(&mut self.store, id, Trigger::TabSwitched))
    }

    // ─── Messages ────────────────────────────────────────────────────────

    /// Show a validation message (an operation was invoked without a
    /// required selection). Geometry is unaffected.
    pub fn report_validation(&mut self, id: PanelId, text: &str, now_ms: f64) -> bool {
        let Some(panel) = self.store.get(id) else {
            return false;
        };
        let mut feedback = panel.feedback.clone();
        feedback.message = Some(self.requests.message(
            panel.kind(),
            MessageKind::Validation,
            text.to_string(),
            now_ms,
        ));
        self.store.update(id, PanelPatch::feedback(feedback));
        true
    }

    /// Clear a panel's message. Returns `false` if there was none.
    pub fn dismiss_message(&mut self, id: PanelId) -> bool {
        let Some(panel) = self.store.get(id) else {
            return false;
        };
        if panel.feedback.message.is_none() {
            return false;
        }
        let mut feedback = panel.feedback.clone();
        feedback.message = None;
        self.store.update(id, PanelPatch::feedback(feedback));
        true
    }

    /// Advance the clock: drop timed messages that have expired.
    pub fn tick(&mut self, now_ms: f64) -> Vec<PanelId> {
        let expired: Vec<PanelId> = self
            .store
            .list()
            .into_iter()
            .filter(|p| {
                p.feedback
                    .message
                    .as_ref()
                    .and_then(|m| m.dismiss_at_ms)
                    .is_some_and(|at| at <= now_ms)
            })
            .map(|p| p.id)
            .collect();
        for id in &expired {
            self.dismiss_message(*id);
        }
        expired
    }

    // ─── Service requests ────────────────────────────────────────────────

    pub fn begin_request(
        &mut self,
        id: PanelId,
        control: &str,
        request: ServiceRequest,
    ) -> Result<RequestTicket, RequestError> {
        self.requests.begin(&mut self.store, id, control, request)
    }

    pub fn resolve_request(
        &mut self,
        ticket: u64,
        response: ServiceResponse,
        now_ms: f64,
    ) -> Result<Resolution, RequestError> {
        self.requests
            .resolve(&mut self.store, &self.autofit, ticket, response, now_ms)
    }

    // ─── Pointer gestures (screen coordinates) ───────────────────────────

    pub fn pointer_down(
        &mut self,
        id: PanelId,
        pointer: PointerId,
        screen: Point,
        target: &PointerTarget,
    ) -> GestureEffect {
        let at = self.view.screen_to_canvas(screen);
        self.drag
            .pointer_down(&mut self.store, id, pointer, at, target)
    }

    pub fn pointer_move(&mut self, pointer: PointerId, screen: Point) -> GestureEffect {
        let at = self.view.screen_to_canvas(screen);
        self.drag.pointer_move(&mut self.store, pointer, at)
    }

    pub fn pointer_up(&mut self, pointer: PointerId) -> GestureEffect {
        self.drag.pointer_up(pointer)
    }

    pub fn pointer_cancel(&mut self, reason: CancelReason) -> GestureEffect {
        self.drag.cancel(reason)
    }

    pub fn gesture_listening(&self) -> bool {
        self.drag.listening()
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Handle a key press while panel `id` has focus.
    pub fn handle_key(&mut self, id: PanelId, key: &str, shift: bool, alt: bool) -> KeyOutcome {
        let Some(action) = self.shortcuts.resolve(key, shift, alt) else {
            return KeyOutcome::Unhandled;
        };
        if action == PanelAction::CancelGesture {
            if !self.drag.listening() {
                return KeyOutcome::Unhandled;
            }
            return KeyOutcome::Gesture(self.drag.cancel(CancelReason::Escape));
        }
        let Some(panel) = self.store.get(id) else {
            return KeyOutcome::Unhandled;
        };
        if self.drag.active_panel() == Some(id) {
            return KeyOutcome::Unhandled;
        }

        match action {
            PanelAction::Nudge(delta) => {
                let target = panel.bounds().translate(delta);
                self.write_bounds(id, target).map_or(KeyOutcome::Unhandled, KeyOutcome::Moved)
            }
            PanelAction::Resize(handle, delta) => {
                if !panel.is_expanded {
                    return KeyOutcome::Unhandled;
                }
                let min = self.store.policy(panel).min;
                let target = resize(panel.bounds(), handle, delta, min);
                self.write_bounds(id, target).map_or(KeyOutcome::Unhandled, KeyOutcome::Resized)
            }
            PanelAction::ToggleExpanded => KeyOutcome::Toggled(self.toggle_expanded(id)),
            PanelAction::Close => {
                self.close(id);
                KeyOutcome::Closed
            }
            PanelAction::CancelGesture => KeyOutcome::Unhandled,
        }
    }

    fn write_bounds(&mut self, id: PanelId, bounds: Bounds) -> Option<Bounds> {
        self.store
            .update(id, PanelPatch::bounds(bounds))
            .map(Panel::bounds)
    }

    // ─── View ────────────────────────────────────────────────────────────

    pub fn pan_by(&mut self, delta: Delta) {
        self.view.pan_by(delta);
    }

    /// Zoom by `factor` around a screen-space anchor, within the configured range.
    pub fn zoom_at(&mut self, anchor: Point, factor: f32) {
        self.view
            .zoom_at(anchor, factor, self.config.min_zoom, self.config.max_zoom);
        debug!("zoom {} pan {:?}", self.view.zoom, self.view.pan);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use pw_core::Message;

    #[test]
    fn open_expanded_lands_on_base() {
        let mut ws = Workspace::default();
        let id = ws
            .open_panel(PanelKind::ModelBuilder, Point::new(10.0, 10.0), true)
            .unwrap();
        let panel = ws.panel(id).unwrap();
        assert!(id.as_str().starts_with("model-builder_"));
        assert_eq!(panel.size, Size::new(520.0, 560.0));
    }

    #[test]
    fn toggle_collapses_to_exact_size() {
        let mut ws = Workspace::default();
        let id = ws.open_panel(PanelKind::Dataset, Point::ORIGIN, true).unwrap();
        ws.handle_key(id, "ArrowRight", false, true);
        ws.toggle_expanded(id);
        let panel = ws.panel(id).unwrap();
        assert!(!panel.is_expanded);
        assert_eq!(panel.size, Size::new(300.0, 120.0));
    }

    #[test]
    fn keyboard_nudge_and_resize() {
        let mut ws = Workspace::default();
        let id = ws.open_panel(PanelKind::GraphResult, Point::ORIGIN, true).unwrap();
        assert_eq!(
            ws.handle_key(id, "ArrowLeft", true, false),
            KeyOutcome::Moved(Bounds::new(-50.0, 0.0, 540.0, 400.0))
        );
        // Shrinking far below the minimum clamps.
        for _ in 0..40 {
            ws.handle_key(id, "ArrowUp", true, true);
        }
        assert_eq!(ws.panel(id).unwrap().size, Size::new(540.0, 110.0));
    }

    #[test]
    fn zoomed_drag_moves_in_canvas_units() {
        let mut ws = Workspace::default();
        let id = ws.open_panel(PanelKind::Dataset, Point::ORIGIN, false).unwrap();
        ws.zoom_at(Point::ORIGIN, 2.0);
        let p = PointerId(3);
        ws.pointer_down(id, p, Point::new(20.0, 20.0), &PointerTarget::surface());
        ws.pointer_move(p, Point::new(220.0, 120.0));
        ws.pointer_up(p);
        assert_eq!(ws.panel(id).unwrap().position, Point::new(100.0, 50.0));
    }

    #[test]
    fn timed_messages_expire_on_tick() {
        let mut ws = Workspace::default();
        let graph = ws.open_panel(PanelKind::GraphBuilder, Point::ORIGIN, true).unwrap();
        let model = ws.open_panel(PanelKind::ModelBuilder, Point::ORIGIN, true).unwrap();
        ws.report_validation(graph, "Select an X column", 1000.0);
        ws.report_validation(model, "Select a target column", 1000.0);

        assert!(ws.tick(5999.0).is_empty());
        assert_eq!(ws.tick(6000.0), vec![graph]);
        assert_eq!(ws.panel(graph).unwrap().feedback.message, None);
        assert_eq!(
            ws.panel(model).unwrap().feedback.message,
            Some(Message {
                kind: MessageKind::Validation,
                text: "Select a target column".into(),
                dismiss_at_ms: None,
            })
        );
        assert!(ws.dismiss_message(model));
        assert!(!ws.dismiss_message(model));
    }

    #[test]
    fn closing_dragged_panel_stops_gesture() {
        let mut ws = Workspace::default();
        let id = ws.open_panel(PanelKind::Dataset, Point::ORIGIN, false).unwrap();
        let p = PointerId(1);
        ws.pointer_down(id, p, Point::ORIGIN, &PointerTarget::surface());
        assert!(ws.gesture_listening());
        assert_eq!(ws.handle_key(id, "Delete", false, false), KeyOutcome::Unhandled);
        ws.close(id);
        assert!(!ws.gesture_listening());
        assert!(ws.panel(id).is_none());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = WorkspaceConfig {
            keyboard_step: 0.0,
            ..WorkspaceConfig::default()
        };
        assert!(matches!(
            Workspace::new(config),
            Err(ConfigError::KeyboardStep { .. })
        ));
    }

    #[test]
    fn debug_output_names_the_parts() {
        let ws = Workspace::default();
        let text = format!("{ws:?}");
        assert!(text.contains("ShortcutMap"), "{text}");
        assert!(text.contains("RequestTracker"), "{text}");
    }
}
