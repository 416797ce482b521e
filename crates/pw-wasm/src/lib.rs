//! WASM bridge for the panel workspace: exposes the Rust engine to the
//! browser canvas host.
//!
//! Compiled via `wasm-pack build --target web`. Every method that can fail
//! or produce structured output returns a JSON string; errors come back as
//! `{"ok":false,"error":"..."}`.

use pw_core::{Delta, Frame, PanelId, PanelKind, Point, ResultsTab, ScaledContent, Size};
use pw_editor::{
    AutoFitOutcome, CancelReason, GestureEffect, KeyOutcome, PointerId, PointerTarget, Region,
    ServiceFailure, ServiceRequest, Workspace, WorkspaceConfig,
};
use serde::Deserialize;
use serde_json::{Value, json};
use wasm_bindgen::prelude::*;
use web_sys::Element;

/// Marks the element whose subtree belongs to one panel.
const PANEL_ROOT_ATTR: &str = "data-panel-root";
/// Marks the panel's non-drag subtree (inputs, buttons, tables…).
const NO_DRAG_ATTR: &str = "data-no-drag";
/// Marks a resize grab zone; the value is the handle name (`"se"`, `"n"`…).
const HANDLE_ATTR: &str = "data-handle";

/// The WASM-facing workspace controller.
///
/// All interaction from the page goes through this struct. Coordinates
/// passed in are screen pixels relative to the canvas element.
#[wasm_bindgen]
pub struct PanelWorkspace {
    inner: Workspace,
}

#[wasm_bindgen]
impl PanelWorkspace {
    /// Create a workspace with the default configuration.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        console_error_panic_hook_setup();
        Self {
            inner: Workspace::default(),
        }
    }

    /// Create a workspace from a JSON `WorkspaceConfig`.
    pub fn with_config(json: &str) -> Result<PanelWorkspace, JsValue> {
        console_error_panic_hook_setup();
        let config = WorkspaceConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
        let inner = Workspace::new(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self { inner })
    }

    // ─── Panels ──────────────────────────────────────────────────────────

    /// All panels in stacking order as a JSON array.
    pub fn panels_json(&self) -> String {
        serde_json::to_string(&self.inner.panels()).unwrap_or_else(|_| "[]".to_string())
    }

    /// A single panel as JSON, or `null`.
    pub fn panel_json(&self, id: &str) -> String {
        let panel = self.inner.panel(PanelId::intern(id));
        serde_json::to_string(&panel).unwrap_or_else(|_| "null".to_string())
    }

    /// Open a panel. Returns `{"ok":true,"id":"..."}`.
    pub fn open_panel(&mut self, kind: &str, x: f32, y: f32, expanded: bool) -> String {
        let kind = match kind.parse::<PanelKind>() {
            Ok(k) => k,
            Err(e) => return error_json(e),
        };
        match self.inner.open_panel(kind, Point::new(x, y), expanded) {
            Ok(id) => json!({ "ok": true, "id": id }).to_string(),
            Err(e) => error_json(e),
        }
    }

    pub fn close_panel(&mut self, id: &str) -> bool {
        self.inner.close(PanelId::intern(id)).is_some()
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    pub fn toggle_expanded(&mut self, id: &str) -> String {
        fit_json(self.inner.toggle_expanded(PanelId::intern(id)))
    }

    /// Replace a panel's payload (`PanelData` JSON) and auto-fit.
    pub fn content_arrived(&mut self, id: &str, data_json: &str) -> String {
        match serde_json::from_str(data_json) {
            Ok(data) => fit_json(self.inner.content_arrived(PanelId::intern(id), data)),
            Err(e) => error_json(e),
        }
    }

    /// Report the natural size of a decoded image.
    pub fn image_loaded(&mut self, id: &str, width: f32, height: f32) -> String {
        fit_json(
            self.inner
                .image_loaded(PanelId::intern(id), Size::new(width, height)),
        )
    }

    /// Switch a model results tab (`"summary"`, `"importance"`, `"predictions"`).
    pub fn switch_tab(&mut self, id: &str, tab: &str) -> String {
        let tab: ResultsTab = match serde_json::from_value(Value::String(tab.to_string())) {
            Ok(t) => t,
            Err(e) => return error_json(e),
        };
        match self.inner.switch_tab(PanelId::intern(id), tab) {
            Some(outcome) => fit_json(outcome),
            None => error_json(format!("panel '{id}' has no tabs")),
        }
    }

    pub fn toggle_section(&mut self, id: &str) -> String {
        match self.inner.toggle_section(PanelId::intern(id)) {
            Some(outcome) => fit_json(outcome),
            None => error_json(format!("panel '{id}' has no optional section")),
        }
    }

    // ─── Pointer gestures ────────────────────────────────────────────────

    /// Pointer pressed inside a panel. `target` is the event target; its
    /// ancestry up to the panel root decides drag, resize or nothing.
    pub fn pointer_down(
        &mut self,
        panel_id: &str,
        pointer_id: u32,
        x: f32,
        y: f32,
        target: &Element,
    ) -> String {
        let target = target_from_dom(target);
        effect_json(&self.inner.pointer_down(
            PanelId::intern(panel_id),
            PointerId(pointer_id),
            Point::new(x, y),
            &target,
        ))
    }

    /// Same as `pointer_down` with the region path given as JSON, for hosts
    /// that are not DOM-backed.
    pub fn pointer_down_path(
        &mut self,
        panel_id: &str,
        pointer_id: u32,
        x: f32,
        y: f32,
        path_json: &str,
    ) -> String {
        let path: Vec<Region> = match serde_json::from_str(path_json) {
            Ok(p) => p,
            Err(e) => return error_json(e),
        };
        effect_json(&self.inner.pointer_down(
            PanelId::intern(panel_id),
            PointerId(pointer_id),
            Point::new(x, y),
            &PointerTarget::from_path(path),
        ))
    }

    pub fn pointer_move(&mut self, pointer_id: u32, x: f32, y: f32) -> String {
        effect_json(&self.inner.pointer_move(PointerId(pointer_id), Point::new(x, y)))
    }

    pub fn pointer_up(&mut self, pointer_id: u32) -> String {
        effect_json(&self.inner.pointer_up(PointerId(pointer_id)))
    }

    pub fn pointer_cancel(&mut self) -> String {
        effect_json(&self.inner.pointer_cancel(CancelReason::PointerCancel))
    }

    pub fn lost_pointer_capture(&mut self) -> String {
        effect_json(&self.inner.pointer_cancel(CancelReason::LostCapture))
    }

    /// Whether global pointermove/pointerup listeners should be attached.
    pub fn is_listening(&self) -> bool {
        self.inner.gesture_listening()
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Handle a key press on a focused panel. Returns
    /// `{"handled":bool,"action":"<name>", ...}`.
    pub fn handle_key(&mut self, panel_id: &str, key: &str, shift: bool, alt: bool) -> String {
        let outcome = self
            .inner
            .handle_key(PanelId::intern(panel_id), key, shift, alt);
        key_json(&outcome)
    }

    // ─── Messages & requests ─────────────────────────────────────────────

    pub fn report_validation(&mut self, id: &str, text: &str) -> bool {
        self.inner
            .report_validation(PanelId::intern(id), text, js_sys::Date::now())
    }

    pub fn dismiss_message(&mut self, id: &str) -> bool {
        self.inner.dismiss_message(PanelId::intern(id))
    }

    /// Drop expired messages. Returns the affected panel ids as a JSON array.
    pub fn tick(&mut self) -> String {
        let dismissed = self.inner.tick(js_sys::Date::now());
        serde_json::to_string(&dismissed).unwrap_or_else(|_| "[]".to_string())
    }

    /// Start a request (`ServiceRequest` JSON). Returns `{"ok":true,"ticket":{...}}`.
    pub fn begin_request(&mut self, id: &str, control: &str, request_json: &str) -> String {
        let request: ServiceRequest = match serde_json::from_str(request_json) {
            Ok(r) => r,
            Err(e) => return error_json(e),
        };
        match self
            .inner
            .begin_request(PanelId::intern(id), control, request)
        {
            Ok(ticket) => json!({ "ok": true, "ticket": ticket }).to_string(),
            Err(e) => error_json(e),
        }
    }

    /// Resolve a ticket with `{"ok": <ServicePayload>}` or `{"error": "message"}`.
    pub fn resolve_request(&mut self, ticket: u64, response_json: &str) -> String {
        let response = match serde_json::from_str::<WireResponse>(response_json) {
            Ok(WireResponse::Ok { ok }) => Ok(ok),
            Ok(WireResponse::Err { error }) => Err(ServiceFailure { message: error }),
            Err(e) => return error_json(e),
        };
        match self
            .inner
            .resolve_request(ticket, response, js_sys::Date::now())
        {
            Ok(resolution) => json!({ "ok": true, "resolution": format!("{resolution:?}") }).to_string(),
            Err(e) => error_json(e),
        }
    }

    // ─── View ────────────────────────────────────────────────────────────

    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.inner.pan_by(Delta::new(dx, dy));
    }

    pub fn zoom_at(&mut self, x: f32, y: f32, factor: f32) {
        self.inner.zoom_at(Point::new(x, y), factor);
    }

    /// Current pan/zoom as JSON.
    pub fn view_json(&self) -> String {
        serde_json::to_string(self.inner.view()).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for PanelWorkspace {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Standalone helpers (no workspace needed) ────────────────────────────

/// Fit fixed-layout content into a panel body. Returns
/// `{"ok":true,"factor":f,"width":w,"height":h,"matrix":[a,b,c,d,e,f]}`
/// (the matrix is ready for CSS `transform: matrix(...)`), or
/// `{"ok":false,...}` when either frame is degenerate.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn fit_content(
    viewport_width: f32,
    viewport_height: f32,
    viewport_header: f32,
    reference_width: f32,
    reference_height: f32,
    reference_header: f32,
) -> String {
    let viewport = Frame::new(viewport_width, viewport_height, viewport_header);
    let reference = Frame::new(reference_width, reference_height, reference_header);
    match ScaledContent::fit(viewport, reference) {
        Some(fit) => json!({
            "ok": true,
            "factor": fit.factor,
            "width": fit.content.width,
            "height": fit.content.height,
            "matrix": fit.transform.as_coeffs(),
        })
        .to_string(),
        None => error_json("content frame is degenerate"),
    }
}

/// Validate a workspace config. Returns `{"ok":true}` or `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_config(json: &str) -> String {
    match WorkspaceConfig::from_json(json) {
        Ok(_) => r#"{"ok":true}"#.to_string(),
        Err(e) => error_json(e),
    }
}

// ─── JSON plumbing ───────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum WireResponse {
    Ok { ok: pw_core::ServicePayload },
    Err { error: String },
}

fn error_json(e: impl std::fmt::Display) -> String {
    json!({ "ok": false, "error": e.to_string() }).to_string()
}

fn fit_json(outcome: AutoFitOutcome) -> String {
    match outcome {
        AutoFitOutcome::Applied { from, to } => {
            json!({ "ok": true, "applied": true, "from": from, "to": to }).to_string()
        }
        AutoFitOutcome::WithinThreshold => json!({ "ok": true, "applied": false }).to_string(),
        AutoFitOutcome::UnknownPanel => error_json("unknown panel"),
    }
}

fn effect_value(effect: &GestureEffect) -> Value {
    match effect {
        GestureEffect::Started { panel, kind } => json!({
            "effect": "started",
            "panel": panel,
            "gesture": format!("{kind:?}").to_lowercase(),
            "listen": true,
        }),
        GestureEffect::Moved { panel, bounds } => {
            json!({ "effect": "moved", "panel": panel, "bounds": bounds })
        }
        GestureEffect::Resized { panel, bounds } => {
            json!({ "effect": "resized", "panel": panel, "bounds": bounds })
        }
        GestureEffect::Finished {
            panel,
            bounds,
            changed,
        } => json!({
            "effect": "finished",
            "panel": panel,
            "bounds": bounds,
            "changed": changed,
            "listen": false,
        }),
        GestureEffect::Canceled { panel, reason } => json!({
            "effect": "canceled",
            "panel": panel,
            "reason": format!("{reason:?}"),
            "listen": false,
        }),
        GestureEffect::Noop(reason) => json!({ "effect": "noop", "reason": format!("{reason:?}") }),
    }
}

fn effect_json(effect: &GestureEffect) -> String {
    effect_value(effect).to_string()
}

fn key_json(outcome: &KeyOutcome) -> String {
    let value = match outcome {
        KeyOutcome::Moved(bounds) => json!({ "handled": true, "action": "move", "bounds": bounds }),
        KeyOutcome::Resized(bounds) => {
            json!({ "handled": true, "action": "resize", "bounds": bounds })
        }
        KeyOutcome::Toggled(outcome) => json!({
            "handled": true,
            "action": "toggle",
            "applied": matches!(outcome, AutoFitOutcome::Applied { .. }),
        }),
        KeyOutcome::Closed => json!({ "handled": true, "action": "close" }),
        KeyOutcome::Gesture(effect) => json!({
            "handled": true,
            "action": "cancelGesture",
            "effect": effect_value(effect),
        }),
        KeyOutcome::Unhandled => json!({ "handled": false, "action": "none" }),
    };
    value.to_string()
}

// ─── DOM structure → regions ─────────────────────────────────────────────

/// Region for one element from its marker attributes.
fn region_for(no_drag: bool, handle: Option<&str>) -> Region {
    if no_drag {
        return Region::NonDrag;
    }
    match handle.and_then(|h| h.parse().ok()) {
        Some(h) => Region::Handle(h),
        None => Region::Surface,
    }
}

/// Walk from the event target up to the panel root, innermost first.
fn target_from_dom(target: &Element) -> PointerTarget {
    let mut path = Vec::new();
    let mut current = Some(target.clone());
    while let Some(el) = current {
        let handle = el.get_attribute(HANDLE_ATTR);
        path.push(region_for(el.has_attribute(NO_DRAG_ATTR), handle.as_deref()));
        if el.has_attribute(PANEL_ROOT_ATTR) {
            break;
        }
        current = el.parent_element();
    }
    PointerTarget::from_path(path)
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("panel workspace panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
            log::debug!("panic hook installed");
        });
    }
}
