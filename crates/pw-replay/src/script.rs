//! Replay scripts: a config plus a list of host events, applied in order.

use log::{debug, info};
use pw_core::{Panel, PanelData, PanelId, PanelKind, Point, ResultsTab, ServicePayload, Size};
use pw_editor::{
    CancelReason, ConfigError, PointerId, PointerTarget, Region, RequestError, ServiceFailure,
    ServiceRequest, StoreError, Workspace, WorkspaceConfig,
};
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("cannot read script: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid script JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("step {step}: {source}")]
    Store { step: usize, source: StoreError },
    #[error("step {step}: {source}")]
    Request { step: usize, source: RequestError },
    #[error("step {step}: no ticket labelled '{label}'")]
    UnknownTicket { step: usize, label: String },
}

#[derive(Debug, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub config: Option<WorkspaceConfig>,
    pub steps: Vec<Step>,
}

/// One host event. Pointer coordinates are screen pixels.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Open {
        id: String,
        kind: PanelKind,
        x: f32,
        y: f32,
        #[serde(default)]
        expanded: bool,
    },
    Close {
        panel: String,
    },
    PointerDown {
        panel: String,
        #[serde(default)]
        pointer: u32,
        x: f32,
        y: f32,
        #[serde(default)]
        path: Vec<Region>,
    },
    PointerMove {
        #[serde(default)]
        pointer: u32,
        x: f32,
        y: f32,
    },
    PointerUp {
        #[serde(default)]
        pointer: u32,
    },
    PointerCancel {
        #[serde(default)]
        lost_capture: bool,
    },
    Key {
        panel: String,
        key: String,
        #[serde(default)]
        shift: bool,
        #[serde(default)]
        alt: bool,
    },
    Toggle {
        panel: String,
    },
    Content {
        panel: String,
        data: PanelData,
    },
    Image {
        panel: String,
        width: f32,
        height: f32,
    },
    Tab {
        panel: String,
        tab: ResultsTab,
    },
    Begin {
        panel: String,
        control: String,
        request: ServiceRequest,
        /// Label later `resolve` steps refer to.
        ticket: String,
    },
    Resolve {
        ticket: String,
        response: ScriptResponse,
        #[serde(default)]
        at: f64,
    },
    Tick {
        at: f64,
    },
    Zoom {
        x: f32,
        y: f32,
        factor: f32,
    },
}

/// `{"ok": <payload>}` or `{"error": "message"}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ScriptResponse {
    Ok { ok: ServicePayload },
    Err { error: String },
}

impl ScriptResponse {
    fn into_response(self) -> Result<ServicePayload, ServiceFailure> {
        match self {
            ScriptResponse::Ok { ok } => Ok(ok),
            ScriptResponse::Err { error } => Err(ServiceFailure { message: error }),
        }
    }
}

impl ReplayScript {
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Run every step against a fresh workspace. `config` overrides the
    /// script's own configuration.
    pub fn run(self, config: Option<WorkspaceConfig>) -> Result<Workspace, ReplayError> {
        let config = config.or(self.config).unwrap_or_default();
        let mut ws = Workspace::new(config)?;
        let mut tickets: HashMap<String, u64> = HashMap::new();

        for (step, event) in self.steps.into_iter().enumerate() {
            debug!("step {step}: {event:?}");
            match event {
                Step::Open {
                    id,
                    kind,
                    x,
                    y,
                    expanded,
                } => {
                    let id = ws
                        .insert(Panel::new(PanelId::intern(&id), kind, Point::new(x, y)))
                        .map_err(|source| ReplayError::Store { step, source })?;
                    if expanded {
                        ws.set_expanded(id, true);
                    }
                }
                Step::Close { panel } => {
                    ws.close(PanelId::intern(&panel));
                }
                Step::PointerDown {
                    panel,
                    pointer,
                    x,
                    y,
                    path,
                } => {
                    let target = if path.is_empty() {
                        PointerTarget::surface()
                    } else {
                        PointerTarget::from_path(path)
                    };
                    let effect = ws.pointer_down(
                        PanelId::intern(&panel),
                        PointerId(pointer),
                        Point::new(x, y),
                        &target,
                    );
                    info!("step {step}: {effect:?}");
                }
                Step::PointerMove { pointer, x, y } => {
                    ws.pointer_move(PointerId(pointer), Point::new(x, y));
                }
                Step::PointerUp { pointer } => {
                    let effect = ws.pointer_up(PointerId(pointer));
                    info!("step {step}: {effect:?}");
                }
                Step::PointerCancel { lost_capture } => {
                    let reason = if lost_capture {
                        CancelReason::LostCapture
                    } else {
                        CancelReason::PointerCancel
                    };
                    ws.pointer_cancel(reason);
                }
                Step::Key {
                    panel,
                    key,
                    shift,
                    alt,
                } => {
                    let outcome = ws.handle_key(PanelId::intern(&panel), &key, shift, alt);
                    info!("step {step}: {key} -> {outcome:?}");
                }
                Step::Toggle { panel } => {
                    ws.toggle_expanded(PanelId::intern(&panel));
                }
                Step::Content { panel, data } => {
                    ws.content_arrived(PanelId::intern(&panel), data);
                }
                Step::Image {
                    panel,
                    width,
                    height,
                } => {
                    ws.image_loaded(PanelId::intern(&panel), Size::new(width, height));
                }
                Step::Tab { panel, tab } => {
                    ws.switch_tab(PanelId::intern(&panel), tab);
                }
                Step::Begin {
                    panel,
                    control,
                    request,
                    ticket,
                } => {
                    let issued = ws
                        .begin_request(PanelId::intern(&panel), &control, request)
                        .map_err(|source| ReplayError::Request { step, source })?;
                    tickets.insert(ticket, issued.id);
                }
                Step::Resolve {
                    ticket,
                    response,
                    at,
                } => {
                    let id = *tickets
                        .get(&ticket)
                        .ok_or(ReplayError::UnknownTicket {
                            step,
                            label: ticket.clone(),
                        })?;
                    let resolution = ws
                        .resolve_request(id, response.into_response(), at)
                        .map_err(|source| ReplayError::Request { step, source })?;
                    info!("step {step}: {ticket} -> {resolution:?}");
                }
                Step::Tick { at } => {
                    ws.tick(at);
                }
                Step::Zoom { x, y, factor } => {
                    ws.zoom_at(Point::new(x, y), factor);
                }
            }
        }
        Ok(ws)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use pw_core::Bounds;

    #[test]
    fn drag_and_resize_script() {
        let script = ReplayScript::from_json(include_str!("../tests/fixtures/drag.json")).unwrap();
        let ws = script.run(None).unwrap();

        let results = ws.panel(PanelId::intern("replay_results")).unwrap();
        assert_eq!(results.bounds(), Bounds::new(-60.0, 140.0, 520.0, 560.0));
        let graph = ws.panel(PanelId::intern("replay_graph")).unwrap();
        assert_eq!(graph.position, Point::new(400.0, 80.0));
        // Dragged last, so on top.
        assert_eq!(ws.panels().last().map(|p| p.id), Some(results.id));
    }

    #[test]
    fn request_script() {
        let script =
            ReplayScript::from_json(include_str!("../tests/fixtures/requests.json")).unwrap();
        let ws = script.run(None).unwrap();

        let graph = ws.panel(PanelId::intern("replay_req_graph")).unwrap();
        assert_eq!(graph.size, Size::new(688.0, 596.0));
        let model = ws.panel(PanelId::intern("replay_req_model")).unwrap();
        let message = model.feedback.message.as_ref().unwrap();
        assert_eq!(message.text, "Target column has a single class");
        assert!(model.feedback.pending.is_empty());
    }

    #[test]
    fn config_override_wins() {
        let script = ReplayScript::from_json(
            r#"{
                "config": { "keyboard_step": 100 },
                "steps": [
                    { "op": "open", "id": "replay_cfg", "kind": "dataset", "x": 0, "y": 0 },
                    { "op": "key", "panel": "replay_cfg", "key": "ArrowRight" }
                ]
            }"#,
        )
        .unwrap();
        let config = WorkspaceConfig {
            keyboard_step: 7.0,
            ..WorkspaceConfig::default()
        };
        let ws = script.run(Some(config)).unwrap();
        assert_eq!(
            ws.panel(PanelId::intern("replay_cfg")).unwrap().position,
            Point::new(7.0, 0.0)
        );
    }

    #[test]
    fn unknown_ticket_reports_step() {
        let script = ReplayScript::from_json(
            r#"{ "steps": [ { "op": "resolve", "ticket": "nope", "response": { "error": "x" } } ] }"#,
        )
        .unwrap();
        let err = script.run(None).unwrap_err();
        assert_eq!(err.to_string(), "step 0: no ticket labelled 'nope'");
    }
}
