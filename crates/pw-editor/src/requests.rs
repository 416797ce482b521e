//! Request/response boundary to the analytics service.
//!
//! The workspace never performs I/O. The host asks for a ticket with
//! [`RequestTracker::begin`], which disables the triggering control, sends
//! the [`ServiceRequest`] however it likes, and hands the answer back to
//! [`RequestTracker::resolve`]. Successful payloads are merged into the
//! panel and auto-fit; failures become an inline message.

use crate::autofit::{AutoFitController, AutoFitOutcome, Trigger};
use crate::store::PanelStore;
use log::{debug, warn};
use pw_core::payload::{ManipulationStep, VisualKind};
use pw_core::{Message, MessageKind, PanelId, PanelKind, PanelPatch, ServicePayload};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// An operation the analytics service can perform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServiceRequest {
    FetchPreview {
        dataset_id: String,
        offset: u64,
        limit: u64,
    },
    FetchMetadata {
        dataset_id: String,
    },
    SubmitManipulation {
        dataset_id: String,
        steps: Vec<ManipulationStep>,
    },
    GenerateGraph {
        dataset_id: String,
        chart_type: String,
        x: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        y: Option<String>,
    },
    TrainModel {
        dataset_id: String,
        target: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        problem_type: Option<String>,
    },
    FetchVisualization {
        run_id: String,
        kind: VisualKind,
    },
}

/// The service rejected a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceFailure {
    pub message: String,
}

pub type ServiceResponse = Result<ServicePayload, ServiceFailure>;

/// Handle for one outstanding request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestTicket {
    pub id: u64,
    pub panel: PanelId,
    pub control: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("no panel with id '{0}'")]
    UnknownPanel(PanelId),
    #[error("control '{control}' on panel '{panel}' already has a request in flight")]
    AlreadyPending { panel: PanelId, control: String },
    #[error("no outstanding request with ticket {0}")]
    UnknownTicket(u64),
    #[error("{kind} panel '{panel}' cannot display a {payload} response")]
    Rejected {
        panel: PanelId,
        kind: PanelKind,
        payload: &'static str,
    },
}

/// What resolving a ticket did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution {
    /// Payload merged; `fit` is the content-arrived auto-fit result.
    Merged { panel: PanelId, fit: AutoFitOutcome },
    /// Failure message stored on the panel.
    Failed { panel: PanelId },
    /// The panel was closed while the request was in flight, or the
    /// ticket was already settled. Nothing was applied.
    Dropped,
}

/// Whether messages on `kind` panels go away on their own.
pub fn auto_dismisses(kind: PanelKind) -> bool {
    matches!(
        kind,
        PanelKind::Dataset
            | PanelKind::GraphBuilder
            | PanelKind::GraphResult
            | PanelKind::DataManipulation
    )
}

#[derive(Debug, Clone)]
struct Outstanding {
    panel: PanelId,
    control: String,
    request: ServiceRequest,
}

/// Tracks requests in flight and applies their responses.
#[derive(Debug)]
pub struct RequestTracker {
    next: u64,
    outstanding: HashMap<u64, Outstanding>,
    dismiss_ms: f64,
}

impl Default for RequestTracker {
    fn default() -> Self {
        Self::new(5000.0)
    }
}

impl RequestTracker {
    pub fn new(dismiss_ms: f64) -> Self {
        Self {
            next: 1,
            outstanding: HashMap::new(),
            dismiss_ms,
        }
    }

    pub fn len(&self) -> usize {
        self.outstanding.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outstanding.is_empty()
    }

    /// The request behind `ticket`, if still outstanding.
    pub fn request(&self, ticket: u64) -> Option<&ServiceRequest> {
        self.outstanding.get(&ticket).map(|o| &o.request)
    }

    /// Build a message for `kind`, timed according to its dismissal rule.
    pub fn message(&self, kind: PanelKind, message: MessageKind, text: String, now_ms: f64) -> Message {
        Message {
            kind: message,
            text,
            dismiss_at_ms: auto_dismisses(kind).then_some(now_ms + self.dismiss_ms),
        }
    }

    /// Disable `control` on `panel` and register the request.
    pub fn begin(
        &mut self,
        store: &mut PanelStore,
        panel: PanelId,
        control: &str,
        request: ServiceRequest,
    ) -> Result<RequestTicket, RequestError> {
        let p = store.get(panel).ok_or(RequestError::UnknownPanel(panel))?;
        if p.feedback.is_pending(control) {
            return Err(RequestError::AlreadyPending {
                panel,
                control: control.to_string(),
            });
        }
        let mut feedback = p.feedback.clone();
        feedback.pending.push(control.to_string());
        // A fresh attempt replaces whatever the last one said.
        feedback.message = None;
        store.update(panel, PanelPatch::feedback(feedback));

        let id = self.next;
        self.next += 1;
        debug!("request {id} from {panel}/{control}: {request:?}");
        self.outstanding.insert(
            id,
            Outstanding {
                panel,
                control: control.to_string(),
                request,
            },
        );
        Ok(RequestTicket {
            id,
            panel,
            control: control.to_string(),
        })
    }

    /// Stop tracking every request issued from `panel`. Returns how many
    /// were dropped.
    pub fn forget_panel(&mut self, panel: PanelId) -> usize {
        let before = self.outstanding.len();
        self.outstanding.retain(|_, o| o.panel != panel);
        before - self.outstanding.len()
    }

    /// Stop tracking all requests.
    pub fn clear(&mut self) {
        self.outstanding.clear();
    }

    /// Apply the service's answer to ticket `ticket`.
    ///
    /// Tickets that were issued but are no longer outstanding resolve to
    /// [`Resolution::Dropped`]; ids never issued are an error.
    pub fn resolve(
        &mut self,
        store: &mut PanelStore,
        autofit: &AutoFitController,
        ticket: u64,
        response: ServiceResponse,
        now_ms: f64,
    ) -> Result<Resolution, RequestError> {
        let Some(Outstanding { panel, control, .. }) = self.outstanding.remove(&ticket) else {
            // Issued but no longer tracked: settled already, or its panel closed.
            if ticket != 0 && ticket < self.next {
                debug!("request {ticket} dropped: no longer outstanding");
                return Ok(Resolution::Dropped);
            }
            return Err(RequestError::UnknownTicket(ticket));
        };
        let Some(p) = store.get(panel) else {
            debug!("request {ticket} dropped: panel {panel} is gone");
            return Ok(Resolution::Dropped);
        };
        let kind = p.kind();
        let mut feedback = p.feedback.clone();
        feedback.pending.retain(|c| *c != control);

        match response {
            Ok(payload) => {
                let name = payload.name();
                let Some(data) = p.data.merged(payload) else {
                    warn!("{kind} panel {panel} got a {name} response; discarding");
                    store.update(panel, PanelPatch::feedback(feedback));
                    return Err(RequestError::Rejected {
                        panel,
                        kind,
                        payload: name,
                    });
                };
                store.update(
                    panel,
                    PanelPatch {
                        data: Some(data),
                        feedback: Some(feedback),
                        ..PanelPatch::default()
                    },
                );
                let fit = autofit.apply(store, panel, Trigger::ContentArrived);
                Ok(Resolution::Merged { panel, fit })
            }
            Err(failure) => {
                debug!("request {ticket} failed: {}", failure.message);
                feedback.message = Some(self.message(
                    kind,
                    MessageKind::Service,
                    failure.message,
                    now_ms,
                ));
                store.update(panel, PanelPatch::feedback(feedback));
                Ok(Resolution::Failed { panel })
            }
        }
    }
}
