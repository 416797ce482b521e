//! Integration tests: request/response flow and content-driven auto-fit.

use pretty_assertions::assert_eq;
use pw_core::payload::PreviewBlock;
use pw_core::{MessageKind, PanelKind, Point, ResultsTab, ServicePayload, Size};
use pw_editor::{
    AutoFitOutcome, RequestError, Resolution, ServiceFailure, ServiceRequest, Workspace,
};

fn preview(columns: usize, rows: usize) -> PreviewBlock {
    PreviewBlock {
        columns: (0..columns).map(|c| format!("col_{c}")).collect(),
        rows: (0..rows)
            .map(|r| (0..columns).map(|c| format!("{r}:{c}")).collect())
            .collect(),
        total_rows: Some(rows as u64 * 10),
        offset: Some(0),
    }
}

#[test]
fn preview_grows_dataset_panel() {
    let mut ws = Workspace::default();
    let id = ws.open_panel(PanelKind::Dataset, Point::ORIGIN, true).unwrap();
    let ticket = ws
        .begin_request(
            id,
            "preview",
            ServiceRequest::FetchPreview {
                dataset_id: "ds-7".into(),
                offset: 0,
                limit: 50,
            },
        )
        .unwrap();
    let resolution = ws
        .resolve_request(ticket.id, Ok(ServicePayload::Preview(preview(8, 30))), 0.0)
        .unwrap();
    assert_eq!(
        resolution,
        Resolution::Merged {
            panel: id,
            fit: AutoFitOutcome::Applied {
                from: Size::new(640.0, 420.0),
                to: Size::new(1000.0, 476.0),
            }
        }
    );
}

#[test]
fn tab_switch_within_threshold_keeps_size() {
    let mut ws = Workspace::default();
    let id = ws
        .open_panel(PanelKind::ModelResults, Point::ORIGIN, true)
        .unwrap();
    let payload: ServicePayload =
        serde_json::from_str(include_str!("fixtures/model_run.json")).unwrap();
    let ticket = ws
        .begin_request(
            id,
            "train",
            ServiceRequest::TrainModel {
                dataset_id: "ds-7".into(),
                target: "churned".into(),
                problem_type: None,
            },
        )
        .unwrap();
    ws.resolve_request(ticket.id, Ok(payload), 0.0).unwrap();
    assert_eq!(ws.panel(id).unwrap().size, Size::new(720.0, 560.0));

    // Twelve visible prediction rows want 576 high: under the jitter threshold.
    let outcome = ws.switch_tab(id, ResultsTab::Predictions);
    assert_eq!(outcome, Some(AutoFitOutcome::WithinThreshold));
    assert_eq!(ws.panel(id).unwrap().size, Size::new(720.0, 560.0));
}

#[test]
fn manual_resize_is_overwritten_by_late_content() {
    let mut ws = Workspace::default();
    let id = ws.open_panel(PanelKind::Dataset, Point::ORIGIN, true).unwrap();
    ws.handle_key(id, "ArrowDown", true, true);
    ws.handle_key(id, "ArrowDown", true, true);
    assert_eq!(ws.panel(id).unwrap().size, Size::new(640.0, 520.0));

    let ticket = ws
        .begin_request(
            id,
            "preview",
            ServiceRequest::FetchPreview {
                dataset_id: "ds-7".into(),
                offset: 0,
                limit: 50,
            },
        )
        .unwrap();
    ws.resolve_request(ticket.id, Ok(ServicePayload::Preview(preview(2, 3))), 0.0)
        .unwrap();
    assert_eq!(ws.panel(id).unwrap().size, Size::new(640.0, 420.0));
}

#[test]
fn failure_message_lifecycle() {
    let mut ws = Workspace::default();
    let id = ws
        .open_panel(PanelKind::GraphBuilder, Point::new(40.0, 40.0), true)
        .unwrap();
    let before = ws.panel(id).unwrap().bounds();
    let request = ServiceRequest::GenerateGraph {
        dataset_id: "ds-7".into(),
        chart_type: "histogram".into(),
        x: "age".into(),
        y: None,
    };
    let ticket = ws.begin_request(id, "generate", request.clone()).unwrap();
    assert!(matches!(
        ws.begin_request(id, "generate", request),
        Err(RequestError::AlreadyPending { .. })
    ));

    let failure = ServiceFailure {
        message: "Column 'age' is not numeric".into(),
    };
    ws.resolve_request(ticket.id, Err(failure), 10_000.0).unwrap();
    let panel = ws.panel(id).unwrap();
    assert_eq!(panel.bounds(), before);
    let message = panel.feedback.message.clone().unwrap();
    assert_eq!(message.kind, MessageKind::Service);
    assert_eq!(message.dismiss_at_ms, Some(15_000.0));

    assert!(ws.tick(14_999.0).is_empty());
    assert_eq!(ws.tick(15_000.0), vec![id]);
    assert!(ws.panel(id).unwrap().feedback.message.is_none());
}

#[test]
fn request_json_shape() {
    let request: ServiceRequest = serde_json::from_str(
        r#"{"type":"fetch_visualization","run_id":"run-42","kind":"confusion_matrix"}"#,
    )
    .unwrap();
    assert_eq!(
        request,
        ServiceRequest::FetchVisualization {
            run_id: "run-42".into(),
            kind: pw_core::payload::VisualKind::ConfusionMatrix,
        }
    );
}

#[test]
fn closing_a_panel_abandons_its_requests() {
    let mut ws = Workspace::default();
    let closed = ws.open_panel(PanelKind::Dataset, Point::ORIGIN, true).unwrap();
    let kept = ws.open_panel(PanelKind::GraphBuilder, Point::ORIGIN, true).unwrap();
    let fetch = |id: &str| ServiceRequest::FetchMetadata {
        dataset_id: id.into(),
    };
    let orphan = ws.begin_request(closed, "metadata", fetch("ds-1")).unwrap();
    ws.begin_request(closed, "preview", fetch("ds-1")).unwrap();
    let live = ws.begin_request(kept, "metadata", fetch("ds-2")).unwrap();
    assert_eq!(ws.requests().len(), 3);

    ws.close(closed);
    assert_eq!(ws.requests().len(), 1);
    assert!(ws.requests().request(live.id).is_some());
    // A late answer for the closed panel is dropped without error.
    assert_eq!(
        ws.resolve_request(orphan.id, Ok(ServicePayload::Preview(preview(2, 2))), 0.0),
        Ok(Resolution::Dropped)
    );

    ws.clear();
    assert!(ws.requests().is_empty());
    assert_eq!(
        ws.resolve_request(live.id, Err(ServiceFailure { message: "gone".into() }), 0.0),
        Ok(Resolution::Dropped)
    );
}
