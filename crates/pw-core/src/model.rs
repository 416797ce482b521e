//! Panel data model.
//!
//! A workspace is a flat set of panels on an unbounded canvas. Each panel
//! has a position, a size, an expansion flag, and a typed payload. The
//! payload is a tagged union whose variant *is* the panel kind, so a panel
//! can never carry another kind's data.

use crate::geometry::{Bounds, Point, Size};
use crate::id::PanelId;
use crate::payload::*;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

// ─── Kinds ───────────────────────────────────────────────────────────────

/// The type of a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PanelKind {
    Dataset,
    GraphBuilder,
    GraphResult,
    ModelBuilder,
    ModelResults,
    ModelVisualization,
    DataManipulation,
    EducationDetail,
}

impl PanelKind {
    pub const ALL: [PanelKind; 8] = [
        PanelKind::Dataset,
        PanelKind::GraphBuilder,
        PanelKind::GraphResult,
        PanelKind::ModelBuilder,
        PanelKind::ModelResults,
        PanelKind::ModelVisualization,
        PanelKind::DataManipulation,
        PanelKind::EducationDetail,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PanelKind::Dataset => "dataset",
            PanelKind::GraphBuilder => "graph-builder",
            PanelKind::GraphResult => "graph-result",
            PanelKind::ModelBuilder => "model-builder",
            PanelKind::ModelResults => "model-results",
            PanelKind::ModelVisualization => "model-visualization",
            PanelKind::DataManipulation => "data-manipulation",
            PanelKind::EducationDetail => "education-detail",
        }
    }

    /// Whether a response payload can be merged into this kind's data.
    pub fn accepts(self, payload: &ServicePayload) -> bool {
        matches!(
            (self, payload),
            (PanelKind::Dataset, ServicePayload::Preview(_))
                | (PanelKind::Dataset, ServicePayload::Metadata(_))
                | (PanelKind::DataManipulation, ServicePayload::Preview(_))
                | (PanelKind::GraphBuilder, ServicePayload::Graph(_))
                | (PanelKind::GraphResult, ServicePayload::Graph(_))
                | (PanelKind::ModelBuilder, ServicePayload::ModelRun(_))
                | (PanelKind::ModelResults, ServicePayload::ModelRun(_))
                | (PanelKind::ModelVisualization, ServicePayload::ModelVisual(_))
        )
    }
}

impl fmt::Display for PanelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PanelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PanelKind::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| format!("unknown panel kind '{s}'"))
    }
}

// ─── Payloads ────────────────────────────────────────────────────────────

/// Tab shown by a model results panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultsTab {
    #[default]
    Summary,
    Importance,
    Predictions,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DatasetData {
    pub dataset_id: Option<u64>,
    pub name: String,
    pub preview: Option<PreviewBlock>,
    pub report: Option<CleaningReport>,
    /// The cleaning report section is unfolded.
    pub show_report: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphBuilderData {
    pub dataset_id: Option<u64>,
    pub chart_type: Option<String>,
    pub x_column: Option<String>,
    pub y_column: Option<String>,
    pub image: Option<GraphImage>,
    /// The styling options section is unfolded.
    pub show_options: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphResultData {
    pub title: String,
    pub image: Option<GraphImage>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelBuilderData {
    pub dataset_id: Option<u64>,
    pub target: Option<String>,
    pub features: Vec<String>,
    pub show_advanced: bool,
    pub last_run: Option<ModelRun>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelResultsData {
    pub run: Option<ModelRun>,
    pub tab: ResultsTab,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelVisualizationData {
    pub run_id: Option<String>,
    pub visual_kind: VisualKind,
    pub visual: Option<ModelVisual>,
    /// Natural pixel size of the rendered chart, once known.
    pub image: Option<Size>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DataManipulationData {
    pub dataset_id: Option<u64>,
    pub steps: Vec<ManipulationStep>,
    pub preview: Option<PreviewBlock>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EducationDetailData {
    pub topic: String,
    /// Number of visible content sections.
    pub sections: u32,
}

/// Kind-specific panel payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PanelData {
    Dataset(DatasetData),
    GraphBuilder(GraphBuilderData),
    GraphResult(GraphResultData),
    ModelBuilder(ModelBuilderData),
    ModelResults(ModelResultsData),
    ModelVisualization(ModelVisualizationData),
    DataManipulation(DataManipulationData),
    EducationDetail(EducationDetailData),
}

impl PanelData {
    /// An empty payload for `kind`.
    pub fn empty(kind: PanelKind) -> Self {
        match kind {
            PanelKind::Dataset => PanelData::Dataset(Default::default()),
            PanelKind::GraphBuilder => PanelData::GraphBuilder(Default::default()),
            PanelKind::GraphResult => PanelData::GraphResult(Default::default()),
            PanelKind::ModelBuilder => PanelData::ModelBuilder(Default::default()),
            PanelKind::ModelResults => PanelData::ModelResults(Default::default()),
            PanelKind::ModelVisualization => PanelData::ModelVisualization(Default::default()),
            PanelKind::DataManipulation => PanelData::DataManipulation(Default::default()),
            PanelKind::EducationDetail => PanelData::EducationDetail(Default::default()),
        }
    }

    pub fn kind(&self) -> PanelKind {
        match self {
            PanelData::Dataset(_) => PanelKind::Dataset,
            PanelData::GraphBuilder(_) => PanelKind::GraphBuilder,
            PanelData::GraphResult(_) => PanelKind::GraphResult,
            PanelData::ModelBuilder(_) => PanelKind::ModelBuilder,
            PanelData::ModelResults(_) => PanelKind::ModelResults,
            PanelData::ModelVisualization(_) => PanelKind::ModelVisualization,
            PanelData::DataManipulation(_) => PanelKind::DataManipulation,
            PanelData::EducationDetail(_) => PanelKind::EducationDetail,
        }
    }

    /// Return a copy with `payload` merged in, or `None` if this kind
    /// does not accept that payload.
    pub fn merged(&self, payload: ServicePayload) -> Option<PanelData> {
        let mut next = self.clone();
        match (&mut next, payload) {
            (PanelData::Dataset(d), ServicePayload::Preview(p)) => d.preview = Some(p),
            (PanelData::Dataset(d), ServicePayload::Metadata(r)) => d.report = Some(r),
            (PanelData::DataManipulation(d), ServicePayload::Preview(p)) => {
                // Server has applied the queued steps.
                d.steps.clear();
                d.preview = Some(p);
            }
            (PanelData::GraphBuilder(d), ServicePayload::Graph(g)) => {
                d.chart_type = Some(g.chart_type.clone());
                d.image = Some(g);
            }
            (PanelData::GraphResult(d), ServicePayload::Graph(g)) => d.image = Some(g),
            (PanelData::ModelBuilder(d), ServicePayload::ModelRun(r)) => d.last_run = Some(r),
            (PanelData::ModelResults(d), ServicePayload::ModelRun(r)) => d.run = Some(r),
            (PanelData::ModelVisualization(d), ServicePayload::ModelVisual(v)) => {
                d.run_id = Some(v.run_id.clone());
                d.visual_kind = v.kind;
                d.visual = Some(v);
            }
            _ => return None,
        }
        Some(next)
    }

    /// Record the natural pixel size of the panel's rendered image.
    /// Returns `false` when the panel has no image to measure.
    pub fn set_image_size(&mut self, natural: Size) -> bool {
        match self {
            PanelData::GraphBuilder(GraphBuilderData {
                image: Some(img), ..
            })
            | PanelData::GraphResult(GraphResultData {
                image: Some(img), ..
            }) => {
                img.natural = Some(natural);
                true
            }
            PanelData::ModelVisualization(d) => {
                d.image = Some(natural);
                true
            }
            _ => false,
        }
    }
}

// ─── Feedback ────────────────────────────────────────────────────────────

/// Where an inline message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// The user invoked an operation without what it needs.
    Validation,
    /// The analytics service rejected a request.
    Service,
}

/// A human-readable message shown inline on a panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
    /// Host clock time (ms) after which the message disappears; `None` = manual.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dismiss_at_ms: Option<f64>,
}

/// Request state and messages attached to a panel.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Feedback {
    /// Controls disabled while their request is outstanding.
    pub pending: SmallVec<[String; 2]>,
    pub message: Option<Message>,
}

impl Feedback {
    pub fn is_pending(&self, control: &str) -> bool {
        self.pending.iter().any(|c| c == control)
    }
}

// ─── Panel ───────────────────────────────────────────────────────────────

/// A rectangular, independently positioned and sized workspace region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub id: PanelId,
    pub position: Point,
    pub size: Size,
    pub is_expanded: bool,
    pub z_index: u32,
    pub data: PanelData,
    #[serde(default)]
    pub feedback: Feedback,
}

impl Panel {
    /// A panel with an empty payload. Size is normalised when stored.
    pub fn new(id: PanelId, kind: PanelKind, position: Point) -> Self {
        Self::with_data(id, PanelData::empty(kind), position)
    }

    pub fn with_data(id: PanelId, data: PanelData, position: Point) -> Self {
        Self {
            id,
            position,
            size: Size::default(),
            is_expanded: false,
            z_index: 0,
            data,
            feedback: Feedback::default(),
        }
    }

    pub fn kind(&self) -> PanelKind {
        self.data.kind()
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_parts(self.position, self.size)
    }
}

/// A partial update shallow-merged into a panel by the store.
/// `None` fields are left untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanelPatch {
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub is_expanded: Option<bool>,
    pub z_index: Option<u32>,
    pub data: Option<PanelData>,
    pub feedback: Option<Feedback>,
}

impl PanelPatch {
    pub fn position(position: Point) -> Self {
        Self {
            position: Some(position),
            ..Self::default()
        }
    }

    pub fn size(size: Size) -> Self {
        Self {
            size: Some(size),
            ..Self::default()
        }
    }

    pub fn bounds(bounds: Bounds) -> Self {
        Self {
            position: Some(bounds.position()),
            size: Some(bounds.size()),
            ..Self::default()
        }
    }

    pub fn data(data: PanelData) -> Self {
        Self {
            data: Some(data),
            ..Self::default()
        }
    }

    pub fn feedback(feedback: Feedback) -> Self {
        Self {
            feedback: Some(feedback),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
