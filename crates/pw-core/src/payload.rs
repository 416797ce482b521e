//! Typed payloads carried by panels and by analytics-service responses.
//!
//! The shapes mirror what the analytics service returns (preview blocks,
//! cleaning reports, rendered graphs, model runs, model visuals), reduced to
//! the fields the workspace renders or sizes itself from.

use crate::geometry::Size;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A page of dataset rows. Cells are pre-rendered display strings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PreviewBlock {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_rows: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
}

/// The cleaning report attached to a dataset.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CleaningReport {
    pub duplicates_removed: u64,
    pub rows_dropped_for_missing: u64,
    /// Column name → inferred dtype.
    #[serde(default)]
    pub dtype_inference: BTreeMap<String, String>,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl CleaningReport {
    /// Number of lines the report section renders.
    pub fn line_count(&self) -> usize {
        2 + self.dtype_inference.len() + self.notes.len()
    }
}

/// A server-rendered chart.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphImage {
    pub chart_type: String,
    pub image_base64: String,
    /// Natural pixel size, known once the host has decoded the image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natural: Option<Size>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coefficient {
    pub feature: String,
    pub estimate: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRow {
    pub row_index: u64,
    pub prediction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<String>,
}

/// A completed model training run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelRun {
    pub run_id: String,
    pub target: String,
    pub problem_type: String,
    pub metric_primary: String,
    pub metric_value: f64,
    #[serde(default)]
    pub coefficients: Vec<Coefficient>,
    #[serde(default)]
    pub feature_importance: Vec<FeatureImportance>,
    #[serde(default)]
    pub sample_predictions: Vec<PredictionRow>,
}

/// Which diagnostic a model visualization shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualKind {
    #[default]
    PredVsActual,
    Residuals,
    ConfusionMatrix,
    Roc,
    QqPlot,
    FeatureImportance,
    ResidualsVsFitted,
}

/// Data behind a model visualization.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelVisual {
    pub run_id: String,
    pub kind: VisualKind,
    /// Class labels (confusion matrix axes).
    #[serde(default)]
    pub labels: Vec<String>,
    /// Number of plotted points after sampling.
    #[serde(default)]
    pub sampled: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// One queued data-manipulation step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ManipulationStep {
    EditCell {
        row: u64,
        column: String,
        value: String,
    },
    RenameColumn {
        old: String,
        new: String,
    },
    Round {
        column: String,
        decimals: u32,
    },
    Impute {
        column: String,
        strategy: String,
    },
    DropColumn {
        column: String,
    },
    AddColumn {
        name: String,
    },
}

/// A successful analytics-service response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServicePayload {
    Preview(PreviewBlock),
    Metadata(CleaningReport),
    Graph(GraphImage),
    ModelRun(ModelRun),
    ModelVisual(ModelVisual),
}

impl ServicePayload {
    pub fn name(&self) -> &'static str {
        match self {
            ServicePayload::Preview(_) => "preview",
            ServicePayload::Metadata(_) => "metadata",
            ServicePayload::Graph(_) => "graph",
            ServicePayload::ModelRun(_) => "model_run",
            ServicePayload::ModelVisual(_) => "model_visual",
        }
    }
}
