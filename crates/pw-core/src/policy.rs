//! Per-kind sizing policy.
//!
//! Every panel kind declares three sizes (minimum, collapsed, expanded base)
//! and a desired-size function over structural content signals: row and
//! column counts, visible sections, matrix labels, natural image size. The
//! auto-fit controller and the store both read from here, so each kind's
//! numbers live in exactly one place.

use crate::geometry::Size;
use crate::model::{PanelData, PanelKind, ResultsTab};
use crate::payload::VisualKind;
use serde::{Deserialize, Serialize};

/// Content-driven sizes never exceed this.
pub const MAX_DESIRED: Size = Size::new(1400.0, 1000.0);

/// Width of one rendered table column.
pub const COLUMN_WIDTH: f32 = 120.0;
/// Height of one rendered table or list row.
pub const ROW_HEIGHT: f32 = 28.0;
/// Table rows shown before the body scrolls.
pub const VISIBLE_ROWS: usize = 12;
/// Side length of one confusion-matrix cell.
pub const MATRIX_CELL: f32 = 56.0;
/// Horizontal padding around a rendered image.
pub const IMAGE_PAD_X: f32 = 48.0;
/// Vertical padding (header plus caption) around a rendered image.
pub const IMAGE_PAD_Y: f32 = 96.0;
/// Height of one unfolded sub-section (options, advanced settings, report).
pub const SECTION_HEIGHT: f32 = 160.0;

/// The three reference sizes of a panel kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizePolicy {
    pub min: Size,
    pub collapsed: Size,
    pub expanded: Size,
}

impl SizePolicy {
    pub const fn new(min: Size, collapsed: Size, expanded: Size) -> Self {
        Self {
            min,
            collapsed,
            expanded,
        }
    }

    /// Raise any dimension below the minimum.
    pub fn clamp(&self, size: Size) -> Size {
        // `f32::max` also replaces NaN with the minimum.
        size.max(self.min)
    }

    /// Collapsed and expanded sizes both satisfy the minimum.
    pub fn is_consistent(&self) -> bool {
        self.collapsed.width >= self.min.width
            && self.collapsed.height >= self.min.height
            && self.expanded.width >= self.min.width
            && self.expanded.height >= self.min.height
    }
}

impl PanelKind {
    /// Built-in sizes for this kind.
    pub const fn default_policy(self) -> SizePolicy {
        match self {
            PanelKind::Dataset => SizePolicy::new(
                Size::new(260.0, 110.0),
                Size::new(300.0, 120.0),
                Size::new(640.0, 420.0),
            ),
            PanelKind::GraphBuilder | PanelKind::GraphResult => SizePolicy::new(
                Size::new(280.0, 110.0),
                Size::new(320.0, 140.0),
                Size::new(540.0, 400.0),
            ),
            PanelKind::ModelBuilder => SizePolicy::new(
                Size::new(280.0, 110.0),
                Size::new(300.0, 130.0),
                Size::new(520.0, 560.0),
            ),
            PanelKind::ModelResults => SizePolicy::new(
                Size::new(300.0, 110.0),
                Size::new(320.0, 130.0),
                Size::new(720.0, 560.0),
            ),
            PanelKind::ModelVisualization => SizePolicy::new(
                Size::new(280.0, 110.0),
                Size::new(320.0, 130.0),
                Size::new(560.0, 480.0),
            ),
            PanelKind::DataManipulation => SizePolicy::new(
                Size::new(300.0, 110.0),
                Size::new(320.0, 130.0),
                Size::new(760.0, 560.0),
            ),
            PanelKind::EducationDetail => SizePolicy::new(
                Size::new(280.0, 110.0),
                Size::new(300.0, 120.0),
                Size::new(600.0, 520.0),
            ),
        }
    }
}

// ─── Signals ─────────────────────────────────────────────────────────────

/// Structural facts about a panel's content that drive its desired size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContentSignals {
    pub rows: usize,
    pub columns: usize,
    /// Unfolded optional sections.
    pub sections: usize,
    /// Labels along one axis of a square matrix.
    pub matrix_labels: usize,
    /// Natural pixel size of a loaded image.
    pub image: Option<Size>,
}

impl ContentSignals {
    /// Pull the signals for `data`'s kind out of its payload.
    pub fn extract(data: &PanelData) -> Self {
        let mut s = ContentSignals::default();
        match data {
            PanelData::Dataset(d) => {
                if let Some(p) = &d.preview {
                    s.rows = p.rows.len();
                    s.columns = p.columns.len();
                }
                if d.show_report
                    && let Some(r) = &d.report
                {
                    s.sections = 1;
                    s.rows += r.line_count();
                }
            }
            PanelData::GraphBuilder(d) => {
                s.image = d.image.as_ref().and_then(|img| img.natural);
                s.sections = usize::from(d.show_options);
            }
            PanelData::GraphResult(d) => {
                s.image = d.image.as_ref().and_then(|img| img.natural);
            }
            PanelData::ModelBuilder(d) => {
                s.rows = d.features.len();
                s.sections = usize::from(d.show_advanced) + usize::from(d.last_run.is_some());
            }
            PanelData::ModelResults(d) => {
                if let Some(run) = &d.run {
                    s.rows = match d.tab {
                        ResultsTab::Summary => run.coefficients.len(),
                        ResultsTab::Importance => run.feature_importance.len(),
                        ResultsTab::Predictions => run.sample_predictions.len(),
                    };
                    s.sections = 1;
                }
            }
            PanelData::ModelVisualization(d) => {
                if let Some(v) = &d.visual
                    && v.kind == VisualKind::ConfusionMatrix
                {
                    s.matrix_labels = v.labels.len();
                }
                s.image = d.image;
            }
            PanelData::DataManipulation(d) => {
                if let Some(p) = &d.preview {
                    s.rows = p.rows.len();
                    s.columns = p.columns.len();
                }
                s.rows = s.rows.max(d.steps.len());
            }
            PanelData::EducationDetail(d) => {
                s.sections = d.sections as usize;
            }
        }
        s
    }
}

// ─── Desired size ────────────────────────────────────────────────────────

/// The size `kind` wants given its expansion state and content.
///
/// Collapsed panels always want the collapsed size. Expanded panels want
/// their content size, floored at the expanded base and capped at
/// [`MAX_DESIRED`].
pub fn desired_size(
    kind: PanelKind,
    policy: &SizePolicy,
    is_expanded: bool,
    signals: &ContentSignals,
) -> Size {
    if !is_expanded {
        return policy.collapsed;
    }
    let base = policy.expanded;
    let rows = signals.rows.min(VISIBLE_ROWS) as f32;
    let sections = signals.sections as f32;

    let content = match kind {
        PanelKind::Dataset => Size::new(
            40.0 + signals.columns as f32 * COLUMN_WIDTH,
            140.0 + rows * ROW_HEIGHT + sections * SECTION_HEIGHT,
        ),
        PanelKind::GraphBuilder => match signals.image {
            Some(img) => Size::new(
                img.width + IMAGE_PAD_X,
                img.height + IMAGE_PAD_Y + 120.0 + sections * SECTION_HEIGHT,
            ),
            None => Size::new(base.width, base.height + sections * SECTION_HEIGHT),
        },
        PanelKind::GraphResult => match signals.image {
            Some(img) => Size::new(img.width + IMAGE_PAD_X, img.height + IMAGE_PAD_Y),
            None => base,
        },
        PanelKind::ModelBuilder => Size::new(
            base.width,
            180.0 + rows * 32.0 + sections * SECTION_HEIGHT,
        ),
        PanelKind::ModelResults => Size::new(base.width, 240.0 + rows * ROW_HEIGHT),
        PanelKind::ModelVisualization => {
            if signals.matrix_labels > 0 {
                let side = signals.matrix_labels as f32 * MATRIX_CELL;
                Size::new(160.0 + side, 200.0 + side)
            } else if let Some(img) = signals.image {
                Size::new(img.width + IMAGE_PAD_X, img.height + IMAGE_PAD_Y)
            } else {
                base
            }
        }
        PanelKind::DataManipulation => Size::new(
            360.0 + signals.columns as f32 * COLUMN_WIDTH,
            220.0 + rows * ROW_HEIGHT,
        ),
        PanelKind::EducationDetail => Size::new(base.width, 160.0 + sections * 120.0),
    };

    content.max(base).min(MAX_DESIRED.max(base))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelVisualizationData, PanelData};
    use crate::payload::{GraphImage, ModelVisual, PreviewBlock};
    use pretty_assertions::assert_eq;

    #[test]
    fn builtin_policies_are_consistent() {
        for kind in PanelKind::ALL {
            assert!(kind.default_policy().is_consistent(), "{kind}");
        }
    }

    #[test]
    fn expanded_graph_without_data_uses_base() {
        let kind = PanelKind::GraphBuilder;
        let signals = ContentSignals::extract(&PanelData::empty(kind));
        let size = desired_size(kind, &kind.default_policy(), true, &signals);
        assert_eq!(size, Size::new(540.0, 400.0));
    }

    #[test]
    fn collapsed_ignores_content() {
        let kind = PanelKind::Dataset;
        let signals = ContentSignals {
            rows: 400,
            columns: 30,
            ..Default::default()
        };
        let size = desired_size(kind, &kind.default_policy(), false, &signals);
        assert_eq!(size, kind.default_policy().collapsed);
    }

    #[test]
    fn wide_dataset_grows_and_caps() {
        let kind = PanelKind::Dataset;
        let preview = PreviewBlock {
            columns: (0..8).map(|i| format!("c{i}")).collect(),
            rows: vec![vec![String::new(); 8]; 40],
            ..Default::default()
        };
        let data = PanelData::Dataset(crate::model::DatasetData {
            preview: Some(preview),
            ..Default::default()
        });
        let signals = ContentSignals::extract(&data);
        assert_eq!(signals.rows, 40);
        let size = desired_size(kind, &kind.default_policy(), true, &signals);
        // 40 + 8 × 120 = 1000 wide; rows capped at 12 → 140 + 336 = 476 tall.
        assert_eq!(size, Size::new(1000.0, 476.0));

        let huge = ContentSignals {
            columns: 200,
            ..signals
        };
        let size = desired_size(kind, &kind.default_policy(), true, &huge);
        assert_eq!(size.width, MAX_DESIRED.width);
    }

    #[test]
    fn confusion_matrix_sizes_by_labels() {
        let kind = PanelKind::ModelVisualization;
        let data = PanelData::ModelVisualization(ModelVisualizationData {
            visual: Some(ModelVisual {
                kind: VisualKind::ConfusionMatrix,
                labels: (0..10).map(|i| i.to_string()).collect(),
                ..Default::default()
            }),
            ..Default::default()
        });
        let signals = ContentSignals::extract(&data);
        let size = desired_size(kind, &kind.default_policy(), true, &signals);
        assert_eq!(size, Size::new(720.0, 760.0));
    }

    #[test]
    fn loaded_image_adds_padding() {
        let kind = PanelKind::GraphResult;
        let data = PanelData::GraphResult(crate::model::GraphResultData {
            title: "Revenue".into(),
            image: Some(GraphImage {
                natural: Some(Size::new(1000.0, 600.0)),
                ..Default::default()
            }),
        });
        let signals = ContentSignals::extract(&data);
        let size = desired_size(kind, &kind.default_policy(), true, &signals);
        assert_eq!(size, Size::new(1048.0, 696.0));
    }
}
