//! Workspace configuration.
//!
//! Loaded from JSON by the host (or the replay tool); every field has a
//! default so an empty object `{}` is a valid configuration.

use pw_core::{PanelKind, Size, SizePolicy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid workspace config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("autofit_threshold must be a non-negative number, got {0}")]
    Threshold(f32),
    #[error("keyboard steps must be positive, got {step} / {large}")]
    KeyboardStep { step: f32, large: f32 },
    #[error("zoom range must satisfy 0 < min_zoom <= max_zoom, got {min}..{max}")]
    ZoomRange { min: f32, max: f32 },
    #[error("policy override for {0} leaves a collapsed or expanded size below the minimum")]
    Policy(PanelKind),
}

/// Partial override of a kind's built-in sizes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyOverride {
    pub min: Option<Size>,
    pub collapsed: Option<Size>,
    pub expanded: Option<Size>,
}

impl PolicyOverride {
    fn apply(&self, base: SizePolicy) -> SizePolicy {
        SizePolicy {
            min: self.min.unwrap_or(base.min),
            collapsed: self.collapsed.unwrap_or(base.collapsed),
            expanded: self.expanded.unwrap_or(base.expanded),
        }
    }
}

/// Tunables for a workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Auto-fit only applies when a dimension changes by more than this.
    pub autofit_threshold: f32,
    /// Arrow-key move/resize step in canvas units.
    pub keyboard_step: f32,
    /// Step used with Shift held.
    pub keyboard_step_large: f32,
    /// Lifetime of auto-dismissing service messages.
    pub message_dismiss_ms: f64,
    pub min_zoom: f32,
    pub max_zoom: f32,
    /// Per-kind size overrides, keyed by kind name.
    pub policies: BTreeMap<PanelKind, PolicyOverride>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            autofit_threshold: 50.0,
            keyboard_step: 10.0,
            keyboard_step_large: 50.0,
            message_dismiss_ms: 5000.0,
            min_zoom: 0.1,
            max_zoom: 4.0,
            policies: BTreeMap::new(),
        }
    }
}

impl WorkspaceConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: WorkspaceConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.autofit_threshold >= 0.0) {
            return Err(ConfigError::Threshold(self.autofit_threshold));
        }
        if !(self.keyboard_step > 0.0 && self.keyboard_step_large > 0.0) {
            return Err(ConfigError::KeyboardStep {
                step: self.keyboard_step,
                large: self.keyboard_step_large,
            });
        }
        if !(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom) {
            return Err(ConfigError::ZoomRange {
                min: self.min_zoom,
                max: self.max_zoom,
            });
        }
        let table = self.policy_table();
        for kind in self.policies.keys() {
            if !table.get(*kind).is_consistent() {
                return Err(ConfigError::Policy(*kind));
            }
        }
        Ok(())
    }

    /// Built-in policies with this config's overrides applied.
    pub fn policy_table(&self) -> PolicyTable {
        let mut table = PolicyTable::default();
        for (kind, over) in &self.policies {
            table.entries[*kind as usize] = over.apply(kind.default_policy());
        }
        table
    }
}

/// Resolved size policy for every panel kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyTable {
    entries: [SizePolicy; PanelKind::ALL.len()],
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self {
            entries: PanelKind::ALL.map(PanelKind::default_policy),
        }
    }
}

impl PolicyTable {
    pub fn get(&self, kind: PanelKind) -> &SizePolicy {
        &self.entries[kind as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_object_is_default() {
        let config = WorkspaceConfig::from_json("{}").unwrap();
        assert_eq!(config, WorkspaceConfig::default());
    }

    #[test]
    fn override_merges_with_builtin() {
        let config = WorkspaceConfig::from_json(
            r#"{
                "autofit_threshold": 24,
                "policies": {
                    "graph-result": { "expanded": { "width": 600, "height": 450 } }
                }
            }"#,
        )
        .unwrap();
        assert_eq!(config.autofit_threshold, 24.0);
        let table = config.policy_table();
        let graph = table.get(PanelKind::GraphResult);
        assert_eq!(graph.expanded, Size::new(600.0, 450.0));
        assert_eq!(graph.min, PanelKind::GraphResult.default_policy().min);
        assert_eq!(
            table.get(PanelKind::GraphBuilder),
            &PanelKind::GraphBuilder.default_policy()
        );
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            WorkspaceConfig::from_json(r#"{"autofit_threshold": -1}"#),
            Err(ConfigError::Threshold(_))
        ));
        assert!(matches!(
            WorkspaceConfig::from_json(r#"{"min_zoom": 2, "max_zoom": 1}"#),
            Err(ConfigError::ZoomRange { .. })
        ));
        assert!(matches!(
            WorkspaceConfig::from_json(
                r#"{"policies": {"dataset": {"min": {"width": 900, "height": 100}}}}"#
            ),
            Err(ConfigError::Policy(PanelKind::Dataset))
        ));
        assert!(matches!(
            WorkspaceConfig::from_json(r#"{"policies": {"spreadsheet": {}}}"#),
            Err(ConfigError::Json(_))
        ));
    }
}
