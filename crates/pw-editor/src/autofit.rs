//! Content-driven auto-fit.
//!
//! On a trigger the controller asks the panel kind's policy for a desired
//! size and writes it through the store when it is far enough from the
//! current size. Content and tab triggers respect the jitter threshold;
//! the expansion toggle always lands on the policy size.

use crate::store::PanelStore;
use log::debug;
use pw_core::{ContentSignals, PanelId, PanelPatch, Size, desired_size};

/// Why auto-fit runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    ExpansionToggled,
    ContentArrived,
    TabSwitched,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AutoFitOutcome {
    Applied { from: Size, to: Size },
    /// The desired size is already within the threshold (or identical).
    WithinThreshold,
    UnknownPanel,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutoFitController {
    threshold: f32,
}

impl Default for AutoFitController {
    fn default() -> Self {
        Self::new(50.0)
    }
}

impl AutoFitController {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Desired size for panel `id` in its current state.
    pub fn desired(&self, store: &PanelStore, id: PanelId) -> Option<Size> {
        let panel = store.get(id)?;
        let signals = ContentSignals::extract(&panel.data);
        Some(desired_size(
            panel.kind(),
            store.policy(panel),
            panel.is_expanded,
            &signals,
        ))
    }

    pub fn apply(&self, store: &mut PanelStore, id: PanelId, trigger: Trigger) -> AutoFitOutcome {
        let (Some(panel), Some(desired)) = (store.get(id), self.desired(store, id)) else {
            return AutoFitOutcome::UnknownPanel;
        };
        let from = panel.size;
        let apply = match trigger {
            Trigger::ExpansionToggled => desired != from,
            Trigger::ContentArrived | Trigger::TabSwitched => {
                from.differs_by_more_than(desired, self.threshold)
            }
        };
        if !apply {
            return AutoFitOutcome::WithinThreshold;
        }
        let Some(stored) = store.update(id, PanelPatch::size(desired)) else {
            return AutoFitOutcome::UnknownPanel;
        };
        let to = stored.size;
        debug!("autofit {id} ({trigger:?}) {from:?} -> {to:?}");
        AutoFitOutcome::Applied { from, to }
    }
}
