//! Panel store: the single source of truth for panel state.
//!
//! Every change after creation goes through [`PanelStore::update`], which
//! shallow-merges a [`PanelPatch`] and then re-validates the size
//! invariants:
//!
//! - collapsed panels are snapped to their kind's collapsed size;
//! - expanded panels have each dimension raised to the kind's minimum.
//!
//! Out-of-range sizes are clamped silently; `update` never fails.
//! Subscribers are notified after every change that actually altered state.

use crate::config::PolicyTable;
use log::{debug, warn};
use pw_core::{Panel, PanelId, PanelPatch, Size, SizePolicy};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("a panel with id '{0}' already exists")]
    DuplicateId(PanelId),
}

/// Which parts of a panel an update touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Changes {
    pub geometry: bool,
    pub expansion: bool,
    pub stacking: bool,
    pub data: bool,
    pub feedback: bool,
}

impl Changes {
    pub fn any(&self) -> bool {
        self.geometry || self.expansion || self.stacking || self.data || self.feedback
    }
}

/// Notification sent to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreEvent {
    Created(PanelId),
    Updated { id: PanelId, changes: Changes },
    Removed(PanelId),
    Cleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&StoreEvent)>;

/// Canonical mapping from panel id to panel state.
pub struct PanelStore {
    panels: HashMap<PanelId, Panel>,
    /// Creation order; ties in `z_index` fall back to it.
    order: Vec<PanelId>,
    policies: PolicyTable,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
    next_z: u32,
}

impl Default for PanelStore {
    fn default() -> Self {
        Self::new(PolicyTable::default())
    }
}

impl fmt::Debug for PanelStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PanelStore")
            .field("panels", &self.order)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl PanelStore {
    pub fn new(policies: PolicyTable) -> Self {
        Self {
            panels: HashMap::new(),
            order: Vec::new(),
            policies,
            subscribers: Vec::new(),
            next_subscription: 0,
            next_z: 1,
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn get(&self, id: PanelId) -> Option<&Panel> {
        self.panels.get(&id)
    }

    pub fn contains(&self, id: PanelId) -> bool {
        self.panels.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.panels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// All panels, bottom-most first.
    pub fn list(&self) -> Vec<&Panel> {
        let mut panels: Vec<(usize, &Panel)> = self
            .order
            .iter()
            .enumerate()
            .filter_map(|(i, id)| self.panels.get(id).map(|p| (i, p)))
            .collect();
        panels.sort_by_key(|(i, p)| (p.z_index, *i));
        panels.into_iter().map(|(_, p)| p).collect()
    }

    pub fn policy(&self, panel: &Panel) -> &SizePolicy {
        self.policies.get(panel.kind())
    }

    pub fn policies(&self) -> &PolicyTable {
        &self.policies
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Insert a new panel on top of the stack. Its size is normalised
    /// the same way `update` does.
    pub fn create(&mut self, mut panel: Panel) -> Result<PanelId, StoreError> {
        if self.panels.contains_key(&panel.id) {
            return Err(StoreError::DuplicateId(panel.id));
        }
        let policy = *self.policies.get(panel.kind());
        panel.size = normalize_size(&policy, panel.is_expanded, panel.size);
        panel.z_index = self.take_z();
        let id = panel.id;
        debug!("create {} ({}) at {:?}", id, panel.kind(), panel.bounds());
        self.order.push(id);
        self.panels.insert(id, panel);
        self.notify(&StoreEvent::Created(id));
        Ok(id)
    }

    /// Shallow-merge `patch` into panel `id`, then clamp its size.
    /// Returns the stored panel, or `None` for an unknown id.
    pub fn update(&mut self, id: PanelId, patch: PanelPatch) -> Option<&Panel> {
        let panel = self.panels.get_mut(&id)?;
        let policy = *self.policies.get(panel.kind());
        let mut changes = Changes::default();

        if let Some(position) = patch.position
            && position != panel.position
        {
            panel.position = position;
            changes.geometry = true;
        }
        if let Some(expanded) = patch.is_expanded
            && expanded != panel.is_expanded
        {
            panel.is_expanded = expanded;
            changes.expansion = true;
        }
        if let Some(z) = patch.z_index
            && z != panel.z_index
        {
            panel.z_index = z;
            changes.stacking = true;
        }
        if let Some(data) = patch.data {
            if data.kind() != panel.kind() {
                warn!(
                    "ignoring {} payload for {} panel {}",
                    data.kind(),
                    panel.kind(),
                    id
                );
            } else if data != panel.data {
                panel.data = data;
                changes.data = true;
            }
        }
        if let Some(feedback) = patch.feedback
            && feedback != panel.feedback
        {
            panel.feedback = feedback;
            changes.feedback = true;
        }

        let requested = patch.size.unwrap_or(panel.size);
        let size = normalize_size(&policy, panel.is_expanded, requested);
        if size != requested {
            debug!("clamped {id} size {requested:?} -> {size:?}");
        }
        if size != panel.size {
            panel.size = size;
            changes.geometry = true;
        }

        if changes.any() {
            self.notify(&StoreEvent::Updated { id, changes });
        }
        self.panels.get(&id)
    }

    /// Move panel `id` above every other panel.
    pub fn bring_to_front(&mut self, id: PanelId) -> Option<&Panel> {
        let top = self.panels.values().map(|p| p.z_index).max().unwrap_or(0);
        let current = self.panels.get(&id)?.z_index;
        if current == top && self.panels.values().filter(|p| p.z_index == top).count() == 1 {
            return self.panels.get(&id);
        }
        let z = self.take_z();
        self.update(
            id,
            PanelPatch {
                z_index: Some(z),
                ..PanelPatch::default()
            },
        )
    }

    pub fn remove(&mut self, id: PanelId) -> Option<Panel> {
        let panel = self.panels.remove(&id)?;
        self.order.retain(|p| *p != id);
        debug!("remove {id}");
        self.notify(&StoreEvent::Removed(id));
        Some(panel)
    }

    /// Remove every panel.
    pub fn clear(&mut self) {
        self.panels.clear();
        self.order.clear();
        self.notify(&StoreEvent::Cleared);
    }

    // ─── Subscriptions ───────────────────────────────────────────────────

    pub fn subscribe(&mut self, f: impl FnMut(&StoreEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(f)));
        id
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    fn notify(&mut self, event: &StoreEvent) {
        for (_, f) in &mut self.subscribers {
            f(event);
        }
    }

    fn take_z(&mut self) -> u32 {
        let z = self.next_z;
        self.next_z = self.next_z.saturating_add(1);
        z
    }
}

/// Collapsed panels take exactly the collapsed size; expanded panels are
/// raised to the minimum.
fn normalize_size(policy: &SizePolicy, is_expanded: bool, requested: Size) -> Size {
    if is_expanded {
        policy.clamp(requested)
    } else {
        policy.collapsed
    }
}
