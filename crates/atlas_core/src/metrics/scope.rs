//! Outcome lookup scope for linked records.
//!
//! Resolves denormalized title/owner fields in a fixed order: the snapshot
//! stored on the linked record, then the live outcome, then a placeholder.

use crate::model::outcome::{Outcome, OutcomeId, DEFAULT_TITLE, UNASSIGNED_OWNER};
use crate::model::OutcomeLink;
use std::collections::{HashMap, HashSet};

/// Live outcome index plus the ids that passed the current filter.
#[derive(Debug, Clone)]
pub struct OutcomeScope<'a> {
    all: HashMap<OutcomeId, &'a Outcome>,
    visible: HashSet<OutcomeId>,
}

impl<'a> OutcomeScope<'a> {
    pub fn new(all: &'a [Outcome], visible: &[Outcome]) -> Self {
        Self {
            all: all.iter().map(|outcome| (outcome.id, outcome)).collect(),
            visible: visible.iter().map(|outcome| outcome.id).collect(),
        }
    }

    /// Scope in which every known outcome is visible.
    pub fn unfiltered(all: &'a [Outcome]) -> Self {
        Self::new(all, all)
    }

    pub fn live(&self, id: OutcomeId) -> Option<&'a Outcome> {
        self.all.get(&id).copied()
    }

    /// Whether a linked record belongs in filtered views.
    ///
    /// Orphans (outcome absent from the full collection) are always admitted
    /// because no filter can exclude them.
    pub fn admits(&self, id: OutcomeId) -> bool {
        self.visible.contains(&id) || !self.all.contains_key(&id)
    }

    pub fn resolve_title<L: OutcomeLink>(&self, link: &L) -> String {
        if let Some(title) = link.snapshot_title() {
            return title.to_string();
        }
        self.live(link.outcome_id())
            .map(|outcome| outcome.title.trim())
            .filter(|title| !title.is_empty())
            .unwrap_or(DEFAULT_TITLE)
            .to_string()
    }

    pub fn resolve_owner<L: OutcomeLink>(&self, link: &L) -> String {
        if let Some(owner) = link.snapshot_owner() {
            return owner.to_string();
        }
        self.live(link.outcome_id())
            .map(Outcome::owner_label)
            .unwrap_or(UNASSIGNED_OWNER)
            .to_string()
    }
}
