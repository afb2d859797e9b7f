//! In-memory dashboard state.
//!
//! # Responsibility
//! - Hold the four record collections the dashboard derives from.
//! - Apply local mutations (new outcomes, check-ins, story beats, sources)
//!   before any persistence or sync happens.
//!
//! # Invariants
//! - Linked records are only accepted for outcomes present in the state.
//! - Accepted linked records carry a title/owner snapshot of their outcome.
//! - Newest records are kept first, matching display order.

use crate::metrics::filter::OutcomeFilter;
use crate::metrics::{build_dashboard, Dashboard};
use crate::model::checkin::CheckIn;
use crate::model::outcome::{Outcome, OutcomeId};
use crate::model::source::EvidenceSource;
use crate::model::story_beat::StoryBeat;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    OutcomeNotFound(OutcomeId),
}

impl Display for StateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutcomeNotFound(id) => write!(f, "outcome not found: {id}"),
        }
    }
}

impl Error for StateError {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasState {
    pub outcomes: Vec<Outcome>,
    pub checkins: Vec<CheckIn>,
    pub story_beats: Vec<StoryBeat>,
    pub sources: Vec<EvidenceSource>,
}

impl AtlasState {
    pub fn outcome(&self, id: OutcomeId) -> Option<&Outcome> {
        self.outcomes.iter().find(|outcome| outcome.id == id)
    }

    /// Replaces the outcome with the same id in place, or prepends it.
    pub fn upsert_outcome(&mut self, outcome: Outcome) {
        match self.outcomes.iter_mut().find(|item| item.id == outcome.id) {
            Some(existing) => *existing = outcome,
            None => self.outcomes.insert(0, outcome),
        }
    }

    /// Records a check-in and moves its outcome's confidence and date.
    ///
    /// Returns the updated outcome.
    pub fn apply_checkin(&mut self, mut checkin: CheckIn) -> Result<Outcome, StateError> {
        let outcome = self
            .outcomes
            .iter_mut()
            .find(|item| item.id == checkin.outcome_id)
            .ok_or(StateError::OutcomeNotFound(checkin.outcome_id))?;

        checkin.outcome_title = Some(outcome.title.clone());
        checkin.outcome_owner = Some(outcome.owner.clone());
        outcome.apply_checkin(&checkin);
        let updated = outcome.clone();

        self.checkins.insert(0, checkin);
        Ok(updated)
    }

    pub fn add_story_beat(&mut self, mut beat: StoryBeat) -> Result<(), StateError> {
        let outcome = self
            .outcome(beat.outcome_id)
            .ok_or(StateError::OutcomeNotFound(beat.outcome_id))?;
        beat.outcome_title = Some(outcome.title.clone());
        beat.outcome_owner = Some(outcome.owner.clone());
        if beat.owner.is_none() && !outcome.owner.trim().is_empty() {
            beat.owner = Some(outcome.owner.clone());
        }
        self.story_beats.insert(0, beat);
        Ok(())
    }

    pub fn add_source(&mut self, mut source: EvidenceSource) -> Result<(), StateError> {
        let outcome = self
            .outcome(source.outcome_id)
            .ok_or(StateError::OutcomeNotFound(source.outcome_id))?;
        source.outcome_title = Some(outcome.title.clone());
        source.outcome_owner = Some(outcome.owner.clone());
        self.sources.insert(0, source);
        Ok(())
    }

    pub fn dashboard(&self, filter: &OutcomeFilter, today: NaiveDate) -> Dashboard {
        build_dashboard(self, filter, today)
    }
}

#[cfg(test)]
mod tests {
    use super::{AtlasState, StateError};
    use crate::model::checkin::{CheckIn, Momentum};
    use crate::model::outcome::Outcome;
    use crate::model::story_beat::{Audience, StoryBeat};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn state_with(outcome: &Outcome) -> AtlasState {
        AtlasState {
            outcomes: vec![outcome.clone()],
            ..AtlasState::default()
        }
    }

    #[test]
    fn upsert_replaces_or_prepends() {
        let first = Outcome::new("first");
        let mut state = state_with(&first);

        let second = Outcome::new("second");
        state.upsert_outcome(second.clone());
        assert_eq!(state.outcomes[0].id, second.id);

        let mut renamed = first.clone();
        renamed.title = "renamed".to_string();
        state.upsert_outcome(renamed);
        assert_eq!(state.outcomes.len(), 2);
        assert_eq!(state.outcomes[1].title, "renamed");
    }

    #[test]
    fn apply_checkin_snapshots_and_updates_outcome() {
        let mut outcome = Outcome::new("Retention");
        outcome.owner = "Program Ops".to_string();
        outcome.confidence = 98;
        let mut state = state_with(&outcome);

        let mut checkin = CheckIn::new(outcome.id, 4, Momentum::Up);
        checkin.update_date = NaiveDate::from_ymd_opt(2026, 2, 5);
        let updated = state.apply_checkin(checkin).unwrap();

        assert_eq!(updated.confidence, 100);
        assert_eq!(updated.last_updated, NaiveDate::from_ymd_opt(2026, 2, 5));
        assert_eq!(state.outcomes[0], updated);
        assert_eq!(state.checkins[0].outcome_title.as_deref(), Some("Retention"));
        assert_eq!(state.checkins[0].outcome_owner.as_deref(), Some("Program Ops"));
    }

    #[test]
    fn linked_records_require_a_known_outcome() {
        let mut state = AtlasState::default();
        let missing = Uuid::new_v4();

        let err = state
            .apply_checkin(CheckIn::new(missing, 1, Momentum::Up))
            .unwrap_err();
        assert_eq!(err, StateError::OutcomeNotFound(missing));

        let beat = StoryBeat::new(
            missing,
            Audience::Leadership,
            "headline",
            NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
        );
        assert!(state.add_story_beat(beat).is_err());
        assert!(state.checkins.is_empty());
        assert!(state.story_beats.is_empty());
    }
}
