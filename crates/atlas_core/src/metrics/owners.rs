//! Owner rollups: workload/risk load and check-in/story-beat rhythm.
//!
//! # Invariants
//! - Load order is a total order (risk desc, total desc, name asc), so the
//!   result does not depend on input order.
//! - Rhythm only counts check-ins and story beats of visible outcomes,
//!   attributed to the owner of that outcome.
//! - Story beat gap is `today - scheduled`: `gap > 0` is overdue, which is
//!   the opposite sign of the cadence planner's `diff_days`.

use crate::metrics::{is_low_confidence, is_stale, rounded_average, RENDER_LIMIT};
use crate::model::checkin::CheckIn;
use crate::model::outcome::{Outcome, OutcomeId, OutcomeStatus};
use crate::model::story_beat::StoryBeat;
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// A check-in older than this many days leaves the owner stale.
pub const CHECKIN_STALE_AFTER_DAYS: i64 = 21;
/// Story beats scheduled within this many days ahead count as upcoming.
pub const UPCOMING_BEAT_WINDOW_DAYS: i64 = 14;

/// Any independent risk condition used by the owner load rollup.
pub fn is_at_risk(outcome: &Outcome, today: NaiveDate) -> bool {
    outcome.status == OutcomeStatus::NeedsLift
        || is_low_confidence(outcome)
        || !outcome.has_evidence()
        || is_stale(outcome, today)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerLoadEntry {
    pub owner: String,
    pub total: usize,
    pub at_risk: usize,
    pub average_confidence: i64,
    pub last_update: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerLoadView {
    /// Top `RENDER_LIMIT` owners in load order.
    pub entries: Vec<OwnerLoadEntry>,
    pub owner_count: usize,
    pub owners_at_risk: usize,
}

pub fn compare_owner_load(a: &OwnerLoadEntry, b: &OwnerLoadEntry) -> Ordering {
    b.at_risk
        .cmp(&a.at_risk)
        .then_with(|| b.total.cmp(&a.total))
        .then_with(|| a.owner.cmp(&b.owner))
}

#[derive(Default)]
struct LoadAccumulator {
    total: usize,
    at_risk: usize,
    confidence_sum: i64,
    last_update: Option<NaiveDate>,
}

pub fn owner_load_entries(outcomes: &[Outcome], today: NaiveDate) -> Vec<OwnerLoadEntry> {
    let mut groups: BTreeMap<&str, LoadAccumulator> = BTreeMap::new();
    for outcome in outcomes {
        let acc = groups.entry(outcome.owner_label()).or_default();
        acc.total += 1;
        if is_at_risk(outcome, today) {
            acc.at_risk += 1;
        }
        acc.confidence_sum += i64::from(outcome.confidence);
        acc.last_update = acc.last_update.max(outcome.last_updated);
    }

    let mut entries: Vec<OwnerLoadEntry> = groups
        .into_iter()
        .map(|(owner, acc)| OwnerLoadEntry {
            owner: owner.to_string(),
            total: acc.total,
            at_risk: acc.at_risk,
            average_confidence: rounded_average(acc.confidence_sum, acc.total),
            last_update: acc.last_update,
        })
        .collect();
    entries.sort_by(compare_owner_load);
    entries
}

pub fn build_owner_load(outcomes: &[Outcome], today: NaiveDate) -> OwnerLoadView {
    let mut entries = owner_load_entries(outcomes, today);
    let owner_count = entries.len();
    let owners_at_risk = entries.iter().filter(|entry| entry.at_risk > 0).count();
    entries.truncate(RENDER_LIMIT);
    OwnerLoadView {
        entries,
        owner_count,
        owners_at_risk,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerRhythmEntry {
    pub owner: String,
    pub outcome_count: usize,
    pub last_checkin: Option<NaiveDate>,
    pub days_since_checkin: Option<i64>,
    /// No check-in at all, or the latest is older than 21 days.
    pub stale: bool,
    /// Beats scheduled before today.
    pub overdue_beats: usize,
    /// Beats scheduled from today through the next 14 days.
    pub upcoming_beats: usize,
    /// Earliest beat scheduled today or later.
    pub next_beat: Option<NaiveDate>,
    /// Latest beat scheduled before today.
    pub last_beat: Option<NaiveDate>,
}

impl OwnerRhythmEntry {
    fn empty(owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
            outcome_count: 0,
            last_checkin: None,
            days_since_checkin: None,
            stale: true,
            overdue_beats: 0,
            upcoming_beats: 0,
            next_beat: None,
            last_beat: None,
        }
    }
}

pub fn build_owner_rhythm(
    outcomes: &[Outcome],
    checkins: &[CheckIn],
    story_beats: &[StoryBeat],
    today: NaiveDate,
) -> Vec<OwnerRhythmEntry> {
    let owner_of: HashMap<OutcomeId, &str> = outcomes
        .iter()
        .map(|outcome| (outcome.id, outcome.owner_label()))
        .collect();

    let mut rows: BTreeMap<&str, OwnerRhythmEntry> = BTreeMap::new();
    for outcome in outcomes {
        let owner = outcome.owner_label();
        rows.entry(owner)
            .or_insert_with(|| OwnerRhythmEntry::empty(owner))
            .outcome_count += 1;
    }

    for checkin in checkins {
        let Some(owner) = owner_of.get(&checkin.outcome_id) else {
            continue;
        };
        let Some(row) = rows.get_mut(owner) else {
            continue;
        };
        row.last_checkin = row.last_checkin.max(checkin.effective_date());
    }

    for beat in story_beats {
        let (Some(owner), Some(date), Some(gap)) = (
            owner_of.get(&beat.outcome_id),
            beat.scheduled_date,
            beat.days_gap(today),
        ) else {
            continue;
        };
        let Some(row) = rows.get_mut(owner) else {
            continue;
        };
        if gap > 0 {
            row.overdue_beats += 1;
            row.last_beat = row.last_beat.max(Some(date));
        } else {
            if gap >= -UPCOMING_BEAT_WINDOW_DAYS {
                row.upcoming_beats += 1;
            }
            row.next_beat = Some(row.next_beat.map_or(date, |next| next.min(date)));
        }
    }

    let mut entries: Vec<OwnerRhythmEntry> = rows
        .into_values()
        .map(|mut row| {
            row.days_since_checkin = row
                .last_checkin
                .map(|date| today.signed_duration_since(date).num_days());
            row.stale = row
                .days_since_checkin
                .map_or(true, |days| days > CHECKIN_STALE_AFTER_DAYS);
            row
        })
        .collect();

    entries.sort_by(|a, b| {
        b.overdue_beats
            .cmp(&a.overdue_beats)
            .then_with(|| b.stale.cmp(&a.stale))
            .then_with(|| a.owner.cmp(&b.owner))
    });
    entries
}
