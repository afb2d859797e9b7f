//! Review cadence planner: per-outcome due dates and urgency.
//!
//! # Invariants
//! - `cadence_days(o) <= o.status.base_cadence_days()` and is never negative.
//! - An entry is overdue iff `diff_days < 0` or the outcome is undated.

use crate::metrics::{is_low_confidence, RENDER_LIMIT};
use crate::model::outcome::{Outcome, OutcomeId, OutcomeStatus};
use chrono::{Duration, NaiveDate};
use std::fmt::{Display, Formatter};

/// Cadence ceiling when no evidence is linked.
pub const MISSING_EVIDENCE_CADENCE_DAYS: i64 = 7;
/// Cadence ceiling when confidence is low.
pub const LOW_CONFIDENCE_CADENCE_DAYS: i64 = 14;

/// Days between required updates; reductions only ever shorten the base.
pub fn cadence_days(outcome: &Outcome) -> i64 {
    let mut cadence = outcome.status.base_cadence_days();
    if !outcome.has_evidence() {
        cadence = cadence.min(MISSING_EVIDENCE_CADENCE_DAYS);
    }
    if is_low_confidence(outcome) {
        cadence = cadence.min(LOW_CONFIDENCE_CADENCE_DAYS);
    }
    cadence
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Urgency {
    MissingLastUpdate,
    Overdue(i64),
    DueToday,
    DueIn(i64),
}

impl Urgency {
    fn classify(has_date: bool, diff_days: i64) -> Self {
        if !has_date {
            Self::MissingLastUpdate
        } else if diff_days < 0 {
            Self::Overdue(diff_days.abs())
        } else if diff_days == 0 {
            Self::DueToday
        } else {
            Self::DueIn(diff_days)
        }
    }
}

impl Display for Urgency {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingLastUpdate => f.write_str("Missing last update"),
            Self::Overdue(days) => write!(f, "Overdue by {days} days"),
            Self::DueToday => f.write_str("Due today"),
            Self::DueIn(days) => write!(f, "Due in {days} days"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CadenceEntry {
    pub outcome_id: OutcomeId,
    pub title: String,
    pub owner: String,
    pub status: OutcomeStatus,
    /// Zero for undated outcomes.
    pub cadence_days: i64,
    pub due_date: NaiveDate,
    /// `due_date - today`; negative when overdue.
    pub diff_days: i64,
    pub overdue: bool,
    pub urgency: Urgency,
}

impl CadenceEntry {
    pub fn cadence_label(&self) -> String {
        if self.urgency == Urgency::MissingLastUpdate {
            "No last update on file".to_string()
        } else {
            format!("Cadence every {} days", self.cadence_days)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CadencePlan {
    /// Most overdue first, top `RENDER_LIMIT`.
    pub entries: Vec<CadenceEntry>,
    pub total: usize,
    pub overdue: usize,
    /// Entries with `0 <= diff_days <= 7`.
    pub due_within_week: usize,
    /// Entries with `0 <= diff_days <= 30`.
    pub due_within_month: usize,
}

pub fn cadence_entry(outcome: &Outcome, today: NaiveDate) -> CadenceEntry {
    let (cadence, due_date) = match outcome.last_updated {
        Some(date) => {
            let cadence = cadence_days(outcome);
            (cadence, date + Duration::days(cadence))
        }
        None => (0, today),
    };
    let diff_days = due_date.signed_duration_since(today).num_days();
    let has_date = outcome.last_updated.is_some();

    CadenceEntry {
        outcome_id: outcome.id,
        title: outcome.title.clone(),
        owner: outcome.owner.clone(),
        status: outcome.status,
        cadence_days: cadence,
        due_date,
        diff_days,
        overdue: diff_days < 0 || !has_date,
        urgency: Urgency::classify(has_date, diff_days),
    }
}

pub fn build_cadence_plan(outcomes: &[Outcome], today: NaiveDate) -> CadencePlan {
    let mut entries: Vec<CadenceEntry> = outcomes
        .iter()
        .map(|outcome| cadence_entry(outcome, today))
        .collect();
    entries.sort_by_key(|entry| entry.diff_days);

    let within = |limit: i64| {
        entries
            .iter()
            .filter(|entry| (0..=limit).contains(&entry.diff_days))
            .count()
    };
    let due_within_week = within(7);
    let due_within_month = within(30);
    let overdue = entries.iter().filter(|entry| entry.overdue).count();
    let total = entries.len();

    entries.truncate(RENDER_LIMIT);
    CadencePlan {
        entries,
        total,
        overdue,
        due_within_week,
        due_within_month,
    }
}

#[cfg(test)]
mod tests {
    use super::{build_cadence_plan, cadence_days, cadence_entry, Urgency};
    use crate::model::outcome::{Outcome, OutcomeStatus};
    use chrono::{Duration, NaiveDate};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 9).unwrap()
    }

    fn outcome(status: OutcomeStatus, confidence: i32, evidence: bool) -> Outcome {
        let mut outcome = Outcome::new(format!("{status} {confidence}"));
        outcome.status = status;
        outcome.confidence = confidence;
        outcome.evidence = evidence.then(|| "https://example.com".to_string());
        outcome.last_updated = Some(today());
        outcome
    }

    #[test]
    fn cadence_never_exceeds_base_and_is_non_negative() {
        for status in OutcomeStatus::ALL {
            for confidence in [0, 69, 70, 100] {
                for evidence in [true, false] {
                    let days = cadence_days(&outcome(status, confidence, evidence));
                    assert!(days <= status.base_cadence_days());
                    assert!(days >= 0);
                }
            }
        }
    }

    #[test]
    fn reductions_apply_independently() {
        assert_eq!(cadence_days(&outcome(OutcomeStatus::OnTrack, 90, true)), 30);
        assert_eq!(cadence_days(&outcome(OutcomeStatus::Watching, 90, true)), 21);
        assert_eq!(cadence_days(&outcome(OutcomeStatus::OnTrack, 60, true)), 14);
        assert_eq!(cadence_days(&outcome(OutcomeStatus::OnTrack, 90, false)), 7);
        assert_eq!(cadence_days(&outcome(OutcomeStatus::NeedsLift, 60, false)), 7);
    }

    #[test]
    fn overdue_when_due_date_passed() {
        let mut stale = outcome(OutcomeStatus::OnTrack, 90, true);
        stale.last_updated = Some(today() - Duration::days(33));
        let entry = cadence_entry(&stale, today());
        assert_eq!(entry.diff_days, -3);
        assert!(entry.overdue);
        assert_eq!(entry.urgency, Urgency::Overdue(3));
        assert_eq!(entry.urgency.to_string(), "Overdue by 3 days");
        assert_eq!(entry.cadence_label(), "Cadence every 30 days");
    }

    #[test]
    fn overdue_when_undated() {
        let mut undated = outcome(OutcomeStatus::OnTrack, 90, true);
        undated.last_updated = None;
        let entry = cadence_entry(&undated, today());
        assert_eq!(entry.diff_days, 0);
        assert_eq!(entry.cadence_days, 0);
        assert_eq!(entry.due_date, today());
        assert!(entry.overdue);
        assert_eq!(entry.urgency.to_string(), "Missing last update");
        assert_eq!(entry.cadence_label(), "No last update on file");
    }

    #[test]
    fn due_today_and_future_are_not_overdue() {
        let mut due_today = outcome(OutcomeStatus::NeedsLift, 90, true);
        due_today.last_updated = Some(today() - Duration::days(14));
        let entry = cadence_entry(&due_today, today());
        assert!(!entry.overdue);
        assert_eq!(entry.urgency.to_string(), "Due today");

        let fresh = outcome(OutcomeStatus::Watching, 90, true);
        let entry = cadence_entry(&fresh, today());
        assert!(!entry.overdue);
        assert_eq!(entry.urgency.to_string(), "Due in 21 days");
    }

    #[test]
    fn plan_counts_cover_all_entries_and_sort_most_overdue_first() {
        let mut outcomes = Vec::new();
        for offset in 0..8 {
            let mut item = outcome(OutcomeStatus::OnTrack, 90, true);
            item.last_updated = Some(today() - Duration::days(5 + offset * 4));
            outcomes.push(item);
        }

        let plan = build_cadence_plan(&outcomes, today());
        assert_eq!(plan.total, 8);
        assert_eq!(plan.entries.len(), 6);
        assert_eq!(plan.entries[0].diff_days, -3);
        assert_eq!(plan.overdue, 1);
        assert_eq!(plan.due_within_week, 2);
        assert_eq!(plan.due_within_month, 7);
        assert!(plan
            .entries
            .windows(2)
            .all(|pair| pair[0].diff_days <= pair[1].diff_days));
    }
}
