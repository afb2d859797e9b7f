//! Risk radar: independent risk flags and a severity score per outcome.

use crate::metrics::{is_low_confidence, RENDER_LIMIT, STALE_AFTER_DAYS};
use crate::model::outcome::{Outcome, OutcomeId, OutcomeStatus};
use chrono::NaiveDate;
use std::fmt::{Display, Formatter};

/// Outcomes older than this earn one extra score point.
pub const SEVERE_AGE_DAYS: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskFlag {
    MissingEvidence,
    NoUpdate,
    Stale(i64),
    LowConfidence(i32),
    NeedsLift,
}

impl Display for RiskFlag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingEvidence => f.write_str("Missing evidence"),
            Self::NoUpdate => f.write_str("No update on file"),
            Self::Stale(days) => write!(f, "Stale {days} days"),
            Self::LowConfidence(confidence) => write!(f, "Low confidence {confidence}%"),
            Self::NeedsLift => f.write_str("Needs Lift status"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskEntry {
    pub outcome_id: OutcomeId,
    pub title: String,
    pub owner: String,
    pub flags: Vec<RiskFlag>,
    pub score: usize,
    pub age_days: Option<i64>,
}

impl RiskEntry {
    pub fn flag_labels(&self) -> Vec<String> {
        self.flags.iter().map(ToString::to_string).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskRadar {
    /// Highest score first, top `RENDER_LIMIT`.
    pub entries: Vec<RiskEntry>,
    pub flagged: usize,
    pub total_flags: usize,
}

pub fn risk_flags(outcome: &Outcome, age_days: Option<i64>) -> Vec<RiskFlag> {
    let mut flags = Vec::new();
    if !outcome.has_evidence() {
        flags.push(RiskFlag::MissingEvidence);
    }
    match age_days {
        None => flags.push(RiskFlag::NoUpdate),
        Some(days) if days > STALE_AFTER_DAYS => flags.push(RiskFlag::Stale(days)),
        Some(_) => {}
    }
    if is_low_confidence(outcome) {
        flags.push(RiskFlag::LowConfidence(outcome.confidence));
    }
    if outcome.status == OutcomeStatus::NeedsLift {
        flags.push(RiskFlag::NeedsLift);
    }
    flags
}

/// `None` for outcomes with no flags.
pub fn risk_entry(outcome: &Outcome, today: NaiveDate) -> Option<RiskEntry> {
    let age_days = outcome.days_since_update(today);
    let flags = risk_flags(outcome, age_days);
    if flags.is_empty() {
        return None;
    }
    let severe = age_days.is_some_and(|days| days > SEVERE_AGE_DAYS);
    Some(RiskEntry {
        outcome_id: outcome.id,
        title: outcome.title.clone(),
        owner: outcome.owner.clone(),
        score: flags.len() + usize::from(severe),
        flags,
        age_days,
    })
}

pub fn build_risk_radar(outcomes: &[Outcome], today: NaiveDate) -> RiskRadar {
    let mut entries: Vec<RiskEntry> = outcomes
        .iter()
        .filter_map(|outcome| risk_entry(outcome, today))
        .collect();
    entries.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| b.age_days.unwrap_or(0).cmp(&a.age_days.unwrap_or(0)))
            .then_with(|| a.title.cmp(&b.title))
    });

    let flagged = entries.len();
    let total_flags = entries.iter().map(|entry| entry.flags.len()).sum();
    entries.truncate(RENDER_LIMIT);
    RiskRadar {
        entries,
        flagged,
        total_flags,
    }
}

#[cfg(test)]
mod tests {
    use super::{build_risk_radar, risk_entry, RiskFlag};
    use crate::metrics::RENDER_LIMIT;
    use crate::model::outcome::{Outcome, OutcomeStatus};
    use chrono::{Duration, NaiveDate};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 9).unwrap()
    }

    fn healthy(title: &str) -> Outcome {
        let mut outcome = Outcome::new(title);
        outcome.confidence = 90;
        outcome.evidence = Some("https://example.com".to_string());
        outcome.last_updated = Some(today() - Duration::days(5));
        outcome
    }

    #[test]
    fn healthy_outcomes_never_appear() {
        let radar = build_risk_radar(&[healthy("a"), healthy("b")], today());
        assert!(radar.entries.is_empty());
        assert_eq!(radar.flagged, 0);
        assert_eq!(radar.total_flags, 0);
    }

    #[test]
    fn needs_lift_example_scores_at_least_three() {
        let mut outcome = healthy("Belonging");
        outcome.status = OutcomeStatus::NeedsLift;
        outcome.confidence = 58;
        outcome.evidence = None;
        outcome.last_updated = Some(today() - Duration::days(45));

        let entry = risk_entry(&outcome, today()).unwrap();
        assert_eq!(
            entry.flag_labels(),
            vec![
                "Missing evidence",
                "Stale 45 days",
                "Low confidence 58%",
                "Needs Lift status"
            ]
        );
        assert!(entry.score >= 3);
        assert_eq!(entry.score, 4);
    }

    #[test]
    fn severe_age_adds_a_point_and_undated_is_flagged() {
        let mut old = healthy("Old");
        old.last_updated = Some(today() - Duration::days(61));
        let entry = risk_entry(&old, today()).unwrap();
        assert_eq!(entry.flags, vec![RiskFlag::Stale(61)]);
        assert_eq!(entry.score, 2);

        let mut undated = healthy("Undated");
        undated.last_updated = None;
        let entry = risk_entry(&undated, today()).unwrap();
        assert_eq!(entry.flags, vec![RiskFlag::NoUpdate]);
        assert_eq!(entry.score, 1);
    }

    #[test]
    fn orders_by_score_then_age_then_title() {
        let mut a = healthy("Bravo");
        a.confidence = 60;
        let mut b = healthy("Alpha");
        b.confidence = 60;
        let mut c = healthy("Charlie");
        c.confidence = 60;
        c.last_updated = Some(today() - Duration::days(20));
        let mut d = healthy("Delta");
        d.evidence = None;
        d.confidence = 50;

        let radar = build_risk_radar(&[a, b, c, d], today());
        let titles: Vec<&str> = radar.entries.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, vec!["Delta", "Charlie", "Alpha", "Bravo"]);
        assert_eq!(radar.flagged, 4);
        assert_eq!(radar.total_flags, 5);
        assert!(radar.entries.iter().all(|entry| !entry.flags.is_empty()));
    }

    #[test]
    fn counters_cover_entries_beyond_the_render_limit() {
        let outcomes: Vec<Outcome> = (0..9)
            .map(|index| {
                let mut outcome = healthy(&format!("Outcome {index}"));
                outcome.evidence = None;
                if index % 3 == 0 {
                    outcome.confidence = 40;
                }
                outcome
            })
            .collect();

        let radar = build_risk_radar(&outcomes, today());
        assert_eq!(radar.entries.len(), RENDER_LIMIT);
        assert_eq!(radar.flagged, 9);
        assert_eq!(radar.total_flags, 12);
    }
}
