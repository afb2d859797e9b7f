//! Evidence health statistics and the prioritized action queue.

use crate::metrics::{is_low_confidence, is_stale, round_half_up, RENDER_LIMIT};
use crate::model::outcome::{Outcome, OutcomeId};
use chrono::NaiveDate;
use std::cmp::Reverse;
use std::fmt::{Display, Formatter};

/// Kind of remediation an action item asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionTag {
    Evidence,
    Recency,
    Confidence,
}

impl ActionTag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Evidence => "Evidence",
            Self::Recency => "Recency",
            Self::Confidence => "Confidence",
        }
    }

    /// Queue priority; higher is more urgent.
    pub fn priority(self) -> u8 {
        match self {
            Self::Evidence => 3,
            Self::Recency => 2,
            Self::Confidence => 1,
        }
    }
}

impl Display for ActionTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionItem {
    pub outcome_id: OutcomeId,
    pub title: String,
    pub owner: String,
    pub tag: ActionTag,
    pub priority: u8,
}

impl ActionItem {
    fn new(outcome: &Outcome, tag: ActionTag, title: String) -> Self {
        Self {
            outcome_id: outcome.id,
            title,
            owner: outcome.owner.clone(),
            tag,
            priority: tag.priority(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthStats {
    pub total: usize,
    pub evidence_linked: usize,
    /// `round(evidence_linked / max(total, 1) * 100)`, within `0..=100`.
    pub coverage_percent: u32,
    pub stale: usize,
    pub low_confidence: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthReport {
    pub stats: HealthStats,
    /// Top `RENDER_LIMIT` actions; empty means no gaps detected.
    pub queue: Vec<ActionItem>,
}

/// Up to three actions per outcome, one per failing check.
pub fn actions_for(outcome: &Outcome, today: NaiveDate) -> Vec<ActionItem> {
    let mut actions = Vec::new();
    if !outcome.has_evidence() {
        actions.push(ActionItem::new(
            outcome,
            ActionTag::Evidence,
            format!("Add evidence link for \"{}\"", outcome.title),
        ));
    }
    if is_stale(outcome, today) {
        actions.push(ActionItem::new(
            outcome,
            ActionTag::Recency,
            format!("Refresh update for \"{}\"", outcome.title),
        ));
    }
    if is_low_confidence(outcome) {
        actions.push(ActionItem::new(
            outcome,
            ActionTag::Confidence,
            format!("Strengthen proof for \"{}\"", outcome.title),
        ));
    }
    actions
}

/// Highest priority first; ties keep encounter order.
pub fn build_action_queue(outcomes: &[Outcome], today: NaiveDate) -> Vec<ActionItem> {
    let mut queue: Vec<ActionItem> = outcomes
        .iter()
        .flat_map(|outcome| actions_for(outcome, today))
        .collect();
    queue.sort_by_key(|action| Reverse(action.priority));
    queue.truncate(RENDER_LIMIT);
    queue
}

pub fn health_stats(outcomes: &[Outcome], today: NaiveDate) -> HealthStats {
    let total = outcomes.len();
    let evidence_linked = outcomes.iter().filter(|o| o.has_evidence()).count();
    let coverage = round_half_up(evidence_linked as f64 / total.max(1) as f64 * 100.0);

    HealthStats {
        total,
        evidence_linked,
        coverage_percent: coverage.clamp(0.0, 100.0) as u32,
        stale: outcomes.iter().filter(|o| is_stale(o, today)).count(),
        low_confidence: outcomes.iter().filter(|o| is_low_confidence(o)).count(),
    }
}

pub fn build_health_report(outcomes: &[Outcome], today: NaiveDate) -> HealthReport {
    HealthReport {
        stats: health_stats(outcomes, today),
        queue: build_action_queue(outcomes, today),
    }
}

#[cfg(test)]
mod tests {
    use super::{actions_for, build_action_queue, health_stats, ActionTag};
    use crate::model::outcome::Outcome;
    use chrono::{Duration, NaiveDate};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    fn healthy(title: &str) -> Outcome {
        let mut outcome = Outcome::new(title);
        outcome.confidence = 85;
        outcome.evidence = Some("https://example.com/report".to_string());
        outcome.last_updated = Some(today() - Duration::days(3));
        outcome
    }

    #[test]
    fn needs_lift_example_raises_all_three_checks() {
        let mut outcome = healthy("Belonging");
        outcome.confidence = 58;
        outcome.evidence = Some(String::new());
        outcome.last_updated = Some(today() - Duration::days(45));

        let tags: Vec<ActionTag> = actions_for(&outcome, today())
            .into_iter()
            .map(|action| action.tag)
            .collect();
        assert_eq!(
            tags,
            vec![ActionTag::Evidence, ActionTag::Recency, ActionTag::Confidence]
        );
    }

    #[test]
    fn undated_outcomes_are_not_stale() {
        let mut outcome = healthy("Undated");
        outcome.last_updated = None;
        assert!(actions_for(&outcome, today()).is_empty());
        assert_eq!(health_stats(&[outcome], today()).stale, 0);
    }

    #[test]
    fn staleness_boundary_is_exclusive() {
        let mut edge = healthy("Edge");
        edge.last_updated = Some(today() - Duration::days(30));
        assert!(actions_for(&edge, today()).is_empty());
        edge.last_updated = Some(today() - Duration::days(31));
        assert_eq!(actions_for(&edge, today())[0].tag, ActionTag::Recency);
    }

    #[test]
    fn queue_is_priority_ordered_stable_and_capped() {
        let mut outcomes = Vec::new();
        for index in 0..4 {
            let mut outcome = healthy(&format!("low-{index}"));
            outcome.confidence = 50;
            outcomes.push(outcome);
        }
        for index in 0..4 {
            let mut outcome = healthy(&format!("bare-{index}"));
            outcome.evidence = None;
            outcomes.push(outcome);
        }

        let queue = build_action_queue(&outcomes, today());
        assert_eq!(queue.len(), 6);
        let titles: Vec<&str> = queue.iter().map(|action| action.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Add evidence link for \"bare-0\"",
                "Add evidence link for \"bare-1\"",
                "Add evidence link for \"bare-2\"",
                "Add evidence link for \"bare-3\"",
                "Strengthen proof for \"low-0\"",
                "Strengthen proof for \"low-1\"",
            ]
        );
    }

    #[test]
    fn coverage_rounds_and_handles_empty_sets() {
        let empty = health_stats(&[], today());
        assert_eq!(empty.coverage_percent, 0);

        let mut bare = healthy("bare");
        bare.evidence = Some("   ".to_string());
        let stats = health_stats(&[healthy("a"), healthy("b"), bare], today());
        assert_eq!(stats.evidence_linked, 2);
        assert_eq!(stats.coverage_percent, 67);
        assert!(stats.coverage_percent <= 100);
    }
}
