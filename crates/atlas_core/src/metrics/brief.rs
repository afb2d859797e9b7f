//! Pulse statistics and the plain-text stakeholder brief.
//!
//! The rendered brief is a fixed line format consumed by copy/paste and
//! export flows; keep labels and separators stable.

use crate::metrics::rounded_average;
use crate::model::outcome::{Outcome, OutcomeStatus};
use chrono::NaiveDate;
use std::cmp::Reverse;
use std::fmt::{Display, Formatter};

/// Highlights and attention items listed in a brief.
pub const BRIEF_ITEM_LIMIT: usize = 3;

const NO_HIGHLIGHTS: &str = "- No outcomes match the current filters yet.";
const NO_ATTENTION: &str = "- No items flagged as Needs Lift in the current view.";

/// Formats a calendar day as `Feb 9, 2026`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

fn count_status(outcomes: &[Outcome], status: OutcomeStatus) -> usize {
    outcomes.iter().filter(|o| o.status == status).count()
}

fn confidence_sum(outcomes: &[Outcome]) -> i64 {
    outcomes.iter().map(|o| i64::from(o.confidence)).sum()
}

/// Header counters for the visible set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseStats {
    pub total: usize,
    pub on_track: usize,
    pub needs_lift: usize,
    /// Unrounded mean confidence; 0 for an empty set.
    pub average_confidence: f64,
    /// `average_confidence` clamped to `[0, 100]`.
    pub marker_position: f64,
}

pub fn pulse_stats(outcomes: &[Outcome]) -> PulseStats {
    let average = confidence_sum(outcomes) as f64 / outcomes.len().max(1) as f64;
    PulseStats {
        total: outcomes.len(),
        on_track: count_status(outcomes, OutcomeStatus::OnTrack),
        needs_lift: count_status(outcomes, OutcomeStatus::NeedsLift),
        average_confidence: average,
        marker_position: average.clamp(0.0, 100.0),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BriefItem {
    pub title: String,
    pub owner: String,
    pub metric: String,
    pub confidence: i32,
}

impl BriefItem {
    fn from_outcome(outcome: &Outcome) -> Self {
        Self {
            title: outcome.title.clone(),
            owner: outcome.owner.clone(),
            metric: outcome.metric.clone(),
            confidence: outcome.confidence,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Brief {
    pub generated_on: NaiveDate,
    pub total: usize,
    pub on_track: usize,
    pub watching: usize,
    pub needs_lift: usize,
    pub average_confidence: i64,
    pub most_recent: Option<NaiveDate>,
    pub highlights: Vec<BriefItem>,
    pub attention: Vec<BriefItem>,
}

impl Brief {
    pub fn render(&self) -> String {
        let mut lines = vec![
            format!("Outcome Atlas Brief — {}", format_date(self.generated_on)),
            format!(
                "Scope: {} outcomes | On Track {} | Watching {} | Needs Lift {}",
                self.total, self.on_track, self.watching, self.needs_lift
            ),
            format!("Average evidence confidence: {}%", self.average_confidence),
            format!(
                "Most recent evidence: {}",
                self.most_recent
                    .map(format_date)
                    .unwrap_or_else(|| "No dates logged".to_string())
            ),
            String::new(),
            "Highlights".to_string(),
        ];

        if self.highlights.is_empty() {
            lines.push(NO_HIGHLIGHTS.to_string());
        }
        lines.extend(self.highlights.iter().map(|item| {
            format!(
                "- {} ({} · {} · {}% confidence)",
                item.title, item.owner, item.metric, item.confidence
            )
        }));

        lines.push(String::new());
        lines.push("Attention Needed".to_string());
        if self.attention.is_empty() {
            lines.push(NO_ATTENTION.to_string());
        }
        lines.extend(
            self.attention
                .iter()
                .map(|item| format!("- {} ({} · {})", item.title, item.owner, item.metric)),
        );

        lines.join("\n")
    }
}

impl Display for Brief {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render())
    }
}

pub fn compose_brief(outcomes: &[Outcome], today: NaiveDate) -> Brief {
    let mut by_confidence: Vec<&Outcome> = outcomes.iter().collect();
    by_confidence.sort_by_key(|outcome| Reverse(outcome.confidence));

    Brief {
        generated_on: today,
        total: outcomes.len(),
        on_track: count_status(outcomes, OutcomeStatus::OnTrack),
        watching: count_status(outcomes, OutcomeStatus::Watching),
        needs_lift: count_status(outcomes, OutcomeStatus::NeedsLift),
        average_confidence: rounded_average(confidence_sum(outcomes), outcomes.len()),
        most_recent: outcomes.iter().filter_map(|o| o.last_updated).max(),
        highlights: by_confidence
            .into_iter()
            .take(BRIEF_ITEM_LIMIT)
            .map(BriefItem::from_outcome)
            .collect(),
        attention: outcomes
            .iter()
            .filter(|o| o.status == OutcomeStatus::NeedsLift)
            .take(BRIEF_ITEM_LIMIT)
            .map(BriefItem::from_outcome)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::{compose_brief, format_date, pulse_stats};
    use crate::model::outcome::{Outcome, OutcomeStatus};
    use chrono::NaiveDate;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 2, 9).unwrap()
    }

    #[test]
    fn empty_brief_uses_placeholders() {
        let rendered = compose_brief(&[], today()).render();
        let expected = [
            "Outcome Atlas Brief — Feb 9, 2026",
            "Scope: 0 outcomes | On Track 0 | Watching 0 | Needs Lift 0",
            "Average evidence confidence: 0%",
            "Most recent evidence: No dates logged",
            "",
            "Highlights",
            "- No outcomes match the current filters yet.",
            "",
            "Attention Needed",
            "- No items flagged as Needs Lift in the current view.",
        ]
        .join("\n");
        assert_eq!(rendered, expected);
    }

    #[test]
    fn highlights_take_top_three_by_confidence() {
        let mut outcomes = Vec::new();
        for (title, confidence, status) in [
            ("Retention", 88, OutcomeStatus::OnTrack),
            ("Placement", 72, OutcomeStatus::Watching),
            ("Belonging", 58, OutcomeStatus::NeedsLift),
            ("Access", 88, OutcomeStatus::OnTrack),
        ] {
            let mut outcome = Outcome::new(title);
            outcome.confidence = confidence;
            outcome.status = status;
            outcome.owner = "Ops".to_string();
            outcome.metric = "Rate".to_string();
            outcome.last_updated = NaiveDate::from_ymd_opt(2026, 1, confidence as u32 / 4);
            outcomes.push(outcome);
        }

        let brief = compose_brief(&outcomes, today());
        assert_eq!(brief.average_confidence, 77);
        assert_eq!(brief.most_recent, NaiveDate::from_ymd_opt(2026, 1, 22));

        let rendered = brief.render();
        assert!(rendered.contains("Scope: 4 outcomes | On Track 2 | Watching 1 | Needs Lift 1"));
        assert!(rendered.contains("Most recent evidence: Jan 22, 2026"));
        assert!(rendered.contains(
            "Highlights\n- Retention (Ops · Rate · 88% confidence)\n- Access (Ops · Rate · 88% confidence)\n- Placement (Ops · Rate · 72% confidence)\n"
        ));
        assert!(rendered.ends_with("Attention Needed\n- Belonging (Ops · Rate)"));
    }

    #[test]
    fn pulse_marker_is_clamped() {
        let empty = pulse_stats(&[]);
        assert_eq!(empty.total, 0);
        assert_eq!(empty.marker_position, 0.0);

        let mut a = Outcome::new("a");
        a.confidence = 90;
        let mut b = Outcome::new("b");
        b.confidence = 75;
        b.status = OutcomeStatus::NeedsLift;
        let stats = pulse_stats(&[a, b]);
        assert_eq!(stats.on_track, 1);
        assert_eq!(stats.needs_lift, 1);
        assert_eq!(stats.average_confidence, 82.5);
        assert_eq!(stats.marker_position, 82.5);
    }

    #[test]
    fn dates_render_without_padding() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        assert_eq!(format_date(date), "Jan 5, 2026");
    }
}
