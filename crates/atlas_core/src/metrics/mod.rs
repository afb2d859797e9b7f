//! Derived-metrics layer.
//!
//! # Responsibility
//! - Turn outcome/check-in/story-beat collections into dashboard views:
//!   health, cadence, owner rollups, momentum, risk radar and the brief.
//!
//! # Invariants
//! - Every function here is pure: inputs are borrowed, never mutated.
//! - Every function is total: missing data takes a documented default
//!   branch instead of failing.
//! - Day arithmetic uses calendar dates against a caller-supplied `today`.
//! - Rendered lists hold at most `RENDER_LIMIT` entries; summary counts
//!   always cover the full input.

pub mod brief;
pub mod cadence;
pub mod filter;
pub mod health;
pub mod momentum;
pub mod owners;
pub mod risk;
pub mod scope;

use crate::model::outcome::Outcome;
use crate::state::AtlasState;
use brief::{compose_brief, pulse_stats, Brief, PulseStats};
use cadence::{build_cadence_plan, CadencePlan};
use chrono::NaiveDate;
use filter::{filter_outcomes, OutcomeFilter};
use health::{build_health_report, HealthReport};
use momentum::{build_momentum, MomentumView};
use owners::{build_owner_load, build_owner_rhythm, OwnerLoadView, OwnerRhythmEntry};
use risk::{build_risk_radar, RiskRadar};
use scope::OutcomeScope;

/// Maximum entries shown per rendered list.
pub const RENDER_LIMIT: usize = 6;
/// An update older than this many days is stale.
pub const STALE_AFTER_DAYS: i64 = 30;
/// Confidence strictly below this value is low.
pub const LOW_CONFIDENCE_THRESHOLD: i32 = 70;

pub(crate) fn is_low_confidence(outcome: &Outcome) -> bool {
    outcome.confidence < LOW_CONFIDENCE_THRESHOLD
}

/// Stale requires a date: undated outcomes are never stale here.
pub(crate) fn is_stale(outcome: &Outcome, today: NaiveDate) -> bool {
    outcome
        .days_since_update(today)
        .is_some_and(|days| days > STALE_AFTER_DAYS)
}

/// Rounds halves toward positive infinity, so `-2.5` becomes `-2`.
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// `round(sum / max(count, 1))`, halves rounded up.
pub(crate) fn rounded_average(sum: i64, count: usize) -> i64 {
    round_half_up(sum as f64 / count.max(1) as f64) as i64
}

/// Every derived view for one filter selection and one day.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub today: NaiveDate,
    /// Outcomes that passed the filter, in display order.
    pub visible: Vec<Outcome>,
    pub pulse: PulseStats,
    pub health: HealthReport,
    pub cadence: CadencePlan,
    pub owner_load: OwnerLoadView,
    pub owner_rhythm: Vec<OwnerRhythmEntry>,
    pub momentum: MomentumView,
    pub risk: RiskRadar,
    pub brief: Brief,
}

/// Runs the filter, then every derivation pass over the visible set.
pub fn build_dashboard(state: &AtlasState, filter: &OutcomeFilter, today: NaiveDate) -> Dashboard {
    let visible = filter_outcomes(&state.outcomes, filter);
    let scope = OutcomeScope::new(&state.outcomes, &visible);

    Dashboard {
        today,
        pulse: pulse_stats(&visible),
        health: build_health_report(&visible, today),
        cadence: build_cadence_plan(&visible, today),
        owner_load: build_owner_load(&visible, today),
        owner_rhythm: build_owner_rhythm(&visible, &state.checkins, &state.story_beats, today),
        momentum: build_momentum(&scope, &state.checkins, today),
        risk: build_risk_radar(&visible, today),
        brief: compose_brief(&visible, today),
        visible,
    }
}

#[cfg(test)]
mod tests {
    use super::{build_dashboard, round_half_up, rounded_average};
    use crate::metrics::filter::OutcomeFilter;
    use crate::seed::demo_state;
    use chrono::NaiveDate;

    #[test]
    fn rounded_average_guards_empty_input() {
        assert_eq!(rounded_average(0, 0), 0);
        assert_eq!(rounded_average(301, 4), 75);
        assert_eq!(rounded_average(5, 2), 3);
    }

    #[test]
    fn negative_halves_round_up() {
        assert_eq!(rounded_average(-5, 2), -2);
        assert_eq!(rounded_average(-7, 2), -3);
        assert_eq!(round_half_up(-0.5), 0.0);
        assert_eq!(round_half_up(62.5), 63.0);
    }

    #[test]
    fn dashboard_runs_every_pass_over_the_visible_set() {
        let state = demo_state();
        let today = NaiveDate::from_ymd_opt(2026, 2, 9).unwrap();
        let filter = OutcomeFilter::default().with_search("career");

        let dashboard = build_dashboard(&state, &filter, today);
        assert_eq!(dashboard.visible.len(), 1);
        assert_eq!(dashboard.pulse.total, 1);
        assert_eq!(dashboard.cadence.total, 1);
        assert_eq!(dashboard.owner_load.owner_count, 1);
        assert_eq!(dashboard.owner_rhythm.len(), 1);
        assert_eq!(dashboard.momentum.signals.len(), 1);
        assert_eq!(dashboard.momentum.signals[0].net_delta, -3);
        assert!(dashboard.brief.render().contains("Scope: 1 outcomes"));
    }
}
