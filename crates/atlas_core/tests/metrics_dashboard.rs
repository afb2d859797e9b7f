use chrono::{Duration, NaiveDate};
use outcome_atlas_core::metrics::health::{actions_for, ActionTag};
use outcome_atlas_core::metrics::momentum::build_momentum;
use outcome_atlas_core::metrics::risk::{risk_entry, RiskFlag};
use outcome_atlas_core::metrics::scope::OutcomeScope;
use outcome_atlas_core::seed::demo_state;
use outcome_atlas_core::{
    AtlasState, CheckIn, Momentum, Outcome, OutcomeFilter, OutcomeStatus, SortKey,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 9).unwrap()
}

fn lagging_outcome() -> Outcome {
    let mut outcome = Outcome::new("Community belonging");
    outcome.status = OutcomeStatus::NeedsLift;
    outcome.confidence = 58;
    outcome.evidence = Some(String::new());
    outcome.last_updated = Some(today() - Duration::days(45));
    outcome
}

#[test]
fn lagging_outcome_raises_every_health_and_risk_flag() {
    let outcome = lagging_outcome();

    let tags: Vec<ActionTag> = actions_for(&outcome, today())
        .into_iter()
        .map(|action| action.tag)
        .collect();
    assert_eq!(
        tags,
        vec![ActionTag::Evidence, ActionTag::Recency, ActionTag::Confidence]
    );

    let entry = risk_entry(&outcome, today()).unwrap();
    assert!(entry.score >= 3);
    assert_eq!(
        entry.flags,
        vec![
            RiskFlag::MissingEvidence,
            RiskFlag::Stale(45),
            RiskFlag::LowConfidence(58),
            RiskFlag::NeedsLift,
        ]
    );
}

#[test]
fn momentum_nets_opposite_checkins() {
    let outcome = lagging_outcome();
    let mut up = CheckIn::new(outcome.id, 4, Momentum::Up);
    up.update_date = Some(today() - Duration::days(3));
    let mut down = CheckIn::new(outcome.id, -3, Momentum::Down);
    down.update_date = Some(today() - Duration::days(10));

    let outcomes = vec![outcome];
    let view = build_momentum(&OutcomeScope::unfiltered(&outcomes), &[up, down], today());
    let signal = &view.signals[0];
    assert_eq!(signal.net_delta, 1);
    assert_eq!(signal.up, 1);
    assert_eq!(signal.down, 1);
    assert_eq!(signal.title, "Community belonging");
}

#[test]
fn filtering_narrows_every_view() {
    let state = demo_state();
    let filter = OutcomeFilter::from_selectors("", "all", "Needs Lift", SortKey::Confidence);
    let dashboard = state.dashboard(&filter, today());

    assert_eq!(dashboard.visible.len(), 1);
    assert_eq!(dashboard.health.stats.total, 1);
    assert_eq!(dashboard.health.stats.coverage_percent, 100);
    assert_eq!(dashboard.health.stats.low_confidence, 1);
    assert_eq!(dashboard.risk.flagged, 1);
    assert_eq!(dashboard.risk.entries[0].score, 2);
    assert_eq!(dashboard.owner_load.owner_count, 1);
    assert_eq!(dashboard.owner_load.entries[0].owner, "Community Team");
    assert_eq!(dashboard.momentum.tracked, 1);
    assert_eq!(dashboard.brief.needs_lift, 1);
}

#[test]
fn empty_state_yields_empty_views() {
    let dashboard = AtlasState::default().dashboard(&OutcomeFilter::default(), today());

    assert!(dashboard.visible.is_empty());
    assert_eq!(dashboard.pulse.average_confidence, 0.0);
    assert_eq!(dashboard.health.stats.coverage_percent, 0);
    assert!(dashboard.health.queue.is_empty());
    assert!(dashboard.cadence.entries.is_empty());
    assert!(dashboard.owner_load.entries.is_empty());
    assert!(dashboard.owner_rhythm.is_empty());
    assert!(dashboard.momentum.signals.is_empty());
    assert!(dashboard.risk.entries.is_empty());
    assert_eq!(dashboard.brief.total, 0);
}
