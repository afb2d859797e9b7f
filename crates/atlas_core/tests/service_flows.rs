use chrono::NaiveDate;
use outcome_atlas_core::seed::demo_outcomes;
use outcome_atlas_core::{
    open_db_in_memory, AtlasService, CheckIn, Momentum, Outcome, OutcomeFilter, ServiceError,
};
use uuid::Uuid;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn seeding_twice_does_not_duplicate() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = AtlasService::new(&mut conn);

    let first = service.seed_demo().unwrap();
    let second = service.seed_demo().unwrap();
    assert_eq!(first, second);

    let state = service.load_state().unwrap();
    assert_eq!(state.outcomes.len(), 4);
    assert_eq!(state.checkins.len(), 3);
    assert_eq!(state.story_beats.len(), 3);
    assert!(state.sources.is_empty());
}

#[test]
fn record_checkin_moves_outcome_atomically() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = AtlasService::new(&mut conn);
    service.seed_demo().unwrap();

    let retention = demo_outcomes().remove(0);
    let mut checkin = CheckIn::new(retention.id, 4, Momentum::Up);
    checkin.update_date = Some(day(2026, 2, 9));

    let receipt = service.record_checkin(&checkin).unwrap();
    assert_eq!(receipt.outcome.confidence, 92);
    assert_eq!(receipt.outcome.last_updated, Some(day(2026, 2, 9)));
    assert_eq!(
        receipt.checkin.outcome_title.as_deref(),
        Some(retention.title.as_str())
    );

    let state = service.load_state().unwrap();
    assert_eq!(state.outcome(retention.id).unwrap().confidence, 92);
    assert_eq!(state.checkins.len(), 4);
}

#[test]
fn record_checkin_for_unknown_outcome_writes_nothing() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = AtlasService::new(&mut conn);
    service.seed_demo().unwrap();

    let missing = Uuid::new_v4();
    let err = service
        .record_checkin(&CheckIn::new(missing, 5, Momentum::Up))
        .unwrap_err();
    assert!(matches!(err, ServiceError::OutcomeNotFound(id) if id == missing));
    assert_eq!(service.load_state().unwrap().checkins.len(), 3);
}

#[test]
fn save_outcome_rejects_out_of_range_confidence() {
    let mut conn = open_db_in_memory().unwrap();
    let service = AtlasService::new(&mut conn);

    let mut outcome = Outcome::new("Mentor matches");
    outcome.confidence = 140;
    assert!(matches!(
        service.save_outcome(&outcome),
        Err(ServiceError::Repo(_))
    ));
}

#[test]
fn dashboard_and_export_read_the_store() {
    let mut conn = open_db_in_memory().unwrap();
    let mut service = AtlasService::new(&mut conn);
    service.seed_demo().unwrap();

    let filter = OutcomeFilter::default().with_category("Community");
    let dashboard = service.dashboard(&filter, day(2026, 2, 9)).unwrap();
    assert_eq!(dashboard.visible.len(), 1);
    assert_eq!(dashboard.pulse.needs_lift, 1);
    assert_eq!(dashboard.momentum.signals[0].net_delta, 2);

    let exported: Vec<Outcome> = serde_json::from_str(&service.export_json().unwrap()).unwrap();
    assert_eq!(exported.len(), 4);
    assert_eq!(exported[0].title, "Scholar retention up 12% year-over-year");
}
