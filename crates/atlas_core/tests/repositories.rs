use chrono::NaiveDate;
use outcome_atlas_core::repo::checkin_repo::{CheckInRepository, SqliteCheckInRepository};
use outcome_atlas_core::repo::outcome_repo::{OutcomeRepository, SqliteOutcomeRepository};
use outcome_atlas_core::repo::source_repo::{SourceRepository, SqliteSourceRepository};
use outcome_atlas_core::repo::story_beat_repo::{SqliteStoryBeatRepository, StoryBeatRepository};
use outcome_atlas_core::{
    open_db_in_memory, Audience, CheckIn, EvidenceSource, Momentum, Outcome, RepoError, StoryBeat,
};
use uuid::Uuid;

fn day(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y, m, d)
}

fn outcome(title: &str, date: Option<NaiveDate>) -> Outcome {
    let mut outcome = Outcome::new(title);
    outcome.owner = "Program Ops".to_string();
    outcome.confidence = 80;
    outcome.last_updated = date;
    outcome
}

#[test]
fn outcome_upsert_replaces_by_id_and_normalizes_tags() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteOutcomeRepository::new(&conn);

    let mut retention = outcome("Retention", day(2026, 2, 2));
    retention.tags = vec![" first-gen ".into(), "".into(), "first-gen".into()];
    let stored = repo.upsert_outcome(&retention).unwrap();
    assert_eq!(stored.tags, vec!["first-gen"]);

    retention.confidence = 91;
    repo.upsert_outcome(&retention).unwrap();
    let listed = repo.list_outcomes().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].confidence, 91);
}

#[test]
fn outcomes_list_newest_first_with_undated_last() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteOutcomeRepository::new(&conn);
    repo.upsert_outcome(&outcome("Undated", None)).unwrap();
    repo.upsert_outcome(&outcome("Older", day(2026, 1, 20))).unwrap();
    repo.upsert_outcome(&outcome("Newer", day(2026, 2, 2))).unwrap();

    let titles: Vec<String> = repo
        .list_outcomes()
        .unwrap()
        .into_iter()
        .map(|outcome| outcome.title)
        .collect();
    assert_eq!(titles, vec!["Newer", "Older", "Undated"]);
}

#[test]
fn linked_records_require_existing_outcome() {
    let conn = open_db_in_memory().unwrap();
    let missing = Uuid::new_v4();

    let err = SqliteCheckInRepository::new(&conn)
        .upsert_checkin(&CheckIn::new(missing, 1, Momentum::Up))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == missing));

    let err = SqliteSourceRepository::new(&conn)
        .upsert_source(&EvidenceSource::new(missing, "Warehouse"))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));

    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM outcome_sources;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[test]
fn linked_rows_join_live_outcome_and_cascade_on_delete() {
    let conn = open_db_in_memory().unwrap();
    let outcomes = SqliteOutcomeRepository::new(&conn);
    let mut parent = outcomes
        .upsert_outcome(&outcome("Belonging", day(2026, 1, 29)))
        .unwrap();

    let beat = StoryBeat::new(
        parent.id,
        Audience::Partners,
        "Peer pods lifting belonging",
        NaiveDate::from_ymd_opt(2026, 2, 10).unwrap(),
    );
    SqliteStoryBeatRepository::new(&conn)
        .upsert_story_beat(&beat)
        .unwrap();

    parent.title = "Belonging survey".to_string();
    outcomes.upsert_outcome(&parent).unwrap();

    let beats = SqliteStoryBeatRepository::new(&conn)
        .list_story_beats()
        .unwrap();
    assert_eq!(beats[0].outcome_title.as_deref(), Some("Belonging survey"));
    assert_eq!(beats[0].audience, Audience::Partners);

    conn.execute("DELETE FROM outcomes WHERE id = ?1;", [parent.id.to_string()])
        .unwrap();
    assert!(SqliteStoryBeatRepository::new(&conn)
        .list_story_beats()
        .unwrap()
        .is_empty());
}

#[test]
fn checkins_without_date_are_stored_with_one() {
    let conn = open_db_in_memory().unwrap();
    let parent = SqliteOutcomeRepository::new(&conn)
        .upsert_outcome(&outcome("Grants", day(2026, 1, 20)))
        .unwrap();

    let repo = SqliteCheckInRepository::new(&conn);
    let stored = repo
        .upsert_checkin(&CheckIn::new(parent.id, -2, Momentum::Down))
        .unwrap();
    assert!(stored.update_date.is_some());
    assert_eq!(stored.momentum, Momentum::Down);
    assert_eq!(repo.list_checkins_for_outcome(parent.id).unwrap().len(), 1);
}
