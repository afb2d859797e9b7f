//! Story beat repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Writes require the parent outcome to exist.
//! - Lists are ordered by schedule: `scheduled_date ASC, created_at ASC`.

use crate::model::story_beat::{Audience, StoryBeat};
use crate::repo::outcome_repo::{parse_uuid, require_outcome, RepoError, RepoResult, LIST_LIMIT};
use chrono::Local;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const STORY_BEAT_SELECT_SQL: &str = "SELECT
    s.id,
    s.outcome_id,
    s.audience,
    s.headline,
    s.proof_point,
    s.next_move,
    s.scheduled_date,
    s.owner,
    s.created_at,
    o.title AS outcome_title,
    o.owner AS outcome_owner
FROM outcome_storybeats s
LEFT JOIN outcomes o ON o.id = s.outcome_id";

pub trait StoryBeatRepository {
    fn upsert_story_beat(&self, beat: &StoryBeat) -> RepoResult<StoryBeat>;
    fn list_story_beats(&self) -> RepoResult<Vec<StoryBeat>>;
}

pub struct SqliteStoryBeatRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStoryBeatRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn get_story_beat(&self, id: Uuid) -> RepoResult<Option<StoryBeat>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STORY_BEAT_SELECT_SQL} WHERE s.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_story_beat_row(row)?));
        }
        Ok(None)
    }
}

impl StoryBeatRepository for SqliteStoryBeatRepository<'_> {
    fn upsert_story_beat(&self, beat: &StoryBeat) -> RepoResult<StoryBeat> {
        require_outcome(self.conn, beat.outcome_id)?;
        let scheduled_date = beat
            .scheduled_date
            .unwrap_or_else(|| Local::now().date_naive());

        self.conn.execute(
            "INSERT INTO outcome_storybeats (
                id,
                outcome_id,
                audience,
                headline,
                proof_point,
                next_move,
                scheduled_date,
                owner
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT (id) DO UPDATE SET
                outcome_id = excluded.outcome_id,
                audience = excluded.audience,
                headline = excluded.headline,
                proof_point = excluded.proof_point,
                next_move = excluded.next_move,
                scheduled_date = excluded.scheduled_date,
                owner = excluded.owner;",
            params![
                beat.id.to_string(),
                beat.outcome_id.to_string(),
                beat.audience.as_str(),
                beat.headline.as_str(),
                beat.proof_point.as_deref(),
                beat.next_move.as_deref(),
                scheduled_date,
                beat.owner.as_deref(),
            ],
        )?;

        self.get_story_beat(beat.id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("story beat {} missing after upsert", beat.id))
        })
    }

    fn list_story_beats(&self) -> RepoResult<Vec<StoryBeat>> {
        let mut stmt = self.conn.prepare(&format!(
            "{STORY_BEAT_SELECT_SQL}
             ORDER BY s.scheduled_date ASC, s.created_at ASC, s.rowid ASC
             LIMIT ?1;"
        ))?;
        let mut rows = stmt.query([LIST_LIMIT])?;
        let mut beats = Vec::new();
        while let Some(row) = rows.next()? {
            beats.push(parse_story_beat_row(row)?);
        }
        Ok(beats)
    }
}

fn parse_story_beat_row(row: &Row<'_>) -> RepoResult<StoryBeat> {
    Ok(StoryBeat {
        id: parse_uuid(&row.get::<_, String>("id")?, "outcome_storybeats.id")?,
        outcome_id: parse_uuid(
            &row.get::<_, String>("outcome_id")?,
            "outcome_storybeats.outcome_id",
        )?,
        audience: Audience::from(row.get::<_, String>("audience")?),
        headline: row.get("headline")?,
        proof_point: row.get("proof_point")?,
        next_move: row.get("next_move")?,
        scheduled_date: row.get("scheduled_date")?,
        owner: row.get("owner")?,
        created_at: row.get("created_at")?,
        outcome_title: row.get("outcome_title")?,
        outcome_owner: row.get("outcome_owner")?,
    })
}
