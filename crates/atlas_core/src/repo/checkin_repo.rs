//! Check-in repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Writes require the parent outcome to exist (`RepoError::NotFound`).
//! - Returned rows carry the outcome title/owner snapshot from a live join.
//! - Stored rows always have an `update_date` (defaults to the write day).

use crate::model::checkin::{CheckIn, Momentum};
use crate::repo::outcome_repo::{parse_uuid, require_outcome, RepoError, RepoResult, LIST_LIMIT};
use chrono::{Local, NaiveDate};
use rusqlite::{params, Connection, Row, Rows};
use uuid::Uuid;

const CHECKIN_SELECT_SQL: &str = "SELECT
    c.id,
    c.outcome_id,
    c.update_date,
    c.confidence_delta,
    c.momentum,
    c.note,
    c.next_step,
    c.created_at,
    o.title AS outcome_title,
    o.owner AS outcome_owner
FROM outcome_checkins c
LEFT JOIN outcomes o ON o.id = c.outcome_id";

pub trait CheckInRepository {
    /// Inserts or replaces a check-in; the parent outcome must exist.
    fn upsert_checkin(&self, checkin: &CheckIn) -> RepoResult<CheckIn>;
    /// Lists up to `LIST_LIMIT` check-ins, newest update first.
    fn list_checkins(&self) -> RepoResult<Vec<CheckIn>>;
    fn list_checkins_for_outcome(&self, outcome_id: Uuid) -> RepoResult<Vec<CheckIn>>;
}

pub struct SqliteCheckInRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteCheckInRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn get_checkin(&self, id: Uuid) -> RepoResult<Option<CheckIn>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{CHECKIN_SELECT_SQL} WHERE c.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_checkin_row(row)?));
        }
        Ok(None)
    }
}

impl CheckInRepository for SqliteCheckInRepository<'_> {
    fn upsert_checkin(&self, checkin: &CheckIn) -> RepoResult<CheckIn> {
        require_outcome(self.conn, checkin.outcome_id)?;
        let update_date: NaiveDate = checkin
            .effective_date()
            .unwrap_or_else(|| Local::now().date_naive());

        self.conn.execute(
            "INSERT INTO outcome_checkins (
                id,
                outcome_id,
                update_date,
                confidence_delta,
                momentum,
                note,
                next_step
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT (id) DO UPDATE SET
                outcome_id = excluded.outcome_id,
                update_date = excluded.update_date,
                confidence_delta = excluded.confidence_delta,
                momentum = excluded.momentum,
                note = excluded.note,
                next_step = excluded.next_step;",
            params![
                checkin.id.to_string(),
                checkin.outcome_id.to_string(),
                update_date,
                checkin.confidence_delta,
                checkin.momentum.as_str(),
                checkin.note.as_deref(),
                checkin.next_step.as_deref(),
            ],
        )?;

        self.get_checkin(checkin.id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("check-in {} missing after upsert", checkin.id))
        })
    }

    fn list_checkins(&self) -> RepoResult<Vec<CheckIn>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CHECKIN_SELECT_SQL}
             ORDER BY c.update_date DESC, c.created_at DESC, c.rowid DESC
             LIMIT ?1;"
        ))?;
        let mut rows = stmt.query([LIST_LIMIT])?;
        collect_checkins(&mut rows)
    }

    fn list_checkins_for_outcome(&self, outcome_id: Uuid) -> RepoResult<Vec<CheckIn>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CHECKIN_SELECT_SQL}
             WHERE c.outcome_id = ?1
             ORDER BY c.update_date DESC, c.created_at DESC, c.rowid DESC;"
        ))?;
        let mut rows = stmt.query([outcome_id.to_string()])?;
        collect_checkins(&mut rows)
    }
}

fn collect_checkins(rows: &mut Rows<'_>) -> RepoResult<Vec<CheckIn>> {
    let mut checkins = Vec::new();
    while let Some(row) = rows.next()? {
        checkins.push(parse_checkin_row(row)?);
    }
    Ok(checkins)
}

fn parse_checkin_row(row: &Row<'_>) -> RepoResult<CheckIn> {
    let momentum_text: String = row.get("momentum")?;
    let momentum = Momentum::parse(&momentum_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid momentum `{momentum_text}` in outcome_checkins.momentum"
        ))
    })?;

    Ok(CheckIn {
        id: parse_uuid(&row.get::<_, String>("id")?, "outcome_checkins.id")?,
        outcome_id: parse_uuid(
            &row.get::<_, String>("outcome_id")?,
            "outcome_checkins.outcome_id",
        )?,
        update_date: row.get("update_date")?,
        created_at: row.get("created_at")?,
        confidence_delta: row.get("confidence_delta")?,
        momentum,
        note: row.get("note")?,
        next_step: row.get("next_step")?,
        outcome_title: row.get("outcome_title")?,
        outcome_owner: row.get("outcome_owner")?,
    })
}
