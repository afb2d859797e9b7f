//! Evidence source repository contracts and SQLite implementation.
//!
//! # Invariants
//! - Writes require the parent outcome to exist.
//! - Lists are ordered by `last_verified DESC NULLS LAST, created_at DESC`.

use crate::model::source::EvidenceSource;
use crate::repo::outcome_repo::{parse_uuid, require_outcome, RepoError, RepoResult, LIST_LIMIT};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const SOURCE_SELECT_SQL: &str = "SELECT
    s.id,
    s.outcome_id,
    s.source_name,
    s.source_type,
    s.last_verified,
    s.cadence_days,
    s.owner,
    s.notes,
    s.created_at,
    o.title AS outcome_title,
    o.owner AS outcome_owner
FROM outcome_sources s
LEFT JOIN outcomes o ON o.id = s.outcome_id";

pub trait SourceRepository {
    fn upsert_source(&self, source: &EvidenceSource) -> RepoResult<EvidenceSource>;
    fn list_sources(&self) -> RepoResult<Vec<EvidenceSource>>;
}

pub struct SqliteSourceRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSourceRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn get_source(&self, id: Uuid) -> RepoResult<Option<EvidenceSource>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SOURCE_SELECT_SQL} WHERE s.id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_source_row(row)?));
        }
        Ok(None)
    }
}

impl SourceRepository for SqliteSourceRepository<'_> {
    fn upsert_source(&self, source: &EvidenceSource) -> RepoResult<EvidenceSource> {
        require_outcome(self.conn, source.outcome_id)?;
        if source.cadence_days <= 0 {
            return Err(RepoError::InvalidData(format!(
                "cadence_days must be positive, got {}",
                source.cadence_days
            )));
        }

        self.conn.execute(
            "INSERT INTO outcome_sources (
                id,
                outcome_id,
                source_name,
                source_type,
                last_verified,
                cadence_days,
                owner,
                notes
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT (id) DO UPDATE SET
                outcome_id = excluded.outcome_id,
                source_name = excluded.source_name,
                source_type = excluded.source_type,
                last_verified = excluded.last_verified,
                cadence_days = excluded.cadence_days,
                owner = excluded.owner,
                notes = excluded.notes;",
            params![
                source.id.to_string(),
                source.outcome_id.to_string(),
                source.source_name.as_str(),
                source.source_type.as_str(),
                source.last_verified,
                source.cadence_days,
                source.owner.as_deref(),
                source.notes.as_deref(),
            ],
        )?;

        self.get_source(source.id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("source {} missing after upsert", source.id))
        })
    }

    fn list_sources(&self) -> RepoResult<Vec<EvidenceSource>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SOURCE_SELECT_SQL}
             ORDER BY s.last_verified DESC NULLS LAST, s.created_at DESC, s.rowid DESC
             LIMIT ?1;"
        ))?;
        let mut rows = stmt.query([LIST_LIMIT])?;
        let mut sources = Vec::new();
        while let Some(row) = rows.next()? {
            sources.push(parse_source_row(row)?);
        }
        Ok(sources)
    }
}

fn parse_source_row(row: &Row<'_>) -> RepoResult<EvidenceSource> {
    Ok(EvidenceSource {
        id: parse_uuid(&row.get::<_, String>("id")?, "outcome_sources.id")?,
        outcome_id: parse_uuid(
            &row.get::<_, String>("outcome_id")?,
            "outcome_sources.outcome_id",
        )?,
        source_name: row.get("source_name")?,
        source_type: row.get("source_type")?,
        last_verified: row.get("last_verified")?,
        cadence_days: row.get("cadence_days")?,
        owner: row.get("owner")?,
        notes: row.get("notes")?,
        created_at: row.get("created_at")?,
        outcome_title: row.get("outcome_title")?,
        outcome_owner: row.get("outcome_owner")?,
    })
}
