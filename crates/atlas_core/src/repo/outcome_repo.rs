//! Outcome repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide upsert/get/list APIs over canonical `outcomes` storage.
//! - Keep SQL details inside core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `Outcome::validate()` before SQL mutations.
//! - Read paths must reject invalid persisted state instead of masking it.
//! - Lists are capped at `LIST_LIMIT` rows, newest update first.

use crate::db::DbError;
use crate::model::outcome::{
    normalize_tags, Outcome, OutcomeId, OutcomeStatus, OutcomeValidationError,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Maximum rows returned by list endpoints.
pub const LIST_LIMIT: u32 = 200;

const OUTCOME_SELECT_SQL: &str = "SELECT
    id,
    title,
    category,
    status,
    metric,
    owner,
    confidence,
    last_updated,
    evidence,
    story,
    tags
FROM outcomes";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for outcome and linked-record persistence.
#[derive(Debug)]
pub enum RepoError {
    Validation(OutcomeValidationError),
    Db(DbError),
    /// Referenced outcome does not exist.
    NotFound(OutcomeId),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "outcome not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<OutcomeValidationError> for RepoError {
    fn from(value: OutcomeValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Minimal outcome projection used to validate and denormalize linked records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeRef {
    pub id: OutcomeId,
    pub title: String,
    pub owner: String,
}

/// Repository interface for outcome persistence.
pub trait OutcomeRepository {
    /// Inserts or replaces an outcome by id and returns the stored row.
    fn upsert_outcome(&self, outcome: &Outcome) -> RepoResult<Outcome>;
    fn get_outcome(&self, id: OutcomeId) -> RepoResult<Option<Outcome>>;
    /// Lists up to `LIST_LIMIT` outcomes, last update desc (undated last).
    fn list_outcomes(&self) -> RepoResult<Vec<Outcome>>;
    fn outcome_ref(&self, id: OutcomeId) -> RepoResult<Option<OutcomeRef>>;
}

/// SQLite-backed outcome repository.
pub struct SqliteOutcomeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOutcomeRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl OutcomeRepository for SqliteOutcomeRepository<'_> {
    fn upsert_outcome(&self, outcome: &Outcome) -> RepoResult<Outcome> {
        outcome.validate()?;
        let tags = encode_tags(&normalize_tags(&outcome.tags))?;

        self.conn.execute(
            "INSERT INTO outcomes (
                id,
                title,
                category,
                status,
                metric,
                owner,
                confidence,
                last_updated,
                evidence,
                story,
                tags
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            ON CONFLICT (id) DO UPDATE SET
                title = excluded.title,
                category = excluded.category,
                status = excluded.status,
                metric = excluded.metric,
                owner = excluded.owner,
                confidence = excluded.confidence,
                last_updated = excluded.last_updated,
                evidence = excluded.evidence,
                story = excluded.story,
                tags = excluded.tags;",
            params![
                outcome.id.to_string(),
                outcome.title.as_str(),
                outcome.category.as_str(),
                outcome.status.as_str(),
                outcome.metric.as_str(),
                outcome.owner.as_str(),
                outcome.confidence,
                outcome.last_updated,
                outcome.evidence.as_deref(),
                outcome.story.as_deref(),
                tags,
            ],
        )?;

        self.get_outcome(outcome.id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("outcome {} missing after upsert", outcome.id))
        })
    }

    fn get_outcome(&self, id: OutcomeId) -> RepoResult<Option<Outcome>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{OUTCOME_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_outcome_row(row)?));
        }
        Ok(None)
    }

    fn list_outcomes(&self) -> RepoResult<Vec<Outcome>> {
        let mut stmt = self.conn.prepare(&format!(
            "{OUTCOME_SELECT_SQL}
             ORDER BY last_updated DESC NULLS LAST, created_at DESC, rowid DESC
             LIMIT ?1;"
        ))?;
        let mut rows = stmt.query([LIST_LIMIT])?;
        let mut outcomes = Vec::new();
        while let Some(row) = rows.next()? {
            outcomes.push(parse_outcome_row(row)?);
        }
        Ok(outcomes)
    }

    fn outcome_ref(&self, id: OutcomeId) -> RepoResult<Option<OutcomeRef>> {
        let found = self
            .conn
            .query_row(
                "SELECT title, owner FROM outcomes WHERE id = ?1 LIMIT 1;",
                [id.to_string()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
            )
            .optional()?;
        Ok(found.map(|(title, owner)| OutcomeRef { id, title, owner }))
    }
}

fn parse_outcome_row(row: &Row<'_>) -> RepoResult<Outcome> {
    let id = parse_uuid(&row.get::<_, String>("id")?, "outcomes.id")?;

    let status_text: String = row.get("status")?;
    let status = OutcomeStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid status `{status_text}` in outcomes.status"))
    })?;

    let tags_text: String = row.get("tags")?;
    let tags: Vec<String> = serde_json::from_str(&tags_text).map_err(|err| {
        RepoError::InvalidData(format!("invalid tags `{tags_text}` in outcomes.tags: {err}"))
    })?;

    let outcome = Outcome {
        id,
        title: row.get("title")?,
        category: row.get("category")?,
        status,
        metric: row.get("metric")?,
        owner: row.get("owner")?,
        confidence: row.get("confidence")?,
        last_updated: row.get("last_updated")?,
        evidence: row.get("evidence")?,
        story: row.get("story")?,
        tags,
    };
    outcome.validate()?;
    Ok(outcome)
}

fn encode_tags(tags: &[String]) -> RepoResult<String> {
    serde_json::to_string(tags)
        .map_err(|err| RepoError::InvalidData(format!("tags cannot be encoded: {err}")))
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid value `{value}` in {column}")))
}

/// Loads the outcome reference for a linked write, failing with `NotFound`.
pub(crate) fn require_outcome(conn: &Connection, id: OutcomeId) -> RepoResult<OutcomeRef> {
    SqliteOutcomeRepository::new(conn)
        .outcome_ref(id)?
        .ok_or(RepoError::NotFound(id))
}
