//! Outcome atlas use-case service.
//!
//! # Responsibility
//! - Provide use-case entry points over the SQLite store: load the full
//!   dashboard state, record check-ins, seed demo data, export.
//! - Group multi-row writes into one transaction.
//!
//! # Invariants
//! - `record_checkin` writes the check-in and the moved outcome atomically;
//!   an unknown outcome leaves the store untouched.
//! - Seeding upserts by fixed ids, so running it twice does not duplicate.

use crate::cache::{export_outcomes, CacheError};
use crate::metrics::filter::OutcomeFilter;
use crate::metrics::{build_dashboard, Dashboard};
use crate::model::checkin::CheckIn;
use crate::model::outcome::{Outcome, OutcomeId};
use crate::model::source::EvidenceSource;
use crate::model::story_beat::StoryBeat;
use crate::repo::checkin_repo::{CheckInRepository, SqliteCheckInRepository};
use crate::repo::outcome_repo::{OutcomeRepository, RepoError, SqliteOutcomeRepository};
use crate::repo::source_repo::{SourceRepository, SqliteSourceRepository};
use crate::repo::story_beat_repo::{SqliteStoryBeatRepository, StoryBeatRepository};
use crate::seed::demo_state;
use crate::state::AtlasState;
use chrono::NaiveDate;
use log::info;
use rusqlite::{Connection, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    OutcomeNotFound(OutcomeId),
    Repo(RepoError),
    Export(CacheError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutcomeNotFound(id) => write!(f, "outcome not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Export(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::OutcomeNotFound(_) => None,
            Self::Repo(err) => Some(err),
            Self::Export(err) => Some(err),
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::OutcomeNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<rusqlite::Error> for ServiceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::from(value))
    }
}

impl From<CacheError> for ServiceError {
    fn from(value: CacheError) -> Self {
        Self::Export(value)
    }
}

/// Row counts written by `seed_demo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub outcomes: usize,
    pub checkins: usize,
    pub story_beats: usize,
}

/// Result of recording one check-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckInReceipt {
    pub checkin: CheckIn,
    pub outcome: Outcome,
}

pub struct AtlasService<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> AtlasService<'conn> {
    pub fn new(conn: &'conn mut Connection) -> Self {
        Self { conn }
    }

    /// Reads every collection the dashboard derives from.
    pub fn load_state(&self) -> ServiceResult<AtlasState> {
        let conn: &Connection = &*self.conn;
        Ok(AtlasState {
            outcomes: SqliteOutcomeRepository::new(conn).list_outcomes()?,
            checkins: SqliteCheckInRepository::new(conn).list_checkins()?,
            story_beats: SqliteStoryBeatRepository::new(conn).list_story_beats()?,
            sources: SqliteSourceRepository::new(conn).list_sources()?,
        })
    }

    pub fn dashboard(&self, filter: &OutcomeFilter, today: NaiveDate) -> ServiceResult<Dashboard> {
        let state = self.load_state()?;
        Ok(build_dashboard(&state, filter, today))
    }

    pub fn save_outcome(&self, outcome: &Outcome) -> ServiceResult<Outcome> {
        Ok(SqliteOutcomeRepository::new(&*self.conn).upsert_outcome(outcome)?)
    }

    /// Stores the check-in and applies its delta/date to the outcome.
    pub fn record_checkin(&mut self, checkin: &CheckIn) -> ServiceResult<CheckInReceipt> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let outcomes = SqliteOutcomeRepository::new(&tx);
        let mut outcome = outcomes
            .get_outcome(checkin.outcome_id)?
            .ok_or(ServiceError::OutcomeNotFound(checkin.outcome_id))?;

        let stored = SqliteCheckInRepository::new(&tx).upsert_checkin(checkin)?;
        outcome.apply_checkin(&stored);
        let outcome = outcomes.upsert_outcome(&outcome)?;
        tx.commit()?;

        info!(
            "event=checkin_record module=service status=ok outcome_id={} delta={} confidence={}",
            outcome.id, stored.confidence_delta, outcome.confidence
        );
        Ok(CheckInReceipt {
            checkin: stored,
            outcome,
        })
    }

    pub fn add_story_beat(&self, beat: &StoryBeat) -> ServiceResult<StoryBeat> {
        Ok(SqliteStoryBeatRepository::new(&*self.conn).upsert_story_beat(beat)?)
    }

    pub fn add_source(&self, source: &EvidenceSource) -> ServiceResult<EvidenceSource> {
        Ok(SqliteSourceRepository::new(&*self.conn).upsert_source(source)?)
    }

    /// Upserts the demo dataset in one transaction.
    pub fn seed_demo(&mut self) -> ServiceResult<SeedSummary> {
        let demo = demo_state();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        {
            let outcomes = SqliteOutcomeRepository::new(&tx);
            for outcome in &demo.outcomes {
                outcomes.upsert_outcome(outcome)?;
            }
            let checkins = SqliteCheckInRepository::new(&tx);
            for checkin in &demo.checkins {
                checkins.upsert_checkin(checkin)?;
            }
            let beats = SqliteStoryBeatRepository::new(&tx);
            for beat in &demo.story_beats {
                beats.upsert_story_beat(beat)?;
            }
        }
        tx.commit()?;

        let summary = SeedSummary {
            outcomes: demo.outcomes.len(),
            checkins: demo.checkins.len(),
            story_beats: demo.story_beats.len(),
        };
        info!(
            "event=seed_demo module=service status=ok outcomes={} checkins={} story_beats={}",
            summary.outcomes, summary.checkins, summary.story_beats
        );
        Ok(summary)
    }

    /// Pretty JSON array of stored outcomes.
    pub fn export_json(&self) -> ServiceResult<String> {
        let outcomes = SqliteOutcomeRepository::new(&*self.conn).list_outcomes()?;
        Ok(export_outcomes(&outcomes)?)
    }
}
