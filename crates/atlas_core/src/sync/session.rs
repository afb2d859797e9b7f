//! Local-first sync session.
//!
//! # Responsibility
//! - Own the in-memory `AtlasState` and its local cache file.
//! - Commit mutations locally first, then reconcile them with a remote.
//!
//! # Invariants
//! - `commit_*` never talks to the remote; a committed record is never
//!   rolled back by a later sync failure.
//! - A failed reconcile keeps the failed record and everything after it
//!   queued, in order, and only flips the indicator to `Error`.

use crate::cache::{load_state, save_state, CacheError, CacheOrigin};
use crate::model::checkin::CheckIn;
use crate::model::outcome::Outcome;
use crate::model::source::EvidenceSource;
use crate::model::story_beat::StoryBeat;
use crate::seed::demo_state;
use crate::state::{AtlasState, StateError};
use crate::sync::remote::{RemoteStore, SyncResult};
use crate::sync::status::{SyncIndicator, SyncStatus};
use log::{info, warn};
use std::collections::VecDeque;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Debug)]
pub enum SessionError {
    State(StateError),
    Cache(CacheError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::State(err) => write!(f, "{err}"),
            Self::Cache(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::State(err) => Some(err),
            Self::Cache(err) => Some(err),
        }
    }
}

impl From<StateError> for SessionError {
    fn from(value: StateError) -> Self {
        Self::State(value)
    }
}

impl From<CacheError> for SessionError {
    fn from(value: CacheError) -> Self {
        Self::Cache(value)
    }
}

/// Locally committed record waiting to be pushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingRecord {
    Outcome(Outcome),
    CheckIn(CheckIn),
    StoryBeat(StoryBeat),
    Source(EvidenceSource),
}

impl PendingRecord {
    fn kind(&self) -> &'static str {
        match self {
            Self::Outcome(_) => "outcome",
            Self::CheckIn(_) => "checkin",
            Self::StoryBeat(_) => "storybeat",
            Self::Source(_) => "source",
        }
    }
}

pub struct SyncSession {
    state: AtlasState,
    cache_path: Option<PathBuf>,
    remote: Option<Arc<dyn RemoteStore>>,
    indicator: SyncIndicator,
    pending: VecDeque<PendingRecord>,
}

impl SyncSession {
    /// Session over an already loaded state, without a cache file.
    pub fn new(state: AtlasState, remote: Option<Arc<dyn RemoteStore>>) -> Self {
        Self {
            state,
            cache_path: None,
            remote,
            indicator: SyncIndicator::new(SyncStatus::Local, ""),
            pending: VecDeque::new(),
        }
    }

    /// Loads the local cache (or the seed), then pulls outcomes from the
    /// remote when one is configured.
    pub fn initialize(
        cache_path: Option<PathBuf>,
        remote: Option<Arc<dyn RemoteStore>>,
    ) -> Result<Self, SessionError> {
        let (state, origin) = match cache_path.as_deref() {
            Some(path) => load_state(path)?,
            None => (demo_state(), CacheOrigin::Seeded),
        };

        let mut session = Self::new(state, remote);
        session.cache_path = cache_path;
        session.indicator = SyncIndicator::new(SyncStatus::Local, "cached");
        if origin == CacheOrigin::Recovered {
            session.persist()?;
        }
        session.refresh()?;
        Ok(session)
    }

    pub fn state(&self) -> &AtlasState {
        &self.state
    }

    pub fn indicator(&self) -> &SyncIndicator {
        &self.indicator
    }

    pub fn pending(&self) -> impl Iterator<Item = &PendingRecord> {
        self.pending.iter()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Replaces local outcomes with the remote collection. Outcomes still
    /// queued for a push are laid back on top, in commit order.
    ///
    /// On failure the local state is kept and the indicator shows
    /// `Sync unavailable · using local cache`.
    pub fn refresh(&mut self) -> Result<(), SessionError> {
        let Some(remote) = self.remote.clone() else {
            return Ok(());
        };

        self.indicator = SyncIndicator::new(SyncStatus::Syncing, "");
        match remote.fetch_outcomes() {
            Ok(outcomes) => {
                let count = outcomes.len();
                self.state.outcomes = outcomes;
                for record in &self.pending {
                    if let PendingRecord::Outcome(outcome) = record {
                        self.state.upsert_outcome(outcome.clone());
                    }
                }
                self.persist()?;
                self.indicator = SyncIndicator::new(SyncStatus::Live, format!("{count} in cloud"));
                info!("event=sync_refresh module=sync status=ok outcomes={count}");
            }
            Err(err) => {
                self.indicator = SyncIndicator::new(SyncStatus::Error, "using local cache");
                warn!("event=sync_refresh module=sync status=error error={err}");
            }
        }
        Ok(())
    }

    pub fn commit_outcome(&mut self, outcome: Outcome) -> Result<(), SessionError> {
        self.state.upsert_outcome(outcome.clone());
        self.persist()?;
        self.pending.push_back(PendingRecord::Outcome(outcome));
        Ok(())
    }

    /// Records a check-in and queues both it and the moved outcome.
    pub fn commit_checkin(&mut self, checkin: CheckIn) -> Result<Outcome, SessionError> {
        let id = checkin.id;
        let updated = self.state.apply_checkin(checkin)?;
        self.persist()?;

        if let Some(stored) = self.state.checkins.iter().find(|item| item.id == id) {
            self.pending.push_back(PendingRecord::CheckIn(stored.clone()));
        }
        self.pending.push_back(PendingRecord::Outcome(updated.clone()));
        Ok(updated)
    }

    pub fn commit_story_beat(&mut self, beat: StoryBeat) -> Result<(), SessionError> {
        self.state.add_story_beat(beat)?;
        self.persist()?;
        if let Some(stored) = self.state.story_beats.first() {
            self.pending.push_back(PendingRecord::StoryBeat(stored.clone()));
        }
        Ok(())
    }

    pub fn commit_source(&mut self, source: EvidenceSource) -> Result<(), SessionError> {
        self.state.add_source(source)?;
        self.persist()?;
        if let Some(stored) = self.state.sources.first() {
            self.pending.push_back(PendingRecord::Source(stored.clone()));
        }
        Ok(())
    }

    /// Replaces local state with the demo dataset and pushes it when a
    /// remote is configured.
    pub fn seed_demo(&mut self) -> Result<(), SessionError> {
        self.state = demo_state();
        self.persist()?;

        if self.remote.is_none() {
            self.indicator = SyncIndicator::new(SyncStatus::Local, "demo loaded");
            return Ok(());
        }

        let seeded = &self.state;
        let records: Vec<PendingRecord> = seeded
            .outcomes
            .iter()
            .cloned()
            .map(PendingRecord::Outcome)
            .chain(seeded.checkins.iter().cloned().map(PendingRecord::CheckIn))
            .chain(seeded.story_beats.iter().cloned().map(PendingRecord::StoryBeat))
            .collect();
        self.pending.extend(records);

        self.reconcile();
        if self.pending.is_empty() {
            self.indicator = SyncIndicator::new(SyncStatus::Live, "demo synced");
        }
        Ok(())
    }

    /// Pushes queued records in commit order and returns how many were
    /// accepted. Stops at the first failure.
    pub fn reconcile(&mut self) -> usize {
        let Some(remote) = self.remote.clone() else {
            return 0;
        };
        if self.pending.is_empty() {
            return 0;
        }

        self.indicator = SyncIndicator::new(SyncStatus::Syncing, "");
        let mut pushed = 0;
        while let Some(record) = self.pending.front() {
            let kind = record.kind();
            match push(remote.as_ref(), record) {
                Ok(stored) => {
                    self.accept(stored);
                    self.pending.pop_front();
                    pushed += 1;
                }
                Err(err) => {
                    warn!(
                        "event=sync_reconcile module=sync status=error record={kind} pushed={pushed} pending={} error={err}",
                        self.pending.len()
                    );
                    self.indicator = SyncIndicator::new(SyncStatus::Error, "saved locally");
                    self.persist_quietly();
                    return pushed;
                }
            }
        }

        self.persist_quietly();
        self.indicator = SyncIndicator::new(SyncStatus::Live, format!("{pushed} synced"));
        info!("event=sync_reconcile module=sync status=ok pushed={pushed}");
        pushed
    }

    /// Swaps the local copy for the remotely stored version.
    fn accept(&mut self, stored: PendingRecord) {
        match stored {
            PendingRecord::Outcome(outcome) => self.state.upsert_outcome(outcome),
            PendingRecord::CheckIn(checkin) => {
                replace_by_id(&mut self.state.checkins, checkin, |item| item.id)
            }
            PendingRecord::StoryBeat(beat) => {
                replace_by_id(&mut self.state.story_beats, beat, |item| item.id)
            }
            PendingRecord::Source(source) => {
                replace_by_id(&mut self.state.sources, source, |item| item.id)
            }
        }
    }

    fn persist(&self) -> Result<(), CacheError> {
        match self.cache_path.as_deref() {
            Some(path) => save_state(path, &self.state),
            None => Ok(()),
        }
    }

    fn persist_quietly(&self) {
        if let Err(err) = self.persist() {
            warn!("event=cache_save module=sync status=error error={err}");
        }
    }
}

fn push(remote: &dyn RemoteStore, record: &PendingRecord) -> SyncResult<PendingRecord> {
    Ok(match record {
        PendingRecord::Outcome(outcome) => PendingRecord::Outcome(remote.push_outcome(outcome)?),
        PendingRecord::CheckIn(checkin) => PendingRecord::CheckIn(remote.push_checkin(checkin)?),
        PendingRecord::StoryBeat(beat) => PendingRecord::StoryBeat(remote.push_story_beat(beat)?),
        PendingRecord::Source(source) => PendingRecord::Source(remote.push_source(source)?),
    })
}

fn replace_by_id<T, K, F>(items: &mut [T], stored: T, key: F)
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    let id = key(&stored);
    if let Some(slot) = items.iter_mut().find(|item| key(&**item) == id) {
        *slot = stored;
    }
}
