//! Remote store contract used by sync sessions.

use crate::model::checkin::CheckIn;
use crate::model::outcome::Outcome;
use crate::model::source::EvidenceSource;
use crate::model::story_beat::StoryBeat;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Remote could not be reached or is not configured.
    Unavailable(String),
    /// Remote answered with a non-success status.
    Rejected { status: u16, message: String },
    /// Remote answered with a body that could not be decoded.
    Decode(String),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(message) => write!(f, "remote unavailable: {message}"),
            Self::Rejected { status, message } => {
                write!(f, "remote rejected request ({status}): {message}")
            }
            Self::Decode(message) => write!(f, "remote response not understood: {message}"),
        }
    }
}

impl Error for SyncError {}

pub type SyncResult<T> = Result<T, SyncError>;

/// Shared remote copy of the dashboard records.
///
/// Each push returns the record as stored remotely, which replaces the local
/// copy on success.
pub trait RemoteStore: Send + Sync {
    fn fetch_outcomes(&self) -> SyncResult<Vec<Outcome>>;
    fn push_outcome(&self, outcome: &Outcome) -> SyncResult<Outcome>;
    fn push_checkin(&self, checkin: &CheckIn) -> SyncResult<CheckIn>;
    fn push_story_beat(&self, beat: &StoryBeat) -> SyncResult<StoryBeat>;
    fn push_source(&self, source: &EvidenceSource) -> SyncResult<EvidenceSource>;
}
