//! Local JSON cache of the dashboard state, plus JSON export.
//!
//! # Invariants
//! - A missing cache file yields the demo seed.
//! - A cache file that fails to parse is logged and replaced by the demo
//!   seed; it never aborts startup.
//! - Other I/O failures propagate.

use crate::model::outcome::Outcome;
use crate::seed::demo_state;
use crate::state::AtlasState;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::Path;

/// Default file name used by the outcome export.
pub const EXPORT_FILE_NAME: &str = "outcome-atlas-export.json";

#[derive(Debug)]
pub enum CacheError {
    Io(std::io::Error),
    Encode(serde_json::Error),
}

impl Display for CacheError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "cache I/O failed: {err}"),
            Self::Encode(err) => write!(f, "cache encoding failed: {err}"),
        }
    }
}

impl Error for CacheError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for CacheError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Where a loaded state came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOrigin {
    Cached,
    /// No cache file existed yet.
    Seeded,
    /// The cache file was unreadable as JSON and was replaced by the seed.
    Recovered,
}

pub fn load_state(path: &Path) -> Result<(AtlasState, CacheOrigin), CacheError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!("event=cache_load module=cache status=ok origin=seeded");
            return Ok((demo_state(), CacheOrigin::Seeded));
        }
        Err(err) => return Err(err.into()),
    };

    match serde_json::from_str::<AtlasState>(&raw) {
        Ok(state) => {
            info!(
                "event=cache_load module=cache status=ok origin=cached outcomes={} checkins={}",
                state.outcomes.len(),
                state.checkins.len()
            );
            Ok((state, CacheOrigin::Cached))
        }
        Err(err) => {
            warn!(
                "event=cache_load module=cache status=error origin=recovered line={} column={}",
                err.line(),
                err.column()
            );
            Ok((demo_state(), CacheOrigin::Recovered))
        }
    }
}

pub fn save_state(path: &Path, state: &AtlasState) -> Result<(), CacheError> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let encoded = serde_json::to_string(state)?;
    std::fs::write(path, &encoded)?;
    info!(
        "event=cache_save module=cache status=ok outcomes={} bytes={}",
        state.outcomes.len(),
        encoded.len()
    );
    Ok(())
}

/// Pretty-printed JSON array of outcomes.
pub fn export_outcomes(outcomes: &[Outcome]) -> Result<String, CacheError> {
    Ok(serde_json::to_string_pretty(outcomes)?)
}
