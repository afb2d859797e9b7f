//! Domain model for outcomes and the records linked to them.
//!
//! # Responsibility
//! - Define canonical data structures consumed by storage, sync and metrics.
//! - Keep wire field names aligned with the endpoint JSON contract.
//!
//! # Invariants
//! - Every record is identified by a stable UUID.
//! - Linked records (check-ins, story beats, sources) reference an outcome by
//!   id and may carry a denormalized title/owner snapshot of it.

pub mod checkin;
pub mod outcome;
pub mod source;
pub mod story_beat;

use serde::{Deserialize, Deserializer};

pub use outcome::OutcomeId;

/// Record that points at a parent outcome and may carry a snapshot of it.
pub trait OutcomeLink {
    /// Parent outcome id.
    fn outcome_id(&self) -> OutcomeId;
    /// Denormalized outcome title captured at write time.
    fn snapshot_title(&self) -> Option<&str>;
    /// Denormalized outcome owner captured at write time.
    fn snapshot_owner(&self) -> Option<&str>;
}

/// Deserializes an optional calendar date, treating `""` as absent.
///
/// Browser forms submit empty date inputs as empty strings.
pub(crate) fn optional_date<'de, D>(deserializer: D) -> Result<Option<chrono::NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_calendar_date(value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date `{value}`"))),
    }
}

/// Parses `YYYY-MM-DD`, also accepting a full timestamp by taking its date part.
pub(crate) fn parse_calendar_date(value: &str) -> Option<chrono::NaiveDate> {
    let date_part = value.get(..10).unwrap_or(value);
    chrono::NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Trims an optional free-text field, mapping blank values to `None`.
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}
