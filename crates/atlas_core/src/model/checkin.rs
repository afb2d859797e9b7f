//! Check-in domain model.
//!
//! # Invariants
//! - A check-in is immutable once created.
//! - `effective_date` prefers `update_date` and falls back to `created_at`.

use crate::model::outcome::OutcomeId;
use crate::model::{non_blank, optional_date, OutcomeLink};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Short-term trend reported with a check-in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Momentum {
    Up,
    #[default]
    Steady,
    Down,
}

impl Momentum {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "Up",
            Self::Steady => "Steady",
            Self::Down => "Down",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "Up" => Some(Self::Up),
            "Steady" => Some(Self::Steady),
            "Down" => Some(Self::Down),
            _ => None,
        }
    }
}

impl Display for Momentum {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dated update event against one outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckIn {
    pub id: Uuid,
    pub outcome_id: OutcomeId,
    #[serde(default, deserialize_with = "optional_date")]
    pub update_date: Option<NaiveDate>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub confidence_delta: i32,
    #[serde(default)]
    pub momentum: Momentum,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub next_step: Option<String>,
    #[serde(default)]
    pub outcome_title: Option<String>,
    #[serde(default)]
    pub outcome_owner: Option<String>,
}

impl CheckIn {
    pub fn new(outcome_id: OutcomeId, confidence_delta: i32, momentum: Momentum) -> Self {
        Self {
            id: Uuid::new_v4(),
            outcome_id,
            update_date: None,
            created_at: None,
            confidence_delta,
            momentum,
            note: None,
            next_step: None,
            outcome_title: None,
            outcome_owner: None,
        }
    }

    /// Date the check-in counts for: update date, else creation date.
    pub fn effective_date(&self) -> Option<NaiveDate> {
        self.update_date
            .or_else(|| self.created_at.map(|created| created.date_naive()))
    }
}

impl OutcomeLink for CheckIn {
    fn outcome_id(&self) -> OutcomeId {
        self.outcome_id
    }

    fn snapshot_title(&self) -> Option<&str> {
        non_blank(self.outcome_title.as_deref())
    }

    fn snapshot_owner(&self) -> Option<&str> {
        non_blank(self.outcome_owner.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::{CheckIn, Momentum};
    use chrono::{NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    #[test]
    fn effective_date_falls_back_to_creation() {
        let mut checkin = CheckIn::new(Uuid::new_v4(), 1, Momentum::Up);
        assert_eq!(checkin.effective_date(), None);

        checkin.created_at = Some(Utc.with_ymd_and_hms(2026, 2, 1, 18, 30, 0).unwrap());
        assert_eq!(
            checkin.effective_date(),
            NaiveDate::from_ymd_opt(2026, 2, 1)
        );

        checkin.update_date = NaiveDate::from_ymd_opt(2026, 2, 4);
        assert_eq!(
            checkin.effective_date(),
            NaiveDate::from_ymd_opt(2026, 2, 4)
        );
    }

    #[test]
    fn deserialize_defaults_missing_fields() {
        let value = serde_json::json!({
            "id": "2fd519ae-0f2a-4ac6-9d0a-b8b0cb5dbd12",
            "outcome_id": "3f1e7f2c-7fd2-4d98-9fa8-0d0b42751b1a",
            "update_date": ""
        });
        let checkin: CheckIn = serde_json::from_value(value).unwrap();
        assert_eq!(checkin.update_date, None);
        assert_eq!(checkin.confidence_delta, 0);
        assert_eq!(checkin.momentum, Momentum::Steady);
    }
}
