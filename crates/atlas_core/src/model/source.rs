//! Evidence source domain model.

use crate::model::outcome::OutcomeId;
use crate::model::{non_blank, optional_date, OutcomeLink};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_SOURCE_NAME: &str = "Evidence source";
pub const DEFAULT_SOURCE_TYPE: &str = "Dashboard";
pub const DEFAULT_VERIFY_CADENCE_DAYS: i32 = 30;

fn default_cadence_days() -> i32 {
    DEFAULT_VERIFY_CADENCE_DAYS
}

/// Where the evidence behind an outcome lives and how often it is verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceSource {
    pub id: Uuid,
    pub outcome_id: OutcomeId,
    #[serde(default)]
    pub source_name: String,
    #[serde(default)]
    pub source_type: String,
    #[serde(default, deserialize_with = "optional_date")]
    pub last_verified: Option<NaiveDate>,
    #[serde(default = "default_cadence_days")]
    pub cadence_days: i32,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub outcome_title: Option<String>,
    #[serde(default)]
    pub outcome_owner: Option<String>,
}

impl EvidenceSource {
    pub fn new(outcome_id: OutcomeId, source_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            outcome_id,
            source_name: source_name.into(),
            source_type: DEFAULT_SOURCE_TYPE.to_string(),
            last_verified: None,
            cadence_days: DEFAULT_VERIFY_CADENCE_DAYS,
            owner: None,
            notes: None,
            created_at: None,
            outcome_title: None,
            outcome_owner: None,
        }
    }
}

impl OutcomeLink for EvidenceSource {
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
