//! Story beat domain model: a scheduled stakeholder narrative.

use crate::model::outcome::OutcomeId;
use crate::model::{non_blank, optional_date, OutcomeLink};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub const DEFAULT_HEADLINE: &str = "Outcome story beat";

/// Stakeholder group a story beat is aimed at.
///
/// Unknown audiences are kept verbatim in `Other`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Audience {
    #[default]
    Leadership,
    Partners,
    Other(String),
}

impl Audience {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Leadership => "Leadership",
            Self::Partners => "Partners",
            Self::Other(value) => value.as_str(),
        }
    }
}

impl From<String> for Audience {
    fn from(value: String) -> Self {
        match value.trim() {
            "" | "Leadership" => Self::Leadership,
            "Partners" => Self::Partners,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<Audience> for String {
    fn from(value: Audience) -> Self {
        value.as_str().to_string()
    }
}

impl Display for Audience {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryBeat {
    pub id: Uuid,
    pub outcome_id: OutcomeId,
    #[serde(default)]
    pub audience: Audience,
    #[serde(default)]
    pub headline: String,
    #[serde(default)]
    pub proof_point: Option<String>,
    #[serde(default)]
    pub next_move: Option<String>,
    #[serde(default, deserialize_with = "optional_date")]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub outcome_title: Option<String>,
    #[serde(default)]
    pub outcome_owner: Option<String>,
}

impl StoryBeat {
    pub fn new(
        outcome_id: OutcomeId,
        audience: Audience,
        headline: impl Into<String>,
        scheduled_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            outcome_id,
            audience,
            headline: headline.into(),
            proof_point: None,
            next_move: None,
            scheduled_date: Some(scheduled_date),
            owner: None,
            created_at: None,
            outcome_title: None,
            outcome_owner: None,
        }
    }

    /// Signed day gap `today - scheduled_date`; positive means in the past.
    pub fn days_gap(&self, today: NaiveDate) -> Option<i64> {
        self.scheduled_date
            .map(|date| today.signed_duration_since(date).num_days())
    }
}

impl OutcomeLink for StoryBeat {
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
