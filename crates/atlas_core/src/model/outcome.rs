//! Outcome domain model.
//!
//! # Responsibility
//! - Define the tracked metric record with status, owner and confidence.
//! - Provide the check-in application rule (confidence clamp + date bump).
//!
//! # Invariants
//! - `id` is stable and never nil.
//! - `confidence` stays within `0..=100`.
//! - `tags` are trimmed, non-empty and deduplicated.

use crate::model::checkin::CheckIn;
use crate::model::{non_blank, optional_date};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for outcomes.
pub type OutcomeId = Uuid;

pub const MIN_CONFIDENCE: i32 = 0;
pub const MAX_CONFIDENCE: i32 = 100;
pub const DEFAULT_CATEGORY: &str = "Access";
pub const DEFAULT_TITLE: &str = "Untitled outcome";
pub const UNASSIGNED_OWNER: &str = "Unassigned";

/// Reporting status of an outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutcomeStatus {
    #[default]
    #[serde(rename = "On Track")]
    OnTrack,
    #[serde(rename = "Watching")]
    Watching,
    #[serde(rename = "Needs Lift")]
    NeedsLift,
}

impl OutcomeStatus {
    pub const ALL: [OutcomeStatus; 3] = [Self::OnTrack, Self::Watching, Self::NeedsLift];

    /// Display/storage label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OnTrack => "On Track",
            Self::Watching => "Watching",
            Self::NeedsLift => "Needs Lift",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "On Track" => Some(Self::OnTrack),
            "Watching" => Some(Self::Watching),
            "Needs Lift" => Some(Self::NeedsLift),
            _ => None,
        }
    }

    /// Review cadence in days before any evidence/confidence reduction.
    pub fn base_cadence_days(self) -> i64 {
        match self {
            Self::OnTrack => 30,
            Self::Watching => 21,
            Self::NeedsLift => 14,
        }
    }
}

impl Display for OutcomeStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation errors for outcome records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeValidationError {
    NilId,
    ConfidenceOutOfRange(i32),
}

impl Display for OutcomeValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "outcome id must not be nil"),
            Self::ConfidenceOutOfRange(value) => write!(
                f,
                "confidence {value} is outside {MIN_CONFIDENCE}..={MAX_CONFIDENCE}"
            ),
        }
    }
}

impl Error for OutcomeValidationError {}

/// Tracked outcome with its evidence and narrative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub id: OutcomeId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub status: OutcomeStatus,
    #[serde(default)]
    pub metric: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub confidence: i32,
    /// Serialized as `date` to match the endpoint contract.
    #[serde(rename = "date", default, deserialize_with = "optional_date")]
    pub last_updated: Option<NaiveDate>,
    #[serde(default)]
    pub evidence: Option<String>,
    #[serde(default)]
    pub story: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Outcome {
    /// Creates an outcome with a generated id and endpoint defaults.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            category: DEFAULT_CATEGORY.to_string(),
            status: OutcomeStatus::OnTrack,
            metric: String::new(),
            owner: String::new(),
            confidence: 0,
            last_updated: None,
            evidence: None,
            story: None,
            tags: Vec::new(),
        }
    }

    /// Creates an outcome with a caller-provided id (import/seed paths).
    pub fn with_id(
        id: OutcomeId,
        title: impl Into<String>,
    ) -> Result<Self, OutcomeValidationError> {
        if id.is_nil() {
            return Err(OutcomeValidationError::NilId);
        }
        let mut outcome = Self::new(title);
        outcome.id = id;
        Ok(outcome)
    }

    pub fn validate(&self) -> Result<(), OutcomeValidationError> {
        if self.id.is_nil() {
            return Err(OutcomeValidationError::NilId);
        }
        if !(MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&self.confidence) {
            return Err(OutcomeValidationError::ConfidenceOutOfRange(
                self.confidence,
            ));
        }
        Ok(())
    }

    /// Whether a non-blank evidence link is attached.
    pub fn has_evidence(&self) -> bool {
        non_blank(self.evidence.as_deref()).is_some()
    }

    /// Whole days elapsed since the last update, `None` when undated.
    ///
    /// Negative for future-dated outcomes.
    pub fn days_since_update(&self, today: NaiveDate) -> Option<i64> {
        self.last_updated
            .map(|date| today.signed_duration_since(date).num_days())
    }

    /// Owner name used for grouping; blank owners become `Unassigned`.
    pub fn owner_label(&self) -> &str {
        let trimmed = self.owner.trim();
        if trimmed.is_empty() {
            UNASSIGNED_OWNER
        } else {
            trimmed
        }
    }

    /// Applies a check-in: clamps confidence and moves the last-update date.
    ///
    /// A check-in without any date leaves `last_updated` untouched.
    pub fn apply_checkin(&mut self, checkin: &CheckIn) {
        let next = i64::from(self.confidence) + i64::from(checkin.confidence_delta);
        self.confidence =
            next.clamp(i64::from(MIN_CONFIDENCE), i64::from(MAX_CONFIDENCE)) as i32;
        if let Some(date) = checkin.effective_date() {
            self.last_updated = Some(date);
        }
    }
}

/// Trims, drops blanks and deduplicates tag values.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut unique = BTreeSet::new();
    for tag in tags {
        let trimmed = tag.trim();
        if !trimmed.is_empty() {
            unique.insert(trimmed.to_string());
        }
    }
    unique.into_iter().collect()
}

/// Splits a comma-separated tag string into normalized tags.
pub fn parse_tag_list(raw: &str) -> Vec<String> {
    let parts: Vec<String> = raw.split(',').map(str::to_string).collect();
    normalize_tags(&parts)
}
