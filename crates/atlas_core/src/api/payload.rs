//! Request body decoding for endpoint writes.
//!
//! Browser forms send empty strings for untouched inputs and numbers as
//! strings, so absent, `null` and `""` all select the documented default,
//! and numeric fields accept either JSON numbers or numeric strings.

use crate::api::ApiError;
use crate::model::checkin::{CheckIn, Momentum};
use crate::model::outcome::{
    normalize_tags, parse_tag_list, Outcome, OutcomeId, OutcomeStatus, DEFAULT_CATEGORY,
    DEFAULT_TITLE,
};
use crate::model::parse_calendar_date;
use crate::model::source::{
    EvidenceSource, DEFAULT_SOURCE_NAME, DEFAULT_SOURCE_TYPE, DEFAULT_VERIFY_CADENCE_DAYS,
};
use crate::model::story_beat::{Audience, StoryBeat, DEFAULT_HEADLINE};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

/// Parses a request body; an absent or blank body is an empty object.
pub(crate) fn decode<T>(body: Option<&str>) -> Result<T, ApiError>
where
    T: DeserializeOwned,
{
    let raw = body.map(str::trim).filter(|raw| !raw.is_empty()).unwrap_or("{}");
    serde_json::from_str(raw).map_err(|err| ApiError::InvalidBody(err.to_string()))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct OutcomePayload {
    id: Option<String>,
    title: Option<String>,
    category: Option<String>,
    status: Option<String>,
    metric: Option<String>,
    owner: Option<String>,
    confidence: Option<Value>,
    date: Option<String>,
    evidence: Option<String>,
    story: Option<String>,
    tags: Option<Value>,
}

impl OutcomePayload {
    pub(crate) fn into_outcome(self) -> Result<Outcome, ApiError> {
        let status = match present(self.status) {
            Some(label) => OutcomeStatus::parse(&label)
                .ok_or_else(|| ApiError::InvalidBody(format!("unsupported status `{label}`")))?,
            None => OutcomeStatus::default(),
        };

        Ok(Outcome {
            id: record_id(self.id)?,
            title: present(self.title).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            category: present(self.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
            status,
            metric: present(self.metric).unwrap_or_default(),
            owner: present(self.owner).unwrap_or_default(),
            confidence: integer("confidence", self.confidence.as_ref())?.unwrap_or(0),
            last_updated: date("date", self.date)?,
            evidence: present(self.evidence),
            story: present(self.story),
            tags: tags(self.tags.as_ref()),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct CheckInPayload {
    id: Option<String>,
    outcome_id: Option<String>,
    update_date: Option<String>,
    confidence_delta: Option<Value>,
    momentum: Option<String>,
    note: Option<String>,
    next_step: Option<String>,
}

impl CheckInPayload {
    pub(crate) fn into_checkin(self) -> Result<CheckIn, ApiError> {
        let outcome_id = outcome_ref(self.outcome_id)?;
        let momentum = match present(self.momentum) {
            Some(label) => Momentum::parse(&label)
                .ok_or_else(|| ApiError::InvalidBody(format!("unsupported momentum `{label}`")))?,
            None => Momentum::default(),
        };

        let mut checkin = CheckIn::new(
            outcome_id,
            integer("confidence_delta", self.confidence_delta.as_ref())?.unwrap_or(0),
            momentum,
        );
        checkin.id = record_id(self.id)?;
        checkin.update_date = date("update_date", self.update_date)?;
        checkin.note = present(self.note);
        checkin.next_step = present(self.next_step);
        Ok(checkin)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct StoryBeatPayload {
    id: Option<String>,
    outcome_id: Option<String>,
    audience: Option<String>,
    headline: Option<String>,
    proof_point: Option<String>,
    next_move: Option<String>,
    scheduled_date: Option<String>,
    owner: Option<String>,
}

impl StoryBeatPayload {
    pub(crate) fn into_story_beat(self) -> Result<StoryBeat, ApiError> {
        let outcome_id = outcome_ref(self.outcome_id)?;
        Ok(StoryBeat {
            id: record_id(self.id)?,
            outcome_id,
            audience: present(self.audience).map(Audience::from).unwrap_or_default(),
            headline: present(self.headline).unwrap_or_else(|| DEFAULT_HEADLINE.to_string()),
            proof_point: present(self.proof_point),
            next_move: present(self.next_move),
            scheduled_date: date("scheduled_date", self.scheduled_date)?,
            owner: present(self.owner),
            created_at: None,
            outcome_title: None,
            outcome_owner: None,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SourcePayload {
    id: Option<String>,
    outcome_id: Option<String>,
    source_name: Option<String>,
    source_type: Option<String>,
    last_verified: Option<String>,
    cadence_days: Option<Value>,
    owner: Option<String>,
    notes: Option<String>,
}

impl SourcePayload {
    pub(crate) fn into_source(self) -> Result<EvidenceSource, ApiError> {
        let outcome_id = outcome_ref(self.outcome_id)?;
        let cadence_days = match integer("cadence_days", self.cadence_days.as_ref())? {
            None | Some(0) => DEFAULT_VERIFY_CADENCE_DAYS,
            Some(days) if days > 0 => days,
            Some(days) => {
                return Err(ApiError::InvalidBody(format!(
                    "cadence_days must be positive, got {days}"
                )))
            }
        };

        Ok(EvidenceSource {
            id: record_id(self.id)?,
            outcome_id,
            source_name: present(self.source_name)
                .unwrap_or_else(|| DEFAULT_SOURCE_NAME.to_string()),
            source_type: present(self.source_type)
                .unwrap_or_else(|| DEFAULT_SOURCE_TYPE.to_string()),
            last_verified: date("last_verified", self.last_verified)?,
            cadence_days,
            owner: present(self.owner),
            notes: present(self.notes),
            created_at: None,
            outcome_title: None,
            outcome_owner: None,
        })
    }
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.is_empty())
}

/// Caller-supplied record id, or a fresh one.
fn record_id(value: Option<String>) -> Result<Uuid, ApiError> {
    match present(value) {
        Some(text) => Uuid::parse_str(text.trim())
            .map_err(|_| ApiError::InvalidBody(format!("invalid id `{text}`"))),
        None => Ok(Uuid::new_v4()),
    }
}

/// Parent outcome id of a linked write.
///
/// A value that is not a UUID cannot name a stored outcome.
fn outcome_ref(value: Option<String>) -> Result<OutcomeId, ApiError> {
    let text = present(value).ok_or(ApiError::MissingOutcomeId)?;
    Uuid::parse_str(text.trim()).map_err(|_| ApiError::OutcomeNotFound)
}

fn date(field: &str, value: Option<String>) -> Result<Option<NaiveDate>, ApiError> {
    match present(value) {
        Some(text) => parse_calendar_date(text.trim())
            .map(Some)
            .ok_or_else(|| ApiError::InvalidBody(format!("invalid {field} `{text}`"))),
        None => Ok(None),
    }
}

/// `None` for absent, `null`, `""` and `false`; the caller picks the default.
fn integer(field: &str, value: Option<&Value>) -> Result<Option<i32>, ApiError> {
    let invalid = || ApiError::InvalidBody(format!("invalid {field}"));
    let number = match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => return Ok(None),
        Some(Value::String(text)) if text.trim().is_empty() => return Ok(None),
        Some(Value::Number(number)) => number.as_i64().ok_or_else(invalid)?,
        Some(Value::String(text)) => text.trim().parse::<i64>().map_err(|_| invalid())?,
        Some(_) => return Err(invalid()),
    };
    i32::try_from(number).map(Some).map_err(|_| invalid())
}

/// Accepts an array of tags or one comma-separated string.
fn tags(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => {
            let raw: Vec<String> = items
                .iter()
                .filter_map(|item| match item {
                    Value::String(text) => Some(text.clone()),
                    Value::Number(number) => Some(number.to_string()),
                    _ => None,
                })
                .collect();
            normalize_tags(&raw)
        }
        Some(Value::String(text)) => parse_tag_list(text),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::{decode, CheckInPayload, OutcomePayload, SourcePayload};
    use crate::api::ApiError;
    use crate::model::checkin::Momentum;
    use crate::model::outcome::OutcomeStatus;

    #[test]
    fn empty_outcome_body_uses_defaults() {
        let outcome = decode::<OutcomePayload>(None)
            .unwrap()
            .into_outcome()
            .unwrap();
        assert_eq!(outcome.title, "Untitled outcome");
        assert_eq!(outcome.category, "Access");
        assert_eq!(outcome.status, OutcomeStatus::OnTrack);
        assert_eq!(outcome.confidence, 0);
        assert_eq!(outcome.last_updated, None);
        assert!(outcome.tags.is_empty());
    }

    #[test]
    fn outcome_accepts_form_style_values() {
        let body = r#"{"title":"","confidence":"76","date":"2026-02-02","tags":" a, b ,,a","status":"Watching"}"#;
        let outcome = decode::<OutcomePayload>(Some(body))
            .unwrap()
            .into_outcome()
            .unwrap();
        assert_eq!(outcome.title, "Untitled outcome");
        assert_eq!(outcome.confidence, 76);
        assert_eq!(outcome.status, OutcomeStatus::Watching);
        assert_eq!(outcome.tags, vec!["a", "b"]);

        let listed = decode::<OutcomePayload>(Some(r#"{"tags":[" x ", "", null, "y"]}"#))
            .unwrap()
            .into_outcome()
            .unwrap();
        assert_eq!(listed.tags, vec!["x", "y"]);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let bad_status = decode::<OutcomePayload>(Some(r#"{"status":"Done"}"#))
            .unwrap()
            .into_outcome()
            .unwrap_err();
        assert!(matches!(bad_status, ApiError::InvalidBody(_)));

        let bad_json = decode::<OutcomePayload>(Some("{oops")).unwrap_err();
        assert!(matches!(bad_json, ApiError::InvalidBody(_)));

        let bad_confidence = decode::<OutcomePayload>(Some(r#"{"confidence":7.5}"#))
            .unwrap()
            .into_outcome()
            .unwrap_err();
        assert!(matches!(bad_confidence, ApiError::InvalidBody(_)));
    }

    #[test]
    fn checkin_requires_outcome_id() {
        let missing = decode::<CheckInPayload>(Some(r#"{"outcome_id":""}"#))
            .unwrap()
            .into_checkin()
            .unwrap_err();
        assert_eq!(missing, ApiError::MissingOutcomeId);

        let body = r#"{"outcome_id":"3f1e7f2c-7fd2-4d98-9fa8-0d0b42751b1a","confidence_delta":-3}"#;
        let checkin = decode::<CheckInPayload>(Some(body))
            .unwrap()
            .into_checkin()
            .unwrap();
        assert_eq!(checkin.confidence_delta, -3);
        assert_eq!(checkin.momentum, Momentum::Steady);
        assert_eq!(checkin.update_date, None);
    }

    #[test]
    fn source_cadence_defaults_and_rejects_negatives() {
        let body = r#"{"outcome_id":"3f1e7f2c-7fd2-4d98-9fa8-0d0b42751b1a","cadence_days":0}"#;
        let source = decode::<SourcePayload>(Some(body))
            .unwrap()
            .into_source()
            .unwrap();
        assert_eq!(source.cadence_days, 30);
        assert_eq!(source.source_name, "Evidence source");
        assert_eq!(source.source_type, "Dashboard");

        let body = r#"{"outcome_id":"3f1e7f2c-7fd2-4d98-9fa8-0d0b42751b1a","cadence_days":-2}"#;
        assert!(decode::<SourcePayload>(Some(body))
            .unwrap()
            .into_source()
            .is_err());
    }
}
