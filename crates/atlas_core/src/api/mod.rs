//! Transport-agnostic endpoint handlers.
//!
//! # Responsibility
//! - Serve `GET`/`POST` for outcomes, check-ins, story beats and sources
//!   over the SQLite store: method and optional JSON body in, status and
//!   JSON body out.
//! - Map validation and storage failures to the stable error bodies.
//!
//! # Invariants
//! - A missing configuration answers 500 before the method is inspected.
//! - Linked writes are validated (outcome id present and known) before any
//!   row is written.

mod payload;
pub mod remote;

use crate::config::{AtlasConfig, ConfigError};
use crate::db::{open_db, DbError};
use crate::repo::checkin_repo::{CheckInRepository, SqliteCheckInRepository};
use crate::repo::outcome_repo::{OutcomeRepository, RepoError, SqliteOutcomeRepository};
use crate::repo::source_repo::{SourceRepository, SqliteSourceRepository};
use crate::repo::story_beat_repo::{SqliteStoryBeatRepository, StoryBeatRepository};
use log::{info, warn};
use payload::{decode, CheckInPayload, OutcomePayload, SourcePayload, StoryBeatPayload};
use rusqlite::Connection;
use serde::Serialize;
use serde_json::{json, Value};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Other(String),
}

impl Method {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            other => Self::Other(other.to_string()),
        }
    }

    fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Other(value) => value.as_str(),
        }
    }
}

/// Endpoint collection addressed by a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Outcomes,
    CheckIns,
    StoryBeats,
    Sources,
}

impl Resource {
    /// Matches `/outcomes`, `/api/outcomes` and the other collections,
    /// ignoring a trailing slash or query string.
    pub fn route(path: &str) -> Option<Self> {
        let path = path.split('?').next().unwrap_or_default();
        let path = path.trim_end_matches('/');
        let name = path.strip_prefix("/api").unwrap_or(path);
        match name {
            "/outcomes" => Some(Self::Outcomes),
            "/checkins" => Some(Self::CheckIns),
            "/storybeats" => Some(Self::StoryBeats),
            "/sources" => Some(Self::Sources),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Outcomes => "outcomes",
            Self::CheckIns => "checkins",
            Self::StoryBeats => "storybeats",
            Self::Sources => "sources",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn get() -> Self {
        Self {
            method: Method::Get,
            body: None,
        }
    }

    pub fn post(body: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            body: Some(body.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// `error` field of a failure body.
    pub fn error_message(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }
}

/// Handler failure, mapped onto the stable error bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    NotConfigured(Vec<String>),
    MethodNotAllowed,
    NotFound,
    MissingOutcomeId,
    OutcomeNotFound,
    InvalidBody(String),
    Storage(String),
}

impl ApiError {
    fn into_response(self) -> ApiResponse {
        let (status, body) = match self {
            Self::NotConfigured(missing) => (
                500,
                json!({ "error": "Database not configured", "missing": missing }),
            ),
            Self::MethodNotAllowed => (405, json!({ "error": "Method not allowed" })),
            Self::NotFound => (404, json!({ "error": "Not found" })),
            Self::MissingOutcomeId => (400, json!({ "error": "Outcome id is required" })),
            Self::OutcomeNotFound => (400, json!({ "error": "Outcome not found" })),
            Self::InvalidBody(detail) => (
                400,
                json!({ "error": "Invalid request body", "detail": detail }),
            ),
            Self::Storage(detail) => (500, json!({ "error": "Server error", "detail": detail })),
        };
        ApiResponse { status, body }
    }
}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(_) => Self::OutcomeNotFound,
            RepoError::Validation(err) => Self::InvalidBody(err.to_string()),
            other => Self::Storage(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        Self::Storage(value.to_string())
    }
}

enum Backend {
    Ready(Connection),
    Unconfigured(Vec<String>),
}

/// Endpoint handlers bound to one SQLite connection.
pub struct AtlasApi {
    backend: Backend,
}

impl AtlasApi {
    pub fn new(conn: Connection) -> Self {
        Self {
            backend: Backend::Ready(conn),
        }
    }

    /// Handlers that answer every request with the not-configured error.
    pub fn unconfigured(missing: Vec<String>) -> Self {
        Self {
            backend: Backend::Unconfigured(missing),
        }
    }

    /// Opens the configured database, or stays unconfigured when required
    /// variables are missing.
    pub fn from_config(config: Result<AtlasConfig, ConfigError>) -> Result<Self, DbError> {
        match config {
            Ok(config) => Ok(Self::new(open_db(&config.db_path)?)),
            Err(ConfigError::Missing(missing)) => Ok(Self::unconfigured(missing)),
        }
    }

    /// Routes by path; unknown paths answer 404.
    pub fn handle_path(&self, path: &str, request: &ApiRequest) -> ApiResponse {
        match Resource::route(path) {
            Some(resource) => self.handle(resource, request),
            None => ApiError::NotFound.into_response(),
        }
    }

    pub fn handle(&self, resource: Resource, request: &ApiRequest) -> ApiResponse {
        let started_at = Instant::now();
        let response = match self.dispatch(resource, request) {
            Ok(response) => response,
            Err(err) => err.into_response(),
        };

        let elapsed = started_at.elapsed().as_millis();
        if response.status >= 500 {
            warn!(
                "event=api_request module=api status=error resource={} method={} code={} duration_ms={elapsed}",
                resource.as_str(),
                request.method.as_str(),
                response.status
            );
        } else {
            info!(
                "event=api_request module=api status=ok resource={} method={} code={} duration_ms={elapsed}",
                resource.as_str(),
                request.method.as_str(),
                response.status
            );
        }
        response
    }

    fn dispatch(&self, resource: Resource, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let conn = match &self.backend {
            Backend::Ready(conn) => conn,
            Backend::Unconfigured(missing) => return Err(ApiError::NotConfigured(missing.clone())),
        };
        let body = request.body.as_deref();

        match (&request.method, resource) {
            (Method::Get, Resource::Outcomes) => {
                let outcomes = SqliteOutcomeRepository::new(conn).list_outcomes()?;
                wrap("outcomes", &outcomes)
            }
            (Method::Post, Resource::Outcomes) => {
                let outcome = decode::<OutcomePayload>(body)?.into_outcome()?;
                let stored = SqliteOutcomeRepository::new(conn).upsert_outcome(&outcome)?;
                wrap("outcome", &stored)
            }
            (Method::Get, Resource::CheckIns) => {
                let checkins = SqliteCheckInRepository::new(conn).list_checkins()?;
                wrap("checkins", &checkins)
            }
            (Method::Post, Resource::CheckIns) => {
                let checkin = decode::<CheckInPayload>(body)?.into_checkin()?;
                let stored = SqliteCheckInRepository::new(conn).upsert_checkin(&checkin)?;
                wrap("checkin", &stored)
            }
            (Method::Get, Resource::StoryBeats) => {
                let beats = SqliteStoryBeatRepository::new(conn).list_story_beats()?;
                wrap("storybeats", &beats)
            }
            (Method::Post, Resource::StoryBeats) => {
                let beat = decode::<StoryBeatPayload>(body)?.into_story_beat()?;
                let stored = SqliteStoryBeatRepository::new(conn).upsert_story_beat(&beat)?;
                wrap("storybeat", &stored)
            }
            (Method::Get, Resource::Sources) => {
                let sources = SqliteSourceRepository::new(conn).list_sources()?;
                wrap("sources", &sources)
            }
            (Method::Post, Resource::Sources) => {
                let source = decode::<SourcePayload>(body)?.into_source()?;
                let stored = SqliteSourceRepository::new(conn).upsert_source(&source)?;
                wrap("source", &stored)
            }
            (Method::Other(_), _) => Err(ApiError::MethodNotAllowed),
        }
    }
}

fn wrap<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<ApiResponse, ApiError> {
    let mut body = serde_json::Map::new();
    body.insert(key.to_string(), serde_json::to_value(value)?);
    Ok(ApiResponse::ok(Value::Object(body)))
}
