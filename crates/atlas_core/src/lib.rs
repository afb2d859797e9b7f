//! Core domain logic for Outcome Atlas.
//! This crate is the single source of truth for business invariants.

pub mod api;
pub mod cache;
pub mod config;
pub mod db;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;
pub mod state;
pub mod sync;

pub use api::remote::EndpointRemote;
pub use api::{ApiRequest, ApiResponse, AtlasApi, Method, Resource};
pub use cache::{export_outcomes, load_state, save_state, CacheError, CacheOrigin};
pub use config::{AtlasConfig, ConfigError};
pub use db::{open_db, open_db_in_memory, DbError};
pub use logging::{
    default_log_level, init_logging, init_logging_from_config, logging_status, LogError,
};
pub use metrics::filter::{OutcomeFilter, SortKey};
pub use metrics::{build_dashboard, Dashboard};
pub use model::checkin::{CheckIn, Momentum};
pub use model::outcome::{Outcome, OutcomeId, OutcomeStatus};
pub use model::source::EvidenceSource;
pub use model::story_beat::{Audience, StoryBeat};
pub use repo::outcome_repo::{RepoError, RepoResult};
pub use service::atlas_service::{AtlasService, ServiceError};
pub use state::AtlasState;
pub use sync::{RemoteStore, SyncIndicator, SyncSession, SyncStatus};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
