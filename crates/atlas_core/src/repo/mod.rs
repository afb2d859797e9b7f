//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/business orchestration.
//!
//! # Invariants
//! - Outcome writes must pass `Outcome::validate()` before persistence.
//! - Linked-record writes fail with `RepoError::NotFound` when the parent
//!   outcome is missing, before any row is written.

pub mod checkin_repo;
pub mod outcome_repo;
pub mod source_repo;
pub mod story_beat_repo;
