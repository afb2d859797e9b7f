//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep CLI and endpoint layers decoupled from storage details.

pub mod atlas_service;
