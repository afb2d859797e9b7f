//! Local-first synchronization.
//!
//! # Responsibility
//! - Track sync status for display.
//! - Define the remote store contract.
//! - Run the commit-locally-then-reconcile session.

pub mod remote;
pub mod session;
pub mod status;

pub use remote::{RemoteStore, SyncError, SyncResult};
pub use session::{PendingRecord, SessionError, SyncSession};
pub use status::{SyncIndicator, SyncStatus};
