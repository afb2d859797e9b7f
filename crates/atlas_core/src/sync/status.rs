//! Sync status indicator shown next to the dashboard.

use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncStatus {
    /// Working from the local cache only.
    #[default]
    Local,
    Syncing,
    /// Remote store reachable and in use.
    Live,
    /// Last remote operation failed; local data stays authoritative.
    Error,
}

impl SyncStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Local => "Local only",
            Self::Syncing => "Syncing",
            Self::Live => "Cloud sync active",
            Self::Error => "Sync unavailable",
        }
    }
}

/// Status plus an optional short detail such as `3 in cloud`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncIndicator {
    pub status: SyncStatus,
    pub detail: Option<String>,
}

impl SyncIndicator {
    pub fn new(status: SyncStatus, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self {
            status,
            detail: (!detail.is_empty()).then_some(detail),
        }
    }

    /// `<label>` or `<label> · <detail>`.
    pub fn label(&self) -> String {
        match &self.detail {
            Some(detail) => format!("{} · {detail}", self.status.label()),
            None => self.status.label().to_string(),
        }
    }
}

impl Display for SyncIndicator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Sync: {}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::{SyncIndicator, SyncStatus};

    #[test]
    fn labels_with_and_without_detail() {
        assert_eq!(SyncIndicator::default().label(), "Local only");
        assert_eq!(
            SyncIndicator::new(SyncStatus::Live, "4 in cloud").label(),
            "Cloud sync active · 4 in cloud"
        );
        assert_eq!(
            SyncIndicator::new(SyncStatus::Error, "saved locally").to_string(),
            "Sync: Sync unavailable · saved locally"
        );
        assert_eq!(SyncIndicator::new(SyncStatus::Syncing, "").detail, None);
    }
}
