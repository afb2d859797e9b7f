//! Search, category/status filters and sort order for the outcome list.

use crate::model::outcome::{Outcome, OutcomeStatus};
use std::cmp::Reverse;
use std::str::FromStr;

/// Selector value that disables a category or status filter.
pub const ALL_SELECTOR: &str = "all";

/// Sort key for the visible outcome list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Highest confidence first.
    #[default]
    Confidence,
    /// Most recently updated first; undated outcomes last.
    Recency,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "confidence" => Ok(Self::Confidence),
            "recency" | "date" | "recent" => Ok(Self::Recency),
            other => Err(format!(
                "unsupported sort key `{other}`; expected confidence|recency"
            )),
        }
    }
}

/// Filter selection as entered by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutcomeFilter {
    pub search: String,
    /// Exact category match; `None` means all categories.
    pub category: Option<String>,
    /// Exact status label match; `None` means all statuses.
    pub status: Option<String>,
    pub sort: SortKey,
}

impl OutcomeFilter {
    /// Builds a filter from raw selector values, where `"all"` disables a
    /// category or status filter.
    pub fn from_selectors(search: &str, category: &str, status: &str, sort: SortKey) -> Self {
        Self {
            search: search.to_string(),
            category: selector(category),
            status: selector(status),
            sort,
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_status(mut self, status: OutcomeStatus) -> Self {
        self.status = Some(status.as_str().to_string());
        self
    }

    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    pub fn matches(&self, outcome: &Outcome) -> bool {
        let needle = self.search.to_lowercase();
        let haystack = [
            outcome.title.as_str(),
            outcome.owner.as_str(),
            outcome.metric.as_str(),
            outcome.story.as_deref().unwrap_or(""),
        ]
        .join(" ")
        .to_lowercase();

        let category_ok = self
            .category
            .as_deref()
            .map_or(true, |category| outcome.category == category);
        let status_ok = self
            .status
            .as_deref()
            .map_or(true, |status| outcome.status.as_str() == status);

        haystack.contains(&needle) && category_ok && status_ok
    }
}

fn selector(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(ALL_SELECTOR) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Returns matching outcomes in display order; the input is left untouched.
///
/// Both sorts are stable, so ties keep their input order.
pub fn filter_outcomes(outcomes: &[Outcome], filter: &OutcomeFilter) -> Vec<Outcome> {
    let mut visible: Vec<Outcome> = outcomes
        .iter()
        .filter(|outcome| filter.matches(outcome))
        .cloned()
        .collect();

    match filter.sort {
        SortKey::Confidence => visible.sort_by_key(|outcome| Reverse(outcome.confidence)),
        // `None < Some(_)`, so reversing puts undated outcomes last.
        SortKey::Recency => visible.sort_by_key(|outcome| Reverse(outcome.last_updated)),
    }
    visible
}
