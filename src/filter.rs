//! Threshold filters and sort orders over aggregated entries.
//!
//! Every function here returns a new sequence and leaves its input untouched.

use crate::aggregate::AggregatedEntry;
use crate::record::MAX_RATING;
use crate::search::matcher::normalize;
use rmcp::schemars;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default number of entries shown per chart or page.
pub const DEFAULT_TOP_LIMIT: usize = 10;

/// Sort order for result listings.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    /// Highest overall average first
    #[default]
    RatingDesc,
    /// Lowest overall average first
    RatingAsc,
    /// Most votes first
    VotesDesc,
    /// Alphabetical by entity name
    NameAsc,
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::RatingDesc => "ratingDesc",
            Self::RatingAsc => "ratingAsc",
            Self::VotesDesc => "votesDesc",
            Self::NameAsc => "nameAsc",
        })
    }
}

/// The user's active listing thresholds and order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct FilterSettings {
    pub min_votes: usize,
    /// In 0.0..=5.0.
    pub min_rating: f64,
    pub sort_by: SortBy,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            min_votes: 0,
            min_rating: 0.0,
            sort_by: SortBy::RatingDesc,
        }
    }
}

impl FilterSettings {
    /// Rejects a minimum rating outside 0..=5.
    pub fn validate(&self) -> Result<(), String> {
        if (0.0..=f64::from(MAX_RATING)).contains(&self.min_rating) {
            Ok(())
        } else {
            Err(format!(
                "min_rating must be between 0 and {}, got {}",
                MAX_RATING, self.min_rating
            ))
        }
    }

    /// Filter then sort.
    pub fn apply(&self, entries: &[AggregatedEntry]) -> Vec<AggregatedEntry> {
        sort(&filter(entries, self.min_votes, self.min_rating), self.sort_by)
    }
}

/// Keep entries with at least `min_votes` votes and an overall average of at least `min_rating`.
pub fn filter(entries: &[AggregatedEntry], min_votes: usize, min_rating: f64) -> Vec<AggregatedEntry> {
    entries
        .iter()
        .filter(|e| e.votes() >= min_votes && e.overall_average >= min_rating)
        .cloned()
        .collect()
}

/// Stable sort on the key named by `sort_by`; ties keep their input order.
pub fn sort(entries: &[AggregatedEntry], sort_by: SortBy) -> Vec<AggregatedEntry> {
    let mut sorted = entries.to_vec();
    match sort_by {
        SortBy::RatingDesc => {
            sorted.sort_by(|a, b| b.overall_average.total_cmp(&a.overall_average));
        }
        SortBy::RatingAsc => {
            sorted.sort_by(|a, b| a.overall_average.total_cmp(&b.overall_average));
        }
        SortBy::VotesDesc => sorted.sort_by_key(|e| std::cmp::Reverse(e.votes())),
        SortBy::NameAsc => {
            sorted.sort_by_cached_key(|e| (normalize(&e.entity_name), e.entity_name.clone()));
        }
    }
    sorted
}

/// Highest-rated entries, for the ranking chart.
pub fn top_by_rating(entries: &[AggregatedEntry], limit: usize) -> Vec<AggregatedEntry> {
    let mut top = sort(entries, SortBy::RatingDesc);
    top.truncate(limit);
    top
}

/// Most-voted entries, for the activity chart.
pub fn top_by_votes(entries: &[AggregatedEntry], limit: usize) -> Vec<AggregatedEntry> {
    let mut top = sort(entries, SortBy::VotesDesc);
    top.truncate(limit);
    top
}

/// The `page_index`-th page of `per_page` entries, counting from 0; past the end yields
/// an empty slice.
///
/// The `list_entries` tool numbers pages from 1 and subtracts one before calling this.
pub fn paginate(entries: &[AggregatedEntry], page_index: usize, per_page: usize) -> &[AggregatedEntry] {
    let start = page_index.saturating_mul(per_page).min(entries.len());
    let end = start.saturating_add(per_page).min(entries.len());
    &entries[start..end]
}
