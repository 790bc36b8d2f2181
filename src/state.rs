//! Session state: the current scope, filters, draft vote and record snapshot.
//!
//! [`AppState`] is the only mutable state in the crate. Queries run against a
//! [`StateView`], a cheap copy of the settings plus a shared handle on the snapshot,
//! so callers holding the state behind a lock can release it before computing.

use crate::aggregate::AggregatedEntry;
use crate::config::{Config, SearchConfig};
use crate::error::RatingError;
use crate::filter::FilterSettings;
use crate::location::{CriteriaSet, LocationType, Scope};
use crate::record::{MAX_RATING, RatingRecord};
use crate::search::{self, Suggestion};
use crate::vote::{self, VoteDraft, VoteError, VoteKey, VoteRules};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StateError {
    #[error("city must not be empty")]
    BlankCity,

    #[error("invalid filters: {0}")]
    InvalidFilters(String),

    #[error(transparent)]
    Vote(#[from] VoteError),
}

#[derive(Debug)]
pub struct AppState {
    city: String,
    location_type: LocationType,
    /// Every criterion of the current location type, 0 when unrated.
    draft_ratings: BTreeMap<String, u8>,
    filters: FilterSettings,
    snapshot: Arc<[RatingRecord]>,
    /// Bumped on every snapshot replacement.
    generation: u64,
    search: SearchConfig,
    vote_rules: VoteRules,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            city: config.default_city.clone(),
            location_type: config.default_location_type,
            draft_ratings: unrated(config.default_location_type),
            filters: config.filters,
            snapshot: Arc::from(Vec::new()),
            generation: 0,
            search: config.search,
            vote_rules: config.votes,
        }
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub const fn location_type(&self) -> LocationType {
        self.location_type
    }

    pub fn scope(&self) -> Scope {
        Scope::new(self.location_type, self.city.clone())
    }

    pub fn criteria(&self) -> &'static CriteriaSet {
        self.location_type.criteria()
    }

    pub const fn filters(&self) -> &FilterSettings {
        &self.filters
    }

    pub const fn vote_rules(&self) -> &VoteRules {
        &self.vote_rules
    }

    pub fn draft_ratings(&self) -> &BTreeMap<String, u8> {
        &self.draft_ratings
    }

    pub fn snapshot(&self) -> Arc<[RatingRecord]> {
        Arc::clone(&self.snapshot)
    }

    pub const fn generation(&self) -> u64 {
        self.generation
    }

    pub fn set_city(&mut self, city: &str) -> Result<(), StateError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(StateError::BlankCity);
        }
        if city != self.city {
            tracing::debug!(from = %self.city, to = city, "City changed");
            self.city = city.to_string();
        }
        Ok(())
    }

    /// Switch location type. The draft ratings are reset when the type changes.
    pub fn set_location_type(&mut self, location_type: LocationType) {
        if location_type != self.location_type {
            tracing::debug!(from = %self.location_type, to = %location_type, "Location type changed");
            self.location_type = location_type;
            self.draft_ratings = unrated(location_type);
        }
    }

    pub fn set_rating(&mut self, criterion: &str, value: u8) -> Result<(), StateError> {
        rate(&mut self.draft_ratings, criterion, value)
    }

    /// Set several ratings at once. Nothing changes when any of them is rejected.
    pub fn set_ratings(&mut self, ratings: &BTreeMap<String, u8>) -> Result<(), StateError> {
        let mut draft = self.draft_ratings.clone();
        for (criterion, &value) in ratings {
            rate(&mut draft, criterion, value)?;
        }
        self.draft_ratings = draft;
        Ok(())
    }

    pub fn clear_ratings(&mut self) {
        self.draft_ratings = unrated(self.location_type);
    }

    pub fn set_filters(&mut self, filters: FilterSettings) -> Result<(), StateError> {
        filters.validate().map_err(StateError::InvalidFilters)?;
        self.filters = filters;
        Ok(())
    }

    /// Install a new snapshot and return its generation.
    pub fn replace_snapshot(&mut self, records: Arc<[RatingRecord]>) -> u64 {
        self.snapshot = records;
        self.generation += 1;
        tracing::info!(
            generation = self.generation,
            records = self.snapshot.len(),
            "Snapshot replaced"
        );
        self.generation
    }

    /// A vote draft for the current scope, pre-filled with the draft ratings.
    pub fn vote_draft(&self) -> VoteDraft {
        self.draft_ratings.iter().fold(
            VoteDraft::new(self.location_type, self.city.clone()),
            |draft, (criterion, &value)| draft.with_rating(criterion.clone(), value),
        )
    }

    /// Settings and snapshot handle for running queries without holding the state.
    pub fn view(&self) -> StateView {
        StateView {
            scope: self.scope(),
            filters: self.filters,
            search: self.search,
            snapshot: self.snapshot(),
        }
    }

    pub fn listing(&self) -> Result<Vec<AggregatedEntry>, RatingError> {
        self.view().listing()
    }

    pub fn search(&self, query: &str) -> Result<Vec<AggregatedEntry>, RatingError> {
        self.view().search(query)
    }

    pub fn suggest(&self, query: &str) -> Vec<Suggestion> {
        self.view().suggest(query)
    }

    pub fn voted_keys(&self, submitter_id: &str) -> BTreeSet<VoteKey> {
        vote::voted_keys(&self.snapshot, submitter_id)
    }
}

fn rate(draft: &mut BTreeMap<String, u8>, criterion: &str, value: u8) -> Result<(), StateError> {
    let Some(slot) = draft.get_mut(criterion) else {
        return Err(VoteError::UnknownCriterion(criterion.to_string()).into());
    };
    if value > MAX_RATING {
        return Err(VoteError::InvalidRatingValue {
            criterion: criterion.to_string(),
            value,
        }
        .into());
    }
    *slot = value;
    Ok(())
}

fn unrated(location_type: LocationType) -> BTreeMap<String, u8> {
    location_type
        .criteria()
        .keys()
        .map(|k| (k.to_string(), 0))
        .collect()
}

/// Read-only copy of what a query needs.
#[derive(Debug, Clone)]
pub struct StateView {
    pub scope: Scope,
    pub filters: FilterSettings,
    pub search: SearchConfig,
    pub snapshot: Arc<[RatingRecord]>,
}

impl StateView {
    pub fn criteria(&self) -> &'static CriteriaSet {
        self.scope.location_type.criteria()
    }

    pub fn listing(&self) -> Result<Vec<AggregatedEntry>, RatingError> {
        search::listing(&self.snapshot, &self.scope, self.criteria(), &self.filters)
    }

    pub fn search(&self, query: &str) -> Result<Vec<AggregatedEntry>, RatingError> {
        search::search(
            query,
            &self.snapshot,
            &self.scope,
            self.criteria(),
            &self.filters,
            self.search.min_score,
        )
    }

    pub fn suggest(&self, query: &str) -> Vec<Suggestion> {
        search::suggest(
            query,
            &self.snapshot,
            &self.scope,
            self.search.suggestion_limit,
            self.search.suggestion_cutoff,
        )
    }
}
