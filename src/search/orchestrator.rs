//! Free-text search over the scoped snapshot.
//!
//! Matching only selects which entities take part; the returned order always comes
//! from the caller's sort setting, never from match quality.

use super::matcher::{SearchMatch, normalize, score};
use crate::aggregate::{AggregatedEntry, aggregate};
use crate::error::RatingError;
use crate::filter::FilterSettings;
use crate::location::{CriteriaSet, Scope};
use crate::record::RatingRecord;
use std::collections::BTreeMap;

/// Records scoring at or below this are not considered a match.
pub const DEFAULT_MIN_SCORE: f64 = 0.3;

/// Aggregate, filter and sort every record in `scope`: the listing shown when no search is active.
pub fn listing(
    records: &[RatingRecord],
    scope: &Scope,
    criteria: &CriteriaSet,
    settings: &FilterSettings,
) -> Result<Vec<AggregatedEntry>, RatingError> {
    let scoped: Vec<RatingRecord> = records
        .iter()
        .filter(|r| r.in_scope(scope))
        .cloned()
        .collect();
    let entries = aggregate(&scoped, criteria)?;
    Ok(settings.apply(&entries))
}

/// Entity names in `scope` whose normalized form scores above `min_score` against the query.
///
/// One match per distinct name, best score first.
pub fn match_names(
    query: &str,
    records: &[RatingRecord],
    scope: &Scope,
    min_score: f64,
) -> Vec<SearchMatch> {
    let normalized_query = normalize(query);
    let mut scores: BTreeMap<&str, f64> = BTreeMap::new();

    for record in records.iter().filter(|r| r.in_scope(scope)) {
        if scores.contains_key(record.entity_name.as_str()) {
            continue;
        }
        let similarity = score(&normalized_query, &normalize(&record.entity_name));
        scores.insert(&record.entity_name, similarity);
    }

    let mut matches: Vec<SearchMatch> = scores
        .into_iter()
        .filter(|&(_, s)| s > min_score)
        .map(|(name, s)| SearchMatch {
            entity_name: name.to_string(),
            score: s,
        })
        .collect();
    matches.sort_by(|a, b| b.score.total_cmp(&a.score));
    matches
}

/// Answer a free-text query against the scoped records.
///
/// A blank query falls back to [`listing`]. Otherwise every record whose entity name
/// scores above `min_score` takes part in aggregation, then `settings` filter and sort
/// the result. No match gives an empty result, not an error.
pub fn search(
    query: &str,
    records: &[RatingRecord],
    scope: &Scope,
    criteria: &CriteriaSet,
    settings: &FilterSettings,
    min_score: f64,
) -> Result<Vec<AggregatedEntry>, RatingError> {
    if query.trim().is_empty() {
        return listing(records, scope, criteria, settings);
    }
    if criteria.is_empty() {
        return Err(RatingError::EmptyCriteria);
    }

    let matches = match_names(query, records, scope, min_score);
    let matched: Vec<RatingRecord> = records
        .iter()
        .filter(|r| {
            r.in_scope(scope)
                && matches
                    .iter()
                    .any(|m| m.entity_name == r.entity_name)
        })
        .cloned()
        .collect();

    tracing::debug!(
        query,
        city = %scope.city,
        location_type = %scope.location_type,
        matched_names = matches.len(),
        matched_records = matched.len(),
        "Search matched records"
    );

    let entries = aggregate(&matched, criteria)?;
    Ok(settings.apply(&entries))
}
