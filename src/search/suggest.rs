//! "Did you mean" suggestions for queries that found nothing.

use super::matcher::normalize;
use crate::location::Scope;
use crate::record::RatingRecord;
use rapidfuzz::distance::jaro_winkler;
use std::collections::BTreeSet;

/// Number of suggestions offered below the search box.
pub const DEFAULT_SUGGESTION_LIMIT: usize = 5;

/// Suggestions must be more similar than this.
pub const DEFAULT_SUGGESTION_CUTOFF: f64 = 0.7;

/// An entity name offered in place of the user's query.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub entity_name: String,
    pub score: f64,
}

/// Distinct entity names in `scope` ranked by Jaro-Winkler similarity to `query`.
///
/// Both sides are normalized first. Ties are ordered by name.
pub fn suggest(
    query: &str,
    records: &[RatingRecord],
    scope: &Scope,
    limit: usize,
    cutoff: f64,
) -> Vec<Suggestion> {
    let query = normalize(query);
    if query.is_empty() {
        return vec![];
    }

    let names: BTreeSet<&str> = records
        .iter()
        .filter(|r| r.in_scope(scope))
        .map(|r| r.entity_name.as_str())
        .collect();

    let mut suggestions: Vec<Suggestion> = names
        .into_iter()
        .filter_map(|name| {
            let score = jaro_winkler::similarity(query.chars(), normalize(name).chars());
            (score > cutoff).then(|| Suggestion {
                entity_name: name.to_string(),
                score,
            })
        })
        .collect();

    suggestions.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.entity_name.cmp(&b.entity_name))
    });
    suggestions.truncate(limit);
    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::LocationType;

    fn records() -> Vec<RatingRecord> {
        ["Лозенец", "Люлин", "Младост", "Младост 2", "Дружба", "Лозенец"]
            .into_iter()
            .map(|name| RatingRecord::new(LocationType::Neighborhood, "София", name))
            .chain(std::iter::once(RatingRecord::new(
                LocationType::Neighborhood,
                "Варна",
                "Младост",
            )))
            .collect()
    }

    fn scope() -> Scope {
        Scope::new(LocationType::Neighborhood, "София")
    }

    #[test]
    fn close_misspelling_is_suggested_first() {
        let suggestions = suggest("младст", &records(), &scope(), 5, DEFAULT_SUGGESTION_CUTOFF);
        assert!(!suggestions.is_empty());
        assert_eq!(suggestions[0].entity_name, "Младост");
    }

    #[test]
    fn names_are_distinct_and_limited() {
        let suggestions = suggest("лозенец", &records(), &scope(), 1, 0.0);
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].entity_name, "Лозенец");
        assert!((suggestions[0].score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn blank_query_suggests_nothing() {
        assert!(suggest("  ", &records(), &scope(), 5, 0.0).is_empty());
    }

    #[test]
    fn unrelated_query_falls_below_cutoff() {
        assert!(suggest("zzzzzz", &records(), &scope(), 5, DEFAULT_SUGGESTION_CUTOFF).is_empty());
    }
}
