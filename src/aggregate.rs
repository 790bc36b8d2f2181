//! Grouping of raw rating records into per-entity averages.

use crate::error::RatingError;
use crate::location::{CriteriaSet, LocationType};
use crate::record::RatingRecord;
use crate::vote::extract_specialty;
use serde::Serialize;
use std::collections::BTreeMap;

/// Per-entity view of all votes in a snapshot. Derived on every pass, never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedEntry {
    pub entity_name: String,
    pub city: String,
    pub location_type: LocationType,
    /// Votes for this entity in arrival order. Never empty.
    pub source_records: Vec<RatingRecord>,
    /// Criterion key to average, one decimal. Follows the criteria set's order.
    pub per_criterion_average: Vec<(String, f64)>,
    /// Mean of `per_criterion_average`, one decimal.
    pub overall_average: f64,
    /// Trailing `(specialty)` of a doctor's name.
    pub specialty: Option<String>,
}

impl AggregatedEntry {
    pub fn votes(&self) -> usize {
        self.source_records.len()
    }

    pub fn average(&self, criterion: &str) -> Option<f64> {
        self.per_criterion_average
            .iter()
            .find(|(key, _)| key == criterion)
            .map(|&(_, value)| value)
    }

    /// Votes that carry a written opinion, newest last.
    pub fn opinions(&self) -> impl Iterator<Item = &RatingRecord> {
        self.source_records
            .iter()
            .filter(|r| !r.opinion.trim().is_empty())
    }
}

/// Round to one decimal place, halves away from zero.
///
/// The rounding is applied to the binary value, so a mean that lands on a tie like
/// 4.35 may go either way depending on how it is represented.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Group `records` by (city, entity name) and average every criterion.
///
/// Criteria a record does not rate count as 0. Entries come out ordered by
/// (city, entity name), so any permutation of the same records gives the same
/// result; each entry's `source_records` keep their arrival order.
pub fn aggregate(
    records: &[RatingRecord],
    criteria: &CriteriaSet,
) -> Result<Vec<AggregatedEntry>, RatingError> {
    if criteria.is_empty() {
        return Err(RatingError::EmptyCriteria);
    }

    let mut groups: BTreeMap<(&str, &str), Vec<&RatingRecord>> = BTreeMap::new();
    for record in records {
        groups
            .entry((record.city.as_str(), record.entity_name.as_str()))
            .or_default()
            .push(record);
    }

    let entries: Vec<AggregatedEntry> = groups
        .into_values()
        .map(|group| build_entry(&group, criteria))
        .collect();

    tracing::debug!(
        records = records.len(),
        entries = entries.len(),
        criteria = criteria.len(),
        "Aggregated rating records"
    );

    Ok(entries)
}

fn build_entry(group: &[&RatingRecord], criteria: &CriteriaSet) -> AggregatedEntry {
    let first = group[0];
    let votes = group.len() as f64;

    let per_criterion_average: Vec<(String, f64)> = criteria
        .keys()
        .map(|key| {
            let sum: u32 = group.iter().map(|r| u32::from(r.rating(key))).sum();
            (key.to_string(), round1(f64::from(sum) / votes))
        })
        .collect();

    let overall_sum: f64 = per_criterion_average.iter().map(|&(_, v)| v).sum();
    let overall_average = round1(overall_sum / per_criterion_average.len() as f64);

    let specialty = if first.location_type.has_specialty() {
        extract_specialty(&first.entity_name)
    } else {
        None
    };

    AggregatedEntry {
        entity_name: first.entity_name.clone(),
        city: first.city.clone(),
        location_type: first.location_type,
        source_records: group.iter().map(|&r| r.clone()).collect(),
        per_criterion_average,
        overall_average,
        specialty,
    }
}
