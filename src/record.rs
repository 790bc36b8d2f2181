//! Rating records as they arrive from the record source.

use crate::error::RatingError;
use crate::location::{DEFAULT_CITY, LocationType, Scope};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Highest score a criterion can receive.
pub const MAX_RATING: u8 = 5;

/// One user's vote for one entity.
///
/// Field names on the wire follow the stored rating documents: the entity name is
/// `neighborhood` for every location type, and the submitter is `userId`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRecord {
    #[serde(default = "default_city")]
    pub city: String,
    #[serde(rename = "neighborhood", alias = "entityName")]
    pub entity_name: String,
    #[serde(default)]
    pub location_type: LocationType,
    /// Raw values as submitted; see [`RatingRecord::rating`] for the sanitized view.
    #[serde(default, deserialize_with = "lenient_ratings")]
    pub ratings: BTreeMap<String, f64>,
    #[serde(default)]
    pub opinion: String,
    #[serde(rename = "userId", alias = "submitterId", default)]
    pub submitter_id: String,
    #[serde(default)]
    pub timestamp: String,
}

fn default_city() -> String {
    DEFAULT_CITY.to_string()
}

/// Stored documents may carry `"ratings": null` or non-numeric values.
///
/// A null map reads as empty. A value that is not a JSON number is kept as NaN, so
/// [`RatingRecord::rating`] reads it as 0 and [`RatingRecord::validate_ratings`] rejects it.
fn lenient_ratings<'de, D>(deserializer: D) -> Result<BTreeMap<String, f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(criterion, value)| (criterion, value.as_f64().unwrap_or(f64::NAN)))
        .collect())
}

impl RatingRecord {
    pub fn new(
        location_type: LocationType,
        city: impl Into<String>,
        entity_name: impl Into<String>,
    ) -> Self {
        Self {
            city: city.into(),
            entity_name: entity_name.into(),
            location_type,
            ratings: BTreeMap::new(),
            opinion: String::new(),
            submitter_id: String::new(),
            timestamp: String::new(),
        }
    }

    pub fn with_rating(mut self, criterion: impl Into<String>, value: impl Into<f64>) -> Self {
        self.ratings.insert(criterion.into(), value.into());
        self
    }

    pub fn with_ratings<K: Into<String>>(mut self, ratings: impl IntoIterator<Item = (K, u8)>) -> Self {
        self.ratings
            .extend(ratings.into_iter().map(|(k, v)| (k.into(), f64::from(v))));
        self
    }

    pub fn with_opinion(mut self, opinion: impl Into<String>) -> Self {
        self.opinion = opinion.into();
        self
    }

    pub fn with_submitter(mut self, submitter_id: impl Into<String>) -> Self {
        self.submitter_id = submitter_id.into();
        self
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    /// Sanitized rating for `criterion`.
    ///
    /// Missing criteria and values that are not integers in 0..=5 read as 0.
    pub fn rating(&self, criterion: &str) -> u8 {
        match self.ratings.get(criterion) {
            None => 0,
            Some(&value) => sanitize_rating(value).unwrap_or_else(|| {
                tracing::debug!(
                    entity = %self.entity_name,
                    criterion,
                    value,
                    "Out-of-range rating treated as 0"
                );
                0
            }),
        }
    }

    /// Strict check of every stored rating value.
    pub fn validate_ratings(&self) -> Result<(), RatingError> {
        match self
            .ratings
            .iter()
            .find(|&(_, &value)| sanitize_rating(value).is_none())
        {
            Some((criterion, &value)) => Err(RatingError::InvalidRatingValue {
                criterion: criterion.clone(),
                value,
            }),
            None => Ok(()),
        }
    }

    pub fn in_scope(&self, scope: &Scope) -> bool {
        self.location_type == scope.location_type && self.city == scope.city
    }
}

/// Accepts integers in 0..=5, rejects anything else (fractions, negatives, NaN).
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn sanitize_rating(value: f64) -> Option<u8> {
    if value.fract() == 0.0 && (0.0..=f64::from(MAX_RATING)).contains(&value) {
        Some(value as u8)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_stored_document_shape() {
        let json = r#"{
            "city": "Пловдив",
            "neighborhood": "Кършияка",
            "locationType": "neighborhood",
            "ratings": {"safety": 4, "transport": 3},
            "opinion": "Тихо място",
            "userId": "u1",
            "timestamp": "2024-05-01T10:00:00.000Z"
        }"#;
        let record: RatingRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.city, "Пловдив");
        assert_eq!(record.entity_name, "Кършияка");
        assert_eq!(record.submitter_id, "u1");
        assert_eq!(record.rating("safety"), 4);
    }

    #[test]
    fn missing_city_and_type_use_defaults() {
        let record: RatingRecord =
            serde_json::from_str(r#"{"neighborhood": "Лозенец", "ratings": {}}"#).unwrap();
        assert_eq!(record.city, DEFAULT_CITY);
        assert_eq!(record.location_type, LocationType::Neighborhood);
        assert!(record.opinion.is_empty());
    }

    #[test]
    fn out_of_range_values_read_as_zero() {
        let record = RatingRecord::new(LocationType::Doctors, "София", "Д-р Иванов (Кардиолог)")
            .with_rating("overall", 7)
            .with_rating("other", 2.5)
            .with_rating("neg", -1);
        assert_eq!(record.rating("overall"), 0);
        assert_eq!(record.rating("other"), 0);
        assert_eq!(record.rating("neg"), 0);
        assert_eq!(record.rating("absent"), 0);
        assert!(matches!(
            record.validate_ratings(),
            Err(RatingError::InvalidRatingValue { .. })
        ));
    }

    #[test]
    fn non_numeric_values_read_as_zero_and_fail_validation() {
        let record: RatingRecord = serde_json::from_str(
            r#"{"neighborhood": "Лозенец", "ratings": {"safety": 4, "noise": null, "transport": "3"}}"#,
        )
        .unwrap();
        assert_eq!(record.rating("safety"), 4);
        assert_eq!(record.rating("noise"), 0);
        assert_eq!(record.rating("transport"), 0);
        assert!(matches!(
            record.validate_ratings(),
            Err(RatingError::InvalidRatingValue { criterion, .. }) if criterion == "noise"
        ));

        let record: RatingRecord =
            serde_json::from_str(r#"{"neighborhood": "Лозенец", "ratings": null}"#).unwrap();
        assert!(record.ratings.is_empty());
        assert!(record.validate_ratings().is_ok());
    }

    #[test]
    fn sanitize_accepts_only_integers_in_range() {
        assert_eq!(sanitize_rating(0.0), Some(0));
        assert_eq!(sanitize_rating(5.0), Some(5));
        assert_eq!(sanitize_rating(5.5), None);
        assert_eq!(sanitize_rating(f64::NAN), None);
    }
}
