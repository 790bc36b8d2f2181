//! Vote drafts: validation before submission, entity naming and duplicate-vote keys.

use crate::location::{LocationType, RequiredField};
use crate::record::{MAX_RATING, RatingRecord};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::LazyLock;

/// Trailing `(specialty)` in a doctor's entity name.
static SPECIALTY_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^)]+)\)$").expect("specialty pattern is valid"));

/// Why a vote draft cannot be submitted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoteError {
    #[error("missing required field '{0}'")]
    MissingField(RequiredField),

    #[error("unknown criterion '{0}' for this location type")]
    UnknownCriterion(String),

    #[error("rating {value} for '{criterion}' is out of range (0-{max})", max = MAX_RATING)]
    InvalidRatingValue { criterion: String, value: u8 },

    #[error("rate all {expected} criteria or none of them ({rated} rated)")]
    PartialRatings { rated: usize, expected: usize },

    #[error("rate the criteria or write an opinion")]
    NothingToSubmit,

    #[error("opinion must be at least {min} characters")]
    OpinionTooShort { min: usize },

    #[error("opinion must be at most {max} characters")]
    OpinionTooLong { max: usize },

    #[error("already voted for {0}")]
    AlreadyVoted(VoteKey),
}

/// Limits applied to a draft before it is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoteRules {
    /// Applies when the opinion is the only content of the vote.
    pub min_opinion_len: usize,
    pub max_opinion_len: usize,
    pub allow_partial_ratings: bool,
}

impl Default for VoteRules {
    fn default() -> Self {
        Self {
            min_opinion_len: 10,
            max_opinion_len: 500,
            allow_partial_ratings: false,
        }
    }
}

/// A vote being filled in. Ratings of 0 mean "not rated".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VoteDraft {
    pub location_type: LocationType,
    pub city: String,
    pub fields: BTreeMap<RequiredField, String>,
    pub ratings: BTreeMap<String, u8>,
    pub opinion: String,
}

impl VoteDraft {
    pub fn new(location_type: LocationType, city: impl Into<String>) -> Self {
        Self {
            location_type,
            city: city.into(),
            ..Self::default()
        }
    }

    pub fn with_field(mut self, field: RequiredField, value: impl Into<String>) -> Self {
        self.fields.insert(field, value.into());
        self
    }

    pub fn with_rating(mut self, criterion: impl Into<String>, value: u8) -> Self {
        self.ratings.insert(criterion.into(), value);
        self
    }

    pub fn with_opinion(mut self, opinion: impl Into<String>) -> Self {
        self.opinion = opinion.into();
        self
    }

    fn field(&self, field: RequiredField) -> &str {
        self.fields.get(&field).map_or("", |v| v.trim())
    }

    /// Name the vote is stored under.
    ///
    /// Doctors are stored as `"Name (Specialty)"` so the specialty survives in the record.
    pub fn entity_name(&self) -> String {
        match self.location_type {
            LocationType::Neighborhood | LocationType::Childcare => {
                self.field(RequiredField::Place).to_string()
            }
            LocationType::Doctors => format!(
                "{} ({})",
                self.field(RequiredField::DoctorName),
                self.field(RequiredField::Specialty)
            ),
            LocationType::Dentists => self.field(RequiredField::DoctorName).to_string(),
            LocationType::Shops => self.field(RequiredField::ShopName).to_string(),
        }
    }

    /// Check the draft against the location type's form and `rules`.
    pub fn validate(&self, rules: &VoteRules) -> Result<(), VoteError> {
        if let Some(&missing) = self
            .location_type
            .required_fields()
            .iter()
            .find(|&&f| self.field(f).is_empty())
        {
            return Err(VoteError::MissingField(missing));
        }

        let criteria = self.location_type.criteria();
        for (criterion, &value) in &self.ratings {
            if !criteria.contains(criterion) {
                return Err(VoteError::UnknownCriterion(criterion.clone()));
            }
            if value > MAX_RATING {
                return Err(VoteError::InvalidRatingValue {
                    criterion: criterion.clone(),
                    value,
                });
            }
        }

        let rated = self.ratings.values().filter(|&&v| v > 0).count();
        let expected = criteria.len();
        if rated != 0 && rated != expected && !rules.allow_partial_ratings {
            return Err(VoteError::PartialRatings { rated, expected });
        }

        let opinion_len = self.opinion.trim().chars().count();
        if rated == 0 {
            if opinion_len == 0 {
                return Err(VoteError::NothingToSubmit);
            }
            if opinion_len < rules.min_opinion_len {
                return Err(VoteError::OpinionTooShort {
                    min: rules.min_opinion_len,
                });
            }
        }
        if opinion_len > rules.max_opinion_len {
            return Err(VoteError::OpinionTooLong {
                max: rules.max_opinion_len,
            });
        }

        Ok(())
    }

    /// Validate against `rules` and the submitter's previous votes, then build the record.
    ///
    /// Every criterion of the location type is written, unrated ones as 0.
    pub fn into_record(
        self,
        rules: &VoteRules,
        submitter_id: &str,
        already_voted: &BTreeSet<VoteKey>,
        timestamp: impl Into<String>,
    ) -> Result<RatingRecord, VoteError> {
        self.validate(rules)?;

        let entity_name = self.entity_name();
        let key = VoteKey::new(self.location_type, &self.city, &entity_name);
        if already_voted.contains(&key) {
            return Err(VoteError::AlreadyVoted(key));
        }

        let ratings = self
            .location_type
            .criteria()
            .keys()
            .map(|k| (k, self.ratings.get(k).copied().unwrap_or(0)))
            .collect::<Vec<_>>();

        Ok(
            RatingRecord::new(self.location_type, self.city, entity_name)
                .with_ratings(ratings)
                .with_opinion(self.opinion.trim())
                .with_submitter(submitter_id)
                .with_timestamp(timestamp),
        )
    }
}

/// Identifies what a single user may vote on once: `"{type}::{city}::{name}"`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VoteKey(String);

impl VoteKey {
    pub fn new(location_type: LocationType, city: &str, entity_name: &str) -> Self {
        Self(format!("{}::{}::{}", location_type, city, entity_name))
    }

    pub fn of(record: &RatingRecord) -> Self {
        Self::new(record.location_type, &record.city, &record.entity_name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Keys of everything `submitter_id` has already voted on.
pub fn voted_keys(records: &[RatingRecord], submitter_id: &str) -> BTreeSet<VoteKey> {
    records
        .iter()
        .filter(|r| r.submitter_id == submitter_id)
        .map(VoteKey::of)
        .collect()
}

/// The text inside a trailing `(...)`, e.g. `"Д-р Петров (Кардиолог)"` gives `"Кардиолог"`.
pub fn extract_specialty(entity_name: &str) -> Option<String> {
    SPECIALTY_SUFFIX
        .captures(entity_name.trim_end())
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}
