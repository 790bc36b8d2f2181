//! Location types and the criteria each one is rated on.

use rmcp::schemars;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// City used when neither a record nor the caller names one.
pub const DEFAULT_CITY: &str = "София";

/// Criterion key used by every location type except neighborhoods.
pub const OVERALL: &str = "overall";

/// One named axis of evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Criterion {
    pub key: String,
    pub label: String,
}

/// Ordered mapping from criterion key to display label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CriteriaSet {
    criteria: Vec<Criterion>,
}

impl CriteriaSet {
    /// Build a criteria set from `(key, label)` pairs, keeping their order.
    ///
    /// A repeated key keeps its first position and label.
    pub fn new<K, L>(pairs: impl IntoIterator<Item = (K, L)>) -> Self
    where
        K: Into<String>,
        L: Into<String>,
    {
        let mut criteria: Vec<Criterion> = Vec::new();
        for (key, label) in pairs {
            let key = key.into();
            if criteria.iter().any(|c| c.key == key) {
                continue;
            }
            criteria.push(Criterion {
                key,
                label: label.into(),
            });
        }
        Self { criteria }
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.criteria.iter().any(|c| c.key == key)
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.criteria
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.label.as_str())
    }

    /// Criterion keys in display order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.criteria.iter().map(|c| c.key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Criterion> {
        self.criteria.iter()
    }
}

static NEIGHBORHOOD_CRITERIA: LazyLock<CriteriaSet> = LazyLock::new(|| {
    CriteriaSet::new([
        ("safety", "Сигурност"),
        ("transport", "Транспорт"),
        ("greenery", "Зелени площи"),
        ("cleanliness", "Чистота"),
        ("infrastructure", "Инфраструктура"),
        ("schools", "Училища и детски градини"),
        ("shopping", "Магазини и услуги"),
        ("healthcare", "Здравеопазване"),
        ("noise", "Ниво на шум"),
        ("air_quality", "Качество на въздуха"),
    ])
});

static OVERALL_CRITERIA: LazyLock<CriteriaSet> =
    LazyLock::new(|| CriteriaSet::new([(OVERALL, "Обща оценка")]));

/// Form fields a vote must fill in, besides ratings and opinion.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, schemars::JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    /// Neighborhood or childcare center picked from the city's list.
    Place,
    DoctorName,
    Specialty,
    ShopCategory,
    ShopName,
}

impl RequiredField {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Place => "place",
            Self::DoctorName => "doctor_name",
            Self::Specialty => "specialty",
            Self::ShopCategory => "shop_category",
            Self::ShopName => "shop_name",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of entity being rated.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    schemars::JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum LocationType {
    #[default]
    Neighborhood,
    Childcare,
    Doctors,
    Dentists,
    Shops,
}

impl LocationType {
    pub const ALL: [Self; 5] = [
        Self::Neighborhood,
        Self::Childcare,
        Self::Doctors,
        Self::Dentists,
        Self::Shops,
    ];

    /// Wire name, as stored in rating documents.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Neighborhood => "neighborhood",
            Self::Childcare => "childcare",
            Self::Doctors => "doctors",
            Self::Dentists => "dentists",
            Self::Shops => "shops",
        }
    }

    /// Criteria this location type is rated on.
    pub fn criteria(self) -> &'static CriteriaSet {
        match self {
            Self::Neighborhood => &NEIGHBORHOOD_CRITERIA,
            Self::Childcare | Self::Doctors | Self::Dentists | Self::Shops => &OVERALL_CRITERIA,
        }
    }

    /// Fields a vote for this location type must provide.
    pub const fn required_fields(self) -> &'static [RequiredField] {
        match self {
            Self::Neighborhood | Self::Childcare => &[RequiredField::Place],
            Self::Doctors => &[RequiredField::DoctorName, RequiredField::Specialty],
            Self::Dentists => &[RequiredField::DoctorName],
            Self::Shops => &[RequiredField::ShopCategory, RequiredField::ShopName],
        }
    }

    /// Only neighborhoods can be compared side by side.
    pub const fn is_comparable(self) -> bool {
        matches!(self, Self::Neighborhood)
    }

    /// Whether entity names carry a trailing `(specialty)`.
    pub const fn has_specialty(self) -> bool {
        matches!(self, Self::Doctors)
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LocationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown location type '{}' (expected one of: neighborhood, childcare, doctors, dentists, shops)",
                    s
                )
            })
    }
}

/// The (location type, city) pair bounding which records are eligible.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Scope {
    pub location_type: LocationType,
    pub city: String,
}

impl Scope {
    pub fn new(location_type: LocationType, city: impl Into<String>) -> Self {
        Self {
            location_type,
            city: city.into(),
        }
    }
}
