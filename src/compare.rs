//! Side-by-side comparison of neighborhoods.

use crate::aggregate::AggregatedEntry;
use crate::location::{CriteriaSet, LocationType};
use serde::Serialize;

/// Most entries a comparison holds.
pub const DEFAULT_MAX_ITEMS: usize = 3;

/// Fewest entries worth comparing.
pub const MIN_ITEMS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompareError {
    #[error("only neighborhoods can be compared, '{name}' is a {location_type}")]
    NotComparable {
        name: String,
        location_type: LocationType,
    },

    #[error("you can compare at most {max} neighborhoods")]
    ComparisonFull { max: usize },

    #[error("select at least {min} neighborhoods to compare ({selected} selected)", min = MIN_ITEMS)]
    NotEnoughItems { selected: usize },
}

/// Coarse quality band of a 0-5 score, for renderers that color-code values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Poor,
    Weak,
    Fair,
    Good,
    VeryGood,
    Excellent,
}

impl ScoreBand {
    pub fn of(score: f64) -> Self {
        if score >= 4.5 {
            Self::Excellent
        } else if score >= 4.0 {
            Self::VeryGood
        } else if score >= 3.5 {
            Self::Good
        } else if score >= 3.0 {
            Self::Fair
        } else if score >= 2.5 {
            Self::Weak
        } else {
            Self::Poor
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Poor => "poor",
            Self::Weak => "weak",
            Self::Fair => "fair",
            Self::Good => "good",
            Self::VeryGood => "very good",
            Self::Excellent => "excellent",
        }
    }
}

/// One criterion across every compared entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub key: String,
    pub label: String,
    /// One value per entry, in selection order.
    pub values: Vec<f64>,
}

/// Header facts for one compared entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonColumn {
    pub entity_name: String,
    pub city: String,
    pub overall_average: f64,
    pub votes: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonTable {
    pub columns: Vec<ComparisonColumn>,
    pub rows: Vec<ComparisonRow>,
}

/// Neighborhoods picked for comparison, in selection order.
#[derive(Debug, Clone)]
pub struct Comparison {
    items: Vec<AggregatedEntry>,
    max_items: usize,
}

impl Default for Comparison {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITEMS)
    }
}

impl Comparison {
    pub const fn new(max_items: usize) -> Self {
        Self {
            items: Vec::new(),
            max_items,
        }
    }

    pub fn items(&self) -> &[AggregatedEntry] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_ready(&self) -> bool {
        self.items.len() >= MIN_ITEMS
    }

    fn position(&self, entry: &AggregatedEntry) -> Option<usize> {
        self.items
            .iter()
            .position(|i| i.city == entry.city && i.entity_name == entry.entity_name)
    }

    /// Add `entry`; returns `false` when it is already selected.
    pub fn add(&mut self, entry: AggregatedEntry) -> Result<bool, CompareError> {
        if !entry.location_type.is_comparable() {
            return Err(CompareError::NotComparable {
                name: entry.entity_name,
                location_type: entry.location_type,
            });
        }
        if self.position(&entry).is_some() {
            return Ok(false);
        }
        if self.items.len() >= self.max_items {
            return Err(CompareError::ComparisonFull {
                max: self.max_items,
            });
        }
        self.items.push(entry);
        Ok(true)
    }

    /// Remove `entry`; returns `false` when it was not selected.
    pub fn remove(&mut self, entry: &AggregatedEntry) -> bool {
        match self.position(entry) {
            Some(index) => {
                self.items.remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Per-criterion rows for the selected entries.
    pub fn table(&self, criteria: &CriteriaSet) -> Result<ComparisonTable, CompareError> {
        if !self.is_ready() {
            return Err(CompareError::NotEnoughItems {
                selected: self.items.len(),
            });
        }

        let columns = self
            .items
            .iter()
            .map(|e| ComparisonColumn {
                entity_name: e.entity_name.clone(),
                city: e.city.clone(),
                overall_average: e.overall_average,
                votes: e.votes(),
            })
            .collect();

        let rows = criteria
            .iter()
            .map(|c| ComparisonRow {
                key: c.key.clone(),
                label: c.label.clone(),
                values: self
                    .items
                    .iter()
                    .map(|e| e.average(&c.key).unwrap_or(0.0))
                    .collect(),
            })
            .collect();

        Ok(ComparisonTable { columns, rows })
    }
}

/// `(label, average)` pairs in criteria order, as fed to a radar chart.
pub fn criterion_series(entry: &AggregatedEntry, criteria: &CriteriaSet) -> Vec<(String, f64)> {
    criteria
        .iter()
        .map(|c| (c.label.clone(), entry.average(&c.key).unwrap_or(0.0)))
        .collect()
}
