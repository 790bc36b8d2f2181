//! Free-text search over rating records.
//!
//! Matching normalizes names (case, diacritics, whitespace) and scores them with
//! prefix/substring tiers backed by Levenshtein similarity. The matched records then go
//! through the same aggregation, filtering and sorting as the default listing.

pub mod matcher;
pub mod orchestrator;
pub mod suggest;

pub use matcher::{SearchMatch, distance, normalize, score};
pub use orchestrator::{DEFAULT_MIN_SCORE, listing, match_names, search};
pub use suggest::{Suggestion, suggest};
