//! Error handling types and utilities.

/// A specialized Result type for application plumbing (config, snapshot IO, server startup).
///
/// This is an alias for `anyhow::Result` with context added via `.context()` and
/// `.with_context()` methods throughout the codebase.
pub type Result<T> = anyhow::Result<T>;

/// Errors raised by the aggregation core.
///
/// Every core operation either completes for the whole input or fails with one of these;
/// there are no partial results.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RatingError {
    /// The criteria set has no keys, so no average can be computed.
    #[error("criteria set is empty; cannot compute averages")]
    EmptyCriteria,

    /// A rating value is not an integer in 0..=5.
    ///
    /// Aggregation never raises this (such values read as 0); strict validation does.
    #[error("invalid rating {value} for criterion '{criterion}' (expected an integer 0-5)")]
    InvalidRatingValue { criterion: String, value: f64 },
}
