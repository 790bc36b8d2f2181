//! Ratings of neighborhoods and local services, aggregated from individual votes.
//!
//! The core (matching, aggregation, filtering, search) is pure and synchronous. The MCP
//! server, snapshot worker and session state wrap it for interactive use.

pub mod aggregate;
pub mod cli;
pub mod compare;
pub mod config;
pub mod context;
pub mod debounce;
pub mod error;
pub mod filter;
pub mod format;
pub mod location;
pub mod record;
pub mod search;
pub mod server;
pub mod snapshot;
pub mod state;
pub mod tools;
pub mod tracing;
pub mod vote;
pub mod worker;

pub use aggregate::{AggregatedEntry, aggregate, round1};
pub use compare::{CompareError, Comparison, ComparisonTable, ScoreBand};
pub use config::Config;
pub use context::ServerContext;
pub use debounce::Debouncer;
pub use error::{RatingError, Result};
pub use filter::{FilterSettings, SortBy};
pub use location::{CriteriaSet, Criterion, LocationType, RequiredField, Scope};
pub use record::RatingRecord;
pub use search::{SearchMatch, Suggestion};
pub use server::RatingsServer;
pub use state::{AppState, StateView};
pub use vote::{VoteDraft, VoteError, VoteKey, VoteRules};
pub use worker::{SharedState, SnapshotWorker};
