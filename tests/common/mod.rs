//! Shared fixtures for integration tests.
//!
//! # Available Fixtures
//!
//! - `lozenets_pair`: two votes for the same neighborhood over all ten criteria
//! - `sofia_snapshot`: a mixed snapshot across cities and location types
//! - `server_context`: a [`ServerContext`] already holding `sofia_snapshot`
//! - `snapshot_file`: `sofia_snapshot` written to a temporary JSON file

// Each integration test crate uses a different subset
#![allow(dead_code)]

use kvartali::tracing::LogFormat;
use kvartali::{AppState, Config, LocationType, RatingRecord, ServerContext};
use rstest::fixture;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::RwLock;

/// A vote rating safety as `safety` and every other neighborhood criterion as `rest`.
pub fn neighborhood_vote(
    city: &str,
    name: &str,
    submitter: &str,
    safety: u8,
    rest: u8,
) -> RatingRecord {
    LocationType::Neighborhood
        .criteria()
        .keys()
        .fold(
            RatingRecord::new(LocationType::Neighborhood, city, name).with_submitter(submitter),
            |record, key| record.with_rating(key, if key == "safety" { safety } else { rest }),
        )
}

#[fixture]
pub fn lozenets_pair() -> Vec<RatingRecord> {
    vec![
        neighborhood_vote("Sofia", "Lozenets", "u1", 5, 4),
        neighborhood_vote("Sofia", "Lozenets", "u2", 3, 4),
    ]
}

#[fixture]
pub fn sofia_snapshot() -> Vec<RatingRecord> {
    vec![
        neighborhood_vote("София", "Лозенец", "u1", 5, 4).with_opinion("Спокойно и зелено"),
        neighborhood_vote("София", "Лозенец", "u2", 5, 4),
        neighborhood_vote("София", "Младост", "u1", 3, 3),
        neighborhood_vote("София", "Младост", "u3", 2, 3),
        neighborhood_vote("София", "Младост", "u4", 3, 4),
        neighborhood_vote("София", "Люлин", "u5", 1, 2),
        neighborhood_vote("Варна", "Чайка", "u1", 5, 5),
        RatingRecord::new(LocationType::Doctors, "София", "Д-р Иванов (Кардиолог)")
            .with_rating("overall", 5)
            .with_submitter("u1"),
        RatingRecord::new(LocationType::Doctors, "София", "Д-р Петрова (Педиатър)")
            .with_rating("overall", 4)
            .with_submitter("u2"),
        RatingRecord::new(LocationType::Shops, "София", "Фантастико")
            .with_rating("overall", 0)
            .with_opinion("Само мнение, без оценка")
            .with_submitter("u3"),
    ]
}

#[fixture]
pub fn server_context(sofia_snapshot: Vec<RatingRecord>) -> ServerContext {
    context_with(Config::default(), sofia_snapshot)
}

pub fn context_with(config: Config, records: Vec<RatingRecord>) -> ServerContext {
    kvartali::tracing::init(false, LogFormat::Compact);
    let mut state = AppState::new(&config);
    state.replace_snapshot(Arc::from(records));
    ServerContext::with_state(Arc::new(RwLock::new(state)), Arc::new(config))
}

/// A snapshot JSON file that lives as long as this value.
pub struct SnapshotFile {
    _temp: TempDir,
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(records: &[RatingRecord]) -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().join("ratings.json");
        let file = Self { _temp: temp, path };
        file.write(records);
        file
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write(&self, records: &[RatingRecord]) {
        let json = serde_json::to_string(records).expect("Failed to serialize records");
        std::fs::write(&self.path, json).expect("Failed to write snapshot");
    }

    pub fn write_raw(&self, text: &str) {
        std::fs::write(&self.path, text).expect("Failed to write snapshot");
    }
}

#[fixture]
pub fn snapshot_file(sofia_snapshot: Vec<RatingRecord>) -> SnapshotFile {
    SnapshotFile::new(&sofia_snapshot)
}
