//! Runtime configuration loaded from a TOML file.
//!
//! Every field has a default, so an absent or partial file is valid. Lookup order is
//! an explicit path, then `KVARTALI_CONFIG`, then `<config dir>/kvartali/config.toml`.

use crate::compare::{DEFAULT_MAX_ITEMS, MIN_ITEMS};
use crate::debounce::DEFAULT_SEARCH_DEBOUNCE;
use crate::error::Result;
use crate::filter::{DEFAULT_TOP_LIMIT, FilterSettings};
use crate::location::{DEFAULT_CITY, LocationType};
use crate::search::DEFAULT_MIN_SCORE;
use crate::search::suggest::{DEFAULT_SUGGESTION_CUTOFF, DEFAULT_SUGGESTION_LIMIT};
use crate::vote::VoteRules;
use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::time::Duration;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "KVARTALI_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub default_city: String,
    pub default_location_type: LocationType,
    /// Entries per page in listings.
    pub page_size: usize,
    pub search: SearchConfig,
    pub filters: FilterSettings,
    pub votes: VoteRules,
    pub comparison: ComparisonConfig,
    pub snapshot: SnapshotConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_city: DEFAULT_CITY.to_string(),
            default_location_type: LocationType::default(),
            page_size: DEFAULT_TOP_LIMIT,
            search: SearchConfig::default(),
            filters: FilterSettings::default(),
            votes: VoteRules::default(),
            comparison: ComparisonConfig::default(),
            snapshot: SnapshotConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Names must score above this to match a query.
    pub min_score: f64,
    pub debounce_ms: u64,
    pub suggestion_limit: usize,
    /// Jaro-Winkler similarity a suggestion must exceed.
    pub suggestion_cutoff: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
            debounce_ms: u64::try_from(DEFAULT_SEARCH_DEBOUNCE.as_millis()).unwrap_or(300),
            suggestion_limit: DEFAULT_SUGGESTION_LIMIT,
            suggestion_cutoff: DEFAULT_SUGGESTION_CUTOFF,
        }
    }
}

impl SearchConfig {
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComparisonConfig {
    pub max_items: usize,
}

impl Default for ComparisonConfig {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_MAX_ITEMS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnapshotConfig {
    /// JSON array of rating records. Without one the server starts empty.
    pub path: Option<PathBuf>,
    pub poll_interval_secs: u64,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            path: None,
            poll_interval_secs: 5,
        }
    }
}

impl SnapshotConfig {
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Config {
    /// Parse and validate a config from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("Invalid config file")?;
        config.validate()?;
        Ok(config)
    }

    /// Read the config at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("In config file {}", path.display()))
    }

    /// Load from the first config file found, or fall back to defaults.
    ///
    /// An explicitly named file must exist; the per-user default may be absent.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match resolve_path(explicit) {
            ConfigSource::Explicit(path) => Self::load(&path),
            ConfigSource::UserDefault(path) if path.is_file() => Self::load(&path),
            ConfigSource::UserDefault(_) | ConfigSource::Builtin => {
                tracing::debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Err(message) = self.filters.validate() {
            bail!("[filters] {}", message);
        }
        if self.default_city.trim().is_empty() {
            bail!("default_city must not be empty");
        }
        if self.page_size == 0 {
            bail!("page_size must be at least 1");
        }
        if self.comparison.max_items < MIN_ITEMS {
            bail!(
                "[comparison] max_items must be at least {}, got {}",
                MIN_ITEMS,
                self.comparison.max_items
            );
        }
        if !(0.0..=1.0).contains(&self.search.suggestion_cutoff) {
            bail!(
                "[search] suggestion_cutoff must be between 0 and 1, got {}",
                self.search.suggestion_cutoff
            );
        }
        if !self.search.min_score.is_finite() || self.search.min_score > 1.0 {
            bail!(
                "[search] min_score must be a number no greater than 1, got {}",
                self.search.min_score
            );
        }
        if self.votes.min_opinion_len > self.votes.max_opinion_len {
            bail!(
                "[votes] min_opinion_len ({}) exceeds max_opinion_len ({})",
                self.votes.min_opinion_len,
                self.votes.max_opinion_len
            );
        }
        if self.snapshot.poll_interval_secs == 0 {
            bail!("[snapshot] poll_interval_secs must be at least 1");
        }
        Ok(())
    }
}

/// Where the config comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named on the command line or in `KVARTALI_CONFIG`.
    Explicit(PathBuf),
    UserDefault(PathBuf),
    /// No config directory on this platform.
    Builtin,
}

pub fn resolve_path(explicit: Option<&Path>) -> ConfigSource {
    if let Some(path) = explicit {
        return ConfigSource::Explicit(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
        return ConfigSource::Explicit(PathBuf::from(path));
    }
    dirs::config_dir().map_or(ConfigSource::Builtin, |dir| {
        ConfigSource::UserDefault(dir.join("kvartali").join("config.toml"))
    })
}
