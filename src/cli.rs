use crate::config::Config;
use crate::tracing::LogFormat;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "kvartali")]
#[command(about = "Neighborhood and local-service ratings over MCP", long_about = None)]
pub struct Cli {
    /// Config file (overrides KVARTALI_CONFIG and the per-user default)
    #[arg(short, long, env = "KVARTALI_CONFIG")]
    pub config: Option<PathBuf>,

    /// Rating snapshot JSON file
    #[arg(short, long)]
    pub snapshot: Option<PathBuf>,

    /// City selected at startup
    #[arg(long)]
    pub city: Option<String>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(path) = &self.snapshot {
            config.snapshot.path = Some(path.clone());
        }
        if let Some(city) = self.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            config.default_city = city.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_config_values() {
        let cli = Cli::parse_from(["kvartali", "--snapshot", "/data/ratings.json", "--city", "Бургас"]);
        let mut config = Config::default();
        cli.apply(&mut config);
        assert_eq!(config.snapshot.path, Some(PathBuf::from("/data/ratings.json")));
        assert_eq!(config.default_city, "Бургас");
    }

    #[test]
    fn no_flags_keep_config() {
        let cli = Cli::parse_from(["kvartali", "--log-format", "json"]);
        let mut config = Config::default();
        cli.apply(&mut config);
        assert_eq!(config, Config::default());
        assert_eq!(cli.log_format, LogFormat::Json);
        assert!(!cli.verbose);
    }
}
