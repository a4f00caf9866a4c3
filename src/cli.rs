//! Command-line interface parsing for Sunrank
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! a validated `RunConfig`. Every flag is optional; a bare invocation ranks
//! the built-in city table.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use thiserror::Error;

use crate::data::yandex::DEFAULT_TIMEOUT;
use crate::data::{all_locations, get_city_by_key, Location};
use crate::storage::DEFAULT_RESULT_PATH;

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// The cities file could not be read
    #[error("Failed to read cities file {path}: {source}")]
    ReadCities {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The cities file is not a JSON object of name to URL
    #[error("Invalid cities file {path}: {source}")]
    ParseCities {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The cities file parsed but lists nothing to rank
    #[error("Cities file {0} lists no cities")]
    EmptyCities(PathBuf),

    /// A --city key that is not in the built-in table
    #[error("Unknown city key: '{0}'")]
    UnknownCity(String),

    /// A numeric flag that must be positive was zero
    #[error("--{0} must be at least 1")]
    ZeroValue(&'static str),
}

/// Sunrank - find the city with the most favorable daytime weather
#[derive(Parser, Debug)]
#[command(name = "sunrank")]
#[command(about = "Rank cities by favorable daytime weather")]
#[command(version)]
pub struct Cli {
    /// JSON file mapping city keys to forecast URLs, replacing the built-in table
    ///
    /// Example: { "MOSCOW": "https://code.s3.yandex.net/async-module/moscow-response.json" }
    #[arg(long, value_name = "FILE")]
    pub cities: Option<PathBuf>,

    /// Rank only these built-in cities (repeatable, e.g. --city moscow --city paris)
    #[arg(long = "city", value_name = "KEY", conflicts_with = "cities")]
    pub city: Vec<String>,

    /// Where to write the per-city results
    #[arg(long, value_name = "FILE", default_value = DEFAULT_RESULT_PATH)]
    pub output: PathBuf,

    /// Number of calculation workers (default: available cores minus one)
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Maximum number of forecast requests in flight (default: all at once)
    #[arg(long, value_name = "N")]
    pub fetch_concurrency: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout: u64,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Validated settings for one run
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Locations to fetch and rank
    pub locations: Vec<Location>,
    /// Result artifact path
    pub output: PathBuf,
    /// Calculation pool size override
    pub workers: Option<usize>,
    /// Fetch concurrency override
    pub fetch_concurrency: Option<usize>,
    /// HTTP request timeout
    pub timeout: Duration,
    /// Log verbosity level
    pub verbose: u8,
}

/// Reads a `{ "KEY": "url" }` cities file
///
/// Keys come back sorted, which fixes the fetch dispatch order.
pub fn load_cities_file(path: &Path) -> Result<Vec<Location>, CliError> {
    let content = fs::read_to_string(path).map_err(|source| CliError::ReadCities {
        path: path.to_path_buf(),
        source,
    })?;

    let table: BTreeMap<String, String> =
        serde_json::from_str(&content).map_err(|source| CliError::ParseCities {
            path: path.to_path_buf(),
            source,
        })?;

    if table.is_empty() {
        return Err(CliError::EmptyCities(path.to_path_buf()));
    }

    Ok(table
        .into_iter()
        .map(|(name, url)| Location::new(name, url))
        .collect())
}

/// Resolves built-in city keys, case-insensitively, keeping the given order
pub fn select_cities(keys: &[String]) -> Result<Vec<Location>, CliError> {
    keys.iter()
        .map(|key| {
            get_city_by_key(&key.to_uppercase())
                .map(|city| Location::new(city.key, city.url))
                .ok_or_else(|| CliError::UnknownCity(key.clone()))
        })
        .collect()
}

fn positive(value: Option<usize>, flag: &'static str) -> Result<Option<usize>, CliError> {
    match value {
        Some(0) => Err(CliError::ZeroValue(flag)),
        other => Ok(other),
    }
}

impl RunConfig {
    /// Creates a RunConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(RunConfig)` with the built-in cities unless `--cities` or `--city` narrows them
    /// * `Err(CliError)` if the cities file is unusable or a count is zero
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let locations = match &cli.cities {
            Some(path) => load_cities_file(path)?,
            None if !cli.city.is_empty() => select_cities(&cli.city)?,
            None => all_locations(),
        };

        if cli.timeout == 0 {
            return Err(CliError::ZeroValue("timeout"));
        }

        Ok(RunConfig {
            locations,
            output: cli.output.clone(),
            workers: positive(cli.workers, "workers")?,
            fetch_concurrency: positive(cli.fetch_concurrency, "fetch-concurrency")?,
            timeout: Duration::from_secs(cli.timeout),
            verbose: cli.verbose,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_cities(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("cities.json");
        fs::write(&path, content).expect("Failed to write cities file");
        path
    }

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["sunrank"]);
        assert!(cli.cities.is_none());
        assert!(cli.city.is_empty());
        assert_eq!(cli.output, PathBuf::from("result.json"));
        assert!(cli.workers.is_none());
        assert!(cli.fetch_concurrency.is_none());
        assert_eq!(cli.timeout, 10);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_cli_parse_all_flags() {
        let cli = Cli::parse_from([
            "sunrank",
            "--cities",
            "c.json",
            "--output",
            "out/r.json",
            "--workers",
            "3",
            "--fetch-concurrency",
            "4",
            "--timeout",
            "30",
            "-vv",
        ]);
        assert_eq!(cli.cities, Some(PathBuf::from("c.json")));
        assert_eq!(cli.output, PathBuf::from("out/r.json"));
        assert_eq!(cli.workers, Some(3));
        assert_eq!(cli.fetch_concurrency, Some(4));
        assert_eq!(cli.timeout, 30);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_run_config_defaults_to_built_in_cities() {
        let cli = Cli::parse_from(["sunrank"]);
        let config = RunConfig::from_cli(&cli).unwrap();
        assert_eq!(config.locations.len(), 15);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(config.workers.is_none());
    }

    #[test]
    fn test_run_config_rejects_zero_workers() {
        let cli = Cli::parse_from(["sunrank", "--workers", "0"]);
        let err = RunConfig::from_cli(&cli).unwrap_err();
        assert!(err.to_string().contains("--workers"));
    }

    #[test]
    fn test_run_config_rejects_zero_timeout() {
        let cli = Cli::parse_from(["sunrank", "--timeout", "0"]);
        assert!(matches!(
            RunConfig::from_cli(&cli),
            Err(CliError::ZeroValue("timeout"))
        ));
    }

    #[test]
    fn test_run_config_selects_built_in_cities() {
        let cli = Cli::parse_from(["sunrank", "--city", "paris", "--city", "MOSCOW"]);
        let config = RunConfig::from_cli(&cli).unwrap();

        let keys: Vec<&str> = config.locations.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(keys, vec!["PARIS", "MOSCOW"]);
        assert!(config.locations[0].url.ends_with("paris-response.json"));
    }

    #[test]
    fn test_run_config_rejects_unknown_city() {
        let cli = Cli::parse_from(["sunrank", "--city", "atlantis"]);
        let err = RunConfig::from_cli(&cli).unwrap_err();
        assert!(matches!(&err, CliError::UnknownCity(key) if key == "atlantis"));
        assert!(err.to_string().contains("atlantis"));
    }

    #[test]
    fn test_cli_city_conflicts_with_cities_file() {
        let result = Cli::try_parse_from(["sunrank", "--cities", "c.json", "--city", "moscow"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_cities_file_sorted_by_key() {
        let dir = TempDir::new().unwrap();
        let path = write_cities(
            &dir,
            r#"{ "PARIS": "https://example.com/paris.json", "BERLIN": "https://example.com/berlin.json" }"#,
        );

        let locations = load_cities_file(&path).unwrap();

        assert_eq!(
            locations,
            vec![
                Location::new("BERLIN", "https://example.com/berlin.json"),
                Location::new("PARIS", "https://example.com/paris.json"),
            ]
        );
    }

    #[test]
    fn test_load_cities_file_missing() {
        let dir = TempDir::new().unwrap();
        let err = load_cities_file(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, CliError::ReadCities { .. }));
    }

    #[test]
    fn test_load_cities_file_not_a_map() {
        let dir = TempDir::new().unwrap();
        let path = write_cities(&dir, r#"["MOSCOW"]"#);
        assert!(matches!(
            load_cities_file(&path),
            Err(CliError::ParseCities { .. })
        ));
    }

    #[test]
    fn test_load_cities_file_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_cities(&dir, "{}");
        assert!(matches!(
            load_cities_file(&path),
            Err(CliError::EmptyCities(_))
        ));
    }
}
