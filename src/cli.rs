//! Command-line interface parsing for pitwall
//!
//! This module handles parsing of CLI arguments using clap, and turns them into the
//! `ClientConfig` for the API layer plus the settings the app starts with. Most
//! options can also be given through `PITWALL_*` environment variables.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::data::client::{default_cache_path, DEFAULT_WORKERS};
use crate::data::{current_season, ClientConfig, Freshness, DEFAULT_BASE_URL};

/// Default number of results in the last-N overlay
pub const DEFAULT_LAST_N: u32 = 5;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// A count that must be positive was zero
    #[error("Invalid value for --{0}: must be at least 1")]
    ZeroCount(&'static str),

    /// The season is outside the range the API covers
    #[error("Invalid season: {0}. Seasons start in 1950")]
    InvalidSeason(i32),
}

/// Which screen the app opens on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Screen {
    /// Drivers' and constructors' championship tables
    #[default]
    Standings,
    /// Season calendar with race status
    Races,
}

/// pitwall - Formula 1 standings and results in the terminal
#[derive(Parser, Debug)]
#[command(name = "pitwall")]
#[command(about = "Formula 1 standings, calendar and results in the terminal")]
#[command(version)]
pub struct Cli {
    /// Season to show (defaults to the current year)
    #[arg(long, env = "PITWALL_SEASON")]
    pub season: Option<i32>,

    /// Screen to open on
    #[arg(long, value_enum, default_value_t = Screen::Standings)]
    pub screen: Screen,

    /// Base URL of the Ergast-compatible API
    #[arg(long, env = "PITWALL_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Path of the response cache file
    #[arg(long, env = "PITWALL_CACHE_FILE", value_name = "PATH")]
    pub cache_file: Option<PathBuf>,

    /// Per-request timeout in seconds
    #[arg(long, env = "PITWALL_TIMEOUT_SECS", default_value_t = crate::data::DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Number of recent results shown for a driver or constructor
    #[arg(long, default_value_t = DEFAULT_LAST_N)]
    pub last_n: u32,

    /// Race result fetches in flight while loading the calendar
    #[arg(long, default_value_t = DEFAULT_WORKERS)]
    pub workers: usize,

    /// Maximum number of responses kept in the cache file
    #[arg(long, default_value_t = crate::cache::DEFAULT_MAX_ENTRIES)]
    pub max_entries: usize,

    /// Ignore cached responses for the first load
    #[arg(long)]
    pub refresh: bool,

    /// Verbosity level for the log file (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log file location (defaults to pitwall.log next to the cache)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Season every screen shows
    pub season: i32,
    /// Screen to open on
    pub screen: Screen,
    /// Size of the last-N results window
    pub last_n: u32,
    /// Bypass the cache on the first load
    pub force_first_load: bool,
    /// API client configuration
    pub client: ClientConfig,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            season: current_season(),
            screen: Screen::default(),
            last_n: DEFAULT_LAST_N,
            force_first_load: false,
            client: ClientConfig::default(),
        }
    }
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Arguments
    /// * `cli` - The parsed CLI struct
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if a count is zero or the season is out of range
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if cli.last_n == 0 {
            return Err(CliError::ZeroCount("last-n"));
        }
        if cli.workers == 0 {
            return Err(CliError::ZeroCount("workers"));
        }
        if cli.max_entries == 0 {
            return Err(CliError::ZeroCount("max-entries"));
        }
        if cli.timeout_secs == 0 {
            return Err(CliError::ZeroCount("timeout-secs"));
        }

        let season = cli.season.unwrap_or_else(current_season);
        if season < 1950 {
            return Err(CliError::InvalidSeason(season));
        }

        Ok(StartupConfig {
            season,
            screen: cli.screen,
            last_n: cli.last_n,
            force_first_load: cli.refresh,
            client: ClientConfig {
                base_url: cli.base_url.trim_end_matches('/').to_string(),
                timeout: Duration::from_secs(cli.timeout_secs),
                cache_path: cli.cache_file.clone().unwrap_or_else(default_cache_path),
                max_entries: cli.max_entries,
                workers: cli.workers,
                freshness: Freshness::default(),
            },
        })
    }
}
