//! Core data models for pitwall
//!
//! This module contains the records the screens display (standings, race calendar,
//! race results) and the API client that produces them.

pub mod client;
pub mod envelope;
pub mod fetch;
pub mod results;
pub mod schedule;
pub mod season;
pub mod standings;

pub use client::{ClientConfig, ErgastClient, Freshness};
pub use fetch::{FetchError, Fetcher, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};

use chrono::{Datelike, Local, NaiveDate};

/// The season shown by default: the current calendar year
pub fn current_season() -> i32 {
    Local::now().year()
}

/// A driver's row in the championship standings
///
/// Positions are taken verbatim from the API; tied drivers share a position.
#[derive(Debug, Clone, PartialEq)]
pub struct DriverStanding {
    /// Championship position, absent for unclassified drivers
    pub position: Option<u32>,
    /// Position as the API renders it (e.g. "1", "-")
    pub position_text: String,
    /// Ergast driver identifier (e.g. "max_verstappen")
    pub driver_id: String,
    /// "Given Family"
    pub driver: String,
    /// Three-letter code, empty when the API has none
    pub code: String,
    /// Current team name
    pub team: String,
    /// Championship points
    pub points: f64,
    /// Race wins
    pub wins: u32,
}

/// A team's row in the constructors' championship
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorStanding {
    pub position: Option<u32>,
    pub position_text: String,
    /// Ergast constructor identifier (e.g. "mclaren")
    pub constructor_id: String,
    pub name: String,
    pub nationality: String,
    pub points: f64,
    pub wins: u32,
}

/// How a classified entry ended the race
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finish {
    /// Elapsed race time or gap (e.g. "1:31:44.742", "+5.832")
    Time(String),
    /// Finishing status when no time is given (e.g. "Retired", "+1 Lap")
    Status(String),
}

impl Finish {
    /// The text to display for this finish
    pub fn label(&self) -> &str {
        match self {
            Finish::Time(time) => time,
            Finish::Status(status) => status,
        }
    }
}

/// One car's result in a race
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    /// Finishing position
    pub position: Option<u32>,
    /// Position as the API renders it ("R" for retired, "D" for disqualified)
    pub position_text: String,
    /// "Given Family"
    pub driver: String,
    /// Three-letter driver code
    pub code: String,
    /// Team name
    pub constructor: String,
    /// Starting grid position (0 = pit lane start)
    pub grid: Option<u32>,
    /// Points scored
    pub points: f64,
    /// Laps completed
    pub laps: Option<u32>,
    /// Time or status
    pub finish: Finish,
}

/// A race as listed in the season calendar
#[derive(Debug, Clone, PartialEq)]
pub struct Race {
    /// Round number, 1-based and unique within the season
    pub round: u32,
    /// e.g. "Monaco Grand Prix"
    pub name: String,
    /// Race day, absent if the API gave no parseable date
    pub date: Option<NaiveDate>,
    /// e.g. "Circuit de Monaco"
    pub circuit: String,
    /// e.g. "Monte-Carlo"
    pub locality: String,
    /// e.g. "Monaco"
    pub country: String,
}

/// Reconciled state of a race
///
/// Results only exist on `Completed`, and are never empty there.
#[derive(Debug, Clone, PartialEq)]
pub enum RaceOutcome {
    /// The race date is still in the future
    Scheduled,
    /// The race has run and results are available
    Completed(Vec<ResultRecord>),
    /// The calendar says the race has run but no results could be loaded
    CompletedNoResults,
}

impl RaceOutcome {
    /// Outcome for a race that has already run, given whatever results were found
    pub fn from_results(results: Vec<ResultRecord>) -> Self {
        if results.is_empty() {
            RaceOutcome::CompletedNoResults
        } else {
            RaceOutcome::Completed(results)
        }
    }
}

/// Status tag for a `RaceOutcome`, without the attached results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RaceStatus {
    Scheduled,
    Completed,
    CompletedNoResults,
}

impl RaceStatus {
    /// Stable identifier ("scheduled", "completed", "completed_no_results")
    pub fn as_str(&self) -> &'static str {
        match self {
            RaceStatus::Scheduled => "scheduled",
            RaceStatus::Completed => "completed",
            RaceStatus::CompletedNoResults => "completed_no_results",
        }
    }
}

/// A calendar race together with its reconciled outcome
#[derive(Debug, Clone, PartialEq)]
pub struct RaceEvent {
    pub race: Race,
    pub outcome: RaceOutcome,
}

impl RaceEvent {
    /// The status of this event
    pub fn status(&self) -> RaceStatus {
        match self.outcome {
            RaceOutcome::Scheduled => RaceStatus::Scheduled,
            RaceOutcome::Completed(_) => RaceStatus::Completed,
            RaceOutcome::CompletedNoResults => RaceStatus::CompletedNoResults,
        }
    }

    /// Results for the event; empty unless completed
    pub fn results(&self) -> &[ResultRecord] {
        match &self.outcome {
            RaceOutcome::Completed(results) => results,
            _ => &[],
        }
    }
}

/// Whose results a last-N query is for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    Driver { id: String, name: String },
    Constructor { id: String, name: String },
}

impl Subject {
    /// Ergast identifier
    pub fn id(&self) -> &str {
        match self {
            Subject::Driver { id, .. } | Subject::Constructor { id, .. } => id,
        }
    }

    /// Display name
    pub fn name(&self) -> &str {
        match self {
            Subject::Driver { name, .. } | Subject::Constructor { name, .. } => name,
        }
    }
}

/// One row of a last-N window: a result and the race it came from
#[derive(Debug, Clone, PartialEq)]
pub struct SeasonResult {
    pub round: u32,
    pub race_name: String,
    pub date: Option<NaiveDate>,
    pub result: ResultRecord,
}

/// The most recent results for a driver or constructor
#[derive(Debug, Clone, PartialEq)]
pub struct LastResults {
    pub subject: Subject,
    /// Total number of results the API reports for the subject
    pub total: u32,
    /// Offset of the first entry within that total
    pub offset: u32,
    /// Entries in API (chronological) order
    pub entries: Vec<SeasonResult>,
}
