//! Season calendar query

use chrono::NaiveDate;
use serde_json::Value;
use tracing::debug;

use super::envelope::{list, path, text, uint};
use super::{ErgastClient, FetchError, Race};

pub(crate) const RACES: [&str; 3] = ["MRData", "RaceTable", "Races"];

impl ErgastClient {
    /// The full race calendar for `season`, in round order as the API lists it
    pub async fn race_schedule(&self, season: i32, force: bool) -> Result<Vec<Race>, FetchError> {
        let data = self
            .fetcher
            .fetch_with_cache(
                &format!("/ergast/f1/{}.json", season),
                &format!("schedule_{}", season),
                self.freshness.schedule,
                force,
            )
            .await?;
        Ok(parse_schedule(&data))
    }
}

pub fn parse_schedule(data: &Value) -> Vec<Race> {
    list(data, &RACES)
        .iter()
        .filter_map(|race| {
            let parsed = parse_race(race);
            if parsed.is_none() {
                debug!(race = %race, "skipping calendar entry without a round");
            }
            parsed
        })
        .collect()
}

/// A calendar entry; `None` when it has no usable round number
pub(crate) fn parse_race(race: &Value) -> Option<Race> {
    let round = uint(race, "round").filter(|round| *round > 0)?;
    let circuit = path(race, &["Circuit"]);
    let location = path(circuit, &["Location"]);
    Some(Race {
        round,
        name: text(race, "raceName"),
        date: parse_date(&text(race, "date")),
        circuit: text(circuit, "circuitName"),
        locality: text(location, "locality"),
        country: text(location, "country"),
    })
}

pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}
