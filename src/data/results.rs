//! Race result queries
//!
//! Per-race classifications, and the "last N results" window for a driver or
//! constructor. The API has no "last N" query, so that one is two-phase: a one-row
//! probe reads the reported total, then the trailing window is requested with
//! `offset = total - n`.

use serde_json::Value;

use super::envelope::{driver_name, list, number, path, text, uint};
use super::schedule::{parse_date, RACES};
use super::{ErgastClient, FetchError, Finish, LastResults, ResultRecord, SeasonResult, Subject};

impl ErgastClient {
    /// Classified results of round `round` of `season`
    ///
    /// An empty list means the API has no results for the race yet.
    pub async fn race_results(
        &self,
        season: i32,
        round: u32,
        force: bool,
    ) -> Result<Vec<ResultRecord>, FetchError> {
        let data = self
            .fetcher
            .fetch_with_cache(
                &format!("/ergast/f1/{}/{}/results.json", season, round),
                &format!("race_results_{}_{}", season, round),
                self.freshness.race_results,
                force,
            )
            .await?;
        Ok(parse_race_results(&data))
    }

    /// The `n` most recent results of `subject` in `season`
    ///
    /// # Returns
    /// * `Ok(LastResults)` - Entries in API (chronological) order; fewer than `n` when
    ///   the subject has fewer results
    /// * `Err(FetchError)` - Either the probe or the window request failed
    pub async fn last_results(
        &self,
        subject: &Subject,
        season: i32,
        n: u32,
        force: bool,
    ) -> Result<LastResults, FetchError> {
        let (segment, prefix) = match subject {
            Subject::Driver { .. } => ("drivers", "driver"),
            Subject::Constructor { .. } => ("constructors", "constructor"),
        };
        let endpoint = |limit: u32, offset: u32| {
            format!(
                "/ergast/f1/{}/{}/{}/results.json?limit={}&offset={}",
                season,
                segment,
                subject.id(),
                limit,
                offset
            )
        };
        let cache_key = |limit: u32, offset: u32| {
            format!(
                "{}_results_{}_{}_{}_{}",
                prefix,
                season,
                subject.id(),
                limit,
                offset
            )
        };
        let max_age = self.freshness.season_results;

        let probe = self
            .fetcher
            .fetch_with_cache(&endpoint(1, 0), &cache_key(1, 0), max_age, force)
            .await?;
        let total = uint(path(&probe, &["MRData"]), "total").unwrap_or(0);
        let offset = window_offset(total, n);

        let entries = if n == 0 || total == 0 {
            Vec::new()
        } else {
            let window = self
                .fetcher
                .fetch_with_cache(&endpoint(n, offset), &cache_key(n, offset), max_age, force)
                .await?;
            parse_season_results(&window)
        };

        Ok(LastResults {
            subject: subject.clone(),
            total,
            offset,
            entries,
        })
    }
}

/// First index of the trailing `n`-item window over `total` items
pub fn window_offset(total: u32, n: u32) -> u32 {
    total.saturating_sub(n)
}

/// Results of the first race in a `RaceTable` response
pub fn parse_race_results(data: &Value) -> Vec<ResultRecord> {
    list(data, &RACES)
        .first()
        .map(|race| list(race, &["Results"]).iter().map(parse_result).collect())
        .unwrap_or_default()
}

/// Every result row across all races of a `RaceTable` response, flattened in order
pub fn parse_season_results(data: &Value) -> Vec<SeasonResult> {
    list(data, &RACES)
        .iter()
        .flat_map(|race| {
            let round = uint(race, "round").unwrap_or(0);
            let race_name = text(race, "raceName");
            let date = parse_date(&text(race, "date"));
            list(race, &["Results"])
                .iter()
                .map(move |row| SeasonResult {
                    round,
                    race_name: race_name.clone(),
                    date,
                    result: parse_result(row),
                })
        })
        .collect()
}

pub(crate) fn parse_result(row: &Value) -> ResultRecord {
    let driver = path(row, &["Driver"]);
    let time = text(path(row, &["Time"]), "time");
    let finish = if time.is_empty() {
        Finish::Status(text(row, "status"))
    } else {
        Finish::Time(time)
    };

    ResultRecord {
        position: uint(row, "position"),
        position_text: text(row, "positionText"),
        driver: driver_name(driver),
        code: text(driver, "code"),
        constructor: text(path(row, &["Constructor"]), "name"),
        grid: uint(row, "grid"),
        points: number(row, "points").unwrap_or(0.0),
        laps: uint(row, "laps"),
        finish,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ClientConfig;
    use chrono::NaiveDate;
    use mockito::Matcher;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_client(base_url: String) -> (ErgastClient, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let client = ErgastClient::new(ClientConfig {
            base_url,
            cache_path: temp_dir.path().join("cache.json"),
            ..ClientConfig::default()
        });
        (client, temp_dir)
    }

    fn query(limit: u32, offset: u32) -> Matcher {
        Matcher::AllOf(vec![
            Matcher::UrlEncoded("limit".into(), limit.to_string()),
            Matcher::UrlEncoded("offset".into(), offset.to_string()),
        ])
    }

    fn result_row(position: u32, family: &str) -> Value {
        json!({
            "position": position.to_string(), "positionText": position.to_string(),
            "points": "10", "grid": "3", "laps": "57", "status": "Finished",
            "Driver": {"givenName": "Lewis", "familyName": family, "code": "HAM"},
            "Constructor": {"name": "Ferrari"},
            "Time": {"millis": "5739435", "time": "+4.2"}
        })
    }

    /// A RaceTable whose races are rounds `first..=last`, one result each
    fn season_rows(first: u32, last: u32) -> Value {
        let races: Vec<Value> = (first..=last)
            .map(|round| {
                json!({
                    "round": round.to_string(),
                    "raceName": format!("Race {}", round),
                    "date": "2025-06-01",
                    "Results": [result_row(round % 20 + 1, "Hamilton")]
                })
            })
            .collect();
        json!({"MRData": {"total": "25", "RaceTable": {"Races": races}}})
    }

    #[test]
    fn test_window_offset() {
        assert_eq!(window_offset(25, 10), 15);
        assert_eq!(window_offset(10, 10), 0);
        assert_eq!(window_offset(3, 10), 0);
        assert_eq!(window_offset(0, 5), 0);
    }

    #[test]
    fn test_parse_result_with_time() {
        let record = parse_result(&result_row(2, "Hamilton"));

        assert_eq!(record.position, Some(2));
        assert_eq!(record.driver, "Lewis Hamilton");
        assert_eq!(record.code, "HAM");
        assert_eq!(record.constructor, "Ferrari");
        assert_eq!(record.grid, Some(3));
        assert_eq!(record.laps, Some(57));
        assert!((record.points - 10.0).abs() < f64::EPSILON);
        assert_eq!(record.finish, Finish::Time("+4.2".to_string()));
    }

    #[test]
    fn test_parse_result_without_time_uses_status() {
        let record = parse_result(&json!({
            "position": "18", "positionText": "R", "points": "0", "grid": "12",
            "laps": "40", "status": "Retired",
            "Driver": {"givenName": "Carlos", "familyName": "Sainz"},
            "Constructor": {"name": "Williams"}
        }));

        assert_eq!(record.position_text, "R");
        assert_eq!(record.finish, Finish::Status("Retired".to_string()));
    }

    #[test]
    fn test_parse_race_results_reads_first_race() {
        let body = json!({"MRData": {"RaceTable": {"Races": [
            {"round": "4", "Results": [result_row(1, "A"), result_row(2, "B")]}
        ]}}});
        let results = parse_race_results(&body);
        assert_eq!(results.len(), 2);
        assert_eq!(results[1].driver, "Lewis B");
    }

    #[test]
    fn test_parse_race_results_tolerates_missing_levels() {
        assert!(parse_race_results(&json!({"MRData": {"RaceTable": {"Races": []}}})).is_empty());
        assert!(parse_race_results(&json!({"MRData": {"RaceTable": {"Races": [{"round": "4"}]}}})).is_empty());
        assert!(parse_race_results(&json!(null)).is_empty());
    }

    #[test]
    fn test_parse_season_results_flattens_per_car() {
        let body = json!({"MRData": {"RaceTable": {"Races": [
            {"round": "1", "raceName": "Australian Grand Prix", "date": "2025-03-16",
             "Results": [result_row(3, "Leclerc"), result_row(5, "Hamilton")]},
            {"round": "2", "raceName": "Chinese Grand Prix", "date": "2025-03-23",
             "Results": [result_row(4, "Leclerc")]}
        ]}}});

        let rows = parse_season_results(&body);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].round, 1);
        assert_eq!(rows[1].race_name, "Australian Grand Prix");
        assert_eq!(rows[2].date, NaiveDate::from_ymd_opt(2025, 3, 23));
        assert_eq!(rows[2].result.position, Some(4));
    }

    #[tokio::test]
    async fn test_race_results_endpoint_and_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ergast/f1/2025/4/results.json")
            .with_status(200)
            .with_body(
                json!({"MRData": {"RaceTable": {"Races": [{"round": "4", "Results": [result_row(1, "A")]}]}}})
                    .to_string(),
            )
            .expect(1)
            .create_async()
            .await;
        let (client, _temp_dir) = create_test_client(server.url());

        let results = client.race_results(2025, 4, false).await.unwrap();

        assert_eq!(results.len(), 1);
        mock.assert_async().await;
        assert!(client
            .fetcher()
            .store()
            .load()
            .contains_key("race_results_2025_4"));
    }

    #[tokio::test]
    async fn test_last_results_returns_trailing_window() {
        let mut server = mockito::Server::new_async().await;
        let path = "/ergast/f1/2025/drivers/hamilton/results.json";
        let probe = server
            .mock("GET", path)
            .match_query(query(1, 0))
            .with_status(200)
            .with_body(season_rows(1, 1).to_string())
            .expect(1)
            .create_async()
            .await;
        let window = server
            .mock("GET", path)
            .match_query(query(10, 15))
            .with_status(200)
            .with_body(season_rows(16, 25).to_string())
            .expect(1)
            .create_async()
            .await;
        let (client, _temp_dir) = create_test_client(server.url());
        let subject = Subject::Driver {
            id: "hamilton".into(),
            name: "Lewis Hamilton".into(),
        };

        let last = client.last_results(&subject, 2025, 10, false).await.unwrap();

        assert_eq!(last.total, 25);
        assert_eq!(last.offset, 15);
        let rounds: Vec<u32> = last.entries.iter().map(|e| e.round).collect();
        assert_eq!(rounds, (16..=25).collect::<Vec<_>>());
        probe.assert_async().await;
        window.assert_async().await;

        let cache = client.fetcher().store().load();
        assert!(cache.contains_key("driver_results_2025_hamilton_1_0"));
        assert!(cache.contains_key("driver_results_2025_hamilton_10_15"));
    }

    #[tokio::test]
    async fn test_last_results_short_history_starts_at_zero() {
        let mut server = mockito::Server::new_async().await;
        let path = "/ergast/f1/2025/constructors/ferrari/results.json";
        let probe_body = json!({"MRData": {"total": "3", "RaceTable": {"Races": []}}});
        let window_body = json!({"MRData": {"total": "3", "RaceTable": {"Races": [
            {"round": "1", "raceName": "Australian Grand Prix", "Results": [result_row(3, "Leclerc"), result_row(5, "Hamilton")]},
            {"round": "2", "raceName": "Chinese Grand Prix", "Results": [result_row(4, "Leclerc")]}
        ]}}});
        server
            .mock("GET", path)
            .match_query(query(1, 0))
            .with_status(200)
            .with_body(probe_body.to_string())
            .create_async()
            .await;
        let window = server
            .mock("GET", path)
            .match_query(query(5, 0))
            .with_status(200)
            .with_body(window_body.to_string())
            .expect(1)
            .create_async()
            .await;
        let (client, _temp_dir) = create_test_client(server.url());
        let subject = Subject::Constructor {
            id: "ferrari".into(),
            name: "Ferrari".into(),
        };

        let last = client.last_results(&subject, 2025, 5, false).await.unwrap();

        assert_eq!(last.offset, 0);
        assert_eq!(last.entries.len(), 3);
        window.assert_async().await;
    }

    #[tokio::test]
    async fn test_last_results_with_no_history_skips_window() {
        let mut server = mockito::Server::new_async().await;
        let path = "/ergast/f1/2025/drivers/rookie/results.json";
        server
            .mock("GET", path)
            .match_query(query(1, 0))
            .with_status(200)
            .with_body(r#"{"MRData": {"total": "0"}}"#)
            .create_async()
            .await;
        let window = server
            .mock("GET", path)
            .match_query(query(5, 0))
            .expect(0)
            .create_async()
            .await;
        let (client, _temp_dir) = create_test_client(server.url());
        let subject = Subject::Driver {
            id: "rookie".into(),
            name: "Rookie".into(),
        };

        let last = client.last_results(&subject, 2025, 5, false).await.unwrap();

        assert_eq!(last.total, 0);
        assert!(last.entries.is_empty());
        window.assert_async().await;
    }

    #[tokio::test]
    async fn test_last_results_probe_failure_is_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ergast/f1/2025/drivers/hamilton/results.json")
            .match_query(Matcher::Any)
            .with_status(502)
            .create_async()
            .await;
        let (client, _temp_dir) = create_test_client(server.url());
        let subject = Subject::Driver {
            id: "hamilton".into(),
            name: "Lewis Hamilton".into(),
        };

        let result = client.last_results(&subject, 2025, 5, false).await;

        assert!(matches!(result, Err(FetchError::Status { status: 502, .. })));
    }
}
