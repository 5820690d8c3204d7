//! Championship standings queries
//!
//! Drivers' and constructors' standings for a season, read from
//! `MRData.StandingsTable.StandingsLists[0]`.

use serde_json::Value;

use super::envelope::{driver_name, list, number, path, text, uint};
use super::{ConstructorStanding, DriverStanding, ErgastClient, FetchError};

const STANDINGS_LISTS: [&str; 3] = ["MRData", "StandingsTable", "StandingsLists"];

impl ErgastClient {
    /// Drivers' championship standings for `season`
    pub async fn driver_standings(
        &self,
        season: i32,
        force: bool,
    ) -> Result<Vec<DriverStanding>, FetchError> {
        let data = self
            .fetcher
            .fetch_with_cache(
                &format!("/ergast/f1/{}/driverstandings.json", season),
                &format!("drivers_{}", season),
                self.freshness.standings,
                force,
            )
            .await?;
        Ok(parse_driver_standings(&data))
    }

    /// Constructors' championship standings for `season`
    pub async fn constructor_standings(
        &self,
        season: i32,
        force: bool,
    ) -> Result<Vec<ConstructorStanding>, FetchError> {
        let data = self
            .fetcher
            .fetch_with_cache(
                &format!("/ergast/f1/{}/constructorstandings.json", season),
                &format!("constructors_{}", season),
                self.freshness.standings,
                force,
            )
            .await?;
        Ok(parse_constructor_standings(&data))
    }
}

/// Rows of the first standings list under `table`
fn first_list<'a>(data: &'a Value, table: &str) -> &'a [Value] {
    list(data, &STANDINGS_LISTS)
        .first()
        .map(|standings| list(standings, &[table]))
        .unwrap_or(&[])
}

pub fn parse_driver_standings(data: &Value) -> Vec<DriverStanding> {
    first_list(data, "DriverStandings")
        .iter()
        .map(|row| {
            let driver = path(row, &["Driver"]);
            // Mid-season transfers list every team; the last one is current.
            let team = list(row, &["Constructors"])
                .last()
                .map(|c| text(c, "name"))
                .unwrap_or_default();
            DriverStanding {
                position: uint(row, "position"),
                position_text: text(row, "positionText"),
                driver_id: text(driver, "driverId"),
                driver: driver_name(driver),
                code: text(driver, "code"),
                team,
                points: number(row, "points").unwrap_or(0.0),
                wins: uint(row, "wins").unwrap_or(0),
            }
        })
        .collect()
}

pub fn parse_constructor_standings(data: &Value) -> Vec<ConstructorStanding> {
    first_list(data, "ConstructorStandings")
        .iter()
        .map(|row| {
            let constructor = path(row, &["Constructor"]);
            ConstructorStanding {
                position: uint(row, "position"),
                position_text: text(row, "positionText"),
                constructor_id: text(constructor, "constructorId"),
                name: text(constructor, "name"),
                nationality: text(constructor, "nationality"),
                points: number(row, "points").unwrap_or(0.0),
                wins: uint(row, "wins").unwrap_or(0),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ClientConfig;
    use serde_json::json;
    use tempfile::TempDir;

    fn driver_standings_body() -> Value {
        json!({"MRData": {"StandingsTable": {"season": "2025", "StandingsLists": [{
            "round": "18",
            "DriverStandings": [
                {
                    "position": "1", "positionText": "1", "points": "336", "wins": "7",
                    "Driver": {"driverId": "piastri", "code": "PIA", "givenName": "Oscar", "familyName": "Piastri"},
                    "Constructors": [{"constructorId": "mclaren", "name": "McLaren"}]
                },
                {
                    "position": "2", "positionText": "2", "points": "314.5", "wins": "5",
                    "Driver": {"driverId": "norris", "code": "NOR", "givenName": "Lando", "familyName": "Norris"},
                    "Constructors": [{"constructorId": "mclaren", "name": "McLaren"}]
                },
                {
                    "position": "2", "positionText": "2", "points": "314.5", "wins": "2",
                    "Driver": {"driverId": "tsunoda", "givenName": "Yuki", "familyName": "Tsunoda"},
                    "Constructors": [
                        {"constructorId": "rb", "name": "RB F1 Team"},
                        {"constructorId": "red_bull", "name": "Red Bull"}
                    ]
                },
                {"positionText": "-", "points": "0", "wins": "0", "Driver": {"familyName": "Doohan"}}
            ]
        }]}}})
    }

    #[test]
    fn test_parse_driver_standings() {
        let rows = parse_driver_standings(&driver_standings_body());

        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].position, Some(1));
        assert_eq!(rows[0].driver, "Oscar Piastri");
        assert_eq!(rows[0].code, "PIA");
        assert_eq!(rows[0].team, "McLaren");
        assert!((rows[0].points - 336.0).abs() < f64::EPSILON);
        assert_eq!(rows[0].wins, 7);
        assert!((rows[1].points - 314.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_tied_positions_pass_through() {
        let rows = parse_driver_standings(&driver_standings_body());
        assert_eq!(rows[1].position, Some(2));
        assert_eq!(rows[2].position, Some(2));
        assert_eq!(rows[1].driver_id, "norris");
        assert_eq!(rows[2].driver_id, "tsunoda");
    }

    #[test]
    fn test_driver_team_is_latest_constructor() {
        let rows = parse_driver_standings(&driver_standings_body());
        assert_eq!(rows[2].team, "Red Bull");
        assert_eq!(rows[2].code, "");
    }

    #[test]
    fn test_unclassified_driver_has_no_position() {
        let rows = parse_driver_standings(&driver_standings_body());
        assert_eq!(rows[3].position, None);
        assert_eq!(rows[3].position_text, "-");
        assert_eq!(rows[3].team, "");
    }

    #[test]
    fn test_parse_constructor_standings() {
        let body = json!({"MRData": {"StandingsTable": {"StandingsLists": [{
            "ConstructorStandings": [
                {"position": "1", "positionText": "1", "points": "650", "wins": "12",
                 "Constructor": {"constructorId": "mclaren", "name": "McLaren", "nationality": "British"}},
                {"position": "2", "positionText": "2", "points": "298", "wins": "0",
                 "Constructor": {"constructorId": "mercedes", "name": "Mercedes", "nationality": "German"}}
            ]
        }]}}});

        let rows = parse_constructor_standings(&body);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].constructor_id, "mclaren");
        assert_eq!(rows[0].name, "McLaren");
        assert_eq!(rows[0].wins, 12);
        assert_eq!(rows[1].nationality, "German");
    }

    #[test]
    fn test_missing_envelope_levels_yield_empty() {
        assert!(parse_driver_standings(&json!({})).is_empty());
        assert!(parse_driver_standings(&json!({"MRData": {"StandingsTable": {}}})).is_empty());
        assert!(parse_driver_standings(&json!({"MRData": {"StandingsTable": {"StandingsLists": []}}})).is_empty());
        assert!(parse_constructor_standings(&json!({"MRData": {"StandingsTable": {"StandingsLists": [{}]}}})).is_empty());
    }

    #[tokio::test]
    async fn test_driver_standings_endpoint_and_cache_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ergast/f1/2025/driverstandings.json")
            .with_status(200)
            .with_body(driver_standings_body().to_string())
            .expect(1)
            .create_async()
            .await;
        let temp_dir = TempDir::new().unwrap();
        let client = ErgastClient::new(ClientConfig {
            base_url: server.url(),
            cache_path: temp_dir.path().join("cache.json"),
            ..ClientConfig::default()
        });

        let first = client.driver_standings(2025, false).await.unwrap();
        let second = client.driver_standings(2025, false).await.unwrap();

        assert_eq!(first.len(), 4);
        assert_eq!(first, second);
        mock.assert_async().await;
        assert!(client.fetcher().store().load().contains_key("drivers_2025"));
    }

    #[tokio::test]
    async fn test_constructor_standings_failure_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/ergast/f1/2025/constructorstandings.json")
            .with_status(500)
            .create_async()
            .await;
        let temp_dir = TempDir::new().unwrap();
        let client = ErgastClient::new(ClientConfig {
            base_url: server.url(),
            cache_path: temp_dir.path().join("cache.json"),
            ..ClientConfig::default()
        });

        let result = client.constructor_standings(2025, false).await;

        assert!(matches!(result, Err(FetchError::Status { status: 500, .. })));
    }
}
