//! Season reconciliation
//!
//! Merges the season calendar with per-race result lookups. Races dated after today
//! are `Scheduled` without any request; every other race gets a results fetch and
//! becomes `Completed` or, when the fetch fails or comes back empty,
//! `CompletedNoResults`. Only a failure to load the calendar itself is an error.

use chrono::{NaiveDate, Utc};
use futures::stream::{self, StreamExt};
use std::future::Future;
use tracing::{info, warn};

use super::{ErgastClient, FetchError, Race, RaceEvent, RaceOutcome, RaceStatus};

impl ErgastClient {
    /// Reconciled race list for `season` as of today's UTC date
    pub async fn reconcile_season(
        &self,
        season: i32,
        force: bool,
    ) -> Result<Vec<RaceEvent>, FetchError> {
        self.reconcile_season_on(season, Utc::now().date_naive(), force)
            .await
    }

    /// Reconciled race list for `season` as of `today`
    ///
    /// Events come back in calendar order whatever order the per-race fetches
    /// complete in.
    pub async fn reconcile_season_on(
        &self,
        season: i32,
        today: NaiveDate,
        force: bool,
    ) -> Result<Vec<RaceEvent>, FetchError> {
        let schedule = self.race_schedule(season, force).await?;

        let events = run_ordered(schedule, self.workers, |race| {
            self.reconcile_race(season, race, today, force)
        })
        .await;

        let count = |status: RaceStatus| events.iter().filter(|e| e.status() == status).count();
        info!(
            season,
            completed = count(RaceStatus::Completed),
            no_results = count(RaceStatus::CompletedNoResults),
            scheduled = count(RaceStatus::Scheduled),
            "season reconciled"
        );
        Ok(events)
    }

    async fn reconcile_race(
        &self,
        season: i32,
        race: Race,
        today: NaiveDate,
        force: bool,
    ) -> RaceEvent {
        if !has_run(&race, today) {
            return RaceEvent {
                race,
                outcome: RaceOutcome::Scheduled,
            };
        }

        let outcome = match self.race_results(season, race.round, force).await {
            Ok(results) => RaceOutcome::from_results(results),
            Err(e) => {
                warn!(season, round = race.round, error = %e, "race results unavailable");
                RaceOutcome::CompletedNoResults
            }
        };
        RaceEvent { race, outcome }
    }
}

/// Whether the calendar says `race` has taken place by `today`.
///
/// A race without a date is treated as not yet run.
pub fn has_run(race: &Race, today: NaiveDate) -> bool {
    race.date.is_some_and(|date| date <= today)
}

/// Runs `task` over `items` with at most `workers` in flight.
///
/// Outputs are returned in input order regardless of completion order, so a pool
/// of one and a pool of many give identical results.
pub async fn run_ordered<I, F, Fut>(items: I, workers: usize, task: F) -> Vec<Fut::Output>
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Fut,
    Fut: Future,
{
    stream::iter(items)
        .map(task)
        .buffered(workers.max(1))
        .collect()
        .await
}
