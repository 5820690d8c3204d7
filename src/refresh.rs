//! Background data loading
//!
//! Runs API loads on the tokio runtime so the UI keeps drawing, and delivers the
//! outcome over a channel. A load can be cancelled while in flight; the cache file
//! stays intact because each cache write completes without yielding.

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::data::{
    ConstructorStanding, DriverStanding, ErgastClient, FetchError, LastResults, RaceEvent,
    Subject,
};

/// A load the app wants performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadRequest {
    /// Drivers' and constructors' standings
    Standings { season: i32, force: bool },
    /// Reconciled race calendar
    Season { season: i32, force: bool },
    /// Most recent results for a driver or constructor
    LastResults {
        subject: Subject,
        season: i32,
        n: u32,
        force: bool,
    },
}

/// Messages sent from a background load to the app
#[derive(Debug)]
pub enum LoadMessage {
    /// Standings loaded (or the first failing call's error)
    Standings(Result<(Vec<DriverStanding>, Vec<ConstructorStanding>), FetchError>),
    /// Season reconciled
    Season(Result<Vec<RaceEvent>, FetchError>),
    /// Last-N results loaded for `subject`
    LastResults {
        subject: Subject,
        result: Result<LastResults, FetchError>,
    },
}

/// Handle for one background load
pub struct LoadHandle {
    /// Channel for receiving the load result
    receiver: mpsc::Receiver<LoadMessage>,
    /// Signals the task to stop; `None` once used
    cancel_tx: Option<oneshot::Sender<()>>,
}

impl LoadHandle {
    /// Spawns `request` on the current tokio runtime
    ///
    /// # Arguments
    /// * `client` - API client; clones share the cache lock
    /// * `request` - What to load
    ///
    /// # Returns
    /// A handle that yields exactly one `LoadMessage` unless cancelled
    pub fn spawn(client: ErgastClient, request: LoadRequest) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel(1);
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            tokio::select! {
                message = run(&client, request) => {
                    let _ = msg_tx.send(message).await;
                }
                _ = cancel_rx => {
                    debug!("load cancelled");
                }
            }
        });

        Self {
            receiver: msg_rx,
            cancel_tx: Some(cancel_tx),
        }
    }

    /// Stops the load; no message will be delivered afterwards
    pub fn cancel(&mut self) {
        if let Some(tx) = self.cancel_tx.take() {
            let _ = tx.send(());
        }
        self.receiver.close();
    }

    /// Returns the result if the load has finished, without blocking
    pub fn try_recv(&mut self) -> Option<LoadMessage> {
        self.receiver.try_recv().ok()
    }

    /// Waits for the result; `None` if the load was cancelled
    pub async fn recv(&mut self) -> Option<LoadMessage> {
        self.receiver.recv().await
    }
}

async fn run(client: &ErgastClient, request: LoadRequest) -> LoadMessage {
    match request {
        LoadRequest::Standings { season, force } => {
            let standings = async {
                let drivers = client.driver_standings(season, force).await?;
                let constructors = client.constructor_standings(season, force).await?;
                Ok::<_, FetchError>((drivers, constructors))
            };
            LoadMessage::Standings(standings.await)
        }
        LoadRequest::Season { season, force } => {
            LoadMessage::Season(client.reconcile_season(season, force).await)
        }
        LoadRequest::LastResults {
            subject,
            season,
            n,
            force,
        } => {
            let result = client.last_results(&subject, season, n, force).await;
            LoadMessage::LastResults { subject, result }
        }
    }
}
