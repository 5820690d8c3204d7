//! Application state management for pitwall
//!
//! This module contains the main application state, handling keyboard input,
//! queuing background loads and applying their results. It never touches the
//! network itself: the main loop drains `take_requests` into `LoadHandle`s and
//! feeds their messages back through `apply`.

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent};

use crate::cli::{Screen, StartupConfig};
use crate::data::{ConstructorStanding, DriverStanding, LastResults, RaceEvent, RaceStatus, Subject};
use crate::refresh::{LoadMessage, LoadRequest};

/// Which standings table has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Drivers,
    Constructors,
}

/// Modal drawn on top of the current screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    /// Keyboard shortcuts
    Help,
    /// Recent results for the subject; `None` while loading
    LastResults(Subject),
    /// Classification of the race at this index in `races`
    Race(usize),
}

/// What the status line shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Idle,
    Loading(String),
    Error(String),
    Info(String),
}

/// Main application struct managing state and data
pub struct App {
    /// Current screen
    pub screen: Screen,
    /// Open modal, if any
    pub overlay: Option<Overlay>,
    /// Focused standings table
    pub focus: Panel,
    /// Season shown on every screen
    pub season: i32,
    /// Size of the last-N window
    pub last_n: u32,
    pub drivers: Vec<DriverStanding>,
    pub constructors: Vec<ConstructorStanding>,
    pub races: Vec<RaceEvent>,
    /// Selected row in each list
    pub driver_index: usize,
    pub constructor_index: usize,
    pub race_index: usize,
    /// Result of the most recent last-N load
    pub last_results: Option<LastResults>,
    /// Status line content
    pub status: Status,
    /// Timestamp of last successful load
    pub last_refresh: Option<DateTime<Local>>,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag asking the main loop to cancel in-flight loads
    pub cancel_requested: bool,
    /// Loads waiting to be spawned
    pending: Vec<LoadRequest>,
    /// Loads spawned and not yet applied
    in_flight: usize,
    /// Whether the calendar has been requested at least once
    season_requested: bool,
}

impl App {
    /// Creates the app and queues the load for the starting screen
    pub fn new(config: &StartupConfig) -> Self {
        let mut app = Self {
            screen: config.screen,
            overlay: None,
            focus: Panel::Drivers,
            season: config.season,
            last_n: config.last_n,
            drivers: Vec::new(),
            constructors: Vec::new(),
            races: Vec::new(),
            driver_index: 0,
            constructor_index: 0,
            race_index: 0,
            last_results: None,
            status: Status::Idle,
            last_refresh: None,
            should_quit: false,
            cancel_requested: false,
            pending: Vec::new(),
            in_flight: 0,
            season_requested: false,
        };
        app.load_screen(config.force_first_load);
        app
    }

    /// Whether any load is queued or running
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0 || !self.pending.is_empty()
    }

    /// Hands queued loads to the caller, counting them as in flight
    pub fn take_requests(&mut self) -> Vec<LoadRequest> {
        let requests = std::mem::take(&mut self.pending);
        self.in_flight += requests.len();
        requests
    }

    /// Marks every in-flight load as abandoned after the caller cancelled them
    pub fn loads_cancelled(&mut self) {
        self.cancel_requested = false;
        self.in_flight = 0;
        self.pending.clear();
        if matches!(self.overlay, Some(Overlay::LastResults(_))) && self.last_results.is_none() {
            self.overlay = None;
        }
        self.status = Status::Info("Cancelled".to_string());
    }

    fn queue(&mut self, request: LoadRequest, label: &str) {
        self.pending.push(request);
        self.status = Status::Loading(format!("Loading {}…", label));
    }

    /// Queues the load backing the current screen
    fn load_screen(&mut self, force: bool) {
        let season = self.season;
        match self.screen {
            Screen::Standings => {
                self.queue(LoadRequest::Standings { season, force }, "standings");
            }
            Screen::Races => {
                self.season_requested = true;
                self.queue(LoadRequest::Season { season, force }, "race calendar");
            }
        }
    }

    /// Applies the outcome of a background load
    pub fn apply(&mut self, message: LoadMessage) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match message {
            LoadMessage::Standings(Ok((drivers, constructors))) => {
                self.drivers = drivers;
                self.constructors = constructors;
                self.driver_index = clamp_index(self.driver_index, self.drivers.len());
                self.constructor_index =
                    clamp_index(self.constructor_index, self.constructors.len());
                self.loaded();
            }
            LoadMessage::Season(Ok(races)) => {
                self.races = races;
                self.race_index = clamp_index(self.race_index, self.races.len());
                self.loaded();
            }
            LoadMessage::LastResults { subject, result } => {
                // A late answer for an overlay that has since been closed or replaced
                // must not touch the one on screen.
                let is_open = self.overlay == Some(Overlay::LastResults(subject));
                match result {
                    Ok(results) => {
                        if is_open {
                            self.last_results = Some(results);
                        }
                        self.loaded();
                    }
                    Err(e) => {
                        if is_open {
                            self.close_overlay();
                        }
                        self.status = Status::Error(format!("Error: {}", e));
                    }
                }
            }
            LoadMessage::Standings(Err(e)) | LoadMessage::Season(Err(e)) => {
                self.status = Status::Error(format!("Error: {}", e));
            }
        }
    }

    fn loaded(&mut self) {
        self.last_refresh = Some(Local::now());
        if !self.is_loading() {
            self.status = Status::Idle;
        }
    }

    /// Subject under the cursor on the standings screen
    ///
    /// `None` for a row without an API identifier, which has no results endpoint.
    pub fn selected_subject(&self) -> Option<Subject> {
        match self.focus {
            Panel::Drivers => self
                .drivers
                .get(self.driver_index)
                .filter(|d| !d.driver_id.is_empty())
                .map(|d| Subject::Driver {
                    id: d.driver_id.clone(),
                    name: d.driver.clone(),
                }),
            Panel::Constructors => self
                .constructors
                .get(self.constructor_index)
                .filter(|c| !c.constructor_id.is_empty())
                .map(|c| Subject::Constructor {
                    id: c.constructor_id.clone(),
                    name: c.name.clone(),
                }),
        }
    }

    /// Handles keyboard input and updates state accordingly
    ///
    /// # Key Bindings
    /// - `q`: Quit
    /// - `Tab`: Switch between standings and race calendar
    /// - `Up`/`k`, `Down`/`j`: Move selection
    /// - `Left`/`h`, `Right`/`l`: Focus drivers / constructors (standings)
    /// - `Enter`: Last results for the selection, or results of the selected race
    /// - `r`: Refresh the current screen or results overlay, bypassing the cache
    /// - `Esc`: Close the overlay, or cancel loading
    /// - `?`: Toggle help
    pub fn handle_key(&mut self, key_event: KeyEvent) {
        if let Some(overlay) = self.overlay.clone() {
            match (overlay, key_event.code) {
                (_, KeyCode::Char('q')) => self.should_quit = true,
                (_, KeyCode::Esc) | (Overlay::Help, KeyCode::Char('?')) => self.close_overlay(),
                (Overlay::LastResults(subject), KeyCode::Char('r')) => {
                    self.request_last_results(subject, true);
                }
                _ => {}
            }
            return;
        }

        match key_event.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.overlay = Some(Overlay::Help),
            KeyCode::Esc => {
                if self.is_loading() {
                    self.cancel_requested = true;
                }
            }
            KeyCode::Tab => self.switch_screen(),
            KeyCode::Char('r') => self.load_screen(true),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Left | KeyCode::Char('h') if self.screen == Screen::Standings => {
                self.focus = Panel::Drivers;
            }
            KeyCode::Right | KeyCode::Char('l') if self.screen == Screen::Standings => {
                self.focus = Panel::Constructors;
            }
            KeyCode::Enter => self.open_selection(),
            _ => {}
        }
    }

    fn close_overlay(&mut self) {
        self.overlay = None;
        self.last_results = None;
    }

    fn switch_screen(&mut self) {
        self.screen = match self.screen {
            Screen::Standings => Screen::Races,
            Screen::Races => Screen::Standings,
        };
        let needs_load = match self.screen {
            Screen::Standings => self.drivers.is_empty() && self.constructors.is_empty(),
            Screen::Races => !self.season_requested,
        };
        if needs_load {
            self.load_screen(false);
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let (index, len) = match (self.screen, self.focus) {
            (Screen::Races, _) => (&mut self.race_index, self.races.len()),
            (Screen::Standings, Panel::Drivers) => (&mut self.driver_index, self.drivers.len()),
            (Screen::Standings, Panel::Constructors) => {
                (&mut self.constructor_index, self.constructors.len())
            }
        };
        if len == 0 {
            return;
        }
        // Wrap around at both ends
        *index = (*index as isize + delta).rem_euclid(len as isize) as usize;
    }

    /// Opens the last-N overlay for `subject` and queues its load
    fn request_last_results(&mut self, subject: Subject, force: bool) {
        self.last_results = None;
        self.overlay = Some(Overlay::LastResults(subject.clone()));
        let label = format!("results for {}", subject.name());
        self.queue(
            LoadRequest::LastResults {
                subject,
                season: self.season,
                n: self.last_n,
                force,
            },
            &label,
        );
    }

    fn open_selection(&mut self) {
        match self.screen {
            Screen::Standings => {
                if let Some(subject) = self.selected_subject() {
                    self.request_last_results(subject, false);
                }
            }
            Screen::Races => {
                let Some(event) = self.races.get(self.race_index) else {
                    return;
                };
                match event.status() {
                    RaceStatus::Completed => self.overlay = Some(Overlay::Race(self.race_index)),
                    RaceStatus::CompletedNoResults => {
                        self.status = Status::Info(format!("No results yet for {}", event.race.name));
                    }
                    RaceStatus::Scheduled => {
                        self.status = Status::Info(format!("{} has not been run", event.race.name));
                    }
                }
            }
        }
    }
}

fn clamp_index(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}
