//! pitwall - Formula 1 standings and results in the terminal
//!
//! A terminal UI application that shows the championship standings, the season
//! calendar with each race's status, and recent results for drivers and teams,
//! backed by the Ergast-compatible Jolpica API and a local response cache.

use std::io;
use std::panic;
use std::process;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};

use pitwall::app::App;
use pitwall::cli::{Cli, StartupConfig};
use pitwall::data::ErgastClient;
use pitwall::logging::{default_log_path, init_logging};
use pitwall::refresh::LoadHandle;
use pitwall::ui;

/// Sets up a panic hook that restores the terminal before printing the panic message.
/// This ensures the terminal is usable even if the application panics.
fn setup_panic_hook() {
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        // Attempt to restore the terminal
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        // Call the original panic hook
        original_hook(panic_info);
    }));
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(2);
        }
    };

    // Logging is best effort: the app still runs if the log file cannot be opened
    let log_path = cli.log_file.clone().unwrap_or_else(default_log_path);
    let _log_guard = match init_logging(cli.verbose, &log_path) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("warning: logging disabled ({}): {}", log_path.display(), e);
            None
        }
    };
    info!(
        season = config.season,
        cache = %config.client.cache_path.display(),
        base_url = %config.client.base_url,
        "starting"
    );

    let client = ErgastClient::new(config.client.clone());
    let mut app = App::new(&config);

    // Set up panic hook to restore terminal on crash
    setup_panic_hook();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app, &client).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    if let Err(e) = &result {
        error!("exiting with error: {}", e);
    }
    result
}

/// Main event loop: draw, spawn queued loads, collect finished ones, handle keys
async fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    client: &ErgastClient,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut loads: Vec<LoadHandle> = Vec::new();

    loop {
        for request in app.take_requests() {
            loads.push(LoadHandle::spawn(client.clone(), request));
        }

        loads.retain_mut(|handle| match handle.try_recv() {
            Some(message) => {
                app.apply(message);
                false
            }
            None => true,
        });

        terminal.draw(|f| ui::render(f, app))?;

        // Poll for keyboard events with 100ms timeout, yielding so loads make progress
        let has_event = tokio::task::block_in_place(|| event::poll(Duration::from_millis(100)))?;
        if has_event {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }

        if app.cancel_requested {
            for handle in loads.iter_mut() {
                handle.cancel();
            }
            loads.clear();
            app.loads_cancelled();
        }

        // Check if we should quit
        if app.should_quit {
            for handle in loads.iter_mut() {
                handle.cancel();
            }
            break;
        }
    }

    Ok(())
}
