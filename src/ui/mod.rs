//! UI rendering module for pitwall
//!
//! This module contains all the rendering logic for the terminal user interface,
//! using the ratatui library for TUI components. Every screen shares the same
//! header and status line; overlays are drawn last, on top of the screen.

pub mod help_overlay;
pub mod races;
pub mod results_overlay;
pub mod standings;

use chrono::Local;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, Overlay, Status};
use crate::cli::Screen;

/// Renders the whole UI for the current application state
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Header
            Constraint::Min(3),    // Screen body
            Constraint::Length(1), // Status line
        ])
        .split(area);

    render_header(frame, app, chunks[0]);

    match app.screen {
        Screen::Standings => standings::render(frame, app, chunks[1]),
        Screen::Races => races::render(frame, app, chunks[1]),
    }

    render_status(frame, app, chunks[2]);

    match &app.overlay {
        Some(Overlay::Help) => help_overlay::render(frame),
        Some(Overlay::LastResults(subject)) => {
            results_overlay::render_last_results(frame, subject, app.last_results.as_ref())
        }
        Some(Overlay::Race(index)) => {
            if let Some(event) = app.races.get(*index) {
                results_overlay::render_race(frame, event);
            }
        }
        None => {}
    }
}

/// Renders the title, season and screen tabs
fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let tab = |label: &'static str, screen: Screen| {
        if app.screen == screen {
            Span::styled(
                format!(" {} ", label),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(format!(" {} ", label), Style::default().fg(Color::Gray))
        }
    };

    let separator = "─".repeat((area.width as usize).saturating_sub(2));
    let lines = vec![
        Line::from(vec![
            Span::styled(
                "PITWALL",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format!("Season {}", app.season),
                Style::default().fg(Color::White),
            ),
            Span::raw("  "),
            tab("Standings", Screen::Standings),
            Span::raw(" "),
            tab("Races", Screen::Races),
        ]),
        Line::from(Span::styled(
            separator,
            Style::default().fg(Color::DarkGray),
        )),
    ];

    frame.render_widget(Paragraph::new(lines), area);
}

/// Renders the status line: load progress, errors, or key hints with data freshness
fn render_status(frame: &mut Frame, app: &App, area: Rect) {
    let line = match &app.status {
        Status::Loading(message) => Line::from(vec![
            Span::styled(message.clone(), Style::default().fg(Color::Cyan)),
            Span::styled("  Esc", Style::default().fg(Color::Yellow)),
            Span::raw(" Cancel"),
        ]),
        Status::Error(message) => Line::from(vec![
            Span::styled(message.clone(), Style::default().fg(Color::Red)),
            Span::styled("  r", Style::default().fg(Color::Yellow)),
            Span::raw(" Retry"),
        ]),
        Status::Info(message) => {
            Line::from(Span::styled(message.clone(), Style::default().fg(Color::Yellow)))
        }
        Status::Idle => key_hints(app),
    };

    let paragraph = Paragraph::new(line).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

fn key_hints(app: &App) -> Line<'static> {
    let mut spans = vec![
        Span::styled("↑/↓", Style::default().fg(Color::Yellow)),
        Span::raw(" Navigate  "),
    ];
    if app.screen == Screen::Standings {
        spans.push(Span::styled("←/→", Style::default().fg(Color::Yellow)));
        spans.push(Span::raw(" Table  "));
    }
    spans.extend([
        Span::styled("Enter", Style::default().fg(Color::Yellow)),
        Span::raw(" Results  "),
        Span::styled("Tab", Style::default().fg(Color::Yellow)),
        Span::raw(" Screen  "),
        Span::styled("r", Style::default().fg(Color::Yellow)),
        Span::raw(" Refresh  "),
        Span::styled("?", Style::default().fg(Color::Yellow)),
        Span::raw(" Help  "),
        Span::styled("q", Style::default().fg(Color::Yellow)),
        Span::raw(" Quit"),
    ]);

    if let Some(last_refresh) = app.last_refresh {
        let elapsed = Local::now() - last_refresh;
        let mins_ago = elapsed.num_minutes();
        let freshness_text = if mins_ago < 1 {
            " │ Data: just now".to_string()
        } else if mins_ago < 60 {
            format!(" │ Data: {}m ago", mins_ago)
        } else {
            format!(" │ Data: {}h ago", elapsed.num_hours())
        };
        spans.push(Span::styled(
            freshness_text,
            Style::default().fg(Color::DarkGray),
        ));
    }

    Line::from(spans)
}

/// First row to draw so that `selected` stays inside a window of `visible` rows
pub(crate) fn scroll_offset(selected: usize, visible: usize) -> usize {
    if visible == 0 {
        return selected;
    }
    selected.saturating_sub(visible - 1)
}

/// Formats points without a trailing ".0" for whole numbers
pub(crate) fn format_points(points: f64) -> String {
    if points.fract() == 0.0 {
        format!("{:.0}", points)
    } else {
        format!("{}", points)
    }
}

/// Helper function to create a centered rect
pub(crate) fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);

    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length((area.height.saturating_sub(height)) / 2),
            Constraint::Length(height),
            Constraint::Length((area.height.saturating_sub(height)) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length((area.width.saturating_sub(width)) / 2),
            Constraint::Length(width),
            Constraint::Length((area.width.saturating_sub(width)) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}


#[cfg(test)]
mod tests {
    use super::test_support::{rendered_text, rendered_text_sized};
    use super::*;
    use crate::cli::StartupConfig;
    use crate::data::FetchError;
    use crate::refresh::LoadMessage;

    fn create_test_app(screen: Screen) -> App {
        let mut app = App::new(&StartupConfig {
            season: 2024,
            screen,
            ..StartupConfig::default()
        });
        app.take_requests();
        app
    }

    #[test]
    fn test_header_shows_season_and_tabs() {
        let app = create_test_app(Screen::Standings);
        let content = rendered_text(|frame| render(frame, &app));

        assert!(content.contains("PITWALL"));
        assert!(content.contains("Season 2024"));
        assert!(content.contains("Standings"));
        assert!(content.contains("Races"));
    }

    #[test]
    fn test_loading_status_is_rendered() {
        let app = create_test_app(Screen::Races);
        let content = rendered_text(|frame| render(frame, &app));
        assert!(content.contains("Loading race calendar"));
        assert!(content.contains("Cancel"));
    }

    #[test]
    fn test_error_status_is_rendered() {
        let mut app = create_test_app(Screen::Standings);
        app.apply(LoadMessage::Standings(Err(FetchError::Timeout {
            url: "http://api.jolpi.ca/ergast/f1/2024/driverstandings.json".to_string(),
        })));

        let content = rendered_text(|frame| render(frame, &app));
        assert!(content.contains("Error:"));
        assert!(content.contains("Retry"));
    }

    #[test]
    fn test_idle_status_shows_key_hints() {
        let mut app = create_test_app(Screen::Standings);
        app.apply(LoadMessage::Standings(Ok((Vec::new(), Vec::new()))));

        let content = rendered_text_sized(140, 24, |frame| render(frame, &app));
        assert!(content.contains("Navigate"));
        assert!(content.contains("Data: just now"));
    }

    #[test]
    fn test_help_overlay_drawn_on_top() {
        let mut app = create_test_app(Screen::Standings);
        app.overlay = Some(Overlay::Help);
        let content = rendered_text(|frame| render(frame, &app));
        assert!(content.contains("Keyboard Shortcuts"));
    }

    #[test]
    fn test_scroll_offset() {
        assert_eq!(scroll_offset(0, 10), 0);
        assert_eq!(scroll_offset(9, 10), 0);
        assert_eq!(scroll_offset(10, 10), 1);
        assert_eq!(scroll_offset(25, 10), 16);
        assert_eq!(scroll_offset(3, 0), 3);
    }

    #[test]
    fn test_format_points() {
        assert_eq!(format_points(25.0), "25");
        assert_eq!(format_points(0.0), "0");
        assert_eq!(format_points(12.5), "12.5");
    }

    #[test]
    fn test_centered_rect_fits_small_area() {
        let area = Rect::new(0, 0, 40, 10);
        let rect = centered_rect(60, 20, area);
        assert_eq!(rect.width, 40);
        assert_eq!(rect.height, 10);
    }
}
