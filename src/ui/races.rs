//! Race calendar screen rendering
//!
//! One row per round with its reconciled status. Completed rounds show the
//! winner; Enter on one of them opens the full classification.

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::scroll_offset;
use super::standings::truncate;
use crate::app::App;
use crate::data::{RaceEvent, RaceStatus};

/// Renders the calendar into `area`
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .title(format!(" {} Calendar ", app.season))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let mut lines = vec![
        summary_line(&app.races),
        Line::from(Span::styled(
            format!(
                "{:>3}  {:<10}  {:<26} {:<16} {:<12} {}",
                "Rnd", "Date", "Grand Prix", "Country", "Status", "Winner"
            ),
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];

    if app.races.is_empty() {
        let message = if app.is_loading() {
            "Loading…"
        } else {
            "No races for this season"
        };
        lines.push(Line::from(Span::styled(
            message,
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        // Borders, summary and header take four rows
        let visible = area.height.saturating_sub(4) as usize;
        let start = scroll_offset(app.race_index, visible);
        for (index, event) in app.races.iter().enumerate().skip(start).take(visible) {
            let row = race_row(event);
            if index == app.race_index {
                lines.push(row.style(Style::default().add_modifier(Modifier::REVERSED)));
            } else {
                lines.push(row);
            }
        }
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn summary_line(races: &[RaceEvent]) -> Line<'static> {
    let count = |status: RaceStatus| races.iter().filter(|e| e.status() == status).count();
    Line::from(vec![
        Span::styled(
            format!("{} completed", count(RaceStatus::Completed)),
            Style::default().fg(Color::Green),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{} awaiting results", count(RaceStatus::CompletedNoResults)),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw("  "),
        Span::styled(
            format!("{} scheduled", count(RaceStatus::Scheduled)),
            Style::default().fg(Color::Gray),
        ),
    ])
}

fn race_row(event: &RaceEvent) -> Line<'static> {
    let race = &event.race;
    let date = race
        .date
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "TBC".to_string());
    let winner = event
        .results()
        .first()
        .map(|r| r.driver.clone())
        .unwrap_or_default();

    Line::from(vec![
        Span::raw(format!(
            "{:>3}  {:<10}  {:<26} {:<16} ",
            race.round,
            date,
            truncate(&race.name, 26),
            truncate(&race.country, 16)
        )),
        Span::styled(format!("{:<12}", status_label(event.status())), status_style(event.status())),
        Span::raw(format!(" {}", winner)),
    ])
}

/// Display text for a status
pub(crate) fn status_label(status: RaceStatus) -> &'static str {
    match status {
        RaceStatus::Completed => "✓ Completed",
        RaceStatus::CompletedNoResults => "No results",
        RaceStatus::Scheduled => "Scheduled",
    }
}

fn status_style(status: RaceStatus) -> Style {
    match status {
        RaceStatus::Completed => Style::default().fg(Color::Green),
        RaceStatus::CompletedNoResults => Style::default().fg(Color::Yellow),
        RaceStatus::Scheduled => Style::default().fg(Color::Gray),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Screen, StartupConfig};
    use crate::data::{Finish, Race, RaceOutcome, ResultRecord};
    use crate::refresh::LoadMessage;
    use crate::ui::test_support::rendered_text_sized;
    use chrono::NaiveDate;

    fn event(round: u32, name: &str, outcome: RaceOutcome) -> RaceEvent {
        RaceEvent {
            race: Race {
                round,
                name: name.to_string(),
                date: NaiveDate::from_ymd_opt(2025, 3, round * 7),
                circuit: String::new(),
                locality: String::new(),
                country: "Somewhere".to_string(),
            },
            outcome,
        }
    }

    fn winner() -> ResultRecord {
        ResultRecord {
            position: Some(1),
            position_text: "1".to_string(),
            driver: "Lando Norris".to_string(),
            code: "NOR".to_string(),
            constructor: "McLaren".to_string(),
            grid: Some(1),
            points: 25.0,
            laps: Some(57),
            finish: Finish::Time("1:42:06.304".to_string()),
        }
    }

    fn create_test_app() -> App {
        let mut app = App::new(&StartupConfig {
            season: 2025,
            screen: Screen::Races,
            ..StartupConfig::default()
        });
        app.take_requests();
        app.apply(LoadMessage::Season(Ok(vec![
            event(1, "Australian Grand Prix", RaceOutcome::Completed(vec![winner()])),
            event(2, "Chinese Grand Prix", RaceOutcome::CompletedNoResults),
            event(3, "Japanese Grand Prix", RaceOutcome::Scheduled),
        ])));
        app
    }

    #[test]
    fn test_calendar_rows_show_status() {
        let app = create_test_app();
        let content = rendered_text_sized(120, 24, |frame| {
            let area = frame.area();
            render(frame, &app, area)
        });

        assert!(content.contains("2025 Calendar"));
        assert!(content.contains("Australian Grand Prix"));
        assert!(content.contains("Lando Norris"));
        assert!(content.contains("No results"));
        assert!(content.contains("Scheduled"));
        assert!(content.contains("1 completed"));
        assert!(content.contains("1 awaiting results"));
        assert!(content.contains("1 scheduled"));
    }

    #[test]
    fn test_empty_calendar_message() {
        let mut app = create_test_app();
        app.races.clear();
        let content = rendered_text_sized(120, 24, |frame| {
            let area = frame.area();
            render(frame, &app, area)
        });
        assert!(content.contains("No races for this season"));
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(status_label(RaceStatus::Scheduled), "Scheduled");
        assert_eq!(status_label(RaceStatus::CompletedNoResults), "No results");
    }
}
