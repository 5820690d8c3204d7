//! Result overlays
//!
//! Modal tables for a driver's or constructor's most recent results and for
//! the full classification of a completed race.

use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::standings::truncate;
use super::{centered_rect, format_points};
use crate::data::{LastResults, RaceEvent, ResultRecord, Subject};

/// Renders the last-N overlay; `results` is `None` while the load is running
pub fn render_last_results(frame: &mut Frame, subject: &Subject, results: Option<&LastResults>) {
    let per_car = matches!(subject, Subject::Constructor { .. });

    let mut lines = Vec::new();
    match results {
        None => lines.push(Line::from(Span::styled(
            "Loading…",
            Style::default().fg(Color::Cyan),
        ))),
        Some(results) if results.entries.is_empty() => lines.push(Line::from(Span::styled(
            "No results this season",
            Style::default().fg(Color::DarkGray),
        ))),
        Some(results) => {
            lines.push(Line::from(Span::styled(
                if per_car {
                    format!(
                        "{:>3}  {:<24} {:<18} {:>4} {:>4} {:>4}  {}",
                        "Rnd", "Grand Prix", "Driver", "Grid", "Pos", "Pts", "Finish"
                    )
                } else {
                    format!(
                        "{:>3}  {:<24} {:>4} {:>4} {:>4}  {}",
                        "Rnd", "Grand Prix", "Grid", "Pos", "Pts", "Finish"
                    )
                },
                Style::default().add_modifier(Modifier::BOLD),
            )));

            // Most recent first
            for entry in results.entries.iter().rev() {
                let race = format!(
                    "{:>3}  {:<24} ",
                    entry.round,
                    truncate(&entry.race_name, 24)
                );
                let driver = if per_car {
                    format!("{:<18} ", truncate(&entry.result.driver, 18))
                } else {
                    String::new()
                };
                let mut spans = vec![Span::raw(race + &driver)];
                spans.extend(result_spans(&entry.result));
                lines.push(Line::from(spans));
            }

            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!(
                    "Showing {} of {} results this season",
                    results.entries.len(),
                    results.total
                ),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    let title = format!(" Recent results: {} ", subject.name());
    render_modal(frame, title, lines, if per_car { 78 } else { 60 });
}

/// Renders the classification of a completed race
pub fn render_race(frame: &mut Frame, event: &RaceEvent) {
    let race = &event.race;
    let mut lines = vec![
        Line::from(Span::styled(
            format!(
                "{}, {}{}",
                race.circuit,
                race.locality,
                race.date
                    .map(|d| format!("  {}", d.format("%d %b %Y")))
                    .unwrap_or_default()
            ),
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            format!(
                "{:>3}  {:<22} {:<16} {:>4} {:>4} {:>4}  {}",
                "Pos", "Driver", "Team", "Grid", "Laps", "Pts", "Finish"
            ),
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];

    for result in event.results() {
        let laps = result.laps.map(|l| l.to_string()).unwrap_or_default();
        lines.push(Line::from(vec![
            Span::styled(
                format!("{:>3}  ", result.position_text),
                Style::default().fg(Color::White),
            ),
            Span::raw(format!(
                "{:<22} {:<16} {:>4} {:>4} ",
                truncate(&result.driver, 22),
                truncate(&result.constructor, 16),
                grid_label(result.grid),
                laps
            )),
            Span::styled(
                format!("{:>4}", format_points(result.points)),
                Style::default().fg(Color::Yellow),
            ),
            Span::raw(format!("  {}", result.finish.label())),
        ]));
    }

    let title = format!(" Round {}: {} ", race.round, race.name);
    render_modal(frame, title, lines, 78);
}

/// Grid, points and finish columns shared by the last-N rows
fn result_spans(result: &ResultRecord) -> Vec<Span<'static>> {
    vec![
        Span::raw(format!(
            "{:>4} {:>4} ",
            grid_label(result.grid),
            result.position_text
        )),
        Span::styled(
            format!("{:>4}", format_points(result.points)),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(format!("  {}", result.finish.label())),
    ]
}

/// Grid slot 0 means a pit lane start
fn grid_label(grid: Option<u32>) -> String {
    match grid {
        Some(0) => "PL".to_string(),
        Some(slot) => slot.to_string(),
        None => String::new(),
    }
}

fn render_modal(frame: &mut Frame, title: String, mut lines: Vec<Line<'static>>, width: u16) {
    lines.push(Line::from(Span::styled(
        "Press Esc to close",
        Style::default().fg(Color::DarkGray),
    )));

    // Content plus the two border rows
    let height = lines.len() as u16 + 2;
    let area = centered_rect(width, height, frame.area());
    frame.render_widget(Clear, area);

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Finish, Race, RaceOutcome, SeasonResult};
    use crate::ui::test_support::{rendered_text, rendered_text_sized};

    fn result(driver: &str, position: u32, finish: Finish) -> ResultRecord {
        ResultRecord {
            position: Some(position),
            position_text: position.to_string(),
            driver: driver.to_string(),
            code: String::new(),
            constructor: "Ferrari".to_string(),
            grid: Some(0),
            points: 10.0,
            laps: Some(58),
            finish,
        }
    }

    fn season_result(round: u32, name: &str) -> SeasonResult {
        SeasonResult {
            round,
            race_name: name.to_string(),
            date: None,
            result: result("Charles Leclerc", 4, Finish::Status("+1 Lap".into())),
        }
    }

    fn leclerc() -> Subject {
        Subject::Driver {
            id: "leclerc".into(),
            name: "Charles Leclerc".into(),
        }
    }

    #[test]
    fn test_last_results_loading() {
        let subject = leclerc();
        let content = rendered_text(|frame| render_last_results(frame, &subject, None));
        assert!(content.contains("Recent results: Charles Leclerc"));
        assert!(content.contains("Loading…"));
    }

    #[test]
    fn test_last_results_most_recent_first() {
        let subject = leclerc();
        let results = LastResults {
            subject: subject.clone(),
            total: 12,
            offset: 10,
            entries: vec![
                season_result(11, "Austrian Grand Prix"),
                season_result(12, "British Grand Prix"),
            ],
        };

        let content = rendered_text(|frame| render_last_results(frame, &subject, Some(&results)));

        let british = content.find("British Grand Prix").unwrap();
        let austrian = content.find("Austrian Grand Prix").unwrap();
        assert!(british < austrian, "latest round should be listed first");
        assert!(content.contains("Showing 2 of 12"));
        assert!(content.contains("+1 Lap"));
        assert!(content.contains("PL"));
    }

    #[test]
    fn test_last_results_empty_season() {
        let subject = leclerc();
        let results = LastResults {
            subject: subject.clone(),
            total: 0,
            offset: 0,
            entries: Vec::new(),
        };
        let content = rendered_text(|frame| render_last_results(frame, &subject, Some(&results)));
        assert!(content.contains("No results this season"));
    }

    #[test]
    fn test_race_classification() {
        let event = RaceEvent {
            race: Race {
                round: 8,
                name: "Monaco Grand Prix".to_string(),
                date: None,
                circuit: "Circuit de Monaco".to_string(),
                locality: "Monte-Carlo".to_string(),
                country: "Monaco".to_string(),
            },
            outcome: RaceOutcome::Completed(vec![
                result("Lando Norris", 1, Finish::Time("1:40:33.843".into())),
                result("Charles Leclerc", 2, Finish::Time("+3.131".into())),
            ]),
        };

        let content = rendered_text_sized(100, 24, |frame| render_race(frame, &event));
        assert!(content.contains("Round 8: Monaco Grand Prix"));
        assert!(content.contains("Circuit de Monaco"));
        assert!(content.contains("1:40:33.843"));
        assert!(content.contains("+3.131"));
    }

    #[test]
    fn test_grid_label() {
        assert_eq!(grid_label(Some(0)), "PL");
        assert_eq!(grid_label(Some(7)), "7");
        assert_eq!(grid_label(None), "");
    }
}
