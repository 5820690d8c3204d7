//! Standings screen rendering
//!
//! Drivers' championship on the left, constructors' on the right. The focused
//! table has a highlighted border and its selected row is inverted.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{format_points, scroll_offset};
use crate::app::{App, Panel};
use crate::data::{ConstructorStanding, DriverStanding};

/// Renders both standings tables into `area`
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let drivers_focused = app.focus == Panel::Drivers;

    let driver_rows: Vec<Line> = app.drivers.iter().map(driver_row).collect();
    render_table(
        frame,
        columns[0],
        " Drivers ",
        driver_header(),
        driver_rows,
        app.driver_index,
        drivers_focused,
        empty_message(app),
    );

    let constructor_rows: Vec<Line> = app.constructors.iter().map(constructor_row).collect();
    render_table(
        frame,
        columns[1],
        " Constructors ",
        constructor_header(),
        constructor_rows,
        app.constructor_index,
        !drivers_focused,
        empty_message(app),
    );
}

fn empty_message(app: &App) -> &'static str {
    if app.is_loading() {
        "Loading…"
    } else {
        "No standings for this season"
    }
}

#[allow(clippy::too_many_arguments)]
fn render_table(
    frame: &mut Frame,
    area: Rect,
    title: &'static str,
    header: Line<'static>,
    rows: Vec<Line<'static>>,
    selected: usize,
    focused: bool,
    empty: &'static str,
) {
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color));

    let mut lines = vec![header];
    if rows.is_empty() {
        lines.push(Line::from(Span::styled(
            empty,
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        // Borders and header take three rows
        let visible = area.height.saturating_sub(3) as usize;
        let start = scroll_offset(selected, visible);
        for (index, row) in rows.into_iter().enumerate().skip(start).take(visible) {
            if focused && index == selected {
                lines.push(row.style(Style::default().add_modifier(Modifier::REVERSED)));
            } else {
                lines.push(row);
            }
        }
    }

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn driver_header() -> Line<'static> {
    Line::from(Span::styled(
        format!(
            "{:>3}  {:<22} {:<16} {:>6} {:>4}",
            "Pos", "Driver", "Team", "Pts", "Wins"
        ),
        Style::default().add_modifier(Modifier::BOLD),
    ))
}

fn driver_row(standing: &DriverStanding) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{:>3}  ", standing.position_text),
            position_style(standing.position),
        ),
        Span::raw(format!(
            "{:<22} {:<16} ",
            truncate(&standing.driver, 22),
            truncate(&standing.team, 16)
        )),
        Span::styled(
            format!("{:>6}", format_points(standing.points)),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(format!(" {:>4}", standing.wins)),
    ])
}

fn constructor_header() -> Line<'static> {
    Line::from(Span::styled(
        format!("{:>3}  {:<18} {:>6} {:>4}", "Pos", "Team", "Pts", "Wins"),
        Style::default().add_modifier(Modifier::BOLD),
    ))
}

fn constructor_row(standing: &ConstructorStanding) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{:>3}  ", standing.position_text),
            position_style(standing.position),
        ),
        Span::raw(format!("{:<18} ", truncate(&standing.name, 18))),
        Span::styled(
            format!("{:>6}", format_points(standing.points)),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(format!(" {:>4}", standing.wins)),
    ])
}

/// Podium positions get medal colors
fn position_style(position: Option<u32>) -> Style {
    match position {
        Some(1) => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        Some(2) => Style::default().fg(Color::White),
        Some(3) => Style::default().fg(Color::LightRed),
        _ => Style::default().fg(Color::Gray),
    }
}

/// Cuts `text` to at most `max` characters
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}
