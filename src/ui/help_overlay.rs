//! Help overlay showing all keybindings
//!
//! Renders a centered modal overlay with keyboard shortcuts.

use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::centered_rect;

/// Renders the help overlay on top of the current view
pub fn render(frame: &mut Frame) {
    let overlay_area = centered_rect(54, 20, frame.area());

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let lines = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section("Navigation"),
        help_line("↑/k, ↓/j", "Move selection up/down"),
        help_line("←/h, →/l", "Drivers / constructors table"),
        help_line("Tab", "Switch standings / race calendar"),
        help_line("Esc", "Close overlay / cancel loading"),
        help_line("q", "Quit application"),
        Line::from(""),
        section("Results"),
        help_line("Enter", "Last results for driver or team"),
        help_line("", "Classification of a completed race"),
        Line::from(""),
        section("Other"),
        help_line("r", "Refresh, bypassing the cache"),
        help_line("?", "Toggle this help"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Esc or ? to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, overlay_area);
}

fn section(title: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        title,
        Style::default().add_modifier(Modifier::BOLD),
    ))
}

/// Creates a help line with key and description
fn help_line(key: &str, description: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<12}", key), Style::default().fg(Color::Yellow)),
        Span::raw(description.to_string()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::test_support::rendered_text;

    #[test]
    fn test_help_overlay_renders() {
        let content = rendered_text(render);

        assert!(content.contains("Help"), "Should render help title");
        assert!(
            content.contains("Navigation"),
            "Should show navigation section"
        );
        assert!(content.contains("bypassing the cache"));
    }
}
