use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;

const LIST_BINDINGS: &[(&str, &str)] = &[
    (" \u{2191}\u{2193}/jk", "Move cursor up/down"),
    (" g/G", "Jump to top/bottom"),
    (" Space/x", "Mark done / not done"),
    (" Enter/e", "Edit task"),
    (" d/Del", "Delete task"),
    (" a/i", "Add a task"),
    (" f", "Cycle filter: all, active, done"),
    (" q", "Quit"),
];

const INPUT_BINDINGS: &[(&str, &str)] = &[
    (" Tab", "Switch between text and note"),
    (" Enter", "Save"),
    (" Esc", "Cancel"),
    (" Ctrl-U", "Clear to start of field"),
];

/// Render the help overlay (toggled with ?)
pub fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    // Center the overlay, leaving some margin
    let overlay_area = centered_rect(60, 80, area);

    // Clear the area behind the overlay
    frame.render_widget(Clear, overlay_area);

    let theme = app.theme();
    let bg = theme.background;

    let key_style = Style::default()
        .fg(theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(theme.text).bg(bg);
    let header_style = Style::default()
        .fg(theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(Span::styled(" Key Bindings", header_style)));
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(" Task list", header_style)));
    for &(key, desc) in LIST_BINDINGS {
        add_binding(&mut lines, key, desc, key_style, desc_style);
    }
    lines.push(Line::from(""));

    lines.push(Line::from(Span::styled(" Adding and editing", header_style)));
    for &(key, desc) in INPUT_BINDINGS {
        add_binding(&mut lines, key, desc, key_style, desc_style);
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " ? or Esc to close",
        Style::default().fg(theme.dim).bg(bg),
    )));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.highlight).bg(bg))
        .style(Style::default().bg(bg));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .style(Style::default().bg(bg));

    frame.render_widget(paragraph, overlay_area);
}

fn add_binding<'a>(
    lines: &mut Vec<Line<'a>>,
    key: &'a str,
    desc: &'a str,
    key_style: Style,
    desc_style: Style,
) {
    let key_width = 14;
    let padded_key = format!("{:<width$}", key, width = key_width);
    lines.push(Line::from(vec![
        Span::styled(padded_key, key_style),
        Span::styled(desc, desc_style),
    ]));
}

/// Create a centered rectangle of the given percentage of the parent
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::render;
    use crate::tui::render::test_helpers::{TERM_H, TERM_W, app_at, render_to_string};

    #[test]
    fn centered_rect_is_inside_parent() {
        let area = Rect::new(0, 0, 100, 50);
        let r = centered_rect(60, 80, area);
        assert_eq!(r.width, 60);
        assert_eq!(r.height, 40);
        assert_eq!(r.x, 20);
        assert_eq!(r.y, 5);
    }

    #[test]
    fn overlay_lists_bindings() {
        let mut app = app_at(9);
        app.show_help = true;
        let output = render_to_string(TERM_W, TERM_H + 6, |frame, _| {
            render(frame, &mut app);
        });
        assert!(output.contains("Key Bindings"));
        assert!(output.contains("Cycle filter"));
        assert!(output.contains("Switch between text and note"));
    }
}
