use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::tui::app::App;

/// Render the time, date and greeting panel at the top of the screen
pub fn render_clock_panel(frame: &mut Frame, app: &App, area: Rect) {
    let theme = app.theme();
    let bg = theme.background;

    let lines = match (app.clock.latest(), app.clock.failure()) {
        (_, Some(err)) => vec![
            Line::from(Span::styled(
                "clock unavailable",
                Style::default().fg(theme.red).bg(bg),
            )),
            Line::from(Span::styled(
                err.to_string(),
                Style::default().fg(theme.dim).bg(bg),
            )),
        ],
        (Some(sample), None) => {
            let glyph = if sample.is_night { "\u{263E}" } else { "\u{2600}" };
            vec![
                Line::from(Span::styled(
                    sample.time_label(),
                    Style::default()
                        .fg(theme.text_bright)
                        .bg(bg)
                        .add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    sample.date_label(),
                    Style::default().fg(theme.text).bg(bg),
                )),
                Line::from(Span::styled(
                    format!("{} {}", glyph, sample.greeting()),
                    Style::default().fg(theme.highlight).bg(bg),
                )),
            ]
        }
        (None, None) => vec![Line::from(Span::styled(
            "--:--:--",
            Style::default().fg(theme.dim).bg(bg),
        ))],
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border).bg(bg))
        .style(Style::default().bg(bg));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
