use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::cli::output::format_counts;
use crate::ops::task_store::PersistStatus;
use crate::tui::app::{App, Mode};

use super::helpers::{spans_width, truncate_to_width};

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let theme = app.theme();
    let bg = theme.background;
    let width = area.width as usize;

    let mut spans = vec![
        Span::styled(
            format!(" {}", format_counts(app.tasks.counts())),
            Style::default().fg(theme.text).bg(bg),
        ),
        Span::styled(
            format!("  [{}]", app.filter.label()),
            Style::default().fg(theme.dim).bg(bg),
        ),
    ];

    if let PersistStatus::Degraded(reason) = app.tasks.persist_status() {
        spans.push(Span::styled(
            format!("  \u{26A0} not saved: {}", reason),
            Style::default().fg(theme.red).bg(bg),
        ));
    }

    let hint = match (&app.message, app.mode) {
        (Some(msg), _) => msg.as_str(),
        (None, Mode::Navigate) => "? help",
        (None, _) => "Enter save  Tab switch  Esc cancel",
    };
    let hint_style = if app.message.is_some() {
        Style::default().fg(theme.highlight).bg(bg)
    } else {
        Style::default().fg(theme.dim).bg(bg)
    };

    let content_width = spans_width(&spans);
    let hint_width = unicode_width::UnicodeWidthStr::width(hint) + 1;
    if content_width + hint_width < width {
        let padding = width - content_width - hint_width;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(format!("{} ", hint), hint_style));
    } else if content_width > width {
        let text: String = spans.iter().map(|s| s.content.as_ref()).collect();
        spans = vec![Span::styled(
            truncate_to_width(&text, width),
            Style::default().fg(theme.text).bg(bg),
        )];
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
