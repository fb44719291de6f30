use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::tui::app::{App, Field, Mode};
use crate::tui::text_input::TextInput;

use super::helpers::truncate_to_width;

const TEXT_LABEL: &str = " Task  ";
const NOTE_LABEL: &str = " Note  ";

/// Render the two-field input box (task text and description)
pub fn render_input_box(frame: &mut Frame, app: &App, area: Rect) {
    let theme = app.theme();
    let bg = theme.background;
    let active = app.mode != Mode::Navigate;

    let title = match app.mode {
        Mode::Navigate => " press a to add a task ",
        Mode::Add => " New task ",
        Mode::Edit => " Edit task ",
    };
    let border_color = if active { theme.highlight } else { theme.border };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(
            title,
            Style::default().fg(border_color).bg(bg),
        ))
        .border_style(Style::default().fg(border_color).bg(bg))
        .style(Style::default().bg(bg));
    let inner = block.inner(area);

    let avail = (inner.width as usize).saturating_sub(TEXT_LABEL.len());
    let field_line = |label: &'static str, input: &TextInput, focused: bool| {
        let label_style = if focused && active {
            Style::default()
                .fg(theme.highlight)
                .bg(bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.dim).bg(bg)
        };
        Line::from(vec![
            Span::styled(label, label_style),
            Span::styled(
                truncate_to_width(input.value(), avail),
                Style::default().fg(theme.text_bright).bg(bg),
            ),
        ])
    };

    let lines = vec![
        field_line(TEXT_LABEL, &app.text_input, app.field == Field::Text),
        field_line(
            NOTE_LABEL,
            &app.desc_input,
            app.field == Field::Description,
        ),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(block).style(Style::default().bg(bg)),
        area,
    );

    if active && !app.show_help && inner.height >= 2 {
        let (input, row) = match app.field {
            Field::Text => (&app.text_input, inner.y),
            Field::Description => (&app.desc_input, inner.y + 1),
        };
        let col = input.cursor_col().min(avail.saturating_sub(1)) + TEXT_LABEL.len();
        frame.set_cursor_position((inner.x + col as u16, row));
    }
}
