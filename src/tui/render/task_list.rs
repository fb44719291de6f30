use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::cli::output::{EMPTY_HINT, EMPTY_TITLE};
use crate::tui::app::App;

use super::helpers::{check_symbol, spans_width, truncate_to_width};

/// Render the (filtered) task list, newest first
pub fn render_task_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let theme = app.theme().clone();
    let bg = theme.background;

    if app.tasks.is_empty() {
        let top = area.height.saturating_sub(2) / 2;
        let mut lines: Vec<Line> = (0..top).map(|_| Line::from("")).collect();
        lines.push(Line::from(Span::styled(
            EMPTY_TITLE,
            Style::default()
                .fg(theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            EMPTY_HINT,
            Style::default().fg(theme.dim).bg(bg),
        )));
        frame.render_widget(
            Paragraph::new(lines)
                .alignment(Alignment::Center)
                .style(Style::default().bg(bg)),
            area,
        );
        return;
    }

    let height = area.height as usize;
    if height == 0 {
        return;
    }
    if app.cursor < app.scroll_offset {
        app.scroll_offset = app.cursor;
    } else if app.cursor >= app.scroll_offset + height {
        app.scroll_offset = app.cursor + 1 - height;
    }

    let width = area.width as usize;
    let editing = app.tasks.edit_session().map(|s| s.id);
    let visible = app.visible_tasks();

    if visible.is_empty() {
        let line = Line::from(Span::styled(
            format!("  No {} tasks", app.filter.label()),
            Style::default().fg(theme.dim).bg(bg),
        ));
        frame.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), area);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    for (idx, task) in visible
        .iter()
        .enumerate()
        .skip(app.scroll_offset)
        .take(height)
    {
        let selected = idx == app.cursor;
        let row_bg = if selected { theme.selection_bg } else { bg };

        let marker = if selected { "\u{25B8} " } else { "  " };
        let mut text_style = Style::default().fg(theme.text).bg(row_bg);
        let mut check_style = Style::default().fg(theme.dim).bg(row_bg);
        if task.completed {
            text_style = text_style
                .fg(theme.dim)
                .add_modifier(Modifier::CROSSED_OUT);
            check_style = check_style.fg(theme.done);
        }
        if selected {
            text_style = text_style.add_modifier(Modifier::BOLD);
        }

        let mut spans = vec![
            Span::styled(marker, Style::default().fg(theme.highlight).bg(row_bg)),
            Span::styled(format!("{} ", check_symbol(task)), check_style),
        ];
        let mut suffix = Vec::new();
        if editing == Some(task.id) {
            suffix.push(Span::styled(
                " (editing)",
                Style::default().fg(theme.highlight).bg(row_bg),
            ));
        }

        let fixed = spans_width(&spans) + spans_width(&suffix);
        let text = truncate_to_width(&task.text, width.saturating_sub(fixed));
        spans.push(Span::styled(text, text_style));

        if !task.description.is_empty() {
            let room = width.saturating_sub(spans_width(&spans) + spans_width(&suffix) + 3);
            if room > 1 {
                spans.push(Span::styled(
                    format!(" \u{00B7} {}", truncate_to_width(&task.description, room)),
                    Style::default().fg(theme.dim).bg(row_bg),
                ));
            }
        }
        spans.extend(suffix);

        let used = spans_width(&spans);
        if used < width {
            spans.push(Span::styled(
                " ".repeat(width - used),
                Style::default().bg(row_bg),
            ));
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Filter;
    use crate::tui::render::test_helpers::{TERM_H, TERM_W, app_at, render_to_string};

    fn render(app: &mut App, h: u16) -> String {
        render_to_string(TERM_W, h, |frame, area| {
            render_task_list(frame, app, area);
        })
    }

    #[test]
    fn empty_state() {
        let mut app = app_at(9);
        let output = render(&mut app, TERM_H);
        assert!(output.contains(EMPTY_TITLE));
        assert!(output.contains(EMPTY_HINT));
    }

    #[test]
    fn newest_first_with_checkboxes() {
        let mut app = app_at(9);
        app.tasks.add("Walk the dog", "");
        app.tasks.add("Buy milk", "2%");
        let id = app.tasks.tasks()[1].id;
        app.tasks.toggle(id);

        let output = render(&mut app, 4);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "\u{25B8} [ ] Buy milk \u{00B7} 2%");
        assert_eq!(lines[1], "  [x] Walk the dog");
    }

    #[test]
    fn filter_with_no_matches() {
        let mut app = app_at(9);
        app.tasks.add("open", "");
        app.filter = Filter::Completed;
        let output = render(&mut app, 4);
        assert_eq!(output, "  No done tasks");
    }

    #[test]
    fn editing_marker() {
        let mut app = app_at(9);
        app.tasks.add("draft", "");
        app.begin_edit();
        let output = render(&mut app, 2);
        assert!(output.contains("draft (editing)"));
    }

    #[test]
    fn scrolls_to_keep_cursor_visible() {
        let mut app = app_at(9);
        for i in 0..10 {
            app.tasks.add(&format!("task {}", i), "");
        }
        app.jump_to_bottom();
        let output = render(&mut app, 3);
        assert_eq!(app.scroll_offset, 7);
        assert!(output.contains("\u{25B8} [ ] task 0"));
        assert!(!output.contains("task 9"));
    }

    #[test]
    fn long_text_is_truncated() {
        let mut app = app_at(9);
        app.tasks.add(&"x".repeat(200), "");
        let output = render(&mut app, 1);
        assert!(output.ends_with('\u{2026}'));
    }
}
