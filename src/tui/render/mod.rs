pub mod clock_panel;
pub mod help_overlay;
pub mod helpers;
pub mod input_box;
pub mod status_row;
pub mod task_list;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;

use super::app::App;

/// Main render function, dispatches to sub-renderers
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme().background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: clock (5 rows) | input box (4 rows) | task list | status row (1 row)
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(4),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    clock_panel::render_clock_panel(frame, app, chunks[0]);
    input_box::render_input_box(frame, app, chunks[1]);
    task_list::render_task_list(frame, app, chunks[2]);
    status_row::render_status_row(frame, app, chunks[3]);

    // Help overlay (rendered on top of everything)
    if app.show_help {
        help_overlay::render_help_overlay(frame, app, frame.area());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::render::test_helpers::{TERM_H, TERM_W, app_at, render_to_string};

    #[test]
    fn full_screen_layout() {
        let mut app = app_at(20);
        app.tasks.add("Water the plants", "");
        let output = render_to_string(TERM_W, TERM_H, |frame, _| {
            render(frame, &mut app);
        });
        let lines: Vec<&str> = output.lines().collect();

        assert!(lines[1].contains("08:30:00 PM"));
        assert!(lines[3].contains("Have a good night"));
        assert!(lines[5].contains("press a to add a task"));
        assert!(lines[9].contains("[ ] Water the plants"));
        assert!(lines[TERM_H as usize - 1].contains("1 of 1 remaining"));
    }
}
