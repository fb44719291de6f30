use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Field, Mode};

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }
    app.message = None;

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.cancel_input();
        app.should_quit = true;
        return;
    }

    // Help overlay swallows everything except its own dismiss keys
    if app.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.show_help = false;
        }
        return;
    }

    match app.mode {
        Mode::Navigate => handle_navigate(app, key),
        Mode::Add | Mode::Edit => handle_input(app, key),
    }
}

fn handle_navigate(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Down | KeyCode::Char('j') => app.move_cursor(1),
        KeyCode::Up | KeyCode::Char('k') => app.move_cursor(-1),
        KeyCode::Char('g') | KeyCode::Home => app.cursor = 0,
        KeyCode::Char('G') | KeyCode::End => app.jump_to_bottom(),
        KeyCode::Char(' ') | KeyCode::Char('x') => app.toggle_selected(),
        KeyCode::Enter | KeyCode::Char('e') => app.begin_edit(),
        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected(),
        KeyCode::Char('a') | KeyCode::Char('i') => app.begin_add(),
        KeyCode::Char('f') => app.cycle_filter(),
        _ => {}
    }
}

fn handle_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_input(),
        KeyCode::Enter => match app.mode {
            Mode::Add => app.submit_add(),
            _ => app.submit_edit(),
        },
        KeyCode::Tab | KeyCode::BackTab => {
            app.field = match app.field {
                Field::Text => Field::Description,
                Field::Description => Field::Text,
            };
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.focused_input().delete_to_start();
        }
        KeyCode::Char(c) => app.focused_input().insert(c),
        KeyCode::Backspace => app.focused_input().backspace(),
        KeyCode::Delete => app.focused_input().delete(),
        KeyCode::Left => app.focused_input().move_left(),
        KeyCode::Right => app.focused_input().move_right(),
        KeyCode::Home => app.focused_input().move_home(),
        KeyCode::End => app.focused_input().move_end(),
        _ => {}
    }
    app.sync_edit();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::Filter;
    use crate::tui::render::test_helpers::app_at;

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
        app.after_change();
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn add_with_description_via_tab() {
        let mut app = app_at(10);
        press(&mut app, KeyCode::Char('a'));
        type_str(&mut app, "Buy milk");
        press(&mut app, KeyCode::Tab);
        type_str(&mut app, "2%");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);

        assert_eq!(app.mode, Mode::Navigate);
        let task = &app.tasks.tasks()[0];
        assert_eq!(task.text, "Buy milk");
        assert_eq!(task.description, "2%");
    }

    #[test]
    fn letters_are_typed_not_commands_in_add_mode() {
        let mut app = app_at(10);
        press(&mut app, KeyCode::Char('a'));
        type_str(&mut app, "quit");
        assert!(!app.should_quit);
        assert_eq!(app.text_input.value(), "quit");
    }

    #[test]
    fn navigate_toggle_and_delete() {
        let mut app = app_at(10);
        app.tasks.add("one", "");
        app.tasks.add("two", "");
        app.after_change();

        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char(' '));
        assert!(app.tasks.tasks()[1].completed);

        press(&mut app, KeyCode::Char('k'));
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.tasks.len(), 1);
        assert_eq!(app.tasks.tasks()[0].text, "one");
    }

    #[test]
    fn edit_via_keys_updates_session_scratch() {
        let mut app = app_at(10);
        app.tasks.add("draft", "");
        press(&mut app, KeyCode::Char('e'));
        press(&mut app, KeyCode::Backspace);
        assert_eq!(
            app.tasks.edit_session().map(|s| s.text.as_str()),
            Some("draf")
        );
        press(&mut app, KeyCode::Esc);
        assert!(app.tasks.edit_session().is_none());
        assert_eq!(app.tasks.tasks()[0].text, "draft");
    }

    #[test]
    fn filter_cycles() {
        let mut app = app_at(10);
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.filter, Filter::Active);
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.filter, Filter::Completed);
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.filter, Filter::All);
    }

    #[test]
    fn help_overlay_blocks_other_keys() {
        let mut app = app_at(10);
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.mode, Mode::Navigate);
        press(&mut app, KeyCode::Esc);
        assert!(!app.show_help);
    }

    #[test]
    fn ctrl_c_quits_from_edit() {
        let mut app = app_at(10);
        app.tasks.add("x", "");
        press(&mut app, KeyCode::Char('e'));
        handle_key(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(app.should_quit);
        assert!(app.tasks.edit_session().is_none());
    }
}
