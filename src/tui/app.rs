use std::cell::Cell;
use std::io;
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::cli::handlers::Context;
use crate::io::store::{FileStore, KvStore};
use crate::io::watcher::{StoreEvent, StoreWatcher};
use crate::model::task::{Filter, Task, TaskId};
use crate::ops::task_store::{TaskStore, serialize_task_list};
use crate::ops::theme_clock::ThemeClock;

use super::input;
use super::render;
use super::text_input::TextInput;
use super::theme::{Palettes, Theme};

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Typing a new task into the input box
    Add,
    /// Editing the task held by the store's edit session
    Edit,
}

/// Which input field has focus in Add/Edit mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Text,
    Description,
}

/// Main application state
pub struct App {
    pub tasks: TaskStore<Box<dyn KvStore>>,
    pub clock: ThemeClock,
    pub palettes: Palettes,
    pub mode: Mode,
    pub field: Field,
    pub text_input: TextInput,
    pub desc_input: TextInput,
    pub filter: Filter,
    /// Cursor index into the visible (filtered) list
    pub cursor: usize,
    /// First visible row of the task list
    pub scroll_offset: usize,
    pub show_help: bool,
    pub should_quit: bool,
    /// One-shot message for the status row, cleared on the next key
    pub message: Option<String>,
    /// An external change arrived while an edit was open
    pub pending_reload: bool,
    /// Set by the task store subscription whenever the list changes
    list_changed: Rc<Cell<bool>>,
}

impl App {
    pub fn new(
        mut tasks: TaskStore<Box<dyn KvStore>>,
        clock: ThemeClock,
        palettes: Palettes,
    ) -> Self {
        let list_changed = Rc::new(Cell::new(false));
        let flag = Rc::clone(&list_changed);
        tasks.subscribe(move |_| flag.set(true));

        App {
            tasks,
            clock,
            palettes,
            mode: Mode::Navigate,
            field: Field::Text,
            text_input: TextInput::default(),
            desc_input: TextInput::default(),
            filter: Filter::All,
            cursor: 0,
            scroll_offset: 0,
            show_help: false,
            should_quit: false,
            message: None,
            pending_reload: false,
            list_changed,
        }
    }

    /// The palette for the latest clock sample. Before the first sample
    /// arrives the day palette is used.
    pub fn theme(&self) -> &Theme {
        let night = self.clock.latest().is_some_and(|s| s.is_night);
        self.palettes.for_night(night)
    }

    pub fn visible_tasks(&self) -> Vec<&Task> {
        self.tasks.visible(self.filter).collect()
    }

    /// ID of the task under the cursor
    pub fn selected_id(&self) -> Option<TaskId> {
        self.tasks.visible(self.filter).nth(self.cursor).map(|t| t.id)
    }

    /// The input currently receiving keystrokes
    pub fn focused_input(&mut self) -> &mut TextInput {
        match self.field {
            Field::Text => &mut self.text_input,
            Field::Description => &mut self.desc_input,
        }
    }

    pub fn clamp_cursor(&mut self) {
        let len = self.tasks.visible(self.filter).count();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    /// Run after every key. Keeps the cursor in range once the list has
    /// changed underneath it.
    pub fn after_change(&mut self) {
        if self.list_changed.replace(false) {
            self.clamp_cursor();
        }
        if self.pending_reload && self.tasks.edit_session().is_none() {
            self.pending_reload = false;
            self.reload_from_store();
        }
    }

    /// Reload the list after another process wrote the store file. An open
    /// edit defers the reload until it is saved or cancelled.
    pub fn reload_from_store(&mut self) {
        if self.tasks.edit_session().is_some() {
            self.pending_reload = true;
            return;
        }

        // Our own writes also trigger the watcher
        let stored = self.tasks.store().get(self.tasks.key()).ok().flatten();
        let current = serialize_task_list(self.tasks.tasks()).ok();
        if stored.is_some() && stored == current {
            return;
        }

        log::info!("task list changed on disk, reloading");
        self.tasks.initialize();
        self.clamp_cursor();
        self.message = Some("Reloaded task list".to_string());
    }

    // -- Add / edit flow ----------------------------------------------------

    pub fn begin_add(&mut self) {
        self.mode = Mode::Add;
        self.field = Field::Text;
        self.text_input.clear();
        self.desc_input.clear();
    }

    /// Add the typed task. On success the inputs are cleared for the next
    /// one and the cursor moves to the new task at the top.
    pub fn submit_add(&mut self) {
        if self.text_input.is_blank() {
            self.message = Some("Task text cannot be empty".to_string());
            return;
        }
        let text = self.text_input.value().to_string();
        let description = self.desc_input.value().to_string();
        if self.tasks.add(&text, &description).is_some() {
            self.text_input.clear();
            self.desc_input.clear();
            self.field = Field::Text;
            if self.filter == Filter::Completed {
                self.filter = Filter::All;
            }
            self.cursor = 0;
        }
    }

    /// Open the selected task for editing
    pub fn begin_edit(&mut self) {
        let Some(id) = self.selected_id() else {
            return;
        };
        if !self.tasks.begin_edit(id) {
            return;
        }
        if let Some(session) = self.tasks.edit_session() {
            self.text_input = TextInput::with_value(&session.text);
            self.desc_input = TextInput::with_value(&session.description);
        }
        self.field = Field::Text;
        self.mode = Mode::Edit;
    }

    /// Copy the inputs into the edit session scratch fields
    pub fn sync_edit(&mut self) {
        if self.mode == Mode::Edit {
            self.tasks.set_edit_text(self.text_input.value());
            self.tasks.set_edit_description(self.desc_input.value());
        }
    }

    pub fn submit_edit(&mut self) {
        self.sync_edit();
        if self.tasks.commit_edit() {
            self.leave_input_mode();
        } else {
            self.message = Some("Task text cannot be empty".to_string());
        }
    }

    pub fn cancel_input(&mut self) {
        if self.mode == Mode::Edit {
            self.tasks.cancel_edit();
        }
        self.leave_input_mode();
    }

    fn leave_input_mode(&mut self) {
        self.mode = Mode::Navigate;
        self.field = Field::Text;
        self.text_input.clear();
        self.desc_input.clear();
    }

    // -- Navigate actions ---------------------------------------------------

    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.tasks.toggle(id);
        }
    }

    pub fn delete_selected(&mut self) {
        if let Some(id) = self.selected_id()
            && let Some(task) = self.tasks.delete(id)
        {
            self.message = Some(format!("Deleted \"{}\"", task.text));
        }
    }

    pub fn cycle_filter(&mut self) {
        self.filter = self.filter.next();
        self.cursor = 0;
        self.scroll_offset = 0;
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.tasks.visible(self.filter).count();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(len - 1);
    }

    pub fn jump_to_bottom(&mut self) {
        let len = self.tasks.visible(self.filter).count();
        self.cursor = len.saturating_sub(1);
    }
}

/// Run the TUI application
pub fn run(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let files = FileStore::open(&ctx.data_dir)?;
    let store_path = files.path_for(&ctx.config.storage.key);
    let backing: Box<dyn KvStore> = Box::new(files);
    let mut tasks =
        TaskStore::new(backing, &ctx.config.storage.key).with_recovery_dir(&ctx.data_dir);
    tasks.initialize();

    let mut clock = ThemeClock::system(ctx.clock_interval());
    // A failed start leaves `clock.failure()` set for the clock panel
    let _ = clock.start();

    let watcher = match StoreWatcher::start(&store_path) {
        Ok(w) => Some(w),
        Err(e) => {
            log::warn!("not watching {}: {}", store_path.display(), e);
            None
        }
    };

    let mut app = App::new(tasks, clock, Palettes::from_config(&ctx.config.ui));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, watcher.as_ref());

    app.clock.stop();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    watcher: Option<&StoreWatcher>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.clock.poll();

        if let Some(watcher) = watcher {
            let events = watcher.poll();
            if events
                .iter()
                .any(|e| matches!(e, StoreEvent::Changed(_)))
            {
                app.reload_from_store();
            }
        }

        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
            app.after_change();
        }

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::store::MemoryStore;
    use crate::tui::render::test_helpers::{app_at, app_with_store};

    #[test]
    fn theme_follows_clock() {
        let day = app_at(9);
        assert_eq!(day.theme(), &Theme::day());
        let night = app_at(22);
        assert_eq!(night.theme(), &Theme::night());
    }

    #[test]
    fn add_puts_task_on_top_and_keeps_add_mode() {
        let mut app = app_at(9);
        app.begin_add();
        for c in "first".chars() {
            app.text_input.insert(c);
        }
        app.submit_add();
        for c in "second".chars() {
            app.text_input.insert(c);
        }
        app.submit_add();

        assert_eq!(app.mode, Mode::Add);
        let texts: Vec<&str> = app.visible_tasks().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["second", "first"]);
        assert!(app.text_input.value().is_empty());
    }

    #[test]
    fn blank_add_shows_message() {
        let mut app = app_at(9);
        app.begin_add();
        app.text_input.insert(' ');
        app.submit_add();
        assert!(app.tasks.is_empty());
        assert_eq!(app.message.as_deref(), Some("Task text cannot be empty"));
    }

    #[test]
    fn edit_round_trip() {
        let mut app = app_at(9);
        app.tasks.add("old", "");
        app.begin_edit();
        assert_eq!(app.mode, Mode::Edit);
        assert_eq!(app.text_input.value(), "old");

        app.text_input = TextInput::with_value("new");
        app.submit_edit();
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.tasks.tasks()[0].text, "new");
        assert!(app.tasks.edit_session().is_none());
    }

    #[test]
    fn blank_edit_stays_open() {
        let mut app = app_at(9);
        app.tasks.add("keep", "");
        app.begin_edit();
        app.text_input.clear();
        app.submit_edit();
        assert_eq!(app.mode, Mode::Edit);
        assert_eq!(app.tasks.tasks()[0].text, "keep");
    }

    #[test]
    fn cursor_clamps_after_delete() {
        let mut app = app_at(9);
        app.tasks.add("a", "");
        app.tasks.add("b", "");
        app.after_change();
        app.jump_to_bottom();
        assert_eq!(app.cursor, 1);
        app.delete_selected();
        app.after_change();
        assert_eq!(app.cursor, 0);
        assert_eq!(app.message.as_deref(), Some("Deleted \"a\""));
    }

    #[test]
    fn reload_picks_up_external_write_but_waits_for_edit() {
        let store = Rc::new(MemoryStore::new());
        let mut app = app_with_store(Rc::clone(&store), 9);
        app.tasks.add("mine", "");

        let theirs = r#"[{"id":7,"text":"theirs","completed":false,"createdAt":"2025-05-14T09:00:00Z"}]"#;
        app.begin_edit();
        store.set("todos", theirs).unwrap();
        app.reload_from_store();
        assert!(app.pending_reload);
        assert_eq!(app.tasks.tasks()[0].text, "mine");

        app.cancel_input();
        app.after_change();
        assert!(!app.pending_reload);
        assert_eq!(app.tasks.tasks()[0].text, "theirs");
    }

    #[test]
    fn own_write_does_not_reload() {
        let mut app = app_at(9);
        app.tasks.add("mine", "");
        app.reload_from_store();
        assert!(app.message.is_none());
    }
}
