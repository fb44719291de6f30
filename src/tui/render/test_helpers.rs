use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;

use crate::io::store::{KvStore, MemoryStore};
use crate::ops::task_store::TaskStore;
use crate::ops::theme_clock::{FixedClock, ThemeClock};
use crate::tui::app::App;
use crate::tui::theme::Palettes;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

/// Wednesday 2025-05-14 at `hour`:30:00
pub fn wall_time(hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 5, 14)
        .unwrap()
        .and_hms_opt(hour, 30, 0)
        .unwrap()
}

/// A clock pinned to `wall_time(hour)` that has not been sampled yet
pub fn fixed_clock(hour: u32) -> ThemeClock {
    ThemeClock::new(Arc::new(FixedClock(wall_time(hour))), Duration::from_secs(1))
}

/// An app over `store` whose clock has been sampled once at `hour`.
/// Task timestamps are pinned so ids are predictable.
pub fn app_with_store(store: Rc<MemoryStore>, hour: u32) -> App {
    let backing: Box<dyn KvStore> = Box::new(store);
    let created = Utc.with_ymd_and_hms(2025, 5, 14, 9, 0, 0).unwrap();
    let mut tasks = TaskStore::new(backing, "todos").with_clock(move || created);
    tasks.initialize();

    let mut clock = fixed_clock(hour);
    clock.sample_now().unwrap();
    App::new(tasks, clock, Palettes::default())
}

pub fn app_at(hour: u32) -> App {
    app_with_store(Rc::new(MemoryStore::new()), hour)
}
