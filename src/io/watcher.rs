use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

/// Events sent from the file watcher to the TUI event loop.
#[derive(Debug)]
pub enum StoreEvent {
    /// The watched store file was written by someone.
    Changed(PathBuf),
}

/// Watches a single store file for writes from other processes.
pub struct StoreWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<StoreEvent>,
}

impl StoreWatcher {
    /// Start watching `file`. The parent directory is watched, since atomic
    /// writes replace the file rather than modifying it in place.
    pub fn start(file: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let target = file.to_path_buf();
        let dir = file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let event = match result {
                    Ok(e) => e,
                    Err(_) => return,
                };

                match event.kind {
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
                    _ => return,
                }

                if event.paths.iter().any(|p| p == &target) {
                    let _ = tx.send(StoreEvent::Changed(target.clone()));
                }
            },
            Config::default(),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        Ok(StoreWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Non-blocking poll for pending events.
    /// Returns all queued events (may be empty).
    pub fn poll(&self) -> Vec<StoreEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.rx.try_recv() {
            events.push(evt);
        }
        events
    }
}
