use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::io::store::KvStore;
use crate::model::task::{Filter, Task, TaskCounts, TaskId};
use crate::ops::subscribers::{SubscriptionId, Subscribers};

/// Why a stored value was not accepted as a task list
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("not a task list: {0}")]
    Json(#[from] serde_json::Error),
    #[error("task {0} has empty text")]
    EmptyText(TaskId),
    #[error("task id {0} appears more than once")]
    DuplicateId(TaskId),
}

/// Whether the last write reached the durable store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistStatus {
    Healthy,
    /// The last write failed; memory is ahead of the store
    Degraded(String),
}

/// The task currently being edited, with uncommitted text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub id: TaskId,
    pub text: String,
    pub description: String,
}

/// Parse a stored task list, rejecting anything the store could not have
/// written: malformed JSON, blank text, or repeated ids.
pub fn parse_task_list(raw: &str) -> Result<Vec<Task>, LoadError> {
    let tasks: Vec<Task> = serde_json::from_str(raw)?;
    let mut seen = std::collections::HashSet::new();
    for task in &tasks {
        if !task.is_well_formed() {
            return Err(LoadError::EmptyText(task.id));
        }
        if !seen.insert(task.id) {
            return Err(LoadError::DuplicateId(task.id));
        }
    }
    Ok(tasks)
}

/// Serialize a task list the way it is stored.
pub fn serialize_task_list(tasks: &[Task]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(tasks)
}

type Now = Box<dyn Fn() -> DateTime<Utc>>;

/// The authoritative, ordered task list, mirrored to a durable store after
/// every change.
///
/// Newest tasks come first. Mutations only happen through `add`, `toggle`,
/// `save_edit` and `delete`; each successful one writes the whole list under
/// the store key and then notifies subscribers.
pub struct TaskStore<S: KvStore> {
    store: S,
    key: String,
    tasks: Vec<Task>,
    edit: Option<EditSession>,
    /// Highest id handed out or seen in this process
    last_id: u64,
    persist: PersistStatus,
    recovery_dir: Option<PathBuf>,
    now: Now,
    subscribers: Subscribers<[Task]>,
}

impl<S: KvStore> TaskStore<S> {
    /// An empty store bound to `key`. Call `initialize` to load.
    pub fn new(store: S, key: &str) -> Self {
        TaskStore {
            store,
            key: key.to_string(),
            tasks: Vec::new(),
            edit: None,
            last_id: 0,
            persist: PersistStatus::Healthy,
            recovery_dir: None,
            now: Box::new(Utc::now),
            subscribers: Subscribers::default(),
        }
    }

    /// `new` followed by `initialize`
    pub fn open(store: S, key: &str) -> Self {
        let mut task_store = Self::new(store, key);
        task_store.initialize();
        task_store
    }

    /// Preserve unreadable or unsaved lists in the recovery log under `dir`.
    pub fn with_recovery_dir(mut self, dir: &Path) -> Self {
        self.recovery_dir = Some(dir.to_path_buf());
        self
    }

    /// Replace the time source used for ids and timestamps.
    pub fn with_clock(mut self, now: impl Fn() -> DateTime<Utc> + 'static) -> Self {
        self.now = Box::new(now);
        self
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Load the persisted list. Anything missing, unreadable or malformed
    /// yields an empty list; this never fails. Any open edit is dropped.
    pub fn initialize(&mut self) -> &[Task] {
        self.tasks = self.read_persisted();
        self.edit = None;
        if let Some(max) = self.tasks.iter().map(|t| t.id.0).max() {
            self.last_id = self.last_id.max(max);
        }
        log::debug!("loaded {} task(s) from '{}'", self.tasks.len(), self.key);
        self.subscribers.notify(&self.tasks);
        &self.tasks
    }

    fn read_persisted(&self) -> Vec<Task> {
        let raw = match self.store.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("could not read task list '{}': {}", self.key, e);
                return Vec::new();
            }
        };

        match parse_task_list(&raw) {
            Ok(tasks) => tasks,
            Err(e) => {
                log::warn!(
                    "ignoring stored task list '{}': {}; starting empty",
                    self.key,
                    e
                );
                self.log_recovery(RecoveryCategory::Read, &e.to_string(), raw);
                Vec::new()
            }
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks matching `filter`, in list order
    pub fn visible(&self, filter: Filter) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(move |t| filter.matches(t))
    }

    pub fn counts(&self) -> TaskCounts {
        TaskCounts::of(&self.tasks)
    }

    pub fn persist_status(&self) -> &PersistStatus {
        &self.persist
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Prepend a new task. Blank text is ignored and returns `None`.
    pub fn add(&mut self, text: &str, description: &str) -> Option<TaskId> {
        if text.trim().is_empty() {
            return None;
        }
        let now = (self.now)();
        let Some(id) = self.next_id(now) else {
            log::warn!("task id space exhausted, not adding {:?}", text.trim());
            return None;
        };
        self.tasks.insert(0, Task::new(id, text, description, now));
        log::info!("added task {}", id);
        self.commit();
        Some(id)
    }

    /// Flip `completed`. Returns the new value, or `None` if no task matched.
    pub fn toggle(&mut self, id: TaskId) -> Option<bool> {
        let task = self.tasks.iter_mut().find(|t| t.id == id)?;
        task.completed = !task.completed;
        let completed = task.completed;
        log::info!("task {} completed={}", id, completed);
        self.commit();
        Some(completed)
    }

    /// Remove the task. Returns it, or `None` if no task matched.
    pub fn delete(&mut self, id: TaskId) -> Option<Task> {
        let pos = self.tasks.iter().position(|t| t.id == id)?;
        let removed = self.tasks.remove(pos);
        if self.edit.as_ref().is_some_and(|e| e.id == id) {
            self.edit = None;
        }
        log::info!("deleted task {}", id);
        self.commit();
        Some(removed)
    }

    // -----------------------------------------------------------------------
    // Editing
    // -----------------------------------------------------------------------

    /// Open an edit session on `id`, seeded with its current text. Replaces
    /// any session already open. Returns false if no task matched.
    pub fn begin_edit(&mut self, id: TaskId) -> bool {
        let Some(task) = self.get(id) else {
            return false;
        };
        self.edit = Some(EditSession {
            id,
            text: task.text.clone(),
            description: task.description.clone(),
        });
        true
    }

    pub fn edit_session(&self) -> Option<&EditSession> {
        self.edit.as_ref()
    }

    /// Update the scratch text of the open session (no effect on the task)
    pub fn set_edit_text(&mut self, text: &str) {
        if let Some(edit) = self.edit.as_mut() {
            edit.text = text.to_string();
        }
    }

    /// Update the scratch description of the open session
    pub fn set_edit_description(&mut self, description: &str) {
        if let Some(edit) = self.edit.as_mut() {
            edit.description = description.to_string();
        }
    }

    /// Discard the open session without touching the task.
    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    /// Replace the text and description of `id`.
    ///
    /// Blank text is rejected and leaves any session open. On success
    /// `updated_at` is set and the session for `id` is closed.
    pub fn save_edit(&mut self, id: TaskId, new_text: &str, new_description: &str) -> bool {
        if new_text.trim().is_empty() {
            return false;
        }
        let now = (self.now)();
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        task.text = new_text.trim().to_string();
        task.description = new_description.trim().to_string();
        task.updated_at = Some(now);
        if self.edit.as_ref().is_some_and(|e| e.id == id) {
            self.edit = None;
        }
        log::info!("edited task {}", id);
        self.commit();
        true
    }

    /// Save the open session's scratch fields.
    pub fn commit_edit(&mut self) -> bool {
        match self.edit.clone() {
            Some(edit) => self.save_edit(edit.id, &edit.text, &edit.description),
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Subscriptions
    // -----------------------------------------------------------------------

    /// Call `callback` with the full list after every change.
    pub fn subscribe(&mut self, callback: impl FnMut(&[Task]) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Ids come from the clock in milliseconds, bumped past anything already
    /// issued so two adds in the same millisecond still differ. `None` once
    /// `u64::MAX` has been used.
    fn next_id(&mut self, now: DateTime<Utc>) -> Option<TaskId> {
        let from_clock = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        let id = from_clock.max(self.last_id.checked_add(1)?);
        self.last_id = id;
        Some(TaskId(id))
    }

    fn commit(&mut self) {
        self.persist();
        self.subscribers.notify(&self.tasks);
    }

    fn persist(&mut self) {
        let payload = match serialize_task_list(&self.tasks) {
            Ok(p) => p,
            Err(e) => {
                log::error!("could not serialize task list: {}", e);
                self.persist = PersistStatus::Degraded(e.to_string());
                return;
            }
        };

        match self.store.set(&self.key, &payload) {
            Ok(()) => {
                if self.persist != PersistStatus::Healthy {
                    log::info!("task list '{}' saved again", self.key);
                }
                self.persist = PersistStatus::Healthy;
            }
            Err(e) => {
                log::error!("could not save task list '{}': {}", self.key, e);
                self.log_recovery(RecoveryCategory::Write, &e.to_string(), payload);
                self.persist = PersistStatus::Degraded(e.to_string());
            }
        }
    }

    fn log_recovery(&self, category: RecoveryCategory, reason: &str, body: String) {
        let Some(dir) = &self.recovery_dir else {
            return;
        };
        let description = match category {
            RecoveryCategory::Read => "unreadable task list",
            RecoveryCategory::Write => "unsaved task list",
        };
        recovery::log_recovery(
            dir,
            RecoveryEntry {
                timestamp: Utc::now(),
                category,
                description: description.to_string(),
                fields: vec![
                    ("Key".to_string(), self.key.clone()),
                    ("Reason".to_string(), reason.to_string()),
                ],
                body,
            },
        );
    }
}
