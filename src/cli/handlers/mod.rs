use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::logging;
use crate::io::recovery;
use crate::io::store::{FileStore, validate_key};
use crate::model::config::Config;
use crate::model::task::{Filter, TaskId};
use crate::ops::task_store::{PersistStatus, TaskStore};
use crate::ops::theme_clock::ThemeClock;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Resolved configuration shared by the CLI and the TUI
#[derive(Debug, Clone)]
pub struct Context {
    pub config: Config,
    pub data_dir: PathBuf,
}

impl Context {
    /// Load config (from `--config` or the default path) and resolve the
    /// data directory.
    pub fn load(
        config_path: Option<&str>,
        data_dir: Option<&str>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let config = match config_path {
            Some(path) => config_io::read_config_from(Path::new(path))?,
            None => config_io::read_config()?,
        };
        validate_key(&config.storage.key)?;
        let data_dir = config_io::resolve_data_dir(&config, data_dir.map(Path::new));
        Ok(Context { config, data_dir })
    }

    /// Start file logging under `<data dir>/logs`. Problems are reported
    /// but do not stop the command.
    pub fn init_logging(&self) {
        let level = logging::effective_level(&self.config.log.level);
        if let Err(e) = logging::init_logging(&level, &self.log_dir()) {
            eprintln!("warning: logging disabled: {}", e);
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    /// Open the file-backed task list and load it.
    pub fn open_task_store(&self) -> Result<TaskStore<FileStore>, Box<dyn std::error::Error>> {
        let files = FileStore::open(&self.data_dir)?;
        let mut store =
            TaskStore::new(files, &self.config.storage.key).with_recovery_dir(&self.data_dir);
        store.initialize();
        Ok(store)
    }

    pub fn clock_interval(&self) -> Duration {
        Duration::from_millis(self.config.clock.tick_ms.max(10))
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(command: Commands, ctx: &Context, json: bool) -> CmdResult {
    match command {
        Commands::Add(args) => cmd_add(args, ctx, json),
        Commands::List(args) => cmd_list(args, ctx, json),
        Commands::Toggle(args) => cmd_toggle(args, ctx),
        Commands::Edit(args) => cmd_edit(args, ctx),
        Commands::Rm(args) => cmd_rm(args, ctx),
        Commands::Clock => cmd_clock(ctx, json),
        Commands::Recovery(args) => cmd_recovery(args, ctx, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_id(raw: &str) -> Result<TaskId, String> {
    raw.parse()
        .map_err(|_| format!("invalid task ID: {}", raw))
}

/// Fail the command if the last write did not reach disk.
fn ensure_saved(store: &TaskStore<FileStore>) -> CmdResult {
    match store.persist_status() {
        PersistStatus::Healthy => Ok(()),
        PersistStatus::Degraded(reason) => Err(format!(
            "could not save task list: {} (see `dg recovery`)",
            reason
        )
        .into()),
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_add(args: AddArgs, ctx: &Context, json: bool) -> CmdResult {
    let mut store = ctx.open_task_store()?;
    let id = store
        .add(&args.text, &args.description)
        .ok_or("task text cannot be empty")?;
    ensure_saved(&store)?;

    if json {
        let task = store.get(id).ok_or_else(|| format!("task not found: {}", id))?;
        println!("{}", serde_json::to_string_pretty(&task_to_json(task))?);
    } else {
        println!("{}", id);
    }
    Ok(())
}

fn cmd_list(args: ListArgs, ctx: &Context, json: bool) -> CmdResult {
    let filter: Filter = args.filter.parse()?;
    let store = ctx.open_task_store()?;

    if json {
        let out = TaskListJson {
            filter,
            counts: store.counts(),
            tasks: store.visible(filter).map(task_to_json).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for line in format_listing(store.visible(filter), filter, store.counts()) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_toggle(args: IdArgs, ctx: &Context) -> CmdResult {
    let id = parse_id(&args.id)?;
    let mut store = ctx.open_task_store()?;
    store
        .toggle(id)
        .ok_or_else(|| format!("task not found: {}", id))?;
    ensure_saved(&store)?;

    if let Some(task) = store.get(id) {
        println!("{}", format_task_line(task));
    }
    Ok(())
}

fn cmd_edit(args: EditArgs, ctx: &Context) -> CmdResult {
    let id = parse_id(&args.id)?;
    let mut store = ctx.open_task_store()?;

    if !store.begin_edit(id) {
        return Err(format!("task not found: {}", id).into());
    }
    if let Some(description) = &args.description {
        store.set_edit_description(description);
    }
    store.set_edit_text(&args.text);
    if !store.commit_edit() {
        return Err("task text cannot be empty".into());
    }
    ensure_saved(&store)?;

    if let Some(task) = store.get(id) {
        println!("{}", format_task_line(task));
    }
    Ok(())
}

fn cmd_rm(args: IdArgs, ctx: &Context) -> CmdResult {
    let id = parse_id(&args.id)?;
    let mut store = ctx.open_task_store()?;
    let removed = store
        .delete(id)
        .ok_or_else(|| format!("task not found: {}", id))?;
    ensure_saved(&store)?;
    println!("deleted {} {}", removed.id, removed.text);
    Ok(())
}

fn cmd_clock(ctx: &Context, json: bool) -> CmdResult {
    let mut clock = ThemeClock::system(ctx.clock_interval());
    let sample = clock.sample_now()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&clock_to_json(&sample))?);
    } else {
        for line in format_clock(&sample) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_recovery(args: RecoveryArgs, ctx: &Context, json: bool) -> CmdResult {
    if args.clear {
        let removed = recovery::clear_recovery(&ctx.data_dir)?;
        println!("removed {} entr{}", removed, if removed == 1 { "y" } else { "ies" });
        return Ok(());
    }

    let entries = recovery::read_recovery_entries(&ctx.data_dir, Some(args.limit.unwrap_or(10)));
    if json {
        let values: Vec<serde_json::Value> = entries.iter().map(|e| e.to_json()).collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
    } else if entries.is_empty() {
        println!("recovery log is empty");
    } else {
        for entry in &entries {
            print!("{}", entry.to_display_markdown());
        }
    }
    Ok(())
}
