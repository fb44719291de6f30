//! File logging bootstrap.
//!
//! Log records go to rotating files under the data directory, never to the
//! terminal, so they cannot corrupt the TUI screen. Initialization happens
//! at most once per process and never panics.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};

const LOG_FILE_BASENAME: &str = "dayglow";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 2 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

/// Environment variable that overrides the configured level
pub const LOG_LEVEL_ENV: &str = "DAYGLOW_LOG";

static LOGGING_STATE: Mutex<Option<LoggingState>> = Mutex::new(None);

struct LoggingState {
    level: &'static str,
    log_dir: PathBuf,
    _logger: LoggerHandle,
}

/// Error type for logging setup
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("unsupported log level `{0}`; expected trace|debug|info|warn|error")]
    InvalidLevel(String),
    #[error("could not create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to start logger: {0}")]
    Start(#[from] flexi_logger::FlexiLoggerError),
    #[error("logging already initialized at {0}")]
    AlreadyInitialized(PathBuf),
}

/// Start file logging at `level` under `log_dir`.
///
/// Calling again with the same directory is a no-op; a different directory
/// is rejected.
pub fn init_logging(level: &str, log_dir: &Path) -> Result<(), LogError> {
    let level = normalize_level(level)?;

    let mut state = LOGGING_STATE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(existing) = state.as_ref() {
        if existing.log_dir == log_dir {
            return Ok(());
        }
        return Err(LogError::AlreadyInitialized(existing.log_dir.clone()));
    }

    std::fs::create_dir_all(log_dir).map_err(|e| LogError::CreateDir {
        path: log_dir.to_path_buf(),
        source: e,
    })?;

    let logger = Logger::try_with_str(level)?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()?;

    log::info!(
        "dayglow {} started, level={} log_dir={}",
        env!("CARGO_PKG_VERSION"),
        level,
        log_dir.display()
    );

    *state = Some(LoggingState {
        level,
        log_dir: log_dir.to_path_buf(),
        _logger: logger,
    });
    Ok(())
}

/// `(level, log_dir)` if logging is active
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    let state = LOGGING_STATE
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    state.as_ref().map(|s| (s.level, s.log_dir.clone()))
}

/// The level to use: `DAYGLOW_LOG` if set, else the configured one.
pub fn effective_level(configured: &str) -> String {
    std::env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| configured.to_string())
}

fn normalize_level(level: &str) -> Result<&'static str, LogError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(LogError::InvalidLevel(other.to_string())),
    }
}
