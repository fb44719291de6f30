use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::model::config::Config;

/// Error type for config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError { path: PathBuf, source: io::Error },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Get the user's home directory
fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// Default config file path, respecting XDG_CONFIG_HOME
pub fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_home().join(".config"));
    config_dir.join("dayglow").join("config.toml")
}

/// Default data directory, respecting XDG_DATA_HOME
pub fn default_data_dir() -> PathBuf {
    let data_dir = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_home().join(".local").join("share"));
    data_dir.join("dayglow")
}

/// Read config from a specific path. A missing file yields the defaults;
/// a malformed one is an error.
pub fn read_config_from(path: &Path) -> Result<Config, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Read config from the default location.
pub fn read_config() -> Result<Config, ConfigError> {
    read_config_from(&config_path())
}

/// The directory the store lives in: explicit override, then config, then
/// the XDG default.
pub fn resolve_data_dir(config: &Config, override_dir: Option<&Path>) -> PathBuf {
    override_dir
        .map(Path::to_path_buf)
        .or_else(|| config.storage.dir.clone())
        .unwrap_or_else(default_data_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = read_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.storage.key, "todos");
    }

    #[test]
    fn reads_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[clock]\ntick_ms = 250\n\n[log]\nlevel = \"debug\"\n").unwrap();
        let config = read_config_from(&path).unwrap();
        assert_eq!(config.clock.tick_ms, 250);
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[clock\ntick_ms = ").unwrap();
        assert!(matches!(
            read_config_from(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn data_dir_precedence() {
        let mut config = Config::default();
        config.storage.dir = Some(PathBuf::from("/from/config"));
        assert_eq!(
            resolve_data_dir(&config, Some(Path::new("/from/flag"))),
            PathBuf::from("/from/flag")
        );
        assert_eq!(
            resolve_data_dir(&config, None),
            PathBuf::from("/from/config")
        );
    }
}
