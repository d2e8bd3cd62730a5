//! Configuration file handling for ~/.config/graze/config.toml.
//!
//! The config file is optional — a missing file yields `Config::default()`.
//! Unlike most of the settings, `current_user` is written back by the
//! `login` and `register` commands, so saving must never leave a partially
//! written file behind.

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be
/// specified; missing keys fall back to `Default::default()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database file location. Defaults to `<config dir>/graze.db`.
    pub database_path: Option<PathBuf>,

    /// Name of the user commands act on behalf of. Set by `login`/`register`.
    pub current_user: Option<String>,

    /// Overall timeout for one feed fetch, in seconds.
    pub fetch_timeout_secs: u64,

    /// Default page size for `browse` when no limit argument is given.
    pub default_browse_limit: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            current_user: None,
            fetch_timeout_secs: 10,
            default_browse_limit: 2,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Write the configuration back via write-to-temp-then-rename, so a
    /// crash mid-write cannot corrupt the existing file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;

        let temp_path = path.with_extension("toml.tmp");
        let mut temp_file = std::fs::File::create(&temp_path)?;
        temp_file.write_all(content.as_bytes())?;
        temp_file.sync_all()?;
        drop(temp_file);

        if let Err(e) = std::fs::rename(&temp_path, path) {
            let _ = std::fs::remove_file(&temp_path);
            return Err(ConfigError::Io(e));
        }
        Ok(())
    }

    /// Resolve the database file location relative to the config directory.
    pub fn database_path(&self, config_dir: &Path) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| config_dir.join("graze.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.database_path.is_none());
        assert!(config.current_user.is_none());
        assert_eq!(config.fetch_timeout_secs, 10);
        assert_eq!(config.default_browse_limit, 2);
    }

    #[test]
    fn test_missing_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("nonexistent.toml")).unwrap();
        assert_eq!(config.fetch_timeout_secs, 10);
    }

    #[test]
    fn test_empty_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "  \n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.default_browse_limit, 2);
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "current_user = \"ada\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.current_user.as_deref(), Some("ada"));
        assert_eq!(config.fetch_timeout_secs, 10); // default
    }

    #[test]
    fn test_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
database_path = "/tmp/feeds.db"
current_user = "ada"
fetch_timeout_secs = 30
default_browse_limit = 10
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(
            config.database_path.as_deref(),
            Some(Path::new("/tmp/feeds.db"))
        );
        assert_eq!(config.current_user.as_deref(), Some("ada"));
        assert_eq!(config.fetch_timeout_secs, 30);
        assert_eq!(config.default_browse_limit, 10);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is not [valid toml").unwrap();

        let result = Config::load(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "fetch_timeout_secs = \"soon\"\n").unwrap();

        assert!(Config::load(&path).is_err());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.current_user = Some("grace".to_string());
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.current_user.as_deref(), Some("grace"));
        assert_eq!(loaded.fetch_timeout_secs, 10);
    }

    #[test]
    fn test_save_replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.current_user = Some("ada".to_string());
        config.save(&path).unwrap();

        config.current_user = Some("grace".to_string());
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.current_user.as_deref(), Some("grace"));
        // No temp file left behind
        assert!(!path.with_extension("toml.tmp").exists());
    }

    #[test]
    fn test_database_path_default_and_override() {
        let config = Config::default();
        assert_eq!(
            config.database_path(Path::new("/home/ada/.config/graze")),
            Path::new("/home/ada/.config/graze/graze.db")
        );

        let mut config = Config::default();
        config.database_path = Some(PathBuf::from("/var/lib/graze.db"));
        assert_eq!(
            config.database_path(Path::new("/ignored")),
            Path::new("/var/lib/graze.db")
        );
    }
}
