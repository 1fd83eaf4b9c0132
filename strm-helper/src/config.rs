//! Configuration management for strm-helper.
//!
//! Loads configuration from a TOML file, then applies `STRM_*` environment
//! variable overrides (a `.env` file is honoured). Command-line flags are
//! applied last by the binary.

use crate::generator::{GenerateOptions, MediaExtensions};
use crate::index::{CommandRefresher, EntryId};
use crate::utils::{Result, StrmError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub index: IndexConfig,
    pub ledger: LedgerConfig,
    pub generate: GenerateConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Remote index database written by the index builder
    #[serde(default = "default_index_path")]
    pub path: PathBuf,

    /// Index builder command line; `{index}` expands to `path`
    #[serde(default)]
    pub refresh_command: Vec<String>,

    /// Run the refresh command before each sync
    #[serde(default = "default_refresh")]
    pub refresh: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Pointer ledger database, one per target directory
    #[serde(default = "default_ledger_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateConfig {
    /// Local directory the pointer tree is mirrored into
    #[serde(default)]
    pub target_dir: String,

    /// Base URL of the streaming server
    #[serde(default)]
    pub server_url: String,

    /// Folder to start from (0 = index root)
    #[serde(default)]
    pub root_id: i64,

    /// Media suffixes that get a pointer file
    #[serde(default)]
    pub media_extensions: MediaExtensions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Colored output; turn off when logs go to a file
    #[serde(default = "default_ansi")]
    pub ansi: bool,
}

// Default values
fn default_index_path() -> PathBuf {
    PathBuf::from("file_list.sqlite")
}

fn default_refresh() -> bool {
    true
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from("strm_db.sqlite")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_ansi() -> bool {
    true
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            path: default_index_path(),
            refresh_command: Vec::new(),
            refresh: default_refresh(),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: default_ledger_path(),
        }
    }
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            target_dir: String::new(),
            server_url: String::new(),
            root_id: 0,
            media_extensions: MediaExtensions::default(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            ansi: default_ansi(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load from `path` (or defaults) and apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let _ = dotenvy::dotenv();

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `STRM_*` overrides from `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("STRM_INDEX_PATH") {
            self.index.path = PathBuf::from(v);
        }
        if let Some(v) = lookup("STRM_LEDGER_PATH") {
            self.ledger.path = PathBuf::from(v);
        }
        if let Some(v) = lookup("STRM_TARGET_DIR") {
            self.generate.target_dir = v;
        }
        if let Some(v) = lookup("STRM_SERVER_URL") {
            self.generate.server_url = v;
        }
        if let Some(v) = lookup("STRM_ROOT_ID") {
            self.generate.root_id = v
                .trim()
                .parse()
                .map_err(|_| StrmError::Config(format!("STRM_ROOT_ID is not an integer: {v}")))?;
        }
        if let Some(v) = lookup("STRM_LOG_LEVEL") {
            self.log.level = v;
        }
        Ok(())
    }

    /// Check the settings a sync needs.
    pub fn validate(&self) -> Result<()> {
        if self.generate.target_dir.trim().is_empty() {
            return Err(StrmError::Config("generate.target_dir is not set".into()));
        }
        if self.generate.server_url.trim().is_empty() {
            return Err(StrmError::Config("generate.server_url is not set".into()));
        }
        if self.generate.media_extensions.is_empty() {
            return Err(StrmError::Config(
                "generate.media_extensions must not be empty".into(),
            ));
        }
        if self.generate.root_id < 0 {
            return Err(StrmError::Config(format!(
                "generate.root_id must not be negative: {}",
                self.generate.root_id
            )));
        }
        Ok(())
    }

    pub fn root_id(&self) -> EntryId {
        EntryId(self.generate.root_id)
    }

    pub fn generate_options(&self) -> GenerateOptions {
        GenerateOptions::new(&self.generate.target_dir, &self.generate.server_url)
            .with_media_extensions(self.generate.media_extensions.clone())
    }

    /// The configured index refresher, if refreshing is enabled and a command is set.
    pub fn refresher(&self) -> Result<Option<CommandRefresher>> {
        if !self.index.refresh || self.index.refresh_command.is_empty() {
            return Ok(None);
        }
        CommandRefresher::from_command_line(&self.index.refresh_command).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::Path;

    #[test]
    fn test_parse_full_file() -> Result<()> {
        let config: Config = toml::from_str(
            r#"
            [index]
            path = "/data/115.sqlite"
            refresh_command = ["p115updatedb", "--dbfile", "{index}"]

            [ledger]
            path = "/data/strm_db.sqlite"

            [generate]
            target_dir = "/mirror/"
            server_url = "http://srv:9527/"
            root_id = 12
            media_extensions = [".mkv", "mp4"]

            [log]
            level = "debug"
            ansi = false
            "#,
        )?;

        config.validate()?;
        assert_eq!(config.index.path, PathBuf::from("/data/115.sqlite"));
        assert!(config.index.refresh);
        assert_eq!(config.root_id(), EntryId(12));
        assert_eq!(config.log.level, "debug");
        assert!(!config.log.ansi);

        let options = config.generate_options();
        assert_eq!(options.target_dir(), Path::new("/mirror"));
        assert_eq!(options.server_base_url(), "http://srv:9527");
        assert!(options.media_extensions().allows(".mp4"));
        assert!(!options.media_extensions().allows(".avi"));

        assert!(config.refresher()?.is_some());
        Ok(())
    }

    #[test]
    fn test_defaults_for_missing_sections() -> Result<()> {
        let config: Config =
            toml::from_str("[generate]\ntarget_dir = \"/m\"\nserver_url = \"http://s\"\n")?;
        config.validate()?;
        assert_eq!(config.ledger.path, PathBuf::from("strm_db.sqlite"));
        assert_eq!(config.generate.media_extensions.len(), 17);
        assert_eq!(config.root_id(), EntryId::ROOT);
        assert!(config.refresher()?.is_none());
        Ok(())
    }

    #[test]
    fn test_env_overrides() -> Result<()> {
        let env: HashMap<&str, &str> = HashMap::from([
            ("STRM_TARGET_DIR", "/env/mirror"),
            ("STRM_SERVER_URL", "http://env"),
            ("STRM_ROOT_ID", "7"),
        ]);
        let mut config = Config::default();
        config.apply_env(|key| env.get(key).map(|v| v.to_string()))?;

        assert_eq!(config.generate.target_dir, "/env/mirror");
        assert_eq!(config.root_id(), EntryId(7));

        let bad: HashMap<&str, &str> = HashMap::from([("STRM_ROOT_ID", "seven")]);
        assert!(matches!(
            config.apply_env(|key| bad.get(key).map(|v| v.to_string())),
            Err(StrmError::Config(_))
        ));
        Ok(())
    }

    #[test]
    fn test_validate_rejects_missing_settings() {
        let config = Config::default();
        assert!(matches!(config.validate(), Err(StrmError::Config(_))));

        let mut no_extensions = Config::default();
        no_extensions.generate.target_dir = "/m".into();
        no_extensions.generate.server_url = "http://s".into();
        no_extensions.generate.media_extensions = MediaExtensions::new(Vec::<String>::new());
        assert!(matches!(no_extensions.validate(), Err(StrmError::Config(_))));
    }

    #[test]
    fn test_refresh_disabled() -> Result<()> {
        let mut config = Config::default();
        config.index.refresh_command = vec!["p115updatedb".into()];
        config.index.refresh = false;
        assert!(config.refresher()?.is_none());
        Ok(())
    }
}
