//! Configuration system for the `taskdeck` client.
//!
//! Supports layered configuration with the following priority (highest first):
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attribute)
//! 3. TOML config file (`~/.config/taskdeck/config.toml`)
//! 4. Compiled defaults
//!
//! Missing config file is not an error (defaults are used). An explicit
//! `--config` path that doesn't exist is an error.

use std::path::PathBuf;
use std::time::Duration;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("failed to parse config file: {0}")]
    ParseToml(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// TOML file structs (all fields Option for partial overrides)
// ---------------------------------------------------------------------------

/// Top-level TOML config file structure.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    storage: StorageFileConfig,
    store: StoreFileConfig,
    ui: UiFileConfig,
}

/// `[storage]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct StorageFileConfig {
    db_path: Option<String>,
    prefs_path: Option<String>,
    seed_demo: Option<bool>,
}

/// `[store]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct StoreFileConfig {
    channel_capacity: Option<usize>,
}

/// `[ui]` section of the config file.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct UiFileConfig {
    poll_timeout_ms: Option<u64>,
    timestamp_format: Option<String>,
    max_task_name_len: Option<usize>,
}

// ---------------------------------------------------------------------------
// Resolved configuration (concrete types, all fields populated)
// ---------------------------------------------------------------------------

/// Fully resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // -- Storage --
    /// Path to the SQLite task database.
    pub db_path: PathBuf,
    /// Path to the filter preferences TOML file.
    pub prefs_path: PathBuf,
    /// Whether to seed demo tasks into a brand-new database.
    pub seed_demo: bool,

    // -- Store worker --
    /// Channel capacity for command/event mpsc channels.
    pub channel_capacity: usize,

    // -- UI --
    /// Poll timeout for the TUI event loop.
    pub poll_timeout: Duration,
    /// Timestamp display format string (chrono).
    pub timestamp_format: String,
    /// Maximum task name length in characters.
    pub max_task_name_len: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("taskdeck.db"),
            prefs_path: PathBuf::from("prefs.toml"),
            seed_demo: true,
            channel_capacity: 256,
            poll_timeout: Duration::from_millis(50),
            timestamp_format: "%Y-%m-%d %H:%M".to_string(),
            max_task_name_len: 256,
        }
    }
}

impl AppConfig {
    /// Load configuration by merging CLI args, env vars, and a TOML file.
    ///
    /// CLI args and env vars are parsed via `clap`. If `--config` is given
    /// and the file does not exist, returns an error. If no `--config` is
    /// given, the default path (`~/.config/taskdeck/config.toml`) is tried
    /// and silently ignored if missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the explicit config file cannot be read
    /// or parsed.
    pub fn load(cli: &CliArgs) -> Result<Self, ConfigError> {
        let file = load_config_file(cli.config.as_deref())?;
        let mut config = Self::resolve(cli, &file);

        // Relative compiled defaults become platform paths when no
        // override was given anywhere.
        if file.storage.db_path.is_none() && cli.db_path.is_none()
            && let Some(dir) = dirs::data_dir()
        {
            config.db_path = dir.join("taskdeck").join("tasks.db");
        }
        if file.storage.prefs_path.is_none() && cli.prefs_path.is_none()
            && let Some(dir) = dirs::config_dir()
        {
            config.prefs_path = dir.join("taskdeck").join("prefs.toml");
        }

        Ok(config)
    }

    /// Resolve an `AppConfig` from CLI args and a parsed config file.
    ///
    /// Priority: CLI > file > default. This is separated from `load()` to
    /// enable unit testing without CLI parsing.
    #[must_use]
    fn resolve(cli: &CliArgs, file: &ConfigFile) -> Self {
        let defaults = Self::default();

        Self {
            db_path: cli
                .db_path
                .clone()
                .or_else(|| file.storage.db_path.clone().map(PathBuf::from))
                .unwrap_or(defaults.db_path),
            prefs_path: cli
                .prefs_path
                .clone()
                .or_else(|| file.storage.prefs_path.clone().map(PathBuf::from))
                .unwrap_or(defaults.prefs_path),
            seed_demo: if cli.no_demo_data {
                false
            } else {
                file.storage.seed_demo.unwrap_or(defaults.seed_demo)
            },
            channel_capacity: file
                .store
                .channel_capacity
                .unwrap_or(defaults.channel_capacity),
            poll_timeout: file
                .ui
                .poll_timeout_ms
                .map_or(defaults.poll_timeout, Duration::from_millis),
            timestamp_format: cli
                .timestamp_format
                .clone()
                .or_else(|| file.ui.timestamp_format.clone())
                .unwrap_or(defaults.timestamp_format),
            max_task_name_len: file
                .ui
                .max_task_name_len
                .unwrap_or(defaults.max_task_name_len),
        }
    }
}

/// CLI arguments parsed by clap.
#[derive(clap::Parser, Debug, Default)]
#[command(version, about = "Local-first terminal to-do manager")]
pub struct CliArgs {
    /// Path to the SQLite task database.
    #[arg(long, env = "TASKDECK_DB")]
    pub db_path: Option<PathBuf>,

    /// Path to the filter preferences file.
    #[arg(long)]
    pub prefs_path: Option<PathBuf>,

    /// Path to config file (default: `~/.config/taskdeck/config.toml`).
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Skip seeding demo tasks into a brand-new database.
    #[arg(long)]
    pub no_demo_data: bool,

    /// Timestamp display format (chrono format string).
    #[arg(long)]
    pub timestamp_format: Option<String>,

    /// Log level filter (trace, debug, info, warn, error).
    #[arg(long, default_value = "info", env = "TASKDECK_LOG")]
    pub log_level: String,

    /// Path to log file (default: `$TMPDIR/taskdeck.log`).
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Load and parse a TOML config file.
///
/// If `explicit_path` is `Some`, the file must exist (error if not).
/// If `explicit_path` is `None`, the default path is tried and missing file
/// is treated as empty config.
fn load_config_file(explicit_path: Option<&std::path::Path>) -> Result<ConfigFile, ConfigError> {
    let path = if let Some(p) = explicit_path {
        let contents = std::fs::read_to_string(p).map_err(|e| ConfigError::ReadFile {
            path: p.to_path_buf(),
            source: e,
        })?;
        return Ok(toml::from_str(&contents)?);
    } else {
        let Some(config_dir) = dirs::config_dir() else {
            return Ok(ConfigFile::default());
        };
        config_dir.join("taskdeck").join("config.toml")
    };

    match std::fs::read_to_string(&path) {
        Ok(contents) => Ok(toml::from_str(&contents)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(e) => Err(ConfigError::ReadFile { path, source: e }),
    }
}
