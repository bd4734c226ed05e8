//! Configuration for guildboard.
//!
//! Settings are read from `.guildboard/guildboard.toml` and layered
//! file → environment → CLI.
//!
//! # Configuration File Format
//!
//! ```toml
//! [store]
//! path = ".guildboard/board.db"
//!
//! [sequencer]
//! position_policy = "strict"
//! max_retries = 3
//! retry_backoff_ms = 10
//!
//! [logging]
//! json = false
//! level = "info"
//! ```
//!
//! Environment overrides: `GUILDBOARD_DB` (database path) and
//! `GUILDBOARD_LOG_JSON` (`1`/`true` for JSON logs). A `--db` flag on the
//! command line wins over both.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::board::{PositionPolicy, SequencerConfig};

pub const CONFIG_DIR: &str = ".guildboard";
pub const CONFIG_FILE: &str = "guildboard.toml";
pub const DEFAULT_DB_FILE: &str = "board.db";

pub const ENV_DB: &str = "GUILDBOARD_DB";
pub const ENV_LOG_JSON: &str = "GUILDBOARD_LOG_JSON";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreSection {
    /// Database file. Relative paths resolve against the project directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequencerSection {
    #[serde(default)]
    pub position_policy: PositionPolicy,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    10
}

impl Default for SequencerSection {
    fn default() -> Self {
        Self {
            position_policy: PositionPolicy::default(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSection {
    #[serde(default)]
    pub json: bool,
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            json: false,
            level: default_log_level(),
        }
    }
}

/// The complete guildboard.toml structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct GuildboardToml {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub sequencer: SequencerSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

impl GuildboardToml {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse guildboard.toml")
    }

    /// Load from `path`, or the defaults if the file does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize guildboard.toml")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    pub fn sequencer_config(&self) -> SequencerConfig {
        SequencerConfig {
            position_policy: self.sequencer.position_policy,
            max_retries: self.sequencer.max_retries,
            retry_backoff: Duration::from_millis(self.sequencer.retry_backoff_ms),
        }
    }

    /// Validate the configuration and return any warnings.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            warnings.push(format!(
                "Invalid logging.level '{}': expected one of {}",
                self.logging.level,
                LOG_LEVELS.join(", ")
            ));
        }
        if self.sequencer.max_retries > 100 {
            warnings.push(format!(
                "sequencer.max_retries = {} is unusually high",
                self.sequencer.max_retries
            ));
        }

        warnings
    }
}

/// Effective configuration: guildboard.toml plus environment and CLI overrides.
#[derive(Debug, Clone)]
pub struct GuildboardConfig {
    pub project_dir: PathBuf,
    pub config_path: PathBuf,
    pub toml: GuildboardToml,
    pub verbose: bool,
    cli_db: Option<PathBuf>,
    env_db: Option<PathBuf>,
    env_log_json: Option<bool>,
}

impl GuildboardConfig {
    /// Read the config for `project_dir`, from `config_path` if given.
    pub fn new(project_dir: PathBuf, config_path: Option<PathBuf>) -> Result<Self> {
        let config_path =
            config_path.unwrap_or_else(|| project_dir.join(CONFIG_DIR).join(CONFIG_FILE));
        let toml = GuildboardToml::load_or_default(&config_path)?;

        Ok(Self {
            project_dir,
            config_path,
            toml,
            verbose: false,
            cli_db: None,
            env_db: std::env::var_os(ENV_DB).map(PathBuf::from),
            env_log_json: std::env::var(ENV_LOG_JSON).ok().map(|v| parse_flag(&v)),
        })
    }

    /// Create a config with CLI overrides.
    pub fn with_cli_args(
        project_dir: PathBuf,
        config_path: Option<PathBuf>,
        db: Option<PathBuf>,
        verbose: bool,
    ) -> Result<Self> {
        let mut config = Self::new(project_dir, config_path)?;
        config.cli_db = db;
        config.verbose = verbose;
        Ok(config)
    }

    pub fn config_dir(&self) -> PathBuf {
        self.project_dir.join(CONFIG_DIR)
    }

    /// Database path (CLI → env → file → default).
    pub fn db_path(&self) -> PathBuf {
        let path = self
            .cli_db
            .clone()
            .or_else(|| self.env_db.clone())
            .or_else(|| self.toml.store.path.clone())
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(DEFAULT_DB_FILE));
        if path.is_absolute() {
            path
        } else {
            self.project_dir.join(path)
        }
    }

    /// JSON log output (env → file).
    pub fn log_json(&self) -> bool {
        self.env_log_json.unwrap_or(self.toml.logging.json)
    }

    /// Default filter directive when `RUST_LOG` is unset.
    pub fn log_level(&self) -> &str {
        if self.verbose {
            "debug"
        } else {
            &self.toml.logging.level
        }
    }

    pub fn sequencer_config(&self) -> SequencerConfig {
        self.toml.sequencer_config()
    }
}

/// `1`, `true`, `yes` and `on` (any case) are true; anything else is false.
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
