//! Configuration system for FitMatch
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (FITMATCH_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::coordinator::LockScope;
use crate::dataset::OutputFormat;
use crate::error::{Error, Result};
use crate::model::MIN_TEAM_SIZE;

/// Name of the configuration file searched for in standard locations
pub const CONFIG_FILE_NAME: &str = "fitmatch.toml";

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FitmatchConfig {
    /// Team formation engine settings
    pub formation: FormationSettings,

    /// Input/output data settings
    pub data: DataSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Team formation engine settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FormationSettings {
    /// Members per team (minimum 3)
    pub team_size: usize,

    /// Worker threads for the formation pool (0 = one per logical core)
    pub worker_threads: usize,

    /// Timeout for each pairwise precompute unit in seconds
    pub unit_timeout_secs: u64,

    /// Deadline for each per-team formation task in seconds
    pub task_timeout_secs: u64,

    /// Grace period for draining the pool on shutdown in seconds
    pub shutdown_grace_secs: u64,

    /// Span of the shared pool lock in concurrent formation
    pub lock_scope: LockScope,

    /// Run formation on the calling thread only
    pub sequential: bool,
}

/// Input/output data settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Participant CSV to read
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,

    /// Where to write formed teams (stdout report only when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Format of the team output file
    pub format: OutputFormat,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

impl Default for FormationSettings {
    fn default() -> Self {
        Self {
            team_size: 5,
            worker_threads: 0, // Auto-detect
            unit_timeout_secs: 30,
            task_timeout_secs: 60,
            shutdown_grace_secs: 5,
            lock_scope: LockScope::Team,
            sequential: false,
        }
    }
}

impl FormationSettings {
    /// Worker count with `0` resolved to the number of logical cores
    pub fn effective_worker_threads(&self) -> usize {
        if self.worker_threads == 0 {
            num_cpus::get().max(1)
        } else {
            self.worker_threads
        }
    }

    pub fn unit_timeout(&self) -> Duration {
        Duration::from_secs(self.unit_timeout_secs)
    }

    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            max_files: 5,
            json_format: false,
        }
    }
}

impl FitmatchConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        // 1. Load from config file if it exists
        if let Some(path) = Self::find_config_file(config_path)? {
            debug!(path = %path.display(), "Loading configuration file");
            let content = fs::read_to_string(&path).map_err(|source| Error::IoRead {
                path: path.clone(),
                source,
            })?;
            config = Self::from_toml(&content)?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        // 2. Apply environment variable overrides
        config.apply_env_overrides();

        // 3. Expand paths
        config.expand_paths();

        // 4. Validate
        config.validate()?;

        Ok(config)
    }

    /// Parse a TOML document into a configuration
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse {
            message: e.message().to_string(),
            source: Some(e),
        })
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        // If explicit path provided, use it (error if not found)
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            return if path.exists() {
                Ok(Some(path))
            } else {
                Err(Error::ConfigNotFound { path })
            };
        }

        let search_paths = [
            // Current directory
            Some(PathBuf::from(CONFIG_FILE_NAME)),
            // User config directory
            dirs::config_dir().map(|p| p.join("fitmatch").join(CONFIG_FILE_NAME)),
            // Home directory
            dirs::home_dir().map(|p| p.join(".fitmatch").join(CONFIG_FILE_NAME)),
        ];

        for path in search_paths.into_iter().flatten() {
            if path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) {
        // Formation settings
        if let Some(n) = env_parse("FITMATCH_TEAM_SIZE") {
            self.formation.team_size = n;
        }
        if let Some(n) = env_parse("FITMATCH_WORKER_THREADS") {
            self.formation.worker_threads = n;
        }
        if let Some(n) = env_parse("FITMATCH_UNIT_TIMEOUT_SECS") {
            self.formation.unit_timeout_secs = n;
        }
        if let Some(n) = env_parse("FITMATCH_TASK_TIMEOUT_SECS") {
            self.formation.task_timeout_secs = n;
        }
        if let Some(n) = env_parse("FITMATCH_SHUTDOWN_GRACE_SECS") {
            self.formation.shutdown_grace_secs = n;
        }
        if let Some(scope) = env_parse("FITMATCH_LOCK_SCOPE") {
            self.formation.lock_scope = scope;
        }
        if let Ok(val) = std::env::var("FITMATCH_SEQUENTIAL") {
            self.formation.sequential = is_truthy(&val);
        }

        // Data settings
        if let Ok(val) = std::env::var("FITMATCH_INPUT") {
            self.data.input = Some(val);
        }
        if let Ok(val) = std::env::var("FITMATCH_OUTPUT") {
            self.data.output = Some(val);
        }
        if let Some(format) = env_parse("FITMATCH_FORMAT") {
            self.data.format = format;
        }

        // Logging settings
        if let Ok(val) = std::env::var("FITMATCH_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("FITMATCH_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("FITMATCH_LOG_JSON") {
            self.logging.json_format = is_truthy(&val);
        }
    }

    /// Expand ~ and other path variables
    pub fn expand_paths(&mut self) {
        for path in [&mut self.data.input, &mut self.data.output, &mut self.logging.file]
            .into_iter()
            .flatten()
        {
            *path = expand_path(path);
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.formation.team_size < MIN_TEAM_SIZE {
            return Err(Error::config_field_invalid(
                "formation.team_size",
                format!("team_size must be at least {}", MIN_TEAM_SIZE),
            ));
        }

        if self.formation.unit_timeout_secs == 0 {
            return Err(Error::config_field_invalid(
                "formation.unit_timeout_secs",
                "unit_timeout_secs must be greater than 0",
            ));
        }

        if self.formation.task_timeout_secs == 0 {
            return Err(Error::config_field_invalid(
                "formation.task_timeout_secs",
                "task_timeout_secs must be greater than 0",
            ));
        }

        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        Ok(())
    }

    /// Serialize the effective configuration back to TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|val| val.parse().ok())
}

fn is_truthy(val: &str) -> bool {
    val.eq_ignore_ascii_case("true") || val == "1"
}

/// Expand ~ and environment variables in paths
pub fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or(std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Default location for `config init`
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".fitmatch")
        .join(CONFIG_FILE_NAME)
}

/// Initialize a new configuration file, returning where it was written
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(default_config_path);

    // Check if file exists
    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    // Create parent directories
    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| Error::IoWrite {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    fs::write(&config_path, generate_default_config()).map_err(|source| Error::IoWrite {
        path: config_path.clone(),
        source,
    })?;

    info!(path = %config_path.display(), "Configuration file created");
    Ok(config_path)
}

/// Generate default configuration content with comments
fn generate_default_config() -> String {
    r#"# FitMatch Configuration

[formation]
# Members per team (minimum 3)
team_size = 5

# Worker threads for the formation pool (0 = one per logical core)
worker_threads = 0

# Timeout for each pairwise precompute unit in seconds
unit_timeout_secs = 30

# Deadline for each per-team formation task in seconds
task_timeout_secs = 60

# Grace period for draining the pool on shutdown in seconds
shutdown_grace_secs = 5

# Shared pool lock span: "team" (whole team formation) or "pick" (each pick)
lock_scope = "team"

# Form teams on a single thread
sequential = false

[data]
# Participant CSV to read
# input = "~/fitmatch/participants.csv"

# Where to write formed teams
# output = "~/fitmatch/teams.csv"

# Output format: csv or json
format = "csv"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (comment out to disable file logging)
# file = "~/.fitmatch/logs/fitmatch.log"

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_default_config() {
        let config = FitmatchConfig::default();
        assert_eq!(config.formation.team_size, 5);
        assert_eq!(config.formation.lock_scope, LockScope::Team);
        assert_eq!(config.data.format, OutputFormat::Csv);
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_override() {
        env::set_var("FITMATCH_TEAM_SIZE", "7");
        env::set_var("FITMATCH_LOCK_SCOPE", "pick");
        env::set_var("FITMATCH_SEQUENTIAL", "1");

        let mut config = FitmatchConfig::default();
        config.apply_env_overrides();

        assert_eq!(config.formation.team_size, 7);
        assert_eq!(config.formation.lock_scope, LockScope::Pick);
        assert!(config.formation.sequential);

        env::remove_var("FITMATCH_TEAM_SIZE");
        env::remove_var("FITMATCH_LOCK_SCOPE");
        env::remove_var("FITMATCH_SEQUENTIAL");
    }

    #[test]
    fn test_unparseable_env_value_is_ignored() {
        env::set_var("FITMATCH_WORKER_THREADS", "lots");
        let mut config = FitmatchConfig::default();
        config.apply_env_overrides();
        assert_eq!(config.formation.worker_threads, 0);
        env::remove_var("FITMATCH_WORKER_THREADS");
    }

    #[test]
    fn test_validation_team_size() {
        let mut config = FitmatchConfig::default();
        config.formation.team_size = 2;
        match config.validate() {
            Err(Error::ConfigValidation { field, .. }) => {
                assert_eq!(field.as_deref(), Some("formation.team_size"));
            }
            other => panic!("expected ConfigValidation, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_zero_timeouts() {
        let mut config = FitmatchConfig::default();
        config.formation.task_timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = FitmatchConfig::default();
        config.formation.unit_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_log_level() {
        let mut config = FitmatchConfig::default();
        config.logging.level = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_effective_worker_threads() {
        let mut settings = FormationSettings::default();
        assert!(settings.effective_worker_threads() >= 1);
        settings.worker_threads = 3;
        assert_eq!(settings.effective_worker_threads(), 3);
    }

    #[test]
    fn test_path_expansion() {
        let mut config = FitmatchConfig::default();
        config.data.input = Some("~/data/participants.csv".to_string());
        config.expand_paths();
        assert!(!config.data.input.unwrap().contains('~'));
    }

    #[test]
    fn test_serialize_deserialize() {
        let mut config = FitmatchConfig::default();
        config.formation.lock_scope = LockScope::Pick;
        let toml_str = config.to_toml().unwrap();
        let parsed = FitmatchConfig::from_toml(&toml_str).unwrap();

        assert_eq!(parsed.formation.lock_scope, LockScope::Pick);
        assert_eq!(parsed.formation.team_size, config.formation.team_size);
    }

    #[test]
    fn test_default_template_parses() {
        let config = FitmatchConfig::from_toml(&generate_default_config()).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.formation.shutdown_grace_secs, 5);
    }

    #[test]
    fn test_parse_config_file() {
        let config_str = r#"
[formation]
team_size = 4
worker_threads = 2
lock_scope = "pick"

[data]
input = "participants.csv"
format = "json"

[logging]
level = "debug"
"#;

        let config = FitmatchConfig::from_toml(config_str).unwrap();

        assert_eq!(config.formation.team_size, 4);
        assert_eq!(config.formation.worker_threads, 2);
        assert_eq!(config.formation.lock_scope, LockScope::Pick);
        assert_eq!(config.formation.task_timeout_secs, 60);
        assert_eq!(config.data.input.as_deref(), Some("participants.csv"));
        assert_eq!(config.data.format, OutputFormat::Json);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_parse_error() {
        let err = FitmatchConfig::from_toml("[formation]\nteam_size = \"big\"").unwrap_err();
        assert!(matches!(err, Error::ConfigParse { source: Some(_), .. }));
    }
}
