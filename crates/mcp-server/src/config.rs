//! Server configuration: defaults, then an optional TOML file, then `SYSTEMD_MCP_*` variables.
//! Command-line flags are applied last by [`crate::cli::Cli`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use systemd_mcp_journal::UnmatchedUnitPolicy;
use systemd_mcp_units::ManagerScope;
use thiserror::Error;

pub const CONFIG_ENV: &str = "SYSTEMD_MCP_CONFIG";
pub const SCOPE_ENV: &str = "SYSTEMD_MCP_SCOPE";
pub const POLL_INTERVAL_ENV: &str = "SYSTEMD_MCP_POLL_INTERVAL_MS";
pub const LOG_DEADLINE_ENV: &str = "SYSTEMD_MCP_LOG_DEADLINE_MS";
pub const UNMATCHED_UNIT_ENV: &str = "SYSTEMD_MCP_UNMATCHED_UNIT";

const DEFAULT_POLL_INTERVAL_MS: u64 = 3_000;
const DEFAULT_LOG_DEADLINE_MS: u64 = 1_000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub scope: ManagerScope,
    pub poll_interval_ms: u64,
    pub log_deadline_ms: u64,
    pub unmatched_unit: UnmatchedUnitPolicy,
    pub systemctl: PathBuf,
    pub journalctl: PathBuf,
    pub journal_directory: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            scope: ManagerScope::System,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            log_deadline_ms: DEFAULT_LOG_DEADLINE_MS,
            unmatched_unit: UnmatchedUnitPolicy::FallbackToAll,
            systemctl: PathBuf::from("systemctl"),
            journalctl: PathBuf::from("journalctl"),
            journal_directory: None,
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Defaults or `file` (falling back to `$SYSTEMD_MCP_CONFIG`), with environment overrides.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let from_env = env_value(|key| std::env::var(key).ok(), CONFIG_ENV).map(PathBuf::from);
        let mut config = match file.map(Path::to_path_buf).or(from_env) {
            Some(path) => {
                log::debug!("loading config from {}", path.display());
                Self::from_file(&path)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.finalize();
        Ok(config)
    }

    /// Overrides from `SYSTEMD_MCP_*` variables. Values that do not parse are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(raw) = env_value(&lookup, SCOPE_ENV) {
            match ManagerScope::parse(&raw) {
                Some(scope) => self.scope = scope,
                None => log::warn!("ignoring {SCOPE_ENV}={raw:?} (expected system or user)"),
            }
        }
        if let Some(ms) = parse_millis(&lookup, POLL_INTERVAL_ENV) {
            self.poll_interval_ms = ms;
        }
        if let Some(ms) = parse_millis(&lookup, LOG_DEADLINE_ENV) {
            self.log_deadline_ms = ms;
        }
        if let Some(raw) = env_value(&lookup, UNMATCHED_UNIT_ENV) {
            match UnmatchedUnitPolicy::parse(&raw) {
                Some(policy) => self.unmatched_unit = policy,
                None => log::warn!(
                    "ignoring {UNMATCHED_UNIT_ENV}={raw:?} (expected fallback_to_all or not_found)"
                ),
            }
        }
    }

    /// Zero waits would turn every job into "in progress" and every log query into a timeout.
    pub fn finalize(&mut self) {
        if self.poll_interval_ms == 0 {
            log::warn!("poll_interval_ms = 0, using 1");
            self.poll_interval_ms = 1;
        }
        if self.log_deadline_ms == 0 {
            log::warn!("log_deadline_ms = 0, using 1");
            self.log_deadline_ms = 1;
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn log_deadline(&self) -> Duration {
        Duration::from_millis(self.log_deadline_ms)
    }
}

fn env_value(lookup: impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_millis(lookup: impl Fn(&str) -> Option<String>, key: &str) -> Option<u64> {
    let raw = env_value(lookup, key)?;
    match raw.parse::<u64>() {
        Ok(ms) => Some(ms),
        Err(err) => {
            log::warn!("ignoring {key}={raw:?}: {err}");
            None
        }
    }
}
