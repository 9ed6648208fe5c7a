use crate::error::{Result, UnitError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Job identifier handed out by the service manager for a queued state change.
pub type JobId = u32;

/// States accepted by the "list by state" query. `all` lists every loaded unit.
pub const VALID_STATES: &[&str] = &[
    "active",
    "dead",
    "inactive",
    "loaded",
    "mounted",
    "not-found",
    "plugged",
    "running",
    "all",
];

pub const DEFAULT_STATE: &str = "running";

pub fn validate_state(raw: &str) -> Result<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(DEFAULT_STATE);
    }
    VALID_STATES
        .iter()
        .find(|state| **state == trimmed)
        .copied()
        .ok_or_else(|| UnitError::InvalidState(trimmed.to_string()))
}

/// How a queued job treats jobs that are already pending for the same units.
///
/// `Replace` may replace conflicting queued jobs, `Fail` refuses to touch them, `Isolate` stops
/// every unit that is not a dependency of the target. The two `Ignore*` modes skip (part of) the
/// dependency graph and should rarely be used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobMode {
    #[default]
    Replace,
    Fail,
    Isolate,
    IgnoreDependencies,
    IgnoreRequirements,
}

impl JobMode {
    pub const ALL: [JobMode; 5] = [
        JobMode::Replace,
        JobMode::Fail,
        JobMode::Isolate,
        JobMode::IgnoreDependencies,
        JobMode::IgnoreRequirements,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Fail => "fail",
            Self::Isolate => "isolate",
            Self::IgnoreDependencies => "ignore-dependencies",
            Self::IgnoreRequirements => "ignore-requirements",
        }
    }

    /// Parses a caller supplied mode. An empty mode means `replace`.
    pub fn parse(raw: &str, operation: UnitOperation) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Self::Replace);
        }
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == trimmed)
            .ok_or_else(|| UnitError::InvalidMode {
                operation: operation.as_str().to_string(),
                mode: trimmed.to_string(),
            })
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|mode| mode.as_str()).collect()
    }
}

impl fmt::Display for JobMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnitOperation {
    Start,
    Stop,
    Restart,
    ReloadOrRestart,
    Enable,
    Disable,
}

impl UnitOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
            Self::ReloadOrRestart => "reload-or-restart",
            Self::Enable => "enable",
            Self::Disable => "disable",
        }
    }

    /// Queued operations run as service manager jobs and report through a completion slot.
    /// Enable/disable only rewrite unit file symlinks and finish synchronously.
    pub fn is_queued(self) -> bool {
        !matches!(self, Self::Enable | Self::Disable)
    }
}

impl fmt::Display for UnitOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the service manager's unit table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStatus {
    pub name: String,
    pub description: String,
    pub load_state: String,
    pub active_state: String,
    pub sub_state: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub followed: String,
}

impl UnitStatus {
    pub fn new(name: &str, active_state: &str, sub_state: &str) -> Self {
        Self {
            name: name.to_string(),
            load_state: "loaded".to_string(),
            active_state: active_state.to_string(),
            sub_state: sub_state.to_string(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }
}

/// A symlink created or removed while enabling/disabling unit files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitFileChange {
    #[serde(rename = "type")]
    pub change_type: String,
    pub filename: String,
    pub destination: String,
}

impl UnitFileChange {
    pub fn symlink(filename: &str, destination: &str) -> Self {
        Self {
            change_type: "symlink".to_string(),
            filename: filename.to_string(),
            destination: destination.to_string(),
        }
    }

    pub fn unlink(filename: &str) -> Self {
        Self {
            change_type: "unlink".to_string(),
            filename: filename.to_string(),
            destination: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitFile {
    pub name: String,
    pub state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
}

impl UnitFile {
    /// Builds a record from either a bare unit name or a full unit file path.
    pub fn from_path(path: &str, state: &str) -> Self {
        let name = Path::new(path)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(path)
            .to_string();
        Self {
            name,
            state: state.to_string(),
            preset: None,
        }
    }
}

/// Rejects names that cannot possibly address a unit.
pub fn validate_unit_name(raw: &str) -> Result<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UnitError::InvalidUnitName("name is empty".to_string()));
    }
    if trimmed.starts_with('-') {
        return Err(UnitError::InvalidUnitName(format!(
            "{trimmed} looks like an option"
        )));
    }
    if trimmed.chars().any(|c| c.is_control() || c.is_whitespace()) {
        return Err(UnitError::InvalidUnitName(format!(
            "{trimmed:?} contains whitespace or control characters"
        )));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_mode_defaults_to_replace() {
        assert_eq!(
            JobMode::parse("", UnitOperation::Start).unwrap(),
            JobMode::Replace
        );
        assert_eq!(
            JobMode::parse("  ", UnitOperation::Stop).unwrap(),
            JobMode::Replace
        );
    }

    #[test]
    fn every_documented_mode_parses() {
        for name in JobMode::names() {
            let mode = JobMode::parse(name, UnitOperation::Restart).unwrap();
            assert_eq!(mode.as_str(), name);
        }
    }

    #[test]
    fn unknown_mode_is_rejected_with_operation() {
        let err = JobMode::parse("force", UnitOperation::ReloadOrRestart).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(
            err.to_string(),
            "invalid mode for reload-or-restart: force"
        );
    }

    #[test]
    fn state_defaults_to_running_and_rejects_unknown() {
        assert_eq!(validate_state("").unwrap(), "running");
        assert_eq!(validate_state("all").unwrap(), "all");
        assert!(matches!(
            validate_state("sleeping"),
            Err(UnitError::InvalidState(_))
        ));
    }

    #[test]
    fn unit_file_name_is_the_basename() {
        let file = UnitFile::from_path("/usr/lib/systemd/system/sshd.service", "enabled");
        assert_eq!(file.name, "sshd.service");
        assert_eq!(UnitFile::from_path("cron.service", "static").name, "cron.service");
    }

    #[test]
    fn unit_names_must_not_look_like_flags() {
        assert_eq!(validate_unit_name(" nginx.service ").unwrap(), "nginx.service");
        assert!(validate_unit_name("").is_err());
        assert!(validate_unit_name("--now").is_err());
        assert!(validate_unit_name("a b.service").is_err());
    }

    #[test]
    fn enable_and_disable_are_not_queued() {
        assert!(UnitOperation::Start.is_queued());
        assert!(UnitOperation::ReloadOrRestart.is_queued());
        assert!(!UnitOperation::Enable.is_queued());
        assert!(!UnitOperation::Disable.is_queued());
    }
}
