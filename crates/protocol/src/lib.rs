use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const CAPABILITIES_SCHEMA_VERSION: u32 = 1;

/// Stable error codes carried in [`ErrorEnvelope::code`].
pub mod codes {
    pub const INVALID_REQUEST: &str = "invalid_request";
    pub const TRANSPORT: &str = "transport";
    pub const NOT_FOUND: &str = "not_found";
    pub const TIMEOUT: &str = "timeout";
    pub const JOB_IN_FLIGHT: &str = "job_in_flight";
    pub const NO_JOB: &str = "no_job";
    pub const INTERNAL: &str = "internal";
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct ToolNextAction {
    pub tool: String,
    pub args: serde_json::Value,
    pub reason: String,
}

impl ToolNextAction {
    pub fn new(tool: &str, args: serde_json::Value, reason: impl Into<String>) -> Self {
        Self {
            tool: tool.to_string(),
            args,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct ErrorEnvelope {
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
    pub hint: Option<String>,
    #[serde(default)]
    pub next_actions: Vec<ToolNextAction>,
}

impl ErrorEnvelope {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            code: code.to_string(),
            message: message.into(),
            details: None,
            hint: None,
            next_actions: Vec::new(),
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_next_action(mut self, action: ToolNextAction) -> Self {
        self.next_actions.push(action);
        self
    }
}

/// Effective waiting limits of a running server.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct DefaultLimits {
    /// Largest `timeout` (seconds) accepted by lifecycle tools.
    pub max_job_timeout_secs: u64,
    /// How long one lifecycle call waits for the job result before reporting "in progress".
    pub job_poll_interval_ms: u64,
    /// Hard deadline for a single log retrieval.
    pub log_deadline_ms: u64,
    /// What `list_log` does when a unit matches no entries.
    pub unmatched_unit: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct CapabilitiesServer {
    pub name: String,
    pub version: String,
    pub scope: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, JsonSchema)]
pub struct Capabilities {
    pub schema_version: u32,
    pub server: CapabilitiesServer,
    pub limits: DefaultLimits,
    pub start_route: ToolNextAction,
}
