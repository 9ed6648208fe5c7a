//! Projections of unit, job and log records into tool output.
//!
//! Every record becomes its own JSON text content item.

use rmcp::model::{CallToolResult, Content};
use rmcp::ErrorData as McpError;
use serde::Serialize;
use serde_json::{json, Map, Value};
use systemd_mcp_journal::LogEntry;
use systemd_mcp_units::{prune_empty, JobResult, JobSummary, UnitFileChange, UnitStatus};

/// Properties kept by the compact `list_systemd_units_by_name` view.
pub(crate) const LIGHT_PROPERTIES: &[&str] = &[
    "Id",
    "Description",
    "LoadState",
    "FragmentPath",
    "UnitFileState",
    "UnitFilePreset",
    "ActiveState",
    "SubState",
    "ActiveEnterTimestamp",
    "InvocationID",
    "MainPID",
    "ExecMainPID",
    "ExecMainStatus",
    "TasksCurrent",
    "TasksMax",
    "CPUUsageNSec",
    "ControlGroup",
    "ExecStartPre",
    "ExecStart",
    "Restart",
    "MemoryCurrent",
];

/// `systemctl show` prints timestamps as dates, so they stay strings.
const NUMERIC_PROPERTIES: &[&str] = &[
    "MainPID",
    "ExecMainPID",
    "ExecMainStatus",
    "TasksCurrent",
    "TasksMax",
    "CPUUsageNSec",
    "MemoryCurrent",
];

pub(crate) fn json_content<T: Serialize>(value: &T) -> Result<Content, McpError> {
    serde_json::to_string(value)
        .map(Content::text)
        .map_err(|err| McpError::internal_error(format!("failed to encode result: {err}"), None))
}

pub(crate) fn json_contents<T: Serialize>(values: &[T]) -> Result<Vec<Content>, McpError> {
    values.iter().map(json_content).collect()
}

pub(crate) fn unit_view(unit: &UnitStatus, verbose: bool) -> Value {
    if verbose {
        return serde_json::to_value(unit).unwrap_or(Value::Null);
    }
    json!({
        "name": unit.name,
        "state": unit.active_state,
        "description": unit.description,
    })
}

/// Empty values are dropped first; the compact view then keeps [`LIGHT_PROPERTIES`] and turns
/// numeric properties into integers where they parse.
pub(crate) fn properties_view(props: Map<String, Value>, verbose: bool) -> Value {
    let props = prune_empty(props);
    if verbose {
        return Value::Object(props);
    }
    let mut light = Map::new();
    for key in LIGHT_PROPERTIES {
        let Some(value) = props.get(*key) else {
            continue;
        };
        let value = if NUMERIC_PROPERTIES.contains(key) {
            coerce_integer(value)
        } else {
            value.clone()
        };
        light.insert(key.to_string(), value);
    }
    Value::Object(light)
}

fn coerce_integer(value: &Value) -> Value {
    let Some(text) = value.as_str() else {
        return value.clone();
    };
    let text = text.trim();
    if let Ok(n) = text.parse::<u64>() {
        return Value::from(n);
    }
    if let Ok(n) = text.parse::<i64>() {
        return Value::from(n);
    }
    value.clone()
}

pub(crate) fn change_views(changes: &[UnitFileChange]) -> Vec<Value> {
    changes
        .iter()
        .map(|change| {
            json!({
                "type": change.change_type,
                "filename": change.filename,
                "destination": change.destination,
            })
        })
        .collect()
}

pub(crate) fn log_views(entries: &[LogEntry]) -> Result<Vec<Content>, McpError> {
    json_contents(entries)
}

/// `{status, message}` for every result, plus the outstanding job while it is still running.
pub(crate) fn job_result(result: &JobResult, job: Option<JobSummary>) -> CallToolResult {
    let mut view = match serde_json::to_value(result) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    view.insert("message".to_string(), Value::from(result.message()));
    if let Some(job) = job.and_then(|job| serde_json::to_value(job).ok()) {
        view.insert("job".to_string(), job);
    }

    let content = vec![Content::text(result.message().to_string())];
    let mut out = match result {
        JobResult::Failed(_) => CallToolResult::error(content),
        _ => CallToolResult::success(content),
    };
    out.structured_content = Some(Value::Object(view));
    out
}
