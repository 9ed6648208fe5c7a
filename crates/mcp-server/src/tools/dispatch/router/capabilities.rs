use super::super::SystemdService;
use crate::tools::render::json_content;
use rmcp::model::CallToolResult;
use serde_json::json;
use systemd_mcp_protocol::{
    Capabilities, CapabilitiesServer, DefaultLimits, ToolNextAction,
    CAPABILITIES_SCHEMA_VERSION,
};
use systemd_mcp_units::MAX_TIMEOUT_SECS;

pub(in crate::tools::dispatch) fn describe(service: &SystemdService) -> Capabilities {
    Capabilities {
        schema_version: CAPABILITIES_SCHEMA_VERSION,
        server: CapabilitiesServer {
            name: "systemd-mcp".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            scope: service.scope.as_str().to_string(),
        },
        limits: DefaultLimits {
            max_job_timeout_secs: MAX_TIMEOUT_SECS,
            job_poll_interval_ms: service.jobs.poll_interval().as_millis() as u64,
            log_deadline_ms: service.logs.deadline().as_millis() as u64,
            unmatched_unit: service.logs.policy().as_str().to_string(),
        },
        start_route: ToolNextAction::new(
            "list_systemd_units_by_state",
            json!({ "state": "running" }),
            "Start with the running units, then narrow down by name.",
        ),
    }
}

/// Server identity and effective limits.
pub(in crate::tools::dispatch) async fn capabilities(
    service: &SystemdService,
) -> Result<CallToolResult, rmcp::ErrorData> {
    Ok(CallToolResult::success(vec![json_content(&describe(
        service,
    ))?]))
}
