use super::super::SystemdService;
use super::error::log_error;
use crate::tools::render::log_views;
use crate::tools::schemas::logs::ListLogRequest;
use rmcp::model::CallToolResult;
use rmcp::ErrorData as McpError;
use serde_json::json;
use systemd_mcp_journal::{LogQuery, DEFAULT_LOG_COUNT};
use tokio_util::sync::CancellationToken;

/// Newest journal entries, abandoned when the request is cancelled or the deadline passes.
pub(in crate::tools::dispatch) async fn list_log(
    service: &SystemdService,
    request: ListLogRequest,
    cancel: &CancellationToken,
) -> Result<CallToolResult, McpError> {
    let query = LogQuery::new(
        request.count.unwrap_or(DEFAULT_LOG_COUNT),
        request.unit.as_deref(),
    )
    .with_fields(request.verbose.unwrap_or(false));

    let log = match service.logs.retrieve_with_cancel(query, cancel).await {
        Ok(log) => log,
        Err(err) => return Ok(log_error(&err)),
    };
    log::debug!(
        "list_log returned {} entries (matched by {})",
        log.entries.len(),
        log.matched_by.unwrap_or("unfiltered tail")
    );

    let mut result = CallToolResult::success(log_views(&log.entries)?);
    result.structured_content = Some(json!({
        "count": log.entries.len(),
        "matched_by": log.matched_by,
    }));
    Ok(result)
}
