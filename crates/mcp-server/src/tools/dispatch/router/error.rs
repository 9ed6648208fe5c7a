use rmcp::model::{CallToolResult, Content};
use serde_json::json;
use systemd_mcp_journal::LogError;
use systemd_mcp_protocol::{codes, ErrorEnvelope, ToolNextAction};
use systemd_mcp_units::{JobMode, UnitError, MAX_TIMEOUT_SECS, VALID_STATES};

pub(in crate::tools::dispatch) fn tool_error_envelope(error: ErrorEnvelope) -> CallToolResult {
    let mut text = format!("error: {}\n{}", error.code, error.message);
    if let Some(hint) = error.hint.as_deref().filter(|h| !h.trim().is_empty()) {
        text.push_str(&format!("\nhint: {hint}"));
    }
    for action in &error.next_actions {
        text.push_str(&format!("\nnext: {} ({})", action.tool, action.reason));
    }

    let mut result = CallToolResult::error(vec![Content::text(text)]);
    result.structured_content = Some(json!({ "error": error }));
    result
}

pub(in crate::tools::dispatch) fn invalid_request(message: impl Into<String>) -> CallToolResult {
    tool_error_envelope(ErrorEnvelope::new(codes::INVALID_REQUEST, message))
}

pub(in crate::tools::dispatch) fn unit_error(err: &UnitError) -> CallToolResult {
    let envelope = ErrorEnvelope::new(err.code(), err.to_string());
    let envelope = match err {
        UnitError::InvalidMode { .. } => {
            envelope.with_details(json!({ "valid_modes": JobMode::names() }))
        }
        UnitError::InvalidState(_) => envelope.with_details(json!({ "valid_states": VALID_STATES })),
        UnitError::TimeoutOverCap { .. } => envelope.with_hint(format!(
            "use a timeout of at most {MAX_TIMEOUT_SECS} and poll with check_restart_reload"
        )),
        UnitError::JobInFlight { unit, .. } => envelope
            .with_details(json!({ "unit": unit }))
            .with_hint("only one job per connection is tracked; collect its result first")
            .with_next_action(ToolNextAction::new(
                "check_restart_reload",
                json!({}),
                "wait for the outstanding job",
            )),
        UnitError::NoJob => {
            envelope.with_hint("start, stop or restart a unit first; there is nothing to check")
        }
        UnitError::NotFound(_) => envelope.with_next_action(ToolNextAction::new(
            "list_systemd_units_by_state",
            json!({ "state": "all" }),
            "see which units exist",
        )),
        _ => envelope,
    };
    if !err.is_validation() {
        log::warn!("unit operation failed: {err}");
    }
    tool_error_envelope(envelope)
}

pub(in crate::tools::dispatch) fn log_error(err: &LogError) -> CallToolResult {
    let envelope = ErrorEnvelope::new(err.code(), err.to_string());
    let envelope = match err {
        LogError::Timeout(_) => {
            envelope.with_hint("the journal did not answer in time; retry with a smaller count")
        }
        LogError::UnitNotFound(_) => envelope.with_next_action(ToolNextAction::new(
            "list_log",
            json!({}),
            "read the newest entries of all units",
        )),
        _ => envelope,
    };
    log::warn!("log retrieval failed: {err}");
    tool_error_envelope(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn text_of(result: &CallToolResult) -> &str {
        result
            .content
            .first()
            .and_then(|c| c.as_text())
            .map(|t| t.text.as_str())
            .unwrap_or_default()
    }

    #[test]
    fn job_in_flight_points_at_check() {
        let result = unit_error(&UnitError::JobInFlight {
            job_id: 3,
            unit: "cron.service".to_string(),
            operation: "restart".to_string(),
        });
        assert_eq!(result.is_error, Some(true));
        assert!(text_of(&result).starts_with("error: job_in_flight\n"));
        assert!(text_of(&result).contains("next: check_restart_reload"));
        let structured = result.structured_content.unwrap_or_default();
        assert_eq!(structured["error"]["code"], "job_in_flight");
        assert_eq!(structured["error"]["details"]["unit"], "cron.service");
    }

    #[test]
    fn invalid_mode_lists_valid_modes() {
        let result = unit_error(&UnitError::InvalidMode {
            operation: "start".to_string(),
            mode: "force".to_string(),
        });
        let structured = result.structured_content.unwrap_or_default();
        assert_eq!(structured["error"]["code"], "invalid_request");
        assert_eq!(structured["error"]["details"]["valid_modes"][0], "replace");
    }

    #[test]
    fn log_timeout_has_timeout_code() {
        let result = log_error(&LogError::Timeout(Duration::from_secs(1)));
        assert!(text_of(&result).starts_with("error: timeout\n"));
        assert!(text_of(&result).contains("hint: "));
    }
}
