use super::SystemdService;
use crate::config::ServerConfig;
use rmcp::model::CallToolResult;
use serde_json::Value;
use std::sync::Arc;
use systemd_mcp_journal::memory::MemoryJournal;
use systemd_mcp_journal::LogRetriever;
use systemd_mcp_units::memory::MemoryServiceManager;
use systemd_mcp_units::UnitStatus;

mod jobs;

fn config() -> ServerConfig {
    ServerConfig {
        poll_interval_ms: 30,
        log_deadline_ms: 500,
        ..ServerConfig::default()
    }
}

fn manager() -> Arc<MemoryServiceManager> {
    Arc::new(
        MemoryServiceManager::new()
            .with_unit(
                UnitStatus::new("cron.service", "active", "running")
                    .with_description("Regular background program processing daemon"),
            )
            .with_unit(UnitStatus::new("rescue.service", "inactive", "dead")),
    )
}

fn service_with(
    manager: Arc<MemoryServiceManager>,
    journal: MemoryJournal,
    config: &ServerConfig,
) -> SystemdService {
    SystemdService::with_backends(manager, LogRetriever::new(Box::new(journal)), config)
}

fn service(manager: Arc<MemoryServiceManager>) -> SystemdService {
    service_with(manager, MemoryJournal::new(Vec::new()), &config())
}

fn texts(result: &CallToolResult) -> Vec<String> {
    result
        .content
        .iter()
        .filter_map(|c| c.as_text())
        .map(|t| t.text.clone())
        .collect()
}

fn json_items(result: &CallToolResult) -> Vec<Value> {
    texts(result)
        .iter()
        .map(|text| serde_json::from_str(text).unwrap_or(Value::Null))
        .collect()
}

fn error_code(result: &CallToolResult) -> Option<String> {
    assert_eq!(result.is_error, Some(true), "expected an error: {:?}", texts(result));
    result
        .structured_content
        .as_ref()
        .and_then(|v| v["error"]["code"].as_str())
        .map(str::to_string)
}
