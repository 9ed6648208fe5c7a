//! MCP tool dispatch for systemd-mcp
//!
//! One [`SystemdService`] per connection: a service manager for unit queries, a [`JobBridge`]
//! holding the connection's single job slot, and a [`LogRetriever`] over the journal.

use crate::config::ServerConfig;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::model::{Implementation, ServerCapabilities, ServerInfo};
use rmcp::{tool_handler, ServerHandler};
use std::sync::Arc;
use systemd_mcp_journal::{JournalctlCursor, LogRetriever};
use systemd_mcp_units::{JobBridge, ManagerScope, ServiceManager, SystemctlManager};

mod router;
#[cfg(test)]
mod tests;

const INSTRUCTIONS: &str = "systemd-mcp manages systemd units on this host. Use \
'list_systemd_units_by_state' or 'list_systemd_units_by_name' to inspect units, \
'start_unit', 'stop_unit' and 'restart_reload_unit' to change them (a job that outlives the \
short wait is reported as still in progress; collect it with 'check_restart_reload'), \
'enable_or_disable_unit' and 'list_unit_files' for unit files, and 'list_log' for recent \
journal entries.";

/// systemd MCP service
#[derive(Clone)]
pub struct SystemdService {
    units: Arc<dyn ServiceManager>,
    jobs: Arc<JobBridge>,
    logs: Arc<LogRetriever>,
    scope: ManagerScope,
    tool_router: ToolRouter<Self>,
}

impl SystemdService {
    /// `systemctl` and `journalctl` backends as configured.
    pub fn from_config(config: &ServerConfig) -> Self {
        let manager = SystemctlManager::new(config.scope).with_program(config.systemctl.clone());
        let cursor = JournalctlCursor::new()
            .with_program(config.journalctl.clone())
            .with_directory(config.journal_directory.clone());
        Self::with_backends(
            Arc::new(manager),
            LogRetriever::new(Box::new(cursor)),
            config,
        )
    }

    /// Applies the configured waits and unmatched-unit policy to the given backends.
    pub fn with_backends(
        units: Arc<dyn ServiceManager>,
        logs: LogRetriever,
        config: &ServerConfig,
    ) -> Self {
        let jobs = JobBridge::new(Arc::clone(&units)).with_poll_interval(config.poll_interval());
        let logs = logs
            .with_policy(config.unmatched_unit)
            .with_deadline(config.log_deadline());
        Self {
            units,
            jobs: Arc::new(jobs),
            logs: Arc::new(logs),
            scope: config.scope,
            tool_router: router::build_tool_router(),
        }
    }
}

#[tool_handler]
impl ServerHandler for SystemdService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.into()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            ..Default::default()
        }
    }
}
