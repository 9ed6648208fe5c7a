use super::super::SystemdService;
use crate::tools::schemas::jobs::{
    CheckRestartReloadRequest, RestartReloadUnitRequest, StartUnitRequest, StopUnitRequest,
};
use crate::tools::schemas::logs::ListLogRequest;
use crate::tools::schemas::units::{
    EnableOrDisableUnitRequest, ListUnitFilesRequest, ListUnitsByNameRequest,
    ListUnitsByStateRequest,
};
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::CallToolResult;
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{tool, tool_router, ErrorData as McpError};

pub(in crate::tools::dispatch) fn build_tool_router() -> ToolRouter<SystemdService> {
    SystemdService::tool_router()
}

#[tool_router]
impl SystemdService {
    #[tool(
        description = "List systemd units on the host that are in the given state. Returns name, state and description of each unit as JSON. Valid states: active, dead, inactive, loaded, mounted, not-found, plugged, running, all."
    )]
    pub async fn list_systemd_units_by_state(
        &self,
        Parameters(request): Parameters<ListUnitsByStateRequest>,
    ) -> Result<CallToolResult, McpError> {
        super::units::list_units_by_state(self, request).await
    }

    #[tool(
        description = "List systemd units by name or glob pattern. Returns the non-empty properties of every matching unit as JSON."
    )]
    pub async fn list_systemd_units_by_name(
        &self,
        Parameters(request): Parameters<ListUnitsByNameRequest>,
    ) -> Result<CallToolResult, McpError> {
        super::units::list_units_by_name(self, request).await
    }

    #[tool(description = "List the distinct load, active and sub states currently used by units.")]
    pub async fn list_systemd_unit_states(&self) -> Result<CallToolResult, McpError> {
        super::units::list_unit_states(self).await
    }

    #[tool(
        description = "Start a unit. Waits briefly for the job; a job that is still running is reported as in progress and can be collected with check_restart_reload."
    )]
    pub async fn start_unit(
        &self,
        Parameters(request): Parameters<StartUnitRequest>,
    ) -> Result<CallToolResult, McpError> {
        super::jobs::start_unit(self, request).await
    }

    #[tool(
        description = "Reload a unit, or restart it when it cannot reload. With forcerestart the unit is always restarted. A job that is still running is reported as in progress."
    )]
    pub async fn restart_reload_unit(
        &self,
        Parameters(request): Parameters<RestartReloadUnitRequest>,
    ) -> Result<CallToolResult, McpError> {
        super::jobs::restart_reload_unit(self, request).await
    }

    #[tool(
        description = "Stop a unit. With kill the unit receives SIGKILL immediately and no job is queued."
    )]
    pub async fn stop_unit(
        &self,
        Parameters(request): Parameters<StopUnitRequest>,
    ) -> Result<CallToolResult, McpError> {
        super::jobs::stop_unit(self, request).await
    }

    #[tool(
        description = "Check whether the last start, stop, restart or reload has finished and return its result."
    )]
    pub async fn check_restart_reload(
        &self,
        Parameters(request): Parameters<CheckRestartReloadRequest>,
    ) -> Result<CallToolResult, McpError> {
        super::jobs::check_restart_reload(self, request).await
    }

    #[tool(
        description = "Enable a unit file, or disable it with disable=true. Returns the symlinks that were created or removed."
    )]
    pub async fn enable_or_disable_unit(
        &self,
        Parameters(request): Parameters<EnableOrDisableUnitRequest>,
    ) -> Result<CallToolResult, McpError> {
        super::units::enable_or_disable_unit(self, request).await
    }

    #[tool(description = "List the unit files known to systemd with their enablement state.")]
    pub async fn list_unit_files(
        &self,
        Parameters(request): Parameters<ListUnitFilesRequest>,
    ) -> Result<CallToolResult, McpError> {
        super::units::list_unit_files(self, request).await
    }

    #[tool(
        description = "Return the newest journal entries, optionally for one unit. Each entry has time, unit, host and message."
    )]
    pub async fn list_log(
        &self,
        Parameters(request): Parameters<ListLogRequest>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        super::logs::list_log(self, request, &context.ct).await
    }

    /// Server identity and effective limits.
    #[tool(
        description = "Return server name, version, manager scope and the effective job and log limits."
    )]
    pub async fn capabilities(&self) -> Result<CallToolResult, McpError> {
        super::capabilities::capabilities(self).await
    }
}
