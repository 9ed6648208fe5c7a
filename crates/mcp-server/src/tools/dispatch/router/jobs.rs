use super::super::SystemdService;
use super::error::unit_error;
use crate::tools::render::job_result;
use crate::tools::schemas::jobs::{
    CheckRestartReloadRequest, RestartReloadUnitRequest, StartUnitRequest, StopUnitRequest,
};
use rmcp::model::CallToolResult;
use rmcp::ErrorData as McpError;
use systemd_mcp_units::{JobResult, Result as UnitResult, UnitOperation};

async fn render(
    service: &SystemdService,
    outcome: UnitResult<JobResult>,
) -> Result<CallToolResult, McpError> {
    match outcome {
        Ok(result @ JobResult::InProgress) => {
            let job = service.jobs.in_flight().await;
            Ok(job_result(&result, job))
        }
        Ok(result) => Ok(job_result(&result, None)),
        Err(err) => Ok(unit_error(&err)),
    }
}

pub(in crate::tools::dispatch) async fn start_unit(
    service: &SystemdService,
    request: StartUnitRequest,
) -> Result<CallToolResult, McpError> {
    let outcome = service
        .jobs
        .issue(
            &request.name,
            UnitOperation::Start,
            request.mode.as_deref().unwrap_or_default(),
            request.timeout,
        )
        .await;
    render(service, outcome).await
}

pub(in crate::tools::dispatch) async fn restart_reload_unit(
    service: &SystemdService,
    request: RestartReloadUnitRequest,
) -> Result<CallToolResult, McpError> {
    let operation = if request.forcerestart.unwrap_or(false) {
        UnitOperation::Restart
    } else {
        UnitOperation::ReloadOrRestart
    };
    let outcome = service
        .jobs
        .issue(
            &request.name,
            operation,
            request.mode.as_deref().unwrap_or_default(),
            request.timeout,
        )
        .await;
    render(service, outcome).await
}

pub(in crate::tools::dispatch) async fn stop_unit(
    service: &SystemdService,
    request: StopUnitRequest,
) -> Result<CallToolResult, McpError> {
    let outcome = service
        .jobs
        .stop(
            &request.name,
            request.mode.as_deref().unwrap_or_default(),
            request.timeout,
            request.kill.unwrap_or(false),
        )
        .await;
    render(service, outcome).await
}

pub(in crate::tools::dispatch) async fn check_restart_reload(
    service: &SystemdService,
    request: CheckRestartReloadRequest,
) -> Result<CallToolResult, McpError> {
    let outcome = service.jobs.wait_for_completion(request.timeout).await;
    render(service, outcome).await
}
