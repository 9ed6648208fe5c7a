use super::*;
use crate::tools::schemas::jobs::{
    CheckRestartReloadRequest, RestartReloadUnitRequest, StartUnitRequest, StopUnitRequest,
};
use pretty_assertions::assert_eq;
use rmcp::handler::server::wrapper::Parameters;
use systemd_mcp_units::memory::JobOutcome;

fn start(name: &str) -> Parameters<StartUnitRequest> {
    Parameters(StartUnitRequest {
        name: name.to_string(),
        ..StartUnitRequest::default()
    })
}

#[tokio::test]
async fn start_returns_the_manager_result() {
    let manager = manager();
    let service = service(manager.clone());

    let result = service.start_unit(start("cron.service")).await.unwrap();

    assert_eq!(result.is_error, Some(false));
    assert_eq!(texts(&result), vec!["done"]);
    let structured = result.structured_content.unwrap_or_default();
    assert_eq!(structured["status"], "completed");
    assert_eq!(manager.calls(), vec!["start cron.service replace"]);
}

#[tokio::test]
async fn slow_job_is_collected_by_check() {
    let manager = manager();
    manager.set_job_outcome(JobOutcome::Held);
    let service = service(manager.clone());

    let first = service.start_unit(start("cron.service")).await.unwrap();
    assert_eq!(texts(&first), vec!["Reload or restart still in progress."]);
    let structured = first.structured_content.unwrap_or_default();
    assert_eq!(structured["status"], "in_progress");
    assert_eq!(structured["job"]["unit"], "cron.service");
    assert_eq!(structured["job"]["operation"], "start");

    let second = service.start_unit(start("rescue.service")).await.unwrap();
    assert_eq!(error_code(&second).as_deref(), Some("job_in_flight"));
    assert_eq!(manager.call_count(), 1);

    assert!(manager.release_held("done"));
    let checked = service
        .check_restart_reload(Parameters(CheckRestartReloadRequest::default()))
        .await
        .unwrap();
    assert_eq!(texts(&checked), vec!["done"]);

    let again = service
        .check_restart_reload(Parameters(CheckRestartReloadRequest::default()))
        .await
        .unwrap();
    assert_eq!(error_code(&again).as_deref(), Some("no_job"));
}

#[tokio::test]
async fn check_without_job_is_no_job() {
    let service = service(manager());
    let result = service
        .check_restart_reload(Parameters(CheckRestartReloadRequest { timeout: Some(2) }))
        .await
        .unwrap();
    assert_eq!(error_code(&result).as_deref(), Some("no_job"));
}

#[tokio::test]
async fn lost_job_is_reported_as_failure() {
    let manager = manager();
    manager.set_job_outcome(JobOutcome::Dropped);
    let service = service(manager);

    let result = service.start_unit(start("cron.service")).await.unwrap();

    assert_eq!(result.is_error, Some(true));
    let structured = result.structured_content.unwrap_or_default();
    assert_eq!(structured["status"], "failed");
}

#[tokio::test]
async fn kill_sends_sigkill_without_a_job() {
    let manager = manager();
    let service = service(manager.clone());

    let result = service
        .stop_unit(Parameters(StopUnitRequest {
            name: "cron.service".to_string(),
            kill: Some(true),
            ..StopUnitRequest::default()
        }))
        .await
        .unwrap();

    assert_eq!(texts(&result), vec!["sent signal 9 to cron.service"]);
    assert_eq!(manager.calls(), vec!["kill cron.service 9"]);

    let check = service
        .check_restart_reload(Parameters(CheckRestartReloadRequest::default()))
        .await
        .unwrap();
    assert_eq!(error_code(&check).as_deref(), Some("no_job"));
}

#[tokio::test]
async fn invalid_mode_never_reaches_the_manager() {
    let manager = manager();
    let service = service(manager.clone());

    let result = service
        .start_unit(Parameters(StartUnitRequest {
            name: "cron.service".to_string(),
            mode: Some("force".to_string()),
            timeout: None,
        }))
        .await
        .unwrap();

    assert_eq!(error_code(&result).as_deref(), Some("invalid_request"));
    let structured = result.structured_content.unwrap_or_default();
    assert_eq!(structured["error"]["details"]["valid_modes"][0], "replace");
    assert_eq!(manager.call_count(), 0);
}

#[tokio::test]
async fn timeout_over_cap_is_rejected() {
    let manager = manager();
    let service = service(manager.clone());

    let result = service
        .start_unit(Parameters(StartUnitRequest {
            name: "cron.service".to_string(),
            timeout: Some(3600),
            mode: None,
        }))
        .await
        .unwrap();

    assert_eq!(error_code(&result).as_deref(), Some("invalid_request"));
    assert_eq!(manager.call_count(), 0);
}

#[tokio::test]
async fn forcerestart_selects_the_job_type() {
    let manager = manager();
    let service = service(manager.clone());

    for forcerestart in [None, Some(true)] {
        let result = service
            .restart_reload_unit(Parameters(RestartReloadUnitRequest {
                name: "cron.service".to_string(),
                forcerestart,
                ..RestartReloadUnitRequest::default()
            }))
            .await
            .unwrap();
        assert_eq!(texts(&result), vec!["done"]);
    }

    assert_eq!(
        manager.calls(),
        vec![
            "reload-or-restart cron.service replace",
            "restart cron.service replace",
        ]
    );
}
