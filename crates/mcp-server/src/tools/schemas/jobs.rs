use rmcp::schemars;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct StartUnitRequest {
    #[schemars(description = "Exact name of the unit to start")]
    pub name: String,

    #[schemars(
        description = "Seconds to wait for the job (at most 60). If the job has not finished after a short poll it keeps running in the background; collect the result with check_restart_reload."
    )]
    pub timeout: Option<u64>,

    #[schemars(
        description = "Job mode: replace (default), fail, isolate, ignore-dependencies or ignore-requirements."
    )]
    pub mode: Option<String>,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct RestartReloadUnitRequest {
    #[schemars(description = "Exact name of the unit to restart or reload")]
    pub name: String,

    #[schemars(
        description = "Seconds to wait for the job (at most 60). If the job has not finished after a short poll it keeps running in the background; collect the result with check_restart_reload."
    )]
    pub timeout: Option<u64>,

    #[schemars(
        description = "Job mode: replace (default), fail, isolate, ignore-dependencies or ignore-requirements."
    )]
    pub mode: Option<String>,

    #[schemars(
        description = "Set to true to always restart. Otherwise the unit is reloaded when it supports reloading and restarted when it does not."
    )]
    pub forcerestart: Option<bool>,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct StopUnitRequest {
    #[schemars(description = "Exact name of the unit to stop")]
    pub name: String,

    #[schemars(
        description = "Seconds to wait for the stop job (at most 60). Afterwards the stop continues in the background."
    )]
    pub timeout: Option<u64>,

    #[schemars(
        description = "Job mode: 'replace' (default) replaces already queued jobs; 'fail' fails if other jobs are queued."
    )]
    pub mode: Option<String>,

    #[schemars(
        description = "Send SIGKILL instead of stopping cleanly. Use only when the unit does not stop, even after waiting."
    )]
    pub kill: Option<bool>,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct CheckRestartReloadRequest {
    #[schemars(description = "Seconds to wait for the outstanding job (at most 60).")]
    pub timeout: Option<u64>,
}
