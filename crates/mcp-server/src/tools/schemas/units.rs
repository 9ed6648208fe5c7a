use rmcp::schemars;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ListUnitsByStateRequest {
    #[schemars(
        description = "List units that are in this state (default: running). The keyword 'all' lists every unit known to the service manager."
    )]
    pub state: Option<String>,

    #[schemars(description = "Set to true for the full unit record. Otherwise leave unset.")]
    pub verbose: Option<bool>,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ListUnitsByNameRequest {
    /// Glob patterns matched against unit names.
    #[schemars(
        description = "Unit names or glob patterns. 'foo*' matches foo.service; useful patterns are '*.timer', '*.service', '*.mount' and '*.socket'."
    )]
    #[serde(default)]
    pub names: Vec<String>,

    #[schemars(
        description = "Set to true for every non-empty property. Otherwise a compact set of load, active, process and resource properties is returned."
    )]
    pub verbose: Option<bool>,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct EnableOrDisableUnitRequest {
    #[schemars(
        description = "Unit file name (e.g. 'foo.service') when installed in a standard location, otherwise its absolute path. Wildcards are not accepted."
    )]
    pub file: String,

    #[schemars(description = "Set to true to disable the unit instead of enabling it.")]
    pub disable: Option<bool>,
}

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ListUnitFilesRequest {
    #[schemars(
        description = "Only return unit files in this state (enabled, disabled, static, masked, ...)."
    )]
    pub state: Option<String>,
}
