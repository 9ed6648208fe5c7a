use rmcp::schemars;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct ListLogRequest {
    /// Defaults to 20.
    #[schemars(description = "Number of log entries to return (default: 20)")]
    pub count: Option<u64>,

    #[schemars(
        description = "Exact name of the service/unit whose entries are wanted. Without a unit the newest entries of all units are returned."
    )]
    pub unit: Option<String>,

    #[schemars(description = "Set to true to include every journal field of each entry.")]
    pub verbose: Option<bool>,
}
