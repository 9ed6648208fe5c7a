use crate::error::Result;
use crate::types::{JobId, JobMode, UnitFile, UnitFileChange, UnitStatus};
use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::oneshot;

/// Write half of a job's completion slot. The service manager sends exactly one message
/// (`done`, `failed`, `canceled`, ...) once the queued job has finished.
pub type CompletionSender = oneshot::Sender<String>;

/// Read half of a job's completion slot.
pub type CompletionReceiver = oneshot::Receiver<String>;

/// Capability surface of the host service manager.
///
/// Lifecycle methods return as soon as the job is queued; the outcome arrives later through the
/// supplied [`CompletionSender`]. `kill_unit` has no completion signal at all.
#[async_trait]
pub trait ServiceManager: Send + Sync {
    /// Lists loaded units, optionally restricted to the given states.
    async fn list_units(&self, states: Option<&[String]>) -> Result<Vec<UnitStatus>>;

    async fn list_units_by_patterns(
        &self,
        states: &[String],
        patterns: &[String],
    ) -> Result<Vec<UnitStatus>>;

    async fn get_properties(&self, unit: &str) -> Result<Map<String, Value>>;

    async fn start_unit(&self, name: &str, mode: JobMode, done: CompletionSender)
        -> Result<JobId>;

    async fn stop_unit(&self, name: &str, mode: JobMode, done: CompletionSender) -> Result<JobId>;

    async fn restart_unit(
        &self,
        name: &str,
        mode: JobMode,
        done: CompletionSender,
    ) -> Result<JobId>;

    async fn reload_or_restart_unit(
        &self,
        name: &str,
        mode: JobMode,
        done: CompletionSender,
    ) -> Result<JobId>;

    async fn kill_unit(&self, name: &str, signal: i32) -> Result<()>;

    async fn enable_unit_files(
        &self,
        files: &[String],
        runtime: bool,
        force: bool,
    ) -> Result<Vec<UnitFileChange>>;

    async fn disable_unit_files(&self, files: &[String], runtime: bool)
        -> Result<Vec<UnitFileChange>>;

    async fn list_unit_files(&self) -> Result<Vec<UnitFile>>;
}

/// Distinct active, load and sub states observed across `units`, sorted.
pub fn observed_states(units: &[UnitStatus]) -> Vec<String> {
    let mut states = std::collections::BTreeSet::new();
    for unit in units {
        for state in [&unit.active_state, &unit.load_state, &unit.sub_state] {
            if !state.is_empty() {
                states.insert(state.clone());
            }
        }
    }
    states.into_iter().collect()
}
