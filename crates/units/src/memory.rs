//! In-memory [`ServiceManager`] with scripted job outcomes and call recording.

use crate::error::{Result, UnitError};
use crate::manager::{CompletionSender, ServiceManager};
use crate::types::{JobId, JobMode, UnitFile, UnitFileChange, UnitStatus};
use async_trait::async_trait;
use globset::Glob;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

/// What happens to the completion slot of the next queued job.
#[derive(Debug, Clone)]
pub enum JobOutcome {
    /// The message is delivered before the queue call returns.
    Immediate(String),
    /// Delivered from a background task after the delay.
    Delayed(String, Duration),
    /// Kept until [`MemoryServiceManager::release_held`] is called.
    Held,
    /// The slot is dropped without a message.
    Dropped,
    /// Queueing itself fails.
    TransportError(String),
}

#[derive(Default)]
struct State {
    units: Vec<UnitStatus>,
    properties: HashMap<String, Map<String, Value>>,
    unit_files: Vec<UnitFile>,
    unit_file_changes: Vec<UnitFileChange>,
    calls: Vec<String>,
    held: Vec<CompletionSender>,
}

pub struct MemoryServiceManager {
    state: Mutex<State>,
    outcome: Mutex<JobOutcome>,
    next_job: AtomicU32,
}

impl Default for MemoryServiceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryServiceManager {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
            outcome: Mutex::new(JobOutcome::Immediate("done".to_string())),
            next_job: AtomicU32::new(0),
        }
    }

    pub fn with_unit(self, unit: UnitStatus) -> Self {
        self.state().units.push(unit);
        self
    }

    pub fn with_properties(self, unit: &str, props: Map<String, Value>) -> Self {
        self.state().properties.insert(unit.to_string(), props);
        self
    }

    pub fn with_unit_file(self, file: UnitFile) -> Self {
        self.state().unit_files.push(file);
        self
    }

    pub fn with_job_outcome(self, outcome: JobOutcome) -> Self {
        self.set_job_outcome(outcome);
        self
    }

    pub fn set_job_outcome(&self, outcome: JobOutcome) {
        *self.outcome.lock().unwrap_or_else(|p| p.into_inner()) = outcome;
    }

    pub fn set_unit_file_changes(&self, changes: Vec<UnitFileChange>) {
        self.state().unit_file_changes = changes;
    }

    /// Delivers `message` to the oldest held job. Returns false when nothing was held or the
    /// receiver is gone.
    pub fn release_held(&self, message: &str) -> bool {
        let sender = {
            let mut state = self.state();
            if state.held.is_empty() {
                return false;
            }
            state.held.remove(0)
        };
        sender.send(message.to_string()).is_ok()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state().calls.len()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn record(&self, call: String) {
        self.state().calls.push(call);
    }

    fn queue(&self, verb: &str, name: &str, mode: JobMode, done: CompletionSender) -> Result<JobId> {
        self.record(format!("{verb} {name} {mode}"));
        let outcome = self
            .outcome
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone();
        match outcome {
            JobOutcome::TransportError(message) => return Err(UnitError::Transport(message)),
            JobOutcome::Immediate(message) => {
                let _ = done.send(message);
            }
            JobOutcome::Delayed(message, delay) => {
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    let _ = done.send(message);
                });
            }
            JobOutcome::Held => self.state().held.push(done),
            JobOutcome::Dropped => drop(done),
        }
        Ok(self.next_job.fetch_add(1, Ordering::Relaxed) + 1)
    }

    fn matches_states(unit: &UnitStatus, states: &[String]) -> bool {
        states.is_empty()
            || states.iter().any(|state| {
                *state == unit.active_state || *state == unit.load_state || *state == unit.sub_state
            })
    }
}

#[async_trait]
impl ServiceManager for MemoryServiceManager {
    async fn list_units(&self, states: Option<&[String]>) -> Result<Vec<UnitStatus>> {
        let states = states.unwrap_or_default();
        self.record(format!("list_units {}", states.join(",")));
        Ok(self
            .state()
            .units
            .iter()
            .filter(|unit| Self::matches_states(unit, states))
            .cloned()
            .collect())
    }

    async fn list_units_by_patterns(
        &self,
        states: &[String],
        patterns: &[String],
    ) -> Result<Vec<UnitStatus>> {
        self.record(format!("list_units_by_patterns {}", patterns.join(",")));
        let mut matchers = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let glob = Glob::new(pattern)
                .map_err(|err| UnitError::InvalidUnitName(format!("{pattern}: {err}")))?;
            matchers.push(glob.compile_matcher());
        }
        Ok(self
            .state()
            .units
            .iter()
            .filter(|unit| Self::matches_states(unit, states))
            .filter(|unit| {
                matchers.is_empty() || matchers.iter().any(|m| m.is_match(&unit.name))
            })
            .cloned()
            .collect())
    }

    async fn get_properties(&self, unit: &str) -> Result<Map<String, Value>> {
        self.record(format!("get_properties {unit}"));
        let state = self.state();
        if let Some(props) = state.properties.get(unit) {
            return Ok(props.clone());
        }
        let mut props = Map::new();
        props.insert("Id".to_string(), Value::String(unit.to_string()));
        let load_state = if state.units.iter().any(|u| u.name == unit) {
            "loaded"
        } else {
            "not-found"
        };
        props.insert("LoadState".to_string(), Value::String(load_state.to_string()));
        Ok(props)
    }

    async fn start_unit(
        &self,
        name: &str,
        mode: JobMode,
        done: CompletionSender,
    ) -> Result<JobId> {
        self.queue("start", name, mode, done)
    }

    async fn stop_unit(&self, name: &str, mode: JobMode, done: CompletionSender) -> Result<JobId> {
        self.queue("stop", name, mode, done)
    }

    async fn restart_unit(
        &self,
        name: &str,
        mode: JobMode,
        done: CompletionSender,
    ) -> Result<JobId> {
        self.queue("restart", name, mode, done)
    }

    async fn reload_or_restart_unit(
        &self,
        name: &str,
        mode: JobMode,
        done: CompletionSender,
    ) -> Result<JobId> {
        self.queue("reload-or-restart", name, mode, done)
    }

    async fn kill_unit(&self, name: &str, signal: i32) -> Result<()> {
        self.record(format!("kill {name} {signal}"));
        Ok(())
    }

    async fn enable_unit_files(
        &self,
        files: &[String],
        runtime: bool,
        force: bool,
    ) -> Result<Vec<UnitFileChange>> {
        self.record(format!(
            "enable {} runtime={runtime} force={force}",
            files.join(" ")
        ));
        Ok(self.state().unit_file_changes.clone())
    }

    async fn disable_unit_files(
        &self,
        files: &[String],
        runtime: bool,
    ) -> Result<Vec<UnitFileChange>> {
        self.record(format!("disable {} runtime={runtime}", files.join(" ")));
        Ok(self.state().unit_file_changes.clone())
    }

    async fn list_unit_files(&self) -> Result<Vec<UnitFile>> {
        self.record("list_unit_files".to_string());
        Ok(self.state().unit_files.clone())
    }
}
