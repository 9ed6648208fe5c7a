use crate::cursor::{FieldMatch, LogCursor};
use crate::entry::{LogEntry, IDENTIFIER_FIELD, USER_UNIT_FIELD};
use crate::error::{LogError, Result};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_LOG_DEADLINE: Duration = Duration::from_secs(1);
pub const DEFAULT_LOG_COUNT: u64 = 20;

/// "Last `count` entries, optionally for one unit."
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub count: u64,
    pub unit: Option<String>,
    pub include_fields: bool,
}

impl LogQuery {
    /// A blank unit means no filter.
    pub fn new(count: u64, unit: Option<&str>) -> Self {
        Self {
            count,
            unit: unit
                .map(str::trim)
                .filter(|u| !u.is_empty())
                .map(str::to_string),
            include_fields: false,
        }
    }

    pub fn with_fields(mut self, include: bool) -> Self {
        self.include_fields = include;
        self
    }
}

type BuildMatches = dyn Fn(&str) -> Result<Vec<FieldMatch>> + Send + Sync;

/// One way of narrowing the journal to a unit name.
#[derive(Clone)]
pub struct FilterStage {
    name: &'static str,
    build: Arc<BuildMatches>,
}

impl FilterStage {
    pub fn new(
        name: &'static str,
        build: impl Fn(&str) -> Result<Vec<FieldMatch>> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            build: Arc::new(build),
        }
    }

    /// Stage matching a single field against the unit name.
    pub fn field(name: &'static str, field: &'static str) -> Self {
        Self::new(name, move |unit| Ok(vec![FieldMatch::new(field, unit)?]))
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn matches(&self, unit: &str) -> Result<Vec<FieldMatch>> {
        (self.build)(unit)
    }
}

impl std::fmt::Debug for FilterStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterStage").field("name", &self.name).finish()
    }
}

/// Identifier first, then the user-session unit.
pub fn default_stages() -> Vec<FilterStage> {
    vec![
        FilterStage::field("syslog_identifier", IDENTIFIER_FIELD),
        FilterStage::field("user_unit", USER_UNIT_FIELD),
    ]
}

/// What to do when no stage finds anything for a named unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedUnitPolicy {
    /// Return the unfiltered tail window.
    #[default]
    FallbackToAll,
    NotFound,
}

impl UnmatchedUnitPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FallbackToAll => "fallback_to_all",
            Self::NotFound => "not_found",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "fallback_to_all" | "fallback" | "all" => Some(Self::FallbackToAll),
            "not_found" | "notfound" => Some(Self::NotFound),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievedLog {
    pub entries: Vec<LogEntry>,
    /// Stage that produced the window; `None` for the unfiltered tail.
    pub matched_by: Option<&'static str>,
}

impl RetrievedLog {
    fn empty(matched_by: Option<&'static str>) -> Self {
        Self {
            entries: Vec::new(),
            matched_by,
        }
    }
}

fn check(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(LogError::Cancelled);
    }
    Ok(())
}

fn window(cursor: &mut dyn LogCursor, count: u64) -> Result<u64> {
    cursor.seek_tail()?;
    cursor.step_back(count)
}

/// Runs the stage cascade on `cursor` and reads forward to the tail.
///
/// Stages run strictly in order and the first one whose window is non-empty wins. `cancel` is
/// checked between stages and between entries.
pub fn collect_entries(
    cursor: &mut dyn LogCursor,
    stages: &[FilterStage],
    policy: UnmatchedUnitPolicy,
    query: &LogQuery,
    cancel: &CancellationToken,
) -> Result<RetrievedLog> {
    if query.count == 0 {
        return Ok(RetrievedLog::empty(None));
    }

    cursor.clear_matches()?;
    let mut matched_by = None;
    let mut stepped = 0;

    if let Some(unit) = query.unit.as_deref() {
        for stage in stages {
            check(cancel)?;
            cursor.clear_matches()?;
            for filter in stage.matches(unit)? {
                cursor.add_match(&filter)?;
            }
            stepped = window(cursor, query.count)?;
            log::debug!("stage {} for {unit}: {stepped} entries", stage.name());
            if stepped > 0 {
                matched_by = Some(stage.name());
                break;
            }
        }

        if matched_by.is_none() {
            cursor.clear_matches()?;
            if policy == UnmatchedUnitPolicy::NotFound {
                return Err(LogError::UnitNotFound(unit.to_string()));
            }
            log::info!("no journal entries for {unit}, returning unfiltered tail");
        }
    }

    if matched_by.is_none() {
        check(cancel)?;
        stepped = window(cursor, query.count)?;
    }
    if stepped == 0 {
        return Ok(RetrievedLog::empty(matched_by));
    }

    let mut entries = Vec::with_capacity(stepped as usize);
    loop {
        check(cancel)?;
        let raw = cursor.current_entry()?;
        entries.push(LogEntry::from_raw(&raw, query.include_fields));
        if !cursor.next()? {
            break;
        }
    }
    Ok(RetrievedLog {
        entries,
        matched_by,
    })
}

/// Log retrieval under a hard deadline.
///
/// The cursor is owned behind a mutex so concurrent requests take turns. Each retrieval runs
/// on a blocking worker; when the deadline fires the caller gets [`LogError::Timeout`] and the
/// worker is told to stop at its next checkpoint. A cursor call that is already blocked is not
/// interrupted and keeps the cursor locked until it returns.
pub struct LogRetriever {
    cursor: Arc<Mutex<Box<dyn LogCursor>>>,
    stages: Arc<[FilterStage]>,
    policy: UnmatchedUnitPolicy,
    deadline: Duration,
}

impl LogRetriever {
    pub fn new(cursor: Box<dyn LogCursor>) -> Self {
        Self {
            cursor: Arc::new(Mutex::new(cursor)),
            stages: default_stages().into(),
            policy: UnmatchedUnitPolicy::default(),
            deadline: DEFAULT_LOG_DEADLINE,
        }
    }

    pub fn with_policy(mut self, policy: UnmatchedUnitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn with_stages(mut self, stages: Vec<FilterStage>) -> Self {
        self.stages = stages.into();
        self
    }

    pub fn policy(&self) -> UnmatchedUnitPolicy {
        self.policy
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub async fn retrieve(&self, query: LogQuery) -> Result<RetrievedLog> {
        self.retrieve_with_cancel(query, &CancellationToken::new())
            .await
    }

    /// Like [`retrieve`](Self::retrieve), but also gives up when `parent` is cancelled.
    pub async fn retrieve_with_cancel(
        &self,
        query: LogQuery,
        parent: &CancellationToken,
    ) -> Result<RetrievedLog> {
        let cancel = parent.child_token();
        let task = {
            let cursor = Arc::clone(&self.cursor);
            let stages = Arc::clone(&self.stages);
            let policy = self.policy;
            let cancel = cancel.clone();
            tokio::task::spawn_blocking(move || {
                let mut cursor = cursor.lock().unwrap_or_else(|p| p.into_inner());
                collect_entries(&mut **cursor, &stages, policy, &query, &cancel)
            })
        };

        let outcome = tokio::select! {
            joined = tokio::time::timeout(self.deadline, task) => joined,
            _ = parent.cancelled() => {
                cancel.cancel();
                return Err(LogError::Cancelled);
            }
        };

        match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(join)) => Err(LogError::Task(join.to_string())),
            Err(_) => {
                cancel.cancel();
                log::warn!("log retrieval exceeded {:?}, abandoning", self.deadline);
                Err(LogError::Timeout(self.deadline))
            }
        }
    }
}
