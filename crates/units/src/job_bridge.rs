//! Bounded waiting on service manager jobs.
//!
//! The service manager queues a state change and reports its outcome later. [`JobBridge`]
//! turns that into a call that either returns the outcome within a short poll window or reports
//! [`JobResult::InProgress`], after which the caller polls again with
//! [`JobBridge::wait_for_completion`].
//!
//! ```text
//! NotStarted --issue--> Pending --poll, no result--> InProgress
//!                          |                             |
//!                          +-------- result seen --------+--> Completed / Failed
//! ```

use crate::error::{Result, UnitError};
use crate::manager::{CompletionReceiver, ServiceManager};
use crate::types::{validate_unit_name, JobId, JobMode, UnitFileChange, UnitOperation};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot::{self, error::TryRecvError};
use tokio::sync::Mutex;

/// Largest caller timeout (seconds) accepted by lifecycle calls.
pub const MAX_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// How long a single call waits on the completion slot.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
/// SIGKILL
pub const KILL_SIGNAL: i32 = 9;

pub const IN_PROGRESS_MESSAGE: &str = "Reload or restart still in progress.";

/// Caller supplied timeout plus the bridge's own poll interval.
///
/// The timeout is validated against [`MAX_TIMEOUT_SECS`] but a single call only ever waits for
/// the poll interval; longer horizons are covered by polling again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedWaitPolicy {
    timeout: Duration,
    poll_interval: Duration,
}

impl BoundedWaitPolicy {
    pub fn from_secs(timeout_secs: Option<u64>, poll_interval: Duration) -> Result<Self> {
        let requested = timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if requested > MAX_TIMEOUT_SECS {
            return Err(UnitError::TimeoutOverCap {
                requested,
                cap: MAX_TIMEOUT_SECS,
            });
        }
        Ok(Self {
            timeout: Duration::from_secs(requested),
            poll_interval,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum JobResult {
    /// Issued, nobody has polled yet.
    Pending,
    /// Polled at least once without a result; the job keeps running in the background.
    InProgress,
    /// The exact message delivered by the service manager (`done`, `failed`, ...).
    Completed(String),
    Failed(String),
}

impl JobResult {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Failed(_))
    }

    /// Text shown to the caller.
    pub fn message(&self) -> &str {
        match self {
            Self::Pending => "Job queued.",
            Self::InProgress => IN_PROGRESS_MESSAGE,
            Self::Completed(message) | Self::Failed(message) => message,
        }
    }
}

/// One outstanding state change request.
#[derive(Debug)]
pub struct UnitJob {
    id: JobId,
    unit: String,
    operation: UnitOperation,
    mode: JobMode,
    issued_at: Instant,
    state: JobResult,
    done: CompletionReceiver,
}

impl UnitJob {
    fn lost_result(&self) -> String {
        format!(
            "{} of {} (job {}) ended without reporting a result",
            self.operation, self.unit, self.id
        )
    }

    fn summary(&self) -> JobSummary {
        JobSummary {
            id: self.id,
            unit: self.unit.clone(),
            operation: self.operation,
            mode: self.mode,
            elapsed_ms: self.issued_at.elapsed().as_millis() as u64,
            state: self.state.clone(),
        }
    }
}

/// Read-only view of the job held in the slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobSummary {
    pub id: JobId,
    pub unit: String,
    pub operation: UnitOperation,
    pub mode: JobMode,
    pub elapsed_ms: u64,
    pub state: JobResult,
}

/// Bridges queued service manager jobs to bounded, re-pollable calls.
///
/// The bridge owns a single completion slot. Holding its lock across the poll also serialises
/// concurrent callers of one connection.
pub struct JobBridge {
    manager: Arc<dyn ServiceManager>,
    slot: Mutex<Option<UnitJob>>,
    poll_interval: Duration,
}

impl JobBridge {
    pub fn new(manager: Arc<dyn ServiceManager>) -> Self {
        Self {
            manager,
            slot: Mutex::new(None),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Issues `operation` on `unit` and waits one poll interval for its outcome.
    ///
    /// Validation happens before the service manager is contacted. Enable/disable finish
    /// synchronously and come back as `Completed` with a description of the changed symlinks.
    pub async fn issue(
        &self,
        unit: &str,
        operation: UnitOperation,
        mode: &str,
        timeout_secs: Option<u64>,
    ) -> Result<JobResult> {
        let mode = JobMode::parse(mode, operation)?;
        let policy = BoundedWaitPolicy::from_secs(timeout_secs, self.poll_interval)?;
        let unit = validate_unit_name(unit)?;

        if !operation.is_queued() {
            let files = [unit.to_string()];
            let changes = self.change_unit_files(operation, &files).await?;
            return Ok(JobResult::Completed(describe_changes(&files, &changes)));
        }

        let mut slot = self.slot.lock().await;
        // A finished predecessor leaves the slot before the new job is queued, so a failed
        // reissue leaves nothing behind to report.
        if let Some(mut previous) = slot.take() {
            match previous.done.try_recv() {
                Err(TryRecvError::Empty) => {
                    let err = UnitError::JobInFlight {
                        job_id: previous.id,
                        unit: previous.unit.clone(),
                        operation: previous.operation.to_string(),
                    };
                    *slot = Some(previous);
                    return Err(err);
                }
                Ok(message) => log::info!(
                    "discarding unread result of {} {} (job {}): {message}",
                    previous.operation,
                    previous.unit,
                    previous.id
                ),
                Err(TryRecvError::Closed) => log::debug!(
                    "previous job {} closed its slot without a result",
                    previous.id
                ),
            }
        }

        let (tx, rx) = oneshot::channel();
        let id = match operation {
            UnitOperation::Start => self.manager.start_unit(unit, mode, tx).await?,
            UnitOperation::Stop => self.manager.stop_unit(unit, mode, tx).await?,
            UnitOperation::Restart => self.manager.restart_unit(unit, mode, tx).await?,
            UnitOperation::ReloadOrRestart => {
                self.manager.reload_or_restart_unit(unit, mode, tx).await?
            }
            other => {
                return Err(UnitError::InvalidMode {
                    operation: other.to_string(),
                    mode: mode.to_string(),
                })
            }
        };
        log::info!("queued {operation} of {unit} (job {id}, mode {mode})");

        *slot = Some(UnitJob {
            id,
            unit: unit.to_string(),
            operation,
            mode,
            issued_at: Instant::now(),
            state: JobResult::Pending,
            done: rx,
        });
        Self::poll_slot(&mut slot, policy).await
    }

    /// Waits up to one poll interval for the outstanding job's result.
    pub async fn wait_for_completion(&self, timeout_secs: Option<u64>) -> Result<JobResult> {
        let policy = BoundedWaitPolicy::from_secs(timeout_secs, self.poll_interval)?;
        let mut slot = self.slot.lock().await;
        Self::poll_slot(&mut slot, policy).await
    }

    /// Stops `unit`, or with `kill` sends SIGKILL without queueing a job.
    ///
    /// The kill path never touches the completion slot and does not wait for anything.
    pub async fn stop(
        &self,
        unit: &str,
        mode: &str,
        timeout_secs: Option<u64>,
        kill: bool,
    ) -> Result<JobResult> {
        if !kill {
            return self
                .issue(unit, UnitOperation::Stop, mode, timeout_secs)
                .await;
        }
        JobMode::parse(mode, UnitOperation::Stop)?;
        BoundedWaitPolicy::from_secs(timeout_secs, self.poll_interval)?;
        let unit = validate_unit_name(unit)?;
        self.manager.kill_unit(unit, KILL_SIGNAL).await?;
        log::info!("sent signal {KILL_SIGNAL} to {unit}");
        Ok(JobResult::Completed(format!(
            "sent signal {KILL_SIGNAL} to {unit}"
        )))
    }

    /// Enables or disables unit files and returns the symlink changes.
    pub async fn change_unit_files(
        &self,
        operation: UnitOperation,
        files: &[String],
    ) -> Result<Vec<UnitFileChange>> {
        for file in files {
            validate_unit_name(file)?;
        }
        match operation {
            UnitOperation::Enable => self.manager.enable_unit_files(files, false, true).await,
            UnitOperation::Disable => self.manager.disable_unit_files(files, false).await,
            other => Err(UnitError::InvalidMode {
                operation: other.to_string(),
                mode: "unit-file".to_string(),
            }),
        }
    }

    /// The job currently held in the slot, if any. Never waits on the job itself.
    pub async fn in_flight(&self) -> Option<JobSummary> {
        self.slot.lock().await.as_ref().map(UnitJob::summary)
    }

    async fn poll_slot(slot: &mut Option<UnitJob>, policy: BoundedWaitPolicy) -> Result<JobResult> {
        let Some(job) = slot.as_mut() else {
            return Err(UnitError::NoJob);
        };

        let result = match job.done.try_recv() {
            Ok(message) => JobResult::Completed(message),
            Err(TryRecvError::Closed) => JobResult::Failed(job.lost_result()),
            Err(TryRecvError::Empty) => {
                match tokio::time::timeout(policy.poll_interval(), &mut job.done).await {
                    Ok(Ok(message)) => JobResult::Completed(message),
                    Ok(Err(_)) => JobResult::Failed(job.lost_result()),
                    Err(_) => {
                        log::debug!(
                            "{} of {} (job {}) still running after {:?}",
                            job.operation,
                            job.unit,
                            job.id,
                            job.issued_at.elapsed()
                        );
                        job.state = JobResult::InProgress;
                        return Ok(JobResult::InProgress);
                    }
                }
            }
        };

        if let Some(job) = slot.take() {
            log::info!(
                "{} of {} (job {}) finished after {:?}: {}",
                job.operation,
                job.unit,
                job.id,
                job.issued_at.elapsed(),
                result.message()
            );
        }
        Ok(result)
    }
}

/// Human readable summary of a unit file change set.
pub fn describe_changes(files: &[String], changes: &[UnitFileChange]) -> String {
    if changes.is_empty() {
        return format!("nothing changed for {}", files.join(" "));
    }
    changes
        .iter()
        .map(|change| {
            if change.destination.is_empty() {
                format!("{} {}", change.change_type, change.filename)
            } else {
                format!(
                    "{} {} -> {}",
                    change.change_type, change.filename, change.destination
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{JobOutcome, MemoryServiceManager};
    use crate::types::UnitStatus;
    use pretty_assertions::assert_eq;

    const POLL: Duration = Duration::from_millis(100);

    fn bridge(manager: &Arc<MemoryServiceManager>) -> JobBridge {
        JobBridge::new(manager.clone()).with_poll_interval(POLL)
    }

    fn manager(outcome: JobOutcome) -> Arc<MemoryServiceManager> {
        Arc::new(
            MemoryServiceManager::new()
                .with_unit(UnitStatus::new("nginx.service", "active", "running"))
                .with_job_outcome(outcome),
        )
    }

    #[tokio::test]
    async fn unknown_mode_never_reaches_the_manager() {
        let manager = manager(JobOutcome::Immediate("done".to_string()));
        let bridge = bridge(&manager);

        for operation in [
            UnitOperation::Start,
            UnitOperation::Stop,
            UnitOperation::Restart,
            UnitOperation::ReloadOrRestart,
            UnitOperation::Enable,
        ] {
            let err = bridge
                .issue("nginx.service", operation, "sideways", Some(5))
                .await
                .unwrap_err();
            assert!(err.is_validation(), "{operation}: {err}");
        }
        let err = bridge
            .stop("nginx.service", "sideways", Some(5), true)
            .await
            .unwrap_err();
        assert!(err.is_validation());
        assert_eq!(manager.call_count(), 0);
    }

    #[tokio::test]
    async fn timeout_over_cap_is_rejected() {
        let manager = manager(JobOutcome::Immediate("done".to_string()));
        let bridge = bridge(&manager);

        let err = bridge
            .issue("nginx.service", UnitOperation::Restart, "", Some(61))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            UnitError::TimeoutOverCap {
                requested: 61,
                cap: 60
            }
        ));
        let err = bridge.wait_for_completion(Some(600)).await.unwrap_err();
        assert!(err.is_validation());
        assert_eq!(manager.call_count(), 0);
    }

    #[tokio::test]
    async fn completion_before_the_poll_is_returned_immediately() {
        let manager = manager(JobOutcome::Immediate("done".to_string()));
        let bridge = JobBridge::new(manager.clone()).with_poll_interval(Duration::from_secs(30));

        let started = Instant::now();
        let result = bridge
            .issue("nginx.service", UnitOperation::Start, "", None)
            .await
            .unwrap();
        assert_eq!(result, JobResult::Completed("done".to_string()));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(manager.calls(), vec!["start nginx.service replace"]);
        assert!(bridge.in_flight().await.is_none());
    }

    #[tokio::test]
    async fn completion_inside_the_poll_window_is_returned() {
        let manager = manager(JobOutcome::Delayed(
            "done".to_string(),
            Duration::from_millis(20),
        ));
        let bridge = JobBridge::new(manager.clone()).with_poll_interval(Duration::from_secs(5));

        let result = bridge
            .issue("nginx.service", UnitOperation::Restart, "fail", Some(10))
            .await
            .unwrap();
        assert_eq!(result, JobResult::Completed("done".to_string()));
        assert_eq!(manager.calls(), vec!["restart nginx.service fail"]);
    }

    #[tokio::test]
    async fn late_completion_is_seen_by_a_later_check() {
        let manager = manager(JobOutcome::Held);
        let bridge = bridge(&manager);

        let first = bridge
            .issue("nginx.service", UnitOperation::ReloadOrRestart, "", Some(30))
            .await
            .unwrap();
        assert_eq!(first, JobResult::InProgress);
        assert_eq!(first.message(), IN_PROGRESS_MESSAGE);

        let summary = bridge.in_flight().await.unwrap();
        assert_eq!(summary.unit, "nginx.service");
        assert_eq!(summary.state, JobResult::InProgress);

        assert_eq!(
            bridge.wait_for_completion(Some(30)).await.unwrap(),
            JobResult::InProgress
        );

        assert!(manager.release_held("canceled"));
        assert_eq!(
            bridge.wait_for_completion(Some(30)).await.unwrap(),
            JobResult::Completed("canceled".to_string())
        );
        assert!(bridge.in_flight().await.is_none());
    }

    #[tokio::test]
    async fn second_job_while_first_runs_is_rejected() {
        let manager = manager(JobOutcome::Held);
        let bridge = bridge(&manager);

        bridge
            .issue("nginx.service", UnitOperation::Start, "", None)
            .await
            .unwrap();
        let err = bridge
            .issue("nginx.service", UnitOperation::Stop, "", None)
            .await
            .unwrap_err();
        assert!(matches!(err, UnitError::JobInFlight { job_id: 1, .. }));
        assert_eq!(err.code(), "job_in_flight");
        assert_eq!(manager.calls(), vec!["start nginx.service replace"]);
    }

    #[tokio::test]
    async fn finished_but_unread_job_does_not_block_the_next_one() {
        let manager = manager(JobOutcome::Held);
        let bridge = bridge(&manager);

        bridge
            .issue("nginx.service", UnitOperation::Start, "", None)
            .await
            .unwrap();
        manager.release_held("done");
        manager.set_job_outcome(JobOutcome::Immediate("done".to_string()));

        let result = bridge
            .issue("nginx.service", UnitOperation::Stop, "", None)
            .await
            .unwrap();
        assert_eq!(result, JobResult::Completed("done".to_string()));
    }

    #[tokio::test]
    async fn failed_reissue_after_unread_result_leaves_no_stale_job() {
        let manager = manager(JobOutcome::Held);
        let bridge = bridge(&manager);

        bridge
            .issue("nginx.service", UnitOperation::Start, "", None)
            .await
            .unwrap();
        assert!(manager.release_held("done"));
        manager.set_job_outcome(JobOutcome::TransportError("bus gone".to_string()));

        let err = bridge
            .issue("nginx.service", UnitOperation::Stop, "", None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "transport");

        assert!(bridge.in_flight().await.is_none());
        let err = bridge.wait_for_completion(None).await.unwrap_err();
        assert!(matches!(err, UnitError::NoJob));
    }

    #[tokio::test]
    async fn check_without_a_job_reports_no_job() {
        let manager = manager(JobOutcome::Immediate("done".to_string()));
        let bridge = bridge(&manager);
        let err = bridge.wait_for_completion(None).await.unwrap_err();
        assert!(matches!(err, UnitError::NoJob));
    }

    #[tokio::test]
    async fn dropped_completion_slot_is_a_failure() {
        let manager = manager(JobOutcome::Dropped);
        let bridge = bridge(&manager);
        let result = bridge
            .issue("nginx.service", UnitOperation::Start, "", None)
            .await
            .unwrap();
        assert!(matches!(result, JobResult::Failed(ref msg) if msg.contains("without reporting")));
    }

    #[tokio::test]
    async fn transport_errors_propagate_from_issue() {
        let manager = manager(JobOutcome::TransportError("bus unavailable".to_string()));
        let bridge = bridge(&manager);
        let err = bridge
            .issue("nginx.service", UnitOperation::Start, "", None)
            .await
            .unwrap_err();
        assert_eq!(err.code(), "transport");
        assert_eq!(err.to_string(), "bus unavailable");
        assert!(bridge.in_flight().await.is_none());
    }

    #[tokio::test]
    async fn kill_does_not_wait_on_a_running_job() {
        let manager = manager(JobOutcome::Held);
        let bridge = JobBridge::new(manager.clone()).with_poll_interval(Duration::from_secs(30));

        let bridge = Arc::new(bridge);
        let waiting = {
            let bridge = bridge.clone();
            tokio::spawn(async move {
                bridge
                    .issue("nginx.service", UnitOperation::Stop, "", None)
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;

        let started = Instant::now();
        let result = bridge
            .stop("nginx.service", "", None, true)
            .await
            .unwrap();
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(
            result,
            JobResult::Completed("sent signal 9 to nginx.service".to_string())
        );
        assert!(manager
            .calls()
            .contains(&"kill nginx.service 9".to_string()));

        manager.release_held("done");
        let stopped = waiting.await.unwrap().unwrap();
        assert_eq!(stopped, JobResult::Completed("done".to_string()));
    }

    #[tokio::test]
    async fn enable_reports_changes_and_noop() {
        let manager = manager(JobOutcome::Immediate("done".to_string()));
        manager.set_unit_file_changes(vec![UnitFileChange::symlink(
            "/etc/systemd/system/multi-user.target.wants/nginx.service",
            "/usr/lib/systemd/system/nginx.service",
        )]);
        let bridge = bridge(&manager);

        let result = bridge
            .issue("nginx.service", UnitOperation::Enable, "", None)
            .await
            .unwrap();
        assert_eq!(
            result,
            JobResult::Completed(
                "symlink /etc/systemd/system/multi-user.target.wants/nginx.service -> /usr/lib/systemd/system/nginx.service"
                    .to_string()
            )
        );

        manager.set_unit_file_changes(Vec::new());
        let result = bridge
            .issue("nginx.service", UnitOperation::Disable, "", None)
            .await
            .unwrap();
        assert_eq!(
            result,
            JobResult::Completed("nothing changed for nginx.service".to_string())
        );
        assert_eq!(
            manager.calls(),
            vec![
                "enable nginx.service runtime=false force=true",
                "disable nginx.service runtime=false"
            ]
        );
    }

    #[test]
    fn wait_policy_defaults_and_caps() {
        let policy = BoundedWaitPolicy::from_secs(None, DEFAULT_POLL_INTERVAL).unwrap();
        assert_eq!(policy.timeout(), Duration::from_secs(60));
        assert_eq!(policy.poll_interval(), Duration::from_secs(3));
        assert!(BoundedWaitPolicy::from_secs(Some(60), DEFAULT_POLL_INTERVAL).is_ok());
        assert!(BoundedWaitPolicy::from_secs(Some(61), DEFAULT_POLL_INTERVAL).is_err());
    }

    #[test]
    fn job_result_serializes_with_status_tag() {
        assert_eq!(
            serde_json::to_value(JobResult::Completed("done".into())).unwrap(),
            serde_json::json!({"status": "completed", "message": "done"})
        );
        assert_eq!(
            serde_json::to_value(JobResult::InProgress).unwrap(),
            serde_json::json!({"status": "in_progress"})
        );
    }
}
