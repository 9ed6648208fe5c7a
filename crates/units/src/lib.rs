//! # systemd-mcp units
//!
//! Unit queries and lifecycle jobs against the host service manager.
//!
//! ```text
//! caller ──> JobBridge ──issue──> ServiceManager (systemctl / memory)
//!               │                       │
//!               └──── completion slot <─┘  (one message per queued job)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use systemd_mcp_units::{JobBridge, ManagerScope, SystemctlManager, UnitOperation};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let bridge = JobBridge::new(Arc::new(SystemctlManager::new(ManagerScope::System)));
//!     let result = bridge
//!         .issue("nginx.service", UnitOperation::Restart, "replace", Some(30))
//!         .await?;
//!     println!("{}", result.message());
//!     Ok(())
//! }
//! ```

mod error;
mod job_bridge;
mod manager;
pub mod memory;
mod properties;
mod systemctl;
mod types;

pub use error::{Result, UnitError};
pub use job_bridge::{
    describe_changes, BoundedWaitPolicy, JobBridge, JobResult, JobSummary, UnitJob,
    DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT_SECS, IN_PROGRESS_MESSAGE, KILL_SIGNAL,
    MAX_TIMEOUT_SECS,
};
pub use manager::{observed_states, CompletionReceiver, CompletionSender, ServiceManager};
pub use properties::{parse_show_output, prune_empty};
pub use systemctl::{ManagerScope, SystemctlManager};
pub use types::{
    validate_state, validate_unit_name, JobId, JobMode, UnitFile, UnitFileChange,
    UnitOperation, UnitStatus, DEFAULT_STATE, VALID_STATES,
};
