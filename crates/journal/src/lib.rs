//! # systemd-mcp journal
//!
//! "Last N entries for unit X" against the host journal.
//!
//! A named unit is tried against each [`FilterStage`] in order (syslog identifier, then user
//! unit); the first stage with history wins. When none matches, [`UnmatchedUnitPolicy`]
//! decides between the unfiltered tail and a not-found error. The whole retrieval runs under
//! a hard deadline.
//!
//! ```no_run
//! use systemd_mcp_journal::{JournalctlCursor, LogQuery, LogRetriever};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let retriever = LogRetriever::new(Box::new(JournalctlCursor::new()));
//!     let log = retriever.retrieve(LogQuery::new(10, Some("sshd"))).await?;
//!     for entry in log.entries {
//!         println!("{} {} {}", entry.time, entry.unit, entry.message);
//!     }
//!     Ok(())
//! }
//! ```

mod cursor;
mod entry;
mod error;
mod journalctl;
pub mod memory;
mod retriever;

pub use cursor::{FieldMatch, LogCursor, RawEntry};
pub use entry::{
    LogEntry, HOSTNAME_FIELD, IDENTIFIER_FIELD, MESSAGE_FIELD, REALTIME_FIELD, SYSTEM_UNIT_FIELD,
    USER_UNIT_FIELD,
};
pub use error::{LogError, Result};
pub use journalctl::{parse_json_lines, JournalctlCursor};
pub use retriever::{
    collect_entries, default_stages, FilterStage, LogQuery, LogRetriever, RetrievedLog,
    UnmatchedUnitPolicy, DEFAULT_LOG_COUNT, DEFAULT_LOG_DEADLINE,
};
