//! In-memory [`LogCursor`] over a fixed list of entries.

use crate::cursor::{FieldMatch, LogCursor, RawEntry};
use crate::error::{LogError, Result};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Shared record of cursor calls, readable after the cursor has been boxed away.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn push(&self, call: String) {
        self.0.lock().unwrap_or_else(|p| p.into_inner()).push(call);
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }
}

/// Entries are kept oldest first. Matches on one field are alternatives, matches on different
/// fields must all hold, as in the journal.
pub struct MemoryJournal {
    entries: Vec<RawEntry>,
    matches: Vec<FieldMatch>,
    view: Vec<usize>,
    position: usize,
    step_delay: Option<Duration>,
    calls: CallLog,
}

impl MemoryJournal {
    pub fn new(entries: Vec<RawEntry>) -> Self {
        Self {
            entries,
            matches: Vec::new(),
            view: Vec::new(),
            position: 0,
            step_delay: None,
            calls: CallLog::default(),
        }
    }

    /// Every `step_back` sleeps for `delay` first.
    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.step_delay = Some(delay);
        self
    }

    pub fn call_log(&self) -> CallLog {
        self.calls.clone()
    }

    fn admits(&self, entry: &RawEntry) -> bool {
        let mut fields: Vec<&str> = self.matches.iter().map(FieldMatch::field).collect();
        fields.dedup();
        fields.iter().all(|field| {
            self.matches
                .iter()
                .filter(|m| m.field() == *field)
                .any(|m| m.matches(entry))
        })
    }
}

impl LogCursor for MemoryJournal {
    fn seek_tail(&mut self) -> Result<()> {
        self.calls.push("seek_tail".to_string());
        self.view = (0..self.entries.len())
            .filter(|&idx| self.admits(&self.entries[idx]))
            .collect();
        self.position = self.view.len();
        Ok(())
    }

    fn step_back(&mut self, count: u64) -> Result<u64> {
        if let Some(delay) = self.step_delay {
            std::thread::sleep(delay);
        }
        let available = self.position as u64;
        let stepped = count.min(available);
        self.position -= stepped as usize;
        self.calls.push(format!("step_back {count} -> {stepped}"));
        Ok(stepped)
    }

    fn add_match(&mut self, filter: &FieldMatch) -> Result<()> {
        self.calls.push(format!("add_match {filter}"));
        self.matches.push(filter.clone());
        self.matches.sort_by(|a, b| a.field().cmp(b.field()));
        Ok(())
    }

    fn clear_matches(&mut self) -> Result<()> {
        self.calls.push("clear_matches".to_string());
        self.matches.clear();
        Ok(())
    }

    fn next(&mut self) -> Result<bool> {
        self.calls.push("next".to_string());
        if self.position + 1 < self.view.len() {
            self.position += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn current_entry(&mut self) -> Result<RawEntry> {
        self.calls.push("current_entry".to_string());
        self.view
            .get(self.position)
            .and_then(|&idx| self.entries.get(idx))
            .cloned()
            .ok_or_else(|| LogError::Entry("cursor is not positioned on an entry".to_string()))
    }
}
