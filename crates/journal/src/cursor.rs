use crate::error::{LogError, Result};
use serde_json::{Map, Value};
use std::fmt;

/// One journal record as delivered by the store: field name to JSON value.
pub type RawEntry = Map<String, Value>;

/// Field equality predicate applied to a cursor (`FIELD=value`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMatch {
    field: String,
    value: String,
}

impl FieldMatch {
    /// Journal field names are upper-case ASCII letters, digits and underscores.
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let field = field.into();
        let valid = !field.is_empty()
            && field
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit() || b == b'_')
            && !field.as_bytes()[0].is_ascii_digit();
        if !valid {
            return Err(LogError::InvalidField(field));
        }
        Ok(Self {
            field,
            value: value.into(),
        })
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn matches(&self, entry: &RawEntry) -> bool {
        entry
            .get(&self.field)
            .and_then(Value::as_str)
            .is_some_and(|v| v == self.value)
    }
}

impl fmt::Display for FieldMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.field, self.value)
    }
}

/// Seekable view over the host log store.
///
/// Mirrors the journal cursor model: `seek_tail` positions after the newest entry,
/// `step_back(n)` moves onto the n-th newest entry of the current match set and reports how
/// many entries it actually moved, `next` advances towards the tail and returns `false` once
/// the cursor is on the last entry.
///
/// Implementations block; callers run them on a blocking worker.
pub trait LogCursor: Send {
    fn seek_tail(&mut self) -> Result<()>;
    fn step_back(&mut self, count: u64) -> Result<u64>;
    fn add_match(&mut self, filter: &FieldMatch) -> Result<()>;
    fn clear_matches(&mut self) -> Result<()>;
    fn next(&mut self) -> Result<bool>;
    fn current_entry(&mut self) -> Result<RawEntry>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_names_are_validated() {
        assert!(FieldMatch::new("SYSLOG_IDENTIFIER", "sshd").is_ok());
        assert!(FieldMatch::new("_SYSTEMD_USER_UNIT", "pipewire.service").is_ok());
        for bad in ["", "message", "MESSAGE=x", "1FIELD", "FIELD NAME"] {
            assert!(
                matches!(FieldMatch::new(bad, "x"), Err(LogError::InvalidField(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn display_is_journalctl_argument() -> Result<()> {
        let filter = FieldMatch::new("_SYSTEMD_UNIT", "nginx.service")?;
        assert_eq!(filter.to_string(), "_SYSTEMD_UNIT=nginx.service");
        Ok(())
    }

    #[test]
    fn matches_compares_string_values_only() -> Result<()> {
        let filter = FieldMatch::new("SYSLOG_IDENTIFIER", "cron")?;
        let hit = json!({"SYSLOG_IDENTIFIER": "cron"});
        let miss = json!({"SYSLOG_IDENTIFIER": [99, 114, 111, 110]});
        assert!(filter.matches(hit.as_object().unwrap_or(&Map::new())));
        assert!(!filter.matches(miss.as_object().unwrap_or(&Map::new())));
        Ok(())
    }
}
