use crate::cursor::{FieldMatch, LogCursor, RawEntry};
use crate::error::{LogError, Result};
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// [`LogCursor`] backed by `journalctl -o json`.
///
/// `step_back(n)` loads the newest `n` entries of the current match set in one call; the
/// cursor then walks that window forward.
pub struct JournalctlCursor {
    program: PathBuf,
    directory: Option<PathBuf>,
    matches: Vec<FieldMatch>,
    window: Vec<RawEntry>,
    position: usize,
}

impl Default for JournalctlCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl JournalctlCursor {
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("journalctl"),
            directory: None,
            matches: Vec::new(),
            window: Vec::new(),
            position: 0,
        }
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Read journal files from `directory` (`-D`) instead of the system journal.
    pub fn with_directory(mut self, directory: Option<PathBuf>) -> Self {
        self.directory = directory;
        self
    }

    fn args(&self, count: u64) -> Vec<String> {
        let mut args = vec![
            "--no-pager".to_string(),
            "-q".to_string(),
            "-o".to_string(),
            "json".to_string(),
            "-n".to_string(),
            count.to_string(),
        ];
        if let Some(dir) = &self.directory {
            args.push("-D".to_string());
            args.push(dir.display().to_string());
        }
        args.extend(self.matches.iter().map(FieldMatch::to_string));
        args
    }

    fn load(&self, count: u64) -> Result<Vec<RawEntry>> {
        let args = self.args(count);
        log::debug!("{} {}", self.program.display(), args.join(" "));
        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .map_err(|err| {
                LogError::StepBack(format!("failed to run {}: {err}", self.program.display()))
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(LogError::StepBack(format!(
                "journalctl exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }
        parse_json_lines(&String::from_utf8_lossy(&output.stdout))
    }
}

/// One JSON object per line; blank lines are skipped.
pub fn parse_json_lines(text: &str) -> Result<Vec<RawEntry>> {
    let mut entries = Vec::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        entries.push(serde_json::from_str::<RawEntry>(line)?);
    }
    Ok(entries)
}

impl LogCursor for JournalctlCursor {
    fn seek_tail(&mut self) -> Result<()> {
        self.window.clear();
        self.position = 0;
        Ok(())
    }

    fn step_back(&mut self, count: u64) -> Result<u64> {
        if count == 0 {
            return Ok(0);
        }
        self.window = self.load(count)?;
        // The store may have grown past `count` between calls; keep the newest.
        let excess = self.window.len().saturating_sub(count as usize);
        self.window.drain(..excess);
        self.position = 0;
        Ok(self.window.len() as u64)
    }

    fn add_match(&mut self, filter: &FieldMatch) -> Result<()> {
        self.matches.push(filter.clone());
        Ok(())
    }

    fn clear_matches(&mut self) -> Result<()> {
        self.matches.clear();
        Ok(())
    }

    fn next(&mut self) -> Result<bool> {
        if self.position + 1 < self.window.len() {
            self.position += 1;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn current_entry(&mut self) -> Result<RawEntry> {
        self.window
            .get(self.position)
            .cloned()
            .ok_or_else(|| LogError::Entry("no entry at cursor position".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn args_carry_directory_and_matches() -> Result<()> {
        let mut cursor = JournalctlCursor::new().with_directory(Some(PathBuf::from("/var/log/j")));
        cursor.add_match(&FieldMatch::new("SYSLOG_IDENTIFIER", "sshd")?)?;
        assert_eq!(
            cursor.args(5),
            vec![
                "--no-pager",
                "-q",
                "-o",
                "json",
                "-n",
                "5",
                "-D",
                "/var/log/j",
                "SYSLOG_IDENTIFIER=sshd"
            ]
        );
        cursor.clear_matches()?;
        assert_eq!(cursor.args(1).last().map(String::as_str), Some("1"));
        Ok(())
    }

    #[test]
    fn parses_json_lines() -> Result<()> {
        let text = concat!(
            "{\"MESSAGE\":\"a\",\"__REALTIME_TIMESTAMP\":\"1\"}\n",
            "\n",
            "{\"MESSAGE\":[104,105]}\n"
        );
        let entries = parse_json_lines(text)?;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["MESSAGE"], "a");
        Ok(())
    }

    #[test]
    fn malformed_line_is_an_error() {
        assert!(matches!(
            parse_json_lines("not json"),
            Err(LogError::SerializationError(_))
        ));
    }

    #[test]
    fn missing_program_is_a_step_back_error() {
        let mut cursor = JournalctlCursor::new().with_program("/nonexistent/journalctl");
        let err = cursor.step_back(3).unwrap_err();
        assert!(matches!(err, LogError::StepBack(_)), "{err}");
        assert_eq!(err.code(), "transport");
    }

    #[test]
    fn zero_step_does_not_run_journalctl() -> Result<()> {
        let mut cursor = JournalctlCursor::new().with_program("/nonexistent/journalctl");
        cursor.seek_tail()?;
        assert_eq!(cursor.step_back(0)?, 0);
        assert!(cursor.current_entry().is_err());
        Ok(())
    }
}
