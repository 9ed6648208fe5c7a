use crate::error::{Result, UnitError};
use crate::manager::{CompletionSender, ServiceManager};
use crate::properties::parse_show_output;
use crate::types::{JobId, JobMode, UnitFile, UnitFileChange, UnitStatus};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::process::Command;

/// Which service manager instance to talk to.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagerScope {
    #[default]
    System,
    User,
}

impl ManagerScope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "system" => Some(Self::System),
            "user" => Some(Self::User),
            _ => None,
        }
    }
}

/// [`ServiceManager`] backed by the `systemctl` command.
///
/// Lifecycle verbs run `systemctl` without `--no-block`, so the child exits when the job has
/// finished; a background task turns that exit into the job's completion message.
pub struct SystemctlManager {
    scope: ManagerScope,
    program: PathBuf,
    next_job: AtomicU32,
}

impl SystemctlManager {
    pub fn new(scope: ManagerScope) -> Self {
        Self {
            scope,
            program: PathBuf::from("systemctl"),
            next_job: AtomicU32::new(0),
        }
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn scope(&self) -> ManagerScope {
        self.scope
    }

    fn command<I, S>(&self, args: I) -> Command
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let mut cmd = Command::new(&self.program);
        if self.scope == ManagerScope::User {
            cmd.arg("--user");
        }
        cmd.arg("--no-pager");
        cmd.args(args);
        cmd.stdin(Stdio::null());
        cmd
    }

    async fn run(&self, args: Vec<String>) -> Result<String> {
        let verb = args.first().cloned().unwrap_or_default();
        let output = self.command(&args).output().await.map_err(|err| {
            UnitError::Transport(format!(
                "failed to run {} {verb}: {err}",
                self.program.display()
            ))
        })?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(UnitError::Transport(format!(
                "systemctl {verb} exited with {}: {}",
                output
                    .status
                    .code()
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| "signal".to_string()),
                stderr.trim()
            )));
        }
        Ok(stdout)
    }

    /// Spawns the lifecycle command and hands its eventual outcome to `done`.
    async fn enqueue(
        &self,
        verb: &str,
        name: &str,
        mode: JobMode,
        done: CompletionSender,
    ) -> Result<JobId> {
        let mut cmd = self.command([
            verb.to_string(),
            format!("--job-mode={}", mode.as_str()),
            "--".to_string(),
            name.to_string(),
        ]);
        cmd.stdout(Stdio::null()).stderr(Stdio::piped());
        let child = cmd.spawn().map_err(|err| {
            UnitError::Transport(format!(
                "failed to run {} {verb}: {err}",
                self.program.display()
            ))
        })?;
        let id = self.next_job.fetch_add(1, Ordering::Relaxed) + 1;

        tokio::spawn(async move {
            let message = match child.wait_with_output().await {
                Ok(output) if output.status.success() => "done".to_string(),
                Ok(output) => job_failure_message(&String::from_utf8_lossy(&output.stderr)),
                Err(err) => format!("failed: {err}"),
            };
            if done.send(message).is_err() {
                log::debug!("job {id} finished but nobody is waiting for it");
            }
        });
        Ok(id)
    }
}

#[derive(Debug, Deserialize)]
struct ListUnitsRow {
    unit: String,
    #[serde(default)]
    load: String,
    #[serde(default)]
    active: String,
    #[serde(default)]
    sub: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ListUnitFilesRow {
    unit_file: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    preset: Option<String>,
}

fn parse_list_units(text: &str) -> Result<Vec<UnitStatus>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let rows: Vec<ListUnitsRow> = serde_json::from_str(text)?;
    Ok(rows
        .into_iter()
        .map(|row| UnitStatus {
            name: row.unit,
            description: row.description,
            load_state: row.load,
            active_state: row.active,
            sub_state: row.sub,
            followed: String::new(),
        })
        .collect())
}

fn parse_list_unit_files(text: &str) -> Result<Vec<UnitFile>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let rows: Vec<ListUnitFilesRow> = serde_json::from_str(text)?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let mut file = UnitFile::from_path(&row.unit_file, &row.state);
            file.preset = row.preset.filter(|p| !p.is_empty() && p != "-");
            file
        })
        .collect())
}

/// Parses the `Created symlink A → B.` / `Removed "A".` lines printed by enable/disable.
fn parse_unit_file_changes(text: &str) -> Vec<UnitFileChange> {
    let mut changes = Vec::new();
    for line in text.lines() {
        let line = line.trim().trim_end_matches('.');
        if let Some(rest) = line.strip_prefix("Created symlink ") {
            let split = rest
                .split_once(" → ")
                .or_else(|| rest.split_once(" -> "));
            if let Some((from, to)) = split {
                changes.push(UnitFileChange::symlink(unquote(from), unquote(to)));
            }
        } else if let Some(rest) = line.strip_prefix("Removed ") {
            changes.push(UnitFileChange::unlink(unquote(rest)));
        }
    }
    changes
}

fn unquote(raw: &str) -> &str {
    raw.trim()
        .trim_matches(|c| c == '"' || c == '\'' || c == '`')
        .trim()
}

fn job_failure_message(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        "failed".to_string()
    } else {
        format!("failed: {stderr}")
    }
}

#[async_trait]
impl ServiceManager for SystemctlManager {
    async fn list_units(&self, states: Option<&[String]>) -> Result<Vec<UnitStatus>> {
        let mut args = vec![
            "list-units".to_string(),
            "--all".to_string(),
            "--output=json".to_string(),
        ];
        if let Some(states) = states.filter(|s| !s.is_empty()) {
            args.push(format!("--state={}", states.join(",")));
        }
        parse_list_units(&self.run(args).await?)
    }

    async fn list_units_by_patterns(
        &self,
        states: &[String],
        patterns: &[String],
    ) -> Result<Vec<UnitStatus>> {
        let mut args = vec![
            "list-units".to_string(),
            "--all".to_string(),
            "--output=json".to_string(),
        ];
        if !states.is_empty() {
            args.push(format!("--state={}", states.join(",")));
        }
        args.push("--".to_string());
        args.extend(patterns.iter().cloned());
        parse_list_units(&self.run(args).await?)
    }

    async fn get_properties(&self, unit: &str) -> Result<Map<String, Value>> {
        let text = self
            .run(vec!["show".to_string(), "--".to_string(), unit.to_string()])
            .await?;
        Ok(parse_show_output(&text))
    }

    async fn start_unit(
        &self,
        name: &str,
        mode: JobMode,
        done: CompletionSender,
    ) -> Result<JobId> {
        self.enqueue("start", name, mode, done).await
    }

    async fn stop_unit(&self, name: &str, mode: JobMode, done: CompletionSender) -> Result<JobId> {
        self.enqueue("stop", name, mode, done).await
    }

    async fn restart_unit(
        &self,
        name: &str,
        mode: JobMode,
        done: CompletionSender,
    ) -> Result<JobId> {
        self.enqueue("restart", name, mode, done).await
    }

    async fn reload_or_restart_unit(
        &self,
        name: &str,
        mode: JobMode,
        done: CompletionSender,
    ) -> Result<JobId> {
        self.enqueue("reload-or-restart", name, mode, done).await
    }

    async fn kill_unit(&self, name: &str, signal: i32) -> Result<()> {
        self.run(vec![
            "kill".to_string(),
            format!("--signal={signal}"),
            "--".to_string(),
            name.to_string(),
        ])
        .await
        .map(|_| ())
    }

    async fn enable_unit_files(
        &self,
        files: &[String],
        runtime: bool,
        force: bool,
    ) -> Result<Vec<UnitFileChange>> {
        let mut args = vec!["enable".to_string()];
        if runtime {
            args.push("--runtime".to_string());
        }
        if force {
            args.push("--force".to_string());
        }
        args.push("--".to_string());
        args.extend(files.iter().cloned());
        let output = self.command(&args).output().await?;
        let text = format!(
            "{}\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        if !output.status.success() {
            return Err(UnitError::Transport(format!(
                "error when enabling: {}",
                text.trim()
            )));
        }
        Ok(parse_unit_file_changes(&text))
    }

    async fn disable_unit_files(
        &self,
        files: &[String],
        runtime: bool,
    ) -> Result<Vec<UnitFileChange>> {
        let mut args = vec!["disable".to_string()];
        if runtime {
            args.push("--runtime".to_string());
        }
        args.push("--".to_string());
        args.extend(files.iter().cloned());
        let output = self.command(&args).output().await?;
        let text = format!(
            "{}\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        if !output.status.success() {
            return Err(UnitError::Transport(format!(
                "error when disabling: {}",
                text.trim()
            )));
        }
        Ok(parse_unit_file_changes(&text))
    }

    async fn list_unit_files(&self) -> Result<Vec<UnitFile>> {
        let text = self
            .run(vec!["list-unit-files".to_string(), "--output=json".to_string()])
            .await?;
        parse_list_unit_files(&text)
    }
}
