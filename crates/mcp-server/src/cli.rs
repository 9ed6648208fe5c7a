use crate::config::ServerConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use systemd_mcp_journal::UnmatchedUnitPolicy;
use systemd_mcp_units::ManagerScope;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum UnmatchedUnitArg {
    FallbackToAll,
    NotFound,
}

impl From<UnmatchedUnitArg> for UnmatchedUnitPolicy {
    fn from(arg: UnmatchedUnitArg) -> Self {
        match arg {
            UnmatchedUnitArg::FallbackToAll => Self::FallbackToAll,
            UnmatchedUnitArg::NotFound => Self::NotFound,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "systemd-mcp")]
#[command(about = "MCP server for systemd units and the journal (stdio)", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode: log only errors
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// TOML config file (overrides SYSTEMD_MCP_CONFIG)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Talk to the per-user service manager
    #[arg(long)]
    pub user: bool,

    /// How long a lifecycle call waits for its job before reporting "in progress"
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Hard deadline for one log query
    #[arg(long)]
    pub log_deadline_ms: Option<u64>,

    /// Behaviour of list_log when a unit matches no entries
    #[arg(long, value_enum)]
    pub unmatched_unit: Option<UnmatchedUnitArg>,

    /// systemctl executable
    #[arg(long)]
    pub systemctl: Option<PathBuf>,

    /// journalctl executable
    #[arg(long)]
    pub journalctl: Option<PathBuf>,

    /// Read the journal from this directory instead of the system journal
    #[arg(long)]
    pub journal_directory: Option<PathBuf>,
}

impl Cli {
    pub fn init_logging(&self) {
        let mut builder =
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
        if self.quiet {
            builder.filter_level(log::LevelFilter::Error);
        } else if self.verbose {
            builder.filter_level(log::LevelFilter::Debug);
        }
        // stdout carries the MCP protocol
        builder.target(env_logger::Target::Stderr).init();
    }

    pub fn apply(&self, config: &mut ServerConfig) {
        if self.user {
            config.scope = ManagerScope::User;
        }
        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval_ms = ms;
        }
        if let Some(ms) = self.log_deadline_ms {
            config.log_deadline_ms = ms;
        }
        if let Some(policy) = self.unmatched_unit {
            config.unmatched_unit = policy.into();
        }
        if let Some(path) = &self.systemctl {
            config.systemctl = path.clone();
        }
        if let Some(path) = &self.journalctl {
            config.journalctl = path.clone();
        }
        if let Some(dir) = &self.journal_directory {
            config.journal_directory = Some(dir.clone());
        }
        config.finalize();
    }
}
