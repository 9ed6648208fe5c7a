//! systemd MCP Server
//!
//! Exposes systemd units, lifecycle jobs and the journal to AI agents via MCP over stdio.
//!
//! ## Tools
//!
//! - `list_systemd_units_by_state` / `list_systemd_units_by_name` / `list_systemd_unit_states`
//! - `start_unit`, `stop_unit`, `restart_reload_unit`, `check_restart_reload`
//! - `enable_or_disable_unit`, `list_unit_files`
//! - `list_log` - newest journal entries, optionally for one unit
//! - `capabilities`
//!
//! ## Usage
//!
//! Add to your MCP client configuration:
//! ```json
//! {
//!   "mcpServers": {
//!     "systemd": {
//!       "command": "systemd-mcp"
//!     }
//!   }
//! }
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use rmcp::transport::stdio;
use rmcp::ServiceExt;

pub mod cli;
pub mod config;
mod tools;

pub use config::ServerConfig;
pub use tools::SystemdService;

pub async fn main_entry() -> Result<()> {
    let cli = cli::Cli::parse();
    cli.init_logging();

    let mut config =
        ServerConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    cli.apply(&mut config);

    log::info!(
        "Starting systemd MCP server ({} manager, poll {} ms, log deadline {} ms)",
        config.scope.as_str(),
        config.poll_interval_ms,
        config.log_deadline_ms
    );

    let service = SystemdService::from_config(&config);
    let server = service.serve(stdio()).await?;

    // Wait for shutdown
    server.waiting().await?;

    log::info!("systemd MCP server stopped");
    Ok(())
}
