use anyhow::{Context, Result};
use std::path::PathBuf;

pub fn locate_systemd_mcp_bin() -> Result<PathBuf> {
    if let Some(path) = option_env!("CARGO_BIN_EXE_systemd-mcp") {
        return Ok(PathBuf::from(path));
    }

    // `.../target/{debug|release}/deps/<test>` -> `.../target/{debug|release}/systemd-mcp`
    if let Ok(exe) = std::env::current_exe() {
        if let Some(target_profile_dir) = exe.parent().and_then(|p| p.parent()) {
            let candidate = target_profile_dir.join("systemd-mcp");
            if candidate.exists() {
                return Ok(candidate);
            }
        }
    }

    let manifest_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let repo_root = manifest_dir
        .ancestors()
        .nth(2)
        .context("failed to resolve repo root from CARGO_MANIFEST_DIR")?;
    for rel in ["target/debug/systemd-mcp", "target/release/systemd-mcp"] {
        let candidate = repo_root.join(rel);
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    anyhow::bail!("failed to locate systemd-mcp binary; build with: cargo build -p systemd-mcp")
}

/// Server command that never reaches a real service manager or journal.
pub fn offline_command() -> Result<tokio::process::Command> {
    let mut cmd = tokio::process::Command::new(locate_systemd_mcp_bin()?);
    cmd.args([
        "--systemctl",
        "/nonexistent/systemctl",
        "--journalctl",
        "/nonexistent/journalctl",
    ]);
    cmd.env("RUST_LOG", "warn");
    for var in [
        "SYSTEMD_MCP_CONFIG",
        "SYSTEMD_MCP_SCOPE",
        "SYSTEMD_MCP_POLL_INTERVAL_MS",
        "SYSTEMD_MCP_LOG_DEADLINE_MS",
        "SYSTEMD_MCP_UNMATCHED_UNIT",
    ] {
        cmd.env_remove(var);
    }
    Ok(cmd)
}
