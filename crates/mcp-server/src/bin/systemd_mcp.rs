use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    systemd_mcp::main_entry().await
}
