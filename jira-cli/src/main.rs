//! `jira-mcp`: the Jira tools served over MCP (stdio)

use jira_cli::JiraCliServer;
use pulseengine_mcp_server::McpServerBuilder;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logging must stay off stdout, which carries the protocol
    JiraCliServer::configure_stdio_logging();

    info!("Starting Jira CLI MCP Server...");

    let jira_server = match JiraCliServer::new().await {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to create Jira CLI MCP Server: {}", e);
            eprintln!("❌ Failed to start Jira CLI MCP Server: {}", e);
            if let Some(hint) = e.hint() {
                eprintln!("   Hint: {}", hint);
            }
            std::process::exit(1);
        }
    };

    let mut server = jira_server.serve_stdio().await?;
    info!("🚀 Jira CLI MCP Server is running and ready to serve requests");

    server.run().await?;

    Ok(())
}
