//! `jira`: Jira issues, search, workflow and sprints from the terminal

use clap::Parser;
use jira_cli::cli::{self, Cli};
use jira_cli::config::JiraConfig;
use jira_cli::logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    // Configuration is loaded first so its log level applies
    let config = JiraConfig::load();
    logging::init(
        cli.verbose,
        config.as_ref().ok().and_then(|c| c.log_level.as_deref()),
    );

    let status = cli::run(cli, config).await;
    std::process::exit(status);
}
