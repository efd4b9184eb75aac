//! Jira CLI library
//!
//! Jira issue tracking for AI agents and terminal users. The same tools back
//! two front ends:
//!
//! - `jira`, a command line tool ([`cli`])
//! - `jira-mcp`, a Model Context Protocol server over stdio ([`JiraCliServer`])
//!
//! ## Features
//!
//! - **Bulk fetch**: many issues in one call, with found and missing
//!   identifiers reported side by side ([`bulk_fetch`])
//! - **Smart transitions**: reach a target state through intermediate
//!   transitions ([`workflow`])
//! - **Four output formats**: json, ai, markdown and rich ([`format`])
//! - **Error hints**: every failure carries a category and, where known, a remedy

use crate::config::JiraConfig;
use crate::error::{JiraCliError, JiraCliResult};
use crate::format::{render_error, OutputFormat};
use crate::jira_client::JiraClient;
use crate::tools::*;

use pulseengine_mcp_macros::{mcp_server, mcp_tools};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

pub mod bulk_fetch;
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod jira_client;
pub mod logging;
pub mod tools;
pub mod workflow;

/// Number of tools exposed by [`JiraCliServer`]
pub const TOOLS_COUNT: usize = 51;

/// Server status information
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JiraServerStatus {
    pub server_name: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub jira_url: String,
    pub deployment: String,
    pub jira_connection_status: String,
    pub authenticated_user: Option<String>,
    pub default_format: String,
    pub tools_count: usize,
}

/// Jira MCP server
///
/// Every tool takes an optional `format` (ai, json, markdown, rich) and
/// returns the rendered text.
#[mcp_server(
    name = "Jira CLI MCP Server",
    version = "0.1.0",
    description = "Jira issues, bulk fetch, search, workflow transitions, links, worklogs, projects and sprints",
    auth = "disabled"
)]
#[derive(Clone)]
pub struct JiraCliServer {
    start_time: Instant,
    jira_client: Arc<JiraClient>,
    config: Arc<JiraConfig>,
    default_format: OutputFormat,
}

impl Default for JiraCliServer {
    fn default() -> Self {
        panic!("JiraCliServer cannot be created with default(). Use JiraCliServer::new() instead.")
    }
}

impl JiraCliServer {
    /// Create a server from the environment and configuration files
    #[instrument]
    pub async fn new() -> JiraCliResult<Self> {
        info!("Initializing Jira CLI MCP Server");
        let config = JiraConfig::load().map_err(|e| JiraCliError::config(format!("{:#}", e)))?;
        info!("Configuration loaded successfully");
        Self::with_config(config).await
    }

    /// Create a server from an explicit configuration
    #[instrument(skip(config))]
    pub async fn with_config(config: JiraConfig) -> JiraCliResult<Self> {
        config
            .validate()
            .map_err(|e| JiraCliError::config(format!("{:#}", e)))?;
        let default_format: OutputFormat = config.default_format.parse()?;

        let config = Arc::new(config);
        let jira_client = Arc::new(JiraClient::new(Arc::clone(&config))?);

        // An unreachable instance at startup is not fatal; tools report it per call
        if let Err(e) = jira_client.test_connection().await {
            warn!("Jira connection test failed at startup: {}", e);
        }

        info!("Jira CLI MCP Server initialized successfully");
        Ok(Self {
            start_time: Instant::now(),
            jira_client,
            config,
            default_format,
        })
    }

    fn client(&self) -> Arc<JiraClient> {
        Arc::clone(&self.jira_client)
    }

    /// Run a tool and render its output in the requested format
    async fn respond<Fut>(
        &self,
        tool: &str,
        format: Option<&str>,
        call: Fut,
    ) -> anyhow::Result<String>
    where
        Fut: Future<Output = JiraCliResult<ToolOutput>>,
    {
        let format = OutputFormat::resolve(format, self.default_format).map_err(|e| {
            error!("{} failed: {}", tool, e);
            anyhow::anyhow!(render_error(&e, OutputFormat::Ai))
        })?;

        match call.await {
            Ok(output) => Ok(output.render(format)),
            Err(e) => {
                error!("{} failed: {}", tool, e);
                Err(anyhow::anyhow!(render_error(&e, plain(format))))
            }
        }
    }
}

/// Error text travels inside a protocol message, so no terminal colours
fn plain(format: OutputFormat) -> OutputFormat {
    match format {
        OutputFormat::Rich => OutputFormat::Markdown,
        other => other,
    }
}

/// All public methods in this impl block become MCP tools
#[mcp_tools]
impl JiraCliServer {
    /// Get one JIRA issue
    ///
    /// # Examples
    /// - `{"issue_key": "PROJ-123"}`
    /// - `{"issue_key": "PROJ-123", "fields": "summary,status", "format": "json"}`
    #[instrument(skip(self))]
    pub async fn get_issue(&self, params: GetIssueParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "get_issue",
            format.as_deref(),
            GetIssueTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Get an issue together with its most recent comments
    #[instrument(skip(self))]
    pub async fn show_issue(&self, params: ShowIssueParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "show_issue",
            format.as_deref(),
            ShowIssueTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Fetch many issues in one call
    ///
    /// Keys may be separated by commas and/or whitespace. Issues that exist
    /// are returned; keys that could not be fetched are listed as missing
    /// with the reason, and a warning summarizes them.
    ///
    /// # Examples
    /// - `{"issue_keys": "PROJ-1,PROJ-2,PROJ-3"}`
    #[instrument(skip(self))]
    pub async fn get_issues(&self, params: GetIssuesParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "get_issues",
            format.as_deref(),
            GetIssuesTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Create an issue
    ///
    /// # Examples
    /// - `{"project_key": "PROJ", "summary": "Fix login", "issue_type": "Bug"}`
    #[instrument(skip(self))]
    pub async fn create_issue(&self, params: CreateIssueParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "create_issue",
            format.as_deref(),
            CreateIssueTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Update fields of an issue
    #[instrument(skip(self))]
    pub async fn update_issue(&self, params: UpdateIssueParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "update_issue",
            format.as_deref(),
            UpdateIssueTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Delete an issue permanently
    #[instrument(skip(self))]
    pub async fn delete_issue(&self, params: DeleteIssueParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "delete_issue",
            format.as_deref(),
            DeleteIssueTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Search issues with JQL
    ///
    /// # Examples
    /// - `{"jql": "project = PROJ AND status = 'In Progress'", "max_results": 20}`
    #[instrument(skip(self))]
    pub async fn search_issues(&self, params: SearchIssuesParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "search_issues",
            format.as_deref(),
            SearchIssuesTool::new(self.client()).execute(params),
        )
        .await
    }

    /// List comments on an issue, newest first
    #[instrument(skip(self))]
    pub async fn list_comments(&self, params: ListCommentsParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "list_comments",
            format.as_deref(),
            ListCommentsTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Add a comment to an issue
    #[instrument(skip(self, params))]
    pub async fn add_comment(&self, params: AddCommentParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "add_comment",
            format.as_deref(),
            AddCommentTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Delete a comment
    #[instrument(skip(self))]
    pub async fn delete_comment(&self, params: DeleteCommentParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "delete_comment",
            format.as_deref(),
            DeleteCommentTool::new(self.client()).execute(params),
        )
        .await
    }

    /// List the transitions available from an issue's current state
    #[instrument(skip(self))]
    pub async fn list_transitions(
        &self,
        params: ListTransitionsParams,
    ) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "list_transitions",
            format.as_deref(),
            ListTransitionsTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Move an issue to a target state
    ///
    /// Takes intermediate transitions when the target is not directly
    /// reachable. With `dry_run` only the next transition is reported.
    ///
    /// # Examples
    /// - `{"issue_key": "PROJ-123", "target": "Done", "comment": true}`
    /// - `{"issue_key": "PROJ-123", "target": "In Review", "dry_run": true}`
    #[instrument(skip(self))]
    pub async fn transition_issue(
        &self,
        params: TransitionIssueParams,
    ) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "transition_issue",
            format.as_deref(),
            TransitionIssueTool::new(self.client()).execute(params),
        )
        .await
    }

    /// List worklogs of an issue
    #[instrument(skip(self))]
    pub async fn list_worklogs(&self, params: ListWorklogsParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "list_worklogs",
            format.as_deref(),
            ListWorklogsTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Log time on an issue
    ///
    /// # Examples
    /// - `{"issue_key": "PROJ-123", "time_spent": "1h 30m", "comment": "Review"}`
    #[instrument(skip(self))]
    pub async fn add_worklog(&self, params: AddWorklogParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "add_worklog",
            format.as_deref(),
            AddWorklogTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Get one worklog
    #[instrument(skip(self))]
    pub async fn get_worklog(&self, params: GetWorklogParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "get_worklog",
            format.as_deref(),
            GetWorklogTool::new(self.client()).execute(params),
        )
        .await
    }

    /// List attachments of an issue
    #[instrument(skip(self))]
    pub async fn list_attachments(
        &self,
        params: ListAttachmentsParams,
    ) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "list_attachments",
            format.as_deref(),
            ListAttachmentsTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Upload a local file to an issue
    #[instrument(skip(self))]
    pub async fn upload_attachment(
        &self,
        params: UploadAttachmentParams,
    ) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "upload_attachment",
            format.as_deref(),
            UploadAttachmentTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Delete an attachment
    #[instrument(skip(self))]
    pub async fn delete_attachment(
        &self,
        params: DeleteAttachmentParams,
    ) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "delete_attachment",
            format.as_deref(),
            DeleteAttachmentTool::new(self.client()).execute(params),
        )
        .await
    }

    /// List agile boards, optionally of one project
    #[instrument(skip(self))]
    pub async fn list_boards(&self, params: ListBoardsParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "list_boards",
            format.as_deref(),
            ListBoardsTool::new(self.client()).execute(params),
        )
        .await
    }

    /// List sprints of a board
    #[instrument(skip(self))]
    pub async fn list_sprints(&self, params: ListSprintsParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "list_sprints",
            format.as_deref(),
            ListSprintsTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Get one sprint
    #[instrument(skip(self))]
    pub async fn get_sprint(&self, params: GetSprintParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "get_sprint",
            format.as_deref(),
            GetSprintTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Get the active sprint of a project
    #[instrument(skip(self))]
    pub async fn get_active_sprint(&self, params: ActiveSprintParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "get_active_sprint",
            format.as_deref(),
            ActiveSprintTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Move issues into a sprint
    #[instrument(skip(self))]
    pub async fn move_to_sprint(&self, params: MoveToSprintParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "move_to_sprint",
            format.as_deref(),
            MoveToSprintTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Move issues to the backlog
    #[instrument(skip(self))]
    pub async fn move_to_backlog(&self, params: MoveToBacklogParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "move_to_backlog",
            format.as_deref(),
            MoveToBacklogTool::new(self.client()).execute(params),
        )
        .await
    }

    /// List the links of an issue (blocks, relates to, duplicates, ...)
    #[instrument(skip(self))]
    pub async fn list_links(&self, params: ListLinksParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "list_links",
            format.as_deref(),
            ListLinksTool::new(self.client()).execute(params),
        )
        .await
    }

    /// List the issue link types of the instance
    #[instrument(skip(self))]
    pub async fn list_link_types(&self, params: ListLinkTypesParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "list_link_types",
            format.as_deref(),
            ListLinkTypesTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Link two issues
    ///
    /// The from issue is the outward side: `Blocks` from PROJ-1 to PROJ-2
    /// reads "PROJ-1 blocks PROJ-2".
    ///
    /// # Examples
    /// - `{"from_issue_key": "PROJ-1", "to_issue_key": "PROJ-2", "link_type": "Blocks"}`
    #[instrument(skip(self))]
    pub async fn link_issues(&self, params: LinkIssuesParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "link_issues",
            format.as_deref(),
            LinkIssuesTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Delete an issue link
    #[instrument(skip(self))]
    pub async fn delete_link(&self, params: DeleteLinkParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "delete_link",
            format.as_deref(),
            DeleteLinkTool::new(self.client()).execute(params),
        )
        .await
    }

    /// List web links of an issue
    #[instrument(skip(self))]
    pub async fn list_web_links(&self, params: ListWebLinksParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "list_web_links",
            format.as_deref(),
            ListWebLinksTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Add a web link to an issue
    ///
    /// # Examples
    /// - `{"issue_key": "PROJ-123", "url": "https://ci.example.com/builds/7", "title": "Build 7"}`
    #[instrument(skip(self))]
    pub async fn add_web_link(&self, params: AddWebLinkParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "add_web_link",
            format.as_deref(),
            AddWebLinkTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Remove a web link from an issue
    #[instrument(skip(self))]
    pub async fn delete_web_link(&self, params: DeleteWebLinkParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "delete_web_link",
            format.as_deref(),
            DeleteWebLinkTool::new(self.client()).execute(params),
        )
        .await
    }

    /// List watchers of an issue
    #[instrument(skip(self))]
    pub async fn list_watchers(&self, params: ListWatchersParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "list_watchers",
            format.as_deref(),
            ListWatchersTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Add a watcher to an issue (username on Server, account ID on Cloud)
    #[instrument(skip(self))]
    pub async fn add_watcher(&self, params: WatcherParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "add_watcher",
            format.as_deref(),
            AddWatcherTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Remove a watcher from an issue
    #[instrument(skip(self))]
    pub async fn remove_watcher(&self, params: WatcherParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "remove_watcher",
            format.as_deref(),
            RemoveWatcherTool::new(self.client()).execute(params),
        )
        .await
    }

    /// List visible projects
    #[instrument(skip(self))]
    pub async fn list_projects(&self, params: ListProjectsParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "list_projects",
            format.as_deref(),
            ListProjectsTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Get one project
    #[instrument(skip(self))]
    pub async fn get_project(&self, params: ProjectParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "get_project",
            format.as_deref(),
            GetProjectTool::new(self.client()).execute(params),
        )
        .await
    }

    /// List components of a project
    #[instrument(skip(self))]
    pub async fn list_components(&self, params: ProjectParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "list_components",
            format.as_deref(),
            ListComponentsTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Get one component
    #[instrument(skip(self))]
    pub async fn get_component(&self, params: ComponentParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "get_component",
            format.as_deref(),
            GetComponentTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Create a component in a project
    #[instrument(skip(self))]
    pub async fn create_component(&self, params: CreateComponentParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "create_component",
            format.as_deref(),
            CreateComponentTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Delete a component
    #[instrument(skip(self))]
    pub async fn delete_component(&self, params: ComponentParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "delete_component",
            format.as_deref(),
            DeleteComponentTool::new(self.client()).execute(params),
        )
        .await
    }

    /// List versions of a project
    #[instrument(skip(self))]
    pub async fn list_versions(&self, params: ProjectParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "list_versions",
            format.as_deref(),
            ListVersionsTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Get one version
    #[instrument(skip(self))]
    pub async fn get_version(&self, params: VersionParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "get_version",
            format.as_deref(),
            GetVersionTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Create a version in a project
    ///
    /// # Examples
    /// - `{"project_key": "PROJ", "name": "2.1.0", "release_date": "2024-06-30"}`
    #[instrument(skip(self))]
    pub async fn create_version(&self, params: CreateVersionParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "create_version",
            format.as_deref(),
            CreateVersionTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Update a version, e.g. mark it released
    #[instrument(skip(self))]
    pub async fn update_version(&self, params: UpdateVersionParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "update_version",
            format.as_deref(),
            UpdateVersionTool::new(self.client()).execute(params),
        )
        .await
    }

    /// List issue priorities
    #[instrument(skip(self))]
    pub async fn list_priorities(&self, params: ListPrioritiesParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "list_priorities",
            format.as_deref(),
            ListPrioritiesTool::new(self.client()).execute(params),
        )
        .await
    }

    /// List fields, optionally only custom fields
    #[instrument(skip(self))]
    pub async fn list_fields(&self, params: ListFieldsParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "list_fields",
            format.as_deref(),
            ListFieldsTool::new(self.client()).execute(params),
        )
        .await
    }

    /// List the user's favourite filters
    #[instrument(skip(self))]
    pub async fn list_filters(&self, params: ListFiltersParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "list_filters",
            format.as_deref(),
            ListFiltersTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Get one saved filter with its JQL
    #[instrument(skip(self))]
    pub async fn get_filter(&self, params: FilterParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "get_filter",
            format.as_deref(),
            GetFilterTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Get the authenticated user
    #[instrument(skip(self))]
    pub async fn get_current_user(&self, params: CurrentUserParams) -> anyhow::Result<String> {
        let format = params.format.clone();
        self.respond(
            "get_current_user",
            format.as_deref(),
            CurrentUserTool::new(self.client()).execute(params),
        )
        .await
    }

    /// Get server status and connection information
    #[instrument(skip(self))]
    pub async fn get_server_status(&self) -> anyhow::Result<JiraServerStatus> {
        info!("Getting server status");

        let (connection_status, authenticated_user) = match self.jira_client.myself().await {
            Ok(user) => (
                "Connected".to_string(),
                user.get("displayName")
                    .and_then(|v| v.as_str())
                    .map(str::to_string),
            ),
            Err(e) => (format!("Connection Error: {}", e), None),
        };

        Ok(JiraServerStatus {
            server_name: "Jira CLI MCP Server".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
            jira_url: self.config.jira_url.clone(),
            deployment: if self.config.is_cloud() { "cloud" } else { "server" }.to_string(),
            jira_connection_status: connection_status,
            authenticated_user,
            default_format: self.default_format.to_string(),
            tools_count: TOOLS_COUNT,
        })
    }

    /// Test JIRA connection and authentication
    #[instrument(skip(self))]
    pub async fn test_connection(&self) -> anyhow::Result<String> {
        info!("Testing JIRA connection");

        match self.jira_client.test_connection().await {
            Ok(user) => {
                let field = |name: &str| {
                    user.get(name)
                        .and_then(|v| v.as_str())
                        .unwrap_or("N/A")
                        .to_string()
                };
                Ok(format!(
                    "✅ Connection successful!\n\
                     JIRA URL: {}\n\
                     Authenticated as: {} ({})",
                    self.config.jira_url,
                    field("displayName"),
                    field("emailAddress"),
                ))
            }
            Err(e) => {
                error!("Connection test failed: {}", e);
                let hint = e
                    .hint()
                    .map(|h| format!("\nHint: {}", h))
                    .unwrap_or_default();
                // Reported as a result so the agent sees the diagnosis
                Ok(format!(
                    "❌ Connection failed!\n\
                     JIRA URL: {}\n\
                     Error: {}{}",
                    self.config.jira_url, e, hint
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthConfig;

    #[tokio::test]
    async fn test_server_creation_with_invalid_config() {
        let config = JiraConfig {
            jira_url: "invalid-url".to_string(),
            auth: AuthConfig::Anonymous,
            ..Default::default()
        };
        assert!(JiraCliServer::with_config(config).await.is_err());
    }

    #[tokio::test]
    async fn test_invalid_default_format_is_rejected() {
        let config = JiraConfig {
            jira_url: "https://example.atlassian.net".to_string(),
            auth: AuthConfig::Anonymous,
            default_format: "xml".to_string(),
            ..Default::default()
        };
        assert!(JiraCliServer::with_config(config).await.is_err());
    }

    #[test]
    fn test_errors_are_not_coloured() {
        assert_eq!(plain(OutputFormat::Rich), OutputFormat::Markdown);
        assert_eq!(plain(OutputFormat::Json), OutputFormat::Json);
    }
}
