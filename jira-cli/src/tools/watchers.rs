//! Watcher tools

use crate::error::JiraCliResult;
use crate::format::EntityKind;
use crate::jira_client::JiraClient;
use crate::tools::{required, validate_issue_key, ToolOutput};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument};

/// Parameters for listing watchers
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListWatchersParams {
    /// The JIRA issue key (e.g., "PROJ-123")
    pub issue_key: String,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters for adding or removing a watcher
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct WatcherParams {
    /// The JIRA issue key (e.g., "PROJ-123")
    pub issue_key: String,

    /// Username on Jira Server/Data Center, account ID on Jira Cloud
    pub user: String,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Tool for listing the watchers of an issue
#[derive(Debug)]
pub struct ListWatchersTool {
    jira_client: Arc<JiraClient>,
}

impl ListWatchersTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: ListWatchersParams) -> JiraCliResult<ToolOutput> {
        validate_issue_key(&params.issue_key)?;
        let watchers = self.jira_client.watchers(params.issue_key.trim()).await?;
        Ok(ToolOutput::new(EntityKind::Watchers, watchers))
    }
}

/// Tool for adding a watcher
#[derive(Debug)]
pub struct AddWatcherTool {
    jira_client: Arc<JiraClient>,
}

impl AddWatcherTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: WatcherParams) -> JiraCliResult<ToolOutput> {
        validate_issue_key(&params.issue_key)?;
        let user = required("user", &params.user)?;
        let key = params.issue_key.trim();
        self.jira_client.add_watcher(key, user).await?;
        info!("Added watcher {} to {}", user, key);
        Ok(ToolOutput::new(
            EntityKind::Result,
            json!({ "key": key, "user": user, "added": true }),
        ))
    }
}

/// Tool for removing a watcher
#[derive(Debug)]
pub struct RemoveWatcherTool {
    jira_client: Arc<JiraClient>,
}

impl RemoveWatcherTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: WatcherParams) -> JiraCliResult<ToolOutput> {
        validate_issue_key(&params.issue_key)?;
        let user = required("user", &params.user)?;
        let key = params.issue_key.trim();
        self.jira_client.remove_watcher(key, user).await?;
        info!("Removed watcher {} from {}", user, key);
        Ok(ToolOutput::new(
            EntityKind::Result,
            json!({ "key": key, "user": user, "removed": true }),
        ))
    }
}
