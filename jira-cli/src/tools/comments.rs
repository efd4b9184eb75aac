//! Comment tools

use crate::error::{JiraCliError, JiraCliResult};
use crate::format::EntityKind;
use crate::jira_client::JiraClient;
use crate::tools::{validate_issue_key, ToolOutput};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, instrument};

pub const DEFAULT_COMMENT_LIMIT: usize = 10;

/// Parameters for listing comments
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListCommentsParams {
    /// The JIRA issue key (e.g., "PROJ-123")
    pub issue_key: String,

    /// Maximum comments to return, newest first (default: 10, max: 100)
    #[serde(default)]
    pub limit: Option<usize>,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters for adding a comment
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AddCommentParams {
    /// The JIRA issue key (e.g., "PROJ-123")
    pub issue_key: String,

    /// Comment text
    pub body: String,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters for deleting a comment
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DeleteCommentParams {
    /// The JIRA issue key (e.g., "PROJ-123")
    pub issue_key: String,

    /// Comment ID
    pub comment_id: String,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Tool for listing comments
#[derive(Debug)]
pub struct ListCommentsTool {
    jira_client: Arc<JiraClient>,
}

impl ListCommentsTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: ListCommentsParams) -> JiraCliResult<ToolOutput> {
        validate_issue_key(&params.issue_key)?;
        let comments = self
            .jira_client
            .comments(
                params.issue_key.trim(),
                params.limit.unwrap_or(DEFAULT_COMMENT_LIMIT),
            )
            .await?;
        Ok(ToolOutput::new(EntityKind::Comments, Value::Array(comments)))
    }
}

/// Tool for adding a comment
#[derive(Debug)]
pub struct AddCommentTool {
    jira_client: Arc<JiraClient>,
}

impl AddCommentTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self, params), fields(issue_key = %params.issue_key))]
    pub async fn execute(&self, params: AddCommentParams) -> JiraCliResult<ToolOutput> {
        validate_issue_key(&params.issue_key)?;
        if params.body.trim().is_empty() {
            return Err(JiraCliError::invalid_param(
                "body",
                "Comment body cannot be empty",
            ));
        }

        let comment = self
            .jira_client
            .add_comment(params.issue_key.trim(), &params.body)
            .await?;
        info!("Added comment to {}", params.issue_key);

        Ok(ToolOutput::new(
            EntityKind::Result,
            json!({
                "key": params.issue_key.trim(),
                "comment_id": comment.get("id").cloned().unwrap_or(Value::Null),
            }),
        ))
    }
}

/// Tool for deleting a comment
#[derive(Debug)]
pub struct DeleteCommentTool {
    jira_client: Arc<JiraClient>,
}

impl DeleteCommentTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: DeleteCommentParams) -> JiraCliResult<ToolOutput> {
        validate_issue_key(&params.issue_key)?;
        self.jira_client
            .delete_comment(params.issue_key.trim(), params.comment_id.trim())
            .await?;
        Ok(ToolOutput::new(
            EntityKind::Result,
            json!({
                "key": params.issue_key.trim(),
                "comment_id": params.comment_id.trim(),
                "deleted": true,
            }),
        ))
    }
}
