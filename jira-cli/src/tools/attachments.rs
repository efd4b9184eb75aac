//! Attachment tools

use crate::error::{JiraCliError, JiraCliResult};
use crate::format::EntityKind;
use crate::jira_client::JiraClient;
use crate::tools::{validate_issue_key, ToolOutput};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::instrument;

/// Parameters for listing attachments
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListAttachmentsParams {
    /// The JIRA issue key (e.g., "PROJ-123")
    pub issue_key: String,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters for uploading a local file
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct UploadAttachmentParams {
    /// The JIRA issue key (e.g., "PROJ-123")
    pub issue_key: String,

    /// Path of the file to upload
    pub file_path: String,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters for deleting an attachment
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DeleteAttachmentParams {
    /// Attachment ID (see list_attachments)
    pub attachment_id: String,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Tool for listing attachments
#[derive(Debug)]
pub struct ListAttachmentsTool {
    jira_client: Arc<JiraClient>,
}

impl ListAttachmentsTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: ListAttachmentsParams) -> JiraCliResult<ToolOutput> {
        validate_issue_key(&params.issue_key)?;
        let attachments = self
            .jira_client
            .attachments(params.issue_key.trim())
            .await?;
        Ok(ToolOutput::new(
            EntityKind::Attachments,
            Value::Array(attachments),
        ))
    }
}

/// Tool for uploading a file
#[derive(Debug)]
pub struct UploadAttachmentTool {
    jira_client: Arc<JiraClient>,
}

impl UploadAttachmentTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: UploadAttachmentParams) -> JiraCliResult<ToolOutput> {
        validate_issue_key(&params.issue_key)?;
        let path = PathBuf::from(params.file_path.trim());
        if !path.is_file() {
            return Err(JiraCliError::invalid_param(
                "file_path",
                format!("'{}' is not a readable file", path.display()),
            ));
        }

        let uploaded = self
            .jira_client
            .upload_attachment(params.issue_key.trim(), &path)
            .await?;
        Ok(ToolOutput::new(
            EntityKind::Attachments,
            Value::Array(uploaded),
        ))
    }
}

/// Tool for deleting an attachment
#[derive(Debug)]
pub struct DeleteAttachmentTool {
    jira_client: Arc<JiraClient>,
}

impl DeleteAttachmentTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: DeleteAttachmentParams) -> JiraCliResult<ToolOutput> {
        let attachment_id = params.attachment_id.trim();
        if attachment_id.is_empty() {
            return Err(JiraCliError::invalid_param(
                "attachment_id",
                "Attachment ID cannot be empty",
            ));
        }
        self.jira_client.delete_attachment(attachment_id).await?;
        Ok(ToolOutput::new(
            EntityKind::Result,
            json!({ "attachment_id": attachment_id, "deleted": true }),
        ))
    }
}
