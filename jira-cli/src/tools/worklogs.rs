//! Worklog tools

use crate::error::{JiraCliError, JiraCliResult};
use crate::format::EntityKind;
use crate::jira_client::{JiraClient, JIRA_DATETIME_FORMAT};
use crate::tools::{validate_issue_key, ToolOutput};
use chrono::DateTime;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, instrument};

/// Parameters for listing worklogs
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListWorklogsParams {
    /// The JIRA issue key (e.g., "PROJ-123")
    pub issue_key: String,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters for fetching one worklog
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GetWorklogParams {
    /// The JIRA issue key (e.g., "PROJ-123")
    pub issue_key: String,

    /// Worklog ID
    pub worklog_id: String,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters for logging time
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AddWorklogParams {
    /// The JIRA issue key (e.g., "PROJ-123")
    pub issue_key: String,

    /// Time spent in Jira notation (e.g., "2h", "30m", "1d 4h")
    pub time_spent: String,

    /// Optional worklog comment
    #[serde(default)]
    pub comment: Option<String>,

    /// Start time, RFC 3339 or Jira format (default: now)
    #[serde(default)]
    pub started: Option<String>,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Normalize a start time to the format Jira accepts
pub fn normalize_started(started: &str) -> JiraCliResult<String> {
    let started = started.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(started) {
        return Ok(parsed.format(JIRA_DATETIME_FORMAT).to_string());
    }
    if DateTime::parse_from_str(started, JIRA_DATETIME_FORMAT).is_ok() {
        return Ok(started.to_string());
    }
    Err(JiraCliError::invalid_param(
        "started",
        format!(
            "Cannot parse '{}'; use RFC 3339, e.g. 2024-05-02T09:00:00+00:00",
            started
        ),
    ))
}

/// Tool for listing worklogs
#[derive(Debug)]
pub struct ListWorklogsTool {
    jira_client: Arc<JiraClient>,
}

impl ListWorklogsTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: ListWorklogsParams) -> JiraCliResult<ToolOutput> {
        validate_issue_key(&params.issue_key)?;
        let worklogs = self.jira_client.worklogs(params.issue_key.trim()).await?;
        Ok(ToolOutput::new(EntityKind::Worklogs, Value::Array(worklogs)))
    }
}

/// Tool for fetching one worklog
#[derive(Debug)]
pub struct GetWorklogTool {
    jira_client: Arc<JiraClient>,
}

impl GetWorklogTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: GetWorklogParams) -> JiraCliResult<ToolOutput> {
        validate_issue_key(&params.issue_key)?;
        let worklog = self
            .jira_client
            .worklog(params.issue_key.trim(), params.worklog_id.trim())
            .await?;
        Ok(ToolOutput::new(EntityKind::Worklogs, json!([worklog])))
    }
}

/// Tool for logging time
#[derive(Debug)]
pub struct AddWorklogTool {
    jira_client: Arc<JiraClient>,
}

impl AddWorklogTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: AddWorklogParams) -> JiraCliResult<ToolOutput> {
        validate_issue_key(&params.issue_key)?;
        let started = params
            .started
            .as_deref()
            .map(normalize_started)
            .transpose()?;

        let worklog = self
            .jira_client
            .add_worklog(
                params.issue_key.trim(),
                &params.time_spent,
                params.comment.as_deref(),
                started.as_deref(),
            )
            .await?;
        info!("Logged {} on {}", params.time_spent.trim(), params.issue_key);

        Ok(ToolOutput::new(
            EntityKind::Result,
            json!({
                "key": params.issue_key.trim(),
                "worklog_id": worklog.get("id").cloned().unwrap_or(Value::Null),
                "time_spent": params.time_spent.trim(),
            }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_rfc3339() {
        assert_eq!(
            normalize_started("2024-05-02T09:00:00+00:00").unwrap(),
            "2024-05-02T09:00:00.000+0000"
        );
        assert_eq!(
            normalize_started("2024-05-02T09:00:00.250+02:00").unwrap(),
            "2024-05-02T09:00:00.250+0200"
        );
    }

    #[test]
    fn test_jira_format_passes_through() {
        assert_eq!(
            normalize_started("2024-05-02T09:00:00.000+0000").unwrap(),
            "2024-05-02T09:00:00.000+0000"
        );
    }

    #[test]
    fn test_garbage_start_time() {
        assert!(normalize_started("yesterday").is_err());
    }
}
