//! Board and sprint tools (Jira agile API)

use crate::error::{JiraCliError, JiraCliResult};
use crate::format::EntityKind;
use crate::jira_client::JiraClient;
use crate::tools::{validate_issue_key, ToolOutput};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, instrument};

const SPRINT_STATES: [&str; 3] = ["active", "future", "closed"];

/// Parameters for listing boards
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListBoardsParams {
    /// Only boards of this project
    #[serde(default)]
    pub project_key: Option<String>,

    /// Board type: "scrum" or "kanban"
    #[serde(default)]
    pub board_type: Option<String>,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters for listing a board's sprints
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListSprintsParams {
    /// Board ID (see list_boards)
    pub board_id: u64,

    /// Comma-separated states: active, future, closed
    #[serde(default)]
    pub state: Option<String>,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters for fetching one sprint
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GetSprintParams {
    /// Sprint ID
    pub sprint_id: u64,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters for the active sprint of a project
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ActiveSprintParams {
    /// Project key (e.g., "PROJ")
    pub project_key: String,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters for moving issues into a sprint
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct MoveToSprintParams {
    /// Sprint ID
    pub sprint_id: u64,

    /// Issue keys to move
    pub issue_keys: Vec<String>,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters for moving issues to the backlog
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct MoveToBacklogParams {
    /// Issue keys to move
    pub issue_keys: Vec<String>,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

fn validate_state(state: &str) -> JiraCliResult<()> {
    for part in state.split(',').map(str::trim) {
        if !SPRINT_STATES.contains(&part) {
            return Err(JiraCliError::invalid_param(
                "state",
                format!(
                    "Unknown sprint state '{}'; use {}",
                    part,
                    SPRINT_STATES.join(", ")
                ),
            ));
        }
    }
    Ok(())
}

fn validate_keys(issue_keys: &[String]) -> JiraCliResult<Vec<String>> {
    if issue_keys.is_empty() {
        return Err(JiraCliError::invalid_param(
            "issue_keys",
            "At least one issue key is required",
        ));
    }
    issue_keys
        .iter()
        .map(|key| validate_issue_key(key).map(|_| key.trim().to_string()))
        .collect()
}

/// Tool for listing boards
#[derive(Debug)]
pub struct ListBoardsTool {
    jira_client: Arc<JiraClient>,
}

impl ListBoardsTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: ListBoardsParams) -> JiraCliResult<ToolOutput> {
        let boards = self
            .jira_client
            .boards(params.project_key.as_deref(), params.board_type.as_deref())
            .await?;
        Ok(ToolOutput::new(EntityKind::Boards, Value::Array(boards)))
    }
}

/// Tool for listing sprints
#[derive(Debug)]
pub struct ListSprintsTool {
    jira_client: Arc<JiraClient>,
}

impl ListSprintsTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: ListSprintsParams) -> JiraCliResult<ToolOutput> {
        if let Some(state) = &params.state {
            validate_state(state)?;
        }
        let sprints = self
            .jira_client
            .sprints(params.board_id, params.state.as_deref())
            .await?;
        Ok(ToolOutput::new(EntityKind::Sprints, Value::Array(sprints)))
    }
}

/// Tool for fetching one sprint
#[derive(Debug)]
pub struct GetSprintTool {
    jira_client: Arc<JiraClient>,
}

impl GetSprintTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: GetSprintParams) -> JiraCliResult<ToolOutput> {
        let sprint = self.jira_client.sprint(params.sprint_id).await?;
        Ok(ToolOutput::new(EntityKind::Sprint, sprint))
    }
}

/// Tool for the active sprint of a project
#[derive(Debug)]
pub struct ActiveSprintTool {
    jira_client: Arc<JiraClient>,
}

impl ActiveSprintTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: ActiveSprintParams) -> JiraCliResult<ToolOutput> {
        let project = params.project_key.trim();
        if project.is_empty() {
            return Err(JiraCliError::invalid_param(
                "project_key",
                "Project key cannot be empty",
            ));
        }
        let sprint = self.jira_client.active_sprint(project).await?;
        Ok(ToolOutput::new(EntityKind::Sprint, sprint))
    }
}

/// Tool for moving issues into a sprint
#[derive(Debug)]
pub struct MoveToSprintTool {
    jira_client: Arc<JiraClient>,
}

impl MoveToSprintTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: MoveToSprintParams) -> JiraCliResult<ToolOutput> {
        let keys = validate_keys(&params.issue_keys)?;
        self.jira_client
            .move_to_sprint(params.sprint_id, &keys)
            .await?;
        info!("Moved {} issue(s) to sprint {}", keys.len(), params.sprint_id);
        Ok(ToolOutput::new(
            EntityKind::Result,
            json!({ "sprint_id": params.sprint_id, "moved": keys.join(", ") }),
        ))
    }
}

/// Tool for moving issues to the backlog
#[derive(Debug)]
pub struct MoveToBacklogTool {
    jira_client: Arc<JiraClient>,
}

impl MoveToBacklogTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: MoveToBacklogParams) -> JiraCliResult<ToolOutput> {
        let keys = validate_keys(&params.issue_keys)?;
        self.jira_client.move_to_backlog(&keys).await?;
        info!("Moved {} issue(s) to the backlog", keys.len());
        Ok(ToolOutput::new(
            EntityKind::Result,
            json!({ "backlog": keys.join(", ") }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sprint_states() {
        assert!(validate_state("active").is_ok());
        assert!(validate_state("active, future").is_ok());
        assert!(validate_state("running").is_err());
    }

    #[test]
    fn test_keys_are_trimmed_and_checked() {
        let keys = validate_keys(&[" PROJ-1".to_string(), "PROJ-2 ".to_string()]).unwrap();
        assert_eq!(keys, vec!["PROJ-1", "PROJ-2"]);
        assert!(validate_keys(&[]).is_err());
        assert!(validate_keys(&["nope".to_string()]).is_err());
    }
}
