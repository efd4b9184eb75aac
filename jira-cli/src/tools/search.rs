//! JQL search tool

use crate::error::{JiraCliError, JiraCliResult};
use crate::format::EntityKind;
use crate::jira_client::JiraClient;
use crate::tools::ToolOutput;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

/// Parameters for a JQL search
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SearchIssuesParams {
    /// JQL query (e.g., "project = PROJ AND status = 'In Progress'")
    pub jql: String,

    /// Maximum number of results (default: 50, capped by configuration)
    #[serde(default)]
    pub max_results: Option<u32>,

    /// Offset of the first result (default: 0)
    #[serde(default)]
    pub start_at: Option<u32>,

    /// Comma-separated fields to return
    #[serde(default)]
    pub fields: Option<String>,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

fn issue_count(response: &Value) -> usize {
    response
        .get("issues")
        .and_then(|v| v.as_array())
        .map_or(0, Vec::len)
}

/// Tool for searching issues with JQL
#[derive(Debug)]
pub struct SearchIssuesTool {
    jira_client: Arc<JiraClient>,
}

impl SearchIssuesTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: SearchIssuesParams) -> JiraCliResult<ToolOutput> {
        let jql = params.jql.trim();
        if jql.is_empty() {
            return Err(JiraCliError::invalid_param("jql", "JQL cannot be empty"));
        }

        let max_results = params
            .max_results
            .unwrap_or(self.jira_client.config().max_search_results);
        let response = self
            .jira_client
            .search(
                jql,
                params.start_at.unwrap_or(0),
                max_results,
                params.fields.as_deref(),
            )
            .await?;

        let count = issue_count(&response);
        info!("Search returned {} issues", count);
        Ok(ToolOutput::new(EntityKind::Issues, response))
    }
}
