//! Reference data: priorities, fields and saved filters

use crate::error::JiraCliResult;
use crate::format::EntityKind;
use crate::jira_client::JiraClient;
use crate::tools::{required, ToolOutput};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

/// Parameters for listing priorities
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListPrioritiesParams {
    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters for listing fields
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListFieldsParams {
    /// Only custom fields (IDs starting with "customfield_")
    #[serde(default)]
    pub custom_only: bool,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters for listing favourite filters
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListFiltersParams {
    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters naming one saved filter
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct FilterParams {
    /// Filter ID
    pub filter_id: String,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

fn is_custom_field(field: &Value) -> bool {
    field
        .get("id")
        .and_then(Value::as_str)
        .is_some_and(|id| id.starts_with("customfield_"))
}

/// Tool for listing issue priorities
#[derive(Debug)]
pub struct ListPrioritiesTool {
    jira_client: Arc<JiraClient>,
}

impl ListPrioritiesTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, _params: ListPrioritiesParams) -> JiraCliResult<ToolOutput> {
        let priorities = self.jira_client.priorities().await?;
        Ok(ToolOutput::new(EntityKind::Priorities, Value::Array(priorities)))
    }
}

/// Tool for listing fields, e.g. to find a custom field ID
#[derive(Debug)]
pub struct ListFieldsTool {
    jira_client: Arc<JiraClient>,
}

impl ListFieldsTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: ListFieldsParams) -> JiraCliResult<ToolOutput> {
        let mut fields = self.jira_client.fields().await?;
        if params.custom_only {
            fields.retain(is_custom_field);
        }
        Ok(ToolOutput::new(EntityKind::Fields, Value::Array(fields)))
    }
}

/// Tool for listing the user's favourite filters
#[derive(Debug)]
pub struct ListFiltersTool {
    jira_client: Arc<JiraClient>,
}

impl ListFiltersTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, _params: ListFiltersParams) -> JiraCliResult<ToolOutput> {
        let filters = self.jira_client.favourite_filters().await?;
        Ok(ToolOutput::new(EntityKind::Filters, Value::Array(filters)))
    }
}

/// Tool for fetching one saved filter
#[derive(Debug)]
pub struct GetFilterTool {
    jira_client: Arc<JiraClient>,
}

impl GetFilterTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: FilterParams) -> JiraCliResult<ToolOutput> {
        let id = required("filter_id", &params.filter_id)?;
        let filter = self.jira_client.filter(id).await?;
        Ok(ToolOutput::new(EntityKind::Filters, filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_custom_fields_by_id() {
        let mut fields = vec![
            json!({"id": "summary", "name": "Summary", "custom": false}),
            json!({"id": "customfield_10002", "name": "Story Points", "custom": true}),
            json!({"name": "No id"}),
        ];
        fields.retain(is_custom_field);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0]["name"], "Story Points");
    }
}
