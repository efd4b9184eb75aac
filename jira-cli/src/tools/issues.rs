//! Issue tools: single and bulk retrieval, create, update, delete

use crate::bulk_fetch::{BulkFetchOptions, BulkFetcher};
use crate::error::{JiraCliError, JiraCliResult};
use crate::format::EntityKind;
use crate::jira_client::{IssueLookup, JiraClient};
use crate::tools::{split_list, user_ref, validate_issue_key, ToolOutput};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{info, instrument};

/// Parameters for fetching one issue
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GetIssueParams {
    /// The JIRA issue key (e.g., "PROJ-123")
    pub issue_key: String,

    /// Comma-separated fields to return (default: all navigable fields)
    #[serde(default)]
    pub fields: Option<String>,

    /// Comma-separated expansions (e.g., "changelog,renderedFields")
    #[serde(default)]
    pub expand: Option<String>,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters for the combined issue + comments view
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ShowIssueParams {
    /// The JIRA issue key (e.g., "PROJ-123")
    pub issue_key: String,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters for fetching many issues in one call
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GetIssuesParams {
    /// Issue keys separated by commas and/or whitespace
    /// (e.g., "PROJ-1,PROJ-2 PROJ-3"). Duplicates are fetched once.
    pub issue_keys: String,

    /// Comma-separated fields to return for every issue
    #[serde(default)]
    pub fields: Option<String>,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Field values shared by create and update
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct IssueFieldParams {
    /// Issue description
    #[serde(default)]
    pub description: Option<String>,

    /// Priority (e.g., "Highest", "High", "Medium", "Low", "Lowest")
    #[serde(default)]
    pub priority: Option<String>,

    /// Comma-separated labels; on update these replace the existing labels
    #[serde(default)]
    pub labels: Option<String>,

    /// Assignee username or email address
    #[serde(default)]
    pub assignee: Option<String>,

    /// Extra fields as a JSON object, e.g. {"customfield_10480": 3}
    #[serde(default)]
    pub custom: Option<String>,
}

impl IssueFieldParams {
    fn apply(&self, fields: &mut Map<String, Value>) -> JiraCliResult<()> {
        if let Some(description) = &self.description {
            fields.insert("description".into(), json!(description));
        }
        if let Some(priority) = &self.priority {
            fields.insert("priority".into(), json!({ "name": priority }));
        }
        if let Some(labels) = &self.labels {
            fields.insert("labels".into(), json!(split_list(labels)));
        }
        if let Some(assignee) = &self.assignee {
            fields.insert("assignee".into(), user_ref(assignee));
        }
        if let Some(custom) = &self.custom {
            fields.extend(parse_custom_fields(custom)?);
        }
        Ok(())
    }
}

/// Parameters for creating an issue
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CreateIssueParams {
    /// Project key where the issue will be created (e.g., "PROJ")
    pub project_key: String,

    /// Issue summary/title
    pub summary: String,

    /// Issue type (default: "Task")
    #[serde(default)]
    pub issue_type: Option<String>,

    /// Parent issue key when creating a subtask
    #[serde(default)]
    pub parent: Option<String>,

    #[serde(flatten)]
    pub fields: IssueFieldParams,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters for updating an issue
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct UpdateIssueParams {
    /// The JIRA issue key (e.g., "PROJ-123")
    pub issue_key: String,

    /// New summary/title
    #[serde(default)]
    pub summary: Option<String>,

    #[serde(flatten)]
    pub fields: IssueFieldParams,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters for deleting an issue
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DeleteIssueParams {
    /// The JIRA issue key (e.g., "PROJ-123")
    pub issue_key: String,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

fn parse_custom_fields(raw: &str) -> JiraCliResult<Map<String, Value>> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(JiraCliError::invalid_param(
            "custom",
            "Custom fields must be a JSON object",
        )),
        Err(e) => Err(JiraCliError::invalid_param(
            "custom",
            format!("Invalid JSON in custom fields: {}", e),
        )),
    }
}

/// Tool for fetching one issue
#[derive(Debug)]
pub struct GetIssueTool {
    jira_client: Arc<JiraClient>,
}

impl GetIssueTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: GetIssueParams) -> JiraCliResult<ToolOutput> {
        validate_issue_key(&params.issue_key)?;
        let issue = self
            .jira_client
            .get_issue(
                params.issue_key.trim(),
                params.fields.as_deref(),
                params.expand.as_deref(),
            )
            .await?;
        Ok(ToolOutput::new(EntityKind::Issue, issue))
    }
}

/// Tool for the issue + comments view
#[derive(Debug)]
pub struct ShowIssueTool {
    jira_client: Arc<JiraClient>,
}

impl ShowIssueTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: ShowIssueParams) -> JiraCliResult<ToolOutput> {
        validate_issue_key(&params.issue_key)?;
        let issue = self
            .jira_client
            .get_issue(params.issue_key.trim(), Some("*all,comment"), None)
            .await?;
        Ok(ToolOutput::new(EntityKind::Show, split_comments(issue)))
    }
}

/// Move `fields.comment.comments` out of the issue, newest first
fn split_comments(mut issue: Value) -> Value {
    let comments = issue
        .get_mut("fields")
        .and_then(Value::as_object_mut)
        .and_then(|fields| fields.remove("comment"))
        .and_then(|mut c| c.get_mut("comments").map(Value::take))
        .and_then(|c| match c {
            Value::Array(mut items) => {
                items.reverse();
                Some(items)
            }
            _ => None,
        })
        .unwrap_or_default();
    json!({ "issue": issue, "comments": comments })
}

/// Tool for the bulk fetch: one aggregated result for many keys
#[derive(Debug)]
pub struct GetIssuesTool {
    jira_client: Arc<JiraClient>,
}

impl GetIssuesTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: GetIssuesParams) -> JiraCliResult<ToolOutput> {
        let lookup = IssueLookup::new(Arc::clone(&self.jira_client), params.fields.clone());
        let fetcher = BulkFetcher::new(
            Arc::new(lookup),
            BulkFetchOptions::from_config(self.jira_client.config()),
        );
        let result = fetcher.fetch(&params.issue_keys).await?;
        info!(
            "Bulk fetch returned {} found, {} missing",
            result.found.len(),
            result.missing.len()
        );
        Ok(ToolOutput::new(
            EntityKind::Issues,
            serde_json::to_value(&result)?,
        ))
    }
}

/// Tool for creating an issue
#[derive(Debug)]
pub struct CreateIssueTool {
    jira_client: Arc<JiraClient>,
}

impl CreateIssueTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    /// Build the `fields` object sent to Jira
    pub fn build_fields(params: &CreateIssueParams) -> JiraCliResult<Value> {
        let project = params.project_key.trim();
        if project.is_empty() {
            return Err(JiraCliError::invalid_param(
                "project_key",
                "Project key cannot be empty",
            ));
        }
        if params.summary.trim().is_empty() {
            return Err(JiraCliError::invalid_param(
                "summary",
                "Summary cannot be empty",
            ));
        }

        let mut fields = Map::new();
        fields.insert("project".into(), json!({ "key": project }));
        fields.insert("summary".into(), json!(params.summary.trim()));
        fields.insert(
            "issuetype".into(),
            json!({ "name": params.issue_type.as_deref().unwrap_or("Task") }),
        );
        if let Some(parent) = &params.parent {
            validate_issue_key(parent)?;
            fields.insert("parent".into(), json!({ "key": parent.trim() }));
        }
        params.fields.apply(&mut fields)?;
        Ok(Value::Object(fields))
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: CreateIssueParams) -> JiraCliResult<ToolOutput> {
        let fields = Self::build_fields(&params)?;
        let created = self.jira_client.create_issue(fields).await?;
        let key = created.get("key").and_then(|v| v.as_str()).unwrap_or("?");
        info!("Created issue {}", key);
        Ok(ToolOutput::new(
            EntityKind::Result,
            json!({
                "key": created.get("key").cloned().unwrap_or(Value::Null),
                "id": created.get("id").cloned().unwrap_or(Value::Null),
                "url": created.get("self").cloned().unwrap_or(Value::Null),
            }),
        ))
    }
}

/// Tool for updating issue fields
#[derive(Debug)]
pub struct UpdateIssueTool {
    jira_client: Arc<JiraClient>,
}

impl UpdateIssueTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    pub fn build_fields(params: &UpdateIssueParams) -> JiraCliResult<Value> {
        let mut fields = Map::new();
        if let Some(summary) = &params.summary {
            fields.insert("summary".into(), json!(summary));
        }
        params.fields.apply(&mut fields)?;
        if fields.is_empty() {
            return Err(JiraCliError::invalid_param(
                "fields",
                "No fields specified to update",
            ));
        }
        Ok(Value::Object(fields))
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: UpdateIssueParams) -> JiraCliResult<ToolOutput> {
        validate_issue_key(&params.issue_key)?;
        let fields = Self::build_fields(&params)?;
        let updated: Vec<String> = fields
            .as_object()
            .map(|f| f.keys().cloned().collect())
            .unwrap_or_default();

        self.jira_client
            .update_issue(params.issue_key.trim(), fields)
            .await?;
        Ok(ToolOutput::new(
            EntityKind::Result,
            json!({ "key": params.issue_key.trim(), "updated": updated.join(", ") }),
        ))
    }
}

/// Tool for deleting an issue
#[derive(Debug)]
pub struct DeleteIssueTool {
    jira_client: Arc<JiraClient>,
}

impl DeleteIssueTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: DeleteIssueParams) -> JiraCliResult<ToolOutput> {
        validate_issue_key(&params.issue_key)?;
        self.jira_client
            .delete_issue(params.issue_key.trim())
            .await?;
        Ok(ToolOutput::new(
            EntityKind::Result,
            json!({ "key": params.issue_key.trim(), "deleted": true }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_create_fields() {
        let params = CreateIssueParams {
            project_key: "PROJ".into(),
            summary: " Fix login ".into(),
            issue_type: Some("Bug".into()),
            parent: Some("PROJ-1".into()),
            fields: IssueFieldParams {
                priority: Some("High".into()),
                labels: Some("auth, web".into()),
                assignee: Some("sam@example.com".into()),
                custom: Some(r#"{"customfield_10480": 3}"#.into()),
                ..Default::default()
            },
            format: None,
        };
        let fields = CreateIssueTool::build_fields(&params).unwrap();
        assert_eq!(fields["project"]["key"], "PROJ");
        assert_eq!(fields["summary"], "Fix login");
        assert_eq!(fields["issuetype"]["name"], "Bug");
        assert_eq!(fields["parent"]["key"], "PROJ-1");
        assert_eq!(fields["labels"], json!(["auth", "web"]));
        assert_eq!(fields["assignee"], json!({"emailAddress": "sam@example.com"}));
        assert_eq!(fields["customfield_10480"], 3);
    }

    #[test]
    fn test_create_defaults_to_task() {
        let params = CreateIssueParams {
            project_key: "PROJ".into(),
            summary: "Something".into(),
            ..Default::default()
        };
        let fields = CreateIssueTool::build_fields(&params).unwrap();
        assert_eq!(fields["issuetype"]["name"], "Task");
        assert!(fields.get("parent").is_none());
    }

    #[test]
    fn test_create_requires_summary() {
        let params = CreateIssueParams {
            project_key: "PROJ".into(),
            summary: "  ".into(),
            ..Default::default()
        };
        assert_matches!(
            CreateIssueTool::build_fields(&params),
            Err(JiraCliError::InvalidParameter { parameter, .. }) if parameter == "summary"
        );
    }

    #[test]
    fn test_update_needs_a_field() {
        let params = UpdateIssueParams {
            issue_key: "PROJ-1".into(),
            ..Default::default()
        };
        assert!(UpdateIssueTool::build_fields(&params).is_err());

        let params = UpdateIssueParams {
            issue_key: "PROJ-1".into(),
            summary: Some("New title".into()),
            ..Default::default()
        };
        let fields = UpdateIssueTool::build_fields(&params).unwrap();
        assert_eq!(fields, json!({"summary": "New title"}));
    }

    #[test]
    fn test_invalid_custom_json() {
        assert!(parse_custom_fields("{nope").is_err());
        assert!(parse_custom_fields("[1, 2]").is_err());
        assert_eq!(parse_custom_fields(r#"{"a": 1}"#).unwrap().len(), 1);
    }

    #[test]
    fn test_split_comments_newest_first() {
        let issue = json!({
            "key": "PROJ-1",
            "fields": {
                "summary": "s",
                "comment": {"comments": [{"id": "1"}, {"id": "2"}]}
            }
        });
        let shown = split_comments(issue);
        assert!(shown["issue"]["fields"].get("comment").is_none());
        assert_eq!(shown["comments"], json!([{"id": "2"}, {"id": "1"}]));
    }

    #[test]
    fn test_split_comments_without_comment_field() {
        let shown = split_comments(json!({"key": "PROJ-1", "fields": {}}));
        assert_eq!(shown["comments"], json!([]));
    }
}
