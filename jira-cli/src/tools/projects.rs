//! Project, component and version tools

use crate::error::{JiraCliError, JiraCliResult};
use crate::format::EntityKind;
use crate::jira_client::JiraClient;
use crate::tools::{required, ToolOutput};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{info, instrument};

/// Parameters for listing projects
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListProjectsParams {
    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters naming one project
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ProjectParams {
    /// Project key (e.g., "PROJ")
    pub project_key: String,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters naming one component
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ComponentParams {
    /// Component ID
    pub component_id: String,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters for creating a component
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CreateComponentParams {
    /// Project key (e.g., "PROJ")
    pub project_key: String,

    /// Component name
    pub name: String,

    /// Component description
    #[serde(default)]
    pub description: Option<String>,

    /// Component lead: username on Server, account ID on Cloud
    #[serde(default)]
    pub lead: Option<String>,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters naming one version
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct VersionParams {
    /// Version ID
    pub version_id: String,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters for creating a version
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CreateVersionParams {
    /// Project key (e.g., "PROJ")
    pub project_key: String,

    /// Version name, e.g. "2.1.0"
    pub name: String,

    /// Version description
    #[serde(default)]
    pub description: Option<String>,

    /// Mark the version released
    #[serde(default)]
    pub released: bool,

    /// Release date, YYYY-MM-DD
    #[serde(default)]
    pub release_date: Option<String>,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters for updating a version; at least one change is required
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct UpdateVersionParams {
    /// Version ID
    pub version_id: String,

    /// New name
    #[serde(default)]
    pub name: Option<String>,

    /// New description
    #[serde(default)]
    pub description: Option<String>,

    /// Released flag
    #[serde(default)]
    pub released: Option<bool>,

    /// Archived flag
    #[serde(default)]
    pub archived: Option<bool>,

    /// Release date, YYYY-MM-DD
    #[serde(default)]
    pub release_date: Option<String>,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn validate_release_date(date: &str) -> JiraCliResult<&str> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| date)
        .map_err(|_| {
            JiraCliError::invalid_param(
                "release_date",
                format!("'{}' is not a date; expected YYYY-MM-DD", date),
            )
        })
}

/// Request body for a new component
fn component_body(params: &CreateComponentParams, cloud: bool) -> JiraCliResult<Value> {
    let mut body = json!({
        "project": required("project_key", &params.project_key)?,
        "name": required("name", &params.name)?,
    });
    if let Some(description) = non_blank(params.description.as_deref()) {
        body["description"] = json!(description);
    }
    if let Some(lead) = non_blank(params.lead.as_deref()) {
        let field = if cloud { "leadAccountId" } else { "leadUserName" };
        body[field] = json!(lead);
    }
    Ok(body)
}

/// Request body for a new version
fn version_body(params: &CreateVersionParams) -> JiraCliResult<Value> {
    let mut body = json!({
        "project": required("project_key", &params.project_key)?,
        "name": required("name", &params.name)?,
        "released": params.released,
    });
    if let Some(description) = non_blank(params.description.as_deref()) {
        body["description"] = json!(description);
    }
    if let Some(date) = non_blank(params.release_date.as_deref()) {
        body["releaseDate"] = json!(validate_release_date(date)?);
    }
    Ok(body)
}

/// Request body for a version update, with only the requested changes
fn version_update_body(params: &UpdateVersionParams) -> JiraCliResult<Value> {
    let mut body = Map::new();
    if let Some(name) = params.name.as_deref() {
        body.insert("name".into(), json!(required("name", name)?));
    }
    if let Some(description) = &params.description {
        body.insert("description".into(), json!(description));
    }
    if let Some(released) = params.released {
        body.insert("released".into(), json!(released));
    }
    if let Some(archived) = params.archived {
        body.insert("archived".into(), json!(archived));
    }
    if let Some(date) = non_blank(params.release_date.as_deref()) {
        body.insert("releaseDate".into(), json!(validate_release_date(date)?));
    }

    if body.is_empty() {
        return Err(JiraCliError::invalid_param(
            "version_id",
            "Nothing to update; pass name, description, released, archived or release_date",
        ));
    }
    Ok(Value::Object(body))
}

/// Tool for listing visible projects
#[derive(Debug)]
pub struct ListProjectsTool {
    jira_client: Arc<JiraClient>,
}

impl ListProjectsTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, _params: ListProjectsParams) -> JiraCliResult<ToolOutput> {
        let projects = self.jira_client.projects().await?;
        info!("Found {} projects", projects.len());
        Ok(ToolOutput::new(EntityKind::Projects, Value::Array(projects)))
    }
}

/// Tool for fetching one project
#[derive(Debug)]
pub struct GetProjectTool {
    jira_client: Arc<JiraClient>,
}

impl GetProjectTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: ProjectParams) -> JiraCliResult<ToolOutput> {
        let key = required("project_key", &params.project_key)?;
        let project = self.jira_client.project(key).await?;
        Ok(ToolOutput::new(EntityKind::Project, project))
    }
}

/// Tool for listing the components of a project
#[derive(Debug)]
pub struct ListComponentsTool {
    jira_client: Arc<JiraClient>,
}

impl ListComponentsTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: ProjectParams) -> JiraCliResult<ToolOutput> {
        let key = required("project_key", &params.project_key)?;
        let components = self.jira_client.components(key).await?;
        info!("Found {} components in project {}", components.len(), key);
        Ok(ToolOutput::new(EntityKind::Components, Value::Array(components)))
    }
}

/// Tool for fetching one component
#[derive(Debug)]
pub struct GetComponentTool {
    jira_client: Arc<JiraClient>,
}

impl GetComponentTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: ComponentParams) -> JiraCliResult<ToolOutput> {
        let id = required("component_id", &params.component_id)?;
        let component = self.jira_client.component(id).await?;
        Ok(ToolOutput::new(EntityKind::Components, component))
    }
}

/// Tool for creating a component
#[derive(Debug)]
pub struct CreateComponentTool {
    jira_client: Arc<JiraClient>,
}

impl CreateComponentTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: CreateComponentParams) -> JiraCliResult<ToolOutput> {
        let body = component_body(&params, self.jira_client.config().is_cloud())?;
        let created = self.jira_client.create_component(body).await?;
        info!(
            "Created component {} in {}",
            params.name.trim(),
            params.project_key.trim()
        );
        Ok(ToolOutput::new(EntityKind::Components, created))
    }
}

/// Tool for deleting a component
#[derive(Debug)]
pub struct DeleteComponentTool {
    jira_client: Arc<JiraClient>,
}

impl DeleteComponentTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: ComponentParams) -> JiraCliResult<ToolOutput> {
        let id = required("component_id", &params.component_id)?;
        self.jira_client.delete_component(id).await?;
        info!("Deleted component {}", id);
        Ok(ToolOutput::new(
            EntityKind::Result,
            json!({ "component_id": id, "deleted": true }),
        ))
    }
}

/// Tool for listing the versions of a project
#[derive(Debug)]
pub struct ListVersionsTool {
    jira_client: Arc<JiraClient>,
}

impl ListVersionsTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: ProjectParams) -> JiraCliResult<ToolOutput> {
        let key = required("project_key", &params.project_key)?;
        let versions = self.jira_client.versions(key).await?;
        info!("Found {} versions in project {}", versions.len(), key);
        Ok(ToolOutput::new(EntityKind::Versions, Value::Array(versions)))
    }
}

/// Tool for fetching one version
#[derive(Debug)]
pub struct GetVersionTool {
    jira_client: Arc<JiraClient>,
}

impl GetVersionTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: VersionParams) -> JiraCliResult<ToolOutput> {
        let id = required("version_id", &params.version_id)?;
        let version = self.jira_client.version(id).await?;
        Ok(ToolOutput::new(EntityKind::Versions, version))
    }
}

/// Tool for creating a version
#[derive(Debug)]
pub struct CreateVersionTool {
    jira_client: Arc<JiraClient>,
}

impl CreateVersionTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: CreateVersionParams) -> JiraCliResult<ToolOutput> {
        let body = version_body(&params)?;
        let created = self.jira_client.create_version(body).await?;
        info!(
            "Created version {} in {}",
            params.name.trim(),
            params.project_key.trim()
        );
        Ok(ToolOutput::new(EntityKind::Versions, created))
    }
}

/// Tool for updating a version
#[derive(Debug)]
pub struct UpdateVersionTool {
    jira_client: Arc<JiraClient>,
}

impl UpdateVersionTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: UpdateVersionParams) -> JiraCliResult<ToolOutput> {
        let id = required("version_id", &params.version_id)?;
        let body = version_update_body(&params)?;
        let updated = self.jira_client.update_version(id, body).await?;
        info!("Updated version {}", id);
        Ok(ToolOutput::new(EntityKind::Versions, updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_component_body() {
        let params = CreateComponentParams {
            project_key: " PROJ ".to_string(),
            name: "Backend".to_string(),
            description: Some(" ".to_string()),
            lead: Some("sdoe".to_string()),
            format: None,
        };
        assert_eq!(
            component_body(&params, false).unwrap(),
            json!({"project": "PROJ", "name": "Backend", "leadUserName": "sdoe"})
        );
        assert_eq!(
            component_body(&params, true).unwrap()["leadAccountId"],
            "sdoe"
        );

        let unnamed = CreateComponentParams {
            project_key: "PROJ".to_string(),
            ..Default::default()
        };
        assert_matches!(
            component_body(&unnamed, false),
            Err(JiraCliError::InvalidParameter { ref parameter, .. }) if parameter == "name"
        );
    }

    #[test]
    fn test_version_body() {
        let params = CreateVersionParams {
            project_key: "PROJ".to_string(),
            name: "2.1.0".to_string(),
            release_date: Some("2024-06-30".to_string()),
            ..Default::default()
        };
        assert_eq!(
            version_body(&params).unwrap(),
            json!({"project": "PROJ", "name": "2.1.0", "released": false, "releaseDate": "2024-06-30"})
        );

        let bad_date = CreateVersionParams {
            release_date: Some("30/06/2024".to_string()),
            ..params
        };
        assert_matches!(
            version_body(&bad_date),
            Err(JiraCliError::InvalidParameter { ref parameter, .. }) if parameter == "release_date"
        );
    }

    #[test]
    fn test_version_update_needs_a_change() {
        let nothing = UpdateVersionParams {
            version_id: "10600".to_string(),
            ..Default::default()
        };
        assert!(version_update_body(&nothing).is_err());

        let release = UpdateVersionParams {
            version_id: "10600".to_string(),
            released: Some(true),
            ..Default::default()
        };
        assert_eq!(version_update_body(&release).unwrap(), json!({"released": true}));

        let blank_name = UpdateVersionParams {
            name: Some(" ".to_string()),
            ..release
        };
        assert!(version_update_body(&blank_name).is_err());
    }
}
