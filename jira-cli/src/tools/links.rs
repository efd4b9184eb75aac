//! Issue link and web link tools

use crate::error::{JiraCliError, JiraCliResult};
use crate::format::EntityKind;
use crate::jira_client::JiraClient;
use crate::tools::{required, validate_issue_key, ToolOutput};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, instrument};

/// Parameters for listing the links of an issue
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListLinksParams {
    /// The JIRA issue key (e.g., "PROJ-123")
    pub issue_key: String,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters for listing link types
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListLinkTypesParams {
    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters for linking two issues
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct LinkIssuesParams {
    /// Issue on the outward side, e.g. the blocker in "PROJ-1 blocks PROJ-2"
    pub from_issue_key: String,

    /// Issue on the inward side
    pub to_issue_key: String,

    /// Link type name, e.g. "Blocks", "Relates", "Duplicate" (see list_link_types)
    pub link_type: String,

    /// Optional comment added with the link
    #[serde(default)]
    pub comment: Option<String>,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters for deleting an issue link
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DeleteLinkParams {
    /// Link ID (shown by list_links)
    pub link_id: String,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters for listing web links
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListWebLinksParams {
    /// The JIRA issue key (e.g., "PROJ-123")
    pub issue_key: String,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters for adding a web link
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AddWebLinkParams {
    /// The JIRA issue key (e.g., "PROJ-123")
    pub issue_key: String,

    /// Link target, http or https
    pub url: String,

    /// Link title; defaults to the URL
    #[serde(default)]
    pub title: Option<String>,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters for removing a web link
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DeleteWebLinkParams {
    /// The JIRA issue key (e.g., "PROJ-123")
    pub issue_key: String,

    /// Web link ID (shown by list_web_links)
    pub link_id: String,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

fn validate_url(url: &str) -> JiraCliResult<&str> {
    let url = required("url", url)?;
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(JiraCliError::invalid_param(
            "url",
            format!("'{}' is not an http or https URL", url),
        ));
    }
    Ok(url)
}

/// Tool for listing the links of an issue
#[derive(Debug)]
pub struct ListLinksTool {
    jira_client: Arc<JiraClient>,
}

impl ListLinksTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: ListLinksParams) -> JiraCliResult<ToolOutput> {
        validate_issue_key(&params.issue_key)?;
        let links = self.jira_client.issue_links(params.issue_key.trim()).await?;
        Ok(ToolOutput::new(EntityKind::Links, Value::Array(links)))
    }
}

/// Tool for listing the link types of the instance
#[derive(Debug)]
pub struct ListLinkTypesTool {
    jira_client: Arc<JiraClient>,
}

impl ListLinkTypesTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, _params: ListLinkTypesParams) -> JiraCliResult<ToolOutput> {
        let types = self.jira_client.link_types().await?;
        info!("Found {} link types", types.len());
        Ok(ToolOutput::new(EntityKind::LinkTypes, Value::Array(types)))
    }
}

/// Tool for linking two issues
#[derive(Debug)]
pub struct LinkIssuesTool {
    jira_client: Arc<JiraClient>,
}

impl LinkIssuesTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: LinkIssuesParams) -> JiraCliResult<ToolOutput> {
        validate_issue_key(&params.from_issue_key)?;
        validate_issue_key(&params.to_issue_key)?;
        let link_type = required("link_type", &params.link_type)?;
        let from = params.from_issue_key.trim();
        let to = params.to_issue_key.trim();
        if from.eq_ignore_ascii_case(to) {
            return Err(JiraCliError::invalid_param(
                "to_issue_key",
                "An issue cannot be linked to itself",
            ));
        }

        let comment = params
            .comment
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());
        self.jira_client
            .create_link(from, to, link_type, comment)
            .await?;
        info!("Linked {} to {} with '{}'", from, to, link_type);

        Ok(ToolOutput::new(
            EntityKind::Result,
            json!({ "from": from, "to": to, "type": link_type }),
        ))
    }
}

/// Tool for deleting an issue link
#[derive(Debug)]
pub struct DeleteLinkTool {
    jira_client: Arc<JiraClient>,
}

impl DeleteLinkTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: DeleteLinkParams) -> JiraCliResult<ToolOutput> {
        let link_id = required("link_id", &params.link_id)?;
        self.jira_client.delete_link(link_id).await?;
        info!("Deleted issue link {}", link_id);
        Ok(ToolOutput::new(
            EntityKind::Result,
            json!({ "link_id": link_id, "deleted": true }),
        ))
    }
}

/// Tool for listing web links
#[derive(Debug)]
pub struct ListWebLinksTool {
    jira_client: Arc<JiraClient>,
}

impl ListWebLinksTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: ListWebLinksParams) -> JiraCliResult<ToolOutput> {
        validate_issue_key(&params.issue_key)?;
        let links = self.jira_client.remote_links(params.issue_key.trim()).await?;
        Ok(ToolOutput::new(EntityKind::WebLinks, Value::Array(links)))
    }
}

/// Tool for adding a web link
#[derive(Debug)]
pub struct AddWebLinkTool {
    jira_client: Arc<JiraClient>,
}

impl AddWebLinkTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: AddWebLinkParams) -> JiraCliResult<ToolOutput> {
        validate_issue_key(&params.issue_key)?;
        let url = validate_url(&params.url)?;
        let title = params
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(url);
        let key = params.issue_key.trim();

        let created = self.jira_client.add_remote_link(key, url, title).await?;
        info!("Added web link to {}", key);

        Ok(ToolOutput::new(
            EntityKind::Result,
            json!({
                "key": key,
                "url": url,
                "title": title,
                "id": created.get("id").cloned().unwrap_or(Value::Null),
            }),
        ))
    }
}

/// Tool for removing a web link
#[derive(Debug)]
pub struct DeleteWebLinkTool {
    jira_client: Arc<JiraClient>,
}

impl DeleteWebLinkTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: DeleteWebLinkParams) -> JiraCliResult<ToolOutput> {
        validate_issue_key(&params.issue_key)?;
        let link_id = required("link_id", &params.link_id)?;
        let key = params.issue_key.trim();
        self.jira_client.delete_remote_link(key, link_id).await?;
        Ok(ToolOutput::new(
            EntityKind::Result,
            json!({ "key": key, "link_id": link_id, "removed": true }),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthConfig, JiraConfig};
    use assert_matches::assert_matches;

    fn offline_client() -> Arc<JiraClient> {
        let config = JiraConfig {
            jira_url: "https://example.atlassian.net".to_string(),
            auth: AuthConfig::Anonymous,
            ..Default::default()
        };
        Arc::new(JiraClient::new(Arc::new(config)).unwrap())
    }

    #[test]
    fn test_validate_url() {
        assert_eq!(validate_url(" https://ci.example.com/7 ").unwrap(), "https://ci.example.com/7");
        assert!(validate_url("http://wiki").is_ok());
        assert_matches!(
            validate_url("ftp://files.example.com"),
            Err(JiraCliError::InvalidParameter { ref parameter, .. }) if parameter == "url"
        );
        assert!(validate_url("").is_err());
    }

    #[tokio::test]
    async fn test_link_rejects_self_link_before_any_request() {
        let tool = LinkIssuesTool::new(offline_client());
        let err = tool
            .execute(LinkIssuesParams {
                from_issue_key: "PROJ-1".to_string(),
                to_issue_key: "proj-1".to_string(),
                link_type: "Blocks".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_matches!(err, JiraCliError::InvalidParameter { ref parameter, .. } if parameter == "to_issue_key");
    }

    #[tokio::test]
    async fn test_link_requires_type() {
        let tool = LinkIssuesTool::new(offline_client());
        let err = tool
            .execute(LinkIssuesParams {
                from_issue_key: "PROJ-1".to_string(),
                to_issue_key: "PROJ-2".to_string(),
                link_type: " ".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_matches!(err, JiraCliError::InvalidParameter { ref parameter, .. } if parameter == "link_type");
    }

    #[tokio::test]
    async fn test_empty_ids_are_rejected() {
        let client = offline_client();
        let err = DeleteLinkTool::new(Arc::clone(&client))
            .execute(DeleteLinkParams::default())
            .await
            .unwrap_err();
        assert_matches!(err, JiraCliError::InvalidParameter { ref parameter, .. } if parameter == "link_id");

        let err = DeleteWebLinkTool::new(client)
            .execute(DeleteWebLinkParams {
                issue_key: "PROJ-1".to_string(),
                link_id: String::new(),
                format: None,
            })
            .await
            .unwrap_err();
        assert_matches!(err, JiraCliError::InvalidParameter { ref parameter, .. } if parameter == "link_id");
    }
}
