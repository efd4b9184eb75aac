//! Jira client wrapper around gouqi
//!
//! Every operation is bounded by the configured request timeout and returns
//! the remote payload as `serde_json::Value`. Renderers decide what to show,
//! so nothing is reshaped here beyond unwrapping list envelopes.

use crate::bulk_fetch::IssueFetcher;
use crate::config::JiraConfig;
use crate::error::{extract_retry_after, JiraCliError, JiraCliResult};
use crate::workflow::{Transition, WorkflowApi};
use async_trait::async_trait;
use gouqi::r#async::Jira;
use serde_json::{json, Value};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, instrument};

/// Format Jira expects for worklog start times
pub const JIRA_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

/// Jira client wrapper shared by the CLI commands and MCP tools
#[derive(Debug, Clone)]
pub struct JiraClient {
    pub(crate) client: Arc<Jira>,
    config: Arc<JiraConfig>,
}

impl JiraClient {
    /// Create a client for the configured instance without contacting it
    #[instrument(skip_all)]
    pub fn new(config: Arc<JiraConfig>) -> JiraCliResult<Self> {
        info!("Initializing Jira client for URL: {}", config.jira_url);

        let client = Jira::new(&config.jira_url, config.to_gouqi_credentials())
            .map_err(JiraCliError::from)?;

        Ok(Self {
            client: Arc::new(client),
            config,
        })
    }

    pub fn config(&self) -> &JiraConfig {
        &self.config
    }

    /// Check connectivity and credentials by fetching the current user
    #[instrument(skip_all)]
    pub async fn test_connection(&self) -> JiraCliResult<Value> {
        debug!("Testing Jira connection");
        let user = self.myself().await?;
        let display_name = user
            .get("displayName")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown");
        info!("Connection test successful, authenticated as: {}", display_name);
        Ok(user)
    }

    /// Await a gouqi call under the request timeout and classify its error
    async fn request<T, Fut>(&self, resource: &str, key: &str, call: Fut) -> JiraCliResult<T>
    where
        Fut: Future<Output = Result<T, gouqi::Error>>,
    {
        match timeout(self.config.request_timeout(), call).await {
            Err(_) => Err(JiraCliError::network(format!(
                "Timeout after {}s requesting {} '{}'",
                self.config.request_timeout_seconds, resource, key
            ))),
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(classify_error(e, resource, key)),
        }
    }

    /// Like `request`, for endpoints that answer 204 No Content
    async fn request_no_content<Fut>(&self, resource: &str, key: &str, call: Fut) -> JiraCliResult<()>
    where
        Fut: Future<Output = Result<Value, gouqi::Error>>,
    {
        match timeout(self.config.request_timeout(), call).await {
            Err(_) => Err(JiraCliError::network(format!(
                "Timeout after {}s requesting {} '{}'",
                self.config.request_timeout_seconds, resource, key
            ))),
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) if is_empty_body(&e) => {
                debug!("Ignoring deserialization error (likely 204 No Content response)");
                Ok(())
            }
            Ok(Err(e)) => Err(classify_error(e, resource, key)),
        }
    }

    // ---------------------------------------------------------------------
    // Issues
    // ---------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn get_issue(
        &self,
        key: &str,
        fields: Option<&str>,
        expand: Option<&str>,
    ) -> JiraCliResult<Value> {
        let endpoint = with_query(
            &format!("/issue/{}", key),
            &[("fields", fields), ("expand", expand)],
        );
        self.request("issue", key, self.client.get::<Value>("api", &endpoint))
            .await
    }

    /// Search with JQL; Cloud and Server use different endpoints
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        jql: &str,
        start_at: u32,
        max_results: u32,
        fields: Option<&str>,
    ) -> JiraCliResult<Value> {
        let max_results = max_results.clamp(1, self.config.max_search_results.max(1));
        let fields: Vec<&str> = fields
            .unwrap_or("summary,status,priority,issuetype,assignee,updated")
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .collect();

        let (endpoint, body) = if self.config.is_cloud() {
            (
                "/search/jql",
                json!({"jql": jql, "maxResults": max_results, "fields": fields}),
            )
        } else {
            (
                "/search",
                json!({"jql": jql, "startAt": start_at, "maxResults": max_results, "fields": fields}),
            )
        };

        debug!("Searching with JQL via {}: {}", endpoint, jql);
        self.request(
            "search",
            jql,
            self.client.post::<Value, _>("api", endpoint, body),
        )
        .await
    }

    #[instrument(skip(self, fields))]
    pub async fn create_issue(&self, fields: Value) -> JiraCliResult<Value> {
        let project = fields
            .pointer("/project/key")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        self.request(
            "project",
            &project,
            self.client
                .post::<Value, _>("api", "/issue", json!({ "fields": fields })),
        )
        .await
    }

    #[instrument(skip(self, fields))]
    pub async fn update_issue(&self, key: &str, fields: Value) -> JiraCliResult<()> {
        let endpoint = format!("/issue/{}", key);
        self.request_no_content(
            "issue",
            key,
            self.client
                .put::<Value, _>("api", &endpoint, json!({ "fields": fields })),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn delete_issue(&self, key: &str) -> JiraCliResult<()> {
        let endpoint = format!("/issue/{}", key);
        self.request_no_content("issue", key, self.client.delete::<Value>("api", &endpoint))
            .await
    }

    // ---------------------------------------------------------------------
    // Comments
    // ---------------------------------------------------------------------

    /// Most recent comments first
    #[instrument(skip(self))]
    pub async fn comments(&self, key: &str, limit: usize) -> JiraCliResult<Vec<Value>> {
        let issue = self.get_issue(key, Some("comment"), None).await?;
        let mut comments = array_at(&issue, "/fields/comment/comments");
        comments.reverse();
        comments.truncate(limit.clamp(1, 100));
        Ok(comments)
    }

    #[instrument(skip(self, body))]
    pub async fn add_comment(&self, key: &str, body: &str) -> JiraCliResult<Value> {
        let endpoint = format!("/issue/{}/comment", key);
        self.request(
            "issue",
            key,
            self.client
                .post::<Value, _>("api", &endpoint, json!({ "body": body })),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn delete_comment(&self, key: &str, comment_id: &str) -> JiraCliResult<()> {
        let endpoint = format!("/issue/{}/comment/{}", key, comment_id);
        self.request_no_content(
            "comment",
            comment_id,
            self.client.delete::<Value>("api", &endpoint),
        )
        .await
    }

    // ---------------------------------------------------------------------
    // Transitions
    // ---------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn transitions(&self, key: &str) -> JiraCliResult<Vec<Transition>> {
        let endpoint = format!("/issue/{}/transitions", key);
        let payload = self
            .request("issue", key, self.client.get::<Value>("api", &endpoint))
            .await?;
        Ok(array_at(&payload, "/transitions")
            .iter()
            .filter_map(Transition::from_jira)
            .collect())
    }

    #[instrument(skip(self, fields))]
    pub async fn do_transition(
        &self,
        key: &str,
        transition_id: &str,
        fields: Option<Value>,
    ) -> JiraCliResult<()> {
        let endpoint = format!("/issue/{}/transitions", key);
        let mut body = json!({ "transition": { "id": transition_id } });
        if let Some(fields) = fields.filter(|f| f.as_object().is_some_and(|o| !o.is_empty())) {
            body["fields"] = fields;
        }
        self.request_no_content(
            "issue",
            key,
            self.client.post::<Value, _>("api", &endpoint, body),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn current_status(&self, key: &str) -> JiraCliResult<String> {
        let issue = self.get_issue(key, Some("status"), None).await?;
        Ok(issue
            .pointer("/fields/status/name")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string())
    }

    // ---------------------------------------------------------------------
    // Worklogs
    // ---------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn worklogs(&self, key: &str) -> JiraCliResult<Vec<Value>> {
        let endpoint = format!("/issue/{}/worklog", key);
        let payload = self
            .request("issue", key, self.client.get::<Value>("api", &endpoint))
            .await?;
        Ok(array_at(&payload, "/worklogs"))
    }

    #[instrument(skip(self))]
    pub async fn worklog(&self, key: &str, worklog_id: &str) -> JiraCliResult<Value> {
        let endpoint = format!("/issue/{}/worklog/{}", key, worklog_id);
        self.request("worklog", worklog_id, self.client.get::<Value>("api", &endpoint))
            .await
    }

    /// Log time on an issue; `started` defaults to now
    #[instrument(skip(self, comment))]
    pub async fn add_worklog(
        &self,
        key: &str,
        time_spent: &str,
        comment: Option<&str>,
        started: Option<&str>,
    ) -> JiraCliResult<Value> {
        let time_spent = time_spent.trim();
        if time_spent.is_empty() {
            return Err(JiraCliError::invalid_param(
                "time_spent",
                "Time spent cannot be empty (e.g. '2h', '30m', '1d 4h')",
            ));
        }

        let started = match started {
            Some(s) => s.to_string(),
            None => chrono::Utc::now().format(JIRA_DATETIME_FORMAT).to_string(),
        };

        let mut body = json!({ "timeSpent": time_spent, "started": started });
        if let Some(comment) = comment {
            body["comment"] = Value::String(comment.to_string());
        }

        let endpoint = format!("/issue/{}/worklog", key);
        self.request(
            "issue",
            key,
            self.client.post::<Value, _>("api", &endpoint, body),
        )
        .await
    }

    // ---------------------------------------------------------------------
    // Attachments
    // ---------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn attachments(&self, key: &str) -> JiraCliResult<Vec<Value>> {
        let issue = self.get_issue(key, Some("attachment"), None).await?;
        Ok(array_at(&issue, "/fields/attachment"))
    }

    /// Upload a local file to an issue
    #[instrument(skip(self))]
    pub async fn upload_attachment(&self, key: &str, path: &Path) -> JiraCliResult<Vec<Value>> {
        let bytes = tokio::fs::read(path).await.map_err(|e| {
            JiraCliError::invalid_param("file", format!("Cannot read '{}': {}", path.display(), e))
        })?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                JiraCliError::invalid_param(
                    "file",
                    format!("Failed to extract filename from path: '{}'", path.display()),
                )
            })?
            .to_string();

        // The async client's multipart future is not Send, so use the blocking client
        let jira_url = self.config.jira_url.clone();
        let credentials = self.config.to_gouqi_credentials();
        let issue_key = key.to_string();

        let uploaded = tokio::task::spawn_blocking(move || {
            let sync_client = gouqi::Jira::new(&jira_url, credentials)?;
            sync_client
                .issues()
                .upload_attachment(&issue_key, vec![(filename.as_str(), bytes)])
        })
        .await
        .map_err(|e| JiraCliError::internal(format!("Task join error: {}", e)))?
        .map_err(|e| classify_error(e, "issue", key))?;

        info!("Uploaded {} attachment(s) to {}", uploaded.len(), key);
        Ok(uploaded
            .into_iter()
            .map(|att| {
                json!({
                    "filename": att.filename,
                    "size": att.size,
                    "mimeType": att.mime_type,
                })
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn delete_attachment(&self, attachment_id: &str) -> JiraCliResult<()> {
        let endpoint = format!("/attachment/{}", attachment_id);
        self.request_no_content(
            "attachment",
            attachment_id,
            self.client.delete::<Value>("api", &endpoint),
        )
        .await
    }

    // ---------------------------------------------------------------------
    // Boards and sprints
    // ---------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn boards(
        &self,
        project: Option<&str>,
        board_type: Option<&str>,
    ) -> JiraCliResult<Vec<Value>> {
        let endpoint = with_query(
            "/board",
            &[("projectKeyOrId", project), ("type", board_type)],
        );
        let payload = self
            .request(
                "project",
                project.unwrap_or("*"),
                self.client.get::<Value>("agile", &endpoint),
            )
            .await?;
        Ok(array_at(&payload, "/values"))
    }

    #[instrument(skip(self))]
    pub async fn sprints(&self, board_id: u64, state: Option<&str>) -> JiraCliResult<Vec<Value>> {
        let endpoint = with_query(&format!("/board/{}/sprint", board_id), &[("state", state)]);
        let payload = self
            .request(
                "board",
                &board_id.to_string(),
                self.client.get::<Value>("agile", &endpoint),
            )
            .await?;
        Ok(array_at(&payload, "/values"))
    }

    #[instrument(skip(self))]
    pub async fn sprint(&self, sprint_id: u64) -> JiraCliResult<Value> {
        let endpoint = format!("/sprint/{}", sprint_id);
        self.request(
            "sprint",
            &sprint_id.to_string(),
            self.client.get::<Value>("agile", &endpoint),
        )
        .await
    }

    /// The active sprint on the first board of a project
    #[instrument(skip(self))]
    pub async fn active_sprint(&self, project: &str) -> JiraCliResult<Value> {
        let boards = self.boards(Some(project), None).await?;
        let board_id = boards
            .first()
            .and_then(|b| b.get("id"))
            .and_then(Value::as_u64)
            .ok_or_else(|| JiraCliError::not_found("board for project", project))?;

        self.sprints(board_id, Some("active"))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| JiraCliError::not_found("active sprint for project", project))
    }

    #[instrument(skip(self))]
    pub async fn move_to_sprint(&self, sprint_id: u64, keys: &[String]) -> JiraCliResult<()> {
        let endpoint = format!("/sprint/{}/issue", sprint_id);
        self.request_no_content(
            "sprint",
            &sprint_id.to_string(),
            self.client
                .post::<Value, _>("agile", &endpoint, json!({ "issues": keys })),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn move_to_backlog(&self, keys: &[String]) -> JiraCliResult<()> {
        self.request_no_content(
            "backlog",
            &keys.join(","),
            self.client
                .post::<Value, _>("agile", "/backlog/issue", json!({ "issues": keys })),
        )
        .await
    }

    // ---------------------------------------------------------------------
    // Issue links and web links
    // ---------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn issue_links(&self, key: &str) -> JiraCliResult<Vec<Value>> {
        let issue = self.get_issue(key, Some("issuelinks"), None).await?;
        Ok(array_at(&issue, "/fields/issuelinks"))
    }

    #[instrument(skip(self))]
    pub async fn link_types(&self) -> JiraCliResult<Vec<Value>> {
        let payload = self
            .request(
                "link types",
                "*",
                self.client.get::<Value>("api", "/issueLinkType"),
            )
            .await?;
        Ok(array_at(&payload, "/issueLinkTypes"))
    }

    /// Link `from` to `to`: `from` is the outward side ("PROJ-1 blocks PROJ-2")
    #[instrument(skip(self, comment))]
    pub async fn create_link(
        &self,
        from: &str,
        to: &str,
        link_type: &str,
        comment: Option<&str>,
    ) -> JiraCliResult<()> {
        let mut input = gouqi::CreateIssueLinkInput::new(link_type, to, from);
        if let Some(comment) = comment {
            input = input.with_comment(comment);
        }
        self.request(
            "issue or link type",
            &format!("{}, {} or {}", from, to, link_type),
            self.client.issue_links().create(input),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn delete_link(&self, link_id: &str) -> JiraCliResult<()> {
        self.request(
            "issue link",
            link_id,
            self.client.issue_links().delete(link_id),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn remote_links(&self, key: &str) -> JiraCliResult<Vec<Value>> {
        let endpoint = format!("/issue/{}/remotelink", key);
        let payload = self
            .request("issue", key, self.client.get::<Value>("api", &endpoint))
            .await?;
        Ok(payload.as_array().cloned().unwrap_or_default())
    }

    #[instrument(skip(self))]
    pub async fn add_remote_link(&self, key: &str, url: &str, title: &str) -> JiraCliResult<Value> {
        let endpoint = format!("/issue/{}/remotelink", key);
        let body = json!({ "object": { "url": url, "title": title } });
        self.request(
            "issue",
            key,
            self.client.post::<Value, _>("api", &endpoint, body),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn delete_remote_link(&self, key: &str, link_id: &str) -> JiraCliResult<()> {
        let endpoint = format!("/issue/{}/remotelink/{}", key, link_id);
        self.request_no_content(
            "web link",
            link_id,
            self.client.delete::<Value>("api", &endpoint),
        )
        .await
    }

    // ---------------------------------------------------------------------
    // Watchers
    // ---------------------------------------------------------------------

    /// `{watchCount, isWatching, watchers}` of an issue
    #[instrument(skip(self))]
    pub async fn watchers(&self, key: &str) -> JiraCliResult<Value> {
        let endpoint = format!("/issue/{}/watchers", key);
        self.request("issue", key, self.client.get::<Value>("api", &endpoint))
            .await
    }

    /// Add a watcher: an account ID on Cloud, a username on Server
    #[instrument(skip(self))]
    pub async fn add_watcher(&self, key: &str, user: &str) -> JiraCliResult<()> {
        let endpoint = format!("/issue/{}/watchers", key);
        self.request_no_content(
            "issue",
            key,
            self.client
                .post::<Value, _>("api", &endpoint, Value::String(user.to_string())),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn remove_watcher(&self, key: &str, user: &str) -> JiraCliResult<()> {
        let param = if self.config.is_cloud() {
            "accountId"
        } else {
            "username"
        };
        let endpoint = with_query(&format!("/issue/{}/watchers", key), &[(param, Some(user))]);
        self.request_no_content(
            "watcher",
            &format!("{} on {}", user, key),
            self.client.delete::<Value>("api", &endpoint),
        )
        .await
    }

    // ---------------------------------------------------------------------
    // Projects, components and versions
    // ---------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn projects(&self) -> JiraCliResult<Vec<Value>> {
        let payload = self
            .request("projects", "*", self.client.get::<Value>("api", "/project"))
            .await?;
        Ok(payload.as_array().cloned().unwrap_or_default())
    }

    #[instrument(skip(self))]
    pub async fn project(&self, key: &str) -> JiraCliResult<Value> {
        let endpoint = format!("/project/{}", key);
        self.request("project", key, self.client.get::<Value>("api", &endpoint))
            .await
    }

    #[instrument(skip(self))]
    pub async fn components(&self, project: &str) -> JiraCliResult<Vec<Value>> {
        let endpoint = format!("/project/{}/components", project);
        let payload = self
            .request("project", project, self.client.get::<Value>("api", &endpoint))
            .await?;
        Ok(payload.as_array().cloned().unwrap_or_default())
    }

    #[instrument(skip(self))]
    pub async fn component(&self, component_id: &str) -> JiraCliResult<Value> {
        let endpoint = format!("/component/{}", component_id);
        self.request(
            "component",
            component_id,
            self.client.get::<Value>("api", &endpoint),
        )
        .await
    }

    #[instrument(skip(self, body))]
    pub async fn create_component(&self, body: Value) -> JiraCliResult<Value> {
        let project = body
            .get("project")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        self.request(
            "project",
            &project,
            self.client.post::<Value, _>("api", "/component", body),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn delete_component(&self, component_id: &str) -> JiraCliResult<()> {
        let endpoint = format!("/component/{}", component_id);
        self.request_no_content(
            "component",
            component_id,
            self.client.delete::<Value>("api", &endpoint),
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn versions(&self, project: &str) -> JiraCliResult<Vec<Value>> {
        let endpoint = format!("/project/{}/versions", project);
        let payload = self
            .request("project", project, self.client.get::<Value>("api", &endpoint))
            .await?;
        Ok(payload.as_array().cloned().unwrap_or_default())
    }

    #[instrument(skip(self))]
    pub async fn version(&self, version_id: &str) -> JiraCliResult<Value> {
        let endpoint = format!("/version/{}", version_id);
        self.request(
            "version",
            version_id,
            self.client.get::<Value>("api", &endpoint),
        )
        .await
    }

    #[instrument(skip(self, body))]
    pub async fn create_version(&self, body: Value) -> JiraCliResult<Value> {
        let project = body
            .get("project")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string();
        self.request(
            "project",
            &project,
            self.client.post::<Value, _>("api", "/version", body),
        )
        .await
    }

    #[instrument(skip(self, body))]
    pub async fn update_version(&self, version_id: &str, body: Value) -> JiraCliResult<Value> {
        let endpoint = format!("/version/{}", version_id);
        self.request(
            "version",
            version_id,
            self.client.put::<Value, _>("api", &endpoint, body),
        )
        .await
    }

    // ---------------------------------------------------------------------
    // Reference data
    // ---------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn priorities(&self) -> JiraCliResult<Vec<Value>> {
        let payload = self
            .request("priorities", "*", self.client.get::<Value>("api", "/priority"))
            .await?;
        Ok(payload.as_array().cloned().unwrap_or_default())
    }

    #[instrument(skip(self))]
    pub async fn fields(&self) -> JiraCliResult<Vec<Value>> {
        let payload = self
            .request("fields", "*", self.client.get::<Value>("api", "/field"))
            .await?;
        Ok(payload.as_array().cloned().unwrap_or_default())
    }

    #[instrument(skip(self))]
    pub async fn favourite_filters(&self) -> JiraCliResult<Vec<Value>> {
        let payload = self
            .request(
                "filters",
                "favourite",
                self.client.get::<Value>("api", "/filter/favourite"),
            )
            .await?;
        Ok(payload.as_array().cloned().unwrap_or_default())
    }

    #[instrument(skip(self))]
    pub async fn filter(&self, filter_id: &str) -> JiraCliResult<Value> {
        let endpoint = format!("/filter/{}", filter_id);
        self.request("filter", filter_id, self.client.get::<Value>("api", &endpoint))
            .await
    }

    // ---------------------------------------------------------------------
    // Users
    // ---------------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn myself(&self) -> JiraCliResult<Value> {
        self.request("user", "myself", self.client.get::<Value>("api", "/myself"))
            .await
    }
}

/// Bulk retrieval adapter carrying the requested field list
pub struct IssueLookup {
    client: Arc<JiraClient>,
    fields: Option<String>,
}

impl IssueLookup {
    pub fn new(client: Arc<JiraClient>, fields: Option<String>) -> Self {
        Self { client, fields }
    }
}

#[async_trait]
impl IssueFetcher for IssueLookup {
    async fn fetch_one(&self, identifier: &str) -> JiraCliResult<Value> {
        self.client
            .get_issue(identifier, self.fields.as_deref(), None)
            .await
    }
}

#[async_trait]
impl WorkflowApi for JiraClient {
    async fn current_status(&self, issue_key: &str) -> JiraCliResult<String> {
        JiraClient::current_status(self, issue_key).await
    }

    async fn transitions(&self, issue_key: &str) -> JiraCliResult<Vec<Transition>> {
        JiraClient::transitions(self, issue_key).await
    }

    async fn apply_transition(
        &self,
        issue_key: &str,
        transition: &Transition,
        fields: Option<Value>,
    ) -> JiraCliResult<()> {
        self.do_transition(issue_key, &transition.id, fields).await
    }

    async fn add_comment(&self, issue_key: &str, body: &str) -> JiraCliResult<()> {
        JiraClient::add_comment(self, issue_key, body).await.map(|_| ())
    }
}

/// Map a gouqi error onto the error taxonomy, naming the resource involved.
///
/// Classification follows the HTTP status Jira answered with; the message
/// text is only consulted for the reason it carries.
fn classify_error(err: gouqi::Error, resource: &str, key: &str) -> JiraCliError {
    let classified = match &err {
        gouqi::Error::NotFound => Some(JiraCliError::not_found(resource, key)),
        gouqi::Error::Unauthorized => classify_status(401, "Unauthorized", resource, key),
        gouqi::Error::Fault { code, errors } => {
            let reason = errors
                .error_messages
                .iter()
                .chain(errors.errors.values())
                .chain(errors.error.iter())
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join("; ");
            classify_status(code.as_u16(), &reason, resource, key)
        }
        _ => None,
    };
    classified.unwrap_or_else(|| JiraCliError::from(err))
}

/// Error for an HTTP status Jira answered with, if the status has a
/// dedicated category
fn classify_status(status: u16, reason: &str, resource: &str, key: &str) -> Option<JiraCliError> {
    let error = match status {
        401 => JiraCliError::auth(format!("Jira rejected the credentials: {}", reason)),
        403 => JiraCliError::permission(format!("{} '{}': {}", resource, key, reason)),
        404 => JiraCliError::not_found(resource, key),
        // Jira answers some lookups of unknown keys with 400
        400 if reason.to_lowercase().contains("does not exist") => {
            JiraCliError::not_found(resource, key)
        }
        429 => JiraCliError::rate_limit(extract_retry_after(reason).unwrap_or(60)),
        _ => return None,
    };
    Some(error)
}

fn is_empty_body(err: &gouqi::Error) -> bool {
    let message = err.to_string();
    matches!(err, gouqi::Error::Serde(_))
        && (message.contains("expected value") || message.contains("EOF while parsing"))
}

/// Append non-empty query parameters to an endpoint
fn with_query(path: &str, params: &[(&str, Option<&str>)]) -> String {
    let query: Vec<String> = params
        .iter()
        .filter_map(|(name, value)| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| format!("{}={}", name, v.replace(' ', "%20")))
        })
        .collect();

    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query.join("&"))
    }
}

fn array_at(value: &Value, pointer: &str) -> Vec<Value> {
    value
        .pointer(pointer)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_query_skips_empty_values() {
        assert_eq!(with_query("/issue/A-1", &[("fields", None)]), "/issue/A-1");
        assert_eq!(
            with_query(
                "/issue/A-1",
                &[("fields", Some("summary,status")), ("expand", Some(" "))]
            ),
            "/issue/A-1?fields=summary,status"
        );
        assert_eq!(
            with_query("/board", &[("projectKeyOrId", Some("PROJ")), ("type", Some("scrum"))]),
            "/board?projectKeyOrId=PROJ&type=scrum"
        );
    }

    #[test]
    fn test_array_at() {
        let payload = json!({"fields": {"comment": {"comments": [{"id": "1"}, {"id": "2"}]}}});
        assert_eq!(array_at(&payload, "/fields/comment/comments").len(), 2);
        assert!(array_at(&payload, "/fields/attachment").is_empty());
    }

    #[test]
    fn test_classify_not_found() {
        let err = classify_error(gouqi::Error::NotFound, "issue", "X-404");
        assert!(matches!(
            err,
            JiraCliError::NotFound { ref resource, ref key } if resource == "issue" && key == "X-404"
        ));
        assert_eq!(err.detail(), "not found");
    }

    #[test]
    fn test_classify_unauthorized() {
        let err = classify_error(gouqi::Error::Unauthorized, "issue", "A-1");
        assert_eq!(err.category(), "authentication");
    }

    #[test]
    fn test_classify_by_status_not_by_text() {
        // A key that looks like a status code must not change the category
        let err = classify_status(401, "token expired", "issue", "X-404").unwrap();
        assert_eq!(err.category(), "authentication");

        let err = classify_status(403, "no browse permission", "issue", "PROJ-404").unwrap();
        assert_eq!(err.category(), "permission");

        let err = classify_error(
            gouqi::Error::ConfigError {
                message: "bad request to /issue/X-404".to_string(),
            },
            "issue",
            "X-404",
        );
        assert_eq!(err.category(), "internal");
    }

    #[test]
    fn test_classify_status_categories() {
        assert_eq!(
            classify_status(404, "", "issue", "A-1").unwrap().category(),
            "not_found"
        );
        assert_eq!(
            classify_status(400, "Issue Does Not Exist", "issue", "A-1")
                .unwrap()
                .category(),
            "not_found"
        );
        assert_matches::assert_matches!(
            classify_status(429, "Rate limit exceeded. Retry after 12 seconds", "search", "q"),
            Some(JiraCliError::RateLimit { retry_after: 12 })
        );
        assert!(classify_status(400, "Field 'summary' is required", "issue", "A-1").is_none());
        assert!(classify_status(500, "", "issue", "A-1").is_none());
    }
}
