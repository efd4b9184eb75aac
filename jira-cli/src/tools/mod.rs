//! Tools shared by the `jira` CLI and the MCP server
//!
//! Each tool takes a parameter struct, talks to Jira through [`JiraClient`]
//! and returns a [`ToolOutput`]: the raw payload tagged with what it
//! describes. The caller picks the output format.
//!
//! [`JiraClient`]: crate::jira_client::JiraClient

pub mod agile;
pub mod attachments;
pub mod comments;
pub mod issues;
pub mod links;
pub mod projects;
pub mod reference;
pub mod search;
pub mod transitions;
pub mod users;
pub mod watchers;
pub mod worklogs;

pub use agile::*;
pub use attachments::*;
pub use comments::*;
pub use issues::*;
pub use links::*;
pub use projects::*;
pub use reference::*;
pub use search::*;
pub use transitions::*;
pub use users::*;
pub use watchers::*;
pub use worklogs::*;

use crate::error::{JiraCliError, JiraCliResult};
use crate::format::{render, EntityKind, OutputFormat};
use serde_json::Value;

/// Payload produced by a tool, ready to render
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub kind: EntityKind,
    pub data: Value,
}

impl ToolOutput {
    pub fn new(kind: EntityKind, data: Value) -> Self {
        Self { kind, data }
    }

    pub fn render(&self, format: OutputFormat) -> String {
        render(self.kind, format, &self.data)
    }
}

/// Reject keys that cannot name an issue (`PROJ-123` or a numeric id)
pub(crate) fn validate_issue_key(issue_key: &str) -> JiraCliResult<()> {
    let issue_key = issue_key.trim();
    if issue_key.is_empty() {
        return Err(JiraCliError::invalid_param(
            "issue_key",
            "Issue key cannot be empty",
        ));
    }
    if issue_key.chars().all(|c| c.is_ascii_digit()) {
        return Ok(());
    }
    match issue_key.rsplit_once('-') {
        Some((project, number))
            if !project.is_empty()
                && !number.is_empty()
                && number.chars().all(|c| c.is_ascii_digit()) =>
        {
            Ok(())
        }
        _ => Err(JiraCliError::invalid_param(
            "issue_key",
            format!(
                "'{}' is not an issue key; expected format 'PROJECT-123'",
                issue_key
            ),
        )),
    }
}

/// Trimmed value of a required text parameter
pub(crate) fn required<'a>(param: &str, value: &'a str) -> JiraCliResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(JiraCliError::invalid_param(
            param,
            format!("{} cannot be empty", param),
        ));
    }
    Ok(value)
}

/// Split a comma separated list, dropping blanks
pub(crate) fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Jira user reference: an email address or a username
pub(crate) fn user_ref(user: &str) -> Value {
    if user.contains('@') {
        serde_json::json!({ "emailAddress": user })
    } else {
        serde_json::json!({ "name": user })
    }
}
