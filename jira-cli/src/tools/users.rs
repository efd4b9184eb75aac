//! Current user tool

use crate::error::JiraCliResult;
use crate::format::EntityKind;
use crate::jira_client::JiraClient;
use crate::tools::ToolOutput;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

/// Parameters for the current user lookup
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct CurrentUserParams {
    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Tool returning the authenticated user
#[derive(Debug)]
pub struct CurrentUserTool {
    jira_client: Arc<JiraClient>,
}

impl CurrentUserTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, _params: CurrentUserParams) -> JiraCliResult<ToolOutput> {
        let user = self.jira_client.myself().await?;
        Ok(ToolOutput::new(EntityKind::User, user))
    }
}
