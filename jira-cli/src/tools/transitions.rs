//! Issue Transition Tools
//!
//! JIRA doesn't allow direct status updates; an issue moves between states by
//! triggering transitions. `TransitionIssueTool` finds and walks the path to
//! a target state, taking intermediate steps when necessary.

use crate::error::{JiraCliError, JiraCliResult};
use crate::format::EntityKind;
use crate::jira_client::JiraClient;
use crate::tools::{validate_issue_key, ToolOutput};
use crate::workflow::{smart_transition, SmartTransitionOptions, DEFAULT_MAX_STEPS};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument};

/// Parameters for listing available transitions
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ListTransitionsParams {
    /// The JIRA issue key (e.g., "PROJ-123")
    pub issue_key: String,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Parameters for moving an issue to a target state
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct TransitionIssueParams {
    /// The JIRA issue key (e.g., "PROJ-123")
    pub issue_key: String,

    /// Target state, transition name or transition ID (e.g., "Done", "In Progress")
    pub target: String,

    /// Add a comment listing the transitions taken (default: false)
    #[serde(default)]
    pub comment: bool,

    /// Report the transition that would be taken without changing anything
    #[serde(default)]
    pub dry_run: bool,

    /// Maximum number of transitions to take (default: 5)
    #[serde(default)]
    pub max_steps: Option<usize>,

    /// Resolution to set on the final transition (e.g., "Done", "Won't Fix")
    #[serde(default)]
    pub resolution: Option<String>,

    /// Output format: ai (default), json, markdown, rich
    #[serde(default)]
    pub format: Option<String>,
}

/// Tool for listing available transitions
#[derive(Debug)]
pub struct ListTransitionsTool {
    jira_client: Arc<JiraClient>,
}

impl ListTransitionsTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: ListTransitionsParams) -> JiraCliResult<ToolOutput> {
        validate_issue_key(&params.issue_key)?;
        let transitions = self
            .jira_client
            .transitions(params.issue_key.trim())
            .await?;
        info!(
            "Found {} available transitions for issue {}",
            transitions.len(),
            params.issue_key
        );
        Ok(ToolOutput::new(
            EntityKind::Transitions,
            serde_json::to_value(&transitions)?,
        ))
    }
}

/// Tool for transitioning an issue
#[derive(Debug)]
pub struct TransitionIssueTool {
    jira_client: Arc<JiraClient>,
}

impl TransitionIssueTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    /// Options for `smart_transition` derived from the parameters
    pub fn options(params: &TransitionIssueParams) -> JiraCliResult<SmartTransitionOptions> {
        let max_steps = params.max_steps.unwrap_or(DEFAULT_MAX_STEPS);
        if !(1..=20).contains(&max_steps) {
            return Err(JiraCliError::invalid_param(
                "max_steps",
                "max_steps must be between 1 and 20",
            ));
        }
        Ok(SmartTransitionOptions {
            add_comment: params.comment,
            dry_run: params.dry_run,
            max_steps,
            fields: params
                .resolution
                .as_ref()
                .map(|r| json!({ "resolution": { "name": r } })),
        })
    }

    #[instrument(skip(self))]
    pub async fn execute(&self, params: TransitionIssueParams) -> JiraCliResult<ToolOutput> {
        validate_issue_key(&params.issue_key)?;
        let target = params.target.trim();
        if target.is_empty() {
            return Err(JiraCliError::invalid_param(
                "target",
                "Target state cannot be empty",
            ));
        }
        let options = Self::options(&params)?;
        let issue_key = params.issue_key.trim();

        let steps = smart_transition(self.jira_client.as_ref(), issue_key, target, &options)
            .await?;
        let final_state = self.jira_client.current_status(issue_key).await?;

        info!(
            "{} {} step(s) for {} towards '{}'",
            if options.dry_run { "Previewed" } else { "Executed" },
            steps.len(),
            issue_key,
            target
        );

        Ok(ToolOutput::new(
            EntityKind::Result,
            json!({
                "key": issue_key,
                "target": target,
                "dry_run": options.dry_run,
                "steps": steps,
                "final_state": final_state,
            }),
        ))
    }
}
