//! Workflow navigation
//!
//! Jira does not allow setting a status directly; an issue moves between
//! states through transitions. This module looks transitions up by name and
//! walks multi-step paths when the target state is not directly reachable.

use crate::error::{JiraCliError, JiraCliResult};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Default number of transitions `smart_transition` may take
pub const DEFAULT_MAX_STEPS: usize = 5;

/// A transition available from some state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Transition {
    pub id: String,
    pub name: String,
    /// Name of the state the transition leads to
    pub to: String,
}

impl Transition {
    pub fn new(id: impl Into<String>, name: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            to: to.into(),
        }
    }

    /// Parse one entry of Jira's `transitions` array
    pub fn from_jira(value: &Value) -> Option<Self> {
        Some(Self {
            id: value.get("id")?.as_str()?.to_string(),
            name: value.get("name")?.as_str()?.to_string(),
            to: value
                .pointer("/to/name")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
        })
    }

    /// Whether this transition reaches, or is named like, `target`
    fn matches_target(&self, target: &str) -> bool {
        let target = target.to_lowercase();
        self.to.to_lowercase() == target || self.name.to_lowercase().contains(&target)
    }
}

/// Find a transition by id, name or target state (names compared case-insensitively)
pub fn find_transition<'a>(available: &'a [Transition], wanted: &str) -> Option<&'a Transition> {
    let wanted = wanted.trim();
    available
        .iter()
        .find(|t| t.id == wanted)
        .or_else(|| available.iter().find(|t| t.name.eq_ignore_ascii_case(wanted)))
        .or_else(|| available.iter().find(|t| t.to.eq_ignore_ascii_case(wanted)))
}

/// Errors raised while navigating a workflow
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("No path from '{from}' to '{to}'. Reachable states: {}", .reachable.join(", "))]
    PathNotFound {
        from: String,
        to: String,
        reachable: Vec<String>,
    },

    #[error("No path to '{target}' within {max_steps} steps")]
    StepLimit { target: String, max_steps: usize },

    #[error("Transition '{transition}' failed for {issue_key} in state '{current_state}': {reason}")]
    TransitionFailed {
        issue_key: String,
        transition: String,
        current_state: String,
        reason: String,
    },

    #[error("Dry run can only preview one step; next step would be '{first_step}' towards '{target}'")]
    PreviewIncomplete { first_step: String, target: String },

    #[error(transparent)]
    Jira(#[from] JiraCliError),
}

impl From<WorkflowError> for JiraCliError {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Jira(inner) => inner,
            other => JiraCliError::workflow(other.to_string()),
        }
    }
}

/// Known states of a workflow and the transitions out of each
#[derive(Debug, Clone, Default)]
pub struct WorkflowGraph {
    pub issue_type: String,
    states: BTreeMap<String, Vec<Transition>>,
}

impl WorkflowGraph {
    pub fn new(issue_type: impl Into<String>) -> Self {
        Self {
            issue_type: issue_type.into(),
            states: BTreeMap::new(),
        }
    }

    /// Record the transitions available from `state`
    pub fn add_state(&mut self, state: impl Into<String>, transitions: Vec<Transition>) {
        self.states.insert(state.into(), transitions);
    }

    /// Transitions out of `state`; empty when the state is unknown
    pub fn transitions_from(&self, state: &str) -> &[Transition] {
        self.states
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(state))
            .map(|(_, transitions)| transitions.as_slice())
            .unwrap_or(&[])
    }

    /// Every state seen, including states only known as transition targets
    pub fn all_states(&self) -> Vec<String> {
        let mut states: BTreeSet<String> = self.states.keys().cloned().collect();
        for transitions in self.states.values() {
            states.extend(transitions.iter().map(|t| t.to.clone()));
        }
        states.into_iter().collect()
    }

    /// Shortest sequence of transitions from `from` to `target`.
    ///
    /// `target` matches a state name case-insensitively, or part of a
    /// transition name.
    pub fn path_to(&self, from: &str, target: &str) -> Result<Vec<Transition>, WorkflowError> {
        if from.eq_ignore_ascii_case(target) {
            return Ok(Vec::new());
        }

        let mut visited = HashSet::from([from.to_lowercase()]);
        let mut queue = VecDeque::from([(from.to_string(), Vec::<Transition>::new())]);

        while let Some((state, path)) = queue.pop_front() {
            for transition in self.transitions_from(&state) {
                let mut next_path = path.clone();
                next_path.push(transition.clone());

                if transition.matches_target(target) {
                    return Ok(next_path);
                }

                if visited.insert(transition.to.to_lowercase()) {
                    queue.push_back((transition.to.clone(), next_path));
                }
            }
        }

        Err(WorkflowError::PathNotFound {
            from: from.to_string(),
            to: target.to_string(),
            reachable: self.reachable_from(from),
        })
    }

    /// States reachable from `from`, excluding `from` itself
    pub fn reachable_from(&self, from: &str) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::from([from.to_string()]);

        while let Some(state) = queue.pop_front() {
            for transition in self.transitions_from(&state) {
                if !transition.to.eq_ignore_ascii_case(from) && seen.insert(transition.to.clone()) {
                    queue.push_back(transition.to.clone());
                }
            }
        }

        seen.into_iter().collect()
    }

    /// Plain text rendering of the graph
    pub fn to_ascii(&self) -> String {
        let mut lines = vec![format!("Workflow: {}", self.issue_type), String::new()];
        for (state, transitions) in &self.states {
            lines.push(format!("[{}]", state));
            for t in transitions {
                lines.push(format!("  --({})--> {}", t.name, t.to));
            }
        }
        lines.join("\n")
    }
}

/// Operations `smart_transition` needs from Jira
#[async_trait]
pub trait WorkflowApi: Send + Sync {
    async fn current_status(&self, issue_key: &str) -> JiraCliResult<String>;
    async fn transitions(&self, issue_key: &str) -> JiraCliResult<Vec<Transition>>;
    async fn apply_transition(
        &self,
        issue_key: &str,
        transition: &Transition,
        fields: Option<Value>,
    ) -> JiraCliResult<()>;
    async fn add_comment(&self, issue_key: &str, body: &str) -> JiraCliResult<()>;
}

#[derive(Debug, Clone)]
pub struct SmartTransitionOptions {
    /// Post a comment describing the path once the target is reached
    pub add_comment: bool,
    pub dry_run: bool,
    pub max_steps: usize,
    /// Extra fields (e.g. resolution) sent with the final transition
    pub fields: Option<Value>,
}

impl Default for SmartTransitionOptions {
    fn default() -> Self {
        Self {
            add_comment: false,
            dry_run: false,
            max_steps: DEFAULT_MAX_STEPS,
            fields: None,
        }
    }
}

/// Move an issue to `target`, taking intermediate transitions if needed.
///
/// Returns the transitions taken (or, on a dry run, the one that would be
/// taken). An issue already in `target` yields an empty list.
#[instrument(skip(api, options))]
pub async fn smart_transition<A>(
    api: &A,
    issue_key: &str,
    target: &str,
    options: &SmartTransitionOptions,
) -> Result<Vec<Transition>, WorkflowError>
where
    A: WorkflowApi + ?Sized,
{
    let start_state = api.current_status(issue_key).await?;
    if start_state.eq_ignore_ascii_case(target) {
        info!("{} is already in '{}'", issue_key, target);
        return Ok(Vec::new());
    }

    let mut current = start_state.clone();
    let mut visited = vec![start_state.clone()];
    let mut taken: Vec<Transition> = Vec::new();

    for step in 0..options.max_steps {
        let available = api.transitions(issue_key).await?;
        debug!(
            "Step {}: {} transitions available from '{}'",
            step + 1,
            available.len(),
            current
        );

        let direct = available.iter().find(|t| t.matches_target(target));
        let chosen = match direct {
            Some(t) => t.clone(),
            None => available
                .iter()
                .find(|t| !visited.iter().any(|v| v.eq_ignore_ascii_case(&t.to)))
                .cloned()
                .ok_or_else(|| WorkflowError::PathNotFound {
                    from: start_state.clone(),
                    to: target.to_string(),
                    reachable: visited.clone(),
                })?,
        };
        let reaches_target = direct.is_some();

        if options.dry_run {
            if reaches_target {
                return Ok(vec![chosen]);
            }
            return Err(WorkflowError::PreviewIncomplete {
                first_step: chosen.name,
                target: target.to_string(),
            });
        }

        let fields = if reaches_target {
            options.fields.clone()
        } else {
            None
        };
        api.apply_transition(issue_key, &chosen, fields)
            .await
            .map_err(|e| WorkflowError::TransitionFailed {
                issue_key: issue_key.to_string(),
                transition: chosen.name.clone(),
                current_state: current.clone(),
                reason: e.detail(),
            })?;

        info!("{}: '{}' -> '{}' via {}", issue_key, current, chosen.to, chosen.name);
        current = chosen.to.clone();
        visited.push(chosen.to.clone());
        taken.push(chosen);

        if reaches_target {
            if options.add_comment {
                let body = format!(
                    "Transitioned from {} to {} via: {}",
                    start_state,
                    current,
                    taken
                        .iter()
                        .map(|t| t.name.as_str())
                        .collect::<Vec<_>>()
                        .join(" → ")
                );
                if let Err(e) = api.add_comment(issue_key, &body).await {
                    warn!("Failed to add transition comment to {}: {}", issue_key, e);
                }
            }
            return Ok(taken);
        }
    }

    Err(WorkflowError::StepLimit {
        target: target.to_string(),
        max_steps: options.max_steps,
    })
}
