/// Workflow navigation against an in-memory Jira workflow
use assert_matches::assert_matches;
use async_trait::async_trait;
use jira_cli::error::{JiraCliError, JiraCliResult};
use jira_cli::workflow::{
    smart_transition, SmartTransitionOptions, Transition, WorkflowApi, WorkflowError,
    WorkflowGraph,
};
use serde_json::{json, Value};
use std::sync::Mutex;

/// Issue whose transitions come from a `WorkflowGraph`
struct GraphIssue {
    graph: WorkflowGraph,
    state: Mutex<String>,
    applied: Mutex<Vec<(String, Option<Value>)>>,
    comments: Mutex<Vec<String>>,
    reject: Option<&'static str>,
}

impl GraphIssue {
    fn new(graph: WorkflowGraph, state: &str) -> Self {
        Self {
            graph,
            state: Mutex::new(state.to_string()),
            applied: Mutex::new(Vec::new()),
            comments: Mutex::new(Vec::new()),
            reject: None,
        }
    }

    fn state(&self) -> String {
        self.state.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkflowApi for GraphIssue {
    async fn current_status(&self, _issue_key: &str) -> JiraCliResult<String> {
        Ok(self.state())
    }

    async fn transitions(&self, _issue_key: &str) -> JiraCliResult<Vec<Transition>> {
        Ok(self.graph.transitions_from(&self.state()).to_vec())
    }

    async fn apply_transition(
        &self,
        _issue_key: &str,
        transition: &Transition,
        fields: Option<Value>,
    ) -> JiraCliResult<()> {
        if self.reject == Some(transition.name.as_str()) {
            return Err(JiraCliError::invalid_param(
                "resolution",
                "Field 'resolution' is required",
            ));
        }
        self.applied
            .lock()
            .unwrap()
            .push((transition.name.clone(), fields));
        *self.state.lock().unwrap() = transition.to.clone();
        Ok(())
    }

    async fn add_comment(&self, _issue_key: &str, body: &str) -> JiraCliResult<()> {
        self.comments.lock().unwrap().push(body.to_string());
        Ok(())
    }
}

/// Software workflow: Backlog -> Selected -> In Progress -> Review -> Done
fn software_workflow() -> WorkflowGraph {
    let mut graph = WorkflowGraph::new("Story");
    graph.add_state("Backlog", vec![Transition::new("1", "Select", "Selected")]);
    graph.add_state(
        "Selected",
        vec![
            Transition::new("2", "Start", "In Progress"),
            Transition::new("9", "Deselect", "Backlog"),
        ],
    );
    graph.add_state(
        "In Progress",
        vec![Transition::new("3", "Request Review", "Review")],
    );
    graph.add_state(
        "Review",
        vec![
            Transition::new("4", "Approve", "Done"),
            Transition::new("5", "Reject", "In Progress"),
        ],
    );
    graph
}

#[tokio::test]
async fn test_smart_transition_follows_graph_path() {
    let graph = software_workflow();
    let planned: Vec<String> = graph
        .path_to("Backlog", "Done")
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();

    let issue = GraphIssue::new(graph, "Backlog");
    let taken = smart_transition(&issue, "STORY-1", "Done", &SmartTransitionOptions::default())
        .await
        .unwrap();

    let taken: Vec<String> = taken.into_iter().map(|t| t.name).collect();
    assert_eq!(taken, planned);
    assert_eq!(issue.state(), "Done");
    assert!(issue.comments.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_resolution_only_on_final_step() {
    let issue = GraphIssue::new(software_workflow(), "In Progress");
    let options = SmartTransitionOptions {
        fields: Some(json!({"resolution": {"name": "Done"}})),
        add_comment: true,
        ..Default::default()
    };
    smart_transition(&issue, "STORY-2", "done", &options)
        .await
        .unwrap();

    let applied = issue.applied.lock().unwrap();
    assert_eq!(applied.len(), 2);
    assert_eq!(applied[0], ("Request Review".to_string(), None));
    assert_eq!(
        applied[1],
        (
            "Approve".to_string(),
            Some(json!({"resolution": {"name": "Done"}}))
        )
    );

    let comments = issue.comments.lock().unwrap();
    assert_eq!(
        comments.as_slice(),
        ["Transitioned from In Progress to Done via: Request Review → Approve"]
    );
}

#[tokio::test]
async fn test_rejected_step_reports_where_it_stopped() {
    let mut issue = GraphIssue::new(software_workflow(), "In Progress");
    issue.reject = Some("Approve");

    let err = smart_transition(&issue, "STORY-3", "Done", &SmartTransitionOptions::default())
        .await
        .unwrap_err();
    assert_matches!(
        &err,
        WorkflowError::TransitionFailed { transition, current_state, .. }
            if transition == "Approve" && current_state == "Review"
    );
    assert_eq!(issue.state(), "Review");

    let converted: JiraCliError = err.into();
    assert_eq!(converted.category(), "workflow");
    assert!(converted.hint().unwrap().contains("jira transition list"));
}

#[tokio::test]
async fn test_unreachable_target() {
    let issue = GraphIssue::new(software_workflow(), "Backlog");
    let err = smart_transition(&issue, "STORY-4", "Cancelled", &SmartTransitionOptions::default())
        .await
        .unwrap_err();
    assert_matches!(err, WorkflowError::PathNotFound { .. } | WorkflowError::StepLimit { .. });
    assert!(issue.applied.lock().unwrap().len() <= SmartTransitionOptions::default().max_steps);
}

#[tokio::test]
async fn test_dry_run_direct_target() {
    let issue = GraphIssue::new(software_workflow(), "Review");
    let options = SmartTransitionOptions {
        dry_run: true,
        ..Default::default()
    };
    let preview = smart_transition(&issue, "STORY-5", "Done", &options)
        .await
        .unwrap();
    assert_eq!(preview, vec![Transition::new("4", "Approve", "Done")]);
    assert_eq!(issue.state(), "Review");
    assert!(issue.applied.lock().unwrap().is_empty());
}

#[test]
fn test_graph_reachability() {
    let graph = software_workflow();
    // Review loops back to itself through In Progress but is not listed
    assert_eq!(graph.reachable_from("Review"), vec!["Done", "In Progress"]);
    assert!(graph.reachable_from("Done").is_empty());
    assert!(graph.all_states().contains(&"Done".to_string()));

    let err = graph.path_to("Done", "Backlog").unwrap_err();
    assert!(err.to_string().starts_with("No path from 'Done' to 'Backlog'"));
}
