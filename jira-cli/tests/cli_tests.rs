/// Command line parsing and output, without a Jira instance
use assert_matches::assert_matches;
use clap::Parser;
use jira_cli::cli::{
    run, Cli, Commands, ComponentCommands, IssueCommands, LinkCommands, SprintCommands,
    TransitionCommands, VersionCommands, WatcherCommands, WeblinkCommands, WorklogCommands,
};
use jira_cli::error::JiraCliError;
use jira_cli::format::{render_error, EntityKind, OutputFormat};
use jira_cli::tools::ToolOutput;
use serde_json::{json, Value};

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("jira").chain(args.iter().copied()))
        .unwrap_or_else(|e| panic!("failed to parse {:?}: {}", args, e))
}

#[test]
fn test_issues_accepts_many_keys() {
    let cli = parse(&["issues", "PROJ-1,PROJ-2", "PROJ-3", "--fields", "summary"]);
    assert_matches!(cli.command, Commands::Issues { keys, fields } => {
        assert_eq!(keys, vec!["PROJ-1,PROJ-2", "PROJ-3"]);
        assert_eq!(fields.as_deref(), Some("summary"));
    });
}

#[test]
fn test_issues_requires_a_key() {
    let err = Cli::try_parse_from(["jira", "issues"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = parse(&["search", "project = PROJ", "--max", "5", "-f", "json", "-v"]);
    assert_eq!(cli.format.as_deref(), Some("json"));
    assert!(cli.verbose);
    assert_matches!(cli.command, Commands::Search { jql, max: Some(5), start: None, .. } => {
        assert_eq!(jql, "project = PROJ");
    });
}

#[test]
fn test_transition_to_options() {
    let cli = parse(&[
        "transition",
        "to",
        "PROJ-7",
        "Done",
        "--dry-run",
        "--max-steps",
        "3",
        "--resolution",
        "Fixed",
    ]);
    assert_matches!(
        cli.command,
        Commands::Transition {
            command: TransitionCommands::To {
                dry_run: true,
                comment: false,
                max_steps: Some(3),
                ref resolution,
                ..
            }
        } if resolution.as_deref() == Some("Fixed")
    );
}

#[test]
fn test_issue_create_defaults_to_task() {
    let cli = parse(&["issue", "create", "PROJ", "Broken build"]);
    assert_matches!(
        cli.command,
        Commands::Issue { command: IssueCommands::Create { issue_type, parent: None, .. } } => {
            assert_eq!(issue_type, "Task");
        }
    );

    let cli = parse(&[
        "issue", "create", "PROJ", "Crash", "--type", "Bug", "--priority", "High", "--labels",
        "crash,ios",
    ]);
    assert_matches!(
        cli.command,
        Commands::Issue { command: IssueCommands::Create { issue_type, fields, .. } } => {
            assert_eq!(issue_type, "Bug");
            assert_eq!(fields.priority.as_deref(), Some("High"));
            assert_eq!(fields.labels.as_deref(), Some("crash,ios"));
        }
    );
}

#[test]
fn test_worklog_and_sprint_commands() {
    let cli = parse(&["worklog", "add", "PROJ-2", "1h 30m", "--comment", "pairing"]);
    assert_matches!(
        cli.command,
        Commands::Worklog { command: WorklogCommands::Add { time, comment, started: None, .. } } => {
            assert_eq!(time, "1h 30m");
            assert_eq!(comment.as_deref(), Some("pairing"));
        }
    );

    let cli = parse(&["sprint", "add", "42", "PROJ-1", "PROJ-2"]);
    assert_matches!(
        cli.command,
        Commands::Sprint { command: SprintCommands::Add { sprint: 42, keys } } => {
            assert_eq!(keys.len(), 2);
        }
    );

    assert!(Cli::try_parse_from(["jira", "sprint", "get", "not-a-number"]).is_err());
}

#[test]
fn test_link_commands() {
    let cli = parse(&["link", "create", "PROJ-1", "PROJ-2", "--type", "Blocks"]);
    assert_matches!(
        cli.command,
        Commands::Link { command: LinkCommands::Create { from, to, link_type, comment: None } } => {
            assert_eq!((from.as_str(), to.as_str()), ("PROJ-1", "PROJ-2"));
            assert_eq!(link_type, "Blocks");
        }
    );
    assert!(Cli::try_parse_from(["jira", "link", "create", "PROJ-1", "PROJ-2"]).is_err());
    assert_matches!(
        parse(&["link", "types"]).command,
        Commands::Link { command: LinkCommands::Types }
    );

    let cli = parse(&["weblink", "add", "PROJ-1", "https://ci.example.com/7", "--title", "Build 7"]);
    assert_matches!(
        cli.command,
        Commands::Weblink { command: WeblinkCommands::Add { key, title: Some(title), .. } } => {
            assert_eq!(key, "PROJ-1");
            assert_eq!(title, "Build 7");
        }
    );

    assert_matches!(
        parse(&["watcher", "remove", "PROJ-1", "sdoe"]).command,
        Commands::Watcher { command: WatcherCommands::Remove { user, .. } } if user == "sdoe"
    );
}

#[test]
fn test_component_and_version_commands() {
    let cli = parse(&["component", "create", "PROJ", "Backend", "--lead", "sdoe"]);
    assert_matches!(
        cli.command,
        Commands::Component { command: ComponentCommands::Create { project, name, lead: Some(lead), description: None } } => {
            assert_eq!((project.as_str(), name.as_str(), lead.as_str()), ("PROJ", "Backend", "sdoe"));
        }
    );

    let cli = parse(&["version", "create", "PROJ", "2.1.0", "--released", "--release-date", "2024-06-30"]);
    assert_matches!(
        cli.command,
        Commands::Version { command: VersionCommands::Create { released: true, release_date: Some(date), .. } } => {
            assert_eq!(date, "2024-06-30");
        }
    );

    let cli = parse(&["version", "update", "10600", "--released", "true"]);
    assert_matches!(
        cli.command,
        Commands::Version { command: VersionCommands::Update { released: Some(true), archived: None, name: None, .. } }
    );

    assert_matches!(parse(&["fields", "--custom"]).command, Commands::Fields { custom: true });
    assert_matches!(parse(&["priorities"]).command, Commands::Priorities);
}

#[tokio::test]
async fn test_run_without_configuration_fails() {
    let cli = parse(&["me", "-f", "json"]);
    let status = run(cli, Err(anyhow::anyhow!("JIRA_URL is not set"))).await;
    assert_eq!(status, 1);
}

#[test]
fn test_render_error_per_format() {
    let err = JiraCliError::not_found("issue", "PROJ-404");

    let ai = render_error(&err, OutputFormat::Ai);
    assert_eq!(
        ai,
        "Error: Not found: issue 'PROJ-404' not found\nHint: Verify that issue 'PROJ-404' exists and is visible to you"
    );

    let parsed: Value = serde_json::from_str(&render_error(&err, OutputFormat::Json)).unwrap();
    assert_eq!(parsed["category"], "not_found");
    assert_eq!(parsed["code"], -32005);
    assert!(parsed["hint"].as_str().unwrap().contains("PROJ-404"));

    let plain = render_error(&JiraCliError::internal("boom"), OutputFormat::Markdown);
    assert_eq!(plain, "Error: Internal error: boom");
}

#[test]
fn test_format_resolution() {
    assert_eq!(
        OutputFormat::resolve(None, OutputFormat::Markdown).unwrap(),
        OutputFormat::Markdown
    );
    assert_eq!(
        OutputFormat::resolve(Some(" "), OutputFormat::Rich).unwrap(),
        OutputFormat::Rich
    );
    assert_eq!(
        OutputFormat::resolve(Some("JSON"), OutputFormat::Ai).unwrap(),
        OutputFormat::Json
    );

    let err = OutputFormat::resolve(Some("yaml"), OutputFormat::Ai).unwrap_err();
    assert_eq!(
        err.hint().as_deref(),
        Some("Valid formats: ai, json, markdown, rich")
    );
}

#[test]
fn test_tool_output_json_is_the_payload() {
    let data = json!({"key": "PROJ-1", "fields": {"summary": "Title", "status": {"name": "Done"}}});
    let output = ToolOutput::new(EntityKind::Issue, data.clone());

    let rendered: Value = serde_json::from_str(&output.render(OutputFormat::Json)).unwrap();
    assert_eq!(rendered, data);
    assert!(output.render(OutputFormat::Ai).contains("PROJ-1"));
}
