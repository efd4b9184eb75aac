//! The `jira` command line
//!
//! Every command maps onto one of the shared tools, so the CLI and the MCP
//! server return the same payloads. Rendered output goes to stdout; errors
//! are rendered in the selected format to stderr with exit status 1.

use crate::config::JiraConfig;
use crate::error::{JiraCliError, JiraCliResult};
use crate::format::{render_error, OutputFormat};
use crate::jira_client::JiraClient;
use crate::tools::*;
use clap::{Args, Parser, Subcommand};
use std::sync::Arc;
use tracing::{debug, error};

#[derive(Debug, Parser)]
#[command(name = "jira")]
#[command(author, version, about = "Jira from the command line, for people and agents", long_about = None)]
pub struct Cli {
    /// Output format: ai, json, markdown, rich (default: JIRA_FORMAT or ai)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<String>,

    /// Log debug output to stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Single issue commands
    Issue {
        #[command(subcommand)]
        command: IssueCommands,
    },
    /// Fetch several issues at once (comma and/or space separated keys)
    Issues {
        /// Issue keys, e.g. PROJ-1,PROJ-2 or PROJ-1 PROJ-2
        #[arg(required = true, num_args = 1..)]
        keys: Vec<String>,
        /// Comma-separated fields to return
        #[arg(long)]
        fields: Option<String>,
    },
    /// Search issues with JQL
    Search {
        /// JQL query
        jql: String,
        /// Maximum results
        #[arg(long)]
        max: Option<u32>,
        /// Offset of the first result
        #[arg(long)]
        start: Option<u32>,
        /// Comma-separated fields to return
        #[arg(long)]
        fields: Option<String>,
    },
    /// Comment commands
    Comment {
        #[command(subcommand)]
        command: CommentCommands,
    },
    /// Workflow transition commands
    Transition {
        #[command(subcommand)]
        command: TransitionCommands,
    },
    /// Worklog commands
    Worklog {
        #[command(subcommand)]
        command: WorklogCommands,
    },
    /// Attachment commands
    Attachment {
        #[command(subcommand)]
        command: AttachmentCommands,
    },
    /// Board commands
    Board {
        #[command(subcommand)]
        command: BoardCommands,
    },
    /// Sprint commands
    Sprint {
        #[command(subcommand)]
        command: SprintCommands,
    },
    /// Issue link commands
    Link {
        #[command(subcommand)]
        command: LinkCommands,
    },
    /// Web link commands
    Weblink {
        #[command(subcommand)]
        command: WeblinkCommands,
    },
    /// Watcher commands
    Watcher {
        #[command(subcommand)]
        command: WatcherCommands,
    },
    /// Project commands
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },
    /// Project component commands
    Component {
        #[command(subcommand)]
        command: ComponentCommands,
    },
    /// Project version commands
    Version {
        #[command(subcommand)]
        command: VersionCommands,
    },
    /// Saved filter commands
    Filter {
        #[command(subcommand)]
        command: FilterCommands,
    },
    /// List issue priorities
    Priorities,
    /// List fields, e.g. to find a custom field ID
    Fields {
        /// Only custom fields
        #[arg(long)]
        custom: bool,
    },
    /// Show the authenticated user
    Me,
}

#[derive(Debug, Subcommand)]
pub enum IssueCommands {
    /// Get an issue
    Get {
        /// Issue key
        key: String,
        /// Comma-separated fields to return
        #[arg(long)]
        fields: Option<String>,
        /// Comma-separated expansions, e.g. changelog
        #[arg(long)]
        expand: Option<String>,
    },
    /// Show an issue with its recent comments
    Show {
        /// Issue key
        key: String,
    },
    /// Create an issue
    Create {
        /// Project key
        project: String,
        /// Issue summary
        summary: String,
        /// Issue type: Story, Bug, Task, ...
        #[arg(long = "type", default_value = "Task")]
        issue_type: String,
        /// Parent issue key (for subtasks)
        #[arg(long)]
        parent: Option<String>,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Update issue fields
    Update {
        /// Issue key
        key: String,
        /// New summary
        #[arg(long)]
        summary: Option<String>,
        #[command(flatten)]
        fields: FieldArgs,
    },
    /// Delete an issue permanently
    Delete {
        /// Issue key
        key: String,
    },
}

/// Field options shared by `issue create` and `issue update`
#[derive(Debug, Clone, Default, Args)]
pub struct FieldArgs {
    /// Issue description
    #[arg(long)]
    pub description: Option<String>,
    /// Priority: Highest, High, Medium, Low, Lowest
    #[arg(long)]
    pub priority: Option<String>,
    /// Comma-separated labels (replaces existing on update)
    #[arg(long)]
    pub labels: Option<String>,
    /// Username or email of the assignee
    #[arg(long)]
    pub assignee: Option<String>,
    /// Custom fields as JSON, e.g. '{"customfield_10480": 3}'
    #[arg(long)]
    pub custom: Option<String>,
}

impl From<FieldArgs> for IssueFieldParams {
    fn from(args: FieldArgs) -> Self {
        Self {
            description: args.description,
            priority: args.priority,
            labels: args.labels,
            assignee: args.assignee,
            custom: args.custom,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CommentCommands {
    /// List comments, newest first
    List {
        /// Issue key
        key: String,
        /// Maximum comments to return (1-100)
        #[arg(long, default_value_t = DEFAULT_COMMENT_LIMIT)]
        limit: usize,
    },
    /// Add a comment
    Add {
        /// Issue key
        key: String,
        /// Comment text
        text: String,
    },
    /// Delete a comment
    Delete {
        /// Issue key
        key: String,
        /// Comment ID
        id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum TransitionCommands {
    /// List the transitions available from the current state
    List {
        /// Issue key
        key: String,
    },
    /// Move an issue to a target state, through intermediate states if needed
    To {
        /// Issue key
        key: String,
        /// Target state, transition name or ID
        target: String,
        /// Comment on the issue with the path taken
        #[arg(long)]
        comment: bool,
        /// Show the transition that would be taken without changing anything
        #[arg(long)]
        dry_run: bool,
        /// Maximum number of transitions to take
        #[arg(long)]
        max_steps: Option<usize>,
        /// Resolution to set on the final transition
        #[arg(long)]
        resolution: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum WorklogCommands {
    /// List worklogs of an issue
    List {
        /// Issue key
        key: String,
    },
    /// Log time on an issue
    Add {
        /// Issue key
        key: String,
        /// Time spent, e.g. 2h, 30m, "1d 4h"
        time: String,
        /// Worklog comment
        #[arg(long)]
        comment: Option<String>,
        /// Start time (RFC 3339); defaults to now
        #[arg(long)]
        started: Option<String>,
    },
    /// Get one worklog
    Get {
        /// Issue key
        key: String,
        /// Worklog ID
        id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum AttachmentCommands {
    /// List attachments of an issue
    List {
        /// Issue key
        key: String,
    },
    /// Upload a file to an issue
    Upload {
        /// Issue key
        key: String,
        /// File to upload
        path: String,
    },
    /// Delete an attachment
    Delete {
        /// Attachment ID
        id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum BoardCommands {
    /// List boards
    List {
        /// Only boards of this project
        #[arg(long)]
        project: Option<String>,
        /// Board type: scrum or kanban
        #[arg(long = "type")]
        board_type: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum SprintCommands {
    /// List sprints of a board
    List {
        /// Board ID
        board: u64,
        /// Comma-separated states: active, future, closed
        #[arg(long)]
        state: Option<String>,
    },
    /// Get a sprint
    Get {
        /// Sprint ID
        id: u64,
    },
    /// Show the active sprint of a project
    Active {
        /// Project key
        project: String,
    },
    /// Move issues into a sprint
    Add {
        /// Sprint ID
        sprint: u64,
        /// Issue keys
        #[arg(required = true, num_args = 1..)]
        keys: Vec<String>,
    },
    /// Move issues to the backlog
    Backlog {
        /// Issue keys
        #[arg(required = true, num_args = 1..)]
        keys: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum LinkCommands {
    /// List the links of an issue
    List {
        /// Issue key
        key: String,
    },
    /// List the link types of the instance
    Types,
    /// Link two issues: FROM <outward> TO, e.g. PROJ-1 blocks PROJ-2
    Create {
        /// Outward issue key
        from: String,
        /// Inward issue key
        to: String,
        /// Link type name, e.g. Blocks, Relates
        #[arg(long = "type")]
        link_type: String,
        /// Comment added with the link
        #[arg(long)]
        comment: Option<String>,
    },
    /// Delete an issue link
    Delete {
        /// Link ID
        id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum WeblinkCommands {
    /// List web links of an issue
    List {
        /// Issue key
        key: String,
    },
    /// Add a web link to an issue
    Add {
        /// Issue key
        key: String,
        /// URL
        url: String,
        /// Title (defaults to the URL)
        #[arg(long)]
        title: Option<String>,
    },
    /// Remove a web link
    Delete {
        /// Issue key
        key: String,
        /// Web link ID
        id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum WatcherCommands {
    /// List watchers of an issue
    List {
        /// Issue key
        key: String,
    },
    /// Add a watcher
    Add {
        /// Issue key
        key: String,
        /// Username (Server) or account ID (Cloud)
        user: String,
    },
    /// Remove a watcher
    Remove {
        /// Issue key
        key: String,
        /// Username (Server) or account ID (Cloud)
        user: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ProjectCommands {
    /// List visible projects
    List,
    /// Get a project
    Get {
        /// Project key
        key: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ComponentCommands {
    /// List components of a project
    List {
        /// Project key
        project: String,
    },
    /// Get a component
    Get {
        /// Component ID
        id: String,
    },
    /// Create a component
    Create {
        /// Project key
        project: String,
        /// Component name
        name: String,
        /// Description
        #[arg(long)]
        description: Option<String>,
        /// Component lead
        #[arg(long)]
        lead: Option<String>,
    },
    /// Delete a component
    Delete {
        /// Component ID
        id: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum VersionCommands {
    /// List versions of a project
    List {
        /// Project key
        project: String,
    },
    /// Get a version
    Get {
        /// Version ID
        id: String,
    },
    /// Create a version
    Create {
        /// Project key
        project: String,
        /// Version name
        name: String,
        /// Description
        #[arg(long)]
        description: Option<String>,
        /// Mark released
        #[arg(long)]
        released: bool,
        /// Release date, YYYY-MM-DD
        #[arg(long)]
        release_date: Option<String>,
    },
    /// Update a version
    Update {
        /// Version ID
        id: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        /// New description
        #[arg(long)]
        description: Option<String>,
        /// Released flag: true or false
        #[arg(long)]
        released: Option<bool>,
        /// Archived flag: true or false
        #[arg(long)]
        archived: Option<bool>,
        /// Release date, YYYY-MM-DD
        #[arg(long)]
        release_date: Option<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum FilterCommands {
    /// List favourite filters
    List,
    /// Get a saved filter
    Get {
        /// Filter ID
        id: String,
    },
}

/// Expand `PROJ-1,PROJ-2 PROJ-3` style arguments into single keys
fn key_list(keys: Vec<String>) -> Vec<String> {
    keys.iter().flat_map(|k| split_list(k)).collect()
}

/// Run one command against Jira
pub async fn execute(command: Commands, client: Arc<JiraClient>) -> JiraCliResult<ToolOutput> {
    match command {
        Commands::Issue { command } => match command {
            IssueCommands::Get { key, fields, expand } => {
                GetIssueTool::new(client)
                    .execute(GetIssueParams {
                        issue_key: key,
                        fields,
                        expand,
                        format: None,
                    })
                    .await
            }
            IssueCommands::Show { key } => {
                ShowIssueTool::new(client)
                    .execute(ShowIssueParams {
                        issue_key: key,
                        format: None,
                    })
                    .await
            }
            IssueCommands::Create {
                project,
                summary,
                issue_type,
                parent,
                fields,
            } => {
                CreateIssueTool::new(client)
                    .execute(CreateIssueParams {
                        project_key: project,
                        summary,
                        issue_type: Some(issue_type),
                        parent,
                        fields: fields.into(),
                        format: None,
                    })
                    .await
            }
            IssueCommands::Update {
                key,
                summary,
                fields,
            } => {
                UpdateIssueTool::new(client)
                    .execute(UpdateIssueParams {
                        issue_key: key,
                        summary,
                        fields: fields.into(),
                        format: None,
                    })
                    .await
            }
            IssueCommands::Delete { key } => {
                DeleteIssueTool::new(client)
                    .execute(DeleteIssueParams {
                        issue_key: key,
                        format: None,
                    })
                    .await
            }
        },
        Commands::Issues { keys, fields } => {
            GetIssuesTool::new(client)
                .execute(GetIssuesParams {
                    issue_keys: keys.join(" "),
                    fields,
                    format: None,
                })
                .await
        }
        Commands::Search {
            jql,
            max,
            start,
            fields,
        } => {
            SearchIssuesTool::new(client)
                .execute(SearchIssuesParams {
                    jql,
                    max_results: max,
                    start_at: start,
                    fields,
                    format: None,
                })
                .await
        }
        Commands::Comment { command } => match command {
            CommentCommands::List { key, limit } => {
                ListCommentsTool::new(client)
                    .execute(ListCommentsParams {
                        issue_key: key,
                        limit: Some(limit),
                        format: None,
                    })
                    .await
            }
            CommentCommands::Add { key, text } => {
                AddCommentTool::new(client)
                    .execute(AddCommentParams {
                        issue_key: key,
                        body: text,
                        format: None,
                    })
                    .await
            }
            CommentCommands::Delete { key, id } => {
                DeleteCommentTool::new(client)
                    .execute(DeleteCommentParams {
                        issue_key: key,
                        comment_id: id,
                        format: None,
                    })
                    .await
            }
        },
        Commands::Transition { command } => match command {
            TransitionCommands::List { key } => {
                ListTransitionsTool::new(client)
                    .execute(ListTransitionsParams {
                        issue_key: key,
                        format: None,
                    })
                    .await
            }
            TransitionCommands::To {
                key,
                target,
                comment,
                dry_run,
                max_steps,
                resolution,
            } => {
                TransitionIssueTool::new(client)
                    .execute(TransitionIssueParams {
                        issue_key: key,
                        target,
                        comment,
                        dry_run,
                        max_steps,
                        resolution,
                        format: None,
                    })
                    .await
            }
        },
        Commands::Worklog { command } => match command {
            WorklogCommands::List { key } => {
                ListWorklogsTool::new(client)
                    .execute(ListWorklogsParams {
                        issue_key: key,
                        format: None,
                    })
                    .await
            }
            WorklogCommands::Add {
                key,
                time,
                comment,
                started,
            } => {
                AddWorklogTool::new(client)
                    .execute(AddWorklogParams {
                        issue_key: key,
                        time_spent: time,
                        comment,
                        started,
                        format: None,
                    })
                    .await
            }
            WorklogCommands::Get { key, id } => {
                GetWorklogTool::new(client)
                    .execute(GetWorklogParams {
                        issue_key: key,
                        worklog_id: id,
                        format: None,
                    })
                    .await
            }
        },
        Commands::Attachment { command } => match command {
            AttachmentCommands::List { key } => {
                ListAttachmentsTool::new(client)
                    .execute(ListAttachmentsParams {
                        issue_key: key,
                        format: None,
                    })
                    .await
            }
            AttachmentCommands::Upload { key, path } => {
                UploadAttachmentTool::new(client)
                    .execute(UploadAttachmentParams {
                        issue_key: key,
                        file_path: path,
                        format: None,
                    })
                    .await
            }
            AttachmentCommands::Delete { id } => {
                DeleteAttachmentTool::new(client)
                    .execute(DeleteAttachmentParams {
                        attachment_id: id,
                        format: None,
                    })
                    .await
            }
        },
        Commands::Board { command } => match command {
            BoardCommands::List {
                project,
                board_type,
            } => {
                ListBoardsTool::new(client)
                    .execute(ListBoardsParams {
                        project_key: project,
                        board_type,
                        format: None,
                    })
                    .await
            }
        },
        Commands::Sprint { command } => match command {
            SprintCommands::List { board, state } => {
                ListSprintsTool::new(client)
                    .execute(ListSprintsParams {
                        board_id: board,
                        state,
                        format: None,
                    })
                    .await
            }
            SprintCommands::Get { id } => {
                GetSprintTool::new(client)
                    .execute(GetSprintParams {
                        sprint_id: id,
                        format: None,
                    })
                    .await
            }
            SprintCommands::Active { project } => {
                ActiveSprintTool::new(client)
                    .execute(ActiveSprintParams {
                        project_key: project,
                        format: None,
                    })
                    .await
            }
            SprintCommands::Add { sprint, keys } => {
                MoveToSprintTool::new(client)
                    .execute(MoveToSprintParams {
                        sprint_id: sprint,
                        issue_keys: key_list(keys),
                        format: None,
                    })
                    .await
            }
            SprintCommands::Backlog { keys } => {
                MoveToBacklogTool::new(client)
                    .execute(MoveToBacklogParams {
                        issue_keys: key_list(keys),
                        format: None,
                    })
                    .await
            }
        },
        Commands::Link { command } => match command {
            LinkCommands::List { key } => {
                ListLinksTool::new(client)
                    .execute(ListLinksParams {
                        issue_key: key,
                        format: None,
                    })
                    .await
            }
            LinkCommands::Types => {
                ListLinkTypesTool::new(client)
                    .execute(ListLinkTypesParams::default())
                    .await
            }
            LinkCommands::Create {
                from,
                to,
                link_type,
                comment,
            } => {
                LinkIssuesTool::new(client)
                    .execute(LinkIssuesParams {
                        from_issue_key: from,
                        to_issue_key: to,
                        link_type,
                        comment,
                        format: None,
                    })
                    .await
            }
            LinkCommands::Delete { id } => {
                DeleteLinkTool::new(client)
                    .execute(DeleteLinkParams {
                        link_id: id,
                        format: None,
                    })
                    .await
            }
        },
        Commands::Weblink { command } => match command {
            WeblinkCommands::List { key } => {
                ListWebLinksTool::new(client)
                    .execute(ListWebLinksParams {
                        issue_key: key,
                        format: None,
                    })
                    .await
            }
            WeblinkCommands::Add { key, url, title } => {
                AddWebLinkTool::new(client)
                    .execute(AddWebLinkParams {
                        issue_key: key,
                        url,
                        title,
                        format: None,
                    })
                    .await
            }
            WeblinkCommands::Delete { key, id } => {
                DeleteWebLinkTool::new(client)
                    .execute(DeleteWebLinkParams {
                        issue_key: key,
                        link_id: id,
                        format: None,
                    })
                    .await
            }
        },
        Commands::Watcher { command } => match command {
            WatcherCommands::List { key } => {
                ListWatchersTool::new(client)
                    .execute(ListWatchersParams {
                        issue_key: key,
                        format: None,
                    })
                    .await
            }
            WatcherCommands::Add { key, user } => {
                AddWatcherTool::new(client)
                    .execute(WatcherParams {
                        issue_key: key,
                        user,
                        format: None,
                    })
                    .await
            }
            WatcherCommands::Remove { key, user } => {
                RemoveWatcherTool::new(client)
                    .execute(WatcherParams {
                        issue_key: key,
                        user,
                        format: None,
                    })
                    .await
            }
        },
        Commands::Project { command } => match command {
            ProjectCommands::List => {
                ListProjectsTool::new(client)
                    .execute(ListProjectsParams::default())
                    .await
            }
            ProjectCommands::Get { key } => {
                GetProjectTool::new(client)
                    .execute(ProjectParams {
                        project_key: key,
                        format: None,
                    })
                    .await
            }
        },
        Commands::Component { command } => match command {
            ComponentCommands::List { project } => {
                ListComponentsTool::new(client)
                    .execute(ProjectParams {
                        project_key: project,
                        format: None,
                    })
                    .await
            }
            ComponentCommands::Get { id } => {
                GetComponentTool::new(client)
                    .execute(ComponentParams {
                        component_id: id,
                        format: None,
                    })
                    .await
            }
            ComponentCommands::Create {
                project,
                name,
                description,
                lead,
            } => {
                CreateComponentTool::new(client)
                    .execute(CreateComponentParams {
                        project_key: project,
                        name,
                        description,
                        lead,
                        format: None,
                    })
                    .await
            }
            ComponentCommands::Delete { id } => {
                DeleteComponentTool::new(client)
                    .execute(ComponentParams {
                        component_id: id,
                        format: None,
                    })
                    .await
            }
        },
        Commands::Version { command } => match command {
            VersionCommands::List { project } => {
                ListVersionsTool::new(client)
                    .execute(ProjectParams {
                        project_key: project,
                        format: None,
                    })
                    .await
            }
            VersionCommands::Get { id } => {
                GetVersionTool::new(client)
                    .execute(VersionParams {
                        version_id: id,
                        format: None,
                    })
                    .await
            }
            VersionCommands::Create {
                project,
                name,
                description,
                released,
                release_date,
            } => {
                CreateVersionTool::new(client)
                    .execute(CreateVersionParams {
                        project_key: project,
                        name,
                        description,
                        released,
                        release_date,
                        format: None,
                    })
                    .await
            }
            VersionCommands::Update {
                id,
                name,
                description,
                released,
                archived,
                release_date,
            } => {
                UpdateVersionTool::new(client)
                    .execute(UpdateVersionParams {
                        version_id: id,
                        name,
                        description,
                        released,
                        archived,
                        release_date,
                        format: None,
                    })
                    .await
            }
        },
        Commands::Filter { command } => match command {
            FilterCommands::List => {
                ListFiltersTool::new(client)
                    .execute(ListFiltersParams::default())
                    .await
            }
            FilterCommands::Get { id } => {
                GetFilterTool::new(client)
                    .execute(FilterParams {
                        filter_id: id,
                        format: None,
                    })
                    .await
            }
        },
        Commands::Priorities => {
            ListPrioritiesTool::new(client)
                .execute(ListPrioritiesParams::default())
                .await
        }
        Commands::Fields { custom } => {
            ListFieldsTool::new(client)
                .execute(ListFieldsParams {
                    custom_only: custom,
                    format: None,
                })
                .await
        }
        Commands::Me => {
            CurrentUserTool::new(client)
                .execute(CurrentUserParams::default())
                .await
        }
    }
}

/// Build a client from the loaded configuration
fn connect(config: anyhow::Result<JiraConfig>) -> JiraCliResult<(Arc<JiraClient>, OutputFormat)> {
    let config = config.map_err(|e| JiraCliError::config(format!("{:#}", e)))?;
    let default_format: OutputFormat = config.default_format.parse()?;
    let client = JiraClient::new(Arc::new(config))?;
    Ok((Arc::new(client), default_format))
}

/// Run a parsed command against the loaded configuration and print the
/// result. Returns the process exit status.
pub async fn run(cli: Cli, config: anyhow::Result<JiraConfig>) -> i32 {
    let requested = match OutputFormat::resolve(cli.format.as_deref(), OutputFormat::default()) {
        Ok(format) => cli.format.as_ref().map(|_| format),
        Err(e) => {
            eprintln!("{}", render_error(&e, OutputFormat::default()));
            return 1;
        }
    };

    let (client, default_format) = match connect(config) {
        Ok(connected) => connected,
        Err(e) => {
            error!("Startup failed: {}", e);
            eprintln!("{}", render_error(&e, requested.unwrap_or_default()));
            return 1;
        }
    };
    let format = requested.unwrap_or(default_format);
    debug!("Rendering output as {}", format);

    match execute(cli.command, client).await {
        Ok(output) => {
            println!("{}", output.render(format));
            0
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", render_error(&e, format));
            1
        }
    }
}
