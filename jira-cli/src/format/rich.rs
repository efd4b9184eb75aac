//! Terminal rendering with coloured status icons and rounded tables

use super::{
    date, items, link_target, one_line, records, scalar, text_or, truncate, EntityKind, IssueList,
};
use colored::{Color, Colorize};
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;
use tabled::{Table, Tabled};

pub(super) fn render(kind: EntityKind, data: &Value) -> String {
    match kind {
        EntityKind::Issue => issue_panel(data),
        EntityKind::Show => show(data),
        EntityKind::Issues => issues(data),
        EntityKind::Comments => comments(items(data)),
        EntityKind::Transitions => grid(
            &["ID", "Transition", "Target"],
            items(data)
                .iter()
                .map(|t| {
                    vec![
                        scalar(t, "/id"),
                        text_or(t, "/name", "?").bold().to_string(),
                        status_label(text_or(t, "/to", "?")),
                    ]
                })
                .collect(),
            "No transitions available",
        ),
        EntityKind::Worklogs => grid(
            &["ID", "Author", "Time", "Started", "Comment"],
            items(data)
                .iter()
                .map(|w| {
                    vec![
                        scalar(w, "/id"),
                        text_or(w, "/author/displayName", "?").to_string(),
                        text_or(w, "/timeSpent", "?").cyan().to_string(),
                        date(text_or(w, "/started", "?")).to_string(),
                        truncate(&one_line(text_or(w, "/comment", "")), 40),
                    ]
                })
                .collect(),
            "No worklogs",
        ),
        EntityKind::Attachments => grid(
            &["ID", "Filename", "Size", "Type"],
            items(data)
                .iter()
                .map(|a| {
                    vec![
                        scalar(a, "/id"),
                        text_or(a, "/filename", "?").bold().to_string(),
                        human_size(a.get("size").and_then(Value::as_u64).unwrap_or(0)),
                        text_or(a, "/mimeType", "?").dimmed().to_string(),
                    ]
                })
                .collect(),
            "No attachments",
        ),
        EntityKind::Boards => grid(
            &["ID", "Name", "Type"],
            items(data)
                .iter()
                .map(|b| {
                    vec![
                        scalar(b, "/id"),
                        text_or(b, "/name", "?").bold().to_string(),
                        text_or(b, "/type", "?").to_string(),
                    ]
                })
                .collect(),
            "No boards found",
        ),
        EntityKind::Sprints => grid(
            &["ID", "Name", "State", "Start", "End"],
            items(data).iter().map(sprint_row).collect(),
            "No sprints found",
        ),
        EntityKind::Sprint => {
            let mut out = grid(
                &["ID", "Name", "State", "Start", "End"],
                vec![sprint_row(data)],
                "",
            );
            if let Some(goal) = data.get("goal").and_then(Value::as_str).filter(|g| !g.is_empty()) {
                out.push_str(&format!("\n{} {}", "Goal:".bold(), goal));
            }
            out
        }
        EntityKind::User => key_values(
            &format!("👤 {}", text_or(data, "/displayName", "?")),
            data,
        ),
        EntityKind::Links => grid(
            &["ID", "Relationship", "Issue", "Summary", "Status"],
            items(data)
                .iter()
                .map(|link| {
                    let (relation, issue) = link_target(link);
                    vec![
                        scalar(link, "/id"),
                        relation.to_string(),
                        text_or(issue, "/key", "?").cyan().to_string(),
                        truncate(text_or(issue, "/fields/summary", ""), 35),
                        status_label(text_or(issue, "/fields/status/name", "?")),
                    ]
                })
                .collect(),
            "No links found",
        ),
        EntityKind::LinkTypes => grid(
            &["Name", "Outward", "Inward"],
            items(data)
                .iter()
                .map(|t| {
                    vec![
                        text_or(t, "/name", "?").bold().to_string(),
                        text_or(t, "/outward", "?").to_string(),
                        text_or(t, "/inward", "?").to_string(),
                    ]
                })
                .collect(),
            "No link types",
        ),
        EntityKind::WebLinks => grid(
            &["ID", "Title", "URL"],
            items(data)
                .iter()
                .map(|l| {
                    vec![
                        scalar(l, "/id"),
                        text_or(l, "/object/title", "?").bold().to_string(),
                        text_or(l, "/object/url", "?").blue().underline().to_string(),
                    ]
                })
                .collect(),
            "No web links",
        ),
        EntityKind::Watchers => watchers(data),
        EntityKind::Projects => grid(
            &["Key", "Name", "Type"],
            items(data)
                .iter()
                .map(|p| {
                    vec![
                        text_or(p, "/key", "?").cyan().bold().to_string(),
                        text_or(p, "/name", "?").to_string(),
                        text_or(p, "/projectTypeKey", "").dimmed().to_string(),
                    ]
                })
                .collect(),
            "No projects found",
        ),
        EntityKind::Project => {
            let mut rows = vec![
                vec!["Name".bold().to_string(), text_or(data, "/name", "?").to_string()],
                vec![
                    "Lead".bold().to_string(),
                    text_or(data, "/lead/displayName", "Unknown").to_string(),
                ],
                vec![
                    "Type".bold().to_string(),
                    text_or(data, "/projectTypeKey", "").to_string(),
                ],
            ];
            if let Some(description) = data
                .get("description")
                .and_then(Value::as_str)
                .filter(|d| !d.is_empty())
            {
                rows.push(vec![
                    "Description".bold().to_string(),
                    truncate(&one_line(description), 80),
                ]);
            }
            format!(
                "📁 {}\n{}",
                text_or(data, "/key", "?").cyan().bold(),
                grid(&["Field", "Value"], rows, "")
            )
        }
        EntityKind::Components => grid(
            &["ID", "Name", "Description", "Lead"],
            records(data)
                .iter()
                .map(|c| {
                    vec![
                        scalar(c, "/id"),
                        text_or(c, "/name", "?").bold().to_string(),
                        truncate(&one_line(text_or(c, "/description", "")), 40),
                        text_or(c, "/lead/displayName", "").to_string(),
                    ]
                })
                .collect(),
            "No components",
        ),
        EntityKind::Versions => grid(
            &["ID", "Name", "State", "Release Date"],
            records(data).iter().map(version_row).collect(),
            "No versions",
        ),
        EntityKind::Priorities => grid(
            &["Name", "ID"],
            items(data)
                .iter()
                .map(|p| vec![priority_label(text_or(p, "/name", "?")), scalar(p, "/id")])
                .collect(),
            "No priorities",
        ),
        EntityKind::Fields => grid(
            &["ID", "Name", "Type"],
            items(data)
                .iter()
                .map(|f| {
                    let id = text_or(f, "/id", "?");
                    let id = if id.starts_with("customfield_") {
                        id.magenta().to_string()
                    } else {
                        id.to_string()
                    };
                    vec![
                        id,
                        text_or(f, "/name", "?").to_string(),
                        text_or(f, "/schema/type", "-").dimmed().to_string(),
                    ]
                })
                .collect(),
            "No fields",
        ),
        EntityKind::Filters => grid(
            &["ID", "Name", "JQL"],
            records(data)
                .iter()
                .map(|f| {
                    vec![
                        scalar(f, "/id"),
                        text_or(f, "/name", "?").bold().to_string(),
                        truncate(&one_line(text_or(f, "/jql", "")), 60)
                            .as_str()
                            .dimmed()
                            .to_string(),
                    ]
                })
                .collect(),
            "No filters",
        ),
        EntityKind::Result => key_values(&"✓ Done".green().bold().to_string(), data),
    }
}

fn watchers(data: &Value) -> String {
    let watchers = data.get("watchers").map(items).unwrap_or(&[]);
    let count = data
        .get("watchCount")
        .and_then(Value::as_u64)
        .unwrap_or(watchers.len() as u64);
    let rows = watchers
        .iter()
        .map(|w| {
            let user = w
                .get("name")
                .or_else(|| w.get("accountId"))
                .and_then(Value::as_str)
                .unwrap_or("?");
            vec![
                text_or(w, "/displayName", "?").bold().to_string(),
                user.dimmed().to_string(),
            ]
        })
        .collect();
    format!(
        "{}\n{}",
        format!("👁 Watchers ({})", count).as_str().bold(),
        grid(&["Name", "User"], rows, "No visible watchers")
    )
}

fn version_row(v: &Value) -> Vec<String> {
    let state = if v.get("released").and_then(Value::as_bool).unwrap_or(false) {
        "released".green()
    } else if v.get("archived").and_then(Value::as_bool).unwrap_or(false) {
        "archived".dimmed()
    } else {
        "unreleased".yellow()
    };
    vec![
        scalar(v, "/id"),
        text_or(v, "/name", "?").bold().to_string(),
        state.to_string(),
        text_or(v, "/releaseDate", "-").to_string(),
    ]
}

pub(super) fn render_error(message: &str, hint: Option<&str>) -> String {
    let mut out = format!("{} {}", "✗".red().bold(), message.red());
    if let Some(hint) = hint {
        out.push_str(&format!("\n  {} {}", "Hint:".yellow().bold(), hint));
    }
    out
}

// -------------------------------------------------------------------------
// Icons
// -------------------------------------------------------------------------

fn type_icon(type_name: &str) -> &'static str {
    match type_name.to_lowercase().as_str() {
        "bug" | "defect" | "problem" => "🐛",
        "task" => "☑️",
        "technical task" => "🔧",
        "story" | "user story" => "📗",
        "feature" | "new feature" => "✨",
        "epic" => "⚡",
        "sub-task" | "subtask" => "📎",
        "improvement" | "enhancement" => "💡",
        "spike" | "research" | "analysis" => "🔬",
        "investigation" => "🔍",
        "release" | "deployment" => "🚀",
        "documentation" => "📝",
        "support" => "🎧",
        "question" => "❓",
        "incident" => "🚨",
        _ => "•",
    }
}

fn status_label(status: &str) -> String {
    let (icon, color) = match status.to_lowercase().as_str() {
        "done" | "closed" | "resolved" | "released" | "ready for deployment" => {
            ("✓", Some(Color::Green))
        }
        "in progress" | "in review" | "development" => ("►", Some(Color::Yellow)),
        "review" | "code review" => ("◎", Some(Color::Yellow)),
        "waiting" | "waiting for qa" | "awaiting approval" => ("◦", Some(Color::Yellow)),
        "blocked" => ("✗", Some(Color::Red)),
        "to do" | "open" | "new" | "reopened" => ("○", Some(Color::Cyan)),
        "backlog" => ("·", None),
        _ => ("•", None),
    };
    match color {
        Some(color) => format!("{} {}", icon.color(color), status.color(color)),
        None => format!("{} {}", icon.dimmed(), status.dimmed()),
    }
}

fn priority_label(priority: &str) -> String {
    let (marker, color) = match priority.to_lowercase().as_str() {
        "blocker" | "critical" => ("▲▲", Some(Color::Red)),
        "highest" => ("▲", Some(Color::Red)),
        "high" => ("▲", Some(Color::Yellow)),
        "medium" => ("─", None),
        "low" => ("▼", None),
        "lowest" => ("▼▼", None),
        _ => return priority.to_string(),
    };
    let label = format!("{} {}", marker, priority);
    match color {
        Some(color) => label.as_str().color(color).to_string(),
        None => label.as_str().dimmed().to_string(),
    }
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit])
    }
}

// -------------------------------------------------------------------------
// Tables
// -------------------------------------------------------------------------

#[derive(Tabled)]
struct IssueRow {
    #[tabled(rename = "")]
    icon: String,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Summary")]
    summary: String,
}

impl From<&Value> for IssueRow {
    fn from(issue: &Value) -> Self {
        Self {
            icon: type_icon(text_or(issue, "/fields/issuetype/name", "")).to_string(),
            key: text_or(issue, "/key", "?").cyan().bold().to_string(),
            status: status_label(text_or(issue, "/fields/status/name", "?")),
            priority: priority_label(text_or(issue, "/fields/priority/name", "")),
            summary: truncate(text_or(issue, "/fields/summary", "?"), 60),
        }
    }
}

fn grid(headers: &[&str], rows: Vec<Vec<String>>, empty: &str) -> String {
    if rows.is_empty() {
        return empty.dimmed().to_string();
    }
    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(|h| h.to_string()));
    for row in rows {
        builder.push_record(row);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

fn key_values(title: &str, data: &Value) -> String {
    let rows: Vec<Vec<String>> = data
        .as_object()
        .map(|fields| {
            fields
                .iter()
                .filter_map(|(key, value)| {
                    let text = match value {
                        Value::String(s) => s.clone(),
                        Value::Null | Value::Object(_) => return None,
                        Value::Array(values) => values
                            .iter()
                            .map(|v| {
                                v.get("name")
                                    .and_then(Value::as_str)
                                    .or(v.as_str())
                                    .map(str::to_string)
                                    .unwrap_or_else(|| v.to_string())
                            })
                            .collect::<Vec<_>>()
                            .join(" → "),
                        other => other.to_string(),
                    };
                    Some(vec![key.bold().to_string(), text])
                })
                .collect()
        })
        .unwrap_or_default();

    format!("{}\n{}", title, grid(&["Field", "Value"], rows, ""))
}

fn sprint_row(s: &Value) -> Vec<String> {
    let state = text_or(s, "/state", "?");
    let state = match state {
        "active" => state.green().bold(),
        "future" => state.cyan(),
        _ => state.dimmed(),
    };
    vec![
        scalar(s, "/id"),
        text_or(s, "/name", "?").bold().to_string(),
        state.to_string(),
        date(text_or(s, "/startDate", "-")).to_string(),
        date(text_or(s, "/endDate", "-")).to_string(),
    ]
}

fn issue_panel(issue: &Value) -> String {
    let type_name = text_or(issue, "/fields/issuetype/name", "?");
    let title = format!(
        "{}  {}  {}",
        type_icon(type_name),
        text_or(issue, "/key", "?").cyan().bold(),
        type_name.dimmed()
    );

    let mut rows = vec![
        vec![
            "Summary".bold().to_string(),
            text_or(issue, "/fields/summary", "?").to_string(),
        ],
        vec![
            "Status".bold().to_string(),
            status_label(text_or(issue, "/fields/status/name", "?")),
        ],
        vec![
            "Priority".bold().to_string(),
            priority_label(text_or(issue, "/fields/priority/name", "?")),
        ],
    ];
    for (label, pointer) in [
        ("Assignee", "/fields/assignee/displayName"),
        ("Reporter", "/fields/reporter/displayName"),
        ("Created", "/fields/created"),
        ("Updated", "/fields/updated"),
    ] {
        if let Some(value) = issue.pointer(pointer).and_then(Value::as_str) {
            let value = if label == "Created" || label == "Updated" {
                date(value)
            } else {
                value
            };
            rows.push(vec![label.bold().to_string(), value.to_string()]);
        }
    }
    if let Some(labels) = issue.pointer("/fields/labels").and_then(Value::as_array) {
        if !labels.is_empty() {
            let labels: Vec<&str> = labels.iter().filter_map(Value::as_str).take(5).collect();
            rows.push(vec![
                "Labels".bold().to_string(),
                labels.join(", ").as_str().magenta().to_string(),
            ]);
        }
    }

    let mut out = format!("{}\n{}", title, grid(&["Field", "Value"], rows, ""));
    if let Some(description) = issue
        .pointer("/fields/description")
        .and_then(Value::as_str)
        .filter(|d| !d.is_empty())
    {
        out.push_str(&format!(
            "\n\n{}\n{}",
            "Description".bold().dimmed(),
            truncate(description, 500).as_str().dimmed()
        ));
    }
    out
}

fn comments(comments: &[Value]) -> String {
    if comments.is_empty() {
        return "No comments".dimmed().to_string();
    }
    comments
        .iter()
        .map(|c| {
            format!(
                "{} {}\n  {}",
                text_or(c, "/author/displayName", "?").bold(),
                date(text_or(c, "/created", "")).dimmed(),
                truncate(text_or(c, "/body", ""), 500).replace('\n', "\n  ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn show(data: &Value) -> String {
    let empty = Value::Null;
    let comment_list = data.get("comments").map(items).unwrap_or(&[]);
    format!(
        "{}\n\n{}\n{}",
        issue_panel(data.get("issue").unwrap_or(&empty)),
        format!("💬 Comments ({})", comment_list.len()).as_str().bold(),
        comments(comment_list)
    )
}

fn issues(data: &Value) -> String {
    let list = IssueList::from_value(data);
    let mut out = if list.issues.is_empty() {
        "No issues found".dimmed().to_string()
    } else {
        let rows: Vec<IssueRow> = list.issues.iter().map(IssueRow::from).collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        let count = match list.total {
            Some(total) if total as usize > list.issues.len() => {
                format!("{} of {} issues", list.issues.len(), total)
            }
            _ => format!("{} issues", list.issues.len()),
        };
        format!("{}\n{}", table, count.as_str().dimmed())
    };

    if !list.missing.is_empty() {
        out.push_str(&format!(
            "\n{} {}",
            "✗ Missing:".red().bold(),
            list.missing_text()
        ));
    }
    if let Some(warning) = list.warning {
        out.push_str(&format!("\n{} {}", "⚠".yellow(), warning.yellow()));
    }
    out
}
