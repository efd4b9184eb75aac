//! Markdown rendering: headings and pipe tables

use super::{
    date, items, link_target, one_line, records, scalar, text_or, truncate, EntityKind, IssueList,
};
use serde_json::Value;

pub(super) fn render(kind: EntityKind, data: &Value) -> String {
    match kind {
        EntityKind::Issue => issue(data, false),
        EntityKind::Show => show(data),
        EntityKind::Issues => issues(data),
        EntityKind::Comments => comments(items(data)),
        EntityKind::Transitions => table(
            "Transitions",
            &["ID", "Name", "To"],
            items(data),
            |t| vec![scalar(t, "/id"), scalar(t, "/name"), scalar(t, "/to")],
        ),
        EntityKind::Worklogs => table(
            "Worklogs",
            &["ID", "Author", "Time", "Started"],
            items(data),
            |w| {
                vec![
                    scalar(w, "/id"),
                    text_or(w, "/author/displayName", "?").to_string(),
                    scalar(w, "/timeSpent"),
                    date(text_or(w, "/started", "?")).to_string(),
                ]
            },
        ),
        EntityKind::Attachments => table(
            "Attachments",
            &["ID", "Filename", "Size", "Type"],
            items(data),
            |a| {
                vec![
                    scalar(a, "/id"),
                    scalar(a, "/filename"),
                    scalar(a, "/size"),
                    scalar(a, "/mimeType"),
                ]
            },
        ),
        EntityKind::Boards => table(
            "Jira Boards",
            &["ID", "Name", "Type"],
            items(data),
            |b| vec![scalar(b, "/id"), scalar(b, "/name"), scalar(b, "/type")],
        ),
        EntityKind::Sprints => table("Sprints", &["ID", "Name", "State", "Start", "End"], items(data), sprint_row),
        EntityKind::Sprint => table(
            text_or(data, "/name", "Sprint"),
            &["ID", "Name", "State", "Start", "End"],
            std::slice::from_ref(data),
            sprint_row,
        ),
        EntityKind::User => key_values(
            text_or(data, "/displayName", "User"),
            data,
        ),
        EntityKind::Links => table(
            "Issue Links",
            &["ID", "Relationship", "Issue", "Summary", "Status"],
            items(data),
            |link| {
                let (relation, issue) = link_target(link);
                vec![
                    scalar(link, "/id"),
                    relation.to_string(),
                    scalar(issue, "/key"),
                    truncate(text_or(issue, "/fields/summary", ""), 40),
                    text_or(issue, "/fields/status/name", "?").to_string(),
                ]
            },
        ),
        EntityKind::LinkTypes => table(
            "Link Types",
            &["Name", "Outward", "Inward"],
            items(data),
            |t| vec![scalar(t, "/name"), scalar(t, "/outward"), scalar(t, "/inward")],
        ),
        EntityKind::WebLinks => table(
            "Web Links",
            &["ID", "Title", "URL"],
            items(data),
            |l| {
                vec![
                    scalar(l, "/id"),
                    scalar(l, "/object/title"),
                    scalar(l, "/object/url"),
                ]
            },
        ),
        EntityKind::Watchers => {
            let watchers = data.get("watchers").map(items).unwrap_or(&[]);
            let count = data
                .get("watchCount")
                .and_then(Value::as_u64)
                .unwrap_or(watchers.len() as u64);
            table(
                &format!("Watchers ({})", count),
                &["Name", "User"],
                watchers,
                |w| {
                    let user = w
                        .get("name")
                        .or_else(|| w.get("accountId"))
                        .and_then(Value::as_str)
                        .unwrap_or("?");
                    vec![scalar(w, "/displayName"), user.to_string()]
                },
            )
        }
        EntityKind::Projects => table(
            "Jira Projects",
            &["Key", "Name", "Type"],
            items(data),
            |p| {
                vec![
                    scalar(p, "/key"),
                    scalar(p, "/name"),
                    text_or(p, "/projectTypeKey", "").to_string(),
                ]
            },
        ),
        EntityKind::Project => project(data),
        EntityKind::Components => table(
            "Components",
            &["ID", "Name", "Description", "Lead"],
            records(data),
            |c| {
                vec![
                    scalar(c, "/id"),
                    scalar(c, "/name"),
                    text_or(c, "/description", "").to_string(),
                    text_or(c, "/lead/displayName", "").to_string(),
                ]
            },
        ),
        EntityKind::Versions => table(
            "Versions",
            &["ID", "Name", "Released", "Release Date"],
            records(data),
            |v| {
                let released = v.get("released").and_then(Value::as_bool).unwrap_or(false);
                vec![
                    scalar(v, "/id"),
                    scalar(v, "/name"),
                    if released { "yes" } else { "no" }.to_string(),
                    text_or(v, "/releaseDate", "-").to_string(),
                ]
            },
        ),
        EntityKind::Priorities => table(
            "Priorities",
            &["Name", "ID"],
            items(data),
            |p| vec![scalar(p, "/name"), scalar(p, "/id")],
        ),
        EntityKind::Fields => table(
            "Fields",
            &["ID", "Name", "Type", "Custom"],
            items(data),
            |f| {
                vec![
                    scalar(f, "/id"),
                    scalar(f, "/name"),
                    text_or(f, "/schema/type", "-").to_string(),
                    scalar(f, "/custom"),
                ]
            },
        ),
        EntityKind::Filters => table(
            "Filters",
            &["ID", "Name", "JQL"],
            records(data),
            |f| vec![scalar(f, "/id"), scalar(f, "/name"), scalar(f, "/jql")],
        ),
        EntityKind::Result => key_values("Result", data),
    }
}

fn project(data: &Value) -> String {
    let mut lines = vec![
        format!(
            "## {}: {}",
            text_or(data, "/key", "?"),
            text_or(data, "/name", "?")
        ),
        String::new(),
        "| Field | Value |".to_string(),
        "|-------|-------|".to_string(),
        format!("| Lead | {} |", cell(text_or(data, "/lead/displayName", "Unknown"))),
        format!("| Type | {} |", text_or(data, "/projectTypeKey", "")),
    ];
    if let Some(description) = data
        .get("description")
        .and_then(Value::as_str)
        .filter(|d| !d.is_empty())
    {
        lines.extend([String::new(), description.to_string()]);
    }
    lines.join("\n")
}

fn cell(s: &str) -> String {
    one_line(s).replace('|', "\\|")
}

fn table<F>(title: &str, headers: &[&str], rows: &[Value], row: F) -> String
where
    F: Fn(&Value) -> Vec<String>,
{
    if rows.is_empty() {
        return format!("## {}\n\n*None*", title);
    }
    let mut lines = vec![
        format!("## {}", title),
        String::new(),
        format!("| {} |", headers.join(" | ")),
        format!(
            "|{}|",
            headers
                .iter()
                .map(|h| "-".repeat(h.len() + 2))
                .collect::<Vec<_>>()
                .join("|")
        ),
    ];
    for value in rows {
        let cells: Vec<String> = row(value).iter().map(|c| cell(c)).collect();
        lines.push(format!("| {} |", cells.join(" | ")));
    }
    lines.join("\n")
}

fn sprint_row(s: &Value) -> Vec<String> {
    vec![
        scalar(s, "/id"),
        scalar(s, "/name"),
        scalar(s, "/state"),
        date(text_or(s, "/startDate", "-")).to_string(),
        date(text_or(s, "/endDate", "-")).to_string(),
    ]
}

fn issue(data: &Value, compact_description: bool) -> String {
    let mut lines = vec![
        format!(
            "## {}: {}",
            text_or(data, "/key", "?"),
            text_or(data, "/fields/summary", "?")
        ),
        String::new(),
        "| Field | Value |".to_string(),
        "|-------|-------|".to_string(),
        format!("| Type | {} |", text_or(data, "/fields/issuetype/name", "?")),
        format!("| Status | {} |", text_or(data, "/fields/status/name", "?")),
        format!("| Priority | {} |", text_or(data, "/fields/priority/name", "?")),
    ];
    if let Some(assignee) = data
        .pointer("/fields/assignee/displayName")
        .and_then(Value::as_str)
    {
        lines.push(format!("| Assignee | {} |", cell(assignee)));
    }
    if let Some(description) = data
        .pointer("/fields/description")
        .and_then(Value::as_str)
        .filter(|d| !d.is_empty())
    {
        let limit = if compact_description { 800 } else { 600 };
        lines.extend([
            String::new(),
            "### Description".to_string(),
            String::new(),
            truncate(description, limit),
        ]);
    }
    lines.join("\n")
}

fn show(data: &Value) -> String {
    let empty = Value::Null;
    let mut out = issue(data.get("issue").unwrap_or(&empty), true);
    let comments = data.get("comments").map(items).unwrap_or(&[]);
    out.push_str("\n\n");
    out.push_str(&comments_section(comments, "### Comments"));
    out
}

fn comments_section(comments: &[Value], heading: &str) -> String {
    let mut lines = vec![format!("{} ({})", heading, comments.len()), String::new()];
    for c in comments {
        lines.push(format!(
            "**{}** ({})",
            text_or(c, "/author/displayName", "?"),
            date(text_or(c, "/created", "?"))
        ));
        lines.push(String::new());
        lines.push(text_or(c, "/body", "").to_string());
        lines.push(String::new());
        lines.push("---".to_string());
        lines.push(String::new());
    }
    lines.join("\n").trim_end().to_string()
}

fn comments(comments: &[Value]) -> String {
    if comments.is_empty() {
        return "*No comments*".to_string();
    }
    comments_section(comments, "## Comments")
}

fn issues(data: &Value) -> String {
    let list = IssueList::from_value(data);
    let mut lines = Vec::new();

    if list.issues.is_empty() {
        lines.push("*No issues found*".to_string());
    } else {
        lines.push("| Key | Status | Priority | Summary |".to_string());
        lines.push("|-----|--------|----------|---------|".to_string());
        for i in list.issues.iter().take(50) {
            lines.push(format!(
                "| {} | {} | {} | {} |",
                text_or(i, "/key", "?"),
                text_or(i, "/fields/status/name", "?"),
                text_or(i, "/fields/priority/name", "?"),
                cell(&truncate(text_or(i, "/fields/summary", "?"), 40))
            ));
        }
    }

    if !list.missing.is_empty() {
        lines.push(String::new());
        lines.push(format!("**Missing:** {}", list.missing_text()));
    }
    if let Some(warning) = list.warning {
        lines.push(String::new());
        lines.push(format!("> {}", warning));
    }
    lines.join("\n")
}

fn key_values(title: &str, data: &Value) -> String {
    let mut lines = vec![
        format!("## {}", title),
        String::new(),
        "| Field | Value |".to_string(),
        "|-------|-------|".to_string(),
    ];
    if let Some(fields) = data.as_object() {
        for (key, value) in fields {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Null => continue,
                Value::Object(_) => continue,
                other => other.to_string(),
            };
            lines.push(format!("| {} | {} |", key, cell(&text)));
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::super::tests::sample_issue;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_issue_table() {
        let text = render(EntityKind::Issue, &sample_issue());
        assert!(text.starts_with("## PROJ-1: Fix login redirect"));
        assert!(text.contains("| Status | In Progress |"));
        assert!(text.contains("### Description"));
    }

    #[test]
    fn test_issue_list_table() {
        let data = json!({
            "found": [sample_issue()],
            "missing": [{"identifier": "X-404", "error": "not found"}],
            "summary": "1 of 2 identifiers not found: X-404"
        });
        let text = render(EntityKind::Issues, &data);
        assert!(text.starts_with("| Key | Status | Priority | Summary |"));
        assert!(text.contains("| PROJ-1 | In Progress | High | Fix login redirect |"));
        assert!(text.contains("**Missing:** X-404 (not found)"));
    }

    #[test]
    fn test_pipes_are_escaped() {
        let boards = json!([{"id": 7, "name": "Team | Web", "type": "scrum"}]);
        let text = render(EntityKind::Boards, &boards);
        assert!(text.contains("| 7 | Team \\| Web | scrum |"));
    }

    #[test]
    fn test_link_table() {
        let links = json!([{
            "id": "10001",
            "type": {"name": "Blocks", "inward": "is blocked by", "outward": "blocks"},
            "inwardIssue": {"key": "PROJ-9", "fields": {"summary": "Schema change", "status": {"name": "Open"}}}
        }]);
        let text = render(EntityKind::Links, &links);
        assert!(text.starts_with("## Issue Links\n\n| ID | Relationship | Issue | Summary | Status |"));
        assert!(text.contains("| 10001 | is blocked by | PROJ-9 | Schema change | Open |"));
    }

    #[test]
    fn test_project_tables() {
        let projects = json!([{"key": "TEST", "name": "Test Project", "projectTypeKey": "software"}]);
        assert_eq!(
            render(EntityKind::Projects, &projects),
            "## Jira Projects\n\n| Key | Name | Type |\n|-----|------|------|\n| TEST | Test Project | software |"
        );

        let project = json!({"key": "TEST", "name": "Test Project", "lead": {"displayName": "Test User"}});
        let text = render(EntityKind::Project, &project);
        assert!(text.starts_with("## TEST: Test Project"));
        assert!(text.contains("| Lead | Test User |"));

        let version = json!({"id": "10601", "name": "2.0.0", "released": false});
        assert!(render(EntityKind::Versions, &version).contains("| 10601 | 2.0.0 | no | - |"));
    }

    #[test]
    fn test_watchers_heading_has_count() {
        let data = json!({"watchCount": 2, "watchers": [{"displayName": "Ana", "accountId": "5b10a"}]});
        let text = render(EntityKind::Watchers, &data);
        assert!(text.starts_with("## Watchers (2)"));
        assert!(text.contains("| Ana | 5b10a |"));
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(render(EntityKind::Sprints, &json!([])), "## Sprints\n\n*None*");
        assert_eq!(render(EntityKind::Comments, &json!([])), "*No comments*");
    }
}
