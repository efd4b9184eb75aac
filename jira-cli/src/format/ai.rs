//! Compact text for language models: one fact per line, no decoration

use super::{
    date, items, link_target, one_line, records, scalar, text_or, truncate, EntityKind, IssueList,
};
use serde_json::Value;

const MAX_LISTED_ISSUES: usize = 30;

pub(super) fn render(kind: EntityKind, data: &Value) -> String {
    match kind {
        EntityKind::Issue => issue(data),
        EntityKind::Show => show(data),
        EntityKind::Issues => issues(data),
        EntityKind::Comments => comments(data),
        EntityKind::Transitions => transitions(data),
        EntityKind::Worklogs => worklogs(data),
        EntityKind::Attachments => attachments(data),
        EntityKind::Boards => boards(data),
        EntityKind::Sprints => sprints(data),
        EntityKind::Sprint => sprint(data),
        EntityKind::User => user(data),
        EntityKind::Links => links(data),
        EntityKind::LinkTypes => link_types(data),
        EntityKind::WebLinks => web_links(data),
        EntityKind::Watchers => watchers(data),
        EntityKind::Projects => projects(data),
        EntityKind::Project => project(data),
        EntityKind::Components => components(data),
        EntityKind::Versions => versions(data),
        EntityKind::Priorities => priorities(data),
        EntityKind::Fields => fields(data),
        EntityKind::Filters => filters(data),
        EntityKind::Result => result(data),
    }
}

fn issue_header(issue: &Value, description_limit: usize) -> Vec<String> {
    let mut lines = vec![
        format!("ISSUE: {}", text_or(issue, "/key", "?")),
        format!("type: {}", text_or(issue, "/fields/issuetype/name", "None")),
        format!("status: {}", text_or(issue, "/fields/status/name", "None")),
        format!("priority: {}", text_or(issue, "/fields/priority/name", "None")),
        format!("summary: {}", text_or(issue, "/fields/summary", "None")),
    ];
    if let Some(assignee) = issue
        .pointer("/fields/assignee/displayName")
        .and_then(Value::as_str)
    {
        lines.push(format!("assignee: {}", assignee));
    }
    if let Some(labels) = issue.pointer("/fields/labels").and_then(Value::as_array) {
        if !labels.is_empty() {
            let labels: Vec<&str> = labels.iter().filter_map(Value::as_str).collect();
            lines.push(format!("labels: {}", labels.join(", ")));
        }
    }
    if let Some(description) = issue
        .pointer("/fields/description")
        .and_then(Value::as_str)
        .filter(|d| !d.is_empty())
    {
        lines.push(format!(
            "description: {}",
            truncate(description, description_limit)
        ));
    }
    lines
}

fn issue(data: &Value) -> String {
    issue_header(data, 600).join("\n")
}

fn show(data: &Value) -> String {
    let empty = Value::Null;
    let mut lines = issue_header(data.get("issue").unwrap_or(&empty), 800);
    let comments = data.get("comments").map(items).unwrap_or(&[]);

    lines.push(format!("comments: {}", comments.len()));
    for c in comments.iter().take(5) {
        lines.push(format!(
            "  - {}: {}",
            text_or(c, "/author/displayName", "?"),
            truncate(&one_line(text_or(c, "/body", "")), 150)
        ));
    }
    lines.join("\n")
}

fn issues(data: &Value) -> String {
    let list = IssueList::from_value(data);
    let mut lines = Vec::new();

    if list.issues.is_empty() {
        lines.push("NO_ISSUES_FOUND".to_string());
    } else {
        match list.total {
            Some(total) if total as usize > list.issues.len() => lines.push(format!(
                "FOUND: {} issues (showing {})",
                total,
                list.issues.len()
            )),
            _ => lines.push(format!("FOUND: {} issues", list.issues.len())),
        }
        for i in list.issues.iter().take(MAX_LISTED_ISSUES) {
            lines.push(format!(
                "- {}: [{}] {}",
                text_or(i, "/key", "?"),
                text_or(i, "/fields/status/name", "?"),
                truncate(text_or(i, "/fields/summary", "?"), 60)
            ));
        }
        if list.issues.len() > MAX_LISTED_ISSUES {
            lines.push(format!(
                "... and {} more",
                list.issues.len() - MAX_LISTED_ISSUES
            ));
        }
    }

    if !list.missing.is_empty() {
        lines.push(format!("MISSING: {}", list.missing_text()));
    }
    if let Some(warning) = list.warning {
        lines.push(format!("WARNING: {}", warning));
    }
    lines.join("\n")
}

fn comments(data: &Value) -> String {
    let comments = items(data);
    if comments.is_empty() {
        return "NO_COMMENTS".to_string();
    }
    let mut lines = vec![format!("COMMENTS: {}", comments.len())];
    for c in comments.iter().take(10) {
        lines.push(format!(
            "- {}: {}",
            text_or(c, "/author/displayName", "?"),
            truncate(&one_line(text_or(c, "/body", "")), 100)
        ));
    }
    lines.join("\n")
}

fn transitions(data: &Value) -> String {
    let transitions = items(data);
    if transitions.is_empty() {
        return "NO_TRANSITIONS_AVAILABLE".to_string();
    }
    let mut lines = vec![format!("TRANSITIONS: {}", transitions.len())];
    for t in transitions {
        lines.push(format!(
            "- {} (id:{}) -> {}",
            text_or(t, "/name", "?"),
            text_or(t, "/id", "?"),
            text_or(t, "/to", "?")
        ));
    }
    lines.join("\n")
}

fn worklogs(data: &Value) -> String {
    let worklogs = items(data);
    if worklogs.is_empty() {
        return "NO_WORKLOGS".to_string();
    }
    let mut lines = vec![format!("WORKLOGS: {}", worklogs.len())];
    for w in worklogs {
        lines.push(format!(
            "- {}: {} on {}",
            text_or(w, "/author/displayName", "?"),
            text_or(w, "/timeSpent", "?"),
            date(text_or(w, "/started", "?"))
        ));
    }
    lines.join("\n")
}

fn attachments(data: &Value) -> String {
    let attachments = items(data);
    if attachments.is_empty() {
        return "NO_ATTACHMENTS".to_string();
    }
    let mut lines = vec![format!("ATTACHMENTS: {}", attachments.len())];
    for a in attachments {
        lines.push(format!(
            "- {} (id:{}, {} bytes)",
            text_or(a, "/filename", "?"),
            scalar(a, "/id"),
            a.get("size").and_then(Value::as_u64).unwrap_or(0)
        ));
    }
    lines.join("\n")
}

fn boards(data: &Value) -> String {
    let boards = items(data);
    let mut lines = vec![format!("BOARDS: {}", boards.len())];
    for b in boards {
        lines.push(format!(
            "  - {} (id:{}, {})",
            text_or(b, "/name", "?"),
            scalar(b, "/id"),
            text_or(b, "/type", "?")
        ));
    }
    lines.join("\n")
}

fn sprint_line(s: &Value) -> String {
    let mut line = format!(
        "- {} (id:{}, {})",
        text_or(s, "/name", "?"),
        scalar(s, "/id"),
        text_or(s, "/state", "?")
    );
    if let (Some(start), Some(end)) = (
        s.get("startDate").and_then(Value::as_str),
        s.get("endDate").and_then(Value::as_str),
    ) {
        line.push_str(&format!(" {} to {}", date(start), date(end)));
    }
    line
}

fn sprints(data: &Value) -> String {
    let sprints = items(data);
    if sprints.is_empty() {
        return "NO_SPRINTS".to_string();
    }
    let mut lines = vec![format!("SPRINTS: {}", sprints.len())];
    lines.extend(sprints.iter().map(sprint_line));
    lines.join("\n")
}

fn sprint(data: &Value) -> String {
    let mut lines = vec![format!("SPRINT: {}", sprint_line(data).trim_start_matches("- "))];
    if let Some(goal) = data.get("goal").and_then(Value::as_str).filter(|g| !g.is_empty()) {
        lines.push(format!("goal: {}", one_line(goal)));
    }
    lines.join("\n")
}

fn user(data: &Value) -> String {
    let mut lines = vec![format!("USER: {}", text_or(data, "/displayName", "?"))];
    for (label, pointer) in [
        ("email", "/emailAddress"),
        ("name", "/name"),
        ("account_id", "/accountId"),
    ] {
        if let Some(value) = data.pointer(pointer).and_then(Value::as_str) {
            lines.push(format!("{}: {}", label, value));
        }
    }
    lines.join("\n")
}

fn links(data: &Value) -> String {
    let links = items(data);
    if links.is_empty() {
        return "NO_LINKS".to_string();
    }
    let mut lines = vec![format!("LINKS: {}", links.len())];
    for link in links {
        let (relation, issue) = link_target(link);
        lines.push(format!(
            "- {} {}: {} (id:{})",
            relation,
            text_or(issue, "/key", "?"),
            truncate(text_or(issue, "/fields/summary", ""), 50),
            scalar(link, "/id")
        ));
    }
    lines.join("\n")
}

fn link_types(data: &Value) -> String {
    let types = items(data);
    if types.is_empty() {
        return "NO_LINK_TYPES".to_string();
    }
    let mut lines = vec![format!("LINK_TYPES: {}", types.len())];
    for t in types {
        lines.push(format!(
            "- {}: {} / {}",
            text_or(t, "/name", "?"),
            text_or(t, "/outward", "?"),
            text_or(t, "/inward", "?")
        ));
    }
    lines.join("\n")
}

fn web_links(data: &Value) -> String {
    let links = items(data);
    if links.is_empty() {
        return "NO_WEBLINKS".to_string();
    }
    let mut lines = vec![format!("WEBLINKS: {}", links.len())];
    for link in links {
        lines.push(format!(
            "- {}: {} (id:{})",
            text_or(link, "/object/title", "?"),
            text_or(link, "/object/url", "?"),
            scalar(link, "/id")
        ));
    }
    lines.join("\n")
}

fn watchers(data: &Value) -> String {
    let watchers = data.get("watchers").map(items).unwrap_or(&[]);
    let count = data
        .get("watchCount")
        .and_then(Value::as_u64)
        .unwrap_or(watchers.len() as u64);
    if watchers.is_empty() {
        return format!("WATCHERS: 0 (count: {})", count);
    }
    let mut lines = vec![format!("WATCHERS: {}", count)];
    for w in watchers {
        let id = w
            .get("name")
            .or_else(|| w.get("accountId"))
            .and_then(Value::as_str)
            .unwrap_or("?");
        lines.push(format!("- {} ({})", text_or(w, "/displayName", "?"), id));
    }
    lines.join("\n")
}

fn projects(data: &Value) -> String {
    let projects = items(data);
    let mut lines = vec![format!("PROJECTS: {}", projects.len())];
    for p in projects {
        lines.push(format!(
            "  - {}: {}",
            text_or(p, "/key", "?"),
            text_or(p, "/name", "?")
        ));
    }
    lines.join("\n")
}

fn project(data: &Value) -> String {
    let mut lines = vec![
        format!("PROJECT: {}", text_or(data, "/key", "?")),
        format!("name: {}", text_or(data, "/name", "?")),
        format!("lead: {}", text_or(data, "/lead/displayName", "Unknown")),
        format!("type: {}", text_or(data, "/projectTypeKey", "")),
    ];
    if let Some(description) = data
        .get("description")
        .and_then(Value::as_str)
        .filter(|d| !d.is_empty())
    {
        lines.push(format!("description: {}", truncate(&one_line(description), 300)));
    }
    lines.join("\n")
}

fn components(data: &Value) -> String {
    let components = records(data);
    if components.is_empty() {
        return "NO_COMPONENTS".to_string();
    }
    let mut lines = vec![format!("COMPONENTS: {}", components.len())];
    for c in components {
        let mut line = format!("- {} (id:{})", text_or(c, "/name", "?"), scalar(c, "/id"));
        if let Some(description) = c
            .get("description")
            .and_then(Value::as_str)
            .filter(|d| !d.is_empty())
        {
            line.push_str(&format!(": {}", truncate(&one_line(description), 60)));
        }
        lines.push(line);
    }
    lines.join("\n")
}

fn versions(data: &Value) -> String {
    let versions = records(data);
    if versions.is_empty() {
        return "NO_VERSIONS".to_string();
    }
    let mut lines = vec![format!("VERSIONS: {}", versions.len())];
    for v in versions {
        let state = if v.get("released").and_then(Value::as_bool).unwrap_or(false) {
            "released"
        } else if v.get("archived").and_then(Value::as_bool).unwrap_or(false) {
            "archived"
        } else {
            "unreleased"
        };
        let mut line = format!(
            "- {} (id:{}, {})",
            text_or(v, "/name", "?"),
            scalar(v, "/id"),
            state
        );
        if let Some(release_date) = v.get("releaseDate").and_then(Value::as_str) {
            line.push_str(&format!(" {}", release_date));
        }
        lines.push(line);
    }
    lines.join("\n")
}

fn priorities(data: &Value) -> String {
    let priorities = items(data);
    let mut lines = vec![format!("PRIORITIES: {}", priorities.len())];
    for p in priorities {
        lines.push(format!(
            "  - {} (id:{})",
            text_or(p, "/name", "?"),
            scalar(p, "/id")
        ));
    }
    lines.join("\n")
}

fn fields(data: &Value) -> String {
    let fields = items(data);
    if fields.is_empty() {
        return "NO_FIELDS".to_string();
    }
    let mut lines = vec![format!("FIELDS: {}", fields.len())];
    for f in fields {
        lines.push(format!(
            "- {}: {} ({})",
            text_or(f, "/id", "?"),
            text_or(f, "/name", "?"),
            text_or(f, "/schema/type", "?")
        ));
    }
    lines.join("\n")
}

fn filters(data: &Value) -> String {
    let filters = records(data);
    if filters.is_empty() {
        return "NO_FILTERS".to_string();
    }
    let mut lines = vec![format!("FILTERS: {}", filters.len())];
    for f in filters {
        lines.push(format!(
            "- {} (id:{}): {}",
            text_or(f, "/name", "?"),
            scalar(f, "/id"),
            one_line(text_or(f, "/jql", ""))
        ));
    }
    lines.join("\n")
}

fn result(data: &Value) -> String {
    let Some(fields) = data.as_object() else {
        return format!("OK: {}", scalar(data, ""));
    };
    let mut lines = vec!["OK".to_string()];
    for (key, value) in fields {
        let text = match value {
            Value::String(s) => s.clone(),
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
                .join(" -> "),
            Value::Null => continue,
            other => other.to_string(),
        };
        lines.push(format!("{}: {}", key, text));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::super::tests::sample_issue;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_issue_lines() {
        let text = render(EntityKind::Issue, &sample_issue());
        assert!(text.starts_with("ISSUE: PROJ-1\ntype: Bug\nstatus: In Progress"));
        assert!(text.contains("assignee: Sam Doe"));
        assert!(text.contains("labels: auth, web"));
    }

    #[test]
    fn test_bulk_result_lines() {
        let data = json!({
            "total": 1,
            "found": [sample_issue()],
            "missing": [{"identifier": "X-404", "error": "not found"}],
            "summary": "1 of 2 identifiers not found: X-404"
        });
        let text = render(EntityKind::Issues, &data);
        assert_eq!(
            text,
            "FOUND: 1 issues\n- PROJ-1: [In Progress] Fix login redirect\nMISSING: X-404 (not found)\nWARNING: 1 of 2 identifiers not found: X-404"
        );
    }

    #[test]
    fn test_empty_markers() {
        assert_eq!(render(EntityKind::Issues, &json!({"issues": []})), "NO_ISSUES_FOUND");
        assert_eq!(render(EntityKind::Comments, &json!([])), "NO_COMMENTS");
        assert_eq!(
            render(EntityKind::Transitions, &json!([])),
            "NO_TRANSITIONS_AVAILABLE"
        );
        assert_eq!(render(EntityKind::Worklogs, &json!([])), "NO_WORKLOGS");
        assert_eq!(render(EntityKind::Attachments, &json!([])), "NO_ATTACHMENTS");
        assert_eq!(render(EntityKind::Links, &json!([])), "NO_LINKS");
        assert_eq!(render(EntityKind::WebLinks, &json!([])), "NO_WEBLINKS");
    }

    #[test]
    fn test_long_lists_are_capped() {
        let issues: Vec<Value> = (1..=35)
            .map(|i| json!({"key": format!("P-{}", i), "fields": {"summary": "s", "status": {"name": "Open"}}}))
            .collect();
        let text = render(EntityKind::Issues, &json!({ "issues": issues }));
        assert!(text.contains("- P-30: [Open] s"));
        assert!(!text.contains("- P-31:"));
        assert!(text.ends_with("... and 5 more"));
    }

    #[test]
    fn test_worklog_and_transition_lines() {
        let worklogs = json!([{"author": {"displayName": "Ana"}, "timeSpent": "2h", "started": "2024-05-02T09:00:00.000+0000"}]);
        assert_eq!(
            render(EntityKind::Worklogs, &worklogs),
            "WORKLOGS: 1\n- Ana: 2h on 2024-05-02"
        );

        let transitions = json!([{"id": "11", "name": "Start Progress", "to": "In Progress"}]);
        assert!(render(EntityKind::Transitions, &transitions)
            .contains("- Start Progress (id:11) -> In Progress"));
    }

    #[test]
    fn test_link_lines() {
        let links = json!([
            {
                "id": "10001",
                "type": {"name": "Blocks", "inward": "is blocked by", "outward": "blocks"},
                "outwardIssue": {"key": "PROJ-2", "fields": {"summary": "Release notes"}}
            },
            {
                "id": "10002",
                "type": {"name": "Blocks", "inward": "is blocked by", "outward": "blocks"},
                "inwardIssue": {"key": "PROJ-9", "fields": {"summary": "Schema change"}}
            }
        ]);
        assert_eq!(
            render(EntityKind::Links, &links),
            "LINKS: 2\n- blocks PROJ-2: Release notes (id:10001)\n- is blocked by PROJ-9: Schema change (id:10002)"
        );

        let types = json!([{"id": "1", "name": "Blocks", "inward": "is blocked by", "outward": "blocks"}]);
        assert_eq!(
            render(EntityKind::LinkTypes, &types),
            "LINK_TYPES: 1\n- Blocks: blocks / is blocked by"
        );

        let web = json!([{"id": 7, "object": {"url": "https://ci.example.com/7", "title": "Build 7"}}]);
        assert_eq!(
            render(EntityKind::WebLinks, &web),
            "WEBLINKS: 1\n- Build 7: https://ci.example.com/7 (id:7)"
        );
    }

    #[test]
    fn test_watchers_count_without_names() {
        let hidden = json!({"watchCount": 3, "watchers": []});
        assert_eq!(render(EntityKind::Watchers, &hidden), "WATCHERS: 0 (count: 3)");

        let visible = json!({
            "watchCount": 1,
            "watchers": [{"displayName": "Test User", "name": "test.user"}]
        });
        assert_eq!(
            render(EntityKind::Watchers, &visible),
            "WATCHERS: 1\n- Test User (test.user)"
        );
    }

    #[test]
    fn test_project_lines() {
        let projects = json!([{"key": "TEST", "name": "Test Project", "projectTypeKey": "software"}]);
        assert_eq!(
            render(EntityKind::Projects, &projects),
            "PROJECTS: 1\n  - TEST: Test Project"
        );

        let project = json!({
            "key": "TEST",
            "name": "Test Project",
            "projectTypeKey": "software",
            "lead": {"displayName": "Test User"},
            "description": "Test project for Jira CLI"
        });
        assert_eq!(
            render(EntityKind::Project, &project),
            "PROJECT: TEST\nname: Test Project\nlead: Test User\ntype: software\ndescription: Test project for Jira CLI"
        );
    }

    #[test]
    fn test_component_and_version_lines() {
        let components = json!([
            {"id": "10500", "name": "Backend", "description": "Backend component"},
            {"id": "10501", "name": "Frontend"}
        ]);
        assert_eq!(
            render(EntityKind::Components, &components),
            "COMPONENTS: 2\n- Backend (id:10500): Backend component\n- Frontend (id:10501)"
        );

        // A single created or fetched version renders like a one-element list
        let version = json!({"id": "10600", "name": "1.0.0", "released": true, "releaseDate": "2024-01-15"});
        assert_eq!(
            render(EntityKind::Versions, &version),
            "VERSIONS: 1\n- 1.0.0 (id:10600, released) 2024-01-15"
        );
        assert_eq!(render(EntityKind::Versions, &json!([])), "NO_VERSIONS");
    }

    #[test]
    fn test_reference_lines() {
        let priorities = json!([{"id": "1", "name": "Highest"}, {"id": "2", "name": "High"}]);
        assert_eq!(
            render(EntityKind::Priorities, &priorities),
            "PRIORITIES: 2\n  - Highest (id:1)\n  - High (id:2)"
        );

        let fields = json!([{"id": "customfield_10002", "name": "Story Points", "schema": {"type": "number"}}]);
        assert_eq!(
            render(EntityKind::Fields, &fields),
            "FIELDS: 1\n- customfield_10002: Story Points (number)"
        );

        let filter = json!({"id": "10800", "name": "My Open Issues", "jql": "assignee = currentUser()"});
        assert_eq!(
            render(EntityKind::Filters, &filter),
            "FILTERS: 1\n- My Open Issues (id:10800): assignee = currentUser()"
        );
    }

    #[test]
    fn test_result_lists_steps() {
        let data = json!({
            "issue_key": "T-1",
            "steps": [{"id": "1", "name": "Start", "to": "In Progress"}, {"id": "2", "name": "Finish", "to": "Done"}]
        });
        let text = render(EntityKind::Result, &data);
        assert!(text.starts_with("OK"));
        assert!(text.contains("issue_key: T-1"));
        assert!(text.contains("steps: Start -> Finish"));
    }
}
