//! Output rendering
//!
//! Every command produces a JSON payload. [`render`] turns that payload into
//! one of four representations, chosen by an [`EntityKind`] describing what
//! the payload is and an [`OutputFormat`] describing how to show it.

mod ai;
mod markdown;
mod rich;

use crate::error::{JiraCliError, JiraCliResult};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// How a payload is presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Pretty-printed JSON, unchanged
    Json,
    /// Compact line-oriented text for language models
    #[default]
    Ai,
    /// Coloured tables for terminals
    Rich,
    /// GitHub flavoured markdown
    Markdown,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Ai,
        OutputFormat::Json,
        OutputFormat::Markdown,
        OutputFormat::Rich,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Ai => "ai",
            OutputFormat::Rich => "rich",
            OutputFormat::Markdown => "markdown",
        }
    }

    /// Parse an optional format name, falling back to `default`
    pub fn resolve(name: Option<&str>, default: OutputFormat) -> JiraCliResult<Self> {
        match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.parse(),
            None => Ok(default),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = JiraCliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "ai" => Ok(OutputFormat::Ai),
            "rich" => Ok(OutputFormat::Rich),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(JiraCliError::invalid_param(
                "format",
                format!("Invalid format '{}'", other),
            )),
        }
    }
}

/// What a payload describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A single issue
    Issue,
    /// `{issue, comments}`
    Show,
    /// Search response or bulk fetch result
    Issues,
    Comments,
    Transitions,
    Worklogs,
    Attachments,
    Boards,
    Sprints,
    Sprint,
    User,
    /// Issue links from an issue's `issuelinks` field
    Links,
    LinkTypes,
    /// Remote (web) links
    WebLinks,
    /// `{watchCount, watchers}`
    Watchers,
    Projects,
    Project,
    /// One component or a list of them
    Components,
    /// One version or a list of them
    Versions,
    Priorities,
    Fields,
    /// One saved filter or a list of them
    Filters,
    /// Acknowledgement of a change
    Result,
}

/// Render a payload
pub fn render(kind: EntityKind, format: OutputFormat, data: &Value) -> String {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(data).unwrap_or_else(|_| data.to_string())
        }
        OutputFormat::Ai => ai::render(kind, data),
        OutputFormat::Markdown => markdown::render(kind, data),
        OutputFormat::Rich => rich::render(kind, data),
    }
}

/// Render an error with its hint
pub fn render_error(err: &JiraCliError, format: OutputFormat) -> String {
    let hint = err.hint();
    match format {
        OutputFormat::Json => {
            let mut body = json!({
                "error": err.to_string(),
                "category": err.category(),
                "code": err.error_code(),
            });
            if let Some(hint) = &hint {
                body["hint"] = Value::String(hint.clone());
            }
            serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string())
        }
        OutputFormat::Rich => rich::render_error(&err.to_string(), hint.as_deref()),
        OutputFormat::Ai | OutputFormat::Markdown => match hint {
            Some(hint) => format!("Error: {}\nHint: {}", err, hint),
            None => format!("Error: {}", err),
        },
    }
}

// -------------------------------------------------------------------------
// Payload access shared by the renderers
// -------------------------------------------------------------------------

/// String at a JSON pointer, or `default` when absent or not a string
pub(crate) fn text_or<'a>(value: &'a Value, pointer: &str, default: &'a str) -> &'a str {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or(default)
}

/// Scalar at a JSON pointer rendered as text (numbers included)
pub(crate) fn scalar(value: &Value, pointer: &str) -> String {
    match value.pointer(pointer) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => "?".to_string(),
    }
}

/// Elements of the payload when it is an array
pub(crate) fn items(value: &Value) -> &[Value] {
    value.as_array().map(Vec::as_slice).unwrap_or(&[])
}

/// Elements of an array payload, or a single object as a one-element slice
pub(crate) fn records(value: &Value) -> &[Value] {
    match value {
        Value::Array(values) => values,
        Value::Object(_) => std::slice::from_ref(value),
        _ => &[],
    }
}

static NO_ISSUE: Value = Value::Null;

/// Relationship text and linked issue of an issue link, seen from the
/// issue that carries it
pub(crate) fn link_target(link: &Value) -> (&str, &Value) {
    match link.get("outwardIssue") {
        Some(issue) => (text_or(link, "/type/outward", "?"), issue),
        None => (
            text_or(link, "/type/inward", "?"),
            link.get("inwardIssue").unwrap_or(&NO_ISSUE),
        ),
    }
}

/// Truncate on a character boundary, marking the cut with `...`
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Collapse newlines so a value fits on one line
pub(crate) fn one_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Jira timestamps trimmed to the date
pub(crate) fn date(s: &str) -> &str {
    s.get(..10).unwrap_or(s)
}

/// An identifier a bulk fetch could not retrieve, with the reason when known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MissingEntry<'a> {
    pub identifier: &'a str,
    pub reason: Option<&'a str>,
}

impl fmt::Display for MissingEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reason.filter(|r| !r.is_empty()) {
            Some(reason) => write!(f, "{} ({})", self.identifier, reason),
            None => f.write_str(self.identifier),
        }
    }
}

/// Issues, missing identifiers and warning carried by an issue list payload
pub(crate) struct IssueList<'a> {
    pub issues: &'a [Value],
    pub missing: Vec<MissingEntry<'a>>,
    pub warning: Option<&'a str>,
    pub total: Option<u64>,
}

impl<'a> IssueList<'a> {
    /// Accepts a search response, a bulk fetch result or a bare array
    pub fn from_value(value: &'a Value) -> Self {
        let issues = value
            .get("issues")
            .or_else(|| value.get("found"))
            .map(items)
            .unwrap_or_else(|| items(value));

        let missing = value
            .get("missing")
            .map(items)
            .unwrap_or(&[])
            .iter()
            .filter_map(|m| match m.as_str() {
                Some(identifier) => Some(MissingEntry {
                    identifier,
                    reason: None,
                }),
                None => Some(MissingEntry {
                    identifier: m.get("identifier")?.as_str()?,
                    reason: m.get("error").and_then(Value::as_str),
                }),
            })
            .collect();

        Self {
            issues,
            missing,
            warning: value.get("summary").and_then(Value::as_str),
            total: value.get("total").and_then(Value::as_u64),
        }
    }

    /// Missing identifiers as `X-404 (not found), LOCKED-1 (permission denied)`
    pub fn missing_text(&self) -> String {
        self.missing
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
