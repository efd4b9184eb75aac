//! Error types for the Jira CLI and MCP server
//!
//! One error enum is shared by both surfaces. Each variant carries a
//! JSON-RPC style code for MCP responses, a category for logging, and an
//! optional hint that the renderers print under the error message.

use serde_json::Value;
use thiserror::Error;

/// Errors produced by Jira operations, configuration and rendering
#[derive(Debug, Error)]
pub enum JiraCliError {
    /// Configuration errors (-32001)
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Authentication failures (-32002)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Network errors and timeouts (-32003)
    #[error("Network error: {message}")]
    Network { message: String },

    /// Permission denied errors (-32004)
    #[error("Permission denied: {message}")]
    Permission { message: String },

    /// Resource not found errors (-32005)
    #[error("Not found: {resource} '{key}' not found")]
    NotFound { resource: String, key: String },

    /// Invalid parameter errors (-32006)
    #[error("Invalid parameter: {parameter} - {message}")]
    InvalidParameter { parameter: String, message: String },

    /// Rate limit exceeded errors (-32007)
    #[error("Rate limit exceeded, retry after {retry_after} seconds")]
    RateLimit { retry_after: u64 },

    /// Workflow navigation errors (-32008)
    #[error("Workflow error: {message}")]
    Workflow { message: String },

    /// Internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl JiraCliError {
    /// Get the JSON-RPC error code for this error
    pub fn error_code(&self) -> i32 {
        match self {
            JiraCliError::Configuration { .. } => -32001,
            JiraCliError::Authentication { .. } => -32002,
            JiraCliError::Network { .. } => -32003,
            JiraCliError::Permission { .. } => -32004,
            JiraCliError::NotFound { .. } => -32005,
            JiraCliError::InvalidParameter { .. } => -32006,
            JiraCliError::RateLimit { .. } => -32007,
            JiraCliError::Workflow { .. } => -32008,
            JiraCliError::Internal { .. } => -32603,
        }
    }

    /// Get the error category for logging and rendering
    pub fn category(&self) -> &'static str {
        match self {
            JiraCliError::Configuration { .. } => "configuration",
            JiraCliError::Authentication { .. } => "authentication",
            JiraCliError::Network { .. } => "network",
            JiraCliError::Permission { .. } => "permission",
            JiraCliError::NotFound { .. } => "not_found",
            JiraCliError::InvalidParameter { .. } => "invalid_parameter",
            JiraCliError::RateLimit { .. } => "rate_limit",
            JiraCliError::Workflow { .. } => "workflow",
            JiraCliError::Internal { .. } => "internal",
        }
    }

    /// Short description without the category prefix.
    ///
    /// This is what the bulk fetch records next to a failed identifier, so a
    /// missing issue reads as `not found` rather than the full display text.
    pub fn detail(&self) -> String {
        match self {
            JiraCliError::NotFound { .. } => "not found".to_string(),
            JiraCliError::InvalidParameter { message, .. } => message.clone(),
            JiraCliError::RateLimit { retry_after } => {
                format!("rate limited, retry after {}s", retry_after)
            }
            JiraCliError::Configuration { message }
            | JiraCliError::Authentication { message }
            | JiraCliError::Network { message }
            | JiraCliError::Permission { message }
            | JiraCliError::Workflow { message }
            | JiraCliError::Internal { message } => message.clone(),
        }
    }

    /// A remedy to show the user, where one is known
    pub fn hint(&self) -> Option<String> {
        match self {
            JiraCliError::Configuration { .. } => Some(
                "Set JIRA_URL plus JIRA_PERSONAL_TOKEN, or JIRA_USERNAME and JIRA_API_TOKEN (e.g. in ~/.env.jira)"
                    .to_string(),
            ),
            JiraCliError::Authentication { .. } => {
                Some("Check that your Jira token is valid and not expired".to_string())
            }
            JiraCliError::Network { .. } => {
                Some("Check JIRA_URL and your connection to the Jira instance".to_string())
            }
            JiraCliError::NotFound { resource, key } => {
                Some(format!("Verify that {} '{}' exists and is visible to you", resource, key))
            }
            JiraCliError::InvalidParameter { parameter, .. } if parameter == "format" => {
                Some("Valid formats: ai, json, markdown, rich".to_string())
            }
            JiraCliError::RateLimit { retry_after } => {
                Some(format!("Wait {} seconds before retrying", retry_after))
            }
            JiraCliError::Workflow { .. } => Some(
                "Use 'jira transition list ISSUE' to see the available transitions".to_string(),
            ),
            _ => None,
        }
    }

    /// Get additional error data for MCP error responses
    pub fn error_data(&self) -> Option<Value> {
        let mut data = serde_json::Map::new();
        data.insert(
            "category".to_string(),
            Value::String(self.category().to_string()),
        );

        match self {
            JiraCliError::RateLimit { retry_after } => {
                data.insert(
                    "retry_after".to_string(),
                    Value::Number((*retry_after).into()),
                );
            }
            JiraCliError::NotFound { resource, key } => {
                data.insert("resource".to_string(), Value::String(resource.clone()));
                data.insert("key".to_string(), Value::String(key.clone()));
            }
            JiraCliError::InvalidParameter { parameter, .. } => {
                data.insert("parameter".to_string(), Value::String(parameter.clone()));
            }
            _ => {}
        }

        if let Some(hint) = self.hint() {
            data.insert("hint".to_string(), Value::String(hint));
        }

        Some(Value::Object(data))
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        JiraCliError::Configuration {
            message: message.into(),
        }
    }

    /// Create an authentication error
    pub fn auth(message: impl Into<String>) -> Self {
        JiraCliError::Authentication {
            message: message.into(),
        }
    }

    /// Create a network error
    pub fn network(message: impl Into<String>) -> Self {
        JiraCliError::Network {
            message: message.into(),
        }
    }

    /// Create a permission error
    pub fn permission(message: impl Into<String>) -> Self {
        JiraCliError::Permission {
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(resource: impl Into<String>, key: impl Into<String>) -> Self {
        JiraCliError::NotFound {
            resource: resource.into(),
            key: key.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_param(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        JiraCliError::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create a rate limit error
    pub fn rate_limit(retry_after: u64) -> Self {
        JiraCliError::RateLimit { retry_after }
    }

    /// Create a workflow error
    pub fn workflow(message: impl Into<String>) -> Self {
        JiraCliError::Workflow {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        JiraCliError::Internal {
            message: message.into(),
        }
    }
}

/// Convert from gouqi errors to JiraCliError
impl From<gouqi::Error> for JiraCliError {
    fn from(err: gouqi::Error) -> Self {
        match err {
            gouqi::Error::Http(_) => JiraCliError::network(format!("HTTP error: {}", err)),
            gouqi::Error::IO(_) => JiraCliError::network(format!("IO error: {}", err)),
            gouqi::Error::Serde(_) => {
                JiraCliError::internal(format!("Serialization error: {}", err))
            }
            gouqi::Error::Unauthorized => JiraCliError::auth("Jira rejected the credentials"),
            gouqi::Error::NotFound => JiraCliError::not_found("resource", "unknown"),
            gouqi::Error::Fault { .. } => {
                JiraCliError::internal(format!("Jira API error: {}", err))
            }
            _ => JiraCliError::internal(format!("Jira client error: {}", err)),
        }
    }
}

impl From<serde_json::Error> for JiraCliError {
    fn from(err: serde_json::Error) -> Self {
        JiraCliError::internal(format!("JSON error: {}", err))
    }
}

impl From<toml::de::Error> for JiraCliError {
    fn from(err: toml::de::Error) -> Self {
        JiraCliError::config(format!("TOML parsing error: {}", err))
    }
}

impl From<std::io::Error> for JiraCliError {
    fn from(err: std::io::Error) -> Self {
        JiraCliError::internal(format!("IO error: {}", err))
    }
}

/// Convert from generic anyhow errors
impl From<anyhow::Error> for JiraCliError {
    fn from(err: anyhow::Error) -> Self {
        // Configuration loading reports through anyhow, so look at the whole chain
        let message = format!("{:#}", err);
        let lower_message = message.to_lowercase();

        if lower_message.contains("authentication") || lower_message.contains("unauthorized") {
            JiraCliError::auth(message)
        } else if lower_message.contains("permission")
            || lower_message.contains("forbidden")
            || lower_message.contains("403")
        {
            JiraCliError::permission(message)
        } else if lower_message.contains("rate limit") || lower_message.contains("429") {
            JiraCliError::rate_limit(extract_retry_after(&lower_message).unwrap_or(60))
        } else if lower_message.contains("config")
            || lower_message.contains("jira_url")
            || lower_message.contains("token")
        {
            JiraCliError::config(message)
        } else if lower_message.contains("network")
            || lower_message.contains("connection")
            || lower_message.contains("timeout")
        {
            JiraCliError::network(message)
        } else {
            JiraCliError::internal(message)
        }
    }
}

/// Extract retry-after seconds from an error message
pub fn extract_retry_after(error_message: &str) -> Option<u64> {
    let lower = error_message.to_lowercase();
    let idx = lower.find("retry-after").or_else(|| lower.find("retry after"))?;
    lower[idx..]
        .split(|c: char| !c.is_ascii_digit())
        .find(|word| !word.is_empty())
        .and_then(|word| word.parse::<u64>().ok())
}

/// Result type alias for Jira operations
pub type JiraCliResult<T> = Result<T, JiraCliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_error_codes() {
        assert_eq!(JiraCliError::config("test").error_code(), -32001);
        assert_eq!(JiraCliError::auth("test").error_code(), -32002);
        assert_eq!(JiraCliError::network("test").error_code(), -32003);
        assert_eq!(JiraCliError::permission("test").error_code(), -32004);
        assert_eq!(
            JiraCliError::not_found("issue", "KEY-123").error_code(),
            -32005
        );
        assert_eq!(
            JiraCliError::invalid_param("format", "invalid").error_code(),
            -32006
        );
        assert_eq!(JiraCliError::rate_limit(60).error_code(), -32007);
        assert_eq!(JiraCliError::workflow("stuck").error_code(), -32008);
    }

    #[test]
    fn test_detail_strips_prefix() {
        assert_eq!(JiraCliError::not_found("issue", "X-404").detail(), "not found");
        assert_eq!(JiraCliError::network("timed out").detail(), "timed out");
        assert_eq!(
            JiraCliError::invalid_param("keys", "too many").detail(),
            "too many"
        );
    }

    #[test]
    fn test_hints() {
        let err = JiraCliError::invalid_param("format", "Invalid format 'xml'");
        assert_eq!(
            err.hint().as_deref(),
            Some("Valid formats: ai, json, markdown, rich")
        );
        assert!(JiraCliError::internal("boom").hint().is_none());
        assert!(JiraCliError::not_found("issue", "A-1")
            .hint()
            .unwrap()
            .contains("A-1"));
    }

    #[test]
    fn test_error_data() {
        let data = JiraCliError::rate_limit(120).error_data().unwrap();
        assert_eq!(data["category"], "rate_limit");
        assert_eq!(data["retry_after"], 120);

        let data = JiraCliError::not_found("issue", "KEY-123")
            .error_data()
            .unwrap();
        assert_eq!(data["category"], "not_found");
        assert_eq!(data["resource"], "issue");
        assert_eq!(data["key"], "KEY-123");
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: JiraCliError = anyhow::anyhow!("Authentication failed").into();
        assert_eq!(err.category(), "authentication");

        let err: JiraCliError =
            anyhow::anyhow!("JIRA URL is required. Set JIRA_URL environment variable").into();
        assert_matches!(err, JiraCliError::Configuration { .. });

        let err: JiraCliError = anyhow::anyhow!("HTTP 429 rate limit, retry-after 30").into();
        assert_matches!(err, JiraCliError::RateLimit { retry_after: 30 });
    }

    #[test]
    fn test_retry_after_extraction() {
        assert_eq!(
            extract_retry_after("Rate limit exceeded, retry-after 60"),
            Some(60)
        );
        assert_eq!(extract_retry_after("Retry after: 15s"), Some(15));
        assert_eq!(extract_retry_after("No retry info"), None);
    }
}
