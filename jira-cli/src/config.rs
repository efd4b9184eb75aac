//! Configuration management for the Jira CLI
//!
//! Settings come from, in increasing priority: built-in defaults, an
//! optional TOML file, the `~/.env.jira` env file and the process
//! environment.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Hard ceiling on simultaneous bulk fetches
pub const MAX_BULK_CONCURRENCY: usize = 50;

/// Main configuration structure shared by the CLI and the MCP server
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JiraConfig {
    /// Jira instance URL (required)
    pub jira_url: String,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Force cloud or server behaviour; detected from the URL when unset
    pub cloud: Option<bool>,

    /// Maximum search results to return (default: 50, max: 200)
    pub max_search_results: u32,

    /// HTTP request timeout in seconds (default: 30)
    pub request_timeout_seconds: u64,

    /// Simultaneous retrievals during a bulk fetch (default: 10)
    pub bulk_max_concurrent: usize,

    /// Largest number of identifiers accepted by one bulk fetch (default: 50)
    pub bulk_max_batch: usize,

    /// Per-identifier timeout for bulk fetches; falls back to the request timeout
    pub bulk_item_timeout_seconds: Option<u64>,

    /// Output format used when a command does not name one
    pub default_format: String,

    /// Log filter for the `jira` binary when RUST_LOG is unset
    pub log_level: Option<String>,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum AuthConfig {
    /// Personal Access Token (Jira Server / Data Center)
    PersonalAccessToken(String),

    /// Basic authentication (username + password or Cloud API token)
    Basic { username: String, password: String },

    /// Bearer token
    Bearer(String),

    /// Anonymous access (limited functionality)
    Anonymous,
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            jira_url: String::new(),
            auth: AuthConfig::Anonymous,
            cloud: None,
            max_search_results: 50,
            request_timeout_seconds: 30,
            bulk_max_concurrent: 10,
            bulk_max_batch: 50,
            bulk_item_timeout_seconds: None,
            default_format: "ai".to_string(),
            log_level: None,
        }
    }
}

impl JiraConfig {
    /// Load configuration from defaults, TOML file, env file and environment
    pub fn load() -> Result<Self> {
        Self::load_env_file();

        let mut config = match Self::config_file_path() {
            Some(path) => {
                let config = Self::load_from_file(&path)?;
                info!("Loaded configuration from {}", path.display());
                config
            }
            None => {
                debug!("No TOML configuration file found, using defaults and environment variables");
                Self::default()
            }
        };

        config.load_from_env()?;
        config.validate()?;

        Ok(config)
    }

    /// Resolve the TOML file to read, if any
    fn config_file_path() -> Option<PathBuf> {
        if let Ok(explicit) = env::var("JIRA_CLI_CONFIG") {
            return Some(PathBuf::from(explicit));
        }

        ["config/jira-cli.toml", "jira-cli.toml"]
            .iter()
            .map(PathBuf::from)
            .find(|candidate| candidate.is_file())
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        Ok(config)
    }

    /// Populate the environment from `~/.env.jira` without overriding set variables
    fn load_env_file() {
        let path = env::var_os("JIRA_ENV_FILE")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| PathBuf::from(home).join(".env.jira")));

        if let Some(path) = path.filter(|p| p.is_file()) {
            match dotenv::from_path(&path) {
                Ok(()) => debug!("Loaded environment from {}", path.display()),
                Err(e) => warn!("Ignoring unreadable env file {}: {}", path.display(), e),
            }
        }
    }

    /// Load configuration from environment variables
    fn load_from_env(&mut self) -> Result<()> {
        if let Ok(url) = env::var("JIRA_URL") {
            self.jira_url = url.trim_end_matches('/').to_string();
            debug!("Loaded JIRA_URL from environment");
        }

        if let Ok(auth_type) = env::var("JIRA_AUTH_TYPE") {
            match auth_type.to_lowercase().as_str() {
                "pat" | "personal_access_token" => {
                    if let Some(token) = first_env(&["JIRA_PERSONAL_TOKEN", "JIRA_TOKEN"]) {
                        self.auth = AuthConfig::PersonalAccessToken(token);
                        debug!("Configured Personal Access Token authentication from environment");
                    }
                }
                "basic" => {
                    let username = env::var("JIRA_USERNAME")
                        .context("JIRA_USERNAME required for basic authentication")?;
                    let password = first_env(&["JIRA_API_TOKEN", "JIRA_PASSWORD"]).context(
                        "JIRA_API_TOKEN or JIRA_PASSWORD required for basic authentication",
                    )?;
                    self.auth = AuthConfig::Basic { username, password };
                    debug!("Configured basic authentication from environment");
                }
                "bearer" => {
                    if let Ok(token) = env::var("JIRA_TOKEN") {
                        self.auth = AuthConfig::Bearer(token);
                        debug!("Configured bearer token authentication from environment");
                    }
                }
                "anonymous" => {
                    self.auth = AuthConfig::Anonymous;
                    debug!("Configured anonymous authentication from environment");
                }
                _ => {
                    warn!("Unknown JIRA_AUTH_TYPE: {}, using default", auth_type);
                }
            }
        } else if let Ok(token) = env::var("JIRA_PERSONAL_TOKEN") {
            self.auth = AuthConfig::PersonalAccessToken(token);
            debug!("Detected Personal Access Token authentication");
        } else if let (Ok(username), Some(password)) = (
            env::var("JIRA_USERNAME"),
            first_env(&["JIRA_API_TOKEN", "JIRA_PASSWORD"]),
        ) {
            self.auth = AuthConfig::Basic { username, password };
            debug!("Detected basic authentication");
        } else if let Ok(token) = env::var("JIRA_TOKEN") {
            self.auth = AuthConfig::PersonalAccessToken(token);
            debug!("Detected token authentication from JIRA_TOKEN");
        }

        if let Ok(cloud) = env::var("JIRA_CLOUD") {
            self.cloud = Some(matches!(
                cloud.to_lowercase().as_str(),
                "1" | "true" | "yes"
            ));
        }

        if let Some(max) = parse_env::<u32>("JIRA_MAX_RESULTS") {
            self.max_search_results = max.min(200);
            debug!(
                "Set max search results to {} from environment",
                self.max_search_results
            );
        }

        if let Some(timeout_seconds) = parse_env::<u64>("JIRA_REQUEST_TIMEOUT") {
            self.request_timeout_seconds = timeout_seconds;
            debug!(
                "Set request timeout to {} seconds from environment",
                timeout_seconds
            );
        }

        if let Some(concurrency) = parse_env::<usize>("JIRA_BULK_CONCURRENCY") {
            self.bulk_max_concurrent = concurrency;
        }

        if let Some(max_batch) = parse_env::<usize>("JIRA_BULK_MAX") {
            self.bulk_max_batch = max_batch;
        }

        if let Some(item_timeout) = parse_env::<u64>("JIRA_BULK_TIMEOUT") {
            self.bulk_item_timeout_seconds = Some(item_timeout);
        }

        if let Ok(format) = env::var("JIRA_FORMAT") {
            self.default_format = format.to_lowercase();
        }

        if let Ok(level) = env::var("JIRA_LOG_LEVEL") {
            self.log_level = Some(level.to_lowercase());
        }

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.jira_url.is_empty() {
            return Err(anyhow::anyhow!(
                "JIRA URL is required. Set JIRA_URL environment variable, ~/.env.jira or configure in TOML file."
            ));
        }

        if !self.jira_url.starts_with("http://") && !self.jira_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "JIRA URL must start with http:// or https://. Got: {}",
                self.jira_url
            ));
        }

        match &self.auth {
            AuthConfig::PersonalAccessToken(token) => {
                if token.is_empty() {
                    return Err(anyhow::anyhow!("Personal access token cannot be empty"));
                }
            }
            AuthConfig::Basic { username, password } => {
                if username.is_empty() || password.is_empty() {
                    return Err(anyhow::anyhow!(
                        "Username and API token cannot be empty for basic auth"
                    ));
                }
            }
            AuthConfig::Bearer(token) => {
                if token.is_empty() {
                    return Err(anyhow::anyhow!("Bearer token cannot be empty"));
                }
            }
            AuthConfig::Anonymous => {
                info!("Using anonymous authentication - functionality may be limited");
            }
        }

        if self.max_search_results > 200 {
            return Err(anyhow::anyhow!("max_search_results cannot exceed 200"));
        }

        if self.request_timeout_seconds == 0 {
            return Err(anyhow::anyhow!("request_timeout_seconds must be positive"));
        }

        if self.bulk_max_concurrent == 0 || self.bulk_max_concurrent > MAX_BULK_CONCURRENCY {
            return Err(anyhow::anyhow!(
                "bulk_max_concurrent must be between 1 and {}",
                MAX_BULK_CONCURRENCY
            ));
        }

        if self.bulk_item_timeout_seconds == Some(0) {
            return Err(anyhow::anyhow!("bulk_item_timeout_seconds must be positive"));
        }

        if self.bulk_max_batch == 0 {
            return Err(anyhow::anyhow!("bulk_max_batch must be positive"));
        }

        self.default_format
            .parse::<crate::format::OutputFormat>()
            .map_err(|e| anyhow::anyhow!("default_format: {}", e))?;

        debug!("Configuration validation successful");
        Ok(())
    }

    /// Whether the instance is Atlassian Cloud
    pub fn is_cloud(&self) -> bool {
        self.cloud
            .unwrap_or_else(|| self.jira_url.contains(".atlassian.net"))
    }

    /// Timeout applied to every Jira request
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Timeout applied to each identifier of a bulk fetch
    pub fn bulk_item_timeout(&self) -> Duration {
        Duration::from_secs(
            self.bulk_item_timeout_seconds
                .unwrap_or(self.request_timeout_seconds),
        )
    }

    /// Get the gouqi Credentials from AuthConfig
    pub fn to_gouqi_credentials(&self) -> gouqi::Credentials {
        match &self.auth {
            AuthConfig::PersonalAccessToken(token) => gouqi::Credentials::Bearer(token.clone()),
            AuthConfig::Basic { username, password } => {
                gouqi::Credentials::Basic(username.clone(), password.clone())
            }
            AuthConfig::Bearer(token) => gouqi::Credentials::Bearer(token.clone()),
            AuthConfig::Anonymous => gouqi::Credentials::Anonymous,
        }
    }
}

fn first_env(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| env::var(name).ok())
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring unparsable {}={}", name, raw);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    const AUTH_VARS: &[&str] = &[
        "JIRA_URL",
        "JIRA_AUTH_TYPE",
        "JIRA_TOKEN",
        "JIRA_PERSONAL_TOKEN",
        "JIRA_USERNAME",
        "JIRA_API_TOKEN",
        "JIRA_PASSWORD",
        "JIRA_CLOUD",
        "JIRA_BULK_CONCURRENCY",
        "JIRA_BULK_TIMEOUT",
        "JIRA_FORMAT",
        "JIRA_LOG_LEVEL",
    ];

    fn clear_env() {
        for var in AUTH_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let config = JiraConfig::default();
        assert_eq!(config.max_search_results, 50);
        assert_eq!(config.request_timeout_seconds, 30);
        assert_eq!(config.bulk_max_concurrent, 10);
        assert_eq!(config.bulk_max_batch, 50);
        assert_eq!(config.default_format, "ai");
        assert_eq!(config.bulk_item_timeout(), Duration::from_secs(30));
        assert!(config.log_level.is_none());
    }

    #[test]
    #[serial]
    fn test_env_var_loading() {
        clear_env();
        env::set_var("JIRA_URL", "https://test.atlassian.net/");
        env::set_var("JIRA_AUTH_TYPE", "pat");
        env::set_var("JIRA_TOKEN", "test_token");
        env::set_var("JIRA_BULK_CONCURRENCY", "4");
        env::set_var("JIRA_BULK_TIMEOUT", "5");
        env::set_var("JIRA_LOG_LEVEL", "DEBUG");

        let mut config = JiraConfig::default();
        config.load_from_env().unwrap();

        assert_eq!(config.jira_url, "https://test.atlassian.net");
        assert_eq!(config.bulk_max_concurrent, 4);
        assert_eq!(config.bulk_item_timeout(), Duration::from_secs(5));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(
            config.auth,
            AuthConfig::PersonalAccessToken("test_token".to_string())
        );
        assert!(config.is_cloud());

        clear_env();
    }

    #[test]
    #[serial]
    fn test_auth_detection_without_auth_type() {
        clear_env();
        env::set_var("JIRA_USERNAME", "me@example.com");
        env::set_var("JIRA_API_TOKEN", "cloud-token");

        let mut config = JiraConfig::default();
        config.load_from_env().unwrap();
        assert_eq!(
            config.auth,
            AuthConfig::Basic {
                username: "me@example.com".to_string(),
                password: "cloud-token".to_string()
            }
        );

        env::remove_var("JIRA_API_TOKEN");
        env::set_var("JIRA_PASSWORD", "server-password");
        let mut config = JiraConfig::default();
        config.load_from_env().unwrap();
        assert_eq!(
            config.auth,
            AuthConfig::Basic {
                username: "me@example.com".to_string(),
                password: "server-password".to_string()
            }
        );

        env::set_var("JIRA_PERSONAL_TOKEN", "pat-token");
        let mut config = JiraConfig::default();
        config.load_from_env().unwrap();
        assert_eq!(
            config.auth,
            AuthConfig::PersonalAccessToken("pat-token".to_string())
        );

        clear_env();
    }

    #[test]
    #[serial]
    fn test_basic_auth_requires_username() {
        clear_env();
        env::set_var("JIRA_AUTH_TYPE", "basic");

        let mut config = JiraConfig::default();
        assert!(config.load_from_env().is_err());

        clear_env();
    }

    #[test]
    fn test_cloud_override() {
        let mut config = JiraConfig {
            jira_url: "https://jira.internal.example".to_string(),
            ..Default::default()
        };
        assert!(!config.is_cloud());
        config.cloud = Some(true);
        assert!(config.is_cloud());
    }

    #[test]
    fn test_toml_file_loading() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("jira-cli.toml");
        std::fs::write(
            &path,
            r#"
jira_url = "https://jira.example.com"
bulk_max_concurrent = 3
default_format = "markdown"
log_level = "info"

[auth]
PersonalAccessToken = "from-file"
"#,
        )
        .unwrap();

        let config = JiraConfig::load_from_file(&path).unwrap();
        assert_eq!(config.jira_url, "https://jira.example.com");
        assert_eq!(config.bulk_max_concurrent, 3);
        assert_eq!(config.default_format, "markdown");
        assert_eq!(config.log_level.as_deref(), Some("info"));
        assert_eq!(config.request_timeout_seconds, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_errors() {
        let mut config = JiraConfig::default();

        // Empty URL should fail validation
        assert!(config.validate().is_err());

        config.jira_url = "not-a-url".to_string();
        assert!(config.validate().is_err());

        config.jira_url = "https://test.atlassian.net".to_string();
        assert!(config.validate().is_ok());

        config.bulk_max_concurrent = 0;
        assert!(config.validate().is_err());
        config.bulk_max_concurrent = 10;

        // A zero item timeout would fail every fetch in a batch
        config.bulk_item_timeout_seconds = Some(0);
        assert!(config.validate().is_err());
        config.bulk_item_timeout_seconds = Some(1);
        assert!(config.validate().is_ok());

        config.default_format = "xml".to_string();
        assert!(config.validate().is_err());
    }
}
