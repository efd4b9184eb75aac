//! Tracing setup for the `jira` binary
//!
//! Stdout carries rendered output only, so log lines always go to stderr.

use std::env;
use tracing_subscriber::EnvFilter;

/// Directive used when nothing else is configured
pub const DEFAULT_DIRECTIVE: &str = "warn";

/// Pick the filter directive: `RUST_LOG`, then the configured level
/// (`JIRA_LOG_LEVEL` or `log_level` in the TOML file), then `--verbose`,
/// then [`DEFAULT_DIRECTIVE`]
pub fn filter_directive(
    rust_log: Option<String>,
    configured: Option<String>,
    verbose: bool,
) -> String {
    let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
    non_empty(rust_log)
        .or_else(|| non_empty(configured))
        .unwrap_or_else(|| {
            if verbose {
                "debug".to_string()
            } else {
                DEFAULT_DIRECTIVE.to_string()
            }
        })
}

/// Install the global subscriber. Calling it twice is harmless.
///
/// `configured` is the loaded configuration's `log_level`; it is `None`
/// when configuration failed to load, in which case `JIRA_LOG_LEVEL` is
/// read directly so the failure itself can still be traced.
pub fn init(verbose: bool, configured: Option<&str>) {
    let configured = configured
        .map(str::to_string)
        .or_else(|| env::var("JIRA_LOG_LEVEL").ok());
    let directive = filter_directive(env::var("RUST_LOG").ok(), configured, verbose);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rust_log_wins() {
        assert_eq!(
            filter_directive(Some("trace".into()), Some("info".into()), true),
            "trace"
        );
    }

    #[test]
    fn test_configured_level_then_verbose() {
        assert_eq!(filter_directive(None, Some("info".into()), true), "info");
        assert_eq!(filter_directive(None, Some(" ".into()), true), "debug");
        assert_eq!(filter_directive(None, None, false), "warn");
    }

    #[test]
    fn test_toml_level_reaches_the_filter() {
        let config: crate::config::JiraConfig =
            toml::from_str("jira_url = \"https://jira.example.com\"\nlog_level = \"error\"")
                .unwrap();
        assert_eq!(
            filter_directive(None, config.log_level.clone(), true),
            "error"
        );
    }
}
