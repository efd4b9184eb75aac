//! Bulk issue retrieval
//!
//! Fetches many issues by key in parallel and reports which ones were found
//! and which failed. A failure for one identifier never aborts the batch:
//! it is recorded in `missing` with its error text, and every normalized
//! identifier produces exactly one outcome.
//!
//! Retrieval goes through an [`IssueFetcher`] supplied by the caller, so the
//! aggregator works the same against the live Jira client and against fakes.

use crate::error::{JiraCliError, JiraCliResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{Id, JoinError, JoinSet};
use tracing::{debug, error, info, instrument, warn};

/// Default number of retrievals in flight at once
pub const DEFAULT_MAX_CONCURRENT: usize = 10;

/// Upper bound for `max_concurrent`
pub const MAX_ALLOWED_CONCURRENT: usize = 50;

/// Default largest batch accepted by [`BulkFetcher::fetch`]
pub const DEFAULT_MAX_BATCH: usize = 50;

/// Single-identifier retrieval used by the aggregator.
///
/// Implementations must be safe to call from several tasks at once.
#[async_trait]
pub trait IssueFetcher: Send + Sync {
    async fn fetch_one(&self, identifier: &str) -> JiraCliResult<Value>;
}

/// Result of retrieving one identifier
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Found { identifier: String, payload: Value },
    Failed { identifier: String, error: String },
}

impl FetchOutcome {
    pub fn identifier(&self) -> &str {
        match self {
            FetchOutcome::Found { identifier, .. } | FetchOutcome::Failed { identifier, .. } => {
                identifier
            }
        }
    }
}

/// An identifier that could not be retrieved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingIdentifier {
    pub identifier: String,
    pub error: String,
}

/// Aggregate of a bulk fetch.
///
/// `found` holds the payloads in input order. That ordering is a
/// presentation convenience and not part of the contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FetchResult {
    /// Number of payloads in `found`
    pub total: usize,
    pub found: Vec<Value>,
    pub missing: Vec<MissingIdentifier>,
    /// Names every missing identifier; absent when nothing failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl FetchResult {
    /// Build the aggregate from per-identifier outcomes
    pub fn from_outcomes(outcomes: Vec<FetchOutcome>) -> Self {
        let requested = outcomes.len();
        let mut found = Vec::new();
        let mut missing = Vec::new();

        for outcome in outcomes {
            match outcome {
                FetchOutcome::Found { payload, .. } => found.push(payload),
                FetchOutcome::Failed { identifier, error } => {
                    missing.push(MissingIdentifier { identifier, error })
                }
            }
        }

        let summary = if missing.is_empty() {
            None
        } else {
            Some(format!(
                "{} of {} identifiers not found: {}",
                missing.len(),
                requested,
                missing
                    .iter()
                    .map(|m| m.identifier.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        };

        Self {
            total: found.len(),
            found,
            missing,
            summary,
        }
    }

    /// Identifiers that failed, in report order
    pub fn missing_identifiers(&self) -> Vec<&str> {
        self.missing.iter().map(|m| m.identifier.as_str()).collect()
    }
}

/// Split a delimited argument into identifiers.
///
/// Commas and any whitespace both separate identifiers. Tokens are trimmed,
/// empty tokens are dropped and duplicates keep their first position.
pub fn parse_identifiers(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter(|token| seen.insert(token.to_string()))
        .map(str::to_string)
        .collect()
}

/// Tuning for a [`BulkFetcher`]
#[derive(Debug, Clone)]
pub struct BulkFetchOptions {
    pub max_concurrent: usize,
    /// Applied to each retrieval; expiry becomes a failed outcome
    pub item_timeout: Option<Duration>,
    pub max_batch: usize,
}

impl Default for BulkFetchOptions {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            item_timeout: None,
            max_batch: DEFAULT_MAX_BATCH,
        }
    }
}

impl BulkFetchOptions {
    /// Build options from the loaded configuration
    pub fn from_config(config: &crate::config::JiraConfig) -> Self {
        Self {
            max_concurrent: config.bulk_max_concurrent,
            item_timeout: Some(config.bulk_item_timeout()),
            max_batch: config.bulk_max_batch,
        }
    }

    fn concurrency_limit(&self) -> usize {
        self.max_concurrent.clamp(1, MAX_ALLOWED_CONCURRENT)
    }
}

/// Fan-out retrieval over an [`IssueFetcher`]
pub struct BulkFetcher<F: ?Sized> {
    fetcher: Arc<F>,
    options: BulkFetchOptions,
}

impl<F> BulkFetcher<F>
where
    F: IssueFetcher + ?Sized + 'static,
{
    pub fn new(fetcher: Arc<F>, options: BulkFetchOptions) -> Self {
        Self { fetcher, options }
    }

    /// Parse a delimited identifier list and fetch every identifier
    #[instrument(skip(self))]
    pub async fn fetch(&self, raw: &str) -> JiraCliResult<FetchResult> {
        let identifiers = parse_identifiers(raw);

        if identifiers.len() > self.options.max_batch {
            return Err(JiraCliError::invalid_param(
                "keys",
                format!(
                    "Maximum {} issues per request, got {}",
                    self.options.max_batch,
                    identifiers.len()
                ),
            ));
        }

        Ok(self.fetch_all(identifiers).await)
    }

    /// Fetch already-normalized identifiers, one retrieval call each
    pub async fn fetch_all(&self, identifiers: Vec<String>) -> FetchResult {
        let requested = identifiers.len();
        if requested == 0 {
            debug!("Bulk fetch called with no identifiers");
            return FetchResult::default();
        }

        let start_time = std::time::Instant::now();
        let concurrency_limit = self.options.concurrency_limit();
        debug!(
            "Using concurrency limit: {} for {} identifiers",
            concurrency_limit, requested
        );

        let mut slots: Vec<Option<FetchOutcome>> = vec![None; requested];
        let mut task_slots: HashMap<Id, usize> = HashMap::with_capacity(requested);
        let mut join_set = JoinSet::new();
        let mut pending_count = 0;

        for (index, identifier) in identifiers.iter().enumerate() {
            let fetcher = Arc::clone(&self.fetcher);
            let identifier = identifier.clone();
            let item_timeout = self.options.item_timeout;

            let handle = join_set.spawn(Self::fetch_single(fetcher, identifier, item_timeout));
            task_slots.insert(handle.id(), index);

            pending_count += 1;

            // At the concurrency limit, wait for one to finish before spawning more
            if pending_count >= concurrency_limit {
                if let Some(joined) = join_set.join_next_with_id().await {
                    record_outcome(&mut slots, &task_slots, &identifiers, joined);
                    pending_count -= 1;
                }
            }
        }

        while let Some(joined) = join_set.join_next_with_id().await {
            record_outcome(&mut slots, &task_slots, &identifiers, joined);
        }

        let outcomes: Vec<FetchOutcome> = slots
            .into_iter()
            .zip(identifiers)
            .map(|(slot, identifier)| {
                slot.unwrap_or_else(|| FetchOutcome::Failed {
                    identifier,
                    error: "retrieval task did not complete".to_string(),
                })
            })
            .collect();

        let result = FetchResult::from_outcomes(outcomes);

        info!(
            "Bulk fetch completed: {}/{} found ({} missing) in {}ms",
            result.found.len(),
            requested,
            result.missing.len(),
            start_time.elapsed().as_millis()
        );
        if let Some(summary) = &result.summary {
            warn!("{}", summary);
        }

        result
    }

    async fn fetch_single(
        fetcher: Arc<F>,
        identifier: String,
        item_timeout: Option<Duration>,
    ) -> FetchOutcome {
        let fetched = match item_timeout {
            Some(limit) => match tokio::time::timeout(limit, fetcher.fetch_one(&identifier)).await
            {
                Ok(result) => result,
                Err(_) => Err(JiraCliError::network(format!(
                    "timed out after {}s",
                    limit.as_secs_f64()
                ))),
            },
            None => fetcher.fetch_one(&identifier).await,
        };

        match fetched {
            Ok(payload) => FetchOutcome::Found {
                identifier,
                payload,
            },
            Err(e) => {
                debug!("Retrieval of {} failed: {}", identifier, e);
                FetchOutcome::Failed {
                    identifier,
                    error: e.detail(),
                }
            }
        }
    }
}

/// Store a joined task's outcome in the slot of the identifier it was spawned for
fn record_outcome(
    slots: &mut [Option<FetchOutcome>],
    task_slots: &HashMap<Id, usize>,
    identifiers: &[String],
    joined: Result<(Id, FetchOutcome), JoinError>,
) {
    match joined {
        Ok((id, outcome)) => {
            if let Some(&index) = task_slots.get(&id) {
                slots[index] = Some(outcome);
            }
        }
        Err(e) => {
            error!("Task join error: {}", e);
            if let Some(&index) = task_slots.get(&e.id()) {
                slots[index] = Some(FetchOutcome::Failed {
                    identifier: identifiers[index].clone(),
                    error: join_failure_detail(e),
                });
            }
        }
    }
}

/// Failure text for a retrieval task that panicked or was cancelled
fn join_failure_detail(err: JoinError) -> String {
    if err.is_cancelled() {
        return "retrieval task was cancelled".to_string();
    }
    match err.try_into_panic() {
        Ok(payload) => payload
            .downcast_ref::<String>()
            .cloned()
            .or_else(|| payload.downcast_ref::<&str>().map(|s| s.to_string()))
            .map(|message| format!("retrieval task panicked: {}", message))
            .unwrap_or_else(|| "retrieval task panicked".to_string()),
        Err(err) => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Instant;

    /// In-memory fetcher that counts calls and can delay every call
    struct FakeFetcher {
        issues: HashMap<String, Value>,
        delay: Option<Duration>,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        peak_in_flight: AtomicUsize,
    }

    impl FakeFetcher {
        fn with_keys(keys: &[&str]) -> Self {
            Self {
                issues: keys
                    .iter()
                    .map(|k| (k.to_string(), json!({"key": k, "fields": {"summary": k}})))
                    .collect(),
                delay: None,
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                peak_in_flight: AtomicUsize::new(0),
            }
        }

        fn delayed(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    #[async_trait]
    impl IssueFetcher for FakeFetcher {
        async fn fetch_one(&self, identifier: &str) -> JiraCliResult<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.issues
                .get(identifier)
                .cloned()
                .ok_or_else(|| JiraCliError::not_found("issue", identifier))
        }
    }

    fn keys_of(result: &FetchResult) -> Vec<String> {
        let mut keys: Vec<String> = result
            .found
            .iter()
            .map(|v| v["key"].as_str().unwrap().to_string())
            .collect();
        keys.sort();
        keys
    }

    #[test]
    fn test_parse_identifier_forms() {
        let expected = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        assert_eq!(parse_identifiers("A,B,C"), expected);
        assert_eq!(parse_identifiers("A B C"), expected);
        assert_eq!(parse_identifiers(" A , B ,C "), expected);
        assert_eq!(parse_identifiers("A,\tB\nC"), expected);
    }

    #[test]
    fn test_parse_drops_empty_tokens_and_duplicates() {
        assert_eq!(parse_identifiers("A,,B, ,A"), vec!["A", "B"]);
        assert!(parse_identifiers("").is_empty());
        assert!(parse_identifiers(" , ,, ").is_empty());
    }

    #[tokio::test]
    async fn test_all_found() {
        let fetcher = Arc::new(FakeFetcher::with_keys(&["P-1", "P-2", "P-3"]));
        let bulk = BulkFetcher::new(Arc::clone(&fetcher), BulkFetchOptions::default());

        let result = bulk.fetch("P-1, P-2, P-3").await.unwrap();

        assert_eq!(result.found.len(), 3);
        assert!(result.missing.is_empty());
        assert!(result.summary.is_none());
        assert_eq!(result.total, 3);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_partial_failure_is_reported_not_raised() {
        let fetcher = Arc::new(FakeFetcher::with_keys(&["X-1", "X-2"]));
        let bulk = BulkFetcher::new(fetcher, BulkFetchOptions::default());

        let result = bulk.fetch("X-1,X-2,X-404").await.unwrap();

        assert_eq!(keys_of(&result), vec!["X-1", "X-2"]);
        assert_eq!(
            result.missing,
            vec![MissingIdentifier {
                identifier: "X-404".to_string(),
                error: "not found".to_string(),
            }]
        );
        assert_eq!(result.found.len() + result.missing.len(), 3);
        assert!(result.summary.as_deref().unwrap().contains("X-404"));
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_calls() {
        let fetcher = Arc::new(FakeFetcher::with_keys(&["P-1"]));
        let bulk = BulkFetcher::new(Arc::clone(&fetcher), BulkFetchOptions::default());

        let result = bulk.fetch("   ").await.unwrap();

        assert_eq!(result, FetchResult::default());
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_duplicates_fetched_once() {
        let fetcher = Arc::new(FakeFetcher::with_keys(&["P-1", "P-2"]));
        let bulk = BulkFetcher::new(Arc::clone(&fetcher), BulkFetchOptions::default());

        let result = bulk.fetch("P-1 P-2 P-1").await.unwrap();

        assert_eq!(result.found.len(), 2);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_batch_ceiling_rejects_before_fetching() {
        let fetcher = Arc::new(FakeFetcher::with_keys(&[]));
        let options = BulkFetchOptions {
            max_batch: 2,
            ..Default::default()
        };
        let bulk = BulkFetcher::new(Arc::clone(&fetcher), options);

        let err = bulk.fetch("A-1 A-2 A-3").await.unwrap_err();

        assert!(matches!(err, JiraCliError::InvalidParameter { .. }));
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_runs_concurrently() {
        let keys = ["C-1", "C-2", "C-3", "C-4", "C-5"];
        let fetcher =
            Arc::new(FakeFetcher::with_keys(&keys).delayed(Duration::from_millis(200)));
        let bulk = BulkFetcher::new(fetcher, BulkFetchOptions::default());

        let start = Instant::now();
        let result = bulk.fetch(&keys.join(",")).await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(result.found.len(), 5);
        // Sequential execution would take at least a full second
        assert!(elapsed < Duration::from_millis(700), "took {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_concurrency_limit_is_respected() {
        let keys: Vec<String> = (1..=8).map(|i| format!("L-{}", i)).collect();
        let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        let fetcher =
            Arc::new(FakeFetcher::with_keys(&key_refs).delayed(Duration::from_millis(20)));
        let options = BulkFetchOptions {
            max_concurrent: 3,
            ..Default::default()
        };
        let bulk = BulkFetcher::new(Arc::clone(&fetcher), options);

        let result = bulk.fetch_all(keys).await;

        assert_eq!(result.found.len(), 8);
        assert!(fetcher.peak_in_flight.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn test_item_timeout_becomes_failure() {
        let fetcher =
            Arc::new(FakeFetcher::with_keys(&["T-1"]).delayed(Duration::from_millis(300)));
        let options = BulkFetchOptions {
            item_timeout: Some(Duration::from_millis(50)),
            ..Default::default()
        };
        let bulk = BulkFetcher::new(fetcher, options);

        let result = bulk.fetch("T-1").await.unwrap();

        assert!(result.found.is_empty());
        assert_eq!(result.missing_identifiers(), vec!["T-1"]);
        assert!(result.missing[0].error.contains("timed out"));
    }

    #[tokio::test]
    async fn test_idempotent_partition() {
        let fetcher = Arc::new(FakeFetcher::with_keys(&["I-1", "I-3"]));
        let bulk = BulkFetcher::new(fetcher, BulkFetchOptions::default());

        let first = bulk.fetch("I-1 I-2 I-3").await.unwrap();
        let second = bulk.fetch("I-1 I-2 I-3").await.unwrap();

        assert_eq!(keys_of(&first), keys_of(&second));
        assert_eq!(first.missing_identifiers(), second.missing_identifiers());
    }

    #[test]
    fn test_summary_names_every_failure() {
        let result = FetchResult::from_outcomes(vec![
            FetchOutcome::Failed {
                identifier: "A-1".into(),
                error: "not found".into(),
            },
            FetchOutcome::Found {
                identifier: "A-2".into(),
                payload: json!({"key": "A-2"}),
            },
            FetchOutcome::Failed {
                identifier: "A-3".into(),
                error: "permission denied".into(),
            },
        ]);

        assert_eq!(
            result.summary.as_deref(),
            Some("2 of 3 identifiers not found: A-1, A-3")
        );
    }

    #[test]
    fn test_result_serializes_as_plain_data() {
        let result = FetchResult::from_outcomes(vec![FetchOutcome::Failed {
            identifier: "Z-9".into(),
            error: "not found".into(),
        }]);
        let value = serde_json::to_value(&result).unwrap();

        assert_eq!(value["found"], json!([]));
        assert_eq!(value["missing"][0]["identifier"], "Z-9");
        assert_eq!(value["missing"][0]["error"], "not found");
    }
}
