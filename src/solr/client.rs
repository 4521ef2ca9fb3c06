//! Solr Admin API Client
//!
//! Polls the two Solr admin endpoints the exporter reports on:
//!
//! - `GET {base}/admin/info/threads?wt=json` for thread counts
//! - `GET {base}/admin/info/system?wt=json` for JVM heap usage
//!
//! # Failure Model
//!
//! The public fetch methods never fail. Network errors, timeouts and non-2xx
//! responses are retried according to the configured [`RetryPolicy`]; once the
//! retries are exhausted the whole document is treated as unavailable. Fields are
//! parsed independently, so a malformed field only affects itself.
//!
//! # Example
//!
//! ```no_run
//! use solr_exporter::config::SolrConfig;
//! use solr_exporter::solr::SolrClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = SolrClient::new(&SolrConfig::default())?;
//! let threads = client.fetch_threads().await;
//! println!("current threads: {:?}", threads.current);
//! # Ok(())
//! # }
//! ```

use crate::config::SolrConfig;
use crate::error::{ExporterError, Result};
use crate::solr::retry::{is_retryable_reqwest_error, retry_with_backoff, RetryAction, RetryPolicy};
use crate::solr::types::{HeapStats, ThreadStats};
use serde_json::Value;
use tracing::{debug, warn};

const THREADS_PATH: &str = "/admin/info/threads?wt=json";
const SYSTEM_PATH: &str = "/admin/info/system?wt=json";

/// Client for the Solr admin info API
///
/// Cheap to share: the inner `reqwest::Client` is reference counted and pools
/// connections across refresh cycles.
pub struct SolrClient {
    http: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl SolrClient {
    pub fn new(config: &SolrConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry: RetryPolicy {
                max_retries: config.max_retries,
                backoff: config.retry_backoff(),
            },
        })
    }

    /// Fetch thread counts. Unavailable fields are `None`.
    pub async fn fetch_threads(&self) -> ThreadStats {
        match self.get_json(THREADS_PATH).await {
            Ok(doc) => {
                let stats = ThreadStats::from_json(&doc);
                debug!(?stats, "Parsed Solr thread stats");
                stats
            }
            Err(e) => {
                warn!("Failed to query Solr threads: {}", e);
                ThreadStats::unavailable()
            }
        }
    }

    /// Fetch JVM heap usage. Unavailable fields are `None`.
    pub async fn fetch_heap(&self) -> HeapStats {
        match self.get_json(SYSTEM_PATH).await {
            Ok(doc) => {
                let stats = HeapStats::from_json(&doc);
                debug!(?stats, "Parsed Solr heap stats");
                stats
            }
            Err(e) => {
                warn!("Failed to query Solr system info: {}", e);
                HeapStats::unavailable()
            }
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// GET a path under the base URL and parse the body as JSON.
    async fn get_json(&self, path: &str) -> Result<Value> {
        let url = self.url(path);
        let body = retry_with_backoff(&self.retry, |_attempt| self.get_once(&url)).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn get_once(&self, url: &str) -> RetryAction<String> {
        debug!("GET {}", url);
        let response = match self.http.get(url).send().await {
            Ok(response) => response,
            Err(e) if is_retryable_reqwest_error(&e) => return RetryAction::Retry(e.into()),
            Err(e) => return RetryAction::Fail(e.into()),
        };

        let status = response.status();
        if !status.is_success() {
            return RetryAction::Retry(ExporterError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        match response.text().await {
            Ok(body) => RetryAction::Success(body),
            Err(e) => RetryAction::Retry(e.into()),
        }
    }
}
