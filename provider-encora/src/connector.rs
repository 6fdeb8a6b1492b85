//! Encora collection API connector
//!
//! Walks the paginated collection endpoint and returns every record it can
//! get. Pagination is best-effort: anything other than a transport failure
//! or an unreadable body ends the walk without discarding earlier pages.

use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use core_library::Collection;
use core_runtime::config::{ExporterConfig, RateLimitPolicy};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::{EncoraError, Result};
use crate::pagination::with_page_size;
use crate::types::{AbortReason, CollectionPage, FetchCompletion, FetchOutcome};

/// Non-standard retry header sent by the collection API
const RETRY_AFTER_HEADER: &str = "RetryAfter";

/// Standard retry header, used when the API-specific one is absent
const STANDARD_RETRY_AFTER_HEADER: &str = "Retry-After";

/// Longest response body quoted in an abort reason
const MAX_ERROR_BODY: usize = 500;

/// Result of requesting a single page
enum PageResult {
    Page(CollectionPage),
    Stop(AbortReason),
}

/// Encora collection API connector
///
/// # Example
///
/// ```ignore
/// use provider_encora::EncoraConnector;
///
/// let connector = EncoraConnector::new(http_client, &config);
/// let outcome = connector.fetch_collection().await?;
/// println!("{} records over {} pages", outcome.collection.len(), outcome.pages);
/// ```
pub struct EncoraConnector {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// First page of the collection
    base_url: String,

    /// Bearer credential
    api_key: String,

    /// Page size pinned on every request
    per_page: u32,

    /// Per-request timeout
    timeout: Duration,

    rate_limit: RateLimitPolicy,
}

impl EncoraConnector {
    /// Create a new connector from the run configuration
    pub fn new(http_client: Arc<dyn HttpClient>, config: &ExporterConfig) -> Self {
        Self {
            http_client,
            base_url: config.api_base_url.clone(),
            api_key: config.api_key.clone(),
            per_page: config.per_page,
            timeout: config.http_timeout,
            rate_limit: config.rate_limit,
        }
    }

    /// Fetch every page of the collection
    ///
    /// Records are accumulated in the order pages are returned. A 429 is
    /// retried on the same URL after the server-requested delay; any other
    /// non-success status stops pagination and the records gathered so far
    /// are returned with [`FetchCompletion::Aborted`].
    ///
    /// # Errors
    ///
    /// Transport failures and unparsable success bodies are fatal.
    #[instrument(skip(self), fields(base_url = %self.base_url, per_page = self.per_page))]
    pub async fn fetch_collection(&self) -> Result<FetchOutcome> {
        info!("Fetching collection from API");

        let mut collection = Collection::new();
        let mut pages = 0u32;
        let mut next_url = Some(with_page_size(&self.base_url, self.per_page)?);

        let completion = loop {
            let Some(url) = next_url.take() else {
                break FetchCompletion::Complete;
            };

            info!(page = pages + 1, "Requesting page");
            let page = match self.fetch_page(&url).await? {
                PageResult::Page(page) => page,
                PageResult::Stop(reason) => break FetchCompletion::Aborted(reason),
            };

            pages += 1;
            debug!(page = pages, records = page.data.len(), "Page received");

            let next = page.next_page().map(str::to_string);
            collection.extend(page.data);

            if let Some(next) = next {
                match with_page_size(&next, self.per_page) {
                    Ok(pinned) => next_url = Some(pinned),
                    Err(e) => {
                        break FetchCompletion::Aborted(AbortReason::InvalidNextPage {
                            url: next,
                            message: e.to_string(),
                        });
                    }
                }
            }
        };

        match &completion {
            FetchCompletion::Complete => {
                info!(records = collection.len(), pages, "Collection fetched");
            }
            FetchCompletion::Aborted(reason) => {
                warn!(
                    records = collection.len(),
                    pages,
                    reason = %reason,
                    "Pagination stopped early, keeping partial collection"
                );
            }
        }

        Ok(FetchOutcome {
            collection,
            pages,
            completion,
        })
    }

    /// Request one page, waiting out rate limits
    async fn fetch_page(&self, url: &str) -> Result<PageResult> {
        let mut rate_limited = 0u32;

        loop {
            let request = HttpRequest::get(url)
                .bearer_token(&self.api_key)
                .header("Accept", "application/json")
                .timeout(self.timeout);

            let response = self.http_client.execute(request).await?;

            if response.is_rate_limited() {
                rate_limited += 1;
                if rate_limited > self.rate_limit.max_retries {
                    return Ok(PageResult::Stop(AbortReason::RateLimitExhausted {
                        attempts: rate_limited,
                    }));
                }

                let delay = self.rate_limit.delay_for(retry_after_secs(&response));
                warn!(
                    attempt = rate_limited,
                    delay_secs = delay.as_secs(),
                    "Rate limit hit, waiting before retrying the same page"
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            if !response.is_success() {
                let body = truncate(response.text_lossy().trim(), MAX_ERROR_BODY);
                warn!(status = response.status, body = %body, "Collection request failed");
                return Ok(PageResult::Stop(AbortReason::HttpStatus {
                    status: response.status,
                    body,
                }));
            }

            let page: CollectionPage = response.json().map_err(|e| {
                EncoraError::ParseError(format!("Failed to parse collection page: {}", e))
            })?;

            return Ok(PageResult::Page(page));
        }
    }
}

/// Server-requested delay in whole seconds, if present and well formed
fn retry_after_secs(response: &HttpResponse) -> Option<u64> {
    response
        .header(RETRY_AFTER_HEADER)
        .or_else(|| response.header(STANDARD_RETRY_AFTER_HEADER))
        .and_then(|value| value.trim().parse().ok())
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
