// src/crawl/scheduler.rs
// =============================================================================
// The crawl loop.
//
// How it works:
// 1. Seed requests go into a FIFO queue
// 2. Up to `max_concurrency` requests are in flight at once
// 3. Each request gets up to `max_attempts` tries; a try fails on a
//    transport error, a timeout, a non-200 status, an unexpected content
//    type, or a body that does not parse for its step. Between tries the
//    request waits `retry_delay`, doubled after every failure
// 4. A successful response is routed by its step:
//    - CATEGORIES: the menu is expanded into listing requests
//    - DETAIL: the next page (if any) is queued and every new item is
//      normalized and handed to the output sink
// 5. New requests go to the back of the queue
// 6. The run ends when the queue is empty and nothing is in flight
//
// A request that runs out of attempts is reported to the failure handler and
// dropped. It never stops the run. A bad item only costs that one item.
// =============================================================================

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use url::Url;

use super::fetch::Fetcher;
use super::pagination::continue_pagination;
use super::request::{base_url, CrawlRequest, Step};
use super::tree::{expand, CategoryMenu};
use crate::error::{AttemptError, FetchError, ItemError};
use crate::product::{
    normalize, shop_name, to_product_markup, DedupRegistry, ListingPage, OutputSink, RawItem,
};

/// Called once for every request that ran out of attempts
pub type FailureHandler = Box<dyn Fn(&Url) + Send + Sync>;

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Requests in flight at the same time
    pub max_concurrency: usize,
    /// Tries per request, including the first one
    pub max_attempts: u32,
    /// Upper bound for a single try
    pub request_timeout: Duration,
    /// Wait before the second try; doubles for every try after that
    pub retry_delay: Duration,
    /// Currency of the prices in the structured markup
    pub currency: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            max_attempts: 3,
            request_timeout: Duration::from_secs(60),
            retry_delay: Duration::from_millis(500),
            currency: "CZK".to_string(),
        }
    }
}

// Totals reported at the end of a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub records_emitted: usize,
    pub duplicates_skipped: usize,
    pub item_errors: usize,
}

// A response body, parsed for the handler its step selects
enum Parsed {
    Menu(CategoryMenu),
    Listing(ListingPage),
}

#[derive(Debug, Default)]
struct PageStats {
    emitted: usize,
    duplicates: usize,
    errors: usize,
}

enum RequestOutcome {
    Succeeded {
        derived: Vec<CrawlRequest>,
        stats: PageStats,
    },
    Failed,
}

pub struct CrawlScheduler {
    fetcher: Arc<dyn Fetcher>,
    sink: Arc<dyn OutputSink>,
    registry: DedupRegistry,
    config: SchedulerConfig,
    base: Url,
    shop: String,
    on_failed: FailureHandler,
}

impl CrawlScheduler {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        sink: Arc<dyn OutputSink>,
        config: SchedulerConfig,
    ) -> Result<Self> {
        let base = base_url()?;
        let shop = shop_name(&base);
        Ok(Self {
            fetcher,
            sink,
            registry: DedupRegistry::new(),
            config,
            base,
            shop,
            on_failed: Box::new(|url| error!("Request {} failed multiple times", url)),
        })
    }

    pub fn with_failure_handler(
        mut self,
        handler: impl Fn(&Url) + Send + Sync + 'static,
    ) -> Self {
        self.on_failed = Box::new(handler);
        self
    }

    // Runs until every discovered request either succeeded or failed
    pub async fn run(&self, seeds: Vec<CrawlRequest>) -> RunSummary {
        // Zero would never start anything
        let max_in_flight = self.config.max_concurrency.max(1);
        let mut queue: VecDeque<CrawlRequest> = seeds.into();
        let mut in_flight = FuturesUnordered::new();
        let mut summary = RunSummary::default();

        info!(seeds = queue.len(), max_in_flight, "crawl started");

        loop {
            // Top up the in-flight set, oldest request first
            while in_flight.len() < max_in_flight {
                match queue.pop_front() {
                    Some(request) => in_flight.push(self.process(request)),
                    None => break,
                }
            }

            // Empty queue and nothing in flight: drained
            let Some(outcome) = in_flight.next().await else {
                break;
            };

            match outcome {
                RequestOutcome::Succeeded { derived, stats } => {
                    summary.succeeded += 1;
                    summary.records_emitted += stats.emitted;
                    summary.duplicates_skipped += stats.duplicates;
                    summary.item_errors += stats.errors;
                    // Derived requests queue behind everything already waiting
                    queue.extend(derived);
                }
                RequestOutcome::Failed => summary.failed += 1,
            }
        }

        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            records = summary.records_emitted,
            unique_items = self.registry.len(),
            "crawler finished"
        );
        summary
    }

    // Tries a request until it parses or the attempts run out. The request
    // keeps its in-flight slot while it backs off.
    async fn process(&self, request: CrawlRequest) -> RequestOutcome {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.attempt(&request).await {
                Ok(parsed) => {
                    let outcome = self.handle(&request, parsed).await;
                    info!(url = %request.target, step = %request.step, "handled page");
                    return outcome;
                }
                Err(e) if attempt < self.config.max_attempts => {
                    let delay = self.backoff(attempt);
                    warn!(
                        url = %request.target,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    warn!(url = %request.target, attempt, error = %e, "request failed, giving up");
                    (self.on_failed)(&request.target);
                    return RequestOutcome::Failed;
                }
            }
        }
    }

    // retry_delay * 2^(attempt - 1): 500 ms, then 1 s with the defaults
    fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.config.retry_delay.saturating_mul(1 << exponent)
    }

    // One try: fetch within the timeout, check status and content type,
    // parse the body for the request's step
    async fn attempt(&self, request: &CrawlRequest) -> Result<Parsed, AttemptError> {
        let timeout = self.config.request_timeout;
        // Outer error: the timer fired. Inner error: the fetch itself failed
        let response = tokio::time::timeout(timeout, self.fetcher.fetch(&request.target))
            .await
            .map_err(|_| FetchError::Timeout(timeout.as_secs()))??;

        if response.status != 200 {
            return Err(AttemptError::HttpStatus(response.status));
        }

        // A missing header counts as unsupported
        let content_type = response.content_type.unwrap_or_default();
        if !is_supported_content_type(&content_type) {
            return Err(AttemptError::UnsupportedContentType(content_type));
        }

        // A body that does not fit its step is a failed try, like a 500
        let parsed = match request.step {
            Step::Categories => Parsed::Menu(serde_json::from_str(&response.body)?),
            Step::Detail => Parsed::Listing(serde_json::from_str(&response.body)?),
        };
        Ok(parsed)
    }

    // Routes a parsed body by step and collects the requests it yields
    async fn handle(&self, request: &CrawlRequest, parsed: Parsed) -> RequestOutcome {
        match parsed {
            Parsed::Menu(menu) => {
                let derived: Vec<_> = expand(&menu.categories).collect();
                info!(url = %request.target, listings = derived.len(), "category menu expanded");
                RequestOutcome::Succeeded {
                    derived,
                    stats: PageStats::default(),
                }
            }
            Parsed::Listing(page) => {
                // The next page depends only on the body, so a page whose
                // items all fail still continues its chain
                let derived: Vec<_> =
                    continue_pagination(&page, &self.base).into_iter().collect();
                let stats = self.emit_items(request, &page).await;
                RequestOutcome::Succeeded { derived, stats }
            }
        }
    }

    // Items of one page are handled in order; a failing item is logged and
    // skipped
    async fn emit_items(&self, request: &CrawlRequest, page: &ListingPage) -> PageStats {
        let breadcrumb_path = page.breadcrumb_path();
        let mut stats = PageStats::default();

        for value in page.items() {
            match self.emit_item(value, &breadcrumb_path).await {
                Ok(true) => stats.emitted += 1,
                Ok(false) => stats.duplicates += 1,
                Err(e) => {
                    warn!(url = %request.target, error = %e, "skipping item");
                    stats.errors += 1;
                }
            }
        }
        stats
    }

    // Returns Ok(false) when the item was already emitted in this run.
    //
    // The record counts as emitted once the sink accepted it. A markup write
    // that fails after that is logged and does not undo the record.
    async fn emit_item(
        &self,
        value: &serde_json::Value,
        breadcrumb_path: &str,
    ) -> Result<bool, ItemError> {
        let item = RawItem::from_value(value)?;
        let record = normalize(&item, breadcrumb_path, &self.base)?;

        // The id is claimed before the sink runs. If the sink then rejects
        // the record, later copies of the item are still skipped as
        // duplicates for the rest of the run.
        if !self.registry.should_emit(&record.item_id) {
            debug!(item_id = %record.item_id, "duplicate item");
            return Ok(false);
        }

        let slug = record.slug();
        self.sink.emit(&record, &self.shop, &slug).await?;

        let markup = to_product_markup(&record, &self.config.currency);
        if let Err(e) = self.sink.store_markup(&slug, &markup).await {
            warn!(item_id = %record.item_id, slug = %slug, error = %e, "failed to store markup");
        }
        Ok(true)
    }
}

// JSON bodies arrive as application/json or, from some endpoints, text/plain
fn is_supported_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    matches!(essence.as_str(), "application/json" | "text/plain")
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. Why FuturesUnordered instead of spawning tasks?
//    - Every in-flight request is a future polled by the run loop itself
//    - The queue is only touched by that loop, so it needs no lock
//    - in_flight.len() is the concurrency ceiling; nothing else to track
//
// 2. Why can page N+1 never start before page N?
//    - The next page's URL comes from page N's body, so its request only
//      exists once page N has been handled
//
// 3. What is shared between in-flight pages?
//    - Only the DedupRegistry. Two listings can carry the same product, so
//      its check-and-set has to be a single atomic operation
//
// 4. Why does a retrying request keep its slot?
//    - The backoff sleep happens inside `process`, so a struggling host
//      never has more than `max_concurrency` requests aimed at it
// -----------------------------------------------------------------------------
