// src/crawl/mod.rs
// =============================================================================
// This module discovers and fetches the shop's listing pages.
//
// Submodules:
// - request:    crawl requests, their step, listing URL builders and seeds
// - tree:       category menu -> listing requests (children first)
// - pagination: listing page -> next page request
// - fetch:      the Fetcher trait and its reqwest implementation
// - scheduler:  the queue, retries and concurrency limit tying it together
// =============================================================================

mod fetch;
mod pagination;
mod request;
mod scheduler;
mod tree;

pub use fetch::HttpFetcher;
pub use request::{menu_seed, seed_list};
pub use scheduler::{CrawlScheduler, RunSummary, SchedulerConfig};
