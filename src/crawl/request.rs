// src/crawl/request.rs
// =============================================================================
// Crawl requests and the URLs they point at.
//
// Every request carries a `Step` that tells the scheduler which handler
// processes the response:
// - Categories: the category menu, expanded into listing requests
// - Detail: one page of a product listing
//
// The listing URL helpers live here too, so every place that builds a
// listing request produces exactly the same URL shape.
// =============================================================================

use anyhow::{anyhow, Result};
use std::fmt;
use url::Url;

/// Root of the shop; relative product and pagination URLs resolve against it.
pub const BASE_URL: &str = "https://www.kosik.cz/";

/// Category menu endpoint, the seed of a normal run.
pub const CATEGORY_MENU_URL: &str = "https://www.kosik.cz/api/web/menu/main";

/// Items requested per listing page.
pub const PAGE_SIZE: u32 = 60;

// Which handler processes the response of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Response is the category menu
    Categories,
    /// Response is a page of a product listing
    Detail,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Categories => f.write_str("CATEGORIES"),
            Step::Detail => f.write_str("DETAIL"),
        }
    }
}

// A unit of work in the crawl queue. Never mutated once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlRequest {
    pub target: Url,
    pub step: Step,
}

impl CrawlRequest {
    pub fn categories(target: Url) -> Self {
        Self {
            target,
            step: Step::Categories,
        }
    }

    pub fn detail(target: Url) -> Self {
        Self {
            target,
            step: Step::Detail,
        }
    }
}

// Parses the shop's base URL. The constant is known to be valid, but we
// still propagate instead of panicking.
pub fn base_url() -> Result<Url> {
    Url::parse(BASE_URL).map_err(|e| anyhow!("Invalid base URL '{}': {}", BASE_URL, e))
}

// Builds the listing API URL for a site-relative category path
//
// Example:
//   "/ovoce"  ->  https://www.kosik.cz/api/web/page/products?slug=ovoce&limit=60
pub fn listing_url(path: &str) -> Result<Url> {
    let slug = path.strip_prefix('/').unwrap_or(path);
    let raw = format!("{}api/web/page/products?slug={}&limit={}", BASE_URL, slug, PAGE_SIZE);
    Url::parse(&raw).map_err(|e| anyhow!("Invalid listing URL '{}': {}", raw, e))
}

// Builds the listing API URL for a full page URL (seed-list mode)
//
// Example:
//   "https://www.kosik.cz/listy/bf"  ->  ...products?slug=listy/bf&limit=60
pub fn listing_url_for_page(page_url: &str) -> Result<Url> {
    let page = Url::parse(page_url)
        .map_err(|e| anyhow!("Invalid listing page URL '{}': {}", page_url, e))?;
    listing_url(page.path())
}

// Seed for a normal run: the category menu
pub fn menu_seed() -> Result<Vec<CrawlRequest>> {
    let url = Url::parse(CATEGORY_MENU_URL)?;
    Ok(vec![CrawlRequest::categories(url)])
}

// Seeds for seed-list mode: one listing request per configured page URL
pub fn seed_list(page_urls: &[String]) -> Result<Vec<CrawlRequest>> {
    page_urls
        .iter()
        .map(|page| listing_url_for_page(page).map(CrawlRequest::detail))
        .collect()
}
