// src/cli.rs
// =============================================================================
// Command-line interface and run configuration, built with clap's derive API.
//
// Every flag can also be set through an environment variable, which is how
// scheduled runs pass their input.
// =============================================================================

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Default page for seed-list mode
pub const DEFAULT_BF_URL: &str = "https://www.kosik.cz/listy/bf-nanecisto-2021";

#[derive(Parser, Debug)]
#[command(
    name = "shop-crawler",
    version,
    about = "Crawls kosik.cz category listings and exports normalized product records",
    long_about = "shop-crawler expands the shop's category menu into paginated listing requests, \
                  skips items already seen in this run, and writes one record plus schema.org \
                  markup per product."
)]
pub struct Cli {
    /// Country code of the shop
    #[arg(long, env = "CRAWLER_COUNTRY", default_value = "cz")]
    pub country: String,

    /// Maximum number of requests in flight at once
    #[arg(long, env = "CRAWLER_MAX_CONCURRENCY", default_value_t = 4)]
    pub max_concurrency: usize,

    /// Proxy group to route requests through (repeatable)
    #[arg(
        long = "proxy-group",
        env = "CRAWLER_PROXY_GROUPS",
        value_delimiter = ',',
        default_value = "CZECH_LUMINATI"
    )]
    pub proxy_groups: Vec<String>,

    /// Proxy endpoint serving the selected groups
    #[arg(long, env = "CRAWLER_PROXY_URL")]
    pub proxy_url: Option<String>,

    /// Where to start: the category menu, or a fixed list of promo pages
    #[arg(long, env = "CRAWLER_MODE", value_enum, default_value_t = Mode::Categories)]
    pub mode: Mode,

    /// Promo listing page crawled in bf mode (repeatable)
    #[arg(
        long = "bf-url",
        env = "CRAWLER_BF_URLS",
        value_delimiter = ',',
        default_value = DEFAULT_BF_URL
    )]
    pub bf_urls: Vec<String>,

    /// Development run: no proxy, no publish manifest
    #[arg(long, env = "CRAWLER_DEVELOPMENT")]
    pub development: bool,

    /// Output directory for products, markup and the publish manifest
    #[arg(long, env = "CRAWLER_OUTPUT", default_value = "storage")]
    pub output: PathBuf,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Seed with the category menu
    Categories,
    /// Seed with the promo listing pages
    Bf,
}

impl Cli {
    // Warehouse table the export belongs to. The shop has one table for
    // every country it serves.
    pub fn table_name(&self) -> String {
        match self.mode {
            Mode::Categories => "kosik".to_string(),
            Mode::Bf => "kosik_bf".to_string(),
        }
    }

    // Development runs go out directly
    pub fn effective_proxy(&self) -> Option<&str> {
        if self.development {
            None
        } else {
            self.proxy_url.as_deref()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["shop-crawler"]);
        assert_eq!(cli.country, "cz");
        assert_eq!(cli.max_concurrency, 4);
        assert_eq!(cli.mode, Mode::Categories);
        assert_eq!(cli.proxy_groups, vec!["CZECH_LUMINATI"]);
        assert_eq!(cli.bf_urls, vec![DEFAULT_BF_URL]);
        assert!(!cli.development);
        assert_eq!(cli.table_name(), "kosik");
    }

    #[test]
    fn test_bf_mode_table() {
        let cli = Cli::parse_from([
            "shop-crawler",
            "--mode",
            "bf",
            "--bf-url",
            "https://www.kosik.cz/listy/a",
            "--bf-url",
            "https://www.kosik.cz/listy/b",
        ]);
        assert_eq!(cli.table_name(), "kosik_bf");
        assert_eq!(cli.bf_urls.len(), 2);
    }

    #[test]
    fn test_development_disables_proxy() {
        let cli = Cli::parse_from([
            "shop-crawler",
            "--proxy-url",
            "http://proxy:8000",
            "--development",
        ]);
        assert_eq!(cli.effective_proxy(), None);
    }
}
