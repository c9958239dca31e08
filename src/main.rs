// src/main.rs
// =============================================================================
// Entry point of the crawler.
//
// What happens here:
// 1. Parse command-line arguments (or their environment variables)
// 2. Set up logging
// 3. Seed the queue: category menu, or the promo pages in bf mode
// 4. Run the crawl until the queue drains
// 5. Write the publish manifest (skipped in development)
// 6. Print a summary and exit with a code
//    (0 = every request succeeded, 1 = some requests failed, 2 = error)
// =============================================================================

mod cli;
mod crawl;
mod error;
mod product;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Mode};
use crawl::{CrawlScheduler, HttpFetcher, RunSummary, SchedulerConfig};
use product::{JsonLinesSink, OutputSink, PublishManifest};

/// CDN distribution path the export is served under
const CDN_PATH: &str = "kosik.cz";

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,shop_crawler=info,reqwest=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let exit_code = match run(Cli::parse()).await {
        Ok(summary) if summary.failed > 0 => 1,
        Ok(_) => 0,
        Err(e) => {
            error!("{:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<RunSummary> {
    info!(
        country = %cli.country,
        mode = ?cli.mode,
        max_concurrency = cli.max_concurrency,
        development = cli.development,
        "starting crawl"
    );

    let seeds = match cli.mode {
        Mode::Categories => crawl::menu_seed()?,
        Mode::Bf => crawl::seed_list(&cli.bf_urls).context("Invalid bf listing URL")?,
    };

    let config = SchedulerConfig {
        max_concurrency: cli.max_concurrency,
        ..SchedulerConfig::default()
    };

    let proxy = cli.effective_proxy();
    if let Some(proxy) = proxy {
        info!(groups = ?cli.proxy_groups, proxy, "routing requests through proxy");
    } else if !cli.development {
        warn!(groups = ?cli.proxy_groups, "no proxy URL configured, requests go out directly");
    }
    let fetcher = HttpFetcher::new(config.request_timeout, proxy)
        .context("Failed to create HTTP client")?;

    let sink = Arc::new(
        JsonLinesSink::create(&cli.output)
            .await
            .with_context(|| format!("Failed to open output directory {}", cli.output.display()))?,
    );

    let scheduler = CrawlScheduler::new(Arc::new(fetcher), sink.clone(), config)?;
    let summary = scheduler.run(seeds).await;

    sink.finish().await.context("Failed to flush output")?;

    if cli.development {
        info!("development run, skipping publish manifest");
    } else {
        let manifest = PublishManifest {
            table: cli.table_name(),
            cdn_path: CDN_PATH.to_string(),
            records: summary.records_emitted,
            failed_requests: summary.failed,
        };
        let path = manifest
            .write(sink.dir())
            .await
            .context("Failed to write publish manifest")?;
        info!(path = %path.display(), table = %manifest.table, "publish manifest written");
    }

    print_summary(&summary, cli.json)?;
    Ok(summary)
}

// Prints the run summary either as a table or JSON
fn print_summary(summary: &RunSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!("📊 Summary:");
    println!("   ✅ Requests succeeded: {}", summary.succeeded);
    println!("   ❌ Requests failed:    {}", summary.failed);
    println!("   📦 Records emitted:    {}", summary.records_emitted);
    println!("   🔁 Duplicates skipped: {}", summary.duplicates_skipped);
    println!("   ⚠️  Item errors:        {}", summary.item_errors);
    Ok(())
}
