// src/main.rs
// =============================================================================
// This is the entry point of dotler.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (env_logger, driven by RUST_LOG or --verbose)
// 3. Start the visitation registry and run the crawl
// 4. Write the link graph as DOT or JSON
// 5. Exit with proper code (0 = success, 1 = pages given up, 2 = fatal error)
//
// Fatal errors are never handled deep inside the crawl. They travel back up
// as anyhow::Error to main(), which logs them and stops the process.
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use log::{error, info, warn};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use dotler::crawl::{self, CrawlConfig};
use dotler::graph;
use dotler::registry::{self, NodeMap, Shutdown};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            error!("dotler has come to a halt: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

async fn run(cli: Cli) -> Result<i32> {
    match cli.command {
        Commands::Crawl {
            start_url,
            max_depth,
            workers,
            max_retries,
            timeout_secs,
            json,
            output,
        } => {
            let start_url = Url::parse(&start_url)
                .with_context(|| format!("Invalid URL '{}'", start_url))?;
            let config = CrawlConfig {
                max_depth,
                workers,
                max_retries,
                timeout: Duration::from_secs(timeout_secs),
                ..CrawlConfig::new(start_url)
            };
            handle_crawl(config, json, output).await
        }
        Commands::Key { addresses } => handle_key(&addresses),
    }
}

// Handles the 'crawl' subcommand
async fn handle_crawl(config: CrawlConfig, json: bool, output: Option<PathBuf>) -> Result<i32> {
    info!("crawling {} (max depth {})", config.start_url, config.max_depth);

    let shutdown = Shutdown::new();
    let registry = NodeMap::spawn(&shutdown);

    // Ctrl-C stops the registry; the crawl then fails with a Shutdown error
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted, shutting down");
                shutdown.trigger();
            }
        });
    }

    let summary = crawl::crawl_site(&config, &registry)
        .await
        .context("crawl aborted")?;
    let pages = registry.pages().await.context("failed to read the crawl graph")?;
    shutdown.trigger();

    info!(
        "registered {} page(s), fetched {}, {} not HTML, {} given up",
        pages.len(),
        summary.fetched,
        summary.not_html,
        summary.given_up.len()
    );

    let rendered = if json {
        serde_json::to_string_pretty(&graph::build_report(&pages))?
    } else {
        graph::render_dot(&pages)
    };

    match output {
        Some(path) => tokio::fs::write(&path, rendered)
            .await
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", rendered),
    }

    for url in &summary.given_up {
        warn!("gave up on {}", url);
    }

    if summary.given_up.is_empty() {
        Ok(0)
    } else {
        Ok(1)
    }
}

// Handles the 'key' subcommand
fn handle_key(addresses: &[String]) -> Result<i32> {
    for address in addresses {
        let key = registry::normalize_key(address)?;
        println!("{}\t{}", address, key);
    }
    Ok(0)
}
