// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Subcommands:
// - crawl: crawl a site and print its link graph (DOT or JSON)
// - key:   print the deduplication key for one or more addresses
// =============================================================================

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "dotler",
    version,
    about = "Crawl a website and map its pages, links and static assets as a graph",
    long_about = "dotler crawls a website concurrently, visiting every page at most once, \
                  and writes the resulting link graph in Graphviz DOT format (or JSON)."
)]
pub struct Cli {
    /// Log progress (same as RUST_LOG=info)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a website and print its link graph
    ///
    /// Example: dotler crawl https://example.com --max-depth 3 > site.dot
    Crawl {
        /// Website URL to start from (e.g., https://example.com)
        start_url: String,

        /// Maximum crawl depth
        ///
        /// Depth 1 = just the starting page
        /// Depth 2 = starting page + all pages it links to
        #[arg(long, default_value_t = 2)]
        max_depth: usize,

        /// Number of pages fetched at the same time
        #[arg(long, default_value_t = 8)]
        workers: usize,

        /// How many times a failed fetch is retried before giving up
        #[arg(long, default_value_t = 2)]
        max_retries: u32,

        /// Per-request timeout in seconds
        #[arg(long, default_value_t = 10)]
        timeout_secs: u64,

        /// Output the graph as JSON instead of DOT
        #[arg(long)]
        json: bool,

        /// Write the graph to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the deduplication key for each address
    ///
    /// Example: dotler key https://example.com/docs http://example.com/docs
    Key {
        /// One or more absolute addresses
        #[arg(required = true)]
        addresses: Vec<String>,
    },
}
