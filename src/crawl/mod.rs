// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling.
//
// Submodules:
// - queue: breadth-first crawl loop driving the visitation registry
// - fetch: HTTP client and page fetching
// - extract: finds links and static assets in fetched HTML
//
// Features:
// - Concurrent fetching with a configurable number of workers
// - Same-host restriction (off-site links are recorded but never fetched)
// - Configurable depth limit
// - Failed fetches are retried a configurable number of times
// =============================================================================

mod extract;
mod fetch;
mod queue;

// Re-export the main crawling entry points
pub use queue::{crawl_site, CrawlConfig, CrawlSummary};
