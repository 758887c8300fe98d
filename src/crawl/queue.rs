// src/crawl/queue.rs
// =============================================================================
// This module crawls a website breadth-first and fills the visitation
// registry as it goes.
//
// How it works:
// 1. Register the start page and put it in the first round
// 2. Fetch every page of the round concurrently (up to `workers` at once)
// 3. Record each page's links and static assets on the page itself
// 4. For same-host links still within the depth limit: ask the registry if
//    the target is known, and if not, claim it with Add. Only the worker whose
//    Add succeeds schedules the page, so nothing is fetched twice.
// 5. Pages whose fetch failed go back into the next round until they run out
//    of retries
// 6. Repeat until a round comes back empty
//
// The registry is the only shared state. Workers never lock anything; the
// page they claimed is theirs to fill in.
// =============================================================================

use anyhow::{anyhow, Context, Result};
use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use super::extract::extract_page;
use super::fetch::{build_client, fetch_page};
use crate::graph::Page;
use crate::registry::{NodeMap, RegistryError};

/// Settings for one crawl, built from the command line.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub start_url: Url,
    /// 1 = only the start page, 2 = the start page and the pages it links to
    pub max_depth: usize,
    /// Pages fetched concurrently
    pub workers: usize,
    /// Extra attempts after a failed fetch
    pub max_retries: u32,
    pub timeout: Duration,
}

impl CrawlConfig {
    pub fn new(start_url: Url) -> Self {
        Self {
            start_url,
            max_depth: 2,
            workers: 8,
            max_retries: 2,
            timeout: Duration::from_secs(10),
        }
    }
}

/// What happened during a crawl. The graph itself lives in the registry.
#[derive(Debug, Default)]
pub struct CrawlSummary {
    /// Pages fetched successfully
    pub fetched: usize,
    /// Successful fetches that were not HTML
    pub not_html: usize,
    /// Pages abandoned after exhausting their retries
    pub given_up: Vec<Url>,
}

// A page waiting to be fetched
#[derive(Debug, Clone)]
struct CrawlItem {
    page: Arc<Page>,
    depth: usize,
}

// The part of the web this crawl stays on: the start URL's host and port.
//
// The port is compared through port_or_known_default, so http://site/ and
// http://site:80/ are the same place, while http://site:8080/ is not.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SiteScope {
    host: String,
    port: Option<u16>,
}

impl SiteScope {
    fn of(url: &Url) -> Result<Self> {
        let host = url
            .host_str()
            .ok_or_else(|| anyhow!("URL has no host: {}", url))?
            .to_string();
        Ok(Self {
            host,
            port: url.port_or_known_default(),
        })
    }

    fn contains(&self, url: &Url) -> bool {
        url.host_str() == Some(self.host.as_str()) && url.port_or_known_default() == self.port
    }
}

enum Visit {
    Fetched { discovered: Vec<CrawlItem> },
    NotHtml,
    Failed(CrawlItem),
}

pub async fn crawl_site(config: &CrawlConfig, registry: &NodeMap) -> Result<CrawlSummary> {
    let scope = SiteScope::of(&config.start_url)?;

    let client = build_client(config.timeout)?;

    let root = Arc::new(Page::new(config.start_url.clone()));
    registry
        .add(config.start_url.as_str(), Arc::clone(&root))
        .await
        .context("failed to register the start page")?;

    let mut round = vec![CrawlItem { page: root, depth: 1 }];
    let mut summary = CrawlSummary::default();

    while !round.is_empty() {
        info!("crawling {} page(s)", round.len());

        let visits: Vec<Result<Visit>> = stream::iter(round.into_iter().map(|item| {
            let client = client.clone();
            let scope = &scope;
            async move { visit(&client, registry, item, scope, config.max_depth).await }
        }))
        .buffer_unordered(config.workers.max(1))
        .collect()
        .await;

        let mut next = Vec::new();
        for outcome in visits {
            match outcome? {
                Visit::Fetched { discovered } => {
                    summary.fetched += 1;
                    next.extend(discovered);
                }
                Visit::NotHtml => {
                    summary.fetched += 1;
                    summary.not_html += 1;
                }
                Visit::Failed(item) => {
                    if item.page.fail_count() > config.max_retries {
                        warn!(
                            "giving up on {} after {} attempt(s)",
                            item.page.address(),
                            item.page.fail_count()
                        );
                        summary.given_up.push(item.page.address().clone());
                    } else {
                        next.push(item);
                    }
                }
            }
        }
        round = next;
    }

    Ok(summary)
}

// Fetches one page, records what it links to and claims the targets worth
// crawling next.
//
// Registry errors other than KeyExists mean the crawl cannot continue and are
// returned as errors.
async fn visit(
    client: &Client,
    registry: &NodeMap,
    item: CrawlItem,
    scope: &SiteScope,
    max_depth: usize,
) -> Result<Visit> {
    let url = item.page.address().clone();
    debug!("fetching [depth {}] {}", item.depth, url);

    let fetched = match fetch_page(client, &url).await {
        Ok(Some(fetched)) => fetched,
        Ok(None) => return Ok(Visit::NotHtml),
        Err(e) => {
            let failures = item.page.record_failure();
            warn!("failed to fetch {} (attempt {}): {}", url, failures, e);
            return Ok(Visit::Failed(item));
        }
    };

    if fetched.final_url != url {
        debug!("{} redirected to {}", url, fetched.final_url);
    }

    // Resolve against where the body came from: after /docs -> /docs/, the
    // link "intro" means /docs/intro
    let extracted = extract_page(&fetched.html, &fetched.final_url);

    for asset in extracted.statics {
        item.page.record_static(asset)?;
    }

    let mut discovered = Vec::new();
    for link in extracted.links {
        // Count every anchor, even ones we will not follow
        if item.page.record_link(&link)? > 1 {
            continue;
        }

        if item.depth >= max_depth || !scope.contains(&link) {
            continue;
        }

        if registry.exists(link.as_str()).await?.is_some() {
            continue;
        }

        let page = Arc::new(Page::new(link.clone()));
        match registry.add(link.as_str(), Arc::clone(&page)).await {
            Ok(()) => discovered.push(CrawlItem {
                page,
                depth: item.depth + 1,
            }),
            // Another worker claimed it between our Exists and Add
            Err(RegistryError::KeyExists(key)) => debug!("already claimed: {}", key),
            Err(e) => return Err(e.into()),
        }
    }

    Ok(Visit::Fetched { discovered })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Shutdown;

    fn config(start: &str) -> CrawlConfig {
        let mut config = CrawlConfig::new(Url::parse(start).unwrap());
        config.timeout = Duration::from_secs(5);
        config
    }

    #[tokio::test]
    async fn test_two_page_cycle_registers_two_pages() {
        let mut server = mockito::Server::new_async().await;
        let base = server.url();
        let _root = server
            .mock("GET", "/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(r#"<a href="/a">A</a><a href="/a">A again</a><script src="/app.js"></script>"#)
            .create_async()
            .await;
        let _a = server
            .mock("GET", "/a")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(r#"<a href="/">Home</a>"#)
            .create_async()
            .await;

        let shutdown = Shutdown::new();
        let registry = NodeMap::spawn(&shutdown);
        let config = config(&format!("{}/", base));

        let summary = crawl_site(&config, &registry).await.unwrap();

        assert_eq!(summary.fetched, 2);
        assert!(summary.given_up.is_empty());

        let pages = registry.pages().await.unwrap();
        assert_eq!(pages.len(), 2);

        let root = registry.exists(format!("{}/", base)).await.unwrap().unwrap();
        let a_key = crate::registry::normalize_key(&format!("{}/a", base)).unwrap();
        assert_eq!(root.out_link(&a_key).unwrap().card, 2);
        assert_eq!(root.static_assets().len(), 1);

        let a = registry.exists(format!("{}/a", base)).await.unwrap().unwrap();
        let root_key = crate::registry::normalize_key(&format!("{}/", base)).unwrap();
        assert_eq!(a.out_link(&root_key).unwrap().card, 1);
    }

    #[tokio::test]
    async fn test_depth_limit_records_but_does_not_follow() {
        let mut server = mockito::Server::new_async().await;
        let base = server.url();
        let _root = server
            .mock("GET", "/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(r#"<a href="/a">A</a>"#)
            .create_async()
            .await;

        let shutdown = Shutdown::new();
        let registry = NodeMap::spawn(&shutdown);
        let mut config = config(&format!("{}/", base));
        config.max_depth = 1;

        let summary = crawl_site(&config, &registry).await.unwrap();

        assert_eq!(summary.fetched, 1);
        assert_eq!(registry.pages().await.unwrap().len(), 1);
        assert!(registry.exists(format!("{}/a", base)).await.unwrap().is_none());

        let root = registry.exists(format!("{}/", base)).await.unwrap().unwrap();
        assert_eq!(root.out_links().len(), 1);
    }

    #[tokio::test]
    async fn test_failing_page_is_retried_then_given_up() {
        let mut server = mockito::Server::new_async().await;
        let broken = server
            .mock("GET", "/")
            .with_status(500)
            .expect(3)
            .create_async()
            .await;

        let shutdown = Shutdown::new();
        let registry = NodeMap::spawn(&shutdown);
        let mut config = config(&format!("{}/", server.url()));
        config.max_retries = 2;

        let summary = crawl_site(&config, &registry).await.unwrap();

        assert_eq!(summary.fetched, 0);
        assert_eq!(summary.given_up.len(), 1);

        let root = registry
            .exists(format!("{}/", server.url()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(root.fail_count(), 3);
        broken.assert_async().await;
    }

    #[tokio::test]
    async fn test_crawl_after_shutdown_fails() {
        let shutdown = Shutdown::new();
        let registry = NodeMap::spawn(&shutdown);
        shutdown.trigger();

        let result = crawl_site(&config("http://127.0.0.1:9/"), &registry).await;
        assert!(result.is_err());
    }

    #[test]
    fn test_scope_compares_host_and_port() {
        let scope = SiteScope::of(&Url::parse("http://example.com/").unwrap()).unwrap();

        assert!(scope.contains(&Url::parse("http://example.com/docs").unwrap()));
        assert!(scope.contains(&Url::parse("http://example.com:80/docs").unwrap()));
        assert!(!scope.contains(&Url::parse("http://example.com:8080/docs").unwrap()));
        assert!(!scope.contains(&Url::parse("http://other.com/docs").unwrap()));
    }

    #[tokio::test]
    async fn test_links_resolve_against_redirect_target() {
        let mut server = mockito::Server::new_async().await;
        let base = server.url();
        let _root = server
            .mock("GET", "/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(r#"<a href="/docs">Docs</a>"#)
            .create_async()
            .await;
        let _moved = server
            .mock("GET", "/docs")
            .with_status(301)
            .with_header("location", "/docs/")
            .create_async()
            .await;
        let _docs = server
            .mock("GET", "/docs/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(r#"<a href="intro">Intro</a>"#)
            .create_async()
            .await;
        let _intro = server
            .mock("GET", "/docs/intro")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("intro")
            .create_async()
            .await;

        let shutdown = Shutdown::new();
        let registry = NodeMap::spawn(&shutdown);
        let mut config = config(&format!("{}/", base));
        config.max_depth = 3;

        let summary = crawl_site(&config, &registry).await.unwrap();

        assert!(summary.given_up.is_empty());
        assert_eq!(summary.fetched, 3);

        // the page stays registered under the address it was claimed with
        let docs = registry.exists(format!("{}/docs", base)).await.unwrap().unwrap();
        let intro_key = crate::registry::normalize_key(&format!("{}/docs/intro", base)).unwrap();
        let wrong_key = crate::registry::normalize_key(&format!("{}/intro", base)).unwrap();
        assert!(docs.out_link(&intro_key).is_some());
        assert!(docs.out_link(&wrong_key).is_none());
        assert!(registry.exists(format!("{}/docs/intro", base)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_same_host_other_port_is_not_followed() {
        let mut server = mockito::Server::new_async().await;
        let base = server.url();
        let _root = server
            .mock("GET", "/")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body(r#"<a href="http://127.0.0.1:9/elsewhere">Elsewhere</a>"#)
            .create_async()
            .await;

        let shutdown = Shutdown::new();
        let registry = NodeMap::spawn(&shutdown);

        let summary = crawl_site(&config(&format!("{}/", base)), &registry)
            .await
            .unwrap();

        assert_eq!(summary.fetched, 1);
        assert!(summary.given_up.is_empty());
        assert_eq!(registry.pages().await.unwrap().len(), 1);

        let root = registry.exists(format!("{}/", base)).await.unwrap().unwrap();
        assert!(root.out_link("127.0.0.1:9/elsewhere").is_some());
    }
}
