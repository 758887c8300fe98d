// src/crawl/fetch.rs
// =============================================================================
// Fetches pages over HTTP.
//
// One reqwest Client is built per crawl and cloned into every worker (cloning
// is cheap, the connection pool is shared).
//
// A fetch succeeds when the server answers 2xx. If the body is HTML we hand it
// back for link extraction; anything else (PDFs, images served at page-like
// URLs) is still a success, there is just nothing to parse.
// =============================================================================

use anyhow::{anyhow, Context, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use url::Url;

pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::limited(5))
        .user_agent(concat!("dotler/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")
}

/// A successfully fetched HTML page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Where the body actually came from, after redirects. Relative links in
    /// the body resolve against this, not against the requested address.
    pub final_url: Url,
    pub html: String,
}

// Fetches a page
//
// Returns:
//   Ok(Some(page)) for an HTML page
//   Ok(None) for a successful non-HTML response
//   Err for network errors and non-2xx statuses
pub async fn fetch_page(client: &Client, url: &Url) -> Result<Option<FetchedPage>> {
    let response = client.get(url.as_str()).send().await?;

    if !response.status().is_success() {
        return Err(anyhow!("HTTP {}", response.status()));
    }

    let is_html = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.contains("text/html") || value.contains("application/xhtml"))
        // no content type at all: assume HTML and let the parser decide
        .unwrap_or(true);

    if !is_html {
        return Ok(None);
    }

    // text() consumes the response, so grab the final URL first
    let final_url = response.url().clone();
    let html = response.text().await?;
    Ok(Some(FetchedPage { final_url, html }))
}
