// src/crawl/extract.rs
// =============================================================================
// Pulls links and static assets out of a fetched HTML page.
//
// We use the `scraper` crate to parse the document and CSS selectors to find:
// - <a href>                              -> outbound links
// - <script src>, <img src>               -> static assets
// - <link href rel="stylesheet" | "icon"> -> static assets
//
// Every value is resolved against the page URL with the `url` crate, and only
// http/https results are kept. Fragments are dropped from links so
// /docs#intro and /docs count as the same target.
// =============================================================================

use scraper::{Html, Selector};
use url::Url;

/// What one page points at. Links keep duplicates, because each anchor
/// counts towards the link's cardinality.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub links: Vec<Url>,
    pub statics: Vec<Url>,
}

pub fn extract_page(html: &str, base: &Url) -> Extracted {
    let document = Html::parse_document(html);

    // These selectors are constants, so parsing them can only fail through a
    // typo here, never through user input
    let anchors = Selector::parse("a[href]").expect("valid anchor selector");
    let sources = Selector::parse("script[src], img[src]").expect("valid source selector");
    let stylesheets = Selector::parse("link[href][rel~=stylesheet], link[href][rel~=icon]")
        .expect("valid stylesheet selector");

    let links = document
        .select(&anchors)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| resolve_link(base, href))
        .collect();

    let statics = document
        .select(&sources)
        .filter_map(|element| element.value().attr("src"))
        .chain(
            document
                .select(&stylesheets)
                .filter_map(|element| element.value().attr("href")),
        )
        .filter_map(|src| resolve_link(base, src))
        .collect();

    Extracted { links, statics }
}

// Resolves a link (possibly relative) to an absolute http/https URL
fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();

    // Skip anchors and special protocols
    if href.is_empty()
        || href.starts_with('#')
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("javascript:")
        || href.starts_with("data:")
    {
        return None;
    }

    let mut url = base.join(href).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}
