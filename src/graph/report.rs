// src/graph/report.rs
// =============================================================================
// JSON-friendly view of the crawl graph, used by `dotler crawl --json`.
//
// Page itself holds locks and atomics, so it is not serialized directly.
// Instead we take a snapshot of each page into plain structs that derive
// Serialize.
// =============================================================================

use serde::Serialize;
use std::sync::Arc;

use super::Page;

#[derive(Debug, Clone, Serialize)]
pub struct PageReport {
    /// Normalized key the page is registered under
    pub key: String,
    /// Full address, scheme included
    pub address: String,
    pub fail_count: u32,
    pub out_links: Vec<LinkReport>,
    pub static_assets: Vec<AssetReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkReport {
    pub key: String,
    pub address: String,
    pub card: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetReport {
    pub title: String,
    pub address: String,
}

impl PageReport {
    pub fn from_page(key: &str, page: &Page) -> Self {
        Self {
            key: key.to_string(),
            address: page.address().to_string(),
            fail_count: page.fail_count(),
            out_links: page
                .out_links()
                .into_iter()
                .map(|link| LinkReport {
                    key: link.key,
                    address: link.address.to_string(),
                    card: link.card,
                })
                .collect(),
            static_assets: page
                .static_assets()
                .into_iter()
                .map(|(_, asset)| AssetReport {
                    title: asset.title,
                    address: asset.address.to_string(),
                })
                .collect(),
        }
    }
}

// Builds one report per page, sorted by key
pub fn build_report(pages: &[(String, Arc<Page>)]) -> Vec<PageReport> {
    let mut reports: Vec<PageReport> = pages
        .iter()
        .map(|(key, page)| PageReport::from_page(key, page))
        .collect();
    reports.sort_by(|a, b| a.key.cmp(&b.key));
    reports
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn test_report_serializes_links_and_assets() {
        let page = Arc::new(Page::new(Url::parse("https://example.com/").unwrap()));
        page.record_link(&Url::parse("https://example.com/docs").unwrap()).unwrap();
        page.record_link(&Url::parse("https://example.com/docs").unwrap()).unwrap();
        page.record_static(Url::parse("https://example.com/style.css").unwrap()).unwrap();
        page.record_failure();

        let reports = build_report(&[("example.com/".to_string(), page)]);
        let json = serde_json::to_value(&reports).unwrap();

        assert_eq!(json[0]["key"], "example.com/");
        assert_eq!(json[0]["address"], "https://example.com/");
        assert_eq!(json[0]["fail_count"], 1);
        assert_eq!(json[0]["out_links"][0]["card"], 2);
        assert_eq!(json[0]["static_assets"][0]["title"], "style.css");
    }
}
