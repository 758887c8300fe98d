// src/graph/page.rs
// =============================================================================
// The entities the crawl graph is built from.
//
// - Page: one crawled resource, its outbound links and its static assets
// - PageLink: an outbound link together with how many times it appears
// - StaticAsset: a script, stylesheet or image referenced by a page
//
// Links never point at another Page directly. They carry the target's
// normalized key, and the target is looked up through the registry. That
// keeps the graph free of reference cycles even when A links to B and B
// links back to A.
//
// Rust concepts:
// - Arc<Page>: pages are shared between the registry and the crawl workers
// - Interior mutability: RwLock and AtomicU32 let the worker that claimed a
//   page fill it in through a shared reference
// =============================================================================

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use url::Url;

use crate::registry::{normalize_key, RegistryError};

/// A non-page resource (script, style, image) referenced by a page.
/// Recorded, never crawled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticAsset {
    /// Last path component of the asset, e.g. `qq.js`
    pub title: String,
    pub address: Url,
}

impl StaticAsset {
    pub fn new(address: Url) -> Self {
        Self {
            title: get_stat_title(&address),
            address,
        }
    }
}

/// An outbound link and its cardinality (number of anchors on the page
/// pointing at the same target).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLink {
    /// Full address of the target, scheme included
    pub address: Url,
    /// Normalized key of the target, used to resolve it through the registry
    pub key: String,
    pub card: u32,
}

#[derive(Debug, Default)]
struct LinkTables {
    out_links: HashMap<String, PageLink>,
    static_assets: HashMap<String, StaticAsset>,
}

/// One crawled resource.
///
/// `address` keeps the full original URL (scheme included) because that is
/// what gets fetched. The link tables are keyed by normalized key.
#[derive(Debug)]
pub struct Page {
    address: Url,
    tables: RwLock<LinkTables>,
    fail_count: AtomicU32,
}

impl Page {
    pub fn new(address: Url) -> Self {
        Self {
            address,
            tables: RwLock::new(LinkTables::default()),
            fail_count: AtomicU32::new(0),
        }
    }

    pub fn address(&self) -> &Url {
        &self.address
    }

    // Records one anchor pointing at `target`.
    //
    // Returns the cardinality of the link after this occurrence, so the
    // first anchor yields 1, the second 2, and so on.
    pub fn record_link(&self, target: &Url) -> Result<u32, RegistryError> {
        let key = normalize_key(target.as_str())?;
        let mut tables = self.tables.write();
        let link = tables
            .out_links
            .entry(key.clone())
            .or_insert_with(|| PageLink {
                address: target.clone(),
                key,
                card: 0,
            });
        link.card += 1;
        Ok(link.card)
    }

    // Records a static asset. Returns false when the asset was already known.
    pub fn record_static(&self, address: Url) -> Result<bool, RegistryError> {
        let key = normalize_key(address.as_str())?;
        let mut tables = self.tables.write();
        if tables.static_assets.contains_key(&key) {
            return Ok(false);
        }
        tables.static_assets.insert(key, StaticAsset::new(address));
        Ok(true)
    }

    /// Bumps the failed-fetch counter and returns the new value.
    pub fn record_failure(&self) -> u32 {
        self.fail_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn fail_count(&self) -> u32 {
        self.fail_count.load(Ordering::Relaxed)
    }

    pub fn out_link(&self, key: &str) -> Option<PageLink> {
        self.tables.read().out_links.get(key).cloned()
    }

    /// Outbound links sorted by normalized key.
    pub fn out_links(&self) -> Vec<PageLink> {
        let mut links: Vec<PageLink> = self.tables.read().out_links.values().cloned().collect();
        links.sort_by(|a, b| a.key.cmp(&b.key));
        links
    }

    pub fn static_asset(&self, key: &str) -> Option<StaticAsset> {
        self.tables.read().static_assets.get(key).cloned()
    }

    /// Static assets as (normalized key, asset) pairs sorted by key.
    pub fn static_assets(&self) -> Vec<(String, StaticAsset)> {
        let mut assets: Vec<(String, StaticAsset)> = self
            .tables
            .read()
            .static_assets
            .iter()
            .map(|(key, asset)| (key.clone(), asset.clone()))
            .collect();
        assets.sort_by(|a, b| a.0.cmp(&b.0));
        assets
    }
}

// For static assets, the title is the last component of the path.
//
// Examples:
//   http://abcd.com/qq.js     -> "qq.js"
//   http://abcd.com/a/b/qq.js -> "qq.js"
//   http://abcd.com/          -> ""
//   data:text/plain           -> "plain" (no leading slash, split still applies)
pub fn get_stat_title(url: &Url) -> String {
    url.path().rsplit('/').next().unwrap_or_default().to_string()
}
