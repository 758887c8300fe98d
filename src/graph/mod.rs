// src/graph/mod.rs
// =============================================================================
// This module holds the crawl graph: pages, their links and static assets,
// plus the two ways the graph is written out.
//
// Submodules:
// - page: Page, PageLink, StaticAsset
// - dot: Graphviz rendering
// - report: serde-serializable snapshot for JSON output
// =============================================================================

mod dot;
mod page;
mod report;

pub use dot::render_dot;
pub use page::{get_stat_title, Page, PageLink, StaticAsset};
pub use report::{build_report, AssetReport, LinkReport, PageReport};
