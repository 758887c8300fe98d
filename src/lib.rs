// src/lib.rs
// =============================================================================
// dotler as a library: the visitation registry, the crawl graph and the
// crawler that ties them together. The binary in main.rs is a thin CLI over
// these modules.
// =============================================================================

pub mod crawl;
pub mod graph;
pub mod registry;
