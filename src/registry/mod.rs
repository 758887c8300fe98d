// src/registry/mod.rs
// =============================================================================
// This module keeps track of which pages the crawl has already seen.
//
// Submodules:
// - node_map: the registry itself (an actor loop behind a cloneable handle)
// - normalize: turns an address into the key pages are deduplicated by
// - shutdown: the stop signal shared by the registry and the rest of the app
// - error: what can go wrong when talking to the registry
// =============================================================================

mod error;
mod node_map;
mod normalize;
mod shutdown;

pub use error::RegistryError;
pub use node_map::NodeMap;
pub use normalize::normalize_key;
pub use shutdown::Shutdown;

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why an actor loop instead of Arc<Mutex<HashMap>>?
//    - Only one task ever owns the map, so there is nothing to lock
//    - "Is this key free? Then insert it" happens inside one loop iteration,
//      so two workers can never both register the same page
//    - Callers just send a message and await the reply
//
// 2. What is a oneshot channel?
//    - A channel that carries exactly one value
//    - Each request brings its own, so every caller gets its own answer
//    - Sending never blocks, so the loop moves on even if a caller is slow
//
// 3. What happens after shutdown?
//    - Handles refuse to send once the signal is set
//    - When the loop exits, its receiver is dropped along with any queued
//      requests, which wakes their callers with RegistryError::Shutdown
// -----------------------------------------------------------------------------
