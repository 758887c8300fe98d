// src/registry/normalize.rs
// =============================================================================
// Derives the deduplication key for an address.
//
// The key is the address with its scheme removed: everything after the first
// "//". That way http://example.com/docs and https://example.com/docs end up
// as one node in the crawl graph.
//
// The key is only used for lookups. Pages keep their full address, because
// that is what actually gets fetched.
// =============================================================================

use super::RegistryError;

// Strips the scheme from an address
//
// Examples:
//   "https://example.com/docs" -> "example.com/docs"
//   "http://example.com/docs"  -> "example.com/docs"
//   "mailto:me@example.com"    -> InvalidAddress (no "//")
//   "http://"                  -> InvalidAddress (nothing after "//")
pub fn normalize_key(address: &str) -> Result<String, RegistryError> {
    match address.split_once("//") {
        Some((_, rest)) if !rest.is_empty() => Ok(rest.to_string()),
        _ => Err(RegistryError::InvalidAddress(address.to_string())),
    }
}
