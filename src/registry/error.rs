// src/registry/error.rs
// =============================================================================
// Errors returned by the visitation registry.
//
// KeyExists is the expected one: it means another worker already claimed the
// page, and the caller should skip it. The other two mean the registry could
// not answer at all.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A page is already registered under this normalized key
    #[error("Key exists: {0}")]
    KeyExists(String),

    /// The address has no `//` authority part to build a key from
    #[error("Cannot derive a page key from '{0}'")]
    InvalidAddress(String),

    /// The registry loop has stopped
    #[error("Visitation registry has shut down")]
    Shutdown,
}
