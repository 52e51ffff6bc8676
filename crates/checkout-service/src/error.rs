//! # Service Error Types
//!
//! What callers of the checkout surface see: domain errors from
//! checkout-core passed through unchanged, plus store round-trip failures.

use thiserror::Error;

use checkout_core::CoreError;

// =============================================================================
// Store Error
// =============================================================================

/// A failure at a data-store boundary.
///
/// Stores are opaque collaborators; their failures carry a message, not a
/// taxonomy. Not-found lookups are `Ok(None)` on the port traits, never
/// errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or the round trip failed.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A store-enforced constraint rejected the write (e.g. an offer usage
    /// increment past its cap).
    #[error("store conflict: {0}")]
    Conflict(String),
}

/// Convenience type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Service Error
// =============================================================================

/// Errors surfaced by `CheckoutService` operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Domain error from checkout-core; the message is client-facing.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A store round trip failed where the operation could not degrade.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Convenience type alias for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

// =============================================================================
// Unit Tests
// =============================================================================
