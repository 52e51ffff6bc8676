//! # Error Types
//!
//! Domain-specific error types for checkout-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  checkout-core errors (this file)                                       │
//! │  ├── CoreError        - Pricing / cart / offer domain errors            │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  checkout-service errors (separate crate)                               │
//! │  ├── StoreError       - Data-store round-trip failures                  │
//! │  └── ServiceError     - What the checkout API surface sees              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ServiceError → caller              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (code, item id, reason)
//! 3. Errors are enum variants, never bare strings
//! 4. Every variant is a client-facing message; none represent corrupted
//!    internal state
//!
//! Offer *ineligibility* during auto-selection is a normal outcome and is
//! never surfaced through these types; `OfferIneligible` is raised only when
//! a buyer explicitly submits a code that cannot apply.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors for pricing, carts, and offers.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The requested (material, size, finish) combination does not exist on
    /// the product, or the product itself cannot be found.
    #[error("Invalid selection: {0}")]
    SelectionInvalid(String),

    /// Quantity below 1 (or above the configured maximum).
    #[error("Invalid quantity: {requested}")]
    InvalidQuantity { requested: i64 },

    /// Cart cannot be found for the given session.
    #[error("Cart not found: {0}")]
    CartNotFound(String),

    /// Cart item cannot be found in the cart.
    #[error("Cart item not found: {0}")]
    CartItemNotFound(String),

    /// Checkout requires at least one item.
    #[error("Cart is empty")]
    CartEmpty,

    /// No offer exists for the submitted code.
    #[error("Offer not found: {0}")]
    OfferNotFound(String),

    /// A submitted code exists but cannot apply; carries the evaluator's
    /// human-readable reason.
    #[error("Offer cannot be applied: {0}")]
    OfferIneligible(String),

    /// A different discount code is already active on the cart.
    #[error("Offer code '{active}' is already applied; remove it before applying '{submitted}'")]
    OfferCodeConflict { active: String, submitted: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when caller input doesn't meet format requirements and are
/// checked before any business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (bad characters, bad UUID, etc.).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
