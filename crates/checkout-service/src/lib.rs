//! # checkout-service: Orchestration Over Store Ports
//!
//! The synchronous service layer around [`checkout_core`]. It owns zero
//! business rules: pricing, eligibility, and discount resolution all live in
//! the core crate. What this crate adds:
//!
//! - **Store ports** ([`store`]) - the four traits the orchestration reads
//!   through (catalog, offers, buyers, settings)
//! - **CheckoutService** ([`service`]) - cart mutations, code submission,
//!   near-miss lookup, and order finalization wired to the ports
//! - **MemoryStore** ([`memory`]) - a mutex-guarded in-memory store for
//!   tests and single-process deployments
//!
//! ## Error Layers
//!
//! [`error::ServiceError`] is a transparent union of the core's domain
//! errors and the ports' [`error::StoreError`]. Store failures during
//! discount resolution never surface to item mutations; the service
//! degrades to "no discount applied" and logs a warning instead.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod memory;
pub mod service;
pub mod store;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{ServiceError, ServiceResult, StoreError, StoreResult};
pub use memory::MemoryStore;
pub use service::{ApplyCodeOutcome, CheckoutService, OrderSnapshot, PricePreview};
pub use store::{BuyerStore, CatalogStore, OfferStore, SettingsStore};
