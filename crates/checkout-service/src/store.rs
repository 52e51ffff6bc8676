//! # Store Ports
//!
//! Traits for the opaque data stores the checkout core consumes. Catalog,
//! offers, buyer history, and settings are owned elsewhere; within a request
//! they are read-only reference data, fetched in discrete atomic round
//! trips.
//!
//! ## Consumed Interface
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CatalogStore    get_product(id)                                        │
//! │  OfferStore      get_offer_by_code / get_offer_by_id                    │
//! │                  list_active_auto_offers                                │
//! │                  increment_usage(offer_id, counter)                     │
//! │  BuyerStore      is_new_buyer(user_id)                                  │
//! │  SettingsStore   get_settings() -> Option<Settings>                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Missing rows are `Ok(None)`, never errors; `StoreError` means the round
//! trip itself failed.

use checkout_core::{Offer, Product, Settings, UsageCounter};

use crate::error::StoreResult;

/// Read access to product master data.
pub trait CatalogStore: Send + Sync {
    /// Fetches a product by id.
    fn get_product(&self, id: &str) -> StoreResult<Option<Product>>;
}

/// Access to promotional offers and their usage counters.
pub trait OfferStore: Send + Sync {
    /// Fetches an offer by its (uppercase) code.
    fn get_offer_by_code(&self, code: &str) -> StoreResult<Option<Offer>>;

    /// Fetches an offer by id.
    fn get_offer_by_id(&self, id: &str) -> StoreResult<Option<Offer>>;

    /// Lists active offers flagged for automatic application.
    fn list_active_auto_offers(&self) -> StoreResult<Vec<Offer>>;

    /// Increments an offer's usage counter, atomically guarded by
    /// `used_count < max_uses` at the store. `used_count` only increases.
    ///
    /// True concurrent checkouts can still race past `max_uses` across
    /// separate store deployments; that is a documented limitation, not
    /// solved here.
    fn increment_usage(&self, offer_id: &str, counter: UsageCounter) -> StoreResult<()>;
}

/// Read access to buyer order history.
pub trait BuyerStore: Send + Sync {
    /// Whether the user has zero non-cancelled historical orders.
    fn is_new_buyer(&self, user_id: &str) -> StoreResult<bool>;
}

/// Read access to store-wide checkout settings.
pub trait SettingsStore: Send + Sync {
    /// Fetches the settings; `None` means "unconfigured" and the caller
    /// falls back to `Settings::fallback()`.
    fn get_settings(&self) -> StoreResult<Option<Settings>>;
}
