//! # In-Memory Store
//!
//! A `Mutex<HashMap>`-backed implementation of every store port, used by
//! tests and local seeding. Mirrors the guarantees a real store provides:
//! usage increments are atomic and guarded by the `max_uses` cap, and
//! `used_count` never decreases.

use std::collections::HashMap;
use std::sync::Mutex;

use checkout_core::{Cart, CoreError, Offer, Product, Settings, UsageCounter};

use crate::error::{ServiceResult, StoreError, StoreResult};
use crate::store::{BuyerStore, CatalogStore, OfferStore, SettingsStore};

#[derive(Debug, Default)]
struct Inner {
    products: HashMap<String, Product>,
    offers: HashMap<String, Offer>,
    new_buyers: HashMap<String, bool>,
    settings: Option<Settings>,
    carts: HashMap<String, Cart>,
}

/// In-memory backing store for all checkout ports.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a product.
    pub fn insert_product(&self, product: Product) {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.products.insert(product.id.clone(), product);
    }

    /// Seeds an offer.
    pub fn insert_offer(&self, offer: Offer) {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.offers.insert(offer.id.clone(), offer);
    }

    /// Records whether a user counts as a new buyer.
    pub fn set_buyer(&self, user_id: &str, new_buyer: bool) {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.new_buyers.insert(user_id.to_string(), new_buyer);
    }

    /// Sets the checkout settings. `None` simulates "unconfigured".
    pub fn set_settings(&self, settings: Option<Settings>) {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.settings = settings;
    }

    /// Persists a cart keyed by session.
    pub fn save_cart(&self, cart: &Cart) {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        inner.carts.insert(cart.session_id.clone(), cart.clone());
    }

    /// Loads a cart by session.
    pub fn get_cart(&self, session_id: &str) -> ServiceResult<Cart> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        inner
            .carts
            .get(session_id)
            .cloned()
            .ok_or_else(|| CoreError::CartNotFound(session_id.to_string()).into())
    }

    /// Current state of an offer (for assertions on usage counters).
    pub fn offer(&self, offer_id: &str) -> Option<Offer> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        inner.offers.get(offer_id).cloned()
    }
}

impl CatalogStore for MemoryStore {
    fn get_product(&self, id: &str) -> StoreResult<Option<Product>> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.products.get(id).cloned())
    }
}

impl OfferStore for MemoryStore {
    fn get_offer_by_code(&self, code: &str) -> StoreResult<Option<Offer>> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.offers.values().find(|o| o.code == code).cloned())
    }

    fn get_offer_by_id(&self, id: &str) -> StoreResult<Option<Offer>> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.offers.get(id).cloned())
    }

    fn list_active_auto_offers(&self) -> StoreResult<Vec<Offer>> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner
            .offers
            .values()
            .filter(|o| o.is_active && o.auto_apply)
            .cloned()
            .collect())
    }

    fn increment_usage(&self, offer_id: &str, _counter: UsageCounter) -> StoreResult<()> {
        let mut inner = self.inner.lock().expect("store mutex poisoned");
        let offer = inner
            .offers
            .get_mut(offer_id)
            .ok_or_else(|| StoreError::Conflict(format!("offer {} no longer exists", offer_id)))?;

        // Increment iff under the cap; the counter never decreases.
        if let Some(max) = offer.max_uses {
            if offer.used_count >= max {
                return Err(StoreError::Conflict(format!(
                    "offer {} usage cap of {} reached",
                    offer.code, max
                )));
            }
        }
        offer.used_count += 1;
        Ok(())
    }
}

impl BuyerStore for MemoryStore {
    fn is_new_buyer(&self, user_id: &str) -> StoreResult<bool> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.new_buyers.get(user_id).copied().unwrap_or(false))
    }
}

impl SettingsStore for MemoryStore {
    fn get_settings(&self) -> StoreResult<Option<Settings>> {
        let inner = self.inner.lock().expect("store mutex poisoned");
        Ok(inner.settings.clone())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
