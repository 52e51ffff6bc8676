//! # Checkout Service
//!
//! Orchestrates cart mutations against the store ports and keeps the cart's
//! discount state consistent.
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Checkout Service Flow                               │
//! │                                                                         │
//! │  add_item / update_item_quantity / remove_item / attach_buyer           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Cart aggregate mutates, subtotal recomputed                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Discount resolution (revalidate + auto-apply)  ◄── offers, buyer       │
//! │       │         │                                                       │
//! │       │         └── store failure? degrade to "no discount",            │
//! │       │             NEVER fail the item mutation                        │
//! │       ▼                                                                 │
//! │  Caller reads a cart whose discount is internally consistent            │
//! │                                                                         │
//! │  finalize ──► OrderTotals snapshot, cart cleared                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Per-session mutations are serialized by the caller (single-writer carts);
//! no locking happens here.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use checkout_core::cart::{Cart, CartItem};
use checkout_core::discount::{self, AppliedDiscount, NearMissOffer};
use checkout_core::pricing::{price_selection, resolve_selection, PriceBreakdown};
use checkout_core::shipping::{order_totals, OrderTotals};
use checkout_core::validation::{validate_offer_code, validate_uuid};
use checkout_core::{Buyer, CoreError, Offer, Selection, Settings};

use crate::error::{ServiceResult, StoreError};
use crate::store::{BuyerStore, CatalogStore, OfferStore, SettingsStore};

// =============================================================================
// Response Types
// =============================================================================

/// Price preview for a selection that is not (yet) in a cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePreview {
    pub unit_price_cents: i64,
    pub total_cents: i64,
    pub breakdown: PriceBreakdown,
}

/// Result of a manual code submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyCodeOutcome {
    /// True when an auto offer beat the submitted code and was applied
    /// instead; the UI must tell the buyer.
    pub better_offer_applied: bool,
    /// The discount now on the cart.
    pub applied: Option<AppliedDiscount>,
}

/// Immutable price snapshot handed to order creation. Never recomputed
/// afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSnapshot {
    pub order_id: String,
    pub session_id: String,
    pub owner_user_id: Option<String>,
    pub items: Vec<CartItem>,
    pub discount: Option<AppliedDiscount>,
    pub totals: OrderTotals,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Checkout Service
// =============================================================================

/// The checkout orchestration layer.
///
/// Holds the four store ports; every operation is a synchronous
/// read-modify-write against the cart aggregate the caller passes in.
pub struct CheckoutService {
    catalog: Arc<dyn CatalogStore>,
    offers: Arc<dyn OfferStore>,
    buyers: Arc<dyn BuyerStore>,
    settings: Arc<dyn SettingsStore>,
}

impl CheckoutService {
    /// Creates a service over the given stores.
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        offers: Arc<dyn OfferStore>,
        buyers: Arc<dyn BuyerStore>,
        settings: Arc<dyn SettingsStore>,
    ) -> Self {
        CheckoutService {
            catalog,
            offers,
            buyers,
            settings,
        }
    }

    // -------------------------------------------------------------------------
    // Pricing
    // -------------------------------------------------------------------------

    /// Prices a selection without touching any cart.
    pub fn preview_price(&self, selection: &Selection) -> ServiceResult<PricePreview> {
        debug!(product_id = %selection.product_id, qty = selection.quantity, "preview_price");

        let priced = self.price(selection)?.1;
        Ok(PricePreview {
            unit_price_cents: priced.unit_price_cents,
            total_cents: priced.total_cents,
            breakdown: priced.breakdown,
        })
    }

    // -------------------------------------------------------------------------
    // Cart Mutations
    // -------------------------------------------------------------------------

    /// Resolves and prices a selection, appends the snapshot to the cart,
    /// then settles the discount.
    pub fn add_item(&self, cart: &mut Cart, selection: &Selection) -> ServiceResult<()> {
        let (product, priced) = self.price(selection)?;
        let resolved = resolve_selection(&product, selection)?;
        let item = CartItem::from_priced(&resolved, &priced, selection.include_packaging);

        info!(
            cart_id = %cart.id,
            product_id = %product.id,
            unit_price = priced.unit_price_cents,
            qty = priced.quantity,
            "item added to cart"
        );

        cart.add_item(item)?;
        self.settle_discount(cart);
        Ok(())
    }

    /// Updates a line quantity from its stored unit price, then settles the
    /// discount. Quantity 0 removes the line.
    pub fn update_item_quantity(
        &self,
        cart: &mut Cart,
        item_id: &str,
        quantity: i64,
    ) -> ServiceResult<()> {
        debug!(cart_id = %cart.id, item_id = %item_id, qty = quantity, "update_item_quantity");

        validate_uuid(item_id).map_err(CoreError::from)?;
        cart.update_quantity(item_id, quantity)?;
        self.settle_discount(cart);
        Ok(())
    }

    /// Removes a line, then settles the discount.
    pub fn remove_item(&self, cart: &mut Cart, item_id: &str) -> ServiceResult<()> {
        debug!(cart_id = %cart.id, item_id = %item_id, "remove_item");

        validate_uuid(item_id).map_err(CoreError::from)?;
        cart.remove_item(item_id)?;
        self.settle_discount(cart);
        Ok(())
    }

    /// Attaches a logged-in user to a guest cart and re-settles the
    /// discount; a new-customers offer may appear or disappear here.
    pub fn attach_buyer(&self, cart: &mut Cart, user_id: &str) -> ServiceResult<()> {
        info!(cart_id = %cart.id, user_id = %user_id, "buyer attached to cart");

        cart.owner_user_id = Some(user_id.to_string());
        self.settle_discount(cart);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Discount Codes
    // -------------------------------------------------------------------------

    /// Applies a buyer-entered code (resolution step 3).
    ///
    /// If an auto offer is strictly better it is applied instead and
    /// reported via `better_offer_applied`, never substituted silently.
    ///
    /// A provided `buyer_id` is attached to the cart, so later revalidation
    /// runs against the same buyer the eligibility decision was made for.
    pub fn apply_code(
        &self,
        cart: &mut Cart,
        code: &str,
        buyer_id: Option<&str>,
    ) -> ServiceResult<ApplyCodeOutcome> {
        let code = validate_offer_code(code).map_err(CoreError::from)?;
        let offer = self
            .offers
            .get_offer_by_code(&code)?
            .ok_or_else(|| CoreError::OfferNotFound(code.clone()))?;

        if let Some(user_id) = buyer_id {
            cart.owner_user_id = Some(user_id.to_string());
        }
        let buyer = self.buyer_for(cart.owner_user_id.as_deref())?;
        let auto_offers = self.offers.list_active_auto_offers()?;

        let outcome = discount::submit_code(
            cart.discount.clone(),
            &offer,
            cart.subtotal(),
            &auto_offers,
            Utc::now(),
            buyer,
        )?;

        if let Some((offer_id, counter)) = &outcome.usage {
            self.offers.increment_usage(offer_id, *counter)?;
        }

        info!(
            cart_id = %cart.id,
            code = %code,
            better_offer_applied = outcome.better_offer_applied,
            "discount code applied"
        );

        cart.set_discount(outcome.state);
        Ok(ApplyCodeOutcome {
            better_offer_applied: outcome.better_offer_applied,
            applied: cart.discount.clone(),
        })
    }

    /// Removes the applied discount outright. The next cart mutation may
    /// auto-apply an offer again.
    pub fn remove_code(&self, cart: &mut Cart) -> ServiceResult<()> {
        if let Some(removed) = cart.take_discount() {
            info!(cart_id = %cart.id, code = %removed.code, "discount removed");
        }
        Ok(())
    }

    /// Clears the manual lock and re-runs auto-selection (resolution
    /// step 4).
    pub fn unlock_code(&self, cart: &mut Cart) -> ServiceResult<()> {
        debug!(cart_id = %cart.id, "unlock_code");

        let buyer = self.buyer_for(cart.owner_user_id.as_deref())?;
        let current_offer = self.current_offer(cart)?;
        let auto_offers = self.offers.list_active_auto_offers()?;

        let resolution = discount::unlock(
            cart.discount.clone(),
            current_offer.as_ref(),
            cart.subtotal(),
            &auto_offers,
            Utc::now(),
            buyer,
        );

        if let Some((offer_id, counter)) = &resolution.usage {
            self.offers.increment_usage(offer_id, *counter)?;
        }
        cart.set_discount(resolution.state);
        Ok(())
    }

    /// Offers the buyer almost qualifies for, sorted by ascending gap.
    pub fn near_miss_offers(
        &self,
        cart: &Cart,
        buyer_id: Option<&str>,
    ) -> ServiceResult<Vec<NearMissOffer>> {
        let buyer = self.buyer_for(buyer_id.or(cart.owner_user_id.as_deref()))?;
        let auto_offers = self.offers.list_active_auto_offers()?;
        Ok(discount::near_misses(
            &auto_offers,
            cart.subtotal(),
            Utc::now(),
            buyer,
        ))
    }

    // -------------------------------------------------------------------------
    // Checkout
    // -------------------------------------------------------------------------

    /// Builds the immutable order snapshot and clears the cart.
    ///
    /// The discount is settled one last time before totals are read, so the
    /// snapshot can never carry an amount the current subtotal does not
    /// justify.
    pub fn finalize(&self, cart: &mut Cart) -> ServiceResult<OrderSnapshot> {
        if cart.is_empty() {
            return Err(CoreError::CartEmpty.into());
        }

        self.settle_discount(cart);

        let settings = self
            .settings
            .get_settings()?
            .unwrap_or_else(Settings::fallback);
        let totals = order_totals(cart, &settings)?;

        let snapshot = OrderSnapshot {
            order_id: Uuid::new_v4().to_string(),
            session_id: cart.session_id.clone(),
            owner_user_id: cart.owner_user_id.clone(),
            items: cart.items.clone(),
            discount: cart.discount.clone(),
            totals,
            created_at: Utc::now(),
        };

        info!(
            cart_id = %cart.id,
            order_id = %snapshot.order_id,
            total = snapshot.totals.total_cents,
            "cart converted to order"
        );

        cart.clear();
        Ok(snapshot)
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn price(
        &self,
        selection: &Selection,
    ) -> ServiceResult<(checkout_core::Product, checkout_core::PricedSelection)> {
        let product = self.catalog.get_product(&selection.product_id)?.ok_or_else(|| {
            CoreError::SelectionInvalid(format!("product '{}' not found", selection.product_id))
        })?;

        let priced = {
            let resolved = resolve_selection(&product, selection)?;
            price_selection(&resolved, selection.quantity, selection.include_packaging)?
        };
        Ok((product, priced))
    }

    fn buyer_for(&self, user_id: Option<&str>) -> Result<Buyer, StoreError> {
        match user_id {
            None => Ok(Buyer::Guest),
            Some(id) => Ok(Buyer::Customer {
                new_customer: self.buyers.is_new_buyer(id)?,
            }),
        }
    }

    fn current_offer(&self, cart: &Cart) -> Result<Option<Offer>, StoreError> {
        match &cart.discount {
            Some(applied) => self.offers.get_offer_by_id(&applied.offer_id),
            None => Ok(None),
        }
    }

    /// Runs discount resolution steps 1-2 after a mutation.
    ///
    /// A store failure inside resolution must never block the item mutation
    /// that already happened; it degrades to "no discount applied".
    fn settle_discount(&self, cart: &mut Cart) {
        if let Err(err) = self.try_settle_discount(cart) {
            warn!(
                cart_id = %cart.id,
                error = %err,
                "discount resolution failed; continuing without a discount"
            );
            cart.set_discount(None);
        }
    }

    fn try_settle_discount(&self, cart: &mut Cart) -> Result<(), StoreError> {
        let buyer = self.buyer_for(cart.owner_user_id.as_deref())?;
        let current_offer = self.current_offer(cart)?;
        let auto_offers = self.offers.list_active_auto_offers()?;

        let had_discount = cart.discount.is_some();
        let resolution = discount::resolve(
            cart.discount.clone(),
            current_offer.as_ref(),
            cart.subtotal(),
            &auto_offers,
            Utc::now(),
            buyer,
        );

        if let Some((offer_id, counter)) = &resolution.usage {
            self.offers.increment_usage(offer_id, *counter)?;
        }

        cart.set_discount(resolution.state);
        if had_discount && cart.discount.is_none() {
            info!(cart_id = %cart.id, "applied discount no longer valid; cleared");
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
