//! # Cart Aggregate
//!
//! The unit of mutation and consistency: owns the item list, the subtotal,
//! and the discount state.
//!
//! ## Invariants
//! - `subtotal_cents` is always the sum of line totals (recomputed on every
//!   mutation, never read stale)
//! - Items are immutable price snapshots; later catalog changes never alter
//!   them
//! - Quantity updates re-derive the line total from the *stored* unit price,
//!   without re-resolving the catalog
//! - Discount state is either fully empty or fully populated
//!   (`Option<AppliedDiscount>`)
//!
//! The aggregate itself is pure data + mutation; discount resolution runs in
//! the service layer after every mutation, before the caller sees the cart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::discount::AppliedDiscount;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::{PriceBreakdown, PricedSelection, ResolvedSelection};
use crate::validation::validate_quantity;
use crate::MAX_CART_ITEMS;

// =============================================================================
// Cart Item
// =============================================================================

/// A persisted snapshot of a resolved selection and its price.
///
/// The unit price and breakdown are frozen at the moment of adding; the only
/// field that changes afterwards is `quantity` (and the derived line total).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Cart item id (UUID v4).
    pub id: String,

    /// Product the selection was resolved against.
    pub product_id: String,

    /// Product name at time of adding (frozen).
    pub product_name: String,

    /// Matched material id and name (frozen).
    pub material_id: String,
    pub material_name: String,

    /// Matched size, if any (frozen).
    pub size_mm: Option<u32>,

    /// Matched finish ids (frozen).
    pub finish_ids: Vec<String>,

    /// Whether packaging was included.
    pub include_packaging: bool,

    /// Component amounts of the unit price (frozen).
    pub breakdown: PriceBreakdown,

    /// Unit price in cents at time of adding (frozen).
    pub unit_price_cents: i64,

    /// Quantity in cart.
    pub quantity: i64,

    /// `unit_price * quantity`.
    pub line_total_cents: i64,

    /// When this item was added.
    #[ts(as = "String")]
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Builds a cart item snapshot from a resolved, priced selection.
    pub fn from_priced(
        resolved: &ResolvedSelection<'_>,
        priced: &PricedSelection,
        include_packaging: bool,
    ) -> Self {
        CartItem {
            id: Uuid::new_v4().to_string(),
            product_id: resolved.product.id.clone(),
            product_name: resolved.product.name.clone(),
            material_id: resolved.material.id.clone(),
            material_name: resolved.material.name.clone(),
            size_mm: resolved.size.map(|s| s.size_mm),
            finish_ids: resolved.finishes.iter().map(|f| f.finish_id.clone()).collect(),
            include_packaging,
            breakdown: priced.breakdown.clone(),
            unit_price_cents: priced.unit_price_cents,
            quantity: priced.quantity,
            line_total_cents: priced.total_cents,
            added_at: Utc::now(),
        }
    }

    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart aggregate.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// Cart id (UUID v4).
    pub id: String,

    /// Browser/session this cart belongs to.
    pub session_id: String,

    /// Owning user, once known. A guest cart gains an owner when the buyer
    /// logs in mid-session.
    pub owner_user_id: Option<String>,

    /// Item snapshots.
    pub items: Vec<CartItem>,

    /// Sum of line totals; maintained by every mutation.
    pub subtotal_cents: i64,

    /// Applied discount, if any.
    pub discount: Option<AppliedDiscount>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// Creates a new empty cart for a session.
    pub fn new(session_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Cart {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            owner_user_id: None,
            items: Vec::new(),
            subtotal_cents: 0,
            discount: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    /// Checks if the cart has no items.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the number of item lines.
    #[inline]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Appends an item snapshot.
    ///
    /// Every configured selection gets its own line; two additions of the
    /// same configuration are two snapshots, each frozen at its own price.
    pub fn add_item(&mut self, item: CartItem) -> CoreResult<()> {
        if self.items.len() >= MAX_CART_ITEMS {
            return Err(CoreError::SelectionInvalid(format!(
                "cart cannot have more than {} items",
                MAX_CART_ITEMS
            )));
        }

        self.items.push(item);
        self.recalculate();
        Ok(())
    }

    /// Updates an item's quantity, re-deriving the line total from the
    /// stored unit price. Quantity 0 removes the item.
    pub fn update_quantity(&mut self, item_id: &str, quantity: i64) -> CoreResult<()> {
        if quantity == 0 {
            return self.remove_item(item_id);
        }
        validate_quantity(quantity)?;

        let item = self
            .items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| CoreError::CartItemNotFound(item_id.to_string()))?;

        item.quantity = quantity;
        item.line_total_cents = item.unit_price_cents * quantity;
        self.recalculate();
        Ok(())
    }

    /// Removes an item by id.
    pub fn remove_item(&mut self, item_id: &str) -> CoreResult<()> {
        let initial_len = self.items.len();
        self.items.retain(|i| i.id != item_id);

        if self.items.len() == initial_len {
            return Err(CoreError::CartItemNotFound(item_id.to_string()));
        }

        self.recalculate();
        Ok(())
    }

    /// Replaces the discount state. `None` clears it (and any manual lock
    /// with it).
    pub fn set_discount(&mut self, discount: Option<AppliedDiscount>) {
        self.discount = discount;
        self.updated_at = Utc::now();
    }

    /// Takes the discount state out, leaving the cart without one.
    pub fn take_discount(&mut self) -> Option<AppliedDiscount> {
        self.updated_at = Utc::now();
        self.discount.take()
    }

    /// Clears items and discount after conversion to an order.
    pub fn clear(&mut self) {
        self.items.clear();
        self.discount = None;
        self.recalculate();
    }

    fn recalculate(&mut self) {
        self.subtotal_cents = self.items.iter().map(|i| i.line_total_cents).sum();
        self.updated_at = Utc::now();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::PriceBreakdown;

    fn test_item(unit_cents: i64, quantity: i64) -> CartItem {
        CartItem {
            id: Uuid::new_v4().to_string(),
            product_id: "p-1".to_string(),
            product_name: "House Sign".to_string(),
            material_id: "mat-brass".to_string(),
            material_name: "Brass".to_string(),
            size_mm: Some(300),
            finish_ids: vec![],
            include_packaging: false,
            breakdown: PriceBreakdown {
                material_base_cents: unit_cents,
                material_discount_cents: 0,
                material_net_cents: unit_cents,
                size_cents: 0,
                finishes_cents: 0,
                packaging_cents: 0,
            },
            unit_price_cents: unit_cents,
            quantity,
            line_total_cents: unit_cents * quantity,
            added_at: Utc::now(),
        }
    }

    #[test]
    fn test_add_item_recomputes_subtotal() {
        let mut cart = Cart::new("session-1");
        cart.add_item(test_item(10_000, 2)).unwrap();
        cart.add_item(test_item(500, 1)).unwrap();

        assert_eq!(cart.item_count(), 2);
        assert_eq!(cart.subtotal_cents, 20_500);
    }

    #[test]
    fn test_update_quantity_uses_stored_unit_price() {
        let mut cart = Cart::new("session-1");
        let item = test_item(11_700, 2);
        let item_id = item.id.clone();
        cart.add_item(item).unwrap();

        cart.update_quantity(&item_id, 5).unwrap();

        let line = &cart.items[0];
        assert_eq!(line.quantity, 5);
        assert_eq!(line.line_total_cents, 58_500);
        assert_eq!(cart.subtotal_cents, 58_500);
    }

    #[test]
    fn test_update_quantity_zero_removes() {
        let mut cart = Cart::new("session-1");
        let item = test_item(1_000, 1);
        let item_id = item.id.clone();
        cart.add_item(item).unwrap();

        cart.update_quantity(&item_id, 0).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal_cents, 0);
    }

    #[test]
    fn test_update_unknown_item_fails() {
        let mut cart = Cart::new("session-1");
        assert!(matches!(
            cart.update_quantity("missing", 2),
            Err(CoreError::CartItemNotFound(_))
        ));
    }

    #[test]
    fn test_remove_item() {
        let mut cart = Cart::new("session-1");
        let keep = test_item(1_000, 1);
        let drop = test_item(2_000, 1);
        let drop_id = drop.id.clone();
        cart.add_item(keep).unwrap();
        cart.add_item(drop).unwrap();

        cart.remove_item(&drop_id).unwrap();
        assert_eq!(cart.item_count(), 1);
        assert_eq!(cart.subtotal_cents, 1_000);

        assert!(cart.remove_item(&drop_id).is_err());
    }

    #[test]
    fn test_same_configuration_gets_its_own_line() {
        let mut cart = Cart::new("session-1");
        cart.add_item(test_item(1_000, 1)).unwrap();
        cart.add_item(test_item(1_000, 1)).unwrap();
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_clear_drops_items_and_discount() {
        let mut cart = Cart::new("session-1");
        cart.add_item(test_item(1_000, 1)).unwrap();
        cart.set_discount(Some(AppliedDiscount {
            offer_id: "offer-1".to_string(),
            code: "SAVE10".to_string(),
            amount_cents: 100,
            auto_applied: false,
            method: crate::discount::ApplicationMethod::Manual,
            manual_locked: true,
        }));

        cart.clear();
        assert!(cart.is_empty());
        assert!(cart.discount.is_none());
        assert_eq!(cart.subtotal_cents, 0);
    }
}
