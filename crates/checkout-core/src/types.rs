//! # Domain Types
//!
//! Core domain types for the checkout pricing subsystem.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Offer       │   │    Settings     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  materials[]    │   │  code           │   │  delivery_tiers │       │
//! │  │  finishes[]     │   │  discount_type  │   │  free_delivery  │       │
//! │  │  packaging      │   │  min_order      │   │  vat rate       │       │
//! │  │  discount_bps   │   │  validity/uses  │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                             │
//! │                                                                         │
//! │  Selection (ephemeral buyer intent) ──► resolved against Product        │
//! │  Buyer (guest or known customer)    ──► drives new-customer offers      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Product, Offer, and Settings are reference data owned by external stores;
//! within a request they are read-only.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::{Money, Percent};

// =============================================================================
// Catalog Product
// =============================================================================

/// A configurable catalog product (external, read-only).
///
/// Invariant (owned by the catalog store, relied upon here): any size or
/// finish referenced by a selection must exist in this product's own lists.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Material variants the buyer chooses between.
    pub materials: Vec<MaterialVariant>,

    /// Finish options applicable to any material of this product.
    pub finishes: Vec<FinishOption>,

    /// Price of optional packaging, in cents.
    pub packaging_price_cents: i64,

    /// Product-level percentage discount in basis points (0 = none).
    pub discount_bps: u32,

    /// Whether the product is active (soft delete).
    pub is_active: bool,

    /// When the product was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the packaging price as Money.
    #[inline]
    pub fn packaging_price(&self) -> Money {
        Money::from_cents(self.packaging_price_cents)
    }

    /// Returns the product-level discount rate.
    #[inline]
    pub fn discount(&self) -> Percent {
        Percent::from_bps(self.discount_bps)
    }
}

/// A material variant of a product (e.g. brass, acrylic).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct MaterialVariant {
    /// Material identifier, unique within the product.
    pub id: String,

    /// Display name; selections may reference materials by exact name.
    pub name: String,

    /// Base price in cents before any product-level discount.
    pub base_price_cents: i64,

    /// Available sizes for this material. Empty means size is not
    /// configurable for this material.
    pub size_options: Vec<SizeOption>,
}

impl MaterialVariant {
    /// Returns the base price as Money.
    #[inline]
    pub fn base_price(&self) -> Money {
        Money::from_cents(self.base_price_cents)
    }
}

/// A size option of a material variant.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SizeOption {
    /// Display name (e.g. "Large").
    pub name: String,

    /// Physical size in millimetres; selections reference sizes by this.
    pub size_mm: u32,

    /// Additional cost on top of the material base, in cents.
    pub additional_cost_cents: i64,
}

/// A finish option of a product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FinishOption {
    /// Finish identifier, unique within the product.
    pub finish_id: String,

    /// Display name (e.g. "Polished").
    pub name: String,

    /// Price adjustment in cents. May be negative (e.g. an unfinished
    /// variant priced below the default).
    pub price_adjustment_cents: i64,
}

// =============================================================================
// Selection
// =============================================================================

/// How a selection references a material: by id or by exact name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MaterialRef {
    Id(String),
    Name(String),
}

/// A buyer's chosen configuration for one product (ephemeral).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    /// Product being configured.
    pub product_id: String,

    /// Requested material, by id or exact name.
    pub material: MaterialRef,

    /// Requested size in millimetres, if the buyer picked one.
    pub size_mm: Option<u32>,

    /// Requested finishes. Empty means none.
    pub finish_ids: Vec<String>,

    /// Quantity, must be >= 1.
    pub quantity: i64,

    /// Whether to include the product's packaging.
    pub include_packaging: bool,
}

// =============================================================================
// Offer
// =============================================================================

/// How an offer's discount value is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    /// `discount_value` is basis points of the subtotal (1000 = 10%).
    Percentage,
    /// `discount_value` is a fixed amount in cents, capped at the subtotal.
    Fixed,
}

/// Which buyers an offer applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    /// Any buyer.
    All,
    /// Buyers with zero non-cancelled historical orders. Guest sessions are
    /// never eligible.
    NewCustomers,
}

/// A promotional offer (external, read-only within a request).
///
/// ## Invariants
/// - Percentage value is within [0, 10000] bps
/// - Fixed value is >= 0
/// - `used_count` only increases (enforced at the store boundary)
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Offer {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// The code a buyer enters, e.g. "SAVE10". Stored uppercase.
    pub code: String,

    /// Short human-readable description for the checkout UI.
    pub description: Option<String>,

    /// How `discount_value` is interpreted.
    pub discount_type: DiscountType,

    /// Basis points for percentage offers, cents for fixed offers.
    pub discount_value: i64,

    /// Minimum cart subtotal required, in cents (0 = no minimum).
    pub min_order_cents: i64,

    /// Start of the validity window (inclusive). None = no lower bound.
    #[ts(as = "Option<String>")]
    pub valid_from: Option<DateTime<Utc>>,

    /// End of the validity window (inclusive). None = no upper bound.
    #[ts(as = "Option<String>")]
    pub valid_to: Option<DateTime<Utc>>,

    /// Maximum total uses. None = unlimited.
    pub max_uses: Option<i64>,

    /// Current number of uses (manual + auto).
    pub used_count: i64,

    /// Which buyers the offer applies to.
    pub audience: Audience,

    /// Whether the system may apply this offer without a code.
    pub auto_apply: bool,

    /// Whether the offer is active (soft delete).
    pub is_active: bool,

    /// Creation timestamp; the tie-break for equal auto discounts is
    /// earliest-created wins.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Offer {
    /// Returns the minimum order amount as Money.
    #[inline]
    pub fn min_order(&self) -> Money {
        Money::from_cents(self.min_order_cents)
    }
}

// =============================================================================
// Buyer
// =============================================================================

/// The buyer attached to a cart, as far as offer eligibility cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum Buyer {
    /// Anonymous session. Never new-customer eligible.
    Guest,
    /// Known customer; `new_customer` = zero non-cancelled historical orders.
    Customer { new_customer: bool },
}

impl Buyer {
    /// Whether this buyer qualifies for new-customer offers.
    #[inline]
    pub fn is_new_customer(&self) -> bool {
        matches!(self, Buyer::Customer { new_customer: true })
    }
}

// =============================================================================
// Settings
// =============================================================================

/// One shipping tier: fee charged when the discounted amount falls inside
/// `[min_cents, max_cents]` (upper bound optional = unbounded).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DeliveryTier {
    pub min_cents: i64,
    pub max_cents: Option<i64>,
    pub fee_cents: i64,
}

/// Free-delivery threshold configuration.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FreeDelivery {
    pub enabled: bool,
    pub threshold_cents: i64,
}

/// Store-wide checkout settings (external, read-only).
///
/// Tiers are assumed contiguous and non-overlapping by configuration; this
/// core does not validate them.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Settings {
    /// Ordered shipping tiers.
    pub delivery_tiers: Vec<DeliveryTier>,

    /// Free-delivery threshold.
    pub free_delivery: FreeDelivery,

    /// Whether VAT extraction is enabled.
    pub vat_enabled: bool,

    /// VAT rate in basis points (2000 = 20%). Prices are tax-inclusive;
    /// the rate is used to extract VAT for display.
    pub vat_bps: u32,
}

impl Settings {
    /// Returns the VAT rate.
    #[inline]
    pub fn vat_rate(&self) -> Percent {
        Percent::from_bps(self.vat_bps)
    }

    /// Settings used when the settings store signals "unconfigured".
    ///
    /// These are the only fallback values in the crate; nothing else reads
    /// the FALLBACK_* constants directly.
    pub fn fallback() -> Self {
        Settings {
            delivery_tiers: vec![DeliveryTier {
                min_cents: 0,
                max_cents: None,
                fee_cents: crate::FALLBACK_DELIVERY_FEE_CENTS,
            }],
            free_delivery: FreeDelivery {
                enabled: false,
                threshold_cents: 0,
            },
            vat_enabled: true,
            vat_bps: crate::FALLBACK_VAT_BPS,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
