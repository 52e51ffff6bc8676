//! # checkout-core: Pure Pricing & Discount Logic
//!
//! This crate is the **heart** of the checkout subsystem. It contains all
//! pricing and discount business logic as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Checkout Architecture                               │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Checkout UI / Order Workflow                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    checkout-service                             │   │
//! │  │    store ports + CheckoutService orchestration                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ checkout-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌──────┐ ┌──────────┐  │   │
//! │  │   │ pricing │ │  offer  │ │ discount │ │ cart │ │ shipping │  │   │
//! │  │   │ resolve │ │ checks  │ │ resolve  │ │ aggr │ │ fee/VAT  │  │   │
//! │  │   │ + price │ │ + calc  │ │ steps1-5 │ │      │ │          │  │   │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └──────┘ └──────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Offer, Settings, Buyer, ...)
//! - [`money`] - Money and Percent types with integer arithmetic
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//! - [`pricing`] - Catalog resolution and price calculation
//! - [`offer`] - Offer eligibility and discount calculation
//! - [`discount`] - Discount resolution (revalidate / auto / manual / near-miss)
//! - [`cart`] - The cart aggregate
//! - [`shipping`] - Delivery fees, VAT extraction, order totals
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input = same output; discount resolution is a
//!    function of (state, subtotal, offers, now, buyer)
//! 2. **No I/O**: stores live behind checkout-service port traits
//! 3. **Integer Money**: all amounts in cents (i64), rates in basis points
//! 4. **Explicit Errors**: ineligibility is a normal outcome; hard failures
//!    are typed errors, never strings or panics

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod discount;
pub mod error;
pub mod money;
pub mod offer;
pub mod pricing;
pub mod shipping;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartItem};
pub use discount::{AppliedDiscount, ApplicationMethod, NearMissOffer, UsageCounter};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Percent};
pub use pricing::{PriceBreakdown, PricedSelection};
pub use shipping::{OrderTotals, VatBreakdown};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum item lines allowed in a single cart.
///
/// Prevents runaway carts; can be made configurable per store later.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single item line.
///
/// Prevents accidental over-ordering (e.g. typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// VAT rate used only when the settings store signals "unconfigured"
/// (2000 bps = 20%). Read exclusively through [`Settings::fallback`].
pub const FALLBACK_VAT_BPS: u32 = 2000;

/// Flat delivery fee used only when settings are unconfigured or no tier
/// covers the amount. Read through [`Settings::fallback`] and
/// [`shipping::shipping_fee`].
pub const FALLBACK_DELIVERY_FEE_CENTS: i64 = 599;
