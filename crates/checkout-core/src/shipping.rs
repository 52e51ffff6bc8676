//! # Shipping & Tax Calculator
//!
//! Tiered delivery fees, tax-inclusive price decomposition, and the final
//! order totals read at checkout.
//!
//! All prices in the system are tax-inclusive by construction upstream; VAT
//! is *extracted* for display and reporting, never added on top.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult};
use crate::money::{Money, Percent};
use crate::types::Settings;
use crate::validation::validate_percent_bps;
use crate::FALLBACK_DELIVERY_FEE_CENTS;

// =============================================================================
// Shipping Fee
// =============================================================================

/// Computes the delivery fee for the amount after discount.
///
/// ## Rules
/// - Free delivery when enabled and the amount meets the threshold
/// - Otherwise the fee of the first tier where `min <= amount` and the
///   upper bound is unbounded or `amount <= max`
/// - Tiers are assumed contiguous and non-overlapping by configuration;
///   this is not validated here. An amount no tier covers falls back to
///   the named default fee rather than silently shipping free.
pub fn shipping_fee(amount_after_discount: Money, settings: &Settings) -> Money {
    if settings.free_delivery.enabled
        && amount_after_discount.cents() >= settings.free_delivery.threshold_cents
    {
        return Money::zero();
    }

    settings
        .delivery_tiers
        .iter()
        .find(|tier| {
            amount_after_discount.cents() >= tier.min_cents
                && tier
                    .max_cents
                    .map_or(true, |max| amount_after_discount.cents() <= max)
        })
        .map(|tier| Money::from_cents(tier.fee_cents))
        .unwrap_or_else(|| Money::from_cents(FALLBACK_DELIVERY_FEE_CENTS))
}

// =============================================================================
// VAT Extraction
// =============================================================================

/// Net and VAT portions of a tax-inclusive amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VatBreakdown {
    pub net_cents: i64,
    pub vat_cents: i64,
}

/// Decomposes a tax-inclusive amount: `net = gross / (1 + rate)`,
/// `vat = gross - net`.
///
/// Integer math with half-up rounding on the net:
/// `net = (gross * 10000 + divisor/2) / divisor` where
/// `divisor = 10000 + bps`.
///
/// ## Example
/// ```rust
/// use checkout_core::money::{Money, Percent};
/// use checkout_core::shipping::extract_vat;
///
/// // 120.00 gross at 20% VAT → net 100.00, vat 20.00
/// let vat = extract_vat(Money::from_cents(12_000), Percent::from_bps(2000));
/// assert_eq!(vat.net_cents, 10_000);
/// assert_eq!(vat.vat_cents, 2_000);
/// ```
pub fn extract_vat(gross: Money, rate: Percent) -> VatBreakdown {
    if rate.is_zero() {
        return VatBreakdown {
            net_cents: gross.cents(),
            vat_cents: 0,
        };
    }

    let divisor = 10000i128 + rate.bps() as i128;
    let net = (gross.cents() as i128 * 10000 + divisor / 2) / divisor;
    VatBreakdown {
        net_cents: net as i64,
        vat_cents: gross.cents() - net as i64,
    }
}

// =============================================================================
// Order Totals
// =============================================================================

/// The price snapshot handed to order creation at checkout.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderTotals {
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub shipping_cents: i64,
    /// VAT contained in `total_cents` (0 when VAT is disabled). Display
    /// only; the total already includes it.
    pub vat_cents: i64,
    pub total_cents: i64,
}

/// Builds the totals for a cart at checkout time.
///
/// `total = (subtotal - discount) + shipping`; VAT is extracted from the
/// total for display. Fails `CartEmpty` when there is nothing to check out,
/// and rejects a configured VAT rate above 100% rather than computing
/// nonsense totals from it.
pub fn order_totals(cart: &Cart, settings: &Settings) -> CoreResult<OrderTotals> {
    if cart.is_empty() {
        return Err(CoreError::CartEmpty);
    }
    if settings.vat_enabled {
        validate_percent_bps(settings.vat_bps)?;
    }

    let subtotal = cart.subtotal();
    let discount = cart
        .discount
        .as_ref()
        .map(|d| d.amount())
        .unwrap_or_else(Money::zero);
    let after_discount = (subtotal - discount).clamp_non_negative();

    let shipping = shipping_fee(after_discount, settings);
    let total = after_discount + shipping;

    let vat_cents = if settings.vat_enabled {
        extract_vat(total, settings.vat_rate()).vat_cents
    } else {
        0
    };

    Ok(OrderTotals {
        subtotal_cents: subtotal.cents(),
        discount_cents: discount.cents(),
        shipping_cents: shipping.cents(),
        vat_cents,
        total_cents: total.cents(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
