//! # Offer Evaluator
//!
//! Decides whether an offer is valid for a buyer at a point in time, and
//! computes its discount amount for a given subtotal.
//!
//! Two failure shapes, deliberately separate:
//! - [`Ineligibility`]: the offer cannot apply to this buyer right now
//!   (inactive, out of window, exhausted, wrong audience). Carries a
//!   human-readable reason.
//! - A subtotal below `min_order_cents` is NOT an ineligibility; it is the
//!   near-miss case, and [`discount_for`] reports it as `None` so the
//!   resolution layer can surface an upsell prompt instead of an error.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::money::{Money, Percent};
use crate::types::{Audience, Buyer, DiscountType, Offer};

// =============================================================================
// Ineligibility
// =============================================================================

/// Why an offer cannot apply. `Display` is the client-facing reason string
/// carried by `CoreError::OfferIneligible`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ineligibility {
    /// Offer is deactivated.
    Inactive,
    /// `now` is before `valid_from`.
    NotStarted,
    /// `now` is after `valid_to`.
    Expired,
    /// `max_uses` reached.
    UsageExhausted,
    /// Offer is restricted to new customers and the buyer is not one.
    NewCustomersOnly,
}

impl fmt::Display for Ineligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            Ineligibility::Inactive => "offer is no longer active",
            Ineligibility::NotStarted => "offer is not yet valid",
            Ineligibility::Expired => "offer has expired",
            Ineligibility::UsageExhausted => "offer usage limit has been reached",
            Ineligibility::NewCustomersOnly => "offer is only available to new customers",
        };
        f.write_str(reason)
    }
}

// =============================================================================
// Eligibility Check
// =============================================================================

/// Checks every eligibility rule except the minimum order amount.
///
/// ## Rules
/// - Offer must be active
/// - `now` must fall within `[valid_from, valid_to]` (either bound optional)
/// - `used_count` must be below `max_uses` when a cap is set
/// - A new-customers offer requires a known buyer with zero non-cancelled
///   orders; guest sessions never qualify
pub fn check_offer(offer: &Offer, now: DateTime<Utc>, buyer: Buyer) -> Result<(), Ineligibility> {
    if !offer.is_active {
        return Err(Ineligibility::Inactive);
    }

    if let Some(from) = offer.valid_from {
        if now < from {
            return Err(Ineligibility::NotStarted);
        }
    }

    if let Some(to) = offer.valid_to {
        if now > to {
            return Err(Ineligibility::Expired);
        }
    }

    if let Some(max) = offer.max_uses {
        if offer.used_count >= max {
            return Err(Ineligibility::UsageExhausted);
        }
    }

    if offer.audience == Audience::NewCustomers && !buyer.is_new_customer() {
        return Err(Ineligibility::NewCustomersOnly);
    }

    Ok(())
}

// =============================================================================
// Discount Calculation
// =============================================================================

/// Computes the offer's discount for a subtotal.
///
/// Returns `None` when `subtotal < min_order_cents`: the near-miss case,
/// not an error.
///
/// - Percentage: basis points of the subtotal, half-up rounding. The stored
///   value is clamped to [0, 10000] first so out-of-invariant offer data
///   cannot wrap through the cast or discount more than 100%
/// - Fixed: the offer value, capped at the raw subtotal so a discount never
///   exceeds what it discounts
pub fn discount_for(offer: &Offer, subtotal: Money) -> Option<Money> {
    if subtotal < offer.min_order() {
        return None;
    }

    let amount = match offer.discount_type {
        DiscountType::Percentage => {
            let bps = offer.discount_value.clamp(0, 10_000) as u32;
            Percent::from_bps(bps).of(subtotal)
        }
        DiscountType::Fixed => Money::from_cents(offer.discount_value).min(subtotal),
    };

    Some(amount)
}

// =============================================================================
// Unit Tests
// =============================================================================
