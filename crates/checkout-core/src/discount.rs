//! # Discount Resolution
//!
//! Decides which discount (a manually entered code or an auto-qualifying
//! offer) applies to a cart, and keeps that decision consistent as the cart
//! changes.
//!
//! ## Resolution Flow (after every cart mutation)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Discount Resolution                                 │
//! │                                                                         │
//! │  1. REVALIDATE the applied discount against the CURRENT subtotal       │
//! │     └── any failure clears it entirely; a surviving amount is           │
//! │         recomputed, never stale                                         │
//! │                                                                         │
//! │  2. AUTO-APPLY (skipped while a manual code holds the lock)             │
//! │     └── best eligible auto offer replaces the applied discount          │
//! │         only when strictly greater                                      │
//! │                                                                         │
//! │  3. MANUAL SUBMISSION                                                   │
//! │     └── a strictly better auto offer wins and is REPORTED,              │
//! │         never substituted silently                                      │
//! │                                                                         │
//! │  4. UNLOCK → clear the manual lock, re-run step 2                       │
//! │                                                                         │
//! │  5. NEAR MISSES → offers the buyer almost qualifies for                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is a pure function of (state, subtotal, offers, now,
//! buyer). Usage-counter increments are *reported* to the caller as part of
//! the outcome; the store performs them. Ineligibility is a normal outcome,
//! never an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::offer::{check_offer, discount_for};
use crate::types::{Buyer, Offer};

// =============================================================================
// Discount State
// =============================================================================

/// How the applied discount got onto the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationMethod {
    Manual,
    Auto,
}

/// A discount currently applied to a cart.
///
/// The cart holds `Option<AppliedDiscount>`, so discount state is either
/// fully empty or fully populated by construction. `amount_cents` always
/// satisfies the offer's rules for the *present* subtotal; resolution never
/// persists a stale amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AppliedDiscount {
    pub offer_id: String,
    pub code: String,
    pub amount_cents: i64,
    pub auto_applied: bool,
    pub method: ApplicationMethod,
    /// Set by a manual submission; while held, auto-apply is skipped.
    /// Clearing the discount clears the lock with it.
    pub manual_locked: bool,
}

impl AppliedDiscount {
    /// Returns the discount amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }

    fn auto(offer: &Offer, amount: Money) -> Self {
        AppliedDiscount {
            offer_id: offer.id.clone(),
            code: offer.code.clone(),
            amount_cents: amount.cents(),
            auto_applied: true,
            method: ApplicationMethod::Auto,
            manual_locked: false,
        }
    }

    fn manual(offer: &Offer, amount: Money) -> Self {
        AppliedDiscount {
            offer_id: offer.id.clone(),
            code: offer.code.clone(),
            amount_cents: amount.cents(),
            auto_applied: false,
            method: ApplicationMethod::Manual,
            manual_locked: true,
        }
    }
}

/// Which usage counter an applied offer should have incremented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageCounter {
    Auto,
    Manual,
}

/// Outcome of resolution steps 1–2.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The discount state the cart should now carry.
    pub state: Option<AppliedDiscount>,
    /// A usage increment for the caller's store to perform, reported only
    /// when the applied offer actually changed.
    pub usage: Option<(String, UsageCounter)>,
}

/// Outcome of a manual code submission (step 3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeOutcome {
    pub state: Option<AppliedDiscount>,
    /// True when an auto offer beat the submitted code and was applied
    /// instead. Never silent: the caller must surface this.
    pub better_offer_applied: bool,
    pub usage: Option<(String, UsageCounter)>,
}

/// An offer the buyer almost qualifies for.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NearMissOffer {
    pub offer: Offer,
    /// How far the subtotal is from the offer's minimum.
    pub gap_cents: i64,
    /// What the discount would be worth at exactly the minimum.
    pub potential_discount_cents: i64,
}

// =============================================================================
// Step 1: Revalidate
// =============================================================================

/// Re-checks an applied discount against the current subtotal and buyer.
///
/// `current_offer` is the store's present view of the applied offer; `None`
/// means it was deleted. Any failure, including the subtotal dropping below
/// the minimum after an item removal, clears the state entirely. Otherwise
/// the amount is recomputed from the current subtotal.
pub fn revalidate(
    state: Option<AppliedDiscount>,
    current_offer: Option<&Offer>,
    subtotal: Money,
    now: DateTime<Utc>,
    buyer: Buyer,
) -> Option<AppliedDiscount> {
    let applied = state?;
    let offer = current_offer?;

    if offer.id != applied.offer_id {
        return None;
    }

    check_offer(offer, now, buyer).ok()?;
    let amount = discount_for(offer, subtotal)?;

    Some(AppliedDiscount {
        amount_cents: amount.cents(),
        ..applied
    })
}

// =============================================================================
// Step 2: Auto-Selection
// =============================================================================

/// Picks the best auto-applicable offer for the current subtotal.
///
/// Keeps offers that pass every eligibility check and meet their minimum,
/// computes each discount, and returns the maximum. Equal discounts
/// tie-break on earliest `created_at` for determinism.
pub fn select_auto<'a>(
    auto_offers: &'a [Offer],
    subtotal: Money,
    now: DateTime<Utc>,
    buyer: Buyer,
) -> Option<(&'a Offer, Money)> {
    let mut best: Option<(&Offer, Money)> = None;

    for offer in auto_offers {
        if !offer.auto_apply || check_offer(offer, now, buyer).is_err() {
            continue;
        }
        let Some(amount) = discount_for(offer, subtotal) else {
            continue;
        };
        if !amount.is_positive() {
            continue;
        }

        best = match best {
            None => Some((offer, amount)),
            Some((current, current_amount)) => {
                if amount > current_amount
                    || (amount == current_amount && offer.created_at < current.created_at)
                {
                    Some((offer, amount))
                } else {
                    Some((current, current_amount))
                }
            }
        };
    }

    best
}

// =============================================================================
// Steps 1-2: Resolve
// =============================================================================

/// Runs revalidation then auto-selection; the entry point after every cart
/// mutation.
///
/// An auto offer replaces the surviving discount only when strictly greater
/// than it, and the usage increment is reported only when the applied offer
/// id actually changed; recomputing the same offer's amount is not a use.
pub fn resolve(
    state: Option<AppliedDiscount>,
    current_offer: Option<&Offer>,
    subtotal: Money,
    auto_offers: &[Offer],
    now: DateTime<Utc>,
    buyer: Buyer,
) -> Resolution {
    let previous_offer_id = state.as_ref().map(|s| s.offer_id.clone());
    let state = revalidate(state, current_offer, subtotal, now, buyer);

    if state.as_ref().is_some_and(|s| s.manual_locked) {
        return Resolution { state, usage: None };
    }

    let current_amount = state
        .as_ref()
        .map(|s| s.amount())
        .unwrap_or_else(Money::zero);

    match select_auto(auto_offers, subtotal, now, buyer) {
        Some((offer, amount)) if amount > current_amount => {
            let usage = (previous_offer_id.as_deref() != Some(offer.id.as_str()))
                .then(|| (offer.id.clone(), UsageCounter::Auto));
            Resolution {
                state: Some(AppliedDiscount::auto(offer, amount)),
                usage,
            }
        }
        _ => Resolution { state, usage: None },
    }
}

// =============================================================================
// Step 3: Manual Submission
// =============================================================================

/// Applies a buyer-entered code, unless a strictly better auto offer exists.
///
/// ## Rules
/// - A different code while a manual code is active → `OfferCodeConflict`;
///   an auto-applied discount never blocks a submission
/// - Resubmitting the same code recomputes idempotently (no usage increment)
/// - The evaluator's ineligibility reason surfaces as `OfferIneligible`, as
///   does a subtotal below the code's minimum
/// - The best auto offer is computed ignoring any lock; if strictly greater
///   than the code's discount it is applied instead and reported
pub fn submit_code(
    state: Option<AppliedDiscount>,
    offer: &Offer,
    subtotal: Money,
    auto_offers: &[Offer],
    now: DateTime<Utc>,
    buyer: Buyer,
) -> CoreResult<CodeOutcome> {
    if let Some(applied) = &state {
        if applied.method == ApplicationMethod::Manual && applied.code != offer.code {
            return Err(CoreError::OfferCodeConflict {
                active: applied.code.clone(),
                submitted: offer.code.clone(),
            });
        }
    }

    check_offer(offer, now, buyer)
        .map_err(|reason| CoreError::OfferIneligible(reason.to_string()))?;

    let manual_amount = discount_for(offer, subtotal).ok_or_else(|| {
        CoreError::OfferIneligible(format!(
            "cart subtotal is below the minimum order amount of {}",
            offer.min_order()
        ))
    })?;

    let previous_offer_id = state.as_ref().map(|s| s.offer_id.clone());

    if let Some((auto_offer, auto_amount)) = select_auto(auto_offers, subtotal, now, buyer) {
        if auto_amount > manual_amount {
            let usage = (previous_offer_id.as_deref() != Some(auto_offer.id.as_str()))
                .then(|| (auto_offer.id.clone(), UsageCounter::Auto));
            return Ok(CodeOutcome {
                state: Some(AppliedDiscount::auto(auto_offer, auto_amount)),
                better_offer_applied: true,
                usage,
            });
        }
    }

    let usage = (previous_offer_id.as_deref() != Some(offer.id.as_str()))
        .then(|| (offer.id.clone(), UsageCounter::Manual));

    Ok(CodeOutcome {
        state: Some(AppliedDiscount::manual(offer, manual_amount)),
        better_offer_applied: false,
        usage,
    })
}

// =============================================================================
// Step 4: Unlock
// =============================================================================

/// Clears the manual lock, then re-runs auto-selection (step 2).
pub fn unlock(
    state: Option<AppliedDiscount>,
    current_offer: Option<&Offer>,
    subtotal: Money,
    auto_offers: &[Offer],
    now: DateTime<Utc>,
    buyer: Buyer,
) -> Resolution {
    let unlocked = state.map(|mut s| {
        s.manual_locked = false;
        s
    });
    resolve(unlocked, current_offer, subtotal, auto_offers, now, buyer)
}

// =============================================================================
// Step 5: Near Misses
// =============================================================================

/// Auto-applicable offers that are otherwise valid but whose minimum the
/// subtotal does not yet meet, sorted by ascending gap.
///
/// `potential_discount` is what the offer would be worth at exactly its
/// minimum, the upsell number the UI shows.
pub fn near_misses(
    auto_offers: &[Offer],
    subtotal: Money,
    now: DateTime<Utc>,
    buyer: Buyer,
) -> Vec<NearMissOffer> {
    let mut misses: Vec<NearMissOffer> = auto_offers
        .iter()
        .filter(|offer| offer.auto_apply && check_offer(offer, now, buyer).is_ok())
        .filter(|offer| subtotal < offer.min_order())
        .map(|offer| {
            let potential = discount_for(offer, offer.min_order()).unwrap_or_else(Money::zero);
            NearMissOffer {
                gap_cents: (offer.min_order() - subtotal).cents(),
                potential_discount_cents: potential.cents(),
                offer: offer.clone(),
            }
        })
        .collect();

    misses.sort_by(|a, b| {
        a.gap_cents
            .cmp(&b.gap_cents)
            .then_with(|| a.offer.created_at.cmp(&b.offer.created_at))
    });
    misses
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Audience, DiscountType};
    use chrono::Duration;

    fn offer(code: &str, discount_type: DiscountType, value: i64, min_cents: i64) -> Offer {
        Offer {
            id: format!("offer-{}", code.to_lowercase()),
            code: code.to_string(),
            description: None,
            discount_type,
            discount_value: value,
            min_order_cents: min_cents,
            valid_from: None,
            valid_to: None,
            max_uses: None,
            used_count: 0,
            audience: Audience::All,
            auto_apply: false,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn auto_offer(code: &str, discount_type: DiscountType, value: i64, min_cents: i64) -> Offer {
        let mut o = offer(code, discount_type, value, min_cents);
        o.auto_apply = true;
        o
    }

    fn applied_manual(offer: &Offer, amount_cents: i64) -> AppliedDiscount {
        AppliedDiscount {
            offer_id: offer.id.clone(),
            code: offer.code.clone(),
            amount_cents,
            auto_applied: false,
            method: ApplicationMethod::Manual,
            manual_locked: true,
        }
    }

    // -------------------------------------------------------------------------
    // Step 1: Revalidate
    // -------------------------------------------------------------------------

    /// Scenario: SAVE10 applied at subtotal 150.00 → 15.00; removing an item
    /// drops the subtotal to 80.00, below the 100.00 minimum → cleared.
    #[test]
    fn test_revalidate_clears_when_below_minimum() {
        let save10 = offer("SAVE10", DiscountType::Percentage, 1000, 10_000);
        let applied = applied_manual(&save10, 1_500);

        let kept = revalidate(
            Some(applied.clone()),
            Some(&save10),
            Money::from_cents(15_000),
            Utc::now(),
            Buyer::Guest,
        );
        assert_eq!(kept.unwrap().amount_cents, 1_500);

        let cleared = revalidate(
            Some(applied),
            Some(&save10),
            Money::from_cents(8_000),
            Utc::now(),
            Buyer::Guest,
        );
        assert!(cleared.is_none());
    }

    #[test]
    fn test_revalidate_recomputes_amount_never_stale() {
        let save10 = offer("SAVE10", DiscountType::Percentage, 1000, 10_000);
        // Amount recorded at an older subtotal.
        let applied = applied_manual(&save10, 1_500);

        let state = revalidate(
            Some(applied),
            Some(&save10),
            Money::from_cents(20_000),
            Utc::now(),
            Buyer::Guest,
        )
        .unwrap();
        assert_eq!(state.amount_cents, 2_000);
    }

    #[test]
    fn test_revalidate_clears_on_deleted_or_expired_offer() {
        let mut save10 = offer("SAVE10", DiscountType::Percentage, 1000, 0);
        let applied = applied_manual(&save10, 1_000);

        // Offer deleted from the store.
        assert!(revalidate(
            Some(applied.clone()),
            None,
            Money::from_cents(10_000),
            Utc::now(),
            Buyer::Guest,
        )
        .is_none());

        // Offer expired since application.
        save10.valid_to = Some(Utc::now() - Duration::hours(1));
        assert!(revalidate(
            Some(applied),
            Some(&save10),
            Money::from_cents(10_000),
            Utc::now(),
            Buyer::Guest,
        )
        .is_none());
    }

    #[test]
    fn test_revalidate_on_buyer_change() {
        // A guest logging in mid-session loses a new-customers offer if the
        // account has prior orders.
        let mut welcome = offer("WELCOME", DiscountType::Fixed, 500, 0);
        welcome.audience = Audience::NewCustomers;
        let applied = applied_manual(&welcome, 500);

        let kept = revalidate(
            Some(applied.clone()),
            Some(&welcome),
            Money::from_cents(5_000),
            Utc::now(),
            Buyer::Customer { new_customer: true },
        );
        assert!(kept.is_some());

        let cleared = revalidate(
            Some(applied),
            Some(&welcome),
            Money::from_cents(5_000),
            Utc::now(),
            Buyer::Customer { new_customer: false },
        );
        assert!(cleared.is_none());
    }

    // -------------------------------------------------------------------------
    // Step 2: Auto-selection
    // -------------------------------------------------------------------------

    #[test]
    fn test_select_auto_picks_maximum() {
        let offers = vec![
            auto_offer("AUTO5", DiscountType::Fixed, 500, 0),
            auto_offer("AUTO10PCT", DiscountType::Percentage, 1000, 0),
        ];

        // At 150.00 the percentage offer (15.00) beats the fixed 5.00.
        let (best, amount) =
            select_auto(&offers, Money::from_cents(15_000), Utc::now(), Buyer::Guest).unwrap();
        assert_eq!(best.code, "AUTO10PCT");
        assert_eq!(amount.cents(), 1_500);

        // At 30.00 the percentage offer is worth 3.00; the fixed 5.00 wins.
        let (best, amount) =
            select_auto(&offers, Money::from_cents(3_000), Utc::now(), Buyer::Guest).unwrap();
        assert_eq!(best.code, "AUTO5");
        assert_eq!(amount.cents(), 500);
    }

    #[test]
    fn test_select_auto_tie_breaks_on_created_at() {
        let mut older = auto_offer("OLDER", DiscountType::Fixed, 500, 0);
        older.created_at = Utc::now() - Duration::days(7);
        let newer = auto_offer("NEWER", DiscountType::Fixed, 500, 0);

        // Listing order must not matter.
        let offers = vec![newer.clone(), older.clone()];
        let (best, _) =
            select_auto(&offers, Money::from_cents(10_000), Utc::now(), Buyer::Guest).unwrap();
        assert_eq!(best.code, "OLDER");

        let offers = vec![older, newer];
        let (best, _) =
            select_auto(&offers, Money::from_cents(10_000), Utc::now(), Buyer::Guest).unwrap();
        assert_eq!(best.code, "OLDER");
    }

    #[test]
    fn test_select_auto_skips_ineligible_and_below_minimum() {
        let mut inactive = auto_offer("DEAD", DiscountType::Fixed, 10_000, 0);
        inactive.is_active = false;
        let high_min = auto_offer("BIG", DiscountType::Fixed, 5_000, 50_000);
        let ok = auto_offer("SMALL", DiscountType::Fixed, 200, 0);

        let offers = vec![inactive, high_min, ok];
        let (best, amount) =
            select_auto(&offers, Money::from_cents(10_000), Utc::now(), Buyer::Guest).unwrap();
        assert_eq!(best.code, "SMALL");
        assert_eq!(amount.cents(), 200);
    }

    // -------------------------------------------------------------------------
    // Steps 1-2: Resolve
    // -------------------------------------------------------------------------

    #[test]
    fn test_resolve_auto_applies_on_empty_state() {
        let offers = vec![auto_offer("AUTO5", DiscountType::Fixed, 500, 0)];
        let resolution = resolve(
            None,
            None,
            Money::from_cents(5_000),
            &offers,
            Utc::now(),
            Buyer::Guest,
        );

        let state = resolution.state.unwrap();
        assert_eq!(state.code, "AUTO5");
        assert_eq!(state.method, ApplicationMethod::Auto);
        assert!(state.auto_applied);
        assert!(!state.manual_locked);
        assert_eq!(
            resolution.usage,
            Some(("offer-auto5".to_string(), UsageCounter::Auto))
        );
    }

    #[test]
    fn test_resolve_keeps_same_auto_offer_without_reincrementing() {
        let offers = vec![auto_offer("AUTO10PCT", DiscountType::Percentage, 1000, 0)];
        let first = resolve(
            None,
            None,
            Money::from_cents(10_000),
            &offers,
            Utc::now(),
            Buyer::Guest,
        );
        assert!(first.usage.is_some());

        // Subtotal grows; same offer stays applied with a recomputed amount
        // and no second increment.
        let second = resolve(
            first.state,
            Some(&offers[0]),
            Money::from_cents(20_000),
            &offers,
            Utc::now(),
            Buyer::Guest,
        );
        assert_eq!(second.state.unwrap().amount_cents, 2_000);
        assert!(second.usage.is_none());
    }

    #[test]
    fn test_resolve_respects_manual_lock() {
        let save10 = offer("SAVE10", DiscountType::Percentage, 1000, 0);
        let offers = vec![auto_offer("AUTO50", DiscountType::Fixed, 5_000, 0)];
        let applied = applied_manual(&save10, 1_000);

        let resolution = resolve(
            Some(applied),
            Some(&save10),
            Money::from_cents(10_000),
            &offers,
            Utc::now(),
            Buyer::Guest,
        );

        // The far better auto offer must not displace the locked code.
        let state = resolution.state.unwrap();
        assert_eq!(state.code, "SAVE10");
        assert!(resolution.usage.is_none());
    }

    #[test]
    fn test_resolve_replaces_only_when_strictly_better() {
        let current = auto_offer("AUTO5", DiscountType::Fixed, 500, 0);
        let equal = auto_offer("ALSO5", DiscountType::Fixed, 500, 0);
        let offers = vec![current.clone(), equal];

        let first = resolve(
            None,
            None,
            Money::from_cents(5_000),
            &offers,
            Utc::now(),
            Buyer::Guest,
        );
        let state = first.state.clone().unwrap();

        // Equal-value alternative: applied offer is kept.
        let second = resolve(
            first.state,
            offers.iter().find(|o| o.id == state.offer_id),
            Money::from_cents(5_000),
            &offers,
            Utc::now(),
            Buyer::Guest,
        );
        assert_eq!(second.state.unwrap().offer_id, state.offer_id);
        assert!(second.usage.is_none());
    }

    // -------------------------------------------------------------------------
    // Step 3: Manual submission
    // -------------------------------------------------------------------------

    /// Scenario: a manual code worth 5.00 while an auto offer is worth 12.00
    /// → the auto offer is applied instead and reported.
    #[test]
    fn test_submit_code_better_auto_offer_wins_and_is_reported() {
        let manual = offer("FIVE", DiscountType::Fixed, 500, 0);
        let offers = vec![auto_offer("TWELVE", DiscountType::Fixed, 1_200, 0)];

        let outcome = submit_code(
            None,
            &manual,
            Money::from_cents(10_000),
            &offers,
            Utc::now(),
            Buyer::Guest,
        )
        .unwrap();

        assert!(outcome.better_offer_applied);
        let state = outcome.state.unwrap();
        assert_eq!(state.code, "TWELVE");
        assert_eq!(state.amount_cents, 1_200);
        assert_eq!(state.method, ApplicationMethod::Auto);
        assert_eq!(
            outcome.usage,
            Some(("offer-twelve".to_string(), UsageCounter::Auto))
        );
    }

    #[test]
    fn test_submit_code_applies_manual_and_locks() {
        let manual = offer("SAVE10", DiscountType::Percentage, 1000, 10_000);
        let offers = vec![auto_offer("AUTO2", DiscountType::Fixed, 200, 0)];

        let outcome = submit_code(
            None,
            &manual,
            Money::from_cents(15_000),
            &offers,
            Utc::now(),
            Buyer::Guest,
        )
        .unwrap();

        assert!(!outcome.better_offer_applied);
        let state = outcome.state.unwrap();
        assert_eq!(state.amount_cents, 1_500);
        assert!(state.manual_locked);
        assert_eq!(
            outcome.usage,
            Some(("offer-save10".to_string(), UsageCounter::Manual))
        );
    }

    #[test]
    fn test_submit_code_idempotent_resubmission() {
        let manual = offer("SAVE10", DiscountType::Percentage, 1000, 0);

        let first = submit_code(
            None,
            &manual,
            Money::from_cents(10_000),
            &[],
            Utc::now(),
            Buyer::Guest,
        )
        .unwrap();
        assert!(first.usage.is_some());

        let second = submit_code(
            first.state.clone(),
            &manual,
            Money::from_cents(10_000),
            &[],
            Utc::now(),
            Buyer::Guest,
        )
        .unwrap();

        assert_eq!(first.state, second.state);
        assert!(second.usage.is_none());
    }

    #[test]
    fn test_submit_code_conflict_with_different_active_code() {
        let active = offer("SAVE10", DiscountType::Percentage, 1000, 0);
        let submitted = offer("OTHER", DiscountType::Fixed, 300, 0);
        let state = Some(applied_manual(&active, 1_000));

        let err = submit_code(
            state,
            &submitted,
            Money::from_cents(10_000),
            &[],
            Utc::now(),
            Buyer::Guest,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::OfferCodeConflict { .. }));
    }

    #[test]
    fn test_submit_code_over_auto_applied_discount_is_allowed() {
        let auto = auto_offer("AUTO2", DiscountType::Fixed, 200, 0);
        let offers = vec![auto.clone()];
        let base = resolve(
            None,
            None,
            Money::from_cents(10_000),
            &offers,
            Utc::now(),
            Buyer::Guest,
        );

        // A better manual code replaces an auto-applied discount freely.
        let manual = offer("SAVE10", DiscountType::Percentage, 1000, 0);
        let outcome = submit_code(
            base.state,
            &manual,
            Money::from_cents(10_000),
            &offers,
            Utc::now(),
            Buyer::Guest,
        )
        .unwrap();
        assert!(!outcome.better_offer_applied);
        assert_eq!(outcome.state.unwrap().code, "SAVE10");
    }

    #[test]
    fn test_submit_code_ineligible_and_below_minimum() {
        let mut expired = offer("OLD", DiscountType::Fixed, 500, 0);
        expired.valid_to = Some(Utc::now() - Duration::hours(1));

        let err = submit_code(
            None,
            &expired,
            Money::from_cents(10_000),
            &[],
            Utc::now(),
            Buyer::Guest,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::OfferIneligible(ref r) if r.contains("expired")));

        let high_min = offer("BIG", DiscountType::Fixed, 500, 50_000);
        let err = submit_code(
            None,
            &high_min,
            Money::from_cents(10_000),
            &[],
            Utc::now(),
            Buyer::Guest,
        )
        .unwrap_err();
        assert!(matches!(err, CoreError::OfferIneligible(ref r) if r.contains("minimum")));
    }

    // -------------------------------------------------------------------------
    // Step 4: Unlock
    // -------------------------------------------------------------------------

    #[test]
    fn test_unlock_lets_better_auto_offer_in() {
        let manual = offer("FIVE", DiscountType::Fixed, 500, 0);
        let offers = vec![auto_offer("TWELVE", DiscountType::Fixed, 1_200, 0)];
        let state = Some(applied_manual(&manual, 500));

        let resolution = unlock(
            state,
            Some(&manual),
            Money::from_cents(10_000),
            &offers,
            Utc::now(),
            Buyer::Guest,
        );

        let state = resolution.state.unwrap();
        assert_eq!(state.code, "TWELVE");
        assert_eq!(state.method, ApplicationMethod::Auto);
        assert!(resolution.usage.is_some());
    }

    // -------------------------------------------------------------------------
    // Step 5: Near misses
    // -------------------------------------------------------------------------

    /// Scenario: minimum 200.00, subtotal 150.00 → gap 50.00.
    #[test]
    fn test_near_miss_gap_and_potential() {
        let offers = vec![auto_offer("BIG", DiscountType::Percentage, 1000, 20_000)];
        let misses = near_misses(&offers, Money::from_cents(15_000), Utc::now(), Buyer::Guest);

        assert_eq!(misses.len(), 1);
        assert_eq!(misses[0].gap_cents, 5_000);
        // 10% of the 200.00 minimum.
        assert_eq!(misses[0].potential_discount_cents, 2_000);
    }

    #[test]
    fn test_near_miss_excludes_qualifying_and_invalid_offers() {
        let qualifying = auto_offer("NOW", DiscountType::Fixed, 500, 10_000);
        let mut inactive = auto_offer("DEAD", DiscountType::Fixed, 500, 50_000);
        inactive.is_active = false;
        let missing = auto_offer("SOON", DiscountType::Fixed, 500, 30_000);

        let offers = vec![qualifying, inactive, missing];
        let misses = near_misses(&offers, Money::from_cents(15_000), Utc::now(), Buyer::Guest);

        assert_eq!(misses.len(), 1);
        assert_eq!(misses[0].offer.code, "SOON");
    }

    #[test]
    fn test_near_miss_sorted_by_ascending_gap() {
        let offers = vec![
            auto_offer("FAR", DiscountType::Fixed, 500, 50_000),
            auto_offer("NEAR", DiscountType::Fixed, 500, 20_000),
        ];
        let misses = near_misses(&offers, Money::from_cents(15_000), Utc::now(), Buyer::Guest);

        assert_eq!(misses.len(), 2);
        assert_eq!(misses[0].offer.code, "NEAR");
        assert_eq!(misses[1].offer.code, "FAR");
    }
}
