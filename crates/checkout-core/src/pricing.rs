//! # Pricing Module
//!
//! Catalog resolution and price calculation for configurable products.
//!
//! ## Pricing Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Pricing Flow                                     │
//! │                                                                         │
//! │  Selection {material, size_mm, finishes, qty, packaging}                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  resolve_selection() ── match against product master data               │
//! │       │                  (any miss → SelectionInvalid)                  │
//! │       ▼                                                                 │
//! │  price_selection()  ── breakdown + unit price + line total              │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PricedSelection { breakdown, unit_price, total }                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Both steps are pure lookups and arithmetic; no side effects, no I/O.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{FinishOption, MaterialRef, MaterialVariant, Product, Selection, SizeOption};
use crate::validation::validate_quantity;

// =============================================================================
// Catalog Resolver
// =============================================================================

/// A selection matched against product master data.
///
/// Borrows from the product; lives only as long as the pricing call.
#[derive(Debug)]
pub struct ResolvedSelection<'a> {
    pub product: &'a Product,
    pub material: &'a MaterialVariant,
    pub size: Option<&'a SizeOption>,
    pub finishes: Vec<&'a FinishOption>,
}

/// Validates a requested (material, size, finish) combination against the
/// product's own lists.
///
/// ## Rules
/// - Material matches by id if the selection carries one, else by exact name
/// - A requested size must exist among that material's size options
/// - Every requested finish must exist among the product's finishes
///
/// Any miss fails with `SelectionInvalid` naming the missing piece.
pub fn resolve_selection<'a>(
    product: &'a Product,
    selection: &Selection,
) -> CoreResult<ResolvedSelection<'a>> {
    if !product.is_active {
        return Err(CoreError::SelectionInvalid(format!(
            "product '{}' is not available",
            product.name
        )));
    }

    let material = match &selection.material {
        MaterialRef::Id(id) => product.materials.iter().find(|m| &m.id == id),
        MaterialRef::Name(name) => product.materials.iter().find(|m| &m.name == name),
    }
    .ok_or_else(|| {
        CoreError::SelectionInvalid(format!(
            "material {:?} does not exist on product '{}'",
            selection.material, product.name
        ))
    })?;

    let size = match selection.size_mm {
        Some(mm) => Some(
            material
                .size_options
                .iter()
                .find(|s| s.size_mm == mm)
                .ok_or_else(|| {
                    CoreError::SelectionInvalid(format!(
                        "size {}mm is not available for material '{}'",
                        mm, material.name
                    ))
                })?,
        ),
        None => None,
    };

    let mut finishes = Vec::with_capacity(selection.finish_ids.len());
    for finish_id in &selection.finish_ids {
        let finish = product
            .finishes
            .iter()
            .find(|f| &f.finish_id == finish_id)
            .ok_or_else(|| {
                CoreError::SelectionInvalid(format!(
                    "finish '{}' does not exist on product '{}'",
                    finish_id, product.name
                ))
            })?;
        finishes.push(finish);
    }

    Ok(ResolvedSelection {
        product,
        material,
        size,
        finishes,
    })
}

// =============================================================================
// Price Breakdown
// =============================================================================

/// Component amounts of one unit's price.
///
/// ## Invariant
/// `material_net = max(0, material_base - material_discount)` always, even
/// when the product discount exceeds the base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceBreakdown {
    /// Material base price before the product-level discount.
    pub material_base_cents: i64,
    /// Product-level discount applied to the material base.
    pub material_discount_cents: i64,
    /// Material base after discount, clamped at zero.
    pub material_net_cents: i64,
    /// Additional cost of the matched size option (0 if none).
    pub size_cents: i64,
    /// Sum of matched finish adjustments (may be negative).
    pub finishes_cents: i64,
    /// Packaging price if requested (0 otherwise).
    pub packaging_cents: i64,
}

impl PriceBreakdown {
    /// Returns the material net amount as Money.
    #[inline]
    pub fn material_net(&self) -> Money {
        Money::from_cents(self.material_net_cents)
    }
}

/// A fully priced selection: breakdown plus unit and line amounts.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricedSelection {
    pub breakdown: PriceBreakdown,
    /// Price of one unit; the only place rounding occurs.
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// `unit_price * quantity`, exact.
    pub total_cents: i64,
}

impl PricedSelection {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Price Calculator
// =============================================================================

/// Turns a resolved selection plus quantity into a price breakdown and
/// unit/line price.
///
/// Rounding happens exactly once, inside the percentage-discount multiply;
/// everything after that is integer cent addition, so repeated additions
/// never compound rounding error.
///
/// Fails `InvalidQuantity` when quantity < 1.
pub fn price_selection(
    resolved: &ResolvedSelection<'_>,
    quantity: i64,
    include_packaging: bool,
) -> CoreResult<PricedSelection> {
    validate_quantity(quantity)?;

    let material_base = resolved.material.base_price();
    let material_discount = if resolved.product.discount_bps > 0 {
        resolved.product.discount().of(material_base)
    } else {
        Money::zero()
    };
    let material_net = (material_base - material_discount).clamp_non_negative();

    let size = resolved
        .size
        .map(|s| Money::from_cents(s.additional_cost_cents))
        .unwrap_or_else(Money::zero);

    let finishes: Money = resolved
        .finishes
        .iter()
        .map(|f| Money::from_cents(f.price_adjustment_cents))
        .sum();

    let packaging = if include_packaging {
        resolved.product.packaging_price()
    } else {
        Money::zero()
    };

    // Negative finish adjustments can undercut the rest of the breakdown;
    // a unit is never priced below zero.
    let unit_price = (material_net + size + finishes + packaging).clamp_non_negative();
    let total = unit_price.multiply_quantity(quantity);

    Ok(PricedSelection {
        breakdown: PriceBreakdown {
            material_base_cents: material_base.cents(),
            material_discount_cents: material_discount.cents(),
            material_net_cents: material_net.cents(),
            size_cents: size.cents(),
            finishes_cents: finishes.cents(),
            packaging_cents: packaging.cents(),
        },
        unit_price_cents: unit_price.cents(),
        quantity,
        total_cents: total.cents(),
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn test_product() -> Product {
        Product {
            id: "p-1".to_string(),
            name: "House Sign".to_string(),
            materials: vec![
                MaterialVariant {
                    id: "mat-brass".to_string(),
                    name: "Brass".to_string(),
                    base_price_cents: 10_000, // 100.00
                    size_options: vec![
                        SizeOption {
                            name: "Small".to_string(),
                            size_mm: 200,
                            additional_cost_cents: 0,
                        },
                        SizeOption {
                            name: "Large".to_string(),
                            size_mm: 300,
                            additional_cost_cents: 1_000, // +10.00
                        },
                    ],
                },
                MaterialVariant {
                    id: "mat-acrylic".to_string(),
                    name: "Acrylic".to_string(),
                    base_price_cents: 4_000,
                    size_options: vec![],
                },
            ],
            finishes: vec![
                FinishOption {
                    finish_id: "fin-polish".to_string(),
                    name: "Polished".to_string(),
                    price_adjustment_cents: 500, // +5.00
                },
                FinishOption {
                    finish_id: "fin-raw".to_string(),
                    name: "Unfinished".to_string(),
                    price_adjustment_cents: -300,
                },
            ],
            packaging_price_cents: 200, // 2.00
            discount_bps: 0,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn selection(material: MaterialRef, size_mm: Option<u32>, finishes: &[&str]) -> Selection {
        Selection {
            product_id: "p-1".to_string(),
            material,
            size_mm,
            finish_ids: finishes.iter().map(|f| f.to_string()).collect(),
            quantity: 1,
            include_packaging: false,
        }
    }

    #[test]
    fn test_resolve_by_id_and_by_name() {
        let product = test_product();

        let by_id = selection(MaterialRef::Id("mat-brass".to_string()), None, &[]);
        let resolved = resolve_selection(&product, &by_id).unwrap();
        assert_eq!(resolved.material.name, "Brass");

        let by_name = selection(MaterialRef::Name("Acrylic".to_string()), None, &[]);
        let resolved = resolve_selection(&product, &by_name).unwrap();
        assert_eq!(resolved.material.id, "mat-acrylic");
    }

    #[test]
    fn test_resolve_unknown_material_fails() {
        let product = test_product();
        let sel = selection(MaterialRef::Name("Marble".to_string()), None, &[]);
        assert!(matches!(
            resolve_selection(&product, &sel),
            Err(CoreError::SelectionInvalid(_))
        ));
    }

    #[test]
    fn test_resolve_size_must_belong_to_material() {
        let product = test_product();

        let ok = selection(MaterialRef::Id("mat-brass".to_string()), Some(300), &[]);
        assert!(resolve_selection(&product, &ok).is_ok());

        // Acrylic has no size options, so any requested size is invalid.
        let bad = selection(MaterialRef::Id("mat-acrylic".to_string()), Some(300), &[]);
        assert!(matches!(
            resolve_selection(&product, &bad),
            Err(CoreError::SelectionInvalid(_))
        ));
    }

    #[test]
    fn test_resolve_unknown_finish_fails() {
        let product = test_product();
        let sel = selection(
            MaterialRef::Id("mat-brass".to_string()),
            None,
            &["fin-missing"],
        );
        assert!(matches!(
            resolve_selection(&product, &sel),
            Err(CoreError::SelectionInvalid(_))
        ));
    }

    #[test]
    fn test_resolve_inactive_product_fails() {
        let mut product = test_product();
        product.is_active = false;
        let sel = selection(MaterialRef::Id("mat-brass".to_string()), None, &[]);
        assert!(resolve_selection(&product, &sel).is_err());
    }

    /// Scenario: base 100.00, no product discount, size +10.00, finish +5.00,
    /// packaging 2.00, quantity 2 → unit 117.00, total 234.00.
    #[test]
    fn test_price_full_breakdown() {
        let product = test_product();
        let sel = selection(
            MaterialRef::Id("mat-brass".to_string()),
            Some(300),
            &["fin-polish"],
        );
        let resolved = resolve_selection(&product, &sel).unwrap();
        let priced = price_selection(&resolved, 2, true).unwrap();

        assert_eq!(priced.breakdown.material_base_cents, 10_000);
        assert_eq!(priced.breakdown.material_discount_cents, 0);
        assert_eq!(priced.breakdown.material_net_cents, 10_000);
        assert_eq!(priced.breakdown.size_cents, 1_000);
        assert_eq!(priced.breakdown.finishes_cents, 500);
        assert_eq!(priced.breakdown.packaging_cents, 200);
        assert_eq!(priced.unit_price_cents, 11_700);
        assert_eq!(priced.total_cents, 23_400);
    }

    #[test]
    fn test_price_product_discount() {
        let mut product = test_product();
        product.discount_bps = 2500; // 25% off the material base

        let sel = selection(MaterialRef::Id("mat-brass".to_string()), None, &[]);
        let resolved = resolve_selection(&product, &sel).unwrap();
        let priced = price_selection(&resolved, 1, false).unwrap();

        assert_eq!(priced.breakdown.material_discount_cents, 2_500);
        assert_eq!(priced.breakdown.material_net_cents, 7_500);
        assert_eq!(priced.unit_price_cents, 7_500);
    }

    #[test]
    fn test_material_net_clamps_at_zero() {
        let mut product = test_product();
        // A full product discount wipes out the material base; the breakdown
        // still holds its invariant.
        product.discount_bps = 10000;

        let sel = selection(MaterialRef::Id("mat-brass".to_string()), None, &[]);
        let resolved = resolve_selection(&product, &sel).unwrap();
        let priced = price_selection(&resolved, 1, false).unwrap();
        assert_eq!(priced.breakdown.material_net_cents, 0);
    }

    #[test]
    fn test_negative_finish_never_prices_below_zero() {
        let mut product = test_product();
        product.materials[1].base_price_cents = 100; // 1.00 acrylic
        product.finishes[1].price_adjustment_cents = -500;

        let sel = selection(MaterialRef::Id("mat-acrylic".to_string()), None, &["fin-raw"]);
        let resolved = resolve_selection(&product, &sel).unwrap();
        let priced = price_selection(&resolved, 3, false).unwrap();

        assert_eq!(priced.unit_price_cents, 0);
        assert_eq!(priced.total_cents, 0);
    }

    #[test]
    fn test_invalid_quantity() {
        let product = test_product();
        let sel = selection(MaterialRef::Id("mat-brass".to_string()), None, &[]);
        let resolved = resolve_selection(&product, &sel).unwrap();
        assert!(matches!(
            price_selection(&resolved, 0, false),
            Err(CoreError::InvalidQuantity { requested: 0 })
        ));
    }

    #[test]
    fn test_total_is_unit_times_quantity() {
        let product = test_product();
        let sel = selection(
            MaterialRef::Id("mat-brass".to_string()),
            Some(200),
            &["fin-polish", "fin-raw"],
        );
        let resolved = resolve_selection(&product, &sel).unwrap();
        for qty in 1..=7 {
            let priced = price_selection(&resolved, qty, true).unwrap();
            assert_eq!(priced.total_cents, priced.unit_price_cents * qty);
            assert!(priced.unit_price_cents >= 0);
        }
    }
}
