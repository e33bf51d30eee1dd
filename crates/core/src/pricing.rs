//! Pricing Calculator
//!
//! Suggests a shortlist price from the requested seniority, the number of approved candidates and
//! whether the profile is rare. All amounts are in minor units of the request currency.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    payments::{SettlementError, apply_discount},
    seniority::Seniority,
};

/// Price when no seniority was requested.
pub const DEFAULT_BASE_PRICE: u64 = 40_000;

/// Premium for hard-to-find profiles.
pub const RARITY_PREMIUM: u64 = 15_000;

/// No suggestion goes below this.
pub const MINIMUM_PRICE: u64 = 20_000;

/// Base price for a seniority.
pub const fn base_price(seniority: Option<Seniority>) -> u64 {
    match seniority {
        Some(Seniority::Junior) => 30_000,
        Some(Seniority::Mid) | None => DEFAULT_BASE_PRICE,
        Some(Seniority::Senior) => 50_000,
        Some(Seniority::Lead) => 60_000,
        Some(Seniority::Principal) => 70_000,
    }
}

/// Adjustment for the number of approved candidates.
pub const fn size_adjustment(approved_candidates: u32) -> i64 {
    match approved_candidates {
        0..=3 => -5_000,
        4 => -2_500,
        5 | 6 => 0,
        7 => 5_000,
        _ => 10_000,
    }
}

/// Inputs to [`suggest_price`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceInputs {
    /// Requested seniority, if any.
    pub seniority: Option<Seniority>,

    /// Number of operator-approved candidates.
    pub approved_candidates: u32,

    /// Whether the profile is flagged as rare.
    pub rare_profile: bool,
}

/// An itemised price suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSuggestion {
    /// Base price for the seniority.
    pub base: u64,

    /// Signed size adjustment.
    pub size_adjustment: i64,

    /// Rarity premium, zero when not flagged.
    pub rarity_premium: u64,

    /// The floor that was enforced.
    pub minimum: u64,

    /// Whether the floor raised the price.
    pub floor_applied: bool,

    /// Suggested price.
    pub price: u64,
}

/// Suggests a price. The result is never below [`MINIMUM_PRICE`].
pub fn suggest_price(inputs: PriceInputs) -> PriceSuggestion {
    let base = base_price(inputs.seniority);
    let size_adjustment = size_adjustment(inputs.approved_candidates);
    let rarity_premium = if inputs.rare_profile { RARITY_PREMIUM } else { 0 };

    let raw = base
        .saturating_add(rarity_premium)
        .saturating_add_signed(size_adjustment);

    PriceSuggestion {
        base,
        size_adjustment,
        rarity_premium,
        minimum: MINIMUM_PRICE,
        floor_applied: raw < MINIMUM_PRICE,
        price: raw.max(MINIMUM_PRICE),
    }
}

/// The price a company pays after a follow-up discount.
///
/// # Errors
///
/// Returns [`SettlementError::InvalidDiscount`] for percentages outside 0..=100.
pub fn discounted(price: u64, discount_percent: Decimal) -> Result<u64, SettlementError> {
    apply_discount(price, discount_percent)
}
