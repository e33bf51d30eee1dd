//! Settlement planning
//!
//! Once a shortlist outcome is decided the held funds are finalized. [`plan`] turns the outcome,
//! the current payment status and the authorized amount into exactly one provider operation.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{lifecycle::ShortlistOutcome, payments::PaymentStatus};

/// Terms for a partial capture. An override amount wins over a discount.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialTerms {
    /// Percentage (0 to 100) taken off the authorized amount.
    pub discount_percent: Option<Decimal>,

    /// Exact final amount, in minor units.
    pub override_amount: Option<u64>,
}

/// The provider operation that finalizes a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// Take the whole hold.
    CaptureFull {
        /// Amount to capture.
        amount: u64,
    },

    /// Take part of the hold and release the remainder.
    CapturePartial {
        /// Amount originally held.
        authorized: u64,

        /// Amount to capture.
        amount: u64,
    },

    /// Cancel the hold.
    Release,
}

impl Settlement {
    /// Payment status after the provider accepts the operation.
    pub const fn resulting_status(self) -> PaymentStatus {
        match self {
            Self::CaptureFull { .. } => PaymentStatus::Captured,
            Self::CapturePartial { .. } => PaymentStatus::Partial,
            Self::Release => PaymentStatus::Released,
        }
    }

    /// Amount recorded as captured after the operation.
    pub const fn captured_amount(self) -> u64 {
        match self {
            Self::CaptureFull { amount } | Self::CapturePartial { amount, .. } => amount,
            Self::Release => 0,
        }
    }

    /// Audit action label.
    pub const fn action(self) -> &'static str {
        match self {
            Self::CaptureFull { .. } => "capture_full",
            Self::CapturePartial { .. } => "capture_partial",
            Self::Release => "release",
        }
    }
}

/// Reasons a payment cannot be finalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    /// Only an authorized hold can be finalized.
    #[error("payment must be authorized to settle, found {0}")]
    NotAuthorized(PaymentStatus),

    /// The outcome has not been decided.
    #[error("outcome is still pending")]
    OutcomePending,

    /// A partial outcome needs either a discount or an override amount.
    #[error("partial capture needs a discount or an override amount")]
    MissingPartialTerms,

    /// Discounts are percentages between 0 and 100.
    #[error("discount {0}% is outside 0..=100")]
    InvalidDiscount(Decimal),

    /// The final amount would exceed the hold.
    #[error("final amount {amount} exceeds authorized amount {authorized}")]
    OverrideExceedsAuthorized {
        /// Requested final amount.
        amount: u64,

        /// Amount held.
        authorized: u64,
    },

    /// The discounted amount cannot be represented.
    #[error("amount overflow while applying discount")]
    Overflow,
}

/// Chooses the settlement for a decided outcome.
///
/// # Errors
///
/// Returns [`SettlementError`] when the payment is not authorized, the outcome is pending, or the
/// partial terms are missing or out of range.
pub fn plan(
    outcome: ShortlistOutcome,
    status: PaymentStatus,
    authorized: u64,
    terms: Option<&PartialTerms>,
) -> Result<Settlement, SettlementError> {
    if status != PaymentStatus::Authorized {
        return Err(SettlementError::NotAuthorized(status));
    }

    match outcome {
        ShortlistOutcome::Pending => Err(SettlementError::OutcomePending),
        ShortlistOutcome::Delivered => Ok(Settlement::CaptureFull { amount: authorized }),
        ShortlistOutcome::NoMatch | ShortlistOutcome::Cancelled => Ok(Settlement::Release),
        ShortlistOutcome::Partial => {
            let terms = terms.ok_or(SettlementError::MissingPartialTerms)?;
            let amount = partial_amount(authorized, terms)?;

            Ok(Settlement::CapturePartial { authorized, amount })
        }
    }
}

/// Final amount for a partial capture.
///
/// # Errors
///
/// See [`plan`].
pub fn partial_amount(authorized: u64, terms: &PartialTerms) -> Result<u64, SettlementError> {
    let amount = match (terms.override_amount, terms.discount_percent) {
        (Some(amount), _) => amount,
        (None, Some(percent)) => apply_discount(authorized, percent)?,
        (None, None) => return Err(SettlementError::MissingPartialTerms),
    };

    if amount > authorized {
        return Err(SettlementError::OverrideExceedsAuthorized { amount, authorized });
    }

    Ok(amount)
}

/// `amount × (1 − percent / 100)`, rounded half away from zero.
///
/// # Errors
///
/// Returns [`SettlementError::InvalidDiscount`] for percentages outside 0..=100.
pub fn apply_discount(amount: u64, percent: Decimal) -> Result<u64, SettlementError> {
    if percent.is_sign_negative() || percent > Decimal::ONE_HUNDRED {
        return Err(SettlementError::InvalidDiscount(percent));
    }

    let remaining = Decimal::ONE_HUNDRED - percent;

    Decimal::from(amount)
        .checked_mul(remaining)
        .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
        .map(|value| value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|value| value.to_u64())
        .ok_or(SettlementError::Overflow)
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn delivered_captures_everything() -> TestResult {
        let settlement = plan(
            ShortlistOutcome::Delivered,
            PaymentStatus::Authorized,
            50_000,
            None,
        )?;

        assert_eq!(settlement, Settlement::CaptureFull { amount: 50_000 });
        assert_eq!(settlement.resulting_status(), PaymentStatus::Captured);

        Ok(())
    }

    #[test]
    fn no_match_and_cancel_release() -> TestResult {
        for outcome in [ShortlistOutcome::NoMatch, ShortlistOutcome::Cancelled] {
            let settlement = plan(outcome, PaymentStatus::Authorized, 50_000, None)?;

            assert_eq!(settlement, Settlement::Release);
            assert_eq!(settlement.captured_amount(), 0);
        }

        Ok(())
    }

    #[test]
    fn partial_applies_discount_rounding_half_away_from_zero() -> TestResult {
        let terms = PartialTerms {
            discount_percent: Some(Decimal::new(125, 1)),
            override_amount: None,
        };

        // 333 * 0.875 = 291.375
        assert_eq!(partial_amount(333, &terms)?, 291);

        // 5 * 0.5 = 2.5
        let half = PartialTerms {
            discount_percent: Some(Decimal::from(50)),
            override_amount: None,
        };
        assert_eq!(partial_amount(5, &half)?, 3);

        Ok(())
    }

    #[test]
    fn override_wins_over_discount() -> TestResult {
        let terms = PartialTerms {
            discount_percent: Some(Decimal::from(90)),
            override_amount: Some(40_000),
        };

        let settlement = plan(
            ShortlistOutcome::Partial,
            PaymentStatus::Authorized,
            50_000,
            Some(&terms),
        )?;

        assert_eq!(
            settlement,
            Settlement::CapturePartial {
                authorized: 50_000,
                amount: 40_000
            }
        );

        Ok(())
    }

    #[test]
    fn override_cannot_exceed_hold() {
        let terms = PartialTerms {
            discount_percent: None,
            override_amount: Some(60_000),
        };

        assert_eq!(
            plan(
                ShortlistOutcome::Partial,
                PaymentStatus::Authorized,
                50_000,
                Some(&terms)
            ),
            Err(SettlementError::OverrideExceedsAuthorized {
                amount: 60_000,
                authorized: 50_000
            })
        );
    }

    #[test]
    fn only_authorized_payments_settle() {
        for status in PaymentStatus::ALL {
            if status == PaymentStatus::Authorized {
                continue;
            }

            assert_eq!(
                plan(ShortlistOutcome::Delivered, status, 100, None),
                Err(SettlementError::NotAuthorized(status))
            );
        }
    }

    #[test]
    fn rejects_out_of_range_discounts() {
        assert_eq!(
            apply_discount(100, Decimal::from(101)),
            Err(SettlementError::InvalidDiscount(Decimal::from(101)))
        );
        assert_eq!(
            apply_discount(100, Decimal::from(-1)),
            Err(SettlementError::InvalidDiscount(Decimal::from(-1)))
        );
    }
}
