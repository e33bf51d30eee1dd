//! Follow-up discount rules

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One step of the follow-up discount staircase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowUpPricingRule {
    /// Applies when the prior request is at most this many days old.
    pub max_days: u32,

    /// Discount percentage.
    pub discount_percent: Decimal,

    /// Inactive rules are ignored.
    pub active: bool,
}

/// The active rules, ordered by day threshold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountSchedule {
    rules: Vec<FollowUpPricingRule>,
}

impl DiscountSchedule {
    /// Builds a schedule from any set of rules, dropping inactive ones.
    pub fn new(rules: impl IntoIterator<Item = FollowUpPricingRule>) -> Self {
        let mut rules: Vec<_> = rules.into_iter().filter(|rule| rule.active).collect();
        rules.sort_by_key(|rule| rule.max_days);

        Self { rules }
    }

    /// The active rules in ascending threshold order.
    pub fn rules(&self) -> &[FollowUpPricingRule] {
        &self.rules
    }

    /// Discount for a prior request `days` old: the smallest threshold at or above `days`.
    pub fn discount_for(&self, days: u32) -> Option<Decimal> {
        self.rules
            .iter()
            .find(|rule| rule.max_days >= days)
            .map(|rule| rule.discount_percent)
    }
}

impl Default for DiscountSchedule {
    /// 30% within a week, 20% within two weeks, 10% within thirty days.
    fn default() -> Self {
        Self::new([
            FollowUpPricingRule {
                max_days: 7,
                discount_percent: Decimal::from(30),
                active: true,
            },
            FollowUpPricingRule {
                max_days: 14,
                discount_percent: Decimal::from(20),
                active: true,
            },
            FollowUpPricingRule {
                max_days: 30,
                discount_percent: Decimal::from(10),
                active: true,
            },
        ])
    }
}
