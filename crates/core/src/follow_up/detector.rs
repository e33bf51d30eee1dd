//! Follow-up detection and pricing category

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    follow_up::{
        rules::DiscountSchedule,
        similarity::{RequestSignature, similarity},
    },
    lifecycle::ShortlistOutcome,
};

const SECONDS_PER_DAY: i64 = 86_400;

/// How a request is priced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PricingCategory {
    /// A fresh request.
    #[default]
    New,

    /// Continues an earlier request of the same company.
    FollowUp,

    /// Re-run of a request that ended without a match, free of charge.
    FreeRegen,
}

impl PricingCategory {
    /// Canonical storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::FollowUp => "follow_up",
            Self::FreeRegen => "free_regen",
        }
    }
}

impl std::fmt::Display for PricingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PricingCategory {
    type Err = crate::parse::UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match crate::parse::normalise_key(value).as_str() {
            "new" => Ok(Self::New),
            "follow_up" | "followup" => Ok(Self::FollowUp),
            "free_regen" => Ok(Self::FreeRegen),
            _ => Err(crate::parse::UnknownVariant::new("pricing category", value)),
        }
    }
}

/// A company's earlier request, as seen by the detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorRequest {
    /// Request identifier.
    pub uuid: Uuid,

    /// What was asked for.
    pub signature: RequestSignature,

    /// When it was created.
    pub created_at: Timestamp,

    /// Whether it reached the completed status.
    pub completed: bool,
}

/// An earlier request the company linked to explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkedPrior {
    /// Request identifier.
    pub uuid: Uuid,

    /// When it was created.
    pub created_at: Timestamp,

    /// Its decided outcome.
    pub outcome: ShortlistOutcome,
}

/// The prior request a new one was recognised as continuing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FollowUpMatch {
    /// The prior request.
    pub previous: Uuid,

    /// Similarity score, 0 to 100.
    pub similarity: f64,

    /// Whole days between the prior request and now.
    pub days_since: u32,
}

/// Pricing category, discount and prior link for a new request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingDecision {
    /// Pricing category.
    pub category: PricingCategory,

    /// Discount percentage applied when pricing is approved.
    pub discount_percent: Decimal,

    /// Linked prior request.
    pub previous: Option<Uuid>,

    /// Similarity to the prior request, when it was detected rather than linked.
    pub similarity: Option<f64>,
}

impl PricingDecision {
    /// A request with no prior.
    pub const fn fresh() -> Self {
        Self {
            category: PricingCategory::New,
            discount_percent: Decimal::ZERO,
            previous: None,
            similarity: None,
        }
    }
}

/// Recognises follow-up requests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FollowUpDetector {
    /// Only priors created within this many days are considered.
    pub lookback_days: u32,

    /// Minimum similarity for a follow-up.
    pub threshold: f64,
}

impl Default for FollowUpDetector {
    fn default() -> Self {
        Self {
            lookback_days: 30,
            threshold: 70.0,
        }
    }
}

impl FollowUpDetector {
    /// Finds the completed prior inside the lookback window that is most similar to `new`.
    ///
    /// Priors below the threshold are ignored. Equal scores prefer the most recent prior.
    pub fn detect(
        &self,
        new: &RequestSignature,
        priors: &[PriorRequest],
        now: Timestamp,
    ) -> Option<FollowUpMatch> {
        priors
            .iter()
            .filter(|prior| prior.completed && prior.created_at <= now)
            .filter_map(|prior| {
                let days_since = days_between(prior.created_at, now);

                if days_since > self.lookback_days {
                    return None;
                }

                let score = similarity(new, &prior.signature);

                (score >= self.threshold).then_some((prior, score, days_since))
            })
            .max_by(|(a, a_score, _), (b, b_score, _)| {
                a_score
                    .total_cmp(b_score)
                    .then_with(|| a.created_at.cmp(&b.created_at))
            })
            .map(|(prior, similarity, days_since)| FollowUpMatch {
                previous: prior.uuid,
                similarity,
                days_since,
            })
    }

    /// Decides the pricing category for a new request.
    ///
    /// An explicit link wins over detection. A link to a request that ended without a match is
    /// a free regeneration; any other follow-up gets the schedule's discount, or none.
    pub fn decide(
        &self,
        schedule: &DiscountSchedule,
        new: &RequestSignature,
        link: Option<&LinkedPrior>,
        priors: &[PriorRequest],
        now: Timestamp,
    ) -> PricingDecision {
        if let Some(link) = link {
            if link.outcome == ShortlistOutcome::NoMatch {
                return PricingDecision {
                    category: PricingCategory::FreeRegen,
                    discount_percent: Decimal::ONE_HUNDRED,
                    previous: Some(link.uuid),
                    similarity: None,
                };
            }

            return PricingDecision {
                category: PricingCategory::FollowUp,
                discount_percent: schedule
                    .discount_for(days_between(link.created_at, now))
                    .unwrap_or_default(),
                previous: Some(link.uuid),
                similarity: None,
            };
        }

        self.detect(new, priors, now)
            .map_or_else(PricingDecision::fresh, |found| PricingDecision {
                category: PricingCategory::FollowUp,
                discount_percent: schedule
                    .discount_for(found.days_since)
                    .unwrap_or_default(),
                previous: Some(found.previous),
                similarity: Some(found.similarity),
            })
    }
}

/// Whole days from `earlier` to `later`, zero when `earlier` is in the future.
pub fn days_between(earlier: Timestamp, later: Timestamp) -> u32 {
    let seconds = later.duration_since(earlier).as_secs().max(0);

    u32::try_from(seconds / SECONDS_PER_DAY).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use jiff::ToSpan;
    use testresult::TestResult;

    use super::*;
    use crate::seniority::Seniority;

    fn go_engineer() -> RequestSignature {
        RequestSignature {
            role_title: "Go Engineer".to_string(),
            seniority: Some(Seniority::Senior),
            remote: true,
            country: None,
            tech_stack: vec!["Go".to_string(), "Kubernetes".to_string()],
        }
    }

    fn prior(id: u128, created_at: Timestamp, completed: bool) -> PriorRequest {
        PriorRequest {
            uuid: Uuid::from_u128(id),
            signature: go_engineer(),
            created_at,
            completed,
        }
    }

    #[test]
    fn ignores_incomplete_and_old_priors() -> TestResult {
        let now: Timestamp = "2026-03-31T00:00:00Z".parse()?;
        let priors = [
            prior(1, now.checked_sub(48.hours())?, false),
            prior(2, now.checked_sub(744.hours())?, true),
        ];

        assert_eq!(
            FollowUpDetector::default().detect(&go_engineer(), &priors, now),
            None
        );

        Ok(())
    }

    #[test]
    fn equal_scores_prefer_most_recent() -> TestResult {
        let now: Timestamp = "2026-03-31T00:00:00Z".parse()?;
        let priors = [
            prior(1, now.checked_sub(240.hours())?, true),
            prior(2, now.checked_sub(48.hours())?, true),
        ];

        let found = FollowUpDetector::default()
            .detect(&go_engineer(), &priors, now)
            .ok_or("expected a follow-up")?;

        assert_eq!(found.previous, Uuid::from_u128(2));
        assert_eq!(found.days_since, 2);

        Ok(())
    }

    #[test]
    fn follow_up_outside_schedule_has_no_discount() -> TestResult {
        let now: Timestamp = "2026-03-31T00:00:00Z".parse()?;
        let schedule = DiscountSchedule::new([]);
        let priors = [prior(1, now.checked_sub(24.hours())?, true)];

        let decision =
            FollowUpDetector::default().decide(&schedule, &go_engineer(), None, &priors, now);

        assert_eq!(decision.category, PricingCategory::FollowUp);
        assert_eq!(decision.discount_percent, Decimal::ZERO);

        Ok(())
    }

    #[test]
    fn explicit_link_to_no_match_is_free() -> TestResult {
        let now: Timestamp = "2026-03-31T00:00:00Z".parse()?;
        let link = LinkedPrior {
            uuid: Uuid::from_u128(7),
            created_at: now.checked_sub(1_200.hours())?,
            outcome: ShortlistOutcome::NoMatch,
        };

        let decision = FollowUpDetector::default().decide(
            &DiscountSchedule::default(),
            &go_engineer(),
            Some(&link),
            &[],
            now,
        );

        assert_eq!(decision.category, PricingCategory::FreeRegen);
        assert_eq!(decision.discount_percent, Decimal::ONE_HUNDRED);
        assert_eq!(decision.previous, Some(Uuid::from_u128(7)));

        Ok(())
    }

    #[test]
    fn explicit_link_skips_similarity() -> TestResult {
        let now: Timestamp = "2026-03-31T00:00:00Z".parse()?;
        let link = LinkedPrior {
            uuid: Uuid::from_u128(7),
            created_at: now.checked_sub(240.hours())?,
            outcome: ShortlistOutcome::Delivered,
        };
        let unrelated = RequestSignature {
            role_title: "Data Scientist".to_string(),
            ..RequestSignature::default()
        };

        let decision = FollowUpDetector::default().decide(
            &DiscountSchedule::default(),
            &unrelated,
            Some(&link),
            &[],
            now,
        );

        assert_eq!(decision.category, PricingCategory::FollowUp);
        assert_eq!(decision.discount_percent, Decimal::from(20));
        assert_eq!(decision.similarity, None);

        Ok(())
    }

    #[test]
    fn no_prior_is_a_new_request() -> TestResult {
        let now: Timestamp = "2026-03-31T00:00:00Z".parse()?;

        assert_eq!(
            FollowUpDetector::default().decide(
                &DiscountSchedule::default(),
                &go_engineer(),
                None,
                &[],
                now
            ),
            PricingDecision::fresh()
        );

        Ok(())
    }
}
