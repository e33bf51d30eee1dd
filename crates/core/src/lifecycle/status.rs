//! Shortlist Status

use std::{fmt, str::FromStr, sync::LazyLock};

use serde::{Deserialize, Serialize};

use crate::{
    parse::{UnknownVariant, normalise_key},
    transitions::{TransitionError, TransitionGraph},
};

/// Workflow status of a shortlist request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortlistStatus {
    /// Submitted by the company, not yet picked up.
    Submitted,

    /// An operator is matching and curating candidates.
    Processing,

    /// A price has been proposed and awaits the company's answer.
    PricingPending,

    /// The company accepted the price; funds are not yet held.
    PricingApproved,

    /// Funds are held (or payment was confirmed out of band).
    Authorized,

    /// The shortlist was handed over to the company.
    Delivered,

    /// Terminal: the request is closed with a decided outcome.
    Completed,

    /// Terminal: the request was abandoned.
    Cancelled,
}

static STATUS_TRANSITIONS: LazyLock<TransitionGraph<ShortlistStatus>> = LazyLock::new(|| {
    use ShortlistStatus::{
        Authorized, Cancelled, Completed, Delivered, PricingApproved, PricingPending, Processing,
        Submitted,
    };

    TransitionGraph::new([
        (Submitted, vec![Processing, PricingPending, Cancelled]),
        (Processing, vec![PricingPending, Cancelled]),
        (PricingPending, vec![PricingApproved, Processing, Cancelled]),
        (PricingApproved, vec![Authorized, Cancelled]),
        (Authorized, vec![Delivered, Cancelled]),
        (Delivered, vec![Completed]),
    ])
});

impl ShortlistStatus {
    /// Every status, in workflow order.
    pub const ALL: [Self; 8] = [
        Self::Submitted,
        Self::Processing,
        Self::PricingPending,
        Self::PricingApproved,
        Self::Authorized,
        Self::Delivered,
        Self::Completed,
        Self::Cancelled,
    ];

    /// The shared status transition graph.
    pub fn graph() -> &'static TransitionGraph<Self> {
        &STATUS_TRANSITIONS
    }

    /// Statuses reachable from `self` in one step.
    pub fn allowed_next(self) -> &'static [Self] {
        Self::graph().allowed(self)
    }

    /// Whether `self -> next` is legal.
    pub fn can_transition_to(self, next: Self) -> bool {
        Self::graph().is_allowed(self, next)
    }

    /// Validates `self -> next`.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] naming the attempted pair and the legal set.
    pub fn transition_to(self, next: Self) -> Result<Self, TransitionError<Self>> {
        Self::graph().check(self, next)
    }

    /// Whether no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        Self::graph().is_terminal(self)
    }

    /// Canonical storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Processing => "processing",
            Self::PricingPending => "pricing_pending",
            Self::PricingApproved => "pricing_approved",
            Self::Authorized => "authorized",
            Self::Delivered => "delivered",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ShortlistStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShortlistStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let key = normalise_key(value);

        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == key)
            .ok_or_else(|| UnknownVariant::new("shortlist status", value))
    }
}
