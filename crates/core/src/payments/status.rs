//! Payment Status

use std::{fmt, str::FromStr, sync::LazyLock};

use serde::{Deserialize, Serialize};

use crate::{
    parse::{UnknownVariant, normalise_key},
    transitions::{TransitionError, TransitionGraph},
};

/// Status of a provider authorization hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Created with the provider, waiting for the customer to confirm.
    PendingApproval,

    /// Funds are held.
    Authorized,

    /// The full authorized amount was taken.
    Captured,

    /// Part of the authorized amount was taken, the rest released.
    Partial,

    /// The hold was cancelled without taking funds.
    Released,

    /// The provider rejected an operation.
    Failed,

    /// The hold lapsed before it was finalized.
    Expired,
}

static PAYMENT_TRANSITIONS: LazyLock<TransitionGraph<PaymentStatus>> = LazyLock::new(|| {
    use PaymentStatus::{Authorized, Captured, Expired, Failed, Partial, PendingApproval, Released};

    TransitionGraph::new([
        (PendingApproval, vec![Authorized, Failed]),
        (Authorized, vec![Captured, Partial, Released, Expired, Failed]),
    ])
});

impl PaymentStatus {
    /// Every payment status.
    pub const ALL: [Self; 7] = [
        Self::PendingApproval,
        Self::Authorized,
        Self::Captured,
        Self::Partial,
        Self::Released,
        Self::Failed,
        Self::Expired,
    ];

    /// The shared payment transition graph.
    pub fn graph() -> &'static TransitionGraph<Self> {
        &PAYMENT_TRANSITIONS
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

    /// Whether the payment can no longer change.
    pub fn is_terminal(self) -> bool {
        Self::graph().is_terminal(self)
    }

    /// Canonical storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PendingApproval => "pending_approval",
            Self::Authorized => "authorized",
            Self::Captured => "captured",
            Self::Partial => "partial",
            Self::Released => "released",
            Self::Failed => "failed",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let key = normalise_key(value);

        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == key)
            .ok_or_else(|| UnknownVariant::new("payment status", value))
    }
}
