//! Shortlist Outcome
//!
//! The outcome is the business disposition of a shortlist and is tracked independently from its
//! workflow status. It starts as [`ShortlistOutcome::Pending`] and can be decided exactly once;
//! decided outcomes are permanent records (billing disputes rely on them).

use std::{fmt, str::FromStr, sync::LazyLock};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    parse::{UnknownVariant, normalise_key},
    transitions::{TransitionError, TransitionGraph},
};

/// Business disposition of a shortlist request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortlistOutcome {
    /// Not decided yet.
    #[default]
    Pending,

    /// The shortlist was fulfilled in full.
    #[serde(alias = "fulfilled")]
    Delivered,

    /// The shortlist was only partly fulfilled.
    Partial,

    /// No suitable candidates could be delivered.
    NoMatch,

    /// The request was abandoned.
    Cancelled,
}

static OUTCOME_TRANSITIONS: LazyLock<TransitionGraph<ShortlistOutcome>> = LazyLock::new(|| {
    use ShortlistOutcome::{Cancelled, Delivered, NoMatch, Partial, Pending};

    TransitionGraph::new([(Pending, vec![Delivered, Partial, NoMatch, Cancelled])])
});

impl ShortlistOutcome {
    /// Every outcome.
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Delivered,
        Self::Partial,
        Self::NoMatch,
        Self::Cancelled,
    ];

    /// The shared outcome transition graph.
    pub fn graph() -> &'static TransitionGraph<Self> {
        &OUTCOME_TRANSITIONS
    }

    /// Whether the outcome has been decided.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Validates `self -> next`.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError`] naming the attempted pair and the legal set.
    pub fn transition_to(self, next: Self) -> Result<Self, TransitionError<Self>> {
        Self::graph().check(self, next)
    }

    /// Canonical storage representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Delivered => "delivered",
            Self::Partial => "partial",
            Self::NoMatch => "no_match",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ShortlistOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShortlistOutcome {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match normalise_key(value).as_str() {
            "fulfilled" => Ok(Self::Delivered),
            key => Self::ALL
                .into_iter()
                .find(|outcome| outcome.as_str() == key)
                .ok_or_else(|| UnknownVariant::new("shortlist outcome", value)),
        }
    }
}

/// Errors raised when deciding an outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutcomeError {
    /// The outcome was already decided and is immutable.
    #[error("outcome already decided as {current}")]
    AlreadyDecided {
        /// The decided outcome.
        current: ShortlistOutcome,
    },

    /// The requested outcome is not reachable from the current one.
    #[error(transparent)]
    Transition(#[from] TransitionError<ShortlistOutcome>),

    /// Terminal outcomes must carry a reason.
    #[error("a reason is required for outcome {0}")]
    MissingReason(ShortlistOutcome),
}

/// A validated, terminal outcome with its reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutcomeDecision {
    outcome: ShortlistOutcome,
    reason: String,
}

impl OutcomeDecision {
    /// Validates deciding `next` with `reason` while the stored outcome is `current`.
    ///
    /// # Errors
    ///
    /// - [`OutcomeError::AlreadyDecided`] when `current` is already terminal.
    /// - [`OutcomeError::Transition`] when `next` is not a terminal outcome.
    /// - [`OutcomeError::MissingReason`] when `reason` is blank.
    pub fn decide(
        current: ShortlistOutcome,
        next: ShortlistOutcome,
        reason: &str,
    ) -> Result<Self, OutcomeError> {
        if current.is_terminal() {
            return Err(OutcomeError::AlreadyDecided { current });
        }

        let outcome = current.transition_to(next)?;
        let reason = reason.trim();

        if reason.is_empty() {
            return Err(OutcomeError::MissingReason(outcome));
        }

        Ok(Self {
            outcome,
            reason: reason.to_string(),
        })
    }

    /// The decided outcome.
    pub const fn outcome(&self) -> ShortlistOutcome {
        self.outcome
    }

    /// The trimmed reason.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}
