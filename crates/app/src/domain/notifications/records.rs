//! Notification Records

use std::{fmt, str::FromStr};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use shortlist::parse::UnknownVariant;

use crate::{domain::shortlists::records::ShortlistRequestUuid, uuids::TypedUuid};

/// Outbox Message UUID
pub type OutboxMessageUuid = TypedUuid<OutboxMessage>;

/// What a queued notification announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    PricingReady,
    AuthorizationRequired,
    Delivered,
    NoMatch,
    AdjustmentSuggested,
    SearchExtended,
    Completed,
    PricingDeclined,
}

impl NotificationKind {
    pub const ALL: [Self; 8] = [
        Self::PricingReady,
        Self::AuthorizationRequired,
        Self::Delivered,
        Self::NoMatch,
        Self::AdjustmentSuggested,
        Self::SearchExtended,
        Self::Completed,
        Self::PricingDeclined,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PricingReady => "pricing_ready",
            Self::AuthorizationRequired => "authorization_required",
            Self::Delivered => "delivered",
            Self::NoMatch => "no_match",
            Self::AdjustmentSuggested => "adjustment_suggested",
            Self::SearchExtended => "search_extended",
            Self::Completed => "completed",
            Self::PricingDeclined => "pricing_declined",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| UnknownVariant::new("notification kind", value))
    }
}

/// A queued notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboxMessage {
    pub uuid: OutboxMessageUuid,
    pub kind: NotificationKind,
    pub request: Option<ShortlistRequestUuid>,
    pub payload: serde_json::Value,
    pub attempts: u32,
    pub last_error: Option<String>,
    pub available_at: Timestamp,
    pub delivered_at: Option<Timestamp>,
    pub created_at: Timestamp,
}
