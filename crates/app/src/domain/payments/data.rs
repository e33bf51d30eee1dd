//! Payments Data

use serde::{Deserialize, Serialize};
use shortlist::payments::PaymentStatus;

use crate::domain::{payments::records::PaymentRecord, shortlists::records::ShortlistRequestUuid};

/// Request to place an authorization hold for an approved shortlist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthorization {
    pub request: ShortlistRequestUuid,

    /// Provider name; the registry default when omitted.
    pub provider: Option<String>,
}

/// Asynchronous status update pushed by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderNotification {
    pub provider: String,
    pub provider_reference: String,
    pub event: ProviderEvent,
}

/// What the provider reports about an authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderEvent {
    /// The customer confirmed and the funds are held.
    AuthorizationSucceeded,

    /// The authorization was declined.
    AuthorizationFailed { message: String },
}

/// Result of a confirmation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Confirmation {
    pub payment: PaymentRecord,

    /// `false` when the payment had already left `pending_approval` and nothing changed.
    pub changed: bool,
}

impl Confirmation {
    pub(crate) fn unchanged(payment: PaymentRecord) -> Self {
        Self {
            payment,
            changed: false,
        }
    }

    pub(crate) fn changed(payment: PaymentRecord) -> Self {
        Self {
            payment,
            changed: true,
        }
    }

    /// Status after the attempt.
    pub fn status(&self) -> PaymentStatus {
        self.payment.status
    }
}

/// A status change to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PaymentStatusChange<'a> {
    pub expected: PaymentStatus,
    pub next: PaymentStatus,
    pub amount_captured: Option<u64>,
    pub error_message: Option<&'a str>,
}
