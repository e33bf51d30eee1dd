//! Payment Models

use std::string::ToString;

use salvo::{oapi::ToSchema, prelude::StatusError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use shortlist_app::domain::payments::{
    data::{Confirmation, NewAuthorization, ProviderEvent, ProviderNotification},
    records::{PaymentAuditEntryRecord, PaymentRecord},
};

/// Authorize Payment Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AuthorizeRequest {
    /// Shortlist request whose approved price is held
    pub request: Uuid,

    /// Provider name, the configured default when omitted
    #[serde(default)]
    pub provider: Option<String>,
}

impl From<AuthorizeRequest> for NewAuthorization {
    fn from(request: AuthorizeRequest) -> Self {
        NewAuthorization {
            request: request.request.into(),
            provider: request.provider,
        }
    }
}

/// Provider Notification Request
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct NotificationRequest {
    pub provider: String,
    pub provider_reference: String,

    /// `authorization_succeeded` or `authorization_failed`
    pub event: String,

    /// Failure message sent with `authorization_failed`
    #[serde(default)]
    pub message: Option<String>,
}

impl TryFrom<NotificationRequest> for ProviderNotification {
    type Error = StatusError;

    fn try_from(request: NotificationRequest) -> Result<Self, Self::Error> {
        let event = match request.event.as_str() {
            "authorization_succeeded" => ProviderEvent::AuthorizationSucceeded,
            "authorization_failed" => ProviderEvent::AuthorizationFailed {
                message: request
                    .message
                    .unwrap_or_else(|| "authorization failed".to_string()),
            },
            other => {
                return Err(
                    StatusError::bad_request().brief(format!("unknown provider event {other:?}"))
                );
            }
        };

        Ok(ProviderNotification {
            provider: request.provider,
            provider_reference: request.provider_reference,
            event,
        })
    }
}

/// Payment Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct PaymentResponse {
    pub uuid: Uuid,
    pub company: Uuid,
    pub request: Uuid,
    pub provider: String,
    pub provider_reference: Option<String>,

    /// Handle the company's client uses to confirm the hold
    pub client_handle: Option<String>,
    pub currency: String,
    pub amount_authorized: u64,
    pub amount_captured: u64,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub authorized_at: Option<String>,
}

impl From<PaymentRecord> for PaymentResponse {
    fn from(payment: PaymentRecord) -> Self {
        PaymentResponse {
            uuid: payment.uuid.into(),
            company: payment.company.into(),
            request: payment.request.into(),
            provider: payment.provider,
            provider_reference: payment.provider_reference,
            client_handle: payment.client_handle,
            currency: payment.currency,
            amount_authorized: payment.amount_authorized,
            amount_captured: payment.amount_captured,
            status: payment.status.to_string(),
            error_message: payment.error_message,
            created_at: payment.created_at.to_string(),
            updated_at: payment.updated_at.to_string(),
            authorized_at: payment.authorized_at.as_ref().map(ToString::to_string),
        }
    }
}

/// Confirmation Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ConfirmationResponse {
    pub payment: PaymentResponse,

    /// `false` when the payment had already been settled and nothing changed
    pub changed: bool,
}

impl From<Confirmation> for ConfirmationResponse {
    fn from(confirmation: Confirmation) -> Self {
        ConfirmationResponse {
            changed: confirmation.changed,
            payment: confirmation.payment.into(),
        }
    }
}

/// Payment Audit Entry Response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct AuditEntryResponse {
    pub uuid: Uuid,
    pub previous_status: Option<String>,
    pub new_status: String,
    pub action: String,

    #[salvo(schema(value_type = Object))]
    pub context: serde_json::Value,
    pub created_at: String,
}

impl From<PaymentAuditEntryRecord> for AuditEntryResponse {
    fn from(entry: PaymentAuditEntryRecord) -> Self {
        AuditEntryResponse {
            uuid: entry.uuid.into(),
            previous_status: entry.previous_status.as_ref().map(ToString::to_string),
            new_status: entry.new_status.to_string(),
            action: entry.action,
            context: entry.context,
            created_at: entry.created_at.to_string(),
        }
    }
}
