//! Payment Records

use jiff::Timestamp;
use serde::Serialize;
use shortlist::payments::PaymentStatus;

use crate::{
    domain::shortlists::records::{CompanyUuid, ShortlistRequestUuid},
    uuids::TypedUuid,
};

/// Payment UUID
pub type PaymentUuid = TypedUuid<PaymentRecord>;

/// Payment Audit Entry UUID
pub type PaymentAuditEntryUuid = TypedUuid<PaymentAuditEntryRecord>;

/// Payment Record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentRecord {
    pub uuid: PaymentUuid,
    pub company: CompanyUuid,
    pub request: ShortlistRequestUuid,
    pub provider: String,
    pub provider_reference: Option<String>,
    pub client_handle: Option<String>,
    pub currency: String,
    pub amount_authorized: u64,
    pub amount_captured: u64,
    pub status: PaymentStatus,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub authorized_at: Option<Timestamp>,
}

/// Payment Audit Entry Record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentAuditEntryRecord {
    pub uuid: PaymentAuditEntryUuid,
    pub payment: PaymentUuid,
    pub previous_status: Option<PaymentStatus>,
    pub new_status: PaymentStatus,
    pub action: String,
    pub context: serde_json::Value,
    pub created_at: Timestamp,
}
