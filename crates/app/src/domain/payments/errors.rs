//! Payments service errors.

use std::num::TryFromIntError;

use shortlist::{
    lifecycle::ShortlistStatus,
    payments::{PaymentStatus, SettlementError},
    transitions::TransitionError,
};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaymentsServiceError {
    #[error("payment already exists")]
    AlreadyExists,

    #[error("payment not found")]
    NotFound,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),

    #[error("invalid amount")]
    InvalidAmount(#[from] TryFromIntError),

    #[error("unknown payment provider {0:?}")]
    UnknownProvider(String),

    #[error("payment provider error")]
    Provider(#[source] ProviderError),

    #[error(transparent)]
    IllegalTransition(#[from] TransitionError<PaymentStatus>),

    #[error(transparent)]
    RequestTransition(#[from] TransitionError<ShortlistStatus>),

    #[error(transparent)]
    Settlement(#[from] SettlementError),

    #[error("shortlist has no approved price")]
    MissingApprovedPrice,

    #[error("approved price is zero; nothing to authorize")]
    NothingToAuthorize,

    #[error("shortlist already has an active payment")]
    PaymentAlreadyActive,

    #[error("payment changed concurrently")]
    StatusChanged,

    #[error("authorization is not confirmed by the provider yet")]
    NotYetAuthorized,
}

impl From<Error> for PaymentsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}

/// Failures reported by a payment provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider refused the operation.
    #[error("declined: {0}")]
    Declined(String),

    /// The provider answered with an unexpected status.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// The request never completed.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}
