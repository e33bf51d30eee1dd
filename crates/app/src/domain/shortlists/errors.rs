//! Shortlists service errors.

use std::num::TryFromIntError;

use shortlist::{
    lifecycle::{OutcomeError, ShortlistStatus},
    matching::CriteriaError,
    payments::SettlementError,
    transitions::TransitionError,
};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::domain::{candidates::CandidatePoolError, payments::PaymentsServiceError};

#[derive(Debug, Error)]
pub enum ShortlistsServiceError {
    #[error("shortlist already exists")]
    AlreadyExists,

    #[error("shortlist not found")]
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

    #[error(transparent)]
    InvalidCriteria(#[from] CriteriaError),

    #[error("{0}")]
    Validation(&'static str),

    #[error(transparent)]
    IllegalTransition(#[from] TransitionError<ShortlistStatus>),

    #[error(transparent)]
    Outcome(#[from] OutcomeError),

    #[error(transparent)]
    Pricing(#[from] SettlementError),

    #[error("payment error")]
    Payment(#[from] PaymentsServiceError),

    #[error("candidate pool error")]
    CandidatePool(#[from] CandidatePoolError),

    #[error("shortlist changed concurrently")]
    StatusChanged,

    #[error("shortlist belongs to another company")]
    Forbidden,

    #[error("shortlist is {0} and can no longer change")]
    TerminalStatus(ShortlistStatus),

    #[error("candidates cannot be curated while the shortlist is {0}")]
    NotCurating(ShortlistStatus),
}

impl From<Error> for ShortlistsServiceError {
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
