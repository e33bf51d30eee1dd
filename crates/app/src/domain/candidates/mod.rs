//! Candidate Pool
//!
//! Profiles are maintained by the profile pipeline; this module only reads them for matching.

use async_trait::async_trait;
use mockall::automock;
use shortlist::matching::CandidateProfile;
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

use crate::{database::Db, uuids::TypedUuid};

mod repository;

use repository::PgCandidatesRepository;

/// Candidate UUID
pub type CandidateUuid = TypedUuid<CandidateProfile>;

#[derive(Debug, Error)]
pub enum CandidatePoolError {
    #[error("candidate not found")]
    NotFound,

    #[error("invalid candidate data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl From<Error> for CandidatePoolError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            _ => Self::Sql(error),
        }
    }
}

/// Read access to the candidates that may be matched.
#[automock]
#[async_trait]
pub trait CandidatePool: Send + Sync {
    /// Visible candidates that opted in to opportunities.
    async fn eligible_candidates(&self) -> Result<Vec<CandidateProfile>, CandidatePoolError>;

    /// A single candidate, eligible or not.
    async fn candidate(
        &self,
        candidate: CandidateUuid,
    ) -> Result<CandidateProfile, CandidatePoolError>;
}

#[derive(Debug, Clone)]
pub struct PgCandidatePool {
    db: Db,
    repository: PgCandidatesRepository,
}

impl PgCandidatePool {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgCandidatesRepository::new(),
        }
    }
}

#[async_trait]
impl CandidatePool for PgCandidatePool {
    #[tracing::instrument(name = "candidates.pool.eligible", skip(self), err)]
    async fn eligible_candidates(&self) -> Result<Vec<CandidateProfile>, CandidatePoolError> {
        Ok(self.repository.eligible_candidates(self.db.pool()).await?)
    }

    #[tracing::instrument(
        name = "candidates.pool.get",
        skip(self),
        fields(candidate_uuid = %candidate),
        err
    )]
    async fn candidate(
        &self,
        candidate: CandidateUuid,
    ) -> Result<CandidateProfile, CandidatePoolError> {
        Ok(self
            .repository
            .get_candidate(self.db.pool(), candidate)
            .await?)
    }
}
