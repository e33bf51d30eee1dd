//! Shortlist Errors

use salvo::http::StatusError;
use shortlist::lifecycle::OutcomeError;
use tracing::error;

use shortlist_app::domain::{candidates::CandidatePoolError, shortlists::ShortlistsServiceError};

use crate::payments::errors::into_status_error as payment_status_error;

pub(crate) fn into_status_error(error: ShortlistsServiceError) -> StatusError {
    match error {
        ShortlistsServiceError::AlreadyExists => {
            StatusError::conflict().brief("Shortlist already exists")
        }
        ShortlistsServiceError::NotFound => StatusError::not_found().brief("Shortlist not found"),
        ShortlistsServiceError::Forbidden => StatusError::forbidden(),
        ShortlistsServiceError::InvalidReference
        | ShortlistsServiceError::MissingRequiredData
        | ShortlistsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid shortlist payload")
        }
        ShortlistsServiceError::InvalidAmount(_)
        | ShortlistsServiceError::InvalidCriteria(_)
        | ShortlistsServiceError::Validation(_)
        | ShortlistsServiceError::Outcome(OutcomeError::MissingReason(_))
        | ShortlistsServiceError::Pricing(_) => StatusError::bad_request().brief(error.to_string()),
        ShortlistsServiceError::IllegalTransition(_)
        | ShortlistsServiceError::Outcome(_)
        | ShortlistsServiceError::StatusChanged
        | ShortlistsServiceError::TerminalStatus(_)
        | ShortlistsServiceError::NotCurating(_) => StatusError::conflict().brief(error.to_string()),
        ShortlistsServiceError::Payment(source) => payment_status_error(source),
        ShortlistsServiceError::CandidatePool(CandidatePoolError::NotFound) => {
            StatusError::not_found().brief("Candidate not found")
        }
        ShortlistsServiceError::CandidatePool(source) => {
            error!("candidate pool failure: {source}");

            StatusError::internal_server_error()
        }
        ShortlistsServiceError::Sql(source) => {
            error!("shortlist storage failure: {source}");

            StatusError::internal_server_error()
        }
    }
}

#[cfg(test)]
mod tests {
    use salvo::http::StatusCode;
    use shortlist::lifecycle::{ShortlistOutcome, ShortlistStatus};
    use shortlist_app::domain::payments::{PaymentsServiceError, ProviderError};

    use super::*;

    fn status(error: ShortlistsServiceError) -> StatusCode {
        into_status_error(error).code
    }

    #[test]
    fn validation_failures_are_bad_requests() {
        assert_eq!(
            status(ShortlistsServiceError::Validation("reason is required")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status(ShortlistsServiceError::InvalidReference),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn workflow_conflicts_are_409() {
        assert_eq!(
            status(ShortlistsServiceError::TerminalStatus(ShortlistStatus::Completed)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(ShortlistsServiceError::StatusChanged),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn decided_outcomes_conflict_but_missing_reasons_are_invalid() {
        assert_eq!(
            status(ShortlistsServiceError::Outcome(OutcomeError::AlreadyDecided {
                current: ShortlistOutcome::Delivered,
            })),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(ShortlistsServiceError::Outcome(OutcomeError::MissingReason(
                ShortlistOutcome::NoMatch
            ))),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn provider_failures_surface_as_bad_gateway() {
        let error = ShortlistsServiceError::Payment(PaymentsServiceError::Provider(
            ProviderError::UnexpectedResponse("503".to_string()),
        ));

        assert_eq!(status(error), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn missing_candidates_are_404() {
        assert_eq!(
            status(ShortlistsServiceError::CandidatePool(CandidatePoolError::NotFound)),
            StatusCode::NOT_FOUND
        );
    }
}
