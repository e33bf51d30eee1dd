//! Payment Errors

use salvo::http::StatusError;
use tracing::{error, warn};

use shortlist_app::domain::payments::PaymentsServiceError;

pub(crate) fn into_status_error(error: PaymentsServiceError) -> StatusError {
    match error {
        PaymentsServiceError::NotFound => StatusError::not_found().brief("Payment not found"),
        PaymentsServiceError::InvalidReference
        | PaymentsServiceError::MissingRequiredData
        | PaymentsServiceError::InvalidData => {
            StatusError::bad_request().brief("Invalid payment payload")
        }
        PaymentsServiceError::InvalidAmount(_)
        | PaymentsServiceError::UnknownProvider(_)
        | PaymentsServiceError::Settlement(_) => StatusError::bad_request().brief(error.to_string()),
        PaymentsServiceError::AlreadyExists
        | PaymentsServiceError::IllegalTransition(_)
        | PaymentsServiceError::RequestTransition(_)
        | PaymentsServiceError::MissingApprovedPrice
        | PaymentsServiceError::NothingToAuthorize
        | PaymentsServiceError::PaymentAlreadyActive
        | PaymentsServiceError::StatusChanged
        | PaymentsServiceError::NotYetAuthorized => StatusError::conflict().brief(error.to_string()),
        PaymentsServiceError::Provider(source) => {
            warn!("payment provider failure: {source}");

            StatusError::bad_gateway().brief("Payment provider failure")
        }
        PaymentsServiceError::Sql(source) => {
            error!("payment storage failure: {source}");

            StatusError::internal_server_error()
        }
    }
}
