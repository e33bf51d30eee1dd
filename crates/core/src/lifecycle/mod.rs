//! Shortlist lifecycle
//!
//! Two independent state machines govern a shortlist request: the workflow [`ShortlistStatus`]
//! and the business [`ShortlistOutcome`].

mod outcome;
mod status;

pub use outcome::{OutcomeDecision, OutcomeError, ShortlistOutcome};
pub use status::ShortlistStatus;

/// Status a request moves to once its outcome has been settled.
///
/// Delivered requests complete; anything else that is still open is cancelled.
pub const fn closing_status(current: ShortlistStatus) -> ShortlistStatus {
    match current {
        ShortlistStatus::Delivered => ShortlistStatus::Completed,
        _ => ShortlistStatus::Cancelled,
    }
}
