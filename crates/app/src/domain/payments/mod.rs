//! Payments
//!
//! Authorization holds placed with a pluggable provider and finalized in step with the
//! shortlist outcome.

pub mod data;
mod errors;
pub mod providers;
pub mod records;
pub(crate) mod repositories;
mod service;
pub(crate) mod settler;

pub use errors::{PaymentsServiceError, ProviderError};
pub use service::{MockPaymentsService, PaymentsService, PgPaymentsService};
