//! Shortlists
//!
//! Hiring requests from intake through matching, pricing, payment and delivery.

pub mod data;
mod errors;
pub mod records;
pub(crate) mod repositories;
mod service;

pub use errors::ShortlistsServiceError;
pub use service::{MockShortlistsService, PgShortlistsService, ShortlistsService};
