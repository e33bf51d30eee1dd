//! Shortlists Repositories

pub(crate) mod candidates;
pub(crate) mod events;
pub(crate) mod requests;
