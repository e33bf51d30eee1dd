//! Payments Repositories

pub(crate) mod audit;
pub(crate) mod payments;
