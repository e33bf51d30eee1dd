//! Payment Handlers

pub(crate) mod audit;
pub(crate) mod authorize;
pub(crate) mod confirm;
pub(crate) mod expire;
pub(crate) mod get;
pub(crate) mod notify;
