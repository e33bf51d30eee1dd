//! Payments

pub(crate) mod errors;
mod handlers;
pub(crate) mod models;
pub(crate) mod webhook;

pub(crate) use handlers::*;
