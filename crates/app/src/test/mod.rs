//! Shared fixtures for database-backed tests.

mod helpers;

pub(crate) use context::{PROVIDER, TestContext};
pub(crate) use helpers::{criteria, new_request};
pub(crate) use provider::{FakeProvider, ProviderCall};
