//! Notifications
//!
//! Lifecycle changes queue messages in the outbox within their own transaction; the worker
//! delivers them later through a [`NotificationGateway`].

mod errors;
mod gateway;
pub mod records;
pub(crate) mod repository;
mod worker;

pub use errors::NotificationError;
pub use gateway::{HttpNotificationGateway, MockNotificationGateway, NotificationGateway};
pub use records::{NotificationKind, OutboxMessage, OutboxMessageUuid};
pub use worker::{NotificationWorker, WorkerConfig, WorkerReport};
