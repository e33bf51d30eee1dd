//! Notification errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("storage error")]
    Sql(#[from] sqlx::Error),
}
