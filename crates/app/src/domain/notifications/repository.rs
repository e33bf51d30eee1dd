//! Notification Outbox Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{Connection, FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use tracing::warn;
use uuid::Uuid;

use crate::{
    database::{to_i32, try_get_parsed, try_get_u32},
    domain::{
        notifications::records::{NotificationKind, OutboxMessage, OutboxMessageUuid},
        shortlists::records::ShortlistRequestUuid,
    },
};

const ENQUEUE_SQL: &str = include_str!("sql/enqueue.sql");
const CLAIM_DUE_SQL: &str = include_str!("sql/claim_due.sql");
const MARK_DELIVERED_SQL: &str = include_str!("sql/mark_delivered.sql");
const MARK_FAILED_SQL: &str = include_str!("sql/mark_failed.sql");
const LIST_FOR_REQUEST_SQL: &str = include_str!("sql/list_for_request.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgOutboxRepository;

impl PgOutboxRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Queues a notification inside a savepoint. Failures are logged and never abort `tx`.
    pub(crate) async fn enqueue(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        kind: NotificationKind,
        request: ShortlistRequestUuid,
        payload: serde_json::Value,
    ) {
        if let Err(error) = self.try_enqueue(tx, kind, request, &payload).await {
            warn!(
                request_uuid = %request,
                kind = kind.as_str(),
                error = %error,
                "failed to enqueue notification"
            );
        }
    }

    async fn try_enqueue(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        kind: NotificationKind,
        request: ShortlistRequestUuid,
        payload: &serde_json::Value,
    ) -> Result<(), sqlx::Error> {
        let mut savepoint = Connection::begin(&mut **tx).await?;

        query(ENQUEUE_SQL)
            .bind(OutboxMessageUuid::new().into_uuid())
            .bind(kind.as_str())
            .bind(request.into_uuid())
            .bind(payload)
            .execute(&mut *savepoint)
            .await?;

        savepoint.commit().await
    }

    /// Locks up to `limit` due messages, skipping rows other workers hold.
    pub(crate) async fn claim_due(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        now: Timestamp,
        limit: u32,
        max_attempts: u32,
    ) -> Result<Vec<OutboxMessage>, sqlx::Error> {
        query_as::<Postgres, OutboxMessage>(CLAIM_DUE_SQL)
            .bind(SqlxTimestamp::from(now))
            .bind(i64::from(limit))
            .bind(to_i32(max_attempts, "attempts")?)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn mark_delivered(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        message: OutboxMessageUuid,
    ) -> Result<(), sqlx::Error> {
        query(MARK_DELIVERED_SQL)
            .bind(message.into_uuid())
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn mark_failed(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        message: OutboxMessageUuid,
        error: &str,
        retry_at: Timestamp,
    ) -> Result<(), sqlx::Error> {
        query(MARK_FAILED_SQL)
            .bind(message.into_uuid())
            .bind(error)
            .bind(SqlxTimestamp::from(retry_at))
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn list_for_request(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request: ShortlistRequestUuid,
    ) -> Result<Vec<OutboxMessage>, sqlx::Error> {
        query_as::<Postgres, OutboxMessage>(LIST_FOR_REQUEST_SQL)
            .bind(request.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for OutboxMessage {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: OutboxMessageUuid::from_uuid(row.try_get("uuid")?),
            kind: try_get_parsed(row, "kind")?,
            request: row
                .try_get::<Option<Uuid>, _>("request_uuid")?
                .map(ShortlistRequestUuid::from_uuid),
            payload: row.try_get("payload")?,
            attempts: try_get_u32(row, "attempts")?,
            last_error: row.try_get("last_error")?,
            available_at: row.try_get::<SqlxTimestamp, _>("available_at")?.to_jiff(),
            delivered_at: row
                .try_get::<Option<SqlxTimestamp>, _>("delivered_at")?
                .map(SqlxTimestamp::to_jiff),
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
