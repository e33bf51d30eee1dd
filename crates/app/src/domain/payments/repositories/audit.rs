//! Payment Audit Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use shortlist::payments::PaymentStatus;
use sqlx::{Connection, FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use tracing::warn;

use crate::{
    database::{try_get_parsed, try_get_parsed_opt},
    domain::payments::records::{PaymentAuditEntryRecord, PaymentAuditEntryUuid, PaymentUuid},
};

const RECORD_AUDIT_ENTRY_SQL: &str = include_str!("sql/record_audit_entry.sql");
const LIST_AUDIT_ENTRIES_SQL: &str = include_str!("sql/list_audit_entries.sql");

/// A payment status change to append to the audit trail.
#[derive(Debug, Clone)]
pub(crate) struct AuditEntry<'a> {
    pub payment: PaymentUuid,
    pub previous: Option<PaymentStatus>,
    pub next: PaymentStatus,
    pub action: &'a str,
    pub context: serde_json::Value,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPaymentAuditRepository;

impl PgPaymentAuditRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Appends `entry` inside a savepoint. Failures are logged and never abort `tx`.
    pub(crate) async fn record(&self, tx: &mut Transaction<'_, Postgres>, entry: &AuditEntry<'_>) {
        if let Err(error) = self.try_record(tx, entry).await {
            warn!(
                payment_uuid = %entry.payment,
                action = entry.action,
                error = %error,
                "failed to record payment audit entry"
            );
        }
    }

    async fn try_record(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        entry: &AuditEntry<'_>,
    ) -> Result<(), sqlx::Error> {
        let mut savepoint = Connection::begin(&mut **tx).await?;

        query(RECORD_AUDIT_ENTRY_SQL)
            .bind(PaymentAuditEntryUuid::new().into_uuid())
            .bind(entry.payment.into_uuid())
            .bind(entry.previous.map(PaymentStatus::as_str))
            .bind(entry.next.as_str())
            .bind(entry.action)
            .bind(&entry.context)
            .execute(&mut *savepoint)
            .await?;

        savepoint.commit().await
    }

    pub(crate) async fn list_entries(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
    ) -> Result<Vec<PaymentAuditEntryRecord>, sqlx::Error> {
        query_as::<Postgres, PaymentAuditEntryRecord>(LIST_AUDIT_ENTRIES_SQL)
            .bind(payment.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for PaymentAuditEntryRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: PaymentAuditEntryUuid::from_uuid(row.try_get("uuid")?),
            payment: PaymentUuid::from_uuid(row.try_get("payment_uuid")?),
            previous_status: try_get_parsed_opt(row, "previous_status")?,
            new_status: try_get_parsed(row, "new_status")?,
            action: row.try_get("action")?,
            context: row.try_get("context")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
