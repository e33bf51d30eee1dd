//! Payments Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use shortlist::payments::PaymentStatus;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as, query_scalar};
use uuid::Uuid;

use crate::{
    database::{to_i64, try_get_parsed, try_get_u64},
    domain::{
        payments::{
            data::PaymentStatusChange,
            records::{PaymentRecord, PaymentUuid},
        },
        shortlists::records::{CompanyUuid, ShortlistRequestUuid},
    },
};

const CREATE_PAYMENT_SQL: &str = include_str!("sql/create_payment.sql");
const GET_PAYMENT_SQL: &str = include_str!("sql/get_payment.sql");
const LOCK_PAYMENT_SQL: &str = include_str!("sql/lock_payment.sql");
const FIND_PAYMENT_BY_REFERENCE_SQL: &str = include_str!("sql/find_payment_by_reference.sql");
const UPDATE_PAYMENT_STATUS_SQL: &str = include_str!("sql/update_payment_status.sql");
const LIST_STALE_AUTHORIZATIONS_SQL: &str = include_str!("sql/list_stale_authorizations.sql");

/// Row to insert for a new payment.
#[derive(Debug, Clone)]
pub(crate) struct NewPaymentRow<'a> {
    pub uuid: PaymentUuid,
    pub company: CompanyUuid,
    pub request: ShortlistRequestUuid,
    pub provider: &'a str,
    pub provider_reference: Option<&'a str>,
    pub client_handle: Option<&'a str>,
    pub currency: &'a str,
    pub amount_authorized: u64,
    pub status: PaymentStatus,
    pub error_message: Option<&'a str>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPaymentsRepository;

impl PgPaymentsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: &NewPaymentRow<'_>,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(CREATE_PAYMENT_SQL)
            .bind(payment.uuid.into_uuid())
            .bind(payment.company.into_uuid())
            .bind(payment.request.into_uuid())
            .bind(payment.provider)
            .bind(payment.provider_reference)
            .bind(payment.client_handle)
            .bind(payment.currency)
            .bind(to_i64(payment.amount_authorized, "amount_authorized")?)
            .bind(payment.status.as_str())
            .bind(payment.error_message)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(GET_PAYMENT_SQL)
            .bind(payment.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Reads the payment and holds its row lock until the transaction ends.
    pub(crate) async fn lock_payment(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(LOCK_PAYMENT_SQL)
            .bind(payment.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_payment_by_reference(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        provider: &str,
        provider_reference: &str,
    ) -> Result<PaymentRecord, sqlx::Error> {
        query_as::<Postgres, PaymentRecord>(FIND_PAYMENT_BY_REFERENCE_SQL)
            .bind(provider)
            .bind(provider_reference)
            .fetch_one(&mut **tx)
            .await
    }

    /// Applies `change` only while the stored status still equals `change.expected`.
    ///
    /// Returns `None` when another writer moved the payment first.
    pub(crate) async fn update_status(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
        change: &PaymentStatusChange<'_>,
    ) -> Result<Option<PaymentRecord>, sqlx::Error> {
        let amount_captured = change
            .amount_captured
            .map(|amount| to_i64(amount, "amount_captured"))
            .transpose()?;

        query_as::<Postgres, PaymentRecord>(UPDATE_PAYMENT_STATUS_SQL)
            .bind(payment.into_uuid())
            .bind(change.expected.as_str())
            .bind(change.next.as_str())
            .bind(amount_captured)
            .bind(change.error_message)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Authorized payments whose hold was placed before `cutoff`.
    pub(crate) async fn list_stale_authorizations(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        cutoff: Timestamp,
    ) -> Result<Vec<PaymentUuid>, sqlx::Error> {
        let uuids: Vec<Uuid> = query_scalar(LIST_STALE_AUTHORIZATIONS_SQL)
            .bind(SqlxTimestamp::from(cutoff))
            .fetch_all(&mut **tx)
            .await?;

        Ok(uuids.into_iter().map(PaymentUuid::from_uuid).collect())
    }
}

impl<'r> FromRow<'r, PgRow> for PaymentRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: PaymentUuid::from_uuid(row.try_get("uuid")?),
            company: CompanyUuid::from_uuid(row.try_get("company_uuid")?),
            request: ShortlistRequestUuid::from_uuid(row.try_get("request_uuid")?),
            provider: row.try_get("provider")?,
            provider_reference: row.try_get("provider_reference")?,
            client_handle: row.try_get("client_handle")?,
            currency: row.try_get("currency")?,
            amount_authorized: try_get_u64(row, "amount_authorized")?,
            amount_captured: try_get_u64(row, "amount_captured")?,
            status: try_get_parsed(row, "status")?,
            error_message: row.try_get("error_message")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            authorized_at: row
                .try_get::<Option<SqlxTimestamp>, _>("authorized_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
