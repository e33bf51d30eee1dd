//! Shortlist Requests Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use rust_decimal::Decimal;
use shortlist::{
    follow_up::PricingCategory,
    lifecycle::ShortlistStatus,
    matching::{HiringCriteria, HiringLocation},
    seniority::Seniority,
};
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query_as};

use crate::{
    database::{
        to_i32, to_i64, try_get_parsed, try_get_parsed_opt, try_get_u32_opt, try_get_u64_opt,
    },
    domain::{
        payments::records::PaymentUuid,
        shortlists::records::{
            CompanyUuid, OperatorUuid, ShortlistRequestRecord, ShortlistRequestUuid,
        },
    },
};

const CREATE_REQUEST_SQL: &str = include_str!("sql/create_request.sql");
const GET_REQUEST_SQL: &str = include_str!("sql/get_request.sql");
const LOCK_REQUEST_SQL: &str = include_str!("sql/lock_request.sql");
const LIST_COMPANY_REQUESTS_SQL: &str = include_str!("sql/list_company_requests.sql");
const UPDATE_REQUEST_SQL: &str = include_str!("sql/update_request.sql");

/// Row to insert for a submitted request.
#[derive(Debug, Clone)]
pub(crate) struct NewRequestRow<'a> {
    pub uuid: ShortlistRequestUuid,
    pub company: CompanyUuid,
    pub criteria: &'a HiringCriteria,
    pub rare_profile: bool,
    pub currency: &'a str,
    pub pricing_category: PricingCategory,
    pub follow_up_discount_percent: Decimal,
    pub previous_request: Option<ShortlistRequestUuid>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgShortlistRequestsRepository;

impl PgShortlistRequestsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_request(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request: &NewRequestRow<'_>,
    ) -> Result<ShortlistRequestRecord, sqlx::Error> {
        let criteria = request.criteria;

        query_as::<Postgres, ShortlistRequestRecord>(CREATE_REQUEST_SQL)
            .bind(request.uuid.into_uuid())
            .bind(request.company.into_uuid())
            .bind(&criteria.role_title)
            .bind(&criteria.tech_stack)
            .bind(criteria.seniority.map(Seniority::as_str))
            .bind(criteria.location.country.as_deref())
            .bind(criteria.location.city.as_deref())
            .bind(criteria.location.timezone.as_deref())
            .bind(criteria.location.remote)
            .bind(request.rare_profile)
            .bind(request.currency)
            .bind(request.pricing_category.as_str())
            .bind(request.follow_up_discount_percent)
            .bind(request.previous_request.map(ShortlistRequestUuid::into_uuid))
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn get_request(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request: ShortlistRequestUuid,
    ) -> Result<ShortlistRequestRecord, sqlx::Error> {
        query_as::<Postgres, ShortlistRequestRecord>(GET_REQUEST_SQL)
            .bind(request.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    /// Reads the request and holds its row lock until the transaction ends.
    pub(crate) async fn lock_request(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request: ShortlistRequestUuid,
    ) -> Result<ShortlistRequestRecord, sqlx::Error> {
        query_as::<Postgres, ShortlistRequestRecord>(LOCK_REQUEST_SQL)
            .bind(request.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_company_requests(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        company: CompanyUuid,
    ) -> Result<Vec<ShortlistRequestRecord>, sqlx::Error> {
        query_as::<Postgres, ShortlistRequestRecord>(LIST_COMPANY_REQUESTS_SQL)
            .bind(company.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    /// Writes the mutable fields of `request` while the stored status is still `expected`.
    ///
    /// Returns `None` when the status moved underneath the caller.
    pub(crate) async fn save_request(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request: &ShortlistRequestRecord,
        expected: ShortlistStatus,
    ) -> Result<Option<ShortlistRequestRecord>, sqlx::Error> {
        let proposed_price = request
            .proposed_price
            .map(|price| to_i64(price, "proposed_price"))
            .transpose()?;

        let approved_price = request
            .approved_price
            .map(|price| to_i64(price, "approved_price"))
            .transpose()?;

        let final_price = request
            .final_price
            .map(|price| to_i64(price, "final_price"))
            .transpose()?;

        let proposed_candidate_count = request
            .proposed_candidate_count
            .map(|count| to_i32(count, "proposed_candidate_count"))
            .transpose()?;

        let requested_candidate_count = request
            .requested_candidate_count
            .map(|count| to_i32(count, "requested_candidate_count"))
            .transpose()?;

        let delivered_candidate_count = request
            .delivered_candidate_count
            .map(|count| to_i32(count, "delivered_candidate_count"))
            .transpose()?;

        query_as::<Postgres, ShortlistRequestRecord>(UPDATE_REQUEST_SQL)
            .bind(request.uuid.into_uuid())
            .bind(expected.as_str())
            .bind(request.status.as_str())
            .bind(request.outcome.as_str())
            .bind(request.outcome_reason.as_deref())
            .bind(proposed_price)
            .bind(approved_price)
            .bind(proposed_candidate_count)
            .bind(request.payment.map(PaymentUuid::into_uuid))
            .bind(requested_candidate_count)
            .bind(delivered_candidate_count)
            .bind(final_price)
            .bind(request.delivered_at.map(SqlxTimestamp::from))
            .bind(request.payment_confirmed_by.map(OperatorUuid::into_uuid))
            .bind(request.payment_confirmed_at.map(SqlxTimestamp::from))
            .bind(request.cancellation_reason.as_deref())
            .bind(request.pricing_decline_reason.as_deref())
            .bind(request.archived_at.map(SqlxTimestamp::from))
            .fetch_optional(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for ShortlistRequestRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ShortlistRequestUuid::from_uuid(row.try_get("uuid")?),
            company: CompanyUuid::from_uuid(row.try_get("company_uuid")?),
            criteria: HiringCriteria {
                role_title: row.try_get("role_title")?,
                tech_stack: row.try_get("tech_stack")?,
                seniority: try_get_parsed_opt(row, "seniority")?,
                location: HiringLocation {
                    country: row.try_get("country")?,
                    city: row.try_get("city")?,
                    timezone: row.try_get("timezone")?,
                    remote: row.try_get("remote")?,
                },
            },
            rare_profile: row.try_get("rare_profile")?,
            status: try_get_parsed(row, "status")?,
            outcome: try_get_parsed(row, "outcome")?,
            outcome_reason: row.try_get("outcome_reason")?,
            currency: row.try_get("currency")?,
            proposed_price: try_get_u64_opt(row, "proposed_price")?,
            approved_price: try_get_u64_opt(row, "approved_price")?,
            proposed_candidate_count: try_get_u32_opt(row, "proposed_candidate_count")?,
            payment: row
                .try_get::<Option<uuid::Uuid>, _>("payment_uuid")?
                .map(PaymentUuid::from_uuid),
            pricing_category: try_get_parsed(row, "pricing_category")?,
            follow_up_discount_percent: row.try_get("follow_up_discount_percent")?,
            previous_request: row
                .try_get::<Option<uuid::Uuid>, _>("previous_request_uuid")?
                .map(ShortlistRequestUuid::from_uuid),
            requested_candidate_count: try_get_u32_opt(row, "requested_candidate_count")?,
            delivered_candidate_count: try_get_u32_opt(row, "delivered_candidate_count")?,
            final_price: try_get_u64_opt(row, "final_price")?,
            delivered_at: row
                .try_get::<Option<SqlxTimestamp>, _>("delivered_at")?
                .map(SqlxTimestamp::to_jiff),
            payment_confirmed_by: row
                .try_get::<Option<uuid::Uuid>, _>("payment_confirmed_by")?
                .map(OperatorUuid::from_uuid),
            payment_confirmed_at: row
                .try_get::<Option<SqlxTimestamp>, _>("payment_confirmed_at")?
                .map(SqlxTimestamp::to_jiff),
            cancellation_reason: row.try_get("cancellation_reason")?,
            pricing_decline_reason: row.try_get("pricing_decline_reason")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            archived_at: row
                .try_get::<Option<SqlxTimestamp>, _>("archived_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}
