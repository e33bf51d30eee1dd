//! Follow-up Repository

use jiff::Timestamp;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use rustc_hash::FxHashMap;
use shortlist::{
    follow_up::{FollowUpPricingRule, LinkedPrior, PriorRequest, RequestSignature},
    lifecycle::ShortlistStatus,
};
use sqlx::{Postgres, Row, Transaction, postgres::PgRow, query};
use uuid::Uuid;

use crate::{
    database::{try_get_parsed, try_get_parsed_opt, try_get_u32},
    domain::{
        candidates::CandidateUuid,
        shortlists::records::{CompanyUuid, ShortlistRequestUuid},
    },
};

const PRIOR_REQUESTS_SQL: &str = include_str!("sql/prior_requests.sql");
const LINKED_PRIOR_SQL: &str = include_str!("sql/linked_prior.sql");
const ACTIVE_RULES_SQL: &str = include_str!("sql/active_rules.sql");
const CHAIN_CANDIDATES_SQL: &str = include_str!("sql/chain_candidates.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgFollowUpsRepository;

impl PgFollowUpsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// The company's requests created at or after `since`.
    pub(crate) async fn prior_requests(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        company: CompanyUuid,
        since: Timestamp,
    ) -> Result<Vec<PriorRequest>, sqlx::Error> {
        let rows = query(PRIOR_REQUESTS_SQL)
            .bind(company.into_uuid())
            .bind(SqlxTimestamp::from(since))
            .fetch_all(&mut **tx)
            .await?;

        rows.iter().map(prior_request_from_row).collect()
    }

    /// An explicitly linked request, when it belongs to `company`.
    pub(crate) async fn linked_prior(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        company: CompanyUuid,
        request: ShortlistRequestUuid,
    ) -> Result<Option<LinkedPrior>, sqlx::Error> {
        let row = query(LINKED_PRIOR_SQL)
            .bind(request.into_uuid())
            .bind(company.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        row.map(|row| {
            Ok(LinkedPrior {
                uuid: row.try_get("uuid")?,
                created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
                outcome: try_get_parsed(&row, "outcome")?,
            })
        })
        .transpose()
    }

    pub(crate) async fn active_rules(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<FollowUpPricingRule>, sqlx::Error> {
        let rows = query(ACTIVE_RULES_SQL).fetch_all(&mut **tx).await?;

        rows.iter()
            .map(|row| {
                Ok(FollowUpPricingRule {
                    max_days: try_get_u32(row, "max_days")?,
                    discount_percent: row.try_get("discount_percent")?,
                    active: row.try_get("active")?,
                })
            })
            .collect()
    }

    /// Every candidate recommended anywhere up the request's follow-up chain, mapped to the
    /// nearest request that surfaced them.
    pub(crate) async fn chain_candidates(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request: ShortlistRequestUuid,
    ) -> Result<FxHashMap<CandidateUuid, ShortlistRequestUuid>, sqlx::Error> {
        let rows = query(CHAIN_CANDIDATES_SQL)
            .bind(request.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        rows.iter()
            .map(|row| {
                Ok((
                    CandidateUuid::from_uuid(row.try_get::<Uuid, _>("candidate_uuid")?),
                    ShortlistRequestUuid::from_uuid(row.try_get::<Uuid, _>("request_uuid")?),
                ))
            })
            .collect()
    }
}

fn prior_request_from_row(row: &PgRow) -> Result<PriorRequest, sqlx::Error> {
    let status: ShortlistStatus = try_get_parsed(row, "status")?;

    Ok(PriorRequest {
        uuid: row.try_get("uuid")?,
        signature: RequestSignature {
            role_title: row.try_get("role_title")?,
            seniority: try_get_parsed_opt(row, "seniority")?,
            remote: row.try_get("remote")?,
            country: row.try_get("country")?,
            tech_stack: row.try_get("tech_stack")?,
        },
        created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        completed: status == ShortlistStatus::Completed,
    })
}
