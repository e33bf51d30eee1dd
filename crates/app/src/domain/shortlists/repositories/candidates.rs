//! Shortlist Candidates Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use rustc_hash::FxHashMap;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::{
    database::{to_i32, try_get_u32, try_get_u32_opt},
    domain::{
        candidates::CandidateUuid,
        shortlists::records::{
            ShortlistCandidateRecord, ShortlistCandidateUuid, ShortlistRequestUuid,
        },
    },
};

const INSERT_CANDIDATES_SQL: &str = include_str!("sql/insert_candidates.sql");
const LATEST_CANDIDATES_SQL: &str = include_str!("sql/latest_candidates.sql");
const CURRENT_PASS_SQL: &str = include_str!("sql/current_pass.sql");
const LOCK_CANDIDATE_SQL: &str = include_str!("sql/lock_candidate.sql");
const UPDATE_CANDIDATE_SQL: &str = include_str!("sql/update_candidate.sql");
const COUNT_APPROVED_SQL: &str = include_str!("sql/count_approved.sql");
const REINCLUDED_CANDIDATES_SQL: &str = include_str!("sql/reincluded_candidates.sql");

/// A ranked candidate about to be stored.
#[derive(Debug, Clone)]
pub(crate) struct NewCandidateRow {
    pub candidate: CandidateUuid,
    pub score: f64,
    pub reason: String,
    pub rank: Option<u32>,
    pub is_new: bool,
    pub previous_request: Option<ShortlistRequestUuid>,
    pub reinclusion_reason: Option<String>,
}

/// Where a re-included candidate was first recommended, and why it is back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReinclusionNote {
    pub previous_request: Option<ShortlistRequestUuid>,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgShortlistCandidatesRepository;

impl PgShortlistCandidatesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Latest pass number for the request, zero before the first pass.
    pub(crate) async fn current_pass(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request: ShortlistRequestUuid,
    ) -> Result<u32, sqlx::Error> {
        let pass: i32 = query_scalar(CURRENT_PASS_SQL)
            .bind(request.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        Ok(u32::try_from(pass).unwrap_or_default())
    }

    pub(crate) async fn insert_candidates(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request: ShortlistRequestUuid,
        pass_number: u32,
        rows: &[NewCandidateRow],
    ) -> Result<Vec<ShortlistCandidateRecord>, sqlx::Error> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut uuids = Vec::with_capacity(rows.len());
        let mut candidates = Vec::with_capacity(rows.len());
        let mut scores = Vec::with_capacity(rows.len());
        let mut reasons = Vec::with_capacity(rows.len());
        let mut ranks = Vec::with_capacity(rows.len());
        let mut is_new = Vec::with_capacity(rows.len());
        let mut previous = Vec::with_capacity(rows.len());
        let mut reinclusion = Vec::with_capacity(rows.len());

        for row in rows {
            uuids.push(ShortlistCandidateUuid::new().into_uuid());
            candidates.push(row.candidate.into_uuid());
            scores.push(row.score);
            reasons.push(row.reason.as_str());
            ranks.push(row.rank.map(|rank| to_i32(rank, "rank")).transpose()?);
            is_new.push(row.is_new);
            previous.push(row.previous_request.map(ShortlistRequestUuid::into_uuid));
            reinclusion.push(row.reinclusion_reason.as_deref());
        }

        let mut inserted = query_as::<Postgres, ShortlistCandidateRecord>(INSERT_CANDIDATES_SQL)
            .bind(request.into_uuid())
            .bind(to_i32(pass_number, "pass_number")?)
            .bind(uuids)
            .bind(candidates)
            .bind(scores)
            .bind(reasons)
            .bind(ranks)
            .bind(is_new)
            .bind(previous)
            .bind(reinclusion)
            .fetch_all(&mut **tx)
            .await?;

        inserted.sort_by(|a, b| {
            a.rank
                .is_none()
                .cmp(&b.rank.is_none())
                .then(a.rank.cmp(&b.rank))
                .then(b.score.total_cmp(&a.score))
                .then(a.candidate.cmp(&b.candidate))
        });

        Ok(inserted)
    }

    /// Candidates of the latest pass, in rank order.
    pub(crate) async fn latest_candidates(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request: ShortlistRequestUuid,
    ) -> Result<Vec<ShortlistCandidateRecord>, sqlx::Error> {
        query_as::<Postgres, ShortlistCandidateRecord>(LATEST_CANDIDATES_SQL)
            .bind(request.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn lock_candidate(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request: ShortlistRequestUuid,
        candidate: ShortlistCandidateUuid,
    ) -> Result<ShortlistCandidateRecord, sqlx::Error> {
        query_as::<Postgres, ShortlistCandidateRecord>(LOCK_CANDIDATE_SQL)
            .bind(candidate.into_uuid())
            .bind(request.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_candidate(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        candidate: ShortlistCandidateUuid,
        approved: bool,
        rank: Option<u32>,
    ) -> Result<ShortlistCandidateRecord, sqlx::Error> {
        query_as::<Postgres, ShortlistCandidateRecord>(UPDATE_CANDIDATE_SQL)
            .bind(candidate.into_uuid())
            .bind(approved)
            .bind(rank.map(|rank| to_i32(rank, "rank")).transpose()?)
            .fetch_one(&mut **tx)
            .await
    }

    /// Approved candidates in the latest pass.
    pub(crate) async fn count_approved(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request: ShortlistRequestUuid,
    ) -> Result<u32, sqlx::Error> {
        let count: i64 = query_scalar(COUNT_APPROVED_SQL)
            .bind(request.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    /// Candidates an operator re-included on this request, with their latest note.
    pub(crate) async fn reincluded_candidates(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request: ShortlistRequestUuid,
    ) -> Result<FxHashMap<CandidateUuid, ReinclusionNote>, sqlx::Error> {
        let rows = query(REINCLUDED_CANDIDATES_SQL)
            .bind(request.into_uuid())
            .fetch_all(&mut **tx)
            .await?;

        rows.iter()
            .map(|row| {
                let candidate = CandidateUuid::from_uuid(row.try_get("candidate_uuid")?);

                let note = ReinclusionNote {
                    previous_request: row
                        .try_get::<Option<Uuid>, _>("previous_request_uuid")?
                        .map(ShortlistRequestUuid::from_uuid),
                    reason: row
                        .try_get::<Option<String>, _>("reinclusion_reason")?
                        .unwrap_or_default(),
                };

                Ok((candidate, note))
            })
            .collect()
    }
}

impl<'r> FromRow<'r, PgRow> for ShortlistCandidateRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ShortlistCandidateUuid::from_uuid(row.try_get("uuid")?),
            request: ShortlistRequestUuid::from_uuid(row.try_get("request_uuid")?),
            candidate: CandidateUuid::from_uuid(row.try_get("candidate_uuid")?),
            pass_number: try_get_u32(row, "pass_number")?,
            score: row.try_get("score")?,
            reason: row.try_get("reason")?,
            rank: try_get_u32_opt(row, "rank")?,
            approved: row.try_get("approved")?,
            is_new: row.try_get("is_new")?,
            previous_request: row
                .try_get::<Option<Uuid>, _>("previous_request_uuid")?
                .map(ShortlistRequestUuid::from_uuid),
            reinclusion_reason: row.try_get("reinclusion_reason")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        })
    }
}
