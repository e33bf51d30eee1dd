//! Candidate Pool Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use shortlist::matching::{CandidateLocation, CandidateProfile, CandidateSkill};
use sqlx::{FromRow, PgPool, Postgres, Row, postgres::PgRow, query_as};

use crate::{
    database::{try_get_parsed, try_get_parsed_opt, try_get_u32},
    domain::candidates::CandidateUuid,
};

const ELIGIBLE_CANDIDATES_SQL: &str = include_str!("sql/eligible_candidates.sql");
const GET_CANDIDATE_SQL: &str = include_str!("sql/get_candidate.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgCandidatesRepository;

impl PgCandidatesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn eligible_candidates(
        &self,
        pool: &PgPool,
    ) -> Result<Vec<CandidateProfile>, sqlx::Error> {
        let rows = query_as::<Postgres, CandidateRow>(ELIGIBLE_CANDIDATES_SQL)
            .fetch_all(pool)
            .await?;

        Ok(rows.into_iter().map(|row| row.0).collect())
    }

    pub(crate) async fn get_candidate(
        &self,
        pool: &PgPool,
        candidate: CandidateUuid,
    ) -> Result<CandidateProfile, sqlx::Error> {
        query_as::<Postgres, CandidateRow>(GET_CANDIDATE_SQL)
            .bind(candidate.into_uuid())
            .fetch_one(pool)
            .await
            .map(|row| row.0)
    }
}

struct CandidateRow(CandidateProfile);

impl<'r> FromRow<'r, PgRow> for CandidateRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let names: Vec<String> = row.try_get("skill_names")?;
        let confidences: Vec<f64> = row.try_get("skill_confidences")?;

        let skills = names
            .into_iter()
            .zip(confidences)
            .map(|(name, confidence)| CandidateSkill { name, confidence })
            .collect();

        Ok(Self(CandidateProfile {
            uuid: row.try_get("uuid")?,
            desired_role: row.try_get("desired_role")?,
            seniority: try_get_parsed_opt(row, "seniority")?,
            skills,
            recommendation_count: try_get_u32(row, "recommendation_count")?,
            last_active_at: row
                .try_get::<Option<SqlxTimestamp>, _>("last_active_at")?
                .map(SqlxTimestamp::to_jiff),
            availability: try_get_parsed(row, "availability")?,
            location: CandidateLocation {
                country: row.try_get("country")?,
                city: row.try_get("city")?,
                timezone: row.try_get("timezone")?,
                willing_to_relocate: row.try_get("willing_to_relocate")?,
                work_preference: try_get_parsed(row, "work_preference")?,
            },
            visible: row.try_get("visible")?,
            open_to_opportunities: row.try_get("open_to_opportunities")?,
        }))
    }
}
