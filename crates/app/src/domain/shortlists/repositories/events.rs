//! Shortlist Events Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use shortlist::lifecycle::ShortlistStatus;
use sqlx::{Connection, FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as};
use tracing::warn;

use crate::{
    database::try_get_parsed_opt,
    domain::shortlists::{
        data::Actor,
        records::{ShortlistEventRecord, ShortlistEventUuid, ShortlistRequestUuid},
    },
};

const RECORD_EVENT_SQL: &str = include_str!("sql/record_event.sql");
const LIST_EVENTS_SQL: &str = include_str!("sql/list_events.sql");

/// Something that happened to a request.
#[derive(Debug, Clone)]
pub(crate) struct ShortlistEvent {
    pub request: ShortlistRequestUuid,
    pub event_type: &'static str,
    pub previous_status: Option<ShortlistStatus>,
    pub new_status: Option<ShortlistStatus>,
    pub actor: Actor,
    pub metadata: serde_json::Value,
}

impl ShortlistEvent {
    pub(crate) fn new(request: ShortlistRequestUuid, event_type: &'static str, actor: Actor) -> Self {
        Self {
            request,
            event_type,
            previous_status: None,
            new_status: None,
            actor,
            metadata: serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    #[must_use]
    pub(crate) fn transition(mut self, previous: ShortlistStatus, next: ShortlistStatus) -> Self {
        self.previous_status = Some(previous);
        self.new_status = Some(next);
        self
    }

    #[must_use]
    pub(crate) fn metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct PgShortlistEventsRepository;

impl PgShortlistEventsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Appends `event` inside a savepoint. Failures are logged and never abort `tx`.
    pub(crate) async fn record(&self, tx: &mut Transaction<'_, Postgres>, event: &ShortlistEvent) {
        if let Err(error) = self.try_record(tx, event).await {
            warn!(
                request_uuid = %event.request,
                event_type = event.event_type,
                error = %error,
                "failed to record shortlist event"
            );
        }
    }

    async fn try_record(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        event: &ShortlistEvent,
    ) -> Result<(), sqlx::Error> {
        let mut savepoint = Connection::begin(&mut **tx).await?;

        query(RECORD_EVENT_SQL)
            .bind(ShortlistEventUuid::new().into_uuid())
            .bind(event.request.into_uuid())
            .bind(event.event_type)
            .bind(event.previous_status.map(ShortlistStatus::as_str))
            .bind(event.new_status.map(ShortlistStatus::as_str))
            .bind(event.actor.uuid())
            .bind(event.actor.kind())
            .bind(&event.metadata)
            .execute(&mut *savepoint)
            .await?;

        savepoint.commit().await
    }

    pub(crate) async fn list_events(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request: ShortlistRequestUuid,
    ) -> Result<Vec<ShortlistEventRecord>, sqlx::Error> {
        query_as::<Postgres, ShortlistEventRecord>(LIST_EVENTS_SQL)
            .bind(request.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }
}

impl<'r> FromRow<'r, PgRow> for ShortlistEventRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self {
            uuid: ShortlistEventUuid::from_uuid(row.try_get("uuid")?),
            request: ShortlistRequestUuid::from_uuid(row.try_get("request_uuid")?),
            event_type: row.try_get("event_type")?,
            previous_status: try_get_parsed_opt(row, "previous_status")?,
            new_status: try_get_parsed_opt(row, "new_status")?,
            actor: row.try_get("actor_uuid")?,
            actor_type: row.try_get("actor_type")?,
            metadata: row.try_get("metadata")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
