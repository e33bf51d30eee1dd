//! Shortlists service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};
use mockall::automock;
use rustc_hash::FxHashSet;
use serde_json::json;
use shortlist::{
    follow_up::{DiscountSchedule, FollowUpDetector, PricingCategory, RequestSignature},
    lifecycle::{OutcomeDecision, ShortlistOutcome, ShortlistStatus, closing_status},
    matching::{MatchOptions, MatchingConfig, MatchingEngine},
    payments::{PartialTerms, PaymentStatus},
    pricing::{PriceInputs, discounted, suggest_price},
};
use sqlx::{Postgres, Transaction};
use tracing::{Span, field::Empty, info};
use uuid::Uuid;

use crate::{
    database::Db,
    domain::{
        candidates::CandidatePool,
        follow_ups::repository::PgFollowUpsRepository,
        notifications::{NotificationKind, repository::PgOutboxRepository},
        payments::{
            PaymentsServiceError, providers::ProviderRegistry,
            repositories::payments::PgPaymentsRepository, settler::PaymentSettler,
        },
        shortlists::{
            data::{
                Actor, CandidateUpdate, DEFAULT_CURRENCY, Delivery, NewShortlistRequest,
                OutcomeInput, PriceQuote, ProcessedShortlist, ProposedScope, Reinclusion,
                SettlementResolution,
            },
            errors::ShortlistsServiceError,
            records::{
                CompanyUuid, OperatorUuid, ShortlistCandidateRecord, ShortlistCandidateUuid,
                ShortlistEventRecord, ShortlistRequestRecord, ShortlistRequestUuid,
            },
            repositories::{
                candidates::{NewCandidateRow, PgShortlistCandidatesRepository},
                events::{PgShortlistEventsRepository, ShortlistEvent},
                requests::{NewRequestRow, PgShortlistRequestsRepository},
            },
        },
    },
};

const SECONDS_PER_DAY: i64 = 86_400;

fn normalise_currency(currency: Option<&str>) -> Result<String, ShortlistsServiceError> {
    let Some(currency) = currency else {
        return Ok(DEFAULT_CURRENCY.to_string());
    };

    let currency = currency.trim().to_ascii_uppercase();

    if currency.len() != 3 || !currency.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(ShortlistsServiceError::Validation(
            "currency must be a three-letter ISO 4217 code",
        ));
    }

    Ok(currency)
}

fn required_note(note: &str, message: &'static str) -> Result<String, ShortlistsServiceError> {
    let note = note.trim();

    if note.is_empty() {
        return Err(ShortlistsServiceError::Validation(message));
    }

    Ok(note.to_string())
}

fn ensure_open(request: &ShortlistRequestRecord) -> Result<(), ShortlistsServiceError> {
    if request.status.is_terminal() {
        return Err(ShortlistsServiceError::TerminalStatus(request.status));
    }

    Ok(())
}

fn ensure_curating(request: &ShortlistRequestRecord) -> Result<(), ShortlistsServiceError> {
    match request.status {
        ShortlistStatus::Processing | ShortlistStatus::PricingPending => Ok(()),
        status => Err(ShortlistsServiceError::NotCurating(status)),
    }
}

/// Partial terms for `outcome`, falling back to the price recorded at delivery.
fn settlement_terms(
    request: &ShortlistRequestRecord,
    outcome: ShortlistOutcome,
    terms: Option<PartialTerms>,
) -> Option<PartialTerms> {
    if outcome != ShortlistOutcome::Partial {
        return None;
    }

    terms.or_else(|| {
        request.final_price.map(|amount| PartialTerms {
            discount_percent: None,
            override_amount: Some(amount),
        })
    })
}

/// Notification sent once a request closes with `outcome`.
const fn closing_notification(outcome: ShortlistOutcome) -> Option<NotificationKind> {
    match outcome {
        ShortlistOutcome::NoMatch => Some(NotificationKind::NoMatch),
        ShortlistOutcome::Delivered | ShortlistOutcome::Partial => Some(NotificationKind::Completed),
        ShortlistOutcome::Cancelled | ShortlistOutcome::Pending => None,
    }
}

fn notification_payload(request: &ShortlistRequestRecord) -> serde_json::Value {
    json!({
        "company": request.company,
        "role_title": request.criteria.role_title,
        "status": request.status,
    })
}

#[derive(Clone)]
pub struct PgShortlistsService {
    db: Db,
    pool: Arc<dyn CandidatePool>,
    engine: MatchingEngine,
    detector: FollowUpDetector,
    settler: PaymentSettler,
    requests: PgShortlistRequestsRepository,
    candidates: PgShortlistCandidatesRepository,
    events: PgShortlistEventsRepository,
    follow_ups: PgFollowUpsRepository,
    payments: PgPaymentsRepository,
    outbox: PgOutboxRepository,
}

impl PgShortlistsService {
    #[must_use]
    pub fn new(db: Db, pool: Arc<dyn CandidatePool>, registry: ProviderRegistry) -> Self {
        Self {
            db,
            pool,
            engine: MatchingEngine::default(),
            detector: FollowUpDetector::default(),
            settler: PaymentSettler::new(registry),
            requests: PgShortlistRequestsRepository::new(),
            candidates: PgShortlistCandidatesRepository::new(),
            events: PgShortlistEventsRepository::new(),
            follow_ups: PgFollowUpsRepository::new(),
            payments: PgPaymentsRepository::new(),
            outbox: PgOutboxRepository::new(),
        }
    }

    #[must_use]
    pub fn with_matching(mut self, config: MatchingConfig) -> Self {
        self.engine = MatchingEngine::new(config);
        self
    }

    #[must_use]
    pub fn with_follow_up_detector(mut self, detector: FollowUpDetector) -> Self {
        self.detector = detector;
        self
    }

    /// Locks the request, refusing companies that do not own it.
    async fn lock_for(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        actor: Actor,
        request: ShortlistRequestUuid,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError> {
        let record = self.requests.lock_request(tx, request).await?;

        match actor {
            Actor::Company(company) if company != record.company => {
                Err(ShortlistsServiceError::Forbidden)
            }
            _ => Ok(record),
        }
    }

    async fn save(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request: &ShortlistRequestRecord,
        expected: ShortlistStatus,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError> {
        self.requests
            .save_request(tx, request, expected)
            .await?
            .ok_or(ShortlistsServiceError::StatusChanged)
    }

    /// Writes a decided outcome and finalizes the linked payment.
    ///
    /// When the provider rejects the settlement the outcome is still committed, the request
    /// status is left alone and the provider error is returned.
    async fn close(
        &self,
        mut tx: Transaction<'_, Postgres>,
        mut request: ShortlistRequestRecord,
        decision: OutcomeDecision,
        terms: Option<PartialTerms>,
        actor: Actor,
        cancellation_reason: Option<String>,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError> {
        let previous = request.status;
        let next = closing_status(previous);
        let outcome = decision.outcome();

        previous.transition_to(next)?;

        let terms = settlement_terms(&request, outcome, terms);

        let finalized = match request.payment {
            Some(payment) => Some(
                self.settler
                    .finalize(&mut tx, payment, outcome, terms.as_ref())
                    .await?,
            ),
            None => None,
        };

        request.outcome = outcome;
        request.outcome_reason = Some(decision.reason().to_string());

        if let Some(reason) = cancellation_reason {
            request.cancellation_reason = Some(reason);
        }

        let failure = finalized.as_ref().and_then(|finalized| finalized.failure.as_ref());

        if failure.is_none() {
            request.status = next;
        }

        let saved = self.save(&mut tx, &request, previous).await?;

        let mut event = ShortlistEvent::new(request.uuid, "outcome_decided", actor).metadata(json!({
            "outcome": outcome,
            "reason": decision.reason(),
            "payment": finalized.as_ref().map(|finalized| finalized.payment.uuid),
            "payment_status": finalized.as_ref().map(|finalized| finalized.payment.status),
        }));

        if failure.is_none() {
            event = event.transition(previous, next);
        }

        self.events.record(&mut tx, &event).await;

        if let (Some(kind), None) = (closing_notification(outcome), failure) {
            let mut payload = notification_payload(&saved);
            payload["outcome"] = json!(outcome);
            payload["amount_captured"] =
                json!(finalized.as_ref().map(|finalized| finalized.payment.amount_captured));

            self.outbox.enqueue(&mut tx, kind, saved.uuid, payload).await;
        }

        tx.commit().await?;

        if let Some(error) = finalized.and_then(|finalized| finalized.failure) {
            return Err(PaymentsServiceError::Provider(error).into());
        }

        info!(outcome = %outcome, status = %saved.status, "closed shortlist");

        Ok(saved)
    }
}

#[async_trait]
impl ShortlistsService for PgShortlistsService {
    #[tracing::instrument(
        name = "shortlists.service.submit",
        skip(self, request),
        fields(company_uuid = %company, request_uuid = Empty, pricing_category = Empty),
        err
    )]
    async fn submit(
        &self,
        company: CompanyUuid,
        request: NewShortlistRequest,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError> {
        let criteria = request.criteria.validate()?;
        let currency = normalise_currency(request.currency.as_deref())?;
        let now = Timestamp::now();

        let mut tx = self.db.begin().await?;

        let link = match request.previous_request {
            Some(previous) => Some(
                self.follow_ups
                    .linked_prior(&mut tx, company, previous)
                    .await?
                    .ok_or(ShortlistsServiceError::InvalidReference)?,
            ),
            None => None,
        };

        let priors = if link.is_none() {
            let lookback = SignedDuration::from_secs(
                i64::from(self.detector.lookback_days) * SECONDS_PER_DAY,
            );
            let since = now.checked_sub(lookback).unwrap_or(Timestamp::MIN);

            self.follow_ups.prior_requests(&mut tx, company, since).await?
        } else {
            Vec::new()
        };

        let schedule = DiscountSchedule::new(self.follow_ups.active_rules(&mut tx).await?);

        let decision = self.detector.decide(
            &schedule,
            &RequestSignature::from(&criteria),
            link.as_ref(),
            &priors,
            now,
        );

        let created = self
            .requests
            .create_request(
                &mut tx,
                &NewRequestRow {
                    uuid: ShortlistRequestUuid::new(),
                    company,
                    criteria: &criteria,
                    rare_profile: request.rare_profile,
                    currency: &currency,
                    pricing_category: decision.category,
                    follow_up_discount_percent: decision.discount_percent,
                    previous_request: decision.previous.map(ShortlistRequestUuid::from_uuid),
                },
            )
            .await?;

        let mut event = ShortlistEvent::new(created.uuid, "submitted", Actor::Company(company))
            .metadata(json!({
                "pricing_category": decision.category,
                "discount_percent": decision.discount_percent,
                "previous_request": decision.previous,
                "similarity": decision.similarity,
            }));
        event.new_status = Some(created.status);

        self.events.record(&mut tx, &event).await;

        tx.commit().await?;

        let span = Span::current();
        span.record("request_uuid", tracing::field::display(created.uuid));
        span.record("pricing_category", decision.category.as_str());

        info!("submitted shortlist request");

        Ok(created)
    }

    async fn get_request(
        &self,
        actor: Actor,
        request: ShortlistRequestUuid,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.requests.get_request(&mut tx, request).await?;

        tx.commit().await?;

        match actor {
            Actor::Company(company) if company != record.company => {
                Err(ShortlistsServiceError::Forbidden)
            }
            _ => Ok(record),
        }
    }

    async fn list_requests(
        &self,
        company: CompanyUuid,
    ) -> Result<Vec<ShortlistRequestRecord>, ShortlistsServiceError> {
        let mut tx = self.db.begin().await?;

        let requests = self.requests.list_company_requests(&mut tx, company).await?;

        tx.commit().await?;

        Ok(requests)
    }

    #[tracing::instrument(
        name = "shortlists.service.process",
        skip(self),
        fields(operator_uuid = %operator, request_uuid = %request, pass_number = Empty),
        err
    )]
    async fn process(
        &self,
        operator: OperatorUuid,
        request: ShortlistRequestUuid,
    ) -> Result<ProcessedShortlist, ShortlistsServiceError> {
        let now = Timestamp::now();
        let mut tx = self.db.begin().await?;

        let mut record = self.requests.lock_request(&mut tx, request).await?;
        let previous = record.status;

        // Re-running a pass while processing keeps the status.
        if previous != ShortlistStatus::Processing {
            record.status = previous.transition_to(ShortlistStatus::Processing)?;
        }

        let chain = self.follow_ups.chain_candidates(&mut tx, request).await?;
        let reincluded = self.candidates.reincluded_candidates(&mut tx, request).await?;

        let exclude: FxHashSet<Uuid> = chain
            .keys()
            .filter(|candidate| !reincluded.contains_key(*candidate))
            .map(|candidate| candidate.into_uuid())
            .collect();

        let previous_created_at = match record.previous_request {
            Some(prior) => Some(self.requests.get_request(&mut tx, prior).await?.created_at),
            None => None,
        };

        let pool = self.pool.eligible_candidates().await?;

        let options = MatchOptions {
            max_results: None,
            exclude,
            is_follow_up: record.previous_request.is_some(),
            previous_created_at,
        };

        let matches = self.engine.find_matches(&record.criteria, &pool, &options, now);

        let mut rows: Vec<NewCandidateRow> = matches
            .into_iter()
            .map(|found| {
                let candidate = found.candidate.into();
                let note = reincluded.get(&candidate);

                NewCandidateRow {
                    candidate,
                    score: found.score,
                    reason: found.reason,
                    rank: None,
                    is_new: note.is_none(),
                    previous_request: note.and_then(|note| note.previous_request),
                    reinclusion_reason: note.map(|note| note.reason.clone()),
                }
            })
            .collect();

        // Re-included candidates stay on the shortlist even when they miss the cut.
        for (candidate, note) in &reincluded {
            if rows.iter().any(|row| row.candidate == *candidate) {
                continue;
            }

            let profile = self.pool.candidate(*candidate).await?;
            let rescored = self.engine.rescore(&record.criteria, &profile, now);

            rows.push(NewCandidateRow {
                candidate: *candidate,
                score: rescored.score,
                reason: rescored.reason,
                rank: None,
                is_new: false,
                previous_request: note.previous_request,
                reinclusion_reason: Some(note.reason.clone()),
            });
        }

        rows.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.candidate.cmp(&b.candidate))
        });

        for (position, row) in rows.iter_mut().enumerate() {
            row.rank = Some(u32::try_from(position + 1)?);
        }

        let pass_number = self.candidates.current_pass(&mut tx, request).await? + 1;

        let candidates = self
            .candidates
            .insert_candidates(&mut tx, request, pass_number, &rows)
            .await?;

        let saved = self.save(&mut tx, &record, previous).await?;

        self.events
            .record(
                &mut tx,
                &ShortlistEvent::new(request, "processed", Actor::Operator(operator))
                    .transition(previous, saved.status)
                    .metadata(json!({
                        "pass_number": pass_number,
                        "candidates": candidates.len(),
                        "excluded": options.exclude.len(),
                        "pool_size": pool.len(),
                    })),
            )
            .await;

        tx.commit().await?;

        Span::current().record("pass_number", pass_number);

        info!(candidates = candidates.len(), "processed shortlist");

        Ok(ProcessedShortlist {
            request: saved,
            pass_number,
            candidates,
        })
    }

    async fn list_candidates(
        &self,
        request: ShortlistRequestUuid,
    ) -> Result<Vec<ShortlistCandidateRecord>, ShortlistsServiceError> {
        let mut tx = self.db.begin().await?;

        self.requests.get_request(&mut tx, request).await?;

        let candidates = self.candidates.latest_candidates(&mut tx, request).await?;

        tx.commit().await?;

        Ok(candidates)
    }

    #[tracing::instrument(
        name = "shortlists.service.update_candidate",
        skip(self, update),
        fields(operator_uuid = %operator, request_uuid = %request, candidate_uuid = %candidate),
        err
    )]
    async fn update_candidate(
        &self,
        operator: OperatorUuid,
        request: ShortlistRequestUuid,
        candidate: ShortlistCandidateUuid,
        update: CandidateUpdate,
    ) -> Result<ShortlistCandidateRecord, ShortlistsServiceError> {
        if update.rank == Some(0) {
            return Err(ShortlistsServiceError::Validation("rank starts at 1"));
        }

        let mut tx = self.db.begin().await?;

        let record = self.requests.lock_request(&mut tx, request).await?;
        ensure_curating(&record)?;

        let current = self
            .candidates
            .lock_candidate(&mut tx, request, candidate)
            .await?;

        if current.pass_number != self.candidates.current_pass(&mut tx, request).await? {
            return Err(ShortlistsServiceError::Validation(
                "candidate belongs to an earlier matching pass",
            ));
        }

        let updated = self
            .candidates
            .update_candidate(
                &mut tx,
                candidate,
                update.approved.unwrap_or(current.approved),
                update.rank.or(current.rank),
            )
            .await?;

        self.events
            .record(
                &mut tx,
                &ShortlistEvent::new(request, "candidate_updated", Actor::Operator(operator))
                    .metadata(json!({
                        "candidate": updated.candidate,
                        "approved": updated.approved,
                        "rank": updated.rank,
                    })),
            )
            .await;

        tx.commit().await?;

        info!(approved = updated.approved, "updated shortlist candidate");

        Ok(updated)
    }

    #[tracing::instrument(
        name = "shortlists.service.reinclude_candidate",
        skip(self, reinclusion),
        fields(
            operator_uuid = %operator,
            request_uuid = %request,
            candidate_uuid = %reinclusion.candidate,
        ),
        err
    )]
    async fn reinclude_candidate(
        &self,
        operator: OperatorUuid,
        request: ShortlistRequestUuid,
        reinclusion: Reinclusion,
    ) -> Result<ShortlistCandidateRecord, ShortlistsServiceError> {
        let reason = required_note(&reinclusion.reason, "a re-inclusion reason is required")?;
        let now = Timestamp::now();

        let mut tx = self.db.begin().await?;

        let record = self.requests.lock_request(&mut tx, request).await?;
        ensure_curating(&record)?;

        let chain = self.follow_ups.chain_candidates(&mut tx, request).await?;

        let previous_request = *chain.get(&reinclusion.candidate).ok_or(
            ShortlistsServiceError::Validation(
                "candidate was not recommended on an earlier shortlist",
            ),
        )?;

        let profile = self.pool.candidate(reinclusion.candidate).await?;
        let rescored = self.engine.rescore(&record.criteria, &profile, now);

        let pass_number = self.candidates.current_pass(&mut tx, request).await?.max(1);

        let inserted = self
            .candidates
            .insert_candidates(
                &mut tx,
                request,
                pass_number,
                &[NewCandidateRow {
                    candidate: reinclusion.candidate,
                    score: rescored.score,
                    reason: rescored.reason,
                    rank: None,
                    is_new: false,
                    previous_request: Some(previous_request),
                    reinclusion_reason: Some(reason.clone()),
                }],
            )
            .await?
            .into_iter()
            .next()
            .ok_or(ShortlistsServiceError::MissingRequiredData)?;

        self.events
            .record(
                &mut tx,
                &ShortlistEvent::new(request, "candidate_reincluded", Actor::Operator(operator))
                    .metadata(json!({
                        "candidate": reinclusion.candidate,
                        "previous_request": previous_request,
                        "reason": reason,
                    })),
            )
            .await;

        tx.commit().await?;

        info!("re-included candidate");

        Ok(inserted)
    }

    async fn suggest_price(
        &self,
        request: ShortlistRequestUuid,
    ) -> Result<PriceQuote, ShortlistsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.requests.get_request(&mut tx, request).await?;
        let approved_candidates = self.candidates.count_approved(&mut tx, request).await?;

        tx.commit().await?;

        Ok(PriceQuote {
            approved_candidates,
            suggestion: suggest_price(PriceInputs {
                seniority: record.criteria.seniority,
                approved_candidates,
                rare_profile: record.rare_profile,
            }),
            discount_percent: record.follow_up_discount_percent,
        })
    }

    #[tracing::instrument(
        name = "shortlists.service.propose_scope",
        skip(self),
        fields(operator_uuid = %operator, request_uuid = %request),
        err
    )]
    async fn propose_scope(
        &self,
        operator: OperatorUuid,
        request: ShortlistRequestUuid,
        scope: ProposedScope,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError> {
        if scope.price == 0 {
            return Err(ShortlistsServiceError::Validation("price must be positive"));
        }

        if scope.candidate_count == 0 {
            return Err(ShortlistsServiceError::Validation(
                "candidate count must be positive",
            ));
        }

        let mut tx = self.db.begin().await?;

        let mut record = self.requests.lock_request(&mut tx, request).await?;
        let previous = record.status;

        record.status = previous.transition_to(ShortlistStatus::PricingPending)?;
        record.proposed_price = Some(scope.price);
        record.proposed_candidate_count = Some(scope.candidate_count);

        let saved = self.save(&mut tx, &record, previous).await?;

        self.events
            .record(
                &mut tx,
                &ShortlistEvent::new(request, "scope_proposed", Actor::Operator(operator))
                    .transition(previous, saved.status)
                    .metadata(json!({
                        "price": scope.price,
                        "candidate_count": scope.candidate_count,
                    })),
            )
            .await;

        let mut payload = notification_payload(&saved);
        payload["price"] = json!(scope.price);
        payload["currency"] = json!(saved.currency);
        payload["candidate_count"] = json!(scope.candidate_count);
        payload["discount_percent"] = json!(saved.follow_up_discount_percent);

        self.outbox
            .enqueue(&mut tx, NotificationKind::PricingReady, request, payload)
            .await;

        tx.commit().await?;

        info!(price = scope.price, "proposed shortlist scope");

        Ok(saved)
    }

    #[tracing::instrument(
        name = "shortlists.service.approve_pricing",
        skip(self),
        fields(company_uuid = %company, request_uuid = %request, approved_price = Empty),
        err
    )]
    async fn approve_pricing(
        &self,
        company: CompanyUuid,
        request: ShortlistRequestUuid,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError> {
        let mut tx = self.db.begin().await?;

        let mut record = self
            .lock_for(&mut tx, Actor::Company(company), request)
            .await?;
        let previous = record.status;

        record.status = previous.transition_to(ShortlistStatus::PricingApproved)?;

        let proposed = record
            .proposed_price
            .ok_or(ShortlistsServiceError::Validation("no price has been proposed"))?;

        let approved = match record.pricing_category {
            PricingCategory::FreeRegen => 0,
            PricingCategory::New | PricingCategory::FollowUp => {
                discounted(proposed, record.follow_up_discount_percent)?
            }
        };

        record.approved_price = Some(approved);

        let saved = self.save(&mut tx, &record, previous).await?;

        self.events
            .record(
                &mut tx,
                &ShortlistEvent::new(request, "pricing_approved", Actor::Company(company))
                    .transition(previous, saved.status)
                    .metadata(json!({
                        "proposed_price": proposed,
                        "approved_price": approved,
                        "discount_percent": saved.follow_up_discount_percent,
                    })),
            )
            .await;

        // Free regenerations settle by hand; there is nothing to authorize.
        if approved > 0 {
            let mut payload = notification_payload(&saved);
            payload["amount"] = json!(approved);
            payload["currency"] = json!(saved.currency);

            self.outbox
                .enqueue(&mut tx, NotificationKind::AuthorizationRequired, request, payload)
                .await;
        }

        tx.commit().await?;

        Span::current().record("approved_price", approved);

        info!("approved shortlist pricing");

        Ok(saved)
    }

    #[tracing::instrument(
        name = "shortlists.service.decline_pricing",
        skip(self, reason),
        fields(company_uuid = %company, request_uuid = %request),
        err
    )]
    async fn decline_pricing(
        &self,
        company: CompanyUuid,
        request: ShortlistRequestUuid,
        reason: String,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError> {
        let reason = required_note(&reason, "a reason is required to decline pricing")?;

        let mut tx = self.db.begin().await?;

        let mut record = self
            .lock_for(&mut tx, Actor::Company(company), request)
            .await?;
        let previous = record.status;

        if previous != ShortlistStatus::PricingPending {
            return Err(ShortlistsServiceError::Validation(
                "only pending pricing can be declined",
            ));
        }

        record.status = previous.transition_to(ShortlistStatus::Processing)?;
        record.pricing_decline_reason = Some(reason.clone());

        let saved = self.save(&mut tx, &record, previous).await?;

        self.events
            .record(
                &mut tx,
                &ShortlistEvent::new(request, "pricing_declined", Actor::Company(company))
                    .transition(previous, saved.status)
                    .metadata(json!({ "reason": reason })),
            )
            .await;

        let mut payload = notification_payload(&saved);
        payload["reason"] = json!(reason);

        self.outbox
            .enqueue(&mut tx, NotificationKind::PricingDeclined, request, payload)
            .await;

        tx.commit().await?;

        info!("declined shortlist pricing");

        Ok(saved)
    }

    #[tracing::instrument(
        name = "shortlists.service.mark_paid",
        skip(self),
        fields(operator_uuid = %operator, request_uuid = %request),
        err
    )]
    async fn mark_paid(
        &self,
        operator: OperatorUuid,
        request: ShortlistRequestUuid,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError> {
        let mut tx = self.db.begin().await?;

        let mut record = self.requests.lock_request(&mut tx, request).await?;
        let previous = record.status;

        record.status = previous.transition_to(ShortlistStatus::Authorized)?;

        if let Some(payment) = record.payment {
            let payment = self.payments.get_payment(&mut tx, payment).await?;

            if matches!(
                payment.status,
                PaymentStatus::PendingApproval | PaymentStatus::Authorized
            ) {
                return Err(PaymentsServiceError::PaymentAlreadyActive.into());
            }

            record.payment = None;
        }

        let now = Timestamp::now();
        record.payment_confirmed_by = Some(operator);
        record.payment_confirmed_at = Some(now);

        let saved = self.save(&mut tx, &record, previous).await?;

        self.events
            .record(
                &mut tx,
                &ShortlistEvent::new(request, "payment_confirmed_manually", Actor::Operator(operator))
                    .transition(previous, saved.status)
                    .metadata(json!({ "approved_price": saved.approved_price })),
            )
            .await;

        tx.commit().await?;

        info!("marked shortlist as paid");

        Ok(saved)
    }

    #[tracing::instrument(
        name = "shortlists.service.deliver",
        skip(self),
        fields(operator_uuid = %operator, request_uuid = %request),
        err
    )]
    async fn deliver(
        &self,
        operator: OperatorUuid,
        request: ShortlistRequestUuid,
        delivery: Delivery,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError> {
        let mut tx = self.db.begin().await?;

        let mut record = self.requests.lock_request(&mut tx, request).await?;
        let previous = record.status;

        record.status = previous.transition_to(ShortlistStatus::Delivered)?;

        if let (Some(price), Some(payment)) = (delivery.price_override, record.payment) {
            let payment = self.payments.get_payment(&mut tx, payment).await?;

            if price > payment.amount_authorized {
                return Err(ShortlistsServiceError::Validation(
                    "price override exceeds the authorized amount",
                ));
            }
        }

        let requested = record
            .proposed_candidate_count
            .ok_or(ShortlistsServiceError::MissingRequiredData)?;
        let delivered = self.candidates.count_approved(&mut tx, request).await?;

        record.requested_candidate_count = Some(requested);
        record.delivered_candidate_count = Some(delivered);
        record.final_price = delivery.price_override;
        record.delivered_at = Some(Timestamp::now());

        let saved = self.save(&mut tx, &record, previous).await?;

        self.events
            .record(
                &mut tx,
                &ShortlistEvent::new(request, "delivered", Actor::Operator(operator))
                    .transition(previous, saved.status)
                    .metadata(json!({
                        "requested_candidates": requested,
                        "delivered_candidates": delivered,
                        "price_override": delivery.price_override,
                    })),
            )
            .await;

        let mut payload = notification_payload(&saved);
        payload["delivered_candidates"] = json!(delivered);

        self.outbox
            .enqueue(&mut tx, NotificationKind::Delivered, request, payload)
            .await;

        tx.commit().await?;

        info!(
            delivered,
            requested,
            "delivered shortlist"
        );

        Ok(saved)
    }

    #[tracing::instrument(
        name = "shortlists.service.decide_outcome",
        skip(self, input),
        fields(operator_uuid = %operator, request_uuid = %request, outcome = %input.outcome),
        err
    )]
    async fn decide_outcome(
        &self,
        operator: OperatorUuid,
        request: ShortlistRequestUuid,
        input: OutcomeInput,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.requests.lock_request(&mut tx, request).await?;
        ensure_open(&record)?;

        let decision = OutcomeDecision::decide(record.outcome, input.outcome, &input.reason)?;

        if matches!(
            decision.outcome(),
            ShortlistOutcome::Delivered | ShortlistOutcome::Partial
        ) && record.status != ShortlistStatus::Delivered
        {
            return Err(ShortlistsServiceError::Validation(
                "only a delivered shortlist can be fulfilled",
            ));
        }

        self.close(
            tx,
            record,
            decision,
            input.partial,
            Actor::Operator(operator),
            None,
        )
        .await
    }

    async fn mark_no_match(
        &self,
        operator: OperatorUuid,
        request: ShortlistRequestUuid,
        reason: String,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError> {
        self.decide_outcome(
            operator,
            request,
            OutcomeInput {
                outcome: ShortlistOutcome::NoMatch,
                reason,
                partial: None,
            },
        )
        .await
    }

    #[tracing::instrument(
        name = "shortlists.service.suggest_adjustment",
        skip(self, note),
        fields(operator_uuid = %operator, request_uuid = %request),
        err
    )]
    async fn suggest_adjustment(
        &self,
        operator: OperatorUuid,
        request: ShortlistRequestUuid,
        note: String,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError> {
        let note = required_note(&note, "an adjustment note is required")?;

        let mut tx = self.db.begin().await?;

        let record = self.requests.lock_request(&mut tx, request).await?;
        ensure_open(&record)?;

        self.events
            .record(
                &mut tx,
                &ShortlistEvent::new(request, "adjustment_suggested", Actor::Operator(operator))
                    .metadata(json!({ "note": note })),
            )
            .await;

        let mut payload = notification_payload(&record);
        payload["note"] = json!(note);

        self.outbox
            .enqueue(&mut tx, NotificationKind::AdjustmentSuggested, request, payload)
            .await;

        tx.commit().await?;

        info!("suggested shortlist adjustment");

        Ok(record)
    }

    #[tracing::instrument(
        name = "shortlists.service.extend_search",
        skip(self, note),
        fields(operator_uuid = %operator, request_uuid = %request),
        err
    )]
    async fn extend_search(
        &self,
        operator: OperatorUuid,
        request: ShortlistRequestUuid,
        note: String,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError> {
        let note = required_note(&note, "a note is required to extend the search")?;

        let mut tx = self.db.begin().await?;

        let record = self.requests.lock_request(&mut tx, request).await?;
        ensure_open(&record)?;

        self.events
            .record(
                &mut tx,
                &ShortlistEvent::new(request, "search_extended", Actor::Operator(operator))
                    .metadata(json!({ "note": note })),
            )
            .await;

        let mut payload = notification_payload(&record);
        payload["note"] = json!(note);

        self.outbox
            .enqueue(&mut tx, NotificationKind::SearchExtended, request, payload)
            .await;

        tx.commit().await?;

        info!("extended shortlist search");

        Ok(record)
    }

    #[tracing::instrument(
        name = "shortlists.service.cancel",
        skip(self, reason),
        fields(actor_type = actor.kind(), request_uuid = %request),
        err
    )]
    async fn cancel(
        &self,
        actor: Actor,
        request: ShortlistRequestUuid,
        reason: String,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError> {
        let reason = required_note(&reason, "a cancellation reason is required")?;

        let mut tx = self.db.begin().await?;

        let record = self.lock_for(&mut tx, actor, request).await?;

        record.status.transition_to(ShortlistStatus::Cancelled)?;

        let decision =
            OutcomeDecision::decide(record.outcome, ShortlistOutcome::Cancelled, &reason)?;

        self.close(tx, record, decision, None, actor, Some(reason))
            .await
    }

    #[tracing::instrument(
        name = "shortlists.service.resolve_settlement",
        skip(self, resolution),
        fields(operator_uuid = %operator, request_uuid = %request),
        err
    )]
    async fn resolve_settlement(
        &self,
        operator: OperatorUuid,
        request: ShortlistRequestUuid,
        resolution: SettlementResolution,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError> {
        let note = required_note(&resolution.note, "a resolution note is required")?;

        let mut tx = self.db.begin().await?;

        let mut record = self.requests.lock_request(&mut tx, request).await?;
        ensure_open(&record)?;

        let outcome = record.outcome;

        if !outcome.is_terminal() {
            return Err(ShortlistsServiceError::Validation(
                "no outcome has been decided for this shortlist",
            ));
        }

        let previous = record.status;
        let next = previous.transition_to(closing_status(previous))?;

        let terms = settlement_terms(&record, outcome, resolution.partial);

        let mut finalized = match record.payment {
            Some(payment) => Some(
                self.settler
                    .resolve(&mut tx, payment, outcome, terms.as_ref(), &note)
                    .await?,
            ),
            None => None,
        };

        if let Some(error) = finalized.as_mut().and_then(|finalized| finalized.failure.take()) {
            tx.commit().await?;

            return Err(PaymentsServiceError::Provider(error).into());
        }

        record.status = next;

        let saved = self.save(&mut tx, &record, previous).await?;

        self.events
            .record(
                &mut tx,
                &ShortlistEvent::new(request, "settlement_resolved", Actor::Operator(operator))
                    .transition(previous, next)
                    .metadata(json!({
                        "outcome": outcome,
                        "note": note,
                        "payment": finalized.as_ref().map(|finalized| finalized.payment.uuid),
                        "payment_status": finalized.as_ref().map(|finalized| finalized.payment.status),
                    })),
            )
            .await;

        if let Some(kind) = closing_notification(outcome) {
            let mut payload = notification_payload(&saved);
            payload["outcome"] = json!(outcome);
            payload["amount_captured"] =
                json!(finalized.as_ref().map(|finalized| finalized.payment.amount_captured));

            self.outbox.enqueue(&mut tx, kind, saved.uuid, payload).await;
        }

        tx.commit().await?;

        info!(outcome = %outcome, status = %saved.status, "resolved shortlist settlement");

        Ok(saved)
    }

    #[tracing::instrument(
        name = "shortlists.service.archive",
        skip(self),
        fields(operator_uuid = %operator, request_uuid = %request),
        err
    )]
    async fn archive(
        &self,
        operator: OperatorUuid,
        request: ShortlistRequestUuid,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError> {
        let mut tx = self.db.begin().await?;

        let mut record = self.requests.lock_request(&mut tx, request).await?;

        if !record.status.is_terminal() {
            return Err(ShortlistsServiceError::Validation(
                "only closed shortlists can be archived",
            ));
        }

        if record.archived_at.is_some() {
            tx.commit().await?;

            return Ok(record);
        }

        record.archived_at = Some(Timestamp::now());

        let saved = self.save(&mut tx, &record, record.status).await?;

        self.events
            .record(
                &mut tx,
                &ShortlistEvent::new(request, "archived", Actor::Operator(operator)),
            )
            .await;

        tx.commit().await?;

        info!("archived shortlist");

        Ok(saved)
    }

    async fn events(
        &self,
        actor: Actor,
        request: ShortlistRequestUuid,
    ) -> Result<Vec<ShortlistEventRecord>, ShortlistsServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.requests.get_request(&mut tx, request).await?;

        if let Actor::Company(company) = actor
            && company != record.company
        {
            return Err(ShortlistsServiceError::Forbidden);
        }

        let events = self.events.list_events(&mut tx, request).await?;

        tx.commit().await?;

        Ok(events)
    }
}

#[automock]
#[async_trait]
pub trait ShortlistsService: Send + Sync {
    /// Creates a request in `submitted`, classifying it as new, follow-up or free regeneration.
    async fn submit(
        &self,
        company: CompanyUuid,
        request: NewShortlistRequest,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError>;

    async fn get_request(
        &self,
        actor: Actor,
        request: ShortlistRequestUuid,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError>;

    /// The company's requests, newest first, without archived ones.
    async fn list_requests(
        &self,
        company: CompanyUuid,
    ) -> Result<Vec<ShortlistRequestRecord>, ShortlistsServiceError>;

    /// Runs a matching pass and stores its ranked candidates.
    async fn process(
        &self,
        operator: OperatorUuid,
        request: ShortlistRequestUuid,
    ) -> Result<ProcessedShortlist, ShortlistsServiceError>;

    /// Candidates of the latest matching pass.
    async fn list_candidates(
        &self,
        request: ShortlistRequestUuid,
    ) -> Result<Vec<ShortlistCandidateRecord>, ShortlistsServiceError>;

    /// Approves, unapproves or re-ranks a candidate.
    async fn update_candidate(
        &self,
        operator: OperatorUuid,
        request: ShortlistRequestUuid,
        candidate: ShortlistCandidateUuid,
        update: CandidateUpdate,
    ) -> Result<ShortlistCandidateRecord, ShortlistsServiceError>;

    /// Brings back a candidate recommended on an earlier request of the follow-up chain.
    async fn reinclude_candidate(
        &self,
        operator: OperatorUuid,
        request: ShortlistRequestUuid,
        reinclusion: Reinclusion,
    ) -> Result<ShortlistCandidateRecord, ShortlistsServiceError>;

    async fn suggest_price(
        &self,
        request: ShortlistRequestUuid,
    ) -> Result<PriceQuote, ShortlistsServiceError>;

    async fn propose_scope(
        &self,
        operator: OperatorUuid,
        request: ShortlistRequestUuid,
        scope: ProposedScope,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError>;

    /// Accepts the proposed price less the follow-up discount.
    async fn approve_pricing(
        &self,
        company: CompanyUuid,
        request: ShortlistRequestUuid,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError>;

    async fn decline_pricing(
        &self,
        company: CompanyUuid,
        request: ShortlistRequestUuid,
        reason: String,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError>;

    /// Records an out-of-band payment.
    async fn mark_paid(
        &self,
        operator: OperatorUuid,
        request: ShortlistRequestUuid,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError>;

    async fn deliver(
        &self,
        operator: OperatorUuid,
        request: ShortlistRequestUuid,
        delivery: Delivery,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError>;

    /// Decides the outcome once and settles the payment accordingly.
    async fn decide_outcome(
        &self,
        operator: OperatorUuid,
        request: ShortlistRequestUuid,
        input: OutcomeInput,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError>;

    async fn mark_no_match(
        &self,
        operator: OperatorUuid,
        request: ShortlistRequestUuid,
        reason: String,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError>;

    async fn suggest_adjustment(
        &self,
        operator: OperatorUuid,
        request: ShortlistRequestUuid,
        note: String,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError>;

    async fn extend_search(
        &self,
        operator: OperatorUuid,
        request: ShortlistRequestUuid,
        note: String,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError>;

    /// Cancels the request and releases any held funds.
    async fn cancel(
        &self,
        actor: Actor,
        request: ShortlistRequestUuid,
        reason: String,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError>;

    /// Closes a request whose outcome is decided but whose settlement the provider rejected.
    ///
    /// Retries a payment that is still authorized. A failed payment stays failed and the note is
    /// audited as a manual resolution.
    async fn resolve_settlement(
        &self,
        operator: OperatorUuid,
        request: ShortlistRequestUuid,
        resolution: SettlementResolution,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError>;

    /// Hides a closed request from history lookups. Requests are never deleted.
    async fn archive(
        &self,
        operator: OperatorUuid,
        request: ShortlistRequestUuid,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError>;

    async fn events(
        &self,
        actor: Actor,
        request: ShortlistRequestUuid,
    ) -> Result<Vec<ShortlistEventRecord>, ShortlistsServiceError>;
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use shortlist::{lifecycle::OutcomeError, payments::PaymentStatus};
    use testresult::TestResult;

    use crate::{
        domain::{
            notifications::{NotificationKind, repository::PgOutboxRepository},
            payments::{PaymentsService, data::NewAuthorization},
            shortlists::records::ShortlistRequestRecord,
        },
        test::{ProviderCall, TestContext, new_request},
    };

    use super::*;

    async fn notifications(
        ctx: &TestContext,
        request: ShortlistRequestUuid,
    ) -> TestResult<Vec<NotificationKind>> {
        let mut tx = ctx.db.begin_test_transaction().await;

        let messages = PgOutboxRepository::new()
            .list_for_request(&mut tx, request)
            .await?;

        Ok(messages.into_iter().map(|message| message.kind).collect())
    }

    async fn linked_request(
        ctx: &TestContext,
        previous: ShortlistRequestUuid,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError> {
        ctx.shortlists
            .submit(
                ctx.company,
                NewShortlistRequest {
                    previous_request: Some(previous),
                    ..new_request("Backend Engineer", &["Rust"])
                },
            )
            .await
    }

    fn resolution(note: &str) -> SettlementResolution {
        SettlementResolution {
            note: note.to_string(),
            partial: None,
        }
    }

    fn outcome(outcome: ShortlistOutcome, reason: &str) -> OutcomeInput {
        OutcomeInput {
            outcome,
            reason: reason.to_string(),
            partial: None,
        }
    }

    #[test]
    fn currency_is_normalised_and_defaulted() -> TestResult {
        assert_eq!(normalise_currency(None)?, "USD");
        assert_eq!(normalise_currency(Some(" eur "))?, "EUR");

        for invalid in ["", "EURO", "E1R", "€€€"] {
            assert!(
                matches!(
                    normalise_currency(Some(invalid)),
                    Err(ShortlistsServiceError::Validation(_))
                ),
                "{invalid:?}"
            );
        }

        Ok(())
    }

    #[tokio::test]
    async fn submit_records_a_new_request() -> TestResult {
        let ctx = TestContext::new().await;

        let request = ctx.submit_request("  Backend Engineer ", &["Rust", "rust"]).await?;

        assert_eq!(request.status, ShortlistStatus::Submitted);
        assert_eq!(request.outcome, ShortlistOutcome::Pending);
        assert_eq!(request.currency, "USD");
        assert_eq!(request.pricing_category, PricingCategory::New);
        assert_eq!(request.criteria.role_title, "Backend Engineer");
        assert_eq!(request.criteria.tech_stack, vec!["Rust"]);

        let events = ctx.shortlists.events(Actor::System, request.uuid).await?;

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "submitted");
        assert_eq!(events[0].new_status, Some(ShortlistStatus::Submitted));
        assert!(notifications(&ctx, request.uuid).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn linked_requests_get_the_follow_up_discount() -> TestResult {
        let ctx = TestContext::new().await;
        let first = ctx.submit_request("Backend Engineer", &["Rust"]).await?;

        let second = linked_request(&ctx, first.uuid).await?;

        assert_eq!(second.pricing_category, PricingCategory::FollowUp);
        assert_eq!(second.follow_up_discount_percent, Decimal::from(30));
        assert_eq!(second.previous_request, Some(first.uuid));

        ctx.priced_request(second.uuid, 10_000).await?;

        let approved = ctx.shortlists.approve_pricing(ctx.company, second.uuid).await?;

        assert_eq!(approved.approved_price, Some(7_000));
        assert_eq!(
            notifications(&ctx, second.uuid).await?,
            vec![NotificationKind::PricingReady, NotificationKind::AuthorizationRequired]
        );

        Ok(())
    }

    #[tokio::test]
    async fn follow_ups_of_unmatched_requests_are_free() -> TestResult {
        let ctx = TestContext::new().await;
        let first = ctx.submit_request("Backend Engineer", &["Rust"]).await?;

        ctx.shortlists
            .mark_no_match(ctx.operator, first.uuid, "no one available".to_string())
            .await?;

        let second = linked_request(&ctx, first.uuid).await?;

        assert_eq!(second.pricing_category, PricingCategory::FreeRegen);

        ctx.priced_request(second.uuid, 10_000).await?;

        let approved = ctx.shortlists.approve_pricing(ctx.company, second.uuid).await?;

        assert_eq!(approved.approved_price, Some(0));
        assert!(
            !notifications(&ctx, second.uuid)
                .await?
                .contains(&NotificationKind::AuthorizationRequired)
        );

        let paid = ctx.shortlists.mark_paid(ctx.operator, second.uuid).await?;

        assert_eq!(paid.status, ShortlistStatus::Authorized);
        assert_eq!(paid.payment_confirmed_by, Some(ctx.operator));

        Ok(())
    }

    #[tokio::test]
    async fn links_to_other_companies_are_rejected() -> TestResult {
        let ctx = TestContext::new().await;

        let foreign = ctx
            .shortlists
            .submit(CompanyUuid::new(), new_request("Backend Engineer", &["Rust"]))
            .await?;

        let result = linked_request(&ctx, foreign.uuid).await;

        assert!(matches!(result, Err(ShortlistsServiceError::InvalidReference)));

        Ok(())
    }

    #[tokio::test]
    async fn process_ranks_matching_candidates() -> TestResult {
        let ctx = TestContext::new().await;

        ctx.seed_candidate("Backend Engineer", &["Rust"]).await;
        ctx.seed_candidate("Backend Engineer", &["Rust", "Postgres"]).await;

        let request = ctx.submit_request("Backend Engineer", &["Rust"]).await?;

        let processed = ctx.shortlists.process(ctx.operator, request.uuid).await?;

        assert_eq!(processed.request.status, ShortlistStatus::Processing);
        assert_eq!(processed.pass_number, 1);
        assert_eq!(processed.candidates.len(), 2);
        assert!(processed.candidates.iter().all(|candidate| candidate.is_new));
        assert_eq!(
            processed
                .candidates
                .iter()
                .map(|candidate| candidate.rank)
                .collect::<Vec<_>>(),
            vec![Some(1), Some(2)]
        );

        let again = ctx.shortlists.process(ctx.operator, request.uuid).await?;

        assert_eq!(again.pass_number, 2);
        assert_eq!(ctx.shortlists.list_candidates(request.uuid).await?.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn follow_ups_exclude_earlier_candidates_until_reincluded() -> TestResult {
        let ctx = TestContext::new().await;
        let returning = ctx.seed_candidate("Backend Engineer", &["Rust"]).await;

        let first = ctx.submit_request("Backend Engineer", &["Rust"]).await?;
        ctx.shortlists.process(ctx.operator, first.uuid).await?;

        let second = linked_request(&ctx, first.uuid).await?;
        let processed = ctx.shortlists.process(ctx.operator, second.uuid).await?;

        assert!(processed.candidates.is_empty());

        let blank = ctx
            .shortlists
            .reinclude_candidate(
                ctx.operator,
                second.uuid,
                Reinclusion {
                    candidate: returning,
                    reason: "  ".to_string(),
                },
            )
            .await;

        assert!(matches!(blank, Err(ShortlistsServiceError::Validation(_))));

        let reincluded = ctx
            .shortlists
            .reinclude_candidate(
                ctx.operator,
                second.uuid,
                Reinclusion {
                    candidate: returning,
                    reason: "client asked for them again".to_string(),
                },
            )
            .await?;

        assert!(!reincluded.is_new);
        assert_eq!(reincluded.previous_request, Some(first.uuid));

        let rerun = ctx.shortlists.process(ctx.operator, second.uuid).await?;

        assert_eq!(rerun.candidates.len(), 1);
        assert_eq!(rerun.candidates[0].candidate, returning);
        assert!(!rerun.candidates[0].is_new);
        assert_eq!(
            rerun.candidates[0].reinclusion_reason.as_deref(),
            Some("client asked for them again")
        );

        Ok(())
    }

    #[tokio::test]
    async fn candidates_are_curated_only_while_processing() -> TestResult {
        let ctx = TestContext::new().await;
        ctx.seed_candidate("Backend Engineer", &["Rust"]).await;

        let request = ctx.submit_request("Backend Engineer", &["Rust"]).await?;
        let processed = ctx.shortlists.process(ctx.operator, request.uuid).await?;
        let candidate = processed.candidates[0].uuid;

        let zero = ctx
            .shortlists
            .update_candidate(
                ctx.operator,
                request.uuid,
                candidate,
                CandidateUpdate {
                    approved: None,
                    rank: Some(0),
                },
            )
            .await;

        assert!(matches!(zero, Err(ShortlistsServiceError::Validation(_))));

        let approved = ctx
            .shortlists
            .update_candidate(
                ctx.operator,
                request.uuid,
                candidate,
                CandidateUpdate {
                    approved: Some(true),
                    rank: None,
                },
            )
            .await?;

        assert!(approved.approved);
        assert_eq!(approved.rank, Some(1));
        assert_eq!(
            ctx.shortlists.suggest_price(request.uuid).await?.approved_candidates,
            1
        );

        ctx.shortlists
            .propose_scope(
                ctx.operator,
                request.uuid,
                ProposedScope {
                    price: 5_000,
                    candidate_count: 1,
                },
            )
            .await?;
        ctx.shortlists.approve_pricing(ctx.company, request.uuid).await?;

        let late = ctx
            .shortlists
            .update_candidate(ctx.operator, request.uuid, candidate, CandidateUpdate::default())
            .await;

        assert!(matches!(
            late,
            Err(ShortlistsServiceError::NotCurating(ShortlistStatus::PricingApproved))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn declined_pricing_returns_to_processing() -> TestResult {
        let ctx = TestContext::new().await;
        let request = ctx.submit_request("Backend Engineer", &["Rust"]).await?.uuid;

        ctx.priced_request(request, 8_000).await?;

        let foreign = ctx
            .shortlists
            .decline_pricing(CompanyUuid::new(), request, "too expensive".to_string())
            .await;

        assert!(matches!(foreign, Err(ShortlistsServiceError::Forbidden)));

        let declined = ctx
            .shortlists
            .decline_pricing(ctx.company, request, "too expensive".to_string())
            .await?;

        assert_eq!(declined.status, ShortlistStatus::Processing);
        assert_eq!(declined.pricing_decline_reason.as_deref(), Some("too expensive"));
        assert!(
            notifications(&ctx, request)
                .await?
                .contains(&NotificationKind::PricingDeclined)
        );

        Ok(())
    }

    #[tokio::test]
    async fn delivered_outcome_captures_the_hold() -> TestResult {
        let ctx = TestContext::new().await;
        let (request, payment) = ctx.authorized_request(12_000).await?;

        assert_eq!(request.status, ShortlistStatus::Authorized);

        let excessive = ctx
            .shortlists
            .deliver(
                ctx.operator,
                request.uuid,
                Delivery {
                    price_override: Some(12_001),
                },
            )
            .await;

        assert!(matches!(excessive, Err(ShortlistsServiceError::Validation(_))));

        ctx.shortlists
            .deliver(
                ctx.operator,
                request.uuid,
                Delivery {
                    price_override: None,
                },
            )
            .await?;

        let completed = ctx
            .shortlists
            .decide_outcome(
                ctx.operator,
                request.uuid,
                outcome(ShortlistOutcome::Delivered, "all hired"),
            )
            .await?;

        assert_eq!(completed.status, ShortlistStatus::Completed);
        assert_eq!(completed.outcome, ShortlistOutcome::Delivered);

        let settled = ctx.payments.get_payment(payment.uuid).await?;

        assert_eq!(settled.status, PaymentStatus::Captured);
        assert_eq!(settled.amount_captured, 12_000);
        assert!(ctx.provider.calls().contains(&ProviderCall::CaptureFull {
            reference: format!("hold_{}", payment.uuid),
            amount: 12_000,
        }));

        let twice = ctx
            .shortlists
            .decide_outcome(
                ctx.operator,
                request.uuid,
                outcome(ShortlistOutcome::NoMatch, "changed mind"),
            )
            .await;

        assert!(matches!(twice, Err(ShortlistsServiceError::TerminalStatus(_))));

        Ok(())
    }

    #[tokio::test]
    async fn delivery_counts_the_proposal_and_approved_candidates() -> TestResult {
        let ctx = TestContext::new().await;
        ctx.seed_candidate("Backend Engineer", &["Rust"]).await;
        ctx.seed_candidate("Backend Engineer", &["Rust", "Postgres"]).await;

        let request = ctx.submit_request("Backend Engineer", &["Rust"]).await?;
        let processed = ctx.shortlists.process(ctx.operator, request.uuid).await?;

        assert_eq!(processed.candidates.len(), 2);

        ctx.shortlists
            .update_candidate(
                ctx.operator,
                request.uuid,
                processed.candidates[0].uuid,
                CandidateUpdate {
                    approved: Some(true),
                    rank: None,
                },
            )
            .await?;
        ctx.shortlists
            .propose_scope(
                ctx.operator,
                request.uuid,
                ProposedScope {
                    price: 8_000,
                    candidate_count: 2,
                },
            )
            .await?;
        ctx.shortlists.approve_pricing(ctx.company, request.uuid).await?;

        let payment = ctx
            .payments
            .authorize(
                ctx.company,
                NewAuthorization {
                    request: request.uuid,
                    provider: None,
                },
            )
            .await?;

        ctx.provider.confirm_holds();
        ctx.payments.confirm(ctx.company, payment.uuid).await?;

        let delivered = ctx
            .shortlists
            .deliver(ctx.operator, request.uuid, Delivery::default())
            .await?;

        assert_eq!(delivered.status, ShortlistStatus::Delivered);
        assert_eq!(delivered.requested_candidate_count, Some(2));
        assert_eq!(delivered.delivered_candidate_count, Some(1));
        assert_eq!(delivered.final_price, None);

        Ok(())
    }

    #[tokio::test]
    async fn partial_outcome_captures_the_delivery_price() -> TestResult {
        let ctx = TestContext::new().await;
        let (request, payment) = ctx.authorized_request(10_000).await?;

        ctx.shortlists
            .deliver(
                ctx.operator,
                request.uuid,
                Delivery {
                    price_override: Some(6_000),
                },
            )
            .await?;

        ctx.shortlists
            .decide_outcome(
                ctx.operator,
                request.uuid,
                outcome(ShortlistOutcome::Partial, "two of four delivered"),
            )
            .await?;

        let settled = ctx.payments.get_payment(payment.uuid).await?;

        assert_eq!(settled.status, PaymentStatus::Partial);
        assert_eq!(settled.amount_captured, 6_000);

        Ok(())
    }

    #[tokio::test]
    async fn fulfilment_requires_delivery() -> TestResult {
        let ctx = TestContext::new().await;
        let (request, _) = ctx.authorized_request(10_000).await?;

        let result = ctx
            .shortlists
            .decide_outcome(
                ctx.operator,
                request.uuid,
                outcome(ShortlistOutcome::Delivered, "too early"),
            )
            .await;

        assert!(matches!(result, Err(ShortlistsServiceError::Validation(_))));

        Ok(())
    }

    #[tokio::test]
    async fn cancel_releases_the_hold() -> TestResult {
        let ctx = TestContext::new().await;
        let (request, payment) = ctx.authorized_request(10_000).await?;

        let cancelled = ctx
            .shortlists
            .cancel(Actor::Company(ctx.company), request.uuid, "role filled".to_string())
            .await?;

        assert_eq!(cancelled.status, ShortlistStatus::Cancelled);
        assert_eq!(cancelled.outcome, ShortlistOutcome::Cancelled);
        assert_eq!(cancelled.cancellation_reason.as_deref(), Some("role filled"));
        assert_eq!(
            ctx.payments.get_payment(payment.uuid).await?.status,
            PaymentStatus::Released
        );

        Ok(())
    }

    #[tokio::test]
    async fn rejected_release_is_resolved_manually() -> TestResult {
        let ctx = TestContext::new().await;
        let (request, payment) = ctx.authorized_request(10_000).await?;

        ctx.provider.fail_settlements();

        let result = ctx
            .shortlists
            .cancel(Actor::Operator(ctx.operator), request.uuid, "duplicate".to_string())
            .await;

        assert!(matches!(
            result,
            Err(ShortlistsServiceError::Payment(PaymentsServiceError::Provider(_)))
        ));

        let stored = ctx.shortlists.get_request(Actor::System, request.uuid).await?;

        assert_eq!(stored.status, ShortlistStatus::Authorized);
        assert_eq!(stored.outcome, ShortlistOutcome::Cancelled);
        assert_eq!(
            ctx.payments.get_payment(payment.uuid).await?.status,
            PaymentStatus::Failed
        );

        let trail = ctx.payments.audit_trail(payment.uuid).await?;

        assert_eq!(
            trail.last().map(|entry| entry.action.as_str()),
            Some("release_failed")
        );

        let again = ctx
            .shortlists
            .cancel(Actor::Operator(ctx.operator), request.uuid, "duplicate".to_string())
            .await;

        assert!(matches!(
            again,
            Err(ShortlistsServiceError::Outcome(OutcomeError::AlreadyDecided { .. }))
        ));

        let unexplained = ctx
            .shortlists
            .resolve_settlement(ctx.operator, request.uuid, resolution(" "))
            .await;

        assert!(matches!(unexplained, Err(ShortlistsServiceError::Validation(_))));

        let resolved = ctx
            .shortlists
            .resolve_settlement(
                ctx.operator,
                request.uuid,
                resolution("hold voided from the provider dashboard"),
            )
            .await?;

        assert_eq!(resolved.status, ShortlistStatus::Cancelled);
        assert_eq!(resolved.outcome, ShortlistOutcome::Cancelled);

        let settled = ctx.payments.get_payment(payment.uuid).await?;

        assert_eq!(settled.status, PaymentStatus::Failed);
        assert_eq!(settled.amount_captured, 0);

        let trail = ctx.payments.audit_trail(payment.uuid).await?;
        let last = trail.last().ok_or("missing audit entry")?;

        assert_eq!(last.action, "manual_resolution");
        assert_eq!(last.previous_status, Some(PaymentStatus::Failed));
        assert_eq!(last.new_status, PaymentStatus::Failed);

        let events: Vec<String> = ctx
            .shortlists
            .events(Actor::System, request.uuid)
            .await?
            .into_iter()
            .map(|event| event.event_type)
            .collect();

        assert!(events.contains(&"settlement_resolved".to_string()));

        let twice = ctx
            .shortlists
            .resolve_settlement(ctx.operator, request.uuid, resolution("again"))
            .await;

        assert!(matches!(
            twice,
            Err(ShortlistsServiceError::TerminalStatus(ShortlistStatus::Cancelled))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn rejected_capture_completes_after_resolution() -> TestResult {
        let ctx = TestContext::new().await;
        let (request, payment) = ctx.authorized_request(12_000).await?;

        ctx.shortlists
            .deliver(ctx.operator, request.uuid, Delivery::default())
            .await?;

        let early = ctx
            .shortlists
            .resolve_settlement(ctx.operator, request.uuid, resolution("nothing to do"))
            .await;

        assert!(matches!(early, Err(ShortlistsServiceError::Validation(_))));

        ctx.provider.fail_settlements();

        let result = ctx
            .shortlists
            .decide_outcome(
                ctx.operator,
                request.uuid,
                outcome(ShortlistOutcome::Delivered, "all hired"),
            )
            .await;

        assert!(result.is_err());
        assert!(
            !notifications(&ctx, request.uuid)
                .await?
                .contains(&NotificationKind::Completed)
        );

        let completed = ctx
            .shortlists
            .resolve_settlement(
                ctx.operator,
                request.uuid,
                resolution("captured by invoice"),
            )
            .await?;

        assert_eq!(completed.status, ShortlistStatus::Completed);
        assert_eq!(completed.outcome, ShortlistOutcome::Delivered);
        assert_eq!(
            ctx.payments.get_payment(payment.uuid).await?.status,
            PaymentStatus::Failed
        );
        assert!(
            notifications(&ctx, request.uuid)
                .await?
                .contains(&NotificationKind::Completed)
        );

        Ok(())
    }

    #[tokio::test]
    async fn mark_paid_refuses_an_active_payment() -> TestResult {
        let ctx = TestContext::new().await;
        let request = ctx.approved_request(10_000).await?;

        ctx.payments
            .authorize(
                ctx.company,
                NewAuthorization {
                    request: request.uuid,
                    provider: None,
                },
            )
            .await?;

        let result = ctx.shortlists.mark_paid(ctx.operator, request.uuid).await;

        assert!(matches!(
            result,
            Err(ShortlistsServiceError::Payment(PaymentsServiceError::PaymentAlreadyActive))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn adjustments_and_extensions_notify_the_company() -> TestResult {
        let ctx = TestContext::new().await;
        let request = ctx.submit_request("Backend Engineer", &["Rust"]).await?.uuid;

        ctx.shortlists
            .suggest_adjustment(ctx.operator, request, "widen the timezone".to_string())
            .await?;
        ctx.shortlists
            .extend_search(ctx.operator, request, "two more weeks".to_string())
            .await?;

        let blank = ctx
            .shortlists
            .extend_search(ctx.operator, request, String::new())
            .await;

        assert!(matches!(blank, Err(ShortlistsServiceError::Validation(_))));
        assert_eq!(
            notifications(&ctx, request).await?,
            vec![NotificationKind::AdjustmentSuggested, NotificationKind::SearchExtended]
        );

        Ok(())
    }

    #[tokio::test]
    async fn only_closed_requests_are_archived() -> TestResult {
        let ctx = TestContext::new().await;
        let request = ctx.submit_request("Backend Engineer", &["Rust"]).await?.uuid;

        let open = ctx.shortlists.archive(ctx.operator, request).await;

        assert!(matches!(open, Err(ShortlistsServiceError::Validation(_))));

        ctx.shortlists
            .cancel(Actor::Company(ctx.company), request, "no budget".to_string())
            .await?;

        let archived = ctx.shortlists.archive(ctx.operator, request).await?;
        let again = ctx.shortlists.archive(ctx.operator, request).await?;

        assert!(archived.archived_at.is_some());
        assert_eq!(archived.archived_at, again.archived_at);
        assert!(ctx.shortlists.list_requests(ctx.company).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn companies_only_see_their_own_requests() -> TestResult {
        let ctx = TestContext::new().await;
        let request = ctx.submit_request("Backend Engineer", &["Rust"]).await?.uuid;
        let other = Actor::Company(CompanyUuid::new());

        assert!(matches!(
            ctx.shortlists.get_request(other, request).await,
            Err(ShortlistsServiceError::Forbidden)
        ));
        assert!(matches!(
            ctx.shortlists.events(other, request).await,
            Err(ShortlistsServiceError::Forbidden)
        ));
        assert!(matches!(
            ctx.shortlists.cancel(other, request, "nope".to_string()).await,
            Err(ShortlistsServiceError::Forbidden)
        ));

        Ok(())
    }
}
