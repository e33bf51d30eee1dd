//! Payments service.

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use serde_json::json;
use shortlist::{lifecycle::ShortlistStatus, payments::PaymentStatus};
use sqlx::{Postgres, Transaction};
use tracing::{Span, field::Empty, info, warn};

use crate::{
    database::Db,
    domain::{
        notifications::{NotificationKind, repository::PgOutboxRepository},
        payments::{
            data::{
                Confirmation, NewAuthorization, PaymentStatusChange, ProviderEvent,
                ProviderNotification,
            },
            errors::PaymentsServiceError,
            providers::{AuthorizationRequest, ProviderRegistry},
            records::{PaymentAuditEntryRecord, PaymentRecord, PaymentUuid},
            repositories::{
                audit::{AuditEntry, PgPaymentAuditRepository},
                payments::{NewPaymentRow, PgPaymentsRepository},
            },
            settler::PaymentSettler,
        },
        shortlists::{
            data::Actor,
            records::{CompanyUuid, ShortlistRequestRecord},
            repositories::{
                events::{PgShortlistEventsRepository, ShortlistEvent},
                requests::PgShortlistRequestsRepository,
            },
        },
    },
};

#[derive(Debug, Clone)]
pub struct PgPaymentsService {
    db: Db,
    settler: PaymentSettler,
    payments: PgPaymentsRepository,
    audit: PgPaymentAuditRepository,
    requests: PgShortlistRequestsRepository,
    events: PgShortlistEventsRepository,
    outbox: PgOutboxRepository,
}

impl PgPaymentsService {
    #[must_use]
    pub fn new(db: Db, registry: ProviderRegistry) -> Self {
        Self {
            db,
            settler: PaymentSettler::new(registry),
            payments: PgPaymentsRepository::new(),
            audit: PgPaymentAuditRepository::new(),
            requests: PgShortlistRequestsRepository::new(),
            events: PgShortlistEventsRepository::new(),
            outbox: PgOutboxRepository::new(),
        }
    }

    /// Locks the owning request, then the payment.
    async fn lock_pair(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: &PaymentRecord,
    ) -> Result<(ShortlistRequestRecord, PaymentRecord), PaymentsServiceError> {
        let request = self.requests.lock_request(tx, payment.request).await?;
        let payment = self.payments.lock_payment(tx, payment.uuid).await?;

        Ok((request, payment))
    }

    /// Marks a pending authorization as held and moves the request along with it.
    async fn apply_authorized(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        mut request: ShortlistRequestRecord,
        payment: &PaymentRecord,
        actor: Actor,
    ) -> Result<PaymentRecord, PaymentsServiceError> {
        let previous = request.status;
        request.status = previous.transition_to(ShortlistStatus::Authorized)?;

        let authorized = self
            .settler
            .transition(
                tx,
                payment,
                PaymentStatusChange {
                    expected: PaymentStatus::PendingApproval,
                    next: PaymentStatus::Authorized,
                    amount_captured: None,
                    error_message: None,
                },
                "confirm",
                json!({ "actor_type": actor.kind() }),
            )
            .await?;

        self.requests
            .save_request(tx, &request, previous)
            .await?
            .ok_or(PaymentsServiceError::StatusChanged)?;

        self.events
            .record(
                tx,
                &ShortlistEvent::new(request.uuid, "payment_authorized", actor)
                    .transition(previous, request.status)
                    .metadata(json!({ "payment": payment.uuid })),
            )
            .await;

        Ok(authorized)
    }

    async fn apply_failed(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        request: &ShortlistRequestRecord,
        payment: &PaymentRecord,
        message: &str,
        action: &str,
        actor: Actor,
    ) -> Result<PaymentRecord, PaymentsServiceError> {
        let failed = self
            .settler
            .transition(
                tx,
                payment,
                PaymentStatusChange {
                    expected: PaymentStatus::PendingApproval,
                    next: PaymentStatus::Failed,
                    amount_captured: None,
                    error_message: Some(message),
                },
                action,
                json!({ "message": message }),
            )
            .await?;

        self.events
            .record(
                tx,
                &ShortlistEvent::new(request.uuid, "payment_failed", actor)
                    .metadata(json!({ "payment": payment.uuid, "message": message })),
            )
            .await;

        Ok(failed)
    }
}

#[async_trait]
impl PaymentsService for PgPaymentsService {
    #[tracing::instrument(
        name = "payments.service.authorize",
        skip(self, authorization),
        fields(
            company_uuid = %company,
            request_uuid = %authorization.request,
            payment_uuid = Empty,
        ),
        err
    )]
    async fn authorize(
        &self,
        company: CompanyUuid,
        authorization: NewAuthorization,
    ) -> Result<PaymentRecord, PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        let mut request = self
            .requests
            .lock_request(&mut tx, authorization.request)
            .await?;

        if request.company != company {
            return Err(PaymentsServiceError::NotFound);
        }

        request.status.transition_to(ShortlistStatus::Authorized)?;

        if let Some(active) = request.payment {
            let active = self.payments.lock_payment(&mut tx, active).await?;

            if matches!(
                active.status,
                PaymentStatus::PendingApproval | PaymentStatus::Authorized
            ) {
                return Err(PaymentsServiceError::PaymentAlreadyActive);
            }
        }

        let amount = request
            .approved_price
            .ok_or(PaymentsServiceError::MissingApprovedPrice)?;

        if amount == 0 {
            return Err(PaymentsServiceError::NothingToAuthorize);
        }

        let provider_name = authorization
            .provider
            .unwrap_or_else(|| self.settler.registry().default_name().to_string());

        let provider = self.settler.provider(&provider_name)?;
        let uuid = PaymentUuid::new();

        Span::current().record("payment_uuid", tracing::field::display(uuid));

        let result = provider
            .authorize(&AuthorizationRequest {
                amount,
                currency: request.currency.clone(),
                customer: company.to_string(),
                description: format!("Candidate shortlist: {}", request.criteria.role_title),
                idempotency_key: uuid.to_string(),
            })
            .await;

        let (authorization, failure) = match result {
            Ok(authorization) => (Some(authorization), None),
            Err(error) => (None, Some(error)),
        };

        let failure_message = failure.as_ref().map(ToString::to_string);

        let status = if failure.is_some() {
            PaymentStatus::Failed
        } else {
            PaymentStatus::PendingApproval
        };

        let payment = self
            .payments
            .create_payment(
                &mut tx,
                &NewPaymentRow {
                    uuid,
                    company,
                    request: request.uuid,
                    provider: &provider_name,
                    provider_reference: authorization
                        .as_ref()
                        .map(|authorization| authorization.provider_reference.as_str()),
                    client_handle: authorization
                        .as_ref()
                        .and_then(|authorization| authorization.client_handle.as_deref()),
                    currency: &request.currency,
                    amount_authorized: amount,
                    status,
                    error_message: failure_message.as_deref(),
                },
            )
            .await?;

        self.audit
            .record(
                &mut tx,
                &AuditEntry {
                    payment: uuid,
                    previous: None,
                    next: status,
                    action: if failure.is_some() {
                        "authorize_failed"
                    } else {
                        "authorize"
                    },
                    context: json!({ "amount": amount, "currency": request.currency }),
                },
            )
            .await;

        if let Some(error) = failure {
            tx.commit().await?;

            warn!(error = %error, "payment provider rejected authorization");

            return Err(PaymentsServiceError::Provider(error));
        }

        let status = request.status;
        request.payment = Some(uuid);

        self.requests
            .save_request(&mut tx, &request, status)
            .await?
            .ok_or(PaymentsServiceError::StatusChanged)?;

        self.events
            .record(
                &mut tx,
                &ShortlistEvent::new(
                    request.uuid,
                    "payment_authorization_started",
                    Actor::Company(company),
                )
                .metadata(json!({ "payment": uuid, "provider": provider_name })),
            )
            .await;

        tx.commit().await?;

        info!(amount, provider = %provider_name, "started payment authorization");

        Ok(payment)
    }

    #[tracing::instrument(
        name = "payments.service.confirm",
        skip(self),
        fields(company_uuid = %company, payment_uuid = %payment),
        err
    )]
    async fn confirm(
        &self,
        company: CompanyUuid,
        payment: PaymentUuid,
    ) -> Result<Confirmation, PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        let current = self.payments.get_payment(&mut tx, payment).await?;

        if current.company != company {
            return Err(PaymentsServiceError::NotFound);
        }

        let (request, current) = self.lock_pair(&mut tx, &current).await?;

        if current.status != PaymentStatus::PendingApproval {
            tx.commit().await?;

            return Ok(Confirmation::unchanged(current));
        }

        let provider = self.settler.provider(&current.provider)?;

        let reference = current
            .provider_reference
            .as_deref()
            .ok_or(PaymentsServiceError::MissingRequiredData)?;

        let valid = match provider.is_authorization_valid(reference).await {
            Ok(valid) => valid,
            Err(error) => {
                warn!(%error, "authorization check failed");

                let message = error.to_string();

                self.apply_failed(
                    &mut tx,
                    &request,
                    &current,
                    &message,
                    "confirm_failed",
                    Actor::Company(company),
                )
                .await?;

                tx.commit().await?;

                return Err(PaymentsServiceError::Provider(error));
            }
        };

        if !valid {
            return Err(PaymentsServiceError::NotYetAuthorized);
        }

        let confirmed = self
            .apply_authorized(&mut tx, request, &current, Actor::Company(company))
            .await?;

        tx.commit().await?;

        info!("confirmed payment authorization");

        Ok(Confirmation::changed(confirmed))
    }

    #[tracing::instrument(
        name = "payments.service.handle_notification",
        skip(self, notification),
        fields(
            provider = %notification.provider,
            provider_reference = %notification.provider_reference,
            payment_uuid = Empty,
        ),
        err
    )]
    async fn handle_notification(
        &self,
        notification: ProviderNotification,
    ) -> Result<Confirmation, PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        let current = self
            .payments
            .find_payment_by_reference(
                &mut tx,
                &notification.provider,
                &notification.provider_reference,
            )
            .await?;

        Span::current().record("payment_uuid", tracing::field::display(current.uuid));

        let (request, current) = self.lock_pair(&mut tx, &current).await?;

        if current.status != PaymentStatus::PendingApproval {
            tx.commit().await?;

            return Ok(Confirmation::unchanged(current));
        }

        let updated = match notification.event {
            ProviderEvent::AuthorizationSucceeded => {
                self.apply_authorized(&mut tx, request, &current, Actor::Provider)
                    .await?
            }
            ProviderEvent::AuthorizationFailed { message } => {
                self.apply_failed(
                    &mut tx,
                    &request,
                    &current,
                    &message,
                    "authorization_failed",
                    Actor::Provider,
                )
                .await?
            }
        };

        tx.commit().await?;

        info!(status = %updated.status, "applied provider notification");

        Ok(Confirmation::changed(updated))
    }

    #[tracing::instrument(
        name = "payments.service.expire",
        skip(self),
        fields(payment_uuid = %payment),
        err
    )]
    async fn expire(&self, payment: PaymentUuid) -> Result<PaymentRecord, PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        let current = self.payments.get_payment(&mut tx, payment).await?;
        let (mut request, current) = self.lock_pair(&mut tx, &current).await?;

        let expired = self
            .settler
            .transition(
                &mut tx,
                &current,
                PaymentStatusChange {
                    expected: current.status,
                    next: PaymentStatus::Expired,
                    amount_captured: None,
                    error_message: None,
                },
                "expire",
                json!({ "authorized_at": current.authorized_at }),
            )
            .await?;

        if request.payment == Some(payment) && request.status == ShortlistStatus::Authorized {
            // Reverting is outside the forward status table; the company authorizes again.
            request.status = ShortlistStatus::PricingApproved;
            request.payment = None;

            self.requests
                .save_request(&mut tx, &request, ShortlistStatus::Authorized)
                .await?
                .ok_or(PaymentsServiceError::StatusChanged)?;

            self.events
                .record(
                    &mut tx,
                    &ShortlistEvent::new(request.uuid, "payment_expired", Actor::System)
                        .transition(ShortlistStatus::Authorized, ShortlistStatus::PricingApproved)
                        .metadata(json!({ "payment": payment })),
                )
                .await;

            self.outbox
                .enqueue(
                    &mut tx,
                    NotificationKind::AuthorizationRequired,
                    request.uuid,
                    json!({
                        "reason": "authorization_expired",
                        "amount": request.approved_price,
                        "currency": request.currency,
                    }),
                )
                .await;
        } else {
            warn!(
                request_uuid = %request.uuid,
                status = %request.status,
                "expired payment no longer drives its request"
            );
        }

        tx.commit().await?;

        info!("expired payment authorization");

        Ok(expired)
    }

    #[tracing::instrument(name = "payments.service.expire_stale", skip(self), err)]
    async fn expire_stale(
        &self,
        authorized_before: Timestamp,
    ) -> Result<Vec<PaymentUuid>, PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        let stale = self
            .payments
            .list_stale_authorizations(&mut tx, authorized_before)
            .await?;

        tx.commit().await?;

        let mut expired = Vec::with_capacity(stale.len());

        for payment in stale {
            match self.expire(payment).await {
                Ok(record) => expired.push(record.uuid),
                Err(error) => warn!(payment_uuid = %payment, error = %error, "failed to expire payment"),
            }
        }

        Ok(expired)
    }

    async fn get_payment(&self, payment: PaymentUuid) -> Result<PaymentRecord, PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        let payment = self.payments.get_payment(&mut tx, payment).await?;

        tx.commit().await?;

        Ok(payment)
    }

    async fn audit_trail(
        &self,
        payment: PaymentUuid,
    ) -> Result<Vec<PaymentAuditEntryRecord>, PaymentsServiceError> {
        let mut tx = self.db.begin().await?;

        self.payments.get_payment(&mut tx, payment).await?;

        let entries = self.audit.list_entries(&mut tx, payment).await?;

        tx.commit().await?;

        Ok(entries)
    }
}

#[automock]
#[async_trait]
pub trait PaymentsService: Send + Sync {
    /// Places an authorization hold for a request whose price the company approved.
    async fn authorize(
        &self,
        company: CompanyUuid,
        authorization: NewAuthorization,
    ) -> Result<PaymentRecord, PaymentsServiceError>;

    /// Confirms a pending authorization after checking it with the provider.
    ///
    /// Repeating the call once the payment left `pending_approval` changes nothing.
    async fn confirm(
        &self,
        company: CompanyUuid,
        payment: PaymentUuid,
    ) -> Result<Confirmation, PaymentsServiceError>;

    /// Applies an asynchronous provider notification.
    async fn handle_notification(
        &self,
        notification: ProviderNotification,
    ) -> Result<Confirmation, PaymentsServiceError>;

    /// Expires an authorized hold and hands the request back for a new authorization.
    async fn expire(&self, payment: PaymentUuid) -> Result<PaymentRecord, PaymentsServiceError>;

    /// Expires every hold authorized before `authorized_before`, one transaction each.
    async fn expire_stale(
        &self,
        authorized_before: Timestamp,
    ) -> Result<Vec<PaymentUuid>, PaymentsServiceError>;

    async fn get_payment(&self, payment: PaymentUuid) -> Result<PaymentRecord, PaymentsServiceError>;

    /// Every recorded status change of the payment, oldest first.
    async fn audit_trail(
        &self,
        payment: PaymentUuid,
    ) -> Result<Vec<PaymentAuditEntryRecord>, PaymentsServiceError>;
}
