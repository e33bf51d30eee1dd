//! Payment Settler
//!
//! Status changes that must stay in step with a shortlist's lifecycle. Callers hold the request
//! lock; the settler takes the payment lock and writes the audit trail.

use std::sync::Arc;

use serde_json::json;
use shortlist::{
    lifecycle::ShortlistOutcome,
    payments::{PartialTerms, PaymentStatus, Settlement, SettlementError, plan},
};
use sqlx::{Postgres, Transaction};
use tracing::{info, warn};

use crate::domain::payments::{
    data::PaymentStatusChange,
    errors::{PaymentsServiceError, ProviderError},
    providers::{PaymentProvider, ProviderRegistry},
    records::{PaymentRecord, PaymentUuid},
    repositories::{
        audit::{AuditEntry, PgPaymentAuditRepository},
        payments::PgPaymentsRepository,
    },
};

const CANCELLED_BEFORE_AUTHORIZATION: &str = "cancelled before authorization";
const MANUAL_RESOLUTION: &str = "manual_resolution";

/// What finalizing does for a payment in a given state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Ask the provider to capture or release the hold.
    Settle,

    /// No funds are held yet; fail the pending authorization.
    AbandonPending,

    /// Already final, nothing to release.
    Nothing,
}

fn step(status: PaymentStatus, outcome: ShortlistOutcome) -> Result<Step, SettlementError> {
    let releasing = matches!(
        outcome,
        ShortlistOutcome::NoMatch | ShortlistOutcome::Cancelled
    );

    match status {
        PaymentStatus::Authorized => Ok(Step::Settle),
        PaymentStatus::PendingApproval if releasing => Ok(Step::AbandonPending),
        status if releasing && status.is_terminal() => Ok(Step::Nothing),
        status => Err(SettlementError::NotAuthorized(status)),
    }
}

/// Result of finalizing a payment.
#[derive(Debug)]
pub(crate) struct Finalized {
    pub payment: PaymentRecord,

    /// Set when the provider rejected the operation; the payment is then `failed`.
    pub failure: Option<ProviderError>,
}

#[derive(Debug, Clone)]
pub(crate) struct PaymentSettler {
    registry: ProviderRegistry,
    payments: PgPaymentsRepository,
    audit: PgPaymentAuditRepository,
}

impl PaymentSettler {
    #[must_use]
    pub(crate) fn new(registry: ProviderRegistry) -> Self {
        Self {
            registry,
            payments: PgPaymentsRepository::new(),
            audit: PgPaymentAuditRepository::new(),
        }
    }

    pub(crate) fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub(crate) fn provider(
        &self,
        name: &str,
    ) -> Result<Arc<dyn PaymentProvider>, PaymentsServiceError> {
        self.registry
            .get(name)
            .ok_or_else(|| PaymentsServiceError::UnknownProvider(name.to_string()))
    }

    /// Moves `payment` to `next`, audited under `action`.
    pub(crate) async fn transition(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: &PaymentRecord,
        change: PaymentStatusChange<'_>,
        action: &str,
        context: serde_json::Value,
    ) -> Result<PaymentRecord, PaymentsServiceError> {
        change.expected.transition_to(change.next)?;

        let updated = self
            .payments
            .update_status(tx, payment.uuid, &change)
            .await?
            .ok_or(PaymentsServiceError::StatusChanged)?;

        self.audit
            .record(
                tx,
                &AuditEntry {
                    payment: payment.uuid,
                    previous: Some(change.expected),
                    next: change.next,
                    action,
                    context,
                },
            )
            .await;

        Ok(updated)
    }

    /// Settles a payment again after a rejected finalization.
    ///
    /// A failed payment stays failed and the operator's `note` is audited as a manual
    /// resolution. Any other payment is finalized as usual.
    #[tracing::instrument(
        name = "payments.settler.resolve",
        skip(self, tx, terms, note),
        fields(payment_uuid = %payment, outcome = %outcome),
        err
    )]
    pub(crate) async fn resolve(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
        outcome: ShortlistOutcome,
        terms: Option<&PartialTerms>,
        note: &str,
    ) -> Result<Finalized, PaymentsServiceError> {
        let current = self.payments.lock_payment(tx, payment).await?;

        if current.status != PaymentStatus::Failed {
            return self.finalize(tx, payment, outcome, terms).await;
        }

        self.audit
            .record(
                tx,
                &AuditEntry {
                    payment: current.uuid,
                    previous: Some(current.status),
                    next: current.status,
                    action: MANUAL_RESOLUTION,
                    context: json!({ "outcome": outcome, "note": note }),
                },
            )
            .await;

        info!(payment_uuid = %current.uuid, "recorded manual settlement resolution");

        Ok(Finalized {
            payment: current,
            failure: None,
        })
    }

    /// Finalizes the payment for a decided outcome.
    ///
    /// Provider failures are not errors here: the payment is marked failed and the failure is
    /// handed back so the caller can commit the record before surfacing it.
    #[tracing::instrument(
        name = "payments.settler.finalize",
        skip(self, tx, terms),
        fields(payment_uuid = %payment, outcome = %outcome),
        err
    )]
    pub(crate) async fn finalize(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentUuid,
        outcome: ShortlistOutcome,
        terms: Option<&PartialTerms>,
    ) -> Result<Finalized, PaymentsServiceError> {
        let payment = self.payments.lock_payment(tx, payment).await?;

        match step(payment.status, outcome)? {
            Step::Settle => self.settle(tx, payment, outcome, terms).await,
            Step::AbandonPending => {
                let payment = self
                    .transition(
                        tx,
                        &payment,
                        PaymentStatusChange {
                            expected: PaymentStatus::PendingApproval,
                            next: PaymentStatus::Failed,
                            amount_captured: None,
                            error_message: Some(CANCELLED_BEFORE_AUTHORIZATION),
                        },
                        "abandon",
                        json!({ "outcome": outcome }),
                    )
                    .await?;

                Ok(Finalized {
                    payment,
                    failure: None,
                })
            }
            Step::Nothing => Ok(Finalized {
                payment,
                failure: None,
            }),
        }
    }

    async fn settle(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        payment: PaymentRecord,
        outcome: ShortlistOutcome,
        terms: Option<&PartialTerms>,
    ) -> Result<Finalized, PaymentsServiceError> {
        let settlement = plan(outcome, payment.status, payment.amount_authorized, terms)?;
        let provider = self.provider(&payment.provider)?;

        let reference = payment
            .provider_reference
            .as_deref()
            .ok_or(PaymentsServiceError::MissingRequiredData)?;

        let result = match settlement {
            Settlement::CaptureFull { amount } => provider.capture_full(reference, amount).await,
            Settlement::CapturePartial { authorized, amount } => {
                provider.capture_partial(reference, authorized, amount).await
            }
            Settlement::Release => provider.release(reference).await,
        };

        let context = json!({
            "outcome": outcome,
            "amount_authorized": payment.amount_authorized,
            "amount_captured": settlement.captured_amount(),
        });

        match result {
            Ok(()) => {
                let settled = self
                    .transition(
                        tx,
                        &payment,
                        PaymentStatusChange {
                            expected: PaymentStatus::Authorized,
                            next: settlement.resulting_status(),
                            amount_captured: Some(settlement.captured_amount()),
                            error_message: None,
                        },
                        settlement.action(),
                        context,
                    )
                    .await?;

                info!(
                    payment_uuid = %settled.uuid,
                    status = %settled.status,
                    amount_captured = settled.amount_captured,
                    "settled payment"
                );

                Ok(Finalized {
                    payment: settled,
                    failure: None,
                })
            }
            Err(error) => {
                let message = error.to_string();

                warn!(
                    payment_uuid = %payment.uuid,
                    action = settlement.action(),
                    error = %error,
                    "payment provider rejected settlement"
                );

                let failed = self
                    .transition(
                        tx,
                        &payment,
                        PaymentStatusChange {
                            expected: PaymentStatus::Authorized,
                            next: PaymentStatus::Failed,
                            amount_captured: None,
                            error_message: Some(&message),
                        },
                        &format!("{}_failed", settlement.action()),
                        context,
                    )
                    .await?;

                Ok(Finalized {
                    payment: failed,
                    failure: Some(error),
                })
            }
        }
    }
}
