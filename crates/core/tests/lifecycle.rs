//! State machine properties for shortlist statuses, outcomes and payments

use shortlist::prelude::*;

const STATUS_TABLE: &[(ShortlistStatus, &[ShortlistStatus])] = &[
    (
        ShortlistStatus::Submitted,
        &[
            ShortlistStatus::Processing,
            ShortlistStatus::PricingPending,
            ShortlistStatus::Cancelled,
        ],
    ),
    (
        ShortlistStatus::Processing,
        &[ShortlistStatus::PricingPending, ShortlistStatus::Cancelled],
    ),
    (
        ShortlistStatus::PricingPending,
        &[
            ShortlistStatus::PricingApproved,
            ShortlistStatus::Processing,
            ShortlistStatus::Cancelled,
        ],
    ),
    (
        ShortlistStatus::PricingApproved,
        &[ShortlistStatus::Authorized, ShortlistStatus::Cancelled],
    ),
    (
        ShortlistStatus::Authorized,
        &[ShortlistStatus::Delivered, ShortlistStatus::Cancelled],
    ),
    (ShortlistStatus::Delivered, &[ShortlistStatus::Completed]),
    (ShortlistStatus::Completed, &[]),
    (ShortlistStatus::Cancelled, &[]),
];

#[test]
fn status_validator_accepts_exactly_the_table() {
    for (from, allowed) in STATUS_TABLE {
        for to in ShortlistStatus::ALL {
            assert_eq!(
                from.can_transition_to(to),
                allowed.contains(&to),
                "{from} -> {to}"
            );
            assert_eq!(from.transition_to(to).is_ok(), allowed.contains(&to));
        }
    }
}

#[test]
fn completed_cannot_return_to_processing() {
    let error = ShortlistStatus::Completed
        .transition_to(ShortlistStatus::Processing)
        .expect_err("completed is terminal");

    assert_eq!(error.from, ShortlistStatus::Completed);
    assert_eq!(error.to, ShortlistStatus::Processing);
    assert!(error.allowed.is_empty());
    assert_eq!(
        error.to_string(),
        "cannot transition from completed to processing (completed is terminal)"
    );
}

#[test]
fn every_terminal_outcome_is_reachable_once_from_pending() {
    let terminals = [
        ShortlistOutcome::Delivered,
        ShortlistOutcome::Partial,
        ShortlistOutcome::NoMatch,
        ShortlistOutcome::Cancelled,
    ];

    for outcome in terminals {
        let decision = OutcomeDecision::decide(ShortlistOutcome::Pending, outcome, "reason")
            .expect("pending can reach every terminal outcome");

        assert_eq!(decision.outcome(), outcome);

        for next in ShortlistOutcome::ALL {
            assert!(
                OutcomeDecision::decide(outcome, next, "again").is_err(),
                "{outcome} -> {next} must be rejected"
            );
            assert!(outcome.transition_to(next).is_err());
        }
    }
}

#[test]
fn payment_statuses_only_settle_from_authorized() {
    for status in PaymentStatus::ALL {
        let can_settle = [
            PaymentStatus::Captured,
            PaymentStatus::Partial,
            PaymentStatus::Released,
        ]
        .into_iter()
        .any(|next| status.can_transition_to(next));

        assert_eq!(can_settle, status == PaymentStatus::Authorized, "{status}");
    }
}
