//! Test helpers.

use std::sync::Arc;

use jiff::Timestamp;
use rust_decimal::Decimal;
use salvo::{affix_state::inject, prelude::*, test::RequestBuilder};
use shortlist::{
    follow_up::PricingCategory,
    lifecycle::{ShortlistOutcome, ShortlistStatus},
    matching::HiringCriteria,
    payments::PaymentStatus,
};
use uuid::Uuid;

use shortlist_app::{
    context::AppContext,
    domain::{
        candidates::CandidateUuid,
        payments::{
            MockPaymentsService,
            records::{PaymentRecord, PaymentUuid},
        },
        shortlists::{
            MockShortlistsService,
            records::{
                CompanyUuid, OperatorUuid, ShortlistCandidateRecord, ShortlistCandidateUuid,
                ShortlistRequestRecord, ShortlistRequestUuid,
            },
        },
    },
};

use crate::{
    actors::{self, ACTOR_TYPE_HEADER, ACTOR_UUID_HEADER},
    state::State,
};

pub(crate) const TEST_COMPANY: CompanyUuid = CompanyUuid::from_uuid(Uuid::nil());
pub(crate) const TEST_OPERATOR: OperatorUuid = OperatorUuid::from_uuid(Uuid::max());
pub(crate) const TEST_WEBHOOK_TOKEN: &str = "test-webhook-token";

pub(crate) fn state(shortlists: MockShortlistsService, payments: MockPaymentsService) -> Arc<State> {
    State::shared(
        AppContext {
            shortlists: Arc::new(shortlists),
            payments: Arc::new(payments),
        },
        TEST_WEBHOOK_TOKEN,
    )
}

fn service(state: Arc<State>, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state))
            .hoop(actors::middleware::handler)
            .push(route),
    )
}

pub(crate) fn shortlists_service(shortlists: MockShortlistsService, route: Router) -> Service {
    service(state(shortlists, MockPaymentsService::new()), route)
}

pub(crate) fn payments_service(payments: MockPaymentsService, route: Router) -> Service {
    service(state(MockShortlistsService::new(), payments), route)
}

pub(crate) fn as_company(builder: RequestBuilder) -> RequestBuilder {
    builder
        .add_header(ACTOR_TYPE_HEADER, "company", true)
        .add_header(ACTOR_UUID_HEADER, TEST_COMPANY.to_string(), true)
}

pub(crate) fn as_operator(builder: RequestBuilder) -> RequestBuilder {
    builder
        .add_header(ACTOR_TYPE_HEADER, "operator", true)
        .add_header(ACTOR_UUID_HEADER, TEST_OPERATOR.to_string(), true)
}

pub(crate) fn make_request(uuid: ShortlistRequestUuid) -> ShortlistRequestRecord {
    ShortlistRequestRecord {
        uuid,
        company: TEST_COMPANY,
        criteria: HiringCriteria {
            role_title: "Backend Engineer".to_string(),
            tech_stack: vec!["Rust".to_string()],
            ..HiringCriteria::default()
        },
        rare_profile: false,
        status: ShortlistStatus::Submitted,
        outcome: ShortlistOutcome::Pending,
        outcome_reason: None,
        currency: "USD".to_string(),
        proposed_price: None,
        approved_price: None,
        proposed_candidate_count: None,
        payment: None,
        pricing_category: PricingCategory::New,
        follow_up_discount_percent: Decimal::ZERO,
        previous_request: None,
        requested_candidate_count: None,
        delivered_candidate_count: None,
        final_price: None,
        delivered_at: None,
        payment_confirmed_by: None,
        payment_confirmed_at: None,
        cancellation_reason: None,
        pricing_decline_reason: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
        archived_at: None,
    }
}

pub(crate) fn make_request_in(
    uuid: ShortlistRequestUuid,
    status: ShortlistStatus,
) -> ShortlistRequestRecord {
    ShortlistRequestRecord {
        status,
        ..make_request(uuid)
    }
}

pub(crate) fn make_candidate(
    uuid: ShortlistCandidateUuid,
    request: ShortlistRequestUuid,
) -> ShortlistCandidateRecord {
    ShortlistCandidateRecord {
        uuid,
        request,
        candidate: CandidateUuid::new(),
        pass_number: 1,
        score: 87.5,
        reason: "Strong Rust match".to_string(),
        rank: Some(1),
        approved: false,
        is_new: true,
        previous_request: None,
        reinclusion_reason: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
    }
}

pub(crate) fn make_payment(uuid: PaymentUuid, request: ShortlistRequestUuid) -> PaymentRecord {
    PaymentRecord {
        uuid,
        company: TEST_COMPANY,
        request,
        provider: "stripe".to_string(),
        provider_reference: Some(format!("pi_{uuid}")),
        client_handle: Some(format!("secret_{uuid}")),
        currency: "USD".to_string(),
        amount_authorized: 10_000,
        amount_captured: 0,
        status: PaymentStatus::PendingApproval,
        error_message: None,
        created_at: Timestamp::UNIX_EPOCH,
        updated_at: Timestamp::UNIX_EPOCH,
        authorized_at: None,
    }
}
