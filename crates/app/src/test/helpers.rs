//! Test Helpers

use shortlist::{matching::HiringCriteria, seniority::Seniority};
use testresult::TestResult;

use crate::{
    domain::{
        payments::{PaymentsService, data::NewAuthorization, records::PaymentRecord},
        shortlists::{
            ShortlistsService, ShortlistsServiceError,
            data::{Actor, NewShortlistRequest, ProposedScope},
            records::{ShortlistRequestRecord, ShortlistRequestUuid},
        },
    },
    test::TestContext,
};

pub(crate) fn criteria(role: &str, skills: &[&str]) -> HiringCriteria {
    HiringCriteria {
        role_title: role.to_string(),
        tech_stack: skills.iter().map(ToString::to_string).collect(),
        seniority: Some(Seniority::Senior),
        ..HiringCriteria::default()
    }
}

pub(crate) fn new_request(role: &str, skills: &[&str]) -> NewShortlistRequest {
    NewShortlistRequest {
        criteria: criteria(role, skills),
        rare_profile: false,
        currency: None,
        previous_request: None,
    }
}

impl TestContext {
    pub(crate) async fn submit_request(
        &self,
        role: &str,
        skills: &[&str],
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError> {
        self.shortlists
            .submit(self.company, new_request(role, skills))
            .await
    }

    /// Takes a submitted request through matching and a price proposal.
    pub(crate) async fn priced_request(
        &self,
        request: ShortlistRequestUuid,
        price: u64,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError> {
        self.shortlists.process(self.operator, request).await?;

        self.shortlists
            .propose_scope(
                self.operator,
                request,
                ProposedScope {
                    price,
                    candidate_count: 3,
                },
            )
            .await
    }

    /// A new request with `price` approved by the company.
    pub(crate) async fn approved_request(
        &self,
        price: u64,
    ) -> Result<ShortlistRequestRecord, ShortlistsServiceError> {
        let request = self.submit_request("Backend Engineer", &["Rust"]).await?.uuid;

        self.priced_request(request, price).await?;

        self.shortlists.approve_pricing(self.company, request).await
    }

    /// An approved request whose hold the provider has confirmed.
    pub(crate) async fn authorized_request(
        &self,
        price: u64,
    ) -> TestResult<(ShortlistRequestRecord, PaymentRecord)> {
        let request = self.approved_request(price).await?;

        let payment = self
            .payments
            .authorize(
                self.company,
                NewAuthorization {
                    request: request.uuid,
                    provider: None,
                },
            )
            .await?;

        self.provider.confirm_holds();

        let confirmation = self.payments.confirm(self.company, payment.uuid).await?;

        let request = self
            .shortlists
            .get_request(Actor::Company(self.company), request.uuid)
            .await?;

        Ok((request, confirmation.payment))
    }
}
