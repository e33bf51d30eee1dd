//! App Context

use std::sync::Arc;

use shortlist::{follow_up::FollowUpDetector, matching::MatchingConfig};

use crate::{
    database::Db,
    domain::{
        candidates::{CandidatePool, PgCandidatePool},
        payments::{
            PaymentsService, PgPaymentsService,
            providers::{HttpPaymentProvider, HttpProviderConfig, ProviderRegistry},
        },
        shortlists::{PgShortlistsService, ShortlistsService},
    },
};

/// Tunables and provider settings for the services.
#[derive(Debug, Clone)]
pub struct AppSettings {
    /// Name payments are created under when the caller does not pick a provider.
    pub provider_name: String,
    pub provider: HttpProviderConfig,
    pub matching: MatchingConfig,
    pub follow_up: FollowUpDetector,
}

#[derive(Clone)]
pub struct AppContext {
    pub shortlists: Arc<dyn ShortlistsService>,
    pub payments: Arc<dyn PaymentsService>,
}

impl AppContext {
    #[must_use]
    pub fn new(db: Db, settings: AppSettings) -> Self {
        let registry = ProviderRegistry::new(settings.provider_name.clone()).with(
            settings.provider_name,
            Arc::new(HttpPaymentProvider::new(settings.provider)),
        );

        let candidates: Arc<dyn CandidatePool> = Arc::new(PgCandidatePool::new(db.clone()));

        let shortlists = PgShortlistsService::new(db.clone(), candidates, registry.clone())
            .with_matching(settings.matching)
            .with_follow_up_detector(settings.follow_up);

        Self {
            shortlists: Arc::new(shortlists),
            payments: Arc::new(PgPaymentsService::new(db, registry)),
        }
    }
}
