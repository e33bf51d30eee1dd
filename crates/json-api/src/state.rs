//! State

use std::sync::Arc;

use shortlist_app::context::AppContext;

#[derive(Clone)]
pub(crate) struct State {
    pub(crate) app: AppContext,

    /// Token payment provider webhooks must present.
    pub(crate) webhook_token: String,
}

impl State {
    #[must_use]
    pub(crate) fn new(app: AppContext, webhook_token: impl Into<String>) -> Self {
        Self {
            app,
            webhook_token: webhook_token.into(),
        }
    }

    #[must_use]
    pub(crate) fn shared(app: AppContext, webhook_token: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(app, webhook_token))
    }
}
