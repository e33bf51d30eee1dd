//! Route table

use std::sync::Arc;

use salvo::{affix_state::inject, prelude::*, trailing_slash::remove_slash};

use crate::{actors, healthcheck, observability, payments, shortlists, state::State};

/// Builds the full route tree with shared middleware.
pub(crate) fn router(state: Arc<State>) -> Router {
    Router::new()
        .hoop(CatchPanic::new())
        .hoop(remove_slash())
        .hoop(observability::request_logging)
        .hoop(inject(state))
        .push(Router::with_path("healthcheck").get(healthcheck::handler))
        .push(
            Router::with_path("webhooks/payments")
                .hoop(payments::webhook::guard)
                .post(payments::notify::handler),
        )
        .push(
            Router::new()
                .hoop(actors::middleware::handler)
                .push(shortlist_routes())
                .push(payment_routes()),
        )
}

fn shortlist_routes() -> Router {
    Router::with_path("shortlists")
        .get(shortlists::index::handler)
        .post(shortlists::submit::handler)
        .push(
            Router::with_path("{shortlist}")
                .get(shortlists::get::handler)
                .push(Router::with_path("events").get(shortlists::events::handler))
                .push(Router::with_path("process").post(shortlists::process::handler))
                .push(Router::with_path("no-match").post(shortlists::no_match::handler))
                .push(
                    Router::with_path("candidates")
                        .get(shortlists::list_candidates::handler)
                        .post(shortlists::reinclude_candidate::handler)
                        .push(
                            Router::with_path("{candidate}")
                                .patch(shortlists::update_candidate::handler),
                        ),
                )
                .push(Router::with_path("extend-search").post(shortlists::extend_search::handler))
                .push(
                    Router::with_path("price-suggestion")
                        .get(shortlists::price_suggestion::handler),
                )
                .push(Router::with_path("scope").post(shortlists::propose_scope::handler))
                .push(
                    Router::with_path("adjustments")
                        .post(shortlists::suggest_adjustment::handler),
                )
                .push(
                    Router::with_path("pricing")
                        .push(
                            Router::with_path("approve")
                                .post(shortlists::approve_pricing::handler),
                        )
                        .push(
                            Router::with_path("decline")
                                .post(shortlists::decline_pricing::handler),
                        ),
                )
                .push(Router::with_path("mark-paid").post(shortlists::mark_paid::handler))
                .push(Router::with_path("deliver").post(shortlists::deliver::handler))
                .push(Router::with_path("outcome").post(shortlists::outcome::handler))
                .push(Router::with_path("cancel").post(shortlists::cancel::handler))
                .push(
                    Router::with_path("settlement/resolve")
                        .post(shortlists::resolve_settlement::handler),
                )
                .push(Router::with_path("archive").post(shortlists::archive::handler)),
        )
}

fn payment_routes() -> Router {
    Router::with_path("payments")
        .post(payments::authorize::handler)
        .push(
            Router::with_path("{payment}")
                .get(payments::get::handler)
                .push(Router::with_path("confirm").post(payments::confirm::handler))
                .push(Router::with_path("expire").post(payments::expire::handler))
                .push(Router::with_path("audit").get(payments::audit::handler)),
        )
}
