//! Webhook token guard.

use std::sync::Arc;

use salvo::prelude::*;

use crate::{extensions::*, state::State};

pub(crate) const WEBHOOK_TOKEN_HEADER: &str = "x-webhook-token";

/// Rejects provider callbacks that do not carry the shared webhook token.
#[salvo::handler]
pub(crate) async fn guard(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let expected = match depot.obtain_or_500::<Arc<State>>() {
        Ok(state) => state.webhook_token.clone(),
        Err(error) => {
            res.render(error);

            return;
        }
    };

    let presented = req
        .headers()
        .get(WEBHOOK_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok());

    if expected.is_empty() || presented != Some(expected.as_str()) {
        res.render(StatusError::unauthorized().brief("Invalid webhook token"));

        return;
    }

    ctrl.call_next(req, depot, res).await;
}
