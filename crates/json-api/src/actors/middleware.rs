//! Actor middleware.

use salvo::prelude::*;
use uuid::Uuid;

use shortlist_app::domain::shortlists::data::Actor;

use crate::{
    actors::{ACTOR_TYPE_HEADER, ACTOR_UUID_HEADER},
    extensions::*,
};

#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let Some(actor) = extract_actor(req) else {
        res.render(StatusError::unauthorized().brief("Missing or invalid actor headers"));

        return;
    };

    depot.insert_actor(actor);

    ctrl.call_next(req, depot, res).await;
}

fn extract_actor(req: &Request) -> Option<Actor> {
    let kind = req.headers().get(ACTOR_TYPE_HEADER)?.to_str().ok()?.trim();
    let uuid = req.headers().get(ACTOR_UUID_HEADER)?.to_str().ok()?.trim();
    let uuid = Uuid::parse_str(uuid).ok()?;

    if kind.eq_ignore_ascii_case("operator") {
        Some(Actor::Operator(uuid.into()))
    } else if kind.eq_ignore_ascii_case("company") {
        Some(Actor::Company(uuid.into()))
    } else {
        None
    }
}
