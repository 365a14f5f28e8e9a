//! Identity middleware.
//!
//! The upstream gateway authenticates callers and asserts who they are in the
//! `X-User-Id` and `X-User-Role` headers. Requests without a usable identity
//! stop here with a 401.

use aurum_app::access::{Actor, Role, UserUuid};
use salvo::prelude::*;
use uuid::Uuid;

use crate::extensions::*;

pub(crate) const USER_ID_HEADER: &str = "x-user-id";
pub(crate) const USER_ROLE_HEADER: &str = "x-user-role";

#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let Some(actor) = extract_actor(req) else {
        res.render(StatusError::unauthorized().brief("Missing or invalid identity headers"));
        ctrl.skip_rest();

        return;
    };

    depot.insert_actor(actor);

    ctrl.call_next(req, depot, res).await;
}

fn extract_actor(req: &Request) -> Option<Actor> {
    let user = req
        .header::<String>(USER_ID_HEADER)?
        .trim()
        .parse::<Uuid>()
        .ok()?;

    let role = req
        .header::<String>(USER_ROLE_HEADER)?
        .parse::<Role>()
        .ok()?;

    Some(Actor::new(UserUuid::from_uuid(user), role))
}
