//! Test helpers.

use std::sync::Arc;

use aurum_app::{
    access::{Actor, Role, UserUuid},
    context::AppContext,
    domain::{
        inventory::MockInventoryService, orders::MockOrdersService,
        payments::MockPaymentsService, rates::MockRatesService,
    },
};
use salvo::{affix_state::inject, prelude::*, test::RequestBuilder};
use uuid::Uuid;

use crate::{
    identity::{USER_ID_HEADER, USER_ROLE_HEADER},
    state::State,
};

pub(crate) const CUSTOMER_UUID: UserUuid =
    UserUuid::from_uuid(Uuid::from_u128(0x0192_f0c1_7c3e_7a41_9b8e_2f1d_3c4b_5a01));

pub(crate) const STAFF_UUID: UserUuid =
    UserUuid::from_uuid(Uuid::from_u128(0x0192_f0c1_7c3e_7a41_9b8e_2f1d_3c4b_5a02));

pub(crate) const CUSTOMER: Actor = Actor::new(CUSTOMER_UUID, Role::Customer);
pub(crate) const SELLER: Actor = Actor::new(STAFF_UUID, Role::Seller);
pub(crate) const ADMIN: Actor = Actor::new(STAFF_UUID, Role::Admin);

/// Mocked services; any call without an expectation fails the test.
#[derive(Default)]
pub(crate) struct MockApp {
    pub(crate) rates: MockRatesService,
    pub(crate) inventory: MockInventoryService,
    pub(crate) orders: MockOrdersService,
    pub(crate) payments: MockPaymentsService,
}

impl MockApp {
    pub(crate) fn into_app_context(self) -> AppContext {
        AppContext {
            rates: Arc::new(self.rates),
            inventory: Arc::new(self.inventory),
            orders: Arc::new(self.orders),
            payments: Arc::new(self.payments),
        }
    }

    /// Serves `route` behind the identity check, the way the app router does.
    pub(crate) fn into_service(self, route: Router) -> Service {
        Service::new(
            Router::new()
                .hoop(inject(State::from_app_context(self.into_app_context())))
                .hoop(crate::identity::handler)
                .push(route),
        )
    }
}

/// Adds identity headers for an actor.
pub(crate) trait AsActor {
    fn as_actor(self, actor: Actor) -> Self;
}

impl AsActor for RequestBuilder {
    fn as_actor(self, actor: Actor) -> Self {
        self.add_header(USER_ID_HEADER, actor.user.to_string(), true)
            .add_header(USER_ROLE_HEADER, actor.role.as_str(), true)
    }
}
