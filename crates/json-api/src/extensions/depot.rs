//! Depot helper extensions.

use std::any::Any;

use salvo::prelude::{Depot, StatusError};

use shortlist_app::domain::shortlists::{
    data::Actor,
    records::{CompanyUuid, OperatorUuid},
};

/// Helpers for mapping depot extraction failures to HTTP errors.
pub(crate) trait DepotExt {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError>;

    fn insert_actor(&mut self, actor: Actor);

    /// The authenticated caller, whatever its role.
    fn actor_or_401(&self) -> Result<Actor, StatusError>;

    fn operator_or_403(&self) -> Result<OperatorUuid, StatusError>;

    fn company_or_403(&self) -> Result<CompanyUuid, StatusError>;
}

impl DepotExt for Depot {
    fn obtain_or_500<T: Any + Send + Sync>(&self) -> Result<&T, StatusError> {
        self.obtain::<T>()
            .map_err(|_ignored| StatusError::internal_server_error())
    }

    fn insert_actor(&mut self, actor: Actor) {
        self.inject(actor);
    }

    fn actor_or_401(&self) -> Result<Actor, StatusError> {
        self.obtain::<Actor>()
            .copied()
            .map_err(|_ignored| StatusError::unauthorized().brief("Missing actor"))
    }

    fn operator_or_403(&self) -> Result<OperatorUuid, StatusError> {
        match self.actor_or_401()? {
            Actor::Operator(operator) => Ok(operator),
            Actor::Company(_) | Actor::System | Actor::Provider => {
                Err(StatusError::forbidden().brief("Operators only"))
            }
        }
    }

    fn company_or_403(&self) -> Result<CompanyUuid, StatusError> {
        match self.actor_or_401()? {
            Actor::Company(company) => Ok(company),
            Actor::Operator(_) | Actor::System | Actor::Provider => {
                Err(StatusError::forbidden().brief("Companies only"))
            }
        }
    }
}
