//! [`Command`] for listing a new [`Car`].

use common::{
    operations::{Commit, Insert, Transact, Transacted},
    DateTime, Money,
};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::car::{Brand, Model};
#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{car, user, Car},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for listing a new [`Car`].
#[derive(Clone, Debug)]
pub struct CreateCar {
    /// ID of the [`User`] hosting the new [`Car`].
    pub host_id: user::Id,

    /// [`Brand`] of the new [`Car`].
    pub brand: car::Brand,

    /// [`Model`] of the new [`Car`].
    pub model: car::Model,

    /// Price of renting the new [`Car`] for a day.
    pub price_per_day: Money,

    /// Listed price of the new [`Car`] before any discount.
    pub original_price: Money,
}

impl<Db, Gw, Nf> Command<CreateCar> for Service<Db, Gw, Nf>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<Insert<Car>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Car;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateCar) -> Result<Self::Ok, Self::Err> {
        let CreateCar {
            host_id,
            brand,
            model,
            price_per_day,
            original_price,
        } = cmd;

        let car = Car {
            id: car::Id::new(),
            host_id,
            brand,
            model,
            price_per_day,
            original_price,
            is_available: true,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::wrap!())?;
        tx.execute(Insert(car.clone()))
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::wrap!())
            .map(drop)?;

        Ok(car)
    }
}

/// Error of [`CreateCar`] [`Command`] execution.
pub type ExecutionError = database::Error;
