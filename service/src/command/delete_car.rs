//! [`Command`] for delisting a [`Car`].

use common::operations::{
    By, Commit, Delete, Lock, Select, Transact, Transacted,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::Booking;
use crate::{
    domain::{car, user, Car},
    infra::{database, Database},
    read,
    Service,
};

use super::Command;

/// [`Command`] for delisting a [`Car`].
#[derive(Clone, Copy, Debug)]
pub struct DeleteCar {
    /// ID of the [`Car`] to delist.
    pub car_id: car::Id,

    /// ID of the [`User`] requesting the action.
    ///
    /// Must host the [`Car`].
    ///
    /// [`User`]: crate::domain::User
    pub host_id: user::Id,
}

impl<Db, Gw, Nf> Command<DeleteCar> for Service<Db, Gw, Nf>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Car>, car::Id>>,
            Ok = Option<Car>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::booking::ActiveCount, car::Id>>,
            Ok = read::booking::ActiveCount,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Car, car::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<Car, car::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteCar) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteCar { car_id, host_id } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Car`.
        tx.execute(Lock(By::new(car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let car = tx
            .execute(Select(By::<Option<Car>, _>::new(car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CarNotExists(car_id))
            .map_err(tracerr::wrap!())?;
        if car.host_id != host_id {
            return Err(tracerr::new!(E::ForeignCar(car_id)));
        }

        let active_bookings = tx
            .execute(Select(By::<read::booking::ActiveCount, _>::new(car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !active_bookings.is_zero() {
            return Err(tracerr::new!(E::StillBooked(car_id)));
        }

        tx.execute(Delete(By::<Car, _>::new(car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(())
    }
}

/// Error of [`DeleteCar`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Car`] doesn't exist.
    #[display("`Car(id: {_0})` does not exist")]
    #[from(ignore)]
    CarNotExists(#[error(not(source))] car::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Car`] is hosted by another [`User`].
    ///
    /// [`User`]: crate::domain::User
    #[display("`Car(id: {_0})` is hosted by another `User`")]
    #[from(ignore)]
    ForeignCar(#[error(not(source))] car::Id),

    /// [`Car`] is still held by [`Booking`]s.
    #[display("`Car(id: {_0})` is still booked")]
    #[from(ignore)]
    StillBooked(#[error(not(source))] car::Id),
}
