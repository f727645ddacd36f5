//! [`Command`] for toggling [`Car`] availability.

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::Booking;
use crate::{
    domain::{car, user, Car},
    infra::{database, Database},
    read,
    Service,
};

use super::Command;

/// [`Command`] for toggling [`Car`] availability.
///
/// The availability flag is a cache over the [`Booking`]s of the [`Car`], so
/// toggling it while [`Booking`]s still hold the [`Car`] is allowed, but
/// reported back.
#[derive(Clone, Copy, Debug)]
pub struct UpdateCarAvailability {
    /// ID of the [`Car`] to toggle.
    pub car_id: car::Id,

    /// ID of the [`User`] requesting the action.
    ///
    /// Must host the [`Car`].
    ///
    /// [`User`]: crate::domain::User
    pub host_id: user::Id,

    /// New availability of the [`Car`].
    pub is_available: bool,
}

/// Output of [`UpdateCarAvailability`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Updated [`Car`].
    pub car: Car,

    /// Number of [`Booking`]s still holding the [`Car`].
    pub active_bookings: read::booking::ActiveCount,
}

impl<Db, Gw, Nf> Command<UpdateCarAvailability> for Service<Db, Gw, Nf>
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
        > + Database<Update<Car>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateCarAvailability,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateCarAvailability {
            car_id,
            host_id,
            is_available,
        } = cmd;

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

        let mut car = tx
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
            log::warn!(
                "`Car(id: {car_id})` availability is toggled while {} of \
                 its `Booking`s still hold it",
                i64::from(active_bookings),
            );
        }

        if car.is_available == is_available {
            return Ok(Output {
                car,
                active_bookings,
            });
        }

        car.is_available = is_available;
        tx.execute(Update(car.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(Output {
            car,
            active_bookings,
        })
    }
}

/// Error of [`UpdateCarAvailability`] [`Command`] execution.
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
}
