//! [`Command`] for cancelling a [`Booking`].

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{booking, user, Booking},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for cancelling a [`Booking`] on behalf of its renter.
///
/// Cancelling releases the booked [`Window`], so conflicting [`Booking`]s
/// may be created over it again. Any associated [`Payment`] is refunded
/// separately.
///
/// [`Payment`]: crate::domain::Payment
/// [`Window`]: booking::Window
#[derive(Clone, Copy, Debug)]
pub struct CancelBooking {
    /// [`booking::Id`] of the [`Booking`] to be cancelled.
    pub booking_id: booking::Id,

    /// [`user::Id`] of the [`User`] having rented the [`Booking`].
    pub renter_id: user::Id,
}

impl<Db, Gw, Nf> Command<CancelBooking> for Service<Db, Gw, Nf>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Booking>, booking::Id>>,
            Ok = Option<Booking>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Booking, booking::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<Booking>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CancelBooking,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CancelBooking {
            booking_id,
            renter_id,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Booking`.
        tx.execute(Lock(By::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut booking = tx
            .execute(Select(By::<Option<Booking>, _>::new(booking_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::BookingNotExists(booking_id))
            .map_err(tracerr::wrap!())?;
        if booking.renter_id != renter_id {
            return Err(tracerr::new!(E::ForeignBooking(booking_id)));
        }
        if !booking.is_cancellable() {
            return Err(tracerr::new!(E::AlreadyCancelled(booking_id)));
        }

        booking.status = booking::Status::Cancelled;
        tx.execute(Update(booking.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(booking)
    }
}

/// Error of [`CancelBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Booking`] is cancelled already.
    #[display("`Booking(id: {_0})` is already cancelled")]
    #[from(ignore)]
    AlreadyCancelled(#[error(not(source))] booking::Id),

    /// [`Booking`] doesn't exist.
    #[display("`Booking(id: {_0})` does not exist")]
    #[from(ignore)]
    BookingNotExists(#[error(not(source))] booking::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Booking`] is rented by another [`User`].
    #[display("`Booking(id: {_0})` is rented by another `User`")]
    #[from(ignore)]
    ForeignBooking(#[error(not(source))] booking::Id),
}
