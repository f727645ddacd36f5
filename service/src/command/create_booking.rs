//! [`Command`] for creating a new [`Booking`].

use common::{
    operations::{
        By, Commit, Insert, Lock, Select, Transact, Transacted, Update,
    },
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use rust_decimal::Decimal;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::User;
use crate::{
    domain::{booking, car, payment, user, Booking, Car, Payment},
    infra::{database, Database},
    read::booking::{conflict, HasConflict},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`Booking`] of a [`Car`].
///
/// The booked [`booking::Window`] is guarded by the [`Database`]: two
/// non-cancelled [`Booking`]s of the same [`Car`] can never overlap, no
/// matter how concurrently they are created.
#[derive(Clone, Debug)]
pub struct CreateBooking {
    /// [`user::Id`] of the [`User`] renting the [`Car`].
    pub renter_id: user::Id,

    /// [`car::Id`] of the [`Car`] to be booked.
    pub car_id: car::Id,

    /// [`booking::Window`] to book the [`Car`] over.
    pub window: booking::Window,

    /// [`booking::Location`] where the [`Car`] is picked up.
    pub pick_up: booking::Location,

    /// [`booking::Location`] where the [`Car`] is dropped off.
    pub drop_off: booking::Location,

    /// [`payment::Id`] of the captured [`Payment`] paying for the
    /// [`Booking`].
    pub payment_id: payment::Id,

    /// Total amount of the [`Booking`], or [`None`] to derive it from the
    /// [`Car`] daily price.
    pub amount: Option<Money>,
}

impl<Db, Gw, Nf> Command<CreateBooking> for Service<Db, Gw, Nf>
where
    Db: Database<
            Select<By<Option<Car>, car::Id>>,
            Ok = Option<Car>,
            Err = Traced<database::Error>,
        > + Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Car>, car::Id>>,
            Ok = Option<Car>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<HasConflict, conflict::Selector>>,
            Ok = HasConflict,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Payment>, payment::Id>>,
            Ok = Option<Payment>,
            Err = Traced<database::Error>,
        > + Database<Insert<Booking>, Err = Traced<database::Error>>
        + Database<Lock<By<Car, car::Id>>, Err = Traced<database::Error>>
        + Database<
            Update<payment::BookingLink>,
            Ok = bool,
            Err = Traced<database::Error>,
        > + Database<Update<Car>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = Booking;
    type Err = Traced<ExecutionError>;

    #[expect(clippy::too_many_lines, reason = "still readable")]
    async fn execute(
        &self,
        cmd: CreateBooking,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateBooking {
            renter_id,
            car_id,
            window,
            pick_up,
            drop_off,
            payment_id,
            amount,
        } = cmd;

        let car = self
            .database()
            .execute(Select(By::<Option<Car>, _>::new(car_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::CarNotExists(car_id))
            .map_err(tracerr::wrap!())?;
        if !car.is_available {
            return Err(tracerr::new!(E::CarUnavailable(car_id)));
        }

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent booking of the same `Car`.
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
        if !car.is_available {
            return Err(tracerr::new!(E::CarUnavailable(car_id)));
        }

        let has_conflict = tx
            .execute(Select(By::<HasConflict, _>::new(conflict::Selector {
                car_id,
                window,
                exclude: None,
            })))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if *has_conflict {
            return Err(tracerr::new!(E::WindowConflict(car_id)));
        }

        let payment = tx
            .execute(Select(By::<Option<Payment>, _>::new(payment_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PaymentNotExists(payment_id))
            .map_err(tracerr::wrap!())?;
        if payment.user_id != renter_id {
            return Err(tracerr::new!(E::ForeignPayment(payment_id)));
        }
        if !payment.is_captured() {
            return Err(tracerr::new!(E::PaymentNotCaptured(payment_id)));
        }
        if payment.booking_id.is_some() {
            return Err(tracerr::new!(E::PaymentAlreadyUsed(payment_id)));
        }

        let booking = Booking {
            id: booking::Id::new(),
            renter_id,
            car_id,
            host_id: car.host_id,
            window,
            amount: booking_amount(amount, &window, car.price_per_day),
            pick_up,
            drop_off,
            status: booking::Status::Completed,
            rental_status: booking::RentalStatus::Upcoming,
            payment_status: booking::PaymentStatus::Completed,
            payment_id,
            created_at: DateTime::now().coerce(),
        };
        tx.execute(Insert(booking.clone()))
            .await
            .map_err(|e| {
                if e.as_ref()
                    .is_exclusion_violation(Some("bookings_no_overlap"))
                {
                    // Lost race: another `Booking` took the window
                    // concurrently.
                    tracerr::new!(E::WindowConflict(car_id))
                } else {
                    tracerr::map_from(e)
                }
            })
            .map(drop)?;

        let linked = tx
            .execute(Update(payment::BookingLink {
                id: payment.id,
                booking_id: booking.id,
            }))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;
        if !linked {
            // 0 rows means the `Payment` got used concurrently.
            return Err(tracerr::new!(E::PaymentAlreadyUsed(payment.id)));
        }

        car.is_available = false;
        tx.execute(Update(car))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        Ok(booking)
    }
}

/// Returns the amount to be paid for a [`Booking`] over the given `window`.
///
/// An explicitly `requested` amount wins over the derived one.
fn booking_amount(
    requested: Option<Money>,
    window: &booking::Window,
    price_per_day: Money,
) -> Money {
    requested.unwrap_or_else(|| Money {
        amount: Decimal::from(window.days()) * price_per_day.amount,
        currency: price_per_day.currency,
    })
}

/// Error of [`CreateBooking`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Car`] doesn't exist.
    #[display("`Car(id: {_0})` does not exist")]
    CarNotExists(#[error(not(source))] car::Id),

    /// [`Car`] is not available for booking.
    #[display("`Car(id: {_0})` is not available")]
    CarUnavailable(#[error(not(source))] car::Id),

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Payment`] belongs to another [`User`].
    #[display("`Payment(id: {_0})` belongs to another `User`")]
    ForeignPayment(#[error(not(source))] payment::Id),

    /// [`Payment`] pays for another [`Booking`] already.
    #[display("`Payment(id: {_0})` pays for another `Booking` already")]
    PaymentAlreadyUsed(#[error(not(source))] payment::Id),

    /// [`Payment`] is not captured.
    #[display("`Payment(id: {_0})` is not captured")]
    PaymentNotCaptured(#[error(not(source))] payment::Id),

    /// [`Payment`] doesn't exist.
    #[display("`Payment(id: {_0})` does not exist")]
    PaymentNotExists(#[error(not(source))] payment::Id),

    /// Requested window conflicts with another [`Booking`].
    #[display("`Car(id: {_0})` is already booked over the requested window")]
    WindowConflict(#[error(not(source))] car::Id),
}

#[cfg(test)]
mod spec {
    use common::{Currency, DateTime, Money};
    use rust_decimal::Decimal;

    use super::booking_amount;
    use crate::domain::booking::Window;

    fn window(start: &str, end: &str) -> Window {
        Window::new(
            DateTime::from_rfc3339(start).unwrap().coerce(),
            DateTime::from_rfc3339(end).unwrap().coerce(),
        )
        .unwrap()
    }

    fn money(s: &str) -> Money {
        Money {
            amount: s.parse::<Decimal>().unwrap(),
            currency: Currency::Inr,
        }
    }

    #[test]
    fn derives_amount_from_daily_price() {
        let w = window("2024-05-10T10:00:00Z", "2024-05-13T10:00:00Z");

        assert_eq!(booking_amount(None, &w, money("1000")), money("3000"));
    }

    #[test]
    fn partial_day_charges_a_whole_one() {
        let w = window("2024-05-10T10:00:00Z", "2024-05-13T10:00:01Z");

        assert_eq!(booking_amount(None, &w, money("1000")), money("4000"));
    }

    #[test]
    fn explicit_amount_wins() {
        let w = window("2024-05-10T10:00:00Z", "2024-05-13T10:00:00Z");

        assert_eq!(
            booking_amount(Some(money("2500")), &w, money("1000")),
            money("2500"),
        );
    }
}
