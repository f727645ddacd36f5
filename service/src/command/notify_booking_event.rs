//! [`Command`] for notifying [`Booking`] participants about an event.

use common::operations::{By, Select, Update};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{car, user, Booking, Car, User},
    infra::{database, notifier, Database, Notifier},
    Service,
};

use super::Command;

/// [`Command`] for pushing an [`Event`] of a [`Booking`] to the devices of
/// both its participants.
///
/// Delivery is best-effort: devices without a registered
/// [`user::DeviceToken`] are skipped, and push failures are logged without
/// failing the whole [`Command`]. A [`user::DeviceToken`] reported as
/// unregistered is forgotten.
///
/// [`Event`]: notifier::Event
#[derive(Clone, Debug)]
pub struct NotifyBookingEvent {
    /// [`Booking`] the event happened to.
    pub booking: Booking,

    /// Kind of the happened event.
    pub event: notifier::Event,
}

impl<Db, Gw, Nf> Command<NotifyBookingEvent> for Service<Db, Gw, Nf>
where
    Db: Database<
            Select<By<Option<Car>, car::Id>>,
            Ok = Option<Car>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Update<User>, Ok = (), Err = Traced<database::Error>>,
    Nf: Notifier<notifier::Push, Ok = (), Err = Traced<notifier::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: NotifyBookingEvent,
    ) -> Result<Self::Ok, Self::Err> {
        let NotifyBookingEvent { booking, event } = cmd;

        let Some(car) = self
            .database()
            .execute(Select(By::<Option<Car>, _>::new(booking.car_id)))
            .await
            .map_err(tracerr::wrap!())?
        else {
            log::warn!(
                "cannot notify about `Booking(id: {})`: \
                 its `Car(id: {})` is gone",
                booking.id,
                booking.car_id,
            );
            return Ok(());
        };

        let car_name = format!("{} {}", car.brand, car.model);
        let (host_message, renter_message) = match event {
            notifier::Event::BookingCreated => {
                let start = booking.window.start().to_rfc3339();
                let end = booking.window.end().to_rfc3339();
                (
                    (
                        "New Booking Received".to_owned(),
                        format!(
                            "Your car {car_name} is booked \
                             from {start} to {end}.",
                        ),
                    ),
                    (
                        "Booking Confirmed".to_owned(),
                        format!(
                            "You booked {car_name} from {start} to {end}.",
                        ),
                    ),
                )
            }
            notifier::Event::BookingCancelled => (
                (
                    "Booking Cancellation".to_owned(),
                    format!(
                        "A booking of your car {car_name} \
                         has been cancelled.",
                    ),
                ),
                (
                    "Booking Cancellation".to_owned(),
                    format!("Your booking of {car_name} has been cancelled."),
                ),
            ),
        };

        let recipients = [
            (booking.host_id, host_message),
            (booking.renter_id, renter_message),
        ];
        for (user_id, (title, body)) in recipients {
            let Some(mut user) = self
                .database()
                .execute(Select(By::<Option<User>, _>::new(user_id)))
                .await
                .map_err(tracerr::wrap!())?
            else {
                log::warn!(
                    "cannot notify `User(id: {user_id})` about \
                     `Booking(id: {})`: the `User` is gone",
                    booking.id,
                );
                continue;
            };
            let Some(device_token) = user.device_token.clone() else {
                continue;
            };

            let pushed = self
                .notifier()
                .execute(notifier::Push {
                    device_token,
                    message: notifier::Message {
                        title,
                        body,
                        data: notifier::Data {
                            event,
                            car_id: booking.car_id,
                            booking_id: booking.id,
                        },
                    },
                })
                .await;
            if let Err(e) = pushed {
                if e.as_ref().is_unregistered_token() {
                    log::info!(
                        "`User(id: {user_id})` device token is not \
                         registered anymore, forgetting it",
                    );
                    user.device_token = None;
                    self.database()
                        .execute(Update(user))
                        .await
                        .map_err(tracerr::wrap!())?;
                } else {
                    log::warn!(
                        "cannot push to `User(id: {user_id})` device: {e}",
                    );
                }
            }
        }

        Ok(())
    }
}

/// Error of [`NotifyBookingEvent`] [`Command`] execution.
pub type ExecutionError = database::Error;
