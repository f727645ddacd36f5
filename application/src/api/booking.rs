//! `Booking`-related endpoints.

use axum::{extract::Path, Extension, Json};
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{self, booking},
    infra::notifier,
    query, Query as _,
};
use tracing as log;
use uuid::Uuid;

use crate::{
    api::{Money, PrivilegeError, Success},
    define_error, AsError, Auth, Error, Service,
};

/// A `Booking` of a `Car`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    /// Unique ID of this `Booking`.
    pub id: Uuid,

    /// ID of the `User` renting the `Car`.
    pub renter_id: Uuid,

    /// ID of the rented `Car`.
    pub car_id: Uuid,

    /// ID of the `User` hosting the rented `Car`.
    pub host_id: Uuid,

    /// Date and time when the rental starts, in [RFC 3339] format.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub start_date: booking::StartDateTime,

    /// Date and time when the rental ends, in [RFC 3339] format.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub end_date: booking::EndDateTime,

    /// Total amount paid for this `Booking`.
    pub amount: Money,

    /// Location where the `Car` is picked up.
    pub pick_up_location: String,

    /// Location where the `Car` is dropped off.
    pub drop_off_location: String,

    /// Commercial status of this `Booking`.
    pub status: String,

    /// Rental phase of this `Booking`.
    pub rental_status: String,

    /// Payment status of this `Booking`.
    pub payment_status: String,

    /// ID of the `Payment` this `Booking` was paid with.
    pub payment_id: Uuid,

    /// Date and time when this `Booking` was placed, in [RFC 3339] format.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub created_at: booking::CreationDateTime,
}

impl From<domain::Booking> for Booking {
    fn from(booking: domain::Booking) -> Self {
        Self {
            id: booking.id.into(),
            renter_id: booking.renter_id.into(),
            car_id: booking.car_id.into(),
            host_id: booking.host_id.into(),
            start_date: booking.window.start(),
            end_date: booking.window.end(),
            amount: booking.amount.into(),
            pick_up_location: booking.pick_up.to_string(),
            drop_off_location: booking.drop_off.to_string(),
            status: booking.status.to_string(),
            rental_status: booking.rental_status.to_string(),
            payment_status: booking.payment_status.to_string(),
            payment_id: booking.payment_id.into(),
            created_at: booking.created_at,
        }
    }
}

/// Payload carrying a single [`Booking`].
#[derive(Debug, Serialize)]
pub struct Single {
    /// The `Booking` itself.
    pub booking: Booking,
}

/// Payload carrying a list of [`Booking`]s.
#[derive(Debug, Serialize)]
pub struct List {
    /// Number of the listed `Booking`s.
    pub count: usize,

    /// The `Booking`s themselves.
    pub bookings: Vec<Booking>,
}

/// Request body of the `Booking` creation endpoint.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    /// ID of the `Car` to book.
    pub car_id: Uuid,

    /// Date and time when the rental starts, in [RFC 3339] format.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub start_date: booking::StartDateTime,

    /// Date and time when the rental ends, in [RFC 3339] format.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub end_date: booking::EndDateTime,

    /// Location to pick the `Car` up at.
    pub pick_up_location: String,

    /// Location to drop the `Car` off at.
    pub drop_off_location: String,

    /// ID of the captured `Payment` paying for the `Booking`.
    pub payment_id: Uuid,

    /// Explicit total amount of the `Booking`.
    ///
    /// Derived from the daily price of the `Car` when omitted.
    pub amount: Option<Money>,
}

/// Books a `Car` for the authenticated `User`.
///
/// # Errors
///
/// Possible error codes:
/// - `INVALID_INPUT` - the provided fields are malformed;
/// - `CAR_NOT_EXISTS` - no `Car` with the provided ID exists;
/// - `CAR_UNAVAILABLE` - the `Car` is closed for booking;
/// - `WINDOW_CONFLICT` - the `Car` is booked over the requested dates;
/// - `PAYMENT_NOT_EXISTS` - no `Payment` with the provided ID exists;
/// - `FOREIGN_PAYMENT` - the `Payment` belongs to another `User`;
/// - `PAYMENT_NOT_CAPTURED` - the `Payment` is not captured;
/// - `PAYMENT_ALREADY_USED` - the `Payment` pays for another `Booking`.
pub async fn create(
    Extension(service): Extension<Service>,
    auth: Auth,
    Json(req): Json<CreateRequest>,
) -> Result<(http::StatusCode, Json<Success<Single>>), Error> {
    let window =
        booking::Window::new(req.start_date, req.end_date).ok_or_else(
            || Error::invalid_input(&"`startDate` must be before `endDate`"),
        )?;
    let pick_up = req
        .pick_up_location
        .parse::<booking::Location>()
        .map_err(|e| Error::invalid_input(&e))?;
    let drop_off = req
        .drop_off_location
        .parse::<booking::Location>()
        .map_err(|e| Error::invalid_input(&e))?;

    let booking = service
        .execute(command::CreateBooking {
            renter_id: auth.user.id,
            car_id: req.car_id.into(),
            window,
            pick_up,
            drop_off,
            payment_id: req.payment_id.into(),
            amount: req.amount.map(Into::into),
        })
        .await
        .map_err(AsError::into_error)?;

    notify(&service, booking.clone(), notifier::Event::BookingCreated);

    Ok((
        http::StatusCode::CREATED,
        Json(Success::new(
            "Booking created successfully",
            Single {
                booking: booking.into(),
            },
        )),
    ))
}

/// Lists the `Booking`s of the authenticated `User`, newest first.
pub async fn list(
    Extension(service): Extension<Service>,
    auth: Auth,
) -> Result<Json<Success<List>>, Error> {
    let bookings = service
        .execute(query::bookings::OfRenter::by(auth.user.id))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Success::new(
        "Bookings fetched successfully",
        List {
            count: bookings.len(),
            bookings: bookings.into_iter().map(Into::into).collect(),
        },
    )))
}

/// Lists all the `Booking`s of the platform, newest first.
///
/// # Errors
///
/// Possible error codes:
/// - `NOT_ADMIN` - the authenticated `User` is not an administrator.
pub async fn all(
    Extension(service): Extension<Service>,
    auth: Auth,
) -> Result<Json<Success<List>>, Error> {
    if !auth.user.is_admin() {
        return Err(PrivilegeError::Admin.into());
    }

    let bookings = service
        .execute(query::bookings::All::by(()))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Success::new(
        "Bookings fetched successfully",
        List {
            count: bookings.len(),
            bookings: bookings.into_iter().map(Into::into).collect(),
        },
    )))
}

/// Returns the `Booking` with the provided ID.
///
/// Only the renter of the `Booking` and administrators may see it.
///
/// # Errors
///
/// Possible error codes:
/// - `BOOKING_NOT_EXISTS` - no `Booking` with the provided ID exists;
/// - `FOREIGN_BOOKING` - the `Booking` is rented by another `User`.
pub async fn find(
    Extension(service): Extension<Service>,
    auth: Auth,
    Path(id): Path<Uuid>,
) -> Result<Json<Success<Single>>, Error> {
    let booking = service
        .execute(query::booking::ById::by(id.into()))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| Error::from(BookingError::NotExists))?;

    if booking.renter_id != auth.user.id && !auth.user.is_admin() {
        return Err(BookingError::Foreign.into());
    }

    Ok(Json(Success::new(
        "Booking fetched successfully",
        Single {
            booking: booking.into(),
        },
    )))
}

/// Cancels the `Booking` with the provided ID.
///
/// Cancellation is a terminal state, so doesn't happen twice. The dates
/// remain occupied until the rental sweep reconciles them.
///
/// # Errors
///
/// Possible error codes:
/// - `BOOKING_NOT_EXISTS` - no `Booking` with the provided ID exists;
/// - `FOREIGN_BOOKING` - the `Booking` is rented by another `User`;
/// - `ALREADY_CANCELLED` - the `Booking` is cancelled already.
pub async fn cancel(
    Extension(service): Extension<Service>,
    auth: Auth,
    Path(id): Path<Uuid>,
) -> Result<Json<Success<Single>>, Error> {
    let booking = service
        .execute(command::CancelBooking {
            booking_id: id.into(),
            renter_id: auth.user.id,
        })
        .await
        .map_err(AsError::into_error)?;

    notify(&service, booking.clone(), notifier::Event::BookingCancelled);

    Ok(Json(Success::new(
        "Booking cancelled successfully",
        Single {
            booking: booking.into(),
        },
    )))
}

/// Dispatches a push notification about the `event` without blocking or
/// failing the enclosing request.
fn notify(
    service: &Service,
    booking: domain::Booking,
    event: notifier::Event,
) {
    let service = service.clone();
    _ = tokio::spawn(async move {
        _ = service
            .execute(command::NotifyBookingEvent { booking, event })
            .await
            .map_err(|e| log::warn!("failed to push a booking event: {e}"));
    });
}

impl AsError for command::create_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "CAR_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Car` with the provided ID is not exists"]
                CarNotExists,

                #[code = "CAR_UNAVAILABLE"]
                #[status = BAD_REQUEST]
                #[message = "`Car` with the provided ID is not available \
                             for booking"]
                CarUnavailable,

                #[code = "FOREIGN_PAYMENT"]
                #[status = FORBIDDEN]
                #[message = "`Payment` with the provided ID belongs to \
                             another `User`"]
                ForeignPayment,

                #[code = "PAYMENT_ALREADY_USED"]
                #[status = BAD_REQUEST]
                #[message = "`Payment` with the provided ID pays for \
                             another `Booking` already"]
                PaymentAlreadyUsed,

                #[code = "PAYMENT_NOT_CAPTURED"]
                #[status = BAD_REQUEST]
                #[message = "`Payment` with the provided ID is not captured"]
                PaymentNotCaptured,

                #[code = "PAYMENT_NOT_EXISTS"]
                #[status = NOT_FOUND]
                #[message = "`Payment` with the provided ID is not exists"]
                PaymentNotExists,

                #[code = "WINDOW_CONFLICT"]
                #[status = BAD_REQUEST]
                #[message = "`Car` with the provided ID is already booked \
                             over the requested dates"]
                WindowConflict,
            }
        }

        match self {
            Self::CarNotExists(_) => Some(Error::CarNotExists.into()),
            Self::CarUnavailable(_) => Some(Error::CarUnavailable.into()),
            Self::Db(e) => e.try_as_error(),
            Self::ForeignPayment(_) => Some(Error::ForeignPayment.into()),
            Self::PaymentAlreadyUsed(_) => {
                Some(Error::PaymentAlreadyUsed.into())
            }
            Self::PaymentNotCaptured(_) => {
                Some(Error::PaymentNotCaptured.into())
            }
            Self::PaymentNotExists(_) => Some(Error::PaymentNotExists.into()),
            Self::WindowConflict(_) => Some(Error::WindowConflict.into()),
        }
    }
}

impl AsError for command::cancel_booking::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "ALREADY_CANCELLED"]
                #[status = BAD_REQUEST]
                #[message = "`Booking` with the provided ID is cancelled \
                             already"]
                AlreadyCancelled,
            }
        }

        match self {
            Self::AlreadyCancelled(_) => Some(Error::AlreadyCancelled.into()),
            Self::BookingNotExists(_) => Some(BookingError::NotExists.into()),
            Self::Db(e) => e.try_as_error(),
            Self::ForeignBooking(_) => Some(BookingError::Foreign.into()),
        }
    }
}

define_error! {
    enum BookingError {
        #[code = "FOREIGN_BOOKING"]
        #[status = FORBIDDEN]
        #[message = "`Booking` with the provided ID is rented by another \
                     `User`"]
        Foreign,

        #[code = "BOOKING_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Booking` with the provided ID is not exists"]
        NotExists,
    }
}
