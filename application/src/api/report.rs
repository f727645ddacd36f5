//! Host dashboard endpoints.

use axum::{Extension, Json};
use serde::Serialize;
use service::{domain::booking, query, read, Query as _};
use uuid::Uuid;

use crate::{
    api::{Money, PrivilegeError, Success},
    AsError, Auth, Error, Service,
};

/// Rollup of the hosting activity of a `User`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Total number of `Car`s the host lists.
    pub total_cars: usize,

    /// Number of rentals of the host being in progress.
    pub active_rentals: i64,

    /// Total earned over bookings starting in the current calendar month.
    pub earned_this_month: Money,

    /// Occupancy of every `Car` of the host, newest first.
    pub cars: Vec<CarOccupancy>,
}

/// Occupancy of a single `Car` of a host.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarOccupancy {
    /// ID of the `Car`.
    pub car_id: Uuid,

    /// Brand of the `Car`.
    pub brand: String,

    /// Model of the `Car`.
    pub model: String,

    /// Rental occupying the `Car`, if any.
    pub rental: Option<Rental>,
}

impl From<read::report::CarOccupancy> for CarOccupancy {
    fn from(occupancy: read::report::CarOccupancy) -> Self {
        Self {
            car_id: occupancy.car_id.into(),
            brand: occupancy.brand.to_string(),
            model: occupancy.model.to_string(),
            rental: occupancy.rental.map(Into::into),
        }
    }
}

/// Rental occupying a `Car` now or next.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rental {
    /// ID of the `Booking` of this rental.
    pub booking_id: Uuid,

    /// Phase of this rental.
    pub rental_status: String,

    /// Name of the renter, if still registered.
    pub renter_name: Option<String>,

    /// Date and time when this rental starts, in [RFC 3339] format.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub start_date: booking::StartDateTime,

    /// Date and time when this rental ends, in [RFC 3339] format.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub end_date: booking::EndDateTime,
}

impl From<read::report::OccupyingRental> for Rental {
    fn from(rental: read::report::OccupyingRental) -> Self {
        Self {
            booking_id: rental.booking_id.into(),
            rental_status: rental.rental_status.to_string(),
            renter_name: rental.renter_name.map(|name| name.to_string()),
            start_date: rental.window.start(),
            end_date: rental.window.end(),
        }
    }
}

/// Returns the dashboard rollups of the authenticated host.
///
/// # Errors
///
/// Possible error codes:
/// - `NOT_HOST` - the authenticated `User` is not a host.
pub async fn host_dashboard(
    Extension(service): Extension<Service>,
    auth: Auth,
) -> Result<Json<Success<Dashboard>>, Error> {
    if !auth.user.is_host() {
        return Err(PrivilegeError::Host.into());
    }

    let output = service
        .execute(query::report::HostDashboard {
            host_id: auth.user.id,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Success::new(
        "Dashboard fetched successfully",
        Dashboard {
            total_cars: output.total_cars,
            active_rentals: output.active_rentals.into(),
            earned_this_month: output.earned_this_month.into(),
            cars: output.cars.into_iter().map(Into::into).collect(),
        },
    )))
}
