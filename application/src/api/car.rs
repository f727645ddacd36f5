//! `Car`-related endpoints.

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain, query, read, Query as _,
};
use uuid::Uuid;

use crate::{
    api::{Empty, Money, PrivilegeError, Success},
    define_error, AsError, Auth, Error, Service,
};

/// A `Car` listed on the platform.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    /// Unique ID of this `Car`.
    pub id: Uuid,

    /// ID of the `User` hosting this `Car`.
    pub host_id: Uuid,

    /// Brand of this `Car`.
    pub brand: String,

    /// Model of this `Car`.
    pub model: String,

    /// Price of renting this `Car` for a day.
    pub price_per_day: Money,

    /// Listed price of this `Car` before any discount.
    pub original_price: Money,

    /// Discounted offer price of this `Car`.
    pub offer_price: Money,

    /// Indicator whether this `Car` is open for booking.
    pub is_available: bool,

    /// Date and time when this `Car` was listed, in [RFC 3339] format.
    ///
    /// [RFC 3339]: https://datatracker.ietf.org/doc/html/rfc3339
    #[serde(with = "common::datetime::serde::rfc3339")]
    pub created_at: domain::car::CreationDateTime,
}

impl From<domain::Car> for Car {
    fn from(car: domain::Car) -> Self {
        let offer_price = car.offer_price().into();
        Self {
            id: car.id.into(),
            host_id: car.host_id.into(),
            brand: car.brand.to_string(),
            model: car.model.to_string(),
            price_per_day: car.price_per_day.into(),
            original_price: car.original_price.into(),
            offer_price,
            is_available: car.is_available,
            created_at: car.created_at,
        }
    }
}

/// Payload carrying a single [`Car`].
#[derive(Debug, Serialize)]
pub struct Single {
    /// The `Car` itself.
    pub car: Car,
}

/// Payload carrying a list of [`Car`]s.
#[derive(Debug, Serialize)]
pub struct List {
    /// Number of the listed `Car`s.
    pub count: usize,

    /// The `Car`s themselves.
    pub cars: Vec<Car>,
}

/// Request body of the `Car` creation endpoint.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    /// Brand of the `Car`.
    pub brand: String,

    /// Model of the `Car`.
    pub model: String,

    /// Price of renting the `Car` for a day.
    pub price_per_day: Money,

    /// Listed price of the `Car` before any discount.
    ///
    /// Defaults to the daily renting price.
    pub original_price: Option<Money>,
}

/// Query parameters of the `Car` list endpoint.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    /// Availability to filter by.
    ///
    /// Only available `Car`s are listed when omitted.
    pub available: Option<bool>,

    /// Brand (or its part) to search for, case-insensitively.
    pub brand: Option<String>,

    /// Lowest daily price to list, inclusive.
    pub min_price: Option<Decimal>,

    /// Highest daily price to list, inclusive.
    pub max_price: Option<Decimal>,
}

/// Request body of the `Car` availability endpoint.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityRequest {
    /// New availability of the `Car`.
    pub is_available: bool,
}

/// Lists a new `Car` on the platform.
///
/// # Errors
///
/// Possible error codes:
/// - `NOT_HOST` - the authenticated `User` is not a host;
/// - `INVALID_INPUT` - the provided fields are malformed.
pub async fn create(
    Extension(service): Extension<Service>,
    auth: Auth,
    Json(req): Json<CreateRequest>,
) -> Result<(http::StatusCode, Json<Success<Single>>), Error> {
    if !auth.user.is_host() {
        return Err(PrivilegeError::Host.into());
    }

    let brand = req
        .brand
        .parse::<domain::car::Brand>()
        .map_err(|e| Error::invalid_input(&e))?;
    let model = req
        .model
        .parse::<domain::car::Model>()
        .map_err(|e| Error::invalid_input(&e))?;
    let price_per_day = common::Money::from(req.price_per_day);
    let original_price =
        req.original_price.map_or(price_per_day, Into::into);

    let car = service
        .execute(command::CreateCar {
            host_id: auth.user.id,
            brand,
            model,
            price_per_day,
            original_price,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((
        http::StatusCode::CREATED,
        Json(Success::new(
            "Car created successfully",
            Single { car: car.into() },
        )),
    ))
}

/// Lists the `Car`s matching the provided filter.
pub async fn list(
    Extension(service): Extension<Service>,
    Query(params): Query<ListParams>,
) -> Result<Json<Success<List>>, Error> {
    let mut filter = read::car::list::Filter::default();
    if let Some(available) = params.available {
        filter.available = Some(available);
    }
    filter.brand = params
        .brand
        .map(|brand| brand.parse::<domain::car::Brand>())
        .transpose()
        .map_err(|e| Error::invalid_input(&e))?;
    filter.min_price = params.min_price;
    filter.max_price = params.max_price;

    let cars = service
        .execute(query::cars::List::by(filter))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(Success::new(
        "Cars fetched successfully",
        List {
            count: cars.len(),
            cars: cars.into_iter().map(Into::into).collect(),
        },
    )))
}

/// Returns the `Car` with the provided ID.
///
/// # Errors
///
/// Possible error codes:
/// - `CAR_NOT_EXISTS` - no `Car` with the provided ID exists.
pub async fn find(
    Extension(service): Extension<Service>,
    Path(id): Path<Uuid>,
) -> Result<Json<Success<Single>>, Error> {
    let car = service
        .execute(query::car::ById::by(id.into()))
        .await
        .map_err(AsError::into_error)?
        .ok_or_else(|| Error::from(CarError::NotExists))?;

    Ok(Json(Success::new(
        "Car fetched successfully",
        Single { car: car.into() },
    )))
}

/// Toggles availability of the `Car` with the provided ID.
///
/// The change doesn't touch existing bookings, so the response message warns
/// whenever some of them still hold the `Car`.
///
/// # Errors
///
/// Possible error codes:
/// - `NOT_HOST` - the authenticated `User` is not a host;
/// - `CAR_NOT_EXISTS` - no `Car` with the provided ID exists;
/// - `FOREIGN_CAR` - the `Car` is hosted by another `User`.
pub async fn availability(
    Extension(service): Extension<Service>,
    auth: Auth,
    Path(id): Path<Uuid>,
    Json(req): Json<AvailabilityRequest>,
) -> Result<Json<Success<Single>>, Error> {
    if !auth.user.is_host() {
        return Err(PrivilegeError::Host.into());
    }

    let output = service
        .execute(command::UpdateCarAvailability {
            car_id: id.into(),
            host_id: auth.user.id,
            is_available: req.is_available,
        })
        .await
        .map_err(AsError::into_error)?;

    let message = if output.active_bookings.is_zero() {
        "Car availability updated".to_owned()
    } else {
        format!(
            "Car availability updated, though {} booking(s) still hold it",
            i64::from(output.active_bookings),
        )
    };

    Ok(Json(Success::new(
        message,
        Single {
            car: output.car.into(),
        },
    )))
}

/// Delists the `Car` with the provided ID.
///
/// # Errors
///
/// Possible error codes:
/// - `NOT_HOST` - the authenticated `User` is not a host;
/// - `CAR_NOT_EXISTS` - no `Car` with the provided ID exists;
/// - `FOREIGN_CAR` - the `Car` is hosted by another `User`;
/// - `CAR_STILL_BOOKED` - upcoming or active bookings hold the `Car`.
pub async fn delete(
    Extension(service): Extension<Service>,
    auth: Auth,
    Path(id): Path<Uuid>,
) -> Result<Json<Success<Empty>>, Error> {
    if !auth.user.is_host() {
        return Err(PrivilegeError::Host.into());
    }

    service
        .execute(command::DeleteCar {
            car_id: id.into(),
            host_id: auth.user.id,
        })
        .await
        .map(drop)
        .map_err(AsError::into_error)?;

    Ok(Json(Success::new("Car deleted successfully", Empty {})))
}

impl AsError for command::update_car_availability::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::CarNotExists(_) => Some(CarError::NotExists.into()),
            Self::Db(e) => e.try_as_error(),
            Self::ForeignCar(_) => Some(CarError::Foreign.into()),
        }
    }
}

impl AsError for command::delete_car::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "CAR_STILL_BOOKED"]
                #[status = BAD_REQUEST]
                #[message = "`Car` with the provided ID is still booked"]
                StillBooked,
            }
        }

        match self {
            Self::CarNotExists(_) => Some(CarError::NotExists.into()),
            Self::Db(e) => e.try_as_error(),
            Self::ForeignCar(_) => Some(CarError::Foreign.into()),
            Self::StillBooked(_) => Some(Error::StillBooked.into()),
        }
    }
}

define_error! {
    enum CarError {
        #[code = "FOREIGN_CAR"]
        #[status = FORBIDDEN]
        #[message = "`Car` with the provided ID is hosted by another `User`"]
        Foreign,

        #[code = "CAR_NOT_EXISTS"]
        #[status = NOT_FOUND]
        #[message = "`Car` with the provided ID is not exists"]
        NotExists,
    }
}
