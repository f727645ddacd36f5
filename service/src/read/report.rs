//! Report read definitions.

use common::DateTime;
use derive_more::{From, Into};
use rust_decimal::Decimal;

use crate::domain::{booking, car, user};
#[cfg(doc)]
use crate::domain::{Booking, Car, User};

/// Selector of the total earnings of a host for a period.
///
/// Sums the [`Booking::amount`]s of paid [`Booking`]s whose rental starts
/// after the `since` moment.
#[derive(Clone, Copy, Debug)]
pub struct Earnings {
    /// ID of the [`User`] hosting the rented [`Car`]s.
    pub host_id: user::Id,

    /// Moment the summed period starts at.
    pub since: DateTime,
}

/// Total amount earned by a host, selected by [`Earnings`].
///
/// A bare amount: all [`Booking`]s are priced in the platform currency.
#[derive(Clone, Copy, Debug, Eq, From, Into, PartialEq)]
pub struct Earned(Decimal);

/// Occupancy of a single [`Car`] of a host.
#[derive(Clone, Debug)]
pub struct CarOccupancy {
    /// ID of the [`Car`].
    pub car_id: car::Id,

    /// [`car::Brand`] of the [`Car`].
    pub brand: car::Brand,

    /// [`car::Model`] of the [`Car`].
    pub model: car::Model,

    /// Rental occupying the [`Car`], if any.
    ///
    /// The active rental wins over upcoming ones, and the earliest upcoming
    /// rental wins over later ones. [`None`] means the [`Car`] stands idle.
    pub rental: Option<OccupyingRental>,
}

/// Rental occupying a [`Car`] now or next.
#[derive(Clone, Debug)]
pub struct OccupyingRental {
    /// ID of the [`Booking`] of this rental.
    pub booking_id: booking::Id,

    /// [`booking::RentalStatus`] of this rental.
    pub rental_status: booking::RentalStatus,

    /// [`user::Name`] of the renter.
    pub renter_name: Option<user::Name>,

    /// [`booking::Window`] of this rental.
    pub window: booking::Window,
}
