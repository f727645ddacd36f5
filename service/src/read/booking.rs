//! [`Booking`]-related read definitions.

use derive_more::{Deref, From, Into};

#[cfg(doc)]
use crate::domain::Booking;

/// Indicator whether a conflicting [`Booking`] exists.
#[derive(Clone, Copy, Debug, Deref, Eq, Hash, PartialEq)]
pub struct HasConflict(pub bool);

impl PartialEq<bool> for HasConflict {
    fn eq(&self, other: &bool) -> bool {
        self.0 == *other
    }
}

/// Number of [`Booking`]s of a [`Car`] still holding it now or in the future.
///
/// Counts non-cancelled [`Booking`]s whose [`Window`] hasn't ended yet.
///
/// [`Car`]: crate::domain::Car
/// [`Window`]: crate::domain::booking::Window
#[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
pub struct ActiveCount(i64);

impl ActiveCount {
    /// Indicates whether there are no counted [`Booking`]s at all.
    #[must_use]
    pub fn is_zero(self) -> bool {
        i64::from(self) == 0
    }
}

/// Number of rentals of a host being in progress.
///
/// Counts paid [`Booking`]s whose rental is in its active phase.
#[derive(Clone, Copy, Debug, Eq, From, Hash, Into, PartialEq)]
pub struct ActiveRentals(i64);

/// Counts of [`Booking`]s advanced by a rental status sweep.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Swept {
    /// Number of [`Booking`]s whose rental turned active.
    pub activated: u64,

    /// Number of [`Booking`]s whose rental turned completed.
    pub completed: u64,
}

impl Swept {
    /// Indicates whether the sweep advanced any [`Booking`]s.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.activated == 0 && self.completed == 0
    }
}

pub mod conflict {
    //! [`Booking`] conflict detection definitions.

    use crate::domain::{booking, car};
    #[cfg(doc)]
    use crate::domain::{Booking, Car};

    /// Selector of [`Booking`]s conflicting with a requested window.
    #[derive(Clone, Copy, Debug)]
    pub struct Selector {
        /// ID of the [`Car`] to check.
        pub car_id: car::Id,

        /// Requested [`booking::Window`].
        pub window: booking::Window,

        /// ID of a [`Booking`] to ignore, if any.
        pub exclude: Option<booking::Id>,
    }
}
