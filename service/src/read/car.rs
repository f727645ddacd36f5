//! [`Car`]-related read definitions.

#[cfg(doc)]
use crate::domain::{Booking, Car};

/// Counts of [`Car`]s whose availability flag was reconciled with their
/// [`Booking`]s.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Reconciled {
    /// Number of [`Car`]s marked available again.
    pub freed: u64,

    /// Number of [`Car`]s marked unavailable.
    pub held: u64,
}

impl Reconciled {
    /// Indicates whether the reconciliation touched any [`Car`]s.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.freed == 0 && self.held == 0
    }
}

pub mod list {
    //! [`Car`] list definitions.

    use rust_decimal::Decimal;
    use smart_default::SmartDefault;

    use crate::domain::car;
    #[cfg(doc)]
    use crate::domain::Car;

    /// Filter for selecting a list of [`Car`]s.
    ///
    /// Only available [`Car`]s are selected by default.
    #[derive(Clone, Debug, SmartDefault)]
    pub struct Filter {
        /// Availability indicator to select [`Car`]s with.
        #[default(Some(true))]
        pub available: Option<bool>,

        /// [`car::Brand`] (or its part) to search for, case-insensitively.
        pub brand: Option<car::Brand>,

        /// Lowest [`Car::price_per_day`] amount to select, inclusive.
        pub min_price: Option<Decimal>,

        /// Highest [`Car::price_per_day`] amount to select, inclusive.
        pub max_price: Option<Decimal>,
    }
}
