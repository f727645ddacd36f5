//! [`Car`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf, Money, Percent};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user;
#[cfg(doc)]
use crate::domain::{Booking, User};

/// Car listed for rent.
#[derive(Clone, Debug)]
pub struct Car {
    /// ID of this [`Car`].
    pub id: Id,

    /// ID of the [`User`] hosting this [`Car`].
    pub host_id: user::Id,

    /// [`Brand`] of this [`Car`].
    pub brand: Brand,

    /// [`Model`] of this [`Car`].
    pub model: Model,

    /// Price of renting this [`Car`] for a day.
    pub price_per_day: Money,

    /// Listed price of this [`Car`] before any discount.
    pub original_price: Money,

    /// Indicator whether this [`Car`] is available for booking.
    ///
    /// Reflects the current [`Booking`]s of this [`Car`], so may lag behind
    /// them. [`Booking`] conflict checks never rely on it.
    pub is_available: bool,

    /// [`DateTime`] when this [`Car`] was created.
    pub created_at: CreationDateTime,
}

impl Car {
    /// Returns the discounted offer price of this [`Car`].
    #[must_use]
    pub fn offer_price(&self) -> Money {
        #[expect(unsafe_code, reason = "`80` is in `[0, 100]` range")]
        let share = unsafe { Percent::new_unchecked(Decimal::from(80)) };
        share.of(self.original_price)
    }
}

/// ID of a [`Car`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[cfg_attr(feature = "postgres", derive(ToSql, FromSql), postgres(transparent))]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Brand of a [`Car`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Brand(String);

impl Brand {
    /// Creates a new [`Brand`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `brand` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(brand: impl Into<String>) -> Self {
        Self(brand.into())
    }

    /// Creates a new [`Brand`] if the given `brand` is valid.
    #[must_use]
    pub fn new(brand: impl Into<String>) -> Option<Self> {
        let brand = brand.into();
        Self::check(&brand).then_some(Self(brand))
    }

    /// Checks whether the given `brand` is a valid [`Brand`].
    fn check(brand: impl AsRef<str>) -> bool {
        let brand = brand.as_ref();
        brand.trim() == brand && !brand.is_empty() && brand.len() <= 512
    }
}

impl FromStr for Brand {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Brand`")
    }
}

/// Model of a [`Car`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Model(String);

impl Model {
    /// Creates a new [`Model`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `model` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(model: impl Into<String>) -> Self {
        Self(model.into())
    }

    /// Creates a new [`Model`] if the given `model` is valid.
    #[must_use]
    pub fn new(model: impl Into<String>) -> Option<Self> {
        let model = model.into();
        Self::check(&model).then_some(Self(model))
    }

    /// Checks whether the given `model` is a valid [`Model`].
    fn check(model: impl AsRef<str>) -> bool {
        let model = model.as_ref();
        model.trim() == model && !model.is_empty() && model.len() <= 512
    }
}

impl FromStr for Model {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Model`")
    }
}

/// [`DateTime`] when a [`Car`] was created.
pub type CreationDateTime = DateTimeOf<(Car, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::{Currency, Money};
    use rust_decimal::Decimal;

    use super::{Brand, Car, CreationDateTime, Id, Model};
    use crate::domain::user;

    fn car(original_price: Money) -> Car {
        Car {
            id: Id::new(),
            host_id: user::Id::new(),
            brand: Brand::new("Mahindra").unwrap(),
            model: Model::new("Thar").unwrap(),
            price_per_day: Money {
                amount: Decimal::from(1000),
                currency: Currency::Inr,
            },
            original_price,
            is_available: true,
            created_at: CreationDateTime::now(),
        }
    }

    #[test]
    fn offer_price_is_80_percent() {
        let c = car(Money {
            amount: Decimal::from(2500),
            currency: Currency::Inr,
        });

        assert_eq!(
            c.offer_price(),
            Money {
                amount: Decimal::from(2000),
                currency: Currency::Inr,
            },
        );
    }

    #[test]
    fn brand_rejects_malformed() {
        assert!(Brand::new("").is_none());
        assert!(Brand::new(" BMW").is_none());
        assert!(Brand::new("BMW").is_some());
    }
}
