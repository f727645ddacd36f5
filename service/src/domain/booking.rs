//! [`Booking`] definitions.

use common::{define_kind, unit, DateTime, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
#[cfg(feature = "postgres")]
use postgres_types::{FromSql, ToSql};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{car, payment, user};
#[cfg(doc)]
use crate::domain::{Car, Payment, User};

/// Rental of a [`Car`] by a [`User`] for a period of time.
#[derive(Clone, Debug)]
pub struct Booking {
    /// ID of this [`Booking`].
    pub id: Id,

    /// ID of the [`User`] renting the [`Car`].
    pub renter_id: user::Id,

    /// ID of the rented [`Car`].
    pub car_id: car::Id,

    /// ID of the [`User`] hosting the rented [`Car`].
    pub host_id: user::Id,

    /// [`Window`] of time this [`Booking`] reserves the [`Car`] for.
    pub window: Window,

    /// Total amount paid for this [`Booking`].
    pub amount: Money,

    /// [`Location`] where the [`Car`] is picked up.
    pub pick_up: Location,

    /// [`Location`] where the [`Car`] is dropped off.
    pub drop_off: Location,

    /// Commercial [`Status`] of this [`Booking`].
    pub status: Status,

    /// [`RentalStatus`] of this [`Booking`].
    ///
    /// Advanced in time by a periodic sweep, so may lag behind the
    /// [`Window`] boundaries up to the sweep interval.
    pub rental_status: RentalStatus,

    /// [`PaymentStatus`] of this [`Booking`].
    pub payment_status: PaymentStatus,

    /// ID of the [`Payment`] this [`Booking`] was paid with.
    pub payment_id: payment::Id,

    /// [`DateTime`] when this [`Booking`] was created.
    pub created_at: CreationDateTime,
}

impl Booking {
    /// Indicates whether this [`Booking`] may still be cancelled.
    #[must_use]
    pub fn is_cancellable(&self) -> bool {
        !matches!(self.status, Status::Cancelled)
    }
}

/// ID of a [`Booking`].
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

/// Half-open `[start, end)` interval of time a [`Booking`] reserves.
#[derive(Clone, Copy, Debug)]
pub struct Window {
    /// [`DateTime`] when the rental starts.
    start: StartDateTime,

    /// [`DateTime`] when the rental ends.
    end: EndDateTime,
}

impl Window {
    /// Creates a new [`Window`] if its boundaries are ordered.
    #[must_use]
    pub fn new(start: StartDateTime, end: EndDateTime) -> Option<Self> {
        (start.coerce() < end).then_some(Self { start, end })
    }

    /// Creates a new [`Window`] without checking its boundaries.
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `start` is strictly before the
    /// given `end`.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(
        start: StartDateTime,
        end: EndDateTime,
    ) -> Self {
        Self { start, end }
    }

    /// Returns [`DateTime`] when this [`Window`] starts.
    #[must_use]
    pub fn start(&self) -> StartDateTime {
        self.start
    }

    /// Returns [`DateTime`] when this [`Window`] ends.
    #[must_use]
    pub fn end(&self) -> EndDateTime {
        self.end
    }

    /// Indicates whether this [`Window`] overlaps with the `other` one.
    ///
    /// [`Window`]s sharing a boundary only don't overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start.coerce() < other.end && other.start.coerce() < self.end
    }

    /// Returns the number of days this [`Window`] spans.
    ///
    /// A partial day counts as a whole one, and a [`Window`] shorter than a
    /// day still spans 1 day.
    #[must_use]
    pub fn days(&self) -> u64 {
        let dur = self.end.coerce::<()>() - self.start.coerce();
        let secs = dur.as_secs() + u64::from(dur.subsec_nanos() > 0);
        secs.div_ceil(86_400).max(1)
    }

    /// Returns the [`RentalStatus`] this [`Window`] implies at the `now`
    /// moment.
    #[must_use]
    pub fn phase(&self, now: DateTime) -> RentalStatus {
        if now > self.end.coerce() {
            RentalStatus::Completed
        } else if now >= self.start.coerce() {
            RentalStatus::Active
        } else {
            RentalStatus::Upcoming
        }
    }
}

/// Location where a [`Car`] is picked up or dropped off.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
#[cfg_attr(feature = "postgres", derive(FromSql, ToSql), postgres(transparent))]
pub struct Location(String);

impl Location {
    /// Creates a new [`Location`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `location` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(location: impl Into<String>) -> Self {
        Self(location.into())
    }

    /// Creates a new [`Location`] if the given `location` is valid.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Option<Self> {
        let location = location.into();
        Self::check(&location).then_some(Self(location))
    }

    /// Checks whether the given `location` is a valid [`Location`].
    fn check(location: impl AsRef<str>) -> bool {
        let location = location.as_ref();
        location.trim() == location
            && !location.is_empty()
            && location.len() <= 512
    }
}

impl FromStr for Location {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Location`")
    }
}

define_kind! {
    #[doc = "Commercial status of a [`Booking`]."]
    enum Status {
        #[doc = "The [`Booking`] awaits its payment."]
        Pending = 1,

        #[doc = "The [`Booking`] is paid and holds its [`Window`]."]
        Active = 2,

        #[doc = "The [`Booking`] is paid in full."]
        Completed = 3,

        #[doc = "The [`Booking`] is cancelled and holds nothing."]
        Cancelled = 4,
    }
}

define_kind! {
    #[doc = "Possession status of a [`Booking`], derived from its [`Window`]."]
    enum RentalStatus {
        #[doc = "The rental hasn't started yet."]
        Upcoming = 1,

        #[doc = "The rental is in progress."]
        Active = 2,

        #[doc = "The rental is over."]
        Completed = 3,
    }
}

define_kind! {
    #[doc = "Status of a [`Booking`] payment."]
    enum PaymentStatus {
        #[doc = "The payment hasn't been confirmed yet."]
        Pending = 1,

        #[doc = "The payment is confirmed."]
        Completed = 2,

        #[doc = "The payment has failed."]
        Failed = 3,
    }
}

/// [`DateTime`] when a [`Booking`] was created.
pub type CreationDateTime = DateTimeOf<(Booking, unit::Creation)>;

/// [`DateTime`] when a [`Booking`] rental starts.
pub type StartDateTime = DateTimeOf<(Booking, unit::Start)>;

/// [`DateTime`] when a [`Booking`] rental ends.
pub type EndDateTime = DateTimeOf<(Booking, unit::End)>;

#[cfg(test)]
mod spec {
    use common::{Currency, DateTime, Money};
    use rust_decimal::Decimal;

    use super::{
        Booking, CreationDateTime, Id, Location, PaymentStatus, RentalStatus,
        Status, Window,
    };
    use crate::domain::{car, payment, user};

    fn window(start: &str, end: &str) -> Window {
        Window::new(
            DateTime::from_rfc3339(start).unwrap().coerce(),
            DateTime::from_rfc3339(end).unwrap().coerce(),
        )
        .unwrap()
    }

    #[test]
    fn rejects_unordered_boundaries() {
        let at = DateTime::from_rfc3339("2024-05-10T10:00:00Z").unwrap();
        assert!(Window::new(at.coerce(), at.coerce()).is_none());
        assert!(Window::new(
            at.coerce(),
            DateTime::from_rfc3339("2024-05-09T10:00:00Z").unwrap().coerce(),
        )
        .is_none());
    }

    #[test]
    fn overlapping_windows_overlap() {
        let a = window("2024-05-10T10:00:00Z", "2024-05-12T10:00:00Z");
        let b = window("2024-05-11T10:00:00Z", "2024-05-13T10:00:00Z");

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn contained_window_overlaps() {
        let outer = window("2024-05-10T10:00:00Z", "2024-05-20T10:00:00Z");
        let inner = window("2024-05-12T10:00:00Z", "2024-05-13T10:00:00Z");

        assert!(outer.overlaps(&inner));
        assert!(inner.overlaps(&outer));
    }

    #[test]
    fn touching_windows_dont_overlap() {
        let a = window("2024-05-10T10:00:00Z", "2024-05-12T10:00:00Z");
        let b = window("2024-05-12T10:00:00Z", "2024-05-14T10:00:00Z");

        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn disjoint_windows_dont_overlap() {
        let a = window("2024-05-10T10:00:00Z", "2024-05-11T10:00:00Z");
        let b = window("2024-05-13T10:00:00Z", "2024-05-14T10:00:00Z");

        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn whole_days_count_exactly() {
        assert_eq!(
            window("2024-05-10T10:00:00Z", "2024-05-13T10:00:00Z").days(),
            3,
        );
    }

    #[test]
    fn partial_day_rounds_up() {
        assert_eq!(
            window("2024-05-10T10:00:00Z", "2024-05-13T10:00:01Z").days(),
            4,
        );
    }

    #[test]
    fn sub_day_window_spans_one_day() {
        assert_eq!(
            window("2024-05-10T10:00:00Z", "2024-05-10T15:00:00Z").days(),
            1,
        );
    }

    #[test]
    fn phase_follows_the_window() {
        let w = window("2024-05-10T10:00:00Z", "2024-05-12T10:00:00Z");
        let at = |s| DateTime::from_rfc3339(s).unwrap();

        assert_eq!(
            w.phase(at("2024-05-09T10:00:00Z")),
            RentalStatus::Upcoming,
        );
        assert_eq!(w.phase(at("2024-05-10T10:00:00Z")), RentalStatus::Active);
        assert_eq!(w.phase(at("2024-05-11T10:00:00Z")), RentalStatus::Active);
        assert_eq!(
            w.phase(at("2024-05-12T10:00:01Z")),
            RentalStatus::Completed,
        );
    }

    #[test]
    fn only_cancelled_bookings_are_not_cancellable() {
        let booking = |status| Booking {
            id: Id::new(),
            renter_id: user::Id::new(),
            car_id: car::Id::new(),
            host_id: user::Id::new(),
            window: window("2024-05-10T10:00:00Z", "2024-05-12T10:00:00Z"),
            amount: Money {
                amount: Decimal::from(2000),
                currency: Currency::Inr,
            },
            pick_up: Location::new("Airport").unwrap(),
            drop_off: Location::new("Airport").unwrap(),
            status,
            rental_status: RentalStatus::Upcoming,
            payment_status: PaymentStatus::Completed,
            payment_id: payment::Id::new(),
            created_at: CreationDateTime::now(),
        };

        assert!(booking(Status::Pending).is_cancellable());
        assert!(booking(Status::Active).is_cancellable());
        assert!(booking(Status::Completed).is_cancellable());
        assert!(!booking(Status::Cancelled).is_cancellable());
    }
}
