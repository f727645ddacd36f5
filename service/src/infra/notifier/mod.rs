//! [`Notifier`]-related implementations.

#[cfg(feature = "fcm")]
pub mod fcm;

use derive_more::{Display, Error as StdError, From};

use crate::domain::{booking, car, user};

#[cfg(feature = "fcm")]
pub use self::fcm::Fcm;

/// Push notifications operation.
pub use common::Handler as Notifier;

/// Operation of pushing a [`Message`] to a device.
#[derive(Clone, Debug)]
pub struct Push {
    /// [`user::DeviceToken`] of the device to push to.
    pub device_token: user::DeviceToken,

    /// [`Message`] to be pushed.
    pub message: Message,
}

/// Message pushed to a device.
#[derive(Clone, Debug)]
pub struct Message {
    /// Title of this [`Message`].
    pub title: String,

    /// Body of this [`Message`].
    pub body: String,

    /// [`Data`] payload of this [`Message`].
    pub data: Data,
}

/// Data payload of a [`Message`], letting the receiving device route it.
#[derive(Clone, Copy, Debug)]
pub struct Data {
    /// Kind of the event this [`Message`] describes.
    pub event: Event,

    /// ID of the car the event is about.
    pub car_id: car::Id,

    /// ID of the booking the event is about.
    pub booking_id: booking::Id,
}

/// Kind of an event a [`Message`] describes.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Event {
    /// Booking has been placed.
    #[display("booking_created")]
    BookingCreated,

    /// Booking has been cancelled.
    #[display("booking_cancelled")]
    BookingCancelled,
}

/// [`Notifier`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "fcm")]
    /// [`Fcm`] error.
    Fcm(fcm::Error),
}

impl Error {
    /// Checks whether this [`Error`] means the pushed device token is not
    /// registered anymore, so should be forgotten.
    #[must_use]
    pub fn is_unregistered_token(&self) -> bool {
        match self {
            #[cfg(feature = "fcm")]
            Self::Fcm(e) => matches!(e, fcm::Error::TokenNotRegistered),
        }
    }
}
