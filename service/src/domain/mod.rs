//! Domain definitions.

pub mod booking;
pub mod car;
pub mod payment;
pub mod user;

pub use self::{booking::Booking, car::Car, payment::Payment, user::User};
