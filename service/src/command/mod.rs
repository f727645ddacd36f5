//! [`Command`] definition.

pub mod authorize_user_session;
pub mod cancel_booking;
pub mod create_booking;
pub mod create_car;
pub mod create_payment_order;
pub mod create_user;
pub mod create_user_session;
pub mod delete_car;
pub mod notify_booking_event;
pub mod refund_payment;
pub mod register_device;
pub mod request_login_code;
pub mod update_car_availability;
pub mod verify_payment;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_user_session::AuthorizeUserSession,
    cancel_booking::CancelBooking, create_booking::CreateBooking,
    create_car::CreateCar, create_payment_order::CreatePaymentOrder,
    create_user::CreateUser, create_user_session::CreateUserSession,
    delete_car::DeleteCar, notify_booking_event::NotifyBookingEvent,
    refund_payment::RefundPayment, register_device::RegisterDevice,
    request_login_code::RequestLoginCode,
    update_car_availability::UpdateCarAvailability,
    verify_payment::VerifyPayment,
};
