//! Background [`Task`]s definitions.

mod background;
pub mod clean_login_codes;
pub mod reconcile_availability;
pub mod relink_payments;
pub mod sweep_rentals;

pub use common::Handler as Task;

pub use self::{
    background::Background, clean_login_codes::CleanLoginCodes,
    reconcile_availability::ReconcileAvailability,
    relink_payments::RelinkPayments, sweep_rentals::SweepRentals,
};
