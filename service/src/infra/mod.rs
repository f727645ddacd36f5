//! Infrastructure layer.

pub mod database;
pub mod gateway;
pub mod notifier;

pub use self::{database::Database, gateway::Gateway, notifier::Notifier};
#[cfg(feature = "postgres")]
pub use self::database::{postgres, Postgres};
#[cfg(feature = "razorpay")]
pub use self::gateway::Razorpay;
#[cfg(feature = "fcm")]
pub use self::notifier::Fcm;
