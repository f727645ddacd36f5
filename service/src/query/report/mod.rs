//! Report [`Query`] collection.
//!
//! [`Query`]: crate::Query

pub mod host_dashboard;

pub use self::host_dashboard::HostDashboard;
