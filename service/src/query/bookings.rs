//! [`Query`] collection related to the multiple [`Booking`]s.

use common::operations::By;

#[cfg(doc)]
use crate::domain::User;
use crate::domain::{user, Booking};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the [`Booking`]s there are, newest first.
pub type All = DatabaseQuery<By<Vec<Booking>, ()>>;

/// Queries the [`Booking`]s rented by a [`User`], newest first.
pub type OfRenter = DatabaseQuery<By<Vec<Booking>, user::Id>>;
