//! [`Query`] collection related to the multiple [`Payment`]s.

use common::operations::By;

#[cfg(doc)]
use crate::domain::User;
use crate::domain::{user, Payment};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries the [`Payment`]s of a [`User`], newest first.
pub type OfUser = DatabaseQuery<By<Vec<Payment>, user::Id>>;
