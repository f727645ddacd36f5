//! [`Query`] collection related to the multiple [`Car`]s.

use common::operations::By;

#[cfg(doc)]
use crate::{domain::User, Query};
use crate::{
    domain::{user, Car},
    read,
};

use super::DatabaseQuery;

/// Queries a list of [`Car`]s matching a [`read::car::list::Filter`].
pub type List = DatabaseQuery<By<Vec<Car>, read::car::list::Filter>>;

/// Queries the [`Car`]s hosted by a [`User`], newest first.
pub type OfHost = DatabaseQuery<By<Vec<Car>, user::Id>>;
