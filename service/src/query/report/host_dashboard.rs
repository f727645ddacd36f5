//! [`HostDashboard`] definition.

use common::{
    operations::{By, Select},
    DateTime, Money,
};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::{Booking, Car, User};
use crate::{
    domain::user,
    infra::{database, Database},
    read,
    Query, Service,
};

/// [`Query`] to roll up the dashboard of a host.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct HostDashboard {
    /// ID of the [`User`] hosting the [`Car`]s.
    pub host_id: user::Id,
}

/// Output of the [`HostDashboard`] [`Query`].
#[derive(Clone, Debug)]
pub struct Output {
    /// Total number of [`Car`]s the host lists.
    pub total_cars: usize,

    /// Number of rentals of the host being in progress.
    pub active_rentals: read::booking::ActiveRentals,

    /// Total earned by the host over [`Booking`]s starting in the current
    /// calendar month.
    pub earned_this_month: Money,

    /// Occupancy of every [`Car`] of the host, newest first.
    pub cars: Vec<read::report::CarOccupancy>,
}

impl<Db, Gw, Nf> Query<HostDashboard> for Service<Db, Gw, Nf>
where
    Db: Database<
            Select<By<read::booking::ActiveRentals, user::Id>>,
            Ok = read::booking::ActiveRentals,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<read::report::Earned, read::report::Earnings>>,
            Ok = read::report::Earned,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Vec<read::report::CarOccupancy>, user::Id>>,
            Ok = Vec<read::report::CarOccupancy>,
            Err = Traced<database::Error>,
        >,
{
    type Ok = Output;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        HostDashboard { host_id }: HostDashboard,
    ) -> Result<Self::Ok, Self::Err> {
        let active_rentals = self
            .database()
            .execute(Select(By::<read::booking::ActiveRentals, _>::new(
                host_id,
            )))
            .await
            .map_err(tracerr::wrap!())?;

        let earned = self
            .database()
            .execute(Select(By::<read::report::Earned, _>::new(
                read::report::Earnings {
                    host_id,
                    since: DateTime::now().month_start(),
                },
            )))
            .await
            .map_err(tracerr::wrap!())?;

        let cars = self
            .database()
            .execute(Select(By::<Vec<read::report::CarOccupancy>, _>::new(
                host_id,
            )))
            .await
            .map_err(tracerr::wrap!())?;

        Ok(Output {
            total_cars: cars.len(),
            active_rentals,
            earned_this_month: Money {
                amount: earned.into(),
                currency: self.config.currency,
            },
            cars,
        })
    }
}
