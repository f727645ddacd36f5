//! [`SweepRentals`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::{
    operations::{By, Perform, Start, Update},
    DateTime,
};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::Booking;
use crate::{
    infra::{database, Database},
    read,
    Service,
};

use super::Task;

/// Configuration for [`SweepRentals`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between rental status sweeps.
    pub interval: time::Duration,
}

/// [`Task`] for advancing the rental status of [`Booking`]s in time.
///
/// Turns upcoming rentals active once their window starts, and active ones
/// completed once their window ends.
#[derive(Clone, Copy, Debug)]
pub struct SweepRentals<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db, Gw, Nf> Task<Start<By<SweepRentals<Self>, Config>>>
    for Service<Db, Gw, Nf>
where
    SweepRentals<Service<Db, Gw, Nf>>:
        Task<Perform<()>, Ok = (), Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<SweepRentals<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = SweepRentals {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::SweepRentals` failed: {e}");
            });
        }
    }
}

impl<Db, Gw, Nf> Task<Perform<()>> for SweepRentals<Service<Db, Gw, Nf>>
where
    Db: Database<
        Update<By<read::booking::Swept, DateTime>>,
        Ok = read::booking::Swept,
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let swept = self
            .service
            .database()
            .execute(Update(By::new(DateTime::now())))
            .await
            .map_err(tracerr::map_from_and_wrap!())?;
        if !swept.is_empty() {
            log::debug!(
                "`task::SweepRentals`: {} rentals activated, {} completed",
                swept.activated,
                swept.completed,
            );
        }
        Ok(())
    }
}

/// Error of [`SweepRentals`] execution.
pub type ExecutionError = Traced<database::Error>;
