//! [`ReconcileAvailability`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::{
    operations::{By, Perform, Start, Update},
    DateTime,
};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::{Booking, Car};
use crate::{
    infra::{database, Database},
    read,
    Service,
};

use super::Task;

/// Configuration for [`ReconcileAvailability`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between availability reconciliations.
    pub interval: time::Duration,
}

/// [`Task`] for reconciling the availability flag of [`Car`]s with their
/// [`Booking`]s.
///
/// The flag is a denormalized cache: it is cleared while some non-cancelled
/// [`Booking`] still holds the [`Car`] now or in the future, and restored
/// once none does.
#[derive(Clone, Copy, Debug)]
pub struct ReconcileAvailability<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db, Gw, Nf> Task<Start<By<ReconcileAvailability<Self>, Config>>>
    for Service<Db, Gw, Nf>
where
    ReconcileAvailability<Service<Db, Gw, Nf>>:
        Task<Perform<()>, Ok = (), Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<ReconcileAvailability<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = ReconcileAvailability {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::ReconcileAvailability` failed: {e}");
            });
        }
    }
}

impl<Db, Gw, Nf> Task<Perform<()>>
    for ReconcileAvailability<Service<Db, Gw, Nf>>
where
    Db: Database<
        Update<By<read::car::Reconciled, DateTime>>,
        Ok = read::car::Reconciled,
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let reconciled = self
            .service
            .database()
            .execute(Update(By::new(DateTime::now())))
            .await
            .map_err(tracerr::map_from_and_wrap!())?;
        if !reconciled.is_empty() {
            log::debug!(
                "`task::ReconcileAvailability`: {} `Car`s freed, {} held",
                reconciled.freed,
                reconciled.held,
            );
        }
        Ok(())
    }
}

/// Error of [`ReconcileAvailability`] execution.
pub type ExecutionError = Traced<database::Error>;
