//! [`RelinkPayments`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::operations::{By, Perform, Start, Update};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

#[cfg(doc)]
use crate::domain::{Booking, Payment};
use crate::{
    infra::{database, Database},
    read,
    Service,
};

use super::Task;

/// Configuration for [`RelinkPayments`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between [`Payment`] links repairing.
    pub interval: time::Duration,
}

/// [`Task`] for repairing lost links of [`Payment`]s to the [`Booking`]s
/// they paid for.
///
/// A link is lost when a [`Booking`] referencing its [`Payment`] was
/// persisted, but the backward link on the [`Payment`] itself was not.
#[derive(Clone, Copy, Debug)]
pub struct RelinkPayments<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db, Gw, Nf> Task<Start<By<RelinkPayments<Self>, Config>>>
    for Service<Db, Gw, Nf>
where
    RelinkPayments<Service<Db, Gw, Nf>>:
        Task<Perform<()>, Ok = (), Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<RelinkPayments<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = RelinkPayments {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::RelinkPayments` failed: {e}");
            });
        }
    }
}

impl<Db, Gw, Nf> Task<Perform<()>> for RelinkPayments<Service<Db, Gw, Nf>>
where
    Db: Database<
        Update<By<read::payment::Relinked, ()>>,
        Ok = read::payment::Relinked,
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let relinked = self
            .service
            .database()
            .execute(Update(By::new(())))
            .await
            .map_err(tracerr::map_from_and_wrap!())?;
        if !relinked.is_zero() {
            log::warn!(
                "`task::RelinkPayments` repaired {} `Payment` links",
                u64::from(relinked),
            );
        }
        Ok(())
    }
}

/// Error of [`RelinkPayments`] execution.
pub type ExecutionError = Traced<database::Error>;
