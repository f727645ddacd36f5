//! [`CleanLoginCodes`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::operations::{By, Delete, Perform, Start};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::user::{login_code, LoginCode},
    infra::{database, Database},
    Service,
};

use super::Task;

/// Configuration for [`CleanLoginCodes`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between expired [`LoginCode`]s cleaning.
    pub interval: time::Duration,
}

/// [`Task`] for cleaning expired [`LoginCode`]s.
#[derive(Clone, Copy, Debug)]
pub struct CleanLoginCodes<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db, Gw, Nf> Task<Start<By<CleanLoginCodes<Self>, Config>>>
    for Service<Db, Gw, Nf>
where
    CleanLoginCodes<Service<Db, Gw, Nf>>:
        Task<Perform<()>, Ok = (), Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<CleanLoginCodes<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = CleanLoginCodes {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::CleanLoginCodes` failed: {e}");
            });
        }
    }
}

impl<Db, Gw, Nf> Task<Perform<()>> for CleanLoginCodes<Service<Db, Gw, Nf>>
where
    Db: Database<
        Delete<By<LoginCode, login_code::ExpirationDateTime>>,
        Ok = (),
        Err = Traced<database::Error>,
    >,
{
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let deadline = login_code::ExpirationDateTime::now();
        self.service
            .database()
            .execute(Delete(By::new(deadline)))
            .await
            .map_err(tracerr::map_from_and_wrap!())
    }
}

/// Error of [`CleanLoginCodes`] execution.
pub type ExecutionError = Traced<database::Error>;
