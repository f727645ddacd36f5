//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod command;
pub mod domain;
pub mod infra;
pub mod query;
pub mod read;
pub mod task;

use common::{
    operations::{By, Start},
    Currency,
};
use derive_more::{Debug, Display, Error};

#[cfg(doc)]
use infra::{Database, Gateway, Notifier};

pub use self::{command::Command, query::Query, task::Task};

/// [`Service`] configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// [JWT] encoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_encoding_key: jsonwebtoken::EncodingKey,

    /// [JWT] decoding key.
    ///
    /// [JWT]: https://datatracker.ietf.org/doc/html/rfc7519
    #[debug(skip)]
    pub jwt_decoding_key: jsonwebtoken::DecodingKey,

    /// [`Currency`] all the platform prices are quoted in.
    pub currency: Currency,

    /// [`task::SweepRentals`] configuration.
    pub sweep_rentals: task::sweep_rentals::Config,

    /// [`task::ReconcileAvailability`] configuration.
    pub reconcile_availability: task::reconcile_availability::Config,

    /// [`task::RelinkPayments`] configuration.
    pub relink_payments: task::relink_payments::Config,

    /// [`task::CleanLoginCodes`] configuration.
    pub clean_login_codes: task::clean_login_codes::Config,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<Db, Gw, Nf> {
    /// Configuration of this [`Service`].
    config: Config,

    /// [`Database`] of this [`Service`].
    database: Db,

    /// [`Gateway`] of this [`Service`].
    gateway: Gw,

    /// [`Notifier`] of this [`Service`].
    notifier: Nf,
}

impl<Db, Gw, Nf> Service<Db, Gw, Nf> {
    /// Creates a new [`Service`] with the provided parameters.
    pub fn new(
        config: Config,
        database: Db,
        gateway: Gw,
        notifier: Nf,
    ) -> (Self, task::Background)
    where
        Self: Task<
                Start<
                    By<task::SweepRentals<Self>, task::sweep_rentals::Config>,
                >,
                Ok = (),
                Err: Error,
            > + Task<
                Start<
                    By<
                        task::ReconcileAvailability<Self>,
                        task::reconcile_availability::Config,
                    >,
                >,
                Ok = (),
                Err: Error,
            > + Task<
                Start<
                    By<
                        task::RelinkPayments<Self>,
                        task::relink_payments::Config,
                    >,
                >,
                Ok = (),
                Err: Error,
            > + Task<
                Start<
                    By<
                        task::CleanLoginCodes<Self>,
                        task::clean_login_codes::Config,
                    >,
                >,
                Ok = (),
                Err: Error,
            > + Clone
            + 'static,
    {
        let this = Service {
            config,
            database,
            gateway,
            notifier,
        };

        let mut bg = task::Background::default();
        let svc = this.clone();
        bg.spawn(async move {
            svc.execute(Start(By::new(svc.config().sweep_rentals))).await
        });
        let svc = this.clone();
        bg.spawn(async move {
            svc.execute(Start(By::new(svc.config().reconcile_availability)))
                .await
        });
        let svc = this.clone();
        bg.spawn(async move {
            svc.execute(Start(By::new(svc.config().relink_payments))).await
        });
        let svc = this.clone();
        bg.spawn(async move {
            svc.execute(Start(By::new(svc.config().clean_login_codes))).await
        });

        (this, bg)
    }

    /// Returns [`Config`] of this [`Service`].
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns [`Database`] of this [`Service`].
    #[must_use]
    pub fn database(&self) -> &Db {
        &self.database
    }

    /// Returns [`Gateway`] of this [`Service`].
    #[must_use]
    pub fn gateway(&self) -> &Gw {
        &self.gateway
    }

    /// Returns [`Notifier`] of this [`Service`].
    #[must_use]
    pub fn notifier(&self) -> &Nf {
        &self.notifier
    }
}

/// Shortcut for the error of starting a [`Task`].
type TaskStartError<Svc, T, Args> = <Svc as Task<Start<By<T, Args>>>>::Err;

/// Error of starting a [`Service`].
#[derive(Debug, Display, Error)]
pub enum StartupError<Svc>
where
    Svc: Task<Start<By<task::SweepRentals<Svc>, task::sweep_rentals::Config>>>
        + Task<
            Start<
                By<
                    task::ReconcileAvailability<Svc>,
                    task::reconcile_availability::Config,
                >,
            >,
        > + Task<
            Start<
                By<task::RelinkPayments<Svc>, task::relink_payments::Config>,
            >,
        > + Task<
            Start<
                By<task::CleanLoginCodes<Svc>, task::clean_login_codes::Config>,
            >,
        >,
{
    /// [`task::SweepRentals`] failed to start.
    SweepRentalsTask(
        TaskStartError<
            Svc,
            task::SweepRentals<Svc>,
            task::sweep_rentals::Config,
        >,
    ),

    /// [`task::ReconcileAvailability`] failed to start.
    ReconcileAvailabilityTask(
        TaskStartError<
            Svc,
            task::ReconcileAvailability<Svc>,
            task::reconcile_availability::Config,
        >,
    ),

    /// [`task::RelinkPayments`] failed to start.
    RelinkPaymentsTask(
        TaskStartError<
            Svc,
            task::RelinkPayments<Svc>,
            task::relink_payments::Config,
        >,
    ),

    /// [`task::CleanLoginCodes`] failed to start.
    CleanLoginCodesTask(
        TaskStartError<
            Svc,
            task::CleanLoginCodes<Svc>,
            task::clean_login_codes::Config,
        >,
    ),
}
