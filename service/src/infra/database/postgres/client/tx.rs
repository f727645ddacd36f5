//! [`Tx`] client definitions.

use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};
use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection, Connection},
};

use super::NonTx;

/// Transactional Postgres database client.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`connection::Pool`] to draw a [`Connection`] from, in case the
    /// originating client has none to hand over.
    pool: connection::Pool,

    /// [`State`] shared by all the clones of this client.
    state: Arc<State>,
}

/// Shared state of a [`Tx`] client.
#[derive(Debug)]
pub struct State {
    /// [`NonTx`] client this [`Tx`] client originates from, until its
    /// [`Connection`] is taken over.
    origin: RwLock<Option<NonTx>>,

    /// Lazily opened [`connection::Tx`].
    tx: Arc<RwLock<Option<connection::Tx>>>,
}

impl Tx {
    /// Creates a new [`Tx`] client taking over the provided [`NonTx`] client.
    #[must_use]
    pub fn from_non_tx(client: NonTx) -> Self {
        Self {
            pool: client.pool.clone(),
            state: Arc::new(State {
                origin: RwLock::new(Some(client)),
                tx: Arc::new(RwLock::new(None)),
            }),
        }
    }

    /// Returns the [`Connection`] backing this [`Tx`] client, opening a
    /// transaction on first use.
    ///
    /// The [`Connection`] of the originating [`NonTx`] client is reused
    /// whenever it has one, so the transaction observes its prior writes.
    async fn acquire(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::Tx>, Traced<database::Error>>
    {
        let read = self.state.tx.read().await;
        let guard = if read.is_none() {
            drop(read);

            let mut write = self.state.tx.write().await;
            if write.is_none() {
                let inherited = match self.state.origin.write().await.take() {
                    Some(client) => client.detach().await,
                    None => None,
                };
                let conn = if let Some(conn) = inherited {
                    conn
                } else {
                    self.pool
                        .get()
                        .await
                        .map_err(tracerr::from_and_wrap!(=> postgres::Error))
                        .map_err(tracerr::map_from)?
                };

                *write = Some(
                    connection::Tx::from_non_tx(conn)
                        .await
                        .map_err(tracerr::wrap!())?,
                );
            }

            write.downgrade()
        } else {
            read
        };

        Ok(RwLockReadGuard::map(guard, |conn| {
            conn.as_ref().expect("opened right above")
        }))
    }

    /// Detaches the [`connection::Tx`] backing this [`Tx`] client, leaving it
    /// to open a fresh one on the next use.
    async fn detach(&self) -> Option<connection::Tx> {
        self.state.tx.write().await.take()
    }

    /// Commits the transaction of this [`Tx`] client.
    ///
    /// # Errors
    ///
    /// If the transaction fails to commit.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        if let Some(tx) = self.detach().await {
            tx.commit().await.map_err(tracerr::wrap!())
        } else {
            // No transaction was opened, so there is nothing to commit.
            Ok(())
        }
    }
}

impl Connection for Tx {
    async fn query<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Vec<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.acquire()
            .await
            .map_err(tracerr::wrap!())?
            .query(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }

    async fn query_opt<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.acquire()
            .await
            .map_err(tracerr::wrap!())?
            .query_opt(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }

    async fn exec<T>(
        &self,
        stmt: &T,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, Traced<database::Error>>
    where
        T: ToStatement + ?Sized,
    {
        self.acquire()
            .await
            .map_err(tracerr::wrap!())?
            .exec(stmt, params)
            .await
            .map_err(tracerr::wrap!())
    }
}
