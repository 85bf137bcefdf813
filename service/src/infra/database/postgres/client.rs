//! Postgres database client definitions.

use std::{future::Future, sync::Arc};

use tokio::sync::{RwLock, RwLockReadGuard};
use tokio_postgres::{types::ToSql, Row, ToStatement};
use tracerr::Traced;

use crate::infra::database::{
    self,
    postgres::{self, connection, Connection},
};

/// Lazily established connection, shared between clones of a client.
#[derive(Debug)]
struct Slot<C>(RwLock<Option<C>>);

impl<C> Default for Slot<C> {
    fn default() -> Self {
        Self(RwLock::new(None))
    }
}

impl<C> Slot<C> {
    /// Returns the connection of this [`Slot`], establishing it with the
    /// provided function if there is none yet.
    async fn get_or_try_init<F>(
        &self,
        init: impl FnOnce() -> F,
    ) -> Result<RwLockReadGuard<'_, C>, Traced<database::Error>>
    where
        F: Future<Output = Result<C, Traced<database::Error>>>,
    {
        let read = self.0.read().await;
        let read = if read.is_some() {
            read
        } else {
            drop(read);
            let mut write = self.0.write().await;
            if write.is_none() {
                *write = Some(init().await.map_err(tracerr::wrap!())?);
            }
            write.downgrade()
        };
        Ok(RwLockReadGuard::map(read, |conn| {
            conn.as_ref().expect("initialized above")
        }))
    }

    /// Takes the connection out of this [`Slot`], if any.
    ///
    /// The next use of this [`Slot`] establishes a new one.
    async fn take(&self) -> Option<C> {
        self.0.write().await.take()
    }
}

/// Acquires a new [`connection::NonTx`] from the provided
/// [`connection::Pool`].
async fn acquire(
    pool: &connection::Pool,
) -> Result<connection::NonTx, Traced<database::Error>> {
    pool.get()
        .await
        .map_err(tracerr::from_and_wrap!(=> postgres::Error))
        .map_err(tracerr::map_from)
}

/// Non-transactional Postgres database client.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// [`connection::Pool`] to acquire connections from.
    pub(crate) pool: connection::Pool,

    /// Connection used for non-transactional operations.
    slot: Arc<Slot<connection::NonTx>>,
}

impl NonTx {
    /// Creates a new [`NonTx`] client from the provided [`connection::Pool`].
    #[must_use]
    pub(crate) fn from_pool(pool: connection::Pool) -> Self {
        Self {
            pool,
            slot: Arc::default(),
        }
    }

    /// Returns the [`Connection`] of this [`NonTx`] client.
    async fn connection(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::NonTx>, Traced<database::Error>>
    {
        self.slot.get_or_try_init(|| acquire(&self.pool)).await
    }
}

/// Transactional Postgres database client.
///
/// The transaction begins lazily, on the first statement, reusing the
/// connection of the [`NonTx`] client it was started from, if any.
#[derive(Clone, Debug)]
pub struct Tx {
    /// [`NonTx`] client this [`Tx`] was started from.
    origin: NonTx,

    /// Connection with the open transaction.
    slot: Arc<Slot<connection::Tx>>,
}

impl Tx {
    /// Creates a new [`Tx`] client from the provided [`NonTx`] client.
    #[must_use]
    pub fn from_non_tx(origin: NonTx) -> Self {
        Self {
            origin,
            slot: Arc::default(),
        }
    }

    /// Returns the [`Connection`] of this [`Tx`] client, beginning the
    /// transaction if it's not begun yet.
    async fn connection(
        &self,
    ) -> Result<RwLockReadGuard<'_, connection::Tx>, Traced<database::Error>>
    {
        self.slot
            .get_or_try_init(|| async {
                let conn = match self.origin.slot.take().await {
                    Some(conn) => conn,
                    None => acquire(&self.origin.pool)
                        .await
                        .map_err(tracerr::wrap!())?,
                };
                connection::Tx::begin(conn).await.map_err(tracerr::wrap!())
            })
            .await
    }

    /// Commits this [`Tx`] client.
    ///
    /// Committing a [`Tx`] that has executed nothing is a no-op.
    ///
    /// # Errors
    ///
    /// If failed to commit the transaction of this [`Tx`] client.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        match self.slot.take().await {
            Some(tx) => tx.commit().await.map_err(tracerr::wrap!()),
            None => Ok(()),
        }
    }
}

/// Implements [`Connection`] for a client type by delegating to the
/// [`Connection`] returned by its `connection()` method.
macro_rules! impl_client_connection {
    ($($ty:ty),+) => {$(
        impl Connection for $ty {
            async fn query<T>(
                &self,
                stmt: &T,
                params: &[&(dyn ToSql + Sync)],
            ) -> Result<Vec<Row>, Traced<database::Error>>
            where
                T: ToStatement + ?Sized,
            {
                self.connection()
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
                self.connection()
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
                self.connection()
                    .await
                    .map_err(tracerr::wrap!())?
                    .exec(stmt, params)
                    .await
                    .map_err(tracerr::wrap!())
            }
        }
    )+};
}

impl_client_connection!(NonTx, Tx);
