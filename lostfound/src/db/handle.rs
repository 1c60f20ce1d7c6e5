use sqlx::{Connection, MySql, MySqlConnection};

/// Where a repository call runs: straight on the pool, on one pooled
/// connection, or inside a transaction.
#[derive(Debug)]
pub enum Handle<'c> {
    Pool(sqlx::Pool<MySql>),
    Transaction(sqlx::Transaction<'c, MySql>),
    Connection(sqlx::pool::PoolConnection<MySql>),
}

impl<'c> Handle<'c> {
    /// Connection to run a query on. A `Pool` handle acquires a connection
    /// and keeps it, so consecutive calls share one session.
    pub async fn conn(&mut self) -> crate::Result<&mut MySqlConnection> {
        if let Handle::Pool(pool) = self {
            let conn = pool.acquire().await.map_err(crate::db::map_err)?;
            *self = Handle::Connection(conn);
        }
        match self {
            Handle::Transaction(tx) => Ok(&mut **tx),
            Handle::Connection(conn) => Ok(&mut **conn),
            Handle::Pool(_) => Err(crate::Error::Internal(anyhow::anyhow!(
                "pool handle has no connection"
            ))),
        }
    }

    pub async fn begin(&mut self) -> crate::Result<Handle<'_>> {
        let tx = match self {
            Handle::Pool(pool) => pool.begin().await,
            // nested begin 은 savepoint 가 된다
            Handle::Transaction(tx) => (&mut **tx).begin().await,
            Handle::Connection(conn) => (&mut **conn).begin().await,
        }
        .map_err(crate::db::map_err)?;
        Ok(Handle::Transaction(tx))
    }

    pub async fn commit(self) -> crate::Result<()> {
        match self {
            Handle::Transaction(tx) => {
                tx.commit().await.map_err(crate::db::map_err)
            }
            Handle::Pool(_) | Handle::Connection(_) => Ok(()),
        }
    }

    pub async fn rollback(self) -> crate::Result<()> {
        match self {
            Handle::Transaction(tx) => {
                tx.rollback().await.map_err(crate::db::map_err)
            }
            Handle::Pool(_) | Handle::Connection(_) => Ok(()),
        }
    }
}
