//! Transaction/session management
//!
//! Two transaction kinds exist: reads, which may overlap freely, and
//! writes, which must be exclusive per session handle. The exclusivity rule
//! is expressed through ownership instead of runtime markers:
//! [`Session::write_tx`] borrows the session mutably, so holding a write
//! guard makes opening any other transaction on the same handle a compile
//! error. Read guards borrow shared and may nest.
//!
//! Every slice function takes `&mut SqliteConnection`, which can only be
//! obtained from a guard, so touching the store outside a transaction is
//! unrepresentable. Dropping a guard rolls back, so no exit path can leak
//! an open transaction.
//!
//! Cross-thread concurrency is delegated to SQLite (WAL, single writer,
//! many readers); this layer adds no serialization of its own.

use crate::error::Result;
use sqlx::{Sqlite, SqliteConnection, SqlitePool, Transaction};

/// Handle for issuing transactions against the relational store
///
/// Cheap to construct; consumers that need concurrent access each hold
/// their own `Session` over the shared pool.
pub struct Session {
    pool: SqlitePool,
}

impl Session {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Open a read transaction
    ///
    /// Long listing operations should prefer many short reads over one long
    /// one to avoid starving the writer.
    pub async fn read_tx(&self) -> Result<ReadTransaction> {
        let tx = self.pool.begin().await?;
        Ok(ReadTransaction { tx })
    }

    /// Open a write transaction
    ///
    /// Takes `&mut self`: while the returned guard is alive no other
    /// transaction can be opened through this session handle.
    pub async fn write_tx(&mut self) -> Result<WriteTransaction> {
        let tx = self.pool.begin().await?;
        Ok(WriteTransaction { tx })
    }
}

/// A read-only transaction guard; dropping it releases the transaction
pub struct ReadTransaction {
    tx: Transaction<'static, Sqlite>,
}

impl ReadTransaction {
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }
}

/// A write transaction guard; dropping it without `commit` rolls back
pub struct WriteTransaction {
    tx: Transaction<'static, Sqlite>,
}

impl WriteTransaction {
    pub fn conn(&mut self) -> &mut SqliteConnection {
        &mut self.tx
    }

    /// Commit the transaction; every persistence action either commits
    /// here or is not applied at all
    pub async fn commit(self) -> Result<()> {
        self.tx.commit().await?;
        Ok(())
    }

    /// Explicit rollback, equivalent to dropping the guard
    pub async fn rollback(self) -> Result<()> {
        self.tx.rollback().await?;
        Ok(())
    }
}
