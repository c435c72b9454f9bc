use crate::error::BulkLoaderError;
use crate::types::IsolationLevel;

use super::{Command, DbConnection};

/// Transaction scope over a borrowed connection.
///
/// Dropping an unresolved transaction rolls it back. A failing rollback is
/// logged and otherwise ignored so it never replaces the error that caused it.
pub struct Transaction<'c, C: DbConnection + ?Sized> {
    conn: &'c mut C,
    active: bool,
}

impl<'c, C: DbConnection + ?Sized> Transaction<'c, C> {
    /// Begin a transaction at `isolation`.
    ///
    /// # Errors
    /// Returns the driver error if the transaction cannot be started.
    pub fn begin(conn: &'c mut C, isolation: IsolationLevel) -> Result<Self, BulkLoaderError> {
        conn.begin(isolation)?;
        Ok(Self { conn, active: true })
    }

    /// Execute a command inside the open transaction.
    ///
    /// # Errors
    /// Returns the driver error; the transaction stays open until dropped.
    pub fn execute(&mut self, command: &Command) -> Result<usize, BulkLoaderError> {
        self.conn.execute(command)
    }

    /// Commit. When the commit fails the transaction is rolled back on drop.
    ///
    /// # Errors
    /// Returns the driver error if committing fails.
    pub fn commit(mut self) -> Result<(), BulkLoaderError> {
        self.conn.commit()?;
        self.active = false;
        Ok(())
    }
}

impl<C: DbConnection + ?Sized> Drop for Transaction<'_, C> {
    fn drop(&mut self) {
        if self.active {
            self.active = false;
            if let Err(err) = self.conn.rollback() {
                tracing::error!(error = %err, "rollback failed");
            }
        }
    }
}
