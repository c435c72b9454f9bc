//! The seam between the loader and a concrete database driver.
//!
//! A driver exposes a single stateful handle: open it, close it, run commands
//! and queries, and resolve one transaction at a time. Everything above this
//! trait (retry, packing, failure policy) is driver agnostic.

mod command;
mod transaction;

pub use command::{BoundParameter, Command};
pub use transaction::Transaction;

use crate::error::BulkLoaderError;
use crate::results::ResultSet;
use crate::types::IsolationLevel;

/// A blocking connection handle owned by one loader.
///
/// Implementations are driven from a single thread at a time; the suspending
/// entry points move each call onto tokio's blocking pool.
pub trait DbConnection: Send + 'static {
    /// Open the connection. Called after [`close`](Self::close).
    ///
    /// # Errors
    /// Returns the driver error when the connection cannot be established.
    fn open(&mut self) -> Result<(), BulkLoaderError>;

    /// Close the connection. Must succeed as a no-op when nothing is open.
    ///
    /// # Errors
    /// Returns the driver error when the close itself fails.
    fn close(&mut self) -> Result<(), BulkLoaderError>;

    /// Release everything held by the handle after the last failed open attempt.
    fn dispose(&mut self) {
        let _ = self.close();
    }

    fn is_open(&self) -> bool;

    /// # Errors
    /// Returns the driver error when the transaction cannot be started.
    fn begin(&mut self, isolation: IsolationLevel) -> Result<(), BulkLoaderError>;

    /// # Errors
    /// Returns the driver error when the commit fails.
    fn commit(&mut self) -> Result<(), BulkLoaderError>;

    /// # Errors
    /// Returns the driver error when the rollback fails.
    fn rollback(&mut self) -> Result<(), BulkLoaderError>;

    /// Execute every statement of `command` with its bound parameters and
    /// return the total number of affected rows.
    ///
    /// # Errors
    /// Returns the driver error of the first statement that fails.
    fn execute(&mut self, command: &Command) -> Result<usize, BulkLoaderError>;

    /// Run a read and materialize all rows.
    ///
    /// # Errors
    /// Returns the driver error when preparing or stepping the query fails.
    fn query(&mut self, sql: &str) -> Result<ResultSet, BulkLoaderError>;
}
