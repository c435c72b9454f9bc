//! The public face of the crate: one connection, one set of options, and
//! blocking plus suspending forms of every operation.

mod blocking;
mod suspending;

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::config::LoaderOptions;
use crate::driver::DbConnection;
use crate::error::BulkLoaderError;
use crate::worker::{SharedConnection, lock_now};

/// Row count returned by `execute_non_query` when a failure was swallowed.
pub const SWALLOWED_FAILURE_ROWS: i64 = -1;

/// Bulk loader bound to one connection handle.
///
/// The connection is opened at the start of every operation and closed at its
/// end, whatever the outcome. Operations take `&mut self`; a loader serves one
/// caller at a time.
///
/// With `raise_on_failure` unset (the default) statement, batch and query
/// failures are logged and a degraded result is returned instead: an empty
/// result set, [`SWALLOWED_FAILURE_ROWS`], or a partially applied run. Connection
/// and parameter alignment failures are always returned.
pub struct BulkSqlLoader<C: DbConnection> {
    conn: SharedConnection<C>,
    options: LoaderOptions,
}

impl<C: DbConnection> BulkSqlLoader<C> {
    /// Loader with default options.
    #[must_use]
    pub fn new(conn: C) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
            options: LoaderOptions::default(),
        }
    }

    /// # Errors
    /// Returns `ConfigError` when `options` do not validate.
    pub fn with_options(conn: C, options: LoaderOptions) -> Result<Self, BulkLoaderError> {
        options.validate()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            options,
        })
    }

    #[must_use]
    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// # Errors
    /// Returns `ConfigError` for a zero ceiling; the previous value is kept.
    pub fn set_params_batch_limit(&mut self, limit: usize) -> Result<(), BulkLoaderError> {
        let options = LoaderOptions {
            params_batch_limit: limit,
            ..self.options.clone()
        };
        options.validate()?;
        self.options = options;
        Ok(())
    }

    pub fn set_raise_on_failure(&mut self, raise: bool) {
        self.options.raise_on_failure = raise;
    }

    /// Borrow the underlying handle between operations.
    ///
    /// # Errors
    /// Returns `ConnectionBusy` while an abandoned suspending call still owns it.
    pub fn with_connection<R>(&mut self, func: impl FnOnce(&mut C) -> R) -> Result<R, BulkLoaderError> {
        let mut guard = lock_now(&self.conn)?;
        Ok(func(&mut guard))
    }

    /// Apply the failure policy to an operation result.
    fn settle<T>(
        &self,
        result: Result<T, BulkLoaderError>,
        degraded: impl FnOnce() -> T,
    ) -> Result<T, BulkLoaderError> {
        match result {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::error!(error = %err, details = ?err, "bulk loader operation failed");
                if self.options.raise_on_failure || err.is_always_fatal() {
                    Err(err)
                } else {
                    Ok(degraded())
                }
            }
        }
    }
}

fn rows_as_i64(rows: usize) -> i64 {
    i64::try_from(rows).unwrap_or(i64::MAX)
}

fn column_probe(table: &str) -> String {
    format!("SELECT * FROM {table} WHERE 1 = 0")
}
