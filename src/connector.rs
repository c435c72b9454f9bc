//! Connection establishment with a bounded, immediate retry.

use crate::driver::DbConnection;
use crate::error::BulkLoaderError;
use crate::worker::{SharedConnection, run_blocking};

/// Close whatever is open, then open the connection, trying up to
/// `max_attempts` times (at least once).
///
/// Each failure is logged with its attempt number. Retries are immediate.
/// After the last failure the handle is disposed and the driver error is
/// returned inside `ConnectionError`.
///
/// # Errors
/// Returns `BulkLoaderError::ConnectionError` once every attempt has failed.
pub fn connect<C: DbConnection + ?Sized>(
    conn: &mut C,
    max_attempts: u32,
) -> Result<(), BulkLoaderError> {
    close_quietly(conn);

    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match conn.open() {
            Ok(()) => {
                tracing::debug!(attempt, "connection opened");
                return Ok(());
            }
            Err(err) => {
                tracing::error!(error = %err, attempt, "Connection attempt number {attempt} failed");
                if attempt >= max_attempts {
                    conn.dispose();
                    return Err(BulkLoaderError::ConnectionError {
                        attempts: attempt,
                        source: Box::new(err),
                    });
                }
                attempt += 1;
            }
        }
    }
}

/// Suspending form of [`connect`]; every close and open attempt runs on the
/// blocking pool.
///
/// # Errors
/// Returns `BulkLoaderError::ConnectionError` once every attempt has failed,
/// or `WorkerError` if a blocking task cannot be joined.
pub(crate) async fn connect_async<C: DbConnection>(
    conn: &SharedConnection<C>,
    max_attempts: u32,
) -> Result<(), BulkLoaderError> {
    run_blocking(conn, |c| {
        close_quietly(c);
        Ok(())
    })
    .await?;

    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match run_blocking(conn, |c| c.open()).await {
            Ok(()) => {
                tracing::debug!(attempt, "connection opened");
                return Ok(());
            }
            Err(err @ BulkLoaderError::WorkerError(_)) => return Err(err),
            Err(err) => {
                tracing::error!(error = %err, attempt, "Connection attempt number {attempt} failed");
                if attempt >= max_attempts {
                    run_blocking(conn, |c| {
                        c.dispose();
                        Ok(())
                    })
                    .await?;
                    return Err(BulkLoaderError::ConnectionError {
                        attempts: attempt,
                        source: Box::new(err),
                    });
                }
                attempt += 1;
            }
        }
    }
}

/// Close the handle, logging rather than returning a failure.
pub(crate) fn close_quietly<C: DbConnection + ?Sized>(conn: &mut C) {
    if let Err(err) = conn.close() {
        tracing::warn!(error = %err, "closing the connection failed");
    }
}
