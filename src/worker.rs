//! Blocking-pool plumbing for the suspending entry points.
//!
//! Every driver call is blocking. The async API hands each call to
//! `spawn_blocking` and awaits it, so the caller's task yields at every
//! connection boundary while calls still run one at a time.

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};

use crate::connector::close_quietly;
use crate::driver::{Command, DbConnection};
use crate::error::BulkLoaderError;
use crate::types::IsolationLevel;

pub(crate) type SharedConnection<C> = Arc<Mutex<C>>;

/// Run `func` against the connection on tokio's blocking pool.
pub(crate) async fn run_blocking<C, F, R>(
    conn: &SharedConnection<C>,
    func: F,
) -> Result<R, BulkLoaderError>
where
    C: DbConnection,
    F: FnOnce(&mut C) -> Result<R, BulkLoaderError> + Send + 'static,
    R: Send + 'static,
{
    let conn = Arc::clone(conn);
    tokio::task::spawn_blocking(move || {
        let mut guard = conn.blocking_lock();
        func(&mut guard)
    })
    .await
    .map_err(|e| BulkLoaderError::WorkerError(format!("spawn_blocking join error: {e}")))?
}

/// Lock the connection for a blocking call on the current thread.
///
/// The loader's `&mut self` receivers rule out a second caller, so contention
/// only happens while an abandoned async call still holds the handle.
pub(crate) fn lock_now<C: DbConnection>(
    conn: &SharedConnection<C>,
) -> Result<MutexGuard<'_, C>, BulkLoaderError> {
    conn.try_lock().map_err(|_| BulkLoaderError::ConnectionBusy)
}

/// Transaction scope whose begin/execute/commit/rollback each suspend.
///
/// If the owning future is dropped while the transaction is open, the
/// rollback is scheduled on the blocking pool.
pub(crate) struct BlockingPoolTransaction<C: DbConnection> {
    conn: SharedConnection<C>,
    active: bool,
}

impl<C: DbConnection> BlockingPoolTransaction<C> {
    pub(crate) async fn begin(
        conn: &SharedConnection<C>,
        isolation: IsolationLevel,
    ) -> Result<Self, BulkLoaderError> {
        run_blocking(conn, move |c| c.begin(isolation)).await?;
        Ok(Self {
            conn: Arc::clone(conn),
            active: true,
        })
    }

    pub(crate) async fn execute(&mut self, command: Command) -> Result<usize, BulkLoaderError> {
        run_blocking(&self.conn, move |c| c.execute(&command)).await
    }

    pub(crate) async fn commit(&mut self) -> Result<(), BulkLoaderError> {
        run_blocking(&self.conn, |c| c.commit()).await?;
        self.active = false;
        Ok(())
    }

    /// Roll back and log a failure instead of returning it.
    pub(crate) async fn rollback_logged(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Err(err) = run_blocking(&self.conn, |c| c.rollback()).await {
            tracing::error!(error = %err, "rollback failed");
        }
    }
}

impl<C: DbConnection> Drop for BlockingPoolTransaction<C> {
    fn drop(&mut self) {
        if self.active
            && let Ok(handle) = tokio::runtime::Handle::try_current()
        {
            let conn = Arc::clone(&self.conn);
            handle.spawn_blocking(move || {
                let mut conn = conn.blocking_lock();
                // a close that got here first already discarded the transaction
                if conn.is_open()
                    && let Err(err) = conn.rollback()
                {
                    tracing::error!(error = %err, "rollback of abandoned transaction failed");
                }
            });
        }
    }
}

/// Closes an opened connection on the blocking pool if the operation that
/// opened it is dropped before reaching its own close.
pub(crate) struct CloseOnDrop<C: DbConnection> {
    conn: SharedConnection<C>,
    armed: bool,
}

impl<C: DbConnection> CloseOnDrop<C> {
    pub(crate) fn arm(conn: &SharedConnection<C>) -> Self {
        Self {
            conn: Arc::clone(conn),
            armed: true,
        }
    }

    /// The operation closed the connection itself.
    pub(crate) fn disarm(mut self) {
        self.armed = false;
    }
}

impl<C: DbConnection> Drop for CloseOnDrop<C> {
    fn drop(&mut self) {
        if self.armed
            && let Ok(handle) = tokio::runtime::Handle::try_current()
        {
            let conn = Arc::clone(&self.conn);
            tracing::warn!("operation abandoned with the connection open; closing it");
            handle.spawn_blocking(move || close_quietly(&mut *conn.blocking_lock()));
        }
    }
}
