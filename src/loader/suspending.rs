use super::{BulkSqlLoader, SWALLOWED_FAILURE_ROWS, column_probe, rows_as_i64};
use crate::batch::{BatchPacker, BatchRunReport, execute_in_transaction_async, run_batches_async};
use crate::connector::{close_quietly, connect_async};
use crate::driver::{Command, DbConnection};
use crate::error::BulkLoaderError;
use crate::results::ResultSet;
use crate::types::{IsolationLevel, RowValues};
use crate::worker::{CloseOnDrop, run_blocking};

impl<C: DbConnection> BulkSqlLoader<C> {
    /// Suspending form of [`execute_query`](Self::execute_query).
    ///
    /// If the returned future is dropped (for example by `tokio::time::timeout`),
    /// the connection is closed on the blocking pool.
    ///
    /// # Errors
    /// Same policy as the blocking form.
    pub async fn execute_query_async(&mut self, sql: &str) -> Result<ResultSet, BulkLoaderError> {
        let open = self.open_async().await?;

        let sql = sql.to_owned();
        let result = run_blocking(&self.conn, move |c| c.query(&sql))
            .await
            .map_err(BulkLoaderError::query);

        self.close_async().await;
        open.disarm();
        self.settle(result, ResultSet::default)
    }

    /// Suspending form of [`execute_non_query`](Self::execute_non_query).
    ///
    /// # Errors
    /// Same policy as the blocking form.
    pub async fn execute_non_query_async(
        &mut self,
        sql: &str,
        parameters: &[RowValues],
        isolation: IsolationLevel,
    ) -> Result<i64, BulkLoaderError> {
        let command = Command::from_statement(sql, parameters).inspect_err(|err| {
            tracing::error!(error = %err, "statement parameters do not line up");
        })?;

        let open = self.open_async().await?;

        let result = execute_in_transaction_async(&self.conn, command, isolation)
            .await
            .map(rows_as_i64)
            .map_err(BulkLoaderError::statement);

        self.close_async().await;
        open.disarm();
        self.settle(result, || SWALLOWED_FAILURE_ROWS)
    }

    /// Suspending form of [`execute_non_queries`](Self::execute_non_queries).
    ///
    /// Batches still run strictly one after another; each driver call is handed
    /// to the blocking pool and awaited.
    ///
    /// Dropping the future mid-run rolls back the open batch and closes the
    /// connection on the blocking pool; batches already committed stay.
    ///
    /// # Errors
    /// Same policy as the blocking form.
    pub async fn execute_non_queries_async<S: AsRef<str>>(
        &mut self,
        statements: &[S],
        parameters: &[RowValues],
        isolation: IsolationLevel,
    ) -> Result<BatchRunReport, BulkLoaderError> {
        let open = self.open_async().await?;

        let packer = BatchPacker::new(statements, parameters, self.options.params_batch_limit);
        let mut report = BatchRunReport::default();
        let outcome = run_batches_async(&self.conn, packer, isolation, &mut report).await;

        self.close_async().await;
        open.disarm();
        report.aborted = self.settle(outcome.map(|()| false), || true)?;
        tracing::info!(
            batches = report.batches_committed,
            statements = report.statements_committed,
            rows = report.rows_affected,
            aborted = report.aborted,
            "bulk load finished"
        );
        Ok(report)
    }

    /// Suspending form of [`column_names`](Self::column_names).
    ///
    /// # Errors
    /// Same policy as the blocking form.
    pub async fn column_names_async(&mut self, table: &str) -> Result<Vec<String>, BulkLoaderError> {
        let result_set = self.execute_query_async(&column_probe(table)).await?;
        Ok(result_set.column_names().to_vec())
    }

    /// Connect, arming a close that runs if the caller drops the future.
    async fn open_async(&self) -> Result<CloseOnDrop<C>, BulkLoaderError> {
        let open = CloseOnDrop::arm(&self.conn);
        match connect_async(&self.conn, self.options.connect_attempts).await {
            Ok(()) => Ok(open),
            Err(err) => {
                open.disarm();
                Err(err)
            }
        }
    }

    async fn close_async(&self) {
        let closed = run_blocking(&self.conn, |c| {
            close_quietly(c);
            Ok(())
        })
        .await;
        if let Err(err) = closed {
            tracing::warn!(error = %err, "closing the connection failed");
        }
    }
}
