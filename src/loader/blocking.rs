use super::{BulkSqlLoader, SWALLOWED_FAILURE_ROWS, column_probe, rows_as_i64};
use crate::batch::{BatchPacker, BatchRunReport, execute_in_transaction, run_batches};
use crate::connector::{close_quietly, connect};
use crate::driver::{Command, DbConnection};
use crate::error::BulkLoaderError;
use crate::results::ResultSet;
use crate::types::{IsolationLevel, RowValues};
use crate::worker::lock_now;

impl<C: DbConnection> BulkSqlLoader<C> {
    /// Run a read and return every row.
    ///
    /// # Errors
    /// `ConnectionError` always; `QueryError` only when `raise_on_failure` is set
    /// (otherwise an empty result set is returned).
    pub fn execute_query(&mut self, sql: &str) -> Result<ResultSet, BulkLoaderError> {
        let mut conn = lock_now(&self.conn)?;
        connect(&mut *conn, self.options.connect_attempts)?;

        let result = conn.query(sql).map_err(BulkLoaderError::query);

        close_quietly(&mut *conn);
        drop(conn);
        self.settle(result, ResultSet::default)
    }

    /// Run one parameterized statement in its own transaction and return the
    /// affected row count.
    ///
    /// The statement's `@` markers are counted and that many leading entries of
    /// `parameters` are bound as `@p0`, `@p1`, ...
    ///
    /// # Errors
    /// `ConnectionError` and `ParameterAlignmentError` always; `StatementError`
    /// only when `raise_on_failure` is set (otherwise `-1` is returned).
    pub fn execute_non_query(
        &mut self,
        sql: &str,
        parameters: &[RowValues],
        isolation: IsolationLevel,
    ) -> Result<i64, BulkLoaderError> {
        let command = Command::from_statement(sql, parameters).inspect_err(|err| {
            tracing::error!(error = %err, "statement parameters do not line up");
        })?;

        let mut conn = lock_now(&self.conn)?;
        connect(&mut *conn, self.options.connect_attempts)?;

        let result = execute_in_transaction(&mut *conn, &command, isolation)
            .map(rows_as_i64)
            .map_err(BulkLoaderError::statement);

        close_quietly(&mut *conn);
        drop(conn);
        self.settle(result, || SWALLOWED_FAILURE_ROWS)
    }

    /// Execute `statements` in parameter-bounded batches, one transaction per
    /// batch.
    ///
    /// `parameters` is consumed left to right across all statements. Batches
    /// committed before a failure stay committed; the failing batch and
    /// everything after it are not applied.
    ///
    /// # Errors
    /// `ConnectionError` and `ParameterAlignmentError` always; `BatchError` only
    /// when `raise_on_failure` is set (otherwise the returned report has
    /// `aborted` set).
    pub fn execute_non_queries<S: AsRef<str>>(
        &mut self,
        statements: &[S],
        parameters: &[RowValues],
        isolation: IsolationLevel,
    ) -> Result<BatchRunReport, BulkLoaderError> {
        let mut conn = lock_now(&self.conn)?;
        connect(&mut *conn, self.options.connect_attempts)?;

        let packer = BatchPacker::new(statements, parameters, self.options.params_batch_limit);
        let mut report = BatchRunReport::default();
        let outcome = run_batches(&mut *conn, packer, isolation, &mut report);

        close_quietly(&mut *conn);
        drop(conn);
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

    /// Column names of `table`, probed with a query that returns no rows.
    ///
    /// `table` is interpolated verbatim and must be a trusted identifier.
    ///
    /// # Errors
    /// As [`execute_query`](Self::execute_query); a swallowed failure yields an
    /// empty list.
    pub fn column_names(&mut self, table: &str) -> Result<Vec<String>, BulkLoaderError> {
        let result_set = self.execute_query(&column_probe(table))?;
        Ok(result_set.column_names().to_vec())
    }
}
