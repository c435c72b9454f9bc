use serde::Serialize;

use super::packer::{BatchPacker, PackedBatch};
use crate::driver::{Command, DbConnection, Transaction};
use crate::error::BulkLoaderError;
use crate::types::IsolationLevel;
use crate::worker::{BlockingPoolTransaction, SharedConnection};

/// What a bulk run actually committed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchRunReport {
    pub batches_committed: usize,
    pub statements_committed: usize,
    pub parameters_bound: usize,
    pub rows_affected: usize,
    /// Set when a failure stopped the run and the loader swallowed it.
    pub aborted: bool,
}

impl BatchRunReport {
    fn record(&mut self, statements: usize, parameters: usize, rows: usize) {
        self.batches_committed += 1;
        self.statements_committed += statements;
        self.parameters_bound += parameters;
        self.rows_affected += rows;
    }
}

/// Begin, execute and commit one command. Any failure rolls back before the
/// error is returned.
pub(crate) fn execute_in_transaction<C: DbConnection + ?Sized>(
    conn: &mut C,
    command: &Command,
    isolation: IsolationLevel,
) -> Result<usize, BulkLoaderError> {
    let mut tx = Transaction::begin(conn, isolation)?;
    let rows = tx.execute(command)?;
    tx.commit()?;
    Ok(rows)
}

pub(crate) async fn execute_in_transaction_async<C: DbConnection>(
    conn: &SharedConnection<C>,
    command: Command,
    isolation: IsolationLevel,
) -> Result<usize, BulkLoaderError> {
    let mut tx = BlockingPoolTransaction::begin(conn, isolation).await?;
    let outcome = match tx.execute(command).await {
        Ok(rows) => tx.commit().await.map(|()| rows),
        Err(err) => Err(err),
    };
    if outcome.is_err() {
        tx.rollback_logged().await;
    }
    outcome
}

/// Run every packed batch in order, one transaction each, stopping at the
/// first failure. `report` reflects what was committed before that failure.
pub(crate) fn run_batches<C, S>(
    conn: &mut C,
    packer: BatchPacker<'_, S>,
    isolation: IsolationLevel,
    report: &mut BatchRunReport,
) -> Result<(), BulkLoaderError>
where
    C: DbConnection + ?Sized,
    S: AsRef<str>,
{
    for batch in packer {
        let batch = batch?;
        log_batch(&batch);
        let rows = execute_in_transaction(conn, &batch.command, isolation)
            .map_err(|err| BulkLoaderError::batch(batch.ordinal, batch.statements.start, err))?;
        report.record(batch.statements.len(), batch.placeholder_count(), rows);
    }
    Ok(())
}

pub(crate) async fn run_batches_async<C, S>(
    conn: &SharedConnection<C>,
    packer: BatchPacker<'_, S>,
    isolation: IsolationLevel,
    report: &mut BatchRunReport,
) -> Result<(), BulkLoaderError>
where
    C: DbConnection,
    S: AsRef<str>,
{
    for batch in packer {
        let batch = batch?;
        log_batch(&batch);
        let PackedBatch {
            ordinal,
            statements,
            parameters,
            command,
        } = batch;
        let rows = execute_in_transaction_async(conn, command, isolation)
            .await
            .map_err(|err| BulkLoaderError::batch(ordinal, statements.start, err))?;
        report.record(statements.len(), parameters.len(), rows);
    }
    Ok(())
}

fn log_batch(batch: &PackedBatch) {
    tracing::debug!(
        batch = batch.ordinal,
        first_statement = batch.statements.start,
        statements = batch.statements.len(),
        parameters = batch.placeholder_count(),
        "executing batch"
    );
}
