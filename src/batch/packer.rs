use std::ops::Range;

use crate::driver::Command;
use crate::error::BulkLoaderError;
use crate::placeholders::{count_placeholders, parameter_name};
use crate::types::RowValues;

/// One packed batch, ready to run in its own transaction.
#[derive(Debug, Clone)]
pub struct PackedBatch {
    /// 1-based position of this batch within the run.
    pub ordinal: usize,
    /// Indices of the input statements carried by this batch.
    pub statements: Range<usize>,
    /// Slice of the parameter vector consumed by this batch.
    pub parameters: Range<usize>,
    pub command: Command,
}

impl PackedBatch {
    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.parameters.len()
    }
}

/// Splits statements into contiguous batches whose placeholder count stays
/// strictly below `ceiling`.
///
/// Parameters are consumed left to right across the whole run and bound as
/// `@p<global index>`. A statement that on its own meets the ceiling is put in
/// a batch by itself (with a warning) so the run always advances.
///
/// ```rust
/// use bulk_sql_loader::prelude::*;
///
/// let statements = [
///     "INSERT INTO t VALUES (@p0, @p1)",
///     "INSERT INTO t VALUES (@p2, @p3)",
///     "INSERT INTO t VALUES (@p4, @p5)",
/// ];
/// let params: Vec<RowValues> = (0..6).map(RowValues::Int).collect();
/// let batches: Vec<_> = BatchPacker::new(&statements, &params, 5)
///     .collect::<Result<_, _>>()?;
/// assert_eq!(batches.len(), 2);
/// assert_eq!(batches[0].statements, 0..2);
/// assert_eq!(batches[1].statements, 2..3);
/// # Ok::<(), BulkLoaderError>(())
/// ```
#[derive(Debug)]
pub struct BatchPacker<'a, S> {
    statements: &'a [S],
    parameters: &'a [RowValues],
    ceiling: usize,
    statement_cursor: usize,
    parameter_cursor: usize,
    batches_packed: usize,
    halted: bool,
}

impl<'a, S: AsRef<str>> BatchPacker<'a, S> {
    #[must_use]
    pub fn new(statements: &'a [S], parameters: &'a [RowValues], ceiling: usize) -> Self {
        Self {
            statements,
            parameters,
            ceiling,
            statement_cursor: 0,
            parameter_cursor: 0,
            batches_packed: 0,
            halted: false,
        }
    }

    /// Index of the first statement not yet handed out.
    #[must_use]
    pub fn statement_cursor(&self) -> usize {
        self.statement_cursor
    }

    fn pack_next(&mut self) -> Result<PackedBatch, BulkLoaderError> {
        let first_statement = self.statement_cursor;
        let first_parameter = self.parameter_cursor;
        let mut command = Command::new();
        let mut batch_params = 0;
        let mut admitted = 0;

        for (offset, statement) in self.statements[first_statement..].iter().enumerate() {
            let statement = statement.as_ref();
            let index = first_statement + offset;
            let n_params = count_placeholders(statement);

            if batch_params + n_params >= self.ceiling {
                if admitted > 0 {
                    break;
                }
                tracing::warn!(
                    statement = index,
                    placeholders = n_params,
                    ceiling = self.ceiling,
                    "statement meets the parameter ceiling on its own; sending it alone"
                );
            }

            let base = first_parameter + batch_params;
            for global in base..base + n_params {
                let value = self.parameters.get(global).ok_or(
                    BulkLoaderError::ParameterAlignmentError {
                        statement: index,
                        needed: global,
                        available: self.parameters.len(),
                    },
                )?;
                command.bind(parameter_name(global), value.clone());
            }
            command.push_statement(statement);

            batch_params += n_params;
            admitted += 1;
        }

        self.statement_cursor += admitted;
        self.parameter_cursor += batch_params;
        self.batches_packed += 1;

        Ok(PackedBatch {
            ordinal: self.batches_packed,
            statements: first_statement..self.statement_cursor,
            parameters: first_parameter..self.parameter_cursor,
            command,
        })
    }
}

impl<S: AsRef<str>> Iterator for BatchPacker<'_, S> {
    type Item = Result<PackedBatch, BulkLoaderError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.halted || self.statement_cursor >= self.statements.len() {
            return None;
        }
        let packed = self.pack_next();
        if packed.is_err() {
            self.halted = true;
        }
        Some(packed)
    }
}
