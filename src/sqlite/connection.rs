use std::collections::HashMap;
use std::fmt;

use rusqlite::Connection;

use super::config::SqliteOptions;
use super::params::row_value_to_sqlite_value;
use super::query::build_result_set;
use crate::driver::{Command, DbConnection};
use crate::error::BulkLoaderError;
use crate::results::ResultSet;
use crate::types::{IsolationLevel, RowValues};

/// `SQLite` handle that is opened and closed by the loader on every call.
///
/// Placeholders are bound by name, so statements use `SQLite`'s native
/// `@name` parameters (`@p0`, `@p1`, ...). A packed command is run one
/// statement at a time inside the loader's transaction.
pub struct SqliteConnection {
    options: SqliteOptions,
    conn: Option<Connection>,
}

impl SqliteConnection {
    #[must_use]
    pub fn new(options: SqliteOptions) -> Self {
        Self {
            options,
            conn: None,
        }
    }

    /// Handle for the database at `db_path` with default options.
    #[must_use]
    pub fn for_path(db_path: impl Into<String>) -> Self {
        Self::new(SqliteOptions::new(db_path))
    }

    #[must_use]
    pub fn options(&self) -> &SqliteOptions {
        &self.options
    }

    fn conn_mut(&mut self) -> Result<&mut Connection, BulkLoaderError> {
        self.conn
            .as_mut()
            .ok_or_else(|| BulkLoaderError::DriverError("SQLite connection is not open".into()))
    }
}

fn begin_statement(isolation: IsolationLevel) -> &'static str {
    match isolation {
        // take the write lock up front so the batch cannot be interleaved
        IsolationLevel::Serializable => "BEGIN IMMEDIATE",
        IsolationLevel::ReadUncommitted
        | IsolationLevel::ReadCommitted
        | IsolationLevel::RepeatableRead
        | IsolationLevel::Snapshot => "BEGIN DEFERRED",
    }
}

impl DbConnection for SqliteConnection {
    fn open(&mut self) -> Result<(), BulkLoaderError> {
        let conn = Connection::open(&self.options.db_path)?;
        if let Some(timeout) = self.options.busy_timeout {
            conn.busy_timeout(timeout)?;
        }
        if self.options.wal {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }
        self.conn = Some(conn);
        Ok(())
    }

    fn close(&mut self) -> Result<(), BulkLoaderError> {
        match self.conn.take() {
            Some(conn) => conn.close().map_err(|(_, err)| BulkLoaderError::SqliteError(err)),
            None => Ok(()),
        }
    }

    fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    fn begin(&mut self, isolation: IsolationLevel) -> Result<(), BulkLoaderError> {
        self.conn_mut()?.execute_batch(begin_statement(isolation))?;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), BulkLoaderError> {
        self.conn_mut()?.execute_batch("COMMIT")?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), BulkLoaderError> {
        self.conn_mut()?.execute_batch("ROLLBACK")?;
        Ok(())
    }

    fn execute(&mut self, command: &Command) -> Result<usize, BulkLoaderError> {
        let by_name: HashMap<&str, &RowValues> = command
            .parameters()
            .iter()
            .map(|p| (p.name.as_str(), &p.value))
            .collect();
        let conn = self.conn_mut()?;

        let mut rows = 0;
        for sql in command.statements() {
            if sql.trim().is_empty() {
                continue;
            }
            let mut stmt = conn.prepare(sql)?;
            for index in 1..=stmt.parameter_count() {
                let value = match stmt.parameter_name(index) {
                    Some(name) => by_name.get(name).copied().ok_or_else(|| {
                        BulkLoaderError::DriverError(format!("no value bound for {name}"))
                    })?,
                    None => {
                        return Err(BulkLoaderError::DriverError(format!(
                            "anonymous placeholder {index} in: {sql}"
                        )));
                    }
                };
                stmt.raw_bind_parameter(index, row_value_to_sqlite_value(value))?;
            }
            rows += stmt.raw_execute()?;
        }
        Ok(rows)
    }

    fn query(&mut self, sql: &str) -> Result<ResultSet, BulkLoaderError> {
        let conn = self.conn_mut()?;
        let mut stmt = conn.prepare(sql)?;
        build_result_set(&mut stmt)
    }
}

impl fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("db_path", &self.options.db_path)
            .field("open", &self.conn.is_some())
            .finish()
    }
}
