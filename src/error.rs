use thiserror::Error;

#[cfg(feature = "sqlite")]
use rusqlite;

#[derive(Debug, Error)]
pub enum BulkLoaderError {
    #[cfg(feature = "sqlite")]
    #[error(transparent)]
    SqliteError(#[from] rusqlite::Error),

    /// Opening the connection failed on every allowed attempt.
    #[error("Connection error after {attempts} attempt(s): {source}")]
    ConnectionError {
        attempts: u32,
        #[source]
        source: Box<BulkLoaderError>,
    },

    /// A single non-batched statement failed to execute or commit.
    #[error("Statement error: {source}")]
    StatementError {
        #[source]
        source: Box<BulkLoaderError>,
    },

    /// A packed batch failed to execute or commit; later statements were not applied.
    #[error("Batch {batch} (starting at statement {first_statement}) failed: {source}")]
    BatchError {
        batch: usize,
        first_statement: usize,
        #[source]
        source: Box<BulkLoaderError>,
    },

    #[error("Query error: {source}")]
    QueryError {
        #[source]
        source: Box<BulkLoaderError>,
    },

    /// The parameter vector is shorter than the placeholders that consume it.
    #[error(
        "Parameter alignment error: statement {statement} needs parameter index {needed} but only {available} were supplied"
    )]
    ParameterAlignmentError {
        statement: usize,
        needed: usize,
        available: usize,
    },

    #[error("Driver error: {0}")]
    DriverError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    ConfigParseError(#[from] serde_json::Error),

    #[error("Configuration file error: {0}")]
    ConfigFileError(#[from] std::io::Error),

    #[error("Blocking worker error: {0}")]
    WorkerError(String),

    #[error("Connection is busy with another operation")]
    ConnectionBusy,
}

impl BulkLoaderError {
    /// Errors that must reach the caller even when the loader swallows failures.
    #[must_use]
    pub fn is_always_fatal(&self) -> bool {
        match self {
            BulkLoaderError::ConnectionError { .. }
            | BulkLoaderError::ParameterAlignmentError { .. }
            | BulkLoaderError::ConnectionBusy => true,
            BulkLoaderError::StatementError { source }
            | BulkLoaderError::BatchError { source, .. }
            | BulkLoaderError::QueryError { source } => source.is_always_fatal(),
            _ => false,
        }
    }

    pub(crate) fn statement(source: BulkLoaderError) -> Self {
        BulkLoaderError::StatementError {
            source: Box::new(source),
        }
    }

    pub(crate) fn query(source: BulkLoaderError) -> Self {
        BulkLoaderError::QueryError {
            source: Box::new(source),
        }
    }

    pub(crate) fn batch(batch: usize, first_statement: usize, source: BulkLoaderError) -> Self {
        BulkLoaderError::BatchError {
            batch,
            first_statement,
            source: Box::new(source),
        }
    }
}
