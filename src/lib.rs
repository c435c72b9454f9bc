//! Parameter-ceiling aware bulk loading of SQL statements.
//!
//! Database engines cap how many parameters one command may bind (999 for
//! `SQLite`, 2100 for SQL Server, 32767 for `PostgreSQL`, ...). The loader
//! takes an ordered list of parameterized statements plus one flat parameter
//! vector, packs consecutive statements into batches that stay strictly below
//! the ceiling, and runs each batch as one command in its own transaction.
//!
//! ```rust,no_run
//! use bulk_sql_loader::prelude::*;
//!
//! # fn main() -> Result<(), BulkLoaderError> {
//! let options = LoaderOptions::builder()
//!     .backend(Backend::Sqlite)
//!     .raise_on_failure(true)
//!     .build()?;
//! let mut loader = BulkSqlLoader::with_options(SqliteConnection::for_path("load.db"), options)?;
//!
//! let statements: Vec<String> = (0..1000)
//!     .map(|i| format!("INSERT INTO items (id, name) VALUES (@p{}, @p{})", 2 * i, 2 * i + 1))
//!     .collect();
//! let params: Vec<RowValues> = (0..1000)
//!     .flat_map(|i| [RowValues::Int(i), RowValues::Text(format!("item {i}"))])
//!     .collect();
//!
//! let report = loader.execute_non_queries(&statements, &params, IsolationLevel::default())?;
//! assert_eq!(report.statements_committed, 1000);
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod config;
pub mod connector;
pub mod driver;
pub mod error;
pub mod loader;
pub mod placeholders;
pub mod prelude;
pub mod results;
pub mod types;

mod worker;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use batch::{BatchPacker, BatchRunReport, PackedBatch};
pub use config::{LoaderOptions, LoaderOptionsBuilder};
pub use driver::{BoundParameter, Command, DbConnection, Transaction};
pub use error::BulkLoaderError;
pub use loader::{BulkSqlLoader, SWALLOWED_FAILURE_ROWS};
pub use results::{DbRow, ResultSet};
pub use types::{Backend, IsolationLevel, RowValues};

#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteConnection, SqliteOptions, SqliteOptionsBuilder};
