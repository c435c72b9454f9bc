//! Convenient imports for common functionality.

pub use crate::batch::{BatchPacker, BatchRunReport, PackedBatch};
pub use crate::config::{LoaderOptions, LoaderOptionsBuilder};
pub use crate::driver::{Command, DbConnection};
pub use crate::error::BulkLoaderError;
pub use crate::loader::{BulkSqlLoader, SWALLOWED_FAILURE_ROWS};
pub use crate::results::{DbRow, ResultSet};
pub use crate::types::{Backend, IsolationLevel, RowValues};

#[cfg(feature = "sqlite")]
pub use crate::sqlite::{SqliteConnection, SqliteOptions, SqliteOptionsBuilder};
