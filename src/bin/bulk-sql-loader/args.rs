use std::path::PathBuf;

use bulk_sql_loader::{Backend, IsolationLevel};
use clap::Parser;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(author, version, about = "Load a JSON job of parameterized statements into SQLite")]
pub(crate) struct Args {
    /// SQLite database file
    #[arg(long)]
    pub(crate) db: PathBuf,
    /// Job file: { "statements": [...], "parameters": [...] }
    #[arg(long)]
    pub(crate) job: PathBuf,
    /// JSON settings file with loader options
    #[arg(long)]
    pub(crate) settings: Option<PathBuf>,
    /// Use the documented parameter ceiling of this engine
    #[arg(long, value_enum)]
    pub(crate) backend: Option<Backend>,
    /// Explicit parameter ceiling; wins over --backend
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    #[arg(long)]
    pub(crate) attempts: Option<u32>,
    /// Fail on the first error instead of reporting a partial run
    #[arg(long)]
    pub(crate) raise: bool,
    #[arg(long, value_enum, default_value = "serializable")]
    pub(crate) isolation: IsolationLevel,
    /// Run through the tokio entry points
    #[arg(long = "async")]
    pub(crate) suspend: bool,
    #[arg(long, default_value = "info")]
    pub(crate) log_level: Level,
    #[arg(long)]
    pub(crate) no_wal: bool,
}
