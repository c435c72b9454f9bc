use std::path::Path;

use bulk_sql_loader::{BulkLoaderError, RowValues};
use serde::Deserialize;

/// Statements and the flat parameter vector they consume.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Job {
    pub(crate) statements: Vec<String>,
    #[serde(default)]
    pub(crate) parameters: Vec<RowValues>,
}

impl Job {
    pub(crate) fn load(path: &Path) -> Result<Self, BulkLoaderError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}
