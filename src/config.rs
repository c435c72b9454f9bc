use std::path::Path;

use serde::Deserialize;

use crate::error::BulkLoaderError;
use crate::types::Backend;

/// Ceiling used when nothing else is configured (SQL Server's limit).
pub const DEFAULT_PARAMS_BATCH_LIMIT: usize = 2100;

/// Options for a [`BulkSqlLoader`](crate::BulkSqlLoader).
///
/// Loaded either through [`LoaderOptionsBuilder`] or from a JSON settings file:
/// ```rust
/// use bulk_sql_loader::prelude::*;
///
/// let opts = LoaderOptions::from_json_str(
///     r#"{ "backend": "sqlite", "raise_on_failure": true, "connect_attempts": 3 }"#,
/// )?;
/// assert_eq!(opts.params_batch_limit, 999);
/// # Ok::<(), BulkLoaderError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Bound parameters allowed per command; a batch always stays strictly below it.
    pub params_batch_limit: usize,
    /// Propagate failures instead of logging them and returning a degraded result.
    pub raise_on_failure: bool,
    /// Open attempts made by the connector before giving up.
    pub connect_attempts: u32,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            params_batch_limit: DEFAULT_PARAMS_BATCH_LIMIT,
            raise_on_failure: false,
            connect_attempts: 1,
        }
    }
}

/// On-disk shape; an explicit limit wins over the backend's.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LoaderSettings {
    backend: Option<Backend>,
    params_batch_limit: Option<usize>,
    #[serde(default)]
    raise_on_failure: bool,
    connect_attempts: Option<u32>,
}

impl LoaderOptions {
    #[must_use]
    pub fn builder() -> LoaderOptionsBuilder {
        LoaderOptionsBuilder::new()
    }

    /// Parse options from a JSON document.
    ///
    /// # Errors
    /// Returns `ConfigParseError` for malformed JSON and `ConfigError` when the
    /// resulting options are invalid.
    pub fn from_json_str(json: &str) -> Result<Self, BulkLoaderError> {
        let settings: LoaderSettings = serde_json::from_str(json)?;
        let mut builder = LoaderOptionsBuilder::new().raise_on_failure(settings.raise_on_failure);
        if let Some(backend) = settings.backend {
            builder = builder.backend(backend);
        }
        if let Some(limit) = settings.params_batch_limit {
            builder = builder.params_batch_limit(limit);
        }
        if let Some(attempts) = settings.connect_attempts {
            builder = builder.connect_attempts(attempts);
        }
        builder.build()
    }

    /// Read and parse a JSON settings file.
    ///
    /// # Errors
    /// Returns `ConfigFileError` if the file cannot be read, otherwise as
    /// [`LoaderOptions::from_json_str`].
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, BulkLoaderError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// # Errors
    /// Returns `ConfigError` when the ceiling is zero.
    pub fn validate(&self) -> Result<(), BulkLoaderError> {
        if self.params_batch_limit == 0 {
            return Err(BulkLoaderError::ConfigError(
                "params_batch_limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Fluent builder for [`LoaderOptions`].
#[derive(Debug, Clone, Default)]
pub struct LoaderOptionsBuilder {
    opts: LoaderOptions,
}

impl From<LoaderOptions> for LoaderOptionsBuilder {
    fn from(opts: LoaderOptions) -> Self {
        Self { opts }
    }
}

impl LoaderOptionsBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the documented ceiling for `backend`.
    #[must_use]
    pub fn backend(mut self, backend: Backend) -> Self {
        self.opts.params_batch_limit = backend.params_batch_limit();
        self
    }

    #[must_use]
    pub fn params_batch_limit(mut self, limit: usize) -> Self {
        self.opts.params_batch_limit = limit;
        self
    }

    #[must_use]
    pub fn raise_on_failure(mut self, raise: bool) -> Self {
        self.opts.raise_on_failure = raise;
        self
    }

    /// Attempts below one are treated as one.
    #[must_use]
    pub fn connect_attempts(mut self, attempts: u32) -> Self {
        self.opts.connect_attempts = attempts.max(1);
        self
    }

    /// # Errors
    /// Returns `ConfigError` when the options do not validate.
    pub fn build(self) -> Result<LoaderOptions, BulkLoaderError> {
        self.opts.validate()?;
        Ok(self.opts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_swallow_and_connect_once() {
        let opts = LoaderOptions::default();
        assert_eq!(opts.params_batch_limit, 2100);
        assert!(!opts.raise_on_failure);
        assert_eq!(opts.connect_attempts, 1);
    }

    #[test]
    fn explicit_limit_overrides_backend() {
        let opts = LoaderOptions::from_json_str(
            r#"{ "backend": "postgres", "params_batch_limit": 10 }"#,
        )
        .unwrap();
        assert_eq!(opts.params_batch_limit, 10);
    }

    #[test]
    fn backend_sets_limit() {
        let opts = LoaderOptions::builder()
            .backend(Backend::Sybase)
            .raise_on_failure(true)
            .build()
            .unwrap();
        assert_eq!(opts.params_batch_limit, 2000);
        assert!(opts.raise_on_failure);
    }

    #[test]
    fn zero_limit_is_rejected() {
        let err = LoaderOptions::builder().params_batch_limit(0).build();
        assert!(matches!(err, Err(BulkLoaderError::ConfigError(_))));
    }

    #[test]
    fn zero_attempts_means_one() {
        let opts = LoaderOptions::builder().connect_attempts(0).build().unwrap();
        assert_eq!(opts.connect_attempts, 1);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = LoaderOptions::from_json_str(r#"{ "paramsBatchLimit": 5 }"#);
        assert!(matches!(err, Err(BulkLoaderError::ConfigParseError(_))));
    }
}
