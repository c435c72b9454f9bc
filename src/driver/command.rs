use std::ops::Range;

use crate::error::BulkLoaderError;
use crate::placeholders::{STATEMENT_SEPARATOR, count_placeholders, parameter_name};
use crate::types::RowValues;

/// A value bound under a placeholder name such as `@p3`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundParameter {
    pub name: String,
    pub value: RowValues,
}

/// Text and parameters submitted to the driver in one execute call.
///
/// The text is every statement followed by `;`. The span of each statement is
/// kept so drivers that prepare one statement at a time can walk them without
/// re-parsing the SQL.
#[derive(Debug, Clone, Default)]
pub struct Command {
    text: String,
    spans: Vec<Range<usize>>,
    parameters: Vec<BoundParameter>,
}

impl Command {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Command for one statement, binding its placeholders to the leading
    /// entries of `parameters` as `@p0`, `@p1`, ...
    ///
    /// # Errors
    /// Returns `ParameterAlignmentError` when `parameters` is too short.
    pub fn from_statement(
        statement: &str,
        parameters: &[RowValues],
    ) -> Result<Self, BulkLoaderError> {
        let mut command = Self::new();
        for index in 0..count_placeholders(statement) {
            let value = parameters
                .get(index)
                .ok_or(BulkLoaderError::ParameterAlignmentError {
                    statement: 0,
                    needed: index,
                    available: parameters.len(),
                })?;
            command.bind(parameter_name(index), value.clone());
        }
        command.push_statement(statement);
        Ok(command)
    }

    pub(crate) fn push_statement(&mut self, statement: &str) {
        let start = self.text.len();
        self.text.push_str(statement);
        self.spans.push(start..self.text.len());
        self.text.push(STATEMENT_SEPARATOR);
    }

    pub(crate) fn bind(&mut self, name: String, value: RowValues) {
        self.parameters.push(BoundParameter { name, value });
    }

    /// Full multi-statement text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The individual statements, without separators, in submission order.
    pub fn statements(&self) -> impl Iterator<Item = &str> + '_ {
        self.spans.iter().map(|span| &self.text[span.clone()])
    }

    #[must_use]
    pub fn statement_count(&self) -> usize {
        self.spans.len()
    }

    #[must_use]
    pub fn parameters(&self) -> &[BoundParameter] {
        &self.parameters
    }

    /// Look up a bound value by placeholder name (linear scan).
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&RowValues> {
        self.parameters
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.value)
    }
}
