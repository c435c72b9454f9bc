//! Placeholder scanning.
//!
//! A placeholder is the marker `@` followed by a name, conventionally `@p<N>`
//! where `N` is the global index into the parameter vector. Counting is a raw
//! character scan: an `@` inside a string literal or a comment is counted too,
//! which shifts every later parameter. Batch boundaries depend on this count,
//! so the scan deliberately stays naive.

/// Character that introduces a placeholder.
pub const PLACEHOLDER_MARKER: char = '@';

/// Appended after every statement when building a multi-statement command.
pub const STATEMENT_SEPARATOR: char = ';';

/// Number of placeholder markers in `statement`.
#[must_use]
pub fn count_placeholders(statement: &str) -> usize {
    statement
        .bytes()
        .filter(|b| *b == PLACEHOLDER_MARKER as u8)
        .count()
}

/// Bound parameter name for the given global index, e.g. `@p7`.
#[must_use]
pub fn parameter_name(global_index: usize) -> String {
    format!("{PLACEHOLDER_MARKER}p{global_index}")
}
