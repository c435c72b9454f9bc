use std::collections::HashMap;
use std::sync::Arc;

use super::row::DbRow;
use crate::types::RowValues;

/// Rows returned by a query, in the order the driver produced them.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    /// The rows returned by the query
    pub results: Vec<DbRow>,
    column_names: Arc<Vec<String>>,
    column_index: Arc<HashMap<String, usize>>,
}

impl ResultSet {
    /// Create an empty result set whose rows will carry `column_names`.
    #[must_use]
    pub fn with_columns(column_names: Vec<String>) -> ResultSet {
        let column_index = column_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect::<HashMap<_, _>>();
        ResultSet {
            results: Vec::new(),
            column_names: Arc::new(column_names),
            column_index: Arc::new(column_index),
        }
    }

    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Append a row; values are expected in column order.
    pub fn add_row_values(&mut self, row_values: Vec<RowValues>) {
        self.results.push(DbRow::new(
            Arc::clone(&self.column_names),
            Arc::clone(&self.column_index),
            row_values,
        ));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DbRow> {
        self.results.iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a DbRow;
    type IntoIter = std::slice::Iter<'a, DbRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_share_column_lookup() {
        let mut rs = ResultSet::with_columns(vec!["id".into(), "name".into()]);
        rs.add_row_values(vec![RowValues::Int(1), RowValues::Text("a".into())]);
        rs.add_row_values(vec![RowValues::Int(2), RowValues::Null]);

        assert_eq!(rs.len(), 2);
        assert_eq!(rs.results[1].get("id"), Some(&RowValues::Int(2)));
        assert_eq!(rs.results[0].get("name").and_then(RowValues::as_text), Some("a"));
        assert!(rs.results[0].get("missing").is_none());
        assert!(Arc::ptr_eq(&rs.results[0].column_names, &rs.results[1].column_names));
    }

    #[test]
    fn default_is_empty() {
        let rs = ResultSet::default();
        assert!(rs.is_empty());
        assert!(rs.column_names().is_empty());
    }
}
