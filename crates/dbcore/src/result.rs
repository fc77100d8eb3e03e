//! Result sets returned by `query`.
//!
//! Adapters return their own cursor types implementing [`ResultSet`]; those
//! that materialise results up front can use [`BufferedResult`].

use crate::catalog::Field;
use crate::error::{DbError, DbResult};
use crate::value::Value;
use std::collections::VecDeque;
use std::sync::Arc;

/// A single row with named columns.
pub trait ResultRow {
    /// Value of column `name`, or `None` if the row has no such column.
    fn column(&self, name: &str) -> Option<&Value>;

    fn column_exists(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Column names in result order.
    fn column_names(&self) -> Vec<&str>;
}

/// A forward-only cursor over query results.
pub trait ResultSet: Send {
    type Row: ResultRow;

    /// Total number of rows the query produced.
    fn count_rows(&self) -> usize;

    fn count_fields(&self) -> usize;

    /// Field metadata, if the backend reports it.
    fn fields(&self) -> &[Field];

    /// Advance the cursor.
    fn next_row(&mut self) -> Option<Self::Row>;

    /// Release backend resources. Further `next_row` calls return `None`.
    fn close(&mut self);

    /// Drain all remaining rows.
    fn rows(mut self) -> Vec<Self::Row>
    where
        Self: Sized,
    {
        let mut rows = Vec::new();
        while let Some(row) = self.next_row() {
            rows.push(row);
        }
        rows
    }
}

/// A row of a [`BufferedResult`].
#[derive(Debug, Clone, PartialEq)]
pub struct BufferedRow {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl BufferedRow {
    /// Value at position `idx`.
    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

impl ResultRow for BufferedRow {
    fn column(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == name)
            .and_then(|i| self.values.get(i))
    }

    fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(String::as_str).collect()
    }
}

/// Fully materialised query results.
#[derive(Debug, Clone, Default)]
pub struct BufferedResult {
    columns: Arc<[String]>,
    fields: Vec<Field>,
    rows: VecDeque<Vec<Value>>,
    total: usize,
}

impl BufferedResult {
    /// Build from column names and rows. Every row must match the column count.
    pub fn new<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: Vec<Vec<Value>>,
    ) -> DbResult<Self> {
        let columns: Arc<[String]> = columns.into_iter().map(Into::into).collect();
        if let Some((i, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(DbError::validation(format!(
                "row {i} has {} values but the result has {} columns",
                row.len(),
                columns.len()
            )));
        }
        Ok(Self {
            columns,
            fields: Vec::new(),
            total: rows.len(),
            rows: rows.into(),
        })
    }

    /// An empty result with no columns.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Attach field metadata.
    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl ResultSet for BufferedResult {
    type Row = BufferedRow;

    fn count_rows(&self) -> usize {
        self.total
    }

    fn count_fields(&self) -> usize {
        self.columns.len()
    }

    fn fields(&self) -> &[Field] {
        &self.fields
    }

    fn next_row(&mut self) -> Option<BufferedRow> {
        self.rows.pop_front().map(|values| BufferedRow {
            columns: Arc::clone(&self.columns),
            values,
        })
    }

    fn close(&mut self) {
        self.rows.clear();
    }
}
