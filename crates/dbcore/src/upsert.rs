//! MERGE-based insert-or-update synthesis.
//!
//! Produces a single statement of the shape
//!
//! ```text
//! MERGE INTO <table> AS target_ USING <table> AS source_ ON <match>
//! WHEN MATCHED THEN UPDATE SET <col = val, ...>
//! WHEN NOT MATCHED THEN INSERT (<cols>) VALUES (<vals>)
//! ```
//!
//! (emitted on one line). Only backends with MERGE support can run it; see
//! [`Adapter::supports_merge`](crate::Adapter::supports_merge).

use crate::error::{DbError, DbResult};
use crate::ident::IdentifierQuotes;
use crate::literal::LiteralSerializer;
use crate::value::{EqualityMode, Value};

/// Which columns the MERGE matches existing rows on.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MatchKeys {
    /// Match on the first column of the column set.
    ///
    /// Fragile: the outcome depends on column order. Prefer naming the key.
    #[default]
    FirstColumn,
    /// Match on one named column.
    Column(String),
    /// Match on every named column, joined with `AND` in the given order.
    Columns(Vec<String>),
}

impl From<&str> for MatchKeys {
    fn from(name: &str) -> Self {
        MatchKeys::Column(name.to_string())
    }
}

impl From<String> for MatchKeys {
    fn from(name: String) -> Self {
        MatchKeys::Column(name)
    }
}

impl From<Vec<String>> for MatchKeys {
    fn from(names: Vec<String>) -> Self {
        MatchKeys::Columns(names)
    }
}

impl From<Vec<&str>> for MatchKeys {
    fn from(names: Vec<&str>) -> Self {
        MatchKeys::Columns(names.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for MatchKeys {
    fn from(names: [&str; N]) -> Self {
        MatchKeys::Columns(names.into_iter().map(str::to_string).collect())
    }
}

impl<T: Into<MatchKeys>> From<Option<T>> for MatchKeys {
    fn from(keys: Option<T>) -> Self {
        keys.map_or(MatchKeys::FirstColumn, Into::into)
    }
}

/// Escape every column name and serialize every value, preserving order.
pub fn escape_identifiers_and_values<K: AsRef<str>>(
    columns: &[(K, Value)],
    quotes: IdentifierQuotes,
    serializer: &LiteralSerializer,
) -> DbResult<Vec<(String, String)>> {
    columns
        .iter()
        .map(|(name, value)| {
            Ok((
                quotes.escape(name.as_ref()),
                serializer.serialize(value, EqualityMode::None)?,
            ))
        })
        .collect()
}

/// Build the MERGE statement text for an upsert into `table`.
pub fn merge_statement<K: AsRef<str>>(
    table: &str,
    columns: &[(K, Value)],
    keys: &MatchKeys,
    quotes: IdentifierQuotes,
    serializer: &LiteralSerializer,
) -> DbResult<String> {
    if columns.is_empty() {
        return Err(DbError::validation(format!(
            "upsert into '{table}' requires at least one column"
        )));
    }

    let escaped = escape_identifiers_and_values(columns, quotes, serializer)?;

    let set_clause = escaped
        .iter()
        .map(|(col, val)| format!("{col} = {val}"))
        .collect::<Vec<_>>()
        .join(", ");

    let match_condition = match keys {
        MatchKeys::FirstColumn => {
            tracing::warn!(
                target: "dbcore.sql",
                table,
                column = columns[0].0.as_ref(),
                "upsert without explicit match key; matching on first column"
            );
            match_on(&escaped[0].0)
        }
        MatchKeys::Column(name) => match_on(&quotes.escape(name)),
        MatchKeys::Columns(names) => {
            if names.is_empty() {
                return Err(DbError::validation(format!(
                    "upsert into '{table}' has an empty match key list"
                )));
            }
            names
                .iter()
                .map(|name| match_on(&quotes.escape(name)))
                .collect::<Vec<_>>()
                .join(" AND ")
        }
    };

    let table = quotes.escape(table);
    let column_list = escaped
        .iter()
        .map(|(col, _)| col.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let value_list = escaped
        .iter()
        .map(|(_, val)| val.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!(
        "MERGE INTO {table} AS target_ USING {table} AS source_ ON {match_condition} \
         WHEN MATCHED THEN UPDATE SET {set_clause} \
         WHEN NOT MATCHED THEN INSERT ({column_list}) VALUES ({value_list})"
    ))
}

fn match_on(escaped_column: &str) -> String {
    format!("target_.{escaped_column} = source_.{escaped_column}")
}
