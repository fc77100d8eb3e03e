//! The contract every backend adapter implements.
//!
//! An adapter owns exactly one connection handle and knows how to run raw
//! SQL text against it, introspect the catalog, and render the few
//! dialect-specific fragments the query layer needs. It does not connect
//! lazily or profile; [`Database`](crate::Database) wraps an adapter and
//! adds both.

use crate::catalog::{Field, ForeignKey, Index};
use crate::config::AdapterConfig;
use crate::error::{DbError, DbResult};
use crate::ident::IdentifierQuotes;
use crate::result::ResultSet;
use std::fmt;
use std::future::Future;
use std::str::FromStr;

/// A backend adapter for one RDBMS family.
pub trait Adapter: Send + Sync {
    /// Result cursor returned by queries.
    type ResultSet: ResultSet;

    /// Human-readable adapter name, e.g. `"MySQL Improved Database Adapter"`.
    const NAME: &'static str;

    /// Configuration the adapter was built with.
    fn config(&self) -> &AdapterConfig;

    /// Quote pair for identifiers.
    fn identifier_quotes(&self) -> IdentifierQuotes {
        IdentifierQuotes::ANSI
    }

    /// Whether the backend rejects selecting non-aggregated columns that are
    /// not in GROUP BY, so the query layer must not add them automatically.
    fn only_full_group_by(&self) -> bool {
        false
    }

    /// Whether the backend understands `MERGE INTO ... USING ...`.
    fn supports_merge(&self) -> bool {
        true
    }

    /// Rows affected by the last statement, or `-1` if not tracked.
    fn affected_rows(&self) -> i64 {
        -1
    }

    /// Open the connection.
    fn connect(&self) -> impl Future<Output = DbResult<()>> + Send;

    /// Run a statement that returns rows.
    fn execute_query(&self, sql: &str) -> impl Future<Output = DbResult<Self::ResultSet>> + Send;

    /// Run a statement and return the number of affected rows.
    fn execute_non_query(&self, sql: &str) -> impl Future<Output = DbResult<u64>> + Send;

    /// Names of all tables in the current database.
    fn tables(&self) -> impl Future<Output = DbResult<Vec<String>>> + Send;

    /// Last generated identity value, optionally scoped to a table/column
    /// (sequence-based backends need both).
    fn insert_id(
        &self,
        table: Option<&str>,
        column: Option<&str>,
    ) -> impl Future<Output = DbResult<Option<i64>>> + Send;

    fn fields_for_table(&self, table: &str) -> impl Future<Output = DbResult<Vec<Field>>> + Send;

    fn indexes_for_table(&self, table: &str) -> impl Future<Output = DbResult<Vec<Index>>> + Send;

    fn foreign_keys_for_table(
        &self,
        table: &str,
    ) -> impl Future<Output = DbResult<Vec<ForeignKey>>> + Send;

    fn transaction_begin(&self) -> impl Future<Output = DbResult<()>> + Send;

    fn transaction_commit(&self) -> impl Future<Output = DbResult<()>> + Send;

    fn transaction_rollback(&self) -> impl Future<Output = DbResult<()>> + Send;

    /// Fragment placed right after `SELECT` (e.g. `TOP 10`), or empty.
    fn sql_limit_prefix(&self, limit: &LimitInfo) -> String;

    /// Fragment appended to the statement (e.g. `LIMIT 10 OFFSET 20`), or empty.
    fn sql_limit_suffix(&self, limit: &LimitInfo) -> String;

    /// `ORDER BY` clause for the given sort, or empty when `sort` is empty.
    fn sql_sort_by(&self, sort: &[SortSpec]) -> String;

    /// Close the connection.
    fn close(&self) -> impl Future<Output = DbResult<()>> + Send;

    /// Run the backend's EXPLAIN for `sql`.
    ///
    /// The default implementation reports no EXPLAIN support with `Ok(None)`.
    fn explain(
        &self,
        sql: &str,
    ) -> impl Future<Output = DbResult<Option<Self::ResultSet>>> + Send {
        let _ = sql;
        async { Ok(None) }
    }
}

/// Row limit and optional offset for pagination fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitInfo {
    pub limit: u64,
    pub offset: Option<u64>,
}

impl LimitInfo {
    pub fn new(limit: u64) -> Self {
        Self {
            limit,
            offset: None,
        }
    }

    pub fn with_offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Offset, treating "none" as 0.
    pub fn offset_or_zero(&self) -> u64 {
        self.offset.unwrap_or(0)
    }
}

/// Parses the legacy `"count"` / `"offset,count"` text form.
impl FromStr for LimitInfo {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<u64>()
                .map_err(|_| DbError::validation(format!("invalid limit specification '{s}'")))
        };
        match s.split_once(',') {
            Some((offset, limit)) => Ok(Self::new(parse(limit)?).with_offset(parse(offset)?)),
            None => Ok(Self::new(parse(s)?)),
        }
    }
}

impl fmt::Display for LimitInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.offset {
            Some(offset) => write!(f, "{offset},{}", self.limit),
            None => write!(f, "{}", self.limit),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// One `ORDER BY` term. The column is an unescaped identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }

    /// Render as `<escaped column> ASC|DESC`.
    pub fn to_sql(&self, quotes: IdentifierQuotes) -> String {
        format!("{} {}", quotes.escape(&self.column), self.direction.as_sql())
    }
}
