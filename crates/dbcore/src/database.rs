//! The connection-aware entry point wrapping an [`Adapter`].
//!
//! `Database` connects lazily on first use, optionally profiles every
//! statement, and exposes the adapter-independent SQL helpers (literals,
//! identifiers, templates, upserts) configured for that adapter.

use crate::adapter::{Adapter, LimitInfo, SortSpec};
use crate::catalog::{Field, ForeignKey, Index};
use crate::config::AdapterConfig;
use crate::error::{DbError, DbResult};
use crate::ident::IdentifierQuotes;
use crate::literal::LiteralSerializer;
use crate::profile::{ProfileEntry, ProfileLog, ProfileSummary, TimerRegistry, timer_name};
use crate::template::{self, Bindings};
use crate::upsert::{self, MatchKeys};
use crate::value::{EqualityMode, Value};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// Lifecycle of the single connection a [`Database`] owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Unconnected,
    Connected { in_transaction: bool },
    /// Terminal.
    Closed,
}

/// One numbered database connection.
pub struct Database<A: Adapter> {
    index: usize,
    adapter: A,
    serializer: LiteralSerializer,
    state: Mutex<ConnectionState>,
    profiling: AtomicBool,
    profile: ProfileLog,
    timers: TimerRegistry,
}

impl<A: Adapter> Database<A> {
    /// Wrap `adapter` as database connection number `index`.
    ///
    /// Fails if the adapter's configuration carries an unusable date format.
    pub fn new(index: usize, adapter: A) -> DbResult<Self> {
        let config = adapter.config();
        config.validate()?;
        let serializer = config.literal_serializer()?;
        let profiling = config.profiling;
        Ok(Self {
            index,
            adapter,
            serializer,
            state: Mutex::new(ConnectionState::Unconnected),
            profiling: AtomicBool::new(profiling),
            profile: ProfileLog::new(),
            timers: TimerRegistry::new(),
        })
    }

    pub fn database_index(&self) -> usize {
        self.index
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn config(&self) -> &AdapterConfig {
        self.adapter.config()
    }

    pub fn serializer(&self) -> &LiteralSerializer {
        &self.serializer
    }

    pub fn identifier_quotes(&self) -> IdentifierQuotes {
        self.adapter.identifier_quotes()
    }

    pub fn only_full_group_by(&self) -> bool {
        self.adapter.only_full_group_by()
    }

    /// `"<adapter name> (<config adapter key>)"`.
    pub fn adapter_label(&self) -> String {
        match self.config().adapter.as_deref() {
            Some(key) => format!("{} ({key})", A::NAME),
            None => A::NAME.to_string(),
        }
    }

    /// Rows affected by the last statement, `-1` if the adapter does not track it.
    pub fn affected_rows(&self) -> i64 {
        self.adapter.affected_rows()
    }

    pub async fn state(&self) -> ConnectionState {
        *self.state.lock().await
    }

    pub async fn is_connected(&self) -> bool {
        matches!(self.state().await, ConnectionState::Connected { .. })
    }

    pub async fn in_transaction(&self) -> bool {
        matches!(
            self.state().await,
            ConnectionState::Connected {
                in_transaction: true
            }
        )
    }

    // ── Connection lifecycle ─────────────────────────────────────────────

    /// Connect if not yet connected. Idempotent while connected.
    pub async fn connect(&self) -> DbResult<()> {
        let mut state = self.state.lock().await;
        match *state {
            ConnectionState::Connected { .. } => Ok(()),
            ConnectionState::Closed => Err(self.closed_error()),
            ConnectionState::Unconnected => {
                self.adapter.connect().await?;
                *state = ConnectionState::Connected {
                    in_transaction: false,
                };
                tracing::info!(
                    target: "dbcore.sql",
                    database = self.index,
                    adapter = %self.adapter_label(),
                    "connected"
                );
                Ok(())
            }
        }
    }

    /// Close the connection. Closing twice is a no-op; nothing can be
    /// executed afterwards.
    pub async fn close(&self) -> DbResult<()> {
        let mut state = self.state.lock().await;
        match *state {
            ConnectionState::Closed => return Ok(()),
            ConnectionState::Unconnected => {}
            ConnectionState::Connected { in_transaction } => {
                if in_transaction {
                    tracing::warn!(
                        target: "dbcore.sql",
                        database = self.index,
                        "closing connection with an open transaction"
                    );
                }
                self.adapter.close().await?;
            }
        }
        *state = ConnectionState::Closed;
        tracing::info!(target: "dbcore.sql", database = self.index, "connection closed");
        Ok(())
    }

    fn closed_error(&self) -> DbError {
        DbError::invalid_state(format!("database connection #{} is closed", self.index))
    }

    // ── Execution ────────────────────────────────────────────────────────

    /// Run a statement that returns rows.
    pub async fn query(&self, sql: &str) -> DbResult<A::ResultSet> {
        self.query_tagged(sql, "query").await
    }

    /// Run a statement that returns rows, labelling its profile entry with `tag`.
    pub async fn query_tagged(&self, sql: &str, tag: &str) -> DbResult<A::ResultSet> {
        self.connect().await?;
        self.execute_profiled(sql, tag, || self.adapter.execute_query(sql))
            .await
    }

    /// Run a statement and return the number of affected rows.
    pub async fn non_query(&self, sql: &str) -> DbResult<u64> {
        self.non_query_tagged(sql, "non_query").await
    }

    /// Like [`non_query`](Self::non_query), labelling the profile entry with `tag`.
    pub async fn non_query_tagged(&self, sql: &str, tag: &str) -> DbResult<u64> {
        self.connect().await?;
        self.execute_profiled(sql, tag, || self.adapter.execute_non_query(sql))
            .await
    }

    async fn execute_profiled<T, F, Fut>(&self, sql: &str, tag: &str, exec: F) -> DbResult<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = DbResult<T>>,
    {
        tracing::debug!(
            target: "dbcore.sql",
            database = self.index,
            tag,
            sql,
            "executing statement"
        );

        let timer = self.is_profiling_enabled().then(|| {
            let name = timer_name();
            self.timers.start(&name);
            name
        });

        let result = exec().await;

        if let Some(name) = timer {
            let elapsed = self.timers.stop(&name);
            if let (Ok(_), Some(elapsed)) = (&result, elapsed) {
                let entry = ProfileEntry::new(tag, sql, elapsed);
                tracing::debug!(
                    target: "dbcore.sql",
                    database = self.index,
                    tag,
                    elapsed_ms = entry.elapsed_ms,
                    "statement profiled"
                );
                self.profile.record(entry);
            }
            self.timers.reset(&name);
        }

        if let Err(e) = &result {
            tracing::warn!(
                target: "dbcore.sql",
                database = self.index,
                tag,
                code = e.code().unwrap_or(""),
                error = %e,
                "statement failed"
            );
        }

        result
    }

    /// Run the backend's EXPLAIN for `sql`; `None` if the adapter has none.
    pub async fn explain(&self, sql: &str) -> DbResult<Option<A::ResultSet>> {
        self.connect().await?;
        self.adapter.explain(sql).await
    }

    // ── Upsert ───────────────────────────────────────────────────────────

    /// Insert a row or update the existing one matched by `keys`, via MERGE.
    ///
    /// Returns the affected row count. Fails with [`DbError::Unsupported`]
    /// on adapters without MERGE.
    pub async fn insert_or_update<K: AsRef<str>>(
        &self,
        table: &str,
        columns: &[(K, Value)],
        keys: impl Into<MatchKeys>,
    ) -> DbResult<u64> {
        if !self.adapter.supports_merge() {
            return Err(DbError::Unsupported(format!(
                "{} does not support MERGE-based insert-or-update",
                A::NAME
            )));
        }
        let sql = upsert::merge_statement(
            table,
            columns,
            &keys.into(),
            self.identifier_quotes(),
            &self.serializer,
        )?;
        self.non_query_tagged(&sql, "insert_or_update").await
    }

    // ── Transactions ─────────────────────────────────────────────────────

    /// Begin a transaction, connecting first if needed.
    pub async fn transaction_begin(&self) -> DbResult<()> {
        self.connect().await?;
        let mut state = self.state.lock().await;
        match *state {
            ConnectionState::Connected {
                in_transaction: false,
            } => {
                self.adapter.transaction_begin().await?;
                *state = ConnectionState::Connected {
                    in_transaction: true,
                };
                tracing::debug!(target: "dbcore.sql", database = self.index, "transaction begun");
                Ok(())
            }
            ConnectionState::Connected {
                in_transaction: true,
            } => Err(DbError::invalid_state("a transaction is already active")),
            // closed between connect() and here
            _ => Err(self.closed_error()),
        }
    }

    pub async fn transaction_commit(&self) -> DbResult<()> {
        self.finish_transaction(true).await
    }

    pub async fn transaction_rollback(&self) -> DbResult<()> {
        self.finish_transaction(false).await
    }

    async fn finish_transaction(&self, commit: bool) -> DbResult<()> {
        let action = if commit { "commit" } else { "rollback" };
        let mut state = self.state.lock().await;
        match *state {
            ConnectionState::Connected {
                in_transaction: true,
            } => {
                if commit {
                    self.adapter.transaction_commit().await?;
                } else {
                    self.adapter.transaction_rollback().await?;
                }
                *state = ConnectionState::Connected {
                    in_transaction: false,
                };
                tracing::debug!(
                    target: "dbcore.sql",
                    database = self.index,
                    action,
                    "transaction finished"
                );
                Ok(())
            }
            ConnectionState::Connected {
                in_transaction: false,
            } => Err(DbError::invalid_state(format!(
                "cannot {action}: no active transaction"
            ))),
            ConnectionState::Unconnected => Err(DbError::invalid_state(format!(
                "cannot {action}: not connected"
            ))),
            ConnectionState::Closed => Err(self.closed_error()),
        }
    }

    // ── Catalog ──────────────────────────────────────────────────────────

    pub async fn tables(&self) -> DbResult<Vec<String>> {
        self.connect().await?;
        self.adapter.tables().await
    }

    /// Last generated identity value, optionally scoped to a table and column.
    pub async fn insert_id(
        &self,
        table: Option<&str>,
        column: Option<&str>,
    ) -> DbResult<Option<i64>> {
        self.connect().await?;
        self.adapter.insert_id(table, column).await
    }

    pub async fn fields_for_table(&self, table: &str) -> DbResult<Vec<Field>> {
        self.connect().await?;
        self.adapter.fields_for_table(table).await
    }

    pub async fn indexes_for_table(&self, table: &str) -> DbResult<Vec<Index>> {
        self.connect().await?;
        self.adapter.indexes_for_table(table).await
    }

    pub async fn foreign_keys_for_table(&self, table: &str) -> DbResult<Vec<ForeignKey>> {
        self.connect().await?;
        self.adapter.foreign_keys_for_table(table).await
    }

    // ── SQL fragments ────────────────────────────────────────────────────

    pub fn sql_limit_prefix(&self, limit: &LimitInfo) -> String {
        self.adapter.sql_limit_prefix(limit)
    }

    pub fn sql_limit_suffix(&self, limit: &LimitInfo) -> String {
        self.adapter.sql_limit_suffix(limit)
    }

    pub fn sql_sort_by(&self, sort: &[SortSpec]) -> String {
        self.adapter.sql_sort_by(sort)
    }

    /// Render `value` as a literal (or comparison, per `mode`) for this adapter.
    pub fn sql_variable(&self, value: &Value, mode: EqualityMode) -> DbResult<String> {
        self.serializer.serialize(value, mode)
    }

    pub fn escape_values(&self, values: &[Value]) -> DbResult<Vec<String>> {
        self.serializer.serialize_all(values)
    }

    pub fn escape_identifier(&self, name: &str) -> String {
        self.identifier_quotes().escape(name)
    }

    pub fn escape_identifiers<I, S>(&self, names: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.identifier_quotes().escape_all(names)
    }

    pub fn escape_identifiers_and_values<K: AsRef<str>>(
        &self,
        columns: &[(K, Value)],
    ) -> DbResult<Vec<(String, String)>> {
        upsert::escape_identifiers_and_values(columns, self.identifier_quotes(), &self.serializer)
    }

    /// Substitute placeholders in `template`; unbound ones are kept verbatim.
    pub fn prepare_statement(&self, template: &str, bindings: &Bindings) -> DbResult<String> {
        template::render(template, bindings, &self.serializer)
    }

    /// Like [`prepare_statement`](Self::prepare_statement) but fails on unbound keys.
    pub fn prepare_statement_strict(
        &self,
        template: &str,
        bindings: &Bindings,
    ) -> DbResult<String> {
        template::render_strict(template, bindings, &self.serializer)
    }

    // ── Profiling ────────────────────────────────────────────────────────

    /// Start recording profile entries. Entries already recorded are kept.
    pub fn enable_profiling(&self) {
        if !self.profiling.swap(true, Ordering::Relaxed) {
            tracing::debug!(target: "dbcore.sql", database = self.index, "profiling enabled");
        }
    }

    pub fn is_profiling_enabled(&self) -> bool {
        self.profiling.load(Ordering::Relaxed)
    }

    /// Snapshot of the recorded entries in execution order.
    pub fn profile(&self) -> Vec<ProfileEntry> {
        self.profile.snapshot()
    }

    pub fn profile_summary(&self) -> ProfileSummary {
        ProfileSummary {
            database_index: self.index,
            profiling_enabled: self.is_profiling_enabled(),
            query_count: self.profile.len(),
            total_elapsed_ms: self.profile.total_elapsed_ms(),
        }
    }
}

impl<A: Adapter> std::fmt::Debug for Database<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("index", &self.index)
            .field("adapter", &self.adapter_label())
            .field("profiling", &self.is_profiling_enabled())
            .field("profiled_statements", &self.profile.len())
            .finish_non_exhaustive()
    }
}
