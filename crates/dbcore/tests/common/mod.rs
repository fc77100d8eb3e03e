//! In-memory adapter that records every statement it is asked to run.

#![allow(dead_code)]

use dbcore::{
    Adapter, AdapterConfig, BufferedResult, DbError, DbResult, Field, FieldType, ForeignKey,
    IdentifierQuotes, Index, LimitInfo, SortSpec, Value,
};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Connect,
    Query(String),
    NonQuery(String),
    Begin,
    Commit,
    Rollback,
    Close,
}

pub struct MockAdapter {
    config: AdapterConfig,
    quotes: IdentifierQuotes,
    calls: Mutex<Vec<Call>>,
    connects: AtomicUsize,
    /// Statements containing this text fail with an execution error.
    fail_on: Option<String>,
    fail_connect: bool,
    merge: bool,
    delay: Option<Duration>,
}

impl MockAdapter {
    pub fn new() -> Self {
        Self {
            config: AdapterConfig::new("mock"),
            quotes: IdentifierQuotes::ANSI,
            calls: Mutex::new(Vec::new()),
            connects: AtomicUsize::new(0),
            fail_on: None,
            fail_connect: false,
            merge: true,
            delay: None,
        }
    }

    pub fn with_config(mut self, config: AdapterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_quotes(mut self, quotes: IdentifierQuotes) -> Self {
        self.quotes = quotes;
        self
    }

    pub fn failing_on(mut self, needle: &str) -> Self {
        self.fail_on = Some(needle.to_string());
        self
    }

    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    pub fn without_merge(mut self) -> Self {
        self.merge = false;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn statements(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Query(s) | Call::NonQuery(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    fn push(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    async fn run(&self, sql: &str) -> DbResult<()> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.fail_on {
            Some(needle) if sql.contains(needle.as_str()) => {
                Err(DbError::execution("42S02", "table not found", sql))
            }
            _ => Ok(()),
        }
    }
}

impl Adapter for MockAdapter {
    type ResultSet = BufferedResult;

    const NAME: &'static str = "Mock Database Adapter";

    fn config(&self) -> &AdapterConfig {
        &self.config
    }

    fn identifier_quotes(&self) -> IdentifierQuotes {
        self.quotes
    }

    fn supports_merge(&self) -> bool {
        self.merge
    }

    async fn connect(&self) -> DbResult<()> {
        if self.fail_connect {
            return Err(DbError::connection("connection refused"));
        }
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.push(Call::Connect);
        Ok(())
    }

    async fn execute_query(&self, sql: &str) -> DbResult<BufferedResult> {
        self.push(Call::Query(sql.to_string()));
        self.run(sql).await?;
        BufferedResult::new(
            ["id", "name"],
            vec![
                vec![Value::Int(1), Value::from("Ann")],
                vec![Value::Int(2), Value::from("Bob")],
            ],
        )
    }

    async fn execute_non_query(&self, sql: &str) -> DbResult<u64> {
        self.push(Call::NonQuery(sql.to_string()));
        self.run(sql).await?;
        Ok(1)
    }

    async fn tables(&self) -> DbResult<Vec<String>> {
        Ok(vec!["orders".to_string(), "users".to_string()])
    }

    async fn insert_id(
        &self,
        _table: Option<&str>,
        _column: Option<&str>,
    ) -> DbResult<Option<i64>> {
        Ok(Some(42))
    }

    async fn fields_for_table(&self, table: &str) -> DbResult<Vec<Field>> {
        Ok(vec![
            Field::new("id", table, FieldType::Integer)
                .identity()
                .primary_key(),
            Field::new("name", table, FieldType::VarChar).with_max_length(64),
        ])
    }

    async fn indexes_for_table(&self, _table: &str) -> DbResult<Vec<Index>> {
        Ok(vec![Index::new("PRIMARY", true, true, ["id"])])
    }

    async fn foreign_keys_for_table(&self, table: &str) -> DbResult<Vec<ForeignKey>> {
        if table == "orders" {
            Ok(vec![ForeignKey::new("fk_orders_user", ["user_id"], "users", ["id"])?])
        } else {
            Ok(Vec::new())
        }
    }

    async fn transaction_begin(&self) -> DbResult<()> {
        self.push(Call::Begin);
        Ok(())
    }

    async fn transaction_commit(&self) -> DbResult<()> {
        self.push(Call::Commit);
        Ok(())
    }

    async fn transaction_rollback(&self) -> DbResult<()> {
        self.push(Call::Rollback);
        Ok(())
    }

    fn sql_limit_prefix(&self, _limit: &LimitInfo) -> String {
        String::new()
    }

    fn sql_limit_suffix(&self, limit: &LimitInfo) -> String {
        match limit.offset {
            Some(offset) => format!(" LIMIT {} OFFSET {offset}", limit.limit),
            None => format!(" LIMIT {}", limit.limit),
        }
    }

    fn sql_sort_by(&self, sort: &[SortSpec]) -> String {
        if sort.is_empty() {
            return String::new();
        }
        let terms: Vec<_> = sort.iter().map(|s| s.to_sql(self.quotes)).collect();
        format!(" ORDER BY {}", terms.join(", "))
    }

    async fn close(&self) -> DbResult<()> {
        self.push(Call::Close);
        Ok(())
    }
}
