//! Connection lifecycle, execution and transaction behaviour of `Database`.

mod common;

use common::{Call, MockAdapter};
use dbcore::{
    AdapterConfig, ConnectionState, Database, DbError, LimitInfo, ResultRow, ResultSet, SortSpec,
    Value,
};

fn db(adapter: MockAdapter) -> Database<MockAdapter> {
    Database::new(1, adapter).unwrap()
}

#[tokio::test]
async fn connects_lazily_once() {
    let db = db(MockAdapter::new());
    assert_eq!(db.state().await, ConnectionState::Unconnected);
    assert_eq!(db.adapter().connect_count(), 0);

    db.non_query("DELETE FROM sessions").await.unwrap();
    db.non_query("DELETE FROM tokens").await.unwrap();
    db.query("SELECT 1").await.unwrap();

    assert_eq!(db.adapter().connect_count(), 1);
    assert!(db.is_connected().await);
    assert_eq!(
        db.adapter().calls(),
        vec![
            Call::Connect,
            Call::NonQuery("DELETE FROM sessions".to_string()),
            Call::NonQuery("DELETE FROM tokens".to_string()),
            Call::Query("SELECT 1".to_string()),
        ]
    );
}

#[tokio::test]
async fn query_returns_adapter_result_unchanged() {
    let db = db(MockAdapter::new());
    let mut rs = db.query("SELECT id, name FROM users").await.unwrap();
    assert_eq!(rs.count_rows(), 2);
    assert_eq!(rs.count_fields(), 2);
    let first = rs.next_row().unwrap();
    assert_eq!(first.column("name"), Some(&Value::from("Ann")));
    assert_eq!(db.non_query("UPDATE users SET x = 1").await.unwrap(), 1);
}

#[tokio::test]
async fn connect_failure_surfaces_and_nothing_runs() {
    let db = db(MockAdapter::new().failing_connect());
    let err = db.query("SELECT 1").await.unwrap_err();
    assert!(err.is_connection());
    assert!(db.adapter().statements().is_empty());
    assert_eq!(db.state().await, ConnectionState::Unconnected);
}

#[tokio::test]
async fn execution_error_carries_query_and_code() {
    let db = db(MockAdapter::new().failing_on("missing_table"));
    let err = db
        .non_query("DELETE FROM missing_table")
        .await
        .unwrap_err();
    assert!(err.is_execution());
    assert_eq!(err.query(), Some("DELETE FROM missing_table"));
    assert_eq!(err.code(), Some("42S02"));

    // the connection stays usable
    db.non_query("DELETE FROM users").await.unwrap();
}

#[tokio::test]
async fn close_is_terminal() {
    let db = db(MockAdapter::new());
    db.query("SELECT 1").await.unwrap();
    db.close().await.unwrap();
    assert_eq!(db.state().await, ConnectionState::Closed);

    let err = db.query("SELECT 1").await.unwrap_err();
    assert!(matches!(err, DbError::InvalidState(_)));
    assert!(matches!(db.connect().await, Err(DbError::InvalidState(_))));

    // second close is a no-op and does not reach the adapter again
    db.close().await.unwrap();
    let closes = db
        .adapter()
        .calls()
        .into_iter()
        .filter(|c| *c == Call::Close)
        .count();
    assert_eq!(closes, 1);
}

#[tokio::test]
async fn close_before_connect_skips_adapter() {
    let db = db(MockAdapter::new());
    db.close().await.unwrap();
    assert!(db.adapter().calls().is_empty());
    assert!(db.tables().await.is_err());
}

#[tokio::test]
async fn transaction_state_machine() {
    let db = db(MockAdapter::new());

    assert!(matches!(
        db.transaction_commit().await,
        Err(DbError::InvalidState(_))
    ));

    db.transaction_begin().await.unwrap();
    assert!(db.in_transaction().await);
    assert!(matches!(
        db.transaction_begin().await,
        Err(DbError::InvalidState(_))
    ));

    db.non_query("INSERT INTO t VALUES (1)").await.unwrap();
    db.transaction_commit().await.unwrap();
    assert!(!db.in_transaction().await);

    db.transaction_begin().await.unwrap();
    db.transaction_rollback().await.unwrap();
    assert!(matches!(
        db.transaction_rollback().await,
        Err(DbError::InvalidState(_))
    ));

    assert_eq!(
        db.adapter().calls(),
        vec![
            Call::Connect,
            Call::Begin,
            Call::NonQuery("INSERT INTO t VALUES (1)".to_string()),
            Call::Commit,
            Call::Begin,
            Call::Rollback,
        ]
    );
}

#[tokio::test]
async fn catalog_calls_delegate() {
    let db = db(MockAdapter::new());
    assert_eq!(db.tables().await.unwrap(), vec!["orders", "users"]);
    assert_eq!(db.insert_id(Some("users"), Some("id")).await.unwrap(), Some(42));

    let fields = db.fields_for_table("users").await.unwrap();
    assert_eq!(fields.len(), 2);
    assert!(fields[0].is_primary_key());
    assert_eq!(fields[1].max_length(), Some(64));

    let indexes = db.indexes_for_table("users").await.unwrap();
    assert_eq!(indexes[0].columns(), ["id"]);

    let fks = db.foreign_keys_for_table("orders").await.unwrap();
    assert_eq!(fks[0].reference_table(), "users");
    assert!(db.foreign_keys_for_table("users").await.unwrap().is_empty());
}

#[tokio::test]
async fn explain_defaults_to_none() {
    let db = db(MockAdapter::new());
    assert!(db.explain("SELECT 1").await.unwrap().is_none());
}

#[test]
fn descriptive_accessors() {
    let db = db(MockAdapter::new());
    assert_eq!(db.database_index(), 1);
    assert_eq!(db.adapter_label(), "Mock Database Adapter (mock)");
    assert_eq!(db.affected_rows(), -1);
    assert!(!db.only_full_group_by());
    assert_eq!(
        db.sql_limit_suffix(&"20,10".parse::<LimitInfo>().unwrap()),
        " LIMIT 10 OFFSET 20"
    );
    assert_eq!(db.sql_limit_prefix(&LimitInfo::new(5)), "");
    assert_eq!(
        db.sql_sort_by(&[SortSpec::desc("created_at"), SortSpec::asc("id")]),
        r#" ORDER BY "created_at" DESC, "id" ASC"#
    );
    assert_eq!(db.sql_sort_by(&[]), "");
}

#[test]
fn unusable_date_format_rejected_at_construction() {
    let adapter =
        MockAdapter::new().with_config(AdapterConfig::new("mock").with_date_format("%!"));
    assert!(matches!(
        Database::new(1, adapter),
        Err(DbError::Config(_))
    ));
}
