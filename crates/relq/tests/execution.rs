mod common;

use common::{FakeConnection, users};
use relq::{
    Database, DbError, DriverError, QueryContext, QueryMonitor, QueryResult, QueryType,
    SqlErrorKind, StatsMonitor, Value, record, table,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

table! {
    pub struct Users => "users" {
        id: "int", auto;
        name: "string", required;
        created: "timestamp", required;
        active: "bool", optional(true);
    }
}

#[test]
fn arrays_expand_into_one_placeholder_per_element() {
    let db = Database::postgres();
    let fake = FakeConnection::new();
    let mut conn = db.connect(fake.clone());

    let query = db
        .sql("SELECT * FROM t WHERE id IN :id AND id_x = :id_x")
        .bind("id", vec![1, 2, 3])
        .unwrap()
        .bind("id_x", 9)
        .unwrap();
    conn.prepare(&query).unwrap();

    assert_eq!(
        fake.prepared(),
        vec!["SELECT * FROM t WHERE id IN (:id_1, :id_2, :id_3) AND id_x = :id_x".to_string()]
    );
    assert_eq!(
        fake.last_binds(),
        vec![
            ("id_1".to_string(), Value::Int(1)),
            ("id_2".to_string(), Value::Int(2)),
            ("id_3".to_string(), Value::Int(3)),
            ("id_x".to_string(), Value::Int(9)),
        ]
    );
    // prepare alone does not execute
    assert_eq!(fake.events(), vec!["prepare"]);
}

#[test]
fn empty_array_expands_to_null() {
    let db = Database::mysql();
    let fake = FakeConnection::new();
    let mut conn = db.connect(fake.clone());

    let query = db
        .sql("SELECT * FROM t WHERE id IN :ids")
        .bind("ids", Vec::<i64>::new())
        .unwrap();
    conn.execute(&query).unwrap();

    assert_eq!(fake.prepared(), vec!["SELECT * FROM t WHERE id IN (null)".to_string()]);
    assert!(fake.last_binds().is_empty());
}

#[test]
fn insert_binds_storage_values() {
    let db = Database::postgres();
    let table = Users::new(&db.schema(None)).unwrap();
    let fake = FakeConnection::new();
    let mut conn = db.connect(fake.clone());

    let query = db
        .insert(&table)
        .add(record! { "name" => "alice", "created" => 1446648052 });
    let stmt = conn.execute(&query).unwrap();

    assert_eq!(
        stmt.display_sql(),
        "INSERT INTO \"users\" (\"name\", \"created\", \"active\") VALUES\n\
         ('alice', '2015-11-04 14:40:52', TRUE)"
    );
    assert_eq!(
        fake.last_binds(),
        vec![
            ("c0_0".to_string(), Value::from("alice")),
            ("c0_1".to_string(), Value::from("2015-11-04 14:40:52")),
            ("c0_2".to_string(), Value::Bool(true)),
        ]
    );
    assert_eq!(fake.events(), vec!["prepare", "execute"]);
}

#[test]
fn builder_errors_stop_before_the_client() {
    let db = Database::postgres();
    let table = Users::new(&db.schema(None)).unwrap();
    let fake = FakeConnection::new();
    let mut conn = db.connect(fake.clone());

    let err = conn.execute(&db.insert(&table)).unwrap_err();
    assert!(matches!(err, DbError::NoRecords));
    assert!(fake.events().is_empty());
}

#[test]
fn postgres_errors_are_classified_by_sql_state() {
    let db = Database::postgres();
    let fake = FakeConnection::new();
    let mut conn = db.connect(fake.clone());

    fake.fail_next_execute(DriverError::new("duplicate key value").with_sql_state("23505"));
    let query = db
        .sql("INSERT INTO t (name) VALUES (:name)")
        .bind("name", "o'neil")
        .unwrap();
    let err = conn.execute(&query).unwrap_err();

    assert!(err.is_unique_violation());
    match err {
        DbError::Sql { sql_state, message, sql, .. } => {
            assert_eq!(sql_state.as_deref(), Some("23505"));
            assert_eq!(message, "duplicate key value");
            assert_eq!(sql, "INSERT INTO t (name) VALUES ('o''neil')");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn mysql_errors_are_classified_by_code() {
    let db = Database::mysql();
    let fake = FakeConnection::new();
    let mut conn = db.connect(fake.clone());

    fake.fail_next_execute(
        DriverError::new("Cannot add or update a child row")
            .with_sql_state("23000")
            .with_code("1452"),
    );
    let err = conn.execute(&db.sql("INSERT INTO t VALUES (1)")).unwrap_err();
    assert!(err.is_foreign_key_violation());

    fake.fail_next_prepare(DriverError::new("syntax error").with_sql_state("42000"));
    let err = conn.execute(&db.sql("SELEC 1")).unwrap_err();
    assert_eq!(err.sql_kind(), Some(SqlErrorKind::Generic));
}

#[test]
fn execution_errors_surface_from_result_sets() {
    let db = Database::postgres();
    let fake = FakeConnection::new();
    let mut conn = db.connect(fake.clone());

    fake.fail_next_execute(DriverError::new("relation does not exist").with_sql_state("42P01"));
    let mut results = conn.fetch(&db.sql("SELECT * FROM missing")).unwrap();
    assert!(matches!(results.next(), Some(Err(DbError::Sql { .. }))));
    assert!(results.next().is_none());
}

#[test]
fn last_insert_id_normalizes_numeric_strings() {
    let db = Database::mysql();
    let fake = FakeConnection::new();
    let mut conn = db.connect(fake.clone());

    fake.set_last_id(Some(Value::from("17")));
    assert_eq!(conn.last_insert_id(None).unwrap(), Some(Value::Int(17)));

    fake.set_last_id(Some(Value::from("a1b2")));
    assert_eq!(conn.last_insert_id(None).unwrap(), Some(Value::from("a1b2")));

    fake.set_last_id(Some(Value::Int(3)));
    assert_eq!(conn.last_insert_id(Some("users_id_seq")).unwrap(), Some(Value::Int(3)));

    fake.set_last_id(None);
    assert_eq!(conn.last_insert_id(None).unwrap(), None);
}

#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<(String, usize, QueryType, bool)>>,
    slow: Mutex<usize>,
}

impl QueryMonitor for Recorder {
    fn on_query_complete(&self, ctx: &QueryContext, _duration: Duration, result: &QueryResult) {
        self.seen.lock().unwrap().push((
            ctx.sql.clone(),
            ctx.param_count,
            ctx.query_type,
            result.is_failed(),
        ));
    }

    fn on_slow_query(&self, _ctx: &QueryContext, _duration: Duration) {
        *self.slow.lock().unwrap() += 1;
    }
}

#[test]
fn executions_are_reported_to_the_monitor() {
    let db = Database::postgres();
    let fake = FakeConnection::new();
    fake.push_result(users(2));
    let recorder = Arc::new(Recorder::default());
    let mut conn = db.connect(fake.clone()).with_monitor_arc(recorder.clone());

    let query = db
        .sql("SELECT * FROM users WHERE id IN :ids")
        .bind("ids", vec![1, 2])
        .unwrap();
    assert_eq!(conn.fetch(&query).unwrap().all().unwrap().len(), 2);

    fake.fail_next_execute(DriverError::new("boom"));
    assert!(conn.execute(&db.sql("DELETE FROM users")).is_err());

    let seen = recorder.seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            (
                "SELECT * FROM users WHERE id IN (:ids_1, :ids_2)".to_string(),
                2,
                QueryType::Select,
                false
            ),
            ("DELETE FROM users".to_string(), 0, QueryType::Delete, true),
        ]
    );
    // no threshold configured
    assert_eq!(*recorder.slow.lock().unwrap(), 0);
}

#[test]
fn stats_monitor_counts_statements() {
    let db = Database::postgres();
    let fake = FakeConnection::new();
    let stats = Arc::new(StatsMonitor::new());
    let config = relq::ConnectionConfig::new().slow_query_threshold(Duration::from_secs(3600));
    let mut conn = db
        .connect_with_config(fake.clone(), config)
        .with_monitor_arc(stats.clone());

    conn.execute(&db.sql("UPDATE users SET active = false")).unwrap();
    conn.execute(&db.sql("SELECT 1")).unwrap();
    fake.fail_next_execute(DriverError::new("boom"));
    let _ = conn.execute(&db.sql("INSERT INTO users DEFAULT VALUES"));

    let snapshot = stats.stats();
    assert_eq!(snapshot.total_queries, 3);
    assert_eq!(snapshot.failed_queries, 1);
    assert_eq!(snapshot.update_count, 1);
    assert_eq!(snapshot.select_count, 1);
    assert_eq!(snapshot.insert_count, 1);
    assert_eq!(snapshot.slow_queries, 0);
}
