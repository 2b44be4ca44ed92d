mod common;

use common::{FakeConnection, users};
use relq::{
    ConnectionConfig, Database, DbError, Executable, MapperRef, Record, RecordMapper, Value, record,
    table,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

table! {
    pub struct Users => "users" {
        id: "int", auto;
        name: "string", required;
        created: "timestamp", required;
        active: "bool", optional(true);
    }
}

fn counting_query(db: &Database, calls: &Arc<AtomicUsize>) -> relq::SqlQuery {
    let calls = Arc::clone(calls);
    db.sql("SELECT id, name FROM users").map_batches(move |batch| {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(batch)
    })
}

#[test]
fn mappers_run_once_per_batch() {
    let db = Database::postgres();
    for (rows, batch_size, expected_calls) in [(5, 2, 3), (4, 2, 2), (1, 1000, 1), (0, 3, 0)] {
        let fake = FakeConnection::new();
        fake.push_result(users(rows));
        let mut conn =
            db.connect_with_config(fake.clone(), ConnectionConfig::new().batch_size(batch_size));

        let calls = Arc::new(AtomicUsize::new(0));
        let records = conn.fetch(&counting_query(&db, &calls)).unwrap().all().unwrap();

        assert_eq!(records.len(), rows as usize);
        assert_eq!(calls.load(Ordering::SeqCst), expected_calls, "rows={rows} batch={batch_size}");
    }
}

#[test]
fn execution_is_deferred_until_iteration() {
    let db = Database::postgres();
    let fake = FakeConnection::new();
    fake.push_result(users(3));
    let mut conn = db.connect(fake.clone());

    let mut results = conn.fetch(&db.sql("SELECT * FROM users")).unwrap();
    assert_eq!(fake.events(), vec!["prepare"]);

    let first = results.next().unwrap().unwrap();
    assert_eq!(first["id"], Value::Int(1));
    assert_eq!(fake.events(), vec!["prepare", "execute"]);
    assert_eq!(results.count(), 2);
}

#[test]
fn records_are_mapped_in_order() {
    let db = Database::postgres();
    let fake = FakeConnection::new();
    fake.push_result(users(3));
    let mut conn = db.connect_with_config(fake.clone(), ConnectionConfig::new().batch_size(2));

    let query = db.sql("SELECT id, name FROM users").map_records(|mut r| {
        if let Some(Value::Text(name)) = r.get_mut("name") {
            name.push_str("-a");
        }
        Ok(r)
    });
    let extra: MapperRef = Arc::new(RecordMapper::new(|mut r: Record| {
        if let Some(Value::Text(name)) = r.get_mut("name") {
            name.push_str("-b");
        }
        Ok(r)
    }));

    let names: Vec<Value> = conn
        .fetch_with(&query, vec![extra])
        .unwrap()
        .map(|r| r.unwrap()["name"].clone())
        .collect();
    assert_eq!(
        names,
        vec![
            Value::from("user1-a-b"),
            Value::from("user2-a-b"),
            Value::from("user3-a-b")
        ]
    );
}

#[test]
fn mapper_changing_batch_length_fails() {
    let db = Database::postgres();
    let fake = FakeConnection::new();
    fake.push_result(users(4));
    let mut conn = db.connect_with_config(fake.clone(), ConnectionConfig::new().batch_size(3));

    let query = db.sql("SELECT * FROM users").map_batches(|mut batch| {
        batch.pop();
        Ok(batch)
    });
    let mut results = conn.fetch(&query).unwrap();
    assert!(matches!(
        results.next(),
        Some(Err(DbError::MapperContract { expected: 3, actual: 2 }))
    ));
    assert!(results.next().is_none());
}

#[test]
fn mapper_errors_end_the_sequence() {
    let db = Database::postgres();
    let fake = FakeConnection::new();
    fake.push_result(users(2));
    let mut conn = db.connect(fake.clone());

    let query = db
        .sql("SELECT * FROM users")
        .map_records(|_| Err(DbError::validation("bad row")));
    let results: Vec<_> = conn.fetch(&query).unwrap().collect();
    assert_eq!(results.len(), 1);
    assert!(matches!(&results[0], Err(DbError::Validation(m)) if m == "bad row"));
}

#[test]
fn select_converts_columns_to_native_values() {
    let db = Database::mysql();
    let table = Users::new(&db.schema(None)).unwrap();
    let fake = FakeConnection::new();
    fake.push_result(vec![record! {
        "id" => "7",
        "name" => "alice",
        "created" => "2015-11-04 14:40:52",
        "active" => 1,
    }]);
    let mut conn = db.connect(fake.clone());

    let row = conn.fetch(&db.select(&table)).unwrap().first_row().unwrap().unwrap();
    assert_eq!(row["id"], Value::Int(7));
    assert_eq!(row["created"], Value::Int(1446648052));
    assert_eq!(row["active"], Value::Bool(true));
    assert_eq!(fake.prepared(), vec!["SELECT `users`.*\nFROM `users`".to_string()]);
}

#[test]
fn missing_typed_field_is_reported() {
    let db = Database::postgres();
    let table = Users::new(&db.schema(None)).unwrap();
    let fake = FakeConnection::new();
    fake.push_result(vec![record! { "id" => 1 }]);
    let mut conn = db.connect(fake.clone());

    let err = conn
        .fetch(&db.select(&table).column(&table.id).column(&table.name))
        .unwrap()
        .all()
        .unwrap_err();
    assert!(matches!(err, DbError::UndefinedField(f) if f == "name"));
}

#[test]
fn first_row_fetches_a_single_row() {
    let db = Database::postgres();
    let fake = FakeConnection::new();
    fake.push_result(users(50));
    let mut conn = db.connect(fake.clone());

    let calls = Arc::new(AtomicUsize::new(0));
    let row = conn
        .fetch(&counting_query(&db, &calls))
        .unwrap()
        .first_row()
        .unwrap();
    assert_eq!(row.unwrap()["name"], Value::from("user1"));
    assert_eq!(fake.fetched(), 1);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn first_col_and_empty_results() {
    let db = Database::postgres();
    let fake = FakeConnection::new();
    fake.push_result(users(2)).push_result(Vec::new());
    let mut conn = db.connect(fake.clone());

    let first = conn.fetch(&db.sql("SELECT id, name FROM users")).unwrap().first_col();
    assert_eq!(first.unwrap(), Some(Value::Int(1)));

    let none = conn.fetch(&db.sql("SELECT id FROM users")).unwrap().first_col();
    assert_eq!(none.unwrap(), None);
}

#[test]
fn count_runs_the_count_statement() {
    let db = Database::postgres();
    let table = Users::new(&db.schema(None)).unwrap();
    let fake = FakeConnection::new();
    fake.push_result(vec![record! { "count" => 42 }]);
    let mut conn = db.connect(fake.clone());

    let query = db
        .select(&table)
        .and_where(format!("{} = :active", table.active))
        .bind("active", true)
        .unwrap()
        .limit(10, None)
        .unwrap();
    assert_eq!(conn.count(&query).unwrap(), 42);
    assert_eq!(
        fake.prepared(),
        vec!["SELECT COUNT(*) AS \"count\"\nFROM \"users\"\nWHERE \"users\".\"active\" = :active".to_string()]
    );
    assert_eq!(fake.last_binds(), vec![("active".to_string(), Value::Bool(true))]);
    // the query itself is unchanged
    assert!(query.sql().unwrap().ends_with("LIMIT 10"));
}

#[test]
fn count_drops_binds_used_only_by_the_projection() {
    let db = Database::postgres();
    let table = Users::new(&db.schema(None)).unwrap();
    let fake = FakeConnection::new();
    fake.reject_unknown_binds();
    fake.push_result(vec![record! { "count" => 3 }]);
    let mut conn = db.connect(fake.clone());

    let query = db
        .select(&table)
        .value(&format!("similarity({}, :q)", table.name), Some("score"), None)
        .unwrap()
        .and_where(format!("{} = :active", table.active))
        .order_by("score DESC")
        .bind("q", "ali")
        .unwrap()
        .bind("active", true)
        .unwrap();
    assert_eq!(conn.count(&query).unwrap(), 3);
    assert_eq!(fake.last_binds(), vec![("active".to_string(), Value::Bool(true))]);
}

#[test]
fn count_of_empty_result_is_zero() {
    let db = Database::postgres();
    let table = Users::new(&db.schema(None)).unwrap();
    let fake = FakeConnection::new();
    let mut conn = db.connect(fake.clone());
    assert_eq!(conn.count(&db.select(&table)).unwrap(), 0);
}
