use super::*;
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_query_type_detection() {
    assert_eq!(QueryType::from_sql("SELECT * FROM users"), QueryType::Select);
    assert_eq!(QueryType::from_sql("  select * FROM users"), QueryType::Select);
    assert_eq!(
        QueryType::from_sql("WITH cte AS (SELECT 1) SELECT * FROM cte"),
        QueryType::Select
    );
    assert_eq!(
        QueryType::from_sql("INSERT INTO users (name) VALUES\n(:c0_0)"),
        QueryType::Insert
    );
    assert_eq!(QueryType::from_sql("UPDATE users\nSET name = :name"), QueryType::Update);
    assert_eq!(QueryType::from_sql("DELETE FROM users"), QueryType::Delete);
    assert_eq!(QueryType::from_sql("CREATE TABLE users (id INT)"), QueryType::Other);
}

#[test]
fn test_query_type_skips_comments() {
    assert_eq!(
        QueryType::from_sql("-- list users\nSELECT * FROM users"),
        QueryType::Select
    );
    assert_eq!(
        QueryType::from_sql("/* bulk */ DELETE FROM users"),
        QueryType::Delete
    );
    assert_eq!(QueryType::from_sql("-- only a comment"), QueryType::Other);
}

#[test]
fn test_tracing_monitor_truncation() {
    let monitor = TracingMonitor::new().max_sql_length(10);
    assert_eq!(monitor.truncate_sql("SELECT * FROM users"), "SELECT * F...");
    assert_eq!(monitor.truncate_sql("SELECT 1"), "SELECT 1");
    assert_eq!(
        TracingMonitor::new().no_truncate().truncate_sql(&"x".repeat(500)).len(),
        500
    );
}

#[test]
fn test_truncate_respects_char_boundaries() {
    assert_eq!(truncate_sql_bytes("héllo", 2), "h");
    assert_eq!(truncate_sql_bytes("abc", 10), "abc");
}

#[test]
fn test_failed_result_is_truncated() {
    let result = QueryResult::failed("e".repeat(600));
    match result {
        QueryResult::Failed(msg) => assert_eq!(msg.len(), 515),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn test_stats_monitor() {
    let monitor = StatsMonitor::new();
    let select = QueryContext::new("SELECT 1", 0);
    let insert = QueryContext::new("INSERT INTO t (a) VALUES\n(:c0_0)", 1);

    monitor.on_query_complete(&select, Duration::from_millis(5), &QueryResult::Rows(1));
    monitor.on_query_complete(&insert, Duration::from_millis(20), &QueryResult::Rows(1));
    monitor.on_query_complete(&select, Duration::from_millis(1), &QueryResult::failed("boom"));
    monitor.on_slow_query(&insert, Duration::from_millis(20));

    let stats = monitor.stats();
    assert_eq!(stats.total_queries, 3);
    assert_eq!(stats.failed_queries, 1);
    assert_eq!(stats.slow_queries, 1);
    assert_eq!(stats.select_count, 2);
    assert_eq!(stats.insert_count, 1);
    assert_eq!(stats.max_duration, Duration::from_millis(20));
    assert_eq!(stats.total_duration, Duration::from_millis(26));
    assert_eq!(stats.slowest_query.as_deref(), Some(insert.sql.as_str()));

    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["total_queries"], 3);
    assert_eq!(json["slowest_query"], insert.sql.as_str());

    monitor.reset();
    let stats = monitor.stats();
    assert_eq!(stats.total_queries, 0);
    assert!(stats.slowest_query.is_none());
}

#[test]
fn test_composite_monitor_fans_out() {
    let a = Arc::new(StatsMonitor::new());
    let b = Arc::new(StatsMonitor::new());
    let composite = CompositeMonitor::new()
        .add(NoopMonitor)
        .add_arc(a.clone())
        .add_arc(b.clone());

    let ctx = QueryContext::new("UPDATE t\nSET a = :a", 1);
    composite.on_query_complete(&ctx, Duration::from_millis(1), &QueryResult::Rows(3));
    composite.on_slow_query(&ctx, Duration::from_millis(1));

    for stats in [a.stats(), b.stats()] {
        assert_eq!(stats.total_queries, 1);
        assert_eq!(stats.update_count, 1);
        assert_eq!(stats.slow_queries, 1);
    }
}
