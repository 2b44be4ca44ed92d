use std::fmt;
use std::time::Duration;

/// The kind of statement being executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    /// DDL, transaction control or anything unrecognised.
    Other,
}

impl QueryType {
    /// Detect the statement kind from its leading keyword.
    ///
    /// Leading whitespace, `--` line comments and `/* */` block comments are
    /// skipped. `WITH` is reported as `Select`.
    pub fn from_sql(sql: &str) -> Self {
        let keyword: String = skip_prefix(sql)
            .chars()
            .take_while(|c| c.is_ascii_alphabetic())
            .collect();

        match keyword.to_ascii_uppercase().as_str() {
            "SELECT" | "WITH" => QueryType::Select,
            "INSERT" => QueryType::Insert,
            "UPDATE" => QueryType::Update,
            "DELETE" => QueryType::Delete,
            _ => QueryType::Other,
        }
    }
}

fn skip_prefix(mut sql: &str) -> &str {
    loop {
        sql = sql.trim_start();
        if let Some(rest) = sql.strip_prefix("--") {
            sql = rest.split_once('\n').map_or("", |(_, tail)| tail);
        } else if let Some(rest) = sql.strip_prefix("/*") {
            sql = rest.split_once("*/").map_or("", |(_, tail)| tail);
        } else {
            return sql;
        }
    }
}

/// Information about the statement being reported.
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// SQL as prepared (placeholders expanded, values not interpolated).
    pub sql: String,
    /// Number of individual binds.
    pub param_count: usize,
    pub query_type: QueryType,
}

impl QueryContext {
    pub fn new(sql: &str, param_count: usize) -> Self {
        Self {
            sql: sql.to_string(),
            param_count,
            query_type: QueryType::from_sql(sql),
        }
    }
}

const MAX_ERROR_LEN: usize = 512;

/// Outcome of a statement execution.
#[derive(Debug, Clone)]
pub enum QueryResult {
    /// Execution succeeded; carries the driver's rows-affected count.
    Rows(u64),
    /// Execution failed (message truncated to 512 bytes).
    Failed(String),
}

impl QueryResult {
    pub fn failed(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        if msg.len() > MAX_ERROR_LEN {
            Self::Failed(format!("{}...", super::truncate_sql_bytes(&msg, MAX_ERROR_LEN)))
        } else {
            Self::Failed(msg)
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResult::Rows(n) => write!(f, "{n} rows"),
            QueryResult::Failed(e) => write!(f, "error: {e}"),
        }
    }
}

/// Receives statement execution events.
///
/// Implementations must be cheap: they run synchronously on the calling thread.
pub trait QueryMonitor: Send + Sync {
    /// Called after a statement executes, successfully or not.
    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult);

    /// Called when a statement exceeds the connection's slow-query threshold.
    fn on_slow_query(&self, _ctx: &QueryContext, _duration: Duration) {}
}
