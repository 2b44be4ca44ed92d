//! Capabilities consumed from the database client, and the statement adapter
//! built on top of them.

use crate::driver::Driver;
use crate::error::{DbError, DbResult, DriverError};
use crate::monitor::{QueryContext, QueryMonitor, QueryResult};
use crate::value::{Record, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A prepared statement of the underlying client.
pub trait StatementHandle {
    /// Bind a scalar to the placeholder `name` (without its colon).
    fn bind(&mut self, name: &str, value: &Value) -> Result<(), DriverError>;

    fn execute(&mut self) -> Result<(), DriverError>;

    /// Next row of the executed statement, or `None` at the end.
    fn fetch(&mut self) -> Result<Option<Record>, DriverError>;

    fn rows_affected(&self) -> u64;
}

/// A single physical connection of the underlying client.
pub trait RawConnection {
    type Statement: StatementHandle;

    /// Prepare SQL containing `:name` placeholders.
    fn prepare(&mut self, sql: &str) -> Result<Self::Statement, DriverError>;

    fn begin(&mut self) -> Result<(), DriverError>;

    fn commit(&mut self) -> Result<(), DriverError>;

    fn rollback(&mut self) -> Result<(), DriverError>;

    /// Last generated id, optionally for a named sequence.
    fn last_insert_id(&mut self, sequence: Option<&str>) -> Result<Option<Value>, DriverError>;
}

/// A bound statement, not yet executed.
///
/// Client errors are classified through the dialect [`Driver`] and carry the
/// display form of the SQL; executions are reported to the connection's
/// monitor.
pub struct PreparedStatement<H> {
    handle: H,
    sql: String,
    display_sql: String,
    bind_count: usize,
    driver: Arc<dyn Driver>,
    monitor: Arc<dyn QueryMonitor>,
    slow_query_threshold: Option<Duration>,
    executed: bool,
}

impl<H: StatementHandle> PreparedStatement<H> {
    pub(crate) fn new(
        handle: H,
        sql: String,
        display_sql: String,
        driver: Arc<dyn Driver>,
        monitor: Arc<dyn QueryMonitor>,
        slow_query_threshold: Option<Duration>,
    ) -> Self {
        Self {
            handle,
            sql,
            display_sql,
            bind_count: 0,
            driver,
            monitor,
            slow_query_threshold,
            executed: false,
        }
    }

    fn classify(&self, err: DriverError) -> DbError {
        DbError::from_driver(&*self.driver, err, self.display_sql.clone())
    }

    /// SQL as prepared (arrays expanded).
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// SQL with bound values interpolated, for diagnostics only.
    pub fn display_sql(&self) -> &str {
        &self.display_sql
    }

    pub fn is_executed(&self) -> bool {
        self.executed
    }

    pub fn bind(&mut self, name: &str, value: &Value) -> DbResult<()> {
        self.handle.bind(name, value).map_err(|e| self.classify(e))?;
        self.bind_count += 1;
        Ok(())
    }

    pub fn execute(&mut self) -> DbResult<()> {
        let ctx = QueryContext::new(&self.sql, self.bind_count);
        let start = Instant::now();
        let outcome = self.handle.execute();
        let elapsed = start.elapsed();

        let reported = match &outcome {
            Ok(()) => QueryResult::Rows(self.handle.rows_affected()),
            Err(e) => QueryResult::failed(e.message.clone()),
        };
        self.monitor.on_query_complete(&ctx, elapsed, &reported);
        if self.slow_query_threshold.is_some_and(|t| elapsed > t) {
            self.monitor.on_slow_query(&ctx, elapsed);
        }

        outcome.map_err(|e| self.classify(e))?;
        self.executed = true;
        Ok(())
    }

    pub fn fetch(&mut self) -> DbResult<Option<Record>> {
        self.handle.fetch().map_err(|e| self.classify(e))
    }

    pub fn rows_affected(&self) -> u64 {
        self.handle.rows_affected()
    }
}

impl<H> std::fmt::Debug for PreparedStatement<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreparedStatement")
            .field("sql", &self.sql)
            .field("executed", &self.executed)
            .finish()
    }
}
