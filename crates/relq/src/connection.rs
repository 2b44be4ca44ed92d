//! Statement lifecycle and nested transactions over a [`RawConnection`].

use crate::config::ConnectionConfig;
use crate::driver::Driver;
use crate::error::{DbError, DbResult};
use crate::format::format_query;
use crate::mapper::MapperRef;
use crate::monitor::{QueryMonitor, TracingMonitor};
use crate::preparator;
use crate::qb::{Countable, Executable};
use crate::result::{ResultSet, count_value};
use crate::statement::{PreparedStatement, RawConnection};
use crate::value::Value;
use std::sync::Arc;

/// What a [`Connection::transact`] callback decided.
pub trait TransactionOutcome {
    /// `Some(true)` to commit, `Some(false)` to roll back, `None` when no
    /// decision was made.
    fn decision(&self) -> Option<bool>;
}

impl TransactionOutcome for bool {
    fn decision(&self) -> Option<bool> {
        Some(*self)
    }
}

impl TransactionOutcome for Option<bool> {
    fn decision(&self) -> Option<bool> {
        *self
    }
}

/// A database connection.
///
/// Not meant for concurrent use: share one `Connection` per worker.
pub struct Connection<C: RawConnection> {
    raw: C,
    driver: Arc<dyn Driver>,
    config: ConnectionConfig,
    monitor: Arc<dyn QueryMonitor>,
    tx_level: u32,
    tx_result: bool,
}

impl<C: RawConnection> Connection<C> {
    pub fn new(raw: C, driver: Arc<dyn Driver>) -> Self {
        Self::with_config(raw, driver, ConnectionConfig::default())
    }

    /// Create a connection whose default [`TracingMonitor`] follows `config`.
    pub fn with_config(raw: C, driver: Arc<dyn Driver>, config: ConnectionConfig) -> Self {
        let monitor = TracingMonitor {
            max_sql_length: config.max_sql_length,
        };
        Self {
            raw,
            driver,
            config,
            monitor: Arc::new(monitor),
            tx_level: 0,
            tx_result: true,
        }
    }

    /// Replace the statement monitor.
    pub fn with_monitor(mut self, monitor: impl QueryMonitor + 'static) -> Self {
        self.monitor = Arc::new(monitor);
        self
    }

    /// Replace the statement monitor with a shared one.
    pub fn with_monitor_arc(mut self, monitor: Arc<dyn QueryMonitor>) -> Self {
        self.monitor = monitor;
        self
    }

    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    pub fn raw(&self) -> &C {
        &self.raw
    }

    pub fn raw_mut(&mut self) -> &mut C {
        &mut self.raw
    }

    /// Current transaction nesting depth (0 when idle).
    pub fn transaction_level(&self) -> u32 {
        self.tx_level
    }

    /// Expand, prepare and bind a statement without executing it.
    pub fn prepare(&mut self, statement: &impl Executable) -> DbResult<PreparedStatement<C::Statement>> {
        let sql = statement.sql()?;
        let params = statement.params()?;
        let expanded = preparator::expand(&sql, &params)?;
        let display_sql = format_query(&sql, &params);

        let handle = self
            .raw
            .prepare(&expanded.sql)
            .map_err(|e| DbError::from_driver(&*self.driver, e, display_sql.clone()))?;

        let mut prepared = PreparedStatement::new(
            handle,
            expanded.sql,
            display_sql,
            Arc::clone(&self.driver),
            Arc::clone(&self.monitor),
            self.config.slow_query_threshold,
        );
        for (name, value) in &expanded.binds {
            prepared.bind(name, value)?;
        }
        Ok(prepared)
    }

    /// Prepare and execute a statement, returning the executed handle.
    pub fn execute(&mut self, statement: &impl Executable) -> DbResult<PreparedStatement<C::Statement>> {
        let mut prepared = self.prepare(statement)?;
        prepared.execute()?;
        Ok(prepared)
    }

    /// Prepare a statement and stream its records through its mappers.
    pub fn fetch(&mut self, statement: &impl Executable) -> DbResult<ResultSet<C::Statement>> {
        self.fetch_with(statement, Vec::new())
    }

    /// Like [`Connection::fetch`], appending `mappers` after the statement's own.
    pub fn fetch_with(
        &mut self,
        statement: &impl Executable,
        mappers: Vec<MapperRef>,
    ) -> DbResult<ResultSet<C::Statement>> {
        let prepared = self.prepare(statement)?;
        let mut chain = statement.mappers();
        chain.extend(mappers);
        Ok(ResultSet::new(prepared, self.config.batch_size, chain))
    }

    /// Total number of rows matched by a countable statement.
    pub fn count(&mut self, statement: &impl Countable) -> DbResult<i64> {
        let count = statement.count_statement()?;
        count_value(self.fetch(&count)?.first_col()?)
    }

    /// Last generated id; numeric strings are returned as integers.
    pub fn last_insert_id(&mut self, sequence: Option<&str>) -> DbResult<Option<Value>> {
        let id = self.raw.last_insert_id(sequence)?;
        Ok(id.map(|value| match value {
            Value::Text(s) => s.parse::<i64>().map_or(Value::Text(s), Value::Int),
            other => other,
        }))
    }

    /// Run `f` inside a transaction.
    ///
    /// Calls nest: only the outermost call begins and finishes the physical
    /// transaction, committing iff every call in between decided `true`. The
    /// return value is that net outcome so far.
    ///
    /// An error from `f` counts as `false` and is returned unchanged after the
    /// transaction has been finished. A nested call whose own outcome is
    /// `false` fails with [`DbError::TransactionAborted`]; an undecided outcome
    /// fails with [`DbError::InvalidTransactionResult`].
    pub fn transact<T, F>(&mut self, f: F) -> DbResult<bool>
    where
        T: TransactionOutcome,
        F: FnOnce(&mut Self) -> DbResult<T>,
    {
        if self.tx_level == 0 {
            self.raw.begin()?;
            self.tx_result = true;
            tracing::debug!(target: "relq.tx", "begin");
        }
        self.tx_level += 1;

        let outcome = f(self);
        let decision = match &outcome {
            Ok(value) => value.decision(),
            Err(_) => Some(false),
        };
        self.tx_result = self.tx_result && decision.unwrap_or(false);
        self.tx_level -= 1;

        if self.tx_level == 0 {
            let finished = if self.tx_result {
                tracing::debug!(target: "relq.tx", "commit");
                self.raw.commit()
            } else {
                tracing::debug!(target: "relq.tx", "rollback");
                self.raw.rollback()
            };
            outcome?;
            finished?;
        } else {
            outcome?;
            if decision == Some(false) {
                return Err(DbError::TransactionAborted);
            }
        }

        match decision {
            Some(_) => Ok(self.tx_result),
            None => Err(DbError::InvalidTransactionResult),
        }
    }
}

impl<C: RawConnection> std::fmt::Debug for Connection<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("dialect", &self.driver.dialect())
            .field("config", &self.config)
            .field("transaction_level", &self.tx_level)
            .finish()
    }
}
