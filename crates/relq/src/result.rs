//! Batched, mapped result streaming.

use crate::error::{DbError, DbResult};
use crate::mapper::{self, MapperRef};
use crate::statement::{PreparedStatement, StatementHandle};
use crate::value::{Record, Value};
use std::collections::VecDeque;

/// Forward-only, single-pass sequence of mapped records.
///
/// Rows are fetched `batch_size` at a time; each batch runs through the mapper
/// chain before any of its records is yielded. The statement is executed on
/// the first call to `next`. After an error the sequence ends.
pub struct ResultSet<H> {
    statement: PreparedStatement<H>,
    batch_size: usize,
    mappers: Vec<MapperRef>,
    buffer: VecDeque<Record>,
    done: bool,
}

impl<H: StatementHandle> ResultSet<H> {
    pub fn new(statement: PreparedStatement<H>, batch_size: usize, mappers: Vec<MapperRef>) -> Self {
        Self {
            statement,
            batch_size: batch_size.max(1),
            mappers,
            buffer: VecDeque::new(),
            done: false,
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Change the batch size before iteration starts (clamped to at least 1).
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Append a mapper after the ones declared by the statement.
    pub fn with_mapper(mut self, mapper: MapperRef) -> Self {
        self.mappers.push(mapper);
        self
    }

    /// First record, fetching a single row.
    pub fn first_row(self) -> DbResult<Option<Record>> {
        let mut results = self.with_batch_size(1);
        results.next().transpose()
    }

    /// First column of the first record.
    pub fn first_col(self) -> DbResult<Option<Value>> {
        Ok(self
            .first_row()?
            .and_then(|record| record.into_iter().next().map(|(_, value)| value)))
    }

    /// Every remaining record.
    pub fn all(self) -> DbResult<Vec<Record>> {
        self.collect()
    }

    fn fetch_batch(&mut self) -> DbResult<()> {
        if !self.statement.is_executed() {
            self.statement.execute()?;
        }

        let mut batch = Vec::with_capacity(self.batch_size);
        while batch.len() < self.batch_size {
            match self.statement.fetch()? {
                Some(record) => batch.push(record),
                None => {
                    self.done = true;
                    break;
                }
            }
        }

        if batch.is_empty() {
            return Ok(());
        }

        self.buffer.extend(mapper::apply(&self.mappers, batch)?);
        Ok(())
    }
}

impl<H: StatementHandle> Iterator for ResultSet<H> {
    type Item = DbResult<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(record) = self.buffer.pop_front() {
            return Some(Ok(record));
        }
        if self.done {
            return None;
        }
        if let Err(err) = self.fetch_batch() {
            self.done = true;
            self.buffer.clear();
            return Some(Err(err));
        }
        self.buffer.pop_front().map(Ok)
    }
}

impl<H> std::fmt::Debug for ResultSet<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultSet")
            .field("statement", &self.statement)
            .field("batch_size", &self.batch_size)
            .field("mappers", &self.mappers.len())
            .field("buffered", &self.buffer.len())
            .finish()
    }
}

/// Integer value of a `COUNT(*)`-style scalar.
pub(crate) fn count_value(value: Option<Value>) -> DbResult<i64> {
    match value {
        Some(Value::Int(n)) => Ok(n),
        Some(Value::Text(s)) => s
            .parse()
            .map_err(|_| DbError::conversion("int", format!("not a count: {s:?}"))),
        Some(other) => Err(DbError::conversion(
            "int",
            format!("not a count: {}", other.type_name()),
        )),
        None => Ok(0),
    }
}
