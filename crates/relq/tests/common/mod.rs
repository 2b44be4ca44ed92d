//! In-memory client used by the integration tests.
//!
//! Records every call it receives and serves scripted result sets, one per
//! executed statement, in order.

#![allow(dead_code)]

use relq::{DriverError, RawConnection, Record, StatementHandle, Value};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

#[derive(Debug, Default)]
pub struct State {
    /// `begin`, `commit`, `rollback`, `prepare`, `execute`, in call order.
    pub events: Vec<&'static str>,
    /// SQL of every prepared statement.
    pub prepared: Vec<String>,
    /// Bindings of every prepared statement.
    pub binds: Vec<Vec<(String, Value)>>,
    /// Number of `fetch` calls that returned a row.
    pub fetched: usize,
    pub results: VecDeque<Vec<Record>>,
    pub prepare_error: Option<DriverError>,
    pub execute_error: Option<DriverError>,
    pub commit_error: Option<DriverError>,
    pub last_id: Option<Value>,
    /// Reject binds whose placeholder the prepared SQL does not contain.
    pub strict_binds: bool,
}

impl State {
    pub fn count(&self, event: &str) -> usize {
        self.events.iter().filter(|e| **e == event).count()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FakeConnection {
    pub state: Rc<RefCell<State>>,
}

impl FakeConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the rows returned by the next executed statement.
    pub fn push_result(&self, rows: Vec<Record>) -> &Self {
        self.state.borrow_mut().results.push_back(rows);
        self
    }

    pub fn fail_next_execute(&self, err: DriverError) {
        self.state.borrow_mut().execute_error = Some(err);
    }

    pub fn fail_next_prepare(&self, err: DriverError) {
        self.state.borrow_mut().prepare_error = Some(err);
    }

    pub fn fail_next_commit(&self, err: DriverError) {
        self.state.borrow_mut().commit_error = Some(err);
    }

    /// Fail binds of names missing from the SQL, as the Postgres adapter does.
    pub fn reject_unknown_binds(&self) {
        self.state.borrow_mut().strict_binds = true;
    }

    pub fn set_last_id(&self, id: Option<Value>) {
        self.state.borrow_mut().last_id = id;
    }

    pub fn events(&self) -> Vec<&'static str> {
        self.state.borrow().events.clone()
    }

    pub fn prepared(&self) -> Vec<String> {
        self.state.borrow().prepared.clone()
    }

    pub fn last_binds(&self) -> Vec<(String, Value)> {
        self.state.borrow().binds.last().cloned().unwrap_or_default()
    }

    pub fn fetched(&self) -> usize {
        self.state.borrow().fetched
    }
}

#[derive(Debug)]
pub struct FakeStatement {
    state: Rc<RefCell<State>>,
    index: usize,
    rows: VecDeque<Record>,
    rows_affected: u64,
}

impl StatementHandle for FakeStatement {
    fn bind(&mut self, name: &str, value: &Value) -> Result<(), DriverError> {
        let mut state = self.state.borrow_mut();
        if state.strict_binds && !mentions(&state.prepared[self.index], name) {
            return Err(DriverError::new(format!("unknown placeholder :{name}")));
        }
        state.binds[self.index].push((name.to_string(), value.clone()));
        Ok(())
    }

    fn execute(&mut self) -> Result<(), DriverError> {
        let mut state = self.state.borrow_mut();
        state.events.push("execute");
        if let Some(err) = state.execute_error.take() {
            return Err(err);
        }
        self.rows = state.results.pop_front().unwrap_or_default().into();
        self.rows_affected = self.rows.len() as u64;
        Ok(())
    }

    fn fetch(&mut self) -> Result<Option<Record>, DriverError> {
        let row = self.rows.pop_front();
        if row.is_some() {
            self.state.borrow_mut().fetched += 1;
        }
        Ok(row)
    }

    fn rows_affected(&self) -> u64 {
        self.rows_affected
    }
}

impl RawConnection for FakeConnection {
    type Statement = FakeStatement;

    fn prepare(&mut self, sql: &str) -> Result<FakeStatement, DriverError> {
        let mut state = self.state.borrow_mut();
        state.events.push("prepare");
        if let Some(err) = state.prepare_error.take() {
            return Err(err);
        }
        state.prepared.push(sql.to_string());
        state.binds.push(Vec::new());
        Ok(FakeStatement {
            state: Rc::clone(&self.state),
            index: state.binds.len() - 1,
            rows: VecDeque::new(),
            rows_affected: 0,
        })
    }

    fn begin(&mut self) -> Result<(), DriverError> {
        self.state.borrow_mut().events.push("begin");
        Ok(())
    }

    fn commit(&mut self) -> Result<(), DriverError> {
        let mut state = self.state.borrow_mut();
        state.events.push("commit");
        match state.commit_error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn rollback(&mut self) -> Result<(), DriverError> {
        self.state.borrow_mut().events.push("rollback");
        Ok(())
    }

    fn last_insert_id(&mut self, _sequence: Option<&str>) -> Result<Option<Value>, DriverError> {
        Ok(self.state.borrow().last_id.clone())
    }
}

/// True when `sql` contains the placeholder `:name` as a whole word.
fn mentions(sql: &str, name: &str) -> bool {
    let needle = format!(":{name}");
    sql.match_indices(&needle).any(|(at, _)| {
        sql[at + needle.len()..]
            .chars()
            .next()
            .is_none_or(|c| !(c.is_ascii_alphanumeric() || c == '_'))
    })
}

/// `n` records `{"id": i, "name": "user{i}"}` for `i` in `1..=n`.
pub fn users(n: i64) -> Vec<Record> {
    (1..=n)
        .map(|i| relq::record! { "id" => i, "name" => format!("user{i}") })
        .collect()
}
