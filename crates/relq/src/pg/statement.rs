use super::Shared;
use super::value::decode_row;
use crate::error::DriverError;
use crate::statement::StatementHandle;
use crate::value::{Record, Value};
use futures_util::{TryStreamExt, pin_mut};
use indexmap::IndexMap;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Row, Statement};

/// A server-side prepared statement.
///
/// Rows are buffered when the statement executes and decoded one by one as
/// they are fetched.
pub struct PgStatement {
    shared: Arc<Shared>,
    statement: Statement,
    positions: IndexMap<String, usize>,
    params: Vec<Option<Value>>,
    rows: VecDeque<Row>,
    rows_affected: u64,
}

impl PgStatement {
    pub(super) fn new(
        shared: Arc<Shared>,
        statement: Statement,
        positions: IndexMap<String, usize>,
    ) -> Self {
        let params = vec![None; positions.len()];
        Self {
            shared,
            statement,
            positions,
            params,
            rows: VecDeque::new(),
            rows_affected: 0,
        }
    }

    /// Placeholder names in parameter order.
    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.positions.keys().map(String::as_str)
    }

    fn bound_params(&self) -> Result<Vec<&Value>, DriverError> {
        self.params
            .iter()
            .zip(self.positions.keys())
            .map(|(value, name)| {
                value
                    .as_ref()
                    .ok_or_else(|| DriverError::new(format!("no value bound for :{name}")))
            })
            .collect()
    }
}

impl StatementHandle for PgStatement {
    fn bind(&mut self, name: &str, value: &Value) -> Result<(), DriverError> {
        let idx = *self
            .positions
            .get(name)
            .ok_or_else(|| DriverError::new(format!("unknown placeholder :{name}")))?;
        self.params[idx] = Some(value.clone());
        Ok(())
    }

    fn execute(&mut self) -> Result<(), DriverError> {
        let params = self.bound_params()?;
        let client = self.shared.client();
        let statement = &self.statement;

        let (rows, affected) = self.shared.block_on(async {
            let params = params.into_iter().map(|v| v as &dyn ToSql);
            let stream = client.query_raw(statement, params).await?;
            pin_mut!(stream);
            let mut rows = VecDeque::new();
            while let Some(row) = stream.try_next().await? {
                rows.push_back(row);
            }
            Ok::<_, tokio_postgres::Error>((rows, stream.rows_affected()))
        })?;

        self.rows_affected = affected.unwrap_or(rows.len() as u64);
        self.rows = rows;
        Ok(())
    }

    fn fetch(&mut self) -> Result<Option<Record>, DriverError> {
        self.rows.pop_front().map(|row| decode_row(&row)).transpose()
    }

    fn rows_affected(&self) -> u64 {
        self.rows_affected
    }
}

impl std::fmt::Debug for PgStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgStatement")
            .field("params", &self.positions.keys().collect::<Vec<_>>())
            .field("buffered_rows", &self.rows.len())
            .finish()
    }
}
