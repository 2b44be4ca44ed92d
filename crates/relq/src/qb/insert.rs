//! INSERT query builder.

use super::components::{MapperChain, ReturnVars};
use super::macros::{check_returning, impl_bind, impl_mappers, impl_returning};
use super::query::Query;
use super::traits::Executable;
use crate::driver::Dialect;
use crate::error::{DbError, DbResult};
use crate::mapper::MapperRef;
use crate::schema::{Column, Table};
use crate::value::{Params, Record};
use std::sync::Arc;

/// Multi-row INSERT.
///
/// Auto columns are never inserted: a value supplied for one is ignored and the
/// database generates it. Every other column is bound for every
/// record, under the placeholder `c{record}_{column}`, in the table's
/// declaration order; optional columns fall back to their default.
#[derive(Debug, Clone)]
pub struct InsertQuery {
    query: Query,
    root: Table,
    records: Vec<Record>,
    on_conflict: Option<Vec<String>>,
    returning: ReturnVars,
    mappers: MapperChain,
}

impl InsertQuery {
    pub fn new(root: &Table) -> Self {
        Self {
            query: Query::new(),
            root: root.clone(),
            records: Vec::new(),
            on_conflict: None,
            returning: ReturnVars::new(root.driver().clone()),
            mappers: MapperChain::default(),
        }
    }

    /// Add one record.
    pub fn add(mut self, record: Record) -> Self {
        self.records.push(record);
        self
    }

    /// Add several records; an empty input is a no-op.
    pub fn add_all(mut self, records: impl IntoIterator<Item = Record>) -> Self {
        self.records.extend(records);
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// PostgreSQL `ON CONFLICT [(columns)] DO NOTHING`.
    pub fn on_conflict_do_nothing<I, C>(mut self, target: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<Column>,
    {
        self.on_conflict = Some(
            target
                .into_iter()
                .map(|c| c.as_ref().quoted_name().to_string())
                .collect(),
        );
        self
    }

    fn build(&self) -> DbResult<(String, Query)> {
        let driver = self.root.driver();
        check_returning(&**driver, &self.returning)?;
        if self.on_conflict.is_some() && driver.dialect() != Dialect::Postgres {
            return Err(DbError::Unsupported(format!(
                "ON CONFLICT is not supported by {}",
                driver.dialect().name()
            )));
        }
        if self.records.is_empty() {
            return Err(DbError::NoRecords);
        }

        let columns: Vec<&Column> = self.root.columns().iter().filter(|c| !c.is_auto()).collect();
        let mut query = self.query.clone();
        let mut tuples = Vec::with_capacity(self.records.len());

        for (record_idx, record) in self.records.iter().enumerate() {
            let mut placeholders = Vec::with_capacity(columns.len());
            for (col_idx, column) in columns.iter().enumerate() {
                let value = match (record.get(column.name()), column.default_value()) {
                    (Some(value), _) => value.clone(),
                    (None, Some(default)) => default.clone(),
                    (None, None) => {
                        return Err(DbError::MissingValue {
                            record: record_idx,
                            column: column.name().to_string(),
                        });
                    }
                };
                let name = format!("c{record_idx}_{col_idx}");
                query.bind_typed(&name, value, Arc::clone(column.ty()));
                placeholders.push(format!(":{name}"));
            }
            tuples.push(format!("({})", placeholders.join(", ")));
        }

        let column_list: Vec<&str> = columns.iter().map(|c| c.quoted_name()).collect();
        let mut sql = format!(
            "INSERT INTO {} ({}) VALUES\n{}",
            self.root.qualified_name(),
            column_list.join(", "),
            tuples.join(",\n")
        );

        if let Some(target) = &self.on_conflict {
            if target.is_empty() {
                sql.push_str("\nON CONFLICT DO NOTHING");
            } else {
                sql.push_str(&format!("\nON CONFLICT ({}) DO NOTHING", target.join(", ")));
            }
        }

        if !self.returning.is_empty() {
            sql.push_str("\nRETURNING ");
            sql.push_str(&self.returning.build());
        }

        Ok((sql, query))
    }
}

impl_bind!(InsertQuery);
impl_mappers!(InsertQuery);
impl_returning!(InsertQuery);

impl Executable for InsertQuery {
    fn sql(&self) -> DbResult<String> {
        Ok(self.build()?.0)
    }

    fn params(&self) -> DbResult<Params> {
        self.build()?.1.params()
    }

    fn mappers(&self) -> Vec<MapperRef> {
        self.mappers.with_leading(self.returning.type_mapper())
    }
}
