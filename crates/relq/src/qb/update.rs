//! UPDATE query builder.

use super::components::{Conditions, MapperChain, Order, Range, ReturnVars};
use super::macros::{
    check_mutation_range, check_returning, impl_bind, impl_mappers, impl_returning, impl_where,
};
use super::query::Query;
use super::traits::Executable;
use crate::error::{DbError, DbResult};
use crate::mapper::MapperRef;
use crate::schema::{Column, Table};
use crate::value::{Params, Record, Value};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// UPDATE builder.
///
/// Assigning the same column twice keeps the last assignment.
#[derive(Debug, Clone)]
pub struct UpdateQuery {
    query: Query,
    root: Table,
    assignments: IndexMap<String, String>,
    conditions: Conditions,
    order: Order,
    limit: Range,
    returning: ReturnVars,
    mappers: MapperChain,
}

impl UpdateQuery {
    pub fn new(root: &Table) -> Self {
        Self {
            query: Query::new(),
            root: root.clone(),
            assignments: IndexMap::new(),
            conditions: Conditions::default(),
            order: Order::default(),
            limit: Range::default(),
            returning: ReturnVars::new(root.driver().clone()),
            mappers: MapperChain::default(),
        }
    }

    /// Assign a value to a column, bound as `:{table or alias}_{column}` and
    /// converted by the column's type.
    pub fn set_value(mut self, column: &Column, value: impl Into<Value>) -> Self {
        let placeholder = column.placeholder();
        self.query
            .bind_typed(&placeholder, value, Arc::clone(column.ty()));
        self.assignments
            .insert(column.quoted_name().to_string(), format!(":{placeholder}"));
        self
    }

    /// Assign an untyped value to a column given by name, bound as `:{name}`.
    pub fn set_value_named(mut self, name: &str, value: impl Into<Value>) -> DbResult<Self> {
        self.query.bind(name, value)?;
        let quoted = self.root.driver().quote_name(name);
        self.assignments.insert(quoted, format!(":{name}"));
        Ok(self)
    }

    /// Assign a raw SQL expression to a column.
    pub fn set_expr(mut self, column: &Column, expr: impl fmt::Display) -> Self {
        self.assignments
            .insert(column.quoted_name().to_string(), expr.to_string());
        self
    }

    /// Assign a raw SQL expression to a column given by name.
    pub fn set_expr_named(mut self, name: &str, expr: impl fmt::Display) -> Self {
        let quoted = self.root.driver().quote_name(name);
        self.assignments.insert(quoted, expr.to_string());
        self
    }

    /// Assign every column of the table that appears in `record`, in column
    /// declaration order. Columns missing from the record are left untouched.
    pub fn assign(mut self, record: &Record) -> Self {
        let columns = self.root.columns().to_vec();
        for column in &columns {
            if let Some(value) = record.get(column.name()) {
                self = self.set_value(column, value.clone());
            }
        }
        self
    }

    /// MySQL `ORDER BY` for the rows to update.
    pub fn order_by(mut self, term: impl fmt::Display) -> Self {
        self.order.push(term.to_string());
        self
    }

    /// MySQL `LIMIT` (no offset). Fails if `limit < 1`.
    pub fn limit(mut self, limit: i64) -> DbResult<Self> {
        self.limit.set(limit, None)?;
        Ok(self)
    }

    fn build_sql(&self) -> DbResult<String> {
        let driver = self.root.driver();
        check_returning(&**driver, &self.returning)?;
        check_mutation_range(&**driver, &self.order, &self.limit)?;
        if self.assignments.is_empty() {
            return Err(DbError::validation("UPDATE without assignments"));
        }

        let assignments: Vec<String> = self
            .assignments
            .iter()
            .map(|(column, value)| format!("{column} = {value}"))
            .collect();
        let mut sql = format!("UPDATE {}\nSET {}", self.root.node(), assignments.join(", "));

        if let Some(conditions) = self.conditions.build()? {
            sql.push_str("\nWHERE ");
            sql.push_str(&conditions);
        }
        if let Some(order) = self.order.build() {
            sql.push_str("\nORDER BY ");
            sql.push_str(&order);
        }
        if let Some(limit) = self.limit.build() {
            sql.push('\n');
            sql.push_str(&limit);
        }
        if !self.returning.is_empty() {
            sql.push_str("\nRETURNING ");
            sql.push_str(&self.returning.build());
        }
        Ok(sql)
    }
}

impl_bind!(UpdateQuery);
impl_where!(UpdateQuery);
impl_mappers!(UpdateQuery);
impl_returning!(UpdateQuery);

impl Executable for UpdateQuery {
    fn sql(&self) -> DbResult<String> {
        self.build_sql()
    }

    fn params(&self) -> DbResult<Params> {
        self.query.params()
    }

    fn mappers(&self) -> Vec<MapperRef> {
        self.mappers.with_leading(self.returning.type_mapper())
    }
}
