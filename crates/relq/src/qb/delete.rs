//! DELETE query builder.

use super::components::{Conditions, MapperChain, Order, Range, ReturnVars};
use super::macros::{
    check_mutation_range, check_returning, impl_bind, impl_mappers, impl_returning, impl_where,
};
use super::query::Query;
use super::traits::Executable;
use crate::error::DbResult;
use crate::mapper::MapperRef;
use crate::schema::Table;
use crate::value::Params;
use std::fmt;

/// DELETE builder.
#[derive(Debug, Clone)]
pub struct DeleteQuery {
    query: Query,
    root: Table,
    conditions: Conditions,
    order: Order,
    limit: Range,
    returning: ReturnVars,
    mappers: MapperChain,
}

impl DeleteQuery {
    pub fn new(root: &Table) -> Self {
        Self {
            query: Query::new(),
            root: root.clone(),
            conditions: Conditions::default(),
            order: Order::default(),
            limit: Range::default(),
            returning: ReturnVars::new(root.driver().clone()),
            mappers: MapperChain::default(),
        }
    }

    /// MySQL `ORDER BY` for the rows to delete.
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

        let mut sql = format!("DELETE FROM {}", self.root.node());
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

impl_bind!(DeleteQuery);
impl_where!(DeleteQuery);
impl_mappers!(DeleteQuery);
impl_returning!(DeleteQuery);

impl Executable for DeleteQuery {
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
