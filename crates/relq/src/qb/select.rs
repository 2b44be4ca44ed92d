//! SELECT query builder.

use super::components::{Conditions, MapperChain, Order, Range, ReturnVars};
use super::macros::{impl_bind, impl_mappers, impl_where};
use super::query::Query;
use super::traits::{Countable, Executable};
use crate::error::DbResult;
use crate::mapper::MapperRef;
use crate::schema::{Column, Table};
use crate::types::{TypeRef, names};
use crate::value::Params;
use std::borrow::Cow;
use std::fmt;

/// SELECT builder rooted at one table.
///
/// When nothing is projected explicitly, `{root}.*` is selected. That default
/// is resolved when the SQL or the mappers are requested, so projection and
/// filter calls may come in any order.
#[derive(Debug, Clone)]
pub struct SelectQuery {
    query: Query,
    root: Table,
    flags: Vec<String>,
    return_vars: ReturnVars,
    joins: Vec<String>,
    conditions: Conditions,
    group_by: Vec<String>,
    having: Conditions,
    order: Order,
    range: Range,
    mappers: MapperChain,
}

impl SelectQuery {
    pub fn new(root: &Table) -> Self {
        Self {
            query: Query::new(),
            root: root.clone(),
            flags: Vec::new(),
            return_vars: ReturnVars::new(root.driver().clone()),
            joins: Vec::new(),
            conditions: Conditions::default(),
            group_by: Vec::new(),
            having: Conditions::default(),
            order: Order::default(),
            range: Range::default(),
            mappers: MapperChain::default(),
        }
    }

    // ==================== Projection ====================

    /// Add a dialect flag rendered right after `SELECT` (e.g. `DISTINCT`,
    /// MySQL `SQL_CALC_FOUND_ROWS`).
    pub fn flag(mut self, flag: &str) -> Self {
        self.flags.push(flag.to_string());
        self
    }

    /// Select `{table}.*`, typing every column of the table.
    pub fn table(mut self, table: &Table) -> Self {
        self.return_vars.add_table(table);
        self
    }

    /// Select one column (`AS alias` when the column is aliased).
    pub fn column(mut self, column: &Column) -> Self {
        self.return_vars.add_column(column);
        self
    }

    /// Select several columns.
    pub fn columns<I, C>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<Column>,
    {
        for column in columns {
            self.return_vars.add_column(column.as_ref());
        }
        self
    }

    /// Select a raw expression.
    ///
    /// Fails if `name` is already used, or if `ty` is given without a name.
    pub fn value(mut self, expr: &str, name: Option<&str>, ty: Option<TypeRef>) -> DbResult<Self> {
        self.return_vars.add_value(expr, name, ty)?;
        Ok(self)
    }

    // ==================== JOIN ====================

    pub fn inner_join(self, table: &Table, on: impl fmt::Display) -> Self {
        self.join("INNER", table, on)
    }

    pub fn left_join(self, table: &Table, on: impl fmt::Display) -> Self {
        self.join("LEFT", table, on)
    }

    pub fn right_join(self, table: &Table, on: impl fmt::Display) -> Self {
        self.join("RIGHT", table, on)
    }

    fn join(mut self, kind: &str, table: &Table, on: impl fmt::Display) -> Self {
        self.joins.push(format!("{kind} JOIN {} ON {on}", table.node()));
        self
    }

    // ==================== Grouping & ordering ====================

    /// Add a GROUP BY term (a raw expression or a [`Column`]).
    pub fn group_by(mut self, expr: impl fmt::Display) -> Self {
        self.group_by.push(expr.to_string());
        self
    }

    /// Add a HAVING condition; conditions are combined with `AND`.
    pub fn having(mut self, condition: impl fmt::Display) -> Self {
        self.having.push(condition.to_string());
        self
    }

    /// Add an ORDER BY term, e.g. `format!("{} DESC", users.created)`.
    pub fn order_by(mut self, term: impl fmt::Display) -> Self {
        self.order.push(term.to_string());
        self
    }

    // ==================== Range ====================

    /// Set LIMIT and optional OFFSET. Fails if `limit < 1` or `offset < 0`.
    pub fn limit(mut self, limit: i64, offset: Option<i64>) -> DbResult<Self> {
        self.range.set(limit, offset)?;
        Ok(self)
    }

    /// Select a 1-based page. Fails if either argument is below 1.
    pub fn page(mut self, page: i64, page_size: i64) -> DbResult<Self> {
        self.range.page(page, page_size)?;
        Ok(self)
    }

    // ==================== Build ====================

    fn effective_vars(&self) -> Cow<'_, ReturnVars> {
        if self.return_vars.is_empty() {
            let mut vars = self.return_vars.clone();
            vars.add_table(&self.root);
            Cow::Owned(vars)
        } else {
            Cow::Borrowed(&self.return_vars)
        }
    }

    fn build_sql(&self) -> DbResult<String> {
        let mut sql = String::from("SELECT ");
        if !self.flags.is_empty() {
            sql.push_str(&self.flags.join(" "));
            sql.push(' ');
        }
        sql.push_str(&self.effective_vars().build());
        sql.push_str("\nFROM ");
        sql.push_str(&self.root.node());

        for join in &self.joins {
            sql.push('\n');
            sql.push_str(join);
        }

        if let Some(conditions) = self.conditions.build()? {
            sql.push_str("\nWHERE ");
            sql.push_str(&conditions);
        }

        if !self.group_by.is_empty() {
            sql.push_str("\nGROUP BY ");
            sql.push_str(&self.group_by.join(", "));
        }

        if let Some(having) = self.having.build()? {
            sql.push_str("\nHAVING ");
            sql.push_str(&having);
        }

        if let Some(order) = self.order.build() {
            sql.push_str("\nORDER BY ");
            sql.push_str(&order);
        }

        if let Some(range) = self.range.build() {
            sql.push('\n');
            sql.push_str(&range);
        }

        Ok(sql)
    }
}

impl_bind!(SelectQuery);
impl_where!(SelectQuery);
impl_mappers!(SelectQuery);

impl Executable for SelectQuery {
    fn sql(&self) -> DbResult<String> {
        self.build_sql()
    }

    fn params(&self) -> DbResult<Params> {
        self.query.params()
    }

    fn mappers(&self) -> Vec<MapperRef> {
        self.mappers.with_leading(self.effective_vars().type_mapper())
    }
}

impl Countable for SelectQuery {
    type Count = SelectQuery;

    /// Same FROM / JOIN / WHERE / GROUP BY / HAVING, projecting `COUNT(*) AS count`
    /// with no ORDER BY, range or user mappers.
    fn count_statement(&self) -> DbResult<SelectQuery> {
        let int = self.root.schema().ty(names::INT)?;
        let mut count = self.clone();
        count.return_vars = ReturnVars::new(self.root.driver().clone());
        count.return_vars.add_value("COUNT(*)", Some("count"), Some(int))?;
        count.mappers.clear();
        count.range.clear();
        count.order.clear();
        Ok(count)
    }
}
