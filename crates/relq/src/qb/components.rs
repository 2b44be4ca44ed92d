//! Clause accumulators shared by the query builders.

use crate::driver::Driver;
use crate::error::{DbError, DbResult};
use crate::expr;
use crate::mapper::{MapperRef, TypeMapper};
use crate::schema::{Column, Table};
use crate::types::TypeRef;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// WHERE / HAVING fragments, combined with `AND`.
#[derive(Debug, Clone, Default)]
pub struct Conditions {
    exprs: Vec<String>,
}

impl Conditions {
    /// Append a raw condition fragment.
    pub fn push(&mut self, expr: impl Into<String>) {
        self.exprs.push(expr.into());
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    /// The combined condition, or `None` when nothing was added.
    pub fn build(&self) -> DbResult<Option<String>> {
        if self.exprs.is_empty() {
            Ok(None)
        } else {
            expr::all(&self.exprs).map(Some)
        }
    }
}

/// ORDER BY terms in append order.
#[derive(Debug, Clone, Default)]
pub struct Order {
    terms: Vec<String>,
}

impl Order {
    /// Append a raw ORDER BY term, e.g. `"name" DESC`.
    pub fn push(&mut self, term: impl Into<String>) {
        self.terms.push(term.into());
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn clear(&mut self) {
        self.terms.clear();
    }

    /// Comma-joined terms, or `None` when there are none.
    pub fn build(&self) -> Option<String> {
        (!self.terms.is_empty()).then(|| self.terms.join(", "))
    }
}

/// LIMIT / OFFSET.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Range {
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Range {
    /// Fails unless `limit >= 1` and `offset >= 0`.
    pub fn set(&mut self, limit: i64, offset: Option<i64>) -> DbResult<()> {
        if limit < 1 {
            return Err(DbError::range(format!("limit must be at least 1, got {limit}")));
        }
        let offset = match offset {
            Some(offset) if offset < 0 => {
                return Err(DbError::range(format!(
                    "offset must not be negative, got {offset}"
                )));
            }
            Some(offset) => Some(offset as u64),
            None => None,
        };
        self.limit = Some(limit as u64);
        self.offset = offset;
        Ok(())
    }

    /// 1-based page of `page_size` rows.
    pub fn page(&mut self, page: i64, page_size: i64) -> DbResult<()> {
        if page < 1 {
            return Err(DbError::range(format!("page must be at least 1, got {page}")));
        }
        if page_size < 1 {
            return Err(DbError::range(format!(
                "page size must be at least 1, got {page_size}"
            )));
        }
        let offset = (page - 1)
            .checked_mul(page_size)
            .ok_or_else(|| DbError::range("page offset overflows"))?;
        self.set(page_size, Some(offset))
    }

    /// Row limit, if set.
    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Row offset, if set.
    pub fn offset(&self) -> Option<u64> {
        self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.limit.is_none()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn build(&self) -> Option<String> {
        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => Some(format!("LIMIT {limit} OFFSET {offset}")),
            (Some(limit), None) => Some(format!("LIMIT {limit}")),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
struct ReturnVar {
    name: Option<String>,
    sql: String,
}

/// Projection accumulator for SELECT lists and RETURNING clauses.
///
/// Tracks both the rendered expressions and the types of named results, from
/// which the leading [`TypeMapper`] of a statement is built.
#[derive(Debug, Clone)]
pub struct ReturnVars {
    driver: Arc<dyn Driver>,
    vars: Vec<ReturnVar>,
    types: IndexMap<String, TypeRef>,
}

impl ReturnVars {
    /// Create an empty projection quoted by `driver`.
    pub fn new(driver: Arc<dyn Driver>) -> Self {
        Self {
            driver,
            vars: Vec::new(),
            types: IndexMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Add `{table}.*` and the types of all of the table's columns.
    pub fn add_table(&mut self, table: &Table) {
        self.vars.push(ReturnVar {
            name: None,
            sql: format!("{}.*", table.reference()),
        });
        self.types.extend(table.column_types());
    }

    /// Add a column as `{expr}[ AS {alias}]`.
    ///
    /// Adding a column whose result name is already taken by another column
    /// replaces that entry in place.
    pub fn add_column(&mut self, column: &Column) {
        let name = column.output_name().to_string();
        let sql = match column.alias() {
            Some(alias) => format!("{} AS {}", column.expr(), self.driver.quote_name(alias)),
            None => column.expr().to_string(),
        };

        match self
            .vars
            .iter_mut()
            .find(|v| v.name.as_deref() == Some(name.as_str()))
        {
            Some(existing) => existing.sql = sql,
            None => self.vars.push(ReturnVar {
                name: Some(name.clone()),
                sql,
            }),
        }
        self.types.insert(name, Arc::clone(column.ty()));
    }

    /// Add a raw expression, optionally named and typed.
    pub fn add_value(
        &mut self,
        expr: &str,
        name: Option<&str>,
        ty: Option<TypeRef>,
    ) -> DbResult<()> {
        match name {
            Some(name) => {
                if self.vars.iter().any(|v| v.name.as_deref() == Some(name)) {
                    return Err(DbError::DuplicateName(name.to_string()));
                }
                self.vars.push(ReturnVar {
                    name: Some(name.to_string()),
                    sql: format!("{expr} AS {}", self.driver.quote_name(name)),
                });
                if let Some(ty) = ty {
                    self.types.insert(name.to_string(), ty);
                }
            }
            None => {
                if ty.is_some() {
                    return Err(DbError::TypeWithoutName(expr.to_string()));
                }
                self.vars.push(ReturnVar {
                    name: None,
                    sql: expr.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Comma-joined projection list.
    pub fn build(&self) -> String {
        self.vars
            .iter()
            .map(|v| v.sql.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Result name to type, for every typed entry.
    pub fn types(&self) -> &IndexMap<String, TypeRef> {
        &self.types
    }

    /// Mapper converting every typed result, if any result is typed.
    pub fn type_mapper(&self) -> Option<MapperRef> {
        if self.types.is_empty() {
            None
        } else {
            Some(Arc::new(TypeMapper::new(self.types.clone())))
        }
    }
}

/// User mappers, applied after the statement's own type mapper.
#[derive(Clone, Default)]
pub struct MapperChain {
    mappers: Vec<MapperRef>,
}

impl MapperChain {
    /// Append a user mapper.
    pub fn push(&mut self, mapper: MapperRef) {
        self.mappers.push(mapper);
    }

    pub fn clear(&mut self) {
        self.mappers.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }

    /// `leading` (usually a type mapper) followed by the user mappers.
    pub fn with_leading(&self, leading: Option<MapperRef>) -> Vec<MapperRef> {
        leading.into_iter().chain(self.mappers.iter().cloned()).collect()
    }
}

impl fmt::Debug for MapperChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapperChain")
            .field("len", &self.mappers.len())
            .finish()
    }
}
