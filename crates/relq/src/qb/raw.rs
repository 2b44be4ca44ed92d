//! Hand-written SQL with named placeholders.

use super::components::MapperChain;
use super::macros::{impl_bind, impl_mappers};
use super::query::Query;
use super::traits::Executable;
use crate::error::DbResult;
use crate::mapper::MapperRef;
use crate::value::Params;

/// A literal SQL statement.
///
/// ```
/// use relq::{Executable, SqlQuery};
///
/// let q = SqlQuery::new("SELECT * FROM t WHERE id IN :ids").bind("ids", vec![1, 2]).unwrap();
/// assert_eq!(q.sql().unwrap(), "SELECT * FROM t WHERE id IN :ids");
/// ```
#[derive(Debug, Clone)]
pub struct SqlQuery {
    sql: String,
    query: Query,
    mappers: MapperChain,
}

impl SqlQuery {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            query: Query::new(),
            mappers: MapperChain::default(),
        }
    }
}

impl_bind!(SqlQuery);
impl_mappers!(SqlQuery);

impl Executable for SqlQuery {
    fn sql(&self) -> DbResult<String> {
        Ok(self.sql.clone())
    }

    fn params(&self) -> DbResult<Params> {
        self.query.params()
    }

    fn mappers(&self) -> Vec<MapperRef> {
        self.mappers.with_leading(None)
    }
}
