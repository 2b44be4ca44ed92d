//! Entry point wiring a dialect driver and type registry together.

use crate::config::ConnectionConfig;
use crate::connection::Connection;
use crate::driver::{Dialect, Driver, MysqlDriver, PostgresDriver};
use crate::error::DbResult;
use crate::qb::{DeleteQuery, InsertQuery, SelectQuery, SqlQuery, UpdateQuery};
use crate::schema::{Schema, Table};
use crate::statement::RawConnection;
use crate::types::{TypeProvider, TypeRef};
use std::sync::Arc;

/// A database dialect plus its type registry.
///
/// Creates schemas, query builders and connections that share the same
/// driver and types.
#[derive(Debug, Clone)]
pub struct Database {
    driver: Arc<dyn Driver>,
    types: Arc<TypeProvider>,
}

impl Database {
    /// Use an explicit driver and type registry.
    pub fn new(driver: Arc<dyn Driver>, types: TypeProvider) -> Self {
        Self {
            driver,
            types: Arc::new(types),
        }
    }

    pub fn postgres() -> Self {
        Self::new(
            Arc::new(PostgresDriver),
            TypeProvider::for_dialect(Dialect::Postgres),
        )
    }

    pub fn mysql() -> Self {
        Self::new(Arc::new(MysqlDriver), TypeProvider::for_dialect(Dialect::Mysql))
    }

    pub fn dialect(&self) -> Dialect {
        self.driver.dialect()
    }

    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    pub fn types(&self) -> &TypeProvider {
        &self.types
    }

    /// Resolve a registered type.
    pub fn ty(&self, name: &str) -> DbResult<TypeRef> {
        self.types.get(name)
    }

    /// A schema, optionally named.
    pub fn schema(&self, name: Option<&str>) -> Schema {
        Schema::new(name, Arc::clone(&self.driver), Arc::clone(&self.types))
    }

    pub fn select(&self, root: &Table) -> SelectQuery {
        SelectQuery::new(root)
    }

    pub fn insert(&self, root: &Table) -> InsertQuery {
        InsertQuery::new(root)
    }

    pub fn update(&self, root: &Table) -> UpdateQuery {
        UpdateQuery::new(root)
    }

    pub fn delete(&self, root: &Table) -> DeleteQuery {
        DeleteQuery::new(root)
    }

    pub fn sql(&self, sql: impl Into<String>) -> SqlQuery {
        SqlQuery::new(sql)
    }

    /// Wrap a client connection.
    pub fn connect<C: RawConnection>(&self, raw: C) -> Connection<C> {
        Connection::new(raw, Arc::clone(&self.driver))
    }

    pub fn connect_with_config<C: RawConnection>(
        &self,
        raw: C,
        config: ConnectionConfig,
    ) -> Connection<C> {
        Connection::with_config(raw, Arc::clone(&self.driver), config)
    }
}
