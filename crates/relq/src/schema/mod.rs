//! Relational metadata: schemas, tables and columns.
//!
//! Tables are declared once, usually through the [`crate::table!`] macro, and
//! instantiated against a [`Schema`]:
//!
//! ```
//! use relq::{Database, table};
//!
//! table! {
//!     pub struct Users => "users" {
//!         id: "int", auto;
//!         name: "string", required;
//!         active: "bool", optional(true);
//!     }
//! }
//!
//! let db = Database::postgres();
//! let users = Users::new(&db.schema(None)).unwrap();
//! assert_eq!(users.to_string(), r#""users""#);
//! assert_eq!(users.name.to_string(), r#""users"."name""#);
//! ```

mod column;
mod table;

pub use column::{Column, ColumnDef, ColumnKind};
pub use table::Table;

use crate::driver::Driver;
use crate::error::DbResult;
use crate::types::{TypeProvider, TypeRef};
use std::fmt;
use std::sync::Arc;

/// A logical namespace of tables.
///
/// The schema name qualifies table names: PostgreSQL renders
/// `"schema"."table"`, MySQL flattens it into `` `schema_table` ``. The name
/// is fixed at construction; tables always render with the name of the schema
/// they were created from.
#[derive(Clone)]
pub struct Schema {
    name: Option<String>,
    driver: Arc<dyn Driver>,
    types: Arc<TypeProvider>,
}

impl Schema {
    pub fn new(name: Option<&str>, driver: Arc<dyn Driver>, types: Arc<TypeProvider>) -> Self {
        Self {
            name: name.map(str::to_string),
            driver,
            types,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    pub fn types(&self) -> &Arc<TypeProvider> {
        &self.types
    }

    /// Resolve a registered type by name.
    pub fn ty(&self, name: &str) -> DbResult<TypeRef> {
        self.types.get(name)
    }

    /// Build a table from its column declarations.
    pub fn table(
        &self,
        name: &str,
        columns: impl IntoIterator<Item = ColumnDef>,
    ) -> DbResult<Table> {
        Table::new(self.clone(), name, columns.into_iter().collect())
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("name", &self.name)
            .field("dialect", &self.driver.dialect())
            .finish()
    }
}
