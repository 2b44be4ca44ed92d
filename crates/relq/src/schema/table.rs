use super::{Column, ColumnDef, Schema};
use crate::driver::Driver;
use crate::error::{DbError, DbResult};
use crate::types::TypeRef;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// A table of a [`Schema`], optionally aliased.
///
/// Columns are kept in declaration order; that order drives INSERT column
/// lists and the type map of `{table}.*` projections.
#[derive(Debug, Clone)]
pub struct Table {
    schema: Schema,
    name: String,
    alias: Option<String>,
    defs: Arc<Vec<ColumnDef>>,
    columns: Vec<Column>,
    /// Quoted schema-qualified name.
    qualified: String,
    /// Quoted alias, or the qualified name when not aliased.
    reference: String,
}

impl Table {
    pub(crate) fn new(schema: Schema, name: &str, defs: Vec<ColumnDef>) -> DbResult<Self> {
        let mut seen = std::collections::HashSet::new();
        for def in &defs {
            if !seen.insert(def.name.as_str()) {
                return Err(DbError::DuplicateName(format!("{name}.{}", def.name)));
            }
        }
        let qualified = schema.driver().quote_table_name(schema.name(), name);
        Self::build(schema, name.to_string(), None, Arc::new(defs), qualified)
    }

    fn build(
        schema: Schema,
        name: String,
        alias: Option<String>,
        defs: Arc<Vec<ColumnDef>>,
        qualified: String,
    ) -> DbResult<Self> {
        let driver = Arc::clone(schema.driver());
        let reference = match &alias {
            Some(alias) => driver.quote_name(alias),
            None => qualified.clone(),
        };
        let owner = alias.clone().unwrap_or_else(|| name.clone());

        let mut columns = Vec::with_capacity(defs.len());
        for def in defs.iter() {
            let ty = schema.ty(&def.type_name)?;
            let quoted_name = driver.quote_name(&def.name);
            columns.push(Column {
                name: def.name.clone(),
                alias: alias.as_ref().map(|a| format!("{a}_{}", def.name)),
                ty,
                kind: def.kind.clone(),
                owner: owner.clone(),
                expr: format!("{reference}.{quoted_name}"),
                quoted_name,
            });
        }

        Ok(Self {
            schema,
            name,
            alias,
            defs,
            columns,
            qualified,
            reference,
        })
    }

    /// A copy of this table under `alias`.
    ///
    /// Columns of the aliased table are qualified by the alias and carry the
    /// projection alias `{alias}_{column}`.
    pub fn with_alias(&self, alias: &str) -> DbResult<Self> {
        Self::build(
            self.schema.clone(),
            self.name.clone(),
            Some(alias.to_string()),
            Arc::clone(&self.defs),
            self.qualified.clone(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn driver(&self) -> &Arc<dyn Driver> {
        self.schema.driver()
    }

    /// Quoted, schema-qualified table name (never includes the alias).
    pub fn qualified_name(&self) -> &str {
        &self.qualified
    }

    /// How columns refer to this table: the quoted alias if any, else the
    /// qualified name.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// `{qualified name} AS {alias}`, or just the qualified name.
    pub fn node(&self) -> String {
        match &self.alias {
            Some(_) => format!("{} AS {}", self.qualified, self.reference),
            None => self.qualified.clone(),
        }
    }

    /// All columns in declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Columns in declaration order, optionally re-aliased as `{prefix}_{column}`.
    pub fn list_columns(&self, prefix: Option<&str>) -> Vec<Column> {
        match prefix {
            Some(prefix) => self
                .columns
                .iter()
                .map(|c| c.with_alias(format!("{prefix}_{}", c.name)))
                .collect(),
            None => self.columns.clone(),
        }
    }

    pub fn column(&self, name: &str) -> DbResult<&Column> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| DbError::UnknownColumn {
                table: self.name.clone(),
                column: name.to_string(),
            })
    }

    /// Column name to type, for every column (used by `{table}.*` projections).
    pub fn column_types(&self) -> IndexMap<String, TypeRef> {
        self.columns
            .iter()
            .map(|c| (c.name.clone(), Arc::clone(&c.ty)))
            .collect()
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.node())
    }
}

impl AsRef<Table> for Table {
    fn as_ref(&self) -> &Table {
        self
    }
}

/// Declare a table type with one public [`Column`] field per column.
///
/// Column kinds are `required`, `auto`, or `optional(default)`. The generated
/// struct dereferences to [`Table`].
///
/// ```
/// use relq::{Database, table};
///
/// table! {
///     /// Orders placed by customers.
///     pub struct Orders => "orders" {
///         id: "int", auto;
///         customer_id: "int", required;
///         placed_at: "timestamp", required;
///         note: "string", optional(None::<String>);
///     }
/// }
///
/// let db = Database::mysql();
/// let o = Orders::aliased(&db.schema(Some("shop")), "o").unwrap();
/// assert_eq!(o.to_string(), "`shop_orders` AS `o`");
/// assert_eq!(o.customer_id.to_string(), "`o`.`customer_id`");
/// assert_eq!(o.customer_id.alias(), Some("o_customer_id"));
/// ```
#[macro_export]
macro_rules! table {
    (
        $(#[$meta:meta])*
        $vis:vis struct $ident:ident => $table:literal {
            $( $col:ident : $ty:literal , $kind:ident $( ( $default:expr ) )? );* $(;)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $ident {
            inner: $crate::Table,
            $( pub $col: $crate::Column, )*
        }

        impl $ident {
            /// Unqualified table name.
            pub const NAME: &'static str = $table;

            /// Column declarations, in order.
            pub fn definition() -> ::std::vec::Vec<$crate::ColumnDef> {
                ::std::vec![
                    $( $crate::ColumnDef::$kind(stringify!($col), $ty $(, $crate::Value::from($default))?), )*
                ]
            }

            pub fn new(schema: &$crate::Schema) -> $crate::DbResult<Self> {
                Self::from_table(schema.table($table, Self::definition())?)
            }

            pub fn aliased(schema: &$crate::Schema, alias: &str) -> $crate::DbResult<Self> {
                Self::from_table(schema.table($table, Self::definition())?.with_alias(alias)?)
            }

            fn from_table(inner: $crate::Table) -> $crate::DbResult<Self> {
                Ok(Self {
                    $( $col: inner.column(stringify!($col))?.clone(), )*
                    inner,
                })
            }
        }

        impl ::std::ops::Deref for $ident {
            type Target = $crate::Table;

            fn deref(&self) -> &$crate::Table {
                &self.inner
            }
        }

        impl ::std::convert::AsRef<$crate::Table> for $ident {
            fn as_ref(&self) -> &$crate::Table {
                &self.inner
            }
        }

        impl ::std::fmt::Display for $ident {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.inner, f)
            }
        }
    };
}
