//! Dialect-specific identifier quoting and error classification.
//!
//! A [`Driver`] never touches the network: it only knows how the dialect spells
//! identifiers and how its SQL-states map onto [`SqlErrorKind`].

use crate::error::SqlErrorKind;
use std::fmt::Debug;

/// SQL dialect family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Postgres,
    Mysql,
}

impl Dialect {
    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Postgres => "PostgreSQL",
            Dialect::Mysql => "MySQL",
        }
    }
}

/// Dialect capability consumed by the schema model and the query builders.
pub trait Driver: Debug + Send + Sync {
    fn dialect(&self) -> Dialect;

    /// Quote a single identifier (table, column or alias name).
    fn quote_name(&self, name: &str) -> String;

    /// Quote a table name, qualified by an optional schema name.
    fn quote_table_name(&self, schema: Option<&str>, table: &str) -> String;

    /// Map a SQL-state / driver error code onto an error kind.
    fn classify_error(&self, sql_state: Option<&str>, code: Option<&str>) -> SqlErrorKind;
}

fn quote_with(quote: char, name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push(quote);
    for ch in name.chars() {
        if ch == quote {
            out.push(quote);
        }
        out.push(ch);
    }
    out.push(quote);
    out
}

/// PostgreSQL: `"double quoted"` identifiers, `"schema"."table"` qualification.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDriver;

impl Driver for PostgresDriver {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn quote_name(&self, name: &str) -> String {
        quote_with('"', name)
    }

    fn quote_table_name(&self, schema: Option<&str>, table: &str) -> String {
        match schema {
            Some(schema) => format!("{}.{}", self.quote_name(schema), self.quote_name(table)),
            None => self.quote_name(table),
        }
    }

    fn classify_error(&self, sql_state: Option<&str>, _code: Option<&str>) -> SqlErrorKind {
        match sql_state {
            Some("23505") => SqlErrorKind::UniqueViolation,
            Some("23503") => SqlErrorKind::ForeignKeyViolation,
            Some("23514") => SqlErrorKind::CheckViolation,
            Some("23502") => SqlErrorKind::NotNullViolation,
            _ => SqlErrorKind::Generic,
        }
    }
}

/// MySQL: `` `backtick` `` identifiers; schemas are flattened into a table-name
/// prefix (`` `schema_table` ``).
#[derive(Debug, Clone, Copy, Default)]
pub struct MysqlDriver;

impl Driver for MysqlDriver {
    fn dialect(&self) -> Dialect {
        Dialect::Mysql
    }

    fn quote_name(&self, name: &str) -> String {
        quote_with('`', name)
    }

    fn quote_table_name(&self, schema: Option<&str>, table: &str) -> String {
        match schema {
            Some(schema) => self.quote_name(&format!("{schema}_{table}")),
            None => self.quote_name(table),
        }
    }

    fn classify_error(&self, _sql_state: Option<&str>, code: Option<&str>) -> SqlErrorKind {
        // MySQL reports all integrity errors as SQL-state 23000; the error code tells them apart.
        match code {
            Some("1062") | Some("1586") => SqlErrorKind::UniqueViolation,
            Some("1451") | Some("1452") | Some("1216") | Some("1217") => {
                SqlErrorKind::ForeignKeyViolation
            }
            Some("3819") => SqlErrorKind::CheckViolation,
            Some("1048") | Some("1364") => SqlErrorKind::NotNullViolation,
            _ => SqlErrorKind::Generic,
        }
    }
}
