//! # relq
//!
//! SQL query construction, placeholder binding and batched result mapping for
//! MySQL and PostgreSQL.
//!
//! ## Features
//!
//! - **Typed schema model**: tables declared once with [`table!`], columns render as quoted, qualified SQL
//! - **Query builders**: SELECT / INSERT / UPDATE / DELETE with joins, grouping, paging and PostgreSQL `RETURNING`
//! - **Named placeholders**: `:name` binding with array expansion for `IN` lists
//! - **Type conversion**: values converted to storage on bind and back to native on fetch
//! - **Batched mapping**: results stream through a mapper chain one batch at a time
//! - **Nested transactions**: one physical transaction, committed only if every level agrees
//! - **Query monitoring**: `tracing` events, statistics and slow-query detection
//!
//! ## Example
//!
//! ```
//! use relq::{Database, Executable, record, table};
//!
//! table! {
//!     pub struct Users => "users" {
//!         id: "int", auto;
//!         name: "string", required;
//!         created: "timestamp", required;
//!     }
//! }
//!
//! let db = Database::mysql();
//! let users = Users::new(&db.schema(None)).unwrap();
//!
//! let insert = db
//!     .insert(&users)
//!     .add(record! { "name" => "alice", "created" => 1446648052 });
//! assert_eq!(
//!     insert.sql().unwrap(),
//!     "INSERT INTO `users` (`name`, `created`) VALUES\n(:c0_0, :c0_1)"
//! );
//! assert_eq!(insert.params().unwrap()["c0_1"], relq::Value::from("2015-11-04 14:40:52"));
//! ```
//!
//! Statements run on a [`Connection`], which wraps any client implementing
//! [`RawConnection`]. With the `postgres` feature, `pg::PgConnection` provides
//! one over `tokio-postgres`.

pub mod config;
pub mod connection;
pub mod database;
pub mod driver;
pub mod error;
pub mod expr;
pub mod format;
pub mod mapper;
pub mod monitor;
mod placeholder;
pub mod preparator;
pub mod qb;
pub mod result;
pub mod schema;
pub mod statement;
pub mod types;
pub mod value;

pub use config::ConnectionConfig;
pub use connection::{Connection, TransactionOutcome};
pub use database::Database;
pub use driver::{Dialect, Driver, MysqlDriver, PostgresDriver};
pub use error::{DbError, DbResult, DriverError, SqlErrorKind};
pub use format::format_query;
pub use mapper::{BatchMapper, Mapper, MapperRef, RecordMapper, TypeMapper};
pub use monitor::{
    CompositeMonitor, NoopMonitor, QueryContext, QueryMonitor, QueryResult, QueryStats, QueryType,
    StatsMonitor, TracingMonitor,
};
pub use qb::{
    Countable, DeleteQuery, Executable, InsertQuery, Query, SelectQuery, SqlQuery, UpdateQuery,
};
pub use result::ResultSet;
pub use schema::{Column, ColumnDef, ColumnKind, Schema, Table};
pub use statement::{PreparedStatement, RawConnection, StatementHandle};
pub use types::{Type, TypeProvider, TypeRef};
pub use value::{Params, Record, Value};

#[cfg(feature = "postgres")]
pub mod pg;

#[cfg(feature = "postgres")]
pub use pg::PgConnection;

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{PgPool, create_pool, create_pool_with_config};
