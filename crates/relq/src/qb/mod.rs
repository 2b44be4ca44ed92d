//! Query builders.
//!
//! Builders render SQL with `:name` placeholders and collect the values bound
//! to them; both are exposed through [`Executable`], the only interface a
//! [`crate::Connection`] needs.
//!
//! ```
//! use relq::{Database, Executable, table};
//!
//! table! {
//!     pub struct Users => "users" {
//!         id: "int", auto;
//!         name: "string", required;
//!     }
//! }
//!
//! let db = Database::postgres();
//! let users = Users::new(&db.schema(None)).unwrap();
//!
//! let q = db
//!     .select(&users)
//!     .and_where(format!("{} = :name", users.name))
//!     .bind("name", "alice")
//!     .unwrap()
//!     .limit(10, None)
//!     .unwrap();
//!
//! assert_eq!(
//!     q.sql().unwrap(),
//!     "SELECT \"users\".*\nFROM \"users\"\nWHERE \"users\".\"name\" = :name\nLIMIT 10"
//! );
//! ```

pub mod components;
mod delete;
mod insert;
mod macros;
mod query;
mod raw;
mod select;
mod traits;
mod update;


pub use delete::DeleteQuery;
pub use insert::InsertQuery;
pub use query::Query;
pub use raw::SqlQuery;
pub use select::SelectQuery;
pub use traits::{Countable, Executable};
pub use update::UpdateQuery;
