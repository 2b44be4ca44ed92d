//! Bidirectional conversion between native values and storage values.
//!
//! A [`Type`] is attached to a column or a bound parameter. On the way in,
//! [`Type::to_storage`] turns the caller's value into something the driver can
//! bind; on the way out, [`Type::to_native`] (applied by
//! [`crate::mapper::TypeMapper`]) turns the fetched value back.
//!
//! `Null` passes through every built-in type unchanged in both directions.

mod json;
mod provider;
mod scalar;
mod temporal;

pub use json::JsonType;
pub use provider::TypeProvider;
pub use scalar::{BoolEncoding, BoolType, FloatType, IntType, StringType};
pub use temporal::{DateType, TimestampType};

use crate::error::DbResult;
use crate::value::Value;
use std::fmt::Debug;
use std::sync::Arc;

/// Shared handle to a type converter.
pub type TypeRef = Arc<dyn Type>;

/// A scalar converter between native and storage representations.
///
/// Implementations should satisfy `to_native(to_storage(v)) == v` for values in
/// their domain, unless the type is documented as lossy.
pub trait Type: Debug + Send + Sync {
    /// Registered name of the type (e.g. `"timestamp"`).
    fn name(&self) -> &str;

    /// Convert a native value to its storage form.
    fn to_storage(&self, value: &Value) -> DbResult<Value>;

    /// Convert a storage value to its native form.
    fn to_native(&self, value: &Value) -> DbResult<Value>;
}

/// Names of the built-in types.
pub mod names {
    pub const BOOL: &str = "bool";
    pub const INT: &str = "int";
    pub const FLOAT: &str = "float";
    pub const STRING: &str = "string";
    pub const JSON: &str = "json";
    pub const TIMESTAMP: &str = "timestamp";
    pub const DATE: &str = "date";
}
