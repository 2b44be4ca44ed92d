use super::{
    BoolEncoding, BoolType, DateType, FloatType, IntType, JsonType, StringType, TimestampType,
    TypeRef, names,
};
use crate::driver::Dialect;
use crate::error::{DbError, DbResult};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry resolving type names to shared converters.
///
/// Each dialect gets its own defaults (booleans are integers on MySQL and
/// native on PostgreSQL); applications may register additional types or
/// override the built-ins.
#[derive(Debug, Clone, Default)]
pub struct TypeProvider {
    types: HashMap<String, TypeRef>,
}

impl TypeProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider with the built-in types configured for `dialect`.
    pub fn for_dialect(dialect: Dialect) -> Self {
        let bool_encoding = match dialect {
            Dialect::Mysql => BoolEncoding::Int,
            Dialect::Postgres => BoolEncoding::Native,
        };

        let mut provider = Self::new();
        provider.register(names::BOOL, Arc::new(BoolType::new(bool_encoding)));
        provider.register(names::INT, Arc::new(IntType));
        provider.register(names::FLOAT, Arc::new(FloatType));
        provider.register(names::STRING, Arc::new(StringType));
        provider.register(names::JSON, Arc::new(JsonType));
        provider.register(names::TIMESTAMP, Arc::new(TimestampType));
        provider.register(names::DATE, Arc::new(DateType));
        provider
    }

    /// Register (or replace) a type under `name`.
    pub fn register(&mut self, name: impl Into<String>, ty: TypeRef) -> &mut Self {
        self.types.insert(name.into(), ty);
        self
    }

    pub fn has(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn get(&self, name: &str) -> DbResult<TypeRef> {
        self.types
            .get(name)
            .cloned()
            .ok_or_else(|| DbError::UnknownType(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn dialect_defaults_differ_for_bool() {
        let mysql = TypeProvider::for_dialect(Dialect::Mysql);
        let pg = TypeProvider::for_dialect(Dialect::Postgres);
        let v = Value::Bool(true);
        assert_eq!(mysql.get("bool").unwrap().to_storage(&v).unwrap(), Value::Int(1));
        assert_eq!(pg.get("bool").unwrap().to_storage(&v).unwrap(), Value::Bool(true));
    }

    #[test]
    fn unknown_type_is_an_error() {
        let types = TypeProvider::for_dialect(Dialect::Postgres);
        assert!(types.has("timestamp"));
        assert!(!types.has("money"));
        assert!(matches!(types.get("money"), Err(DbError::UnknownType(name)) if name == "money"));
    }

    #[test]
    fn register_overrides_builtin() {
        let mut types = TypeProvider::for_dialect(Dialect::Postgres);
        types.register("bool", Arc::new(BoolType::new(BoolEncoding::Int)));
        let stored = types.get("bool").unwrap().to_storage(&Value::Bool(false)).unwrap();
        assert_eq!(stored, Value::Int(0));
    }
}
