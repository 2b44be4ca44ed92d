use super::{Type, names};
use crate::error::{DbError, DbResult};
use crate::value::Value;

fn unexpected(type_name: &str, value: &Value) -> DbError {
    DbError::conversion(type_name, format!("unexpected {} value: {value}", value.type_name()))
}

/// How booleans are represented in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolEncoding {
    /// `1` / `0` (MySQL `TINYINT(1)`).
    Int,
    /// Native boolean (PostgreSQL `boolean`).
    Native,
}

#[derive(Debug, Clone, Copy)]
pub struct BoolType {
    encoding: BoolEncoding,
}

impl BoolType {
    pub fn new(encoding: BoolEncoding) -> Self {
        Self { encoding }
    }

    fn parse(&self, value: &Value) -> DbResult<Option<bool>> {
        match value {
            Value::Null => Ok(None),
            Value::Bool(b) => Ok(Some(*b)),
            Value::Int(0) => Ok(Some(false)),
            Value::Int(1) => Ok(Some(true)),
            Value::Text(s) => match s.as_str() {
                "1" | "t" | "true" => Ok(Some(true)),
                "0" | "f" | "false" => Ok(Some(false)),
                _ => Err(unexpected(self.name(), value)),
            },
            other => Err(unexpected(self.name(), other)),
        }
    }
}

impl Type for BoolType {
    fn name(&self) -> &str {
        names::BOOL
    }

    fn to_storage(&self, value: &Value) -> DbResult<Value> {
        Ok(match (self.parse(value)?, self.encoding) {
            (None, _) => Value::Null,
            (Some(b), BoolEncoding::Int) => Value::Int(i64::from(b)),
            (Some(b), BoolEncoding::Native) => Value::Bool(b),
        })
    }

    fn to_native(&self, value: &Value) -> DbResult<Value> {
        Ok(self.parse(value)?.map_or(Value::Null, Value::Bool))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IntType;

impl IntType {
    fn convert(&self, value: &Value) -> DbResult<Value> {
        match value {
            Value::Null | Value::Int(_) => Ok(value.clone()),
            Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
            Value::Text(s) => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| DbError::conversion(self.name(), format!("{s:?}: {e}"))),
            other => Err(unexpected(self.name(), other)),
        }
    }
}

impl Type for IntType {
    fn name(&self) -> &str {
        names::INT
    }

    fn to_storage(&self, value: &Value) -> DbResult<Value> {
        self.convert(value)
    }

    fn to_native(&self, value: &Value) -> DbResult<Value> {
        self.convert(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FloatType;

impl FloatType {
    fn convert(&self, value: &Value) -> DbResult<Value> {
        match value {
            Value::Null | Value::Float(_) => Ok(value.clone()),
            Value::Int(i) => Ok(Value::Float(*i as f64)),
            Value::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| DbError::conversion(self.name(), format!("{s:?}: {e}"))),
            other => Err(unexpected(self.name(), other)),
        }
    }
}

impl Type for FloatType {
    fn name(&self) -> &str {
        names::FLOAT
    }

    fn to_storage(&self, value: &Value) -> DbResult<Value> {
        self.convert(value)
    }

    fn to_native(&self, value: &Value) -> DbResult<Value> {
        self.convert(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StringType;

impl StringType {
    fn convert(&self, value: &Value) -> DbResult<Value> {
        match value {
            Value::Null | Value::Text(_) => Ok(value.clone()),
            Value::Int(_) | Value::Float(_) | Value::Bool(_) => Ok(Value::Text(value.to_string())),
            other => Err(unexpected(self.name(), other)),
        }
    }
}

impl Type for StringType {
    fn name(&self) -> &str {
        names::STRING
    }

    fn to_storage(&self, value: &Value) -> DbResult<Value> {
        self.convert(value)
    }

    fn to_native(&self, value: &Value) -> DbResult<Value> {
        self.convert(value)
    }
}
