use super::{Type, names};
use crate::error::{DbError, DbResult};
use crate::value::Value;
use serde_json::Value as JsonValue;

/// Any JSON document, stored as its serialized text.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonType;

fn to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        Value::Bool(b) => JsonValue::Bool(*b),
        Value::Int(i) => JsonValue::from(*i),
        Value::Float(f) => JsonValue::from(*f),
        Value::Text(s) => JsonValue::String(s.clone()),
        Value::Array(items) => JsonValue::Array(items.iter().map(to_json).collect()),
        Value::Json(v) => v.clone(),
    }
}

impl Type for JsonType {
    fn name(&self) -> &str {
        names::JSON
    }

    fn to_storage(&self, value: &Value) -> DbResult<Value> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        serde_json::to_string(&to_json(value))
            .map(Value::Text)
            .map_err(|e| DbError::conversion(self.name(), e.to_string()))
    }

    fn to_native(&self, value: &Value) -> DbResult<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Json(_) => Ok(value.clone()),
            Value::Text(s) => serde_json::from_str::<JsonValue>(s)
                .map(Value::Json)
                .map_err(|e| DbError::conversion(self.name(), format!("invalid JSON: {e}"))),
            other => Err(DbError::conversion(
                self.name(),
                format!("expected JSON text, got {}", other.type_name()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_round_trip() {
        let doc = Value::Json(json!({"tags": ["a", "b"], "n": 1}));
        let storage = JsonType.to_storage(&doc).unwrap();
        assert!(matches!(storage, Value::Text(_)));
        assert_eq!(JsonType.to_native(&storage).unwrap(), doc);
    }

    #[test]
    fn invalid_json_fails() {
        assert!(JsonType.to_native(&Value::Text("{nope".into())).is_err());
    }
}
