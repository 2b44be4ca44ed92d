//! Display-only SQL interpolation for diagnostics.
//!
//! The output of [`format_query`] is meant for error messages and logs. It is
//! never executed.

use crate::placeholder;
use crate::value::{Params, Value};

/// Substitute bound values for their placeholders.
///
/// Strings are single-quoted with embedded quotes doubled, arrays render as a
/// parenthesized list (`(null)` when empty), and `Null` renders as `NULL`.
/// Placeholders without a bound value are left as they are.
pub fn format_query(sql: &str, params: &Params) -> String {
    placeholder::rewrite(sql, |name| params.get(name).map(literal))
}

fn literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Int(v) => v.to_string(),
        Value::Float(v) => v.to_string(),
        Value::Text(s) => quote(s),
        Value::Json(v) => quote(&v.to_string()),
        Value::Array(items) if items.is_empty() => "(null)".to_string(),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(literal).collect();
            format!("({})", parts.join(", "))
        }
    }
}

fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}
