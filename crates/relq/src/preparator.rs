//! Array placeholder expansion.

use crate::error::{DbError, DbResult};
use crate::placeholder;
use crate::value::{Params, Value};
use std::collections::HashSet;

/// SQL ready to be prepared, with the individual binds it needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Expanded {
    pub sql: String,
    /// One entry per placeholder the SQL uses, in parameter order; array
    /// elements appear in element order under `name_1 .. name_k`.
    pub binds: Vec<(String, Value)>,
}

/// Expand array-valued placeholders and flatten the parameter map into binds.
///
/// `:name` bound to a k-element array becomes `(:name_1, :name_2, ..., :name_k)`.
/// Placeholders are matched by their full name, so `:id` never rewrites part of
/// `:id_list`. Parameters the SQL never mentions are not bound.
///
/// An empty array renders as the literal `(null)` and produces no binds. Note
/// that `col IN (null)` is never true, not even for NULL values in `col`;
/// callers that may pass an empty set should guard the condition themselves.
///
/// Fails with [`DbError::Validation`] when an element name generated for a
/// used array is also a scalar placeholder of the same SQL.
pub fn expand(sql: &str, params: &Params) -> DbResult<Expanded> {
    let used: HashSet<String> = placeholder::names(sql).into_iter().collect();

    for (name, value) in params {
        let Value::Array(items) = value else { continue };
        if !used.contains(name) {
            continue;
        }
        for i in 1..=items.len() {
            let element = format!("{name}_{i}");
            let scalar = params.get(&element).is_some_and(|v| !matches!(v, Value::Array(_)));
            if scalar && used.contains(&element) {
                return Err(DbError::validation(format!(
                    "array parameter `{name}` expands to `:{element}`, which is already bound"
                )));
            }
        }
    }

    let sql = placeholder::rewrite(sql, |name| match params.get(name) {
        Some(Value::Array(items)) if items.is_empty() => Some("(null)".to_string()),
        Some(Value::Array(items)) => {
            let list: Vec<String> = (1..=items.len()).map(|i| format!(":{name}_{i}")).collect();
            Some(format!("({})", list.join(", ")))
        }
        _ => None,
    });

    let mut binds = Vec::with_capacity(params.len());
    for (name, value) in params.iter().filter(|(name, _)| used.contains(*name)) {
        match value {
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    binds.push((format!("{name}_{}", i + 1), item.clone()));
                }
            }
            other => binds.push((name.clone(), other.clone())),
        }
    }

    Ok(Expanded { sql, binds })
}
