//! String combinators for boolean SQL expressions.
//!
//! These helpers only compose text; they never bind values. Operands are raw
//! SQL fragments that may already contain placeholders.
//!
//! ```
//! use relq::expr;
//!
//! let sql = expr::all(["a = :a", "b = :b OR c = :c"]).unwrap();
//! assert_eq!(sql, "(a = :a) AND (b = :b OR c = :c)");
//! ```

use crate::error::{DbError, DbResult};

/// Combine expressions with `AND`.
///
/// A single operand is returned unchanged; with several operands each one is
/// wrapped in parentheses (even if it is already grouped) and joined.
pub fn all<I, S>(exprs: I) -> DbResult<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    combine("all", "AND", exprs)
}

/// Combine expressions with `OR`. Same grouping rules as [`all`].
pub fn any<I, S>(exprs: I) -> DbResult<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    combine("any", "OR", exprs)
}

fn combine<I, S>(func: &'static str, op: &str, exprs: I) -> DbResult<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let exprs: Vec<S> = exprs.into_iter().collect();
    match exprs.len() {
        0 => Err(DbError::EmptyExpression(func)),
        1 => Ok(exprs[0].as_ref().to_string()),
        _ => {
            let parts: Vec<String> = exprs.iter().map(|e| format!("({})", e.as_ref())).collect();
            Ok(parts.join(&format!(" {op} ")))
        }
    }
}

/// Wrap an expression in parentheses unless it is already fully grouped.
pub fn group(expr: &str) -> String {
    if is_grouped(expr) {
        expr.to_string()
    } else {
        format!("({expr})")
    }
}

/// True when a single outer pair of parentheses encloses the whole expression.
///
/// `(a) AND (b)` is not grouped: its first `(` closes before the end. Parentheses
/// inside single-quoted literals are ignored.
pub fn is_grouped(expr: &str) -> bool {
    let expr = expr.trim();
    if !expr.starts_with('(') || !expr.ends_with(')') {
        return false;
    }

    let mut depth = 0usize;
    let mut in_literal = false;
    let last = expr.len() - 1;

    for (i, ch) in expr.char_indices() {
        if in_literal {
            if ch == '\'' {
                in_literal = false;
            }
            continue;
        }
        match ch {
            '\'' => in_literal = true,
            '(' => depth += 1,
            ')' => {
                if depth == 0 {
                    return false;
                }
                depth -= 1;
                if depth == 0 && i != last {
                    return false;
                }
            }
            _ => {}
        }
    }

    depth == 0 && !in_literal
}
