use crate::types::TypeRef;
use crate::value::Value;
use std::fmt;

/// How a column gets its value on INSERT.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnKind {
    /// A value must be supplied.
    Required,
    /// The default is used when no value is supplied.
    Optional(Value),
    /// Generated by the database; never part of an INSERT.
    Auto,
}

/// Declaration of a column, resolved into a [`Column`] when the table is built.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: String,
    /// Registered type name (see [`crate::types::TypeProvider`]).
    pub type_name: String,
    pub kind: ColumnKind,
}

impl ColumnDef {
    pub fn required(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            kind: ColumnKind::Required,
        }
    }

    pub fn optional(
        name: impl Into<String>,
        type_name: impl Into<String>,
        default: impl Into<Value>,
    ) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            kind: ColumnKind::Optional(default.into()),
        }
    }

    pub fn auto(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            kind: ColumnKind::Auto,
        }
    }
}

/// A column of a particular [`crate::Table`] instance.
///
/// Renders (via `Display`) as `{table or alias}.{quoted name}`. The column
/// alias only matters when the column is projected, where it becomes
/// `AS {alias}`.
#[derive(Debug, Clone)]
pub struct Column {
    pub(crate) name: String,
    pub(crate) alias: Option<String>,
    pub(crate) ty: TypeRef,
    pub(crate) kind: ColumnKind,
    /// Unquoted alias or base name of the owning table.
    pub(crate) owner: String,
    pub(crate) quoted_name: String,
    pub(crate) expr: String,
}

impl Column {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Name under which the column appears in a result record.
    pub fn output_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    pub fn ty(&self) -> &TypeRef {
        &self.ty
    }

    pub fn kind(&self) -> &ColumnKind {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        matches!(self.kind, ColumnKind::Required)
    }

    pub fn is_auto(&self) -> bool {
        matches!(self.kind, ColumnKind::Auto)
    }

    pub fn default_value(&self) -> Option<&Value> {
        match &self.kind {
            ColumnKind::Optional(value) => Some(value),
            _ => None,
        }
    }

    /// Quoted column name without table qualification.
    pub fn quoted_name(&self) -> &str {
        &self.quoted_name
    }

    /// Fully qualified, quoted column reference.
    pub fn expr(&self) -> &str {
        &self.expr
    }

    /// Placeholder name used when binding a value for this column:
    /// `{table or alias}_{column}`.
    pub fn placeholder(&self) -> String {
        format!("{}_{}", self.owner, self.name)
    }

    /// A copy of this column carrying a different projection alias.
    pub fn with_alias(&self, alias: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            ..self.clone()
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expr)
    }
}

impl AsRef<Column> for Column {
    fn as_ref(&self) -> &Column {
        self
    }
}
