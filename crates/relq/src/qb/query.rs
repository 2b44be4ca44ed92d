use crate::error::{DbError, DbResult};
use crate::types::TypeRef;
use crate::value::{Params, Value};
use indexmap::IndexMap;

/// Named parameters bound to a statement, with their optional types.
///
/// Untyped values are checked when bound; typed values are converted with
/// [`crate::types::Type::to_storage`] (element-wise for arrays) and checked
/// when [`Query::params`] is called.
#[derive(Debug, Clone, Default)]
pub struct Query {
    params: IndexMap<String, Value>,
    param_types: IndexMap<String, Option<TypeRef>>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a scalar or a flat array of scalars.
    pub fn bind(&mut self, name: &str, value: impl Into<Value>) -> DbResult<()> {
        let value = value.into();
        check_bindable(name, &value)?;
        self.params.insert(name.to_string(), value);
        self.param_types.insert(name.to_string(), None);
        Ok(())
    }

    /// Bind a native value that is converted by `ty` on its way to storage.
    pub fn bind_typed(&mut self, name: &str, value: impl Into<Value>, ty: TypeRef) {
        self.params.insert(name.to_string(), value.into());
        self.param_types.insert(name.to_string(), Some(ty));
    }

    /// Copy every binding of `other` into this query (later bindings win).
    pub fn merge(&mut self, other: &Query) {
        for (name, value) in &other.params {
            self.params.insert(name.clone(), value.clone());
            let ty = other.param_types.get(name).cloned().flatten();
            self.param_types.insert(name.clone(), ty);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Native values as bound.
    pub fn native_params(&self) -> &IndexMap<String, Value> {
        &self.params
    }

    /// Storage values, ready for [`crate::preparator::expand`].
    pub fn params(&self) -> DbResult<Params> {
        let mut out = Params::with_capacity(self.params.len());
        for (name, value) in &self.params {
            let storage = match self.param_types.get(name).and_then(Option::as_ref) {
                Some(ty) => match value {
                    Value::Array(items) => Value::Array(
                        items
                            .iter()
                            .map(|item| ty.to_storage(item))
                            .collect::<DbResult<Vec<_>>>()?,
                    ),
                    scalar => ty.to_storage(scalar)?,
                },
                None => value.clone(),
            };
            check_bindable(name, &storage)?;
            out.insert(name.clone(), storage);
        }
        Ok(out)
    }
}

fn check_bindable(name: &str, value: &Value) -> DbResult<()> {
    if value.is_bindable() {
        Ok(())
    } else {
        Err(DbError::UnexpectedValueType {
            name: name.to_string(),
            found: value.type_name().to_string(),
        })
    }
}
