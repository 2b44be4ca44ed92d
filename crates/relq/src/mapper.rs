//! Batch transforms applied to fetched records.
//!
//! A [`Mapper`] receives a whole batch and must return a batch of the same
//! length; [`crate::ResultSet`] fails with [`DbError::MapperContract`] otherwise.

use crate::error::{DbError, DbResult};
use crate::types::TypeRef;
use crate::value::Record;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

/// Transforms one batch of records.
pub trait Mapper: Send + Sync {
    fn map(&self, batch: Vec<Record>) -> DbResult<Vec<Record>>;
}

/// Shared handle to a mapper.
pub type MapperRef = Arc<dyn Mapper>;

/// Converts configured fields from storage to native values.
#[derive(Debug, Clone, Default)]
pub struct TypeMapper {
    types: IndexMap<String, TypeRef>,
}

impl TypeMapper {
    pub fn new(types: IndexMap<String, TypeRef>) -> Self {
        Self { types }
    }

    pub fn types(&self) -> &IndexMap<String, TypeRef> {
        &self.types
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl Mapper for TypeMapper {
    fn map(&self, mut batch: Vec<Record>) -> DbResult<Vec<Record>> {
        for record in &mut batch {
            for (name, ty) in &self.types {
                let value = record
                    .get_mut(name)
                    .ok_or_else(|| DbError::UndefinedField(name.clone()))?;
                *value = ty.to_native(value)?;
            }
        }
        Ok(batch)
    }
}

/// Applies a function to every record.
pub struct RecordMapper<F> {
    f: F,
}

impl<F> RecordMapper<F>
where
    F: Fn(Record) -> DbResult<Record> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Mapper for RecordMapper<F>
where
    F: Fn(Record) -> DbResult<Record> + Send + Sync,
{
    fn map(&self, batch: Vec<Record>) -> DbResult<Vec<Record>> {
        batch.into_iter().map(&self.f).collect()
    }
}

impl<F> fmt::Debug for RecordMapper<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RecordMapper")
    }
}

/// Applies a function to the whole batch.
pub struct BatchMapper<F> {
    f: F,
}

impl<F> BatchMapper<F>
where
    F: Fn(Vec<Record>) -> DbResult<Vec<Record>> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> Mapper for BatchMapper<F>
where
    F: Fn(Vec<Record>) -> DbResult<Vec<Record>> + Send + Sync,
{
    fn map(&self, batch: Vec<Record>) -> DbResult<Vec<Record>> {
        (self.f)(batch)
    }
}

impl<F> fmt::Debug for BatchMapper<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BatchMapper")
    }
}

/// Run `batch` through `mappers` in order, enforcing the length contract.
pub(crate) fn apply(mappers: &[MapperRef], mut batch: Vec<Record>) -> DbResult<Vec<Record>> {
    for mapper in mappers {
        let expected = batch.len();
        batch = mapper.map(batch)?;
        if batch.len() != expected {
            return Err(DbError::MapperContract {
                expected,
                actual: batch.len(),
            });
        }
    }
    Ok(batch)
}
