//! Builder methods shared by several query builders.

/// `bind` / `bind_typed` over a `query: Query` field.
macro_rules! impl_bind {
    ($ty:ty) => {
        impl $ty {
            /// Bind a scalar or flat array to `:name`.
            pub fn bind(
                mut self,
                name: &str,
                value: impl Into<$crate::Value>,
            ) -> $crate::DbResult<Self> {
                self.query.bind(name, value)?;
                Ok(self)
            }

            /// Bind a native value converted by `ty`.
            pub fn bind_typed(
                mut self,
                name: &str,
                value: impl Into<$crate::Value>,
                ty: $crate::types::TypeRef,
            ) -> Self {
                self.query.bind_typed(name, value, ty);
                self
            }
        }
    };
}

/// `and_where` over a `conditions: Conditions` field.
macro_rules! impl_where {
    ($ty:ty) => {
        impl $ty {
            /// Add a WHERE condition; conditions are combined with `AND`.
            pub fn and_where(mut self, condition: impl ::std::fmt::Display) -> Self {
                self.conditions.push(condition.to_string());
                self
            }

            /// Add several WHERE conditions at once.
            pub fn and_where_all<I>(mut self, conditions: I) -> Self
            where
                I: IntoIterator,
                I::Item: ::std::fmt::Display,
            {
                for condition in conditions {
                    self.conditions.push(condition.to_string());
                }
                self
            }
        }
    };
}

/// `map` / `map_records` / `map_batches` over a `mappers: MapperChain` field.
macro_rules! impl_mappers {
    ($ty:ty) => {
        impl $ty {
            /// Append a mapper to the chain.
            pub fn map(mut self, mapper: impl $crate::mapper::Mapper + 'static) -> Self {
                self.mappers.push(::std::sync::Arc::new(mapper));
                self
            }

            /// Append a per-record transform.
            pub fn map_records<F>(self, f: F) -> Self
            where
                F: Fn($crate::Record) -> $crate::DbResult<$crate::Record> + Send + Sync + 'static,
            {
                self.map($crate::mapper::RecordMapper::new(f))
            }

            /// Append a per-batch transform. It must not change the batch length.
            pub fn map_batches<F>(self, f: F) -> Self
            where
                F: Fn(::std::vec::Vec<$crate::Record>)
                        -> $crate::DbResult<::std::vec::Vec<$crate::Record>>
                    + Send
                    + Sync
                    + 'static,
            {
                self.map($crate::mapper::BatchMapper::new(f))
            }
        }
    };
}

/// PostgreSQL `RETURNING` over a `returning: ReturnVars` field.
macro_rules! impl_returning {
    ($ty:ty) => {
        impl $ty {
            /// Return `{table}.*`.
            pub fn returning_table(mut self, table: &$crate::Table) -> Self {
                self.returning.add_table(table);
                self
            }

            /// Return a column.
            pub fn returning_column(mut self, column: &$crate::Column) -> Self {
                self.returning.add_column(column);
                self
            }

            /// Return several columns.
            pub fn returning_columns<I, C>(mut self, columns: I) -> Self
            where
                I: IntoIterator<Item = C>,
                C: AsRef<$crate::Column>,
            {
                for column in columns {
                    self.returning.add_column(column.as_ref());
                }
                self
            }

            /// Return a raw expression. A type requires a name.
            pub fn returning_value(
                mut self,
                expr: &str,
                name: Option<&str>,
                ty: Option<$crate::types::TypeRef>,
            ) -> $crate::DbResult<Self> {
                self.returning.add_value(expr, name, ty)?;
                Ok(self)
            }
        }
    };
}

/// Reject RETURNING outside PostgreSQL.
pub(crate) fn check_returning(
    driver: &dyn crate::driver::Driver,
    returning: &super::components::ReturnVars,
) -> crate::DbResult<()> {
    if !returning.is_empty() && driver.dialect() != crate::driver::Dialect::Postgres {
        return Err(crate::DbError::Unsupported(format!(
            "RETURNING is not supported by {}",
            driver.dialect().name()
        )));
    }
    Ok(())
}

/// Reject UPDATE/DELETE ORDER BY and LIMIT outside MySQL.
pub(crate) fn check_mutation_range(
    driver: &dyn crate::driver::Driver,
    order: &super::components::Order,
    limit: &super::components::Range,
) -> crate::DbResult<()> {
    if (!order.is_empty() || !limit.is_empty())
        && driver.dialect() != crate::driver::Dialect::Mysql
    {
        return Err(crate::DbError::Unsupported(format!(
            "ORDER BY / LIMIT on UPDATE and DELETE is not supported by {}",
            driver.dialect().name()
        )));
    }
    Ok(())
}

pub(crate) use impl_bind;
pub(crate) use impl_mappers;
pub(crate) use impl_returning;
pub(crate) use impl_where;
