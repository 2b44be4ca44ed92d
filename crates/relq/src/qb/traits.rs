//! Contracts between statement sources and the connection.

use crate::error::DbResult;
use crate::mapper::MapperRef;
use crate::value::Params;

/// Anything the [`crate::Connection`] can prepare and run.
pub trait Executable {
    /// SQL with `:name` placeholders.
    fn sql(&self) -> DbResult<String>;

    /// Storage values for every placeholder in [`Executable::sql`].
    fn params(&self) -> DbResult<Params>;

    /// Mappers to apply to fetched records, in order.
    fn mappers(&self) -> Vec<MapperRef> {
        Vec::new()
    }
}

impl<T: Executable + ?Sized> Executable for &T {
    fn sql(&self) -> DbResult<String> {
        (**self).sql()
    }

    fn params(&self) -> DbResult<Params> {
        (**self).params()
    }

    fn mappers(&self) -> Vec<MapperRef> {
        (**self).mappers()
    }
}

/// A statement that can derive a row-counting statement over the same filters.
pub trait Countable {
    type Count: Executable;

    fn count_statement(&self) -> DbResult<Self::Count>;
}
