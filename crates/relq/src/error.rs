//! Error types for relq

use crate::driver::Driver;
use thiserror::Error;

/// Result type alias for relq operations
pub type DbResult<T> = Result<T, DbError>;

/// Classification of a failed statement, derived from the dialect's SQL-state
/// and driver error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlErrorKind {
    UniqueViolation,
    ForeignKeyViolation,
    CheckViolation,
    NotNullViolation,
    Generic,
}

/// Error reported by the external database client (statement handle or
/// transactional handle).
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct DriverError {
    /// Five-character SQL-state, when the client reports one.
    pub sql_state: Option<String>,
    /// Driver-specific error code (e.g. MySQL `1062`).
    pub code: Option<String>,
    pub message: String,
}

impl DriverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            sql_state: None,
            code: None,
            message: message.into(),
        }
    }

    pub fn with_sql_state(mut self, sql_state: impl Into<String>) -> Self {
        self.sql_state = Some(sql_state.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// Error types for query construction, execution and result mapping
#[derive(Debug, Error)]
pub enum DbError {
    /// A bound value is not a scalar or a flat array of scalars
    #[error("unexpected value type for parameter `{name}`: {found}")]
    UnexpectedValueType { name: String, found: String },

    /// Invalid LIMIT/OFFSET/page arguments
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// `expr::all` / `expr::any` called without operands
    #[error("{0}() requires at least one expression")]
    EmptyExpression(&'static str),

    /// Return-var name collision
    #[error("duplicate return variable name: {0}")]
    DuplicateName(String),

    /// A return-var was given a type but no name
    #[error("a type was given without a name for expression: {0}")]
    TypeWithoutName(String),

    /// INSERT rendered without any records
    #[error("no records added to INSERT query")]
    NoRecords,

    /// A required column has no value and no default
    #[error("missing value for required column `{column}` in record #{record}")]
    MissingValue { record: usize, column: String },

    /// Type name not registered in the type provider
    #[error("undefined type: {0}")]
    UnknownType(String),

    /// Column name not declared on a table
    #[error("undefined column `{column}` on table `{table}`")]
    UnknownColumn { table: String, column: String },

    /// Dialect extension used on a dialect that does not support it
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// Statement preparation or execution failed
    #[error("SQL error [{}]: {message}\n{sql}", .sql_state.as_deref().unwrap_or("-"))]
    Sql {
        kind: SqlErrorKind,
        sql_state: Option<String>,
        code: Option<String>,
        message: String,
        /// Display-only SQL with bound values interpolated.
        sql: String,
    },

    /// Transaction control or other client failure outside of a statement
    #[error("driver error: {0}")]
    Driver(#[from] DriverError),

    /// A nested `transact()` call returned a failing outcome
    #[error("a nested call to transact() returned a failing outcome")]
    TransactionAborted,

    /// A `transact()` callback made no commit/rollback decision
    #[error("transaction callback must decide to commit (true) or roll back (false)")]
    InvalidTransactionResult,

    /// A mapper changed the number of records in a batch
    #[error("mapper contract violation: batch of {expected} record(s) became {actual}")]
    MapperContract { expected: usize, actual: usize },

    /// A type-mapped field is missing from a record
    #[error("undefined field: {0}")]
    UndefinedField(String),

    /// Type conversion failure
    #[error("conversion error in type `{type_name}`: {message}")]
    Conversion { type_name: String, message: String },

    /// Builder misuse not covered by a more specific variant
    #[error("validation error: {0}")]
    Validation(String),
}

impl DbError {
    /// Create a conversion error for the named type
    pub fn conversion(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conversion {
            type_name: type_name.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an invalid range error
    pub fn range(message: impl Into<String>) -> Self {
        Self::InvalidRange(message.into())
    }

    /// Classify a client error raised while preparing or executing `sql`.
    ///
    /// `sql` should already be the display form (see [`crate::format::format_query`]).
    pub fn from_driver(driver: &dyn Driver, err: DriverError, sql: impl Into<String>) -> Self {
        let kind = driver.classify_error(err.sql_state.as_deref(), err.code.as_deref());
        Self::Sql {
            kind,
            sql_state: err.sql_state,
            code: err.code,
            message: err.message,
            sql: sql.into(),
        }
    }

    /// The classification of a SQL error, if this is one
    pub fn sql_kind(&self) -> Option<SqlErrorKind> {
        match self {
            Self::Sql { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        self.sql_kind() == Some(SqlErrorKind::UniqueViolation)
    }

    /// Check if this is a foreign key violation error
    pub fn is_foreign_key_violation(&self) -> bool {
        self.sql_kind() == Some(SqlErrorKind::ForeignKeyViolation)
    }

    /// Check if this is a transaction-aborted error
    pub fn is_transaction_aborted(&self) -> bool {
        matches!(self, Self::TransactionAborted)
    }
}
