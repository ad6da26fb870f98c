use thiserror::Error;

/// Core error type shared across rowsmith crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The table has no discoverable columns, usually a typo in the name.
    #[error("no columns found for table `{schema}`.`{table}`")]
    SchemaNotFound { schema: String, table: String },
    /// The table declares no primary-key column.
    #[error("no primary key column found on `{schema}`.`{table}`")]
    PrimaryKeyNotFound { schema: String, table: String },
    /// A non-nullable foreign-key chain revisits a table already on the path.
    #[error(
        "circular reference resolving column `{column}` on `{table}` \
         (path: {}); make `{column}` or another column in the cycle nullable",
        .path.join(" -> ")
    )]
    CircularReference {
        table: String,
        column: String,
        path: Vec<String>,
    },
    /// The database rejected the generated INSERT.
    #[error("insert into `{table}` failed for statement `{sql}`: {message}")]
    InsertFailed {
        table: String,
        sql: String,
        message: String,
    },
    /// A result row could not be converted to the requested identifier shape.
    #[error("could not decode primary key for `{table}`: {reason}")]
    Decode { table: String, reason: String },
    /// No schema name was supplied and the connection has no default database.
    #[error("no database name provided and none is selected on the connection")]
    DatabaseNameUnknown,
    /// Database error or driver failure.
    #[error("database error: {0}")]
    Db(String),
}

/// Convenience alias for results returned by rowsmith crates.
pub type Result<T> = std::result::Result<T, Error>;
