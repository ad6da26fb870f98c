//! On-demand fixture rows for MySQL tables.
//!
//! Given only a table name and a live pool, rowsmith reads the table's
//! schema from the catalog, synthesizes values for every column that
//! needs one, satisfies foreign keys by recursively creating rows in
//! referenced tables, and returns the primary key of a row that now
//! exists — in whatever shape the caller asks for.
//!
//! ```no_run
//! use rowsmith::SynthesisOptions;
//!
//! # async fn demo(pool: &sqlx::MySqlPool) -> rowsmith::Result<()> {
//! // Creates an order, plus whatever rows its foreign keys require.
//! let order_id: i64 = rowsmith::create_id(pool, "Orders", SynthesisOptions::new()).await?;
//!
//! let user_id: i64 = rowsmith::get_or_create_id(
//!     pool,
//!     "Users",
//!     SynthesisOptions::new().with_column_value("Email", "fixed@mailinator.com"),
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```

pub mod connector;
pub mod ident;
mod resolver;
mod synth;
pub mod writer;

use sqlx::MySqlPool;

pub use connector::{Connector, MySqlConnector};
pub use ident::{FixtureId, IdComponent};
pub use rowsmith_core::{
    Column, ColumnKind, Error, ForeignKey, Result, SeededColumn, SynthesisOptions, TableSchema,
    UniqueConstraint, Value,
};

/// Return the key of an existing row in `table`, or create one.
///
/// Any row at all satisfies the lookup; set
/// [`SynthesisOptions::force_create`] (or use [`create_id`]) to always
/// insert.
pub async fn get_or_create_id<I: FixtureId>(
    pool: &MySqlPool,
    table: &str,
    options: SynthesisOptions,
) -> Result<I> {
    let connector = MySqlConnector::new(pool);
    get_or_create_id_with(&connector, table, options).await
}

/// Always create a fresh row in `table` and return its key.
pub async fn create_id<I: FixtureId>(
    pool: &MySqlPool,
    table: &str,
    options: SynthesisOptions,
) -> Result<I> {
    let connector = MySqlConnector::new(pool);
    create_id_with(&connector, table, options).await
}

/// [`get_or_create_id`] against any [`Connector`] implementation.
pub async fn get_or_create_id_with<I, C>(
    connector: &C,
    table: &str,
    options: SynthesisOptions,
) -> Result<I>
where
    I: FixtureId,
    C: Connector + ?Sized,
{
    let schema_name = resolver::resolve_schema_name(connector, &options).await?;
    let resolved = resolver::resolve_root(connector, &schema_name, table, &options, false).await?;
    if let Some(id) = I::decode_row(&resolved.key) {
        return Ok(id);
    }

    // An existing row whose key does not fit the requested shape does not
    // satisfy the caller; fall through to creating one.
    if resolved.reused {
        let created =
            resolver::resolve_root(connector, &schema_name, table, &options, true).await?;
        if let Some(id) = I::decode_row(&created.key) {
            return Ok(id);
        }
    }

    Err(Error::Decode {
        table: table.to_string(),
        reason: "primary key does not match the requested identifier shape".to_string(),
    })
}

/// [`create_id`] against any [`Connector`] implementation.
pub async fn create_id_with<I, C>(connector: &C, table: &str, options: SynthesisOptions) -> Result<I>
where
    I: FixtureId,
    C: Connector + ?Sized,
{
    get_or_create_id_with(connector, table, options.force_create()).await
}
