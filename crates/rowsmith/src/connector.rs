use async_trait::async_trait;
use sqlx::MySqlPool;

use rowsmith_core::{Column, Result, TableSchema, Value};

use crate::writer;

/// The three database touchpoints a resolution needs: schema discovery,
/// the get-or-create fast path, and the final insert.
///
/// The resolver is written against this trait so its graph logic can be
/// exercised without a running server.
#[async_trait]
pub trait Connector: Send + Sync {
    /// The database selected on the connection, when one is.
    async fn default_schema(&self) -> Result<Option<String>>;

    /// Full schema snapshot for one table, unique constraints seeded.
    async fn describe(&self, schema: &str, table: &str) -> Result<TableSchema>;

    /// Primary-key value(s) of any one existing row.
    async fn fetch_existing_key(
        &self,
        schema: &str,
        table: &str,
        primary_key: &[Column],
    ) -> Result<Option<Vec<Value>>>;

    /// Insert a row and return its raw primary-key value(s).
    async fn insert_row(
        &self,
        schema: &str,
        table: &str,
        columns: &[Column],
        values: &[Value],
        primary_key: &[Column],
    ) -> Result<Vec<Value>>;
}

/// Connector over a live `sqlx` MySQL pool.
pub struct MySqlConnector<'a> {
    pool: &'a MySqlPool,
}

impl<'a> MySqlConnector<'a> {
    pub fn new(pool: &'a MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Connector for MySqlConnector<'_> {
    async fn default_schema(&self) -> Result<Option<String>> {
        rowsmith_introspect::current_database(self.pool).await
    }

    async fn describe(&self, schema: &str, table: &str) -> Result<TableSchema> {
        rowsmith_introspect::describe_table(self.pool, schema, table).await
    }

    async fn fetch_existing_key(
        &self,
        schema: &str,
        table: &str,
        primary_key: &[Column],
    ) -> Result<Option<Vec<Value>>> {
        writer::fetch_first_key(self.pool, schema, table, primary_key).await
    }

    async fn insert_row(
        &self,
        schema: &str,
        table: &str,
        columns: &[Column],
        values: &[Value],
        primary_key: &[Column],
    ) -> Result<Vec<Value>> {
        writer::insert_row(self.pool, schema, table, columns, values, primary_key).await
    }
}
