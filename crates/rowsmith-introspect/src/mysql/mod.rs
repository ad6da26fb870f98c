use sqlx::MySqlPool;
use tracing::debug;

use rowsmith_core::{Error, ForeignKey, Result, TableSchema};

mod mapper;
mod queries;

pub use queries::{current_database, quote_ident};

/// Read the full schema snapshot for one table from the live catalog.
///
/// Also seeds each unique constraint with the values already present in
/// its chosen randomizable column, so synthesis can avoid collisions.
/// Fails with [`Error::SchemaNotFound`] when the table has no columns.
pub async fn describe_table(pool: &MySqlPool, schema: &str, table: &str) -> Result<TableSchema> {
    let columns = mapper::map_columns(queries::list_columns(pool, schema, table).await?);
    if columns.is_empty() {
        return Err(Error::SchemaNotFound {
            schema: schema.to_string(),
            table: table.to_string(),
        });
    }

    let foreign_keys = queries::list_foreign_keys(pool, schema, table)
        .await?
        .into_iter()
        .map(|raw| ForeignKey {
            column: raw.column,
            referenced_table: raw.referenced_table,
        })
        .collect::<Vec<_>>();

    let mut uniques =
        mapper::group_unique_constraints(queries::list_unique_columns(pool, schema, table).await?);
    for unique in &mut uniques {
        if let Some(column) = mapper::pick_seeded_column(&columns, unique) {
            let existing =
                queries::list_column_values(pool, schema, table, &column.name, column.kind).await?;
            unique.seeded = Some(mapper::seed(&column, existing));
        }
    }

    debug!(
        schema,
        table,
        columns = columns.len(),
        foreign_keys = foreign_keys.len(),
        uniques = uniques.len(),
        "table described"
    );

    Ok(TableSchema {
        schema: schema.to_string(),
        table: table.to_string(),
        columns,
        foreign_keys,
        uniques,
    })
}
